use super::{Arena, ArenaError, OverflowPolicy};

/// Sizing for the two engine arenas.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Lives for the whole process; holds startup data such as shader sources.
    pub persistent_capacity: usize,

    /// Reset at the end of every frame; holds per-frame staging data.
    pub transient_capacity: usize,

    pub overflow_policy: OverflowPolicy,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            persistent_capacity: 1 << 20,
            transient_capacity: 64 << 10,
            overflow_policy: OverflowPolicy::for_build(),
        }
    }
}

/// The persistent + transient arena pair.
///
/// Created once at startup and passed to the subsystems that allocate.
#[derive(Debug)]
pub struct MemoryContext {
    pub persistent: Arena,
    pub transient: Arena,
}

impl MemoryContext {
    pub fn new(config: &MemoryConfig) -> Result<Self, ArenaError> {
        let persistent = Arena::with_policy(config.persistent_capacity, config.overflow_policy)
            .inspect_err(|e| log::error!("persistent arena: {e}"))?;
        let transient = Arena::with_policy(config.transient_capacity, config.overflow_policy)
            .inspect_err(|e| log::error!("transient arena: {e}"))?;

        log::info!(
            "memory initialized (persistent {} KiB, transient {} KiB)",
            config.persistent_capacity / 1024,
            config.transient_capacity / 1024
        );

        Ok(Self {
            persistent,
            transient,
        })
    }

    /// Releases all per-frame data.
    pub fn end_frame(&mut self) {
        log::trace!(
            "transient arena watermark: {}/{} bytes",
            self.transient.used(),
            self.transient.capacity()
        );
        self.transient.reset();
    }
}
