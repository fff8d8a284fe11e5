//! Arena memory.
//!
//! Two arenas back all engine allocations that are not GPU objects:
//! - persistent: sized once at startup, never reset
//! - transient: reset at the end of every frame

mod arena;
mod context;
mod error;

pub use arena::{Allocation, Arena, OverflowPolicy, ARENA_ALIGN};
pub use context::{MemoryConfig, MemoryContext};
pub use error::ArenaError;
