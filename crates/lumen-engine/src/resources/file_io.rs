use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::EngineError;
use crate::memory::{Allocation, Arena};

fn load_error(path: &Path, source: std::io::Error) -> EngineError {
    log::error!("failed to open file `{}`: {source}", path.display());
    EngineError::FileLoad {
        path: path.to_path_buf(),
        source,
    }
}

/// `true` if `path` names a readable regular file.
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file())
}

pub fn file_size(path: impl AsRef<Path>) -> Result<u64, EngineError> {
    let path = path.as_ref();
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| load_error(path, e))
}

/// Reads the whole file into a fresh allocation in `arena`.
///
/// The allocation is exactly the file length. If the read fails after the
/// allocation was made, the region stays reserved until the arena is reset.
pub fn read_file(path: impl AsRef<Path>, arena: &mut Arena) -> Result<Allocation, EngineError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| load_error(path, e))?;
    let len = file.metadata().map_err(|e| load_error(path, e))?.len();

    let allocation = arena.allocate(usize::try_from(len).unwrap_or(usize::MAX))?;
    file.read_exact(arena.bytes_mut(&allocation)?)
        .map_err(|e| load_error(path, e))?;

    log::debug!("read {len} bytes from `{}`", path.display());
    Ok(allocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ArenaError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_whole_file_into_arena() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shader.wgsl");
        fs::write(&path, "@fragment fn fs_main() {}").unwrap();

        let mut arena = Arena::new(1024).unwrap();
        let allocation = read_file(&path, &mut arena).unwrap();

        assert_eq!(arena.bytes(&allocation).unwrap(), b"@fragment fn fs_main() {}");
        assert_eq!(file_size(&path).unwrap(), 25);
        assert_eq!(arena.used(), 32);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.wgsl");
        let mut arena = Arena::new(64).unwrap();

        assert!(!file_exists(&path));
        let err = read_file(&path, &mut arena).unwrap_err();
        assert!(matches!(err, EngineError::FileLoad { path: p, .. } if p == path));
        assert!(file_size(&path).is_err());
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn directories_do_not_count_as_files() {
        let dir = TempDir::new().unwrap();
        assert!(!file_exists(dir.path()));
    }

    #[test]
    fn file_larger_than_arena_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.bin");
        fs::write(&path, vec![7u8; 200]).unwrap();

        let mut arena = Arena::new(128).unwrap();
        let err = read_file(&path, &mut arena).unwrap_err();

        assert!(matches!(
            err,
            EngineError::Allocation(ArenaError::OutOfSpace { requested: 200, .. })
        ));
        assert_eq!(arena.used(), 0);
    }
}
