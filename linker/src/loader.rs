//! Abstracts "a user-provided directory of HDL files" (§4.7 point 2): when
//! a part name is not in the registry, the linker asks a [`ChipLoader`] for
//! that chip's source text, parses and recursively links it, then registers
//! the result so later parts in the same chip (or sibling files) can
//! reference it without reparsing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A source of `.hdl` file contents keyed by chip name. [`FsChipLoader`] is
/// the default, filesystem-backed implementation; [`MapChipLoader`] is an
/// in-memory stand-in for tests and embedded fixtures.
pub trait ChipLoader {
    /// Returns the HDL source for `chip_name`, or `Ok(None)` if this loader
    /// has nothing under that name (distinct from an I/O error).
    fn load(&self, chip_name: &str) -> std::io::Result<Option<String>>;
}

/// Reads `<dir>/<Name>.hdl` from disk.
#[derive(Debug, Clone)]
pub struct FsChipLoader {
    dir: PathBuf,
}

impl FsChipLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ChipLoader for FsChipLoader {
    fn load(&self, chip_name: &str) -> std::io::Result<Option<String>> {
        let path: PathBuf = self.dir.join(format!("{chip_name}.hdl"));
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                log::debug!("loaded chip '{chip_name}' from {}", path.display());
                Ok(Some(text))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// An in-memory chip loader, keyed by chip name rather than file path. Used
/// by tests and by consumers that want to embed fixture chips without
/// touching the filesystem.
#[derive(Debug, Clone, Default)]
pub struct MapChipLoader {
    sources: BTreeMap<String, String>,
}

impl MapChipLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, chip_name: impl Into<String>, source: impl Into<String>) -> Self {
        self.sources.insert(chip_name.into(), source.into());
        self
    }

    pub fn insert(&mut self, chip_name: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(chip_name.into(), source.into());
    }
}

impl ChipLoader for MapChipLoader {
    fn load(&self, chip_name: &str) -> std::io::Result<Option<String>> {
        Ok(self.sources.get(chip_name).cloned())
    }
}

/// A loader with nothing to offer; every part must already be in the
/// registry. Useful when a caller wants to link a single self-contained
/// chip and treat any unresolved part as an error rather than a disk read.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullChipLoader;

impl ChipLoader for NullChipLoader {
    fn load(&self, _chip_name: &str) -> std::io::Result<Option<String>> {
        Ok(None)
    }
}

/// A convenience no-op check that a directory exists, used by callers that
/// want to fail fast with a clearer message than "file not found" before
/// handing a loader to [`crate::link::link`].
pub fn dir_exists(dir: &Path) -> bool {
    dir.is_dir()
}
