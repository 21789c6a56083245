//! Scratch space for intermediate cell rasters
//!
//! A job owns one scratch directory. Each composited cell is spooled to a
//! file named after its (page, row, column) slot, read back by the document
//! writer, and removed once the page is finished. The directory itself is
//! removed when the handle is closed or dropped, whichever exit path the job
//! takes.

use crate::layout::CellSlot;
use crate::types::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PREFIX: &str = "photo-grid-";

pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create a scratch directory under the system temporary directory
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(PREFIX).tempdir()?;
        log::debug!("Scratch space at {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Create a scratch directory under `parent`
    pub fn new_in(parent: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(parent)?;
        log::debug!("Scratch space at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// File holding the raster for `slot`; unique per (page, row, column)
    pub fn cell_path(&self, slot: CellSlot) -> PathBuf {
        self.dir.path().join(format!(
            "{}r{}-c{}.raw",
            page_prefix(slot.page),
            slot.row,
            slot.col
        ))
    }

    /// Spool raw samples for `slot` and return the file path
    pub fn write_cell(&self, slot: CellSlot, samples: &[u8]) -> Result<PathBuf> {
        let path = self.cell_path(slot);
        std::fs::write(&path, samples)?;
        Ok(path)
    }

    /// Remove every spooled file belonging to `page`
    pub fn release_page(&self, page: usize) -> Result<usize> {
        let prefix = page_prefix(page);
        let mut removed = 0;
        for entry in std::fs::read_dir(self.dir.path())? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                std::fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Remove the directory and everything left in it
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}

fn page_prefix(page: usize) -> String {
    format!("cell-p{}-", page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_paths_are_unique() {
        let scratch = ScratchSpace::new().unwrap();
        let a = scratch.cell_path(CellSlot::new(0, 1, 2));
        let b = scratch.cell_path(CellSlot::new(0, 2, 1));
        let c = scratch.cell_path(CellSlot::new(1, 1, 2));
        let d = scratch.cell_path(CellSlot::new(11, 1, 2));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(c, d);
    }

    #[test]
    fn test_release_page_removes_only_that_page() {
        let scratch = ScratchSpace::new().unwrap();
        let p1 = scratch.write_cell(CellSlot::new(1, 0, 0), b"abc").unwrap();
        let p1b = scratch.write_cell(CellSlot::new(1, 0, 1), b"def").unwrap();
        let p11 = scratch.write_cell(CellSlot::new(11, 0, 0), b"ghi").unwrap();

        assert_eq!(scratch.release_page(1).unwrap(), 2);
        assert!(!p1.exists());
        assert!(!p1b.exists());
        assert!(p11.exists());
    }

    #[test]
    fn test_drop_removes_directory() {
        let scratch = ScratchSpace::new().unwrap();
        scratch.write_cell(CellSlot::new(0, 0, 0), b"abc").unwrap();
        let dir = scratch.path().to_path_buf();
        drop(scratch);
        assert!(!dir.exists());
    }
}
