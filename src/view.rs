//! Read-only byte view over the source document.
//!
//! A view is backed either by a memory map of the input file or by owned
//! bytes (tests and tiny inputs). Scanning passes take it by reference and
//! only ever search forward from an offset; the mapping is released when the
//! view is dropped at the end of the pass.

use crate::error::Result;
use memchr::memmem;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub struct ByteView {
    inner: ViewInner,
}

#[derive(Debug)]
enum ViewInner {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl ByteView {
    /// Map `path` read-only. Empty files are held as an owned empty buffer.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(Self::from_vec(Vec::new()));
        }
        // SAFETY: the map is read-only and the file is not modified while mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(path = %path.display(), bytes = len, "Mapped input file");
        Ok(Self {
            inner: ViewInner::Mapped(mmap),
        })
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            inner: ViewInner::Owned(bytes),
        }
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        match &self.inner {
            ViewInner::Mapped(mmap) => mmap.as_ref(),
            ViewInner::Owned(bytes) => bytes.as_slice(),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Absolute offset of the first `needle` at or after `from`.
    pub fn find(&self, needle: &[u8], from: usize) -> Option<usize> {
        let hay = self.as_slice().get(from..)?;
        memmem::find(hay, needle).map(|i| from + i)
    }

    pub fn contains(&self, needle: &[u8]) -> bool {
        self.find(needle, 0).is_some()
    }

    /// Bytes in `start..end`, clamped to the view.
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        let bytes = self.as_slice();
        let end = end.min(bytes.len());
        &bytes[start.min(end)..end]
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
