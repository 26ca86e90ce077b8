use camino::Utf8Path;
use memmap2::Mmap;
use std::fs::File;

use crate::error::PackError;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// File contents, UTF-8 checked once by `read_text`.
pub enum FileContent {
    Mapped(Mmap),
    Buffered(String),
}

impl FileContent {
    /// The bytes exactly as validated; no second decode.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Mapped(mmap) => &mmap[..],
            FileContent::Buffered(s) => s.as_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of reading one packed file. Failure is data, not control flow.
pub enum FileBody {
    Text(FileContent),
    Unreadable(PackError),
}

impl FileBody {
    pub fn load(path: &Utf8Path) -> Self {
        match read_text(path) {
            Ok(content) => FileBody::Text(content),
            Err(err) => FileBody::Unreadable(err),
        }
    }
}

/// Read a file as strict UTF-8 (mmap above 1 MiB, else buffered).
pub fn read_text(path: &Utf8Path) -> Result<FileContent, PackError> {
    let metadata = std::fs::metadata(path).map_err(|e| PackError::io(path, e))?;

    if metadata.len() > MMAP_THRESHOLD {
        let file = File::open(path).map_err(|e| PackError::io(path, e))?;

        // Safety: read-only map; we never hand out mutable access
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| PackError::io(path, e))?;

        std::str::from_utf8(&mmap).map_err(|source| PackError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(FileContent::Mapped(mmap))
    } else {
        let bytes = std::fs::read(path).map_err(|e| PackError::io(path, e))?;

        let content = String::from_utf8(bytes).map_err(|e| PackError::Decode {
            path: path.to_path_buf(),
            source: e.utf8_error(),
        })?;

        Ok(FileContent::Buffered(content))
    }
}
