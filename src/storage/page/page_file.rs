//! Page file for block-level I/O.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{PoolError, Result};
use crate::storage::page::{PageId, PAGE_SIZE};

const ZERO_PAGE: [u8; PAGE_SIZE] = [0u8; PAGE_SIZE];

/// A flat file of fixed-size pages, page 0 onward.
///
/// The page file handles:
/// - Reading and writing whole pages at their offsets
/// - Growing the file one zero-filled page at a time
/// - Tracking the page count and the current page position
///
/// Reads and writes never extend the file; only [`PageFile::append_empty_page`]
/// and [`PageFile::ensure_capacity`] do.
pub struct PageFile {
    /// Path to the page file.
    path: PathBuf,
    /// File handle for the page file.
    file: File,
    /// Number of whole pages in the file.
    total_pages: u32,
    /// Cursor for relative reads: the page last read, written or appended.
    current_position: u32,
}

impl PageFile {
    /// Creates (or truncates) a page file holding one zero-filled page.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn create(path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(|e| {
            PoolError::StorageError(format!("Failed to create page file {}: {e}", path.display()))
        })?;
        file.write_all(&ZERO_PAGE)
            .map_err(|e| PoolError::StorageError(format!("Failed to write first page: {e}")))?;
        file.sync_all()
            .map_err(|e| PoolError::StorageError(format!("Failed to sync page file: {e}")))?;
        Ok(())
    }

    /// Opens an existing page file.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file does not exist, or a storage error
    /// if it cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, OpenOptions::new().read(true).write(true))
    }

    /// Opens a page file that rejects writes.
    #[cfg(test)]
    pub(crate) fn open_read_only(path: &Path) -> Result<Self> {
        Self::open_with(path, OpenOptions::new().read(true))
    }

    fn open_with(path: &Path, options: &OpenOptions) -> Result<Self> {
        let file = options.open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PoolError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => PoolError::StorageError(format!(
                "Failed to open page file {}: {e}",
                path.display()
            )),
        })?;

        let file_len = file
            .metadata()
            .map_err(|e| PoolError::StorageError(format!("Failed to get file metadata: {e}")))?
            .len();

        // A trailing partial page is not addressable
        let total_pages = (file_len / PAGE_SIZE as u64) as u32;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            total_pages,
            current_position: 0,
        })
    }

    /// Deletes a page file.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if there is nothing to delete.
    pub fn destroy(path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PoolError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => PoolError::StorageError(format!(
                "Failed to remove page file {}: {e}",
                path.display()
            )),
        })
    }

    /// Returns the path to the page file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of pages in the file.
    #[must_use]
    pub fn num_pages(&self) -> u32 {
        self.total_pages
    }

    /// Returns the cursor: the page last read, written or appended.
    ///
    /// A freshly opened file points at page 0.
    #[must_use]
    pub fn current_position(&self) -> PageId {
        PageId::new(self.current_position)
    }

    fn check_range(&self, page: PageId) -> Result<()> {
        if page.get() >= self.total_pages {
            return Err(PoolError::PageOutOfRange {
                page,
                num_pages: self.total_pages,
            });
        }
        Ok(())
    }

    /// Reads a page into `buf`, which must be exactly one page long.
    ///
    /// # Errors
    ///
    /// Returns `PageOutOfRange` if the page is past the end of the file, or a
    /// storage error if the read fails.
    pub fn read_page(&mut self, page: PageId, buf: &mut [u8]) -> Result<()> {
        self.check_range(page)?;
        check_buffer_len(buf.len())?;

        self.file
            .seek(SeekFrom::Start(page.offset()))
            .map_err(|e| PoolError::StorageError(format!("Failed to seek to page {page}: {e}")))?;
        self.file
            .read_exact(buf)
            .map_err(|e| PoolError::StorageError(format!("Failed to read page {page}: {e}")))?;

        self.current_position = page.get();
        Ok(())
    }

    /// Writes one page of `buf` at the page's offset.
    ///
    /// # Errors
    ///
    /// Returns `PageOutOfRange` if the page is past the end of the file, or a
    /// storage error if the write fails.
    pub fn write_page(&mut self, page: PageId, buf: &[u8]) -> Result<()> {
        self.check_range(page)?;
        check_buffer_len(buf.len())?;

        self.file
            .seek(SeekFrom::Start(page.offset()))
            .map_err(|e| PoolError::StorageError(format!("Failed to seek to page {page}: {e}")))?;
        self.file
            .write_all(buf)
            .map_err(|e| PoolError::StorageError(format!("Failed to write page {page}: {e}")))?;

        self.current_position = page.get();
        Ok(())
    }

    /// Reads page 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn read_first_page(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_page(PageId::new(0), buf)
    }

    /// Reads the page before the cursor.
    ///
    /// # Errors
    ///
    /// Returns `BeforeFirstPage` if the cursor is on page 0.
    pub fn read_previous_page(&mut self, buf: &mut [u8]) -> Result<()> {
        let page = self
            .current_position
            .checked_sub(1)
            .ok_or(PoolError::BeforeFirstPage)?;
        self.read_page(PageId::new(page), buf)
    }

    /// Reads the page under the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn read_current_page(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_page(self.current_position(), buf)
    }

    /// Reads the page after the cursor.
    ///
    /// # Errors
    ///
    /// Returns `PageOutOfRange` if the cursor is on the last page.
    pub fn read_next_page(&mut self, buf: &mut [u8]) -> Result<()> {
        let page = PageId::new(self.current_position.saturating_add(1));
        self.read_page(page, buf)
    }

    /// Reads the last page of the file.
    ///
    /// # Errors
    ///
    /// Returns `PageOutOfRange` if the file holds no whole page.
    pub fn read_last_page(&mut self, buf: &mut [u8]) -> Result<()> {
        let page = PageId::new(self.total_pages.saturating_sub(1));
        self.read_page(page, buf)
    }

    /// Writes `buf` to the page under the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn write_current_page(&mut self, buf: &[u8]) -> Result<()> {
        self.write_page(self.current_position(), buf)
    }

    /// Appends one zero-filled page and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be extended.
    pub fn append_empty_page(&mut self) -> Result<PageId> {
        let page = PageId::new(self.total_pages);

        self.file
            .seek(SeekFrom::Start(page.offset()))
            .map_err(|e| PoolError::StorageError(format!("Failed to seek to end of file: {e}")))?;
        self.file
            .write_all(&ZERO_PAGE)
            .map_err(|e| PoolError::StorageError(format!("Failed to extend file: {e}")))?;

        self.total_pages += 1;
        self.current_position = page.get();
        Ok(page)
    }

    /// Appends zero-filled pages until the file holds at least `num_pages`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be extended.
    pub fn ensure_capacity(&mut self, num_pages: u32) -> Result<()> {
        while self.total_pages < num_pages {
            self.append_empty_page()?;
        }
        Ok(())
    }

    /// Flushes all buffered writes to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    pub fn sync(&mut self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|e| PoolError::StorageError(format!("Failed to sync page file: {e}")))
    }

    /// Syncs and closes the page file.
    ///
    /// # Errors
    ///
    /// Returns the still-open file with the error if the final sync fails.
    pub fn close(mut self) -> std::result::Result<(), (Self, PoolError)> {
        match self.sync() {
            Ok(()) => Ok(()),
            Err(err) => Err((self, err)),
        }
    }
}

impl std::fmt::Debug for PageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFile")
            .field("path", &self.path)
            .field("total_pages", &self.total_pages)
            .field("current_position", &self.current_position)
            .finish_non_exhaustive()
    }
}

fn check_buffer_len(len: usize) -> Result<()> {
    if len != PAGE_SIZE {
        return Err(PoolError::StorageError(format!(
            "Page buffer is {len} bytes, expected {PAGE_SIZE}"
        )));
    }
    Ok(())
}
