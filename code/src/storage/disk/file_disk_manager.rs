use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Mutex;

use tracing::trace;

use crate::common::config::{PageId, BUSTUB_PAGE_SIZE};
use crate::error::CustomResult;

use super::disk_manager::DiskManager;

/// Disk manager backed by a single OS file, pages laid out back-to-back at
/// `page_id * BUSTUB_PAGE_SIZE`.
pub struct FileDiskManager {
    file: Mutex<File>,
}

impl FileDiskManager {
    pub fn new(path: impl AsRef<std::path::Path>) -> CustomResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    fn seek_addr(page_id: PageId) -> SeekFrom {
        SeekFrom::Start((page_id as u64) * (BUSTUB_PAGE_SIZE as u64))
    }
}

impl DiskManager for FileDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> CustomResult<()> {
        debug_assert_eq!(buf.len(), BUSTUB_PAGE_SIZE);
        let mut file = self.file.lock().expect("disk manager mutex poisoned");
        file.seek(Self::seek_addr(page_id))?;
        // A page that was allocated but never written reads back as zeros.
        match file.read_exact(buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => buf.fill(0),
            Err(e) => return Err(e.into()),
        }
        trace!(page_id, "read page from disk");
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> CustomResult<()> {
        debug_assert_eq!(buf.len(), BUSTUB_PAGE_SIZE);
        let mut file = self.file.lock().expect("disk manager mutex poisoned");
        file.seek(Self::seek_addr(page_id))?;
        file.write_all(buf)?;
        trace!(page_id, "wrote page to disk");
        Ok(())
    }
}
