//! Growable file-backed byte store mapped one allocation unit at a time.
//!
//! Each allocation unit ("page") gets its own mapping, so growing the store
//! maps new pages without touching existing ones. A read or write that spans
//! two pages is split into one copy per page.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};
use tracing::{debug, trace};

use crate::types::{GraphError, Result};

/// Mappings are placed at multiples of this many bytes.
pub const MAP_ALIGNMENT: u64 = 4096;

/// A byte-addressable region backed by one file.
pub struct MappedFile {
    path: PathBuf,
    file: File,
    unit: u64,
    pages: Vec<MmapMut>,
}

impl MappedFile {
    /// Opens or creates `path`. A new or empty file is sized to one
    /// allocation unit; a file whose length is not a multiple of the unit is
    /// extended to the next multiple.
    pub fn open(path: impl AsRef<Path>, allocation_unit: u64) -> Result<Self> {
        validate_unit(allocation_unit)?;
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        let on_disk = file.metadata()?.len();
        let page_count = on_disk.div_ceil(allocation_unit).max(1);
        let len = page_count * allocation_unit;
        if len != on_disk {
            file.set_len(len)?;
        }
        let mut pages = Vec::with_capacity(page_count as usize);
        for index in 0..page_count {
            pages.push(map_page(&file, index, allocation_unit)?);
        }
        debug!(
            path = %path.display(),
            len,
            unit = allocation_unit,
            "mmap.open"
        );
        Ok(Self {
            path,
            file,
            unit: allocation_unit,
            pages,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of one allocation unit in bytes.
    pub fn allocation_unit(&self) -> u64 {
        self.unit
    }

    /// Current mapped length in bytes. Always a multiple of the unit.
    pub fn len(&self) -> u64 {
        self.pages.len() as u64 * self.unit
    }

    /// Always false: an open store holds at least one page.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Grows the store by at least `bytes`, rounded up to whole units.
    pub fn expand(&mut self, bytes: u64) -> Result<()> {
        let extra_pages = bytes.div_ceil(self.unit).max(1);
        let old_len = self.len();
        let new_len = old_len + extra_pages * self.unit;
        self.file.set_len(new_len)?;
        let first = self.pages.len() as u64;
        for index in first..first + extra_pages {
            self.pages.push(map_page(&self.file, index, self.unit)?);
        }
        debug!(
            path = %self.path.display(),
            old_len,
            new_len,
            "mmap.expand"
        );
        Ok(())
    }

    /// Grows the store until `end` is addressable. Returns whether it grew.
    pub fn ensure_len(&mut self, end: u64) -> Result<bool> {
        let len = self.len();
        if end <= len {
            return Ok(false);
        }
        self.expand(end - len)?;
        Ok(true)
    }

    /// Copies `dst.len()` bytes starting at `offset` into `dst`.
    pub fn read_at(&self, offset: u64, dst: &mut [u8]) -> Result<()> {
        self.check_bounds(offset, dst.len())?;
        let mut done = 0usize;
        while done < dst.len() {
            let (page, within) = self.locate(offset + done as u64);
            let take = (self.unit as usize - within).min(dst.len() - done);
            if done > 0 || take < dst.len() {
                trace!(offset, page, take, "mmap.read.split");
            }
            dst[done..done + take].copy_from_slice(&self.pages[page][within..within + take]);
            done += take;
        }
        Ok(())
    }

    /// Copies `src` into the store starting at `offset`. Never grows.
    pub fn write_at(&mut self, offset: u64, src: &[u8]) -> Result<()> {
        self.check_bounds(offset, src.len())?;
        let mut done = 0usize;
        while done < src.len() {
            let (page, within) = self.locate(offset + done as u64);
            let take = (self.unit as usize - within).min(src.len() - done);
            self.pages[page][within..within + take].copy_from_slice(&src[done..done + take]);
            done += take;
        }
        Ok(())
    }

    /// Reads the single byte at `offset`.
    pub fn read_u8(&self, offset: u64) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_at(offset, &mut byte)?;
        Ok(byte[0])
    }

    /// Writes the single byte at `offset`.
    pub fn write_u8(&mut self, offset: u64, value: u8) -> Result<()> {
        self.write_at(offset, &[value])
    }

    /// Flushes every mapped page to the backing file.
    pub fn flush(&self) -> Result<()> {
        for page in &self.pages {
            page.flush()?;
        }
        Ok(())
    }

    fn locate(&self, offset: u64) -> (usize, usize) {
        ((offset / self.unit) as usize, (offset % self.unit) as usize)
    }

    fn check_bounds(&self, offset: u64, len: usize) -> Result<()> {
        let end = offset
            .checked_add(len as u64)
            .ok_or_else(|| GraphError::InvalidArgument("offset overflow".into()))?;
        if end > self.len() {
            return Err(GraphError::OutOfBounds {
                offset: end,
                len: self.len(),
            });
        }
        Ok(())
    }
}

fn validate_unit(unit: u64) -> Result<()> {
    if unit == 0 || unit % MAP_ALIGNMENT != 0 {
        return Err(GraphError::Config(format!(
            "allocation unit {unit} must be a positive multiple of {MAP_ALIGNMENT}"
        )));
    }
    if usize::try_from(unit).is_err() {
        return Err(GraphError::Config(format!(
            "allocation unit {unit} exceeds address space"
        )));
    }
    Ok(())
}

fn map_page(file: &File, index: u64, unit: u64) -> Result<MmapMut> {
    #[allow(unsafe_code)]
    // SAFETY: the file handle is owned by the store for as long as the
    // mapping lives and is only ever extended, never truncated.
    let map = unsafe {
        MmapOptions::new()
            .offset(index * unit)
            .len(unit as usize)
            .map_mut(file)?
    };
    Ok(map)
}
