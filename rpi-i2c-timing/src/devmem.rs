//! Raw physical memory access through `/dev/mem`.
//!
//! [`DevMem`] wraps the device file handle, [`Mapping`] owns one shared
//! mapping of a physical window and removes it again when dropped, so
//! no mapping outlives the scope that created it.
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::ptr;

use crate::Error;

pub const DEV_MEM: &str = "/dev/mem";

/// Handle onto raw physical memory.
pub struct DevMem {
    file: File,
}

impl DevMem {
    /// Open `/dev/mem` read-write with `O_SYNC` for uncached register
    /// access. Requires root (or `CAP_SYS_RAWIO` with a permissive
    /// kernel).
    pub fn open() -> Result<Self, Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(DEV_MEM)
            .map_err(|source| Error::DevMemOpen { source })?;
        Ok(Self { file })
    }

    /// Establish a shared mapping of `len` bytes of physical memory at
    /// `phys_addr`.
    ///
    /// `mmap` needs a page aligned file offset, so the mapping is
    /// anchored at the containing page and the returned [`Mapping`]
    /// carries the intra-page offset. The `DevMem` handle may be
    /// dropped right after a successful call; per mmap(2), closing the
    /// file descriptor does not invalidate the mapping.
    pub fn map(&self, phys_addr: usize, len: usize) -> Result<Mapping, Error> {
        // SAFETY: sysconf has no memory safety preconditions.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        let page_offset = phys_addr % page_size;
        let map_len = len + page_offset;
        // SAFETY: MAP_SHARED mapping of a file we own; the kernel
        // validates the physical range and fails with MAP_FAILED if it
        // is not mappable.
        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                self.file.as_raw_fd(),
                (phys_addr - page_offset) as libc::off_t,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(Error::Map {
                source: io::Error::last_os_error(),
            });
        }
        Ok(Mapping {
            base: base as *mut u8,
            page_offset,
            map_len,
        })
    }
}

/// An established mapping of one physical window.
///
/// Deliberately neither `Clone` nor `Copy`: it stands for exclusive
/// access to a singular hardware resource. The raw pointer member also
/// keeps it `!Send`/`!Sync`.
pub struct Mapping {
    base: *mut u8,
    page_offset: usize,
    map_len: usize,
}

impl Mapping {
    /// Pointer to the first byte of the requested physical window.
    pub fn as_mut_ptr(&self) -> *mut u8 {
        // SAFETY: page_offset < map_len, so the result stays inside the
        // mapped region.
        unsafe { self.base.add(self.page_offset) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: base/map_len are exactly what mmap returned and the
        // region has not been unmapped before.
        unsafe {
            libc::munmap(self.base as *mut libc::c_void, self.map_len);
        }
    }
}
