//! IOCTL interface to the RPMsg control node.
//!
//! The `rpmsg_chrdev` driver exposes `/dev/rpmsg_ctrlN` once a device is
//! bound to it. Submitting `RPMSG_CREATE_EPT_IOCTL` on that node creates an
//! endpoint device (`/dev/rpmsgN`) carrying the given source and destination
//! addresses.
//!
//! The open/ioctl pair sits behind `ControlOpener` / `ControlHandle` so the
//! bind sequence can run against a fake node in tests.

use std::{
    fs::{File, OpenOptions},
    io,
    os::unix::{fs::OpenOptionsExt, io::AsRawFd},
    path::Path,
};
use thiserror::Error;

/// Size of `rpmsg_endpoint_info.name`, NUL terminator included.
pub const RPMSG_NAME_SIZE: usize = 32;

/// Mirror of `struct rpmsg_endpoint_info` from `<linux/rpmsg.h>`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointInfo {
    pub name: [u8; RPMSG_NAME_SIZE],
    pub src: u32,
    pub dst: u32,
}

/// The name does not fit the fixed-size kernel field.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("endpoint name '{name}' is {} bytes, limit is {}", .name.len(), RPMSG_NAME_SIZE - 1)]
pub struct NameTooLong {
    pub name: String,
}

impl EndpointInfo {
    /// Build a request, refusing names the kernel would see truncated.
    pub fn new(name: &str, src: u32, dst: u32) -> Result<Self, NameTooLong> {
        let bytes = name.as_bytes();
        if bytes.len() >= RPMSG_NAME_SIZE {
            return Err(NameTooLong { name: name.to_owned() });
        }
        let mut buf = [0u8; RPMSG_NAME_SIZE];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self { name: buf, src, dst })
    }

    /// Name up to the first NUL.
    pub fn name(&self) -> &str {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(RPMSG_NAME_SIZE);
        std::str::from_utf8(&self.name[..end]).unwrap_or_default()
    }
}

// ───── request encoding (asm-generic/ioctl.h) ──────────────────────────────

#[cfg(any(
    target_arch = "mips",
    target_arch = "mips64",
    target_arch = "powerpc",
    target_arch = "powerpc64",
    target_arch = "sparc64"
))]
mod ioc {
    pub const WRITE: u32 = 4;
    pub const DIRSHIFT: u32 = 29;
}

#[cfg(not(any(
    target_arch = "mips",
    target_arch = "mips64",
    target_arch = "powerpc",
    target_arch = "powerpc64",
    target_arch = "sparc64"
)))]
mod ioc {
    pub const WRITE: u32 = 1;
    pub const DIRSHIFT: u32 = 30;
}

const fn iow(ty: u8, nr: u8, size: usize) -> u32 {
    (ioc::WRITE << ioc::DIRSHIFT) | ((size as u32) << 16) | ((ty as u32) << 8) | nr as u32
}

const RPMSG_IOC_MAGIC: u8 = 0xb5;

/// `_IOW(0xb5, 0x1, struct rpmsg_endpoint_info)`
pub const RPMSG_CREATE_EPT_IOCTL: u32 =
    iow(RPMSG_IOC_MAGIC, 0x1, std::mem::size_of::<EndpointInfo>());

// ───── seams ───────────────────────────────────────────────────────────────

/// An open control node. Dropping the handle closes it.
pub trait ControlHandle {
    fn create_endpoint(&mut self, info: &EndpointInfo) -> io::Result<()>;
}

/// Opens control nodes read-write and non-blocking.
pub trait ControlOpener {
    type Handle: ControlHandle;

    fn open(&self, node: &Path) -> io::Result<Self::Handle>;
}

/// The real `/dev/rpmsg_ctrlN` opener.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharDevOpener;

/// File descriptor on a control node.
#[derive(Debug)]
pub struct CharDevHandle {
    file: File,
}

impl ControlOpener for CharDevOpener {
    type Handle = CharDevHandle;

    fn open(&self, node: &Path) -> io::Result<CharDevHandle> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(node)?;
        Ok(CharDevHandle { file })
    }
}

impl ControlHandle for CharDevHandle {
    fn create_endpoint(&mut self, info: &EndpointInfo) -> io::Result<()> {
        // SAFETY: `info` is a live #[repr(C)] rpmsg_endpoint_info and the
        // kernel only reads `size_of::<EndpointInfo>()` bytes from it.
        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                RPMSG_CREATE_EPT_IOCTL as _,
                info as *const EndpointInfo,
            )
        };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
