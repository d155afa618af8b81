//! Close-on-exec and non-blocking toggles for file descriptors.
//!
//! Failures here almost always mean a bad fd, but they are still returned
//! rather than aborting the process.

use std::os::fd::{AsRawFd, RawFd};

use nix::fcntl::{fcntl, FcntlArg, FdFlag, OFlag};

use crate::error::PlatError;

fn fd_flags(fd: RawFd) -> Result<FdFlag, PlatError> {
    let bits = fcntl(fd, FcntlArg::F_GETFD)
        .map_err(|e| PlatError::os(fd.to_string(), "fcntl(F_GETFD)", e))?;
    Ok(FdFlag::from_bits_truncate(bits))
}

fn set_fd_flags(fd: RawFd, flags: FdFlag) -> Result<(), PlatError> {
    fcntl(fd, FcntlArg::F_SETFD(flags))
        .map(drop)
        .map_err(|e| PlatError::os(fd.to_string(), "fcntl(F_SETFD)", e))
}

fn status_flags(fd: RawFd) -> Result<OFlag, PlatError> {
    let bits = fcntl(fd, FcntlArg::F_GETFL)
        .map_err(|e| PlatError::os(fd.to_string(), "fcntl(F_GETFL)", e))?;
    Ok(OFlag::from_bits_truncate(bits))
}

fn set_status_flags(fd: RawFd, flags: OFlag) -> Result<(), PlatError> {
    fcntl(fd, FcntlArg::F_SETFL(flags))
        .map(drop)
        .map_err(|e| PlatError::os(fd.to_string(), "fcntl(F_SETFL)", e))
}

/// Mark `fd` close-on-exec.
pub fn set_cloexec<F: AsRawFd>(fd: &F) -> Result<(), PlatError> {
    let fd = fd.as_raw_fd();
    let flags = fd_flags(fd)?;
    set_fd_flags(fd, flags | FdFlag::FD_CLOEXEC)
}

/// Let `fd` survive `exec`.
pub fn clear_cloexec<F: AsRawFd>(fd: &F) -> Result<(), PlatError> {
    let fd = fd.as_raw_fd();
    let flags = fd_flags(fd)?;
    set_fd_flags(fd, flags - FdFlag::FD_CLOEXEC)
}

/// Put `fd` in non-blocking mode. Returns whether it already was.
pub fn set_nonblocking<F: AsRawFd>(fd: &F) -> Result<bool, PlatError> {
    let fd = fd.as_raw_fd();
    let flags = status_flags(fd)?;
    set_status_flags(fd, flags | OFlag::O_NONBLOCK)?;
    Ok(flags.contains(OFlag::O_NONBLOCK))
}

/// Put `fd` in blocking mode. Returns whether it was non-blocking before.
pub fn clear_nonblocking<F: AsRawFd>(fd: &F) -> Result<bool, PlatError> {
    let fd = fd.as_raw_fd();
    let flags = status_flags(fd)?;
    set_status_flags(fd, flags - OFlag::O_NONBLOCK)?;
    Ok(flags.contains(OFlag::O_NONBLOCK))
}
