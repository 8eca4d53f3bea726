//! This module provides the transport underneath
//! [`NetlinkChannel`][crate::channel::NetlinkChannel].
//!
//! [`Transport`] is the seam between the protocol code and the
//! kernel. [`NlSocket`] implements it with raw `libc` calls on a
//! `NETLINK_GENERIC` socket; any other implementation only has to
//! move whole datagrams.

use std::{
    io,
    mem::{size_of, zeroed, MaybeUninit},
    os::unix::io::{AsRawFd, RawFd},
};

use libc::{c_int, c_void};

use crate::consts::socket::*;

/// Datagram transport used by a netlink channel.
pub trait Transport {
    /// Send one complete datagram.
    fn send(&self, buf: &[u8]) -> io::Result<usize>;

    /// Receive one datagram into `buf`, returning its length. A
    /// non-blocking transport with nothing queued returns an error of
    /// kind [`io::ErrorKind::WouldBlock`].
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Port ID the kernel assigned to this end of the socket.
    fn pid(&self) -> u32;

    /// Join a multicast group.
    fn add_mcast_membership(&self, group: u32) -> io::Result<()>;

    /// Make [`Transport::recv`] block until a datagram arrives.
    fn block(&self) -> io::Result<()>;

    /// Make [`Transport::recv`] return immediately when nothing is
    /// queued.
    fn nonblock(&self) -> io::Result<()>;
}

/// Low level access to a netlink socket.
#[derive(Debug)]
pub struct NlSocket {
    fd: c_int,
    pid: u32,
}

impl NlSocket {
    /// Wrapper around `socket()` syscall filling in the
    /// netlink-specific information.
    pub fn new(proto: NlFamily) -> Result<Self, io::Error> {
        let fd = match unsafe {
            libc::socket(
                AddrFamily::Netlink.into(),
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                proto.into(),
            )
        } {
            i if i >= 0 => Ok(i),
            _ => Err(io::Error::last_os_error()),
        }?;
        Ok(NlSocket { fd, pid: 0 })
    }

    /// Equivalent of `socket` and `bind` calls. Passing [`None`] as
    /// `pid` lets the kernel assign the port ID, which is read back
    /// afterwards.
    pub fn connect(proto: NlFamily, pid: Option<u32>) -> Result<Self, io::Error> {
        let mut s = NlSocket::new(proto)?;
        s.bind(pid)?;
        s.pid = s.get_pid()?;
        Ok(s)
    }

    /// Use this function to bind to a netlink ID. See netlink(7) man
    /// pages for more information on netlink IDs.
    pub fn bind(&self, pid: Option<u32>) -> Result<(), io::Error> {
        let mut nladdr = unsafe { zeroed::<libc::sockaddr_nl>() };
        nladdr.nl_family = c_int::from(AddrFamily::Netlink) as u16;
        nladdr.nl_pid = pid.unwrap_or(0);
        match unsafe {
            libc::bind(
                self.fd,
                &nladdr as *const _ as *const libc::sockaddr,
                size_of::<libc::sockaddr_nl>() as u32,
            )
        } {
            i if i >= 0 => Ok(()),
            _ => Err(io::Error::last_os_error()),
        }
    }

    fn get_pid(&self) -> Result<u32, io::Error> {
        let mut sock_len = size_of::<libc::sockaddr_nl>() as u32;
        let mut sock_addr: MaybeUninit<libc::sockaddr_nl> = MaybeUninit::uninit();
        match unsafe {
            libc::getsockname(
                self.fd,
                sock_addr.as_mut_ptr() as *mut _,
                &mut sock_len as *mut _,
            )
        } {
            i if i >= 0 => Ok(unsafe { sock_addr.assume_init() }.nl_pid),
            _ => Err(io::Error::last_os_error()),
        }
    }

    /// Determines if underlying file descriptor is blocking.
    pub fn is_blocking(&self) -> Result<bool, io::Error> {
        let is_blocking = match unsafe { libc::fcntl(self.fd, libc::F_GETFL, 0) } {
            i if i >= 0 => i & libc::O_NONBLOCK == 0,
            _ => return Err(io::Error::last_os_error()),
        };
        Ok(is_blocking)
    }

    fn set_flags(&self, set: bool) -> Result<(), io::Error> {
        let flags = match unsafe { libc::fcntl(self.fd, libc::F_GETFL, 0) } {
            i if i >= 0 => i,
            _ => return Err(io::Error::last_os_error()),
        };
        let flags = if set {
            flags | libc::O_NONBLOCK
        } else {
            flags & !libc::O_NONBLOCK
        };
        match unsafe { libc::fcntl(self.fd, libc::F_SETFL, flags) } {
            i if i < 0 => Err(io::Error::last_os_error()),
            _ => Ok(()),
        }
    }
}

impl Transport for NlSocket {
    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        match unsafe { libc::send(self.fd, buf.as_ptr() as *const c_void, buf.len(), 0) } {
            i if i >= 0 => Ok(i as usize),
            _ => Err(io::Error::last_os_error()),
        }
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut addr = unsafe { zeroed::<libc::sockaddr_nl>() };
        let mut size = size_of::<libc::sockaddr_nl>() as libc::socklen_t;
        match unsafe {
            libc::recvfrom(
                self.fd,
                buf.as_mut_ptr() as *mut c_void,
                buf.len(),
                0,
                &mut addr as *mut _ as *mut libc::sockaddr,
                &mut size,
            )
        } {
            i if i >= 0 => Ok(i as usize),
            _ => Err(io::Error::last_os_error()),
        }
    }

    fn pid(&self) -> u32 {
        self.pid
    }

    fn add_mcast_membership(&self, group: u32) -> io::Result<()> {
        match unsafe {
            libc::setsockopt(
                self.fd,
                libc::SOL_NETLINK,
                libc::NETLINK_ADD_MEMBERSHIP,
                &group as *const _ as *const c_void,
                size_of::<u32>() as libc::socklen_t,
            )
        } {
            0 => Ok(()),
            _ => Err(io::Error::last_os_error()),
        }
    }

    fn block(&self) -> io::Result<()> {
        self.set_flags(false)
    }

    fn nonblock(&self) -> io::Result<()> {
        self.set_flags(true)
    }
}

impl AsRawFd for NlSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for NlSocket {
    /// Closes underlying file descriptor to avoid file descriptor
    /// leaks.
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_socket_nonblock() {
        let s = NlSocket::connect(NlFamily::Generic, None).unwrap();
        assert_ne!(s.pid(), 0);
        s.nonblock().unwrap();
        assert!(!s.is_blocking().unwrap());
        s.block().unwrap();
        assert!(s.is_blocking().unwrap());

        let mut buf = [0u8; 64];
        s.nonblock().unwrap();
        assert_eq!(
            s.recv(&mut buf).unwrap_err().kind(),
            io::ErrorKind::WouldBlock
        );
    }
}
