//! This module contains the top level netlink header code and the
//! generic netlink header that follows it in every `nl80211` and
//! `nlctrl` message.
//!
//! Every message this crate sends or receives has the layout:
//!
//! ```text
//! +----------------+------------+---------------------------+
//! |   Nlmsghdr     | Genlmsghdr |        attributes         |
//! |   16 bytes     |  4 bytes   | aligned to 4 byte bounds  |
//! +----------------+------------+---------------------------+
//! ```
//!
//! Headers are parsed and written in native byte order, matching
//! the kernel side of the socket.

use byteorder::{ByteOrder, NativeEndian};
use getset::CopyGetters;

use crate::{
    consts::{nl::*, Nl80211Cmd},
    err::{DeError, Nlmsgerr, SerError},
};

/// Size of [`Nlmsghdr`] on the wire.
pub const NLMSG_HDRLEN: usize = 16;

/// Size of [`Genlmsghdr`] on the wire.
pub const GENL_HDRLEN: usize = 4;

/// Top level netlink header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Nlmsghdr {
    /// Length of the netlink message including the header
    nl_len: u32,
    /// Type of the netlink message
    nl_type: u16,
    /// Flags indicating properties of the request or response
    nl_flags: NlmF,
    /// Sequence number for use in tracking
    nl_seq: u32,
    /// ID of the netlink destination for requests and source for
    /// responses
    nl_pid: u32,
}

impl Nlmsghdr {
    /// Create a new top level netlink packet header.
    pub fn new(nl_len: u32, nl_type: u16, nl_flags: NlmF, nl_seq: u32, nl_pid: u32) -> Self {
        Nlmsghdr {
            nl_len,
            nl_type,
            nl_flags,
            nl_seq,
            nl_pid,
        }
    }

    /// Read a header from the start of `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self, DeError> {
        if buf.len() < NLMSG_HDRLEN {
            return Err(DeError::Truncated);
        }
        Ok(Nlmsghdr {
            nl_len: NativeEndian::read_u32(&buf[0..4]),
            nl_type: NativeEndian::read_u16(&buf[4..6]),
            nl_flags: NlmF::from_bits_retain(NativeEndian::read_u16(&buf[6..8])),
            nl_seq: NativeEndian::read_u32(&buf[8..12]),
            nl_pid: NativeEndian::read_u32(&buf[12..16]),
        })
    }

    /// Write the header to the start of `buf`.
    pub fn write(&self, buf: &mut [u8]) -> Result<(), SerError> {
        if buf.len() < NLMSG_HDRLEN {
            return Err(SerError::UnexpectedEOB);
        }
        NativeEndian::write_u32(&mut buf[0..4], self.nl_len);
        NativeEndian::write_u16(&mut buf[4..6], self.nl_type);
        NativeEndian::write_u16(&mut buf[6..8], self.nl_flags.bits());
        NativeEndian::write_u32(&mut buf[8..12], self.nl_seq);
        NativeEndian::write_u32(&mut buf[12..16], self.nl_pid);
        Ok(())
    }

    /// Multicast notifications are sent by the kernel with both the
    /// port ID and the sequence number set to zero.
    pub fn is_multicast(&self) -> bool {
        self.nl_pid == 0 && self.nl_seq == 0
    }
}

/// Struct representing generic netlink header and payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Genlmsghdr {
    /// Generic netlink message command
    cmd: u8,
    /// Version of generic netlink family protocol
    version: u8,
}

impl Genlmsghdr {
    /// Create a new generic netlink header.
    pub fn new(cmd: u8, version: u8) -> Self {
        Genlmsghdr { cmd, version }
    }

    /// Read a header from the start of `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self, DeError> {
        if buf.len() < GENL_HDRLEN {
            return Err(DeError::Truncated);
        }
        Ok(Genlmsghdr {
            cmd: buf[0],
            version: buf[1],
        })
    }

    /// Write the header to the start of `buf`. The reserved field is
    /// always zeroed.
    pub fn write(&self, buf: &mut [u8]) -> Result<(), SerError> {
        if buf.len() < GENL_HDRLEN {
            return Err(SerError::UnexpectedEOB);
        }
        buf[0] = self.cmd;
        buf[1] = self.version;
        NativeEndian::write_u16(&mut buf[2..4], 0);
        Ok(())
    }
}

/// A generic netlink message handed to response handlers. The
/// attribute bytes borrow from the channel buffer they were received
/// into.
#[derive(Debug, Clone, Copy)]
pub struct GenlMessage<'a> {
    header: Nlmsghdr,
    genlhdr: Genlmsghdr,
    attrs: &'a [u8],
}

impl<'a> GenlMessage<'a> {
    /// Split a message body (everything after [`Nlmsghdr`]) into the
    /// generic netlink header and its attributes.
    pub fn parse(header: Nlmsghdr, body: &'a [u8]) -> Result<Self, DeError> {
        let genlhdr = Genlmsghdr::parse(body)?;
        Ok(GenlMessage {
            header,
            genlhdr,
            attrs: &body[GENL_HDRLEN..],
        })
    }

    /// Top level netlink header of the message.
    pub fn header(&self) -> &Nlmsghdr {
        &self.header
    }

    /// Raw generic netlink command.
    pub fn cmd(&self) -> u8 {
        self.genlhdr.cmd()
    }

    /// Generic netlink command interpreted as an `nl80211` command.
    pub fn nl80211_cmd(&self) -> Nl80211Cmd {
        Nl80211Cmd::from(self.genlhdr.cmd())
    }

    /// Attribute bytes following the generic netlink header.
    pub fn attrs(&self) -> &'a [u8] {
        self.attrs
    }
}

/// Payload of one netlink message within a datagram.
#[derive(Debug)]
pub enum NlPayload<'a> {
    /// `NLMSG_ERROR` with an error code of 0
    Ack,
    /// `NLMSG_ERROR` carrying a kernel error
    Err(Nlmsgerr),
    /// `NLMSG_DONE`, the end of a dump
    Done,
    /// `NLMSG_NOOP`, `NLMSG_OVERRUN` or another reserved control
    /// type
    Empty,
    /// A message addressed to a generic netlink family
    Payload(GenlMessage<'a>),
}

impl<'a> NlPayload<'a> {
    /// Classify the body of a message by its header type.
    pub fn parse(header: Nlmsghdr, body: &'a [u8]) -> Result<Self, DeError> {
        if header.nl_type() >= NLMSG_MIN_TYPE {
            return GenlMessage::parse(header, body).map(NlPayload::Payload);
        }
        match Nlmsg::from(header.nl_type()) {
            Nlmsg::Done => Ok(NlPayload::Done),
            Nlmsg::Error => {
                if body.len() < 4 {
                    return Err(DeError::Truncated);
                }
                let error = NativeEndian::read_i32(&body[0..4]);
                if error == 0 {
                    return Ok(NlPayload::Ack);
                }
                // The kernel may trim the echoed request down to its
                // header.
                let nlmsg = Nlmsghdr::parse(&body[4..]).unwrap_or_default();
                Ok(NlPayload::Err(Nlmsgerr::new(error, nlmsg)))
            }
            _ => Ok(NlPayload::Empty),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_nlmsghdr_layout() {
        let header = Nlmsghdr::new(20, 0x1c, NlmF::REQUEST | NlmF::ACK, 7, 42);
        let mut buf = [0u8; NLMSG_HDRLEN];
        header.write(&mut buf).unwrap();

        assert_eq!(NativeEndian::read_u32(&buf[0..4]), 20);
        assert_eq!(NativeEndian::read_u16(&buf[4..6]), 0x1c);
        assert_eq!(
            NativeEndian::read_u16(&buf[6..8]),
            (libc::NLM_F_REQUEST | libc::NLM_F_ACK) as u16
        );
        assert_eq!(Nlmsghdr::parse(&buf).unwrap(), header);
    }

    #[test]
    fn test_nlmsghdr_short_buffer() {
        assert_eq!(Nlmsghdr::parse(&[0u8; 15]), Err(DeError::Truncated));
        let mut buf = [0u8; 8];
        assert_eq!(
            Nlmsghdr::default().write(&mut buf),
            Err(SerError::UnexpectedEOB)
        );
    }

    #[test]
    fn test_error_payload() {
        let header = Nlmsghdr::new(36, Nlmsg::Error.into(), NlmF::empty(), 3, 42);

        let mut body = vec![0u8; 4];
        match NlPayload::parse(header, &body).unwrap() {
            NlPayload::Ack => (),
            p => panic!("Expected ack, got {:?}", p),
        }

        NativeEndian::write_i32(&mut body[0..4], -libc::EBUSY);
        match NlPayload::parse(header, &body).unwrap() {
            NlPayload::Err(e) => {
                assert!(e.is_busy());
                assert_eq!(e.nlmsg(), Nlmsghdr::default());
            }
            p => panic!("Expected error, got {:?}", p),
        }

        assert!(NlPayload::parse(header, &body[..2]).is_err());
    }

    #[test]
    fn test_genl_payload() {
        let header = Nlmsghdr::new(24, 0x1c, NlmF::MULTI, 0, 0);
        let body = [34u8, 1, 0, 0, 8, 0, 3, 0];
        match NlPayload::parse(header, &body).unwrap() {
            NlPayload::Payload(msg) => {
                assert_eq!(msg.nl80211_cmd(), Nl80211Cmd::NewScanResults);
                assert_eq!(msg.attrs(), &[8, 0, 3, 0]);
                assert!(msg.header().is_multicast());
            }
            p => panic!("Expected payload, got {:?}", p),
        }
        assert!(NlPayload::parse(header, &body[..3]).is_err());
    }
}
