//! This is the module that contains the error types used in
//! `wifi-scan`
//!
//! There are four layers:
//! * [`Nlmsgerr`] - an application error returned from netlink as a
//!   packet, for example `EBUSY` when a scan cannot be triggered.
//! * [`SocketError`], [`SerError`] and [`DeError`] - failures of the
//!   transport, of request construction and of response parsing.
//! * [`ProtocolError`] - a well formed reply that does not carry what
//!   the protocol requires.
//! * [`WifiError`] - the top level error returned by every fallible
//!   operation on [`WifiScan`][crate::WifiScan].
//!
//! [`MalformedPayload`] is different from the others: it describes a
//! sub-field of a BSS record that could not be decoded. It is never
//! returned, only logged, and the affected field is zeroed.
//!
//! # Design decisions
//! All errors implement `std::error::Error` so they can be used with
//! `?` and boxed errors in calling code.

use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use getset::CopyGetters;

use crate::{attr::AttrKind, nl::Nlmsghdr};

/// Struct representing netlink packets containing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
pub struct Nlmsgerr {
    /// Error code, a negated `errno` value
    #[getset(get_copy = "pub")]
    error: libc::c_int,
    /// Packet header for request that failed
    #[getset(get_copy = "pub")]
    nlmsg: Nlmsghdr,
}

impl Nlmsgerr {
    /// Create a new error packet representation.
    pub fn new(error: libc::c_int, nlmsg: Nlmsghdr) -> Self {
        Nlmsgerr { error, nlmsg }
    }

    /// The positive `errno` value carried by the packet.
    pub fn errno(&self) -> libc::c_int {
        self.error.wrapping_neg()
    }

    /// Returns true if the device rejected the request because it is
    /// busy with other radio work.
    pub fn is_busy(&self) -> bool {
        self.errno() == libc::EBUSY
    }
}

impl Display for Nlmsgerr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", io::Error::from_raw_os_error(self.errno()))
    }
}

impl Error for Nlmsgerr {}

macro_rules! err_from {
    ($err:ident, $($from_err:path { $from_impl:expr }),+) => {
        $(
            impl From<$from_err> for $err {
                fn from(e: $from_err) -> Self {
                    $from_impl(e)
                }
            }
        )*
    };
}

/// Socket level error
#[derive(Debug)]
pub enum SocketError {
    /// A system call on the socket failed.
    Io(io::Error),
    /// An error packet sent back by netlink.
    Nlmsgerr(Nlmsgerr),
    /// A response carried a sequence number or port ID that does not
    /// belong to the outstanding request.
    BadSeqOrPid {
        /// Sequence number found in the response
        seq: u32,
        /// Port ID found in the response
        pid: u32,
    },
    /// The socket returned an empty read in the middle of an
    /// exchange.
    Closed,
    /// The kernel marked a dump reply as interrupted because the
    /// dumped table changed while it was being read.
    DumpInterrupted,
}

err_from!(
    SocketError,
    io::Error { SocketError::Io },
    Nlmsgerr { SocketError::Nlmsgerr }
);

impl Display for SocketError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SocketError::Io(ref e) => write!(f, "Socket operation failed: {}", e),
            SocketError::Nlmsgerr(ref e) => {
                write!(f, "Error response received from netlink: {}", e)
            }
            SocketError::BadSeqOrPid { seq, pid } => write!(
                f,
                "Response with sequence number {} and port ID {} does not match the request",
                seq, pid
            ),
            SocketError::Closed => write!(f, "Socket returned no data"),
            SocketError::DumpInterrupted => {
                write!(f, "Dump was interrupted and may be inconsistent")
            }
        }
    }
}

impl Error for SocketError {}

/// Serialization error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerError {
    /// The end of the buffer was reached before serialization
    /// finished.
    UnexpectedEOB,
    /// A string attribute contained an interior null byte.
    NullByte,
}

impl Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SerError::UnexpectedEOB => write!(
                f,
                "The buffer was too small for the requested serialization operation",
            ),
            SerError::NullByte => write!(f, "String attribute contains a null byte"),
        }
    }
}

impl Error for SerError {}

/// Deserialization error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeError {
    /// A header or attribute claims more bytes than the buffer holds,
    /// or fewer than its own header.
    Truncated,
    /// An attribute failed its validation rule.
    InvalidAttribute {
        /// Attribute type
        attr: u16,
        /// Wire type the rule expected
        kind: AttrKind,
        /// Payload length found on the wire
        len: usize,
    },
}

impl Display for DeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DeError::Truncated => write!(
                f,
                "The buffer was not large enough to complete the deserialize operation",
            ),
            DeError::InvalidAttribute { attr, kind, len } => write!(
                f,
                "Attribute {} with payload length {} is not a valid {:?}",
                attr, len, kind
            ),
        }
    }
}

impl Error for DeError {}

/// A reply that parsed correctly but violates the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A mandatory attribute was absent.
    MissingAttribute(&'static str),
    /// The family does not advertise the requested multicast group.
    NoMulticastGroup(String),
    /// The driver aborted the scan this operation was waiting for.
    ScanAborted,
    /// The reply could not be parsed.
    De(DeError),
}

err_from!(ProtocolError, DeError { ProtocolError::De });

impl Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ProtocolError::MissingAttribute(name) => write!(f, "No {} attribute", name),
            ProtocolError::NoMulticastGroup(ref name) => {
                write!(f, "No {} multicast group in generic netlink nl80211", name)
            }
            ProtocolError::ScanAborted => write!(f, "Scan was aborted by the driver"),
            ProtocolError::De(ref e) => write!(f, "Malformed reply: {}", e),
        }
    }
}

impl Error for ProtocolError {}

/// General error for all operations of this crate
#[derive(Debug)]
pub enum WifiError {
    /// The interface name does not resolve to an interface index.
    NoSuchInterface(String),
    /// The transport failed or the kernel replied with an error.
    Socket(SocketError),
    /// A request could not be built.
    Ser(SerError),
    /// A reply did not satisfy the protocol.
    Protocol(ProtocolError),
}

err_from!(
    WifiError,
    SocketError { WifiError::Socket },
    SerError { WifiError::Ser },
    ProtocolError { WifiError::Protocol },
    DeError { |e| WifiError::Protocol(ProtocolError::De(e)) },
    io::Error { |e| WifiError::Socket(SocketError::Io(e)) },
    Nlmsgerr { |e| WifiError::Socket(SocketError::Nlmsgerr(e)) }
);

impl WifiError {
    /// Returns true if the kernel refused the request because the
    /// device is busy. Retrying later is up to the caller.
    pub fn is_busy(&self) -> bool {
        matches!(self, WifiError::Socket(SocketError::Nlmsgerr(e)) if e.is_busy())
    }
}

impl Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            WifiError::NoSuchInterface(ref name) => {
                write!(f, "Incorrect network interface {}", name)
            }
            WifiError::Socket(ref e) => write!(f, "{}", e),
            WifiError::Ser(ref e) => write!(f, "Serialization error: {}", e),
            WifiError::Protocol(ref e) => write!(f, "Protocol error: {}", e),
        }
    }
}

impl Error for WifiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            WifiError::NoSuchInterface(_) => None,
            WifiError::Socket(ref e) => Some(e),
            WifiError::Ser(ref e) => Some(e),
            WifiError::Protocol(ref e) => Some(e),
        }
    }
}

/// A BSS sub-field that could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedPayload {
    /// The BSSID attribute does not hold exactly six bytes.
    BssidLength(usize),
    /// The information elements are too short to hold an element
    /// header.
    IeTooShort(usize),
    /// The first information element is not the SSID element.
    NotSsidElement(u8),
    /// The SSID element declares more than 32 bytes.
    SsidTooLong(u8),
    /// The SSID element declares more bytes than are present.
    SsidTruncated {
        /// Length declared by the element
        declared: u8,
        /// Bytes available after the element header
        available: usize,
    },
}

impl Display for MalformedPayload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MalformedPayload::BssidLength(len) => {
                write!(f, "BSSID length {} != {}, ignoring", len, crate::bss::BSSID_LENGTH)
            }
            MalformedPayload::IeTooShort(len) => {
                write!(f, "Information elements of length {} hold no SSID", len)
            }
            MalformedPayload::NotSsidElement(id) => {
                write!(f, "Information elements start with element {} instead of SSID", id)
            }
            MalformedPayload::SsidTooLong(len) => {
                write!(f, "SSID length {} > {}", len, crate::bss::SSID_MAX_LENGTH)
            }
            MalformedPayload::SsidTruncated {
                declared,
                available,
            } => write!(
                f,
                "SSID length {} exceeds the {} bytes left in the information elements",
                declared, available
            ),
        }
    }
}
