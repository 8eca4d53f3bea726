//! A netlink channel is one socket together with the state needed to
//! run request/response exchanges over it.
//!
//! # Design decisions
//!
//! * A channel owns a single scratch buffer. Requests are built into
//!   it and responses are received into it, so borrowed attributes
//!   handed to a response handler cannot outlive the next exchange.
//! * Response handlers are closures. Any state a handler fills in is
//!   captured by the closure rather than stored on the channel.
//! * The sequence number advances exactly once per call to
//!   [`NetlinkChannel::receive_and_dispatch`], whether the exchange
//!   succeeded or not, so a late reply to a failed request is
//!   rejected by the sequence check of the next one.

use std::io;

use byteorder::{ByteOrder, NativeEndian};
use getset::{CopyGetters, Getters};
use log::{trace, warn};

use crate::{
    attr::NLA_HDRLEN,
    consts::{alignto, genl::GENL_VERSION, nl::NlmF, socket::NlFamily},
    err::{SerError, SocketError, WifiError},
    iter::NlBufferIter,
    nl::{GenlMessage, Genlmsghdr, NlPayload, Nlmsghdr, GENL_HDRLEN, NLMSG_HDRLEN},
    socket::{NlSocket, Transport},
    utils::interface_index,
};

/// Returned by response handlers to tell the dispatch loop whether
/// more messages are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerStatus {
    /// Keep dispatching messages.
    Continue,
    /// The exchange is complete.
    Stop,
}

/// One bound netlink socket and its request state.
#[derive(Debug, Getters, CopyGetters)]
pub struct NetlinkChannel<S = NlSocket> {
    /// Underlying transport
    #[getset(get = "pub")]
    socket: S,
    buffer: Vec<u8>,
    /// Sequence number the next request will carry
    #[getset(get_copy = "pub")]
    sequence: u32,
    /// Message type of the resolved generic netlink family, 0 until
    /// resolved
    #[getset(get_copy = "pub")]
    family_id: u16,
    /// Index of the network interface requests refer to
    #[getset(get_copy = "pub")]
    ifindex: u32,
}

impl NetlinkChannel<NlSocket> {
    /// Open a generic netlink socket for the interface named
    /// `interface`.
    pub fn open(interface: &str, buffer_size: usize) -> Result<Self, WifiError> {
        let ifindex = interface_index(interface)
            .ok_or_else(|| WifiError::NoSuchInterface(interface.to_string()))?;
        let socket = NlSocket::connect(NlFamily::Generic, None)?;
        Ok(NetlinkChannel::new(socket, ifindex, buffer_size))
    }
}

impl<S> NetlinkChannel<S>
where
    S: Transport,
{
    /// Wrap an already bound transport.
    pub fn new(socket: S, ifindex: u32, buffer_size: usize) -> Self {
        NetlinkChannel {
            socket,
            buffer: vec![0; buffer_size],
            sequence: 1,
            family_id: 0,
            ifindex,
        }
    }

    /// Set the message type used for family requests.
    pub fn set_family_id(&mut self, family_id: u16) {
        self.family_id = family_id;
    }

    /// Start a request by writing the netlink and generic netlink
    /// headers into the channel buffer.
    pub fn request(
        &mut self,
        nl_type: u16,
        flags: NlmF,
        cmd: u8,
    ) -> Result<RequestBuilder<'_, S>, SerError> {
        Nlmsghdr::new(0, nl_type, flags, self.sequence, 0).write(&mut self.buffer)?;
        let genlhdr = self
            .buffer
            .get_mut(NLMSG_HDRLEN..)
            .ok_or(SerError::UnexpectedEOB)?;
        Genlmsghdr::new(cmd, GENL_VERSION).write(genlhdr)?;
        Ok(RequestBuilder {
            channel: self,
            len: NLMSG_HDRLEN + GENL_HDRLEN,
        })
    }

    /// Receive responses to the last request and pass every generic
    /// netlink message to `handler` until the exchange ends with an
    /// acknowledgement, the end of a dump, an error, or `handler`
    /// returning [`HandlerStatus::Stop`].
    pub fn receive_and_dispatch<F>(&mut self, mut handler: F) -> Result<(), WifiError>
    where
        F: FnMut(&GenlMessage<'_>) -> Result<HandlerStatus, WifiError>,
    {
        let result = self.dispatch_replies(&mut handler);
        self.sequence = self.sequence.wrapping_add(1);
        result
    }

    fn dispatch_replies<F>(&mut self, handler: &mut F) -> Result<(), WifiError>
    where
        F: FnMut(&GenlMessage<'_>) -> Result<HandlerStatus, WifiError>,
    {
        let pid = self.socket.pid();
        loop {
            let len = self.socket.recv(&mut self.buffer)?;
            if len == 0 {
                return Err(SocketError::Closed.into());
            }
            trace!("Buffer received: {:?}", &self.buffer[..len]);
            if run_callbacks(&self.buffer[..len], self.sequence, pid, handler)?
                == HandlerStatus::Stop
            {
                return Ok(());
            }
        }
    }

    /// Receive one datagram of multicast notifications and pass its
    /// messages to `handler`.
    ///
    /// Returns `false` if the socket is non-blocking and nothing was
    /// queued. Notifications are not matched against the sequence
    /// number or port ID and do not advance the sequence number.
    pub fn receive_notifications<F>(&mut self, mut handler: F) -> Result<bool, WifiError>
    where
        F: FnMut(&GenlMessage<'_>) -> Result<HandlerStatus, WifiError>,
    {
        let len = match self.socket.recv(&mut self.buffer) {
            Ok(0) => return Err(SocketError::Closed.into()),
            Ok(len) => len,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        trace!("Notification received: {:?}", &self.buffer[..len]);
        run_callbacks(&self.buffer[..len], 0, 0, &mut handler)?;
        Ok(true)
    }

    /// Join the multicast group with ID `group`.
    pub fn subscribe(&self, group: u32) -> Result<(), WifiError> {
        Ok(self.socket.add_mcast_membership(group)?)
    }

    /// Make receives block until data arrives.
    pub fn block(&self) -> Result<(), WifiError> {
        Ok(self.socket.block()?)
    }

    /// Make receives return immediately when nothing is queued.
    pub fn nonblock(&self) -> Result<(), WifiError> {
        Ok(self.socket.nonblock()?)
    }
}

/// Walk the messages of one datagram. A zero `seq` or `pid` disables
/// the corresponding check.
fn run_callbacks<F>(
    buf: &[u8],
    seq: u32,
    pid: u32,
    handler: &mut F,
) -> Result<HandlerStatus, WifiError>
where
    F: FnMut(&GenlMessage<'_>) -> Result<HandlerStatus, WifiError>,
{
    for message in NlBufferIter::new(buf) {
        let (header, payload) = message?;
        let pid_ok = header.nl_pid() == 0 || pid == 0 || header.nl_pid() == pid;
        let seq_ok = header.nl_seq() == 0 || seq == 0 || header.nl_seq() == seq;
        if !pid_ok || !seq_ok {
            return Err(SocketError::BadSeqOrPid {
                seq: header.nl_seq(),
                pid: header.nl_pid(),
            }
            .into());
        }
        if header.nl_flags().contains(NlmF::DUMP_INTR) {
            return Err(SocketError::DumpInterrupted.into());
        }
        match payload {
            NlPayload::Payload(msg) => {
                if handler(&msg)? == HandlerStatus::Stop {
                    return Ok(HandlerStatus::Stop);
                }
            }
            NlPayload::Ack | NlPayload::Done => return Ok(HandlerStatus::Stop),
            NlPayload::Err(e) => return Err(e.into()),
            NlPayload::Empty => (),
        }
    }
    Ok(HandlerStatus::Continue)
}

/// Appends attributes to a request started with
/// [`NetlinkChannel::request`].
pub struct RequestBuilder<'c, S> {
    channel: &'c mut NetlinkChannel<S>,
    len: usize,
}

impl<'c, S> RequestBuilder<'c, S>
where
    S: Transport,
{
    fn put_attr(mut self, nla_type: u16, payload: &[u8], nul: bool) -> Result<Self, SerError> {
        let nla_len = NLA_HDRLEN + payload.len() + usize::from(nul);
        let header_len = u16::try_from(nla_len).map_err(|_| SerError::UnexpectedEOB)?;
        let end = self.len + alignto(nla_len);
        let buf = self
            .channel
            .buffer
            .get_mut(self.len..end)
            .ok_or(SerError::UnexpectedEOB)?;
        buf.fill(0);
        NativeEndian::write_u16(&mut buf[0..2], header_len);
        NativeEndian::write_u16(&mut buf[2..4], nla_type);
        buf[NLA_HDRLEN..NLA_HDRLEN + payload.len()].copy_from_slice(payload);
        self.len = end;
        Ok(self)
    }

    /// Append a four byte integer attribute.
    pub fn put_u32<T>(self, nla_type: T, value: u32) -> Result<Self, SerError>
    where
        T: Into<u16>,
    {
        self.put_attr(nla_type.into(), &value.to_ne_bytes(), false)
    }

    /// Append a null terminated string attribute.
    pub fn put_strz<T>(self, nla_type: T, value: &str) -> Result<Self, SerError>
    where
        T: Into<u16>,
    {
        if value.as_bytes().contains(&0) {
            return Err(SerError::NullByte);
        }
        self.put_attr(nla_type.into(), value.as_bytes(), true)
    }

    /// Append an attribute with an opaque payload.
    pub fn put_bytes<T>(self, nla_type: T, value: &[u8]) -> Result<Self, SerError>
    where
        T: Into<u16>,
    {
        self.put_attr(nla_type.into(), value, false)
    }

    /// Patch the message length and send the request.
    pub fn send(self) -> Result<(), WifiError> {
        let RequestBuilder { channel, len } = self;
        let nl_len = u32::try_from(len).map_err(|_| SerError::UnexpectedEOB)?;
        NativeEndian::write_u32(&mut channel.buffer[0..4], nl_len);
        let request = &channel.buffer[..len];
        trace!("Buffer sent: {:?}", request);
        if let Err(e) = channel.socket.send(request) {
            warn!("Sending netlink request failed: {}", e);
            return Err(e.into());
        }
        Ok(())
    }
}
