//! Shared fixtures for unit tests: a scripted transport and helpers
//! that encode the netlink messages a kernel would send.

use std::{cell::RefCell, collections::VecDeque, io, rc::Rc};

use crate::{
    channel::NetlinkChannel,
    config::ScanConfig,
    consts::{alignto, CtrlAttr, CtrlAttrMcastGrp, CtrlCmd, GENL_ID_CTRL},
    scan::WifiScan,
    socket::Transport,
    MAX_NL_LENGTH,
};

pub const MOCK_PID: u32 = 4242;

pub fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug)]
enum Scripted {
    Datagram(Vec<u8>),
    WouldBlock,
}

#[derive(Debug, Default)]
struct MockState {
    inbox: VecDeque<Scripted>,
    sent: Vec<Vec<u8>>,
    groups: Vec<u32>,
    nonblocking: bool,
}

/// Transport replaying queued datagrams and recording what is sent.
/// Clones share state so a test can keep a handle after moving one
/// into a channel.
#[derive(Debug, Clone, Default)]
pub struct MockTransport(Rc<RefCell<MockState>>);

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    pub fn push(&self, datagram: Vec<u8>) {
        self.0
            .borrow_mut()
            .inbox
            .push_back(Scripted::Datagram(datagram));
    }

    /// Queue an empty read, as a non-blocking socket would report
    /// once everything queued so far has been read.
    pub fn push_would_block(&self) {
        self.0.borrow_mut().inbox.push_back(Scripted::WouldBlock);
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().inbox.len()
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.0.borrow().sent.clone()
    }

    /// Generic netlink commands of every request sent so far.
    pub fn sent_cmds(&self) -> Vec<u8> {
        self.0.borrow().sent.iter().map(|req| req[16]).collect()
    }

    pub fn groups(&self) -> Vec<u32> {
        self.0.borrow().groups.clone()
    }

    pub fn is_nonblocking(&self) -> bool {
        self.0.borrow().nonblocking
    }
}

impl Transport for MockTransport {
    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().sent.push(buf.to_vec());
        Ok(buf.len())
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.0.borrow_mut();
        match state.inbox.pop_front() {
            Some(Scripted::Datagram(datagram)) => {
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok(len)
            }
            Some(Scripted::WouldBlock) => Err(io::Error::from(io::ErrorKind::WouldBlock)),
            None if state.nonblocking => Err(io::Error::from(io::ErrorKind::WouldBlock)),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no scripted datagram left",
            )),
        }
    }

    fn pid(&self) -> u32 {
        MOCK_PID
    }

    fn add_mcast_membership(&self, group: u32) -> io::Result<()> {
        self.0.borrow_mut().groups.push(group);
        Ok(())
    }

    fn block(&self) -> io::Result<()> {
        self.0.borrow_mut().nonblocking = false;
        Ok(())
    }

    fn nonblock(&self) -> io::Result<()> {
        self.0.borrow_mut().nonblocking = true;
        Ok(())
    }
}

/// Encode one attribute including trailing padding.
pub fn attr(nla_type: u16, payload: &[u8]) -> Vec<u8> {
    let nla_len = 4 + payload.len();
    let mut buf = Vec::with_capacity(alignto(nla_len));
    buf.extend(&(nla_len as u16).to_ne_bytes());
    buf.extend(&nla_type.to_ne_bytes());
    buf.extend(payload);
    buf.resize(alignto(nla_len), 0);
    buf
}

fn nlmsg(nl_type: u16, flags: u16, seq: u32, pid: u32, body: &[u8]) -> Vec<u8> {
    let nl_len = 16 + body.len();
    let mut buf = Vec::with_capacity(alignto(nl_len));
    buf.extend(&(nl_len as u32).to_ne_bytes());
    buf.extend(&nl_type.to_ne_bytes());
    buf.extend(&flags.to_ne_bytes());
    buf.extend(&seq.to_ne_bytes());
    buf.extend(&pid.to_ne_bytes());
    buf.extend(body);
    buf.resize(alignto(nl_len), 0);
    buf
}

/// Encode a generic netlink message.
pub fn genl_msg(nl_type: u16, flags: u16, seq: u32, pid: u32, cmd: u8, attrs: &[u8]) -> Vec<u8> {
    let mut body = vec![cmd, 1, 0, 0];
    body.extend(attrs);
    nlmsg(nl_type, flags, seq, pid, &body)
}

/// Encode an `NLMSG_ERROR` for the positive `errno`.
pub fn err(errno: i32, seq: u32, pid: u32) -> Vec<u8> {
    let mut body = (-errno).to_ne_bytes().to_vec();
    body.extend(&[0u8; 16]);
    nlmsg(libc::NLMSG_ERROR as u16, 0, seq, pid, &body)
}

pub fn ack(seq: u32, pid: u32) -> Vec<u8> {
    err(0, seq, pid)
}

pub fn done(seq: u32, pid: u32) -> Vec<u8> {
    nlmsg(
        libc::NLMSG_DONE as u16,
        libc::NLM_F_MULTI as u16,
        seq,
        pid,
        &0i32.to_ne_bytes(),
    )
}

/// Encode the attributes of a scan result carrying one BSS whose
/// address is `[id; 6]`.
pub fn bss(id: u8, status: Option<u32>) -> Vec<u8> {
    let mut attrs = attr(1, &[id; 6]);
    attrs.extend(attr(2, &(2412u32 + id as u32).to_ne_bytes()));
    attrs.extend(attr(6, &[0, 3, b'n', b'e', b't', 1, 1, 0x82]));
    attrs.extend(attr(7, &(-4200i32).to_ne_bytes()));
    attrs.extend(attr(10, &(id as u32 * 10).to_ne_bytes()));
    if let Some(status) = status {
        attrs.extend(attr(9, &status.to_ne_bytes()));
    }
    let mut envelope = attr(3, &3u32.to_ne_bytes());
    envelope.extend(attr(47, &attrs));
    envelope
}

/// Encode an `nlctrl` reply for the `nl80211` family with ID `0x1c`
/// and the given multicast groups, followed by an acknowledgement.
pub fn family_reply(seq: u32, groups: &[(&[u8], Option<u32>)]) -> Vec<u8> {
    let mut attrs = attr(CtrlAttr::FamilyName.into(), b"nl80211\0");
    attrs.extend(attr(CtrlAttr::FamilyId.into(), &0x1cu16.to_ne_bytes()));
    let mut nested = Vec::new();
    for (i, (name, id)) in groups.iter().enumerate() {
        let mut entry = attr(CtrlAttrMcastGrp::Name.into(), name);
        if let Some(id) = id {
            entry.extend(attr(CtrlAttrMcastGrp::Id.into(), &id.to_ne_bytes()));
        }
        nested.extend(attr(i as u16 + 1, &entry));
    }
    attrs.extend(attr(CtrlAttr::McastGroups.into(), &nested));
    let mut datagram = genl_msg(
        GENL_ID_CTRL,
        0,
        seq,
        MOCK_PID,
        CtrlCmd::Newfamily.into(),
        &attrs,
    );
    datagram.extend(ack(seq, MOCK_PID));
    datagram
}

/// Multicast group ID advertised for `scan` by [`family_reply`] in
/// [`wifi_scan`].
pub const SCAN_GROUP: u32 = 5;

/// Build a handle over two scripted transports, scripting the family
/// resolution on `notifications`.
pub fn wifi_scan(
    notifications: &MockTransport,
    commands: &MockTransport,
) -> WifiScan<MockTransport> {
    setup();
    notifications.push(family_reply(
        1,
        &[(&b"config\0"[..], Some(4)), (&b"scan\0"[..], Some(SCAN_GROUP))],
    ));
    let mut transports = vec![commands.clone(), notifications.clone()];
    WifiScan::init(&ScanConfig::default(), || {
        let transport = transports.pop().expect("only two channels are opened");
        Ok(NetlinkChannel::new(transport, 3, MAX_NL_LENGTH))
    })
    .unwrap()
}
