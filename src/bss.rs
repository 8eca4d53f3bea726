//! Parsing of `NL80211_CMD_NEW_SCAN_RESULTS` messages into
//! [`BssInfo`] records.
//!
//! A scan dump sends one message per BSS. [`ScanResults`] places the
//! records into a caller supplied slice with a fixed capacity:
//!
//! * Every BSS is counted, including the ones that do not fit.
//! * The BSS the interface is associated with (or joined, for IBSS)
//!   always lands in slot 0. Whatever was in slot 0 moves to the end
//!   of the filled region if there is room.
//! * Other records fill the slice in arrival order and are dropped
//!   once it is full.
//!
//! Malformed BSSID and SSID fields are not fatal. The field is zeroed
//! and the problem is logged at warn level.

use std::fmt;

use log::{debug, warn};

use crate::{
    attr::{Attr, AttrKind, AttrRule, AttrTable, Policy},
    channel::HandlerStatus,
    consts::{Nl80211Attr, Nl80211Bss, Nl80211BssStatus, Nl80211Cmd},
    err::{MalformedPayload, WifiError},
    nl::GenlMessage,
};

/// Length of a BSSID (MAC address).
pub const BSSID_LENGTH: usize = 6;

/// Longest SSID allowed by IEEE 802.11.
pub const SSID_MAX_LENGTH: usize = 32;

const SSID_ELEMENT_ID: u8 = 0;

static SCAN_RESULTS_POLICY: Policy = Policy::new(
    47,
    &[
        // IFINDEX
        AttrRule::new(3, AttrKind::U32),
        // SCAN_SSIDS
        AttrRule::new(45, AttrKind::Nested),
        // BSS
        AttrRule::new(47, AttrKind::Nested),
    ],
);

static BSS_POLICY: Policy = Policy::new(
    11,
    &[
        // BSSID
        AttrRule::with_len(1, AttrKind::Binary, BSSID_LENGTH),
        // FREQUENCY
        AttrRule::new(2, AttrKind::U32),
        // INFORMATION_ELEMENTS
        AttrRule::new(6, AttrKind::Binary),
        // SIGNAL_MBM
        AttrRule::new(7, AttrKind::U32),
        // STATUS
        AttrRule::new(9, AttrKind::U32),
        // SEEN_MS_AGO
        AttrRule::new(10, AttrKind::U32),
    ],
);

/// Association state of the interface with a BSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BssStatus {
    /// Not authenticated or associated
    #[default]
    None,
    /// Authenticated but not associated
    Authenticated,
    /// Associated
    Associated,
    /// Joined an ad-hoc network
    IbssJoined,
}

impl BssStatus {
    /// Returns true if this is the network the interface is
    /// currently connected to.
    pub fn is_connected(&self) -> bool {
        matches!(self, BssStatus::Associated | BssStatus::IbssJoined)
    }
}

impl From<Nl80211BssStatus> for BssStatus {
    fn from(status: Nl80211BssStatus) -> Self {
        match status {
            Nl80211BssStatus::Authenticated => BssStatus::Authenticated,
            Nl80211BssStatus::Associated => BssStatus::Associated,
            Nl80211BssStatus::IbssJoined => BssStatus::IbssJoined,
            Nl80211BssStatus::UnrecognizedVariant(_) => BssStatus::None,
        }
    }
}

/// Network name, at most [`SSID_MAX_LENGTH`] bytes. SSIDs are
/// arbitrary bytes and need not be UTF-8.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ssid {
    len: u8,
    bytes: [u8; SSID_MAX_LENGTH],
}

impl Ssid {
    /// Create an SSID from its bytes, or [`None`] if there are more
    /// than [`SSID_MAX_LENGTH`].
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > SSID_MAX_LENGTH {
            return None;
        }
        let mut ssid = Ssid::default();
        ssid.bytes[..bytes.len()].copy_from_slice(bytes);
        ssid.len = bytes.len() as u8;
        Some(ssid)
    }

    /// Raw SSID bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Returns true for a hidden or unparseable SSID.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for Ssid {
    fn default() -> Self {
        Ssid {
            len: 0,
            bytes: [0; SSID_MAX_LENGTH],
        }
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ssid({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}

/// One network seen by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BssInfo {
    /// MAC address of the access point
    pub bssid: [u8; BSSID_LENGTH],
    /// Channel frequency in MHz
    pub frequency: u32,
    /// Network name
    pub ssid: Ssid,
    /// Signal strength in mBm (100 * dBm)
    pub signal_mbm: i32,
    /// Milliseconds since the BSS was last seen
    pub seen_ms_ago: u32,
    /// Association state of the interface with this BSS
    pub status: BssStatus,
}

/// Decode a BSSID attribute payload. Anything but exactly
/// [`BSSID_LENGTH`] bytes yields an all zero address.
pub fn parse_bssid(payload: &[u8]) -> [u8; BSSID_LENGTH] {
    let mut bssid = [0; BSSID_LENGTH];
    if payload.len() == BSSID_LENGTH {
        bssid.copy_from_slice(payload);
    } else {
        warn!("{}", MalformedPayload::BssidLength(payload.len()));
    }
    bssid
}

/// Extract the SSID from information elements. Only a leading SSID
/// element is accepted; anything else yields an empty SSID.
pub fn parse_information_elements(payload: &[u8]) -> Ssid {
    match ssid_element(payload) {
        Ok(ssid) => ssid,
        Err(e) => {
            warn!("{}", e);
            Ssid::default()
        }
    }
}

fn ssid_element(payload: &[u8]) -> Result<Ssid, MalformedPayload> {
    let (id, declared, rest) = match payload {
        [id, len, rest @ ..] => (*id, *len, rest),
        _ => return Err(MalformedPayload::IeTooShort(payload.len())),
    };
    if id != SSID_ELEMENT_ID {
        return Err(MalformedPayload::NotSsidElement(id));
    }
    if declared as usize > SSID_MAX_LENGTH {
        return Err(MalformedPayload::SsidTooLong(declared));
    }
    if declared as usize > rest.len() {
        return Err(MalformedPayload::SsidTruncated {
            declared,
            available: rest.len(),
        });
    }
    Ssid::from_bytes(&rest[..declared as usize]).ok_or(MalformedPayload::SsidTooLong(declared))
}

/// Accumulates the BSS records of a scan dump into a bounded slice.
pub struct ScanResults<'b> {
    bss_infos: &'b mut [BssInfo],
    scanned: usize,
}

impl<'b> ScanResults<'b> {
    /// Start accumulating into `bss_infos`.
    pub fn new(bss_infos: &'b mut [BssInfo]) -> Self {
        ScanResults {
            bss_infos,
            scanned: 0,
        }
    }

    /// Number of BSS records seen so far, which may exceed the
    /// capacity of the slice.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Response handler for the scan dump.
    pub fn handle(&mut self, msg: &GenlMessage<'_>) -> Result<HandlerStatus, WifiError> {
        if msg.nl80211_cmd() != Nl80211Cmd::NewScanResults {
            debug!(
                "Ignoring generic netlink command type {} seq {} pid {} genl cmd {}",
                msg.header().nl_type(),
                msg.header().nl_seq(),
                msg.header().nl_pid(),
                msg.cmd()
            );
            return Ok(HandlerStatus::Continue);
        }
        let table = AttrTable::parse(msg.attrs(), &SCAN_RESULTS_POLICY)?;
        if let Some(bss) = table.get(Nl80211Attr::Bss) {
            self.place(&bss)?;
        }
        Ok(HandlerStatus::Continue)
    }

    fn place(&mut self, bss: &Attr<'_>) -> Result<(), WifiError> {
        let table = AttrTable::parse_nested(bss, &BSS_POLICY)?;
        let status = match table.get(Nl80211Bss::Status) {
            Some(status) => BssStatus::from(Nl80211BssStatus::from(status.get_u32()?)),
            None => BssStatus::None,
        };

        let capacity = self.bss_infos.len();
        let mut target = self.scanned;
        if status.is_connected() {
            if self.scanned > 0 && self.scanned < capacity {
                self.bss_infos[self.scanned] = self.bss_infos[0];
            }
            target = 0;
        }
        if capacity == 0 || (target != 0 && self.scanned >= capacity) {
            self.scanned += 1;
            return Ok(());
        }

        let info = &mut self.bss_infos[target];
        if let Some(bssid) = table.get(Nl80211Bss::Bssid) {
            info.bssid = parse_bssid(bssid.payload());
        }
        if let Some(frequency) = table.get(Nl80211Bss::Frequency) {
            info.frequency = frequency.get_u32()?;
        }
        if let Some(ies) = table.get(Nl80211Bss::InformationElements) {
            info.ssid = parse_information_elements(ies.payload());
        }
        if let Some(signal) = table.get(Nl80211Bss::SignalMbm) {
            info.signal_mbm = signal.get_u32()? as i32;
        }
        if let Some(seen) = table.get(Nl80211Bss::SeenMsAgo) {
            info.seen_ms_ago = seen.get_u32()?;
        }
        info.status = status;

        self.scanned += 1;
        Ok(())
    }
}
