//! The scan protocol and the [`WifiScan`] handle that runs it.
//!
//! # Channels
//!
//! A handle owns two sockets. The notification channel is subscribed
//! to the `nl80211` scan multicast group and only ever reads events.
//! The command channel carries the requests and their replies. Using
//! separate sockets keeps multicast events from interleaving with the
//! replies of a dump.
//!
//! # Cooperating with other processes
//!
//! Any process may trigger a scan on a device, and the kernel refuses
//! a second trigger while one is running. [`WifiScan::scan_all`]
//! therefore first reads the scan events that queued up since the
//! last call:
//!
//! * If a scan was triggered by someone else, it waits for that scan
//!   instead of triggering a new one.
//! * If fresh results are already available, it dumps them right
//!   away.
//! * Otherwise it triggers a scan. A device that is busy with other
//!   radio work makes this fail with `EBUSY`, see
//!   [`WifiError::is_busy`].

use getset::Getters;
use log::debug;

use crate::{
    bss::{BssInfo, ScanResults},
    channel::{HandlerStatus, NetlinkChannel},
    config::ScanConfig,
    consts::{nl::NlmF, Nl80211Attr, Nl80211Cmd},
    err::{ProtocolError, WifiError},
    family,
    nl::GenlMessage,
    socket::{NlSocket, Transport},
    station::{self, StationInfo},
};

/// Progress of a scan as observed through multicast events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    scan_triggered: bool,
    new_scan_results: bool,
}

impl ScanState {
    /// Returns true if a scan is known to be running.
    pub fn scan_triggered(&self) -> bool {
        self.scan_triggered
    }

    /// Returns true if results of a finished scan are available.
    pub fn new_scan_results(&self) -> bool {
        self.new_scan_results
    }

    /// Notification handler. While `waiting` for results, an aborted
    /// scan is an error; otherwise it only means a new scan must be
    /// triggered.
    pub fn handle(
        &mut self,
        msg: &GenlMessage<'_>,
        waiting: bool,
    ) -> Result<HandlerStatus, WifiError> {
        match msg.nl80211_cmd() {
            Nl80211Cmd::TriggerScan => self.scan_triggered = true,
            Nl80211Cmd::NewScanResults if msg.header().is_multicast() => {
                self.new_scan_results = true
            }
            Nl80211Cmd::ScanAborted if msg.header().is_multicast() => {
                if waiting {
                    return Err(ProtocolError::ScanAborted.into());
                }
                debug!("Pending scan was aborted");
                self.scan_triggered = false;
            }
            _ => debug!(
                "Ignoring generic netlink command type {} seq {} pid {} genl cmd {}",
                msg.header().nl_type(),
                msg.header().nl_seq(),
                msg.header().nl_pid(),
                msg.cmd()
            ),
        }
        Ok(HandlerStatus::Continue)
    }
}

/// Handle for scanning with one wireless interface.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct WifiScan<S = NlSocket> {
    /// Channel subscribed to scan events
    notification_channel: NetlinkChannel<S>,
    /// Channel for requests
    command_channel: NetlinkChannel<S>,
}

impl WifiScan<NlSocket> {
    /// Open a handle for the interface named `interface` with the
    /// default [`ScanConfig`].
    pub fn new(interface: &str) -> Result<Self, WifiError> {
        WifiScan::with_config(interface, &ScanConfig::default())
    }

    /// Open a handle for the interface named `interface`.
    pub fn with_config(interface: &str, config: &ScanConfig) -> Result<Self, WifiError> {
        WifiScan::init(config, || {
            NetlinkChannel::open(interface, config.buffer_size())
        })
    }
}

impl<S> WifiScan<S>
where
    S: Transport,
{
    /// Build a handle from channels created by `open`, which is called
    /// once for the notification channel and once for the command
    /// channel.
    ///
    /// The family is resolved on the notification channel before the
    /// command channel is opened. Channels opened before a failure
    /// are closed when dropped.
    pub fn init<F>(config: &ScanConfig, mut open: F) -> Result<Self, WifiError>
    where
        F: FnMut() -> Result<NetlinkChannel<S>, WifiError>,
    {
        let mut notification_channel = open()?;
        let ids = family::resolve(
            &mut notification_channel,
            config.family_name(),
            config.scan_group(),
        )?;
        notification_channel.set_family_id(ids.family_id());

        let mut command_channel = open()?;
        command_channel.set_family_id(ids.family_id());

        notification_channel.subscribe(ids.group_id())?;

        Ok(WifiScan {
            notification_channel,
            command_channel,
        })
    }

    /// Scan, or join a scan already in progress, and fill `bss_infos`
    /// with the results.
    ///
    /// Returns the number of BSS records the kernel reported, which
    /// may be larger than `bss_infos`. The associated BSS, if any, is
    /// always first.
    pub fn scan_all(&mut self, bss_infos: &mut [BssInfo]) -> Result<usize, WifiError> {
        let mut state = ScanState::default();
        self.read_past_notifications(&mut state)?;
        if !state.scan_triggered && !state.new_scan_results {
            self.trigger_scan()?;
        }
        self.wait_for_new_scan_results(&mut state)?;
        get_scan(&mut self.command_channel, bss_infos)
    }

    /// Read statistics of the station the interface is connected to.
    ///
    /// Uses the cached scan results rather than starting a new scan.
    /// Returns [`None`] if the interface is not connected.
    pub fn scan_station(&mut self) -> Result<Option<StationInfo>, WifiError> {
        let mut station = StationInfo::default();
        Ok(if self.scan_station_into(&mut station)? {
            Some(station)
        } else {
            None
        })
    }

    /// Like [`WifiScan::scan_station`], but fields the kernel does not
    /// report keep the value they have in `station`. Returns false if
    /// the interface is not connected.
    pub fn scan_station_into(&mut self, station: &mut StationInfo) -> Result<bool, WifiError> {
        let mut bss = [BssInfo::default(); 1];
        let scanned = get_scan(&mut self.command_channel, &mut bss)?;
        let bss = &bss[0];
        if scanned == 0 || !bss.status.is_connected() {
            debug!("Interface is not connected to any station");
            return Ok(false);
        }

        station::get_station(&mut self.command_channel, &bss.bssid, station)?;
        station.bssid = bss.bssid;
        station.ssid = bss.ssid;
        station.status = bss.status;
        Ok(true)
    }

    fn read_past_notifications(&mut self, state: &mut ScanState) -> Result<(), WifiError> {
        self.notification_channel.nonblock()?;
        let drained = self.drain_notifications(state);
        let restored = self.notification_channel.block();
        drained?;
        restored
    }

    fn drain_notifications(&mut self, state: &mut ScanState) -> Result<(), WifiError> {
        while self
            .notification_channel
            .receive_notifications(|msg| state.handle(msg, false))?
        {}
        debug!("Scan state after reading past notifications: {:?}", state);
        Ok(())
    }

    fn trigger_scan(&mut self) -> Result<(), WifiError> {
        let family_id = self.command_channel.family_id();
        let ifindex = self.command_channel.ifindex();
        self.command_channel
            .request(
                family_id,
                NlmF::REQUEST | NlmF::ACK,
                Nl80211Cmd::TriggerScan.into(),
            )?
            .put_u32(Nl80211Attr::Ifindex, ifindex)?
            .send()?;
        self.command_channel.receive_and_dispatch(|msg| {
            debug!("Ignoring genl cmd {} in reply to scan trigger", msg.cmd());
            Ok(HandlerStatus::Continue)
        })
    }

    fn wait_for_new_scan_results(&mut self, state: &mut ScanState) -> Result<(), WifiError> {
        while !state.new_scan_results {
            self.notification_channel
                .receive_notifications(|msg| state.handle(msg, true))?;
        }
        Ok(())
    }
}

/// Dump the cached scan results of the channel's interface into
/// `bss_infos`.
fn get_scan<S>(
    channel: &mut NetlinkChannel<S>,
    bss_infos: &mut [BssInfo],
) -> Result<usize, WifiError>
where
    S: Transport,
{
    let family_id = channel.family_id();
    let ifindex = channel.ifindex();
    channel
        .request(
            family_id,
            NlmF::REQUEST | NlmF::DUMP | NlmF::ACK,
            Nl80211Cmd::GetScan.into(),
        )?
        .put_u32(Nl80211Attr::Ifindex, ifindex)?
        .send()?;

    let mut results = ScanResults::new(bss_infos);
    channel.receive_and_dispatch(|msg| results.handle(msg))?;
    Ok(results.scanned())
}
