//! Statistics of the station (access point) the interface is
//! connected to, read with `NL80211_CMD_GET_STATION`.

use log::debug;

use crate::{
    attr::{AttrKind, AttrRule, AttrTable, Policy},
    bss::{BssStatus, Ssid, BSSID_LENGTH},
    channel::{HandlerStatus, NetlinkChannel},
    consts::{nl::NlmF, Nl80211Attr, Nl80211Cmd, Nl80211StaInfo},
    err::WifiError,
    nl::GenlMessage,
    socket::Transport,
};

static STATION_POLICY: Policy = Policy::new(
    21,
    // STA_INFO
    &[AttrRule::new(21, AttrKind::Nested)],
);

static STA_INFO_POLICY: Policy = Policy::new(
    10,
    &[
        // SIGNAL
        AttrRule::new(7, AttrKind::U8),
        // RX_PACKETS
        AttrRule::new(9, AttrKind::U32),
        // TX_PACKETS
        AttrRule::new(10, AttrKind::U32),
    ],
);

/// Link statistics of the connected station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StationInfo {
    /// MAC address of the station
    pub bssid: [u8; BSSID_LENGTH],
    /// Network name
    pub ssid: Ssid,
    /// Association state, copied from the scan result
    pub status: BssStatus,
    /// Signal strength of the last received frame in dBm
    pub signal_dbm: i8,
    /// Packets received from the station
    pub rx_packets: u32,
    /// Packets sent to the station
    pub tx_packets: u32,
}

/// Query the statistics of the station with address `bssid` and
/// write the fields the kernel reports into `station`.
pub fn get_station<S>(
    channel: &mut NetlinkChannel<S>,
    bssid: &[u8; BSSID_LENGTH],
    station: &mut StationInfo,
) -> Result<(), WifiError>
where
    S: Transport,
{
    let family_id = channel.family_id();
    let ifindex = channel.ifindex();
    channel
        .request(
            family_id,
            NlmF::REQUEST | NlmF::ACK,
            Nl80211Cmd::GetStation.into(),
        )?
        .put_u32(Nl80211Attr::Ifindex, ifindex)?
        .put_bytes(Nl80211Attr::Mac, bssid)?
        .send()?;
    channel.receive_and_dispatch(|msg| handle_new_station(msg, station))
}

fn handle_new_station(
    msg: &GenlMessage<'_>,
    station: &mut StationInfo,
) -> Result<HandlerStatus, WifiError> {
    if msg.nl80211_cmd() != Nl80211Cmd::NewStation {
        debug!(
            "Ignoring generic netlink command type {} seq {} pid {} genl cmd {}",
            msg.header().nl_type(),
            msg.header().nl_seq(),
            msg.header().nl_pid(),
            msg.cmd()
        );
        return Ok(HandlerStatus::Continue);
    }

    let table = AttrTable::parse(msg.attrs(), &STATION_POLICY)?;
    let sta_info = match table.get(Nl80211Attr::StaInfo) {
        Some(sta_info) => AttrTable::parse_nested(&sta_info, &STA_INFO_POLICY)?,
        None => return Ok(HandlerStatus::Continue),
    };
    if let Some(signal) = sta_info.get(Nl80211StaInfo::Signal) {
        station.signal_dbm = signal.get_u8()? as i8;
    }
    if let Some(rx) = sta_info.get(Nl80211StaInfo::RxPackets) {
        station.rx_packets = rx.get_u32()?;
    }
    if let Some(tx) = sta_info.get(Nl80211StaInfo::TxPackets) {
        station.tx_packets = tx.get_u32()?;
    }
    Ok(HandlerStatus::Continue)
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::test::*;

    fn new_station(seq: u32, sta_info: &[u8]) -> Vec<u8> {
        let mut attrs = attr(3, &3u32.to_ne_bytes());
        attrs.extend(attr(6, &[2; 6]));
        attrs.extend(attr(21, sta_info));
        let mut datagram = genl_msg(0x1c, 0, seq, MOCK_PID, 19, &attrs);
        datagram.extend(ack(seq, MOCK_PID));
        datagram
    }

    #[test]
    fn test_get_station() {
        setup();
        let mock = MockTransport::new();
        let mut channel = NetlinkChannel::new(mock.clone(), 3, crate::MAX_NL_LENGTH);
        channel.set_family_id(0x1c);

        let mut sta_info = attr(7, &[(-52i8) as u8]);
        sta_info.extend(attr(9, &100u32.to_ne_bytes()));
        sta_info.extend(attr(10, &50u32.to_ne_bytes()));
        mock.push(new_station(1, &sta_info));

        let mut station = StationInfo::default();
        get_station(&mut channel, &[2; 6], &mut station).unwrap();
        assert_eq!(station.signal_dbm, -52);
        assert_eq!(station.rx_packets, 100);
        assert_eq!(station.tx_packets, 50);

        let sent = mock.sent();
        assert_eq!(sent[0][16], u8::from(Nl80211Cmd::GetStation));
        assert_eq!(&sent[0][20..], &[attr(3, &3u32.to_ne_bytes()), attr(6, &[2; 6])].concat()[..]);
    }

    #[test]
    fn test_missing_fields_keep_values() {
        setup();
        let mock = MockTransport::new();
        let mut channel = NetlinkChannel::new(mock.clone(), 3, crate::MAX_NL_LENGTH);
        mock.push(new_station(1, &attr(9, &7u32.to_ne_bytes())));

        let mut station = StationInfo {
            signal_dbm: -30,
            tx_packets: 9,
            ..Default::default()
        };
        get_station(&mut channel, &[2; 6], &mut station).unwrap();
        assert_eq!(station.signal_dbm, -30);
        assert_eq!(station.rx_packets, 7);
        assert_eq!(station.tx_packets, 9);
    }

    #[test]
    fn test_invalid_signal_rejected() {
        setup();
        let mock = MockTransport::new();
        let mut channel = NetlinkChannel::new(mock.clone(), 3, crate::MAX_NL_LENGTH);
        mock.push(new_station(1, &attr(7, &[1, 2])));

        let mut station = StationInfo::default();
        assert!(get_station(&mut channel, &[2; 6], &mut station).is_err());
        assert_eq!(channel.sequence(), 2);
    }
}
