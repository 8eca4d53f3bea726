//! Resolution of a generic netlink family and one of its multicast
//! groups through the `nlctrl` controller.

use getset::CopyGetters;
use log::debug;

use crate::{
    attr::{AttrKind, AttrRule, AttrTable, Policy},
    channel::{HandlerStatus, NetlinkChannel},
    consts::{genl::*, nl::NlmF},
    err::{ProtocolError, WifiError},
    nl::GenlMessage,
    socket::Transport,
};

static FAMILY_POLICY: Policy = Policy::new(
    libc::CTRL_ATTR_MCAST_GROUPS as u16,
    &[
        AttrRule::new(libc::CTRL_ATTR_FAMILY_ID as u16, AttrKind::U16),
        AttrRule::new(libc::CTRL_ATTR_MCAST_GROUPS as u16, AttrKind::Nested),
    ],
);

static MCAST_GROUP_POLICY: Policy = Policy::new(
    libc::CTRL_ATTR_MCAST_GRP_ID as u16,
    &[
        AttrRule::new(libc::CTRL_ATTR_MCAST_GRP_ID as u16, AttrKind::U32),
        AttrRule::new(libc::CTRL_ATTR_MCAST_GRP_NAME as u16, AttrKind::String),
    ],
);

/// Numeric identifiers assigned by the kernel to a family and its
/// multicast group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct FamilyIds {
    /// Message type of the family
    family_id: u16,
    /// Multicast group ID
    group_id: u32,
}

/// Ask `nlctrl` for the IDs of family `family` and its multicast
/// group `group`.
pub fn resolve<S>(
    channel: &mut NetlinkChannel<S>,
    family: &str,
    group: &str,
) -> Result<FamilyIds, WifiError>
where
    S: Transport,
{
    channel
        .request(
            GENL_ID_CTRL,
            NlmF::REQUEST | NlmF::ACK,
            CtrlCmd::Getfamily.into(),
        )?
        .put_u32(CtrlAttr::FamilyId, u32::from(GENL_ID_CTRL))?
        .put_strz(CtrlAttr::FamilyName, family)?
        .send()?;

    let mut family_id = None;
    let mut group_id = None;
    channel.receive_and_dispatch(|msg| {
        parse_family(msg, group, &mut family_id, &mut group_id)?;
        Ok(HandlerStatus::Continue)
    })?;

    let family_id = family_id.ok_or(ProtocolError::MissingAttribute("family ID"))?;
    let group_id = group_id.ok_or_else(|| ProtocolError::NoMulticastGroup(group.to_string()))?;
    debug!(
        "Resolved family {} to {} with {} group {}",
        family, family_id, group, group_id
    );
    Ok(FamilyIds {
        family_id,
        group_id,
    })
}

fn parse_family(
    msg: &GenlMessage<'_>,
    group: &str,
    family_id: &mut Option<u16>,
    group_id: &mut Option<u32>,
) -> Result<(), WifiError> {
    let table = AttrTable::parse(msg.attrs(), &FAMILY_POLICY)?;
    let id = table
        .get(CtrlAttr::FamilyId)
        .ok_or(ProtocolError::MissingAttribute("family ID"))?;
    *family_id = Some(id.get_u16()?);

    if let Some(groups) = table.get(CtrlAttr::McastGroups) {
        for entry in groups.nested() {
            let entry = AttrTable::parse_nested(&entry?, &MCAST_GROUP_POLICY)?;
            let name = match entry.get(CtrlAttrMcastGrp::Name) {
                Some(name) => name,
                None => continue,
            };
            if name.get_cstr() != group.as_bytes() {
                continue;
            }
            let id = entry
                .get(CtrlAttrMcastGrp::Id)
                .ok_or(ProtocolError::MissingAttribute("multicast group ID"))?;
            *group_id = Some(id.get_u32()?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::{err::SocketError, test::*};

    #[test]
    fn test_resolve_scan_group() {
        setup();
        let mock = MockTransport::new();
        let mut channel = NetlinkChannel::new(mock.clone(), 3, crate::MAX_NL_LENGTH);
        mock.push(family_reply(
            1,
            &[
                (&b"config\0"[..], Some(4)),
                (&b"scan\0"[..], Some(5)),
                (&b"mlme\0"[..], Some(7)),
            ],
        ));

        let ids = resolve(&mut channel, "nl80211", "scan").unwrap();
        assert_eq!(ids.family_id(), 0x1c);
        assert_eq!(ids.group_id(), 5);
        assert_eq!(channel.sequence(), 2);

        let sent = mock.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(&sent[0][4..6], &GENL_ID_CTRL.to_ne_bytes());
        assert_eq!(sent[0][16], u8::from(CtrlCmd::Getfamily));
        assert!(sent[0]
            .windows(8)
            .any(|w| w == b"nl80211\0".as_slice()));
    }

    #[test]
    fn test_resolve_without_scan_group() {
        setup();
        let mock = MockTransport::new();
        let mut channel = NetlinkChannel::new(mock.clone(), 3, crate::MAX_NL_LENGTH);
        mock.push(family_reply(1, &[(&b"config\0"[..], Some(4))]));

        let e = resolve(&mut channel, "nl80211", "scan").unwrap_err();
        assert!(matches!(
            e,
            WifiError::Protocol(ProtocolError::NoMulticastGroup(ref g)) if g == "scan"
        ));
    }

    #[test]
    fn test_resolve_scan_group_without_id() {
        setup();
        let mock = MockTransport::new();
        let mut channel = NetlinkChannel::new(mock.clone(), 3, crate::MAX_NL_LENGTH);
        mock.push(family_reply(1, &[(&b"scan\0"[..], None)]));

        let e = resolve(&mut channel, "nl80211", "scan").unwrap_err();
        assert!(matches!(
            e,
            WifiError::Protocol(ProtocolError::MissingAttribute(_))
        ));
    }

    #[test]
    fn test_resolve_unknown_family() {
        setup();
        let mock = MockTransport::new();
        let mut channel = NetlinkChannel::new(mock.clone(), 3, crate::MAX_NL_LENGTH);
        mock.push(err(libc::ENOENT, 1, MOCK_PID));

        let e = resolve(&mut channel, "nl80211", "scan").unwrap_err();
        match e {
            WifiError::Socket(SocketError::Nlmsgerr(e)) => assert_eq!(e.errno(), libc::ENOENT),
            e => panic!("Unexpected error {}", e),
        }
        assert_eq!(channel.sequence(), 2);
    }
}
