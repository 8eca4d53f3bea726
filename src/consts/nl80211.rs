/// Name under which the kernel registers the `nl80211` generic
/// netlink family.
pub const NL80211_GENL_NAME: &str = "nl80211";

/// Name of the `nl80211` multicast group carrying scan events.
pub const NL80211_MULTICAST_GROUP_SCAN: &str = "scan";

impl_var!(
    /// Supported `nl80211` commands
    pub Nl80211Cmd, u8,
    Unspec => 0,
    GetStation => 17,
    SetStation => 18,
    NewStation => 19,
    DelStation => 20,
    GetScan => 32,
    TriggerScan => 33,
    NewScanResults => 34,
    ScanAborted => 35
);

impl_var!(
    /// Top level `nl80211` attributes
    pub Nl80211Attr, u16,
    Unspec => 0,
    Wiphy => 1,
    WiphyName => 2,
    Ifindex => 3,
    Ifname => 4,
    Iftype => 5,
    Mac => 6,
    StaInfo => 21,
    ScanFrequencies => 44,
    ScanSsids => 45,
    Generation => 46,
    Bss => 47
);

impl_var!(
    /// Attributes nested in [`Nl80211Attr::Bss`]
    pub Nl80211Bss, u16,
    Invalid => 0,
    Bssid => 1,
    Frequency => 2,
    Tsf => 3,
    BeaconInterval => 4,
    Capability => 5,
    InformationElements => 6,
    SignalMbm => 7,
    SignalUnspec => 8,
    Status => 9,
    SeenMsAgo => 10,
    BeaconIes => 11
);

impl_var!(
    /// Values carried by [`Nl80211Bss::Status`]
    pub Nl80211BssStatus, u32,
    Authenticated => 0,
    Associated => 1,
    IbssJoined => 2
);

impl_var!(
    /// Attributes nested in [`Nl80211Attr::StaInfo`]
    pub Nl80211StaInfo, u16,
    Invalid => 0,
    InactiveTime => 1,
    RxBytes => 2,
    TxBytes => 3,
    Llid => 4,
    Plid => 5,
    PlinkState => 6,
    Signal => 7,
    TxBitrate => 8,
    RxPackets => 9,
    TxPackets => 10
);
