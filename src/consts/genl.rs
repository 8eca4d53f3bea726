/// Fixed message type of the generic netlink controller (`nlctrl`).
pub const GENL_ID_CTRL: u16 = libc::GENL_ID_CTRL as u16;

/// Protocol version written into every generic netlink header this
/// crate sends.
pub const GENL_VERSION: u8 = 1;

impl_var!(
    /// Values for `cmd` in [`Genlmsghdr`][crate::nl::Genlmsghdr]
    /// addressed to `nlctrl`.
    pub CtrlCmd, u8,
    Unspec => libc::CTRL_CMD_UNSPEC as u8,
    Newfamily => libc::CTRL_CMD_NEWFAMILY as u8,
    Delfamily => libc::CTRL_CMD_DELFAMILY as u8,
    Getfamily => libc::CTRL_CMD_GETFAMILY as u8
);

impl_var!(
    /// Top level attributes of `nlctrl` family messages
    pub CtrlAttr, u16,
    Unspec => libc::CTRL_ATTR_UNSPEC as u16,
    FamilyId => libc::CTRL_ATTR_FAMILY_ID as u16,
    FamilyName => libc::CTRL_ATTR_FAMILY_NAME as u16,
    Version => libc::CTRL_ATTR_VERSION as u16,
    Hdrsize => libc::CTRL_ATTR_HDRSIZE as u16,
    Maxattr => libc::CTRL_ATTR_MAXATTR as u16,
    Ops => libc::CTRL_ATTR_OPS as u16,
    McastGroups => libc::CTRL_ATTR_MCAST_GROUPS as u16
);

impl_var!(
    /// Attributes of one entry in [`CtrlAttr::McastGroups`]
    pub CtrlAttrMcastGrp, u16,
    Unspec => libc::CTRL_ATTR_MCAST_GRP_UNSPEC as u16,
    Name => libc::CTRL_ATTR_MCAST_GRP_NAME as u16,
    Id => libc::CTRL_ATTR_MCAST_GRP_ID as u16
);
