impl_var!(
    /// General address families for sockets
    pub AddrFamily, libc::c_int,
    Netlink => libc::AF_NETLINK
);

impl_var!(
    /// Values for `nl_family` in [`NlSocket`][crate::socket::NlSocket]
    pub NlFamily, libc::c_int,
    Generic => libc::NETLINK_GENERIC
);
