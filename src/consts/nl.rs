use bitflags::bitflags;

impl_var!(
    /// Values for `nl_type` in [`Nlmsghdr`][crate::nl::Nlmsghdr] that
    /// carry netlink control messages rather than family payloads.
    pub Nlmsg, u16,
    Noop => libc::NLMSG_NOOP as u16,
    Error => libc::NLMSG_ERROR as u16,
    Done => libc::NLMSG_DONE as u16,
    Overrun => libc::NLMSG_OVERRUN as u16
);

/// Message types below this value are reserved for control
/// messages.
pub const NLMSG_MIN_TYPE: u16 = libc::NLMSG_MIN_TYPE as u16;

bitflags! {
    /// Values for `nl_flags` in [`Nlmsghdr`][crate::nl::Nlmsghdr]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NlmF: u16 {
        /// This flag is required for all kernel requests
        const REQUEST = libc::NLM_F_REQUEST as u16;
        /// Part of a multi-message reply
        const MULTI = libc::NLM_F_MULTI as u16;
        /// Ask the kernel for an acknowledgement
        const ACK = libc::NLM_F_ACK as u16;
        /// Echo this request
        const ECHO = libc::NLM_F_ECHO as u16;
        /// Return the complete table
        const ROOT = libc::NLM_F_ROOT as u16;
        /// Return all matching entries
        const MATCH = libc::NLM_F_MATCH as u16;
        /// Atomic snapshot of the table
        const ATOMIC = libc::NLM_F_ATOMIC as u16;
        /// Dump request, equivalent to `ROOT | MATCH`
        const DUMP = libc::NLM_F_DUMP as u16;
        /// Set by the kernel on a dump reply whose table changed
        /// while it was being dumped
        const DUMP_INTR = libc::NLM_F_DUMP_INTR as u16;
    }
}
