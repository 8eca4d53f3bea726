//! # High level notes
//!
//! The items in this module are created by the `impl_var` macro,
//! which wraps kernel constants in enums so that each category of
//! identifier (netlink message type, generic netlink command,
//! attribute type) is its own type.
//!
//! Most of these constants come from the Linux kernel headers
//! `linux/netlink.h`, `linux/genetlink.h` and `linux/nl80211.h`.
//! Where `libc` exports a constant it is used directly; the
//! `nl80211` values are not in `libc` and are spelled out.
//!
//! # Design decisions
//!
//! * Only the subset of `nl80211` and `nlctrl` identifiers this crate
//!   sends or consumes is modelled.
//! * `UnrecognizedVariant` is included in each enum because a newer
//!   kernel may send values this crate does not know about. The raw
//!   value stays inspectable for logging.

#[macro_use]
mod macros;

/// Constants related to generic netlink
pub mod genl;
pub use crate::consts::genl::*;
/// Constants related to top level netlink headers
pub mod nl;
pub use crate::consts::nl::*;
/// Constants related to the `nl80211` generic netlink family
pub mod nl80211;
pub use crate::consts::nl80211::*;
/// Constants related to netlink socket operations
pub mod socket;
pub use crate::consts::socket::*;

/// Reimplementation of alignto macro in C
pub fn alignto(len: usize) -> usize {
    (len + libc::NLA_ALIGNTO as usize - 1) & !(libc::NLA_ALIGNTO as usize - 1)
}
