//! # Wifi scanning over `nl80211`
//!
//! ## Rationale
//!
//! Listing nearby networks and reading the statistics of the current
//! link on Linux means talking to the `nl80211` generic netlink
//! family. This crate implements just enough of netlink, generic
//! netlink and `nl80211` to do that from pure Rust, with the wire
//! constants wrapped in enums so that commands, attributes and
//! message types cannot be mixed up.
//!
//! ## Usage
//!
//! ```no_run
//! use wifi_scan::{BssInfo, WifiScan};
//!
//! let mut handle = WifiScan::new("wlan0").unwrap();
//! let mut bss_infos = [BssInfo::default(); 16];
//! let scanned = handle.scan_all(&mut bss_infos).unwrap();
//! for bss in bss_infos.iter().take(scanned) {
//!     println!("{} {} dBm", bss.ssid, bss.signal_mbm / 100);
//! }
//! ```
//!
//! The [`api`] module offers the same operations with sentinel return
//! values for callers that only want a yes or no.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade. Applications without a
//! logger can receive them through
//! [`register_log_callback`][crate::sink::register_log_callback].

#![deny(missing_docs)]

/// Sentinel returning wrappers around [`WifiScan`]
pub mod api;
/// Attribute validation and lookup
pub mod attr;
/// Scan result records
pub mod bss;
/// Request and reply exchange over a netlink socket
pub mod channel;
/// Handle configuration
pub mod config;
/// C constants defined as types
pub mod consts;
/// Error module
pub mod err;
/// Generic netlink family resolution
pub mod family;
/// Iteration over the messages of a datagram
pub mod iter;
/// Netlink and generic netlink headers
pub mod nl;
/// Scan protocol
pub mod scan;
/// Log sink for applications without a logger
pub mod sink;
/// Wrapper for `libc` sockets
pub mod socket;
/// Connected station statistics
pub mod station;
/// Interface helpers
pub mod utils;

#[cfg(test)]
mod test;

pub use crate::{
    bss::{BssInfo, BssStatus, Ssid},
    config::{ScanConfig, ScanConfigBuilder},
    err::WifiError,
    scan::WifiScan,
    station::StationInfo,
};

/// Max supported message length for netlink messages supported by the kernel
pub const MAX_NL_LENGTH: usize = 32768;
