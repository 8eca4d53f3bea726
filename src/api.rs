//! Flat interface with sentinel return values for embedders that do
//! not want to handle [`WifiError`][crate::err::WifiError].
//!
//! Failures are logged at error level and reported as `None`, `-1`
//! or `0`. The typed methods on [`WifiScan`] return the same results
//! with the error attached.

use log::error;

use crate::{
    bss::BssInfo,
    scan::WifiScan,
    sink,
    socket::{NlSocket, Transport},
    station::StationInfo,
    utils::interface_index,
};

pub use crate::sink::register_log_callback;

/// Returns true if a network interface named `interface` exists.
pub fn interface_exists(interface: &str) -> bool {
    interface_index(interface).is_some()
}

/// Open a handle for `interface`, or [`None`] if that fails.
///
/// Installs the default log sink unless the application already
/// installed a logger.
pub fn initialize(interface: &str) -> Option<WifiScan<NlSocket>> {
    let _ = sink::install();
    match WifiScan::new(interface) {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!("Initializing wifi scan for {} failed: {}", interface, e);
            None
        }
    }
}

/// Close a handle and its sockets.
pub fn close<S>(handle: WifiScan<S>) {
    drop(handle);
}

/// Scan and fill `bss_infos`. Returns the number of networks found,
/// which may exceed the length of `bss_infos`, or -1 on failure.
pub fn scan_all<S>(handle: &mut WifiScan<S>, bss_infos: &mut [BssInfo]) -> i32
where
    S: Transport,
{
    match handle.scan_all(bss_infos) {
        Ok(scanned) => i32::try_from(scanned).unwrap_or(i32::MAX),
        Err(e) => {
            error!("Scan failed: {}", e);
            -1
        }
    }
}

/// Read statistics of the connected station into `station`. Returns
/// 1 on success and 0 if not connected or on failure.
pub fn scan_station<S>(handle: &mut WifiScan<S>, station: &mut StationInfo) -> i32
where
    S: Transport,
{
    match handle.scan_station_into(station) {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(e) => {
            error!("Station query failed: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::test::*;

    #[test]
    fn test_invalid_interface() {
        assert!(!interface_exists("no-such-wlan"));
        assert!(initialize("no-such-wlan").is_none());
        // Either the crate's sink or the test logger now receives
        // the failure diagnostic.
        assert!(log::logger().enabled(
            &log::Metadata::builder()
                .level(log::Level::Error)
                .target("wifi_scan")
                .build()
        ));
    }

    #[test]
    fn test_sentinels() {
        let notifications = MockTransport::new();
        let commands = MockTransport::new();
        let mut handle = wifi_scan(&notifications, &commands);

        commands.push(err(libc::EBUSY, 1, MOCK_PID));
        let mut infos = [BssInfo::default(); 2];
        assert_eq!(scan_all(&mut handle, &mut infos), -1);

        let mut station = StationInfo::default();
        assert_eq!(scan_station(&mut handle, &mut station), 0);

        close(handle);
    }

    #[test]
    #[ignore = "needs a wireless interface named wlan0"]
    fn test_live_scan() {
        setup();
        assert!(interface_exists("wlan0"));
        let mut handle = initialize("wlan0").unwrap();
        let mut infos = [BssInfo::default(); 16];
        assert!(scan_all(&mut handle, &mut infos) >= 0);
        close(handle);
    }
}
