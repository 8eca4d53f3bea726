//! Configuration of a [`WifiScan`][crate::WifiScan] handle.
//!
//! The defaults match the kernel: the `nl80211` family, its `scan`
//! multicast group and a buffer as large as the biggest datagram
//! netlink sends by default.
//!
//! ```
//! use wifi_scan::ScanConfigBuilder;
//!
//! let config = ScanConfigBuilder::default()
//!     .buffer_size(16384)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.buffer_size(), 16384);
//! assert_eq!(config.family_name(), "nl80211");
//! ```

use derive_builder::Builder;
use getset::{CopyGetters, Getters};

use crate::{
    consts::{NL80211_GENL_NAME, NL80211_MULTICAST_GROUP_SCAN},
    MAX_NL_LENGTH,
};

/// Smallest accepted channel buffer. Dump replies are never split
/// below one page.
pub const MIN_BUFFER_SIZE: usize = 4096;

/// Settings for opening a [`WifiScan`][crate::WifiScan] handle.
#[derive(Builder, Getters, CopyGetters, Clone, Debug, PartialEq, Eq)]
#[builder(pattern = "owned", build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Size of the buffer each channel sends from and receives into
    #[builder(default = "MAX_NL_LENGTH")]
    #[getset(get_copy = "pub")]
    buffer_size: usize,
    /// Generic netlink family to resolve
    #[builder(setter(into), default = "NL80211_GENL_NAME.to_string()")]
    #[getset(get = "pub")]
    family_name: String,
    /// Multicast group of the family that carries scan events
    #[builder(setter(into), default = "NL80211_MULTICAST_GROUP_SCAN.to_string()")]
    #[getset(get = "pub")]
    scan_group: String,
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.buffer_size {
            Some(size) if size < MIN_BUFFER_SIZE => Err(format!(
                "Buffer size {} is below the minimum of {}",
                size, MIN_BUFFER_SIZE
            )),
            _ => Ok(()),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            buffer_size: MAX_NL_LENGTH,
            family_name: NL80211_GENL_NAME.to_string(),
            scan_group: NL80211_MULTICAST_GROUP_SCAN.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ScanConfigBuilder::default().build().unwrap();
        assert_eq!(config, ScanConfig::default());
        assert_eq!(config.buffer_size(), MAX_NL_LENGTH);
        assert_eq!(config.scan_group(), "scan");
    }

    #[test]
    fn test_builder_rejects_small_buffer() {
        assert!(ScanConfigBuilder::default()
            .buffer_size(MIN_BUFFER_SIZE - 1)
            .build()
            .is_err());
        assert!(ScanConfigBuilder::default()
            .buffer_size(MIN_BUFFER_SIZE)
            .family_name("nl80211")
            .build()
            .is_ok());
    }
}
