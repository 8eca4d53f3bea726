//! Interface lookup helpers.

use std::ffi::CString;

/// Resolve a network interface name to its index, or [`None`] if no
/// interface has that name.
pub fn interface_index(name: &str) -> Option<u32> {
    let name = CString::new(name).ok()?;
    match unsafe { libc::if_nametoindex(name.as_ptr()) } {
        0 => None,
        i => Some(i),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_interface_index() {
        assert!(interface_index("lo").is_some());
        assert_eq!(interface_index("no-such-iface"), None);
        assert_eq!(interface_index("bad\0name"), None);
        assert_eq!(interface_index(""), None);
    }
}
