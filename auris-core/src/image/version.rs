//! Coprocessor firmware version

use core::fmt;
use core::str::FromStr;

/// Four-byte firmware version, most significant byte first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Version(pub [u8; 4]);

impl Version {
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self([a, b, c, d])
    }

    pub fn bytes(&self) -> [u8; 4] {
        self.0
    }

    /// Whether an update should proceed given the `remote` version
    ///
    /// Bytes are visited in order and the first one where `remote` is
    /// greater wins. A byte where `remote` is smaller does not stop the
    /// scan, so `0.0.1.0` against `0.0.0.5` still reports an update.
    pub fn needs_update(&self, remote: &Version) -> bool {
        self.0.iter().zip(remote.0.iter()).any(|(local, remote)| local < remote)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

/// Version text was not four dotted bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidVersion;

impl FromStr for Version {
    type Err = InvalidVersion;

    /// Parse `"a.b.c.d"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 4];
        let mut parts = s.split('.');
        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or(InvalidVersion)?;
            *byte = part.trim().parse().map_err(|_| InvalidVersion)?;
        }
        if parts.next().is_some() {
            return Err(InvalidVersion);
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_versions_skip() {
        let v = Version::new(0, 0, 0, 3);
        assert!(!v.needs_update(&v));
    }

    #[test]
    fn test_newer_remote_updates() {
        let local = Version::new(0, 0, 0, 3);
        assert!(local.needs_update(&Version::new(0, 0, 0, 4)));
        assert!(local.needs_update(&Version::new(1, 0, 0, 0)));
    }

    #[test]
    fn test_older_remote_skips() {
        let local = Version::new(0, 0, 0, 3);
        assert!(!local.needs_update(&Version::new(0, 0, 0, 2)));
        assert!(!local.needs_update(&Version::new(0, 0, 0, 0)));
    }

    #[test]
    fn test_smaller_byte_does_not_stop_scan() {
        let local = Version::new(0, 0, 1, 0);
        assert!(local.needs_update(&Version::new(0, 0, 0, 5)));
    }

    #[test]
    fn test_parse() {
        assert_eq!("0.0.0.3".parse(), Ok(Version::new(0, 0, 0, 3)));
        assert_eq!("1.2.3.255".parse(), Ok(Version::new(1, 2, 3, 255)));
        assert_eq!("1.2.3".parse::<Version>(), Err(InvalidVersion));
        assert_eq!("1.2.3.4.5".parse::<Version>(), Err(InvalidVersion));
        assert_eq!("1.2.3.256".parse::<Version>(), Err(InvalidVersion));
    }

    #[test]
    fn test_display() {
        let text = std::format!("{}", Version::new(0, 8, 1, 3));
        assert_eq!(text, "0.8.1.3");
    }

    proptest! {
        #[test]
        fn prop_update_iff_some_remote_byte_larger(
            local in any::<[u8; 4]>(),
            remote in any::<[u8; 4]>(),
        ) {
            let expected = (0..4).any(|i| remote[i] > local[i]);
            prop_assert_eq!(Version(local).needs_update(&Version(remote)), expected);
        }
    }
}
