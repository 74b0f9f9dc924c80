//! Library and binary format versions.

use std::fmt;

/// A `major.minor.patch` version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Version of this library.
pub const VERSION: Version = Version {
    major: 1,
    minor: 0,
    patch: 0,
};

/// Version of the binary file format this library reads and writes.
pub const FILE_FORMAT: Version = Version {
    major: 0,
    minor: 1,
    patch: 0,
};

impl Version {
    /// Pack into the header's 32-bit version field.
    ///
    /// Bits 31..24 hold the major version, 23..12 the minor, 11..0 the patch.
    pub const fn to_header_field(self) -> u32 {
        ((self.major & 0xFF) << 24) | ((self.minor & 0xFFF) << 12) | (self.patch & 0xFFF)
    }

    /// Unpack a header version field.
    pub const fn from_header_field(field: u32) -> Self {
        Self {
            major: field >> 24,
            minor: (field >> 12) & 0xFFF,
            patch: field & 0xFFF,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_format_field() {
        assert_eq!(FILE_FORMAT.to_header_field(), 0x0000_1000);
        assert_eq!(Version::from_header_field(0x0000_1000), FILE_FORMAT);
        assert_eq!(Version::from_header_field(0x0100_2003).to_string(), "1.2.3");
    }

    #[test]
    fn test_library_version_matches_package() {
        assert_eq!(VERSION.to_string(), env!("CARGO_PKG_VERSION"));
    }
}
