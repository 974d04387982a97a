//! Semantic versions packed into a single `u32`.
//!
//! Layout, most significant bit first:
//!
//! ```text
//!  31      26 25          16 15                           0
//! +----------+--------------+------------------------------+
//! |  major   |    minor     |            patch             |
//! |  6 bits  |   10 bits    |           16 bits            |
//! +----------+--------------+------------------------------+
//! ```
//!
//! Because the major field sits in the high bits, comparing two packed words
//! orders versions the same way comparing `(major, minor, patch)` does.

use core::fmt;

use crate::error::VersionError;

const MAJOR_BITS: u32 = 6;
const MINOR_BITS: u32 = 10;
const PATCH_BITS: u32 = 16;

const MAJOR_SHIFT: u32 = MINOR_BITS + PATCH_BITS;
const MINOR_SHIFT: u32 = PATCH_BITS;

/// Largest encodable major version (63).
pub const MAJOR_MAX: u8 = (1 << MAJOR_BITS) - 1;
/// Largest encodable minor version (1023).
pub const MINOR_MAX: u16 = (1 << MINOR_BITS) - 1;

/// A `major.minor.patch` triple stored as one packed `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version(u32);

impl Version {
    /// Packs the three fields, rejecting values that do not fit their width.
    ///
    /// ```rust
    /// use bricks::Version;
    ///
    /// let v = Version::new(1, 2, 3).unwrap();
    /// assert_eq!((v.major(), v.minor(), v.patch()), (1, 2, 3));
    /// assert!(Version::new(64, 0, 0).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// [`VersionError::MajorOutOfRange`] if `major > 63`,
    /// [`VersionError::MinorOutOfRange`] if `minor > 1023`.
    pub const fn new(major: u8, minor: u16, patch: u16) -> Result<Self, VersionError> {
        if major > MAJOR_MAX {
            return Err(VersionError::MajorOutOfRange(major));
        }
        if minor > MINOR_MAX {
            return Err(VersionError::MinorOutOfRange(minor));
        }
        Ok(Self(
            ((major as u32) << MAJOR_SHIFT) | ((minor as u32) << MINOR_SHIFT) | patch as u32,
        ))
    }

    /// Reinterprets a packed word. Every `u32` is a valid version.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The packed word.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// The major field (top 6 bits).
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn major(self) -> u8 {
        (self.0 >> MAJOR_SHIFT) as u8
    }

    /// The minor field (bits 16..26).
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn minor(self) -> u16 {
        ((self.0 >> MINOR_SHIFT) as u16) & MINOR_MAX
    }

    /// The patch field (bottom 16 bits).
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn patch(self) -> u16 {
        self.0 as u16
    }
}

impl From<Version> for u32 {
    fn from(version: Version) -> Self {
        version.bits()
    }
}

impl From<u32> for Version {
    fn from(bits: u32) -> Self {
        Self::from_bits(bits)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}
