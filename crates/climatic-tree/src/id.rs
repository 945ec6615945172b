use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

const VARIANT_SHIFT: u32 = 32;
const RESERVED_MASK: u64 = 0xFFFF_FF00;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("base classification {0} is outside 0..=255")]
    BaseOutOfRange(u64),
    #[error("packed classification {0:#x} has reserved bits set")]
    ReservedBits(u64),
    #[error("malformed classification `{0}`, expected `base` or `base:variant`")]
    Malformed(String),
}

/// A base classification (0..=255) with an optional variant layered on top.
///
/// Variant 0 is the plain base id. Any other variant is a "pseudo" classification
/// that shares the base for external lookups but stays distinct everywhere
/// inside the engine. Packing into a `u64` keeps the base in the low byte and
/// the variant in the high word; nothing is ever masked away.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "IdRepr")]
pub struct ClassificationId {
    base: u8,
    variant: u32,
}

impl ClassificationId {
    #[inline]
    pub const fn new(base: u8) -> Self {
        Self { base, variant: 0 }
    }

    #[inline]
    pub const fn pseudo(base: u8, variant: u32) -> Self {
        Self { base, variant }
    }

    #[inline]
    pub const fn base(self) -> u8 {
        self.base
    }

    #[inline]
    pub const fn variant(self) -> u32 {
        self.variant
    }

    #[inline]
    pub const fn is_pseudo(self) -> bool {
        self.variant != 0
    }

    /// The plain id this classification is layered on.
    #[inline]
    pub const fn base_id(self) -> Self {
        Self::new(self.base)
    }

    #[inline]
    pub const fn packed(self) -> u64 {
        (self.base as u64) | ((self.variant as u64) << VARIANT_SHIFT)
    }

    pub const fn from_packed(packed: u64) -> Result<Self, IdError> {
        if packed & RESERVED_MASK != 0 {
            return Err(IdError::ReservedBits(packed));
        }
        Ok(Self {
            base: (packed & 0xFF) as u8,
            variant: (packed >> VARIANT_SHIFT) as u32,
        })
    }
}

impl From<u8> for ClassificationId {
    fn from(base: u8) -> Self {
        Self::new(base)
    }
}

impl fmt::Display for ClassificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pseudo() {
            write!(f, "{}:{}", self.base, self.variant)
        } else {
            write!(f, "{}", self.base)
        }
    }
}

impl FromStr for ClassificationId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = || IdError::Malformed(s.to_string());
        let (base, variant) = match s.split_once(':') {
            Some((b, v)) => (b, Some(v)),
            None => (s, None),
        };
        let base: u64 = base.trim().parse().map_err(|_| malformed())?;
        if base > u64::from(u8::MAX) {
            return Err(IdError::BaseOutOfRange(base));
        }
        let variant: u32 = match variant {
            Some(v) => v.trim().parse().map_err(|_| malformed())?,
            None => 0,
        };
        Ok(Self::pseudo(base as u8, variant))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Packed(u64),
    Text(String),
}

impl TryFrom<IdRepr> for ClassificationId {
    type Error = IdError;

    fn try_from(repr: IdRepr) -> Result<Self, Self::Error> {
        match repr {
            IdRepr::Packed(v) => Self::from_packed(v),
            IdRepr::Text(s) => s.parse(),
        }
    }
}
