//! Identity types for the park
//!
//! Session ids key the replicated document. Document addresses and locators
//! are the only strings that cross client boundaries.

use std::fmt;

use rand::Rng;

use crate::{ParkError, ParkResult};

/// Session identity - one per joined process, keys the avatar record
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(pub u128);

impl SessionId {
    pub const ZERO: SessionId = SessionId(0);

    #[inline]
    pub fn new(id: u128) -> Self {
        SessionId(id)
    }

    /// Draw a random session id
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        SessionId(rng.gen())
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({:08x})", (self.0 >> 96) as u32)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF
        )
    }
}

/// Address of a shared presence document
///
/// Format: `park:` followed by 32 lowercase hex digits.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentAddress(String);

impl DocumentAddress {
    pub const PREFIX: &'static str = "park:";

    /// Generate a fresh address
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let raw: u128 = rng.gen();
        DocumentAddress(format!("{}{:032x}", Self::PREFIX, raw))
    }

    /// Parse and validate an address string
    pub fn parse(s: &str) -> ParkResult<Self> {
        if Self::is_valid(s) {
            Ok(DocumentAddress(s.to_string()))
        } else {
            Err(ParkError::InvalidAddress(s.to_string()))
        }
    }

    /// Check whether a string is a well-formed address
    pub fn is_valid(s: &str) -> bool {
        match s.strip_prefix(Self::PREFIX) {
            Some(body) => {
                body.len() == 32
                    && body
                        .bytes()
                        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
            }
            None => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DocumentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Doc({})", self.0)
    }
}

impl fmt::Display for DocumentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural address of a container in the shared presentation tree
///
/// Every client with the same scene structure resolves the same locator to
/// the same container. Only the string travels; the node never does.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Locator(String);

impl Locator {
    pub fn new(path: impl Into<String>) -> Self {
        Locator(path.into())
    }

    /// Locator of the `n`-th (1-based) child with `tag` under `parent`
    pub fn child(parent: &Locator, tag: &str, nth: usize) -> Self {
        Locator(format!("{} > {}:nth-of-type({})", parent.0, tag, nth))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locator({:?})", self.0)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locator {
    fn from(s: &str) -> Self {
        Locator(s.to_string())
    }
}
