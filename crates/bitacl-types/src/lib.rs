//! # bitacl-types: Core types for `bitacl`
//!
//! This crate contains the leaf values shared across the `bitacl` crates:
//! - Role membership ([`RoleId`], [`RoleMask`])
//! - Principals ([`IdentityId`])
//! - Protected names ([`Resource`], [`Privilege`])

use std::{
    fmt::{Debug, Display},
    ops::{BitOr, BitOrAssign},
};

use serde::{Deserialize, Serialize};

// ============================================================================
// Role membership - All Copy (cheap 8-byte values)
// ============================================================================

/// Bit identifier of a role.
///
/// Identifiers are normally distinct powers of two. An identifier spanning
/// several bits describes a role group: it is only held by masks that carry
/// every one of those bits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RoleId(u64);

impl RoleId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Creates the identifier with only bit `n` set.
    ///
    /// # Panics
    ///
    /// Panics if `n >= 64`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bitacl_types::RoleId;
    /// assert_eq!(u64::from(RoleId::bit(0)), 1);
    /// assert_eq!(u64::from(RoleId::bit(3)), 8);
    /// ```
    pub fn bit(n: u32) -> Self {
        assert!(n < u64::BITS, "role bit {n} out of range");
        Self(1 << n)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns whether this identifier shares any bit with `other`.
    pub fn overlaps(self, other: RoleId) -> bool {
        self.0 & other.0 != 0
    }
}

impl Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for RoleId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RoleId> for u64 {
    fn from(id: RoleId) -> Self {
        id.0
    }
}

/// Bitwise OR of every role an identity holds.
///
/// # Examples
///
/// ```
/// # use bitacl_types::{RoleId, RoleMask};
/// let mask = RoleMask::empty().with(RoleId::bit(0)).with(RoleId::bit(2));
/// assert!(mask.contains(RoleId::bit(2)));
/// assert!(!mask.contains(RoleId::bit(1)));
/// // Multi-bit identifiers need every bit present.
/// assert!(mask.contains(RoleId::new(0b101)));
/// assert!(!mask.contains(RoleId::new(0b011)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RoleMask(u64);

impl RoleMask {
    pub fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub fn empty() -> Self {
        Self(0)
    }

    /// Returns the mask with `role` added.
    pub fn with(self, role: RoleId) -> Self {
        Self(self.0 | role.0)
    }

    /// Returns whether every bit of `role` is set in this mask.
    ///
    /// A zero identifier is never contained.
    pub fn contains(self, role: RoleId) -> bool {
        !role.is_zero() && self.0 & role.0 == role.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u64 {
        self.0
    }
}

impl Display for RoleMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

impl From<u64> for RoleMask {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RoleMask> for u64 {
    fn from(mask: RoleMask) -> Self {
        mask.0
    }
}

impl From<RoleId> for RoleMask {
    fn from(role: RoleId) -> Self {
        Self(role.0)
    }
}

impl BitOr<RoleId> for RoleMask {
    type Output = RoleMask;

    fn bitor(self, rhs: RoleId) -> Self::Output {
        self.with(rhs)
    }
}

impl BitOr for RoleMask {
    type Output = RoleMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign<RoleId> for RoleMask {
    fn bitor_assign(&mut self, rhs: RoleId) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<RoleId> for RoleMask {
    fn from_iter<I: IntoIterator<Item = RoleId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

/// Numeric identifier of an identity (user, service account).
///
/// Only used to name the identity's synthesized observer role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct IdentityId(u64);

impl IdentityId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for IdentityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<IdentityId> for u64 {
    fn from(id: IdentityId) -> Self {
        id.0
    }
}

// ============================================================================
// Names - compared by string equality
// ============================================================================

/// Named category of protected entities (e.g. `"user"`, `"admin"`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(String);

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Resource({:?})", self.0)
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Resource {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Resource {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Named action performable on a resource (e.g. `"read"`, `"manage"`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Privilege(String);

impl Privilege {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Privilege({:?})", self.0)
    }
}

impl Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Privilege {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Privilege {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Kani proofs for bounded model checking
#[cfg(kani)]
mod kani_proofs;
