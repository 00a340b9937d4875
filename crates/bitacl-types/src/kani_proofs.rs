//! Kani bounded model checking proofs for role mask membership.
//!
//! - Membership is exactly the subset relation on bits
//! - Adding a role to a mask never removes another role

use crate::{RoleId, RoleMask};

/// Verifies that `contains` holds iff every identifier bit is in the mask.
#[cfg(kani)]
#[kani::proof]
fn verify_contains_is_subset() {
    let bits: u64 = kani::any();
    let role: u64 = kani::any();
    kani::assume(role != 0);

    let contained = RoleMask::new(bits).contains(RoleId::new(role));
    assert_eq!(contained, bits & role == role);
}

/// Verifies that growing a mask is monotonic.
#[cfg(kani)]
#[kani::proof]
fn verify_with_is_monotonic() {
    let bits: u64 = kani::any();
    let held: u64 = kani::any();
    let added: u64 = kani::any();
    kani::assume(held != 0);

    let mask = RoleMask::new(bits);
    if mask.contains(RoleId::new(held)) {
        assert!(mask.with(RoleId::new(added)).contains(RoleId::new(held)));
    }
}
