//! Identity composition.
//!
//! An identity holds a bitmask of roles. The composer turns it into one
//! synthetic observer role whose parents are exactly the registered roles
//! the mask contains.

use bitacl_types::{IdentityId, RoleId, RoleMask};
use serde::{Deserialize, Serialize};

use crate::registry::RoleRegistry;
use crate::roles::Role;

/// Principal being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    id: IdentityId,
    mask: RoleMask,
}

impl Identity {
    pub fn new(id: IdentityId, mask: RoleMask) -> Self {
        Self { id, mask }
    }

    /// Identity holding no roles.
    pub fn anonymous(id: IdentityId) -> Self {
        Self::new(id, RoleMask::empty())
    }

    pub fn id(&self) -> IdentityId {
        self.id
    }

    pub fn mask(&self) -> RoleMask {
        self.mask
    }

    /// Name of the observer role synthesized for this identity.
    pub fn observer_name(&self) -> String {
        format!("user_role_{}", self.id)
    }
}

/// Builds the observer role for `identity`.
///
/// The observer has no grants of its own. Its parents are the registered
/// roles whose full identifier is contained in the identity's mask, in
/// registration order.
///
/// # Examples
///
/// ```
/// use bitacl::{compose, Identity, Role, RoleRegistry};
/// use bitacl_types::{IdentityId, RoleId, RoleMask};
///
/// let registry = RoleRegistry::new(vec![
///     Role::new(RoleId::bit(0), "guest"),
///     Role::new(RoleId::bit(1), "registered"),
///     Role::new(RoleId::bit(2), "admin"),
/// ])?;
///
/// let identity = Identity::new(IdentityId::new(7), RoleMask::new(0b101));
/// let observer = compose(&identity, &registry);
///
/// assert_eq!(observer.name(), "user_role_7");
/// assert_eq!(observer.parents(), ["guest", "admin"]);
/// # Ok::<(), bitacl::AclError>(())
/// ```
pub fn compose(identity: &Identity, registry: &RoleRegistry) -> Role {
    registry
        .iter()
        .filter(|role| identity.mask().contains(role.id()))
        .fold(
            Role::new(RoleId::default(), identity.observer_name()),
            |observer, role| observer.inherits(role.name()),
        )
}
