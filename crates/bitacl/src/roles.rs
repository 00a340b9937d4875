//! Role definitions.
//!
//! A role is a bit-identified permission bundle: a unique identifier, a
//! name that namespaces its rules, the names of the roles it inherits from,
//! and a table of resource grants. Roles are built once at configuration
//! time and never change afterwards.

use std::collections::HashMap;

use bitacl_types::{Privilege, Resource, RoleId};
use tracing::debug;

use crate::assertion::Assertion;

/// What a role may do on one resource.
#[derive(Debug, Clone)]
pub enum ResourceGrant {
    /// Every privilege on the resource, unconditionally.
    AllPrivileges,

    /// Only the listed privileges, each gated by its assertions.
    ///
    /// An empty assertion list allows the privilege unconditionally.
    Privileges(HashMap<Privilege, Vec<Assertion>>),
}

impl ResourceGrant {
    /// Returns whether this grant covers every privilege.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, ResourceGrant::AllPrivileges)
    }
}

/// Role in the access control hierarchy.
///
/// Validation (identifier uniqueness, known parents, acyclic inheritance)
/// happens when roles are registered in a
/// [`RoleRegistry`](crate::registry::RoleRegistry), not here.
///
/// # Examples
///
/// ```
/// use bitacl::Role;
/// use bitacl_types::{Resource, RoleId};
///
/// let guest = Role::new(RoleId::bit(0), "guest").grant("main", "read");
/// let admin = Role::new(RoleId::bit(1), "admin")
///     .inherits("guest")
///     .grant_all("admin");
///
/// assert_eq!(admin.parents(), ["guest"]);
/// assert!(admin.grant_for(&Resource::from("admin")).unwrap().is_wildcard());
/// assert!(guest.grant_for(&Resource::from("admin")).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Role {
    id: RoleId,
    name: String,
    parents: Vec<String>,
    grants: HashMap<Resource, ResourceGrant>,
}

impl Role {
    /// Creates a role with no parents and no grants.
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parents: Vec::new(),
            grants: HashMap::new(),
        }
    }

    /// Adds a parent role by name.
    ///
    /// Parent order is preserved; it only affects which role is reported
    /// as the source of a grant, never the allow/deny outcome.
    pub fn inherits(mut self, parent: impl Into<String>) -> Self {
        let parent = parent.into();
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
        self
    }

    /// Allows `privilege` on `resource` unconditionally.
    pub fn grant(self, resource: impl Into<Resource>, privilege: impl Into<Privilege>) -> Self {
        self.grant_with(resource, privilege, Vec::new())
    }

    /// Allows `privilege` on `resource` when every assertion holds.
    ///
    /// Granting the same pair twice replaces the earlier assertions.
    /// Ignored when the resource already has an all-privileges grant.
    pub fn grant_with(
        mut self,
        resource: impl Into<Resource>,
        privilege: impl Into<Privilege>,
        assertions: Vec<Assertion>,
    ) -> Self {
        let resource = resource.into();
        let privilege = privilege.into();

        match self
            .grants
            .entry(resource)
            .or_insert_with(|| ResourceGrant::Privileges(HashMap::new()))
        {
            ResourceGrant::AllPrivileges => {
                debug!(
                    role = %self.name,
                    privilege = %privilege,
                    "Grant subsumed by all-privileges grant"
                );
            }
            ResourceGrant::Privileges(privileges) => {
                privileges.insert(privilege, assertions);
            }
        }
        self
    }

    /// Allows every privilege on `resource`, replacing specific grants.
    pub fn grant_all(mut self, resource: impl Into<Resource>) -> Self {
        self.grants
            .insert(resource.into(), ResourceGrant::AllPrivileges);
        self
    }

    /// Sets the grant for `resource` directly.
    ///
    /// An empty privilege map is stored as [`ResourceGrant::AllPrivileges`].
    pub fn with_resource(mut self, resource: impl Into<Resource>, grant: ResourceGrant) -> Self {
        let grant = match grant {
            ResourceGrant::Privileges(privileges) if privileges.is_empty() => {
                ResourceGrant::AllPrivileges
            }
            other => other,
        };
        self.grants.insert(resource.into(), grant);
        self
    }

    pub fn id(&self) -> RoleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the names of the roles this role inherits from.
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Returns the role's own grants, keyed by resource.
    pub fn grants(&self) -> &HashMap<Resource, ResourceGrant> {
        &self.grants
    }

    /// Returns the role's own grant for `resource`, if any.
    pub fn grant_for(&self, resource: &Resource) -> Option<&ResourceGrant> {
        self.grants.get(resource)
    }
}
