//! Rule compilation.
//!
//! Flattens every role's nested grant table into one lookup table keyed by
//! `(role, resource, privilege)`. An all-privileges grant compiles to a
//! single wildcard key with no assertions.

use std::collections::HashMap;
use std::fmt;

use bitacl_types::{Privilege, Resource};
use tracing::{debug, warn};

use crate::assertion::Assertion;
use crate::roles::{ResourceGrant, Role};

/// Privilege component of a rule key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrivilegeKey {
    /// One named privilege.
    Exact(Privilege),

    /// Every privilege on the resource.
    Any,
}

impl fmt::Display for PrivilegeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivilegeKey::Exact(privilege) => write!(f, "{privilege}"),
            PrivilegeKey::Any => f.write_str("*"),
        }
    }
}

/// Canonical key of a compiled rule, namespaced by role name.
///
/// Rendered as `role/resource/privilege`, or `role/resource/*` for a
/// wildcard. The key is structured, so names containing `/` cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey {
    pub role: String,
    pub resource: Resource,
    pub privilege: PrivilegeKey,
}

impl RuleKey {
    pub fn exact(role: &str, resource: &Resource, privilege: &Privilege) -> Self {
        Self {
            role: role.to_string(),
            resource: resource.clone(),
            privilege: PrivilegeKey::Exact(privilege.clone()),
        }
    }

    pub fn wildcard(role: &str, resource: &Resource) -> Self {
        Self {
            role: role.to_string(),
            resource: resource.clone(),
            privilege: PrivilegeKey::Any,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.privilege == PrivilegeKey::Any
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.role, self.resource, self.privilege)
    }
}

/// Flattened rule table: rule key -> assertions.
///
/// Built once from a role set and read-only afterwards.
///
/// # Examples
///
/// ```
/// use bitacl::{Role, RuleKey, RuleTable};
/// use bitacl_types::{Privilege, Resource, RoleId};
///
/// let roles = [
///     Role::new(RoleId::bit(0), "guest").grant("main", "read"),
///     Role::new(RoleId::bit(1), "admin").grant_all("admin"),
/// ];
/// let table = RuleTable::compile(&roles);
///
/// let read = RuleKey::exact("guest", &Resource::from("main"), &Privilege::from("read"));
/// assert!(table.contains(&read));
/// assert!(table.contains(&RuleKey::wildcard("admin", &Resource::from("admin"))));
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<RuleKey, Vec<Assertion>>,
}

impl RuleTable {
    /// Compiles the grants of every role into one table.
    ///
    /// A key produced twice (two roles sharing a name) keeps the last
    /// definition. [`RoleRegistry`](crate::registry::RoleRegistry) rejects
    /// duplicate names, so this only happens for unregistered role sets.
    pub fn compile<'a>(roles: impl IntoIterator<Item = &'a Role>) -> Self {
        let mut rules = HashMap::new();

        for role in roles {
            for (resource, grant) in role.grants() {
                match grant {
                    ResourceGrant::AllPrivileges => {
                        insert(
                            &mut rules,
                            RuleKey::wildcard(role.name(), resource),
                            Vec::new(),
                        );
                    }
                    ResourceGrant::Privileges(privileges) => {
                        for (privilege, assertions) in privileges {
                            insert(
                                &mut rules,
                                RuleKey::exact(role.name(), resource, privilege),
                                assertions.clone(),
                            );
                        }
                    }
                }
            }
        }

        debug!(rules = rules.len(), "Rule table compiled");
        Self { rules }
    }

    /// Returns the assertions bound to `key`, if the rule exists.
    pub fn get(&self, key: &RuleKey) -> Option<&[Assertion]> {
        self.rules.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &RuleKey) -> bool {
        self.rules.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &RuleKey> {
        self.rules.keys()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn insert(rules: &mut HashMap<RuleKey, Vec<Assertion>>, key: RuleKey, assertions: Vec<Assertion>) {
    if rules.contains_key(&key) {
        warn!(rule = %key, "Duplicate rule key, keeping last definition");
    }
    rules.insert(key, assertions);
}
