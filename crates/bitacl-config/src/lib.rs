//! Role definition loading for bitacl
//!
//! Role sets are described in TOML and layered from several files (see
//! [`ConfigLoader`]). Files name assertions instead of carrying code; the
//! host registers the predicates in an [`AssertionRegistry`] and
//! [`AclConfig::build`] resolves them while building the
//! [`RoleRegistry`](bitacl::RoleRegistry).
//!
//! ```toml
//! [[roles]]
//! id = 1
//! name = "guest"
//!
//! [[roles.rules]]
//! resource = "main"
//! privileges = ["read"]
//!
//! [[roles]]
//! id = 2
//! name = "registered"
//! parents = ["guest"]
//!
//! [[roles.rules]]
//! resource = "profile"
//! privileges = ["edit"]
//! assertions = ["owns_profile"]
//!
//! [[roles]]
//! id = 4
//! name = "admin"
//!
//! # No privileges listed: every privilege on the resource
//! [[roles.rules]]
//! resource = "admin"
//! ```

use bitacl::{Assertion, Role, RoleRegistry};
use bitacl_types::RoleId;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod assertions;
mod error;
mod loader;

pub use assertions::AssertionRegistry;
pub use error::ConfigError;
pub use loader::ConfigLoader;

/// Complete role set definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    pub roles: Vec<RoleConfig>,
}

/// One role: identifier bit pattern, name, parents and rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Grant on one resource
///
/// An empty `privileges` list grants every privilege on the resource and
/// cannot carry assertions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub resource: String,
    #[serde(default)]
    pub privileges: Vec<String>,
    #[serde(default)]
    pub assertions: Vec<String>,
}

impl AclConfig {
    /// Parse a role set from a TOML string
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load role definitions from default locations
    pub fn load() -> anyhow::Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load role definitions from a specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Merge a higher-precedence layer into this one
    ///
    /// Roles with a name already present replace the existing definition in
    /// place; new roles are appended.
    pub fn merge(&mut self, layer: AclConfig) {
        for role in layer.roles {
            match self.roles.iter_mut().find(|r| r.name == role.name) {
                Some(existing) => *existing = role,
                None => self.roles.push(role),
            }
        }
    }

    /// Resolve assertion names and build a validated role registry
    pub fn build(&self, assertions: &AssertionRegistry) -> Result<RoleRegistry, ConfigError> {
        let roles = self
            .roles
            .iter()
            .map(|role| role.to_role(assertions))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RoleRegistry::new(roles)?)
    }
}

impl RoleConfig {
    fn to_role(&self, assertions: &AssertionRegistry) -> Result<Role, ConfigError> {
        let mut role = Role::new(RoleId::new(self.id), self.name.clone());
        for parent in &self.parents {
            role = role.inherits(parent.clone());
        }

        for rule in &self.rules {
            if rule.privileges.is_empty() {
                if !rule.assertions.is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "role '{}' attaches assertions to all privileges on '{}'",
                        self.name, rule.resource
                    )));
                }
                role = role.grant_all(rule.resource.as_str());
                continue;
            }

            let resolved = rule
                .assertions
                .iter()
                .map(|name| {
                    assertions
                        .get(name)
                        .cloned()
                        .ok_or_else(|| ConfigError::UnknownAssertion {
                            role: self.name.clone(),
                            assertion: name.clone(),
                        })
                })
                .collect::<Result<Vec<Assertion>, _>>()?;

            for privilege in &rule.privileges {
                role = role.grant_with(
                    rule.resource.as_str(),
                    privilege.as_str(),
                    resolved.clone(),
                );
            }
        }

        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitacl::{AclError, Evaluator, Identity, ResourceGrant};
    use bitacl_types::{IdentityId, Privilege, Resource, RoleMask};
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    const ROLES: &str = r#"
[[roles]]
id = 1
name = "guest"

[[roles.rules]]
resource = "main"
privileges = ["read"]

[[roles]]
id = 2
name = "registered"
parents = ["guest"]

[[roles.rules]]
resource = "user"
privileges = ["loggedIn"]

[[roles]]
id = 4
name = "admin"

[[roles.rules]]
resource = "admin"
"#;

    #[test]
    fn test_parse_roles() {
        let config = AclConfig::from_toml_str(ROLES).unwrap();

        assert_eq!(config.roles.len(), 3);
        assert_eq!(config.roles[0].rules[0].resource, "main");
        assert!(config.roles[2].rules[0].privileges.is_empty());
        assert!(config.roles[0].parents.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let result = AclConfig::from_toml_str("[[roles]]\nname = \"guest\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_build_scenario() {
        let registry = AclConfig::from_toml_str(ROLES)
            .unwrap()
            .build(&AssertionRegistry::new())
            .unwrap();

        let admin = registry.get("admin").unwrap();
        assert!(matches!(
            admin.grant_for(&Resource::from("admin")),
            Some(ResourceGrant::AllPrivileges)
        ));

        let evaluator = Evaluator::new(
            Arc::new(registry),
            Identity::new(IdentityId::new(1), RoleMask::new(2)),
        );
        let check =
            |r: &str, p: &str| evaluator.is_allowed(&Resource::from(r), &Privilege::from(p), None);
        assert!(check("main", "read"));
        assert!(check("user", "loggedIn"));
        assert!(!check("admin", "manage"));
    }

    #[test]
    fn test_unknown_assertion() {
        let config = AclConfig::from_toml_str(
            r#"
[[roles]]
id = 1
name = "owner"

[[roles.rules]]
resource = "profile"
privileges = ["edit"]
assertions = ["owns_profile"]
"#,
        )
        .unwrap();

        match config.build(&AssertionRegistry::new()) {
            Err(ConfigError::UnknownAssertion { role, assertion }) => {
                assert_eq!(role, "owner");
                assert_eq!(assertion, "owns_profile");
            }
            other => panic!("Expected UnknownAssertion, got {other:?}"),
        }
    }

    #[test]
    fn test_wildcard_with_assertions_rejected() {
        let config = AclConfig::from_toml_str(
            r#"
[[roles]]
id = 1
name = "admin"

[[roles.rules]]
resource = "admin"
assertions = ["anything"]
"#,
        )
        .unwrap();

        let assertions = AssertionRegistry::new().with(Assertion::new("anything", |_| true));
        assert!(matches!(
            config.build(&assertions),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_invalid_role_set_surfaces_acl_error() {
        let config = AclConfig::from_toml_str(
            r#"
[[roles]]
id = 1
name = "staff"
parents = ["ghost"]
"#,
        )
        .unwrap();

        assert!(matches!(
            config.build(&AssertionRegistry::new()),
            Err(ConfigError::Acl(AclError::UnknownParent { .. }))
        ));
    }

    #[test]
    fn test_load_from_dir() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("bitacl.toml"), ROLES).expect("Failed to write config");

        let config = AclConfig::load_from_dir(temp_dir.path()).expect("Failed to load config");

        let registered = config
            .roles
            .iter()
            .find(|r| r.name == "registered")
            .expect("project role loaded");
        assert_eq!(registered.parents, ["guest"]);
        assert!(config.roles.iter().any(|r| r.name == "admin"));
    }

    #[test]
    fn test_load_from_dir_rejects_malformed_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("bitacl.toml"), "[[roles]]\nid = \"one\"\n")
            .expect("Failed to write config");

        let err = AclConfig::load_from_dir(temp_dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("bitacl.toml"));
    }

    #[test]
    fn test_merge_replaces_by_name() {
        let mut base = AclConfig::from_toml_str(ROLES).unwrap();
        let layer = AclConfig::from_toml_str(
            r#"
[[roles]]
id = 2
name = "registered"

[[roles]]
id = 8
name = "auditor"
"#,
        )
        .unwrap();

        base.merge(layer);

        let names: Vec<&str> = base.roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["guest", "registered", "admin", "auditor"]);
        assert!(base.roles[1].parents.is_empty());
    }
}
