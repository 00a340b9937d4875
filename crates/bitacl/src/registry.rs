//! Validated, immutable role set.
//!
//! The registry is the only way roles reach the compiler, the composer and
//! the evaluator. Registration checks eagerly what evaluation relies on:
//!
//! 1. Role names are non-empty and unique (they namespace rule keys)
//! 2. Identifiers are non-zero and unique
//! 3. Every parent name refers to a registered role
//! 4. Inheritance is acyclic, so traversal always terminates
//!
//! Identifiers may overlap (a multi-bit identifier describes a role group);
//! only exact duplicates are rejected.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{AclError, Result};
use crate::roles::Role;

/// DFS colouring used for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// Immutable set of validated roles, in registration order.
///
/// # Examples
///
/// ```
/// use bitacl::{AclError, Role, RoleRegistry};
/// use bitacl_types::RoleId;
///
/// let registry = RoleRegistry::new(vec![
///     Role::new(RoleId::bit(0), "guest"),
///     Role::new(RoleId::bit(1), "registered").inherits("guest"),
/// ])?;
/// assert_eq!(registry.len(), 2);
///
/// let cyclic = RoleRegistry::new(vec![
///     Role::new(RoleId::bit(0), "a").inherits("b"),
///     Role::new(RoleId::bit(1), "b").inherits("a"),
/// ]);
/// assert!(matches!(cyclic, Err(AclError::CircularInheritance(_))));
/// # Ok::<(), AclError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: Vec<Role>,

    /// Role name -> position in `roles`.
    index: HashMap<String, usize>,

    /// Parent positions per role, resolved once.
    parents: Vec<Vec<usize>>,
}

impl RoleRegistry {
    /// Validates and registers `roles`.
    pub fn new(roles: Vec<Role>) -> Result<Self> {
        let mut index = HashMap::with_capacity(roles.len());
        let mut by_id = HashMap::with_capacity(roles.len());

        for (position, role) in roles.iter().enumerate() {
            if role.name().is_empty() {
                return Err(AclError::InvalidRole(format!(
                    "role with identifier {} has an empty name",
                    role.id()
                )));
            }
            if role.id().is_zero() {
                return Err(AclError::ZeroRoleId {
                    name: role.name().to_string(),
                });
            }
            if index.insert(role.name().to_string(), position).is_some() {
                return Err(AclError::DuplicateRoleName(role.name().to_string()));
            }
            if let Some(first) = by_id.insert(role.id(), role.name()) {
                return Err(AclError::DuplicateRoleId {
                    id: role.id(),
                    first: first.to_string(),
                    second: role.name().to_string(),
                });
            }
        }

        let mut parents = Vec::with_capacity(roles.len());
        for role in &roles {
            let resolved = role
                .parents()
                .iter()
                .map(|parent| {
                    index
                        .get(parent)
                        .copied()
                        .ok_or_else(|| AclError::UnknownParent {
                            role: role.name().to_string(),
                            parent: parent.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            parents.push(resolved);
        }

        let registry = Self {
            roles,
            index,
            parents,
        };
        registry.check_acyclic()?;

        for (first, second) in registry.overlapping_ids() {
            debug!(first, second, "Role identifiers overlap");
        }
        debug!(roles = registry.roles.len(), "Role registry validated");
        Ok(registry)
    }

    /// Returns the role registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Role> {
        self.position(name).map(|position| &self.roles[position])
    }

    /// Iterates roles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn role_at(&self, position: usize) -> &Role {
        &self.roles[position]
    }

    pub(crate) fn parents_of(&self, position: usize) -> &[usize] {
        &self.parents[position]
    }

    /// Pairs of role names whose identifiers share bits, in registration order.
    fn overlapping_ids(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for (i, first) in self.roles.iter().enumerate() {
            for second in &self.roles[i + 1..] {
                if first.id().overlaps(second.id()) {
                    pairs.push((first.name(), second.name()));
                }
            }
        }
        pairs
    }

    /// Rejects inheritance cycles, reporting the first one found.
    ///
    /// Roots are visited in registration order so the reported path is
    /// deterministic.
    fn check_acyclic(&self) -> Result<()> {
        let mut state = vec![Visit::Unvisited; self.roles.len()];
        let mut path = Vec::new();

        for start in 0..self.roles.len() {
            if state[start] == Visit::Unvisited {
                self.visit(start, &mut state, &mut path)?;
            }
        }
        Ok(())
    }

    fn visit(&self, node: usize, state: &mut [Visit], path: &mut Vec<usize>) -> Result<()> {
        match state[node] {
            Visit::Done => return Ok(()),
            Visit::InProgress => {
                let start = path.iter().position(|&n| n == node).unwrap_or(0);
                let cycle: Vec<&str> = path[start..]
                    .iter()
                    .chain(std::iter::once(&node))
                    .map(|&n| self.roles[n].name())
                    .collect();
                return Err(AclError::CircularInheritance(cycle.join(" -> ")));
            }
            Visit::Unvisited => {}
        }

        state[node] = Visit::InProgress;
        path.push(node);
        for &parent in &self.parents[node] {
            self.visit(parent, state, path)?;
        }
        path.pop();
        state[node] = Visit::Done;

        Ok(())
    }
}

impl<'a> IntoIterator for &'a RoleRegistry {
    type Item = &'a Role;
    type IntoIter = std::slice::Iter<'a, Role>;

    fn into_iter(self) -> Self::IntoIter {
        self.roles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitacl_types::RoleId;

    #[test]
    fn test_registration_preserves_order() {
        let registry = RoleRegistry::new(vec![
            Role::new(RoleId::bit(2), "admin"),
            Role::new(RoleId::bit(0), "guest"),
            Role::new(RoleId::bit(1), "registered"),
        ])
        .unwrap();

        let names: Vec<&str> = registry.iter().map(Role::name).collect();
        assert_eq!(names, ["admin", "guest", "registered"]);
        assert_eq!(registry.get("guest").unwrap().id(), RoleId::bit(0));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = RoleRegistry::new(Vec::new()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_zero_identifier_rejected() {
        let result = RoleRegistry::new(vec![Role::new(RoleId::new(0), "nobody")]);
        assert_eq!(
            result.unwrap_err(),
            AclError::ZeroRoleId {
                name: "nobody".to_string()
            }
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = RoleRegistry::new(vec![Role::new(RoleId::bit(0), "")]);
        assert!(matches!(result, Err(AclError::InvalidRole(_))));
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let result = RoleRegistry::new(vec![
            Role::new(RoleId::bit(0), "guest"),
            Role::new(RoleId::bit(0), "visitor"),
        ]);

        match result {
            Err(AclError::DuplicateRoleId { id, first, second }) => {
                assert_eq!(id, RoleId::bit(0));
                assert_eq!(first, "guest");
                assert_eq!(second, "visitor");
            }
            other => panic!("Expected DuplicateRoleId, got {other:?}"),
        }
    }

    #[test]
    fn test_overlapping_group_identifier_allowed() {
        let registry = RoleRegistry::new(vec![
            Role::new(RoleId::bit(0), "reader"),
            Role::new(RoleId::bit(1), "writer"),
            Role::new(RoleId::new(0b11), "editor_group"),
        ])
        .unwrap();

        assert_eq!(
            registry.overlapping_ids(),
            [("reader", "editor_group"), ("writer", "editor_group")]
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = RoleRegistry::new(vec![
            Role::new(RoleId::bit(0), "guest"),
            Role::new(RoleId::bit(1), "guest"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            AclError::DuplicateRoleName("guest".to_string())
        );
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let result = RoleRegistry::new(vec![Role::new(RoleId::bit(1), "staff").inherits("guest")]);
        assert_eq!(
            result.unwrap_err(),
            AclError::UnknownParent {
                role: "staff".to_string(),
                parent: "guest".to_string()
            }
        );
    }

    #[test]
    fn test_self_inheritance_rejected() {
        let result = RoleRegistry::new(vec![Role::new(RoleId::bit(0), "loop").inherits("loop")]);
        assert_eq!(
            result.unwrap_err(),
            AclError::CircularInheritance("loop -> loop".to_string())
        );
    }

    #[test]
    fn test_multi_role_cycle_reports_path() {
        let result = RoleRegistry::new(vec![
            Role::new(RoleId::bit(0), "role_a").inherits("role_b"),
            Role::new(RoleId::bit(1), "role_b").inherits("role_c"),
            Role::new(RoleId::bit(2), "role_c").inherits("role_a"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            AclError::CircularInheritance("role_a -> role_b -> role_c -> role_a".to_string())
        );
    }

    #[test]
    fn test_partial_cycle_detected() {
        // role_a -> role_b <-> role_c, role_d standalone
        let result = RoleRegistry::new(vec![
            Role::new(RoleId::bit(3), "role_d"),
            Role::new(RoleId::bit(0), "role_a").inherits("role_b"),
            Role::new(RoleId::bit(1), "role_b").inherits("role_c"),
            Role::new(RoleId::bit(2), "role_c").inherits("role_b"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            AclError::CircularInheritance("role_b -> role_c -> role_b".to_string())
        );
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let registry = RoleRegistry::new(vec![
            Role::new(RoleId::bit(0), "base"),
            Role::new(RoleId::bit(1), "left").inherits("base"),
            Role::new(RoleId::bit(2), "right").inherits("base"),
            Role::new(RoleId::bit(3), "top").inherits("left").inherits("right"),
        ])
        .unwrap();

        let top = registry.position("top").unwrap();
        assert_eq!(registry.parents_of(top).len(), 2);
    }
}
