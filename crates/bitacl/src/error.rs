//! Configuration errors detected when a role set is registered.

use bitacl_types::RoleId;
use thiserror::Error;

/// Error type for role registration.
///
/// Evaluation itself never fails: an unknown resource or privilege is a
/// plain denial. Everything here is raised once, before any query runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
    /// Role definition is malformed (e.g. empty name).
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Role identifier has no bits set.
    #[error("Role '{name}' has identifier 0")]
    ZeroRoleId { name: String },

    /// Two roles share the same identifier.
    #[error("Roles '{first}' and '{second}' share identifier {id}")]
    DuplicateRoleId {
        id: RoleId,
        first: String,
        second: String,
    },

    /// Role name is registered twice.
    #[error("Duplicate role name: {0}")]
    DuplicateRoleName(String),

    /// Role inherits from a name that is not registered.
    #[error("Role '{role}' inherits from unknown role '{parent}'")]
    UnknownParent { role: String, parent: String },

    /// Inheritance graph contains a cycle.
    #[error("Circular inheritance detected: {0}")]
    CircularInheritance(String),
}

/// Result type for role registration.
pub type Result<T> = std::result::Result<T, AclError>;
