//! # bitacl: Bitmask role hierarchy access control
//!
//! Decides whether an identity may perform a privilege on a resource,
//! optionally conditioned on the object being accessed:
//! - **Bit-identified roles** with multiple inheritance
//! - **Compiled rule table** keyed by `role/resource/privilege`
//! - **Observer role** synthesized from an identity's role bitmask
//! - **Assertions** gating individual grants on a runtime object
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Vec<Role>                                   │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  RoleRegistry (validated, immutable)         │
//! │  ├─ unique names and identifiers             │
//! │  ├─ known parents                            │
//! │  └─ acyclic inheritance                      │
//! └────────┬───────────────────────┬────────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌──────────────────┐   ┌──────────────────────┐
//! │  RuleTable        │   │  compose(identity)   │
//! │  (compiled rules) │   │  -> observer role    │
//! └────────┬─────────┘   └──────────┬───────────┘
//!          └───────────┬────────────┘
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │  Evaluator                                   │
//! │  - exact rule + assertions                   │
//! │  - all-privileges rule                       │
//! │  - recursive OR over parents                 │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use bitacl::{Assertion, Evaluator, Identity, Role, RoleRegistry};
//! use bitacl_types::{IdentityId, Privilege, Resource, RoleId, RoleMask};
//!
//! struct Profile {
//!     owner_id: u64,
//! }
//!
//! let current_user = 7;
//! let registry = Arc::new(RoleRegistry::new(vec![
//!     Role::new(RoleId::bit(0), "guest").grant("main", "read"),
//!     Role::new(RoleId::bit(1), "registered")
//!         .inherits("guest")
//!         .grant_with(
//!             "profile",
//!             "edit",
//!             vec![Assertion::on("owns_profile", move |p: &Profile| {
//!                 p.owner_id == current_user
//!             })],
//!         ),
//!     Role::new(RoleId::bit(2), "admin").grant_all("admin"),
//! ])?);
//!
//! let identity = Identity::new(IdentityId::new(current_user), RoleMask::new(0b010));
//! let acl = Evaluator::new(registry, identity);
//!
//! let edit = Privilege::from("edit");
//! let profile = Resource::from("profile");
//!
//! assert!(acl.is_allowed(&Resource::from("main"), &Privilege::from("read"), None));
//! assert!(acl.is_allowed(&profile, &edit, Some(&Profile { owner_id: 7 })));
//! assert!(!acl.is_allowed(&profile, &edit, Some(&Profile { owner_id: 8 })));
//! assert!(!acl.is_allowed(&Resource::from("admin"), &Privilege::from("manage"), None));
//! # Ok::<(), bitacl::AclError>(())
//! ```
//!
//! ## Preconditions
//!
//! Assertions must be pure and must not panic; a panic propagates to the
//! caller of [`Evaluator::is_allowed`]. Roles are fixed once registered:
//! build a new registry and evaluator to change them.

pub mod assertion;
pub mod compiler;
pub mod composer;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod roles;

// Re-export commonly used types
pub use assertion::Assertion;
pub use compiler::{PrivilegeKey, RuleKey, RuleTable};
pub use composer::{Identity, compose};
pub use error::{AclError, Result};
pub use evaluator::{Decision, Evaluator};
pub use registry::RoleRegistry;
pub use roles::{ResourceGrant, Role};
