//! Access decision engine.
//!
//! Answers "may this identity perform `privilege` on `resource`?" by
//! looking up compiled rules for the identity's observer role and every
//! role it inherits from. A role allows when:
//!
//! 1. its exact rule exists and every bound assertion holds, or
//! 2. it has an all-privileges rule for the resource, or
//! 3. any of its parents allows.
//!
//! There are no deny rules. A missing rule is the only denial, and
//! assertions can only turn a matched rule into a denial.

use std::any::Any;
use std::sync::Arc;

use bitacl_types::{Privilege, Resource};
use serde::Serialize;
use tracing::{debug, trace};

use crate::compiler::{RuleKey, RuleTable};
use crate::composer::{Identity, compose};
use crate::registry::RoleRegistry;
use crate::roles::Role;

// ============================================================================
// Decision
// ============================================================================

/// Explained result of an access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Whether access is allowed.
    pub allowed: bool,
    /// The role whose rule granted access, or `None` when denied.
    pub granted_by: Option<String>,
    /// The matched rule key (`role/resource/privilege`), or `None` when denied.
    pub matched_rule: Option<String>,
    /// Human-readable explanation of why this decision was made.
    pub reason: String,
}

// ============================================================================
// Evaluator
// ============================================================================

/// Access decisions for one identity over one registered role set.
///
/// The rule table and the observer role are built once in the constructor
/// and never change, so an evaluator can be shared across threads and
/// queried concurrently. Assertions must be thread-safe for that to hold;
/// [`Assertion`](crate::Assertion) requires `Send + Sync`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use bitacl::{Evaluator, Identity, Role, RoleRegistry};
/// use bitacl_types::{IdentityId, Privilege, Resource, RoleId, RoleMask};
///
/// let registry = Arc::new(RoleRegistry::new(vec![
///     Role::new(RoleId::bit(0), "guest").grant("main", "read"),
///     Role::new(RoleId::bit(1), "registered")
///         .inherits("guest")
///         .grant("user", "loggedIn"),
/// ])?);
///
/// let identity = Identity::new(IdentityId::new(7), RoleMask::new(0b10));
/// let evaluator = Evaluator::new(registry, identity);
///
/// assert!(evaluator.is_allowed(&Resource::from("main"), &Privilege::from("read"), None));
/// assert!(!evaluator.is_allowed(&Resource::from("admin"), &Privilege::from("manage"), None));
///
/// let decision = evaluator.check(&Resource::from("main"), &Privilege::from("read"), None);
/// assert_eq!(decision.granted_by.as_deref(), Some("guest"));
/// # Ok::<(), bitacl::AclError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    registry: Arc<RoleRegistry>,
    rules: Arc<RuleTable>,
    identity: Identity,

    /// Synthesized role holding the identity's roles as parents.
    observer: Role,

    /// Registry positions of the observer's parents.
    observer_parents: Vec<usize>,
}

impl Evaluator {
    /// Compiles the registry's rules and composes the identity's observer role.
    pub fn new(registry: Arc<RoleRegistry>, identity: Identity) -> Self {
        let rules = Arc::new(RuleTable::compile(registry.iter()));
        Self::with_rules(registry, rules, identity)
    }

    /// Creates an evaluator for another identity, reusing this compiled table.
    ///
    /// The table was compiled from the same registry, so both evaluators
    /// observe the same role set.
    pub fn for_identity(&self, identity: Identity) -> Self {
        Self::with_rules(Arc::clone(&self.registry), Arc::clone(&self.rules), identity)
    }

    fn with_rules(registry: Arc<RoleRegistry>, rules: Arc<RuleTable>, identity: Identity) -> Self {
        let observer = compose(&identity, &registry);
        let observer_parents: Vec<usize> = observer
            .parents()
            .iter()
            .filter_map(|name| registry.position(name))
            .collect();

        debug!(
            identity = %identity.id(),
            mask = %identity.mask(),
            roles = observer_parents.len(),
            rules = rules.len(),
            "Evaluator ready"
        );

        Self {
            registry,
            rules,
            identity,
            observer,
            observer_parents,
        }
    }

    /// Returns whether the identity may perform `privilege` on `resource`.
    ///
    /// `context` is handed to the assertions of matching rules; pass the
    /// object being accessed, or `None` for checks that are not
    /// object-scoped. Unknown resources and privileges are denied.
    pub fn is_allowed(
        &self,
        resource: &Resource,
        privilege: &Privilege,
        context: Option<&dyn Any>,
    ) -> bool {
        self.decide(resource, privilege, context).is_some()
    }

    /// Like [`is_allowed`](Self::is_allowed), explaining which rule granted.
    ///
    /// When several roles grant, the first found depth-first in parent
    /// order is reported.
    pub fn check(
        &self,
        resource: &Resource,
        privilege: &Privilege,
        context: Option<&dyn Any>,
    ) -> Decision {
        match self.decide(resource, privilege, context) {
            Some(key) => Decision {
                allowed: true,
                reason: format!("Granted by role '{}' via rule '{key}'", key.role),
                granted_by: Some(key.role.clone()),
                matched_rule: Some(key.to_string()),
            },
            None => Decision {
                allowed: false,
                granted_by: None,
                matched_rule: None,
                reason: format!(
                    "No role held by identity {} grants '{privilege}' on '{resource}'",
                    self.identity.id()
                ),
            },
        }
    }

    /// Evaluates a registered role on its own, with its ancestors.
    ///
    /// Returns `None` if no role is registered under `role`.
    pub fn role_allows(
        &self,
        role: &str,
        resource: &Resource,
        privilege: &Privilege,
        context: Option<&dyn Any>,
    ) -> Option<bool> {
        let position = self.registry.position(role)?;
        Some(
            self.grant_source(&[position], resource, privilege, context)
                .is_some(),
        )
    }

    /// Returns whether the identity holds any registered role.
    pub fn is_authenticated(&self) -> bool {
        !self.observer_parents.is_empty()
    }

    /// Returns the synthesized observer role.
    pub fn observer(&self) -> &Role {
        &self.observer
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn decide(
        &self,
        resource: &Resource,
        privilege: &Privilege,
        context: Option<&dyn Any>,
    ) -> Option<RuleKey> {
        // The observer has no grants of its own; only its parents can allow.
        let source = self.grant_source(&self.observer_parents, resource, privilege, context);

        debug!(
            identity = %self.identity.id(),
            resource = %resource,
            privilege = %privilege,
            allowed = source.is_some(),
            rule = source.as_ref().map(ToString::to_string),
            "Access evaluated"
        );

        source
    }

    /// Searches `roots` and their ancestors for a granting rule.
    ///
    /// Each role is visited at most once, so shared ancestors in diamond
    /// hierarchies are only evaluated once per query.
    fn grant_source(
        &self,
        roots: &[usize],
        resource: &Resource,
        privilege: &Privilege,
        context: Option<&dyn Any>,
    ) -> Option<RuleKey> {
        let mut visited = vec![false; self.registry.len()];
        roots
            .iter()
            .find_map(|&root| self.search(root, resource, privilege, context, &mut visited))
    }

    fn search(
        &self,
        position: usize,
        resource: &Resource,
        privilege: &Privilege,
        context: Option<&dyn Any>,
        visited: &mut [bool],
    ) -> Option<RuleKey> {
        if std::mem::replace(&mut visited[position], true) {
            return None;
        }

        let role = self.registry.role_at(position);
        if let Some(key) = self.direct_grant(role, resource, privilege, context) {
            return Some(key);
        }

        self.registry
            .parents_of(position)
            .iter()
            .find_map(|&parent| self.search(parent, resource, privilege, context, visited))
    }

    /// Checks `role`'s own rules, ignoring inheritance.
    fn direct_grant(
        &self,
        role: &Role,
        resource: &Resource,
        privilege: &Privilege,
        context: Option<&dyn Any>,
    ) -> Option<RuleKey> {
        let exact = RuleKey::exact(role.name(), resource, privilege);
        if let Some(assertions) = self.rules.get(&exact) {
            match assertions.iter().find(|assertion| !assertion.check(context)) {
                None => return Some(exact),
                Some(failed) => {
                    trace!(rule = %exact, assertion = failed.name(), "Assertion failed");
                }
            }
        }

        let wildcard = RuleKey::wildcard(role.name(), resource);
        if self.rules.contains(&wildcard) {
            return Some(wildcard);
        }

        trace!(role = role.name(), "No granting rule");
        None
    }
}
