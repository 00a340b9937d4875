//! Assertions: predicates that condition a grant on a runtime object.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(Option<&dyn Any>) -> bool + Send + Sync;

/// Named predicate attached to a (resource, privilege) grant.
///
/// An assertion receives the optional context object passed to the query
/// (typically the record being accessed). It can only turn a matched grant
/// into a denial; it never grants on its own.
///
/// Predicates must be pure. A panic inside a predicate is not caught and
/// propagates to the caller of the query.
///
/// # Examples
///
/// ```
/// use bitacl::Assertion;
///
/// struct Record {
///     owner_id: u64,
/// }
///
/// let owns = Assertion::on("owns_record", |record: &Record| record.owner_id == 7);
///
/// assert!(owns.check(Some(&Record { owner_id: 7 })));
/// assert!(!owns.check(Some(&Record { owner_id: 8 })));
/// assert!(!owns.check(None));
/// ```
#[derive(Clone)]
pub struct Assertion {
    name: Arc<str>,
    predicate: Arc<Predicate>,
}

impl Assertion {
    /// Creates an assertion over the raw, type-erased context.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Option<&dyn Any>) -> bool + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            predicate: Arc::new(predicate),
        }
    }

    /// Creates an assertion over a context of type `T`.
    ///
    /// Evaluates to `false` when the context is absent or of another type.
    pub fn on<T, F>(name: impl Into<String>, predicate: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(name, move |ctx| {
            ctx.and_then(|value| value.downcast_ref::<T>())
                .is_some_and(|value| predicate(value))
        })
    }

    /// Returns the assertion's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the predicate to the query context.
    pub fn check(&self, ctx: Option<&dyn Any>) -> bool {
        (self.predicate)(ctx)
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Assertion").field(&self.name).finish()
    }
}
