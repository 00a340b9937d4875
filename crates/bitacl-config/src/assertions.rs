//! Named assertions that role files can reference.

use std::collections::HashMap;

use bitacl::Assertion;

/// Assertions available to role definitions, keyed by name.
///
/// Role files cannot carry code; they name assertions, and the host
/// registers the predicates under those names before building roles.
#[derive(Debug, Clone, Default)]
pub struct AssertionRegistry {
    assertions: HashMap<String, Assertion>,
}

impl AssertionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `assertion` under its own name, replacing any previous one.
    pub fn register(&mut self, assertion: Assertion) {
        self.assertions
            .insert(assertion.name().to_string(), assertion);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, assertion: Assertion) -> Self {
        self.register(assertion);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Assertion> {
        self.assertions.get(name)
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }
}
