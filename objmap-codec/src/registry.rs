//! Strategy registry
//!
//! Type matchers are consulted newest first; the first one that recognises a
//! descriptor supplies its builder. When none does, the registry falls back
//! to the built-in strategy derived from the descriptor's structure, so
//! resolution never fails.

use crate::builder::DynObjectBuilder;
use objmap_model::{RecordPolicy, TypeDescriptor};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Rule mapping a descriptor to an optional builder
pub trait TypeMatcher: Send + Sync {
    /// Builder for `ty`, or `None` to let older matchers decide
    fn matches(&self, ty: &TypeDescriptor) -> Option<DynObjectBuilder>;
}

impl<F> TypeMatcher for F
where
    F: Fn(&TypeDescriptor) -> Option<DynObjectBuilder> + Send + Sync,
{
    fn matches(&self, ty: &TypeDescriptor) -> Option<DynObjectBuilder> {
        self(ty)
    }
}

/// Ordered set of type matchers owned by one mapper
#[derive(Clone, Default)]
pub struct Registry {
    matchers: Vec<Arc<dyn TypeMatcher>>,
    record_policy: RecordPolicy,
}

impl Registry {
    /// Empty registry with the lenient record policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry whose fallback record strategy uses `policy`
    pub fn with_record_policy(policy: RecordPolicy) -> Self {
        Self {
            matchers: Vec::new(),
            record_policy: policy,
        }
    }

    /// Record policy of the structural fallback
    pub fn record_policy(&self) -> RecordPolicy {
        self.record_policy
    }

    /// Append a matcher; it takes precedence over every earlier one
    pub fn register(&mut self, matcher: impl TypeMatcher + 'static) {
        self.matchers.push(Arc::new(matcher));
    }

    /// Append an already shared matcher
    pub fn register_shared(&mut self, matcher: Arc<dyn TypeMatcher>) {
        self.matchers.push(matcher);
    }

    /// Number of registered matchers
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether no matcher is registered
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Builder for `ty`
    pub fn resolve(&self, ty: &TypeDescriptor) -> DynObjectBuilder {
        if let Some(builder) = self.matchers.iter().rev().find_map(|m| m.matches(ty)) {
            trace!(shape = %ty, builder = builder.label(), "matcher resolved shape");
            return builder;
        }
        trace!(shape = %ty, "no matcher, using structural strategy");
        DynObjectBuilder::structural(ty, self.record_policy)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("matchers", &self.matchers.len())
            .field("record_policy", &self.record_policy)
            .finish()
    }
}

/// Ready-made matchers for the built-in strategies
pub mod matchers {
    use super::TypeMatcher;
    use crate::builder::{DynObjectBuilder, ObjectBuilder};
    use objmap_model::{RecordPolicy, TypeDescriptor};

    /// Sequence strategy for every sequence descriptor
    pub fn sequences() -> impl TypeMatcher {
        |ty: &TypeDescriptor| {
            ty.element()
                .map(|element| ObjectBuilder::sequence(element.clone()).erase())
        }
    }

    /// Record strategy with `policy` for every record descriptor
    pub fn records(policy: RecordPolicy) -> impl TypeMatcher {
        move |ty: &TypeDescriptor| {
            ty.as_record()
                .map(|class| ObjectBuilder::record(class.clone(), policy).erase())
        }
    }

    /// Bean strategy for every bean descriptor
    pub fn beans() -> impl TypeMatcher {
        |ty: &TypeDescriptor| {
            ty.as_bean()
                .map(|class| ObjectBuilder::bean(class.clone()).erase())
        }
    }

    /// `builder` for exactly `target`, nothing else
    pub fn exact(target: TypeDescriptor, builder: impl Into<DynObjectBuilder>) -> impl TypeMatcher {
        let builder = builder.into();
        move |ty: &TypeDescriptor| (*ty == target).then(|| builder.clone())
    }
}
