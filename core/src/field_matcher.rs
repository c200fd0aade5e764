//! `FieldMatcher` — Predicate + action combination
//!
//! A `FieldMatcher` binds a predicate to the action returned when it matches.
//! The top-level `Matcher` contains an ordered list of field matchers.

use crate::Predicate;
use core::fmt::Debug;

/// A field matcher: predicate + action.
///
/// # Type Parameters
///
/// - `Ctx`: The context type
/// - `A`: The action type (must be `Clone + Send + Sync + 'static`)
pub struct FieldMatcher<Ctx, A: Clone + Send + Sync + 'static> {
    /// The predicate to evaluate.
    pub predicate: Predicate<Ctx>,

    /// Returned when the predicate matches.
    pub action: A,
}

impl<Ctx, A: Clone + Send + Sync + 'static> FieldMatcher<Ctx, A> {
    /// Create a new field matcher.
    pub fn new(predicate: Predicate<Ctx>, action: A) -> Self {
        Self { predicate, action }
    }

    /// Evaluate the predicate against the context.
    pub fn matches(&self, ctx: &Ctx) -> bool {
        self.predicate.evaluate(ctx)
    }
}

impl<Ctx, A: Clone + Send + Sync + Debug + 'static> Debug for FieldMatcher<Ctx, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldMatcher")
            .field("predicate", &self.predicate)
            .field("action", &self.action)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataInput, ExactMatcher, MatchingData, SinglePredicate};

    #[derive(Debug, Clone)]
    struct TestCtx {
        value: String,
    }

    #[derive(Debug)]
    struct ValueInput;

    impl DataInput<TestCtx> for ValueInput {
        fn get(&self, ctx: &TestCtx) -> MatchingData {
            MatchingData::String(ctx.value.clone())
        }
    }

    #[test]
    fn test_field_matcher_matches() {
        let field_matcher: FieldMatcher<TestCtx, String> = FieldMatcher::new(
            Predicate::Single(SinglePredicate::new(
                Box::new(ValueInput),
                Box::new(ExactMatcher::new("hello")),
            )),
            "matched".to_string(),
        );

        assert!(field_matcher.matches(&TestCtx {
            value: "hello".to_string(),
        }));
        assert!(!field_matcher.matches(&TestCtx {
            value: "world".to_string(),
        }));
    }

    #[test]
    fn test_field_matcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FieldMatcher<TestCtx, String>>();
    }
}
