//! Ordered rule evaluation.
//!
//! A [`Matcher`] walks its rules top to bottom and stops at the first one
//! whose condition holds. Nothing after that rule is looked at, and results
//! are never merged. When no rule holds, the `on_no_match` value (if any)
//! is the answer.

use crate::{EvalStep, EvalTrace, FieldMatcher};
use std::fmt;
use std::marker::PhantomData;

/// Ordered rules plus a fallback.
///
/// The firewall builds one with a rule per user rule and the implicit deny
/// as `on_no_match`, so evaluation always yields a decision.
pub struct Matcher<Ctx, A: Clone + Send + Sync + 'static> {
    /// Rules in priority order.
    pub matcher_list: Vec<FieldMatcher<Ctx, A>>,
    pub on_no_match: Option<A>,
    _ctx: PhantomData<Ctx>,
}

impl<Ctx, A: Clone + Send + Sync + 'static> Matcher<Ctx, A> {
    pub fn new(matcher_list: Vec<FieldMatcher<Ctx, A>>, on_no_match: Option<A>) -> Self {
        Self {
            matcher_list,
            on_no_match,
            _ctx: PhantomData,
        }
    }

    /// No rules, no fallback: evaluates to `None` for every context.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    fn first_hit(&self, ctx: &Ctx) -> Option<&FieldMatcher<Ctx, A>> {
        self.matcher_list.iter().find(|rule| rule.matches(ctx))
    }

    /// The first matching rule's action, else the fallback.
    pub fn evaluate(&self, ctx: &Ctx) -> Option<A> {
        match self.first_hit(ctx) {
            Some(rule) => Some(rule.action.clone()),
            None => self.on_no_match.clone(),
        }
    }

    /// Evaluate while recording each rule looked at.
    ///
    /// The steps end at the deciding rule, so a rule shadowed by an earlier
    /// one never shows up. `result` is what [`evaluate`](Self::evaluate)
    /// returns.
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &Ctx) -> EvalTrace<A> {
        let mut steps = Vec::with_capacity(self.matcher_list.len());

        for (index, rule) in self.matcher_list.iter().enumerate() {
            let predicate_trace = rule.predicate.evaluate_with_trace(ctx);
            let matched = predicate_trace.matched();
            steps.push(EvalStep {
                index,
                matched,
                predicate_trace,
            });
            if matched {
                return EvalTrace {
                    result: Some(rule.action.clone()),
                    steps,
                    used_fallback: false,
                };
            }
        }

        EvalTrace {
            used_fallback: self.has_fallback(),
            result: self.on_no_match.clone(),
            steps,
        }
    }

    /// Rule count; the fallback is not a rule.
    pub fn len(&self) -> usize {
        self.matcher_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matcher_list.is_empty()
    }

    pub fn has_fallback(&self) -> bool {
        self.on_no_match.is_some()
    }
}

impl<Ctx, A: Clone + Send + Sync + fmt::Debug + 'static> fmt::Debug for Matcher<Ctx, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("rules", &self.matcher_list.len())
            .field("on_no_match", &self.on_no_match)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataInput, IntMatcher, MatchingData, Predicate, SinglePredicate};

    #[derive(Debug, Clone, Copy)]
    struct Flow {
        port: u16,
    }

    #[derive(Debug)]
    struct PortInput;

    impl DataInput<Flow> for PortInput {
        fn get(&self, ctx: &Flow) -> MatchingData {
            ctx.port.into()
        }
    }

    fn on_port(port: i64, verdict: &'static str) -> FieldMatcher<Flow, &'static str> {
        FieldMatcher::new(
            Predicate::Single(SinglePredicate::new(
                Box::new(PortInput),
                Box::new(IntMatcher::new(port)),
            )),
            verdict,
        )
    }

    fn any_port(verdict: &'static str) -> FieldMatcher<Flow, &'static str> {
        FieldMatcher::new(Predicate::catch_all(), verdict)
    }

    const SSH: Flow = Flow { port: 22 };
    const WEB: Flow = Flow { port: 80 };

    #[test]
    fn earlier_rule_shadows_later_one() {
        let block_first = Matcher::new(vec![any_port("block"), any_port("permit")], None);
        assert_eq!(block_first.evaluate(&WEB), Some("block"));

        let permit_first = Matcher::new(vec![any_port("permit"), any_port("block")], None);
        assert_eq!(permit_first.evaluate(&WEB), Some("permit"));
    }

    #[test]
    fn falls_through_to_later_rule() {
        let matcher = Matcher::new(vec![on_port(22, "block"), on_port(80, "permit")], Some("deny"));
        assert_eq!(matcher.len(), 2);
        assert_eq!(matcher.evaluate(&WEB), Some("permit"));
        assert_eq!(matcher.evaluate(&SSH), Some("block"));
        assert_eq!(matcher.evaluate(&Flow { port: 443 }), Some("deny"));
    }

    #[test]
    fn no_fallback_means_no_answer() {
        let matcher = Matcher::new(vec![on_port(22, "block")], None);
        assert!(!matcher.has_fallback());
        assert_eq!(matcher.evaluate(&WEB), None);
        assert_eq!(Matcher::<Flow, &str>::empty().evaluate(&WEB), None);
    }

    #[test]
    fn rule_free_matcher_answers_with_fallback() {
        let matcher: Matcher<Flow, &str> = Matcher::new(Vec::new(), Some("deny"));
        assert!(matcher.is_empty());
        assert_eq!(matcher.evaluate(&SSH), Some("deny"));
    }

    #[test]
    fn trace_ends_at_deciding_rule() {
        let matcher = Matcher::new(
            vec![on_port(22, "block"), on_port(80, "permit"), any_port("never")],
            Some("deny"),
        );

        let trace = matcher.evaluate_with_trace(&WEB);
        assert_eq!(trace.result, matcher.evaluate(&WEB));
        assert_eq!(trace.steps.len(), 2);
        assert_eq!(trace.matched_index(), Some(1));
        assert!(!trace.used_fallback);
    }

    #[test]
    fn trace_marks_fallback() {
        let matcher = Matcher::new(vec![on_port(22, "block")], Some("deny"));

        let trace = matcher.evaluate_with_trace(&WEB);
        assert_eq!(trace.result, Some("deny"));
        assert_eq!(trace.steps.len(), 1);
        assert!(trace.used_fallback);

        let bare = Matcher::new(vec![on_port(22, "block")], None);
        assert!(!bare.evaluate_with_trace(&WEB).used_fallback);
    }

    #[test]
    fn debug_shows_rule_count() {
        let matcher = Matcher::new(vec![on_port(22, "block")], Some("deny"));
        assert_eq!(
            format!("{matcher:?}"),
            r#"Matcher { rules: 1, on_no_match: Some("deny") }"#
        );
    }

    #[test]
    fn matcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Matcher<Flow, &'static str>>();
    }
}
