//! Conditions over a context.
//!
//! A rule's condition is a conjunction: every concrete field of the rule
//! contributes one [`SinglePredicate`] and all of them must hold. Fields left
//! open contribute nothing, so a rule with no concrete field is the empty
//! conjunction and holds for every context.

use crate::{DataInput, InputMatcher, MatchingData, PredicateTrace};
use std::fmt;

/// One field test: read a value with a [`DataInput`], test it with an
/// [`InputMatcher`].
///
/// Absent data never matches. When the input yields [`MatchingData::None`]
/// the matcher is not consulted and the test fails.
pub struct SinglePredicate<Ctx> {
    input: Box<dyn DataInput<Ctx>>,
    matcher: Box<dyn InputMatcher>,
}

impl<Ctx> SinglePredicate<Ctx> {
    #[must_use]
    pub fn new(input: Box<dyn DataInput<Ctx>>, matcher: Box<dyn InputMatcher>) -> Self {
        Self { input, matcher }
    }

    #[must_use]
    pub fn input(&self) -> &dyn DataInput<Ctx> {
        &*self.input
    }

    #[must_use]
    pub fn matcher(&self) -> &dyn InputMatcher {
        &*self.matcher
    }

    fn accepts(&self, data: &MatchingData) -> bool {
        !data.is_none() && self.matcher.matches(data)
    }

    pub fn evaluate(&self, ctx: &Ctx) -> bool {
        self.accepts(&self.input.get(ctx))
    }

    /// Same verdict as [`evaluate`](Self::evaluate), plus what was read and
    /// what it was compared against.
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &Ctx) -> PredicateTrace {
        let data = self.input.get(ctx);
        PredicateTrace::Single {
            matched: self.accepts(&data),
            input: format!("{:?}", self.input),
            data: format!("{data:?}"),
            matcher: format!("{:?}", self.matcher),
        }
    }
}

impl<Ctx> fmt::Debug for SinglePredicate<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ~ {:?}", self.input, self.matcher)
    }
}

/// A field test, or a conjunction of them.
///
/// `And(vec![])` is vacuously true; see [`Predicate::catch_all`].
pub enum Predicate<Ctx> {
    Single(SinglePredicate<Ctx>),
    And(Vec<Predicate<Ctx>>),
}

impl<Ctx> Predicate<Ctx> {
    /// The empty conjunction: holds for every context.
    #[must_use]
    pub fn catch_all() -> Self {
        Self::And(Vec::new())
    }

    /// Conjoin `conditions`, avoiding a wrapper where one is not needed:
    /// none gives [`catch_all`](Self::catch_all), one is returned as is.
    #[must_use]
    pub fn from_all(mut conditions: Vec<Self>) -> Self {
        if conditions.len() == 1 {
            if let Some(only) = conditions.pop() {
                return only;
            }
        }
        Self::And(conditions)
    }

    /// Stops at the first failing condition.
    pub fn evaluate(&self, ctx: &Ctx) -> bool {
        match self {
            Self::Single(single) => single.evaluate(ctx),
            Self::And(conditions) => conditions.iter().all(|c| c.evaluate(ctx)),
        }
    }

    /// Traces every condition, even after one has failed, so an explanation
    /// shows each field of the rule. The overall verdict matches
    /// [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &Ctx) -> PredicateTrace {
        match self {
            Self::Single(single) => single.evaluate_with_trace(ctx),
            Self::And(conditions) => {
                let children: Vec<PredicateTrace> =
                    conditions.iter().map(|c| c.evaluate_with_trace(ctx)).collect();
                PredicateTrace::And {
                    matched: children.iter().all(PredicateTrace::matched),
                    children,
                }
            }
        }
    }

    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::And(conditions) if conditions.is_empty())
    }

    /// Field tests in this condition, counting through nested conjunctions.
    #[must_use]
    pub fn condition_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::And(conditions) => conditions.iter().map(Self::condition_count).sum(),
        }
    }
}

impl<Ctx> fmt::Debug for Predicate<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(single) => single.fmt(f),
            Self::And(conditions) if conditions.is_empty() => f.write_str("CatchAll"),
            Self::And(conditions) => f.debug_list().entries(conditions).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExactMatcher, IntMatcher};

    #[derive(Debug, Clone)]
    struct Flow {
        protocol: &'static str,
        port: u16,
    }

    #[derive(Debug)]
    struct ProtocolInput;

    impl DataInput<Flow> for ProtocolInput {
        fn get(&self, ctx: &Flow) -> MatchingData {
            ctx.protocol.into()
        }
    }

    #[derive(Debug)]
    struct PortInput;

    impl DataInput<Flow> for PortInput {
        fn get(&self, ctx: &Flow) -> MatchingData {
            ctx.port.into()
        }
    }

    #[derive(Debug)]
    struct MissingInput;

    impl DataInput<Flow> for MissingInput {
        fn get(&self, _ctx: &Flow) -> MatchingData {
            MatchingData::None
        }
    }

    const HTTPS: Flow = Flow {
        protocol: "TCP",
        port: 443,
    };

    fn protocol_is(expected: &str) -> Predicate<Flow> {
        Predicate::Single(SinglePredicate::new(
            Box::new(ProtocolInput),
            Box::new(ExactMatcher::new(expected)),
        ))
    }

    fn port_is(expected: i64) -> Predicate<Flow> {
        Predicate::Single(SinglePredicate::new(
            Box::new(PortInput),
            Box::new(IntMatcher::new(expected)),
        ))
    }

    #[test]
    fn single_field_test() {
        assert!(protocol_is("TCP").evaluate(&HTTPS));
        assert!(!protocol_is("UDP").evaluate(&HTTPS));
        assert!(port_is(443).evaluate(&HTTPS));
    }

    #[test]
    fn missing_data_never_matches() {
        let test = SinglePredicate::new(Box::new(MissingInput), Box::new(ExactMatcher::new("")));
        assert!(!test.evaluate(&HTTPS));
        assert!(!test.evaluate_with_trace(&HTTPS).matched());
    }

    #[test]
    fn conjunction_needs_every_field() {
        assert!(Predicate::And(vec![protocol_is("TCP"), port_is(443)]).evaluate(&HTTPS));
        assert!(!Predicate::And(vec![protocol_is("TCP"), port_is(80)]).evaluate(&HTTPS));
    }

    #[test]
    fn catch_all_holds_everywhere() {
        let any = Predicate::<Flow>::catch_all();
        assert!(any.is_catch_all());
        assert_eq!(any.condition_count(), 0);
        assert!(any.evaluate(&HTTPS));
        assert!(any.evaluate(&Flow {
            protocol: "ICMP",
            port: 1
        }));
    }

    #[test]
    fn from_all_avoids_needless_wrapping() {
        assert!(Predicate::<Flow>::from_all(vec![]).is_catch_all());
        assert!(matches!(
            Predicate::from_all(vec![port_is(443)]),
            Predicate::Single(_)
        ));

        let web = Predicate::from_all(vec![protocol_is("TCP"), port_is(443)]);
        assert!(matches!(web, Predicate::And(ref cs) if cs.len() == 2));
        assert_eq!(web.condition_count(), 2);
    }

    #[test]
    fn trace_keeps_going_after_a_failure() {
        let rule = Predicate::And(vec![protocol_is("UDP"), port_is(443)]);
        let PredicateTrace::And { matched, children } = rule.evaluate_with_trace(&HTTPS) else {
            panic!("expected a conjunction trace");
        };
        assert!(!matched);
        assert_eq!(children.len(), 2);
        assert!(!children[0].matched());
        assert!(children[1].matched());
    }

    #[test]
    fn debug_output() {
        assert_eq!(format!("{:?}", Predicate::<Flow>::catch_all()), "CatchAll");
        let shown = format!("{:?}", port_is(443));
        assert!(shown.contains("PortInput") && shown.contains("443"), "{shown}");
    }

    #[test]
    fn predicate_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Predicate<Flow>>();
    }
}
