//! Evaluation trace types for explaining matcher decisions.
//!
//! Trace types mirror the runtime types ([`Predicate`](crate::Predicate),
//! [`Matcher`](crate::Matcher)) but capture evaluation results instead of
//! inputs.
//!
//! - [`PredicateTrace`] — Per-predicate: which conditions held?
//! - [`EvalTrace`] — Per-matcher: which field matchers were checked, and did
//!   the fallback decide?

use std::fmt;

/// Trace of a predicate evaluation.
///
/// In `And`, ALL children are evaluated (no short-circuit) for maximum
/// debugging value. The `matched` result is still correct.
pub enum PredicateTrace {
    /// A single predicate evaluation.
    Single {
        /// Whether this predicate matched.
        matched: bool,
        /// Debug description of the `DataInput` (e.g., `"DestPortInput"`).
        input: String,
        /// The `MatchingData` extracted from context (Debug format).
        data: String,
        /// Debug description of the `InputMatcher` (e.g., `"IntMatcher { expected: 443 }"`).
        matcher: String,
    },
    /// AND: all children must match.
    And {
        /// Whether all children matched.
        matched: bool,
        /// Trace of each child (all evaluated, no short-circuit).
        children: Vec<PredicateTrace>,
    },
}

impl PredicateTrace {
    /// Get the overall match result of this predicate.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Single { matched, .. } | Self::And { matched, .. } => *matched,
        }
    }
}

impl fmt::Debug for PredicateTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single {
                matched,
                input,
                data,
                matcher,
            } => f
                .debug_struct("Single")
                .field("matched", matched)
                .field("input", input)
                .field("data", data)
                .field("matcher", matcher)
                .finish(),
            Self::And { matched, children } => f
                .debug_struct("And")
                .field("matched", matched)
                .field("children", children)
                .finish(),
        }
    }
}

/// Trace of a full [`Matcher`](crate::Matcher) evaluation.
///
/// # INV: `result` == `evaluate()` result
///
/// The `result` field always equals what
/// [`Matcher::evaluate()`](crate::Matcher::evaluate) returns for the same input.
pub struct EvalTrace<A> {
    /// The final result (identical to what `evaluate()` returns).
    pub result: Option<A>,
    /// Trace of each field matcher that was evaluated (in order).
    /// Stops after the first match.
    pub steps: Vec<EvalStep>,
    /// Whether the `on_no_match` fallback was used.
    pub used_fallback: bool,
}

impl<A> EvalTrace<A> {
    /// Index of the field matcher that decided the result, if any.
    #[must_use]
    pub fn matched_index(&self) -> Option<usize> {
        self.steps.iter().find(|s| s.matched).map(|s| s.index)
    }
}

impl<A: fmt::Debug> fmt::Debug for EvalTrace<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalTrace")
            .field("result", &self.result)
            .field("steps", &self.steps)
            .field("used_fallback", &self.used_fallback)
            .finish()
    }
}

/// One field matcher's evaluation in a trace.
#[derive(Debug)]
pub struct EvalStep {
    /// Index in `matcher_list` (0-based).
    pub index: usize,
    /// Did the predicate match?
    pub matched: bool,
    /// Full predicate evaluation trace.
    pub predicate_trace: PredicateTrace,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(matched: bool) -> PredicateTrace {
        PredicateTrace::Single {
            matched,
            input: "DestPortInput".into(),
            data: "Int(443)".into(),
            matcher: "IntMatcher { expected: 443 }".into(),
        }
    }

    #[test]
    fn predicate_trace_matched_single() {
        assert!(single(true).matched());
        assert!(!single(false).matched());
    }

    #[test]
    fn predicate_trace_matched_and() {
        let trace = PredicateTrace::And {
            matched: false,
            children: vec![single(true), single(false)],
        };
        assert!(!trace.matched());
    }

    #[test]
    fn predicate_trace_debug_format() {
        let debug = format!("{:?}", single(true));
        assert!(debug.contains("DestPortInput"));
        assert!(debug.contains("443"));
    }

    #[test]
    fn eval_trace_matched_index() {
        let trace: EvalTrace<String> = EvalTrace {
            result: Some("permit".into()),
            steps: vec![
                EvalStep {
                    index: 0,
                    matched: false,
                    predicate_trace: single(false),
                },
                EvalStep {
                    index: 1,
                    matched: true,
                    predicate_trace: single(true),
                },
            ],
            used_fallback: false,
        };
        assert_eq!(trace.matched_index(), Some(1));
        assert!(format!("{trace:?}").contains("permit"));
    }

    #[test]
    fn eval_trace_fallback_has_no_matched_index() {
        let trace: EvalTrace<String> = EvalTrace {
            result: Some("default".into()),
            steps: vec![],
            used_fallback: true,
        };
        assert_eq!(trace.matched_index(), None);
    }
}
