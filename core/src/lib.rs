//! firesim - ordered rule matching engine
//!
//! The engine behind the firesim firewall simulator. It is domain-agnostic:
//! the firewall crate plugs packet fields in through [`DataInput`] and gets
//! first-match-wins evaluation with a mandatory fallback back.
//!
//! # Architecture
//!
//! - [`MatchingData`] — Erased value extracted from a context (string or integer)
//! - [`DataInput<Ctx>`] — Domain-specific extraction, returns `MatchingData`
//! - [`InputMatcher`] — Domain-agnostic value test (non-generic, shareable)
//! - [`SinglePredicate<Ctx>`] — Combines `DataInput` + `InputMatcher`
//! - [`Predicate<Ctx>`] — Conjunction of single predicates
//! - [`Matcher<Ctx, A>`] — Ordered rules with first-match-wins semantics
//!
//! # Invariants
//!
//! 1. **`DataInput` None → false**: when a `DataInput` returns
//!    [`MatchingData::None`], the predicate evaluates to `false`.
//!
//! 2. **First match wins**: field matchers are checked in list order and the
//!    first one whose predicate holds decides the result. Later matchers are
//!    never consulted.
//!
//! 3. **Vacuous truth**: an empty `And` matches every context. Rules made only
//!    of wildcards compile to it.
//!
//! # Example
//!
//! ```
//! use firesim::prelude::*;
//!
//! #[derive(Debug)]
//! struct Flow { port: u16 }
//!
//! #[derive(Debug)]
//! struct PortInput;
//!
//! impl DataInput<Flow> for PortInput {
//!     fn get(&self, ctx: &Flow) -> MatchingData {
//!         MatchingData::Int(i64::from(ctx.port))
//!     }
//! }
//!
//! let matcher: Matcher<Flow, &str> = Matcher::new(
//!     vec![FieldMatcher::new(
//!         Predicate::Single(SinglePredicate::new(
//!             Box::new(PortInput),
//!             Box::new(IntMatcher::new(443)),
//!         )),
//!         "permit",
//!     )],
//!     Some("block"),
//! );
//!
//! assert_eq!(matcher.evaluate(&Flow { port: 443 }), Some("permit"));
//! assert_eq!(matcher.evaluate(&Flow { port: 22 }), Some("block"));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod data_input;
mod field_matcher;
mod input_matcher;
mod matcher;
mod matching_data;
mod predicate;
mod trace;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use data_input::DataInput;
pub use field_matcher::FieldMatcher;
pub use input_matcher::{ExactMatcher, InputMatcher, IntMatcher};
pub use matcher::Matcher;
pub use matching_data::MatchingData;
pub use predicate::{Predicate, SinglePredicate};
pub use trace::{EvalStep, EvalTrace, PredicateTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use firesim::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        DataInput, EvalStep, EvalTrace, ExactMatcher, FieldMatcher, InputMatcher, IntMatcher,
        Matcher, MatchingData, Predicate, PredicateTrace, SinglePredicate,
    };
}
