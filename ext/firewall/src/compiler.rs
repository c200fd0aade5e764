//! Compiler: `ParsedRule` → firesim `Matcher<Packet, Decision>`
//!
//! Each rule becomes one field matcher whose predicate ANDs a condition per
//! concrete field. Wildcard fields contribute no condition, so a rule made
//! only of wildcards compiles to the vacuous `And([])` and matches every
//! packet. The implicit deny is the matcher's `on_no_match`.

use firesim::prelude::*;

use crate::inputs::{DestIpInput, DestPortInput, ProtocolInput, SourceIpInput, SourcePortInput};
use crate::model::{Decision, Endpoint, Field, Packet, ParsedRule, RuleId, RuleSpec};
use crate::parser::RuleSet;

/// Compile a rule into a field matcher that yields the rule's decision.
#[must_use]
pub fn compile_rule(rule: &ParsedRule) -> FieldMatcher<Packet, Decision> {
    FieldMatcher::new(
        to_predicate(&rule.spec),
        Decision::by_rule(rule.spec.action, rule.id.clone()),
    )
}

fn to_predicate(spec: &RuleSpec) -> Predicate<Packet> {
    let mut predicates: Vec<Predicate<Packet>> = Vec::with_capacity(5);

    if let Field::Exactly(protocol) = spec.protocol {
        predicates.push(single(ProtocolInput, ExactMatcher::new(protocol.as_str())));
    }
    push_endpoint(&mut predicates, &spec.source, SourceIpInput, SourcePortInput);
    push_endpoint(&mut predicates, &spec.destination, DestIpInput, DestPortInput);

    Predicate::from_all(predicates)
}

fn push_endpoint<I, P>(predicates: &mut Vec<Predicate<Packet>>, endpoint: &Endpoint, ip: I, port: P)
where
    I: DataInput<Packet> + 'static,
    P: DataInput<Packet> + 'static,
{
    if let Field::Exactly(address) = &endpoint.address {
        predicates.push(single(ip, ExactMatcher::new(address.as_str())));
    }
    if let Field::Exactly(number) = endpoint.port {
        predicates.push(single(port, IntMatcher::new(i64::from(number))));
    }
}

fn single<I, M>(input: I, matcher: M) -> Predicate<Packet>
where
    I: DataInput<Packet> + 'static,
    M: InputMatcher + 'static,
{
    Predicate::Single(SinglePredicate::new(Box::new(input), Box::new(matcher)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Firewall
// ═══════════════════════════════════════════════════════════════════════════════

/// A compiled, immutable rule list.
///
/// Evaluation is pure; one `Firewall` can be shared across threads.
#[derive(Debug)]
pub struct Firewall {
    matcher: Matcher<Packet, Decision>,
    rule_ids: Vec<RuleId>,
}

impl Firewall {
    /// Compile rules in priority order.
    #[must_use]
    pub fn new(rules: &[ParsedRule]) -> Self {
        let matcher = Matcher::new(
            rules.iter().map(compile_rule).collect(),
            Some(Decision::implicit_deny()),
        );
        tracing::debug!(rules = rules.len(), "firewall compiled");
        Self {
            matcher,
            rule_ids: rules.iter().map(|r| r.id.clone()).collect(),
        }
    }

    /// Decide the fate of a packet: first matching rule, else implicit deny.
    #[must_use]
    pub fn evaluate(&self, packet: &Packet) -> Decision {
        let decision = self
            .matcher
            .evaluate(packet)
            .unwrap_or_else(Decision::implicit_deny);
        tracing::trace!(packet = %packet, decision = %decision, "packet evaluated");
        decision
    }

    /// Like [`evaluate`](Self::evaluate), recording every rule checked.
    ///
    /// `trace.result` is always `Some` and equals what `evaluate` returns.
    /// Step indices refer to [`rule_id`](Self::rule_id).
    #[must_use]
    pub fn evaluate_with_trace(&self, packet: &Packet) -> EvalTrace<Decision> {
        self.matcher.evaluate_with_trace(packet)
    }

    /// Id of the rule at `index` in priority order.
    #[must_use]
    pub fn rule_id(&self, index: usize) -> Option<&RuleId> {
        self.rule_ids.get(index)
    }

    /// Number of compiled rules. The implicit deny is not counted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matcher.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }
}

impl From<&RuleSet> for Firewall {
    fn from(rule_set: &RuleSet) -> Self {
        Self::new(rule_set.rules())
    }
}

impl Default for Firewall {
    /// A firewall with no rules: everything hits the implicit deny.
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Evaluate one packet against a rule list without keeping the compiled form.
///
/// # Example
///
/// ```
/// use firesim_firewall::prelude::*;
///
/// let packet = generate();
/// assert_eq!(evaluate(&packet, &[]), Decision::implicit_deny());
/// ```
#[must_use]
pub fn evaluate(packet: &Packet, rules: &[ParsedRule]) -> Decision {
    Firewall::new(rules).evaluate(packet)
}
