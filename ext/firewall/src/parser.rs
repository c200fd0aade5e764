//! Rule parser: rule text → [`ParsedRule`]
//!
//! Grammar, case-insensitive, anchored on the trimmed input:
//!
//! ```text
//! <ACTION> <PROTOCOL> de <SRC>:<SRCPORT> a <DST>:<DSTPORT>
//! ACTION   = PERMITIR | BLOQUEAR
//! PROTOCOL = TCP | UDP | ICMP | CUALQUIERA
//! SRC,DST  = CUALQUIERA | [A-Za-z0-9.:]+
//! SRCPORT,DSTPORT = CUALQUIERA | [0-9]+   (must fit in a u16)
//! ```
//!
//! Parsing is total: every input yields either a complete rule or
//! [`MalformedRule`]. Nothing is partially filled and nothing panics.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::{Action, Endpoint, Field, ParsedRule, Protocol, RawRule, RuleId, RuleSpec};
use crate::WILDCARD;

/// Addresses may contain `:`, so the address/port split relies on
/// leftmost-first capture semantics: `::1:80` splits into `::1` and `80`.
/// Token classes are ASCII-only; Unicode case folding would let `K`
/// (KELVIN SIGN) or `ſ` (LONG S) through `[a-z]`.
static RULE_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(PERMITIR|BLOQUEAR)\s+(TCP|UDP|ICMP|CUALQUIERA)\s+de\s+((?-u:[A-Za-z0-9.:])+):((?-u:[A-Za-z0-9])+)\s+a\s+((?-u:[A-Za-z0-9.:])+):((?-u:[A-Za-z0-9])+)$",
    )
    .expect("rule grammar is a valid regex")
});

/// Rule text that does not conform to the grammar.
///
/// Deliberately unclassified: callers only learn that the rule is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed rule: \"{text}\"")]
pub struct MalformedRule {
    /// The offending text, for display.
    pub text: String,
}

impl MalformedRule {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// Parse rule text into its structured form.
///
/// Keywords, protocol and the wildcard are case-insensitive. Address tokens
/// are uppercased and otherwise kept verbatim (no IP validation). A port
/// token that is not a base-10 number in `0..=65535` rejects the rule.
///
/// # Errors
///
/// Returns [`MalformedRule`] for any text outside the grammar.
///
/// # Example
///
/// ```
/// use firesim_firewall::prelude::*;
///
/// let spec = parse("permitir tcp de cualquiera:cualquiera a 192.168.1.100:80").unwrap();
/// assert_eq!(spec.action, Action::Permit);
/// assert_eq!(spec.destination.port, Field::Exactly(80));
/// assert_eq!(
///     spec.to_string(),
///     "PERMITIR TCP de CUALQUIERA:CUALQUIERA a 192.168.1.100:80"
/// );
///
/// assert!(parse("PERMITIR TCP a CUALQUIERA:80").is_err());
/// ```
pub fn parse(text: &str) -> Result<RuleSpec, MalformedRule> {
    let trimmed = text.trim();
    let caps = RULE_GRAMMAR
        .captures(trimmed)
        .ok_or_else(|| MalformedRule::new(text))?;

    let action: Action = group(&caps, 1)
        .parse()
        .map_err(|_| MalformedRule::new(text))?;
    let protocol = protocol_field(group(&caps, 2)).ok_or_else(|| MalformedRule::new(text))?;
    let source = endpoint(group(&caps, 3), group(&caps, 4)).ok_or_else(|| MalformedRule::new(text))?;
    let destination =
        endpoint(group(&caps, 5), group(&caps, 6)).ok_or_else(|| MalformedRule::new(text))?;

    Ok(RuleSpec {
        action,
        protocol,
        source,
        destination,
    })
}

/// Parse a user rule, keeping its identity.
///
/// # Errors
///
/// Returns [`MalformedRule`] for any text outside the grammar.
pub fn parse_rule(raw: &RawRule) -> Result<ParsedRule, MalformedRule> {
    parse(&raw.text).map(|spec| ParsedRule {
        id: raw.id.clone(),
        text: raw.text.clone(),
        spec,
    })
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn is_wildcard(token: &str) -> bool {
    token.eq_ignore_ascii_case(WILDCARD)
}

fn protocol_field(token: &str) -> Option<Field<Protocol>> {
    if is_wildcard(token) {
        return Some(Field::Any);
    }
    token.parse().ok().map(Field::Exactly)
}

fn endpoint(address: &str, port: &str) -> Option<Endpoint> {
    let address = if is_wildcard(address) {
        Field::Any
    } else {
        Field::Exactly(address.to_ascii_uppercase())
    };
    let port = if is_wildcard(port) {
        Field::Any
    } else {
        Field::Exactly(port.parse::<u16>().ok()?)
    };
    Some(Endpoint { address, port })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rule sets
// ═══════════════════════════════════════════════════════════════════════════════

/// An ordered list of user rules after parsing.
///
/// Valid rules keep their relative order (order is priority). Invalid rules
/// are dropped from matching but counted, so callers can report how many
/// rules are active and how many were rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<ParsedRule>,
    rejected: Vec<RuleId>,
}

impl RuleSet {
    /// Parse every raw rule in order.
    pub fn parse(raw_rules: &[RawRule]) -> Self {
        let mut rules = Vec::with_capacity(raw_rules.len());
        let mut rejected = Vec::new();

        for raw in raw_rules {
            match parse_rule(raw) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    tracing::debug!(rule_id = %raw.id, error = %e, "rule rejected");
                    rejected.push(raw.id.clone());
                }
            }
        }

        tracing::debug!(
            valid = rules.len(),
            invalid = rejected.len(),
            "rule set parsed"
        );
        Self { rules, rejected }
    }

    /// Parse rule texts, giving each a fresh id.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<RawRule> = texts
            .into_iter()
            .map(RawRule::with_generated_id)
            .collect();
        Self::parse(&raw)
    }

    /// The valid rules, in priority order.
    #[must_use]
    pub fn rules(&self) -> &[ParsedRule] {
        &self.rules
    }

    /// Ids of the rules that failed to parse, in input order.
    #[must_use]
    pub fn rejected(&self) -> &[RuleId] {
        &self.rejected
    }

    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.rejected.len()
    }

    /// Valid plus invalid rules.
    #[must_use]
    pub fn total(&self) -> usize {
        self.rules.len() + self.rejected.len()
    }

    /// Returns `true` when the user supplied no rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(text: &str) -> RuleSpec {
        parse(text).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn parses_documented_examples() {
        let web = spec("PERMITIR TCP de CUALQUIERA:CUALQUIERA a 192.168.1.100:80");
        assert_eq!(web.action, Action::Permit);
        assert_eq!(web.protocol, Field::Exactly(Protocol::Tcp));
        assert_eq!(web.source, Endpoint::any());
        assert_eq!(
            web.destination,
            Endpoint {
                address: Field::Exactly("192.168.1.100".to_string()),
                port: Field::Exactly(80),
            }
        );

        let dns = spec("BLOQUEAR UDP de 10.0.0.5:CUALQUIERA a CUALQUIERA:53");
        assert_eq!(dns.action, Action::Block);
        assert_eq!(dns.source.address, Field::Exactly("10.0.0.5".to_string()));
        assert_eq!(dns.source.port, Field::Any);
        assert_eq!(dns.destination.port, Field::Exactly(53));
    }

    #[test]
    fn wildcard_protocol() {
        assert_eq!(
            spec("BLOQUEAR CUALQUIERA de CUALQUIERA:CUALQUIERA a CUALQUIERA:CUALQUIERA").protocol,
            Field::Any
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let lower = spec("bloquear icmp DE cualquiera:cualquiera A Cualquiera:Cualquiera");
        let upper = spec("BLOQUEAR ICMP de CUALQUIERA:CUALQUIERA a CUALQUIERA:CUALQUIERA");
        assert_eq!(lower, upper);
    }

    #[test]
    fn address_tokens_are_uppercased() {
        let rule = spec("PERMITIR TCP de host.local:22 a CUALQUIERA:CUALQUIERA");
        assert_eq!(rule.source.address, Field::Exactly("HOST.LOCAL".to_string()));
    }

    #[test]
    fn address_is_not_validated() {
        let rule = spec("PERMITIR TCP de 999.999.999.999:1 a CUALQUIERA:2");
        assert_eq!(
            rule.source.address,
            Field::Exactly("999.999.999.999".to_string())
        );
    }

    #[test]
    fn colon_address_splits_at_last_colon_before_port() {
        let rule = spec("PERMITIR UDP de ::1:53 a fe80::1:CUALQUIERA");
        assert_eq!(rule.source.address, Field::Exactly("::1".to_string()));
        assert_eq!(rule.source.port, Field::Exactly(53));
        assert_eq!(rule.destination.address, Field::Exactly("FE80::1".to_string()));
        assert_eq!(rule.destination.port, Field::Any);
    }

    #[test]
    fn surrounding_and_inner_whitespace_is_tolerated() {
        let rule = spec("  PERMITIR   TCP\tde CUALQUIERA:CUALQUIERA  a CUALQUIERA:443 \n");
        assert_eq!(rule.destination.port, Field::Exactly(443));
    }

    #[test]
    fn port_edge_values() {
        assert_eq!(
            spec("PERMITIR TCP de CUALQUIERA:0 a CUALQUIERA:65535").source.port,
            Field::Exactly(0)
        );
        assert_eq!(
            spec("PERMITIR TCP de CUALQUIERA:0080 a CUALQUIERA:1").source.port,
            Field::Exactly(80)
        );
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(parse("PERMITIR TCP de CUALQUIERA:http a CUALQUIERA:80").is_err());
        assert!(parse("PERMITIR TCP de CUALQUIERA:80 a CUALQUIERA:ANY").is_err());
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert!(parse("PERMITIR TCP de CUALQUIERA:65536 a CUALQUIERA:80").is_err());
        assert!(parse("PERMITIR TCP de CUALQUIERA:80 a CUALQUIERA:99999999999").is_err());
    }

    #[test]
    fn rejects_grammar_violations() {
        let bad = [
            "",
            "   ",
            "PERMITIR TCP CUALQUIERA:CUALQUIERA a CUALQUIERA:80",
            "PERMITIR TCP de CUALQUIERA:CUALQUIERA CUALQUIERA:80",
            "ALLOW TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:80",
            "PERMITIR SCTP de CUALQUIERA:CUALQUIERA a CUALQUIERA:80",
            "PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:80 extra",
            "ya PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:80",
            "PERMITIR TCP de CUALQUIERA a CUALQUIERA:80",
            "PERMITIR TCP de 10.0.0.0/8:80 a CUALQUIERA:80",
            "PERMITIRTCP de CUALQUIERA:80 a CUALQUIERA:80",
        ];
        for text in bad {
            assert!(parse(text).is_err(), "accepted: {text:?}");
        }
    }

    #[test]
    fn rejects_non_ascii_tokens() {
        let bad = [
            "PERMITIR TCP de \u{212A}:80 a CUALQUIERA:80",
            "PERMITIR TCP de ho\u{17F}t:80 a CUALQUIERA:80",
            "PERMITIR TCP de CUALQUIERA:80 a CUALQUIERA:\u{212A}",
            "PERMITIR TCP de CUALQUIERA:80 a 10.0.0.\u{0661}:80",
            "PERMITIR TCP de CUALQUIERA:\u{0661}\u{0662} a CUALQUIERA:80",
        ];
        for text in bad {
            assert!(parse(text).is_err(), "accepted: {text:?}");
        }
    }

    #[test]
    fn malformed_rule_carries_text() {
        let err = parse("nonsense").unwrap_err();
        assert_eq!(err.text, "nonsense");
        assert_eq!(err.to_string(), "malformed rule: \"nonsense\"");
    }

    #[test]
    fn display_round_trip_is_idempotent() {
        let texts = [
            "permitir tcp de cualquiera:cualquiera a 192.168.1.100:80",
            "BLOQUEAR UDP de 10.0.0.5:CUALQUIERA a CUALQUIERA:53",
            "bloquear cualquiera de ::1:0 a host:65535",
        ];
        for text in texts {
            let first = spec(text);
            let second = spec(&first.to_string());
            assert_eq!(first, second);
            assert_eq!(first.to_string(), second.to_string());
        }
    }

    #[test]
    fn parse_rule_keeps_identity_and_text() {
        let raw = RawRule::new("r1", " PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:443");
        let rule = parse_rule(&raw).unwrap();
        assert_eq!(rule.id, RuleId::new("r1"));
        assert_eq!(rule.text, raw.text);
    }

    #[test]
    fn rule_set_filters_and_counts() {
        let raw = vec![
            RawRule::new("a", "PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:443"),
            RawRule::new("b", "garbage"),
            RawRule::new("c", "BLOQUEAR ICMP de CUALQUIERA:CUALQUIERA a CUALQUIERA:CUALQUIERA"),
            RawRule::new("d", ""),
        ];
        let set = RuleSet::parse(&raw);

        assert_eq!(set.valid_count(), 2);
        assert_eq!(set.invalid_count(), 2);
        assert_eq!(set.total(), 4);
        assert!(!set.is_empty());

        let ids: Vec<&str> = set.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(set.rejected(), [RuleId::new("b"), RuleId::new("d")]);
    }

    #[test]
    fn empty_rule_set() {
        let set = RuleSet::parse(&[]);
        assert!(set.is_empty());
        assert_eq!(set.valid_count(), 0);
    }

    #[test]
    fn from_texts_assigns_ids() {
        let set = RuleSet::from_texts(["PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:80"]);
        assert_eq!(set.valid_count(), 1);
        assert!(!set.rules()[0].id.as_str().is_empty());
    }
}
