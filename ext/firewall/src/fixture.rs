//! Conformance fixture runner
//!
//! Loads YAML fixtures and runs them against a compiled [`Firewall`].
//!
//! ```yaml
//! name: https-only
//! description: TCP/443 is allowed, everything else falls to the default
//! rules:
//!   - PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:443
//! cases:
//!   - name: tcp 443
//!     packet: { protocol: TCP, source_ip: 10.0.0.1, source_port: 5000, dest_ip: 192.168.1.1, dest_port: 443 }
//!     verdict: PERMITIDO
//!     matched: rule-0
//! ```
//!
//! Rule ids are `rule-<index>`, counted over every listed rule including the
//! invalid ones.

use serde::Deserialize;

use crate::{Firewall, Packet, Protocol, RawRule, RuleSet};

/// A complete test fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rules: Vec<String>,
    /// How many of `rules` must fail to parse. Unchecked when absent.
    #[serde(default)]
    pub expect_invalid: Option<usize>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    pub packet: PacketConfig,
    /// `PERMITIDO` or `BLOQUEADO`.
    pub verdict: String,
    /// Rule id, or `default` for the implicit deny.
    pub matched: String,
}

/// Packet fields; the id is generated.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacketConfig {
    pub protocol: Protocol,
    pub source_ip: String,
    pub source_port: u16,
    pub dest_ip: String,
    pub dest_port: u16,
}

impl PacketConfig {
    fn build(&self) -> Packet {
        Packet::new(
            self.protocol,
            self.source_ip.as_str(),
            self.source_port,
            self.dest_ip.as_str(),
            self.dest_port,
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

impl Fixture {
    /// Parse a fixture from YAML
    ///
    /// # Errors
    ///
    /// Returns the YAML error on malformed input.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    ///
    /// # Errors
    ///
    /// Returns the first YAML error encountered.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Parse this fixture's rules with positional ids.
    #[must_use]
    pub fn rule_set(&self) -> RuleSet {
        let raw: Vec<RawRule> = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, text)| RawRule::new(format!("rule-{i}"), text.as_str()))
            .collect();
        RuleSet::parse(&raw)
    }

    /// Run all test cases and return results
    #[must_use]
    pub fn run(&self) -> Vec<CaseResult> {
        let firewall = Firewall::from(&self.rule_set());
        self.cases
            .iter()
            .map(|case| {
                let decision = firewall.evaluate(&case.packet.build());
                let expected = format!("{} ({})", case.verdict, case.matched);
                let actual = decision.to_string();
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == expected,
                    expected,
                    actual,
                }
            })
            .collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        if let Some(expected) = self.expect_invalid {
            let actual = self.rule_set().invalid_count();
            assert_eq!(
                actual, expected,
                "Fixture '{}': expected {expected} invalid rules, got {actual}",
                self.name
            );
        }

        for result in self.run() {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r"
name: inline
rules:
  - PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:443
  - nope
expect_invalid: 1
cases:
  - name: https
    packet: { protocol: TCP, source_ip: 10.0.0.1, source_port: 5000, dest_ip: 192.168.1.1, dest_port: 443 }
    verdict: PERMITIDO
    matched: rule-0
  - name: dns
    packet: { protocol: UDP, source_ip: 10.0.0.1, source_port: 5000, dest_ip: 192.168.1.1, dest_port: 53 }
    verdict: BLOQUEADO
    matched: default
";

    #[test]
    fn inline_fixture_passes() {
        let fixture = Fixture::from_yaml(YAML).unwrap();
        assert_eq!(fixture.cases.len(), 2);
        fixture.run_and_assert();
    }

    #[test]
    fn failing_case_is_reported() {
        let yaml = YAML.replace("matched: rule-0", "matched: rule-1");
        let results = Fixture::from_yaml(&yaml).unwrap().run();
        assert!(!results[0].passed);
        assert_eq!(results[0].actual, "PERMITIDO (rule-0)");
        assert!(results[1].passed);
    }

    #[test]
    fn multi_document_yaml() {
        let yaml = format!("{YAML}---{YAML}");
        assert_eq!(Fixture::from_yaml_multi(&yaml).unwrap().len(), 2);
    }
}
