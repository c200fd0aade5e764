//! Domain types: rules, packets and decisions.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::WILDCARD;

// ═══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════════════════

/// Opaque identifier of a user rule.
///
/// Any string works as an id. [`RuleId::generate`] hands out fresh
/// UUID-backed ids for rules typed in by a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RuleId(String);

impl RuleId {
    /// Create an id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh, unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique identifier of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PacketId(Uuid);

impl PacketId {
    /// A fresh random id.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for PacketId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rule vocabulary
// ═══════════════════════════════════════════════════════════════════════════════

/// What a rule does with a matching packet. Also the verdict of a [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Action {
    /// Let the packet through (`PERMITIR`).
    Permit,
    /// Drop the packet (`BLOQUEAR`).
    Block,
}

impl Action {
    /// The rule-grammar keyword.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Action::Permit => "PERMITIR",
            Action::Block => "BLOQUEAR",
        }
    }

    /// Past-tense label used when showing a verdict.
    #[must_use]
    pub fn verdict_label(self) -> &'static str {
        match self {
            Action::Permit => "PERMITIDO",
            Action::Block => "BLOQUEADO",
        }
    }
}

impl FromStr for Action {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PERMITIR" => Ok(Action::Permit),
            "BLOQUEAR" => Ok(Action::Block),
            _ => Err(UnknownKeyword(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Concrete transport protocol of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    /// Every concrete protocol, in generator order.
    pub const ALL: [Protocol; 3] = [Protocol::Tcp, Protocol::Udp, Protocol::Icmp];

    /// Uppercase name, as written in rules and compared during matching.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
        }
    }
}

impl FromStr for Protocol {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            "ICMP" => Ok(Protocol::Icmp),
            _ => Err(UnknownKeyword(s.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword that is not part of the rule vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown keyword \"{0}\"")]
pub struct UnknownKeyword(pub String);

/// A rule field: either the wildcard or one concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Field<T> {
    /// `CUALQUIERA`: matches any value.
    Any,
    /// Matches exactly this value.
    Exactly(T),
}

impl<T> Field<T> {
    /// Returns `true` for the wildcard.
    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, Field::Any)
    }

    /// The concrete value, if this is not the wildcard.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Any => None,
            Field::Exactly(v) => Some(v),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Any => f.write_str(WILDCARD),
            Field::Exactly(v) => v.fmt(f),
        }
    }
}

/// One side of a rule: `<ADDRESS>:<PORT>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Endpoint {
    /// Uppercase-normalized address token or wildcard.
    pub address: Field<String>,
    /// Port number or wildcard.
    pub port: Field<u16>,
}

impl Endpoint {
    /// An endpoint matching any address and any port.
    #[must_use]
    pub fn any() -> Self {
        Self {
            address: Field::Any,
            port: Field::Any,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rules
// ═══════════════════════════════════════════════════════════════════════════════

/// Rule text exactly as the user submitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRule {
    pub id: RuleId,
    pub text: String,
}

impl RawRule {
    /// A raw rule with an explicit id.
    pub fn new(id: impl Into<RuleId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// A raw rule with a freshly generated id.
    pub fn with_generated_id(text: impl Into<String>) -> Self {
        Self {
            id: RuleId::generate(),
            text: text.into(),
        }
    }
}

/// The structured predicate of a rule, without identity.
///
/// `Display` writes the canonical rule text, which parses back to an equal
/// `RuleSpec`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleSpec {
    pub action: Action,
    pub protocol: Field<Protocol>,
    pub source: Endpoint,
    pub destination: Endpoint,
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} de {} a {}",
            self.action, self.protocol, self.source, self.destination
        )
    }
}

/// A validated rule, traceable to the [`RawRule`] it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedRule {
    pub id: RuleId,
    /// The text as submitted, kept for display.
    pub text: String,
    pub spec: RuleSpec,
}

impl fmt::Display for ParsedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.spec.fmt(f)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Packets and decisions
// ═══════════════════════════════════════════════════════════════════════════════

/// One unit of simulated traffic. Every field is concrete.
///
/// Ports of generated packets are always in `1..=65535`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Packet {
    pub id: PacketId,
    pub protocol: Protocol,
    pub source_ip: String,
    pub source_port: u16,
    pub dest_ip: String,
    pub dest_port: u16,
}

impl Packet {
    /// A packet with a fresh random id.
    pub fn new(
        protocol: Protocol,
        source_ip: impl Into<String>,
        source_port: u16,
        dest_ip: impl Into<String>,
        dest_port: u16,
    ) -> Self {
        Self {
            id: PacketId::new_v4(),
            protocol,
            source_ip: source_ip.into(),
            source_port,
            dest_ip: dest_ip.into(),
            dest_port,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} -> {}:{}",
            self.protocol, self.source_ip, self.source_port, self.dest_ip, self.dest_port
        )
    }
}

/// What produced a [`Decision`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchedBy {
    /// The first rule whose five fields matched.
    Rule(RuleId),
    /// No rule matched; the implicit deny applied.
    Default,
}

impl fmt::Display for MatchedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchedBy::Rule(id) => id.fmt(f),
            MatchedBy::Default => f.write_str("default"),
        }
    }
}

/// The outcome of evaluating one packet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    pub verdict: Action,
    pub matched: MatchedBy,
}

impl Decision {
    /// The terminal policy when no rule matches: block.
    #[must_use]
    pub fn implicit_deny() -> Self {
        Self {
            verdict: Action::Block,
            matched: MatchedBy::Default,
        }
    }

    /// A decision made by a rule.
    #[must_use]
    pub fn by_rule(verdict: Action, id: RuleId) -> Self {
        Self {
            verdict,
            matched: MatchedBy::Rule(id),
        }
    }

    /// Returns `true` if the packet was let through.
    #[must_use]
    pub fn is_permit(&self) -> bool {
        self.verdict == Action::Permit
    }

    /// Returns `true` if the implicit deny decided.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.matched == MatchedBy::Default
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.verdict.verdict_label(), self.matched)
    }
}
