//! firesim-firewall: firewall domain for the firesim engine
//!
//! Turns human-written rules into a compiled [`Firewall`], generates random
//! traffic and drives the tick-based [`Simulation`].
//!
//! # Architecture
//!
//! ```text
//! rule text ──parse()──▶ ParsedRule ──Firewall::new()──▶ Matcher<Packet, Decision>
//!                                                              │
//! PacketGenerator::generate() ──▶ Packet ──evaluate()──────────┘──▶ Decision
//! ```
//!
//! Rules are evaluated top to bottom. The first rule whose five fields all
//! match decides; when none does, the implicit deny blocks the packet.
//!
//! # Example
//!
//! ```
//! use firesim_firewall::prelude::*;
//!
//! let rules = RuleSet::from_texts([
//!     "PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:443",
//!     "BLOQUEAR ICMP de CUALQUIERA:CUALQUIERA a CUALQUIERA:CUALQUIERA",
//! ]);
//! let firewall = Firewall::from(&rules);
//!
//! let https = Packet::new(Protocol::Tcp, "10.0.0.4", 50123, "192.168.1.7", 443);
//! assert!(firewall.evaluate(&https).is_permit());
//!
//! let dns = Packet::new(Protocol::Udp, "10.0.0.4", 50123, "192.168.1.7", 53);
//! assert_eq!(firewall.evaluate(&dns), Decision::implicit_deny());
//! ```

use std::time::Duration;

mod compiler;
mod generator;
mod inputs;
mod model;
mod parser;
mod simulation;

#[cfg(feature = "serde")]
mod config;

#[cfg(feature = "fixtures")]
pub mod fixture;

pub use compiler::{compile_rule, evaluate, Firewall};
pub use generator::{generate, PacketGenerator};
pub use inputs::{DestIpInput, DestPortInput, ProtocolInput, SourceIpInput, SourcePortInput};
pub use model::{
    Action, Decision, Endpoint, Field, MatchedBy, Packet, PacketId, ParsedRule, Protocol,
    RawRule, RuleId, RuleSpec, UnknownKeyword,
};
pub use parser::{parse, parse_rule, MalformedRule, RuleSet};
pub use simulation::{LogEntry, Simulation, Stats};

#[cfg(feature = "serde")]
pub use config::{ConfigError, SimulationConfig};

/// The wildcard keyword: matches any value of a rule field.
pub const WILDCARD: &str = "CUALQUIERA";

/// Ports the generator favors, so that rules on common services fire.
pub const WELL_KNOWN_PORTS: [u16; 6] = [80, 443, 53, 22, 21, 8080];

/// Number of log entries a [`Simulation`] keeps.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Time between two simulation ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(700);

/// Starter rules: allow web traffic, drop pings.
pub const DEFAULT_RULES: [&str; 3] = [
    "PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:443",
    "PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:80",
    "BLOQUEAR ICMP de CUALQUIERA:CUALQUIERA a CUALQUIERA:CUALQUIERA",
];

/// [`DEFAULT_RULES`] as raw rules with fresh ids.
#[must_use]
pub fn default_rules() -> Vec<RawRule> {
    DEFAULT_RULES
        .iter()
        .map(|text| RawRule::with_generated_id(*text))
        .collect()
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        default_rules,
        evaluate,
        generate,
        parse,
        parse_rule,
        // Model
        Action,
        Decision,
        Endpoint,
        Field,
        // Engine
        Firewall,
        LogEntry,
        MalformedRule,
        MatchedBy,
        Packet,
        PacketGenerator,
        ParsedRule,
        Protocol,
        RawRule,
        RuleId,
        RuleSet,
        RuleSpec,
        Simulation,
        Stats,
    };
    pub use firesim::prelude::*;
}
