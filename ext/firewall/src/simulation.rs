//! Tick-driven simulation state.
//!
//! The caller owns the clock: each [`Simulation::tick`] generates one packet,
//! evaluates it and records the outcome. Scheduling ticks on an interval is
//! left to the caller (see [`DEFAULT_TICK_INTERVAL`](crate::DEFAULT_TICK_INTERVAL)).

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::compiler::Firewall;
use crate::generator::PacketGenerator;
use crate::model::{Decision, Packet};
use crate::parser::RuleSet;
use crate::DEFAULT_LOG_CAPACITY;

/// One processed packet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub packet: Packet,
    pub decision: Decision,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.packet,
            self.decision
        )
    }
}

/// Verdict counts over the retained log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub allowed: usize,
    pub blocked: usize,
    pub total: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} permitidos={} bloqueados={}",
            self.total, self.allowed, self.blocked
        )
    }
}

/// Live rules, their compiled form and a bounded log, newest entry first.
#[derive(Debug)]
pub struct Simulation {
    rules: RuleSet,
    firewall: Firewall,
    log: VecDeque<LogEntry>,
    log_capacity: usize,
}

impl Simulation {
    pub fn new(rules: RuleSet) -> Self {
        Self::with_log_capacity(rules, DEFAULT_LOG_CAPACITY)
    }

    /// A simulation keeping at most `log_capacity` entries (at least one).
    pub fn with_log_capacity(rules: RuleSet, log_capacity: usize) -> Self {
        let log_capacity = log_capacity.max(1);
        Self {
            firewall: Firewall::from(&rules),
            rules,
            log: VecDeque::with_capacity(log_capacity),
            log_capacity,
        }
    }

    /// `false` only when no rule at all was supplied.
    ///
    /// A list made only of invalid rules can still run; every packet then
    /// hits the implicit deny.
    #[must_use]
    pub fn can_start(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Generate, evaluate and record one packet.
    pub fn tick<R: Rng>(&mut self, generator: &mut PacketGenerator<R>) -> &LogEntry {
        let packet = generator.generate();
        self.process(packet)
    }

    /// Evaluate and record a packet supplied by the caller.
    pub fn process(&mut self, packet: Packet) -> &LogEntry {
        let decision = self.firewall.evaluate(&packet);
        tracing::info!(
            packet = %packet,
            verdict = decision.verdict.verdict_label(),
            matched = %decision.matched,
            "packet processed"
        );

        self.log.push_front(LogEntry {
            packet,
            decision,
            timestamp: Utc::now(),
        });
        self.log.truncate(self.log_capacity);
        &self.log[0]
    }

    /// Swap in an edited rule list. The log is kept.
    pub fn replace_rules(&mut self, rules: RuleSet) {
        tracing::debug!(
            valid = rules.valid_count(),
            invalid = rules.invalid_count(),
            "rules replaced"
        );
        self.firewall = Firewall::from(&rules);
        self.rules = rules;
    }

    /// Clear the log.
    pub fn reset(&mut self) {
        self.log.clear();
    }

    /// Retained entries, newest first.
    pub fn log(&self) -> impl ExactSizeIterator<Item = &LogEntry> + '_ {
        self.log.iter()
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        let allowed = self.log.iter().filter(|e| e.decision.is_permit()).count();
        Stats {
            allowed,
            blocked: self.log.len() - allowed,
            total: self.log.len(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[must_use]
    pub fn firewall(&self) -> &Firewall {
        &self.firewall
    }

    #[must_use]
    pub fn log_capacity(&self) -> usize {
        self.log_capacity
    }
}
