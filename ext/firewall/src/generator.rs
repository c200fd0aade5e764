//! Random traffic generation.
//!
//! Addresses come from two private prefixes so user rules on concrete hosts
//! have a fair chance to fire. Ports lean on [`WELL_KNOWN_PORTS`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Builder;

use crate::model::{Packet, PacketId, Protocol};
use crate::WELL_KNOWN_PORTS;

const ADDRESS_PREFIXES: [&str; 2] = ["192.168.1", "10.0.0"];
const WELL_KNOWN_PORT_PROBABILITY: f64 = 0.3;

/// Produces random packets from an injected RNG.
///
/// Seeded generators are fully reproducible, packet ids included.
///
/// ```
/// use firesim_firewall::PacketGenerator;
///
/// let a = PacketGenerator::seeded(7).generate();
/// let b = PacketGenerator::seeded(7).generate();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct PacketGenerator<R = StdRng> {
    rng: R,
}

impl PacketGenerator<StdRng> {
    /// A reproducible generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// A generator seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> PacketGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one packet. Never fails.
    pub fn generate(&mut self) -> Packet {
        let id = PacketId::from(Builder::from_random_bytes(self.rng.gen()).into_uuid());
        let protocol = Protocol::ALL[self.rng.gen_range(0..Protocol::ALL.len())];
        Packet {
            id,
            protocol,
            source_ip: self.address(),
            source_port: self.port(),
            dest_ip: self.address(),
            dest_port: self.port(),
        }
    }

    fn address(&mut self) -> String {
        let prefix = if self.rng.gen_bool(0.5) {
            ADDRESS_PREFIXES[0]
        } else {
            ADDRESS_PREFIXES[1]
        };
        format!("{prefix}.{}", self.rng.gen_range(1..=254u8))
    }

    fn port(&mut self) -> u16 {
        if self.rng.gen_bool(WELL_KNOWN_PORT_PROBABILITY) {
            WELL_KNOWN_PORTS[self.rng.gen_range(0..WELL_KNOWN_PORTS.len())]
        } else {
            self.rng.gen_range(1..=u16::MAX)
        }
    }
}

/// One packet from the thread-local RNG.
#[must_use]
pub fn generate() -> Packet {
    PacketGenerator::new(rand::thread_rng()).generate()
}
