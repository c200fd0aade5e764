//! `DataInput` implementations over [`Packet`]
//!
//! One extractor per matchable packet field. Every packet field is concrete,
//! so none of these ever returns [`MatchingData::None`].

use firesim::{DataInput, MatchingData};

use crate::model::Packet;

/// Extracts the protocol name (`"TCP"`, `"UDP"`, `"ICMP"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolInput;

impl DataInput<Packet> for ProtocolInput {
    fn get(&self, ctx: &Packet) -> MatchingData {
        MatchingData::from(ctx.protocol.as_str())
    }
}

/// Extracts the source address, verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceIpInput;

impl DataInput<Packet> for SourceIpInput {
    fn get(&self, ctx: &Packet) -> MatchingData {
        MatchingData::String(ctx.source_ip.clone())
    }
}

/// Extracts the source port.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourcePortInput;

impl DataInput<Packet> for SourcePortInput {
    fn get(&self, ctx: &Packet) -> MatchingData {
        MatchingData::from(ctx.source_port)
    }
}

/// Extracts the destination address, verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct DestIpInput;

impl DataInput<Packet> for DestIpInput {
    fn get(&self, ctx: &Packet) -> MatchingData {
        MatchingData::String(ctx.dest_ip.clone())
    }
}

/// Extracts the destination port.
#[derive(Debug, Clone, Copy, Default)]
pub struct DestPortInput;

impl DataInput<Packet> for DestPortInput {
    fn get(&self, ctx: &Packet) -> MatchingData {
        MatchingData::from(ctx.dest_port)
    }
}
