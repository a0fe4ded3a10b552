// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Packet model shared by all layers.
//!
//! Packets are value objects: every hand-off between nodes clones the packet,
//! so a receiver mutating `ttl`, `hop_count`, `previous_hop` or the sender
//! list never aliases another receiver's copy. The variants:
//!
//! | Variant | Wire type | Purpose |
//! |---------|-----------|---------|
//! | Join Query | 0x01 | flooded route/receiver discovery |
//! | Join Reply | 0x02 | reverse-path reply that builds the forwarding group |
//! | IP data | - | unicast/multicast/broadcast payload carrier |

use std::net::Ipv4Addr;

use bytes::Bytes;

/// Join Query wire type code.
pub const JOINQUERY_TYPE: u8 = 0x01;
/// Join Reply wire type code.
pub const JOINREPLY_TYPE: u8 = 0x02;

/// Default TTL for protocol packets.
pub const DEFAULT_TTL: u8 = 32;

/// Dispatch class of an address or packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastMode {
    /// Unclassifiable address (bad syntax, IPv6 literal).
    NoAddr,
    Unicast,
    Multicast,
    Broadcast,
}

impl CastMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            CastMode::NoAddr => "noaddr",
            CastMode::Unicast => "unicast",
            CastMode::Multicast => "multicast",
            CastMode::Broadcast => "broadcast",
        }
    }
}

/// Flooded advertisement originated by a multicast source, or by a unicast
/// sender that needs a route (the destination IP then rides in
/// `multicast_group`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinQueryPacket {
    pub source: Ipv4Addr,
    /// Multicast group being advertised, or the desired unicast destination.
    pub multicast_group: Ipv4Addr,
    /// Rewritten by every forwarder; the reverse-path next hop.
    pub previous_hop: Ipv4Addr,
    pub sequence: u32,
    pub ttl: u8,
    pub hop_count: u8,
}

impl JoinQueryPacket {
    /// The (source, sequence) pair that identifies this flood in message
    /// caches.
    #[inline]
    pub fn fingerprint(&self) -> (Ipv4Addr, u32) {
        (self.source, self.sequence)
    }
}

/// One per-source row of a Join Reply sender list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderRecord {
    /// The multicast source (or unicast requester) this row replies to.
    pub sender_ip: Ipv4Addr,
    /// Next hop toward `sender_ip`; rewritten at every forwarding node.
    pub next_hop_ip: Ipv4Addr,
    pub route_expiration: u32,
}

/// Reply from an interested receiver back along the reverse path learned
/// from a Join Query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReplyPacket {
    pub source: Ipv4Addr,
    pub multicast_group: Ipv4Addr,
    pub previous_hop: Ipv4Addr,
    pub sequence: u32,
    pub ack_req: bool,
    pub forward_group: bool,
    /// Kept equal to `senders.len()` on every rewrite.
    pub count: u8,
    pub senders: Vec<SenderRecord>,
}

impl JoinReplyPacket {
    /// Re-derive `count` after the sender list was rewritten.
    pub fn sync_count(&mut self) {
        self.count = self.senders.len().min(u8::MAX as usize) as u8;
    }
}

/// An IP data packet originated by the control surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpDataPacket {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub cast_mode: CastMode,
    pub ttl: u8,
    pub hops_traveled: u8,
    /// Trace this packet at every hop.
    pub verbose: bool,
    pub payload: Bytes,
}

impl IpDataPacket {
    pub fn new(
        source: Ipv4Addr,
        destination: Ipv4Addr,
        cast_mode: CastMode,
        ttl: u8,
        payload: Bytes,
    ) -> Self {
        Self {
            source,
            destination,
            cast_mode,
            ttl,
            hops_traveled: 0,
            verbose: false,
            payload,
        }
    }
}

/// The common packet envelope handed between nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    JoinQuery(JoinQueryPacket),
    JoinReply(JoinReplyPacket),
    IpData(IpDataPacket),
}

impl Packet {
    /// Dispatch class of this packet. Protocol floods are broadcast by
    /// construction; data packets carry their inferred mode.
    pub fn cast_mode(&self) -> CastMode {
        match self {
            Packet::JoinQuery(_) | Packet::JoinReply(_) => CastMode::Broadcast,
            Packet::IpData(p) => p.cast_mode,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Packet::JoinQuery(_) => "Join Query",
            Packet::JoinReply(_) => "Join Reply",
            Packet::IpData(_) => "IP Data",
        }
    }
}
