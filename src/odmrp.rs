// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Per-node ODMRP soft state.
//!
//! Wraps the unicast routing table and adds the protocol's three pieces of
//! soft state:
//!
//! - **Message cache**: bounded FIFO of observed (source, sequence)
//!   fingerprints, used to suppress duplicate Join Query floods.
//! - **Forwarding-group table**: groups this node relays for, refreshed by
//!   Join Replies and expired lazily on access.
//! - **Route-refresh timer**: drives the periodic Join Query a multicast
//!   source emits to renew its mesh.
//!
//! There are no timer tasks. Every deadline is a stored instant compared
//! against a caller-supplied `now`, which keeps scheduling deterministic.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use crate::routing::RoutingTable;

/// Interval between periodic Join Queries from a multicast source.
pub const DEFAULT_ROUTE_REFRESH: Duration = Duration::from_millis(500);
/// Forwarding-group entries not refreshed within this window are dead.
pub const DEFAULT_FORWARDING_TIMEOUT: Duration = Duration::from_millis(1500);
/// Capacity of the duplicate-suppression message cache.
pub const MSG_CACHE_SIZE: usize = 2048;
/// Capacity of each per-node pending send/receive queue.
pub const PENDING_PACKET_QUEUE_SIZE: usize = 256;

/// Fingerprint of one originated flood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageCacheEntry {
    pub source: Ipv4Addr,
    pub packet_id: u32,
}

impl MessageCacheEntry {
    pub fn new(source: Ipv4Addr, packet_id: u32) -> Self {
        Self { source, packet_id }
    }
}

/// Bounded duplicate-suppression cache, evicting in insertion order.
#[derive(Debug)]
pub struct MessageCache {
    order: VecDeque<MessageCacheEntry>,
    seen: HashSet<MessageCacheEntry>,
    capacity: usize,
}

impl MessageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity.min(1024)),
            seen: HashSet::new(),
            capacity,
        }
    }

    /// Insert a fingerprint. Returns `true` when it was newly inserted; the
    /// oldest entry is evicted when the cache reaches capacity.
    pub fn add_entry(&mut self, entry: MessageCacheEntry) -> bool {
        if !self.seen.insert(entry) {
            return false;
        }
        self.order.push_back(entry);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }

    pub fn contains(&self, entry: &MessageCacheEntry) -> bool {
        self.seen.contains(entry)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// One forwarding-group membership, refreshed by every reinforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardingGroupEntry {
    pub group_id: Ipv4Addr,
    pub last_refreshed: Instant,
}

impl ForwardingGroupEntry {
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_refreshed) > timeout
    }
}

/// Timing and capacity knobs for one node's protocol state.
#[derive(Debug, Clone, Copy)]
pub struct OdmrpConfig {
    pub route_refresh: Duration,
    pub forwarding_timeout: Duration,
    pub msg_cache_size: usize,
}

impl Default for OdmrpConfig {
    fn default() -> Self {
        Self {
            route_refresh: DEFAULT_ROUTE_REFRESH,
            forwarding_timeout: DEFAULT_FORWARDING_TIMEOUT,
            msg_cache_size: MSG_CACHE_SIZE,
        }
    }
}

/// The complete per-node protocol state.
#[derive(Debug)]
pub struct OdmrpState {
    config: OdmrpConfig,
    /// Unicast routes learned from observed protocol traffic.
    pub routes: RoutingTable,
    message_cache: MessageCache,
    forwarding_group: BTreeMap<Ipv4Addr, ForwardingGroupEntry>,
    /// `None` until the first refresh, which makes the first poll due.
    last_route_refresh: Option<Instant>,
}

impl OdmrpState {
    pub fn new(config: OdmrpConfig) -> Self {
        let message_cache = MessageCache::new(config.msg_cache_size);
        Self {
            config,
            routes: RoutingTable::new(),
            message_cache,
            forwarding_group: BTreeMap::new(),
            last_route_refresh: None,
        }
    }

    pub fn config(&self) -> &OdmrpConfig {
        &self.config
    }

    /// See [`MessageCache::add_entry`].
    pub fn add_message_cache_entry(&mut self, entry: MessageCacheEntry) -> bool {
        self.message_cache.add_entry(entry)
    }

    pub fn is_entry_in_message_cache(&self, entry: &MessageCacheEntry) -> bool {
        self.message_cache.contains(entry)
    }

    pub fn message_cache_len(&self) -> usize {
        self.message_cache.len()
    }

    /// Create or refresh the forwarding-group entry for `group_id`.
    pub fn add_group_to_forwarding(&mut self, group_id: Ipv4Addr, now: Instant) {
        self.forwarding_group.insert(
            group_id,
            ForwardingGroupEntry {
                group_id,
                last_refreshed: now,
            },
        );
    }

    /// Look up a forwarding-group entry. With `delete_if_expired`, an entry
    /// past the forwarding timeout is removed and `None` is returned.
    pub fn get_group_entry(
        &mut self,
        group_id: Ipv4Addr,
        now: Instant,
        delete_if_expired: bool,
    ) -> Option<&ForwardingGroupEntry> {
        if delete_if_expired {
            let expired = self
                .forwarding_group
                .get(&group_id)
                .is_some_and(|e| e.is_expired(now, self.config.forwarding_timeout));
            if expired {
                self.forwarding_group.remove(&group_id);
                return None;
            }
        }
        self.forwarding_group.get(&group_id)
    }

    pub fn forwarding_groups(&self) -> impl Iterator<Item = &ForwardingGroupEntry> {
        self.forwarding_group.values()
    }

    /// Whether the periodic Join Query is due.
    pub fn is_route_refresh_needed(&self, now: Instant) -> bool {
        match self.last_route_refresh {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.config.route_refresh,
        }
    }

    pub fn reset_last_route_refresh(&mut self, now: Instant) {
        self.last_route_refresh = Some(now);
    }

    /// When the next periodic refresh falls due; `None` when one is already
    /// overdue (never refreshed).
    pub fn refresh_due_at(&self) -> Option<Instant> {
        self.last_route_refresh
            .map(|last| last + self.config.route_refresh)
    }
}
