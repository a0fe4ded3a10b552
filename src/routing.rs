// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Unicast routing table.
//!
//! Entries are keyed by (destination, next hop); multiple next hops per
//! destination are allowed and `cost` discriminates preference on lookup.
//! Entries carry no timers: they live until pruned on delivery failure or
//! removed explicitly.

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// One unicast route: how to reach `destination` via `next_hop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingEntry {
    pub destination: Ipv4Addr,
    pub next_hop: Ipv4Addr,
    pub cost: u64,
}

impl RoutingEntry {
    /// A zero-cost route; reverse-path learning installs these.
    pub fn new(destination: Ipv4Addr, next_hop: Ipv4Addr) -> Self {
        Self {
            destination,
            next_hop,
            cost: 0,
        }
    }

    pub fn with_cost(destination: Ipv4Addr, next_hop: Ipv4Addr, cost: u64) -> Self {
        Self {
            destination,
            next_hop,
            cost,
        }
    }
}

/// Multi-next-hop routing table, ordered by destination for display.
#[derive(Debug, Default)]
pub struct RoutingTable {
    entries: BTreeMap<Ipv4Addr, Vec<RoutingEntry>>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route, or update the cost in place when an entry with the
    /// same (destination, next hop) already exists.
    pub fn add(&mut self, entry: RoutingEntry) {
        let routes = self.entries.entry(entry.destination).or_default();
        if let Some(existing) = routes.iter_mut().find(|e| e.next_hop == entry.next_hop) {
            existing.cost = entry.cost;
        } else {
            routes.push(entry);
        }
    }

    /// The cheapest route to `destination`, if any.
    pub fn get_route_for_destination(&self, destination: Ipv4Addr) -> Option<RoutingEntry> {
        self.entries
            .get(&destination)?
            .iter()
            .min_by_key(|e| e.cost)
            .copied()
    }

    /// Remove the route matching (destination, next hop) exactly.
    /// Returns whether an entry was removed.
    pub fn remove_entry(&mut self, destination: Ipv4Addr, next_hop: Ipv4Addr) -> bool {
        let Some(routes) = self.entries.get_mut(&destination) else {
            return false;
        };
        let before = routes.len();
        routes.retain(|e| e.next_hop != next_hop);
        let removed = routes.len() < before;
        if routes.is_empty() {
            self.entries.remove(&destination);
        }
        removed
    }

    /// Remove every route to `destination`; returns how many were removed.
    pub fn remove_all_routes_to(&mut self, destination: Ipv4Addr) -> usize {
        self.entries
            .remove(&destination)
            .map(|routes| routes.len())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutingEntry> {
        self.entries.values().flatten()
    }
}

impl fmt::Display for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " ------------------ ------------------ ----------")?;
        writeln!(f, "| Destination      | Next Hop         | Cost     |")?;
        writeln!(f, " ================== ================== ==========")?;
        for entry in self.iter() {
            writeln!(
                f,
                "| {:>16} | {:>16} | {:>8} |",
                entry.destination, entry.next_hop, entry.cost
            )?;
        }
        write!(f, " ------------------ ------------------ ----------")
    }
}
