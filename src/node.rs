// SPDX-License-Identifier: Apache-2.0 OR MIT
//! A network participant and its protocol step function.
//!
//! A node is split in two:
//!
//! - [`NodeIface`] is the shared queue endpoint: the node's IP, its atomic
//!   `down` flag, and the bounded send/receive queues. Neighbor links hold
//!   `Arc<NodeIface>` handles, never nodes, so there are no reference cycles
//!   between nodes or back to the scheduler. The queues are multi-producer,
//!   single-consumer: any neighbor (or the console) pushes, only the owning
//!   node pops.
//! - [`Node`] owns the protocol state and performs exactly one routing
//!   operation per [`Node::process`] call: emit a due Join Query, transmit
//!   one pending send packet, or consume one received packet.
//!
//! Packet hand-off always clones: `accept` takes the packet by value and a
//! broadcast clones once per neighbor, so no mutation a receiver makes is
//! visible anywhere else.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_queue::ArrayQueue;

use crate::config::SimConfig;
use crate::logging::{Facility, Logger};
use crate::odmrp::{MessageCacheEntry, OdmrpState};
use crate::packet::{
    CastMode, IpDataPacket, JoinQueryPacket, JoinReplyPacket, Packet, SenderRecord,
};
use crate::routing::{RoutingEntry, RoutingTable};
use crate::{log_debug, log_info, log_notice, log_warning};

/// A received packet together with the neighbor that delivered it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub packet: Packet,
    /// IP of the delivering neighbor; the split-horizon exclusion for
    /// re-broadcast of data packets.
    pub from: Ipv4Addr,
}

/// The shared, thread-safe endpoint of a node.
#[derive(Debug)]
pub struct NodeIface {
    ip: Ipv4Addr,
    down: AtomicBool,
    rx: ArrayQueue<Delivery>,
    tx: ArrayQueue<IpDataPacket>,
}

impl NodeIface {
    pub fn new(ip: Ipv4Addr, queue_capacity: usize) -> Self {
        Self {
            ip,
            down: AtomicBool::new(false),
            rx: ArrayQueue::new(queue_capacity),
            tx: ArrayQueue::new(queue_capacity),
        }
    }

    #[inline]
    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn is_down(&self) -> bool {
        self.down.load(Ordering::Relaxed)
    }

    /// Mark the node down (rejects all incoming packets) or back up.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::Relaxed);
    }

    /// Hand a packet to this node. Returns `false` when the node is down.
    /// On a full queue the oldest pending packet is dropped to make room.
    pub fn accept(&self, packet: Packet, from: Ipv4Addr) -> bool {
        if self.is_down() {
            return false;
        }
        self.rx.force_push(Delivery { packet, from });
        true
    }

    /// Queue a locally originated IP packet for transmission.
    pub fn enqueue_send(&self, packet: IpDataPacket) {
        self.tx.force_push(packet);
    }

    /// Single consumer only: the owning node.
    pub fn pop_receive(&self) -> Option<Delivery> {
        self.rx.pop()
    }

    /// Single consumer only: the owning node.
    pub fn pop_send(&self) -> Option<IpDataPacket> {
        self.tx.pop()
    }

    pub fn has_pending_receive(&self) -> bool {
        !self.rx.is_empty()
    }

    pub fn has_pending_send(&self) -> bool {
        !self.tx.is_empty()
    }

    pub fn pending_receive_len(&self) -> usize {
        self.rx.len()
    }

    pub fn pending_send_len(&self) -> usize {
        self.tx.len()
    }

    pub fn has_pending(&self) -> bool {
        self.has_pending_receive() || self.has_pending_send()
    }
}

/// Per-node traffic counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeStats {
    /// Join Queries originated (periodic or route-request).
    pub queries_sent: u64,
    /// Join Replies originated as a receiver.
    pub replies_sent: u64,
    /// Unicast hand-offs via the routing table (originations and forwards).
    pub packets_sent: u64,
    /// Broadcast fan-outs of data packets.
    pub packets_broadcast: u64,
    /// Packets consumed from the receive queue.
    pub packets_received: u64,
    /// Data packets handed to the local consumer.
    pub packets_delivered: u64,
    /// Packets discarded (duplicates, TTL expiry, no route, no group).
    pub packets_dropped: u64,
}

/// What one `process()` call did, for the scheduler.
#[derive(Debug, Default)]
pub struct StepReport {
    /// Whether an operation was actually performed.
    pub performed: bool,
    /// Neighbors that accepted a hand-off during this step; the scheduler
    /// activates them.
    pub woke: Vec<Ipv4Addr>,
    /// Re-activate this node in the current drain.
    pub requeue: bool,
}

/// A network participant: identity, neighbor links, multicast memberships,
/// and the ODMRP state machine.
pub struct Node {
    iface: Arc<NodeIface>,
    multicast_source: Option<Ipv4Addr>,
    /// Memberships; always includes the node's own IP.
    multicast_groups: BTreeSet<Ipv4Addr>,
    /// Nodes observed (via Join Replies coming home) to subscribe to our
    /// source.
    multicast_receivers: BTreeSet<Ipv4Addr>,
    /// Ordered neighbor links, keyed by IP.
    neighbors: BTreeMap<Ipv4Addr, Arc<NodeIface>>,
    odmrp: OdmrpState,
    /// Destinations with an outstanding route request.
    route_requests: BTreeSet<Ipv4Addr>,
    /// Query prepared during a previous tick, emitted by the next P1.
    join_query_next: Option<JoinQueryPacket>,
    send_receive_toggle: bool,
    sequence_counter: u32,
    default_ttl: u8,
    /// Transport-layer hand-off buffer for locally delivered data packets.
    delivered: Vec<IpDataPacket>,
    stats: NodeStats,
    logger: Logger,
}

impl Node {
    pub fn new(
        ip: Ipv4Addr,
        multicast_source: Option<Ipv4Addr>,
        config: &SimConfig,
        logger: Logger,
    ) -> Self {
        let mut multicast_groups = BTreeSet::new();
        // Our own IP is a group we always answer for; this is what lets a
        // unicast route request (group = destination IP) reach us.
        multicast_groups.insert(ip);
        Self {
            iface: Arc::new(NodeIface::new(ip, config.queue_size)),
            multicast_source,
            multicast_groups,
            multicast_receivers: BTreeSet::new(),
            neighbors: BTreeMap::new(),
            odmrp: OdmrpState::new(config.odmrp()),
            route_requests: BTreeSet::new(),
            join_query_next: None,
            send_receive_toggle: false,
            sequence_counter: 0,
            default_ttl: config.default_ttl,
            delivered: Vec::new(),
            stats: NodeStats::default(),
            logger,
        }
    }

    #[inline]
    pub fn ip(&self) -> Ipv4Addr {
        self.iface.ip()
    }

    pub fn iface(&self) -> Arc<NodeIface> {
        Arc::clone(&self.iface)
    }

    pub fn multicast_source(&self) -> Option<Ipv4Addr> {
        self.multicast_source
    }

    pub fn set_multicast_source(&mut self, source: Option<Ipv4Addr>) {
        self.multicast_source = source;
    }

    pub fn join_group(&mut self, group: Ipv4Addr) {
        self.multicast_groups.insert(group);
    }

    pub fn multicast_groups(&self) -> &BTreeSet<Ipv4Addr> {
        &self.multicast_groups
    }

    pub fn multicast_receivers(&self) -> &BTreeSet<Ipv4Addr> {
        &self.multicast_receivers
    }

    pub fn add_neighbor(&mut self, iface: Arc<NodeIface>) {
        self.neighbors.insert(iface.ip(), iface);
    }

    pub fn remove_neighbor(&mut self, ip: Ipv4Addr) -> bool {
        self.neighbors.remove(&ip).is_some()
    }

    pub fn has_neighbor(&self, ip: Ipv4Addr) -> bool {
        self.neighbors.contains_key(&ip)
    }

    pub fn neighbor_ips(&self) -> Vec<Ipv4Addr> {
        self.neighbors.keys().copied().collect()
    }

    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    pub fn delivered(&self) -> &[IpDataPacket] {
        &self.delivered
    }

    pub fn odmrp(&self) -> &OdmrpState {
        &self.odmrp
    }

    pub fn odmrp_mut(&mut self) -> &mut OdmrpState {
        &mut self.odmrp
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.odmrp.routes
    }

    /// Cheapest known route to `destination`.
    pub fn route_to(&self, destination: Ipv4Addr) -> Option<RoutingEntry> {
        self.odmrp.routes.get_route_for_destination(destination)
    }

    pub fn remove_all_routes_to(&mut self, destination: Ipv4Addr) -> usize {
        self.odmrp.routes.remove_all_routes_to(destination)
    }

    /// Whether this node has queued work (used by the scheduler scan).
    pub fn has_pending(&self) -> bool {
        self.iface.has_pending() || self.join_query_next.is_some()
    }

    /// When the periodic Join Query falls due. `None` for nodes without a
    /// multicast source: they only query on demand.
    pub fn refresh_due(&self, now: Instant) -> Option<Instant> {
        self.multicast_source?;
        Some(self.odmrp.refresh_due_at().unwrap_or(now))
    }

    /// Queue a locally originated IP packet.
    pub fn send_packet(&self, packet: IpDataPacket) {
        self.iface.enqueue_send(packet);
    }

    /// Perform exactly one routing operation, in priority order:
    ///
    /// 1. emit a prepared or timer-due Join Query,
    /// 2. transmit one pending send packet,
    /// 3. consume one pending receive packet.
    ///
    /// Returns what happened so the scheduler can activate woken neighbors
    /// and count completed operations.
    pub fn process(&mut self, now: Instant) -> StepReport {
        let mut report = StepReport::default();

        // (P1) Periodic or pending Join Query.
        let due_query = match self.join_query_next.take() {
            Some(query) => Some(query),
            None if self.odmrp.is_route_refresh_needed(now) => self
                .multicast_source
                .map(|target| self.prepare_join_query(target)),
            None => None,
        };
        if let Some(query) = due_query {
            // Cache our own fingerprint before flooding so copies that loop
            // back are dropped.
            self.odmrp
                .add_message_cache_entry(MessageCacheEntry::new(query.source, query.sequence));
            log_info!(
                self.logger,
                Facility::Node,
                &format!(
                    "[{}] broadcasting Join Query for {} seq={}",
                    self.ip(),
                    query.multicast_group,
                    query.sequence
                )
            );
            self.stats.queries_sent += 1;
            self.broadcast(Packet::JoinQuery(query), None, &mut report);
            self.odmrp.reset_last_route_refresh(now);
            report.performed = true;
            self.finish_step(&mut report);
            return report;
        }

        // (P2) Originate one IP send, unless the toggle yields to a pending
        // receive.
        let mut did_send = false;
        let gotta_send = self.iface.has_pending_send()
            && (!self.iface.has_pending_receive() || self.send_receive_toggle);
        if gotta_send {
            if let Some(packet) = self.iface.pop_send() {
                did_send = self.dispatch_send(packet, &mut report);
            }
        }

        // (P3) Consume one received packet.
        if !did_send {
            if let Some(delivery) = self.iface.pop_receive() {
                self.stats.packets_received += 1;
                report.performed = true;
                log_debug!(
                    self.logger,
                    Facility::Node,
                    &format!(
                        "[{}] processing {} from {}",
                        self.ip(),
                        delivery.packet.type_name(),
                        delivery.from
                    )
                );
                match delivery.packet {
                    Packet::JoinQuery(query) => self.handle_join_query(query, &mut report),
                    Packet::JoinReply(reply) => self.handle_join_reply(reply, now, &mut report),
                    Packet::IpData(packet) => {
                        self.handle_ip_data(packet, delivery.from, now, &mut report)
                    }
                }
            }
        }

        self.finish_step(&mut report);
        report
    }

    fn finish_step(&mut self, report: &mut StepReport) {
        self.send_receive_toggle = !self.send_receive_toggle;
        report.requeue = report.performed && self.iface.has_pending();
    }

    /// Dispatch one locally originated packet by cast mode. Returns whether
    /// the send half of this tick is spent.
    fn dispatch_send(&mut self, packet: IpDataPacket, report: &mut StepReport) -> bool {
        match packet.cast_mode {
            // Origination floods regardless of forwarding-group membership;
            // the group check applies to forwarding only.
            CastMode::Broadcast | CastMode::Multicast => {
                log_info!(
                    self.logger,
                    Facility::Node,
                    &format!(
                        "[{}] originating {} data to {}",
                        self.ip(),
                        packet.cast_mode.as_str(),
                        packet.destination
                    )
                );
                self.stats.packets_broadcast += 1;
                self.broadcast(Packet::IpData(packet), None, report);
                report.performed = true;
                true
            }
            CastMode::Unicast => {
                if self.route_requests.contains(&packet.destination) {
                    // Discovery outstanding: keep the packet and let the
                    // receive half run this tick.
                    self.iface.enqueue_send(packet);
                    return false;
                }
                if self.route_packet(&packet, report) {
                    self.stats.packets_sent += 1;
                    report.performed = true;
                    return true;
                }
                // No usable route: keep the packet for retry and query for
                // the destination on the next tick, its IP riding in the
                // query's group field so the target answers.
                log_info!(
                    self.logger,
                    Facility::Node,
                    &format!(
                        "[{}] no route to {}, scheduling Join Query",
                        self.ip(),
                        packet.destination
                    )
                );
                self.route_requests.insert(packet.destination);
                self.join_query_next = Some(self.prepare_join_query(packet.destination));
                self.iface.enqueue_send(packet);
                report.performed = true;
                true
            }
            CastMode::NoAddr => {
                self.stats.packets_dropped += 1;
                report.performed = true;
                true
            }
        }
    }

    fn handle_join_query(&mut self, mut query: JoinQueryPacket, report: &mut StepReport) {
        let entry = MessageCacheEntry::new(query.source, query.sequence);
        if !self.odmrp.add_message_cache_entry(entry) {
            log_debug!(
                self.logger,
                Facility::Node,
                &format!(
                    "[{}] duplicate Join Query from {} seq={}",
                    self.ip(),
                    query.source,
                    query.sequence
                )
            );
            self.stats.packets_dropped += 1;
            return;
        }

        // Reverse-path learning: the query's source is reachable through
        // whoever handed it to us.
        self.install_route(query.source, query.previous_hop);

        // Intended receiver (group membership includes our own IP, which is
        // how unicast route requests find their target): answer with a
        // Join Reply toward the source.
        if self.multicast_groups.contains(&query.multicast_group) {
            let reply = self.prepare_join_reply(query.multicast_group, &[query.source]);
            log_info!(
                self.logger,
                Facility::Node,
                &format!(
                    "[{}] answering Join Query for {} with reply seq={}",
                    self.ip(),
                    query.multicast_group,
                    reply.sequence
                )
            );
            self.stats.replies_sent += 1;
            self.broadcast(Packet::JoinReply(reply), None, report);
        }

        // Re-flood with split horizon while the TTL lasts.
        query.hop_count = query.hop_count.saturating_add(1);
        if query.ttl > 1 {
            query.ttl -= 1;
            let arrival_hop = query.previous_hop;
            query.previous_hop = self.ip();
            self.broadcast(Packet::JoinQuery(query), Some(arrival_hop), report);
        }
    }

    fn handle_join_reply(
        &mut self,
        mut reply: JoinReplyPacket,
        now: Instant,
        report: &mut StepReport,
    ) {
        self.install_route(reply.source, reply.previous_hop);

        let me = self.ip();
        let mut retained = Vec::with_capacity(reply.senders.len());
        for mut sender in std::mem::take(&mut reply.senders) {
            if sender.sender_ip == me {
                // The reply reached its originator for this sender: record
                // the replier and keep our own mesh membership fresh.
                log_info!(
                    self.logger,
                    Facility::Node,
                    &format!(
                        "[{}] Join Reply from {} arrived for group {}",
                        me, reply.source, reply.multicast_group
                    )
                );
                self.multicast_receivers.insert(reply.source);
                self.odmrp
                    .add_group_to_forwarding(reply.multicast_group, now);
                continue;
            }
            if sender.next_hop_ip != me {
                // Not our hop for this sender.
                continue;
            }
            match self.odmrp.routes.get_route_for_destination(sender.sender_ip) {
                Some(route) => {
                    sender.next_hop_ip = route.next_hop;
                    retained.push(sender);
                }
                None => {
                    log_debug!(
                        self.logger,
                        Facility::Node,
                        &format!("[{}] no route toward sender {}", me, sender.sender_ip)
                    );
                }
            }
        }
        reply.senders = retained;
        reply.sync_count();

        if reply.senders.is_empty() {
            return;
        }

        // We are now on a forwarding path for this group.
        self.odmrp
            .add_group_to_forwarding(reply.multicast_group, now);
        log_info!(
            self.logger,
            Facility::Node,
            &format!(
                "[{}] joined forwarding group {} and relaying reply",
                me, reply.multicast_group
            )
        );
        let arrival_hop = reply.previous_hop;
        reply.previous_hop = me;
        self.broadcast(Packet::JoinReply(reply), Some(arrival_hop), report);
    }

    fn handle_ip_data(
        &mut self,
        mut packet: IpDataPacket,
        from: Ipv4Addr,
        now: Instant,
        report: &mut StepReport,
    ) {
        // The hop completes on consumption; the TTL is only spent when the
        // packet moves on.
        packet.hops_traveled = packet.hops_traveled.saturating_add(1);
        if packet.verbose {
            log_notice!(
                self.logger,
                Facility::Node,
                &format!(
                    "[{}] data {} -> {} ttl={} hops={}",
                    self.ip(),
                    packet.source,
                    packet.destination,
                    packet.ttl,
                    packet.hops_traveled
                )
            );
        }

        if packet.destination == self.ip() || self.multicast_groups.contains(&packet.destination) {
            log_info!(
                self.logger,
                Facility::Node,
                &format!(
                    "[{}] delivered data from {} after {} hops",
                    self.ip(),
                    packet.source,
                    packet.hops_traveled
                )
            );
            self.stats.packets_delivered += 1;
            self.delivered.push(packet);
            return;
        }

        if packet.ttl <= 1 {
            log_debug!(
                self.logger,
                Facility::Node,
                &format!("[{}] TTL expired for data to {}", self.ip(), packet.destination)
            );
            self.stats.packets_dropped += 1;
            return;
        }
        packet.ttl -= 1;

        match packet.cast_mode {
            CastMode::Unicast => {
                if self.route_packet(&packet, report) {
                    self.stats.packets_sent += 1;
                } else {
                    log_info!(
                        self.logger,
                        Facility::Node,
                        &format!(
                            "[{}] no route to {}, dropping forwarded data",
                            self.ip(),
                            packet.destination
                        )
                    );
                    self.stats.packets_dropped += 1;
                }
            }
            CastMode::Broadcast => {
                self.stats.packets_broadcast += 1;
                self.broadcast(Packet::IpData(packet), Some(from), report);
            }
            CastMode::Multicast => {
                // Only live forwarding-group members relay.
                if self
                    .odmrp
                    .get_group_entry(packet.destination, now, true)
                    .is_some()
                {
                    self.stats.packets_broadcast += 1;
                    self.broadcast(Packet::IpData(packet), Some(from), report);
                } else {
                    log_debug!(
                        self.logger,
                        Facility::Node,
                        &format!(
                            "[{}] not forwarding for group {}",
                            self.ip(),
                            packet.destination
                        )
                    );
                    self.stats.packets_dropped += 1;
                }
            }
            CastMode::NoAddr => {
                self.stats.packets_dropped += 1;
            }
        }
    }

    /// Clone `packet` to every neighbor except `except`. Returns whether at
    /// least one neighbor accepted.
    fn broadcast(
        &mut self,
        packet: Packet,
        except: Option<Ipv4Addr>,
        report: &mut StepReport,
    ) -> bool {
        let me = self.ip();
        let mut accepted = false;
        for (ip, iface) in &self.neighbors {
            if Some(*ip) == except {
                continue;
            }
            if iface.accept(packet.clone(), me) {
                accepted = true;
                report.woke.push(*ip);
            }
        }
        accepted
    }

    /// Unicast `packet` along the routing table, pruning entries whose next
    /// hop refuses delivery. Returns `true` on the first successful hand-off.
    fn route_packet(&mut self, packet: &IpDataPacket, report: &mut StepReport) -> bool {
        let me = self.ip();
        loop {
            let Some(route) = self
                .odmrp
                .routes
                .get_route_for_destination(packet.destination)
            else {
                return false;
            };
            let delivered = self
                .neighbors
                .get(&route.next_hop)
                .is_some_and(|iface| iface.accept(Packet::IpData(packet.clone()), me));
            if delivered {
                report.woke.push(route.next_hop);
                return true;
            }
            // Next hop gone or down: this route is dead.
            log_warning!(
                self.logger,
                Facility::Node,
                &format!(
                    "[{}] pruning dead route to {} via {}",
                    me, route.destination, route.next_hop
                )
            );
            self.odmrp
                .routes
                .remove_entry(route.destination, route.next_hop);
        }
    }

    /// Install a learned route and settle any outstanding request for the
    /// destination.
    fn install_route(&mut self, destination: Ipv4Addr, next_hop: Ipv4Addr) {
        self.odmrp.routes.add(RoutingEntry::new(destination, next_hop));
        if self.route_requests.remove(&destination) {
            log_info!(
                self.logger,
                Facility::Node,
                &format!("[{}] route to {} discovered via {}", self.ip(), destination, next_hop)
            );
        }
    }

    fn next_sequence(&mut self) -> u32 {
        let sequence = self.sequence_counter;
        self.sequence_counter = self.sequence_counter.wrapping_add(1);
        sequence
    }

    /// Fill a fresh Join Query originated by this node. `target` is either
    /// our multicast source group or a desired unicast destination.
    fn prepare_join_query(&mut self, target: Ipv4Addr) -> JoinQueryPacket {
        JoinQueryPacket {
            source: self.ip(),
            multicast_group: target,
            previous_hop: self.ip(),
            sequence: self.next_sequence(),
            ttl: self.default_ttl,
            hop_count: 0,
        }
    }

    /// Fill a fresh Join Reply originated by this node, resolving each
    /// source through the routing table.
    fn prepare_join_reply(&mut self, group: Ipv4Addr, sources: &[Ipv4Addr]) -> JoinReplyPacket {
        let mut senders = Vec::with_capacity(sources.len());
        for addr in sources {
            if let Some(route) = self.odmrp.routes.get_route_for_destination(*addr) {
                senders.push(SenderRecord {
                    sender_ip: *addr,
                    next_hop_ip: route.next_hop,
                    route_expiration: 0,
                });
            }
        }
        let mut reply = JoinReplyPacket {
            source: self.ip(),
            multicast_group: group,
            previous_hop: self.ip(),
            sequence: self.next_sequence(),
            ack_req: false,
            forward_group: false,
            count: 0,
            senders,
        };
        reply.sync_count();
        reply
    }

    /// Human-readable node state for the console's `query` command.
    pub fn describe(&self, now: Instant) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "Node {}", self.ip());
        let _ = writeln!(
            out,
            "  multicast source: {}",
            self.multicast_source
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        let _ = writeln!(out, "  down: {}", self.iface.is_down());
        let _ = writeln!(out, "  neighbors: {}", join_ips(self.neighbor_ips()));
        let _ = writeln!(
            out,
            "  groups: {}",
            join_ips(self.multicast_groups.iter().copied().collect())
        );
        let _ = writeln!(
            out,
            "  receivers: {}",
            join_ips(self.multicast_receivers.iter().copied().collect())
        );
        let _ = writeln!(out, "  routing table:");
        let _ = writeln!(out, "{}", self.odmrp.routes);
        let _ = writeln!(out, "  forwarding groups:");
        for entry in self.odmrp.forwarding_groups() {
            let _ = writeln!(
                out,
                "    {} (refreshed {}ms ago)",
                entry.group_id,
                now.saturating_duration_since(entry.last_refreshed).as_millis()
            );
        }
        let stats = self.stats;
        let _ = write!(
            out,
            "  stats: queries={} replies={} sent={} broadcast={} received={} delivered={} dropped={}",
            stats.queries_sent,
            stats.replies_sent,
            stats.packets_sent,
            stats.packets_broadcast,
            stats.packets_received,
            stats.packets_delivered,
            stats.packets_dropped
        );
        out
    }
}

fn join_ips(ips: Vec<Ipv4Addr>) -> String {
    if ips.is_empty() {
        return "-".to_string();
    }
    ips.iter()
        .map(|ip| ip.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
