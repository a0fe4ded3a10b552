// SPDX-License-Identifier: Apache-2.0 OR MIT
//! The scheduler that owns all nodes and drives logical time.
//!
//! One worker loop advances the simulation. Each iteration:
//!
//! 1. scans every node: nodes with pending packets or a due route-refresh
//!    timer self-enqueue into the activation queue, and the earliest future
//!    deadline becomes the next wake-up (at least one millisecond out),
//! 2. drains the activation queue in FIFO order, calling `process()` once
//!    per entry; a step may re-enqueue its own node or wake neighbors, and
//!    such entries are served in the same drain,
//! 3. sleeps until the wake-up or until notified (shutdown, new packet from
//!    the control surface).
//!
//! The scan-and-drain is [`Network::tick`], a plain synchronous function of
//! a caller-supplied `now`; the async [`Network::run`] loop only adds the
//! timed, notifiable wait. Tests drive `tick` directly with a synthetic
//! clock and get fully deterministic schedules.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam_queue::SegQueue;
use tokio::sync::Notify;

use crate::config::SimConfig;
use crate::error::SimError;
use crate::logging::{Facility, Logger};
use crate::node::Node;
use crate::packet::IpDataPacket;
use crate::routing::RoutingEntry;
use crate::validation;
use crate::{log_debug, log_info, log_notice};

/// Minimum scheduler period: nodes with pending work are rescanned at this
/// interval even without notifications.
const TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Running totals kept by the scheduler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NetworkStats {
    /// Nodes activated by their route-refresh timer.
    pub timer_activations: u64,
    /// `process()` calls that performed an operation.
    pub operations: u64,
}

/// Parameters for creating one node.
#[derive(Debug, Clone, Default)]
pub struct NodeParams {
    pub multicast_source: Option<Ipv4Addr>,
    pub groups: Vec<Ipv4Addr>,
    pub neighbors: Vec<Ipv4Addr>,
}

/// The simulated network: node registry, activation queue, and worker state.
pub struct Network {
    config: SimConfig,
    /// Ordered registry of live nodes.
    nodes: Mutex<BTreeMap<Ipv4Addr, Node>>,
    /// Multi-producer activation queue, drained FIFO by the worker.
    active: SegQueue<Ipv4Addr>,
    /// Wakes the worker out of its timed wait.
    wake: Notify,
    shutdown: AtomicBool,
    timer_activations: AtomicU64,
    operations: AtomicU64,
    logger: Logger,
}

impl Network {
    pub fn new(config: SimConfig, logger: Logger) -> Arc<Self> {
        Arc::new(Self {
            config,
            nodes: Mutex::new(BTreeMap::new()),
            active: SegQueue::new(),
            wake: Notify::new(),
            shutdown: AtomicBool::new(false),
            timer_activations: AtomicU64::new(0),
            operations: AtomicU64::new(0),
            logger,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            timer_activations: self.timer_activations.load(Ordering::Relaxed),
            operations: self.operations.load(Ordering::Relaxed),
        }
    }

    /// Create a node and link it to its initial neighbors.
    pub fn add_node(&self, ip: Ipv4Addr, params: NodeParams) -> Result<(), SimError> {
        if !validation::is_valid_unicast(ip) {
            return Err(SimError::NodeConnect(format!(
                "{ip} is not a unicast host address"
            )));
        }
        if params.neighbors.contains(&ip) {
            return Err(SimError::NodeConnect(format!("{ip} cannot connect to itself")));
        }

        let mut nodes = self.nodes.lock().unwrap();
        if nodes.contains_key(&ip) {
            return Err(SimError::NodeConnect(format!("node {ip} already exists")));
        }
        for neighbor in &params.neighbors {
            if !nodes.contains_key(neighbor) {
                return Err(SimError::NotFound(neighbor.to_string()));
            }
        }

        let mut node = Node::new(ip, params.multicast_source, &self.config, self.logger.clone());
        for group in params.groups {
            node.join_group(group);
        }
        for neighbor_ip in &params.neighbors {
            // Both checked above; links are symmetric.
            let peer = nodes.get_mut(neighbor_ip).ok_or_else(|| {
                SimError::NotFound(neighbor_ip.to_string())
            })?;
            peer.add_neighbor(node.iface());
            node.add_neighbor(peer.iface());
        }
        log_notice!(
            self.logger,
            Facility::Scheduler,
            &format!("node {ip} added with {} neighbor(s)", node.neighbor_ips().len())
        );
        nodes.insert(ip, node);
        drop(nodes);

        self.activate(ip);
        Ok(())
    }

    /// Disconnect a node from every neighbor and drop it from the registry.
    pub fn remove_node(&self, ip: Ipv4Addr) -> Result<(), SimError> {
        let mut nodes = self.nodes.lock().unwrap();
        let node = nodes
            .remove(&ip)
            .ok_or_else(|| SimError::NotFound(ip.to_string()))?;
        for neighbor_ip in node.neighbor_ips() {
            if let Some(peer) = nodes.get_mut(&neighbor_ip) {
                peer.remove_neighbor(ip);
            }
        }
        log_notice!(
            self.logger,
            Facility::Scheduler,
            &format!("node {ip} removed")
        );
        Ok(())
    }

    /// Symmetric link: after this, each node is in the other's neighbor set.
    pub fn connect(&self, a: Ipv4Addr, b: Ipv4Addr) -> Result<(), SimError> {
        if a == b {
            return Err(SimError::NodeConnect(format!("{a} cannot connect to itself")));
        }
        let mut nodes = self.nodes.lock().unwrap();
        let iface_a = nodes
            .get(&a)
            .ok_or_else(|| SimError::NotFound(a.to_string()))?
            .iface();
        let iface_b = nodes
            .get(&b)
            .ok_or_else(|| SimError::NotFound(b.to_string()))?
            .iface();
        if let Some(node) = nodes.get_mut(&a) {
            node.add_neighbor(iface_b);
        }
        if let Some(node) = nodes.get_mut(&b) {
            node.add_neighbor(iface_a);
        }
        log_info!(
            self.logger,
            Facility::Scheduler,
            &format!("connected {a} <-> {b}")
        );
        Ok(())
    }

    /// Symmetric unlink.
    pub fn disconnect(&self, a: Ipv4Addr, b: Ipv4Addr) -> Result<(), SimError> {
        let mut nodes = self.nodes.lock().unwrap();
        if !nodes.contains_key(&a) {
            return Err(SimError::NotFound(a.to_string()));
        }
        if !nodes.contains_key(&b) {
            return Err(SimError::NotFound(b.to_string()));
        }
        if let Some(node) = nodes.get_mut(&a) {
            node.remove_neighbor(b);
        }
        if let Some(node) = nodes.get_mut(&b) {
            node.remove_neighbor(a);
        }
        log_info!(
            self.logger,
            Facility::Scheduler,
            &format!("disconnected {a} <-> {b}")
        );
        Ok(())
    }

    /// Originate an IP packet from `source`. The cast mode is inferred from
    /// the destination; the node is activated and the worker notified.
    pub fn send_packet(
        &self,
        source: Ipv4Addr,
        destination: Ipv4Addr,
        payload: Bytes,
        verbose: bool,
    ) -> Result<(), SimError> {
        let mode = validation::cast_mode_of(destination);
        let mut packet = IpDataPacket::new(
            source,
            destination,
            mode,
            self.config.send_ttl,
            payload,
        );
        packet.verbose = verbose;

        let nodes = self.nodes.lock().unwrap();
        let node = nodes
            .get(&source)
            .ok_or_else(|| SimError::NotFound(source.to_string()))?;
        log_info!(
            self.logger,
            Facility::Scheduler,
            &format!("sending {} packet {source} -> {destination}", mode.as_str())
        );
        node.send_packet(packet);
        drop(nodes);

        self.activate(source);
        Ok(())
    }

    /// Cheapest route on `source`'s table toward `destination`.
    pub fn route_lookup(
        &self,
        source: Ipv4Addr,
        destination: Ipv4Addr,
    ) -> Result<Option<RoutingEntry>, SimError> {
        let nodes = self.nodes.lock().unwrap();
        let node = nodes
            .get(&source)
            .ok_or_else(|| SimError::NotFound(source.to_string()))?;
        Ok(node.route_to(destination))
    }

    /// Render one node's state for the console.
    pub fn describe_node(&self, ip: Ipv4Addr, now: Instant) -> Result<String, SimError> {
        let nodes = self.nodes.lock().unwrap();
        let node = nodes
            .get(&ip)
            .ok_or_else(|| SimError::NotFound(ip.to_string()))?;
        Ok(node.describe(now))
    }

    /// Every node and its neighbor IPs, in address order.
    pub fn list_nodes(&self) -> Vec<(Ipv4Addr, Vec<Ipv4Addr>)> {
        let nodes = self.nodes.lock().unwrap();
        nodes
            .iter()
            .map(|(ip, node)| (*ip, node.neighbor_ips()))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }

    /// Run a closure against one node (test and console support).
    pub fn with_node<R>(&self, ip: Ipv4Addr, f: impl FnOnce(&Node) -> R) -> Option<R> {
        let nodes = self.nodes.lock().unwrap();
        nodes.get(&ip).map(f)
    }

    /// Run a closure against one node mutably (test support).
    pub fn with_node_mut<R>(&self, ip: Ipv4Addr, f: impl FnOnce(&mut Node) -> R) -> Option<R> {
        let mut nodes = self.nodes.lock().unwrap();
        nodes.get_mut(&ip).map(f)
    }

    /// Mark a node active and nudge the worker.
    pub fn activate(&self, ip: Ipv4Addr) {
        self.active.push(ip);
        self.wake.notify_one();
    }

    /// One scheduler iteration at logical time `now`: scan, then drain.
    /// Returns when the worker should wake next: the earliest future
    /// route-refresh deadline, never less than one tick out.
    pub fn tick(&self, now: Instant) -> Instant {
        let mut next_due: Option<Instant> = None;

        // Scan: due or busy nodes self-enqueue; the earliest idle timer
        // sets the wake-up.
        {
            let nodes = self.nodes.lock().unwrap();
            for (ip, node) in nodes.iter() {
                if node.has_pending() {
                    self.active.push(*ip);
                    continue;
                }
                if let Some(due) = node.refresh_due(now) {
                    if due <= now {
                        self.timer_activations.fetch_add(1, Ordering::Relaxed);
                        self.active.push(*ip);
                    } else {
                        next_due = Some(next_due.map_or(due, |d| d.min(due)));
                    }
                }
            }
        }

        // Drain FIFO; woken neighbors and re-enqueued nodes are served in
        // this same drain.
        while let Some(ip) = self.active.pop() {
            if self.is_shutdown() {
                break;
            }
            let mut nodes = self.nodes.lock().unwrap();
            let Some(node) = nodes.get_mut(&ip) else {
                // Removed while queued.
                continue;
            };
            let report = node.process(now);
            drop(nodes);

            if report.performed {
                self.operations.fetch_add(1, Ordering::Relaxed);
            }
            for woken in report.woke {
                self.active.push(woken);
            }
            if report.requeue {
                self.active.push(ip);
            }
        }

        let floor = now + TICK_INTERVAL;
        next_due.map_or(floor, |due| due.max(floor))
    }

    /// Request cooperative shutdown; the worker exits at the next drain
    /// boundary.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// The worker loop. Only this task blocks, and only here, between
    /// drains.
    pub async fn run(self: Arc<Self>) {
        log_notice!(self.logger, Facility::Scheduler, "scheduler started");
        while !self.is_shutdown() {
            let now = Instant::now();
            let next_wake = self.tick(now);
            if self.is_shutdown() {
                break;
            }
            let delay = next_wake.saturating_duration_since(Instant::now());
            tokio::select! {
                _ = self.wake.notified() => {
                    log_debug!(self.logger, Facility::Scheduler, "worker notified");
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
        log_notice!(self.logger, Facility::Scheduler, "scheduler stopped");
    }
}
