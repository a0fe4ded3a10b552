// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Protocol invariants exercised across several nodes through the scheduler.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use odmrp_sim::config::SimConfig;
use odmrp_sim::logging::Logger;
use odmrp_sim::network::{Network, NodeParams};

fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

fn quiet_network(config: SimConfig) -> Arc<Network> {
    Network::new(config, Logger::memory().0)
}

fn add_plain(net: &Network, addr: &str, neighbors: &[&str]) {
    net.add_node(
        ip(addr),
        NodeParams {
            neighbors: neighbors.iter().map(|n| ip(n)).collect(),
            ..NodeParams::default()
        },
    )
    .unwrap();
}

/// A synthetic monotonic clock for deterministic ticks.
struct Clock {
    now: Instant,
}

impl Clock {
    fn new() -> Self {
        Self {
            now: Instant::now(),
        }
    }

    fn advance(&mut self, step: Duration) -> Instant {
        self.now += step;
        self.now
    }
}

#[test]
fn test_connect_then_disconnect_restores_prior_state() {
    let net = quiet_network(SimConfig::default());
    add_plain(&net, "10.0.0.1", &[]);
    add_plain(&net, "10.0.0.2", &[]);
    add_plain(&net, "10.0.0.3", &["10.0.0.1"]);

    let before = net.list_nodes();
    net.connect(ip("10.0.0.1"), ip("10.0.0.2")).unwrap();
    assert!(net
        .with_node(ip("10.0.0.2"), |n| n.has_neighbor(ip("10.0.0.1")))
        .unwrap());

    net.disconnect(ip("10.0.0.1"), ip("10.0.0.2")).unwrap();
    assert_eq!(net.list_nodes(), before);
}

#[test]
fn test_flood_ingested_once_per_fingerprint() {
    // Diamond with a tail: S floods, Z hears two copies but relays once.
    //
    //      S
    //     / \
    //    X   Y
    //     \ /
    //      Z - W
    let net = quiet_network(SimConfig::default());
    net.add_node(
        ip("10.0.0.1"),
        NodeParams {
            multicast_source: Some(ip("224.0.0.1")),
            ..NodeParams::default()
        },
    )
    .unwrap();
    add_plain(&net, "10.0.0.2", &["10.0.0.1"]);
    add_plain(&net, "10.0.0.3", &["10.0.0.1"]);
    add_plain(&net, "10.0.0.4", &["10.0.0.2", "10.0.0.3"]);
    add_plain(&net, "10.0.0.5", &["10.0.0.4"]);

    let mut clock = Clock::new();
    net.tick(clock.advance(Duration::from_millis(1)));

    // Z consumed both copies, dropped the duplicate, and W saw exactly one.
    let z = net.with_node(ip("10.0.0.4"), |n| n.stats()).unwrap();
    assert_eq!(z.packets_received, 2);
    assert_eq!(z.packets_dropped, 1);
    let w = net.with_node(ip("10.0.0.5"), |n| n.stats()).unwrap();
    assert_eq!(w.packets_received, 1);
}

#[test]
fn test_packet_mutations_do_not_alias_between_receivers() {
    // One multicast origination fans out to two group members; each mutates
    // (hop count) and keeps its own copy.
    let net = quiet_network(SimConfig::default());
    add_plain(&net, "10.0.0.1", &[]);
    for receiver in ["10.0.0.2", "10.0.0.3"] {
        net.add_node(
            ip(receiver),
            NodeParams {
                groups: vec![ip("224.0.0.7")],
                neighbors: vec![ip("10.0.0.1")],
                ..NodeParams::default()
            },
        )
        .unwrap();
    }

    net.send_packet(
        ip("10.0.0.1"),
        ip("224.0.0.7"),
        Bytes::from_static(b"fan-out"),
        false,
    )
    .unwrap();

    let mut clock = Clock::new();
    net.tick(clock.advance(Duration::from_millis(1)));

    for receiver in ["10.0.0.2", "10.0.0.3"] {
        net.with_node(ip(receiver), |n| {
            let delivered = n.delivered();
            assert_eq!(delivered.len(), 1);
            assert_eq!(delivered[0].hops_traveled, 1);
            assert_eq!(delivered[0].ttl, 16);
            assert_eq!(&delivered[0].payload[..], b"fan-out");
        })
        .unwrap();
    }
}

#[test]
fn test_send_queue_is_bounded_with_drop_oldest() {
    let config = SimConfig {
        queue_size: 4,
        ..SimConfig::default()
    };
    let net = quiet_network(config);
    add_plain(&net, "10.0.0.1", &[]);

    for index in 0..10u8 {
        net.send_packet(
            ip("10.0.0.1"),
            ip("10.0.0.9"),
            Bytes::from(vec![index]),
            false,
        )
        .unwrap();
    }

    net.with_node(ip("10.0.0.1"), |n| {
        assert_eq!(n.iface().pending_send_len(), 4);
    })
    .unwrap();
}

#[test]
fn test_message_cache_stays_bounded_under_flood_churn() {
    let config = SimConfig {
        msg_cache_size: 8,
        route_refresh_ms: 10,
        ..SimConfig::default()
    };
    let net = quiet_network(config);
    net.add_node(
        ip("10.0.0.1"),
        NodeParams {
            multicast_source: Some(ip("224.0.0.1")),
            ..NodeParams::default()
        },
    )
    .unwrap();
    add_plain(&net, "10.0.0.2", &["10.0.0.1"]);

    let mut clock = Clock::new();
    // Dozens of refresh cycles, each a fresh fingerprint on both nodes.
    for _ in 0..40 {
        net.tick(clock.advance(Duration::from_millis(11)));
    }

    for addr in ["10.0.0.1", "10.0.0.2"] {
        net.with_node(ip(addr), |n| {
            assert!(n.odmrp().message_cache_len() <= 8);
        })
        .unwrap();
    }
}

#[test]
fn test_broadcast_data_dies_by_ttl() {
    // A ring would flood forever without the TTL bound.
    let net = quiet_network(SimConfig::default());
    add_plain(&net, "10.0.0.1", &[]);
    add_plain(&net, "10.0.0.2", &["10.0.0.1"]);
    add_plain(&net, "10.0.0.3", &["10.0.0.2"]);
    net.connect(ip("10.0.0.3"), ip("10.0.0.1")).unwrap();

    net.send_packet(
        ip("10.0.0.1"),
        ip("255.255.255.255"),
        Bytes::from_static(b"ring"),
        false,
    )
    .unwrap();

    let mut clock = Clock::new();
    // A handful of ticks is enough for the TTL to burn down; the drain
    // terminating at all is the property under test.
    for _ in 0..20 {
        net.tick(clock.advance(Duration::from_millis(1)));
    }
    for addr in ["10.0.0.1", "10.0.0.2", "10.0.0.3"] {
        net.with_node(ip(addr), |n| assert!(!n.has_pending())).unwrap();
    }
}

#[test]
fn test_scheduler_counts_operations() {
    let net = quiet_network(SimConfig::default());
    add_plain(&net, "10.0.0.1", &[]);
    add_plain(&net, "10.0.0.2", &["10.0.0.1"]);

    net.send_packet(
        ip("10.0.0.1"),
        ip("255.255.255.255"),
        Bytes::from_static(b"count me"),
        false,
    )
    .unwrap();

    let mut clock = Clock::new();
    net.tick(clock.advance(Duration::from_millis(1)));
    let after_first = net.stats().operations;
    assert!(after_first >= 2, "origination and consumption both count");

    // An idle tick performs nothing.
    net.tick(clock.advance(Duration::from_millis(1)));
    assert_eq!(net.stats().operations, after_first);
}
