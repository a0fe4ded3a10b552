// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Configuration file types and parsing.
//!
//! JSON5 startup configuration supporting:
//! - protocol timing and capacity overrides (defaults per the constants in
//!   [`crate::odmrp`] and [`crate::packet`])
//! - an initial topology: nodes with multicast source, group memberships
//!   and neighbor links
//! - comments and trailing commas

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::odmrp::{self, OdmrpConfig};
use crate::packet::DEFAULT_TTL;
use crate::validation;

/// Default TTL for console-originated data packets.
pub const DEFAULT_SEND_TTL: u8 = 16;

fn default_route_refresh_ms() -> u64 {
    odmrp::DEFAULT_ROUTE_REFRESH.as_millis() as u64
}

fn default_forwarding_timeout_ms() -> u64 {
    odmrp::DEFAULT_FORWARDING_TIMEOUT.as_millis() as u64
}

fn default_ttl() -> u8 {
    DEFAULT_TTL
}

fn default_send_ttl() -> u8 {
    DEFAULT_SEND_TTL
}

fn default_msg_cache_size() -> usize {
    odmrp::MSG_CACHE_SIZE
}

fn default_queue_size() -> usize {
    odmrp::PENDING_PACKET_QUEUE_SIZE
}

/// Protocol timing and capacity knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimConfig {
    /// Interval between periodic Join Queries, in milliseconds.
    #[serde(default = "default_route_refresh_ms")]
    pub route_refresh_ms: u64,

    /// Forwarding-group entry lifetime, in milliseconds.
    #[serde(default = "default_forwarding_timeout_ms")]
    pub forwarding_timeout_ms: u64,

    /// TTL of protocol packets (Join Query floods).
    #[serde(default = "default_ttl")]
    pub default_ttl: u8,

    /// TTL of console-originated data packets.
    #[serde(default = "default_send_ttl")]
    pub send_ttl: u8,

    /// Capacity of the duplicate-suppression message cache.
    #[serde(default = "default_msg_cache_size")]
    pub msg_cache_size: usize,

    /// Capacity of each pending send/receive queue.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            route_refresh_ms: default_route_refresh_ms(),
            forwarding_timeout_ms: default_forwarding_timeout_ms(),
            default_ttl: default_ttl(),
            send_ttl: default_send_ttl(),
            msg_cache_size: default_msg_cache_size(),
            queue_size: default_queue_size(),
        }
    }
}

impl SimConfig {
    pub fn route_refresh(&self) -> Duration {
        Duration::from_millis(self.route_refresh_ms)
    }

    pub fn forwarding_timeout(&self) -> Duration {
        Duration::from_millis(self.forwarding_timeout_ms)
    }

    /// The per-node protocol-state view of this configuration.
    pub fn odmrp(&self) -> OdmrpConfig {
        OdmrpConfig {
            route_refresh: self.route_refresh(),
            forwarding_timeout: self.forwarding_timeout(),
            msg_cache_size: self.msg_cache_size,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.route_refresh_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "route_refresh_ms cannot be 0".to_string(),
            ));
        }
        if self.forwarding_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "forwarding_timeout_ms cannot be 0".to_string(),
            ));
        }
        if self.default_ttl == 0 || self.send_ttl == 0 {
            return Err(ConfigError::InvalidValue("TTL cannot be 0".to_string()));
        }
        if self.msg_cache_size == 0 || self.queue_size == 0 {
            return Err(ConfigError::InvalidValue(
                "capacities cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// One node in the startup topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeSpec {
    /// Node identity.
    pub ip: Ipv4Addr,

    /// Multicast group this node sources traffic for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multicast_source: Option<Ipv4Addr>,

    /// Multicast groups this node subscribes to.
    #[serde(default)]
    pub groups: Vec<Ipv4Addr>,

    /// Neighbor links; each named node must be declared in the same file.
    #[serde(default)]
    pub neighbors: Vec<Ipv4Addr>,
}

/// Startup configuration (JSON5 file format).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StartupConfig {
    /// Protocol knobs; omitted fields take the normative defaults.
    #[serde(default)]
    pub sim: SimConfig,

    /// Initial topology.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl StartupConfig {
    /// Load configuration from a JSON5 file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize to a JSON-compatible string (JSON5 accepts it back).
    pub fn to_json5(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Validate the configuration: knob ranges, address classes, duplicate
    /// nodes, dangling or self-referential neighbor links.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sim.validate()?;

        let mut declared = HashSet::new();
        for spec in &self.nodes {
            if !validation::is_valid_unicast(spec.ip) {
                return Err(ConfigError::InvalidNodeAddress(spec.ip));
            }
            if !declared.insert(spec.ip) {
                return Err(ConfigError::DuplicateNode(spec.ip));
            }
            if let Some(source) = spec.multicast_source {
                if !source.is_multicast() {
                    return Err(ConfigError::NotMulticast {
                        addr: source,
                        context: format!("multicast_source of {}", spec.ip),
                    });
                }
            }
            for group in &spec.groups {
                if !group.is_multicast() {
                    return Err(ConfigError::NotMulticast {
                        addr: *group,
                        context: format!("group of {}", spec.ip),
                    });
                }
            }
        }

        for spec in &self.nodes {
            for neighbor in &spec.neighbors {
                if *neighbor == spec.ip {
                    return Err(ConfigError::SelfNeighbor(spec.ip));
                }
                if !declared.contains(neighbor) {
                    return Err(ConfigError::UnknownNeighbor {
                        node: spec.ip,
                        neighbor: *neighbor,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("node address {0} is not a unicast host address")]
    InvalidNodeAddress(Ipv4Addr),

    #[error("duplicate node {0}")]
    DuplicateNode(Ipv4Addr),

    #[error("{context}: {addr} is not a multicast address")]
    NotMulticast { addr: Ipv4Addr, context: String },

    #[error("node {node} links to undeclared neighbor {neighbor}")]
    UnknownNeighbor { node: Ipv4Addr, neighbor: Ipv4Addr },

    #[error("node {0} links to itself")]
    SelfNeighbor(Ipv4Addr),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_normative() {
        let config = SimConfig::default();
        assert_eq!(config.route_refresh(), Duration::from_millis(500));
        assert_eq!(config.forwarding_timeout(), Duration::from_millis(1500));
        assert_eq!(config.default_ttl, 32);
        assert_eq!(config.send_ttl, 16);
        assert_eq!(config.msg_cache_size, 2048);
        assert_eq!(config.queue_size, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_topology_with_comments() {
        let content = r#"{
            // five-node line
            sim: { route_refresh_ms: 50 },
            nodes: [
                { ip: "192.168.0.100", multicast_source: "224.0.0.1" },
                { ip: "192.168.0.101", groups: ["224.0.0.1"], neighbors: ["192.168.0.100"] },
            ],
        }"#;
        let config = StartupConfig::parse(content).unwrap();
        assert_eq!(config.sim.route_refresh_ms, 50);
        // Unset knobs still take their defaults.
        assert_eq!(config.sim.forwarding_timeout_ms, 1500);
        assert_eq!(config.nodes.len(), 2);
        assert_eq!(
            config.nodes[1].neighbors,
            vec!["192.168.0.100".parse::<Ipv4Addr>().unwrap()]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_nodes() {
        let content = r#"{ nodes: [ { ip: "10.0.0.1" }, { ip: "10.0.0.1" } ] }"#;
        let config = StartupConfig::parse(content).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateNode("10.0.0.1".parse().unwrap()))
        );
    }

    #[test]
    fn test_validate_rejects_dangling_neighbor() {
        let content = r#"{ nodes: [ { ip: "10.0.0.1", neighbors: ["10.0.0.2"] } ] }"#;
        let config = StartupConfig::parse(content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownNeighbor { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_self_link() {
        let content = r#"{ nodes: [ { ip: "10.0.0.1", neighbors: ["10.0.0.1"] } ] }"#;
        let config = StartupConfig::parse(content).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigError::SelfNeighbor("10.0.0.1".parse().unwrap()))
        );
    }

    #[test]
    fn test_validate_rejects_unicast_group() {
        let content = r#"{ nodes: [ { ip: "10.0.0.1", groups: ["10.0.0.9"] } ] }"#;
        let config = StartupConfig::parse(content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotMulticast { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_knobs() {
        let content = r#"{ sim: { route_refresh_ms: 0 } }"#;
        let config = StartupConfig::parse(content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_roundtrip_through_json() {
        let config = StartupConfig {
            sim: SimConfig::default(),
            nodes: vec![NodeSpec {
                ip: "10.0.0.1".parse().unwrap(),
                multicast_source: Some("224.0.0.5".parse().unwrap()),
                groups: vec!["224.0.0.1".parse().unwrap()],
                neighbors: vec![],
            }],
        };
        let parsed = StartupConfig::parse(&config.to_json5()).unwrap();
        assert_eq!(parsed, config);
    }
}
