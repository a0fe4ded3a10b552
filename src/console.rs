// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Interactive control console.
//!
//! One command per line, whitespace-separated tokens; responses are
//! human-readable lines. Parsing is a pure function of the input line and
//! execution runs against the [`Network`] admin surface, so both halves are
//! unit-testable without a terminal. Errors are caught at the command
//! boundary and reported; the simulation keeps running. Only
//! [`SimError::Fatal`] ends the session.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::SimError;
use crate::log_error;
use crate::logging::{Facility, Logger};
use crate::network::{Network, NodeParams};
use crate::validation;

/// Default payload for `send` when none is given.
const DEFAULT_PAYLOAD: &str = "Nice packet";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        ip: Ipv4Addr,
        multicast_source: Option<Ipv4Addr>,
        groups: Vec<Ipv4Addr>,
        neighbors: Vec<Ipv4Addr>,
    },
    Remove {
        ip: Ipv4Addr,
    },
    Connect {
        node: Ipv4Addr,
        peers: Vec<Ipv4Addr>,
    },
    Disconnect {
        node: Ipv4Addr,
        peers: Vec<Ipv4Addr>,
    },
    Query {
        ip: Ipv4Addr,
    },
    List,
    Send {
        verbose: bool,
        source: Ipv4Addr,
        destination: Ipv4Addr,
        payload: String,
    },
    Route {
        source: Ipv4Addr,
        destination: Ipv4Addr,
    },
    Help,
    Exit,
}

fn next_token<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<&'a str, SimError> {
    tokens
        .next()
        .ok_or_else(|| SimError::InputMismatch(format!("missing {what}")))
}

fn parse_add<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<Command, SimError> {
    let mut ip = None;
    let mut multicast_source = None;
    let mut groups = Vec::new();
    let mut neighbors = Vec::new();

    while let Some(flag) = tokens.next() {
        let value = next_token(tokens, &format!("address after {flag}"))?;
        match flag {
            "-ip" => ip = Some(validation::parse_unicast(value, "-ip")?),
            "-ms" => multicast_source = Some(validation::parse_multicast(value, "-ms")?),
            "-mg" => groups.push(validation::parse_multicast(value, "-mg")?),
            "-n" => neighbors.push(validation::parse_unicast(value, "-n")?),
            other => {
                return Err(SimError::InputMismatch(format!("unknown flag '{other}'")));
            }
        }
    }

    let ip = ip.ok_or_else(|| {
        SimError::NodeConnect("node is not ready, no IP was supplied (-ip)".to_string())
    })?;
    Ok(Command::Add {
        ip,
        multicast_source,
        groups,
        neighbors,
    })
}

fn parse_peer_list<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<(Ipv4Addr, Vec<Ipv4Addr>), SimError> {
    let node = validation::parse_unicast(next_token(tokens, "node address")?, "NODE")?;
    let mut peers = Vec::new();
    for token in tokens {
        peers.push(validation::parse_unicast(token, "PEER")?);
    }
    if peers.is_empty() {
        return Err(SimError::InputMismatch("missing peer address".to_string()));
    }
    Ok((node, peers))
}

/// Parse one console line. Empty lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, SimError> {
    let mut tokens = line.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Ok(None);
    };

    let command = match keyword {
        "add" | "a" => parse_add(&mut tokens)?,
        "remove" => Command::Remove {
            ip: validation::parse_unicast(next_token(&mut tokens, "node address")?, "IP")?,
        },
        "connect" | "c" => {
            let (node, peers) = parse_peer_list(&mut tokens)?;
            Command::Connect { node, peers }
        }
        "disconnect" | "d" => {
            let (node, peers) = parse_peer_list(&mut tokens)?;
            Command::Disconnect { node, peers }
        }
        "query" | "q" => Command::Query {
            ip: validation::parse_unicast(next_token(&mut tokens, "node address")?, "IP")?,
        },
        "list" | "l" => Command::List,
        "send" | "s" => {
            let first = next_token(&mut tokens, "source address")?;
            let (verbose, source_token) = if first == "-v" {
                (true, next_token(&mut tokens, "source address")?)
            } else {
                (false, first)
            };
            let source = validation::parse_unicast(source_token, "SRC")?;
            let destination =
                validation::parse_addr(next_token(&mut tokens, "destination address")?, "DST")?;
            let payload_tokens: Vec<&str> = tokens.collect();
            let payload = if payload_tokens.is_empty() {
                DEFAULT_PAYLOAD.to_string()
            } else {
                payload_tokens.join(" ")
            };
            Command::Send {
                verbose,
                source,
                destination,
                payload,
            }
        }
        "route" | "ro" => Command::Route {
            source: validation::parse_unicast(next_token(&mut tokens, "source address")?, "SRC")?,
            destination: validation::parse_addr(
                next_token(&mut tokens, "destination address")?,
                "DST",
            )?,
        },
        "help" | "h" => Command::Help,
        "exit" | "e" => Command::Exit,
        other => {
            return Err(SimError::InputMismatch(format!("no such command '{other}'")));
        }
    };
    Ok(Some(command))
}

/// Execute a parsed command against the network. Returns the response text.
pub fn execute(net: &Network, command: Command) -> Result<String, SimError> {
    match command {
        Command::Add {
            ip,
            multicast_source,
            groups,
            neighbors,
        } => {
            net.add_node(
                ip,
                NodeParams {
                    multicast_source,
                    groups,
                    neighbors,
                },
            )?;
            Ok(format!("node {ip} added"))
        }
        Command::Remove { ip } => {
            net.remove_node(ip)?;
            Ok(format!("node {ip} removed"))
        }
        Command::Connect { node, peers } => {
            for peer in &peers {
                net.connect(node, *peer)?;
            }
            Ok(format!("connected {node} to {} peer(s)", peers.len()))
        }
        Command::Disconnect { node, peers } => {
            for peer in &peers {
                net.disconnect(node, *peer)?;
            }
            Ok(format!("disconnected {node} from {} peer(s)", peers.len()))
        }
        Command::Query { ip } => net.describe_node(ip, Instant::now()),
        Command::List => {
            let mut out = String::from("Nodes on the network:");
            for (ip, neighbors) in net.list_nodes() {
                out.push_str(&format!("\n [{ip}] ->"));
                for neighbor in neighbors {
                    out.push_str(&format!(" {neighbor}"));
                }
            }
            Ok(out)
        }
        Command::Send {
            verbose,
            source,
            destination,
            payload,
        } => {
            net.send_packet(source, destination, Bytes::from(payload), verbose)?;
            Ok(format!("sending IP packet from {source} to {destination}"))
        }
        Command::Route {
            source,
            destination,
        } => match net.route_lookup(source, destination)? {
            Some(route) => Ok(format!(
                "dst: {}, nextHop: {}, cost: {}",
                route.destination, route.next_hop, route.cost
            )),
            None => Ok("No route to destination!".to_string()),
        },
        Command::Help => Ok(help_text().to_string()),
        Command::Exit => Ok("Posting quit message to the network scheduler...".to_string()),
    }
}

pub fn help_text() -> &'static str {
    "Available commands:\n \
     add (a) -ip IP [-ms MULTICAST_SRC] [-mg MULTICAST_GROUP]... [-n NEIGHBOR]... - add a node\n \
     remove IP - disconnect a node from all neighbors and remove it\n \
     connect (c) NODE PEER... - connect NODE with each PEER (symmetric)\n \
     disconnect (d) NODE PEER... - disconnect each PEER from NODE\n \
     query (q) IP - dump node state (neighbors, groups, tables)\n \
     list (l) - list every node and its neighbors\n \
     send (s) [-v] SRC DST [payload...] - originate an IP packet; -v traces every hop\n \
     route (ro) SRC DST - look up SRC's next hop toward DST\n \
     help (h) - display this message\n \
     exit (e) - quit the simulation"
}

/// Read commands from stdin until `exit` or a fatal error, then request
/// scheduler shutdown.
pub async fn run(net: Arc<Network>, logger: Logger) -> anyhow::Result<()> {
    println!("For help type \"help\" or \"h\"");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n>> ");
        let _ = std::io::Write::flush(&mut std::io::stdout());
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        let is_exit = command == Command::Exit;
        match execute(&net, command) {
            Ok(response) => println!("{response}"),
            Err(err @ SimError::Fatal(_)) => {
                log_error!(logger, Facility::Console, &err.to_string());
                println!("{err}");
                break;
            }
            Err(err) => println!("{err}"),
        }
        if is_exit {
            break;
        }
    }

    net.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn test_network() -> Arc<Network> {
        Network::new(SimConfig::default(), Logger::memory().0)
    }

    #[test]
    fn test_parse_add_full() {
        let command = parse_command(
            "add -ip 192.168.0.103 -ms 224.0.0.5 -mg 224.0.0.1 -mg 224.0.0.2 -n 192.168.0.100",
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            command,
            Command::Add {
                ip: ip("192.168.0.103"),
                multicast_source: Some(ip("224.0.0.5")),
                groups: vec![ip("224.0.0.1"), ip("224.0.0.2")],
                neighbors: vec![ip("192.168.0.100")],
            }
        );
    }

    #[test]
    fn test_parse_add_requires_ip() {
        let err = parse_command("add -mg 224.0.0.1").unwrap_err();
        assert!(matches!(err, SimError::NodeConnect(_)));
    }

    #[test]
    fn test_parse_add_rejects_misclassified_addresses() {
        // Multicast address where unicast is required.
        assert!(parse_command("add -ip 224.0.0.1").is_err());
        // Unicast address where multicast is required.
        assert!(parse_command("add -ip 10.0.0.1 -mg 10.0.0.2").is_err());
        // Unknown flag.
        assert!(parse_command("add -ip 10.0.0.1 -x 10.0.0.2").is_err());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(parse_command("l").unwrap().unwrap(), Command::List);
        assert_eq!(parse_command("h").unwrap().unwrap(), Command::Help);
        assert_eq!(parse_command("e").unwrap().unwrap(), Command::Exit);
        assert_eq!(
            parse_command("q 10.0.0.1").unwrap().unwrap(),
            Command::Query { ip: ip("10.0.0.1") }
        );
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(matches!(
            parse_command("frobnicate"),
            Err(SimError::InputMismatch(_))
        ));
    }

    #[test]
    fn test_parse_connect_needs_peers() {
        assert!(parse_command("connect 10.0.0.1").is_err());
        assert_eq!(
            parse_command("c 10.0.0.1 10.0.0.2 10.0.0.3").unwrap().unwrap(),
            Command::Connect {
                node: ip("10.0.0.1"),
                peers: vec![ip("10.0.0.2"), ip("10.0.0.3")],
            }
        );
    }

    #[test]
    fn test_parse_send_variants() {
        assert_eq!(
            parse_command("send 10.0.0.1 224.0.0.1").unwrap().unwrap(),
            Command::Send {
                verbose: false,
                source: ip("10.0.0.1"),
                destination: ip("224.0.0.1"),
                payload: DEFAULT_PAYLOAD.to_string(),
            }
        );
        assert_eq!(
            parse_command("s -v 10.0.0.1 10.0.0.2 hello there").unwrap().unwrap(),
            Command::Send {
                verbose: true,
                source: ip("10.0.0.1"),
                destination: ip("10.0.0.2"),
                payload: "hello there".to_string(),
            }
        );
        assert!(parse_command("send 10.0.0.1 not-an-ip").is_err());
        assert!(parse_command("send 10.0.0.1").is_err());
    }

    #[test]
    fn test_execute_add_list_query_roundtrip() {
        let net = test_network();
        execute(
            &net,
            parse_command("add -ip 10.0.0.1 -ms 224.0.0.1").unwrap().unwrap(),
        )
        .unwrap();
        execute(
            &net,
            parse_command("add -ip 10.0.0.2 -n 10.0.0.1").unwrap().unwrap(),
        )
        .unwrap();

        let listing = execute(&net, Command::List).unwrap();
        assert!(listing.contains("[10.0.0.1] -> 10.0.0.2"));
        assert!(listing.contains("[10.0.0.2] -> 10.0.0.1"));

        let dump = execute(&net, parse_command("q 10.0.0.2").unwrap().unwrap()).unwrap();
        assert!(dump.contains("Node 10.0.0.2"));
        assert!(dump.contains("10.0.0.1"));
    }

    #[test]
    fn test_execute_duplicate_add_fails() {
        let net = test_network();
        execute(&net, parse_command("a -ip 10.0.0.1").unwrap().unwrap()).unwrap();
        let err = execute(&net, parse_command("a -ip 10.0.0.1").unwrap().unwrap()).unwrap_err();
        assert!(matches!(err, SimError::NodeConnect(_)));
    }

    #[test]
    fn test_execute_route_lookup() {
        let net = test_network();
        execute(&net, parse_command("a -ip 10.0.0.1").unwrap().unwrap()).unwrap();

        let response =
            execute(&net, parse_command("ro 10.0.0.1 10.0.0.9").unwrap().unwrap()).unwrap();
        assert_eq!(response, "No route to destination!");

        net.with_node_mut(ip("10.0.0.1"), |node| {
            node.odmrp_mut()
                .routes
                .add(crate::routing::RoutingEntry::new(ip("10.0.0.9"), ip("10.0.0.2")));
        })
        .unwrap();
        let response =
            execute(&net, parse_command("ro 10.0.0.1 10.0.0.9").unwrap().unwrap()).unwrap();
        assert!(response.contains("nextHop: 10.0.0.2"));
    }

    #[test]
    fn test_execute_send_to_unknown_source_fails() {
        let net = test_network();
        let err = execute(
            &net,
            parse_command("send 10.0.0.1 10.0.0.2").unwrap().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::NotFound(_)));
    }
}
