// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Address classification and validation shared by the console and the
//! protocol core.
//!
//! Addresses are IPv4 dotted quads. A string that does not parse as one
//! (including any IPv6 literal) classifies as [`CastMode::NoAddr`].

use std::net::Ipv4Addr;

use crate::error::SimError;
use crate::packet::CastMode;

/// Classify a parsed address into its cast mode.
///
/// `255.255.255.255` is broadcast; first octet 224-239 is multicast;
/// everything else is treated as unicast.
#[inline]
pub fn cast_mode_of(addr: Ipv4Addr) -> CastMode {
    if addr.is_broadcast() {
        CastMode::Broadcast
    } else if addr.is_multicast() {
        CastMode::Multicast
    } else {
        CastMode::Unicast
    }
}

/// Classify an address string. Non-IPv4 syntax yields [`CastMode::NoAddr`].
pub fn classify(addr: &str) -> CastMode {
    match addr.parse::<Ipv4Addr>() {
        Ok(ip) => cast_mode_of(ip),
        Err(_) => CastMode::NoAddr,
    }
}

/// Check if an address is usable as a node identity: not multicast, not
/// broadcast, not 0.0.0.0.
#[inline]
pub fn is_valid_unicast(addr: Ipv4Addr) -> bool {
    !addr.is_multicast() && !addr.is_broadcast() && !addr.is_unspecified()
}

/// Parse an address string that must be a valid unicast host address.
///
/// `context` names what the address stands for (e.g. `-ip`, `SRC`) and is
/// embedded in the diagnostic.
pub fn parse_unicast(s: &str, context: &str) -> Result<Ipv4Addr, SimError> {
    let ip: Ipv4Addr = s
        .parse()
        .map_err(|_| SimError::InputMismatch(format!("{context}: '{s}' is not an IPv4 address")))?;
    if !is_valid_unicast(ip) {
        return Err(SimError::InputMismatch(format!(
            "{context}: '{s}' is not a unicast host address"
        )));
    }
    Ok(ip)
}

/// Parse an address string that must be a multicast group address.
pub fn parse_multicast(s: &str, context: &str) -> Result<Ipv4Addr, SimError> {
    let ip: Ipv4Addr = s
        .parse()
        .map_err(|_| SimError::InputMismatch(format!("{context}: '{s}' is not an IPv4 address")))?;
    if !ip.is_multicast() {
        return Err(SimError::InputMismatch(format!(
            "{context}: '{s}' is not a multicast group address"
        )));
    }
    Ok(ip)
}

/// Parse any IPv4 address string (unicast, multicast or broadcast).
pub fn parse_addr(s: &str, context: &str) -> Result<Ipv4Addr, SimError> {
    s.parse()
        .map_err(|_| SimError::InputMismatch(format!("{context}: '{s}' is not an IPv4 address")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unicast() {
        assert_eq!(classify("192.168.0.100"), CastMode::Unicast);
        assert_eq!(classify("10.0.0.1"), CastMode::Unicast);
        assert_eq!(classify("1.2.3.4"), CastMode::Unicast);
    }

    #[test]
    fn test_classify_multicast_range() {
        // First octet 224-239 inclusive, nothing more.
        assert_eq!(classify("224.0.0.1"), CastMode::Multicast);
        assert_eq!(classify("239.255.255.255"), CastMode::Multicast);
        assert_eq!(classify("223.255.255.255"), CastMode::Unicast);
        assert_eq!(classify("240.0.0.1"), CastMode::Unicast);
        // 240-249 must not classify as multicast.
        assert_eq!(classify("249.0.0.1"), CastMode::Unicast);
    }

    #[test]
    fn test_classify_broadcast() {
        assert_eq!(classify("255.255.255.255"), CastMode::Broadcast);
        assert_eq!(classify("255.255.255.254"), CastMode::Unicast);
    }

    #[test]
    fn test_classify_rejects_bad_syntax() {
        assert_eq!(classify("not-an-address"), CastMode::NoAddr);
        assert_eq!(classify("256.0.0.1"), CastMode::NoAddr);
        assert_eq!(classify("1.2.3"), CastMode::NoAddr);
        assert_eq!(classify("fe80::1"), CastMode::NoAddr);
        assert_eq!(classify(""), CastMode::NoAddr);
    }

    #[test]
    fn test_is_valid_unicast() {
        assert!(is_valid_unicast("192.168.1.1".parse().unwrap()));
        assert!(!is_valid_unicast("224.0.0.1".parse().unwrap()));
        assert!(!is_valid_unicast("255.255.255.255".parse().unwrap()));
        assert!(!is_valid_unicast("0.0.0.0".parse().unwrap()));
    }

    #[test]
    fn test_parse_unicast() {
        assert_eq!(
            parse_unicast("10.0.0.1", "-ip").unwrap(),
            "10.0.0.1".parse::<Ipv4Addr>().unwrap()
        );
        let err = parse_unicast("224.0.0.1", "-ip").unwrap_err();
        assert!(err.to_string().contains("-ip"));
        assert!(parse_unicast("garbage", "-ip").is_err());
    }

    #[test]
    fn test_parse_multicast() {
        assert!(parse_multicast("224.0.0.1", "-mg").is_ok());
        assert!(parse_multicast("192.168.0.1", "-mg").is_err());
        assert!(parse_multicast(":::", "-mg").is_err());
    }
}
