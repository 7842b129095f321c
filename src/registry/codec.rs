//! Line format of a cluster block.
//!
//! ```text
//! 10.0.0.2 node-b node-a     enabled, holding node-a's traffic
//! #10.0.0.1 node-a           disabled
//! ```

use super::{normalize, Host, Registry};
use crate::error::LbError;

const DISABLED_PREFIX: char = '#';

/// Parse the lines between a cluster's markers.
///
/// Blank lines are skipped. A repeated name replaces the earlier entry.
pub fn decode<S: AsRef<str>>(lines: &[S]) -> Result<Registry, LbError> {
    let mut entries = Vec::with_capacity(lines.len());

    for raw in lines {
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        let (enabled, body) = match line.strip_prefix(DISABLED_PREFIX) {
            Some(rest) => (false, rest),
            None => (true, line),
        };

        let mut fields = body.split_whitespace();
        let (Some(ip), Some(name)) = (fields.next(), fields.next()) else {
            return Err(LbError::MalformedEntry(line.to_string()));
        };

        entries.push((
            name.to_string(),
            Host {
                ip_address: ip.to_string(),
                enabled,
                absorbed_hosts: fields.map(normalize).collect(),
            },
        ));
    }

    Ok(entries.into_iter().collect())
}

/// Render a registry as block lines, one per host in name order.
pub fn encode(registry: &Registry) -> Vec<String> {
    registry
        .iter()
        .map(|(name, host)| {
            let line = format!(
                "{} {} {}",
                host.ip_address,
                name,
                host.absorbed_hosts.join(" ")
            );
            let line = line.trim_end();
            if host.enabled {
                line.to_string()
            } else {
                format!("{}{}", DISABLED_PREFIX, line)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_decode_enabled_and_disabled() {
        let reg = decode(&["10.0.0.2 b a", "#10.0.0.1 a"]).unwrap();

        let a = reg.get("a").unwrap();
        assert!(!a.enabled);
        assert_eq!(a.ip_address, "10.0.0.1");
        assert!(a.absorbed_hosts.is_empty());

        let b = reg.get("b").unwrap();
        assert!(b.enabled);
        assert_eq!(b.absorbed_hosts, vec!["a"]);
    }

    #[test]
    fn test_decode_tolerates_spacing() {
        let reg = decode(&["# 10.0.0.1   a", "\t10.0.0.2\tb  a  ", ""]).unwrap();
        assert_eq!(reg.len(), 2);
        assert!(!reg.get("a").unwrap().enabled);
        assert_eq!(reg.get("b").unwrap().absorbed_hosts, vec!["a"]);
    }

    #[test]
    fn test_decode_last_write_wins() {
        let reg = decode(&["10.0.0.1 a", "10.0.0.9 a"]).unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("a").unwrap().ip_address, "10.0.0.9");
    }

    #[test]
    fn test_decode_lowercases_names() {
        let reg = decode(&["10.0.0.2 Node-B Node-A"]).unwrap();
        assert!(reg.exists("node-b"));
        assert_eq!(reg.get("node-b").unwrap().absorbed_hosts, vec!["node-a"]);
    }

    #[test]
    fn test_decode_rejects_missing_name() {
        let err = decode(&["10.0.0.1"]).unwrap_err();
        assert!(matches!(err, LbError::MalformedEntry(_)));

        let err = decode(&["#"]).unwrap_err();
        assert!(matches!(err, LbError::MalformedEntry(_)));
    }

    #[test]
    fn test_encode_trims_empty_absorbed_list() {
        let reg = Registry::new().add("a", "10.0.0.1");
        assert_eq!(encode(&reg), vec!["10.0.0.1 a"]);
    }

    #[test]
    fn test_encode_after_move() {
        let reg = decode(&["10.0.0.1 a", "10.0.0.2 b"])
            .unwrap()
            .move_traffic("a", "b")
            .unwrap();

        let lines: HashSet<String> = encode(&reg).into_iter().collect();
        let expected: HashSet<String> = ["#10.0.0.1 a", "10.0.0.2 b a"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_decode_of_encode_is_identity() {
        let reg = Registry::new()
            .add("a", "10.0.0.1")
            .add("b", "10.0.0.2")
            .add("c", "10.0.0.3")
            .add("d", "10.0.0.4")
            .move_traffic("a", "c")
            .unwrap()
            .move_traffic("b", "c")
            .unwrap();

        assert_eq!(decode(&encode(&reg)).unwrap(), reg);
        assert_eq!(decode::<String>(&[]).unwrap(), Registry::new());
    }
}
