//! Host registry for a single cluster.
//!
//! A [`Registry`] maps host names to [`Host`] entries and implements the
//! two traffic transitions:
//!
//! - [`Registry::move_traffic`] disables a host and hands its traffic to
//!   another enabled host, which records it in `absorbed_hosts`.
//! - [`Registry::restore_traffic`] re-enables a host and removes it from
//!   the holder's `absorbed_hosts`.
//!
//! Transitions never mutate in place: they return a new registry, so a
//! failed precondition leaves the original untouched. Only one hop of
//! redirection is modelled; a host holding other hosts' traffic cannot
//! itself be moved.
//!
//! Registries are built from and written back to the cluster block lines
//! with [`codec::decode`] and [`codec::encode`].

pub mod codec;

use std::collections::BTreeMap;

use crate::error::LbError;

pub use codec::{decode, encode};

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub ip_address: String,
    /// `false` once this host's traffic has been moved elsewhere.
    pub enabled: bool,
    /// Hosts whose traffic is currently routed here. Lowercase, like the
    /// registry keys; [`Registry`]'s `FromIterator` normalizes them.
    pub absorbed_hosts: Vec<String>,
}

impl Host {
    pub fn new(ip_address: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            enabled: true,
            absorbed_hosts: Vec::new(),
        }
    }

    pub fn is_absorbing(&self) -> bool {
        !self.absorbed_hosts.is_empty()
    }
}

/// Hosts of one cluster keyed by lowercase name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    hosts: BTreeMap<String, Host>,
}

pub(crate) fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Host> {
        self.hosts.get(&normalize(name))
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Host)> {
        self.hosts.iter().map(|(name, host)| (name.as_str(), host))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.hosts.contains_key(&normalize(name))
    }

    pub fn ip_in_use(&self, ip: &str) -> bool {
        self.hosts.values().any(|h| h.ip_address == ip)
    }

    /// Host currently holding `name`'s traffic, if any.
    pub fn holder_of(&self, name: &str) -> Option<&str> {
        let name = normalize(name);
        self.hosts
            .iter()
            .find(|(_, h)| h.absorbed_hosts.iter().any(|a| *a == name))
            .map(|(holder, _)| holder.as_str())
    }

    /// Insert an enabled host with no absorbed traffic.
    ///
    /// An existing entry with the same name is replaced. Callers must check
    /// [`exists`](Self::exists) and [`ip_in_use`](Self::ip_in_use) first.
    pub fn add(&self, name: &str, ip_address: &str) -> Self {
        let mut next = self.clone();
        next.hosts.insert(normalize(name), Host::new(ip_address));
        next
    }

    /// Delete a host. References to it in other hosts' lists are kept.
    pub fn remove(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.hosts.remove(&normalize(name));
        next
    }

    /// Redirect `from`'s traffic to `to`.
    pub fn move_traffic(&self, from: &str, to: &str) -> Result<Self, LbError> {
        let from = normalize(from);
        let to = normalize(to);

        if from == to {
            return Err(LbError::SelfMove(from));
        }

        let from_host = self
            .hosts
            .get(&from)
            .ok_or_else(|| LbError::HostNotFound(from.clone()))?;
        let to_host = self
            .hosts
            .get(&to)
            .ok_or_else(|| LbError::HostNotFound(to.clone()))?;

        if !from_host.enabled {
            return Err(LbError::AlreadyDisabled(from));
        }
        if from_host.is_absorbing() {
            return Err(LbError::AlreadyAbsorbing {
                host: from,
                absorbed: from_host.absorbed_hosts.join(", "),
            });
        }
        if !to_host.enabled {
            return Err(LbError::TargetDisabled(to));
        }

        let disabled = Host {
            ip_address: from_host.ip_address.clone(),
            enabled: false,
            absorbed_hosts: Vec::new(),
        };
        let mut absorbing = to_host.clone();
        absorbing.absorbed_hosts.push(from.clone());

        let mut next = self.clone();
        next.hosts.insert(from, disabled);
        next.hosts.insert(to, absorbing);
        Ok(next)
    }

    /// Send `name`'s traffic back to it, releasing it from its holder.
    pub fn restore_traffic(&self, name: &str) -> Result<Self, LbError> {
        let name = normalize(name);

        let host = self
            .hosts
            .get(&name)
            .ok_or_else(|| LbError::HostNotFound(name.clone()))?;
        if host.enabled {
            return Err(LbError::AlreadyEnabled(name));
        }

        let holder = self
            .holder_of(&name)
            .map(str::to_owned)
            .ok_or_else(|| LbError::HolderNotFound(name.clone()))?;

        let restored = Host::new(host.ip_address.clone());

        let mut next = self.clone();
        next.hosts.insert(name.clone(), restored);
        if let Some(h) = next.hosts.get_mut(&holder) {
            h.enabled = true;
            h.absorbed_hosts.retain(|a| *a != name);
        }
        Ok(next)
    }

    /// Describe entries that break the redirection invariants.
    ///
    /// `remove` leaves dangling names behind and hand edits can produce the
    /// rest, so callers surface these as warnings rather than failing.
    pub fn anomalies(&self) -> Vec<String> {
        let mut found = Vec::new();

        for (name, host) in &self.hosts {
            if host.absorbed_hosts.iter().any(|a| a == name) {
                found.push(format!("'{}' lists itself as absorbed", name));
            }
            if !host.enabled && host.is_absorbing() {
                found.push(format!("'{}' is disabled but holds traffic", name));
            }
            for absorbed in &host.absorbed_hosts {
                match self.hosts.get(absorbed) {
                    None => found.push(format!(
                        "'{}' holds traffic for unknown host '{}'",
                        name, absorbed
                    )),
                    Some(h) if h.enabled => found.push(format!(
                        "'{}' holds traffic for enabled host '{}'",
                        name, absorbed
                    )),
                    Some(_) => {}
                }
            }
            if !host.enabled {
                let holders = self
                    .hosts
                    .values()
                    .filter(|h| h.absorbed_hosts.contains(name))
                    .count();
                if holders != 1 {
                    found.push(format!(
                        "disabled host '{}' is held by {} hosts",
                        name, holders
                    ));
                }
            }
        }

        found
    }
}

impl FromIterator<(String, Host)> for Registry {
    fn from_iter<I: IntoIterator<Item = (String, Host)>>(iter: I) -> Self {
        Self {
            hosts: iter
                .into_iter()
                .map(|(name, mut host)| {
                    for absorbed in &mut host.absorbed_hosts {
                        *absorbed = normalize(absorbed);
                    }
                    (normalize(&name), host)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_hosts() -> Registry {
        Registry::new().add("a", "10.0.0.1").add("b", "10.0.0.2")
    }

    #[test]
    fn test_add_and_lookup() {
        let reg = two_hosts();
        assert_eq!(reg.len(), 2);
        assert!(reg.exists("a"));
        assert!(reg.exists("A"));
        assert!(!reg.exists("c"));
        assert!(reg.ip_in_use("10.0.0.2"));
        assert!(!reg.ip_in_use("10.0.0.3"));
        assert_eq!(reg.get("b").unwrap(), &Host::new("10.0.0.2"));
    }

    #[test]
    fn test_add_does_not_check_duplicates() {
        let reg = two_hosts().add("a", "10.0.0.9").add("c", "10.0.0.2");
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.get("a").unwrap().ip_address, "10.0.0.9");
    }

    #[test]
    fn test_add_leaves_original_untouched() {
        let reg = two_hosts();
        let next = reg.add("c", "10.0.0.3");
        assert_eq!(reg.len(), 2);
        assert_eq!(next.len(), 3);
    }

    #[test]
    fn test_remove_keeps_dangling_references() {
        let reg = two_hosts().move_traffic("a", "b").unwrap().remove("a");
        assert!(!reg.exists("a"));
        assert_eq!(reg.get("b").unwrap().absorbed_hosts, vec!["a"]);
        assert_eq!(reg.anomalies().len(), 1);
    }

    #[test]
    fn test_move_traffic() {
        let reg = two_hosts().move_traffic("a", "b").unwrap();

        let a = reg.get("a").unwrap();
        assert!(!a.enabled);
        assert!(a.absorbed_hosts.is_empty());
        assert_eq!(a.ip_address, "10.0.0.1");

        let b = reg.get("b").unwrap();
        assert!(b.enabled);
        assert_eq!(b.absorbed_hosts, vec!["a"]);

        assert!(reg.anomalies().is_empty());
    }

    #[test]
    fn test_move_traffic_twice_fails() {
        let reg = two_hosts().move_traffic("a", "b").unwrap();
        let err = reg.move_traffic("a", "b").unwrap_err();
        assert!(matches!(err, LbError::AlreadyDisabled(ref h) if h == "a"));
    }

    #[test]
    fn test_move_traffic_to_self_always_fails() {
        let reg = two_hosts();
        assert!(matches!(
            reg.move_traffic("a", "a"),
            Err(LbError::SelfMove(_))
        ));

        let moved = reg.move_traffic("a", "b").unwrap();
        assert!(matches!(
            moved.move_traffic("a", "A"),
            Err(LbError::SelfMove(_))
        ));
        assert!(matches!(
            moved.move_traffic("b", "b"),
            Err(LbError::SelfMove(_))
        ));
        assert!(matches!(
            Registry::new().move_traffic("x", "x"),
            Err(LbError::SelfMove(_))
        ));
    }

    #[test]
    fn test_move_traffic_from_absorbing_host_fails() {
        let reg = two_hosts()
            .add("c", "10.0.0.3")
            .move_traffic("a", "b")
            .unwrap();
        let err = reg.move_traffic("b", "c").unwrap_err();
        assert!(matches!(err, LbError::AlreadyAbsorbing { ref host, .. } if host == "b"));
    }

    #[test]
    fn test_move_traffic_to_disabled_host_fails() {
        let reg = two_hosts()
            .add("c", "10.0.0.3")
            .move_traffic("a", "b")
            .unwrap();
        let err = reg.move_traffic("c", "a").unwrap_err();
        assert!(matches!(err, LbError::TargetDisabled(ref h) if h == "a"));
    }

    #[test]
    fn test_move_traffic_unknown_host() {
        let reg = two_hosts();
        assert!(matches!(
            reg.move_traffic("a", "zz"),
            Err(LbError::HostNotFound(ref h)) if h == "zz"
        ));
        assert!(matches!(
            reg.move_traffic("zz", "a"),
            Err(LbError::HostNotFound(ref h)) if h == "zz"
        ));
    }

    #[test]
    fn test_failed_move_leaves_registry_unchanged() {
        let reg = two_hosts().move_traffic("a", "b").unwrap();
        let before = reg.clone();
        let _ = reg.move_traffic("b", "a");
        assert_eq!(reg, before);
    }

    #[test]
    fn test_several_hosts_into_one() {
        let reg = two_hosts()
            .add("c", "10.0.0.3")
            .move_traffic("a", "c")
            .unwrap()
            .move_traffic("b", "c")
            .unwrap();
        assert_eq!(reg.get("c").unwrap().absorbed_hosts, vec!["a", "b"]);
        assert_eq!(reg.holder_of("b"), Some("c"));

        let reg = reg.restore_traffic("a").unwrap();
        assert_eq!(reg.get("c").unwrap().absorbed_hosts, vec!["b"]);
        assert!(reg.get("a").unwrap().enabled);
        assert!(reg.anomalies().is_empty());
    }

    #[test]
    fn test_restore_reverses_move() {
        let original = two_hosts();
        let restored = original
            .move_traffic("a", "b")
            .unwrap()
            .restore_traffic("a")
            .unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_restore_enabled_host_fails() {
        let err = two_hosts().restore_traffic("a").unwrap_err();
        assert!(matches!(err, LbError::AlreadyEnabled(ref h) if h == "a"));
    }

    #[test]
    fn test_restore_without_holder_fails() {
        let reg: Registry = [(
            "a".to_string(),
            Host {
                ip_address: "10.0.0.1".into(),
                enabled: false,
                absorbed_hosts: Vec::new(),
            },
        )]
        .into_iter()
        .collect();

        let err = reg.restore_traffic("a").unwrap_err();
        assert!(matches!(err, LbError::HolderNotFound(ref h) if h == "a"));
        assert!(!reg.get("a").unwrap().enabled);
    }

    #[test]
    fn test_anomalies_detects_hand_edits() {
        let reg: Registry = [
            (
                "a".to_string(),
                Host {
                    ip_address: "10.0.0.1".into(),
                    enabled: false,
                    absorbed_hosts: vec!["a".into()],
                },
            ),
            ("b".to_string(), Host::new("10.0.0.2")),
        ]
        .into_iter()
        .collect();

        let found = reg.anomalies();
        assert!(found.iter().any(|m| m.contains("lists itself")));
        assert!(found.iter().any(|m| m.contains("disabled but holds")));
    }

    #[test]
    fn test_absorbed_names_are_normalized() {
        let reg: Registry = [
            (
                "B".to_string(),
                Host {
                    ip_address: "10.0.0.2".into(),
                    enabled: true,
                    absorbed_hosts: vec![" A".into()],
                },
            ),
            (
                "a".to_string(),
                Host {
                    ip_address: "10.0.0.1".into(),
                    enabled: false,
                    absorbed_hosts: Vec::new(),
                },
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(reg.get("b").unwrap().absorbed_hosts, vec!["a"]);
        assert_eq!(reg.holder_of("a"), Some("b"));
        assert_eq!(decode(&encode(&reg)).unwrap(), reg);
    }
}
