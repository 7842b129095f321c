//! Input validation for names and addresses accepted on the command line.
//!
//! Each check comes in two forms: an `is_valid_*` predicate and a
//! `validate_*` function returning a descriptive [`LbError::Validation`].
//! All checks are ASCII-only.
//!
//! The `lb` commands use the cluster, host and IP checks. Port and URI
//! checks cover the other values a proxied site is defined by (backend
//! port, location path) and are exported for callers that build those.

use std::net::Ipv4Addr;

use crate::error::LbError;

/// Lowest port accepted for a proxied backend.
pub const MIN_PORT: u16 = 1024;
/// Highest port accepted for a proxied backend.
pub const MAX_PORT: u16 = 49151;

/// Cluster names: one or more lowercase letters or digits.
///
/// # Examples
/// ```
/// use proxymanager::validation::is_valid_cluster_name;
/// assert!(is_valid_cluster_name("web01"));
/// assert!(!is_valid_cluster_name("web-01"));
/// ```
pub fn is_valid_cluster_name(cluster: &str) -> bool {
    !cluster.is_empty()
        && cluster
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Host names: lowercase alphanumeric labels joined by single `-` or `.`.
///
/// # Examples
/// ```
/// use proxymanager::validation::is_valid_host_name;
/// assert!(is_valid_host_name("node-1.example.com"));
/// assert!(!is_valid_host_name("node..1"));
/// ```
pub fn is_valid_host_name(host: &str) -> bool {
    if host.is_empty() {
        return false;
    }

    let mut prev_separator = true;
    for b in host.bytes() {
        match b {
            b'a'..=b'z' | b'0'..=b'9' => prev_separator = false,
            b'-' | b'.' if !prev_separator => prev_separator = true,
            _ => return false,
        }
    }

    !prev_separator
}

/// IPv4 dotted quad, each octet 0-255 without leading zeros.
///
/// # Examples
/// ```
/// use proxymanager::validation::is_valid_ip_address;
/// assert!(is_valid_ip_address("192.168.0.1"));
/// assert!(!is_valid_ip_address("256.0.0.1"));
/// ```
pub fn is_valid_ip_address(ip: &str) -> bool {
    // The std parser rejects octets with leading zeros.
    ip.parse::<Ipv4Addr>().is_ok()
}

/// Port in the registered range (1024-49151).
pub fn is_valid_port(port: &str) -> bool {
    if port.is_empty() || port.len() > 5 || !port.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    port.parse::<u16>()
        .map(|n| (MIN_PORT..=MAX_PORT).contains(&n))
        .unwrap_or(false)
}

/// URI path: a leading `/` followed by unreserved characters and `/`.
pub fn is_valid_uri(uri: &str) -> bool {
    uri.starts_with('/')
        && uri
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"/-_.~".contains(&b))
}

pub fn validate_cluster_name(cluster: &str) -> Result<(), LbError> {
    if !is_valid_cluster_name(cluster) {
        return Err(LbError::Validation(format!(
            "Invalid cluster name: {}. Can only contain lowercase letters and numbers.",
            cluster
        )));
    }
    Ok(())
}

pub fn validate_host_name(host: &str) -> Result<(), LbError> {
    if !is_valid_host_name(host) {
        return Err(LbError::Validation(format!(
            "Invalid Hostname format: {}. Can only contain lowercase letters, numbers, hyphens, and periods.",
            host
        )));
    }
    Ok(())
}

pub fn validate_ip_address(ip: &str) -> Result<(), LbError> {
    if !is_valid_ip_address(ip) {
        return Err(LbError::Validation(format!(
            "Invalid IP Address format: {}. Must be a value between 0.0.0.0 - 255.255.255.255.",
            ip
        )));
    }
    Ok(())
}

pub fn validate_port(port: &str) -> Result<(), LbError> {
    if !is_valid_port(port) {
        return Err(LbError::Validation(format!(
            "Port '{}' is invalid. Please specify a port in the following range: {}-{}",
            port, MIN_PORT, MAX_PORT
        )));
    }
    Ok(())
}

pub fn validate_uri(uri: &str) -> Result<(), LbError> {
    if !is_valid_uri(uri) {
        return Err(LbError::Validation(format!(
            "Uri '{}' is invalid. A uri must start with a '/' and only contain: a-z, A-Z, 0-9, /, -, _, ., and ~",
            uri
        )));
    }
    Ok(())
}
