//! Cluster blocks inside the hosts file.
//!
//! ```text
//!
//! # DO NOT EDIT, USE proxymanager
//! ### LB_K8S(web)
//! 10.0.0.1 node-a
//! ### LB_K8S_END
//! ```

use std::net::IpAddr;

use crate::error::LbError;

pub const START_MARKER_PREFIX: &str = "### LB_K8S(";
pub const END_MARKER: &str = "### LB_K8S_END";
pub const BANNER: &str = "# DO NOT EDIT, USE proxymanager";

/// Half-open range `[start, end)` of a cluster's entry lines.
///
/// `start` is the line after the opening marker and `end` is the closing
/// marker's index, so `start - 1` and `end` are the marker lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start: usize,
    pub end: usize,
}

impl Block {
    /// Raw line count between the markers.
    pub fn host_count(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn entries<'a>(&self, lines: &'a [String]) -> &'a [String] {
        &lines[self.start..self.end]
    }
}

pub fn start_marker(cluster: &str) -> String {
    format!("{}{})", START_MARKER_PREFIX, cluster)
}

/// Cluster name declared by a start marker line.
fn declared_cluster(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(START_MARKER_PREFIX)?;
    let end = rest.find(')')?;
    Some(&rest[..end])
}

fn is_end_marker(line: &str) -> bool {
    line.trim_end() == END_MARKER
}

/// Names of all clusters in file order.
pub fn list_clusters(lines: &[String]) -> Vec<&str> {
    lines.iter().filter_map(|l| declared_cluster(l)).collect()
}

/// Locate `cluster`'s block.
///
/// Another start marker before the end marker is
/// [`LbError::UnterminatedBlock`].
pub fn find_block(lines: &[String], cluster: &str) -> Result<Block, LbError> {
    let marker = lines
        .iter()
        .position(|l| declared_cluster(l) == Some(cluster))
        .ok_or_else(|| LbError::ClusterNotFound(cluster.to_string()))?;

    let start = marker + 1;
    let end = lines[start..]
        .iter()
        .position(|l| is_end_marker(l) || declared_cluster(l).is_some())
        .map(|offset| start + offset)
        .filter(|&end| is_end_marker(&lines[end]))
        .ok_or_else(|| LbError::UnterminatedBlock(cluster.to_string()))?;

    Ok(Block { start, end })
}

/// Add an empty block for `cluster` after the last existing block.
pub fn create_block(lines: &[String], cluster: &str) -> Result<Vec<String>, LbError> {
    if list_clusters(lines).contains(&cluster) {
        return Err(LbError::ClusterExists(cluster.to_string()));
    }

    let new_block = [
        String::new(),
        BANNER.to_string(),
        start_marker(cluster),
        END_MARKER.to_string(),
    ];

    let mut out = Vec::with_capacity(lines.len() + new_block.len());
    match lines.iter().rposition(|l| is_end_marker(l)) {
        Some(last_end) if last_end + 1 < lines.len() => {
            out.extend_from_slice(&lines[..=last_end]);
            out.extend(new_block);
            out.extend_from_slice(&lines[last_end + 1..]);
        }
        _ => {
            out.extend_from_slice(lines);
            out.extend(new_block);
        }
    }

    Ok(out)
}

/// Drop `cluster`'s block, which must hold no entries.
///
/// The blank line and banner written by [`create_block`] are removed with
/// it when present.
pub fn remove_block(lines: &[String], cluster: &str) -> Result<Vec<String>, LbError> {
    let block = find_block(lines, cluster)?;
    if block.host_count() > 0 {
        return Err(LbError::NonEmptyCluster {
            cluster: cluster.to_string(),
            hosts: block.host_count(),
        });
    }

    let mut first = block.start - 1;
    if first > 0 && lines[first - 1].trim() == BANNER {
        first -= 1;
        if first > 0 && lines[first - 1].trim().is_empty() {
            first -= 1;
        }
    }

    let mut out = Vec::with_capacity(lines.len());
    out.extend_from_slice(&lines[..first]);
    out.extend_from_slice(&lines[block.end + 1..]);
    Ok(out)
}

/// Replace the entries of `block` with `entries`.
pub fn replace_block(lines: &[String], block: Block, entries: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len() - block.host_count() + entries.len());
    out.extend_from_slice(&lines[..block.start]);
    out.extend(entries);
    out.extend_from_slice(&lines[block.end..]);
    out
}

/// Host names listed on a hosts entry line, or `None` for anything else.
///
/// A disabled entry keeps its `#` prefix; text after a later `#` is a
/// comment. Lines whose first field is not an IP address (markers, the
/// banner, free-form comments) are not entries.
fn entry_names(line: &str) -> Option<impl Iterator<Item = &str>> {
    let body = line.trim_start().trim_start_matches('#');
    let body = body.split('#').next().unwrap_or_default();

    let mut fields = body.split_whitespace();
    fields.next()?.parse::<IpAddr>().ok()?;
    Some(fields)
}

/// True when `name` is used as a host name anywhere in the file.
///
/// Looks at every entry line, inside or outside cluster blocks, including
/// names recorded as absorbed.
pub fn name_in_file(lines: &[String], name: &str) -> bool {
    lines
        .iter()
        .filter_map(|l| entry_names(l))
        .any(|mut names| names.any(|field| field.eq_ignore_ascii_case(name)))
}
