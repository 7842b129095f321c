//! Load balancer command implementation.
//!
//! Cluster and host names are lowercased before use. Commands that change
//! the hosts file hold the lock for the whole read-modify-write cycle and
//! commit through [`HostsFile::commit`](crate::store::HostsFile::commit),
//! so nginx either accepts the change or the previous file is back.

use tracing::{debug, info, warn};

use super::Context;
use crate::cli::LbAction;
use crate::error::LbError;
use crate::registry::decode;
use crate::store::{create_block, find_block, list_clusters, name_in_file, remove_block};
use crate::utils::format_table;
use crate::validation::{validate_cluster_name, validate_host_name, validate_ip_address};

/// Run the lb command
pub async fn run(action: LbAction, ctx: &Context<'_>) -> Result<String, LbError> {
    match action {
        LbAction::List => list(ctx),
        LbAction::New { cluster } => new_cluster(ctx, &cluster).await,
        LbAction::Remove { cluster } => remove_cluster(ctx, &cluster).await,
        LbAction::Status { cluster } => status(ctx, &cluster),
        LbAction::Add { cluster, host, ip } => add_host(ctx, &cluster, &host, &ip).await,
        LbAction::Del { cluster, host } => del_host(ctx, &cluster, &host).await,
        LbAction::Move { cluster, from, to } => move_traffic(ctx, &cluster, &from, &to).await,
        LbAction::Restore { cluster, host } => restore_traffic(ctx, &cluster, &host).await,
    }
}

/// List cluster names, one per line
fn list(ctx: &Context<'_>) -> Result<String, LbError> {
    let lines = ctx.hosts.read_lines()?;
    let clusters = list_clusters(&lines);

    if clusters.is_empty() {
        return Ok("No clusters exist.".to_string());
    }
    Ok(clusters.join("\n"))
}

/// Create an empty cluster block
async fn new_cluster(ctx: &Context<'_>, cluster: &str) -> Result<String, LbError> {
    let cluster = cluster.to_lowercase();
    validate_cluster_name(&cluster)?;

    let _lock = ctx.lock()?;
    let lines = ctx.hosts.read_lines()?;
    let updated = create_block(&lines, &cluster)?;
    ctx.hosts.commit(&lines, &updated, ctx.reloader).await?;

    info!("Created cluster {} in {}", cluster, ctx.hosts.path().display());
    Ok(format!("Cluster '{}' created.", cluster))
}

/// Remove a cluster that holds no hosts
async fn remove_cluster(ctx: &Context<'_>, cluster: &str) -> Result<String, LbError> {
    let cluster = cluster.to_lowercase();

    let _lock = ctx.lock()?;
    let lines = ctx.hosts.read_lines()?;
    let updated = remove_block(&lines, &cluster)?;
    ctx.hosts.commit(&lines, &updated, ctx.reloader).await?;

    info!("Removed cluster {}", cluster);
    Ok(format!("Cluster '{}' removed.", cluster))
}

/// Show the hosts table of a cluster
fn status(ctx: &Context<'_>, cluster: &str) -> Result<String, LbError> {
    let cluster = cluster.to_lowercase();

    let lines = ctx.hosts.read_lines()?;
    let block = find_block(&lines, &cluster)?;
    if block.is_empty() {
        return Ok(format!("No hosts defined in cluster '{}'.", cluster));
    }

    let registry = decode(block.entries(&lines))?;
    if registry.is_empty() {
        return Ok(format!("No hosts defined in cluster '{}'.", cluster));
    }

    let rows: Vec<Vec<String>> = registry
        .iter()
        .map(|(name, host)| {
            vec![
                name.to_string(),
                host.ip_address.clone(),
                host.enabled.to_string(),
                host.absorbed_hosts.join(","),
            ]
        })
        .collect();

    let mut output = format_table(
        &["Host", "IP Address", "Enabled", "Additional Hosts"],
        &rows,
    );

    for anomaly in registry.anomalies() {
        debug!("Cluster {}: {}", cluster, anomaly);
        output.push_str(&format!("\nWarning: {}", anomaly));
    }

    Ok(output)
}

/// Add an enabled host to a cluster
async fn add_host(
    ctx: &Context<'_>,
    cluster: &str,
    host: &str,
    ip: &str,
) -> Result<String, LbError> {
    let cluster = cluster.to_lowercase();
    let host = host.to_lowercase();

    validate_ip_address(ip)?;
    validate_host_name(&host)?;

    let _lock = ctx.lock()?;
    let snapshot = ctx.load_cluster(&cluster)?;

    // Host names are unique across the whole file, not only this cluster.
    if name_in_file(&snapshot.lines, &host) {
        return Err(LbError::HostExists(host));
    }
    if snapshot.registry.ip_in_use(ip) {
        return Err(LbError::IpInUse {
            ip: ip.to_string(),
            cluster,
        });
    }

    let registry = snapshot.registry.add(&host, ip);
    ctx.save_cluster(&snapshot, &registry).await?;

    info!("Added {} ({}) to cluster {}", host, ip, cluster);
    Ok(format!("Host '{}' added to cluster '{}'.", host, cluster))
}

/// Delete a host from a cluster
async fn del_host(ctx: &Context<'_>, cluster: &str, host: &str) -> Result<String, LbError> {
    let cluster = cluster.to_lowercase();
    let host = host.to_lowercase();

    let _lock = ctx.lock()?;
    let snapshot = ctx.load_cluster(&cluster)?;

    let entry = snapshot
        .registry
        .get(&host)
        .ok_or_else(|| LbError::HostNotInCluster {
            host: host.clone(),
            cluster: cluster.clone(),
        })?;

    if let Some(holder) = snapshot.registry.holder_of(&host) {
        warn!("'{}' still lists '{}' as absorbed", holder, host);
    }
    if entry.is_absorbing() {
        warn!(
            "'{}' was handling traffic for: {}",
            host,
            entry.absorbed_hosts.join(", ")
        );
    }

    let registry = snapshot.registry.remove(&host);
    ctx.save_cluster(&snapshot, &registry).await?;

    info!("Deleted {} from cluster {}", host, cluster);
    Ok(format!("Host '{}' removed from cluster '{}'.", host, cluster))
}

/// Move a host's traffic onto another host
async fn move_traffic(
    ctx: &Context<'_>,
    cluster: &str,
    from: &str,
    to: &str,
) -> Result<String, LbError> {
    let cluster = cluster.to_lowercase();
    let from = from.to_lowercase();
    let to = to.to_lowercase();

    let _lock = ctx.lock()?;
    let snapshot = ctx.load_cluster(&cluster)?;

    for host in [&from, &to] {
        if !snapshot.registry.exists(host) {
            return Err(LbError::HostNotInCluster {
                host: host.clone(),
                cluster: cluster.clone(),
            });
        }
    }

    let registry = snapshot.registry.move_traffic(&from, &to)?;
    debug!("Moving traffic {} -> {} in cluster {}", from, to, cluster);
    ctx.save_cluster(&snapshot, &registry).await?;

    Ok(format!(
        "Traffic moved from '{}' to '{}' in cluster '{}'.",
        from, to, cluster
    ))
}

/// Give a disabled host its traffic back
async fn restore_traffic(ctx: &Context<'_>, cluster: &str, host: &str) -> Result<String, LbError> {
    let cluster = cluster.to_lowercase();
    let host = host.to_lowercase();

    let _lock = ctx.lock()?;
    let snapshot = ctx.load_cluster(&cluster)?;

    if !snapshot.registry.exists(&host) {
        return Err(LbError::HostNotInCluster { host, cluster });
    }

    let registry = snapshot.registry.restore_traffic(&host)?;
    debug!("Restoring traffic for {} in cluster {}", host, cluster);
    ctx.save_cluster(&snapshot, &registry).await?;

    Ok(format!(
        "Traffic restored for '{}' in cluster '{}'.",
        host, cluster
    ))
}
