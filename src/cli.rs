//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "proxymanager")]
#[command(author, version, about = "Hosts-file load balancer manager for nginx")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (overrides PROXYMANAGER_CONFIG_PATH)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only in the log)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage load balancer clusters and their hosts
    Lb {
        #[command(subcommand)]
        action: LbAction,
    },
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum LbAction {
    /// List all clusters
    List,

    /// Create an empty cluster
    New {
        /// Cluster name (lowercase letters and digits)
        cluster: String,
    },

    /// Remove a cluster with no hosts
    Remove {
        /// Cluster name
        cluster: String,
    },

    /// Show the hosts of a cluster
    Status {
        /// Cluster name
        cluster: String,
    },

    /// Add a host to a cluster
    Add {
        /// Cluster name
        cluster: String,
        /// Host name
        host: String,
        /// IPv4 address of the host
        ip: String,
    },

    /// Delete a host from a cluster
    Del {
        /// Cluster name
        cluster: String,
        /// Host name
        host: String,
    },

    /// Move a host's traffic to another host of the same cluster
    Move {
        /// Cluster name
        cluster: String,
        /// Host whose traffic is moved away
        from: String,
        /// Host that takes the traffic
        to: String,
    },

    /// Send a host's traffic back to it
    Restore {
        /// Cluster name
        cluster: String,
        /// Host to restore
        host: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn action(args: &[&str]) -> LbAction {
        match parse(args).command {
            Commands::Lb { action } => action,
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(action(&["proxymanager", "lb", "list"]), LbAction::List);
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            action(&["proxymanager", "lb", "add", "web", "node-a", "10.0.0.1"]),
            LbAction::Add {
                cluster: "web".into(),
                host: "node-a".into(),
                ip: "10.0.0.1".into(),
            }
        );
    }

    #[test]
    fn test_parse_move() {
        assert_eq!(
            action(&["proxymanager", "lb", "move", "web", "a", "b"]),
            LbAction::Move {
                cluster: "web".into(),
                from: "a".into(),
                to: "b".into(),
            }
        );
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = parse(&[
            "proxymanager",
            "lb",
            "status",
            "web",
            "--config",
            "/tmp/pm.yml",
            "-v",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/pm.yml")));
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_missing_argument_fails() {
        assert!(Cli::try_parse_from(["proxymanager", "lb", "add", "web", "a"]).is_err());
        assert!(Cli::try_parse_from(["proxymanager", "lb", "restore", "web"]).is_err());
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["proxymanager", "-q", "-v", "lb", "list"]).is_err());
    }
}
