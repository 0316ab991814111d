use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oidc-provisioner")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative lifecycle management of OIDC configs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Manifest declaring the desired resources
    #[arg(short = 'f', long, global = true, default_value = "oidc.toml")]
    pub manifest: PathBuf,

    /// State file (default: ~/.local/state/oidc-provisioner/state.toml)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// clusters_mgmt API URL
    #[arg(long, global = true, env = "OCM_URL")]
    pub url: Option<String>,

    /// API access token
    #[arg(long, global = true, env = "OCM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change
    Plan(TargetArgs),

    /// Make remote resources match the manifest
    Apply(ApplyArgs),

    /// Read every stored resource back from the API
    Refresh(TargetArgs),

    /// Destroy every stored resource
    Destroy(DestroyArgs),

    /// Start tracking an existing remote resource
    Import {
        /// Address to store it under (e.g. rosa_oidc_config.main)
        address: String,

        /// Remote id
        id: String,
    },

    /// Show stored resources
    Show {
        /// Only show this address
        address: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show effective configuration and file locations
    Show,
}

#[derive(Parser)]
pub struct TargetArgs {
    /// Only act on a resource type or address (e.g. rosa_oidc_config.main)
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Only act on a resource type or address
    #[arg(short, long)]
    pub target: Option<String>,

    /// Dry run - show the plan without changing anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of resources handled in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Parser)]
pub struct DestroyArgs {
    /// Only act on a resource type or address
    #[arg(short, long)]
    pub target: Option<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "oidc-provisioner",
            "-vv",
            "apply",
            "--target",
            "rosa_oidc_config.main",
            "--jobs",
            "2",
            "--yes",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.manifest, PathBuf::from("oidc.toml"));
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.target.as_deref(), Some("rosa_oidc_config.main"));
                assert_eq!(args.jobs, 2);
                assert!(args.yes);
                assert!(!args.dry_run);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from([
            "oidc-provisioner",
            "--state",
            "/tmp/state.toml",
            "import",
            "rosa_oidc_config.main",
            "23f6gk51qi5ng15mm095c90hhajbf7c5",
        ])
        .unwrap();

        assert_eq!(cli.state, Some(PathBuf::from("/tmp/state.toml")));
        assert!(matches!(cli.command, Command::Import { .. }));
    }
}
