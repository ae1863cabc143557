use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cfprov")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Manage Cloud Foundry relationships declaratively", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Provider config file (default: ~/.config/cfprov/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// State file (default: ~/.local/state/cfprov/state.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub state: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Controller connection settings; each overrides config.toml
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Cloud Controller API endpoint
    #[arg(long, env = "CF_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the controller
    #[arg(long, env = "CF_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub access_token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(
        long,
        env = "CF_SKIP_SSL_VALIDATION",
        global = true,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub skip_ssl_validation: Option<bool>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a resource and start tracking it
    Create {
        /// Resource type, e.g. cf_private_domain_access
        resource_type: String,

        /// Local name; the address becomes <type>.<name>
        name: String,

        /// Attribute value (repeatable)
        #[arg(short, long = "attr", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        attrs: Vec<(String, String)>,
    },

    /// Read a tracked resource and update state
    Read {
        /// Resource address (<type>.<name>)
        address: String,
    },

    /// Delete a tracked resource
    Delete {
        /// Resource address (<type>.<name>)
        address: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Adopt an existing relationship by id
    Import {
        /// Resource type
        resource_type: String,

        /// Local name
        name: String,

        /// Composite id, e.g. <org-guid>/<domain-guid>
        id: String,

        /// Fail if the relationship does not exist remotely
        #[arg(long)]
        verify: bool,
    },

    /// Read every tracked resource in parallel
    Refresh {
        /// Number of parallel reads
        #[arg(short, long, default_value = "4")]
        jobs: usize,
    },

    /// Show tracked resources
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show supported resource types
    Types,

    /// Check that service instances are gone from a space
    VerifyDestroyed {
        /// Space GUID
        #[arg(long)]
        space: String,

        /// Service instance names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Check that the service instance tracked at an address exists
    VerifyExists {
        /// Resource address (<type>.<name>)
        address: String,
    },

    /// Check that a relationship no longer exists
    VerifyGone {
        /// Resource type
        resource_type: String,

        /// Composite id
        id: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid KEY=VALUE: no `=` found in `{s}`")),
    }
}
