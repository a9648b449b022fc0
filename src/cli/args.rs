use crate::pagerduty::DEFAULT_EVENTS_URL;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "x509-expiry-pager")]
#[command(version = "1.0.0")]
#[command(about = "Watch a directory of PEM certificates and page PagerDuty before they expire")]
#[command(long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (default INFO, -v DEBUG, -vv TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output raw tab-separated values (no formatting)
    #[arg(short, long, global = true)]
    pub raw: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan certificates and trigger PagerDuty alerts for those near expiry
    Check {
        #[command(flatten)]
        target: TargetArgs,

        /// PagerDuty Events v2 routing key (alerting is skipped when empty)
        #[arg(long, alias = "pd-routing-key", env = "PAGERDUTY_ROUTING_KEY", hide_env_values = true)]
        routing_key: Option<String>,

        /// Hostname used in dedup keys and as the alert source (defaults to the system hostname)
        #[arg(long)]
        hostname: Option<String>,

        /// PagerDuty Events API endpoint
        #[arg(long, env = "PAGERDUTY_EVENTS_URL", default_value = DEFAULT_EVENTS_URL)]
        events_url: String,
    },
    /// Print the certificate inventory with time remaining until expiry
    List {
        #[command(flatten)]
        target: TargetArgs,

        /// Columns to display (comma-separated): file,subject,issuer,not_after,remaining,near_expiry,fingerprint. Use +column to append to defaults.
        #[arg(long)]
        columns: Option<String>,
    },
    /// Generate shell completion scripts
    Completion {
        #[command(subcommand)]
        command: CompletionCommands,
    },
}

#[derive(Args, Clone, Debug)]
pub struct TargetArgs {
    /// Directory containing PEM encoded X.509 certificates
    #[arg(long, env = "CERT_DIR", default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub cert_dir: String,

    /// Certificates with fewer seconds than this until expiry are flagged
    #[arg(long, default_value_t = 3600)]
    pub seconds_to_expiry: i64,
}

#[derive(Subcommand)]
pub enum CompletionCommands {
    /// Generate bash completion script
    Bash,
    /// Generate zsh completion script
    Zsh,
    /// Generate fish completion script
    Fish,
    /// Generate PowerShell completion script
    PowerShell,
}

impl CompletionCommands {
    pub fn shell(&self) -> Shell {
        match self {
            CompletionCommands::Bash => Shell::Bash,
            CompletionCommands::Zsh => Shell::Zsh,
            CompletionCommands::Fish => Shell::Fish,
            CompletionCommands::PowerShell => Shell::PowerShell,
        }
    }
}
