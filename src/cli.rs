use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::export::ExportFormat;

#[derive(Parser)]
#[command(name = "nessus-client")]
#[command(about = "Thin client for the Nessus vulnerability scanner REST API")]
#[command(long_about = r#"
Command-line front end for a Nessus scanner. Authenticates with either an
API key pair or a username/password session, then maps one subcommand onto
each REST resource.

Examples:
  nessus-client --server https://scanner:8834 --access-key AK --secret-key SK status
  nessus-client -c nessus.toml scans --folder-id 3
  nessus-client -c nessus.toml export-request 42 --format pdf
  nessus-client -c nessus.toml export-download 42 1337 -o report.pdf
"#)]
#[command(version)]
pub struct Cli {
    /// Scanner base URL (e.g. https://scanner:8834)
    #[arg(long, value_name = "URL", env = "NESSUS_SERVER__URL")]
    pub server: Option<String>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Username for session authentication
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password for session authentication
    #[arg(long)]
    pub password: Option<String>,

    /// API access key (pairs with --secret-key, skips the session exchange)
    #[arg(long, env = "NESSUS_AUTH__ACCESS_KEY")]
    pub access_key: Option<String>,

    /// API secret key
    #[arg(long, env = "NESSUS_AUTH__SECRET_KEY")]
    pub secret_key: Option<String>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Retrieve server status
    Status,

    /// Retrieve server version and properties
    Properties,

    /// List scanner health alerts
    HealthAlerts {
        /// Window start, hours before now (alternative to --start-time)
        #[arg(long, value_name = "HOURS", conflicts_with = "start_time")]
        since_hours: Option<i64>,

        /// Window start as unixtime
        #[arg(long)]
        start_time: Option<i64>,

        /// Window end as unixtime
        #[arg(long)]
        end_time: Option<i64>,
    },

    /// List scans
    Scans {
        /// Only scans inside this folder
        #[arg(long)]
        folder_id: Option<i64>,

        /// Only scans modified since this unixtime
        #[arg(long)]
        since: Option<i64>,
    },

    /// Retrieve details for a scan
    Scan {
        scan_id: i64,
    },

    /// Reconfigure a scan's schedule or policy settings
    Configure {
        scan_id: i64,

        /// Editor template UUID
        #[arg(long)]
        uuid: String,

        /// Settings as inline JSON (defaults to an empty object)
        #[arg(long, value_name = "JSON")]
        settings: Option<String>,
    },

    /// Retrieve details for one host of a scan
    Host {
        scan_id: i64,
        host_id: i64,
    },

    /// Retrieve one plugin's output against one host
    PluginOutput {
        scan_id: i64,
        host_id: i64,
        plugin_id: i64,

        /// Historical scan run to read from
        #[arg(long)]
        history_id: Option<i64>,
    },

    /// Download a scan attachment
    Attachment {
        scan_id: i64,
        attachment_id: i64,

        /// Attachment access token from the scan output
        #[arg(long)]
        key: Option<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List available export formats for a scan
    ExportFormats {
        scan_id: i64,
    },

    /// Request a report export (returns the file id to poll)
    ExportRequest {
        scan_id: i64,

        /// Report file format
        #[arg(long, value_enum, default_value = "nessus")]
        format: FormatArg,
    },

    /// Check the status of a requested export
    ExportStatus {
        scan_id: i64,
        file_id: i64,
    },

    /// Download a finished export
    ExportDownload {
        scan_id: i64,
        file_id: i64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Nessus,
    Html,
    Pdf,
    Csv,
    Db,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Nessus => ExportFormat::Nessus,
            FormatArg::Html => ExportFormat::Html,
            FormatArg::Pdf => ExportFormat::Pdf,
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Db => ExportFormat::Db,
        }
    }
}
