//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Lokatani backend API testing console
#[derive(Parser, Debug)]
#[command(name = "lokatani-tester")]
#[command(version)]
#[command(about = "Exercise the Lokatani smart-scale backend API from the terminal")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Backend base URL (overrides saved configuration)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// API key sent as X-API-Key
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Firebase ID token sent as a Bearer credential
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Settings file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Credential for weight and active-session (none, bearer, api-key)
    #[arg(long, global = true)]
    pub telemetry_auth: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, global = true, default_value = "table")]
    pub format: String,

    /// Disable ANSI colours
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write the last response body to this file
    #[arg(long, global = true)]
    pub save_response: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// GET / without credentials
    Health,

    /// Start a weighing session
    Initiate(InitiateArgs),

    /// Complete a weighing session
    Complete {
        /// Session id returned by `initiate`
        session_id: String,
    },

    /// Send a weight reading from the scale
    Weight(PayloadArgs),

    /// Send a device status report
    Status(PayloadArgs),

    /// Upload a photo for vegetable identification
    Identify(IdentifyArgs),

    /// Weighing history of the signed-in user
    History,

    /// One weighing session by id
    Session {
        /// Session id
        session_id: String,
    },

    /// Session the scale is currently attached to
    ActiveSession,

    /// Run the default sequential suite
    Suite(SuiteArgs),

    /// Obtain a Firebase ID token
    Login(LoginArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// List the backend endpoints
    Endpoints {
        /// Show method, path and credential
        #[arg(short, long)]
        detailed: bool,
    },

    /// Print sample weight and status payloads
    Sample {
        /// Device id to embed
        #[arg(long)]
        device_id: Option<String>,
    },
}

/// Arguments for initiate command
#[derive(ClapArgs, Debug)]
pub struct InitiateArgs {
    /// Session type (blank means "rompes")
    #[arg(short = 't', long = "type", default_value = "")]
    pub session_type: String,

    /// Vegetable type, required for "rompes"
    #[arg(long = "vegetable")]
    pub vegetable_type: Option<String>,
}

/// Where a JSON payload comes from
#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// Inline JSON payload
    #[arg(short, long)]
    pub data: Option<String>,

    /// Read the JSON payload from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Use a generated sample payload
    #[arg(long)]
    pub sample: bool,
}

/// Arguments for identify command
#[derive(ClapArgs, Debug)]
pub struct IdentifyArgs {
    /// Image file to classify
    pub image: PathBuf,

    /// Attach the result to this session
    #[arg(long)]
    pub session_id: Option<String>,
}

/// Arguments for suite command
#[derive(ClapArgs, Debug)]
pub struct SuiteArgs {
    /// Pause between steps in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Export the summary (format from extension: .json or .csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for login command
#[derive(ClapArgs, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Account password (not needed with --mock)
    #[arg(short, long, env = "LOKATANI_TESTER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Produce a local mock token instead of calling the identity provider
    #[arg(long)]
    pub mock: bool,
}

/// Arguments for config management
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Show environment variables instead
        #[arg(long)]
        env: bool,
    },

    /// Save the base URL for later runs
    SetUrl {
        /// Backend base URL
        url: String,
    },

    /// Check every configuration field
    Validate,

    /// Print a redacted configuration snapshot as JSON
    Export,

    /// Remove the saved configuration
    Clear,

    /// Write a settings file with default values
    Init {
        /// Output file
        #[arg(short, long, default_value = "./lokatani-tester.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
