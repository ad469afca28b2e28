//! Lokatani API Tester - manual testing console for the Lokatani backend
//!
//! Exercises the weighing, IoT and ML endpoints of the Lokatani smart-scale
//! backend and shows every response as it arrives.
//!
//! ## Features
//!
//! - One subcommand per backend endpoint, with input checks before any call
//! - API key, Firebase bearer token or no credential, per endpoint
//! - Sequential smoke suite with table, JSON and CSV output
//! - Layered configuration: settings file, saved base URL, environment, flags
//!
//! ## Usage
//!
//! ```bash
//! # Save the backend URL once
//! lokatani-tester config set-url https://api.lokatani.test
//!
//! # Health check
//! lokatani-tester health
//!
//! # Weighing flow
//! lokatani-tester --token $TOKEN initiate --vegetable carrot
//! lokatani-tester weight --sample
//! lokatani-tester --token $TOKEN identify ./carrot.jpg --session-id s-1
//! lokatani-tester --token $TOKEN complete s-1
//!
//! # Default suite
//! lokatani-tester --token $TOKEN suite --output results.csv
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, warn};

mod actions;
mod auth;
mod cli;
mod config;
mod executor;
mod http;
mod models;
mod output;
mod utils;

use actions::SessionContext;
use auth::AuthMode;
use cli::{Args, Command, ConfigAction, PayloadArgs};
use config::{ConfigRecordStore, EnvConfig, FieldStatus, Overrides, ResolvedConfig, Settings};
use http::{ApiClient, ApiError, RequestResult};
use models::{Endpoint, SamplePayloads};
use output::{
    ExportFormat, Notifier, NullSink, OutputFormat, ResponsePresenter, ResponseSink,
    ResultFormatter,
};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(LogLevel::from_verbosity(args.verbose));

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Shared state for one invocation
struct App {
    resolved: ResolvedConfig,
    store: ConfigRecordStore,
    format: OutputFormat,
    colorize: bool,
    settings_path: Option<PathBuf>,
}

impl App {
    fn load(args: &Args) -> Result<Self> {
        let env = EnvConfig::load();
        let settings_path = args
            .config
            .clone()
            .or_else(|| env.config_file.as_ref().map(PathBuf::from))
            .or_else(config::find_settings_file);
        let settings = Settings::load_or_default(settings_path.as_deref())?;

        let store = ConfigRecordStore::default_dir();
        let stored = store.load_or_warn();

        let telemetry_auth = args
            .telemetry_auth
            .as_deref()
            .map(|raw| {
                AuthMode::from_str(raw)
                    .ok_or_else(|| anyhow::anyhow!("Unknown telemetry auth mode: {raw}"))
            })
            .transpose()?;

        let flags = Overrides {
            base_url: args.base_url.clone(),
            api_key: args.api_key.clone(),
            token: args.token.clone(),
            telemetry_auth,
            timeout_secs: args.timeout,
        };
        let resolved = config::resolve(&settings, stored.as_ref(), &env, &flags)?;
        let token = resolved.configuration.token();
        if auth::is_mock_token(&token) && !auth::is_token_valid(&token) {
            warn!("Mock token has expired; run `login --mock` again");
        }
        debug!(
            "Resolved base URL '{}', telemetry auth {}, timeout {}s",
            resolved.configuration.base_url(),
            resolved.telemetry_auth,
            resolved.timeout_secs
        );

        let format = OutputFormat::from_str(&args.format)
            .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", args.format))?;

        Ok(Self {
            resolved,
            store,
            format,
            colorize: !args.no_color,
            settings_path,
        })
    }

    fn notifier(&self) -> Notifier {
        if self.colorize {
            Notifier::new()
        } else {
            Notifier::new().no_color()
        }
    }

    fn presenter(&self) -> Arc<ResponsePresenter> {
        Arc::new(if self.colorize {
            ResponsePresenter::new()
        } else {
            ResponsePresenter::new().no_color()
        })
    }

    fn formatter(&self) -> ResultFormatter {
        let formatter = ResultFormatter::new(self.format);
        if self.colorize {
            formatter
        } else {
            formatter.no_color()
        }
    }

    /// Session context; machine-readable formats keep the response panel off stdout
    fn context(&self, presenter: &Arc<ResponsePresenter>) -> Result<SessionContext> {
        let sink: Arc<dyn ResponseSink> = if self.format.is_machine_readable() {
            Arc::new(NullSink)
        } else {
            presenter.clone()
        };
        let client = ApiClient::with_timeout(self.resolved.timeout_secs, sink)?;

        Ok(SessionContext::new(
            self.resolved.configuration.clone(),
            client,
            self.notifier(),
        )
        .with_telemetry_auth(self.resolved.telemetry_auth))
    }
}

async fn run(args: Args) -> Result<bool> {
    let app = App::load(&args)?;

    match args.command {
        Command::Endpoints { detailed } => {
            list_endpoints(&app, detailed);
            Ok(true)
        }
        Command::Sample { device_id } => {
            let device_id = device_id.unwrap_or_else(|| app.resolved.device_id.clone());
            let samples = SamplePayloads::generate(&device_id);
            println!("{}", serde_json::to_string_pretty(&samples)?);
            Ok(true)
        }
        Command::Config(config_args) => manage_config(&app, config_args.action),
        Command::Login(login_args) => login(&app, login_args).await,
        Command::Suite(suite_args) => run_suite(&app, suite_args).await,
        command => {
            let presenter = app.presenter();
            let ctx = app.context(&presenter)?;
            let outcome = run_action(&app, &ctx, command).await?;
            finish_action(&app, &presenter, outcome, args.save_response.as_deref())
        }
    }
}

/// Dispatch a single endpoint action
async fn run_action(
    app: &App,
    ctx: &SessionContext,
    command: Command,
) -> Result<Result<RequestResult, ApiError>> {
    let outcome = match command {
        Command::Health => actions::health_check(ctx).await,
        Command::Initiate(initiate) => {
            actions::initiate_session(
                ctx,
                &initiate.session_type,
                initiate.vegetable_type.as_deref(),
            )
            .await
        }
        Command::Complete { session_id } => actions::complete_session(ctx, &session_id).await,
        Command::Weight(payload) => {
            let body = load_payload(&payload, || {
                SamplePayloads::generate(&app.resolved.device_id).weight
            })
            .await?;
            actions::send_weight(ctx, &body).await
        }
        Command::Status(payload) => {
            let body = load_payload(&payload, || {
                SamplePayloads::generate(&app.resolved.device_id).status
            })
            .await?;
            actions::send_status(ctx, &body).await
        }
        Command::Identify(identify) => {
            actions::identify_vegetable(
                ctx,
                Some(identify.image.as_path()),
                identify.session_id.as_deref(),
            )
            .await
        }
        Command::History => actions::get_history(ctx).await,
        Command::Session { session_id } => actions::get_session(ctx, &session_id).await,
        Command::ActiveSession => actions::get_active_session(ctx).await,
        other => anyhow::bail!("{other:?} is not an endpoint action"),
    };
    Ok(outcome)
}

/// JSON payload text from `--data`, `--file` or a generated sample
async fn load_payload(
    payload: &PayloadArgs,
    sample: impl FnOnce() -> serde_json::Value,
) -> Result<String> {
    if let Some(data) = &payload.data {
        return Ok(data.clone());
    }
    if let Some(path) = &payload.file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read payload file: {}", path.display()));
    }
    Ok(sample().to_string())
}

fn finish_action(
    app: &App,
    presenter: &ResponsePresenter,
    outcome: Result<RequestResult, ApiError>,
    save_to: Option<&Path>,
) -> Result<bool> {
    if let Ok(result) = &outcome {
        if app.format.is_machine_readable() {
            println!("{}", app.formatter().format_request(result));
        }
    }

    if let Some(path) = save_to {
        let body = presenter
            .last()
            .or_else(|| outcome.as_ref().ok().map(|r| r.data.pretty()));
        match body {
            Some(body) => output::save_response(&body, path)?,
            None => warn!("No response to save"),
        }
    }

    Ok(outcome.is_ok())
}

async fn run_suite(app: &App, args: cli::SuiteArgs) -> Result<bool> {
    let presenter = app.presenter();
    let ctx = app.context(&presenter)?;
    let delay_ms = args.delay_ms.unwrap_or(app.resolved.suite_delay_ms);

    let summary = actions::run_default_suite(&ctx, delay_ms).await;
    println!("{}", app.formatter().format_summary(&summary));

    if let Some(path) = &args.output {
        let format = ExportFormat::from_extension(path).unwrap_or(ExportFormat::Json);
        output::export_summary(&summary, path, format)?;
        ctx.notifier.success(&format!("Results exported to {}", path.display()));
    }

    Ok(summary.is_all_passed())
}

async fn login(app: &App, args: cli::LoginArgs) -> Result<bool> {
    let notifier = app.notifier();

    if args.mock {
        let login = auth::mock_login(&args.email);
        notifier.success(&format!("Mock login successful: {}", login.user.email));
        notifier.warning("Mock tokens are only accepted by backends running in test mode");
        if app.format.is_machine_readable() {
            let body = serde_json::json!({ "user": login.user, "token": login.token });
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            println!("{}", login.token);
        }
        return Ok(true);
    }

    let password = args.password.as_deref().unwrap_or_default();
    let identity = &app.resolved.identity;
    let client = match (&identity.endpoint, &identity.api_key) {
        (Some(endpoint), _) => auth::IdentityClient::with_endpoint(endpoint, app.resolved.timeout_secs),
        (None, Some(key)) => auth::IdentityClient::new(key, app.resolved.timeout_secs),
        (None, None) => auth::IdentityClient::new("", app.resolved.timeout_secs),
    };

    let result = match client {
        Ok(client) => client.sign_in(&args.email, password).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(signed_in) => {
            notifier.success(&format!("Logged in as {}", signed_in.email));
            if app.format.is_machine_readable() {
                println!("{}", serde_json::to_string_pretty(&signed_in)?);
            } else {
                println!("{}", signed_in.id_token);
            }
            Ok(true)
        }
        Err(e) => {
            notifier.error(&e.user_message());
            Ok(false)
        }
    }
}

fn list_endpoints(app: &App, detailed: bool) {
    println!("\nLokatani Backend Endpoints ({} total)\n", Endpoint::all().len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut current_category = "";
    for endpoint in Endpoint::all() {
        let category = endpoint.category();
        if category != current_category {
            println!("\n{category}:");
            println!("──────────────────────────────────────────────────────────────────────");
            current_category = category;
        }

        if detailed {
            let auth = endpoint.auth_mode(app.resolved.telemetry_auth);
            println!(
                "  {}. {:22} {:5} {:28} [{}]",
                endpoint.number(),
                endpoint.name(),
                endpoint.method().as_str(),
                endpoint.path_template(),
                match endpoint.auth_label() {
                    "telemetry" => format!("telemetry: {auth}"),
                    label => label.to_string(),
                }
            );
        } else {
            println!("  {}. {}", endpoint.number(), endpoint.name());
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

fn manage_config(app: &App, action: ConfigAction) -> Result<bool> {
    let notifier = app.notifier();
    let configuration = &app.resolved.configuration;

    match action {
        ConfigAction::Show { env } => {
            if env {
                let env = EnvConfig::load();
                if !env.has_any() {
                    notifier.info("No LOKATANI_TESTER_* variables are set");
                }
                env.print_summary();
                println!();
                config::print_env_help();
                return Ok(true);
            }

            let shown = serde_json::json!({
                "baseUrl": configuration.base_url(),
                "hasApiKey": !configuration.api_key().is_empty(),
                "hasFirebaseToken": !configuration.token().is_empty(),
                "telemetryAuth": app.resolved.telemetry_auth.name(),
                "timeoutSecs": app.resolved.timeout_secs,
                "suiteDelayMs": app.resolved.suite_delay_ms,
                "settingsFile": app.settings_path.as_ref().map(|p| p.display().to_string()),
                "savedRecord": app.store.config_path().display().to_string(),
            });
            let output = if app.format.is_machine_readable() {
                serde_json::to_string_pretty(&shown)?
            } else {
                serde_yaml::to_string(&shown)?
            };
            println!("{output}");
            Ok(true)
        }

        ConfigAction::SetUrl { url } => {
            if let Err(e) = config::validate_url(&url, "Base URL") {
                notifier.error(&e.to_string());
                return Ok(false);
            }
            if app.store.save_base_url(&url) {
                notifier.success("Configuration saved");
                Ok(true)
            } else {
                notifier.error("Failed to save configuration");
                Ok(false)
            }
        }

        ConfigAction::Validate => {
            let validations = configuration.validate_all();
            if app.format.is_machine_readable() {
                println!("{}", serde_json::to_string_pretty(&validations)?);
            } else {
                println!("\nConfiguration Validation:");
                for v in &validations {
                    println!("  {} {:14} {}", v.status.symbol(), v.field, v.message);
                }
                println!();
            }
            let base_ok = configuration.validate();
            if base_ok {
                notifier.success("Configuration is valid");
            } else {
                notifier.error("Configuration is invalid");
            }
            Ok(validations
                .iter()
                .all(|v| v.status != FieldStatus::Invalid)
                && base_ok)
        }

        ConfigAction::Export => {
            println!("{}", serde_json::to_string_pretty(&configuration.export())?);
            Ok(true)
        }

        ConfigAction::Clear => {
            if app.store.clear()? {
                notifier.success("Saved configuration cleared");
            } else {
                notifier.info("No saved configuration to clear");
            }
            Ok(true)
        }

        ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Settings file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }
            Settings::default().save(&output)?;
            notifier.success(&format!("Settings file created: {}", output.display()));
            Ok(true)
        }
    }
}
