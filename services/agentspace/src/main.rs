//! AgentSpace Admin - Standalone Binary
//!
//! Pre-flight configuration checks and IAM setup for the AgentSpace
//! integration of the SOC agent.
//!
//! ## Usage
//!
//! ```bash
//! # Check deployment configuration in .env
//! agentspace-admin env check --profile deploy --path-var CHRONICLE_SERVICE_ACCOUNT_PATH
//!
//! # Preview, then apply, the service agent role bindings
//! agentspace-admin iam setup --dry-run
//! agentspace-admin iam setup
//!
//! # Confirm everything is in place
//! agentspace-admin iam verify
//!
//! # List deployed agents
//! agentspace-admin agent-engine list
//! ```

use agentspace_admin::agents::agent_engine::{PageLimits, ReasoningEngineClient};
use agentspace_admin::agents::env_config::report::truncate;
use agentspace_admin::agents::env_config::{
    check, format_report, validate, EnvFile, EnvSnapshot, AGENTSPACE_REQUIRED_VARS,
    DEPLOY_REQUIRED_VARS, IAM_REQUIRED_VARS,
};
use agentspace_admin::agents::iam::{
    agentspace_requirements, known_service, IamReconciler, ReconciliationResult,
    ResourceManagerClient,
};
use agentspace_admin::tools::TokenProvider;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Values longer than this are shortened in `status`
const STATUS_VALUE_WIDTH: usize = 60;

/// Variables shown by `status`
const STATUS_VARS: &[&str] = &[
    "GCP_PROJECT_ID",
    "GCP_PROJECT_NUMBER",
    "GCP_LOCATION",
    "GCP_STAGING_BUCKET",
    "RAG_CORPUS_ID",
    "AGENT_ENGINE_RESOURCE_NAME",
    "AGENTSPACE_APP_ID",
];

/// AgentSpace Admin - configuration checks and IAM setup for AgentSpace
#[derive(Parser, Debug)]
#[command(name = "agentspace-admin", version, about)]
struct Cli {
    /// Path to the .env file
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect or edit the .env configuration
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
    /// Service agent role bindings
    Iam(IamArgs),
    /// Vertex AI Agent Engine
    AgentEngine(AgentEngineArgs),
    /// Show key configuration values
    Status,
}

#[derive(Subcommand, Debug)]
enum EnvCommands {
    /// Validate required variables
    Check {
        /// Variable set to require
        #[arg(long, value_enum, default_value = "deploy")]
        profile: Profile,

        /// Additional required variables (can be repeated)
        #[arg(long)]
        require: Vec<String>,

        /// Variables holding file paths that must exist (can be repeated)
        #[arg(long)]
        path_var: Vec<String>,
    },
    /// Set a variable in the .env file
    Set { key: String, value: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Profile {
    /// Agent engine deployment
    Deploy,
    /// AgentSpace registration
    Agentspace,
    /// IAM setup and verification
    Iam,
}

impl Profile {
    fn required_vars(self) -> &'static [&'static str] {
        match self {
            Profile::Deploy => DEPLOY_REQUIRED_VARS,
            Profile::Agentspace => AGENTSPACE_REQUIRED_VARS,
            Profile::Iam => IAM_REQUIRED_VARS,
        }
    }
}

#[derive(clap::Args, Debug)]
struct GcpArgs {
    /// GCP Project ID (overrides GCP_PROJECT_ID from the .env file)
    #[arg(long)]
    project_id: Option<String>,

    /// OAuth access token (defaults to Application Default Credentials)
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

#[derive(clap::Args, Debug)]
struct IamArgs {
    #[command(flatten)]
    gcp: GcpArgs,

    /// GCP Project number, used in service agent emails (overrides .env)
    #[arg(long)]
    project_number: Option<String>,

    #[command(subcommand)]
    command: IamCommands,
}

#[derive(Subcommand, Debug)]
enum IamCommands {
    /// Grant every missing binding AgentSpace needs
    Setup {
        /// Show what would change without applying it
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
    /// Check that every required binding exists
    Verify,
    /// List roles currently held by a service agent
    ListRoles {
        /// Service identifier (aiplatform-re, discoveryengine)
        service: String,
    },
    /// Remove a role from a service agent
    Revoke {
        service: String,
        role: String,

        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(clap::Args, Debug)]
struct AgentEngineArgs {
    #[command(flatten)]
    gcp: GcpArgs,

    /// GCP region of the agent engine (overrides .env)
    #[arg(long)]
    location: Option<String>,

    #[command(subcommand)]
    command: AgentEngineCommands,
}

#[derive(Subcommand, Debug)]
enum AgentEngineCommands {
    /// List deployed reasoning engines
    List {
        /// Results requested per page
        #[arg(long, default_value_t = 100)]
        page_size: u32,

        /// Stop after this many pages
        #[arg(long, default_value_t = 50)]
        max_pages: u32,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when set
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let env_file = EnvFile::new(&cli.env_file);
    let ok = match cli.command {
        Commands::Env { command } => run_env(&env_file, command)?,
        Commands::Iam(args) => run_iam(&env_file, args, cli.verbose).await?,
        Commands::AgentEngine(args) => run_agent_engine(&env_file, args).await?,
        Commands::Status => run_status(&env_file)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn run_env(env_file: &EnvFile, command: EnvCommands) -> Result<bool> {
    match command {
        EnvCommands::Check {
            profile,
            require,
            path_var,
        } => {
            let env = env_file.snapshot()?;

            let mut required: Vec<&str> = profile.required_vars().to_vec();
            for var in &require {
                if !required.contains(&var.as_str()) {
                    required.push(var.as_str());
                }
            }

            let path_vars: Vec<&str> = path_var.iter().map(String::as_str).collect();
            let outcome = check(&required, &path_vars, &env);
            if outcome.all_valid {
                println!(
                    "{} {} required variables are set",
                    "✓".green(),
                    required.len()
                );
                Ok(true)
            } else {
                eprintln!("{}", format_report(&outcome.findings));
                Ok(false)
            }
        }
        EnvCommands::Set { key, value } => {
            env_file.update(&key, &value)?;
            println!(
                "{} Set {} in {}",
                "✓".green(),
                key.bold(),
                env_file.path().display()
            );
            Ok(true)
        }
    }
}

/// Explicit command-line flags win over the `.env` snapshot; nothing else does
fn with_flag_overrides(mut env: EnvSnapshot, flags: &[(&str, &Option<String>)]) -> EnvSnapshot {
    for (var, value) in flags {
        if let Some(value) = value {
            env.insert(var.to_string(), value.clone());
        }
    }
    env
}

async fn run_iam(env_file: &EnvFile, args: IamArgs, verbose: bool) -> Result<bool> {
    let env = with_flag_overrides(
        env_file.snapshot()?,
        &[
            ("GCP_PROJECT_ID", &args.gcp.project_id),
            ("GCP_PROJECT_NUMBER", &args.project_number),
        ],
    );

    let outcome = validate(IAM_REQUIRED_VARS, &env);
    if !outcome.all_valid {
        eprintln!("{}", format_report(&outcome.findings));
        return Ok(false);
    }

    let project_id = &env["GCP_PROJECT_ID"];
    let project_number = &env["GCP_PROJECT_NUMBER"];

    info!(
        project_id = %project_id,
        project_number = %project_number,
        "Starting IAM agent"
    );

    let tokens = TokenProvider::from_option(args.gcp.access_token);
    let client = ResourceManagerClient::new(tokens).context("Failed to create IAM client")?;
    let reconciler = IamReconciler::new(client, project_id, project_number);
    let requirements = agentspace_requirements();

    match args.command {
        IamCommands::Setup { dry_run, output } => {
            let result = reconciler.reconcile(&requirements, dry_run, verbose).await;
            match output {
                OutputFormat::Text => print_reconciliation(&result, dry_run),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("Failed to serialize result")?
                ),
            }
            Ok(result.is_success())
        }
        IamCommands::Verify => {
            let report = reconciler
                .verify(&requirements)
                .await
                .context("Failed to verify IAM bindings")?;

            println!("IAM permissions for project {}:", project_id.bold());
            for entry in &report.entries {
                let mark = if entry.granted {
                    "✓".green()
                } else {
                    "✗".red()
                };
                println!("  {} {}", mark, entry.label);
            }

            if report.all_granted() {
                println!("\n{}", "All required permissions are configured".green());
            } else {
                println!(
                    "\n{} Run 'agentspace-admin iam setup' to grant missing permissions",
                    "Missing permissions.".red().bold()
                );
            }
            Ok(report.all_granted())
        }
        IamCommands::ListRoles { service } => {
            let name = known_service(&service).ok_or_else(|| {
                anyhow!(
                    "Unknown service: {} (expected aiplatform-re or discoveryengine)",
                    service
                )
            })?;
            let roles = reconciler
                .list_roles_for_service(&service)
                .await
                .context("Failed to list roles")?;

            println!("{} ({})", name.bold(), reconciler.service_account_email(&service));
            if roles.is_empty() {
                println!("  (no roles)");
            }
            for role in roles {
                println!("  - {}", role);
            }
            Ok(true)
        }
        IamCommands::Revoke {
            service,
            role,
            dry_run,
        } => {
            if known_service(&service).is_none() {
                warn!(service = %service, "Not a known AgentSpace service agent");
            }
            let member = reconciler.service_account_member(&service);
            let removed = reconciler
                .remove_binding(&member, &role, dry_run)
                .await
                .context("Failed to revoke role")?;

            let verb = if dry_run { "Would remove" } else { "Removed" };
            if removed {
                println!("{} {} {} from {}", "✓".green(), verb, role, member);
            } else {
                println!("{} {} is not bound to {}", "-".dimmed(), role, member);
            }
            Ok(true)
        }
    }
}

fn print_reconciliation(result: &ReconciliationResult, dry_run: bool) {
    let added_heading = if dry_run { "Would add" } else { "Added" };

    if !result.added.is_empty() {
        println!("{}:", added_heading.green().bold());
        for label in &result.added {
            println!("  + {}", label);
        }
    }
    if !result.existing.is_empty() {
        println!("{}:", "Already configured".bold());
        for label in &result.existing {
            println!("  = {}", label);
        }
    }
    if !result.failed.is_empty() {
        println!("{}:", "Failed".red().bold());
        for entry in &result.failed {
            println!("  ! {}", entry);
        }
    }

    if result.is_success() {
        if dry_run && !result.added.is_empty() {
            println!("\nDry run: no changes were made. Re-run without --dry-run to apply.");
        } else {
            println!("\n{}", "IAM setup complete".green());
        }
    }
}

async fn run_agent_engine(env_file: &EnvFile, args: AgentEngineArgs) -> Result<bool> {
    let env = with_flag_overrides(
        env_file.snapshot()?,
        &[
            ("GCP_PROJECT_ID", &args.gcp.project_id),
            ("GCP_LOCATION", &args.location),
        ],
    );
    let lookup = |var: &str| {
        env.get(var)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| anyhow!("{} is not set in {}", var, env_file.path().display()))
    };
    let project_id = lookup("GCP_PROJECT_ID")?;
    let location = lookup("GCP_LOCATION")?;

    let tokens = TokenProvider::from_option(args.gcp.access_token);
    let client = ReasoningEngineClient::new(&project_id, &location, tokens)?;

    match args.command {
        AgentEngineCommands::List {
            page_size,
            max_pages,
        } => {
            let paged = client
                .list(PageLimits {
                    page_size,
                    max_pages,
                })
                .await?;

            if paged.items.is_empty() {
                println!("No reasoning engines found in {}/{}", project_id, location);
                return Ok(true);
            }

            let header = format!("{:<22} {:<30} {}", "ID", "DISPLAY NAME", "UPDATED");
            println!("{}", header.bold());
            for engine in &paged.items {
                let updated = engine
                    .update_time
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<22} {:<30} {}",
                    engine.id(),
                    truncate(&engine.display_name, 30),
                    updated
                );
            }

            if paged.truncated {
                println!(
                    "\n{} Stopped after {} pages; there may be more engines not shown",
                    "Warning:".yellow().bold(),
                    paged.pages_fetched
                );
            }
            Ok(true)
        }
    }
}

fn run_status(env_file: &EnvFile) -> Result<bool> {
    let env = env_file.snapshot()?;

    let source = if env_file.exists() {
        env_file.path().display().to_string()
    } else {
        format!("{} (not found, process environment only)", env_file.path().display())
    };
    println!("Configuration from {}\n", source.bold());

    for var in STATUS_VARS {
        match env.get(*var).filter(|v| !v.is_empty()) {
            Some(value) => println!(
                "  {} {}: {}",
                "✓".green(),
                var,
                truncate(value, STATUS_VALUE_WIDTH)
            ),
            None => println!("  {} {}: {}", "✗".red(), var, "not set".dimmed()),
        }
    }
    Ok(true)
}
