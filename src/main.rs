use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use goalplan::cli::{
    handle_export_command, handle_goal_command, handle_plan_command, handle_profile_command,
    ExportCommands, GoalCommands, PlanCommands, ProfileCommands,
};
use goalplan::config::{GoalPlanPaths, SafetyMargin, Settings};
use goalplan::models::UserId;
use goalplan::storage::Storage;

#[derive(Parser)]
#[command(
    name = "goalplan",
    author = "Kaylee Beyene",
    version,
    about = "Split your monthly surplus across savings goals",
    long_about = "goalplan takes your income, fixed costs and savings goals and works out \
                  how much to put toward each goal every month, when each one will be \
                  reached, and what changes if your situation does."
)]
struct Cli {
    /// User whose goals are planned
    #[arg(short, long, global = true, env = "GOALPLAN_USER")]
    user: Option<String>,

    /// Print diagnostic logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,

    /// Income and fixed costs
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Savings goal management
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Allocation plans and what-if simulations
    #[command(subcommand)]
    Plan(PlanCommands),

    /// Export plans to CSV, JSON or YAML
    #[command(subcommand)]
    Export(ExportCommands),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "goalplan=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Initialize paths and settings
    let paths = GoalPlanPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    settings.validate()?;

    let user_id = cli
        .user
        .map(UserId::new)
        .unwrap_or_else(|| settings.default_user.clone());

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing goalplan at: {}", paths.base_dir().display());
            goalplan::storage::initialize_storage(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  goalplan profile set --income 5000 --fixed 2000");
            println!("  goalplan goal add \"Emergency fund\" 10000 --priority 1");
            println!("  goalplan plan show");
        }
        Some(Commands::Config) => {
            println!("goalplan Configuration");
            println!("======================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Current user:          {}", user_id);
            match &settings.safety_margin {
                SafetyMargin::Fixed { amount } => {
                    println!("  Safety margin:         {} per month", amount)
                }
                SafetyMargin::Percent { percent } => {
                    println!("  Safety margin:         {}% of income", percent)
                }
            }
            println!("  Pacing (no deadline):  {} months", settings.default_pacing_months);
            println!(
                "  Comfort thresholds:    {:.0}% / {:.0}% / {:.0}%",
                settings.comfort_thresholds.excellent_below * 100.0,
                settings.comfort_thresholds.comfortable_below * 100.0,
                settings.comfort_thresholds.tight_below * 100.0
            );
        }
        Some(Commands::Profile(cmd)) => {
            handle_profile_command(&storage, &settings, &user_id, cmd)?;
        }
        Some(Commands::Goal(cmd)) => {
            handle_goal_command(&storage, &user_id, cmd)?;
        }
        Some(Commands::Plan(cmd)) => {
            handle_plan_command(&storage, &settings, &user_id, cmd)?;
        }
        Some(Commands::Export(cmd)) => {
            handle_export_command(&storage, &settings, &user_id, cmd)?;
        }
        None => {
            println!("goalplan - split your monthly surplus across savings goals");
            println!();
            println!("Run 'goalplan --help' for usage information.");
        }
    }

    Ok(())
}
