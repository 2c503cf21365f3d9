//! Command-line surface of the `ewtools` binary.
//!
//! Each subcommand is thin glue: load config, call one service, turn the
//! outcome into an exit code. All behaviour lives in [`crate::services`].

use crate::config::ConfigManager;
use crate::error::ToolError;
use crate::models::{Edition, Platform, ToolsConfig, TrelloBoard};
use crate::paths::expand_home;
use crate::services::environment::current_env;
use crate::services::{
    HoudiniLauncher, InstallationResolver, LaunchOptions, NewCard, ProjectLayout, ScreenshotSync,
    SecretStore, TrelloClient, WaypointSync,
};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Launch and housekeeping tools for DCC, screenshot and game workflows.
#[derive(Parser, Debug)]
#[command(name = "ewtools", version, about)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding ewtools.yaml (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config_dir: Option<Utf8PathBuf>,

    /// Directory for rotating log files
    #[arg(long, global = true)]
    pub log_dir: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch Houdini for a project
    Houdini(HoudiniArgs),

    /// Print the path of a Houdini installation
    HoudiniPath(HoudiniPathArgs),

    /// Timestamp and upload this machine's screenshots
    SyncScreenshots,

    /// Pull shared waypoints into a Minecraft instance before launch
    McPrelaunch,

    /// Push multiplayer waypoints to the shared store after exit
    McPostexit,

    /// Manage Trello cards
    #[command(subcommand)]
    Trello(TrelloCommands),

    /// Write a default ewtools.yaml if none exists
    InitConfig,
}

#[derive(Args, Debug)]
pub struct HoudiniArgs {
    /// Houdini type
    #[arg(short = 't', long = "type", value_enum, default_value_t = Edition::Apprentice)]
    pub edition: Edition,

    /// Name of the project to open or create. May also be a direct path
    #[arg(short, long)]
    pub project: String,

    /// Name of the sub-project to open
    #[arg(long = "sub-project", visible_alias = "sp")]
    pub sub_project: Option<String>,

    /// Houdini version to use. Defaults to latest
    #[arg(long)]
    pub hou_version: Option<String>,

    /// Disables setting $JOB and the default save name
    #[arg(long)]
    pub no_project_env: bool,

    /// Use CPU compute for OpenCL
    #[arg(long)]
    pub cpu: bool,

    /// Forces Houdini to dump its core
    #[arg(long)]
    pub dump_core: bool,
}

#[derive(Args, Debug)]
pub struct HoudiniPathArgs {
    /// Houdini version. Defaults to latest
    #[arg(long)]
    pub hou_version: Option<String>,

    /// Houdini base path
    #[arg(short, long)]
    pub base_path: Option<Utf8PathBuf>,

    /// Allow paths that do not exist
    #[arg(long)]
    pub not_exists_ok: bool,
}

#[derive(Subcommand, Debug)]
pub enum TrelloCommands {
    /// List every card on a board
    ListCards {
        #[arg(long, default_value = "personal-tasks")]
        board: String,
    },

    /// Create a card and print its id
    CreateCard {
        #[arg(long, default_value = "personal-tasks")]
        board: String,

        /// List name on the board
        #[arg(long, default_value = "To Do")]
        list: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// Tag names on the board (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,

        #[arg(long, default_value = "top")]
        position: String,
    },

    /// Attach a URL to a card
    Attach {
        #[arg(long)]
        card: String,

        #[arg(long)]
        url: Option<String>,
    },
}

/// Run the parsed command.
///
/// # Returns
/// The process exit code: 0 on success, 1 on a recognized failure, or
/// Houdini's own exit code for `houdini`.
pub async fn run(cli: Cli) -> Result<i32> {
    let manager = match &cli.config_dir {
        Some(dir) => ConfigManager::new(dir)?,
        None => ConfigManager::default_location()?,
    };

    if let Commands::InitConfig = cli.command {
        if manager.write_default_if_missing()? {
            println!("{}", manager.config_path());
        } else {
            tracing::info!("Config already exists at {}", manager.config_path());
        }
        return Ok(0);
    }

    let config = manager.load()?;

    match cli.command {
        Commands::Houdini(args) => run_houdini(&config, args).await,
        Commands::HoudiniPath(args) => run_houdini_path(&config, args),
        Commands::SyncScreenshots => run_sync_screenshots(&config).await,
        Commands::McPrelaunch => {
            tracing::info!("Executing pre-launch tasks for Minecraft");
            waypoint_sync(&config)?.prelaunch()?;
            Ok(0)
        }
        Commands::McPostexit => {
            tracing::info!("Executing post-exit tasks for Minecraft");
            waypoint_sync(&config)?.postexit()?;
            Ok(0)
        }
        Commands::Trello(command) => run_trello(&config, command).await,
        Commands::InitConfig => Ok(0),
    }
}

async fn run_houdini(config: &ToolsConfig, args: HoudiniArgs) -> Result<i32> {
    let resolver = InstallationResolver::new(Platform::current()?);
    let Some(installation) = resolver.resolve(
        args.hou_version.as_deref(),
        config.houdini.install_base.as_deref(),
        false,
    )?
    else {
        tracing::error!("Could not find Houdini installation");
        return Ok(1);
    };
    tracing::info!(
        "Selected Houdini {} from {}",
        resolver
            .installation_version(&installation)
            .unwrap_or_default(),
        installation
    );

    let projects_dir = expand_home(&config.houdini.projects_dir)?;
    let project = ProjectLayout::new(&projects_dir, &args.project, args.sub_project.as_deref());
    tracing::info!("Opening project from: {}", project.path);
    project
        .ensure_exists()
        .with_context(|| format!("Failed to create project directory: {}", project.path))?;

    let options = LaunchOptions {
        edition: args.edition,
        no_project_env: args.no_project_env,
        cpu: args.cpu,
        dump_core: args.dump_core,
    };
    let baseline = current_env();
    let launcher = HoudiniLauncher::new(config.houdini.environment.clone());
    let plan = launcher.plan(&installation, &project, &options, &baseline);
    launcher.log_environment_changes(&plan, &baseline);

    Ok(launcher.launch(&plan).await?)
}

fn run_houdini_path(config: &ToolsConfig, args: HoudiniPathArgs) -> Result<i32> {
    let resolver = InstallationResolver::new(Platform::current()?);
    let base_path = args
        .base_path
        .as_deref()
        .or(config.houdini.install_base.as_deref());

    match resolver.resolve(args.hou_version.as_deref(), base_path, args.not_exists_ok)? {
        Some(path) => {
            println!("{}", path);
            Ok(0)
        }
        None => {
            tracing::error!("Could not find Houdini");
            Ok(1)
        }
    }
}

async fn run_sync_screenshots(config: &ToolsConfig) -> Result<i32> {
    let hostname = hostname::get()
        .context("Failed to read hostname")?
        .to_string_lossy()
        .into_owned();

    let sync = ScreenshotSync::new(&config.screenshots);
    let report = sync.run(&hostname).await?;
    tracing::info!(
        "Screenshot sync complete: {} timestamped, {} already tagged, {} skipped",
        report.updated.len(),
        report.untouched,
        report.skipped
    );
    Ok(0)
}

fn waypoint_sync(config: &ToolsConfig) -> Result<WaypointSync> {
    let global_dir = expand_home(&config.minecraft.global_waypoint_dir)?;
    let sync = WaypointSync::from_env(global_dir)?;
    tracing::info!("Minecraft waypoints: {}", sync.instance_waypoints());
    Ok(sync)
}

fn trello_client(config: &ToolsConfig) -> Result<TrelloClient> {
    if config.trello.api_key.is_empty() {
        return Err(ToolError::Configuration("trello.api_key is not set".to_string()).into());
    }

    let secrets = match &config.secrets_dir {
        Some(dir) => SecretStore::new(expand_home(dir)?),
        None => SecretStore::default_location()?,
    };
    let token = secrets.get(&config.trello.token_secret, None)?;

    Ok(TrelloClient::new(config.trello.api_key.clone(), token))
}

fn board<'a>(config: &'a ToolsConfig, name: &str) -> Result<&'a TrelloBoard> {
    config
        .trello
        .boards
        .get(name)
        .ok_or_else(|| ToolError::NotFound(format!("Trello board {}", name)).into())
}

async fn run_trello(config: &ToolsConfig, command: TrelloCommands) -> Result<i32> {
    let client = trello_client(config)?;

    match command {
        TrelloCommands::ListCards { board: board_name } => {
            let board = board(config, &board_name)?;
            for card in client.list_cards(&board.id).await? {
                println!("{}\t{}", card.id, card.name);
            }
        }
        TrelloCommands::CreateCard {
            board: board_name,
            list,
            name,
            description,
            labels,
            position,
        } => {
            let board = board(config, &board_name)?;
            let list_id = board
                .list_id(&list)
                .ok_or_else(|| ToolError::NotFound(format!("list {} on {}", list, board_name)))?;
            let label_ids = labels
                .iter()
                .map(|label| {
                    board
                        .tag_id(label)
                        .map(str::to_string)
                        .ok_or_else(|| ToolError::NotFound(format!("tag {} on {}", label, board_name)))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let card = NewCard {
                description,
                label_ids,
                position,
                ..NewCard::new(list_id, name)
            };
            println!("{}", client.create_card(&card).await?);
        }
        TrelloCommands::Attach { card, url } => {
            client.add_attachment(&card, url.as_deref()).await?;
        }
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_houdini_defaults() {
        let cli = Cli::try_parse_from(["ewtools", "houdini", "-p", "demo"]).unwrap();
        match cli.command {
            Commands::Houdini(args) => {
                assert_eq!(args.edition, Edition::Apprentice);
                assert_eq!(args.project, "demo");
                assert!(!args.no_project_env);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_houdini_flags() {
        let cli = Cli::try_parse_from([
            "ewtools", "-v", "houdini", "-t", "fx", "-p", "demo", "--sp", "shot010", "--cpu",
            "--no-project-env",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Houdini(args) => {
                assert_eq!(args.edition, Edition::Fx);
                assert_eq!(args.sub_project.as_deref(), Some("shot010"));
                assert!(args.cpu);
                assert!(args.no_project_env);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_edition_rejected() {
        assert!(Cli::try_parse_from(["ewtools", "houdini", "-t", "education", "-p", "x"]).is_err());
    }

    #[test]
    fn test_global_directories() {
        let cli = Cli::try_parse_from([
            "ewtools", "mc-prelaunch", "--config-dir", "/tmp/ewtools", "--log-dir", "/tmp/logs",
        ])
        .unwrap();
        assert_eq!(cli.config_dir, Some(Utf8PathBuf::from("/tmp/ewtools")));
        assert_eq!(cli.log_dir, Some(Utf8PathBuf::from("/tmp/logs")));
        assert!(matches!(cli.command, Commands::McPrelaunch));
    }

    #[test]
    fn test_project_required() {
        assert!(Cli::try_parse_from(["ewtools", "houdini"]).is_err());
    }
}
