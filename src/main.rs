use anyhow::Result;
use clap::builder::NonEmptyStringValueParser;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use ccc::{
    activation::ActivationTarget,
    commands, logging,
    paths::Paths,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "ccc")]
#[command(about = "CCC - Claude Code Configuration Manager")]
#[command(version)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Use this config file instead of ccc-config.json next to the executable
    #[arg(long, global = true, value_name = "PATH", env = "CCC_CONFIG")]
    config: Option<PathBuf>,

    /// Print diagnostic logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all configurations
    #[command(visible_alias = "ls")]
    List,

    /// Add a new configuration
    Add {
        /// Configuration name
        #[arg(short = 'n', long, value_parser = NonEmptyStringValueParser::new())]
        name: String,

        /// Base URL for the API
        #[arg(short = 'u', long = "base-url", value_parser = NonEmptyStringValueParser::new())]
        base_url: String,

        /// API key (prompted for when omitted on a terminal)
        #[arg(short = 'k', long = "api-key")]
        api_key: Option<String>,
    },

    /// Update an existing configuration
    Update {
        /// Configuration name
        #[arg(short = 'n', long, value_parser = NonEmptyStringValueParser::new())]
        name: String,

        /// New base URL for the API
        #[arg(short = 'u', long = "base-url")]
        base_url: Option<String>,

        /// New API key
        #[arg(short = 'k', long = "api-key")]
        api_key: Option<String>,
    },

    /// Delete a configuration
    Delete {
        /// Configuration name
        #[arg(short = 'n', long, value_parser = NonEmptyStringValueParser::new())]
        name: String,
    },

    /// Activate a configuration and apply its settings
    Activate {
        /// Configuration name
        #[arg(short = 'n', long, value_parser = NonEmptyStringValueParser::new())]
        name: String,
    },

    /// Show the active configuration
    Current,

    /// Run diagnostics on the ccc setup
    Doctor,

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "ccc", &mut std::io::stdout());
        return Ok(());
    }

    let ui = Ui::new(cli.color, cli.no_color);
    let paths = Paths::new(cli.config)?;
    let target = ActivationTarget::detect(&paths);

    match cli.command {
        Commands::List => commands::list(&paths, &target, &ui),
        Commands::Add {
            name,
            base_url,
            api_key,
        } => commands::add(&paths, &target, &name, &base_url, api_key, &ui),
        Commands::Update {
            name,
            base_url,
            api_key,
        } => commands::update(
            &paths,
            &target,
            &name,
            base_url.as_deref(),
            api_key.as_deref(),
            &ui,
        ),
        Commands::Delete { name } => commands::delete(&paths, &target, &name, &ui),
        Commands::Activate { name } => commands::activate(&paths, &target, &name, &ui),
        Commands::Current => commands::current(&paths, &target, &ui),
        Commands::Doctor => commands::doctor(&paths, &target, &ui),
        Commands::Completions { .. } => Ok(()),
    }
}
