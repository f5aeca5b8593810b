use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::commands::{
    CreateOptions, DEFAULT_PAGE, SEARCH_LIMIT, cmd_config_path, cmd_config_set, cmd_config_show,
    cmd_create, cmd_delete, cmd_last, cmd_list, cmd_search, cmd_show, cmd_timesince,
};

#[derive(Parser)]
#[command(name = "etu")]
#[command(about = "A personal command line journal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a new entry (reads stdin when piped, otherwise opens a composer)
    #[command(visible_alias = "c")]
    Create {
        /// Attach an image (repeatable)
        #[arg(long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,

        /// Attach an audio recording (repeatable)
        #[arg(long = "audio", value_name = "PATH")]
        audio: Vec<PathBuf>,

        /// Tag the entry yourself instead of asking for suggestions (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Skip tag suggestions
        #[arg(long, conflicts_with = "tags")]
        no_tags: bool,
    },

    /// Delete an entry
    Delete {
        /// Entry ID (omit to pick interactively)
        id: Option<String>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Browse recent entries
    #[command(visible_alias = "ls")]
    List {
        /// Number of entries to load
        #[arg(short = 'n', long, default_value_t = DEFAULT_PAGE)]
        limit: usize,
    },

    /// Search entries
    Search {
        /// Search text (pre-fills the search box when interactive)
        query: Option<String>,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value_t = SEARCH_LIMIT)]
        limit: usize,
    },

    /// Show an entry with its tags and attachments
    Show {
        /// Entry ID (omit to pick interactively)
        id: Option<String>,
    },

    /// Show the most recent entry
    Last,

    /// Print the time since the most recent entry (e.g. 5h, 3d)
    Timesince,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration (API key masked)
    Show,

    /// Set a configuration value
    Set {
        /// Key to set: api_key or target
        key: String,
        /// New value
        value: String,
    },

    /// Print the config file path
    Path,
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> crate::error::Result<()> {
        match self {
            Commands::Create {
                images,
                audio,
                tags,
                no_tags,
            } => {
                cmd_create(CreateOptions {
                    images,
                    audio,
                    tags,
                    no_tags,
                })
                .await
            }
            Commands::Delete { id, yes } => cmd_delete(id, yes).await,
            Commands::List { limit } => cmd_list(limit).await,
            Commands::Search { query, limit } => cmd_search(query, limit).await,
            Commands::Show { id } => cmd_show(id).await,
            Commands::Last => cmd_last().await,
            Commands::Timesince => cmd_timesince().await,
            Commands::Config { action } => match action {
                ConfigAction::Show => cmd_config_show(),
                ConfigAction::Set { key, value } => cmd_config_set(&key, &value),
                ConfigAction::Path => cmd_config_path(),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }

    /// Whether the command talks to the journal store.
    pub fn needs_config_file(&self) -> bool {
        !matches!(self, Commands::Completions { .. })
    }
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "etu", &mut io::stdout());
}
