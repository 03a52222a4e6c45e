//! CLI module - command-line interface for trackarr.
//!
//! A thin profile-facing consumer of the propagation engine: it opens the
//! store, invokes one engine operation, and prints the resulting change
//! list. Cache invalidation and notifications stay with richer callers.

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};

/// trackarr - watch-status tracker for episodes, seasons and shows
#[derive(Parser)]
#[command(name = "trackarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record watch progress and propagate it through the hierarchy
    #[command(alias = "w")]
    Watch {
        #[command(subcommand)]
        command: WatchCommands,
    },

    /// Reconcile a show against content that aired since the last update
    #[command(alias = "sync")]
    Reconcile {
        /// Profile ID
        profile: i32,
        /// Show ID
        show: i32,
    },

    /// Show a profile's progress tree for one show
    #[command(alias = "p")]
    Progress {
        /// Profile ID
        profile: i32,
        /// Show ID
        show: i32,
    },

    /// Import a catalog JSON file of shows, seasons and episodes
    Import {
        /// Path to the JSON file
        path: String,
    },

    /// Manage viewing profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// List shows in the catalog
    #[command(alias = "ls", alias = "l")]
    List,
}

#[derive(Subcommand)]
pub enum WatchCommands {
    /// Set one episode's status (watched | not-watched)
    Episode {
        /// Profile ID
        profile: i32,
        /// Episode ID
        episode: i32,
        /// Target status
        status: String,
    },

    /// Set every aired episode of a season
    Season {
        /// Profile ID
        profile: i32,
        /// Season ID
        season: i32,
        /// Target status
        status: String,
    },

    /// Set every aired episode of a show
    Show {
        /// Profile ID
        profile: i32,
        /// Show ID
        show: i32,
        /// Target status
        status: String,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Create a profile
    Add {
        /// Profile name
        name: String,
    },

    /// List profiles
    #[command(alias = "ls")]
    List,
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { command } => match command {
            WatchCommands::Episode {
                profile,
                episode,
                status,
            } => commands::cmd_watch_episode(&config, profile, episode, &status).await,
            WatchCommands::Season {
                profile,
                season,
                status,
            } => commands::cmd_watch_season(&config, profile, season, &status).await,
            WatchCommands::Show {
                profile,
                show,
                status,
            } => commands::cmd_watch_show(&config, profile, show, &status).await,
        },
        Commands::Reconcile { profile, show } => {
            commands::cmd_reconcile(&config, profile, show).await
        }
        Commands::Progress { profile, show } => {
            commands::cmd_progress(&config, profile, show).await
        }
        Commands::Import { path } => commands::cmd_import(&config, &path).await,
        Commands::Profile { command } => match command {
            ProfileCommands::Add { name } => commands::cmd_profile_add(&config, &name).await,
            ProfileCommands::List => commands::cmd_profile_list(&config).await,
        },
        Commands::List => commands::cmd_list_shows(&config).await,
    }
}
