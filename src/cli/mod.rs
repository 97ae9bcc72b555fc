use clap::{Parser, Subcommand};

pub mod error;
pub mod handler;
pub mod output;
pub mod progress;
pub mod prompt;

/// datamgr - copy and move files and folders from the terminal
#[derive(Parser, Debug)]
#[command(name = "datamgr")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Override config directory path
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<std::path::PathBuf>,

    /// Enable verbose logging (TRACE level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to an interactive drop session)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy files or folders into a destination directory
    Copy {
        /// Files or folders to copy
        #[arg(required = true)]
        paths: Vec<String>,

        /// Destination directory (default: default location, then current directory)
        #[arg(long, short)]
        dest: Option<String>,

        /// Output the session summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move files or folders into a destination directory
    Move {
        /// Files or folders to move
        #[arg(required = true)]
        paths: Vec<String>,

        /// Destination directory (default: default location, then current directory)
        #[arg(long, short)]
        dest: Option<String>,

        /// Output the session summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: paste or drag paths one at a time
    Drop {
        /// Destination directory (default: default location, then current directory)
        #[arg(long, short)]
        dest: Option<String>,

        /// Move instead of copy
        #[arg(long = "move")]
        move_items: bool,

        /// Consecutive failures before the session stops (overrides config)
        #[arg(long)]
        max_attempts: Option<u32>,
    },

    /// Manage the default destination location
    Location {
        /// Location action
        #[command(subcommand)]
        action: LocationAction,
    },

    /// Make a timestamped copy of a directory next to it
    Backup {
        /// Directory to back up (default: default location, then current directory)
        dir: Option<String>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List directory contents
    List {
        /// Directory to list (default: default location, then current directory)
        dir: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a folder (in the current directory unless --in is given)
    Mkdir {
        /// Folder name, may be nested (e.g. photos/2024)
        name: String,

        /// Parent directory to create the folder in
        #[arg(long = "in", value_name = "DIR")]
        parent: Option<String>,

        /// Make the new folder the default location
        #[arg(long)]
        set_default: bool,
    },

    /// Manage configuration
    Config {
        /// Configuration action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Default location actions
#[derive(Subcommand, Debug)]
pub enum LocationAction {
    /// Set the default location
    Set {
        /// Existing directory
        dir: String,
    },

    /// Show the default location
    Show,

    /// List recently used locations
    Recent,

    /// Forget the default location
    Clear,

    /// Choose the default location interactively
    Pick,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., transfer.chunk_size)
        key: String,
    },

    /// Set configuration value
    Set {
        /// Configuration key (e.g., transfer.max_attempts)
        key: String,

        /// New value
        value: String,
    },

    /// Show all configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
