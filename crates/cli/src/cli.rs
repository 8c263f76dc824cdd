use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    docs_command, outline_command, ranges_command, refs_command, vars_command,
};

#[derive(Parser, Debug)]
#[command(name = "introspector")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Fail on the first lexical error instead of recovering
    #[arg(long, global = true)]
    pub strict: bool,

    /// Config file to use instead of searching from the file's directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the variables visible at a line
    #[command(visible_alias = "v")]
    Vars {
        /// Python file and 1-based line (e.g., app.py:12)
        location: String,
    },
    /// Show signatures and documentation of every function and class
    #[command(visible_alias = "d")]
    Docs {
        /// Python file
        filepath: String,
    },
    /// List foldable line ranges
    Ranges {
        /// Python file
        filepath: String,
    },
    /// Show the outline of functions and classes
    #[command(visible_alias = "o")]
    Outline {
        /// Python file
        filepath: String,
    },
    /// Find every use of the name under the cursor
    Refs {
        /// Python file with 1-based line and column (e.g., app.py:12:5)
        location: String,
    },
}

impl Cli {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        let options = self.options;
        match self.command {
            Commands::Vars { location } => vars_command(&location, &options),
            Commands::Docs { filepath } => docs_command(&filepath, &options),
            Commands::Ranges { filepath } => ranges_command(&filepath, &options),
            Commands::Outline { filepath } => outline_command(&filepath, &options),
            Commands::Refs { location } => refs_command(&location, &options),
        }
    }
}
