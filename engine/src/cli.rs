//! CLI interface for EduGuide
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags of the `eduguide` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EduGuide mini app tooling
///
/// Builds the data-driven pages, runs the page logic from the terminal,
/// serves result documents and runs the Telegram bot.
#[derive(Parser, Debug)]
#[command(name = "eduguide")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inject the dataset into the page templates
    BuildPages,

    /// Filter the institution directory
    Browse {
        /// Case-insensitive name search
        #[arg(short, long, default_value = "")]
        search: String,

        /// Exact location tag
        #[arg(short, long, default_value = "")]
        location: String,

        /// Show the details of one institution
        #[arg(long, value_name = "ID")]
        details: Option<i64>,
    },

    /// Project study costs for one institution
    Estimate {
        /// Institution id
        #[arg(short, long)]
        institution: i64,

        /// Scholarship percentage (0-100)
        #[arg(long)]
        scholarship: Option<u8>,

        /// Monthly living cost
        #[arg(long)]
        living: Option<u32>,

        /// Program length in years
        #[arg(long)]
        years: Option<u8>,

        /// Major name to label the estimate with
        #[arg(long)]
        category: Option<String>,

        /// Emit the share payload on stdout
        #[arg(long)]
        share: bool,
    },

    /// Score institutions for a profile and store the result
    Recommend {
        /// Profile as a JSON file path or inline JSON
        #[arg(short, long)]
        profile: String,

        /// Result id to store under (random when omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// Render a stored result
    Results {
        /// Result id
        #[arg(long)]
        id: Option<String>,

        /// Fetch from this base URL instead of the local store
        #[arg(long, value_name = "URL")]
        remote: Option<String>,
    },

    /// Serve the built pages and result documents over HTTP
    Serve {
        /// Bind address, overrides the configuration
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run the Telegram bot
    Bot,

    /// Run system diagnostics
    Doctor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["eduguide", "doctor"]);
        assert!(matches!(cli.command, Command::Doctor));
        assert!(!cli.json);
        assert!(cli.log.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["eduguide", "--json", "--log", "debug", "build-pages"]);
        assert!(cli.json);
        assert_eq!(cli.log, Some("debug".to_string()));
        assert!(matches!(cli.command, Command::BuildPages));
    }

    #[test]
    fn test_browse_defaults() {
        let cli = Cli::parse_from(["eduguide", "browse", "--location", "Phnom Penh"]);
        if let Command::Browse {
            search,
            location,
            details,
        } = cli.command
        {
            assert_eq!(search, "");
            assert_eq!(location, "Phnom Penh");
            assert!(details.is_none());
        } else {
            panic!("Expected Browse command");
        }
    }

    #[test]
    fn test_estimate_command() {
        let cli = Cli::parse_from([
            "eduguide",
            "estimate",
            "--institution",
            "3",
            "--scholarship",
            "25",
            "--share",
        ]);
        if let Command::Estimate {
            institution,
            scholarship,
            living,
            share,
            ..
        } = cli.command
        {
            assert_eq!(institution, 3);
            assert_eq!(scholarship, Some(25));
            assert!(living.is_none());
            assert!(share);
        } else {
            panic!("Expected Estimate command");
        }
    }

    #[test]
    fn test_results_command() {
        let cli = Cli::parse_from(["eduguide", "results", "--id", "abc"]);
        if let Command::Results { id, remote } = cli.command {
            assert_eq!(id.as_deref(), Some("abc"));
            assert!(remote.is_none());
        } else {
            panic!("Expected Results command");
        }
    }
}
