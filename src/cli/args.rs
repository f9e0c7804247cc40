//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// assetflow front-end asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: assetflow.toml, optional)
    #[arg(short = 'C', long, global = true, default_value = "assetflow.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands (defaults to `build`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Build all assets once into the output directory
    #[command(visible_alias = "b")]
    Build,

    /// Build, serve the output directory and rebuild on change with live reload
    #[command(visible_alias = "d")]
    Dev {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// The subcommand to run; `build` when none was named.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_build() {
        let cli = Cli::parse_from(["assetflow"]);
        assert_eq!(cli.command(), Commands::Build);
    }

    #[test]
    fn test_dev_with_port() {
        let cli = Cli::parse_from(["assetflow", "dev", "--port", "4000"]);
        assert_eq!(
            cli.command(),
            Commands::Dev {
                interface: None,
                port: Some(4000)
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["assetflow", "build", "-V", "-C", "custom.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Cli::parse_from(["assetflow", "b"]).command(), Commands::Build);
        assert!(matches!(
            Cli::parse_from(["assetflow", "d"]).command(),
            Commands::Dev { .. }
        ));
    }
}
