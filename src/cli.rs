//! CLI definitions for SitePilot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SitePilot CLI.
#[derive(Parser)]
#[command(name = "sitepilot")]
#[command(about = "Desktop agent that opens websites through Spotlight and serves scraped pages as JSON")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults apply when it does not exist)
    #[arg(short, long, default_value = "config/sitepilot.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Server host, overrides [server].host
        #[arg(long)]
        host: Option<String>,

        /// Server port, overrides [server].port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Resolve a website and navigate to it in the foreground
    Navigate {
        /// Website, URL or natural-language request
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Print the website resolved from a request without navigating
    Extract {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Print one overlay detection and time one open of the overlay
    Detect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_no_command() {
        let cli = Cli::try_parse_from(["sitepilot"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config/sitepilot.toml"));
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["sitepilot", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(host, None);
                assert_eq!(port, Some(8080));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_navigate_joins_words() {
        let cli =
            Cli::try_parse_from(["sitepilot", "-c", "my.toml", "navigate", "go", "to", "github"])
                .unwrap();
        assert_eq!(cli.config, PathBuf::from("my.toml"));
        match cli.command {
            Some(Commands::Navigate { text }) => assert_eq!(text.join(" "), "go to github"),
            _ => panic!("expected navigate"),
        }
    }

    #[test]
    fn test_extract_requires_text() {
        assert!(Cli::try_parse_from(["sitepilot", "extract"]).is_err());
    }
}
