use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{BrowserError, Result};

/// dirview - browse a directory tree with recursive sizes
#[derive(Parser, Debug)]
#[command(name = "dirview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The directory to start in (defaults to the home directory)
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Draw plain markers instead of per-type icons
    #[arg(short = 'c', long)]
    pub no_custom_icons: bool,

    /// Don't refresh the view when the filesystem changes
    #[arg(short = 'w', long)]
    pub no_watch: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", env = "DIRVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the directory's children with sizes and exit
    #[arg(short, long)]
    pub list: bool,

    /// Output the listing as JSON (implies --list)
    #[arg(long)]
    pub json: bool,

    /// Only show entries whose name contains this text
    #[arg(short, long, value_name = "TEXT", default_value = "")]
    pub filter: String,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

/// Effective view options after merging CLI flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub custom_icons: bool,
    pub watch: bool,
}

impl Cli {
    /// The starting directory: the positional argument or the home directory.
    pub fn root(&self) -> Result<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir().ok_or(BrowserError::NoHomeDir),
        }
    }

    pub fn list_mode(&self) -> bool {
        self.list || self.json
    }

    pub fn view_options(&self, config: &Config) -> ViewOptions {
        ViewOptions {
            custom_icons: config.tui.custom_icons && !self.no_custom_icons,
            watch: config.tui.watch && !self.no_watch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Validates the CLI definition is correct
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_positional_directory() {
        let cli = Cli::parse_from(["dirview", "/srv/data"]);
        assert_eq!(cli.directory, Some(PathBuf::from("/srv/data")));
        assert_eq!(cli.root().unwrap(), PathBuf::from("/srv/data"));
        assert!(!cli.list_mode());
    }

    #[test]
    fn parse_short_view_flags() {
        let cli = Cli::parse_from(["dirview", "-c", "-w"]);
        assert!(cli.no_custom_icons);
        assert!(cli.no_watch);
        assert!(cli.directory.is_none());

        let options = cli.view_options(&Config::default());
        assert!(!options.custom_icons);
        assert!(!options.watch);
    }

    #[test]
    fn config_can_disable_what_flags_leave_on() {
        let cli = Cli::parse_from(["dirview"]);
        let mut config = Config::default();
        config.tui.watch = false;

        let options = cli.view_options(&config);
        assert!(options.custom_icons);
        assert!(!options.watch);
    }

    #[test]
    fn json_implies_list() {
        let cli = Cli::parse_from(["dirview", "--json", "--filter", "log", "."]);
        assert!(cli.list_mode());
        assert_eq!(cli.filter, "log");
    }

    #[test]
    fn verbose_counts() {
        let cli = Cli::parse_from(["dirview", "-vvv"]);
        assert_eq!(cli.verbose, 3);
    }
}
