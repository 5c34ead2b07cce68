//! Command line definition

use crate::commands::install::InstallArgs;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "snapbind", version, about = "Set up a screenshot capture shortcut")]
pub struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/snapbind/config.yaml)
    #[arg(long, global = true, env = "SNAPBIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub install: InstallArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install packages, write the script and register the shortcut (default)
    Install(InstallArgs),
    /// Show the detected session and available tools
    Detect,
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

/// What to do, after top-level install flags are reconciled with the
/// subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Install(InstallArgs),
    Detect,
    ConfigInit { force: bool },
    ConfigShow,
}

impl Cli {
    /// Install flags given before `install` are merged into it; before any
    /// other subcommand they are an error.
    pub fn action(&self) -> Result<Action, clap::Error> {
        let top_level_flags = self.install != InstallArgs::default();
        match &self.command {
            None => Ok(Action::Install(self.install.clone())),
            Some(Command::Install(args)) => Ok(Action::Install(args.merged_over(&self.install))),
            Some(_) if top_level_flags => Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "install options (--key, --name, --skip-packages, --no-progress, --json) only apply to `install`",
            )),
            Some(Command::Detect) => Ok(Action::Detect),
            Some(Command::Config {
                action: ConfigAction::Init { force },
            }) => Ok(Action::ConfigInit { force: *force }),
            Some(Command::Config {
                action: ConfigAction::Show,
            }) => Ok(Action::ConfigShow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(args: &[&str]) -> Result<Action, clap::Error> {
        Cli::try_parse_from(args)?.action()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_invocation_installs() {
        let Action::Install(args) = action(&["snapbind", "--key", "F2"]).unwrap() else {
            panic!("expected install");
        };
        assert_eq!(args.key.as_deref(), Some("F2"));
    }

    #[test]
    fn test_top_level_flags_carry_into_install() {
        let Action::Install(args) =
            action(&["snapbind", "--key", "Ctrl+Shift+S", "install", "--json"]).unwrap()
        else {
            panic!("expected install");
        };
        assert_eq!(args.key.as_deref(), Some("Ctrl+Shift+S"));
        assert!(args.json);
    }

    #[test]
    fn test_subcommand_flags_win_over_top_level() {
        let Action::Install(args) =
            action(&["snapbind", "--key", "F2", "install", "--key", "F3"]).unwrap()
        else {
            panic!("expected install");
        };
        assert_eq!(args.key.as_deref(), Some("F3"));
    }

    #[test]
    fn test_install_flags_rejected_for_other_subcommands() {
        let err = action(&["snapbind", "--json", "detect"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert!(action(&["snapbind", "--key", "F2", "config", "show"]).is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["snapbind", "detect", "-vv", "--config", "/tmp/c.yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert_eq!(cli.action().unwrap(), Action::Detect);
    }

    #[test]
    fn test_config_init_force() {
        assert_eq!(
            action(&["snapbind", "config", "init", "--force"]).unwrap(),
            Action::ConfigInit { force: true }
        );
    }
}
