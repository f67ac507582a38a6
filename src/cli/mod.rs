//! Standard administration commands for database command-line tools
//!
//! Any tool built on a named database mounts these four subcommands:
//!
//! | Command    | Flags             | Arguments   |
//! |------------|-------------------|-------------|
//! | `dbshell`  |                   |             |
//! | `location` | `--with-protocol` |             |
//! | `copy`     | `--verbose`       | `DIRECTORY` |
//! | `copyfrom` | `--verbose`       | `DIRECTORY` |
//!
//! With clap derive, flatten [`StandardCommand`] into the tool's own
//! subcommand enum:
//!
//! ```rust,ignore
//! #[derive(Subcommand)]
//! enum Commands {
//!     #[command(flatten)]
//!     Standard(StandardCommand),
//!     /// Creates the database schema
//!     Create,
//! }
//! ```
//!
//! Builder-style parsers use [`standard_commands`] instead.

pub mod shell;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Command, Subcommand};

use crate::database::{copy_from, copy_to, DbError, Locator, ResolvedLocation};
pub use shell::{run_shell, ShellOutcome, ShellProgram};

/// Subcommands every database tool responds to
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StandardCommand {
    /// Drops you into a database shell
    #[clap(name = "dbshell")]
    Dbshell,

    /// Prints the current location of the database SQL file
    #[clap(name = "location")]
    Location {
        /// Prints the path leading to the database with the database protocol prepended
        #[clap(long)]
        with_protocol: bool,
    },

    /// Copies the database to a given directory
    #[clap(name = "copy")]
    Copy {
        /// Produces more output while copying
        #[clap(long)]
        verbose: bool,

        /// Directory to which the database will be copied
        #[clap(value_name = "DIRECTORY")]
        directory: PathBuf,
    },

    /// Copies the database from a given directory
    #[clap(name = "copyfrom")]
    Copyfrom {
        /// Produces more output while copying
        #[clap(long)]
        verbose: bool,

        /// Directory from which the database will be copied
        #[clap(value_name = "DIRECTORY")]
        directory: PathBuf,
    },
}

/// Register the standard subcommands on a builder-style parser
pub fn standard_commands(cmd: Command) -> Command {
    StandardCommand::augment_subcommands(cmd)
}

/// Per-invocation settings handed to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOptions {
    pub identity: String,
    pub location: ResolvedLocation,
    pub directory: Option<PathBuf>,
    pub verbose: bool,
    pub with_protocol: bool,
}

impl CommandOptions {
    pub fn new(identity: &str, location: ResolvedLocation) -> Self {
        Self {
            identity: identity.to_string(),
            location,
            directory: None,
            verbose: false,
            with_protocol: false,
        }
    }

    fn directory(&self) -> Result<&PathBuf> {
        self.directory
            .as_ref()
            .ok_or_else(|| anyhow!("a directory argument is required"))
    }
}

impl StandardCommand {
    /// Options for running this command against `identity` at `location`
    pub fn options(&self, identity: &str, location: ResolvedLocation) -> CommandOptions {
        let mut options = CommandOptions::new(identity, location);
        match self {
            StandardCommand::Dbshell => {}
            StandardCommand::Location { with_protocol } => {
                options.with_protocol = *with_protocol;
            }
            StandardCommand::Copy { verbose, directory }
            | StandardCommand::Copyfrom { verbose, directory } => {
                options.verbose = *verbose;
                options.directory = Some(directory.clone());
            }
        }
        options
    }

    /// Resolve `identity` and run the command, returning the exit status
    pub fn run(&self, identity: &str, locator: &Locator, shell: &ShellProgram) -> Result<i32> {
        let options = self.options(identity, locator.resolve(identity));
        match self {
            StandardCommand::Dbshell => run_dbshell(&options, shell),
            StandardCommand::Location { .. } => Ok(print_location(&options)),
            StandardCommand::Copy { .. } => run_copy(&options),
            StandardCommand::Copyfrom { .. } => run_copyfrom(&options),
        }
    }
}

pub fn run_dbshell(options: &CommandOptions, shell: &ShellProgram) -> Result<i32> {
    let outcome = run_shell(&options.location, shell)?;
    match &outcome {
        ShellOutcome::LaunchFailure {
            command, message, ..
        } => {
            eprintln!("Error executing '{}': {}", command, message);
        }
        ShellOutcome::ExitedNormally(_) => {}
        ShellOutcome::TerminatedBySignal(signal) => {
            eprintln!("Database shell terminated by signal {}", signal);
        }
    }
    Ok(outcome.exit_code())
}

pub fn print_location(options: &CommandOptions) -> i32 {
    println!("{}", options.location.display(options.with_protocol));
    0
}

pub fn run_copy(options: &CommandOptions) -> Result<i32> {
    copy_to(
        &options.location,
        &options.identity,
        options.directory()?,
        options.verbose,
    )?;
    Ok(0)
}

pub fn run_copyfrom(options: &CommandOptions) -> Result<i32> {
    copy_from(
        &options.location,
        &options.identity,
        options.directory()?,
        options.verbose,
    )?;
    Ok(0)
}

/// Exit status for a failed command: the OS error number when there is one
pub fn error_exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<DbError>()
        .and_then(DbError::raw_os_error)
        .or_else(|| {
            error
                .downcast_ref::<std::io::Error>()
                .and_then(std::io::Error::raw_os_error)
        })
        .filter(|code| *code != 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Scheme;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        dbname: String,
        #[clap(subcommand)]
        command: StandardCommand,
    }

    #[derive(Subcommand, Debug, PartialEq, Eq)]
    enum HostCommand {
        #[command(flatten)]
        Standard(StandardCommand),
        /// Creates the database schema
        Create,
    }

    #[derive(Parser, Debug)]
    struct HostCli {
        #[clap(subcommand)]
        command: HostCommand,
    }

    fn parse(args: &[&str]) -> Result<TestCli, clap::Error> {
        TestCli::try_parse_from(std::iter::once("tool").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_dbshell() {
        let cli = parse(&["faces", "dbshell"]).unwrap();
        assert_eq!(cli.dbname, "faces");
        assert_eq!(cli.command, StandardCommand::Dbshell);
    }

    #[test]
    fn test_parse_location() {
        let cli = parse(&["faces", "location"]).unwrap();
        assert_eq!(
            cli.command,
            StandardCommand::Location {
                with_protocol: false
            }
        );
        let cli = parse(&["faces", "location", "--with-protocol"]).unwrap();
        assert_eq!(cli.command, StandardCommand::Location { with_protocol: true });
    }

    #[test]
    fn test_parse_copy_commands() {
        let cli = parse(&["faces", "copy", "--verbose", "/tmp/out"]).unwrap();
        assert_eq!(
            cli.command,
            StandardCommand::Copy {
                verbose: true,
                directory: PathBuf::from("/tmp/out")
            }
        );
        let cli = parse(&["faces", "copyfrom", "/tmp/in"]).unwrap();
        assert_eq!(
            cli.command,
            StandardCommand::Copyfrom {
                verbose: false,
                directory: PathBuf::from("/tmp/in")
            }
        );
    }

    #[test]
    fn test_directory_is_required() {
        assert!(parse(&["faces", "copy"]).is_err());
        assert!(parse(&["faces", "copyfrom", "--verbose"]).is_err());
        assert!(parse(&["faces", "copy", "/a", "/b"]).is_err());
    }

    #[test]
    fn test_flatten_into_host() {
        let cli = HostCli::try_parse_from(["tool", "location", "--with-protocol"]).unwrap();
        assert_eq!(
            cli.command,
            HostCommand::Standard(StandardCommand::Location { with_protocol: true })
        );
        let cli = HostCli::try_parse_from(["tool", "create"]).unwrap();
        assert_eq!(cli.command, HostCommand::Create);
    }

    #[test]
    fn test_standard_commands_builder() {
        let cmd = standard_commands(Command::new("tool"));
        let names: Vec<_> = cmd.get_subcommands().map(|c| c.get_name()).collect();
        assert_eq!(names, vec!["dbshell", "location", "copy", "copyfrom"]);
    }

    #[test]
    fn test_options() {
        let location = ResolvedLocation::new(Scheme::Sqlite, "/opt/db/faces/db.sql3");
        let command = StandardCommand::Copy {
            verbose: true,
            directory: PathBuf::from("/tmp/out"),
        };
        let options = command.options("faces", location.clone());
        assert_eq!(options.identity, "faces");
        assert_eq!(options.location, location);
        assert_eq!(options.directory, Some(PathBuf::from("/tmp/out")));
        assert!(options.verbose);
        assert!(!options.with_protocol);
    }

    #[test]
    fn test_copy_round_trip_through_commands() {
        let root = tempfile::tempdir().unwrap();
        let locator = Locator::new(root.path().join("install"));
        let location = locator.resolve_with("faces", None);
        std::fs::create_dir_all(location.parent().unwrap()).unwrap();
        std::fs::write(location.path(), b"original bytes").unwrap();

        let out = root.path().join("out");
        let copy = StandardCommand::Copy {
            verbose: false,
            directory: out.clone(),
        };
        assert_eq!(run_copy(&copy.options("faces", location.clone())).unwrap(), 0);

        std::fs::remove_file(location.path()).unwrap();
        let copyfrom = StandardCommand::Copyfrom {
            verbose: true,
            directory: out,
        };
        assert_eq!(
            run_copyfrom(&copyfrom.options("faces", location.clone())).unwrap(),
            0
        );
        assert_eq!(std::fs::read(location.path()).unwrap(), b"original bytes");
    }

    #[test]
    fn test_run_location() {
        let root = tempfile::tempdir().unwrap();
        let locator = Locator::new(root.path());
        let shell = ShellProgram::default();

        for with_protocol in [true, false] {
            let command = StandardCommand::Location { with_protocol };
            assert_eq!(command.run("faces", &locator, &shell).unwrap(), 0);
        }
        // printing never provisions anything
        assert!(!root.path().join("faces").exists());
    }

    #[test]
    fn test_error_exit_code() {
        let err: anyhow::Error = DbError::Provision {
            path: PathBuf::from("/root/x"),
            source: std::io::Error::from_raw_os_error(13),
        }
        .into();
        assert_eq!(error_exit_code(&err), 13);
        assert_eq!(error_exit_code(&anyhow!("no os error")), 1);
    }
}
