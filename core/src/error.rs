//! Error types for tree assembly and dispatch.
//!
//! [`BuildError`] covers everything that can be wrong with a declared tree.
//! It is raised once, while the tree is built at startup. [`ExecError`] covers
//! what can go wrong afterwards, when a command line is parsed and
//! dispatched.

use thiserror::Error;

use crate::FlagKind;

/// Errors raised while assembling a command tree.
///
/// Every variant names the full command path (for example `app config set`)
/// and, where one is involved, the flag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A flag default carries a different kind than the flag declares.
    #[error("command `{command}`: default for flag `--{flag}` is {found}, expected {expected}")]
    TypeMismatch {
        command: String,
        flag: String,
        expected: FlagKind,
        found: FlagKind,
    },

    /// A required flag is not declared on the command.
    #[error("command `{command}`: required flag `--{flag}` is not declared")]
    UnknownFlagName { command: String, flag: String },

    /// A flag declares a value type the converter cannot register.
    #[error("command `{command}`: flag `--{flag}` has unsupported type `{value_type}`")]
    UnsupportedFlagType {
        command: String,
        flag: String,
        value_type: String,
    },

    /// A nested node has commands or subtrees but no parent command.
    #[error(
        "command `{command}`: nested group has {commands} command(s) and {subtrees} subtree(s) but no parent command"
    )]
    MalformedTree {
        command: String,
        commands: usize,
        subtrees: usize,
    },

    /// A command's usage line is empty.
    #[error("command under `{parent}` has an empty usage line")]
    EmptyCommandName { parent: String },

    /// Two commands under one parent share a name or alias.
    #[error("command `{parent}`: duplicate subcommand name `{name}`")]
    DuplicateCommand { parent: String, name: String },

    /// A command uses a name the parser reserves.
    #[error("command `{parent}`: subcommand name `{name}` is reserved")]
    ReservedCommandName { parent: String, name: String },

    /// A flag name is empty, starts with a dash or contains whitespace.
    #[error("command `{command}`: invalid flag name `{flag}`")]
    InvalidFlagName { command: String, flag: String },

    /// A command alias is empty, starts with a dash or contains whitespace.
    #[error("command `{command}`: invalid alias `{alias}`")]
    InvalidAlias { command: String, alias: String },

    /// Two flags on one command share a name.
    #[error("command `{command}`: flag `--{flag}` is declared more than once")]
    DuplicateFlag { command: String, flag: String },

    /// A short alias is not an ASCII letter or digit.
    #[error("command `{command}`: flag `--{flag}` has invalid short alias `{short}`")]
    InvalidShortAlias {
        command: String,
        flag: String,
        short: char,
    },

    /// Two flags on one command share a short alias.
    #[error("command `{command}`: short alias `-{short}` is used by both `--{first}` and `--{second}`")]
    DuplicateShortAlias {
        command: String,
        short: char,
        first: String,
        second: String,
    },

    /// A flag collides with one the parser defines itself.
    #[error("command `{command}`: flag `{flag}` is reserved")]
    ReservedFlag { command: String, flag: String },

    /// A required flag is listed more than once.
    #[error("command `{command}`: required flag `--{flag}` is listed more than once")]
    DuplicateRequiredFlag { command: String, flag: String },
}

impl BuildError {
    /// Command path the error refers to.
    pub fn command(&self) -> &str {
        match self {
            BuildError::TypeMismatch { command, .. }
            | BuildError::UnknownFlagName { command, .. }
            | BuildError::UnsupportedFlagType { command, .. }
            | BuildError::MalformedTree { command, .. }
            | BuildError::InvalidFlagName { command, .. }
            | BuildError::InvalidAlias { command, .. }
            | BuildError::DuplicateFlag { command, .. }
            | BuildError::InvalidShortAlias { command, .. }
            | BuildError::DuplicateShortAlias { command, .. }
            | BuildError::ReservedFlag { command, .. }
            | BuildError::DuplicateRequiredFlag { command, .. } => command,
            BuildError::EmptyCommandName { parent }
            | BuildError::DuplicateCommand { parent, .. }
            | BuildError::ReservedCommandName { parent, .. } => parent,
        }
    }
}

/// Errors raised while parsing and dispatching a command line.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command line was rejected by the parser (unknown flag, bad value,
    /// missing required flag, `--help`, ...).
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// Positional arguments failed the command's rule.
    #[error("command `{command}`: {message}")]
    InvalidArgs { command: String, message: String },

    /// The run callback reported a failure.
    #[error("command `{command}`: {message}")]
    Run { command: String, message: String },

    /// The parser selected a command the tree has no entry for.
    #[error("command `{command}` is not registered")]
    Unregistered { command: String },
}
