//! Declarative model for commands and flags.
//!
//! These types are plain data. They describe what a command looks like
//! (usage line, help text, flags, aliases, required flags, positional rules,
//! run callback) and are turned into native [`clap::Command`] values by the
//! [`TreeBuilder`](crate::TreeBuilder).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::BuildError;
use crate::tree::Invocation;

/// Callback executed when a command is selected on the command line.
///
/// Returning `Err` reports a failure message for that command.
pub type RunFn = Arc<dyn Fn(&Invocation) -> Result<(), String> + Send + Sync>;

/// Predicate over the raw positional arguments of a command.
pub type ArgsPredicate = Arc<dyn Fn(&[String]) -> Result<(), String> + Send + Sync>;

/// Kind of value a flag accepts.
///
/// # Examples
///
/// ```
/// use command_tree_core::FlagKind;
///
/// assert_eq!("int".parse::<FlagKind>().unwrap(), FlagKind::Integer);
/// assert_eq!("string".parse::<FlagKind>().unwrap(), FlagKind::String);
/// assert!("float".parse::<FlagKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Free-form string value.
    String,
    /// Signed 64-bit integer value.
    Integer,
}

impl FlagKind {
    /// Document tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FlagKind::String => "string",
            FlagKind::Integer => "int",
        }
    }

    /// Value a flag of this kind reports when no default was declared.
    pub fn zero_value(self) -> FlagValue {
        match self {
            FlagKind::String => FlagValue::String(String::new()),
            FlagKind::Integer => FlagValue::Integer(0),
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a flag kind tag is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported flag type `{0}`")]
pub struct UnknownFlagKind(pub String);

impl FromStr for FlagKind {
    type Err = UnknownFlagKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "string" | "str" => Ok(FlagKind::String),
            "int" | "integer" => Ok(FlagKind::Integer),
            other => Err(UnknownFlagKind(other.to_string())),
        }
    }
}

/// A flag value tagged with its own kind.
///
/// # Examples
///
/// ```
/// use command_tree_core::{FlagKind, FlagValue};
///
/// assert_eq!(FlagValue::from(8080).kind(), FlagKind::Integer);
/// assert_eq!(FlagValue::from("abc").kind(), FlagKind::String);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// String value.
    String(String),
    /// Integer value.
    Integer(i64),
}

impl FlagValue {
    /// Kind carried by this value.
    pub fn kind(&self) -> FlagKind {
        match self {
            FlagValue::String(_) => FlagKind::String,
            FlagValue::Integer(_) => FlagKind::Integer,
        }
    }

    /// Returns the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::String(s) => Some(s),
            FlagValue::Integer(_) => None,
        }
    }

    /// Returns the integer payload, if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FlagValue::Integer(n) => Some(*n),
            FlagValue::String(_) => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::String(s) => f.write_str(s),
            FlagValue::Integer(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::String(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::String(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Integer(value)
    }
}

impl From<i32> for FlagValue {
    fn from(value: i32) -> Self {
        FlagValue::Integer(i64::from(value))
    }
}

/// Declaration of a single flag.
///
/// # Examples
///
/// ```
/// use command_tree_core::{FlagKind, FlagSpec, FlagValue};
///
/// let port = FlagSpec::integer("port", Some('p'), "Port to bind").with_default(8080);
/// assert_eq!(port.kind, FlagKind::Integer);
/// assert_eq!(port.effective_default(), FlagValue::Integer(8080));
///
/// let name = FlagSpec::string("name", None, "Display name");
/// assert_eq!(name.effective_default(), FlagValue::String(String::new()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// Long name, without leading dashes. Unique within a command.
    pub name: String,
    /// Optional single-character alias.
    pub short: Option<char>,
    /// Kind of value accepted.
    pub kind: FlagKind,
    /// Help text.
    pub help: String,
    /// Declared default. Must carry the same kind as [`kind`](Self::kind).
    pub default: Option<FlagValue>,
}

impl FlagSpec {
    /// Creates a flag of the given kind without a default.
    pub fn new(kind: FlagKind, name: &str, short: Option<char>, help: &str) -> Self {
        Self {
            name: name.to_string(),
            short,
            kind,
            help: help.to_string(),
            default: None,
        }
    }

    /// Creates a string-valued flag.
    pub fn string(name: &str, short: Option<char>, help: &str) -> Self {
        Self::new(FlagKind::String, name, short, help)
    }

    /// Creates an integer-valued flag.
    pub fn integer(name: &str, short: Option<char>, help: &str) -> Self {
        Self::new(FlagKind::Integer, name, short, help)
    }

    /// Sets the default value.
    ///
    /// The kind is not checked here; a mismatch is reported when the tree is
    /// built.
    pub fn with_default(mut self, value: impl Into<FlagValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Default the flag reports when it is not given on the command line.
    pub fn effective_default(&self) -> FlagValue {
        self.default
            .clone()
            .unwrap_or_else(|| self.kind.zero_value())
    }

    /// Checks the declared default against the flag kind.
    pub(crate) fn check_default(&self, command: &str) -> Result<(), BuildError> {
        match &self.default {
            Some(value) if value.kind() != self.kind => Err(BuildError::TypeMismatch {
                command: command.to_string(),
                flag: self.name.clone(),
                expected: self.kind,
                found: value.kind(),
            }),
            _ => Ok(()),
        }
    }
}

/// Rule applied to the positional arguments of a command.
///
/// # Examples
///
/// ```
/// use command_tree_core::PositionalArgs;
///
/// let args = vec!["a".to_string(), "b".to_string()];
/// assert!(PositionalArgs::Exact(2).check(&args).is_ok());
/// assert!(PositionalArgs::Max(1).check(&args).is_err());
/// assert!(PositionalArgs::custom(|a| if a.len() % 2 == 0 { Ok(()) } else { Err("odd".into()) })
///     .check(&args)
///     .is_ok());
/// ```
#[derive(Clone)]
pub enum PositionalArgs {
    /// Any number of arguments.
    Arbitrary,
    /// No arguments at all.
    NoArgs,
    /// Exactly `n` arguments.
    Exact(usize),
    /// At least `n` arguments.
    Min(usize),
    /// At most `n` arguments.
    Max(usize),
    /// Between `min` and `max` arguments, inclusive.
    Range(usize, usize),
    /// Caller-supplied predicate.
    Custom(ArgsPredicate),
}

impl PositionalArgs {
    /// Wraps a predicate as a [`PositionalArgs::Custom`] rule.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&[String]) -> Result<(), String> + Send + Sync + 'static,
    {
        PositionalArgs::Custom(Arc::new(predicate))
    }

    /// Validates `args` against the rule.
    pub fn check(&self, args: &[String]) -> Result<(), String> {
        let n = args.len();
        match self {
            PositionalArgs::Arbitrary => Ok(()),
            PositionalArgs::NoArgs if n == 0 => Ok(()),
            PositionalArgs::NoArgs => Err(format!(
                "accepts no arguments, received {n} ({})",
                args.join(" ")
            )),
            PositionalArgs::Exact(want) if n == *want => Ok(()),
            PositionalArgs::Exact(want) => {
                Err(format!("accepts {want} arg(s), received {n}"))
            }
            PositionalArgs::Min(min) if n >= *min => Ok(()),
            PositionalArgs::Min(min) => Err(format!(
                "requires at least {min} arg(s), only received {n}"
            )),
            PositionalArgs::Max(max) if n <= *max => Ok(()),
            PositionalArgs::Max(max) => {
                Err(format!("accepts at most {max} arg(s), received {n}"))
            }
            PositionalArgs::Range(min, max) if (*min..=*max).contains(&n) => Ok(()),
            PositionalArgs::Range(min, max) => Err(format!(
                "accepts between {min} and {max} arg(s), received {n}"
            )),
            PositionalArgs::Custom(predicate) => predicate(args),
        }
    }
}

impl fmt::Debug for PositionalArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionalArgs::Arbitrary => f.write_str("Arbitrary"),
            PositionalArgs::NoArgs => f.write_str("NoArgs"),
            PositionalArgs::Exact(n) => f.debug_tuple("Exact").field(n).finish(),
            PositionalArgs::Min(n) => f.debug_tuple("Min").field(n).finish(),
            PositionalArgs::Max(n) => f.debug_tuple("Max").field(n).finish(),
            PositionalArgs::Range(min, max) => {
                f.debug_tuple("Range").field(min).field(max).finish()
            }
            PositionalArgs::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Declaration of a single command.
///
/// The command name is the first word of [`usage`](Self::usage). Commands
/// without a run callback are pure grouping commands: selecting one prints
/// its help.
///
/// # Examples
///
/// ```
/// use command_tree_core::{CommandSpec, FlagSpec, PositionalArgs};
///
/// let serve = CommandSpec::new("serve [flags]")
///     .with_short("Start the server")
///     .with_flag(FlagSpec::integer("port", Some('p'), "Port to bind").with_default(8080))
///     .with_alias("s")
///     .with_args(PositionalArgs::NoArgs)
///     .with_run(|_| Ok(()));
///
/// assert_eq!(serve.name(), "serve");
/// assert!(serve.is_runnable());
/// assert!(serve.find_flag("port").is_some());
/// ```
#[derive(Clone, Default)]
pub struct CommandSpec {
    /// One-line usage; its first word is the command name.
    pub usage: String,
    /// Short description shown in command listings.
    pub short: String,
    /// Long description shown in the command's own help.
    pub long: String,
    /// Callback run when the command is selected.
    pub run: Option<RunFn>,
    /// Flags in declaration order.
    pub flags: Vec<FlagSpec>,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// Flags that must all be supplied together.
    pub required_flags: Vec<String>,
    /// Rule for positional arguments.
    pub args: Option<PositionalArgs>,
}

/// A command used as the parent of a group of commands.
pub type ParentCommandSpec = CommandSpec;

impl CommandSpec {
    /// Creates a command from its usage line.
    pub fn new(usage: &str) -> Self {
        Self {
            usage: usage.to_string(),
            ..Default::default()
        }
    }

    /// Command name: the first word of the usage line.
    pub fn name(&self) -> &str {
        self.usage.split_whitespace().next().unwrap_or("")
    }

    /// Sets the short description.
    pub fn with_short(mut self, short: &str) -> Self {
        self.short = short.to_string();
        self
    }

    /// Sets the long description.
    pub fn with_long(mut self, long: &str) -> Self {
        self.long = long.to_string();
        self
    }

    /// Adds a flag.
    pub fn with_flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Adds a flag name to the required-together group.
    pub fn with_required_flag(mut self, name: &str) -> Self {
        self.required_flags.push(name.to_string());
        self
    }

    /// Sets the run callback.
    pub fn with_run<F>(mut self, run: F) -> Self
    where
        F: Fn(&Invocation) -> Result<(), String> + Send + Sync + 'static,
    {
        self.run = Some(Arc::new(run));
        self
    }

    /// Sets the positional argument rule.
    pub fn with_args(mut self, args: PositionalArgs) -> Self {
        self.args = Some(args);
        self
    }

    /// Returns `true` if the command has a run callback.
    pub fn is_runnable(&self) -> bool {
        self.run.is_some()
    }

    /// Finds a declared flag by name.
    pub fn find_flag(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Returns `true` if the command takes trailing positional arguments.
    pub(crate) fn accepts_positionals(&self) -> bool {
        self.run.is_some() || self.args.is_some()
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("usage", &self.usage)
            .field("short", &self.short)
            .field("long", &self.long)
            .field("run", &self.run.as_ref().map(|_| "<fn>"))
            .field("flags", &self.flags)
            .field("aliases", &self.aliases)
            .field("required_flags", &self.required_flags)
            .field("args", &self.args)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_kind_tags() {
        assert_eq!("int".parse::<FlagKind>(), Ok(FlagKind::Integer));
        assert_eq!("integer".parse::<FlagKind>(), Ok(FlagKind::Integer));
        assert_eq!("string".parse::<FlagKind>(), Ok(FlagKind::String));
        assert_eq!(
            "bool".parse::<FlagKind>(),
            Err(UnknownFlagKind("bool".to_string()))
        );
    }

    #[test]
    fn test_effective_default_falls_back_to_zero_value() {
        assert_eq!(
            FlagSpec::integer("count", None, "").effective_default(),
            FlagValue::Integer(0)
        );
        assert_eq!(
            FlagSpec::string("name", None, "").effective_default(),
            FlagValue::String(String::new())
        );
    }

    #[test]
    fn test_check_default_reports_mismatch() {
        let flag = FlagSpec::integer("port", Some('p'), "").with_default("abc");
        let err = flag.check_default("app serve").unwrap_err();
        assert_eq!(
            err,
            BuildError::TypeMismatch {
                command: "app serve".to_string(),
                flag: "port".to_string(),
                expected: FlagKind::Integer,
                found: FlagKind::String,
            }
        );
    }

    #[test]
    fn test_command_name_is_first_usage_word() {
        assert_eq!(CommandSpec::new("get <key>").name(), "get");
        assert_eq!(CommandSpec::new("  serve  ").name(), "serve");
        assert_eq!(CommandSpec::new("").name(), "");
    }

    #[test]
    fn test_positional_rules() {
        let none: Vec<String> = Vec::new();
        let two = vec!["a".to_string(), "b".to_string()];

        assert!(PositionalArgs::NoArgs.check(&none).is_ok());
        assert!(PositionalArgs::NoArgs.check(&two).is_err());
        assert!(PositionalArgs::Min(1).check(&none).is_err());
        assert!(PositionalArgs::Range(1, 2).check(&two).is_ok());
        assert_eq!(
            PositionalArgs::Exact(1).check(&two),
            Err("accepts 1 arg(s), received 2".to_string())
        );
    }

    #[test]
    fn test_grouping_command_is_not_runnable() {
        let group = CommandSpec::new("config").with_short("Manage configuration");
        assert!(!group.is_runnable());
        assert!(!group.accepts_positionals());
    }
}
