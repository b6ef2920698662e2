//! The assembled command tree.
//!
//! A [`CommandTree`] pairs the native root [`clap::Command`] with what clap
//! cannot hold itself: the run callback, positional rule and flag kinds of
//! every command, keyed by command path. Parsing is delegated to clap; the
//! tree then walks to the selected command, collects typed values and
//! dispatches.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fmt;

use clap::{ArgMatches, Command};
use serde::Serialize;
use tracing::debug;

use crate::validate::ARGS_ID;
use crate::{CommandSpec, ExecError, FlagKind, FlagValue, PositionalArgs, RunFn};

/// Parsed command line for the selected command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Command names from the root to the selected command.
    pub path: Vec<String>,
    /// Values of every flag declared on the selected command, defaults
    /// included.
    pub flags: BTreeMap<String, FlagValue>,
    /// Positional arguments.
    pub args: Vec<String>,
}

impl Invocation {
    /// Full command path, space separated.
    pub fn command(&self) -> String {
        self.path.join(" ")
    }

    /// Value of a string flag.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(FlagValue::as_str)
    }

    /// Value of an integer flag.
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.flags.get(name).and_then(FlagValue::as_integer)
    }
}

/// Outcome of [`CommandTree::execute_from`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// The selected command's run callback completed.
    Ran(Invocation),
    /// A grouping command was selected; carries its rendered help.
    Help(String),
}

/// What the tree keeps about each command besides the native object.
#[derive(Clone)]
pub(crate) struct CommandEntry {
    run: Option<RunFn>,
    args: Option<PositionalArgs>,
    accepts_positionals: bool,
    flags: Vec<(String, FlagKind)>,
}

impl CommandEntry {
    pub(crate) fn from_spec(spec: &CommandSpec) -> Self {
        Self {
            run: spec.run.clone(),
            args: spec.args.clone(),
            accepts_positionals: spec.accepts_positionals(),
            flags: spec
                .flags
                .iter()
                .map(|f| (f.name.clone(), f.kind))
                .collect(),
        }
    }

    pub(crate) fn synthetic() -> Self {
        Self {
            run: None,
            args: None,
            accepts_positionals: false,
            flags: Vec::new(),
        }
    }
}

/// A fully assembled command tree, ready to parse command lines.
///
/// Built once by [`TreeBuilder`](crate::TreeBuilder) and never mutated.
pub struct CommandTree {
    command: Command,
    entries: HashMap<Vec<String>, CommandEntry>,
}

impl CommandTree {
    pub(crate) fn new(command: Command, entries: HashMap<Vec<String>, CommandEntry>) -> Self {
        Self { command, entries }
    }

    /// Native root command.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Consumes the tree and returns the native root command.
    ///
    /// Run callbacks and positional rules are not carried by the native
    /// object.
    pub fn into_command(self) -> Command {
        self.command
    }

    /// Number of commands in the tree, root included.
    pub fn command_count(&self) -> usize {
        self.entries.len()
    }

    /// Finds a command by name or alias path below the root.
    ///
    /// An empty path returns the root.
    pub fn find(&self, path: &[&str]) -> Option<&Command> {
        path.iter()
            .try_fold(&self.command, |cmd, name| cmd.find_subcommand(name))
    }

    /// Renders the help text of the command at `path` below the root.
    pub fn render_help(&self, path: &[&str]) -> Option<String> {
        let mut names = vec![self.command.get_name()];
        let mut current = &self.command;
        for name in path {
            current = current.find_subcommand(name)?;
            names.push(current.get_name());
        }
        let mut cmd = current.clone().bin_name(names.join(" "));
        Some(cmd.render_help().to_string())
    }

    /// Parses `argv` (program name first) and resolves the selected command.
    ///
    /// Positional arguments are checked against the command's rule.
    ///
    /// # Errors
    ///
    /// [`ExecError::Usage`] when the parser rejects the command line, which
    /// includes missing required flags; [`ExecError::InvalidArgs`] when the
    /// positional rule fails.
    pub fn resolve_from<I, T>(&self, argv: I) -> Result<Invocation, ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let (invocation, _) = self.resolve_entry(argv)?;
        Ok(invocation)
    }

    /// Parses `argv` and runs the selected command.
    ///
    /// A command without a run callback is a grouping command; selecting it
    /// yields [`Execution::Help`].
    ///
    /// # Errors
    ///
    /// Everything [`resolve_from`](Self::resolve_from) reports, plus
    /// [`ExecError::Run`] when the callback fails.
    pub fn execute_from<I, T>(&self, argv: I) -> Result<Execution, ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let (invocation, entry) = self.resolve_entry(argv)?;

        let Some(run) = &entry.run else {
            let below_root: Vec<&str> = invocation.path[1..].iter().map(String::as_str).collect();
            return self
                .render_help(&below_root)
                .map(Execution::Help)
                .ok_or_else(|| ExecError::Unregistered {
                    command: invocation.command(),
                });
        };

        debug!(command = %invocation.command(), "Running command");
        run(&invocation).map_err(|message| ExecError::Run {
            command: invocation.command(),
            message,
        })?;
        Ok(Execution::Ran(invocation))
    }

    fn resolve_entry<I, T>(&self, argv: I) -> Result<(Invocation, &CommandEntry), ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.clone().try_get_matches_from(argv)?;

        let mut path = vec![self.command.get_name().to_string()];
        let mut current = &matches;
        while let Some((name, sub)) = current.subcommand() {
            path.push(name.to_string());
            current = sub;
        }

        let command = path.join(" ");
        let entry = self
            .entries
            .get(&path)
            .ok_or_else(|| ExecError::Unregistered {
                command: command.clone(),
            })?;

        let flags = collect_flags(current, &entry.flags);
        let args = if entry.accepts_positionals {
            collect_positionals(current)
        } else {
            Vec::new()
        };

        if let Some(rule) = &entry.args {
            rule.check(&args).map_err(|message| ExecError::InvalidArgs {
                command: command.clone(),
                message,
            })?;
        }

        debug!(command = %command, flags = flags.len(), args = args.len(), "Resolved command line");
        Ok((Invocation { path, flags, args }, entry))
    }
}

fn collect_flags(matches: &ArgMatches, declared: &[(String, FlagKind)]) -> BTreeMap<String, FlagValue> {
    let mut flags = BTreeMap::new();
    for (name, kind) in declared {
        let value = match kind {
            FlagKind::String => matches
                .try_get_one::<String>(name)
                .ok()
                .flatten()
                .cloned()
                .map(FlagValue::String),
            FlagKind::Integer => matches
                .try_get_one::<i64>(name)
                .ok()
                .flatten()
                .copied()
                .map(FlagValue::Integer),
        };
        if let Some(value) = value {
            flags.insert(name.clone(), value);
        }
    }
    flags
}

fn collect_positionals(matches: &ArgMatches) -> Vec<String> {
    matches
        .try_get_many::<String>(ARGS_ID)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

impl fmt::Debug for CommandTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<String> = self.entries.keys().map(|p| p.join(" ")).collect();
        paths.sort();
        f.debug_struct("CommandTree")
            .field("root", &self.command.get_name())
            .field("commands", &paths)
            .finish()
    }
}
