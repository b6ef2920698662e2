//! Recursive assembly of declarative command trees into clap commands.
//!
//! [`TreeBuilder::build`] walks a [`CommandList`] tree: it converts the
//! node's parent command, attaches the node's commands in order, then
//! recurses into each nested node and attaches the result. Each
//! [`CommandSpec`] goes through [`convert_command`], which validates it and
//! registers its flags by kind.
//!
//! A root node without a parent command gets a synthetic root named after
//! [`TreeBuilder::root_name`]. A nested node without a parent command must
//! be empty; otherwise the build fails with [`BuildError::MalformedTree`].

use std::collections::{HashMap, HashSet};

use clap::{Arg, ArgAction, Command, value_parser};
use tracing::{debug, warn};

use crate::tree::CommandEntry;
use crate::validate::{ARGS_ID, validate_command};
use crate::{BuildError, CommandList, CommandSpec, CommandTree, FlagKind, FlagSpec};

/// Name of the synthetic root command when none is configured.
pub const DEFAULT_ROOT_NAME: &str = "app";

const RESERVED_COMMANDS: &[&str] = &["help"];

type Entries = HashMap<Vec<String>, CommandEntry>;

/// Builds [`CommandTree`]s from [`CommandList`] nodes.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let root = CommandGroup::without_parent().with_child(
///     CommandGroup::new(
///         CommandSpec::new("serve")
///             .with_flag(FlagSpec::integer("port", Some('p'), "Port").with_default(8080))
///             .with_run(|_| Ok(())),
///     ),
/// );
///
/// let tree = TreeBuilder::new().root_name("demo").build(&root).unwrap();
/// assert_eq!(tree.command().get_name(), "demo");
///
/// let inv = tree.resolve_from(["demo", "serve"]).unwrap();
/// assert_eq!(inv.integer("port"), Some(8080));
/// ```
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root_name: String,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
        }
    }
}

impl TreeBuilder {
    /// Creates a builder with the default synthetic root name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name used when the root node has no parent command.
    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Builds the full tree under `node`.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] found anywhere in the tree. No
    /// partial tree is returned.
    pub fn build(&self, node: &dyn CommandList) -> Result<CommandTree, BuildError> {
        let mut entries = Entries::new();
        let root = self
            .build_node(node, &[], &mut entries)?
            .ok_or_else(|| BuildError::EmptyCommandName {
                parent: self.root_name.clone(),
            })?;
        debug!(root = %root.get_name(), commands = entries.len(), "Built command tree");
        Ok(CommandTree::new(root, entries))
    }

    fn build_node(
        &self,
        node: &dyn CommandList,
        parent_path: &[String],
        entries: &mut Entries,
    ) -> Result<Option<Command>, BuildError> {
        let commands = node.commands();
        let subtrees = node.subcommands();

        let (mut cmd, path) = match node.parent_command() {
            Some(spec) => {
                let path = command_path(parent_path, &spec)?;
                let cmd = convert_command(&spec, &parent_path.join(" "))?;
                entries.insert(path.clone(), CommandEntry::from_spec(&spec));
                (cmd, path)
            }
            None if parent_path.is_empty() => {
                if self.root_name.trim().is_empty() {
                    return Err(BuildError::EmptyCommandName {
                        parent: "<root>".to_string(),
                    });
                }
                debug!(root = %self.root_name, "Using synthetic root command");
                let path = vec![self.root_name.clone()];
                entries.insert(path.clone(), CommandEntry::synthetic());
                (Command::new(self.root_name.clone()), path)
            }
            None if commands.is_empty() && subtrees.is_empty() => return Ok(None),
            None => {
                return Err(BuildError::MalformedTree {
                    command: parent_path.join(" "),
                    commands: commands.len(),
                    subtrees: subtrees.len(),
                });
            }
        };

        let joined = path.join(" ");
        let mut claimed: HashSet<String> = HashSet::new();

        for spec in &commands {
            let child_path = command_path(&path, spec)?;
            let child = convert_command(spec, &joined)?;
            claim_names(&mut claimed, &child, &joined)?;
            entries.insert(child_path, CommandEntry::from_spec(spec));
            cmd = cmd.subcommand(child);
        }

        for subtree in &subtrees {
            if let Some(child) = self.build_node(subtree.as_ref(), &path, entries)? {
                claim_names(&mut claimed, &child, &joined)?;
                cmd = cmd.subcommand(child);
            }
        }

        let takes_positionals = cmd
            .get_arguments()
            .any(|arg| arg.get_id().as_str() == ARGS_ID);
        if !claimed.is_empty() {
            // Required flags bind only the command that runs.
            cmd = cmd.subcommand_negates_reqs(true);
            if takes_positionals {
                cmd = cmd.args_conflicts_with_subcommands(true);
            }
        }

        Ok(Some(cmd))
    }
}

/// Builds the full tree under `node` with the default [`TreeBuilder`].
///
/// # Errors
///
/// See [`TreeBuilder::build`].
pub fn build_command_tree(node: &dyn CommandList) -> Result<CommandTree, BuildError> {
    TreeBuilder::new().build(node)
}

/// Builds the tree under `node`, if there is one.
///
/// An absent node yields `Ok(None)`.
///
/// # Errors
///
/// See [`TreeBuilder::build`].
pub fn register_commands(node: Option<&dyn CommandList>) -> Result<Option<CommandTree>, BuildError> {
    node.map(build_command_tree).transpose()
}

/// Converts one [`CommandSpec`] into a native [`clap::Command`].
///
/// `parent` is the space-separated path of the parent command, used in
/// error messages and logs. Usage, help texts and aliases pass straight
/// through; flags are registered by kind; required flags become an
/// all-or-nothing group whose members are each required.
///
/// # Errors
///
/// Any [`BuildError`] from [`validate_command`], or
/// [`BuildError::EmptyCommandName`] for an empty usage line.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let spec = CommandSpec::new("deploy")
///     .with_flag(FlagSpec::string("region", Some('r'), "Region"))
///     .with_flag(FlagSpec::string("zone", Some('z'), "Zone"))
///     .with_required_flag("region")
///     .with_required_flag("zone");
///
/// let cmd = convert_command(&spec, "app").unwrap();
/// assert!(cmd.clone().try_get_matches_from(["deploy", "-r", "eu"]).is_err());
/// assert!(cmd.try_get_matches_from(["deploy", "-r", "eu", "-z", "b"]).is_ok());
/// ```
pub fn convert_command(spec: &CommandSpec, parent: &str) -> Result<Command, BuildError> {
    let name = spec.name();
    if name.is_empty() {
        return Err(BuildError::EmptyCommandName {
            parent: display_parent(parent),
        });
    }
    let path = if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent} {name}")
    };

    validate_command(spec, &path)?;

    let mut cmd = Command::new(name.to_string());
    if spec.usage.split_whitespace().nth(1).is_some() {
        cmd = cmd.override_usage(spec.usage.trim().to_string());
    }
    if !spec.short.is_empty() {
        cmd = cmd.about(spec.short.clone());
    }
    if !spec.long.is_empty() {
        cmd = cmd.long_about(spec.long.clone());
    }
    if !spec.aliases.is_empty() {
        cmd = cmd.visible_aliases(spec.aliases.clone());
    }

    for flag in &spec.flags {
        let required = spec.required_flags.contains(&flag.name);
        if required && flag.default.is_some() {
            warn!(command = %path, flag = %flag.name, "Default ignored for required flag");
        }
        let group: &[String] = if required { &spec.required_flags } else { &[] };
        cmd = cmd.arg(flag_arg(flag, required, group));
    }

    if spec.accepts_positionals() {
        cmd = cmd.arg(
            Arg::new(ARGS_ID)
                .value_name("ARGS")
                .num_args(0..)
                .action(ArgAction::Append),
        );
    }

    debug!(
        command = %path,
        flags = spec.flags.len(),
        required = spec.required_flags.len(),
        runnable = spec.is_runnable(),
        "Registered command"
    );
    Ok(cmd)
}

fn flag_arg(flag: &FlagSpec, required: bool, group: &[String]) -> Arg {
    let mut arg = Arg::new(flag.name.clone())
        .long(flag.name.clone())
        .action(ArgAction::Set);
    if let Some(short) = flag.short {
        arg = arg.short(short);
    }
    if !flag.help.is_empty() {
        arg = arg.help(flag.help.clone());
    }

    arg = match flag.kind {
        FlagKind::String => arg.value_parser(value_parser!(String)).value_name("STRING"),
        FlagKind::Integer => arg
            .value_parser(value_parser!(i64))
            .value_name("INT")
            .allow_negative_numbers(true),
    };

    if required {
        arg = arg.required(true);
        for other in group.iter().filter(|other| **other != flag.name) {
            arg = arg.requires(other.clone());
        }
    } else {
        let default = flag.effective_default().to_string();
        if default.is_empty() {
            arg = arg.hide_default_value(true);
        }
        arg = arg.default_value(default);
    }

    arg
}

fn command_path(parent: &[String], spec: &CommandSpec) -> Result<Vec<String>, BuildError> {
    let name = spec.name();
    if name.is_empty() {
        return Err(BuildError::EmptyCommandName {
            parent: display_parent(&parent.join(" ")),
        });
    }
    let mut path = parent.to_vec();
    path.push(name.to_string());
    Ok(path)
}

fn claim_names(claimed: &mut HashSet<String>, child: &Command, parent: &str) -> Result<(), BuildError> {
    let names = std::iter::once(child.get_name()).chain(child.get_all_aliases());
    for name in names {
        if RESERVED_COMMANDS.contains(&name) {
            return Err(BuildError::ReservedCommandName {
                parent: parent.to_string(),
                name: name.to_string(),
            });
        }
        if !claimed.insert(name.to_string()) {
            return Err(BuildError::DuplicateCommand {
                parent: parent.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn display_parent(parent: &str) -> String {
    if parent.is_empty() {
        "<root>".to_string()
    } else {
        parent.to_string()
    }
}
