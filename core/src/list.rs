//! Command tree nodes.
//!
//! A node groups commands under an optional parent command and nests further
//! nodes beneath that parent. Callers either implement [`CommandList`] on
//! their own types, one per command group, or compose [`CommandGroup`]
//! records.
//!
//! The tree must be acyclic. The builder walks it recursively and does not
//! detect cycles.

use crate::CommandSpec;

/// A node of a declarative command tree.
///
/// # Examples
///
/// ```
/// use command_tree_core::{CommandList, CommandSpec, build_command_tree};
///
/// struct ConfigCommands;
///
/// impl CommandList for ConfigCommands {
///     fn parent_command(&self) -> Option<CommandSpec> {
///         Some(CommandSpec::new("config").with_short("Manage configuration"))
///     }
///
///     fn commands(&self) -> Vec<CommandSpec> {
///         vec![
///             CommandSpec::new("get <key>").with_run(|_| Ok(())),
///             CommandSpec::new("set <key> <value>").with_run(|_| Ok(())),
///         ]
///     }
/// }
///
/// struct RootCommands;
///
/// impl CommandList for RootCommands {
///     fn parent_command(&self) -> Option<CommandSpec> {
///         Some(CommandSpec::new("app"))
///     }
///
///     fn subcommands(&self) -> Vec<Box<dyn CommandList>> {
///         vec![Box::new(ConfigCommands)]
///     }
/// }
///
/// let tree = build_command_tree(&RootCommands).unwrap();
/// let config = tree.command().find_subcommand("config").unwrap();
/// assert_eq!(config.get_subcommands().count(), 2);
/// ```
pub trait CommandList {
    /// Command the node's commands and subtrees are attached to.
    fn parent_command(&self) -> Option<CommandSpec>;

    /// Commands attached directly to the parent, in listing order.
    fn commands(&self) -> Vec<CommandSpec> {
        Vec::new()
    }

    /// Nested nodes attached to the parent after [`commands`](Self::commands).
    fn subcommands(&self) -> Vec<Box<dyn CommandList>> {
        Vec::new()
    }
}

/// Plain-record [`CommandList`].
///
/// # Examples
///
/// ```
/// use command_tree_core::{CommandGroup, CommandSpec, build_command_tree};
///
/// let root = CommandGroup::new(CommandSpec::new("app"))
///     .with_command(CommandSpec::new("version").with_run(|_| Ok(())))
///     .with_child(
///         CommandGroup::new(CommandSpec::new("remote"))
///             .with_command(CommandSpec::new("add").with_run(|_| Ok(()))),
///     );
///
/// let tree = build_command_tree(&root).unwrap();
/// let names: Vec<_> = tree.command().get_subcommands().map(|c| c.get_name()).collect();
/// assert_eq!(names, ["version", "remote"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandGroup {
    /// Parent command, if any.
    pub parent: Option<CommandSpec>,
    /// Commands attached to the parent.
    pub commands: Vec<CommandSpec>,
    /// Nested groups attached to the parent.
    pub children: Vec<CommandGroup>,
}

impl CommandGroup {
    /// Creates a group under `parent`.
    pub fn new(parent: CommandSpec) -> Self {
        Self {
            parent: Some(parent),
            ..Default::default()
        }
    }

    /// Creates a group without a parent command.
    ///
    /// At the root of a tree this yields a synthetic root command; nested
    /// inside another group it is only valid while empty.
    pub fn without_parent() -> Self {
        Self::default()
    }

    /// Adds a command.
    pub fn with_command(mut self, command: CommandSpec) -> Self {
        self.commands.push(command);
        self
    }

    /// Adds a nested group.
    pub fn with_child(mut self, child: CommandGroup) -> Self {
        self.children.push(child);
        self
    }
}

impl CommandList for CommandGroup {
    fn parent_command(&self) -> Option<CommandSpec> {
        self.parent.clone()
    }

    fn commands(&self) -> Vec<CommandSpec> {
        self.commands.clone()
    }

    fn subcommands(&self) -> Vec<Box<dyn CommandList>> {
        self.children
            .iter()
            .cloned()
            .map(|child| Box::new(child) as Box<dyn CommandList>)
            .collect()
    }
}
