//! Declarative command trees for clap.
//!
//! Describe commands, subcommands and flags as plain data, then turn them
//! into fully wired [`clap::Command`] values:
//!
//! - [`CommandSpec`] / [`FlagSpec`]: a command (usage, help, flags, aliases,
//!   required flags, positional rule, run callback) and a typed flag.
//! - [`CommandList`]: a node of the tree (parent command, its commands,
//!   nested nodes). Implement it per command group, or compose
//!   [`CommandGroup`] records.
//! - [`TreeBuilder`] / [`build_command_tree`]: assemble the tree, validating
//!   every declaration up front ([`BuildError`]).
//! - [`CommandTree`]: the assembled tree; parses command lines, checks
//!   positional arguments and dispatches to run callbacks.
//! - [`TreeDocument`]: the same tree declared in YAML or JSON.
//!
//! # Example
//!
//! ```
//! use command_tree_core::*;
//!
//! let root = CommandGroup::without_parent().with_child(
//!     CommandGroup::new(
//!         CommandSpec::new("serve")
//!             .with_short("Start the server")
//!             .with_flag(FlagSpec::integer("port", Some('p'), "Port to bind").with_default(8080))
//!             .with_run(|inv| {
//!                 assert!(inv.integer("port").is_some());
//!                 Ok(())
//!             }),
//!     ),
//! );
//!
//! let tree = build_command_tree(&root).unwrap();
//! let names: Vec<_> = tree.command().get_subcommands().map(|c| c.get_name()).collect();
//! assert_eq!(names, ["serve"]);
//!
//! let inv = tree.resolve_from(["app", "serve", "-p", "9000"]).unwrap();
//! assert_eq!(inv.integer("port"), Some(9000));
//! ```

mod build;
mod config;
mod error;
mod list;
mod tree;
mod types;
mod validate;

pub use build::{
    DEFAULT_ROOT_NAME, TreeBuilder, build_command_tree, convert_command, register_commands,
};
pub use config::{
    ArgsConfig, CommandConfig, ConfigError, FlagConfig, HandlerRegistry, TreeDocument,
};
pub use error::{BuildError, ExecError};
pub use list::{CommandGroup, CommandList};
pub use tree::{CommandTree, Execution, Invocation};
pub use types::*;
pub use validate::{ARGS_ID, validate_command};
