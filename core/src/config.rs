//! Command tree documents.
//!
//! A tree can be declared in YAML or JSON instead of code. The document
//! mirrors [`CommandList`](crate::CommandList): an optional parent command,
//! its commands, and nested documents. Run callbacks cannot be written in a
//! document, so commands name a `handler` that is bound through a
//! [`HandlerRegistry`].
//!
//! # Example YAML
//!
//! ```yaml
//! parent:
//!   use: deploy
//!   short: Deployment tool
//! commands:
//!   - use: "serve [flags]"
//!     short: Start the server
//!     aliases: [s]
//!     handler: serve
//!     args: { max: 0 }
//!     flags:
//!       - { name: port, short: p, type: int, help: Port to bind, default: 8080 }
//! subcommands:
//!   - parent: { use: config, short: Manage configuration }
//!     commands:
//!       - use: "get <key>"
//!         args: { exact: 1 }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    BuildError, CommandGroup, CommandSpec, FlagKind, FlagSpec, FlagValue, PositionalArgs, RunFn,
};

/// Errors raised while loading a tree document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The declared tree is invalid.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A flag default is neither a string nor an integer.
    #[error("command `{command}`: default for flag `--{flag}` must be a string or an integer, found {found}")]
    InvalidDefault {
        command: String,
        flag: String,
        found: String,
    },

    /// A positional rule combines incompatible bounds.
    #[error("command `{command}`: invalid args rule: {message}")]
    InvalidArgs { command: String, message: String },

    /// A command names a handler the registry cannot provide.
    #[error("command `{command}`: unknown handler `{handler}`")]
    UnknownHandler { command: String, handler: String },
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// One node of a tree document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeDocument {
    /// Parent command of this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommandConfig>,
    /// Commands attached to the parent.
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
    /// Nested nodes attached to the parent.
    #[serde(default)]
    pub subcommands: Vec<TreeDocument>,
}

/// A command as written in a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Usage line; its first word is the command name.
    #[serde(rename = "use")]
    pub usage: String,
    /// Short description.
    #[serde(default)]
    pub short: String,
    /// Long description.
    #[serde(default)]
    pub long: String,
    /// Alternative names.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Flags in declaration order.
    #[serde(default)]
    pub flags: Vec<FlagConfig>,
    /// Flags that must all be supplied together.
    #[serde(default)]
    pub required_flags: Vec<String>,
    /// Positional argument bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<ArgsConfig>,
    /// Name of the run handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
}

/// A flag as written in a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagConfig {
    /// Long name.
    pub name: String,
    /// Single-character alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    /// Value type tag (`string` or `int`).
    #[serde(rename = "type")]
    pub value_type: String,
    /// Help text.
    #[serde(default)]
    pub help: String,
    /// Default value, a string or an integer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Positional argument bounds as written in a document.
///
/// `{exact: n}` alone, or any of `{min, max}`. `{max: 0}` forbids
/// positional arguments; `{}` accepts any number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

type FallbackFn = Arc<dyn Fn(&str) -> RunFn + Send + Sync>;

/// Named run callbacks for document handlers.
///
/// # Examples
///
/// ```
/// use command_tree_core::{HandlerRegistry, TreeDocument, build_command_tree};
///
/// let doc = TreeDocument::from_yaml_str(
///     "parent: { use: app }\ncommands:\n  - { use: ping, handler: ping }\n",
/// )
/// .unwrap();
///
/// let handlers = HandlerRegistry::new().with_handler("ping", |_| Ok(()));
/// let tree = build_command_tree(&doc.into_group(&handlers).unwrap()).unwrap();
/// assert!(tree.execute_from(["app", "ping"]).is_ok());
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, RunFn>,
    fallback: Option<FallbackFn>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to a callback.
    pub fn with_handler<F>(mut self, name: &str, run: F) -> Self
    where
        F: Fn(&crate::Invocation) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.handlers.insert(name.to_string(), Arc::new(run));
        self
    }

    /// Supplies callbacks for handler names that were not bound explicitly.
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&str) -> RunFn + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Looks up the callback for `name`.
    pub fn get(&self, name: &str) -> Option<RunFn> {
        self.handlers
            .get(name)
            .cloned()
            .or_else(|| self.fallback.as_ref().map(|fallback| fallback(name)))
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &names)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl TreeDocument {
    /// Loads a document from a file.
    ///
    /// Files ending in `.json` are read as JSON, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// or [`YamlError`](ConfigError::YamlError) /
    /// [`JsonError`](ConfigError::JsonError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let document = if is_json {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(document)
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](ConfigError::YamlError) if parsing fails.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](ConfigError::JsonError) if parsing fails.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Converts the document into a [`CommandGroup`], binding handlers.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Build`] with [`BuildError::UnsupportedFlagType`] for an
    /// unknown `type` tag, [`ConfigError::InvalidDefault`],
    /// [`ConfigError::InvalidArgs`] or [`ConfigError::UnknownHandler`].
    pub fn into_group(&self, handlers: &HandlerRegistry) -> Result<CommandGroup> {
        self.to_group("", handlers)
    }

    fn to_group(&self, parent_path: &str, handlers: &HandlerRegistry) -> Result<CommandGroup> {
        let parent = self
            .parent
            .as_ref()
            .map(|config| config.to_spec(parent_path, handlers))
            .transpose()?;
        let path = match &parent {
            Some(spec) => join_path(parent_path, spec.name()),
            None => parent_path.to_string(),
        };

        let commands = self
            .commands
            .iter()
            .map(|config| config.to_spec(&path, handlers))
            .collect::<Result<Vec<_>>>()?;
        let children = self
            .subcommands
            .iter()
            .map(|doc| doc.to_group(&path, handlers))
            .collect::<Result<Vec<_>>>()?;

        Ok(CommandGroup {
            parent,
            commands,
            children,
        })
    }
}

impl CommandConfig {
    fn to_spec(&self, parent_path: &str, handlers: &HandlerRegistry) -> Result<CommandSpec> {
        let command = join_path(parent_path, self.usage.split_whitespace().next().unwrap_or(""));

        let flags = self
            .flags
            .iter()
            .map(|flag| flag.to_spec(&command))
            .collect::<Result<Vec<_>>>()?;
        let args = self.args.map(|args| args.to_rule(&command)).transpose()?;
        let run = self
            .handler
            .as_deref()
            .map(|name| {
                handlers.get(name).ok_or_else(|| ConfigError::UnknownHandler {
                    command: command.clone(),
                    handler: name.to_string(),
                })
            })
            .transpose()?;

        Ok(CommandSpec {
            usage: self.usage.clone(),
            short: self.short.clone(),
            long: self.long.clone(),
            run,
            flags,
            aliases: self.aliases.clone(),
            required_flags: self.required_flags.clone(),
            args,
        })
    }
}

impl FlagConfig {
    fn to_spec(&self, command: &str) -> Result<FlagSpec> {
        let kind = self
            .value_type
            .parse::<FlagKind>()
            .map_err(|err| BuildError::UnsupportedFlagType {
                command: command.to_string(),
                flag: self.name.clone(),
                value_type: err.0,
            })?;

        let default = match &self.default {
            None => None,
            Some(Value::String(s)) => Some(FlagValue::String(s.clone())),
            Some(Value::Number(n)) => Some(FlagValue::Integer(n.as_i64().ok_or_else(|| {
                ConfigError::InvalidDefault {
                    command: command.to_string(),
                    flag: self.name.clone(),
                    found: n.to_string(),
                }
            })?)),
            Some(other) => {
                return Err(ConfigError::InvalidDefault {
                    command: command.to_string(),
                    flag: self.name.clone(),
                    found: other.to_string(),
                });
            }
        };

        Ok(FlagSpec {
            name: self.name.clone(),
            short: self.short,
            kind,
            help: self.help.clone(),
            default,
        })
    }
}

impl ArgsConfig {
    fn to_rule(self, command: &str) -> Result<PositionalArgs> {
        let invalid = |message: String| ConfigError::InvalidArgs {
            command: command.to_string(),
            message,
        };

        match (self.exact, self.min, self.max) {
            (Some(n), None, None) => Ok(PositionalArgs::Exact(n)),
            (Some(_), _, _) => Err(invalid(
                "`exact` cannot be combined with `min` or `max`".to_string(),
            )),
            (None, Some(min), Some(max)) if min > max => Err(invalid(format!(
                "`min` ({min}) is greater than `max` ({max})"
            ))),
            (None, Some(min), Some(max)) => Ok(PositionalArgs::Range(min, max)),
            (None, Some(min), None) => Ok(PositionalArgs::Min(min)),
            (None, None, Some(0)) => Ok(PositionalArgs::NoArgs),
            (None, None, Some(max)) => Ok(PositionalArgs::Max(max)),
            (None, None, None) => Ok(PositionalArgs::Arbitrary),
        }
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent} {name}")
    }
}
