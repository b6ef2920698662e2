//! Build-time validation of command declarations.
//!
//! Catches declaration mistakes before they reach the parser: malformed
//! command aliases, bad or duplicate flag names and short aliases, defaults of the wrong kind, and
//! required flags that are duplicated or not declared. The first problem
//! found is returned.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::*;
//!
//! let ok = CommandSpec::new("deploy")
//!     .with_flag(FlagSpec::string("region", Some('r'), "Target region"))
//!     .with_required_flag("region");
//! assert!(validate_command(&ok, "app deploy").is_ok());
//!
//! let bad = CommandSpec::new("deploy").with_required_flag("region");
//! assert!(matches!(
//!     validate_command(&bad, "app deploy"),
//!     Err(BuildError::UnknownFlagName { .. })
//! ));
//! ```

use std::collections::{HashMap, HashSet};

use crate::{BuildError, CommandSpec, FlagSpec};

/// Id of the catch-all positional argument registered on runnable commands.
pub const ARGS_ID: &str = "args";

const RESERVED_LONG: &[&str] = &["help", ARGS_ID];
const RESERVED_SHORT: &[char] = &['h'];

/// Validates one command's aliases, flags and required-flag group.
///
/// `command` is the full command path used in error messages.
///
/// # Errors
///
/// Returns the first [`BuildError`] found.
pub fn validate_command(spec: &CommandSpec, command: &str) -> Result<(), BuildError> {
    validate_aliases(&spec.aliases, command)?;
    validate_flags(&spec.flags, command)?;
    validate_required(spec, command)
}

fn is_malformed_name(name: &str) -> bool {
    name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace)
}

fn validate_aliases(aliases: &[String], command: &str) -> Result<(), BuildError> {
    match aliases.iter().find(|alias| is_malformed_name(alias)) {
        Some(alias) => Err(BuildError::InvalidAlias {
            command: command.to_string(),
            alias: alias.clone(),
        }),
        None => Ok(()),
    }
}

fn validate_flags(flags: &[FlagSpec], command: &str) -> Result<(), BuildError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut shorts: HashMap<char, &str> = HashMap::new();

    for flag in flags {
        let name = flag.name.as_str();
        if is_malformed_name(name) {
            return Err(BuildError::InvalidFlagName {
                command: command.to_string(),
                flag: name.to_string(),
            });
        }
        if RESERVED_LONG.contains(&name) {
            return Err(BuildError::ReservedFlag {
                command: command.to_string(),
                flag: format!("--{name}"),
            });
        }
        if !seen.insert(name) {
            return Err(BuildError::DuplicateFlag {
                command: command.to_string(),
                flag: name.to_string(),
            });
        }

        if let Some(short) = flag.short {
            if !short.is_ascii_alphanumeric() {
                return Err(BuildError::InvalidShortAlias {
                    command: command.to_string(),
                    flag: name.to_string(),
                    short,
                });
            }
            if RESERVED_SHORT.contains(&short) {
                return Err(BuildError::ReservedFlag {
                    command: command.to_string(),
                    flag: format!("-{short}"),
                });
            }
            if let Some(first) = shorts.insert(short, name) {
                return Err(BuildError::DuplicateShortAlias {
                    command: command.to_string(),
                    short,
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
        }

        flag.check_default(command)?;
    }

    Ok(())
}

fn validate_required(spec: &CommandSpec, command: &str) -> Result<(), BuildError> {
    let mut seen: HashSet<&str> = HashSet::new();

    for name in &spec.required_flags {
        if !seen.insert(name.as_str()) {
            return Err(BuildError::DuplicateRequiredFlag {
                command: command.to_string(),
                flag: name.clone(),
            });
        }
        if spec.find_flag(name).is_none() {
            return Err(BuildError::UnknownFlagName {
                command: command.to_string(),
                flag: name.clone(),
            });
        }
    }

    Ok(())
}
