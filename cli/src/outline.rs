//! Indented text outline of a command tree.

use std::fmt::Write;

use clap::{Arg, Command};

/// Renders `root` and its subcommands, one line per command followed by its
/// flags. `max_depth` limits how many levels below the root are printed; 0
/// prints the whole tree.
pub fn render_outline(root: &Command, max_depth: usize) -> String {
    let mut out = String::new();
    write_command(&mut out, root, 0, max_depth);
    out
}

fn write_command(out: &mut String, cmd: &Command, depth: usize, max_depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}{}", cmd.get_name());

    let aliases: Vec<&str> = cmd.get_visible_aliases().collect();
    if !aliases.is_empty() {
        let _ = write!(out, " (aliases: {})", aliases.join(", "));
    }
    if let Some(about) = cmd.get_about() {
        let _ = write!(out, " - {about}");
    }
    out.push('\n');

    for arg in cmd.get_arguments().filter(|arg| !arg.is_positional()) {
        let _ = writeln!(out, "{indent}    {}", describe_flag(arg));
    }

    if max_depth == 0 || depth < max_depth {
        for sub in cmd.get_subcommands() {
            write_command(out, sub, depth + 1, max_depth);
        }
    }
}

fn describe_flag(arg: &Arg) -> String {
    let mut line = match arg.get_long() {
        Some(long) => format!("--{long}"),
        None => arg.get_id().as_str().to_string(),
    };
    if let Some(short) = arg.get_short() {
        let _ = write!(line, ", -{short}");
    }
    if let Some(value) = arg.get_value_names().and_then(|names| names.first()) {
        let _ = write!(line, " <{value}>");
    }

    let defaults: Vec<&str> = arg
        .get_default_values()
        .iter()
        .filter_map(|value| value.to_str())
        .filter(|value| !value.is_empty())
        .collect();
    if !defaults.is_empty() {
        let _ = write!(line, " [default: {}]", defaults.join(", "));
    }
    if arg.is_required_set() {
        line.push_str(" [required]");
    }
    line
}

#[cfg(test)]
mod tests {
    use command_tree_core::{CommandGroup, CommandSpec, FlagSpec, build_command_tree};

    use super::*;

    fn sample() -> Command {
        let root = CommandGroup::new(CommandSpec::new("tool").with_short("Tool root"))
            .with_command(
                CommandSpec::new("serve")
                    .with_alias("s")
                    .with_short("Start the server")
                    .with_flag(FlagSpec::integer("port", Some('p'), "Port").with_default(8080)),
            )
            .with_child(
                CommandGroup::new(CommandSpec::new("config"))
                    .with_command(CommandSpec::new("get").with_run(|_| Ok(()))),
            );
        build_command_tree(&root).unwrap().into_command()
    }

    #[test]
    fn test_outline_lists_commands_and_flags() {
        let text = render_outline(&sample(), 0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "tool - Tool root");
        assert_eq!(lines[1], "  serve (aliases: s) - Start the server");
        assert_eq!(lines[2], "      --port, -p <INT> [default: 8080]");
        assert_eq!(lines[3], "  config");
        assert_eq!(lines[4], "    get");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_outline_depth_limit() {
        let text = render_outline(&sample(), 1);
        assert!(text.contains("  config"));
        assert!(!text.contains("get"));
    }
}
