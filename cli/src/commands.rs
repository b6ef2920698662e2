//! The `cmdtree` command tree and its handlers.

use std::path::Path;
use std::sync::Arc;

use clap::error::ErrorKind;
use command_tree_core::{
    CommandList, CommandSpec, CommandTree, DEFAULT_ROOT_NAME, ExecError, Execution, FlagSpec,
    HandlerRegistry, Invocation, PositionalArgs, RunFn, TreeBuilder, TreeDocument,
};
use serde::Serialize;
use tracing::debug;

use crate::outline::render_outline;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct RootCommands;

impl CommandList for RootCommands {
    fn parent_command(&self) -> Option<CommandSpec> {
        Some(
            CommandSpec::new("cmdtree")
                .with_short("Inspect and exercise declarative command tree documents")
                .with_long(
                    "Build command trees declared in YAML or JSON documents, report \
                     declaration errors, and resolve command lines against them.",
                ),
        )
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("version")
                .with_short("Print the cmdtree version")
                .with_args(PositionalArgs::NoArgs)
                .with_run(run_version),
        ]
    }

    fn subcommands(&self) -> Vec<Box<dyn CommandList>> {
        vec![Box::new(DocumentCommands)]
    }
}

struct DocumentCommands;

impl CommandList for DocumentCommands {
    fn parent_command(&self) -> Option<CommandSpec> {
        Some(
            CommandSpec::new("doc")
                .with_alias("document")
                .with_short("Work with tree documents"),
        )
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("validate <FILE>")
                .with_short("Build a document's tree and report the first error")
                .with_args(PositionalArgs::Exact(1))
                .with_run(run_validate),
            CommandSpec::new("show <FILE>")
                .with_short("Print an outline of a document's tree")
                .with_flag(FlagSpec::integer(
                    "depth",
                    Some('d'),
                    "Levels below the root to print (0 prints everything)",
                ))
                .with_args(PositionalArgs::Exact(1))
                .with_run(run_show),
            CommandSpec::new("usage <FILE> --command <PATH>")
                .with_short("Print the help text of one command in a document")
                .with_flag(FlagSpec::string(
                    "command",
                    Some('c'),
                    "Space-separated command path below the root",
                ))
                .with_required_flag("command")
                .with_args(PositionalArgs::Exact(1))
                .with_run(run_usage),
            CommandSpec::new("parse <FILE> [-- ARGV...]")
                .with_short("Resolve a command line against a document and print it as JSON")
                .with_args(PositionalArgs::Min(1))
                .with_run(run_parse),
            CommandSpec::new("run <FILE> [-- ARGV...]")
                .with_short("Execute a command line against a document")
                .with_long(
                    "Execute a command line against a document. Every handler named in \
                     the document prints its name and the resolved invocation as JSON.",
                )
                .with_args(PositionalArgs::Min(1))
                .with_run(run_run),
        ]
    }
}

#[derive(Serialize)]
struct HandlerReport<'a> {
    handler: &'a str,
    #[serde(flatten)]
    invocation: &'a Invocation,
}

fn echo_handlers() -> HandlerRegistry {
    HandlerRegistry::new().with_fallback(|name| {
        let handler = name.to_string();
        let run: RunFn = Arc::new(move |invocation: &Invocation| -> Result<(), String> {
            let report = HandlerReport {
                handler: &handler,
                invocation,
            };
            let raw = serde_json::to_string_pretty(&report)
                .map_err(|err| format!("Failed to serialize invocation: {err}"))?;
            println!("{raw}");
            Ok(())
        });
        run
    })
}

fn load_tree(file: &str) -> Result<CommandTree, String> {
    let path = Path::new(file);
    let document = TreeDocument::load(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    let group = document
        .into_group(&echo_handlers())
        .map_err(|err| format!("'{}': {err}", path.display()))?;

    let root_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(DEFAULT_ROOT_NAME);
    debug!(file = %path.display(), root = root_name, "Building document tree");

    TreeBuilder::new()
        .root_name(root_name)
        .build(&group)
        .map_err(|err| format!("'{}': {err}", path.display()))
}

fn document_argv(tree: &CommandTree, args: &[String]) -> Vec<String> {
    std::iter::once(tree.command().get_name().to_string())
        .chain(args.iter().cloned())
        .collect()
}

fn describe(err: ExecError) -> String {
    match err {
        ExecError::Usage(err) => err
            .to_string()
            .trim_start_matches("error: ")
            .trim_end()
            .to_string(),
        other => other.to_string(),
    }
}

/// Help requested inside the forwarded command line is printed, not failed.
fn finish_usage(err: ExecError) -> Result<(), String> {
    match err {
        ExecError::Usage(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            print!("{}", err.render());
            Ok(())
        }
        other => Err(describe(other)),
    }
}

fn run_version(_: &Invocation) -> Result<(), String> {
    println!("cmdtree {PACKAGE_VERSION}");
    Ok(())
}

fn run_validate(inv: &Invocation) -> Result<(), String> {
    let tree = load_tree(&inv.args[0])?;
    println!(
        "Valid: {} command(s) in '{}'.",
        tree.command_count(),
        inv.args[0]
    );
    Ok(())
}

fn run_show(inv: &Invocation) -> Result<(), String> {
    let depth = inv.integer("depth").unwrap_or(0);
    let depth = usize::try_from(depth).map_err(|_| "--depth must not be negative".to_string())?;
    let tree = load_tree(&inv.args[0])?;
    print!("{}", render_outline(tree.command(), depth));
    Ok(())
}

fn run_usage(inv: &Invocation) -> Result<(), String> {
    let tree = load_tree(&inv.args[0])?;
    let command = inv.string("command").unwrap_or_default();
    let path: Vec<&str> = command.split_whitespace().collect();
    let help = tree
        .render_help(&path)
        .ok_or_else(|| format!("No command `{command}` in '{}'", inv.args[0]))?;
    print!("{help}");
    Ok(())
}

fn run_parse(inv: &Invocation) -> Result<(), String> {
    let tree = load_tree(&inv.args[0])?;
    match tree.resolve_from(document_argv(&tree, &inv.args[1..])) {
        Ok(resolved) => {
            let raw = serde_json::to_string_pretty(&resolved)
                .map_err(|err| format!("Failed to serialize invocation: {err}"))?;
            println!("{raw}");
            Ok(())
        }
        Err(err) => finish_usage(err),
    }
}

fn run_run(inv: &Invocation) -> Result<(), String> {
    let tree = load_tree(&inv.args[0])?;
    match tree.execute_from(document_argv(&tree, &inv.args[1..])) {
        Ok(Execution::Ran(_)) => Ok(()),
        Ok(Execution::Help(text)) => {
            print!("{text}");
            Ok(())
        }
        Err(err) => finish_usage(err),
    }
}
