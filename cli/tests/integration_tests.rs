use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const DEPLOY_YAML: &str = r#"
parent:
  use: deploy
  short: Deployment tool
commands:
  - use: serve
    short: Start the server
    aliases: [s]
    flags:
      - name: port
        short: p
        type: int
        help: Port to bind
        default: 8080
      - name: host
        type: string
        default: localhost
    handler: serve
  - use: push
    short: Push a release
    flags:
      - name: region
        type: string
      - name: zone
        type: string
    required_flags: [region, zone]
    handler: push
subcommands:
  - parent:
      use: config
      short: Manage configuration
    commands:
      - use: get <key>
        args: { exact: 1 }
        handler: config-get
"#;

fn write_doc(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).expect("failed to write document");
    path
}

fn cmdtree(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cmdtree"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run cmdtree")
}

fn cmdtree_on(sub: &str, doc: &Path, extra: &[&str]) -> Output {
    let doc = doc.to_str().expect("utf-8 temp path");
    let mut args = vec!["doc", sub, doc];
    args.extend_from_slice(extra);
    cmdtree(&args)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn version_prints_package_version() {
    let out = cmdtree(&["version"]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out).trim(),
        format!("cmdtree {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn bare_invocation_prints_help() {
    let out = cmdtree(&[]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("version"));
    assert!(text.contains("doc"));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let out = cmdtree(&["frobnicate"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("frobnicate"));
}

#[test]
fn validate_reports_command_count() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("validate", &doc, &[]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Valid: 5 command(s)"));
}

#[test]
fn document_alias_reaches_doc_group() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);
    let doc = doc.to_str().unwrap();

    let out = cmdtree(&["document", "validate", doc]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

#[test]
fn validate_rejects_undeclared_required_flag() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(
        &dir,
        "broken.yaml",
        r#"
parent: { use: app }
commands:
  - use: deploy
    flags:
      - { name: zone, type: string }
    required_flags: [region, zone]
"#,
    );

    let out = cmdtree_on("validate", &doc, &[]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.starts_with("error: "), "stderr: {err}");
    assert!(err.contains("required flag `--region` is not declared"));
}

#[test]
fn validate_rejects_unsupported_flag_type() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(
        &dir,
        "float.yaml",
        r#"
parent: { use: app }
commands:
  - use: scale
    flags:
      - { name: ratio, type: float }
"#,
    );

    let out = cmdtree_on("validate", &doc, &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("unsupported type `float`"));
}

#[test]
fn validate_rejects_mismatched_default() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(
        &dir,
        "mismatch.json",
        r#"{
  "parent": { "use": "app" },
  "commands": [
    { "use": "serve", "flags": [ { "name": "port", "type": "int", "default": "eighty" } ] }
  ]
}"#,
    );

    let out = cmdtree_on("validate", &doc, &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("--port"));
}

#[test]
fn validate_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.yaml");

    let out = cmdtree_on("validate", &missing, &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Failed to load"));
}

#[test]
fn show_prints_outline() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("show", &doc, &[]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("deploy - Deployment tool\n"));
    assert!(text.contains("  serve (aliases: s) - Start the server"));
    assert!(text.contains("--port, -p <INT> [default: 8080]"));
    assert!(text.contains("--host <STRING> [default: localhost]"));
    assert!(text.contains("--region <STRING> [required]"));
    assert!(text.ends_with("\n    get\n"));
}

#[test]
fn show_honours_depth_limit() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("show", &doc, &["--depth", "1"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("  config - Manage configuration"));
    assert!(!text.contains("get"));

    let out = cmdtree_on("show", &doc, &["-d", "-1"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("--depth must not be negative"));
}

#[test]
fn show_uses_file_stem_for_parentless_document() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(
        &dir,
        "toolbox.yaml",
        "commands:\n  - { use: status, short: Show status }\n",
    );

    let out = cmdtree_on("show", &doc, &[]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).starts_with("toolbox\n  status - Show status\n"));
}

#[test]
fn usage_prints_nested_command_help() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("usage", &doc, &["--command", "config get"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("get <key>"));

    let out = cmdtree_on("usage", &doc, &["-c", "s"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Start the server"));
}

#[test]
fn usage_requires_command_flag() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("usage", &doc, &[]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("--command"));
}

#[test]
fn usage_rejects_unknown_path() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("usage", &doc, &["-c", "config nope"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("No command `config nope`"));
}

#[test]
fn parse_prints_invocation_json() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("parse", &doc, &["--", "s", "--port", "9000"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["path"], serde_json::json!(["deploy", "serve"]));
    assert_eq!(value["flags"]["port"], 9000);
    assert_eq!(value["flags"]["host"], "localhost");
    assert_eq!(value["args"], serde_json::json!([]));
}

#[test]
fn parse_enforces_required_flag_group() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("parse", &doc, &["--", "push", "--region", "eu"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("--zone"));

    let out = cmdtree_on("parse", &doc, &["--", "push", "--region", "eu", "--zone", "b"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

#[test]
fn parse_rejects_bad_integer() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("parse", &doc, &["--", "serve", "-p", "eighty"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("eighty"));
}

#[test]
fn run_dispatches_to_named_handler() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("run", &doc, &["--", "config", "get", "editor"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["handler"], "config-get");
    assert_eq!(value["path"], serde_json::json!(["deploy", "config", "get"]));
    assert_eq!(value["args"], serde_json::json!(["editor"]));
}

#[test]
fn run_enforces_positional_rule() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("run", &doc, &["--", "config", "get"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("accepts 1 arg(s), received 0"));
}

#[test]
fn run_prints_help_for_grouping_command() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "deploy.yaml", DEPLOY_YAML);

    let out = cmdtree_on("run", &doc, &["--", "config"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Manage configuration"));

    let out = cmdtree_on("run", &doc, &["--", "serve", "--help"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Port to bind"));
}
