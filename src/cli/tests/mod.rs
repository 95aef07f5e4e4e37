//! Unit tests for CLI module
//!
//! Tests routing, argument validation, formatting and command execution
//! against an in-memory backend.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::{fs, sync::Arc};

use serde_json::json;
use tempfile::TempDir;

use crate::{
    backend::{MemoryBackend, Operation},
    cli::{
        ArgType, CliError, CliService, CommandArg, CommandMetadata, CommandRegistry,
        ConfigContext,
        formatting::{OutputFormat, format_rows, render_node, tree_rows},
        route,
    },
    config_store::{ConfigError, ConfigKey, ConfigNode, ConfigService, ConfigTree, Namespace},
    settings::Settings,
};

fn service_over(backend: Arc<MemoryBackend>, format: OutputFormat) -> CliService {
    let namespace = Namespace::new("app", "test").unwrap();
    let service = ConfigService::with_backend(namespace, backend);
    let settings = Settings::default().with_namespace("app", "test");

    CliService::new(ConfigContext::new(service, settings, format))
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn metadata(args: Vec<CommandArg>) -> CommandMetadata {
    CommandMetadata {
        name: "sample".to_string(),
        description: String::new(),
        args,
        examples: Vec::new(),
        category: "config".to_string(),
    }
}

fn arg(required: bool, variadic: bool) -> CommandArg {
    CommandArg {
        name: "value".to_string(),
        description: String::new(),
        required,
        variadic,
        value_type: ArgType::String,
    }
}

#[test]
fn route_splits_category_and_command() {
    assert_eq!(route("config:set"), ("config", "set"));
    assert_eq!(route("config:nuke"), ("config", "nuke"));
    assert_eq!(route("config"), ("config", "show"));
}

#[test]
fn validate_args_counts() {
    let fixed = metadata(vec![arg(true, false), arg(false, false)]);

    assert!(CommandRegistry::validate_args(&fixed, &args(&["a"])).is_ok());
    assert!(CommandRegistry::validate_args(&fixed, &args(&["a", "b"])).is_ok());
    assert!(matches!(
        CommandRegistry::validate_args(&fixed, &args(&[])),
        Err(CliError::InvalidArguments(_))
    ));
    assert!(matches!(
        CommandRegistry::validate_args(&fixed, &args(&["a", "b", "c"])),
        Err(CliError::InvalidArguments(_))
    ));
}

#[test]
fn validate_args_variadic_tail() {
    let variadic = metadata(vec![arg(true, true)]);

    assert!(CommandRegistry::validate_args(&variadic, &args(&["a", "b", "c"])).is_ok());
    assert!(CommandRegistry::validate_args(&variadic, &args(&[])).is_err());
}

#[test]
fn rows_are_aligned() {
    let rows = vec![
        ("a".to_string(), "1".to_string()),
        ("database.host".to_string(), "db1".to_string()),
    ];

    let table = format_rows(&rows);

    assert_eq!(table, "a              1\ndatabase.host  db1");
}

#[test]
fn tree_rows_join_below_root() {
    let tree = ConfigTree::from_json(&json!({"host": "db1", "pool": {"size": "5"}})).unwrap();
    let root = ConfigKey::parse("database").unwrap();

    let rows = tree_rows(Some(&root), &tree);

    assert_eq!(
        rows,
        vec![
            ("database.host".to_string(), "db1".to_string()),
            ("database.pool.size".to_string(), "5".to_string()),
        ]
    );
}

#[test]
fn render_json_is_pretty_object() {
    let tree = ConfigTree::from_json(&json!({"a": {"b": "1"}})).unwrap();

    let rendered =
        render_node("/app/test", None, &ConfigNode::from(tree), OutputFormat::Json).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(parsed, json!({"a": {"b": "1"}}));
    assert!(rendered.contains('\n'));
}

#[test]
fn render_console_leaf_uses_sub_key() {
    let key = ConfigKey::parse("database.host").unwrap();
    let node = ConfigNode::Leaf("db1".to_string());

    let rendered = render_node("/app/test", Some(&key), &node, OutputFormat::Console).unwrap();

    assert!(rendered.contains("/app/test"));
    assert!(rendered.ends_with("database.host  db1"));
}

#[test]
fn render_console_empty_tree_is_header_only() {
    let rendered = render_node(
        "/app/test",
        None,
        &ConfigNode::from(ConfigTree::new()),
        OutputFormat::Console,
    )
    .unwrap();

    assert_eq!(rendered.lines().count(), 1);
}

#[tokio::test]
async fn set_then_show() {
    let backend = Arc::new(MemoryBackend::new());
    let cli = service_over(backend.clone(), OutputFormat::Console);

    let output = cli
        .execute_command("config", "set", &args(&["database.host=db1", "port=5432"]))
        .await
        .unwrap();
    assert!(output.contains("set:"));
    assert!(output.contains("database.host"));

    let shown = cli.execute_command("config", "show", &[]).await.unwrap();
    assert!(shown.contains("database.host  db1"));
    assert!(shown.contains("port"));

    let stored = backend.snapshot().await;
    assert_eq!(stored.get("/app/test/database/host").map(String::as_str), Some("db1"));
}

#[tokio::test]
async fn show_sub_key_as_json() {
    let backend = Arc::new(MemoryBackend::with_entries([
        ("/app/test/database/host", "db1"),
        ("/app/test/database/port", "5432"),
        ("/app/test/other", "x"),
    ]));
    let cli = service_over(backend, OutputFormat::Json);

    let output = cli
        .execute_command("config", "show", &args(&["database"]))
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed, json!({"host": "db1", "port": "5432"}));
}

#[tokio::test]
async fn show_missing_sub_key_is_not_found() {
    let cli = service_over(Arc::new(MemoryBackend::new()), OutputFormat::Console);

    let result = cli
        .execute_command("config", "show", &args(&["nothing.here"]))
        .await;

    assert!(matches!(
        result,
        Err(CliError::Config(ConfigError::NotFound(_)))
    ));
}

#[tokio::test]
async fn show_leaf_sub_key_names_full_key() {
    let backend = Arc::new(MemoryBackend::with_entries([("/app/test/database/host", "db1")]));
    let cli = service_over(backend, OutputFormat::Console);

    let output = cli
        .execute_command("config", "show", &args(&["database.host"]))
        .await
        .unwrap();

    assert!(output.contains("database.host"));
    assert!(output.contains("db1"));
}

#[tokio::test]
async fn show_malformed_sub_key_is_invalid() {
    let cli = service_over(Arc::new(MemoryBackend::new()), OutputFormat::Console);

    let result = cli
        .execute_command("config", "show", &args(&["database..host"]))
        .await;

    assert!(matches!(
        result,
        Err(CliError::Config(ConfigError::InvalidKey { .. }))
    ));
}

#[tokio::test]
async fn malformed_pair_writes_nothing() {
    let backend = Arc::new(MemoryBackend::new());
    let cli = service_over(backend.clone(), OutputFormat::Console);

    let result = cli
        .execute_command("config", "set", &args(&["a=1", "broken"]))
        .await;

    assert!(matches!(
        result,
        Err(CliError::Config(ConfigError::MalformedPair { .. }))
    ));
    assert!(backend.snapshot().await.is_empty());
}

#[tokio::test]
async fn unset_lists_removed_keys() {
    let backend = Arc::new(MemoryBackend::with_entries([("/app/test/a", "1")]));
    let cli = service_over(backend.clone(), OutputFormat::Console);

    let output = cli
        .execute_command("config", "unset", &args(&["a", "missing"]))
        .await
        .unwrap();

    assert!(output.contains("unset:"));
    assert!(output.contains('a'));
    assert!(backend.snapshot().await.is_empty());
}

#[tokio::test]
async fn nuke_reports_namespace() {
    let backend = Arc::new(MemoryBackend::with_entries([
        ("/app/test/a", "1"),
        ("/app/other/a", "2"),
    ]));
    let cli = service_over(backend.clone(), OutputFormat::Console);

    let output = cli.execute_command("config", "nuke", &[]).await.unwrap();

    assert!(output.contains("destroyed:"));
    assert!(output.contains("/app/test"));
    let remaining = backend.snapshot().await;
    assert_eq!(remaining.len(), 1);
    assert!(remaining.contains_key("/app/other/a"));
}

#[tokio::test]
async fn nuke_partial_failure_surfaces_report() {
    let backend = Arc::new(MemoryBackend::with_entries([
        ("/app/test/a", "1"),
        ("/app/test/b", "2"),
    ]));
    backend.fail_on(Operation::Delete, "/app/test/b").await;
    let cli = service_over(backend, OutputFormat::Console);

    let Err(CliError::Config(ConfigError::PartialFailure { report })) =
        cli.execute_command("config", "nuke", &[]).await
    else {
        panic!("expected a partial failure");
    };

    assert_eq!(report.succeeded, vec!["a".to_string()]);
    assert_eq!(report.failed_keys(), vec!["b"]);
}

#[tokio::test]
async fn import_reads_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    fs::write(&path, r#"{"host": "db1", "port": 5432}"#).unwrap();

    let backend = Arc::new(MemoryBackend::new());
    let cli = service_over(backend.clone(), OutputFormat::Console);

    let output = cli
        .execute_command(
            "config",
            "import",
            &[path.display().to_string(), "database".to_string()],
        )
        .await
        .unwrap();

    assert!(output.contains("2 keys"));
    let stored = backend.snapshot().await;
    assert_eq!(stored.get("/app/test/database/port").map(String::as_str), Some("5432"));
}

#[tokio::test]
async fn import_missing_file_names_path() {
    let cli = service_over(Arc::new(MemoryBackend::new()), OutputFormat::Console);

    let result = cli
        .execute_command("config", "import", &args(&["/nonexistent/renv.json"]))
        .await;

    assert!(matches!(result, Err(CliError::ImportFile { .. })));
}

#[tokio::test]
async fn import_rejects_non_object() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("list.json");
    fs::write(&path, "[1, 2]").unwrap();
    let cli = service_over(Arc::new(MemoryBackend::new()), OutputFormat::Console);

    let result = cli
        .execute_command("config", "import", &[path.display().to_string()])
        .await;

    assert!(matches!(
        result,
        Err(CliError::Config(ConfigError::InvalidImport(_)))
    ));
}

#[tokio::test]
async fn dump_covers_every_namespace() {
    let backend = Arc::new(MemoryBackend::with_entries([
        ("/app/test/a", "1"),
        ("/billing/prod/b", "2"),
    ]));
    let cli = service_over(backend, OutputFormat::Json);

    let output = cli.execute_command("config", "dump", &[]).await.unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        parsed,
        json!({"app": {"test": {"a": "1"}}, "billing": {"prod": {"b": "2"}}})
    );
}

#[tokio::test]
async fn unknown_command_is_reported() {
    let cli = service_over(Arc::new(MemoryBackend::new()), OutputFormat::Console);

    let result = cli.execute_command("config", "explode", &[]).await;

    assert!(matches!(result, Err(CliError::CommandNotFound(_))));
}

#[tokio::test]
async fn help_lists_every_command() {
    let cli = service_over(Arc::new(MemoryBackend::new()), OutputFormat::Console);

    let help = cli.help();

    for invocation in [
        "config:set",
        "config:unset",
        "config:import",
        "config:nuke",
        "config:dump",
        "config:merge",
    ] {
        assert!(help.contains(invocation), "missing {invocation}");
    }
    assert_eq!(
        cli.list_all(),
        vec![(
            "config".to_string(),
            args(&["dump", "import", "merge", "nuke", "set", "show", "unset"])
        )]
    );
}
