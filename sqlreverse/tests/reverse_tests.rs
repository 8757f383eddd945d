//! End-to-end tests of the generation pipeline

use sqlreverse::{
    ConnConfig, ConnectionSpec, IndexDef, IndexKind, LanguageRegistry, NameMapper, ReverseError,
    ReverseTarget, Reverser, SchemaColumn, SchemaTable, Settings, SqlType, StaticSource,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn column(name: &str, sql_type: SqlType, nullable: bool) -> SchemaColumn {
    let mut col = SchemaColumn::new(name, sql_type);
    col.nullable = nullable;
    col
}

fn key_column(name: &str, type_name: &str) -> SchemaColumn {
    let mut col = column(name, SqlType::new(type_name), false);
    col.primary_key = true;
    col.auto_increment = true;
    col
}

/// `t_user`, `t_role` and an unprefixed `audit` table
fn user_role_schema() -> Vec<SchemaTable> {
    let mut user = SchemaTable::new("t_user");
    user.add_column(key_column("id", "BIGINT"));
    user.add_column(column("username", SqlType::with_length("VARCHAR", 50), false));
    user.add_column(column("created_at", SqlType::new("DATETIME"), true));

    let mut role = SchemaTable::new("t_role");
    role.add_column(key_column("id", "INT"));
    role.add_column(column("role_name", SqlType::with_length("VARCHAR", 30), false));
    role.add_index(IndexDef {
        name: "uq_role_name".to_string(),
        kind: IndexKind::Unique,
        columns: vec!["role_name".to_string()],
    });

    let mut audit = SchemaTable::new("audit");
    audit.add_column(key_column("id", "INT"));

    vec![user, role, audit]
}

fn orders_schema() -> Vec<SchemaTable> {
    let mut orders = SchemaTable::new("orders");
    orders.add_column(key_column("id", "INT"));
    orders.add_column(column("amount", SqlType::new("DOUBLE"), false));

    let mut log = SchemaTable::new("orders_log");
    log.add_column(key_column("id", "INT"));

    vec![orders, log]
}

fn mysql_spec(conn_str: &str, prefix: &str) -> ConnectionSpec {
    let conf = ConnConfig {
        driver_name: "mysql".to_string(),
        table_prefix: prefix.to_string(),
        dsn: Some(conn_str.to_string()),
        ..Default::default()
    };
    ConnectionSpec::from_config(&conf, None)
}

fn reverser(source: StaticSource) -> Reverser {
    Reverser::new(Arc::new(LanguageRegistry::with_builtins())).with_source(Box::new(source))
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

#[tokio::test]
async fn test_user_role_scenario_in_rust() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");
    let mut target = ReverseTarget {
        output_dir: out.clone(),
        include_tables: vec!["t_*".to_string()],
        ..Default::default()
    };

    let mut reverser = reverser(StaticSource::new().with_tables("memory", user_role_schema()));
    let report = reverser
        .reverse(&mut target, &mysql_spec("memory", "t_"))
        .await
        .unwrap();

    assert_eq!(
        report.written,
        vec![out.join("models.rs"), out.join("queries.rs"), out.join("conn.rs")]
    );
    assert!(report.is_clean());
    assert_eq!(target.extension, ".rs");
    assert_eq!(target.namespace, "models");

    let models = read(&out.join("models.rs"));
    assert!(models.contains("pub struct User {"));
    assert!(models.contains("pub struct Role {"));
    assert!(!models.contains("Audit"));
    assert!(!models.contains("\"audit\""));
    assert!(models.contains("use chrono::NaiveDateTime;"));
    assert!(models.contains(r#"#[orm("pk autoincr BIGINT")]"#));
    assert!(models.contains(r#"#[orm("created DATETIME")]"#));
    assert!(models.contains("pub created_at: NaiveDateTime,"));
    assert!(models.contains(r#"#[orm("notnull unique VARCHAR(30)")]"#));
    assert!(models.contains(r#"#[serde(rename = "role_name")]"#));
    assert!(models.contains("pub role_name: String,"));
    assert!(models.contains(r#"pub const TABLE_NAME: &'static str = "t_user";"#));

    let queries = read(&out.join("queries.rs"));
    assert!(queries.contains("use super::models::*;"));
    assert!(queries.contains("impl User {"));
    assert!(queries.contains(r#"pub const CREATED_COLUMN: &'static str = "created_at";"#));
    assert!(queries.contains(r#""{} WHERE id = ?""#));

    let conn = read(&out.join("conn.rs"));
    assert!(conn.contains("use sqlx::MySqlPool as Pool;"));
    assert!(conn.contains(r#"pub const TABLE_PREFIX: &str = "t_";"#));
}

#[tokio::test]
async fn test_user_role_scenario_in_go() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");
    let mut target = ReverseTarget {
        language: "golang".to_string(),
        output_dir: out.clone(),
        include_tables: vec!["t_*".to_string()],
        table_mapper: NameMapper::Gonic,
        column_mapper: NameMapper::Gonic,
        ..Default::default()
    };

    let mut reverser = reverser(StaticSource::new().with_tables("memory", user_role_schema()));
    reverser
        .reverse(&mut target, &mysql_spec("memory", "t_"))
        .await
        .unwrap();

    let models = read(&out.join("models.go"));
    assert!(models.starts_with("package models\n"));
    assert!(models.contains("\t\"time\"\n"));
    assert!(models.contains("type User struct {"));
    assert!(models.contains("type Role struct {"));
    assert!(models.contains("\tID int64 `json:\"id\" xorm:\"pk autoincr BIGINT\"`"));
    assert!(models.contains("\tCreatedAt time.Time `json:\"created_at\" xorm:\"created DATETIME\"`"));
    assert!(models.contains("`json:\"role_name\" xorm:\"notnull unique VARCHAR(30)\"`"));
    assert!(!models.contains("audit"));

    let queries = read(&out.join("queries.go"));
    assert!(queries.contains("\t\"xorm.io/xorm\"\n"));
    assert!(queries.contains("func (m *User) Save(changes map[string]interface{}) error {"));
    assert!(queries.contains("changes[\"created_at\"] = time.Now()"));
    assert!(queries.contains("m.ID == 0"));

    let conn = read(&out.join("conn.go"));
    assert!(conn.contains("_ \"github.com/go-sql-driver/mysql\""));
    assert!(conn.contains("xorm.NewEngine(\"mysql\", dsn)"));
}

#[tokio::test]
async fn test_exclude_only_filter() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("shop");
    let mut target = ReverseTarget {
        output_dir: out.clone(),
        exclude_tables: vec!["*_log".to_string()],
        ..Default::default()
    };

    let mut reverser = reverser(StaticSource::new().with_tables("memory", orders_schema()));
    reverser
        .reverse(&mut target, &mysql_spec("memory", ""))
        .await
        .unwrap();

    let models = read(&out.join("models.rs"));
    assert!(models.contains("pub struct Orders {"));
    assert!(models.contains("pub amount: f64,"));
    assert!(!models.contains("OrdersLog"));
}

#[tokio::test]
async fn test_multiple_files_one_per_table() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");
    let mut target = ReverseTarget {
        output_dir: out.clone(),
        include_tables: vec!["t_*".to_string()],
        multiple_files: true,
        ..Default::default()
    };

    let mut reverser = reverser(StaticSource::new().with_tables("memory", user_role_schema()));
    let report = reverser
        .reverse(&mut target, &mysql_spec("memory", "t_"))
        .await
        .unwrap();

    assert_eq!(
        report.written,
        vec![out.join("role.rs"), out.join("user.rs"), out.join("conn.rs")]
    );
    assert!(!out.join("models.rs").exists());
    assert!(!out.join("queries.rs").exists());

    let user = read(&out.join("user.rs"));
    assert!(user.contains("pub struct User {"));
    assert!(user.contains("impl User {"));
    assert!(!user.contains("Role"));
    assert!(!user.contains("use super::models"));

    let role = read(&out.join("role.rs"));
    assert!(role.contains("pub struct Role {"));
    assert!(!role.contains("User"));
    assert!(!role.contains("chrono"));
}

#[tokio::test]
async fn test_regeneration_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");
    let mut reverser = reverser(StaticSource::new().with_tables("memory", user_role_schema()));

    let mut target = ReverseTarget {
        output_dir: out.clone(),
        ..Default::default()
    };
    reverser
        .reverse(&mut target, &mysql_spec("memory", "t_"))
        .await
        .unwrap();
    let first = read(&out.join("models.rs"));
    let first_queries = read(&out.join("queries.rs"));

    let mut target = ReverseTarget {
        output_dir: out.clone(),
        ..Default::default()
    };
    reverser
        .reverse(&mut target, &mysql_spec("memory", "t_"))
        .await
        .unwrap();

    assert_eq!(first, read(&out.join("models.rs")));
    assert_eq!(first_queries, read(&out.join("queries.rs")));
}

#[tokio::test]
async fn test_two_sources_with_init_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");

    let mut settings = Settings::default();
    settings.connections.insert(
        "default".to_string(),
        ConnConfig {
            driver_name: "mysql".to_string(),
            table_prefix: "t_".to_string(),
            dsn: Some("default-db".to_string()),
            ..Default::default()
        },
    );
    settings.connections.insert(
        "reporting".to_string(),
        ConnConfig {
            driver_name: "postgres".to_string(),
            dsn: Some("reporting-db".to_string()),
            ..Default::default()
        },
    );
    settings.reverse_target = ReverseTarget {
        output_dir: out.clone(),
        init_namespace: "shop/models".to_string(),
        ..Default::default()
    };

    let source = StaticSource::new()
        .with_tables("default-db", user_role_schema())
        .with_tables("reporting-db", orders_schema());
    let mut reverser = reverser(source);
    let report = reverser
        .exec_settings(&settings, &[] as &[&str])
        .await
        .unwrap();

    assert_eq!(report.written.last(), Some(&out.join("init.rs")));
    assert!(out.join("default/models.rs").exists());
    assert!(out.join("reporting/models.rs").exists());
    assert!(read(&out.join("reporting/conn.rs")).contains("use sqlx::PgPool as Pool;"));
    assert!(read(&out.join("reporting/models.rs")).contains("pub struct OrdersLog {"));

    let init = read(&out.join("init.rs"));
    assert!(init.contains("#[path = \"default/conn.rs\"]\npub mod default;"));
    assert!(init.contains("#[path = \"reporting/conn.rs\"]\npub mod reporting;"));
    assert!(init.contains("\"default\" => default::initialize(url).await?,"));
    assert!(init.contains("\"reporting\" => reporting::initialize(url).await?,"));
}

#[tokio::test]
async fn test_selected_source_only() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");

    let mut settings = Settings::default();
    for (key, dsn) in [("a", "a-db"), ("b", "b-db")] {
        settings.connections.insert(
            key.to_string(),
            ConnConfig {
                driver_name: "sqlite".to_string(),
                dsn: Some(dsn.to_string()),
                ..Default::default()
            },
        );
    }
    settings.reverse_target.output_dir = out.clone();

    let source = StaticSource::new()
        .with_tables("a-db", orders_schema())
        .with_tables("b-db", orders_schema());
    let mut reverser = reverser(source);
    reverser.exec_settings(&settings, &["b"]).await.unwrap();

    assert!(!out.join("a").exists());
    assert!(out.join("b/models.rs").exists());
    assert!(read(&out.join("b/conn.rs")).contains("use sqlx::SqlitePool as Pool;"));
    assert!(!out.join("init.rs").exists());
}

#[tokio::test]
async fn test_failing_source_stops_the_run() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");

    let mut settings = Settings::default();
    for (key, dsn) in [("a", "a-db"), ("b", "missing-db"), ("c", "c-db")] {
        settings.connections.insert(
            key.to_string(),
            ConnConfig {
                driver_name: "mysql".to_string(),
                dsn: Some(dsn.to_string()),
                ..Default::default()
            },
        );
    }
    settings.reverse_target = ReverseTarget {
        output_dir: out.clone(),
        init_namespace: "app/models".to_string(),
        ..Default::default()
    };

    let source = StaticSource::new()
        .with_tables("a-db", orders_schema())
        .with_tables("c-db", orders_schema());
    let err = reverser(source)
        .exec_settings(&settings, &[] as &[&str])
        .await
        .unwrap_err();

    assert!(matches!(err, ReverseError::Metadata { .. }));
    assert!(out.join("a/models.rs").exists());
    assert!(!out.join("c").exists());
    assert!(!out.join("init.rs").exists());
}

#[tokio::test]
async fn test_cache_source_writes_only_cache_bootstrap() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");

    let mut settings = Settings::default();
    settings.connections.insert(
        "cache".to_string(),
        ConnConfig {
            driver_name: "redis".to_string(),
            ..Default::default()
        },
    );
    settings.reverse_target = ReverseTarget {
        output_dir: out.clone(),
        init_namespace: "app/models".to_string(),
        ..Default::default()
    };

    let mut reverser = reverser(StaticSource::new());
    let report = reverser
        .exec_settings(&settings, &[] as &[&str])
        .await
        .unwrap();

    assert_eq!(
        report.written,
        vec![out.join("cache/cache.rs"), out.join("init.rs")]
    );
    assert!(read(&out.join("cache/cache.rs")).contains("use redis::Client as Client;"));
    assert!(read(&out.join("init.rs")).contains("#[path = \"cache/cache.rs\"]"));
}

#[tokio::test]
async fn test_disabled_target_is_a_no_op() {
    let mut settings = Settings::default();
    settings.connections.insert("a".to_string(), ConnConfig::default());
    settings.reverse_target.output_dir = PathBuf::from("/dev/null");

    let report = reverser(StaticSource::new())
        .exec_settings(&settings, &[] as &[&str])
        .await
        .unwrap();
    assert!(report.written.is_empty());
}

#[tokio::test]
async fn test_unknown_connection_names() {
    let mut settings = Settings::default();
    settings.connections.insert("a".to_string(), ConnConfig::default());

    let err = reverser(StaticSource::new())
        .exec_settings(&settings, &["nope"])
        .await
        .unwrap_err();
    assert!(matches!(err, ReverseError::NoConnection(_)));
}

#[tokio::test]
async fn test_empty_connection_is_config_error() {
    let dir = TempDir::new().unwrap();
    let mut target = ReverseTarget {
        output_dir: dir.path().join("models"),
        ..Default::default()
    };
    let spec = ConnectionSpec::from_config(&ConnConfig::default(), None);

    let err = reverser(StaticSource::new())
        .reverse(&mut target, &spec)
        .await
        .unwrap_err();
    assert!(matches!(err, ReverseError::Config(_)));
    assert!(!dir.path().join("models").exists());
}

#[tokio::test]
async fn test_custom_template_takes_priority() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("model.hbs");
    std::fs::write(
        &template,
        "{{#each tables as |table name|}}{{name}}={{table_mapper table.name}};{{/each}}",
    )
    .unwrap();

    let out = dir.path().join("models");
    let target = ReverseTarget {
        output_dir: out.clone(),
        extension: ".txt".to_string(),
        template_path: Some(template),
        query_template_path: Some(dir.path().join("missing.hbs")),
        formatter: "plain".to_string(),
        ..Default::default()
    };

    let mut reverser = reverser(StaticSource::new());
    let written = reverser
        .run_reverse("t_", &target, user_role_schema())
        .unwrap();

    assert_eq!(written, vec![out.join("models.txt")]);
    assert_eq!(
        read(&out.join("models.txt")),
        "audit=Audit;t_role=Role;t_user=User;\n"
    );
}

#[tokio::test]
async fn test_no_language_and_no_template() {
    let dir = TempDir::new().unwrap();
    let target = ReverseTarget {
        language: "cobol".to_string(),
        output_dir: dir.path().join("models"),
        ..Default::default()
    };

    let err = reverser(StaticSource::new())
        .run_reverse("", &target, orders_schema())
        .unwrap_err();
    assert!(matches!(err, ReverseError::Config(_)));
}

#[tokio::test]
async fn test_broken_template_aborts_before_writing() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("model.hbs");
    std::fs::write(&template, "{{#each tables}}").unwrap();

    let out = dir.path().join("models");
    let target = ReverseTarget {
        output_dir: out.clone(),
        template_path: Some(template),
        ..Default::default()
    };

    let err = reverser(StaticSource::new())
        .run_reverse("", &target, orders_schema())
        .unwrap_err();
    assert!(matches!(err, ReverseError::TemplateCompile { .. }));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_format_failure_keeps_earlier_files() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("model.hbs");
    std::fs::write(
        &template,
        "{{#each tables as |table name|}}{{#if (eq name \"t_user\")}}pub struct {{else}}pub struct {{table_mapper table.name}};{{/if}}{{/each}}",
    )
    .unwrap();

    let out = dir.path().join("models");
    let target = ReverseTarget {
        output_dir: out.clone(),
        include_tables: vec!["t_*".to_string()],
        template_path: Some(template),
        multiple_files: true,
        ..Default::default()
    };
    let tables = sqlreverse::filter_tables(user_role_schema(), &target.include_tables, &[]);

    let err = reverser(StaticSource::new())
        .run_reverse("t_", &target, tables)
        .unwrap_err();

    assert!(matches!(err, ReverseError::Format { ref file, .. } if file == &out.join("user")));
    assert!(out.join("role").exists());
    assert!(!out.join("user").exists());
}

#[tokio::test]
async fn test_invalid_field_name_aborts() {
    let dir = TempDir::new().unwrap();
    let mut table = SchemaTable::new("orders");
    table.add_column(column("unit-price", SqlType::new("DOUBLE"), false));

    let target = ReverseTarget {
        output_dir: dir.path().join("models"),
        column_mapper: NameMapper::Same,
        ..Default::default()
    };

    let err = reverser(StaticSource::new())
        .run_reverse("", &target, vec![table])
        .unwrap_err();
    assert!(matches!(
        err,
        ReverseError::InvalidIdentifier { ref field, .. } if field == "unit-price"
    ));
}

#[tokio::test]
async fn test_mixin_errors_are_reported_not_raised() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");
    let mut target = ReverseTarget {
        output_dir: out.clone(),
        apply_mixins: true,
        ..Default::default()
    };

    let applier = |target: &ReverseTarget| {
        vec![ReverseError::Mixin {
            file: target.output_dir.join("models.rs"),
            message: "no such struct".to_string(),
        }]
    };
    let mut reverser = reverser(StaticSource::new().with_tables("memory", orders_schema()))
        .with_mixins(Box::new(applier));
    let report = reverser
        .reverse(&mut target, &mysql_spec("memory", ""))
        .await
        .unwrap();

    assert_eq!(report.written.len(), 3);
    assert_eq!(report.mixin_errors.len(), 1);
    assert!(!report.mixin_errors[0].is_fatal());
    assert!(out.join("models.rs").exists());
}

#[tokio::test]
async fn test_mixins_without_applier_are_skipped() {
    let dir = TempDir::new().unwrap();
    let mut target = ReverseTarget {
        output_dir: dir.path().join("models"),
        apply_mixins: true,
        ..Default::default()
    };

    let report = reverser(StaticSource::new().with_tables("memory", orders_schema()))
        .reverse(&mut target, &mysql_spec("memory", ""))
        .await
        .unwrap();
    assert!(report.is_clean());
}

fn go_target(out: &Path) -> ReverseTarget {
    ReverseTarget {
        language: "golang".to_string(),
        output_dir: out.to_path_buf(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_go_multiple_files_carry_query_imports() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");
    let mut target = ReverseTarget {
        include_tables: vec!["t_*".to_string()],
        table_mapper: NameMapper::Gonic,
        column_mapper: NameMapper::Gonic,
        multiple_files: true,
        ..go_target(&out)
    };

    let mut reverser = reverser(StaticSource::new().with_tables("memory", user_role_schema()));
    let report = reverser
        .reverse(&mut target, &mysql_spec("memory", "t_"))
        .await
        .unwrap();

    assert_eq!(
        report.written,
        vec![out.join("role.go"), out.join("user.go"), out.join("conn.go")]
    );
    assert!(!out.join("models.go").exists());

    let user = read(&out.join("user.go"));
    assert!(user.starts_with("package models\n"));
    assert_eq!(user.matches("package ").count(), 1);
    assert!(user.contains("\t\"time\"\n"));
    assert!(user.contains("\t\"xorm.io/xorm\"\n"));
    assert!(user.contains("type User struct {"));
    assert!(user.contains("func (m *User) Save(changes map[string]interface{}) error {"));
    assert!(user.contains("ExecTx(func(tx *xorm.Session) (int64, error) {"));
    assert!(!user.contains("Role"));

    let role = read(&out.join("role.go"));
    assert!(role.contains("\t\"xorm.io/xorm\"\n"));
    assert!(!role.contains("\"time\""));
    assert!(!role.contains("User"));
}

#[tokio::test]
async fn test_two_sources_with_init_file_in_go() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");

    let mut settings = Settings::default();
    settings.connections.insert(
        "default".to_string(),
        ConnConfig {
            driver_name: "mysql".to_string(),
            table_prefix: "t_".to_string(),
            dsn: Some("default-db".to_string()),
            ..Default::default()
        },
    );
    settings.connections.insert(
        "reporting".to_string(),
        ConnConfig {
            driver_name: "postgres".to_string(),
            dsn: Some("reporting-db".to_string()),
            ..Default::default()
        },
    );
    settings.reverse_target = ReverseTarget {
        init_namespace: "shop/models".to_string(),
        ..go_target(&out)
    };

    let source = StaticSource::new()
        .with_tables("default-db", user_role_schema())
        .with_tables("reporting-db", orders_schema());
    let report = reverser(source)
        .exec_settings(&settings, &[] as &[&str])
        .await
        .unwrap();

    assert_eq!(report.written.last(), Some(&out.join("init.go")));
    assert!(read(&out.join("default/models.go")).starts_with("package db\n"));
    assert!(read(&out.join("reporting/models.go")).starts_with("package reporting\n"));
    assert!(read(&out.join("reporting/conn.go")).contains("_ \"github.com/lib/pq\""));

    let init = read(&out.join("init.go"));
    assert!(init.starts_with("package models\n"));
    assert!(init.contains("\tdb \"shop/models/default\"\n"));
    assert!(init.contains("\treporting \"shop/models/reporting\"\n"));
    assert!(init.contains("\t\tcase \"default\":\n"));
    assert!(init.contains("\t\tcase \"reporting\":\n"));
    assert!(init.contains("db.Initialize(url)"));
    assert!(init.contains("reporting.Initialize(url)"));
}

#[tokio::test]
async fn test_go_cache_source_bootstrap() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models");

    let mut settings = Settings::default();
    settings.connections.insert(
        "cache".to_string(),
        ConnConfig {
            driver_name: "redis".to_string(),
            ..Default::default()
        },
    );
    settings.reverse_target = ReverseTarget {
        init_namespace: "app/models".to_string(),
        ..go_target(&out)
    };

    let report = reverser(StaticSource::new())
        .exec_settings(&settings, &[] as &[&str])
        .await
        .unwrap();

    assert_eq!(
        report.written,
        vec![out.join("cache/cache.go"), out.join("init.go")]
    );
    let cache = read(&out.join("cache/cache.go"));
    assert!(cache.starts_with("package cache\n"));
    assert!(cache.contains("\t\"github.com/gomodule/redigo/redis\"\n"));
    assert!(cache.contains("var pool *redis.Pool"));

    let init = read(&out.join("init.go"));
    assert!(init.contains("\tcache \"app/models/cache\"\n"));
    assert!(init.contains("cache.Initialize(url)"));
}

/// Go target ready for `run_reverse`, which does not default it
fn fixed_go_target(out: &Path) -> ReverseTarget {
    ReverseTarget {
        extension: ".go".to_string(),
        namespace: "models".to_string(),
        ..go_target(out)
    }
}

fn sessions_table() -> SchemaTable {
    let mut table = SchemaTable::new("sessions");
    table.comment = "Login sessions\nOne row per login".to_string();
    table.add_column(key_column("id", "BIGINT"));
    table
}

#[tokio::test]
async fn test_multi_line_table_comment() {
    let dir = TempDir::new().unwrap();

    let out = dir.path().join("rust");
    let target = ReverseTarget {
        output_dir: out.clone(),
        extension: ".rs".to_string(),
        ..Default::default()
    };
    reverser(StaticSource::new())
        .run_reverse("", &target, vec![sessions_table()])
        .unwrap();
    let models = read(&out.join("models.rs"));
    assert!(models.contains("/// Login sessions\n/// One row per login\n"));
    assert!(models.contains("pub struct Sessions {"));

    let out = dir.path().join("go");
    reverser(StaticSource::new())
        .run_reverse("", &fixed_go_target(&out), vec![sessions_table()])
        .unwrap();
    let models = read(&out.join("models.go"));
    assert!(models.contains("// Sessions Login sessions\n// One row per login\ntype Sessions struct {"));
}

#[tokio::test]
async fn test_unicode_column_names() {
    let dir = TempDir::new().unwrap();
    let mut table = SchemaTable::new("users");
    table.add_column(column("用户名", SqlType::with_length("VARCHAR", 20), false));

    let out = dir.path().join("models");
    reverser(StaticSource::new())
        .run_reverse("", &fixed_go_target(&out), vec![table])
        .unwrap();

    let models = read(&out.join("models.go"));
    assert!(models.contains("\t用户名 string `json:\"用户名\" xorm:\"notnull VARCHAR(20)\"`"));
}

#[tokio::test]
async fn test_go_keyword_field_name_aborts() {
    let dir = TempDir::new().unwrap();
    let mut table = SchemaTable::new("items");
    table.add_column(column("type", SqlType::with_length("VARCHAR", 20), true));

    let out = dir.path().join("models");
    let target = ReverseTarget {
        column_mapper: NameMapper::Same,
        ..fixed_go_target(&out)
    };

    let err = reverser(StaticSource::new())
        .run_reverse("", &target, vec![table])
        .unwrap_err();
    assert!(matches!(
        err,
        ReverseError::InvalidIdentifier { ref field, .. } if field == "type"
    ));
    assert!(!out.exists());
}
