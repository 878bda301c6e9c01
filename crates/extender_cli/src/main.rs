//! Command-line driver for the extender engine.
//!
//! # Responsibility
//! - Exercise `extender_core` wiring from a plain executable.
//! - Print deterministic JSON so output can be diffed in local checks.
//!
//! # Commands
//! - `version`
//! - `coerce <value> [value_type]`
//! - `export <config.json> <annotation|metadata> <id>`
//! - `import <config.json> <records.json>`
//!
//! `export` and `import` load the config first and start file logging when
//! it names a `log_dir`.

use extender_core::{
    detect_value_type, export_extender, import_record, load_config, open_db, AttrValue,
    ExtenderConfig, ExtenderKind, ExtenderRepository, ExternalRecord, MemoryEntity,
    MemoryEntityStore, SqliteExtenderRepository,
};
use log::{error, info};
use serde_json::json;
use std::process::ExitCode;

const USAGE: &str = "usage: extender_cli <version | coerce <value> [value_type] | \
export <config.json> <annotation|metadata> <id> | import <config.json> <records.json>>";

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let args = args.iter().map(String::as_str).collect::<Vec<_>>();

    match run(&args) {
        Ok(output) => {
            println!("{output:#}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("event=cli_command module=cli status=error");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[&str]) -> Result<serde_json::Value, String> {
    match args {
        ["version"] => Ok(json!({ "extender_core": extender_core::core_version() })),
        ["coerce", value] => coerce(value, ""),
        ["coerce", value, value_type] => coerce(value, value_type),
        ["export", config_path, kind, id] => export(&start(config_path)?, kind, id),
        ["import", config_path, records_path] => import(&start(config_path)?, records_path),
        _ => Err(USAGE.to_string()),
    }
}

fn start(config_path: &str) -> Result<ExtenderConfig, String> {
    let config = load_config(config_path).map_err(|err| err.to_string())?;
    if config.init_logging().map_err(|err| err.to_string())? {
        info!("event=cli_start module=cli status=ok");
    }
    Ok(config)
}

fn coerce(value: &str, explicit_type: &str) -> Result<serde_json::Value, String> {
    let raw = AttrValue::from(value);
    let value_type = detect_value_type(&raw, explicit_type);
    let read = value_type.read(&raw).map_err(|err| err.to_string())?;
    Ok(json!({
        "value_type": value_type.as_str(),
        "value": read,
    }))
}

fn export(config: &ExtenderConfig, kind: &str, id: &str) -> Result<serde_json::Value, String> {
    let kind = ExtenderKind::parse(kind).ok_or_else(|| format!("unknown extender kind `{kind}`"))?;
    let id = id
        .parse::<i64>()
        .map_err(|err| format!("invalid extender id `{id}`: {err}"))?;
    let db_path = config
        .db_path
        .as_deref()
        .ok_or_else(|| "config has no db_path; export needs a database".to_string())?;

    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let repo = SqliteExtenderRepository::new(&conn);
    let extender = repo
        .get(kind, id)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| format!("{kind} {id} not found"))?;

    let record = export_extender(&extender, &config.external_ids());
    serde_json::to_value(record).map_err(|err| err.to_string())
}

fn import(config: &ExtenderConfig, records_path: &str) -> Result<serde_json::Value, String> {
    let raw = std::fs::read_to_string(records_path)
        .map_err(|err| format!("failed to read `{records_path}`: {err}"))?;
    let records: Vec<ExternalRecord> =
        serde_json::from_str(&raw).map_err(|err| format!("invalid records file: {err}"))?;

    let ids = config.external_ids();
    let store = MemoryEntityStore::new(ids.clone());
    for guid in records
        .iter()
        .filter_map(|record| record.entity_uuid())
        .filter_map(|uuid| ids.uuid_to_guid(uuid))
    {
        if store.committed(guid).is_none() {
            store.insert(MemoryEntity::new(guid));
        }
    }

    let results = records
        .iter()
        .map(|record| match import_record(&store, record) {
            Ok(action) => json!({ "status": "ok", "action": action.as_str() }),
            Err(err) => json!({ "status": "error", "error": err.to_string() }),
        })
        .collect::<Vec<_>>();
    Ok(json!({ "results": results }))
}

#[cfg(test)]
mod tests {
    use super::run;
    use extender_core::{open_db, Extender, ExtenderKind, SqliteExtenderRepository};
    use std::path::Path;

    fn write_config(dir: &Path, body: serde_json::Value) -> String {
        let path = dir.join("config.json");
        std::fs::write(&path, body.to_string()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn export_reads_db_path_and_site_url_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("extenders.db");
        let conn = open_db(&db_path).unwrap();
        let repo = SqliteExtenderRepository::new(&conn);
        let id = Extender::new(ExtenderKind::Metadata, 42, 7, "color", "blue")
            .save(&repo)
            .unwrap();
        drop(conn);

        let config = write_config(
            dir.path(),
            serde_json::json!({
                "site_url": "https://example.org",
                "db_path": db_path.to_str().unwrap(),
            }),
        );
        let id = id.to_string();
        let output = run(&["export", config.as_str(), "metadata", id.as_str()]).unwrap();

        assert_eq!(
            output["attributes"]["entity_uuid"],
            "https://example.org/export/opendd/42/"
        );
        assert_eq!(output["body"], "blue");
    }

    #[test]
    fn export_without_db_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            write_config(dir.path(), serde_json::json!({ "site_url": "https://example.org" }));
        let err = run(&["export", config.as_str(), "metadata", "1"]).unwrap_err();
        assert!(err.contains("db_path"));
    }

    #[test]
    fn import_resolves_entities_against_configured_site_and_starts_logging() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let config = write_config(
            dir.path(),
            serde_json::json!({
                "site_url": "https://example.org/",
                "log_level": "info",
                "log_dir": log_dir.to_str().unwrap(),
            }),
        );
        let records = dir.path().join("records.json");
        std::fs::write(
            &records,
            serde_json::json!([
                {
                    "attributes": {
                        "entity_uuid": "https://example.org/export/opendd/42/",
                        "name": "vote",
                        "type": "metadata"
                    },
                    "body": "up"
                },
                {
                    "attributes": {
                        "entity_uuid": "https://elsewhere.example/export/opendd/42/",
                        "name": "vote",
                        "type": "metadata"
                    },
                    "body": "down"
                }
            ])
            .to_string(),
        )
        .unwrap();

        let output = run(&["import", config.as_str(), records.to_str().unwrap()]).unwrap();

        assert_eq!(output["results"][0]["status"], "ok");
        assert_eq!(output["results"][0]["action"], "metadata");
        assert_eq!(output["results"][1]["status"], "error");
        let (level, active_dir) = extender_core::logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(active_dir, log_dir);
    }

    #[test]
    fn unknown_command_prints_usage() {
        assert!(run(&["frobnicate"]).unwrap_err().starts_with("usage:"));
        assert!(run(&["import", "/nonexistent/config.json", "records.json"]).is_err());
    }
}
