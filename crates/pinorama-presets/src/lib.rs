//! Log presets for pinorama
//!
//! A preset describes how to interpret the records produced by a logging
//! framework: the schema to index, which properties are facets and columns,
//! their labels, enum decodings, formatters and styles. Built-in presets are
//! TOML files embedded in the binary; custom presets can be loaded from
//! `.toml` or `.json` files and may extend a built-in one.

mod error;
mod loader;

use std::fs;
use std::path::Path;

use pinorama_types::Introspection;

pub use error::PresetError;

/// Name of the preset used when none is configured
pub const DEFAULT_PRESET: &str = "pino";

/// Embedded built-in presets, bases first
const BUILTIN_SOURCES: &[(&str, &str)] = &[
    ("pino", include_str!("../presets/pino.toml")),
    ("fastify", include_str!("../presets/fastify.toml")),
];

/// A named introspection
#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub introspection: Introspection,
}

/// Names of the built-in presets
pub fn names() -> Vec<&'static str> {
    BUILTIN_SOURCES.iter().map(|(name, _)| *name).collect()
}

/// All built-in presets, with their bases applied
pub fn builtin() -> Result<Vec<Preset>, PresetError> {
    let mut presets: Vec<Preset> = Vec::with_capacity(BUILTIN_SOURCES.len());
    for (name, source) in BUILTIN_SOURCES {
        let parsed = loader::parse_toml(source, name)?;
        let preset = loader::resolve(parsed, &presets)?;
        validate(&preset)?;
        presets.push(preset);
    }
    Ok(presets)
}

/// Find a built-in preset by name
pub fn find(name: &str) -> Result<Preset, PresetError> {
    builtin()?
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| PresetError::Unknown(name.to_string()))
}

pub fn pino() -> Result<Introspection, PresetError> {
    find("pino").map(|p| p.introspection)
}

pub fn fastify() -> Result<Introspection, PresetError> {
    find("fastify").map(|p| p.introspection)
}

/// Load a custom preset from a `.toml` or `.json` file
///
/// The file may extend a built-in preset with `extends = "<name>"`.
pub fn load_file(path: &Path) -> Result<Preset, PresetError> {
    let content = fs::read_to_string(path).map_err(|e| PresetError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "custom".to_string());

    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => loader::parse_toml(&content, &name)?,
        Some("json") => loader::parse_json(&content, &name)?,
        _ => return Err(PresetError::UnsupportedFormat(path.to_path_buf())),
    };

    let preset = loader::resolve(parsed, &builtin()?)?;
    validate(&preset)?;

    tracing::debug!(
        preset = %preset.name,
        path = %path.display(),
        properties = preset.introspection.db_schema.len(),
        "Loaded custom preset"
    );
    Ok(preset)
}

/// Reject presets whose display settings name properties outside the schema
pub fn validate(preset: &Preset) -> Result<(), PresetError> {
    let unknown = preset.introspection.unknown_properties();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(PresetError::UnknownProperties {
            preset: preset.name.clone(),
            properties: unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinorama_types::{FacetKind, Formatter, SchemaType};
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_builtin_presets_parse_and_validate() {
        let presets = builtin().unwrap();
        let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["pino", "fastify"]);
    }

    #[test]
    fn test_pino_preset() {
        let intro = pino().unwrap();

        assert_eq!(intro.db_schema.get("level"), Some(SchemaType::Enum));
        assert_eq!(intro.db_schema.get("time"), Some(SchemaType::Number));
        assert_eq!(intro.facets.get("hostname"), Some(&FacetKind::String));
        assert_eq!(intro.visible_columns(), vec!["time", "level", "msg"]);
        assert_eq!(intro.label("msg"), "Message");
        assert_eq!(intro.value_label("level", &json!(30)), Some("INFO"));
        assert_eq!(intro.value_label("level", &json!(60)), Some("FATAL"));
        assert_eq!(intro.formatter("time"), Some(Formatter::Timestamp));

        let fatal = intro.style("level", Some(&json!(60)));
        assert_eq!(fatal.get("font-weight").map(String::as_str), Some("bold"));
    }

    #[test]
    fn test_fastify_extends_pino() {
        let intro = fastify().unwrap();

        assert_eq!(intro.db_schema.get("msg"), Some(SchemaType::String));
        assert_eq!(intro.db_schema.get("req.method"), Some(SchemaType::Enum));
        assert_eq!(intro.db_schema.get("res.statusCode"), Some(SchemaType::Enum));
        assert_eq!(intro.label("level"), "Level");
        assert_eq!(intro.label("res.statusCode"), "Status");

        let columns: Vec<&str> = intro.columns.keys().map(String::as_str).collect();
        assert_eq!(&columns[..3], &["time", "level", "msg"]);
        assert!(columns.contains(&"req.url"));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(find("log4j"), Err(PresetError::Unknown(_))));
    }

    #[test]
    fn test_load_json_introspection_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            "{}",
            json!({
                "dbSchema": { "message": "string", "severity": "enum" },
                "columns": { "severity": { "visible": true, "size": 80 } }
            })
        )
        .unwrap();

        let preset = load_file(file.path()).unwrap();
        assert_eq!(preset.introspection.visible_columns(), vec!["severity"]);
    }

    #[test]
    fn test_json_preset_keeps_declaration_order() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "dbSchema": {{ "time": "number", "level": "enum", "msg": "string" }},
                "facets": {{ "msg": "string", "level": "enum" }},
                "columns": {{
                    "time": {{ "visible": true, "size": 150 }},
                    "level": {{ "visible": true, "size": 70 }},
                    "msg": {{ "visible": true, "size": 400 }}
                }}
            }}"#
        )
        .unwrap();

        let intro = load_file(file.path()).unwrap().introspection;
        assert_eq!(intro.visible_columns(), vec!["time", "level", "msg"]);
        let facets: Vec<&str> = intro.facets.keys().map(String::as_str).collect();
        assert_eq!(facets, vec!["msg", "level"]);
        let schema: Vec<String> = intro.db_schema.fields().into_iter().map(|f| f.path).collect();
        assert_eq!(schema, vec!["time", "level", "msg"]);
    }

    #[test]
    fn test_load_toml_extending_builtin() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[preset]
name = "worker"
extends = "pino"

[introspection.dbSchema]
job = "string"

[introspection.columns]
job = {{ visible = true, size = 120 }}
"#
        )
        .unwrap();

        let preset = load_file(file.path()).unwrap();
        assert_eq!(preset.name, "worker");
        assert!(preset.introspection.db_schema.contains("level"));
        assert_eq!(
            preset.introspection.visible_columns(),
            vec!["time", "level", "msg", "job"]
        );
    }

    #[test]
    fn test_columns_outside_schema_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            "{}",
            json!({
                "dbSchema": { "msg": "string" },
                "columns": { "level": { "visible": true, "size": 80 } }
            })
        )
        .unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, PresetError::UnknownProperties { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            load_file(file.path()),
            Err(PresetError::UnsupportedFormat(_))
        ));
    }
}
