use std::path::Path;

use serde_json::Value;
use tokio::fs;

use crate::{
    error::{Result, SchemaError},
    options::Layer,
};

/// File names probed in each layer root, in preference order.
pub const SCHEMA_FILE_NAMES: [&str; 2] = ["strata.schema.toml", "strata.schema.json"];

/// Loads a layer's schema-definition file, if it has one.
///
/// Probes [`SCHEMA_FILE_NAMES`] in the layer root. A missing file is not an
/// error (`Ok(None)`); the caller decides how to handle files that fail to
/// load. The returned value is the raw parsed document; classification
/// (native fragment vs. Standard Schema capability) happens in the resolver.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed, or does
/// not have a loadable shape (a schema file must contain an object).
pub async fn load_layer_schema(layer: &Layer) -> Result<Option<Value>> {
    for file_name in SCHEMA_FILE_NAMES {
        let path = layer.root_dir.join(file_name);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            continue;
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| SchemaError::io(e, &path))?;

        let value = parse_schema_file(&path, &content)?;

        if !value.is_object() {
            return Err(SchemaError::invalid_schema(
                Some(&path),
                "expected a schema definition or Standard Schema capability object",
            ));
        }

        return Ok(Some(value));
    }

    Ok(None)
}

fn parse_schema_file(path: &Path, content: &str) -> Result<Value> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => {
            let table: toml::Value = toml::from_str(content)
                .map_err(|e| SchemaError::toml_parse(e, Some(path)))?;
            serde_json::to_value(table).map_err(|e| SchemaError::Serialization {
                content_type: "layer schema".to_string(),
                details: e.to_string(),
            })
        }
        _ => serde_json::from_str(content).map_err(|e| SchemaError::json_parse(e, Some(path))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn layer_in(dir: &TempDir) -> Layer {
        Layer::new("test", dir.path())
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let loaded = load_layer_schema(&layer_in(&dir)).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn loads_toml_schema_file() {
        let dir = TempDir::new().unwrap();
        std_fs::write(
            dir.path().join("strata.schema.toml"),
            "[apiEndpoint]\ntype = \"string\"\ndefault = \"https://example.com\"\n",
        )
        .unwrap();

        let loaded = load_layer_schema(&layer_in(&dir)).await.unwrap().unwrap();

        assert_eq!(loaded["apiEndpoint"]["type"], "string");
    }

    #[tokio::test]
    async fn loads_json_schema_file() {
        let dir = TempDir::new().unwrap();
        std_fs::write(
            dir.path().join("strata.schema.json"),
            r#"{ "timeout": { "type": "integer", "default": 1000 } }"#,
        )
        .unwrap();

        let loaded = load_layer_schema(&layer_in(&dir)).await.unwrap().unwrap();

        assert_eq!(loaded["timeout"]["default"], 1000);
    }

    #[tokio::test]
    async fn toml_takes_precedence_over_json() {
        let dir = TempDir::new().unwrap();
        std_fs::write(dir.path().join("strata.schema.toml"), "from_toml = true\n").unwrap();
        std_fs::write(
            dir.path().join("strata.schema.json"),
            r#"{ "from_json": true }"#,
        )
        .unwrap();

        let loaded = load_layer_schema(&layer_in(&dir)).await.unwrap().unwrap();

        assert!(loaded.get("from_toml").is_some());
        assert!(loaded.get("from_json").is_none());
    }

    #[tokio::test]
    async fn parse_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        std_fs::write(dir.path().join("strata.schema.toml"), "not [valid toml").unwrap();

        let result = load_layer_schema(&layer_in(&dir)).await;
        assert!(matches!(result, Err(SchemaError::TomlParse { .. })));
    }

    #[tokio::test]
    async fn non_object_document_is_rejected() {
        let dir = TempDir::new().unwrap();
        std_fs::write(dir.path().join("strata.schema.json"), "[1, 2, 3]").unwrap();

        let result = load_layer_schema(&layer_in(&dir)).await;
        assert!(matches!(result, Err(SchemaError::InvalidSchema { .. })));
    }
}
