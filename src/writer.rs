//! Persists the merged schema: pretty-printed JSON plus generated type
//! declarations for editor and type-checking support.

use std::{path::PathBuf, sync::Arc};

use tokio::fs;

use crate::{
    error::{Result, SchemaError},
    hooks::{SharedHooks, read_hooks},
    options::SchemaOptions,
    schema::{SchemaDefinition, SchemaType},
};

/// File name of the persisted JSON schema document.
pub const SCHEMA_JSON_FILE: &str = "strata.schema.json";

/// File name of the generated type declarations.
pub const SCHEMA_TYPES_FILE: &str = "strata.schema.d.ts";

/// Hand-authored declaration merges appended to every generated types file.
const TYPES_FOOTER: &str = r"
export type CustomAppConfig = Exclude<StrataCustomSchema['appConfig'], undefined>
type _CustomAppConfig = CustomAppConfig

declare module '@strata/schema' {
  interface StrataConfig extends Omit<StrataCustomSchema, 'appConfig'> {}
  interface StrataOptions extends Omit<StrataCustomSchema, 'appConfig'> {}
  interface CustomAppConfig extends _CustomAppConfig {}
}

declare module 'strata/schema' {
  interface StrataConfig extends Omit<StrataCustomSchema, 'appConfig'> {}
  interface StrataOptions extends Omit<StrataCustomSchema, 'appConfig'> {}
  interface CustomAppConfig extends _CustomAppConfig {}
}
";

/// Writes schema artifacts into `<build_dir>/schema/`.
#[derive(Clone)]
pub struct SchemaWriter {
    options: Arc<SchemaOptions>,
    hooks: SharedHooks,
}

impl SchemaWriter {
    /// Creates a writer over the given session options and hook set.
    pub fn new(options: Arc<SchemaOptions>, hooks: SharedHooks) -> Self {
        Self { options, hooks }
    }

    /// Directory the schema artifacts are written into.
    pub fn output_dir(&self) -> PathBuf {
        self.options.build_dir.join("schema")
    }

    /// Persists the schema document and generated type declarations.
    ///
    /// Fires the before-write hook, ensures the output directory exists,
    /// writes both artifacts, then fires the written hook. I/O failures
    /// propagate: generated types are load-bearing for downstream
    /// type-checking.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or either file cannot be
    /// written, or a serialization error if the schema cannot be rendered.
    pub async fn write(&self, schema: &SchemaDefinition) -> Result<()> {
        read_hooks(&self.hooks).call_before_write(schema);

        let output_dir = self.output_dir();
        fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| SchemaError::io(e, &output_dir))?;

        let document =
            serde_json::to_string_pretty(schema).map_err(|e| SchemaError::Serialization {
                content_type: "merged schema".to_string(),
                details: e.to_string(),
            })?;

        let json_path = output_dir.join(SCHEMA_JSON_FILE);
        fs::write(&json_path, document)
            .await
            .map_err(|e| SchemaError::io(e, &json_path))?;

        let types_path = output_dir.join(SCHEMA_TYPES_FILE);
        fs::write(&types_path, generate_types(schema))
            .await
            .map_err(|e| SchemaError::io(e, &types_path))?;

        read_hooks(&self.hooks).call_written();

        Ok(())
    }
}

/// Generates the type-declaration document for a merged schema.
///
/// Emits a partial interface: every declared property is optional, declared
/// object levels accept no unrecognized extra keys, and unconstrained
/// fragments fall back to an arbitrary nested shape. The hand-authored
/// declaration merges for `CustomAppConfig` and the framework configuration
/// interfaces are appended verbatim.
pub fn generate_types(schema: &SchemaDefinition) -> String {
    let mut out = String::from("export interface StrataCustomSchema {\n");
    render_properties(schema, 1, &mut out);
    out.push_str("}\n");
    out.push_str(TYPES_FOOTER);
    out
}

fn render_properties(node: &SchemaDefinition, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);

    for (name, child) in &node.properties {
        render_doc_comment(child, &indent, out);
        out.push_str(&indent);
        out.push_str(&quote_key(name));
        out.push_str("?: ");
        out.push_str(&ts_type(child, depth));
        out.push_str(",\n");
    }
}

fn render_doc_comment(node: &SchemaDefinition, indent: &str, out: &mut String) {
    if node.description.is_none() && node.default.is_none() {
        return;
    }

    out.push_str(indent);
    out.push_str("/**\n");
    if let Some(description) = &node.description {
        for line in description.lines() {
            out.push_str(&format!("{indent} * {line}\n"));
        }
    }
    if let Some(default) = &node.default {
        out.push_str(&format!("{indent} * @default {default}\n"));
    }
    out.push_str(indent);
    out.push_str(" */\n");
}

fn ts_type(node: &SchemaDefinition, depth: usize) -> String {
    if node.is_unconstrained() {
        return "{ [key: string]: any }".to_string();
    }

    match node.ty {
        Some(SchemaType::String) => "string".to_string(),
        Some(SchemaType::Number) | Some(SchemaType::Integer) => "number".to_string(),
        Some(SchemaType::Boolean) => "boolean".to_string(),
        Some(SchemaType::Array) => {
            let items = node
                .items
                .as_deref()
                .map(|items| ts_type(items, depth))
                .unwrap_or_else(|| "any".to_string());
            format!("Array<{items}>")
        }
        Some(SchemaType::Object) => {
            let mut body = String::from("{\n");
            render_properties(node, depth + 1, &mut body);
            body.push_str(&"  ".repeat(depth));
            body.push('}');
            body
        }
        Some(SchemaType::Any) | None => "any".to_string(),
    }
}

/// Quotes property names that are not valid identifiers.
fn quote_key(name: &str) -> String {
    let valid = !name.is_empty()
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if valid {
        name.to_string()
    } else {
        format!("\"{name}\"")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    fn schema_from(value: serde_json::Value) -> SchemaDefinition {
        SchemaDefinition::resolve(&value)
    }

    #[test]
    fn generates_partial_interface() {
        let schema = schema_from(json!({
            "apiEndpoint": { "type": "string", "default": "https://example.com" }
        }));

        let types = generate_types(&schema);

        assert!(types.contains("export interface StrataCustomSchema {"));
        assert!(types.contains("apiEndpoint?: string,"));
        assert!(types.contains("@default \"https://example.com\""));
    }

    #[test]
    fn nested_objects_render_inline() {
        let schema = schema_from(json!({
            "server": { "port": 3000 }
        }));

        let types = generate_types(&schema);

        assert!(types.contains("server?: {"));
        assert!(types.contains("port?: number,"));
    }

    #[test]
    fn unconstrained_fragments_allow_arbitrary_shape() {
        let schema = SchemaDefinition::object(
            [(
                "appConfig".to_string(),
                SchemaDefinition::open_object("opaque"),
            )]
            .into(),
        );

        let types = generate_types(&schema);

        assert!(types.contains("appConfig?: { [key: string]: any },"));
    }

    #[test]
    fn invalid_identifiers_are_quoted() {
        let schema = schema_from(json!({ "my-feature": true }));

        let types = generate_types(&schema);

        assert!(types.contains("\"my-feature\"?: boolean,"));
    }

    #[test]
    fn footer_exposes_custom_app_config_alias() {
        let types = generate_types(&SchemaDefinition::default());

        assert!(types.contains("export type CustomAppConfig"));
        assert!(types.contains("declare module '@strata/schema'"));
        assert!(types.contains("declare module 'strata/schema'"));
        assert!(types.contains("interface StrataConfig extends Omit<StrataCustomSchema, 'appConfig'> {}"));
    }

    #[tokio::test]
    async fn write_creates_both_artifacts() {
        use std::sync::{Arc, RwLock};

        let dir = tempfile::TempDir::new().unwrap();
        let options = Arc::new(crate::options::SchemaOptions::new(
            dir.path(),
            dir.path().join("build"),
            json!({}),
        ));
        let hooks = Arc::new(RwLock::new(crate::hooks::SchemaHooks::new()));
        let writer = SchemaWriter::new(options, hooks);

        let schema = schema_from(json!({ "timeout": 1000 }));
        writer.write(&schema).await.unwrap();

        let json_doc = std::fs::read_to_string(
            dir.path().join("build/schema").join(SCHEMA_JSON_FILE),
        )
        .unwrap();
        let types = std::fs::read_to_string(
            dir.path().join("build/schema").join(SCHEMA_TYPES_FILE),
        )
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json_doc).unwrap();
        assert_eq!(parsed["properties"]["timeout"]["default"], 1000);
        assert!(types.contains("timeout?: number,"));
    }

    #[tokio::test]
    async fn write_fires_bracket_hooks() {
        use std::sync::{
            Arc, RwLock,
            atomic::{AtomicUsize, Ordering},
        };

        let dir = tempfile::TempDir::new().unwrap();
        let options = Arc::new(crate::options::SchemaOptions::new(
            dir.path(),
            dir.path().join("build"),
            json!({}),
        ));
        let hooks = Arc::new(RwLock::new(crate::hooks::SchemaHooks::new()));

        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        {
            let mut guard = hooks.write().unwrap();
            let before = Arc::clone(&before);
            guard.on_before_write(move |_| {
                before.fetch_add(1, Ordering::SeqCst);
            });
            let after = Arc::clone(&after);
            guard.on_written(move || {
                after.fetch_add(1, Ordering::SeqCst);
            });
        }

        let writer = SchemaWriter::new(options, hooks);
        writer.write(&SchemaDefinition::default()).await.unwrap();

        assert_eq!(before.load(Ordering::SeqCst), 1);
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }
}
