//! Session options: configuration layers, build output, environment flags.

use std::{path::PathBuf, time::Duration};

use serde_json::Value;

/// One configuration source layer.
///
/// Layers are ordered outer-to-inner: extended/inherited configuration sets
/// first, the project's own layer last, so the most specific layer wins when
/// fragments collide.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Display name used in diagnostics.
    pub name: String,
    /// Directory probed for a `strata.schema.*` file.
    pub root_dir: PathBuf,
}

impl Layer {
    /// Creates a layer rooted at the given directory.
    pub fn new(name: impl Into<String>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_dir: root_dir.into(),
        }
    }
}

/// Options for one schema session.
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Configuration layers, outer-to-inner (project last).
    pub layers: Vec<Layer>,

    /// Build directory; schema artifacts land under `<build_dir>/schema/`.
    pub build_dir: PathBuf,

    /// The fully resolved runtime configuration that validators run against.
    pub runtime_config: Value,

    /// The project configuration's own schema slot, if declared. May be a
    /// raw fragment or a Standard Schema capability object.
    pub root_schema: Option<Value>,

    /// Development mode: activates the watch coordinator.
    pub dev: bool,

    /// Preparation run: type stubs are written during `prepare_types`.
    pub prepare: bool,

    /// Quiet window for coalescing file-change bursts.
    pub debounce: Duration,
}

impl SchemaOptions {
    /// Creates options with a single project layer and default debounce.
    pub fn new(
        project_root: impl Into<PathBuf>,
        build_dir: impl Into<PathBuf>,
        runtime_config: Value,
    ) -> Self {
        Self {
            layers: vec![Layer::new("project", project_root)],
            build_dir: build_dir.into(),
            runtime_config,
            root_schema: None,
            dev: false,
            prepare: false,
            debounce: Duration::from_millis(100),
        }
    }
}
