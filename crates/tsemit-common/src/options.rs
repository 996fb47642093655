//! Compiler options that influence emit.
//!
//! Options are read from the `compilerOptions` object of a tsconfig-style
//! document (or from a bare options object). Unknown keys are ignored so a
//! full tsconfig can be handed over unchanged.

use crate::common::{NewLineKind, ScriptTarget};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid compiler options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`compilerOptions` must be an object")]
    NotAnObject,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    pub target: ScriptTarget,
    pub new_line: NewLineKind,
    pub remove_comments: bool,
    pub source_map: bool,
    pub inline_source_map: bool,
    pub inline_sources: bool,
    pub source_root: Option<String>,
    pub map_root: Option<String>,
    pub declaration: bool,
    pub declaration_map: bool,
    pub downlevel_iteration: bool,
    pub import_helpers: bool,
    pub no_emit_helpers: bool,
    pub experimental_decorators: bool,
    pub emit_decorator_metadata: bool,
    pub preserve_const_enums: bool,
    pub out_file: Option<String>,
    pub out_dir: Option<String>,
}

impl CompilerOptions {
    /// Parse options from JSON text.
    ///
    /// Accepts either `{"compilerOptions": {...}}` or the options object itself.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let options = match value {
            serde_json::Value::Object(mut map) => match map.remove("compilerOptions") {
                Some(inner @ serde_json::Value::Object(_)) => inner,
                Some(_) => return Err(ConfigError::NotAnObject),
                None => serde_json::Value::Object(map),
            },
            _ => return Err(ConfigError::NotAnObject),
        };
        Ok(serde_json::from_value(options)?)
    }

    pub fn es5(mut self) -> Self {
        self.target = ScriptTarget::ES5;
        self
    }

    pub fn with_target(mut self, target: ScriptTarget) -> Self {
        self.target = target;
        self
    }

    /// Whether any source map output (file or inline) is requested.
    pub const fn wants_source_map(&self) -> bool {
        self.source_map || self.inline_source_map
    }
}
