//! Optional TOML build file.
//!
//! ```toml
//! generator = "brighten"
//! output = "build"
//! emit = ["static_library", "h"]
//!
//! [extensions]
//! ".a" = ".lib"
//!
//! [options]
//! target = ["x86-64-linux-avx2", "x86-64-linux"]
//! gain = 1.5
//! ```
//!
//! Values given on the command line take precedence over the file.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
};

use gengen_core::{Error, Result};
use serde::Deserialize;

use crate::RequestArgs;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub generator: Option<String>,
    pub function: Option<String>,
    pub output: Option<PathBuf>,
    pub runtime: Option<String>,
    pub emit: Option<Vec<String>>,
    /// Extension overrides, `".old" = ".new"`.
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
    pub file_base_name: Option<String>,
    /// Generator option values. Arrays are joined with commas.
    #[serde(default)]
    pub options: BTreeMap<String, toml::Value>,
}

impl FromStr for BuildConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_filename(s, "gengen.toml")
    }
}

impl BuildConfig {
    /// Parse a build file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_str_with_filename(&content, &path.display().to_string())
    }

    /// Parse a build file with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e, content, filename))
    }

    /// Fill in whatever `args` left unset.
    ///
    /// File extensions and options are placed before the command line ones
    /// so that the command line wins on conflicts.
    pub fn apply(self, args: RequestArgs) -> RequestArgs {
        let mut extensions: Vec<String> = self
            .extensions
            .into_iter()
            .map(|(old, new)| format!("{}={}", old, new))
            .collect();
        extensions.extend(args.extensions);

        let mut assignments: Vec<String> = self
            .options
            .iter()
            .map(|(key, value)| format!("{}={}", key, option_string(value)))
            .collect();
        assignments.extend(args.assignments);

        RequestArgs {
            generator: args.generator.or(self.generator),
            function: args.function.or(self.function),
            output_dir: args.output_dir.or(self.output),
            runtime: args.runtime.or(self.runtime),
            emit: args.emit.or(self.emit),
            extensions,
            file_base_name: args.file_base_name.or(self.file_base_name),
            assignments,
        }
    }
}

fn option_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(option_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
