//! Build request parsing.
//!
//! [`RequestArgs`] holds the raw strings collected from the command line and
//! the optional config file. [`BuildRequest::parse`] validates them into a
//! request the orchestrator can run without further string handling.

use std::path::PathBuf;

use gengen_core::{ArtifactKind, EmitOptions, Error, OptionValues, Result, Target};

/// Option key carrying the comma separated target list.
pub const TARGET_KEY: &str = "target";

/// Unvalidated build arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestArgs {
    /// `-g`
    pub generator: Option<String>,
    /// `-f`
    pub function: Option<String>,
    /// `-o`
    pub output_dir: Option<PathBuf>,
    /// `-r`
    pub runtime: Option<String>,
    /// `-e` entries, already split on commas.
    pub emit: Option<Vec<String>>,
    /// `-x` entries of the form `.old=.new`.
    pub extensions: Vec<String>,
    /// `-n`
    pub file_base_name: Option<String>,
    /// Trailing `key=value` arguments. Later entries win.
    pub assignments: Vec<String>,
}

/// A validated build request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub generator: Option<String>,
    pub function_name: Option<String>,
    pub output_dir: PathBuf,
    pub runtime: Option<String>,
    pub emit: EmitOptions,
    pub file_base_name: Option<String>,
    /// Parsed from the `target` option; never empty.
    pub targets: Vec<Target>,
    /// Every `key=value` assignment, `target` included.
    pub options: OptionValues,
}

impl BuildRequest {
    /// Validate raw arguments.
    ///
    /// # Errors
    ///
    /// Returns a usage error for a malformed `key=value` or `-x` entry, a
    /// missing output directory, or a missing or unparseable target list.
    /// Unknown `-e` entries are logged and skipped.
    pub fn parse(args: RequestArgs) -> Result<Self> {
        let mut options = OptionValues::new();
        for assignment in &args.assignments {
            let (key, value) = split_pair(assignment).ok_or_else(|| {
                Error::usage(format!(
                    "expected a single key=value pair, got '{}'",
                    assignment
                ))
            })?;
            options.insert(key.to_string(), value.to_string());
        }

        let output_dir = args
            .output_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(|| Error::usage("-o must always be specified."))?;

        // An absent or blank list falls back to the default kinds.
        let mut emit = match &args.emit {
            Some(entries) if entries.iter().any(|e| !e.trim().is_empty()) => {
                EmitOptions::new(parse_emit(entries))
            }
            _ => EmitOptions::default(),
        };
        for entry in &args.extensions {
            let (old, new) = split_pair(entry)
                .ok_or_else(|| Error::usage(format!("malformed -x option: {}", entry)))?;
            emit.extensions.insert(old.to_string(), new.to_string());
        }

        let targets = match options.get(TARGET_KEY) {
            Some(list) => parse_targets(list)?,
            None => return Err(Error::usage("target missing")),
        };

        Ok(Self {
            generator: args.generator.filter(|g| !g.is_empty()),
            function_name: args.function.filter(|f| !f.is_empty()),
            output_dir,
            runtime: args.runtime.filter(|r| !r.is_empty()),
            emit,
            file_base_name: args.file_base_name.filter(|n| !n.is_empty()),
            targets,
            options,
        })
    }
}

/// Split `a=b` into two non-empty halves.
fn split_pair(s: &str) -> Option<(&str, &str)> {
    let (key, value) = s.split_once('=')?;
    if key.is_empty() || value.is_empty() || value.contains('=') {
        return None;
    }
    Some((key, value))
}

fn parse_emit(entries: &[String]) -> Vec<ArtifactKind> {
    entries
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .filter_map(|entry| match entry.parse::<ArtifactKind>() {
            Ok(kind) => Some(kind),
            Err(reason) => {
                tracing::warn!("unrecognized -e option ignored: {}", reason);
                None
            }
        })
        .collect()
}

/// Parse a comma separated target list. Every entry must be a valid target.
pub fn parse_targets(list: &str) -> Result<Vec<Target>> {
    list.split(',')
        .map(|s| {
            s.trim()
                .parse::<Target>()
                .map_err(|reason| Error::usage(format!("invalid target: {}", reason)))
        })
        .collect()
}
