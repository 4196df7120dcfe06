//! Output path planning.
//!
//! Extensions resolve in three steps: the per-kind default, then platform
//! rules, then the user's `-x` overrides. Overrides are looked up by the
//! extension the first two steps produced, so `.obj=.o` renames Windows
//! object files.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

use gengen_core::{ArtifactKind, EmitOptions, Target, split_namespaces};

/// Concrete output path per requested artifact kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFiles {
    files: BTreeMap<ArtifactKind, PathBuf>,
}

impl OutputFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ArtifactKind, path: impl Into<PathBuf>) {
        self.files.insert(kind, path.into());
    }

    /// Path for `kind`, or `None` if it was not requested.
    pub fn get(&self, kind: ArtifactKind) -> Option<&Path> {
        self.files.get(&kind).map(PathBuf::as_path)
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.files.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
        self.files.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKind, &Path)> {
        self.files.iter().map(|(k, p)| (*k, p.as_path()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Directory plus file stem that every output path is derived from.
///
/// The stem is `file_base_name` when given, otherwise the function name with
/// any `ns::` prefixes removed.
pub fn compute_base_path(
    output_dir: &Path,
    function_name: &str,
    file_base_name: Option<&str>,
) -> PathBuf {
    let stem = match file_base_name {
        Some(name) if !name.is_empty() => name,
        _ => split_namespaces(function_name).1,
    };
    output_dir.join(stem)
}

/// Map each requested artifact kind to `base_path` plus its resolved extension.
pub fn compute_outputs(target: &Target, base_path: &Path, emit: &EmitOptions) -> OutputFiles {
    let mut outputs = OutputFiles::new();
    for &kind in &emit.kinds {
        let ext = emit.extension(platform_extension(target, kind));
        outputs.insert(kind, with_suffix(base_path, ext));
    }
    tracing::debug!(%target, base = %base_path.display(), count = outputs.len(), "planned outputs");
    outputs
}

fn platform_extension(target: &Target, kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Object if target.is_portable_bitcode() => ".bc",
        ArtifactKind::Object if target.is_windows_coff() => ".obj",
        ArtifactKind::StaticLibrary if target.is_windows_coff() => ".lib",
        _ => kind.default_extension(),
    }
}

fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(ext);
    PathBuf::from(path)
}
