//! Artifact kinds and emit configuration.

use std::{collections::BTreeSet, fmt, str::FromStr};

use indexmap::IndexMap;

/// A kind of file the module compiler can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Object,
    Assembly,
    Bitcode,
    CHeader,
    CSource,
    Stmt,
    StmtHtml,
    StaticLibrary,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 8] = [
        ArtifactKind::Object,
        ArtifactKind::Assembly,
        ArtifactKind::Bitcode,
        ArtifactKind::CHeader,
        ArtifactKind::CSource,
        ArtifactKind::Stmt,
        ArtifactKind::StmtHtml,
        ArtifactKind::StaticLibrary,
    ];

    /// The name accepted by `-e`.
    pub fn flag_name(&self) -> &'static str {
        match self {
            ArtifactKind::Object => "o",
            ArtifactKind::Assembly => "assembly",
            ArtifactKind::Bitcode => "bitcode",
            ArtifactKind::CHeader => "h",
            ArtifactKind::CSource => "cpp",
            ArtifactKind::Stmt => "stmt",
            ArtifactKind::StmtHtml => "html",
            ArtifactKind::StaticLibrary => "static_library",
        }
    }

    /// Extension used when neither the platform nor the user overrides it.
    pub fn default_extension(&self) -> &'static str {
        match self {
            ArtifactKind::Object => ".o",
            ArtifactKind::Assembly => ".s",
            ArtifactKind::Bitcode => ".bc",
            ArtifactKind::CHeader => ".h",
            ArtifactKind::CSource => ".cpp",
            ArtifactKind::Stmt => ".stmt",
            ArtifactKind::StmtHtml => ".html",
            ArtifactKind::StaticLibrary => ".a",
        }
    }

    /// Sorted, comma separated list of accepted `-e` names.
    pub fn flag_names() -> String {
        let mut names: Vec<_> = Self::ALL.iter().map(|k| k.flag_name()).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag_name())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.flag_name() == s)
            .ok_or_else(|| format!("{} not one of [{}]", s, Self::flag_names()))
    }
}

/// Which artifacts to emit and how to rename their extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub kinds: BTreeSet<ArtifactKind>,
    /// Extension substitutions (`.old` -> `.new`), applied after platform rules.
    pub extensions: IndexMap<String, String>,
}

impl EmitOptions {
    /// Emit exactly the given kinds, with no extension overrides.
    pub fn new(kinds: impl IntoIterator<Item = ArtifactKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            extensions: IndexMap::new(),
        }
    }

    /// Add an extension override.
    pub fn with_extension(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.extensions.insert(old.into(), new.into());
        self
    }

    pub fn emits(&self, kind: ArtifactKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Resolve an extension through the user override table.
    pub fn extension<'a>(&'a self, ext: &'a str) -> &'a str {
        self.extensions.get(ext).map(String::as_str).unwrap_or(ext)
    }

    /// True if only kinds a multi-target build can produce are requested.
    pub fn is_multitarget_compatible(&self) -> bool {
        self.kinds
            .iter()
            .all(|k| matches!(k, ArtifactKind::StaticLibrary | ArtifactKind::CHeader))
    }
}

impl Default for EmitOptions {
    /// A static library and its header.
    fn default() -> Self {
        Self::new([ArtifactKind::StaticLibrary, ArtifactKind::CHeader])
    }
}
