use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for gengen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
///
/// Usage errors are fixed by correcting the invocation. Configuration and
/// not-found errors point at the generator declarations or the registry.
/// Internal errors mean the discovery machinery itself is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Configuration,
    NotFound,
    Internal,
    Compile,
    Io,
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("{message}")]
    #[diagnostic(code(gengen::usage))]
    Usage {
        message: String,
        #[help]
        usage: Option<String>,
    },

    #[error("invalid {context} name '{name}'")]
    #[diagnostic(
        code(gengen::invalid_name),
        help(
            "{reason}. Names start with a letter and contain only letters, digits and single underscores."
        )
    )]
    InvalidName {
        name: String,
        context: String,
        reason: String,
    },

    #[error("duplicate {context} name '{name}'")]
    #[diagnostic(code(gengen::duplicate_name))]
    DuplicateName { name: String, context: String },

    #[error("Input<> may not be used with Param<> or ImageParam in the same generator")]
    #[diagnostic(
        code(gengen::mixed_param_styles),
        help("declare either legacy params or typed inputs, not both")
    )]
    MixedParamStyles,

    #[error("generator declared with {style} style but found {found} '{name}'")]
    #[diagnostic(code(gengen::param_style))]
    ParamStyleMismatch {
        style: String,
        found: String,
        name: String,
    },

    #[error("generator has no option named '{name}'")]
    #[diagnostic(code(gengen::unknown_option))]
    UnknownOption { name: String },

    #[error("invalid value '{value}' for option '{name}': {reason}")]
    #[diagnostic(code(gengen::invalid_option_value))]
    InvalidOptionValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("generator declares {declared} fields but its extent only holds {capacity}")]
    #[diagnostic(code(gengen::too_many_fields))]
    TooManyFields { declared: u64, capacity: u64 },

    #[error("generator '{name}' is not registered")]
    #[diagnostic(code(gengen::unregistered_generator))]
    UnregisteredGenerator { name: String },

    #[error("generator not found: {name}")]
    #[diagnostic(code(gengen::not_found))]
    NotFound {
        name: String,
        #[help]
        available: Option<String>,
    },

    #[error("internal error: {message}")]
    #[diagnostic(code(gengen::internal))]
    Internal { message: String },

    #[error("{message}")]
    #[diagnostic(code(gengen::compile))]
    Compile { message: String },

    #[error("failed to access '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse build config")]
    #[diagnostic(code(gengen::config))]
    Config {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Usage { .. } => ErrorKind::Usage,
            Error::InvalidName { .. }
            | Error::DuplicateName { .. }
            | Error::MixedParamStyles
            | Error::ParamStyleMismatch { .. }
            | Error::UnknownOption { .. }
            | Error::InvalidOptionValue { .. }
            | Error::TooManyFields { .. }
            | Error::UnregisteredGenerator { .. }
            | Error::Config { .. } => ErrorKind::Configuration,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Internal { .. } => ErrorKind::Internal,
            Error::Compile { .. } => ErrorKind::Compile,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// Create a usage error without usage text.
    pub fn usage(message: impl Into<String>) -> Self {
        Error::Usage {
            message: message.into(),
            usage: None,
        }
    }

    /// Attach usage text to a usage error. Other errors pass through.
    pub fn with_usage(self, text: impl Into<String>) -> Self {
        match self {
            Error::Usage { message, .. } => Error::Usage {
                message,
                usage: Some(text.into()),
            },
            other => other,
        }
    }

    /// Create an invalid name error
    pub fn invalid_name(
        name: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidName {
            name: name.into(),
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate name error
    pub fn duplicate_name(name: impl Into<String>, context: impl Into<String>) -> Self {
        Error::DuplicateName {
            name: name.into(),
            context: context.into(),
        }
    }

    /// Create a not-found error listing what is registered.
    pub fn not_found(name: impl Into<String>, available: &[String]) -> Self {
        Error::NotFound {
            name: name.into(),
            available: if available.is_empty() {
                None
            } else {
                Some(format!("registered generators: {}", available.join(", ")))
            },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Create an error reported by an external compiler collaborator.
    pub fn compile(message: impl Into<String>) -> Self {
        Error::Compile {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a config parse error from a toml error with source context
    pub fn config(source: toml::de::Error, src: &str, filename: &str) -> Self {
        let span = source.span().map(SourceSpan::from);
        Error::Config {
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        }
    }
}
