//! Core types for the gengen generator framework.
//!
//! This crate provides the vocabulary shared across the gengen crates:
//! the error taxonomy, identifier rules, scalar types and arguments,
//! target descriptors, and artifact kinds.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod emit;
mod error;
mod module;
mod names;
mod target;
mod types;

pub use emit::{ArtifactKind, EmitOptions};
pub use error::{Error, ErrorKind, Result};
pub use module::Module;
pub use names::{is_valid_name, split_namespaces, validate_identifier, validate_name};
pub use target::{Arch, Feature, Os, Target};
pub use types::{Argument, ArgumentKind, OptionValues, Scalar, ScalarType, ScalarValue};
