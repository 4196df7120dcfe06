//! Output planning and build orchestration for gengen.
//!
//! # Module Organization
//!
//! - [`request`] - Validating raw build arguments into a [`BuildRequest`]
//! - [`config`] - Optional TOML build file merged under the command line
//! - [`outputs`] - Output path planning per target and artifact kind
//! - [`compiler`] - The [`ModuleCompiler`] seam and the listing compiler
//! - [`orchestrator`] - Resolving generators and dispatching to the compiler

pub mod compiler;
pub mod config;
pub mod orchestrator;
pub mod outputs;
pub mod request;

pub use compiler::{ListingCompiler, ModuleCompiler, ModuleProducer};
pub use config::BuildConfig;
pub use orchestrator::{BuildOrchestrator, BuildOutcome, BuiltArtifacts};
pub use outputs::{OutputFiles, compute_base_path, compute_outputs};
pub use request::{BuildRequest, RequestArgs, TARGET_KEY, parse_targets};
