//! Generator declarations and discovery for gengen.
//!
//! # Module Organization
//!
//! - [`instance`] - Address-keyed ledger of live declared objects
//! - [`factory`] - Name-keyed registry of generator factories
//! - [`generator`] - `GeneratorBase` discovery and the `Generator` trait
//! - [`pipeline`] - The seam to the pipeline language
//! - Field handles: [`Param`], [`ImageParam`], [`Input`], [`GeneratorOption`]

mod field;
pub mod factory;
pub mod generator;
mod input;
pub mod instance;
mod option;
mod param;
pub mod pipeline;

pub use factory::{FactoryRegistry, GeneratorFactory};
pub use field::{FieldRegistry, FieldToken};
pub use generator::{Generator, GeneratorBase, ParamStyle};
pub use input::{Input, Placeholder};
pub use instance::{Category, InstanceRecord, InstanceRegistry, RecordId, Registration};
pub use option::{GeneratorOption, OptionValue};
pub use param::{ImageParam, Param};
pub use pipeline::{DeclaredPipeline, Pipeline, PipelineOutput};
