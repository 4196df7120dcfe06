//! The pipeline a generator builds, as seen by the build machinery.
//!
//! How pipelines are expressed and lowered lives outside this crate; the
//! [`Pipeline`] trait is the seam a pipeline language plugs into.

use gengen_core::{Argument, ArgumentKind, Module, Result, ScalarType, Target};

/// One output function of a pipeline. Tuple-valued outputs carry several types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub types: Vec<ScalarType>,
    pub rank: u32,
}

impl PipelineOutput {
    pub fn new(ty: ScalarType, rank: u32) -> Self {
        Self {
            types: vec![ty],
            rank,
        }
    }

    pub fn tuple(types: impl IntoIterator<Item = ScalarType>, rank: u32) -> Self {
        Self {
            types: types.into_iter().collect(),
            rank,
        }
    }
}

/// A built pipeline, ready to be lowered into a [`Module`].
pub trait Pipeline {
    /// Output functions, in order.
    fn outputs(&self) -> Vec<PipelineOutput>;

    /// Lower the pipeline for one target.
    fn compile_to_module(
        &self,
        arguments: &[Argument],
        function_name: &str,
        target: &Target,
    ) -> Result<Module> {
        Ok(Module::new(function_name, target.clone())
            .with_arguments(arguments.to_vec())
            .with_outputs(output_arguments(&self.outputs())))
    }
}

/// Output buffer arguments for a pipeline's outputs, named `result_0`, `result_1`, ...
///
/// Each element of a tuple output gets its own buffer.
pub fn output_arguments(outputs: &[PipelineOutput]) -> Vec<Argument> {
    outputs
        .iter()
        .flat_map(|output| output.types.iter().map(move |ty| (*ty, output.rank)))
        .enumerate()
        .map(|(i, (ty, rank))| {
            Argument::buffer(format!("result_{}", i), ArgumentKind::OutputBuffer, ty, rank)
        })
        .collect()
}

/// A pipeline described only by its outputs.
///
/// Lowering produces a module carrying the signature and nothing else,
/// which is all the reference compiler needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredPipeline {
    outputs: Vec<PipelineOutput>,
}

impl DeclaredPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output function.
    pub fn output(mut self, output: PipelineOutput) -> Self {
        self.outputs.push(output);
        self
    }
}

impl Pipeline for DeclaredPipeline {
    fn outputs(&self) -> Vec<PipelineOutput> {
        self.outputs.clone()
    }
}
