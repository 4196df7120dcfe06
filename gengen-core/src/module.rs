use crate::{Argument, Target};

/// A pipeline lowered for one target, ready for the module compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Fully qualified function name, possibly with `ns::` prefixes.
    pub function_name: String,
    pub target: Target,
    /// Input arguments, in signature order.
    pub arguments: Vec<Argument>,
    /// Output buffers produced by the pipeline.
    pub outputs: Vec<Argument>,
}

impl Module {
    pub fn new(function_name: impl Into<String>, target: Target) -> Self {
        Self {
            function_name: function_name.into(),
            target,
            arguments: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<Argument>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Inputs followed by outputs, as they appear in the C signature.
    pub fn signature(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter().chain(self.outputs.iter())
    }
}
