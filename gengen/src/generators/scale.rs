use std::sync::Arc;

use gengen_core::{Result, ScalarType};
use gengen_generator::{
    DeclaredPipeline, FieldRegistry, Generator, GeneratorBase, GeneratorOption, ImageParam, Param,
    ParamStyle, Pipeline, PipelineOutput,
};

/// Scales a float image by a bounded factor. Declared with legacy params.
pub struct Scale {
    base: GeneratorBase,
    dims: GeneratorOption<u32>,
    _factor: Param<f32>,
    input: ImageParam,
}

impl Scale {
    pub fn new(fields: &Arc<FieldRegistry>) -> Self {
        let base = GeneratorBase::new(fields, ParamStyle::Params);
        let dims = base.option("dims", 2u32);
        let factor = base.param("factor", 1.0f32).with_range(0.0, 16.0);
        let input = base.image_param("input", ScalarType::Float32, 2);
        Self {
            base,
            dims,
            _factor: factor,
            input,
        }
    }
}

impl Generator for Scale {
    fn base(&self) -> &GeneratorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GeneratorBase {
        &mut self.base
    }

    fn build_pipeline(&mut self) -> Result<Box<dyn Pipeline>> {
        let dims = self.dims.get();
        self.input.reshape(ScalarType::Float32, dims);
        Ok(Box::new(DeclaredPipeline::new().output(PipelineOutput::new(
            ScalarType::Float32,
            dims,
        ))))
    }
}
