use std::sync::Arc;

use gengen_core::{Error, Result, ScalarType};
use gengen_generator::{
    DeclaredPipeline, FieldRegistry, Generator, GeneratorBase, GeneratorOption, Input, ParamStyle,
    Pipeline, PipelineOutput,
};

/// Multiplies an image by `gain` and adds `offset`.
///
/// The element type of the input comes from the `input_type` option.
pub struct Brighten {
    base: GeneratorBase,
    gain: GeneratorOption<f32>,
    _input_type: GeneratorOption<ScalarType>,
    input: Input,
    _offset: Input,
}

impl Brighten {
    pub fn new(fields: &Arc<FieldRegistry>) -> Self {
        let base = GeneratorBase::new(fields, ParamStyle::Inputs);
        let gain = base.option("gain", 1.0f32);
        let input_type = base.option("input_type", ScalarType::UInt8);
        let input = base
            .input_buffer("input", ScalarType::UInt8, 2)
            .with_type_option(&input_type);
        let offset = base.input::<f32>("offset");
        Self {
            base,
            gain,
            _input_type: input_type,
            input,
            _offset: offset,
        }
    }
}

impl Generator for Brighten {
    fn base(&self) -> &GeneratorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GeneratorBase {
        &mut self.base
    }

    fn build_pipeline(&mut self) -> Result<Box<dyn Pipeline>> {
        let gain = self.gain.get();
        if gain.is_nan() || gain < 0.0 {
            return Err(Error::InvalidOptionValue {
                name: self.gain.name().to_string(),
                value: gain.to_string(),
                reason: "gain must be a non-negative number".to_string(),
            });
        }

        let input = self.input.placeholder();
        Ok(Box::new(DeclaredPipeline::new().output(PipelineOutput::new(
            input.element_type(),
            input.rank(),
        ))))
    }
}

#[cfg(test)]
mod tests {
    use gengen_core::{ArgumentKind, OptionValues};

    use super::*;

    #[test]
    fn test_signature() {
        let fields = FieldRegistry::shared();
        let mut brighten = Brighten::new(&fields);
        let mut values = OptionValues::new();
        values.insert("input_type".to_string(), "uint16".to_string());
        brighten.base_mut().set_option_values(&values).unwrap();

        let module = brighten.build_module("brighten").unwrap();
        let kinds: Vec<_> = module.signature().map(|a| (a.name.as_str(), a.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("input", ArgumentKind::InputBuffer),
                ("offset", ArgumentKind::InputScalar),
                ("result_0", ArgumentKind::OutputBuffer),
            ]
        );
        assert_eq!(module.arguments[0].element_type, ScalarType::UInt16);
        assert_eq!(module.outputs[0].element_type, ScalarType::UInt16);
    }

    #[test]
    fn test_negative_gain() {
        let fields = FieldRegistry::shared();
        let mut brighten = Brighten::new(&fields);
        brighten.gain.set(-1.0);
        assert!(brighten.build_module("brighten").is_err());
    }
}
