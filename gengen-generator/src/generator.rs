//! Generator instances and field discovery.
//!
//! A generator owns a [`GeneratorBase`] and declares its params, inputs and
//! options through it. Each declaration claims the next address in the
//! generator's reserved range and announces itself in the instance registry.
//! Discovery then scans that range to recover every live declaration in
//! declaration order.
//!
//! # Example
//!
//! ```ignore
//! struct Brighten {
//!     base: GeneratorBase,
//!     gain: GeneratorOption<f32>,
//!     input: Input,
//! }
//!
//! impl Brighten {
//!     fn new(registry: &Arc<FieldRegistry>) -> Self {
//!         let base = GeneratorBase::new(registry, ParamStyle::Inputs);
//!         let gain = base.option("gain", 1.0f32);
//!         let input = base.input_buffer("input", ScalarType::UInt8, 2);
//!         Self { base, gain, input }
//!     }
//! }
//! ```

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use gengen_core::{
    Argument, Error, Module, OptionValues, Result, Scalar, ScalarType, Target, validate_name,
};

use crate::{
    field::{Field, FieldRegistry, FieldToken, TokenKind},
    input::{Input, InputCell},
    instance::{Category, Registration},
    option::{GeneratorOption, OptionSlot, OptionValue},
    param::{ImageParam, Param, ParamCell},
    pipeline::{Pipeline, output_arguments},
};

/// Which kind of arguments a generator declares.
///
/// Legacy params and typed inputs cannot be mixed within one generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `Param<T>` and `ImageParam` fields.
    Params,
    /// `Input` fields.
    Inputs,
}

impl ParamStyle {
    fn as_str(&self) -> &'static str {
        match self {
            ParamStyle::Params => "Param",
            ParamStyle::Inputs => "Input",
        }
    }
}

/// Fields recovered by the last discovery pass.
struct Discovered {
    params: Vec<Arc<ParamCell>>,
    inputs: Vec<Arc<InputCell>>,
    options: BTreeMap<String, Arc<dyn OptionSlot>>,
}

enum Discovery {
    Uninitialized,
    Built(Discovered),
}

/// State shared by every generator: its address range, its declared-field
/// discovery state, and the built-in `target` option.
pub struct GeneratorBase {
    registry: Arc<FieldRegistry>,
    address: u64,
    extent: u64,
    next_slot: AtomicU64,
    style: ParamStyle,
    discovery: Discovery,
    target: GeneratorOption<Target>,
    _owner: Registration<FieldToken>,
}

impl GeneratorBase {
    /// Number of addresses reserved per generator, its own included.
    pub const EXTENT: u64 = 1 << 16;

    /// Name of the built-in option holding the compilation target.
    pub const TARGET_OPTION: &'static str = "target";

    /// Reserve an address range in `registry` and announce a new generator.
    pub fn new(registry: &Arc<FieldRegistry>, style: ParamStyle) -> Self {
        let extent = Self::EXTENT;
        let address = registry.reserve(extent);
        let owner = Registration::new(
            registry,
            address,
            extent,
            Category::Owner,
            address,
            FieldToken::owner(),
        );
        let target = GeneratorOption::declare(
            Field {
                registry: Arc::clone(registry),
                address: address + 1,
                owner: address,
            },
            Self::TARGET_OPTION,
            Target::host(),
        );
        Self {
            registry: Arc::clone(registry),
            address,
            extent,
            next_slot: AtomicU64::new(2),
            style,
            discovery: Discovery::Uninitialized,
            target,
            _owner: owner,
        }
    }

    fn next_field(&self) -> Field {
        let slot = self.next_slot.fetch_add(1, Ordering::Relaxed);
        Field {
            registry: Arc::clone(&self.registry),
            address: self.address.saturating_add(slot),
            owner: self.address,
        }
    }

    /// Declare a legacy scalar param.
    pub fn param<T: Scalar>(&self, name: &str, default: T) -> Param<T> {
        Param::declare(self.next_field(), name, default)
    }

    /// Declare a legacy buffer param.
    pub fn image_param(&self, name: &str, ty: ScalarType, rank: u32) -> ImageParam {
        ImageParam::declare(self.next_field(), name, ty, rank)
    }

    /// Declare a scalar input.
    pub fn input<T: Scalar>(&self, name: &str) -> Input {
        Input::declare(self.next_field(), name, T::TYPE, None)
    }

    /// Declare a buffer input. Its type and rank may later be bound to options
    /// with [`Input::with_type_option`] and [`Input::with_rank_option`].
    pub fn input_buffer(&self, name: &str, ty: ScalarType, rank: u32) -> Input {
        Input::declare(self.next_field(), name, ty, Some(rank))
    }

    /// Declare an option.
    pub fn option<T: OptionValue>(&self, name: &str, default: T) -> GeneratorOption<T> {
        GeneratorOption::declare(self.next_field(), name, default)
    }

    /// The target this generator compiles for.
    pub fn target(&self) -> Target {
        self.target.get()
    }

    pub fn style(&self) -> ParamStyle {
        self.style
    }

    /// Base address of this generator's range.
    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn is_built(&self) -> bool {
        matches!(self.discovery, Discovery::Built(_))
    }

    /// Whether discovery found legacy params. False before discovery.
    pub fn has_params(&self) -> bool {
        match &self.discovery {
            Discovery::Built(d) => !d.params.is_empty(),
            Discovery::Uninitialized => false,
        }
    }

    /// Discover declared fields. Does nothing if already built.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid or duplicate names, for a
    /// mix of params and inputs, or for fields that do not match the
    /// generator's [`ParamStyle`].
    pub fn build(&mut self) -> Result<()> {
        if self.is_built() {
            return Ok(());
        }

        let next_slot = self.next_slot.load(Ordering::Relaxed);
        if next_slot > self.extent {
            return Err(Error::TooManyFields {
                declared: next_slot - 1,
                capacity: self.extent - 1,
            });
        }

        let mut params: Vec<Arc<ParamCell>> = Vec::new();
        for record in self
            .registry
            .query_records(self.address, self.extent, Category::Param)
        {
            let TokenKind::Param(cell) = record.token.0 else {
                return Err(Error::internal("Param record without a param"));
            };
            validate_name(cell.name(), "Param")?;
            if params.iter().any(|p| p.name() == cell.name()) {
                return Err(Error::duplicate_name(cell.name(), "Param"));
            }
            params.push(cell);
        }

        let mut inputs: Vec<Arc<InputCell>> = Vec::new();
        for record in self
            .registry
            .query_records(self.address, self.extent, Category::Input)
        {
            let TokenKind::Input(cell) = record.token.0 else {
                return Err(Error::internal("Input record without an input"));
            };
            validate_name(cell.name(), "Input")?;
            if inputs.iter().any(|i| i.name() == cell.name()) {
                return Err(Error::duplicate_name(cell.name(), "Input"));
            }
            inputs.push(cell);
        }

        if !params.is_empty() && !inputs.is_empty() {
            return Err(Error::MixedParamStyles);
        }
        let stray = match self.style {
            ParamStyle::Params => inputs.first().map(|i| ("Input", i.name())),
            ParamStyle::Inputs => params.first().map(|p| ("Param", p.name())),
        };
        if let Some((found, name)) = stray {
            return Err(Error::ParamStyleMismatch {
                style: self.style.as_str().to_string(),
                found: found.to_string(),
                name: name.to_string(),
            });
        }

        let mut options: BTreeMap<String, Arc<dyn OptionSlot>> = BTreeMap::new();
        for record in self
            .registry
            .query_records(self.address, self.extent, Category::Option)
        {
            let TokenKind::Option(slot) = record.token.0 else {
                return Err(Error::internal("Option record without an option"));
            };
            validate_name(slot.name(), "option")?;
            if options.contains_key(slot.name()) {
                return Err(Error::duplicate_name(slot.name(), "option"));
            }
            options.insert(slot.name().to_string(), slot);
        }

        tracing::debug!(
            address = self.address,
            params = params.len(),
            inputs = inputs.len(),
            options = options.len(),
            "discovered generator fields"
        );
        self.discovery = Discovery::Built(Discovered {
            params,
            inputs,
            options,
        });
        Ok(())
    }

    /// Forget discovered fields so the next access scans again.
    pub fn invalidate(&mut self) {
        self.discovery = Discovery::Uninitialized;
    }

    /// Invalidate and rediscover.
    pub fn rebuild(&mut self) -> Result<()> {
        self.invalidate();
        self.build()
    }

    fn discovered(&mut self) -> Result<&Discovered> {
        self.build()?;
        match &self.discovery {
            Discovery::Built(d) => Ok(d),
            Discovery::Uninitialized => Err(Error::internal("discovery did not complete")),
        }
    }

    /// The generator's argument list: params, then inputs, in declaration order.
    ///
    /// Inputs are materialized on first call.
    pub fn arguments(&mut self) -> Result<Vec<Argument>> {
        let discovered = self.discovered()?;
        let params = discovered.params.iter().map(|p| p.to_argument());
        let inputs = discovered
            .inputs
            .iter()
            .map(|i| i.materialize().to_argument());
        Ok(params.chain(inputs).collect())
    }

    /// Snapshot every option's current value.
    pub fn option_values(&mut self) -> Result<OptionValues> {
        let discovered = self.discovered()?;
        Ok(discovered
            .options
            .iter()
            .map(|(name, slot)| (name.clone(), slot.encode()))
            .collect())
    }

    /// Decode and apply option values.
    ///
    /// Setting options may change how the generator builds its pipeline, so
    /// callers usually [`invalidate`](Self::invalidate) afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOption`] if a key names no declared option, or
    /// [`Error::InvalidOptionValue`] if a value cannot be decoded.
    pub fn set_option_values(&mut self, values: &OptionValues) -> Result<()> {
        let discovered = self.discovered()?;
        for (name, value) in values {
            let slot = discovered
                .options
                .get(name)
                .ok_or_else(|| Error::UnknownOption { name: name.clone() })?;
            slot.decode(value)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for GeneratorBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorBase")
            .field("address", &self.address)
            .field("style", &self.style)
            .field("built", &self.is_built())
            .field("target", &self.target())
            .finish()
    }
}

/// A user-defined generator.
pub trait Generator: Send {
    fn base(&self) -> &GeneratorBase;

    fn base_mut(&mut self) -> &mut GeneratorBase;

    /// Build the generator's pipeline from its current options.
    fn build_pipeline(&mut self) -> Result<Box<dyn Pipeline>>;

    /// Output buffer arguments of the pipeline, named `result_N`.
    fn output_types(&mut self) -> Result<Vec<Argument>> {
        let pipeline = self.build_pipeline()?;
        Ok(output_arguments(&pipeline.outputs()))
    }

    /// Build the pipeline and lower it for this generator's target.
    fn build_module(&mut self, function_name: &str) -> Result<Module> {
        self.base_mut().build()?;
        let pipeline = self.build_pipeline()?;
        // Building the pipeline may replace legacy params, but never inputs.
        if self.base().has_params() {
            self.base_mut().rebuild()?;
        }
        let target = self.base().target();
        let arguments = self.base_mut().arguments()?;
        tracing::debug!(function = function_name, %target, "lowering pipeline");
        pipeline.compile_to_module(&arguments, function_name, &target)
    }
}
