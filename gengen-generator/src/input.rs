//! Typed inputs with deferred materialization.
//!
//! An input is declared with a shape (scalar, or buffer of some element type
//! and rank) but its placeholder is only built the first time the argument
//! list is requested. Buffer inputs may take their element type and rank
//! from companion options, which are only final once option values have been
//! applied.

use std::{fmt, sync::Arc};

use gengen_core::{Argument, ArgumentKind, ScalarType};
use parking_lot::Mutex;

use crate::{
    field::{Field, FieldToken},
    instance::{Category, Registration},
    option::{GeneratorOption, OptionCell},
};

/// The materialized representation of an input inside a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// A scalar variable bound to the input.
    Variable { name: String, ty: ScalarType },
    /// A function reading from the input buffer, named `<input>_im`.
    Buffer {
        name: String,
        func: String,
        ty: ScalarType,
        rank: u32,
    },
}

impl Placeholder {
    pub fn element_type(&self) -> ScalarType {
        match self {
            Placeholder::Variable { ty, .. } | Placeholder::Buffer { ty, .. } => *ty,
        }
    }

    pub fn rank(&self) -> u32 {
        match self {
            Placeholder::Variable { .. } => 0,
            Placeholder::Buffer { rank, .. } => *rank,
        }
    }

    pub fn to_argument(&self) -> Argument {
        match self {
            Placeholder::Variable { name, ty } => Argument::scalar(name, *ty),
            Placeholder::Buffer { name, ty, rank, .. } => {
                Argument::buffer(name, ArgumentKind::InputBuffer, *ty, *rank)
            }
        }
    }
}

struct Declared {
    ty: ScalarType,
    /// None for scalar inputs.
    rank: Option<u32>,
    type_option: Option<Arc<OptionCell<ScalarType>>>,
    rank_option: Option<Arc<OptionCell<u32>>>,
}

enum InputState {
    Declared(Declared),
    Materialized(Placeholder),
}

pub(crate) struct InputCell {
    name: String,
    state: Mutex<InputState>,
}

impl InputCell {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Build the placeholder if that has not happened yet, and return it.
    pub(crate) fn materialize(&self) -> Placeholder {
        let mut state = self.state.lock();
        let placeholder = match &*state {
            InputState::Materialized(placeholder) => return placeholder.clone(),
            InputState::Declared(declared) => {
                let ty = declared
                    .type_option
                    .as_ref()
                    .map(|o| o.get())
                    .unwrap_or(declared.ty);
                match declared.rank {
                    None => Placeholder::Variable {
                        name: self.name.clone(),
                        ty,
                    },
                    Some(rank) => Placeholder::Buffer {
                        name: self.name.clone(),
                        func: format!("{}_im", self.name),
                        ty,
                        rank: declared.rank_option.as_ref().map(|o| o.get()).unwrap_or(rank),
                    },
                }
            }
        };
        tracing::debug!(input = %self.name, ?placeholder, "materialized input");
        *state = InputState::Materialized(placeholder.clone());
        placeholder
    }

    fn placeholder(&self) -> Option<Placeholder> {
        match &*self.state.lock() {
            InputState::Materialized(placeholder) => Some(placeholder.clone()),
            InputState::Declared(_) => None,
        }
    }
}

/// A typed input of a generator.
pub struct Input {
    cell: Arc<InputCell>,
    _registration: Registration<FieldToken>,
}

impl Input {
    pub(crate) fn declare(field: Field, name: &str, ty: ScalarType, rank: Option<u32>) -> Self {
        let cell = Arc::new(InputCell {
            name: name.to_string(),
            state: Mutex::new(InputState::Declared(Declared {
                ty,
                rank,
                type_option: None,
                rank_option: None,
            })),
        });
        let registration = field.register(Category::Input, FieldToken::input(Arc::clone(&cell)));
        Self {
            cell,
            _registration: registration,
        }
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn is_buffer(&self) -> bool {
        match &*self.cell.state.lock() {
            InputState::Declared(declared) => declared.rank.is_some(),
            InputState::Materialized(placeholder) => {
                matches!(placeholder, Placeholder::Buffer { .. })
            }
        }
    }

    /// Take the element type from an option when materializing.
    pub fn with_type_option(self, option: &GeneratorOption<ScalarType>) -> Self {
        if let InputState::Declared(declared) = &mut *self.cell.state.lock() {
            declared.type_option = Some(option.cell());
        }
        self
    }

    /// Take the rank of a buffer input from an option when materializing.
    pub fn with_rank_option(self, option: &GeneratorOption<u32>) -> Self {
        if let InputState::Declared(declared) = &mut *self.cell.state.lock() {
            declared.rank_option = Some(option.cell());
        }
        self
    }

    /// Get the placeholder, materializing it on first use.
    pub fn placeholder(&self) -> Placeholder {
        self.cell.materialize()
    }

    pub fn is_materialized(&self) -> bool {
        self.cell.placeholder().is_some()
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("name", &self.cell.name)
            .field("placeholder", &self.cell.placeholder())
            .finish()
    }
}
