//! Generator options: named, string-encoded configuration values.

use std::{fmt, sync::Arc};

use gengen_core::{Error, Result, ScalarType, Target};
use parking_lot::Mutex;

use crate::{
    field::{Field, FieldToken},
    instance::{Category, Registration},
};

/// A value that can be carried by a [`GeneratorOption`].
pub trait OptionValue: Clone + Send + Sync + 'static {
    /// Encode for `key=value` arguments.
    fn encode(&self) -> String;

    /// Decode from `key=value` arguments, returning a reason on failure.
    fn decode(s: &str) -> std::result::Result<Self, String>;
}

impl OptionValue for bool {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(s: &str) -> std::result::Result<Self, String> {
        match s {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err("expected 'true' or 'false'".to_string()),
        }
    }
}

macro_rules! impl_option_value_via_parse {
    ($($ty:ty),*) => {
        $(
            impl OptionValue for $ty {
                fn encode(&self) -> String {
                    self.to_string()
                }

                fn decode(s: &str) -> std::result::Result<Self, String> {
                    s.parse::<$ty>().map_err(|e| e.to_string())
                }
            }
        )*
    };
}

impl_option_value_via_parse!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String, ScalarType, Target);

/// Type-erased view of an option, used by discovery.
pub(crate) trait OptionSlot: Send + Sync {
    fn name(&self) -> &str;

    fn encode(&self) -> String;

    fn decode(&self, value: &str) -> Result<()>;
}

pub(crate) struct OptionCell<T> {
    name: String,
    value: Mutex<T>,
}

impl<T: OptionValue> OptionCell<T> {
    pub(crate) fn get(&self) -> T {
        self.value.lock().clone()
    }
}

impl<T: OptionValue> OptionSlot for OptionCell<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self) -> String {
        self.value.lock().encode()
    }

    fn decode(&self, value: &str) -> Result<()> {
        let decoded = T::decode(value).map_err(|reason| Error::InvalidOptionValue {
            name: self.name.clone(),
            value: value.to_string(),
            reason,
        })?;
        *self.value.lock() = decoded;
        Ok(())
    }
}

/// A named option of a generator.
///
/// Options are declared through [`GeneratorBase::option`](crate::GeneratorBase::option)
/// and set from `key=value` arguments before the generator builds its pipeline.
pub struct GeneratorOption<T> {
    cell: Arc<OptionCell<T>>,
    _registration: Registration<FieldToken>,
}

impl<T: OptionValue> GeneratorOption<T> {
    pub(crate) fn declare(field: Field, name: &str, default: T) -> Self {
        let cell = Arc::new(OptionCell {
            name: name.to_string(),
            value: Mutex::new(default),
        });
        let registration = field.register(
            Category::Option,
            FieldToken::option(Arc::clone(&cell) as Arc<dyn OptionSlot>),
        );
        Self {
            cell,
            _registration: registration,
        }
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.cell.get()
    }

    pub fn set(&self, value: T) {
        *self.cell.value.lock() = value;
    }

    pub(crate) fn cell(&self) -> Arc<OptionCell<T>> {
        Arc::clone(&self.cell)
    }
}

impl<T: OptionValue + fmt::Debug> fmt::Debug for GeneratorOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorOption")
            .field("name", &self.cell.name)
            .field("value", &*self.cell.value.lock())
            .finish()
    }
}
