//! Legacy-style params: scalar `Param<T>` and buffer `ImageParam`.

use std::{fmt, marker::PhantomData, sync::Arc};

use gengen_core::{Argument, ArgumentKind, Scalar, ScalarType, ScalarValue};
use parking_lot::Mutex;

use crate::{
    field::{Field, FieldToken},
    instance::{Category, Registration},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParamShape {
    Scalar {
        ty: ScalarType,
        value: ScalarValue,
        min: Option<ScalarValue>,
        max: Option<ScalarValue>,
    },
    Buffer {
        ty: ScalarType,
        rank: u32,
    },
}

pub(crate) struct ParamCell {
    name: String,
    shape: Mutex<ParamShape>,
}

impl ParamCell {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn to_argument(&self) -> Argument {
        match &*self.shape.lock() {
            ParamShape::Scalar {
                ty,
                value,
                min,
                max,
            } => Argument::scalar(&self.name, *ty).with_bounds(Some(*value), *min, *max),
            ParamShape::Buffer { ty, rank } => {
                Argument::buffer(&self.name, ArgumentKind::InputBuffer, *ty, *rank)
            }
        }
    }
}

fn declare_cell(field: Field, name: &str, shape: ParamShape) -> (Arc<ParamCell>, Registration<FieldToken>) {
    let cell = Arc::new(ParamCell {
        name: name.to_string(),
        shape: Mutex::new(shape),
    });
    let registration = field.register(Category::Param, FieldToken::param(Arc::clone(&cell)));
    (cell, registration)
}

/// A scalar param with a current value and optional bounds.
pub struct Param<T> {
    cell: Arc<ParamCell>,
    _registration: Registration<FieldToken>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Scalar> Param<T> {
    pub(crate) fn declare(field: Field, name: &str, default: T) -> Self {
        let (cell, registration) = declare_cell(
            field,
            name,
            ParamShape::Scalar {
                ty: T::TYPE,
                value: default.to_value(),
                min: None,
                max: None,
            },
        );
        Self {
            cell,
            _registration: registration,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        match &*self.cell.shape.lock() {
            ParamShape::Scalar { value, .. } => T::from_value(*value),
            ParamShape::Buffer { .. } => None,
        }
        .unwrap_or_else(|| unreachable!("Param<T> always holds a value of type T"))
    }

    pub fn set(&self, value: T) {
        if let ParamShape::Scalar { value: v, .. } = &mut *self.cell.shape.lock() {
            *v = value.to_value();
        }
    }

    /// Set the bounds reported in the argument list.
    pub fn with_range(self, min: T, max: T) -> Self {
        if let ParamShape::Scalar {
            min: lo, max: hi, ..
        } = &mut *self.cell.shape.lock()
        {
            *lo = Some(min.to_value());
            *hi = Some(max.to_value());
        }
        self
    }

    pub fn to_argument(&self) -> Argument {
        self.cell.to_argument()
    }
}

impl<T> fmt::Debug for Param<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Param")
            .field("name", &self.cell.name)
            .field("shape", &*self.cell.shape.lock())
            .finish()
    }
}

/// A buffer param with a fixed element type and rank.
pub struct ImageParam {
    cell: Arc<ParamCell>,
    _registration: Registration<FieldToken>,
}

impl ImageParam {
    pub(crate) fn declare(field: Field, name: &str, ty: ScalarType, rank: u32) -> Self {
        let (cell, registration) = declare_cell(field, name, ParamShape::Buffer { ty, rank });
        Self {
            cell,
            _registration: registration,
        }
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn element_type(&self) -> ScalarType {
        match &*self.cell.shape.lock() {
            ParamShape::Buffer { ty, .. } | ParamShape::Scalar { ty, .. } => *ty,
        }
    }

    pub fn rank(&self) -> u32 {
        match &*self.cell.shape.lock() {
            ParamShape::Buffer { rank, .. } => *rank,
            ParamShape::Scalar { .. } => 0,
        }
    }

    /// Replace the buffer's element type and rank while building a pipeline.
    pub fn reshape(&self, ty: ScalarType, rank: u32) {
        *self.cell.shape.lock() = ParamShape::Buffer { ty, rank };
    }

    pub fn to_argument(&self) -> Argument {
        self.cell.to_argument()
    }
}

impl fmt::Debug for ImageParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageParam")
            .field("name", &self.cell.name)
            .field("shape", &*self.cell.shape.lock())
            .finish()
    }
}
