use std::{fmt, str::FromStr};

use indexmap::IndexMap;

/// Option values keyed by option name, string encoded.
///
/// Used both to configure a freshly created generator and to capture the
/// option state of an existing one.
pub type OptionValues = IndexMap<String, String>;

/// Element type of a scalar parameter or buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarType {
    Bool,
    Int8,
    Int16,
    Int32,
    UInt8,
    UInt16,
    UInt32,
    Float32,
    Float64,
}

impl ScalarType {
    /// All scalar types, in the order they are listed in help text.
    pub const ALL: [ScalarType; 9] = [
        ScalarType::Bool,
        ScalarType::Int8,
        ScalarType::Int16,
        ScalarType::Int32,
        ScalarType::UInt8,
        ScalarType::UInt16,
        ScalarType::UInt32,
        ScalarType::Float32,
        ScalarType::Float64,
    ];

    /// Get the option-string spelling of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::UInt8 => "uint8",
            ScalarType::UInt16 => "uint16",
            ScalarType::UInt32 => "uint32",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
        }
    }

    /// Get the C spelling of this type.
    pub fn c_type(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int8 => "int8_t",
            ScalarType::Int16 => "int16_t",
            ScalarType::Int32 => "int32_t",
            ScalarType::UInt8 => "uint8_t",
            ScalarType::UInt16 => "uint16_t",
            ScalarType::UInt32 => "uint32_t",
            ScalarType::Float32 => "float",
            ScalarType::Float64 => "double",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = ScalarType::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown type '{}', expected one of [{}]", s, names.join(", "))
            })
    }
}

/// A concrete scalar value, used for param defaults and bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(v) => write!(f, "{}", v),
            ScalarValue::Int(v) => write!(f, "{}", v),
            ScalarValue::UInt(v) => write!(f, "{}", v),
            ScalarValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Rust types that can back a scalar param.
pub trait Scalar: Copy + Send + Sync + 'static {
    const TYPE: ScalarType;

    fn to_value(self) -> ScalarValue;

    fn from_value(value: ScalarValue) -> Option<Self>;
}

macro_rules! impl_scalar {
    ($ty:ty, $scalar:expr, $variant:ident, $wide:ty) => {
        impl Scalar for $ty {
            const TYPE: ScalarType = $scalar;

            fn to_value(self) -> ScalarValue {
                ScalarValue::$variant(self as $wide)
            }

            fn from_value(value: ScalarValue) -> Option<Self> {
                match value {
                    ScalarValue::$variant(v) => <$ty>::try_from(v).ok(),
                    _ => None,
                }
            }
        }
    };
}

impl_scalar!(i8, ScalarType::Int8, Int, i64);
impl_scalar!(i16, ScalarType::Int16, Int, i64);
impl_scalar!(i32, ScalarType::Int32, Int, i64);
impl_scalar!(u8, ScalarType::UInt8, UInt, u64);
impl_scalar!(u16, ScalarType::UInt16, UInt, u64);
impl_scalar!(u32, ScalarType::UInt32, UInt, u64);

impl Scalar for bool {
    const TYPE: ScalarType = ScalarType::Bool;

    fn to_value(self) -> ScalarValue {
        ScalarValue::Bool(self)
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for f32 {
    const TYPE: ScalarType = ScalarType::Float32;

    fn to_value(self) -> ScalarValue {
        ScalarValue::Float(self as f64)
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Float(v) => Some(v as f32),
            _ => None,
        }
    }
}

impl Scalar for f64 {
    const TYPE: ScalarType = ScalarType::Float64;

    fn to_value(self) -> ScalarValue {
        ScalarValue::Float(self)
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Float(v) => Some(v),
            _ => None,
        }
    }
}

/// How an argument is passed to the compiled function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    InputScalar,
    InputBuffer,
    OutputBuffer,
}

impl ArgumentKind {
    pub fn is_buffer(&self) -> bool {
        !matches!(self, ArgumentKind::InputScalar)
    }
}

/// One entry of a compiled function's signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub kind: ArgumentKind,
    pub element_type: ScalarType,
    /// Number of dimensions; zero for scalars.
    pub rank: u32,
    pub default: Option<ScalarValue>,
    pub min: Option<ScalarValue>,
    pub max: Option<ScalarValue>,
}

impl Argument {
    /// Create a scalar input argument.
    pub fn scalar(name: impl Into<String>, element_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: ArgumentKind::InputScalar,
            element_type,
            rank: 0,
            default: None,
            min: None,
            max: None,
        }
    }

    /// Create a buffer argument of the given kind.
    pub fn buffer(
        name: impl Into<String>,
        kind: ArgumentKind,
        element_type: ScalarType,
        rank: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            element_type,
            rank,
            default: None,
            min: None,
            max: None,
        }
    }

    /// Set the default and bounds of a scalar argument.
    pub fn with_bounds(
        mut self,
        default: Option<ScalarValue>,
        min: Option<ScalarValue>,
        max: Option<ScalarValue>,
    ) -> Self {
        self.default = default;
        self.min = min;
        self.max = max;
        self
    }

    pub fn is_buffer(&self) -> bool {
        self.kind.is_buffer()
    }
}
