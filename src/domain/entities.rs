//! Domain entities: the nested tree model

use std::fmt;

use indexmap::IndexMap;

use crate::domain::complex::Complex;
use crate::domain::error::{DomainError, DomainResult};

/// String-keyed mapping that keeps insertion order.
pub type Mapping = IndexMap<String, Tree>;

/// A nested value handed to or received from a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    Mapping(Mapping),
    /// Ordered, mutable sequence
    List(Vec<Tree>),
    /// Ordered, immutable sequence
    Tuple(Vec<Tree>),
    Array(Array),
    Scalar(Scalar),
}

/// Distinguishes the two sequence flavours for visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    List,
    Tuple,
}

impl SequenceKind {
    pub fn wrap(self, items: Vec<Tree>) -> Tree {
        match self {
            SequenceKind::List => Tree::List(items),
            SequenceKind::Tuple => Tree::Tuple(items),
        }
    }
}

/// Leaf values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex),
    Str(String),
    /// Single-element numeric wrapper (a typed, zero-dimensional number)
    Wrapped(Number),
}

/// Numeric payload of a wrapper scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
    Complex(Complex),
}

impl Number {
    /// The bare scalar this wrapper stands for.
    pub fn into_scalar(self) -> Scalar {
        match self {
            Number::Int(v) => Scalar::Int(v),
            Number::Float(v) => Scalar::Float(v),
            Number::Complex(v) => Scalar::Complex(v),
        }
    }
}

impl Scalar {
    /// Reduce a wrapper scalar to its bare value; other scalars pass through.
    pub fn unwrapped(self) -> Scalar {
        match self {
            Scalar::Wrapped(number) => number.into_scalar(),
            other => other,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

/// Element kind of an [`Array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ElementKind {
    Int,
    Float,
    Complex,
    Object,
    /// Opaque element type produced by a backend and not interpreted here
    Raw,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Int => "int",
            ElementKind::Float => "float",
            ElementKind::Complex => "complex",
            ElementKind::Object => "object",
            ElementKind::Raw => "raw",
        };
        f.write_str(name)
    }
}

/// Flat, row-major element storage of an [`Array`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Complex(Vec<Complex>),
    Object(Vec<Tree>),
    Raw {
        dtype: String,
        item_size: usize,
        bytes: Vec<u8>,
    },
}

impl ArrayData {
    pub fn kind(&self) -> ElementKind {
        match self {
            ArrayData::Int(_) => ElementKind::Int,
            ArrayData::Float(_) => ElementKind::Float,
            ArrayData::Complex(_) => ElementKind::Complex,
            ArrayData::Object(_) => ElementKind::Object,
            ArrayData::Raw { .. } => ElementKind::Raw,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArrayData::Int(v) => v.len(),
            ArrayData::Float(v) => v.len(),
            ArrayData::Complex(v) => v.len(),
            ArrayData::Object(v) => v.len(),
            ArrayData::Raw {
                item_size, bytes, ..
            } => match item_size {
                0 => 0,
                size => bytes.len() / size,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dtype_name(&self) -> String {
        match self {
            ArrayData::Raw { dtype, .. } => dtype.clone(),
            other => other.kind().to_string(),
        }
    }
}

/// Homogeneous n-dimensional array with a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    shape: Vec<usize>,
    data: ArrayData,
}

impl Array {
    /// Build an array, checking that the shape covers exactly the elements.
    pub fn new(shape: Vec<usize>, data: ArrayData) -> DomainResult<Self> {
        let expected: usize = shape.iter().product();
        if let ArrayData::Raw {
            item_size, bytes, ..
        } = &data
        {
            if *item_size == 0 || bytes.len() % item_size != 0 {
                return Err(DomainError::ShapeMismatch {
                    shape,
                    len: bytes.len(),
                });
            }
        }
        if expected != data.len() {
            let len = data.len();
            return Err(DomainError::ShapeMismatch { shape, len });
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional array over `data`.
    pub fn vector(data: ArrayData) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_parts(self) -> (Vec<usize>, ArrayData) {
        (self.shape, self.data)
    }

    /// Elements as trees in flat row-major order.
    ///
    /// Fails for raw arrays, whose elements have no tree representation.
    pub fn into_elements(self) -> DomainResult<Vec<Tree>> {
        let context = format!("array of shape {:?} has no element representation", self.shape);
        let elements = match self.data {
            ArrayData::Int(v) => v.into_iter().map(|x| Tree::Scalar(Scalar::Int(x))).collect(),
            ArrayData::Float(v) => v
                .into_iter()
                .map(|x| Tree::Scalar(Scalar::Float(x)))
                .collect(),
            ArrayData::Complex(v) => v
                .into_iter()
                .map(|x| Tree::Scalar(Scalar::Complex(x)))
                .collect(),
            ArrayData::Object(v) => v,
            raw @ ArrayData::Raw { .. } => {
                return Err(DomainError::unsupported(raw.dtype_name(), context));
            }
        };
        Ok(elements)
    }

    /// Nest flat elements into sequences mirroring the shape, outermost first.
    ///
    /// A zero-dimensional array yields its single element.
    pub fn into_nested(self) -> DomainResult<Tree> {
        let shape = self.shape.clone();
        let elements = self.into_elements()?;
        Ok(nest(&shape, elements, SequenceKind::Tuple))
    }
}

/// Split `elements` by the leading dimension, recursing into the rest.
pub(crate) fn nest(shape: &[usize], elements: Vec<Tree>, kind: SequenceKind) -> Tree {
    match shape.split_first() {
        None => elements
            .into_iter()
            .next()
            .unwrap_or(Tree::Scalar(Scalar::Null)),
        Some((&outer, rest)) => {
            let stride: usize = rest.iter().product();
            let mut remaining = elements.into_iter();
            let items = (0..outer)
                .map(|_| {
                    let chunk: Vec<Tree> = remaining.by_ref().take(stride).collect();
                    nest(rest, chunk, kind)
                })
                .collect();
            kind.wrap(items)
        }
    }
}

impl Tree {
    pub fn null() -> Self {
        Tree::Scalar(Scalar::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Tree::Scalar(Scalar::Null))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Tree::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tree::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Short name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Tree::Mapping(_) => "mapping",
            Tree::List(_) => "list",
            Tree::Tuple(_) => "tuple",
            Tree::Array(_) => "array",
            Tree::Scalar(_) => "scalar",
        }
    }
}

impl From<Scalar> for Tree {
    fn from(value: Scalar) -> Self {
        Tree::Scalar(value)
    }
}

impl From<Array> for Tree {
    fn from(value: Array) -> Self {
        Tree::Array(value)
    }
}

impl From<Mapping> for Tree {
    fn from(value: Mapping) -> Self {
        Tree::Mapping(value)
    }
}

impl From<i64> for Tree {
    fn from(value: i64) -> Self {
        Tree::Scalar(Scalar::Int(value))
    }
}

impl From<i32> for Tree {
    fn from(value: i32) -> Self {
        Tree::Scalar(Scalar::Int(i64::from(value)))
    }
}

impl From<f64> for Tree {
    fn from(value: f64) -> Self {
        Tree::Scalar(Scalar::Float(value))
    }
}

impl From<bool> for Tree {
    fn from(value: bool) -> Self {
        Tree::Scalar(Scalar::Bool(value))
    }
}

impl From<Complex> for Tree {
    fn from(value: Complex) -> Self {
        Tree::Scalar(Scalar::Complex(value))
    }
}

impl From<&str> for Tree {
    fn from(value: &str) -> Self {
        Tree::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for Tree {
    fn from(value: String) -> Self {
        Tree::Scalar(Scalar::Str(value))
    }
}

impl<T: Into<Tree>> From<Option<T>> for Tree {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Tree::Scalar(Scalar::Null))
    }
}
