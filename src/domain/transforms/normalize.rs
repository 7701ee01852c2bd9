//! Read-side array normalization.
//!
//! Recovers in-memory shapes from what a backend hands back: wrapper scalars
//! become bare scalars, single-element arrays collapse to their element, and
//! on backends without native arrays rectangular numeric sequences are
//! promoted back into arrays. Complex arrays are rebuilt by complex decoding,
//! not here.

use itertools::Itertools;
use tracing::trace;

use crate::domain::complex::Complex;
use crate::domain::entities::{Array, ArrayData, ElementKind, Number, Scalar, SequenceKind, Tree};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::profile::FeatureProfile;
use crate::domain::walker::{walk, Step, TreeVisitor};

/// Whether sequences may be promoted to arrays on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Promote rectangular sequences of numbers (backend stores arrays as sequences)
    pub promote_numeric: bool,
}

impl NormalizeOptions {
    pub fn for_profile(profile: FeatureProfile) -> Self {
        Self {
            promote_numeric: !profile.supports_array,
        }
    }
}

struct ArrayNormalizer {
    options: NormalizeOptions,
    promoted: usize,
}

impl TreeVisitor for ArrayNormalizer {
    fn visit_sequence(&mut self, kind: SequenceKind, items: Vec<Tree>) -> DomainResult<Step> {
        match promote(&items, self.options)? {
            Some(array) => {
                self.promoted += 1;
                Ok(Step::Replace(reduce_singleton(array)?))
            }
            None => Ok(Step::Descend(kind.wrap(items))),
        }
    }

    fn visit_array(&mut self, array: Array) -> DomainResult<Step> {
        match array.kind() {
            ElementKind::Object => Ok(Step::Descend(Tree::Array(array))),
            _ => Ok(Step::Replace(reduce_singleton(array)?)),
        }
    }

    fn visit_scalar(&mut self, scalar: Scalar) -> DomainResult<Tree> {
        Ok(Tree::Scalar(scalar.unwrapped()))
    }

    fn leave_array(&mut self, array: Array) -> DomainResult<Tree> {
        reduce_singleton(array)
    }
}

/// Collapse a one-element array to its element.
fn reduce_singleton(array: Array) -> DomainResult<Tree> {
    if array.len() != 1 {
        return Ok(Tree::Array(array));
    }
    if array.kind() == ElementKind::Raw {
        return Err(DomainError::unsupported(
            ElementKind::Raw.to_string(),
            "single-element raw array cannot be reduced to a scalar",
        ));
    }
    let mut elements = array.into_elements()?;
    Ok(elements.pop().unwrap_or_else(Tree::null))
}

fn numeric_leaf(node: &Tree) -> Option<Number> {
    match node {
        Tree::Scalar(Scalar::Int(v)) => Some(Number::Int(*v)),
        Tree::Scalar(Scalar::Float(v)) => Some(Number::Float(*v)),
        Tree::Scalar(Scalar::Complex(v)) => Some(Number::Complex(*v)),
        Tree::Scalar(Scalar::Wrapped(number)) => Some(*number),
        _ => None,
    }
}

/// Shape of a rectangular, non-empty nest of numeric leaves.
fn rectangular_shape(node: &Tree) -> Option<Vec<usize>> {
    match node {
        Tree::List(items) | Tree::Tuple(items) => {
            if items.is_empty() {
                return None;
            }
            let shapes: Vec<Vec<usize>> = items.iter().map(rectangular_shape).collect::<Option<_>>()?;
            if !shapes.iter().all_equal() {
                return None;
            }
            let mut shape = vec![items.len()];
            shape.extend(shapes.into_iter().next().unwrap_or_default());
            Some(shape)
        }
        other => numeric_leaf(other).map(|_| Vec::new()),
    }
}

fn collect_leaves(node: &Tree, leaves: &mut Vec<Number>) {
    match node {
        Tree::List(items) | Tree::Tuple(items) => {
            for item in items {
                collect_leaves(item, leaves);
            }
        }
        other => leaves.extend(numeric_leaf(other)),
    }
}

fn widest_kind(leaves: &[Number]) -> ElementKind {
    leaves
        .iter()
        .map(|leaf| match leaf {
            Number::Int(_) => ElementKind::Int,
            Number::Float(_) => ElementKind::Float,
            Number::Complex(_) => ElementKind::Complex,
        })
        .max()
        .unwrap_or(ElementKind::Int)
}

fn as_float(leaf: Number) -> f64 {
    match leaf {
        Number::Int(v) => v as f64,
        Number::Float(v) => v,
        Number::Complex(v) => v.re,
    }
}

fn as_complex(leaf: Number) -> Complex {
    match leaf {
        Number::Complex(v) => v,
        other => Complex::from(as_float(other)),
    }
}

/// Promote a sequence to an array when the options allow it.
fn promote(items: &[Tree], options: NormalizeOptions) -> DomainResult<Option<Array>> {
    if !options.promote_numeric {
        return Ok(None);
    }
    let Some(mut shape) = items
        .iter()
        .map(rectangular_shape)
        .collect::<Option<Vec<_>>>()
        .filter(|shapes| !shapes.is_empty() && shapes.iter().all_equal())
        .and_then(|shapes| shapes.into_iter().next())
    else {
        return Ok(None);
    };
    shape.insert(0, items.len());

    let mut leaves = Vec::with_capacity(shape.iter().product());
    for item in items {
        collect_leaves(item, &mut leaves);
    }

    let data = match widest_kind(&leaves) {
        ElementKind::Int => ArrayData::Int(
            leaves
                .into_iter()
                .filter_map(|leaf| match leaf {
                    Number::Int(v) => Some(v),
                    _ => None,
                })
                .collect(),
        ),
        ElementKind::Float => ArrayData::Float(leaves.into_iter().map(as_float).collect()),
        _ => ArrayData::Complex(leaves.into_iter().map(as_complex).collect()),
    };
    Array::new(shape, data).map(Some)
}

/// Normalize a tree read from a backend.
pub fn normalize_arrays(tree: Tree, options: NormalizeOptions) -> DomainResult<Tree> {
    let mut normalizer = ArrayNormalizer {
        options,
        promoted: 0,
    };
    let normalized = walk(tree, &mut normalizer)?;
    trace!("normalize_arrays: promoted {} sequences", normalizer.promoted);
    Ok(normalized)
}
