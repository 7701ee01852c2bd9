//! Complex encoding records for backends without native complex support.
//!
//! A record is a mapping `{"<type>": "complex", "<": payload}` where the
//! payload is one complex literal or a (nested) sequence of literals.

use tracing::trace;

use crate::domain::complex::Complex;
use crate::domain::entities::{nest, Array, ArrayData, Mapping, Number, Scalar, SequenceKind, Tree};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::walker::{walk, Step, TreeVisitor};

/// Reserved key holding the type tag.
pub const TYPE_KEY: &str = "<type>";
/// Reserved key holding the payload.
pub const PAYLOAD_KEY: &str = "<";
/// Type tag value marking a complex record.
pub const COMPLEX_TAG: &str = "complex";

/// Build a complex record around `payload`.
pub fn complex_record(payload: Tree) -> Tree {
    let mut record = Mapping::with_capacity(2);
    record.insert(TYPE_KEY.to_string(), Tree::from(COMPLEX_TAG));
    record.insert(PAYLOAD_KEY.to_string(), payload);
    Tree::Mapping(record)
}

/// True when `mapping` carries the complex type tag.
pub fn is_complex_record(mapping: &Mapping) -> bool {
    mapping.get(TYPE_KEY).and_then(Tree::as_str) == Some(COMPLEX_TAG)
}

struct ComplexEncoder {
    encoded: usize,
}

impl ComplexEncoder {
    fn record_for(&mut self, value: Complex) -> Tree {
        self.encoded += 1;
        complex_record(Tree::from(value.to_string()))
    }
}

impl TreeVisitor for ComplexEncoder {
    fn visit_array(&mut self, array: Array) -> DomainResult<Step> {
        match array.into_parts() {
            (shape, ArrayData::Complex(values)) => {
                self.encoded += 1;
                let literals = values
                    .into_iter()
                    .map(|v| Tree::from(v.to_string()))
                    .collect();
                Ok(Step::Replace(complex_record(nest(&shape, literals, SequenceKind::Tuple))))
            }
            (shape, data) => Ok(Step::Descend(Tree::Array(Array::new(shape, data)?))),
        }
    }

    fn visit_scalar(&mut self, scalar: Scalar) -> DomainResult<Tree> {
        Ok(match scalar {
            Scalar::Complex(value) | Scalar::Wrapped(Number::Complex(value)) => {
                self.record_for(value)
            }
            other => Tree::Scalar(other),
        })
    }
}

/// Replace complex scalars and complex arrays with complex records.
pub fn encode_complex(tree: Tree) -> DomainResult<Tree> {
    let mut encoder = ComplexEncoder { encoded: 0 };
    let encoded = walk(tree, &mut encoder)?;
    trace!("encode_complex: wrote {} records", encoder.encoded);
    Ok(encoded)
}

struct ComplexDecoder {
    decoded: usize,
}

impl TreeVisitor for ComplexDecoder {
    fn visit_mapping(&mut self, mapping: Mapping) -> DomainResult<Step> {
        if !is_complex_record(&mapping) {
            return Ok(Step::Descend(Tree::Mapping(mapping)));
        }
        self.decoded += 1;
        let payload = mapping
            .get(PAYLOAD_KEY)
            .ok_or_else(|| DomainError::decode(format!("record has no '{PAYLOAD_KEY}' payload")))?;
        Ok(Step::Replace(decode_payload(payload)?))
    }
}

fn parse_literal(node: &Tree) -> DomainResult<Complex> {
    match node {
        Tree::Scalar(Scalar::Str(literal)) => literal.parse(),
        other => Err(DomainError::decode(format!(
            "payload element is a {}, expected a complex literal",
            other.kind_name()
        ))),
    }
}

fn decode_payload(payload: &Tree) -> DomainResult<Tree> {
    match payload {
        Tree::Scalar(Scalar::Str(literal)) => Ok(Tree::from(literal.parse::<Complex>()?)),
        Tree::List(items) | Tree::Tuple(items) => {
            let mut values = Vec::new();
            let shape = collect_literals(items, &mut values)?;
            Ok(Tree::Array(Array::new(shape, ArrayData::Complex(values))?))
        }
        Tree::Array(array) => match array.data() {
            ArrayData::Object(elements) => {
                let values = elements.iter().map(parse_literal).collect::<DomainResult<_>>()?;
                Ok(Tree::Array(Array::new(
                    array.shape().to_vec(),
                    ArrayData::Complex(values),
                )?))
            }
            other => Err(DomainError::decode(format!(
                "payload is a {} array, expected literals",
                other.kind()
            ))),
        },
        other => Err(DomainError::decode(format!(
            "payload is a {}, expected a literal or a sequence of literals",
            other.kind_name()
        ))),
    }
}

/// Parse a nest of literals in row-major order and return its shape.
///
/// Empty levels are zero-length dimensions; every sibling must share a shape.
fn collect_literals(items: &[Tree], values: &mut Vec<Complex>) -> DomainResult<Vec<usize>> {
    let mut inner: Option<Vec<usize>> = None;
    for item in items {
        let shape = match item {
            Tree::List(nested) | Tree::Tuple(nested) => collect_literals(nested, values)?,
            other => {
                values.push(parse_literal(other)?);
                Vec::new()
            }
        };
        match &inner {
            Some(expected) if *expected != shape => {
                return Err(DomainError::decode(format!(
                    "ragged payload: shape {shape:?} next to {expected:?}"
                )));
            }
            Some(_) => {}
            None => inner = Some(shape),
        }
    }
    let mut shape = vec![items.len()];
    shape.extend(inner.unwrap_or_default());
    Ok(shape)
}

/// Turn complex records back into complex scalars or complex arrays.
pub fn decode_complex(tree: Tree) -> DomainResult<Tree> {
    let mut decoder = ComplexDecoder { decoded: 0 };
    let decoded = walk(tree, &mut decoder)?;
    trace!("decode_complex: read {} records", decoder.decoded);
    Ok(decoded)
}
