//! Array flattening for backends without native arrays.

use tracing::trace;

use crate::domain::entities::{Array, Scalar, Tree};
use crate::domain::error::DomainResult;
use crate::domain::walker::{walk, TreeVisitor};

struct ArrayFlattener {
    flattened: usize,
}

impl TreeVisitor for ArrayFlattener {
    // object elements have already been walked when we get here
    fn leave_array(&mut self, array: Array) -> DomainResult<Tree> {
        self.flattened += 1;
        array.into_nested()
    }

    fn visit_scalar(&mut self, scalar: Scalar) -> DomainResult<Tree> {
        Ok(Tree::Scalar(scalar.unwrapped()))
    }
}

/// Convert every array into nested tuples mirroring its shape and reduce
/// wrapper scalars to bare ones.
pub fn flatten_arrays(tree: Tree) -> DomainResult<Tree> {
    let mut flattener = ArrayFlattener { flattened: 0 };
    let flat = walk(tree, &mut flattener)?;
    trace!("flatten_arrays: converted {} arrays", flattener.flattened);
    Ok(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::complex::Complex;
    use crate::domain::entities::{ArrayData, Mapping, Number};
    use crate::domain::error::DomainError;

    fn tuple<T: Into<Tree>>(items: Vec<T>) -> Tree {
        Tree::Tuple(items.into_iter().map(Into::into).collect())
    }

    #[test]
    fn given_2x2_int_array_when_flattening_then_nested_plain_sequences() {
        let array = Array::new(vec![2, 2], ArrayData::Int(vec![1, 2, 3, 4])).unwrap();

        let flat = flatten_arrays(Tree::Array(array)).unwrap();

        assert_eq!(flat, Tree::Tuple(vec![tuple(vec![1, 2]), tuple(vec![3, 4])]));
    }

    #[test]
    fn given_3d_array_when_flattening_then_depth_matches_rank() {
        let array = Array::new(vec![2, 1, 2], ArrayData::Float(vec![1.0, 2.0, 3.0, 4.0])).unwrap();

        let flat = flatten_arrays(Tree::Array(array)).unwrap();

        assert_eq!(
            flat,
            Tree::Tuple(vec![
                Tree::Tuple(vec![tuple(vec![1.0, 2.0])]),
                Tree::Tuple(vec![tuple(vec![3.0, 4.0])]),
            ])
        );
    }

    #[test]
    fn given_object_array_of_arrays_when_flattening_then_elements_flattened_too() {
        let inner = Array::vector(ArrayData::Int(vec![7, 8]));
        let mut m = Mapping::new();
        m.insert("w".into(), Tree::Scalar(Scalar::Wrapped(Number::Float(0.5))));
        let outer = Array::new(
            vec![2],
            ArrayData::Object(vec![Tree::Array(inner), Tree::Mapping(m.clone())]),
        )
        .unwrap();

        let flat = flatten_arrays(Tree::Array(outer)).unwrap();

        let mut expected_m = Mapping::new();
        expected_m.insert("w".into(), Tree::from(0.5));
        assert_eq!(
            flat,
            Tree::Tuple(vec![tuple(vec![7, 8]), Tree::Mapping(expected_m)])
        );
    }

    #[test]
    fn given_complex_array_when_flattening_then_complex_scalars_kept() {
        let array = Array::vector(ArrayData::Complex(vec![Complex::new(1.0, 2.0)]));

        let flat = flatten_arrays(Tree::Array(array)).unwrap();

        assert_eq!(flat, tuple(vec![Complex::new(1.0, 2.0)]));
    }

    #[test]
    fn given_wrapped_scalar_when_flattening_then_bare_scalar() {
        let tree = Tree::List(vec![Tree::Scalar(Scalar::Wrapped(Number::Int(3)))]);
        assert_eq!(flatten_arrays(tree).unwrap(), Tree::List(vec![Tree::from(3)]));
    }

    #[test]
    fn given_raw_array_when_flattening_then_unsupported_kind() {
        let raw = ArrayData::Raw {
            dtype: "timedelta64".into(),
            item_size: 8,
            bytes: vec![0; 8],
        };
        let array = Array::new(vec![1], raw).unwrap();

        let err = flatten_arrays(Tree::Array(array)).unwrap_err();

        assert!(matches!(err, DomainError::UnsupportedKind { .. }));
    }
}
