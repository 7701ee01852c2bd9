//! Generic recursive traversal shared by every transform.
//!
//! A [`TreeVisitor`] sees each container before its children (`visit_*`) and,
//! when it chose to descend, again after them (`leave_*`). Returning
//! [`Step::Replace`] from a `visit_*` method makes the returned node terminal.

use crate::domain::entities::{Array, ArrayData, Mapping, Scalar, SequenceKind, Tree};
use crate::domain::error::DomainResult;

/// Outcome of a pre-order visit.
#[derive(Debug)]
pub enum Step {
    /// Walk into the children of this node, then call the matching `leave_*` hook.
    Descend(Tree),
    /// Use this node as-is; do not recurse.
    Replace(Tree),
}

pub trait TreeVisitor {
    fn visit_mapping(&mut self, mapping: Mapping) -> DomainResult<Step> {
        Ok(Step::Descend(Tree::Mapping(mapping)))
    }

    fn visit_sequence(&mut self, kind: SequenceKind, items: Vec<Tree>) -> DomainResult<Step> {
        Ok(Step::Descend(kind.wrap(items)))
    }

    fn visit_array(&mut self, array: Array) -> DomainResult<Step> {
        Ok(Step::Descend(Tree::Array(array)))
    }

    fn visit_scalar(&mut self, scalar: Scalar) -> DomainResult<Tree> {
        Ok(Tree::Scalar(scalar))
    }

    fn leave_mapping(&mut self, mapping: Mapping) -> DomainResult<Tree> {
        Ok(Tree::Mapping(mapping))
    }

    fn leave_sequence(&mut self, kind: SequenceKind, items: Vec<Tree>) -> DomainResult<Tree> {
        Ok(kind.wrap(items))
    }

    fn leave_array(&mut self, array: Array) -> DomainResult<Tree> {
        Ok(Tree::Array(array))
    }
}

/// Walk `node` with `visitor`, returning the transformed tree.
pub fn walk<V: TreeVisitor + ?Sized>(node: Tree, visitor: &mut V) -> DomainResult<Tree> {
    let step = match node {
        Tree::Mapping(mapping) => visitor.visit_mapping(mapping)?,
        Tree::List(items) => visitor.visit_sequence(SequenceKind::List, items)?,
        Tree::Tuple(items) => visitor.visit_sequence(SequenceKind::Tuple, items)?,
        Tree::Array(array) => visitor.visit_array(array)?,
        Tree::Scalar(scalar) => return visitor.visit_scalar(scalar),
    };

    match step {
        Step::Replace(node) => Ok(node),
        Step::Descend(node) => descend(node, visitor),
    }
}

fn descend<V: TreeVisitor + ?Sized>(node: Tree, visitor: &mut V) -> DomainResult<Tree> {
    match node {
        Tree::Mapping(mapping) => {
            let mut walked = Mapping::with_capacity(mapping.len());
            for (key, value) in mapping {
                walked.insert(key, walk(value, visitor)?);
            }
            visitor.leave_mapping(walked)
        }
        Tree::List(items) => {
            let items = walk_all(items, visitor)?;
            visitor.leave_sequence(SequenceKind::List, items)
        }
        Tree::Tuple(items) => {
            let items = walk_all(items, visitor)?;
            visitor.leave_sequence(SequenceKind::Tuple, items)
        }
        Tree::Array(array) => {
            let array = match array.into_parts() {
                (shape, ArrayData::Object(elements)) => {
                    Array::new(shape, ArrayData::Object(walk_all(elements, visitor)?))?
                }
                (shape, data) => Array::new(shape, data)?,
            };
            visitor.leave_array(array)
        }
        // a visitor may hand back a scalar from a container visit
        Tree::Scalar(scalar) => Ok(Tree::Scalar(scalar)),
    }
}

fn walk_all<V: TreeVisitor + ?Sized>(items: Vec<Tree>, visitor: &mut V) -> DomainResult<Vec<Tree>> {
    items.into_iter().map(|item| walk(item, visitor)).collect()
}
