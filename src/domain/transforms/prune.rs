//! Null pruning: drop mapping entries whose value is null.

use tracing::trace;

use crate::domain::entities::{Mapping, Tree};
use crate::domain::error::DomainResult;
use crate::domain::walker::{walk, TreeVisitor};

struct NullPruner {
    removed: usize,
}

impl TreeVisitor for NullPruner {
    // Children are already pruned here, so a mapping emptied by pruning is a
    // value like any other and keeps its key.
    fn leave_mapping(&mut self, mut mapping: Mapping) -> DomainResult<Tree> {
        let before = mapping.len();
        mapping.retain(|_, value| !value.is_null());
        self.removed += before - mapping.len();
        Ok(Tree::Mapping(mapping))
    }
}

/// Remove every mapping entry whose value is null, at any depth.
///
/// Sequences and arrays are walked but never lose positions.
pub fn prune_nulls(tree: Tree) -> DomainResult<Tree> {
    let mut pruner = NullPruner { removed: 0 };
    let pruned = walk(tree, &mut pruner)?;
    trace!("prune_nulls: removed {} entries", pruner.removed);
    Ok(pruned)
}
