//! Dotted-key lookup into nested mappings.
//!
//! Keys may themselves contain dots, so `a.b.c` first tries the literal key
//! `a.b.c`, then `a.b` followed by `c`, then `a` followed by `b.c`.

use itertools::Itertools;

use crate::domain::entities::Tree;
use crate::domain::error::{DomainError, DomainResult};

/// Find the value addressed by a dotted `subkey`; `None` addresses the root.
pub fn subkey_search<'a>(tree: &'a Tree, subkey: Option<&str>) -> DomainResult<&'a Tree> {
    let Some(subkey) = subkey else {
        return Ok(tree);
    };

    let mut current = tree;
    let mut remaining: Vec<&str> = subkey.split('.').collect();
    let mut consumed: Vec<&str> = Vec::new();

    while !remaining.is_empty() {
        let mapping = current
            .as_mapping()
            .ok_or_else(|| DomainError::NotAMapping(consumed.iter().join(".")))?;

        // longest dotted prefix wins
        let found = (1..=remaining.len()).rev().find_map(|take| {
            let key = remaining[..take].iter().join(".");
            mapping.get(&key).map(|value| (take, value))
        });

        match found {
            Some((take, value)) => {
                current = value;
                consumed.extend(remaining.drain(..take));
            }
            None => return Err(DomainError::KeyNotFound(subkey.to_string())),
        }
    }
    Ok(current)
}

/// Like [`subkey_search`], but absent keys yield `None` instead of an error.
pub fn subkey_get<'a>(tree: &'a Tree, subkey: Option<&str>) -> Option<&'a Tree> {
    subkey_search(tree, subkey).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Mapping;

    fn mapping(entries: Vec<(&str, Tree)>) -> Tree {
        Tree::Mapping(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect::<Mapping>())
    }

    fn sample() -> Tree {
        mapping(vec![
            ("a", mapping(vec![("b", mapping(vec![("c", Tree::from(1))]))])),
            ("x.y", mapping(vec![("z", Tree::from(2))])),
            ("p.q.r", Tree::from(3)),
            ("s", Tree::from("leaf")),
        ])
    }

    #[test]
    fn given_no_subkey_when_searching_then_root() {
        let tree = sample();
        assert_eq!(subkey_search(&tree, None).unwrap(), &tree);
    }

    #[test]
    fn given_plain_path_when_searching_then_descends() {
        let tree = sample();
        assert_eq!(subkey_search(&tree, Some("a.b.c")).unwrap(), &Tree::from(1));
    }

    #[test]
    fn given_dotted_key_when_searching_then_prefers_literal_key() {
        let tree = sample();
        assert_eq!(subkey_search(&tree, Some("x.y.z")).unwrap(), &Tree::from(2));
        assert_eq!(subkey_search(&tree, Some("p.q.r")).unwrap(), &Tree::from(3));
    }

    #[test]
    fn given_missing_key_when_searching_then_key_not_found() {
        let tree = sample();
        let err = subkey_search(&tree, Some("a.nope")).unwrap_err();
        assert_eq!(err, DomainError::KeyNotFound("a.nope".into()));
        assert!(subkey_get(&tree, Some("a.nope")).is_none());
    }

    #[test]
    fn given_path_through_scalar_when_searching_then_not_a_mapping() {
        let tree = sample();
        let err = subkey_search(&tree, Some("s.t")).unwrap_err();
        assert_eq!(err, DomainError::NotAMapping("s".into()));
    }
}
