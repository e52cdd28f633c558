//! Topmost-match search over document trees

use std::convert::Infallible;

use crate::document::{self, DocumentNode, EvaluationError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("No element matches {0}")]
    RootNotFound(String),
}

/// Find the node closest to `root` that satisfies `predicate`
///
/// The predicate does not need to be monotonic: a node that does not match may
/// still have matching descendants. Every child is enumerated before a node
/// decides; a matching node wins over anything below it, otherwise the first
/// child result in document order is propagated.
pub fn find_topmost<'a, N, P>(root: &'a N, predicate: P) -> Option<&'a N>
where
    N: DocumentNode,
    P: Fn(&N) -> bool,
{
    match try_find_topmost(root, |node| Ok::<_, Infallible>(predicate(node))) {
        Ok(found) => found,
        Err(never) => match never {},
    }
}

/// [`find_topmost`] with a fallible predicate; the first error aborts the search
pub fn try_find_topmost<'a, N, P, E>(root: &'a N, predicate: P) -> Result<Option<&'a N>, E>
where
    N: DocumentNode,
    P: Fn(&N) -> Result<bool, E>,
{
    Ok(search(root, &predicate)?.0)
}

fn search<'a, N, P, E>(node: &'a N, predicate: &P) -> Result<(Option<&'a N>, bool), E>
where
    N: DocumentNode,
    P: Fn(&N) -> Result<bool, E>,
{
    let matches_self = predicate(node)?;

    let mut first_found = None;
    let mut any_below = false;
    for child in node.owned_elements() {
        let (found, has_match) = search(child, predicate)?;
        any_below |= has_match || found.is_some();
        if first_found.is_none() {
            first_found = found;
        }
    }

    if matches_self {
        return Ok((Some(node), true));
    }
    if first_found.is_some() {
        return Ok((first_found, any_below));
    }
    Ok((None, false))
}

// ============== Predicates ==============

/// Part usage typed by `definition`, optionally also named `usage_name`
pub fn is_part_defined_by<N: DocumentNode>(
    node: &N,
    definition: &str,
    usage_name: Option<&str>,
) -> bool {
    let Some(part) = node.as_part() else {
        return false;
    };
    part.is_defined_by(definition) && usage_name.is_none_or(|name| node.name() == Some(name))
}

/// Part usage whose subtree (itself included) holds a numeric `typeID`
///
/// A `typeID` that fails to evaluate is reported rather than treated as absent.
pub fn has_typed_descendant<N: DocumentNode>(node: &N) -> Result<bool, EvaluationError> {
    if node.as_part().is_none() {
        return Ok(false);
    }
    subtree_has_type_id(node)
}

fn subtree_has_type_id<N: DocumentNode>(node: &N) -> Result<bool, EvaluationError> {
    if document::has_numeric_type_id(node)? {
        return Ok(true);
    }
    for child in node.owned_elements() {
        if subtree_has_type_id(child)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn is_part_definition_named<N: DocumentNode>(node: &N, name: &str) -> bool {
    node.is_part_definition() && node.name() == Some(name)
}

// ============== Lookups ==============

/// Topmost part usage typed by `definition`
pub fn find_part_by_definition<'a, N: DocumentNode>(
    root: &'a N,
    definition: &str,
    usage_name: Option<&str>,
) -> Option<&'a N> {
    find_topmost(root, |node| is_part_defined_by(node, definition, usage_name))
}

/// Topmost part usage containing type-tagged components
pub fn find_part_with_components<N: DocumentNode>(
    root: &N,
) -> Result<Option<&N>, EvaluationError> {
    try_find_topmost(root, has_typed_descendant)
}

pub fn find_part_definition<'a, N: DocumentNode>(root: &'a N, name: &str) -> Option<&'a N> {
    find_topmost(root, |node| is_part_definition_named(node, name))
}

/// First part usage directly owned by `node`
pub fn first_owned_part<N: DocumentNode>(node: &N) -> Option<&N> {
    node.owned_elements().find(|child| child.as_part().is_some())
}

/// Turn a failed lookup into [`SearchError::RootNotFound`]
pub fn require<'a, N>(found: Option<&'a N>, what: &str) -> Result<&'a N, SearchError> {
    found.ok_or_else(|| SearchError::RootNotFound(what.to_string()))
}
