//! AQL creation source

use crate::spec::FileGroup;

/// Wrap the first non-empty `items.find` body as a full AQL query
///
/// Returns an empty string when no group carries a query.
pub fn aql_query_from_spec(groups: &[FileGroup]) -> String {
  groups
    .iter()
    .find(|group| !group.aql.items_find.is_empty())
    .map(|group| format!("items.find({})", group.aql.items_find))
    .unwrap_or_default()
}
