//! Pure compiler from a nested table schema to one flat SQL view per lineage.
//!
//! Pipeline: `annotate` walks the field tree and tags every scalar field with
//! its owning lineage path; `collect_groups` buckets the annotated fields per
//! path (rejecting derived-name collisions); `sql` renders one SELECT/FROM
//! statement per group. The whole pipeline is deterministic and performs no
//! I/O, so identical input always yields byte-identical SQL.

mod annotate;
mod errors;
mod group;
mod keywords;
mod path;
mod sql;

pub use annotate::{annotate, AnnotatedField};
pub use errors::ViewGeneratorError;
pub use group::{collect_groups, Group};
pub use keywords::ReservedWords;
pub use path::{LineagePath, PathSegment, VIEW_PREFIX};
pub use sql::{sql_from, sql_select, CompiledView};

use crate::schema::{Field, TableRef};

/// Compile a table schema into an ordered list of view definitions, one per
/// nesting lineage, the root group always first.
pub fn compile(
    fields: &[Field],
    table: &TableRef,
    primary_key: &str,
    keywords: &ReservedWords,
) -> Result<Vec<CompiledView>, ViewGeneratorError> {
    let root = LineagePath::root(&table.table);
    let annotated = annotate(fields, &root, primary_key)?;
    let groups = collect_groups(annotated, &root)?;
    let mut views = Vec::with_capacity(groups.len());
    for group in &groups {
        let select = sql_select(group, primary_key, keywords)?;
        let from = sql_from(group, table)?;
        views.push(CompiledView {
            view_name: group.path.view_name(),
            sql: format!("{} {}", select, from),
            path: group.path.clone(),
        });
    }
    Ok(views)
}
