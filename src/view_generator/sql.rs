//! SELECT/FROM rendering per group.
//!
//! The FROM chain aliases the root table `a` and each UNNEST stage the next
//! letter in order. Every UNNEST expression after the first references only
//! the immediately preceding alias plus the local segment name, never the full
//! dotted lineage from the root.

use crate::schema::{FieldMode, TableRef};

use super::errors::ViewGeneratorError;
use super::group::Group;
use super::keywords::ReservedWords;
use super::path::LineagePath;

/// One compiled view definition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledView {
    pub path: LineagePath,
    pub view_name: String,
    pub sql: String,
}

/// Alias symbol for a physical chain position (`a`, `b`, `c`, ...).
fn alias_at(position: usize, path: &LineagePath) -> Result<String, ViewGeneratorError> {
    if position >= 26 {
        return Err(ViewGeneratorError::SchemaError(format!(
            "unnest chain at `{}` is deeper than 26 stages",
            path
        )));
    }
    Ok(((b'a' + position as u8) as char).to_string())
}

/// Render the FROM clause: base table plus one UNNEST stage per repeated
/// record in the group's physical ancestor chain.
pub fn sql_from(group: &Group, table: &TableRef) -> Result<String, ViewGeneratorError> {
    let physical = group.path.physical();
    let mut from_clause = format!("FROM `{}` AS a", table);
    let mut previous_alias = "a".to_string();
    for (position, segment) in physical.iter().enumerate().skip(1) {
        let alias = alias_at(position, &group.path)?;
        // The first stage unnests a root column by its bare name; deeper
        // stages reach through the previous stage's alias.
        let expr = if position == 1 {
            segment.name().to_string()
        } else {
            format!("{}.{}", previous_alias, segment.name())
        };
        from_clause.push_str(&format!(", UNNEST({}) AS {}", expr, alias));
        previous_alias = alias;
    }
    Ok(from_clause)
}

/// Render the SELECT clause: the unqualified primary key first, then every
/// member field qualified by the group's active alias.
pub fn sql_select(
    group: &Group,
    primary_key: &str,
    keywords: &ReservedWords,
) -> Result<String, ViewGeneratorError> {
    let physical_alias = alias_at(group.path.physical_depth() - 1, &group.path)?;
    // Members of a terminal-nullable group are reached by struct dot-access
    // from the nearest unnested ancestor.
    let active_alias = if group.path.terminal_is_nullable() {
        format!("{}.{}", physical_alias, group.path.nullable_subpath())
    } else {
        physical_alias
    };

    let mut select_clause = format!("SELECT {}", keywords.escape(primary_key));
    for field in &group.fields {
        let reference = format!("{}.{}", active_alias, keywords.escape(&field.name));
        let alias = keywords.escape(&group.output_alias(field));
        if field.mode == FieldMode::Repeated {
            // Repeated scalars project as cardinality only.
            select_clause.push_str(&format!(", ARRAY_LENGTH({}) AS {}", reference, alias));
        } else {
            select_clause.push_str(&format!(", {} AS {}", reference, alias));
        }
    }
    Ok(select_clause)
}
