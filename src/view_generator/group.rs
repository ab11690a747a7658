//! Group collection: bucket annotated fields by lineage path and reject
//! derived-name collisions before any SQL is rendered.

use std::collections::HashMap;

use crate::schema::{Field, FieldMode};

use super::annotate::AnnotatedField;
use super::errors::ViewGeneratorError;
use super::path::LineagePath;

/// One generated view: a lineage path plus its member fields in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub path: LineagePath,
    pub fields: Vec<Field>,
}

impl Group {
    /// Output column alias for a member field: the bare field name at the
    /// root, `<prefix>_<name>` elsewhere, with `_count` appended for repeated
    /// scalars (they project as element counts).
    pub fn output_alias(&self, field: &Field) -> String {
        let base = if self.path.is_root() {
            field.name.clone()
        } else {
            format!("{}_{}", self.path.column_prefix(), field.name)
        };
        if field.mode == FieldMode::Repeated {
            format!("{}_count", base)
        } else {
            base
        }
    }
}

/// Bucket annotated fields into groups, first-encounter order after the root.
///
/// The root group is seeded unconditionally: every view threads the primary
/// key, so a root level holding nothing but the key and record fields still
/// yields a key-only root view.
///
/// Two distinct paths deriving the same view name, or two member fields of one
/// group deriving the same column alias, are a `NameCollision`; the compile
/// fails rather than silently merging.
pub fn collect_groups(
    annotated: Vec<AnnotatedField>,
    root: &LineagePath,
) -> Result<Vec<Group>, ViewGeneratorError> {
    let mut groups: Vec<Group> = vec![Group {
        path: root.clone(),
        fields: Vec::new(),
    }];
    for entry in annotated {
        match groups.iter_mut().find(|g| g.path == entry.path) {
            Some(group) => group.fields.push(entry.field),
            None => groups.push(Group {
                path: entry.path,
                fields: vec![entry.field],
            }),
        }
    }

    let mut view_names: HashMap<String, LineagePath> = HashMap::new();
    for group in &groups {
        let name = group.path.view_name();
        if let Some(previous) = view_names.get(&name) {
            return Err(ViewGeneratorError::NameCollision {
                identifier: name,
                first: previous.to_string(),
                second: group.path.to_string(),
            });
        }
        view_names.insert(name, group.path.clone());
    }

    for group in &groups {
        let mut aliases: HashMap<String, String> = HashMap::new();
        for field in &group.fields {
            let alias = group.output_alias(field);
            if let Some(previous) = aliases.insert(alias.clone(), field.name.clone()) {
                return Err(ViewGeneratorError::NameCollision {
                    identifier: alias,
                    first: format!("{}.{}", group.path, previous),
                    second: format!("{}.{}", group.path, field.name),
                });
            }
        }
    }

    Ok(groups)
}
