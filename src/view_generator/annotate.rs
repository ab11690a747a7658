//! Path annotation: assign every scalar field its owning lineage path.
//!
//! The walk is a pure recursion that returns a fresh vector per call; no
//! accumulator is shared between invocations. Depth-first source order is
//! preserved, which later fixes both field order within a group and group
//! order overall.

use crate::schema::{Field, FieldMode, FieldType};

use super::errors::ViewGeneratorError;
use super::path::{LineagePath, PathSegment};

/// A scalar field tagged with the lineage path of its nearest record ancestor
/// chain (the root path when it has none).
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedField {
    pub field: Field,
    pub path: LineagePath,
}

/// Walk `fields` under `path`, descending into records and keeping scalars
/// (repeated or not) in the current group. The primary key is filtered out at
/// every level; it is re-threaded into every SELECT at compile time.
pub fn annotate(
    fields: &[Field],
    path: &LineagePath,
    primary_key: &str,
) -> Result<Vec<AnnotatedField>, ViewGeneratorError> {
    let mut annotated = Vec::new();
    for field in fields {
        if field.name == primary_key {
            continue;
        }
        match field.field_type {
            FieldType::Unknown => {
                return Err(ViewGeneratorError::unsupported_shape(
                    format!("{}.{}", path, field.name),
                    "unrecognized field type",
                ));
            }
            FieldType::Record => {
                if field.fields.is_empty() {
                    return Err(ViewGeneratorError::unsupported_shape(
                        format!("{}.{}", path, field.name),
                        "record field with no children",
                    ));
                }
                let segment = if field.mode == FieldMode::Repeated {
                    PathSegment::RepeatedRecord(field.name.clone())
                } else {
                    PathSegment::NullableRecord(field.name.clone())
                };
                let child_path = path.child(segment);
                annotated.extend(annotate(&field.fields, &child_path, primary_key)?);
            }
            _ => {
                annotated.push(AnnotatedField {
                    field: field.clone(),
                    path: path.clone(),
                });
            }
        }
    }
    Ok(annotated)
}
