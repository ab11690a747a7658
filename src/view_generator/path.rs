//! Structured lineage paths.
//!
//! A lineage path is the ordered chain of record ancestors from the root table
//! down to one nesting level. It is the grouping key for generated views, and
//! every derived name (view name, column alias prefix, unnest chain) is
//! computed from its segments directly. No marker strings, no pattern
//! stripping.

use std::fmt;

/// Prefix carried by every generated view name; cleanup uses it to find them.
pub const VIEW_PREFIX: &str = "vw_";

/// One ancestor in a lineage path.
///
/// Nullable records never multiply rows (plain struct dot-access); repeated
/// records always introduce one UNNEST stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Root(String),
    NullableRecord(String),
    RepeatedRecord(String),
}

impl PathSegment {
    pub fn name(&self) -> &str {
        match self {
            PathSegment::Root(name)
            | PathSegment::NullableRecord(name)
            | PathSegment::RepeatedRecord(name) => name,
        }
    }

    pub fn is_nullable_record(&self) -> bool {
        matches!(self, PathSegment::NullableRecord(_))
    }
}

/// Ordered segment chain identifying one generated group/view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineagePath(Vec<PathSegment>);

impl LineagePath {
    /// Path of the root table itself.
    pub fn root(table: impl Into<String>) -> Self {
        LineagePath(vec![PathSegment::Root(table.into())])
    }

    /// Extend with one more segment, returning a fresh path.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        LineagePath(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Whether the innermost segment is a nullable record. Such groups keep
    /// their own column namespace but share the FROM chain of their nearest
    /// physical ancestor.
    pub fn terminal_is_nullable(&self) -> bool {
        self.0.last().is_some_and(PathSegment::is_nullable_record)
    }

    /// The ancestors that actually appear in the FROM chain: the root plus
    /// every repeated record, in order. Nullable records are reachable by dot
    /// access and are discarded here.
    pub fn physical(&self) -> Vec<&PathSegment> {
        self.0
            .iter()
            .filter(|s| !s.is_nullable_record())
            .collect()
    }

    pub fn physical_depth(&self) -> usize {
        self.physical().len()
    }

    /// Dotted struct-access path through the nullable-record segments, used to
    /// qualify members of a nullable group (e.g. `a.address.geo`).
    pub fn nullable_subpath(&self) -> String {
        self.0
            .iter()
            .filter(|s| s.is_nullable_record())
            .map(PathSegment::name)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Derived view name: the marker prefix plus every segment name (root
    /// included) joined by underscores.
    pub fn view_name(&self) -> String {
        let names: Vec<&str> = self.0.iter().map(PathSegment::name).collect();
        format!("{}{}", VIEW_PREFIX, names.join("_"))
    }

    /// Column alias prefix: segment names minus the root, joined by
    /// underscores. Empty for the root group, whose columns keep bare names.
    pub fn column_prefix(&self) -> String {
        self.0
            .iter()
            .skip(1)
            .map(PathSegment::name)
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for LineagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|s| match s {
                PathSegment::Root(name) | PathSegment::NullableRecord(name) => name.clone(),
                PathSegment::RepeatedRecord(name) => format!("{}[]", name),
            })
            .collect();
        write!(f, "{}", rendered.join("."))
    }
}
