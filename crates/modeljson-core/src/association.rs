//! Pre-resolved associations attached to a record.
//!
//! The persistence layer decides which related rows belong to a record and
//! attaches them here before serialization. Associations own their records, so
//! an association graph is always a finite tree.

use crate::record::Record;

/// The type of relationship between two models, as declared by the mapping
/// layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationshipKind {
    /// One-to-one: `User` has one `Profile`.
    OneToOne,
    /// Many-to-one: many `Book`s belong to one `Library`.
    #[default]
    ManyToOne,
    /// One-to-many: one `User` has many `Address`es.
    OneToMany,
    /// Many-to-many: `Article`s have many `Tag`s via a link table.
    ManyToMany,
}

/// Direction of an association relative to the record that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    /// Records this record owns (has-many, has-one, many-to-many).
    Children,
    /// Records this record belongs to.
    Parents,
}

impl AssociationKind {
    /// The JSON key this direction renders under.
    pub const fn key(self) -> &'static str {
        match self {
            AssociationKind::Children => "children",
            AssociationKind::Parents => "parents",
        }
    }
}

impl From<RelationshipKind> for AssociationKind {
    fn from(kind: RelationshipKind) -> Self {
        match kind {
            RelationshipKind::ManyToOne => AssociationKind::Parents,
            RelationshipKind::OneToOne
            | RelationshipKind::OneToMany
            | RelationshipKind::ManyToMany => AssociationKind::Children,
        }
    }
}

/// A named, ordered set of related records.
///
/// An empty association is meaningful: it records that the relationship was
/// requested but matched nothing, and renders as `[]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    name: String,
    kind: AssociationKind,
    records: Vec<Record>,
}

impl Association {
    /// Create an empty association.
    pub fn new(name: impl Into<String>, kind: AssociationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            records: Vec::new(),
        }
    }

    /// Create an association holding `records`, in the given order.
    pub fn with_records(
        name: impl Into<String>,
        kind: AssociationKind,
        records: impl IntoIterator<Item = Record>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            records: records.into_iter().collect(),
        }
    }

    /// The association name, used as the JSON key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether these are children or parents of the owning record.
    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    /// The related records, in attachment order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate over the related records.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of related records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing matched the association.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a related record.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub(crate) fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }
}

impl<'a> IntoIterator for &'a Association {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_kinds_map_to_directions() {
        assert_eq!(
            AssociationKind::from(RelationshipKind::ManyToOne),
            AssociationKind::Parents
        );
        for kind in [
            RelationshipKind::OneToOne,
            RelationshipKind::OneToMany,
            RelationshipKind::ManyToMany,
        ] {
            assert_eq!(AssociationKind::from(kind), AssociationKind::Children);
        }
    }

    #[test]
    fn keys() {
        assert_eq!(AssociationKind::Children.key(), "children");
        assert_eq!(AssociationKind::Parents.key(), "parents");
    }

    #[test]
    fn empty_association_keeps_name() {
        let mut assoc = Association::new("tags", AssociationKind::Children);
        assert!(assoc.is_empty());
        assert_eq!(assoc.name(), "tags");

        assoc.push(Record::new().with("content", "orm"));
        assert_eq!(assoc.len(), 1);
        assert_eq!(assoc.iter().count(), 1);
    }
}
