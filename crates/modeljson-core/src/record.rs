//! Records: the attribute bag handed to the serializer.

use std::collections::HashMap;

use crate::association::{Association, AssociationKind};
use crate::value::Value;

/// Association name used by [`Record::add_child`] and [`Record::add_parent`]
/// when the related record has no table name.
pub const UNNAMED_ASSOCIATION: &str = "records";

/// A single materialized record.
///
/// A record is an ordered attribute bag (names are kept verbatim, never case
/// folded), a list of pre-resolved associations and a list of injected
/// entries that are not backed by a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Table the record was read from; names associations built with
    /// `add_child`/`add_parent`.
    table: Option<String>,
    /// Attribute names in natural order
    names: Vec<String>,
    /// Attribute values, parallel to `names`
    values: Vec<Value>,
    /// Name -> index mapping for O(1) lookup
    name_to_index: HashMap<String, usize>,
    associations: Vec<Association>,
    injected: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record read from `table`.
    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    /// Build a record from `(name, value)` pairs, in order.
    ///
    /// A repeated name overwrites the earlier value but keeps its position.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.set(name, value);
        }
        record
    }

    /// The table this record came from, if known.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Set an attribute.
    ///
    /// Existing attributes keep their position; new ones are appended.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        if let Some(&index) = self.name_to_index.get(&name) {
            self.values[index] = value;
        } else {
            self.name_to_index.insert(name.clone(), self.names.len());
            self.names.push(name);
            self.values.push(value);
        }
        self
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.name_to_index.remove(name)?;
        self.names.remove(index);
        let value = self.values.remove(index);
        for slot in self.name_to_index.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Get an attribute by its exact name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.name_to_index.get(name).map(|&i| &self.values[i])
    }

    /// Get an attribute, comparing names ASCII case-insensitively.
    ///
    /// An exact match wins over a case-folded one.
    pub fn get_ignore_case(&self, name: &str) -> Option<&Value> {
        self.get(name).or_else(|| {
            self.names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(name))
                .map(|i| &self.values[i])
        })
    }

    /// Check if an attribute exists by its exact name.
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the record has no attributes.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get all attribute names in natural order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs in natural order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    /// All attached associations, in attachment order.
    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// Find an association by name.
    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.name() == name)
    }

    /// Attached child associations.
    pub fn children(&self) -> impl Iterator<Item = &Association> {
        self.associations_of(AssociationKind::Children)
    }

    /// Attached parent associations.
    pub fn parents(&self) -> impl Iterator<Item = &Association> {
        self.associations_of(AssociationKind::Parents)
    }

    /// Attached associations in one direction.
    pub fn associations_of(&self, kind: AssociationKind) -> impl Iterator<Item = &Association> {
        self.associations.iter().filter(move |a| a.kind() == kind)
    }

    /// Does the record carry any association in this direction?
    pub fn has_associations(&self, kind: AssociationKind) -> bool {
        self.associations_of(kind).next().is_some()
    }

    /// Append `records` to the named association, creating it if needed.
    ///
    /// If `name` is already attached the records are appended to it and `kind`
    /// is ignored.
    pub fn attach(
        &mut self,
        name: impl Into<String>,
        kind: AssociationKind,
        records: impl IntoIterator<Item = Record>,
    ) -> &mut Self {
        let name = name.into();
        if let Some(existing) = self.associations.iter_mut().find(|a| a.name() == name) {
            existing.extend(records);
        } else {
            self.associations
                .push(Association::with_records(name, kind, records));
        }
        self
    }

    /// Append owned (has-many) records under `name`.
    pub fn add_children(
        &mut self,
        name: impl Into<String>,
        records: impl IntoIterator<Item = Record>,
    ) -> &mut Self {
        self.attach(name, AssociationKind::Children, records)
    }

    /// Append belongs-to records under `name`.
    pub fn add_parents(
        &mut self,
        name: impl Into<String>,
        records: impl IntoIterator<Item = Record>,
    ) -> &mut Self {
        self.attach(name, AssociationKind::Parents, records)
    }

    /// Attach a child record under its table name.
    pub fn add_child(&mut self, record: Record) -> &mut Self {
        let name = record.table().unwrap_or(UNNAMED_ASSOCIATION).to_string();
        self.add_children(name, [record])
    }

    /// Attach a parent record under its table name.
    pub fn add_parent(&mut self, record: Record) -> &mut Self {
        let name = record.table().unwrap_or(UNNAMED_ASSOCIATION).to_string();
        self.add_parents(name, [record])
    }

    /// Record that a child association was requested, even if nothing matched.
    pub fn declare_children(&mut self, name: impl Into<String>) -> &mut Self {
        self.add_children(name, std::iter::empty())
    }

    /// Record that a parent association was requested, even if nothing matched.
    pub fn declare_parents(&mut self, name: impl Into<String>) -> &mut Self {
        self.add_parents(name, std::iter::empty())
    }

    /// Add an injected entry; an existing key is overwritten in place.
    pub fn inject(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.injected.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.injected.push((key, value));
        }
        self
    }

    /// Injected entries, in insertion order.
    pub fn injected(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.injected.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True when there is at least one injected entry.
    pub fn has_injected(&self) -> bool {
        !self.injected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Record {
        Record::for_table("people")
            .with("name", "John")
            .with("last_name", "Smith")
            .with("age", 42)
    }

    #[test]
    fn set_keeps_natural_order() {
        let mut p = person();
        p.set("name", "Joe");
        p.set("graduation_date", Value::Null);

        let names: Vec<&str> = p.attribute_names().collect();
        assert_eq!(names, ["name", "last_name", "age", "graduation_date"]);
        assert_eq!(p.get("name"), Some(&Value::from("Joe")));
    }

    #[test]
    fn lookup_is_case_sensitive_unless_asked() {
        let p = person();
        assert!(p.get("Name").is_none());
        assert_eq!(p.get_ignore_case("NAME"), Some(&Value::from("John")));
        assert_eq!(p.get_ignore_case("Last_Name"), Some(&Value::from("Smith")));
    }

    #[test]
    fn exact_match_beats_case_folded() {
        let r = Record::from_pairs([("Code", "upper"), ("code", "lower")]);
        assert_eq!(r.get_ignore_case("code"), Some(&Value::from("lower")));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn remove_reindexes() {
        let mut p = person();
        assert_eq!(p.remove("name"), Some(Value::from("John")));
        assert_eq!(p.get("age"), Some(&Value::Int(42)));
        assert_eq!(p.get("last_name"), Some(&Value::from("Smith")));
        assert!(p.remove("name").is_none());
    }

    #[test]
    fn add_child_groups_by_table() {
        let mut user = Record::for_table("users").with("first_name", "Marilyn");
        for street in ["Broadway", "Pine", "Elm"] {
            user.add_child(Record::for_table("addresses").with("address1", street));
        }
        user.add_parent(Record::new().with("id", 1));

        let addresses = user.association("addresses").unwrap();
        assert_eq!(addresses.kind(), AssociationKind::Children);
        assert_eq!(addresses.len(), 3);
        assert_eq!(user.parents().next().unwrap().name(), UNNAMED_ASSOCIATION);
    }

    #[test]
    fn declared_associations_are_empty() {
        let mut article = Record::for_table("articles");
        article.declare_children("comments");
        assert!(article.has_associations(AssociationKind::Children));
        assert!(!article.has_associations(AssociationKind::Parents));
        assert!(article.association("comments").unwrap().is_empty());
    }

    #[test]
    fn inject_overwrites_in_place() {
        let mut post = Record::for_table("posts");
        post.inject("secret_name", "Secret Name");
        post.inject("rank", 1);
        post.inject("secret_name", "Other");

        let injected: Vec<_> = post.injected().collect();
        assert_eq!(
            injected,
            [("secret_name", &Value::from("Other")), ("rank", &Value::Int(1))]
        );
    }
}
