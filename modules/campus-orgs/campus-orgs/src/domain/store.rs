//! Document store vocabulary: field paths, field operations, filters and batches.
//!
//! Documents are JSON objects keyed by string id inside named collections.

use serde_json::{Map, Value};

/// A stored document body.
pub type Document = Map<String, Value>;

/// A document together with its id, as returned by `find`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Document,
}

/// Path to a (possibly nested) field.
///
/// Segments are kept separate so keys containing dots, such as
/// organization names, address a single level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// A single top-level field.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Look the path up inside a document.
    #[must_use]
    pub fn lookup<'a>(&self, doc: &'a Document) -> Option<&'a Value> {
        let (first, rest) = self.0.split_first()?;
        let mut current = doc.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// A single field mutation inside an update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Replace the value at the path, creating intermediate objects.
    Set(FieldPath, Value),
    /// Remove the field if present.
    Delete(FieldPath),
    /// Append each value not already present in the array.
    ArrayUnion(FieldPath, Vec<Value>),
    /// Remove every element equal to one of the values.
    ArrayRemove(FieldPath, Vec<Value>),
}

impl FieldOp {
    #[must_use]
    pub fn set(path: FieldPath, value: impl Into<Value>) -> Self {
        Self::Set(path, value.into())
    }

    #[must_use]
    pub fn union(field: &str, value: impl Into<Value>) -> Self {
        Self::ArrayUnion(FieldPath::field(field), vec![value.into()])
    }

    #[must_use]
    pub fn remove(field: &str, value: impl Into<Value>) -> Self {
        Self::ArrayRemove(FieldPath::field(field), vec![value.into()])
    }

    #[must_use]
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Set(path, _)
            | Self::Delete(path)
            | Self::ArrayUnion(path, _)
            | Self::ArrayRemove(path, _) => path,
        }
    }
}

/// Conjunction of equality clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(FieldPath, Value)>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn where_eq(mut self, path: FieldPath, value: impl Into<Value>) -> Self {
        self.clauses.push((path, value.into()));
        self
    }

    #[must_use]
    pub fn clauses(&self) -> &[(FieldPath, Value)] {
        &self.clauses
    }

    /// Whether every clause holds for the document. An empty filter matches all.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(path, expected)| path.lookup(doc) == Some(expected))
    }
}

/// One write inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Merge fields into the document, creating it if missing.
    Set {
        collection: String,
        id: String,
        fields: Document,
    },
    /// Apply field operations to an existing document.
    Update {
        collection: String,
        id: String,
        ops: Vec<FieldOp>,
    },
}

/// Writes committed together: either all apply or none do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collection: &str, id: &str, fields: Document) -> &mut Self {
        self.writes.push(Write::Set {
            collection: collection.to_owned(),
            id: id.to_owned(),
            fields,
        });
        self
    }

    /// Queue an update. Empty op lists are dropped.
    pub fn update(&mut self, collection: &str, id: &str, ops: Vec<FieldOp>) -> &mut Self {
        if !ops.is_empty() {
            self.writes.push(Write::Update {
                collection: collection.to_owned(),
                id: id.to_owned(),
                ops,
            });
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    #[must_use]
    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    #[must_use]
    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn lookup_follows_nested_segments() {
        let d = doc(json!({"renewalRequests": {"Math.Soc": {"status": "pending"}}}));
        let path = FieldPath::new(["renewalRequests", "Math.Soc", "status"]);
        assert_eq!(path.lookup(&d), Some(&json!("pending")));
        assert_eq!(FieldPath::field("missing").lookup(&d), None);
    }

    #[test]
    fn filter_requires_every_clause() {
        let d = doc(json!({"date": "2025-04-25", "location": "Room A"}));
        let both = Filter::new()
            .where_eq(FieldPath::field("date"), "2025-04-25")
            .where_eq(FieldPath::field("location"), "Room A");
        let wrong = Filter::new().where_eq(FieldPath::field("location"), "Library");

        assert!(both.matches(&d));
        assert!(!wrong.matches(&d));
        assert!(Filter::new().matches(&d));
    }

    #[test]
    fn batch_skips_empty_updates() {
        let mut batch = WriteBatch::new();
        batch.update("users", "a@campus.edu", Vec::new());
        assert!(batch.is_empty());

        batch.update("users", "a@campus.edu", vec![FieldOp::union("orgs", "Chess")]);
        assert_eq!(batch.len(), 1);
    }
}
