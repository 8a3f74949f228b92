//! In-memory document store.
//!
//! Holds every collection behind one `RwLock`. A batch is applied to staged
//! copies of the documents it touches and only written back once every write
//! in it has succeeded.

use std::collections::{BTreeMap, HashMap};

use anyhow::bail;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::domain::ports::DocumentStore;
use crate::domain::store::{
    Document, FieldOp, FieldPath, Filter, StoredDocument, Write, WriteBatch,
};

type Collections = HashMap<String, BTreeMap<String, Document>>;

#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a document outright. Used to seed fixtures.
    pub fn insert(&self, collection: &str, id: &str, doc: Document) {
        self.collections
            .write()
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), doc);
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find(&self, collection: &str, filter: &Filter) -> anyhow::Result<Vec<StoredDocument>> {
        let collections = self.collections.read();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(_, doc)| filter.matches(doc))
            .map(|(id, doc)| StoredDocument {
                id: id.clone(),
                data: doc.clone(),
            })
            .collect())
    }

    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, fields: Document) -> anyhow::Result<()> {
        let mut collections = self.collections.write();
        let doc = collections
            .entry(collection.to_owned())
            .or_default()
            .entry(id.to_owned())
            .or_default();
        merge(doc, fields);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, ops: Vec<FieldOp>) -> anyhow::Result<()> {
        let mut collections = self.collections.write();
        let Some(current) = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
        else {
            bail!("{collection}/{id} does not exist");
        };
        let mut next = current.clone();
        apply_ops(&mut next, ops)?;
        *current = next;
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()> {
        let mut collections = self.collections.write();
        let mut staged: BTreeMap<(String, String), Document> = BTreeMap::new();

        for write in batch.into_writes() {
            match write {
                Write::Set {
                    collection,
                    id,
                    fields,
                } => {
                    let key = (collection, id);
                    let mut doc = take_staged(&mut staged, &collections, &key).unwrap_or_default();
                    merge(&mut doc, fields);
                    staged.insert(key, doc);
                }
                Write::Update {
                    collection,
                    id,
                    ops,
                } => {
                    let key = (collection, id);
                    let Some(mut doc) = take_staged(&mut staged, &collections, &key) else {
                        bail!("{}/{} does not exist", key.0, key.1);
                    };
                    apply_ops(&mut doc, ops)?;
                    staged.insert(key, doc);
                }
            }
        }

        for ((collection, id), doc) in staged {
            collections.entry(collection).or_default().insert(id, doc);
        }
        Ok(())
    }
}

fn take_staged(
    staged: &mut BTreeMap<(String, String), Document>,
    collections: &Collections,
    key: &(String, String),
) -> Option<Document> {
    staged.remove(key).or_else(|| {
        collections
            .get(&key.0)
            .and_then(|docs| docs.get(&key.1))
            .cloned()
    })
}

/// Deep merge: nested maps are merged, everything else is replaced.
fn merge(target: &mut Document, fields: Document) {
    for (key, value) in fields {
        match value {
            Value::Object(incoming) => {
                if let Some(Value::Object(existing)) = target.get_mut(&key) {
                    merge(existing, incoming);
                } else {
                    target.insert(key, Value::Object(incoming));
                }
            }
            value => {
                target.insert(key, value);
            }
        }
    }
}

fn apply_ops(doc: &mut Document, ops: Vec<FieldOp>) -> anyhow::Result<()> {
    for op in ops {
        apply_op(doc, op)?;
    }
    Ok(())
}

fn apply_op(doc: &mut Document, op: FieldOp) -> anyhow::Result<()> {
    match op {
        FieldOp::Set(path, value) => {
            if let Some((parent, key)) = slot(doc, &path, true)? {
                parent.insert(key, value);
            }
        }
        FieldOp::Delete(path) => {
            if let Some((parent, key)) = slot(doc, &path, false)? {
                parent.remove(&key);
            }
        }
        FieldOp::ArrayUnion(path, values) => {
            if let Some((parent, key)) = slot(doc, &path, true)? {
                let entry = parent.entry(key).or_insert_with(|| Value::Array(Vec::new()));
                let Value::Array(items) = entry else {
                    bail!("field {path} is not an array");
                };
                for value in values {
                    if !items.contains(&value) {
                        items.push(value);
                    }
                }
            }
        }
        FieldOp::ArrayRemove(path, values) => {
            if let Some((parent, key)) = slot(doc, &path, false)? {
                match parent.get_mut(&key) {
                    Some(Value::Array(items)) => items.retain(|item| !values.contains(item)),
                    Some(_) => bail!("field {path} is not an array"),
                    None => {}
                }
            }
        }
    }
    Ok(())
}

/// The map holding the last path segment, and that segment.
///
/// With `create`, missing intermediate maps are inserted; without it a
/// missing intermediate yields `None`.
fn slot<'d>(
    doc: &'d mut Document,
    path: &FieldPath,
    create: bool,
) -> anyhow::Result<Option<(&'d mut Document, String)>> {
    let Some((last, parents)) = path.segments().split_last() else {
        bail!("empty field path");
    };

    let mut current = doc;
    for segment in parents {
        if create && !current.contains_key(segment) {
            current.insert(segment.clone(), Value::Object(Map::new()));
        }
        match current.get_mut(segment) {
            Some(Value::Object(next)) => current = next,
            Some(_) => bail!("field {segment} in {path} is not a map"),
            None => return Ok(None),
        }
    }
    Ok(Some((current, last.clone())))
}
