//! The storage-safe projection of the queue.
//!
//! A snapshot keeps only each entry's document and variables; forwarders and
//! observers never leave memory. The snapshot is derived from the queue on
//! every mutation and is never read back by the link.

use serde::{Deserialize, Serialize};

use super::document::Document;
use super::operation::Variables;
use super::queue::OperationQueue;
use crate::error::LinkError;

/// The document of a persisted entry, keyed by whether it mutates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistedDocument {
    Mutation(Document),
    Query(Document),
}

impl PersistedDocument {
    /// Classify a document: any mutation definition makes it a mutation.
    #[must_use]
    pub fn classify(document: &Document) -> Self {
        if document.contains_mutation() {
            Self::Mutation(document.clone())
        } else {
            Self::Query(document.clone())
        }
    }

    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(self, Self::Mutation(_))
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        match self {
            Self::Mutation(document) | Self::Query(document) => document,
        }
    }
}

/// One element of the persisted array:
/// `{"mutation": "...", "variables": {...}}` or `{"query": "...", "variables": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEntry {
    #[serde(flatten)]
    pub document: PersistedDocument,
    #[serde(default)]
    pub variables: Variables,
}

/// Ordered projection of the queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: Vec<PersistedEntry>,
}

impl Snapshot {
    /// Project every queued entry, in FIFO order.
    #[must_use]
    pub fn project(queue: &OperationQueue) -> Self {
        let entries = queue
            .iter()
            .map(|(_, entry)| PersistedEntry {
                document: PersistedDocument::classify(entry.operation().document()),
                variables: entry.operation().variables().clone(),
            })
            .collect();

        Self { entries }
    }

    /// Serialize to the JSON text written to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable value cannot be serialized.
    pub fn to_json(&self) -> Result<String, LinkError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse persisted JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self, LinkError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn entries(&self) -> &[PersistedEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of mutation entries.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.document.is_mutation())
            .count()
    }

    /// Number of query entries.
    #[must_use]
    pub fn queries(&self) -> usize {
        self.len() - self.mutations()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::link::{Operation, QueueEntry, RecordingForwarder, RecordingObserver};

    fn push(queue: &mut OperationQueue, source: &str, variables: serde_json::Value) {
        let operation = Operation::new(Document::parse(source).unwrap())
            .with_variables(variables.as_object().cloned().unwrap_or_default());
        queue.push(QueueEntry::new(
            operation,
            Rc::new(RecordingForwarder::new()),
            Box::new(RecordingObserver::new()),
        ));
    }

    #[test]
    fn test_projection_format() {
        let mut queue = OperationQueue::new();
        push(&mut queue, "mutation Add($t: String) { add(t: $t) }", json!({"t": "milk"}));
        push(&mut queue, "query { todos { id } }", json!({}));

        let json: serde_json::Value =
            serde_json::from_str(&Snapshot::project(&queue).to_json().unwrap()).unwrap();

        assert_eq!(
            json,
            json!([
                {"mutation": "mutation Add($t: String) { add(t: $t) }", "variables": {"t": "milk"}},
                {"query": "query { todos { id } }", "variables": {}}
            ])
        );
    }

    #[test]
    fn test_fragment_plus_mutation_is_mutation() {
        let mut queue = OperationQueue::new();
        push(
            &mut queue,
            "fragment F on T { id } mutation { m { ...F } }",
            json!({}),
        );

        let snapshot = Snapshot::project(&queue);
        assert_eq!(snapshot.mutations(), 1);
        assert_eq!(snapshot.queries(), 0);
    }

    #[test]
    fn test_empty_queue_projects_empty_array() {
        let snapshot = Snapshot::project(&OperationQueue::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.to_json().unwrap(), "[]");
    }

    #[test]
    fn test_read_back() {
        let text = r#"[{"query":"{ a }","variables":{"x":1}},{"mutation":"mutation { b }"}]"#;
        let snapshot = Snapshot::from_json(text).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.entries()[0].variables.get("x"), Some(&json!(1)));
        assert!(snapshot.entries()[1].document.is_mutation());
        assert!(snapshot.entries()[1].variables.is_empty());
    }

    #[test]
    fn test_read_back_rejects_garbage() {
        assert!(Snapshot::from_json(r#"[{"variables":{}}]"#).is_err());
        assert!(Snapshot::from_json("not json").is_err());
    }
}
