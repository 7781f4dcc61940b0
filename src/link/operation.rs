//! Operations flowing through the link.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::Document;

/// Variables attached to an operation.
pub type Variables = Map<String, Value>;

/// Variable name whose presence keeps an operation out of the queue.
const SENSITIVE_VARIABLE: &str = "password";

/// Per-call routing hints read by the offline queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationContext {
    /// Forward immediately even while the gate is closed.
    pub skip_queue: bool,
    /// Cancel the named entry without registering this one under the name.
    pub cancel_queue: bool,
    /// Named queue slot used to deduplicate or cancel pending operations.
    pub offline_queue_name: Option<String>,
}

impl OperationContext {
    /// The queue name, treating an empty string as absent.
    #[must_use]
    pub fn queue_name(&self) -> Option<&str> {
        self.offline_queue_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}

/// A request: document, variables, and the context it was issued with.
///
/// Operations are immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    document: Document,
    variables: Variables,
    context: OperationContext,
}

impl Operation {
    /// Create an operation with no variables and a default context.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            variables: Variables::new(),
            context: OperationContext::default(),
        }
    }

    /// Attach variables.
    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    /// Attach a per-call context.
    #[must_use]
    pub fn with_context(mut self, context: OperationContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub const fn variables(&self) -> &Variables {
        &self.variables
    }

    #[must_use]
    pub const fn context(&self) -> &OperationContext {
        &self.context
    }

    /// Operation name taken from the document, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.document.operation_name()
    }

    /// Whether the variables carry a credential that must never be persisted.
    #[must_use]
    pub fn has_sensitive_variables(&self) -> bool {
        self.variables.contains_key(SENSITIVE_VARIABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn login() -> Operation {
        Operation::new(Document::parse("mutation Login($user: String!) { login(user: $user) }").unwrap())
    }

    fn vars(value: Value) -> Variables {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_sensitive_variables() {
        assert!(!login().has_sensitive_variables());
        assert!(login()
            .with_variables(vars(json!({"user": "a", "password": "hunter2"})))
            .has_sensitive_variables());
        assert!(login()
            .with_variables(vars(json!({"password": ""})))
            .has_sensitive_variables());
        assert!(login()
            .with_variables(vars(json!({"password": null})))
            .has_sensitive_variables());
    }

    #[test]
    fn test_context_deserializes_camel_case() {
        let ctx: OperationContext =
            serde_json::from_value(json!({"skipQueue": true, "offlineQueueName": "draft"})).unwrap();

        assert!(ctx.skip_queue);
        assert!(!ctx.cancel_queue);
        assert_eq!(ctx.queue_name(), Some("draft"));
    }

    #[test]
    fn test_empty_queue_name_is_absent() {
        let ctx = OperationContext {
            offline_queue_name: Some(String::new()),
            ..OperationContext::default()
        };
        assert_eq!(ctx.queue_name(), None);
    }

    #[test]
    fn test_name_from_document() {
        assert_eq!(login().name(), Some("Login"));
    }
}
