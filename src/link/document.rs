//! Top-level classification of GraphQL documents.
//!
//! The offline queue only needs to know which kinds of definitions a document
//! carries, so this is a scanner rather than a parser: it finds each
//! top-level definition header and skips over its body without validating
//! selection sets.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::LinkError;

static DEFINITION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(query|mutation|subscription|fragment)\b\s*([_A-Za-z][_0-9A-Za-z]*)?")
        .unwrap_or_else(|e| panic!("Invalid definition regex: {e}"))
});

/// Kind of an executable operation definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "query" => Some(Self::Query),
            "mutation" => Some(Self::Mutation),
            "subscription" => Some(Self::Subscription),
            _ => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        };
        write!(f, "{s}")
    }
}

/// A top-level definition found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    /// An operation, possibly anonymous.
    Operation {
        kind: OperationKind,
        name: Option<String>,
    },
    /// A named fragment.
    Fragment { name: String },
}

/// A GraphQL document and its classified top-level definitions.
///
/// Serializes as its source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Document {
    source: String,
    definitions: Vec<Definition>,
}

impl Document {
    /// Scan `source` into a document.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Document` for an empty document, an unknown
    /// top-level token, a nameless fragment, or unbalanced braces.
    pub fn parse(source: impl Into<String>) -> Result<Self, LinkError> {
        let source = source.into();
        let bytes = source.as_bytes();
        let mut definitions = Vec::new();
        let mut pos = 0;

        loop {
            pos = skip_ignored(bytes, pos);
            if pos >= bytes.len() {
                break;
            }

            if bytes[pos] == b'{' {
                definitions.push(Definition::Operation {
                    kind: OperationKind::Query,
                    name: None,
                });
            } else if let Some(caps) = DEFINITION_HEADER.captures(&source[pos..]) {
                let name = caps.get(2).map(|m| m.as_str().to_string());
                let definition = match OperationKind::from_keyword(&caps[1]) {
                    Some(kind) => Definition::Operation { kind, name },
                    None => match name {
                        Some(name) if name != "on" => Definition::Fragment { name },
                        _ => {
                            return Err(LinkError::Document(format!(
                                "fragment without a name at offset {pos}"
                            )));
                        },
                    },
                };
                definitions.push(definition);
                pos += caps[0].len();
            } else {
                return Err(LinkError::Document(format!(
                    "unexpected token at offset {pos}"
                )));
            }

            pos = skip_body(bytes, pos)?;
        }

        if definitions.is_empty() {
            return Err(LinkError::Document("document has no definitions".to_string()));
        }

        Ok(Self {
            source,
            definitions,
        })
    }

    /// The document text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All top-level definitions in order.
    #[must_use]
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// Whether any definition is a mutation.
    #[must_use]
    pub fn contains_mutation(&self) -> bool {
        self.definitions.iter().any(|d| {
            matches!(
                d,
                Definition::Operation {
                    kind: OperationKind::Mutation,
                    ..
                }
            )
        })
    }

    /// Name of the first named operation definition.
    #[must_use]
    pub fn operation_name(&self) -> Option<&str> {
        self.definitions.iter().find_map(|d| match d {
            Definition::Operation { name, .. } => name.as_deref(),
            Definition::Fragment { .. } => None,
        })
    }
}

impl TryFrom<String> for Document {
    type Error = LinkError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(source)
    }
}

impl From<Document> for String {
    fn from(document: Document) -> Self {
        document.source
    }
}

/// Skip whitespace, commas, byte order marks, and `#` comments.
fn skip_ignored(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' | b'\t' | b'\n' | b'\r' | b',' => pos += 1,
            0xEF if bytes[pos..].starts_with(&[0xEF, 0xBB, 0xBF]) => pos += 3,
            b'#' => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            },
            _ => break,
        }
    }
    pos
}

/// Advance past the body of a definition: everything up to and including the
/// brace that closes its selection set.
///
/// Braces inside the header's parentheses belong to object literals in
/// variable defaults or directive arguments, not to the selection set.
fn skip_body(bytes: &[u8], mut pos: usize) -> Result<usize, LinkError> {
    let mut depth = 0usize;
    let mut parens = 0usize;
    let mut opened = false;

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' if bytes[pos..].starts_with(b"\"\"\"") => {
                pos = skip_block_string(bytes, pos + 3)?;
                continue;
            },
            b'"' => {
                pos = skip_string(bytes, pos + 1)?;
                continue;
            },
            b'#' => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
                continue;
            },
            b'(' if depth == 0 => parens += 1,
            b')' if depth == 0 => {
                if parens == 0 {
                    return Err(LinkError::Document(format!(
                        "unbalanced ')' at offset {pos}"
                    )));
                }
                parens -= 1;
            },
            b'{' | b'}' if depth == 0 && parens > 0 => {},
            b'{' => {
                depth += 1;
                opened = true;
            },
            b'}' => {
                if depth == 0 {
                    return Err(LinkError::Document(format!(
                        "unbalanced '}}' at offset {pos}"
                    )));
                }
                depth -= 1;
                if depth == 0 {
                    return Ok(pos + 1);
                }
            },
            _ => {},
        }
        pos += 1;
    }

    if opened {
        Err(LinkError::Document("unterminated selection set".to_string()))
    } else {
        Err(LinkError::Document("definition has no selection set".to_string()))
    }
}

fn skip_string(bytes: &[u8], mut pos: usize) -> Result<usize, LinkError> {
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'"' => return Ok(pos + 1),
            b'\n' => break,
            _ => pos += 1,
        }
    }
    Err(LinkError::Document("unterminated string".to_string()))
}

fn skip_block_string(bytes: &[u8], mut pos: usize) -> Result<usize, LinkError> {
    while pos < bytes.len() {
        if bytes[pos..].starts_with(b"\\\"\"\"") {
            pos += 4;
        } else if bytes[pos..].starts_with(b"\"\"\"") {
            return Ok(pos + 3);
        } else {
            pos += 1;
        }
    }
    Err(LinkError::Document("unterminated block string".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_mutation() {
        let doc = Document::parse("mutation AddTodo($title: String!) { addTodo(title: $title) { id } }")
            .unwrap();

        assert!(doc.contains_mutation());
        assert_eq!(doc.operation_name(), Some("AddTodo"));
        assert_eq!(doc.definitions().len(), 1);
    }

    #[test]
    fn test_anonymous_query_shorthand() {
        let doc = Document::parse("{ todos { id title } }").unwrap();

        assert!(!doc.contains_mutation());
        assert_eq!(doc.operation_name(), None);
        assert_eq!(
            doc.definitions()[0],
            Definition::Operation {
                kind: OperationKind::Query,
                name: None
            }
        );
    }

    #[test]
    fn test_mutation_with_fragment() {
        let source = r"
            # create and return the full item
            fragment TodoFields on Todo { id title }
            mutation { addTodo(title: $title) { ...TodoFields } }
        ";
        let doc = Document::parse(source).unwrap();

        assert_eq!(doc.definitions().len(), 2);
        assert_eq!(
            doc.definitions()[0],
            Definition::Fragment {
                name: "TodoFields".to_string()
            }
        );
        assert!(doc.contains_mutation());
    }

    #[test]
    fn test_object_literal_in_variable_default() {
        let doc = Document::parse(
            "mutation Save($input: In = {a: 1, b: {c: 2}}) { save(input: $input) { id } }",
        )
        .unwrap();

        assert!(doc.contains_mutation());
        assert_eq!(doc.operation_name(), Some("Save"));
        assert_eq!(doc.definitions().len(), 1);
    }

    #[test]
    fn test_object_literal_in_directive_argument() {
        let doc = Document::parse("mutation Save @client(opts: {x: 1}) { save } query Q { q }").unwrap();

        assert_eq!(doc.definitions().len(), 2);
        assert_eq!(doc.operation_name(), Some("Save"));
    }

    #[test]
    fn test_unbalanced_parenthesis_in_header() {
        assert!(Document::parse("query Q($a: Int)) { a }").is_err());
        assert!(Document::parse("query Q($a: Int { a }").is_err());
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let source = r#"query Search { search(term: "}{", note: """ { """) { id } } mutation M { m }"#;
        let doc = Document::parse(source).unwrap();

        assert_eq!(doc.definitions().len(), 2);
        assert!(doc.contains_mutation());
    }

    #[test]
    fn test_keyword_inside_selection_is_not_a_definition() {
        let doc = Document::parse("query { mutation { id } }").unwrap();
        assert!(!doc.contains_mutation());
    }

    #[test]
    fn test_subscription_is_not_mutation() {
        let doc = Document::parse("subscription OnTodo { todoAdded { id } }").unwrap();
        assert!(!doc.contains_mutation());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(Document::parse("   "), Err(LinkError::Document(_))));
        assert!(matches!(Document::parse("query { a "), Err(LinkError::Document(_))));
        assert!(matches!(Document::parse("}"), Err(LinkError::Document(_))));
        assert!(matches!(Document::parse("mutations { a }"), Err(LinkError::Document(_))));
        assert!(matches!(Document::parse("fragment on T { a }"), Err(LinkError::Document(_))));
        assert!(matches!(Document::parse("query Q"), Err(LinkError::Document(_))));
    }

    #[test]
    fn test_serializes_as_source() {
        let doc = Document::parse("mutation { ping }").unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, "\"mutation { ping }\"");

        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
