//! Simulation script format.

use serde::{Deserialize, Serialize};

use crate::error::LinkError;
use crate::link::{OperationContext, Variables};

/// A scripted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// Initial gate state; falls back to the configured default.
    #[serde(default)]
    pub start_open: Option<bool>,
    /// Steps, run in order.
    pub steps: Vec<Step>,
}

/// One scripted action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Close the gate.
    Close,
    /// Open the gate. Without a client the open is refused.
    Open {
        #[serde(default = "default_true")]
        with_client: bool,
    },
    /// Create a request task labelled `id`, starting it unless `start` is false.
    Request {
        id: String,
        document: String,
        #[serde(default)]
        variables: Variables,
        #[serde(default)]
        context: OperationContext,
        #[serde(default = "default_true")]
        start: bool,
    },
    /// Start a previously created task.
    Start { id: String },
    /// Cancel a task.
    Cancel { id: String },
    /// Deliver results to every in-flight observer.
    Flush,
}

const fn default_true() -> bool {
    true
}

impl Step {
    /// Short name of the action.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Open { .. } => "open",
            Self::Request { .. } => "request",
            Self::Start { .. } => "start",
            Self::Cancel { .. } => "cancel",
            Self::Flush => "flush",
        }
    }
}

impl Script {
    /// Parse a script from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML does not describe a script.
    pub fn from_yaml(yaml: &str) -> Result<Self, LinkError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> Result<Self, LinkError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }
}
