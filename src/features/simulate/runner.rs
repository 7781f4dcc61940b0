//! Runs a [`Script`] through a real client.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use super::script::{Script, Step};
use crate::client::Client;
use crate::config::LinkOptions;
use crate::error::LinkError;
use crate::link::{
    Document, Forward, Operation, RecordingForwarder, RecordingObserver, RequestTask, Snapshot,
};

/// What one step did.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub action: &'static str,
    pub detail: String,
    pub queue_len: usize,
}

/// Final state of a scripted task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub id: String,
    pub state: String,
    pub notifications: usize,
}

/// Result of running a script.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub store_key: String,
    pub steps: Vec<StepOutcome>,
    /// Names of forwarded operations, in forwarding order.
    pub forwarded: Vec<String>,
    pub tasks: Vec<TaskReport>,
    /// What the link last projected for storage.
    pub persisted: Snapshot,
}

struct Tracked {
    task: RequestTask,
    observer: RecordingObserver,
}

/// Run `script` against a fresh client built from `options`.
///
/// # Errors
///
/// Returns an error for an invalid document, a step naming an unknown or
/// duplicate task, or a storage failure.
pub fn run_script(script: &Script, options: LinkOptions) -> Result<SimulationReport, LinkError> {
    let options = match script.start_open {
        Some(open) => options.with_open(open),
        None => options,
    };
    let store_key = options.store_key.clone();

    let forwarder = Rc::new(RecordingForwarder::new());
    let client = Client::new(options, Rc::clone(&forwarder) as Rc<dyn Forward>)?;
    let mut tasks: BTreeMap<String, Tracked> = BTreeMap::new();
    let mut steps = Vec::with_capacity(script.steps.len());

    for (index, step) in script.steps.iter().enumerate() {
        let detail = run_step(&client, &forwarder, &mut tasks, step)?;
        tracing::debug!(step = index + 1, action = step.action(), %detail, "simulation step");

        steps.push(StepOutcome {
            step: index + 1,
            action: step.action(),
            detail,
            queue_len: client.link().queue_len(),
        });
    }

    let forwarded = forwarder
        .forwarded()
        .iter()
        .map(|op| op.name().unwrap_or("<anonymous>").to_string())
        .collect();

    let tasks = tasks
        .into_iter()
        .map(|(id, tracked)| TaskReport {
            id,
            state: tracked.task.state().to_string(),
            notifications: tracked.observer.notifications().len(),
        })
        .collect();

    Ok(SimulationReport {
        store_key,
        steps,
        forwarded,
        tasks,
        persisted: client.link().snapshot(),
    })
}

fn run_step(
    client: &Client,
    forwarder: &RecordingForwarder,
    tasks: &mut BTreeMap<String, Tracked>,
    step: &Step,
) -> Result<String, LinkError> {
    match step {
        Step::Close => {
            client.go_offline();
            Ok("gate closed".to_string())
        },
        Step::Open { with_client } => {
            let summary = if *with_client {
                client.go_online()?
            } else {
                client.link().open(None)?
            };
            Ok(match summary {
                Some(summary) => format!("gate opened, replayed {}", summary.replayed),
                None => "open refused: no client".to_string(),
            })
        },
        Step::Request {
            id,
            document,
            variables,
            context,
            start,
        } => {
            if tasks.contains_key(id) {
                return Err(LinkError::Config(format!("task '{id}' already exists")));
            }

            let operation = Operation::new(Document::parse(document.as_str())?)
                .with_variables(variables.clone())
                .with_context(context.clone());
            let mut tracked = Tracked {
                task: client.execute(operation),
                observer: RecordingObserver::new(),
            };
            let route = if tracked.task.is_deferred() {
                "deferred"
            } else {
                "direct"
            };

            if *start {
                tracked.task.start(Box::new(tracked.observer.clone()))?;
            }
            let detail = format!("{id}: {route}, {}", tracked.task.state());
            tasks.insert(id.clone(), tracked);
            Ok(detail)
        },
        Step::Start { id } => {
            let tracked = lookup(tasks, id)?;
            tracked.task.start(Box::new(tracked.observer.clone()))?;
            Ok(format!("{id}: {}", tracked.task.state()))
        },
        Step::Cancel { id } => {
            let tracked = lookup(tasks, id)?;
            let changed = tracked.task.cancel()?;
            Ok(format!(
                "{id}: {}{}",
                tracked.task.state(),
                if changed { "" } else { " (unchanged)" }
            ))
        },
        Step::Flush => Ok(format!("delivered {} result(s)", forwarder.flush())),
    }
}

fn lookup<'a>(
    tasks: &'a mut BTreeMap<String, Tracked>,
    id: &str,
) -> Result<&'a mut Tracked, LinkError> {
    tasks
        .get_mut(id)
        .ok_or_else(|| LinkError::NotFound(format!("task '{id}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageProvider};

    fn options(storage: &Rc<MemoryStorage>) -> LinkOptions {
        LinkOptions::new().with_storage(Rc::clone(storage) as Rc<dyn StorageProvider>)
    }

    #[test]
    fn test_offline_session() {
        let script = Script::from_yaml(
            r#"
start_open: false
steps:
  - action: request
    id: first
    document: "mutation First { a }"
    context: { offlineQueueName: draft }
  - action: request
    id: second
    document: "mutation Second { a }"
    context: { offlineQueueName: draft }
  - action: request
    id: list
    document: "query List { todos { id } }"
  - action: open
  - action: flush
"#,
        )
        .unwrap();
        let storage = Rc::new(MemoryStorage::new());

        let report = run_script(&script, options(&storage)).unwrap();

        assert_eq!(report.forwarded, vec!["Second", "List"]);
        assert!(report.persisted.is_empty());
        assert_eq!(report.steps[2].queue_len, 2);
        assert_eq!(report.steps[3].detail, "gate opened, replayed 2");

        let first = report.tasks.iter().find(|t| t.id == "first").unwrap();
        assert_eq!(first.state, "cancelled");
        assert_eq!(first.notifications, 0);
        let second = report.tasks.iter().find(|t| t.id == "second").unwrap();
        assert_eq!(second.state, "forwarding");
        assert_eq!(second.notifications, 2);

        assert_eq!(
            storage.get_item(&report.store_key).unwrap(),
            Some("[]".to_string())
        );
    }

    #[test]
    fn test_refused_open_leaves_queue() {
        let script = Script::from_yaml(
            r#"
start_open: false
steps:
  - action: request
    id: a
    document: "mutation A { a }"
  - action: open
    with_client: false
"#,
        )
        .unwrap();

        let report = run_script(&script, options(&Rc::new(MemoryStorage::new()))).unwrap();

        assert_eq!(report.steps[1].detail, "open refused: no client");
        assert_eq!(report.persisted.len(), 1);
        assert!(report.forwarded.is_empty());
    }

    #[test]
    fn test_lazy_start_and_cancel() {
        let script = Script::from_yaml(
            r#"
start_open: false
steps:
  - action: request
    id: a
    document: "mutation A { a }"
    start: false
  - action: start
    id: a
  - action: cancel
    id: a
  - action: cancel
    id: a
"#,
        )
        .unwrap();

        let report = run_script(&script, options(&Rc::new(MemoryStorage::new()))).unwrap();

        assert_eq!(report.steps[0].queue_len, 0);
        assert_eq!(report.steps[1].queue_len, 1);
        assert_eq!(report.steps[2].detail, "a: cancelled");
        assert_eq!(report.steps[3].detail, "a: cancelled (unchanged)");
        assert!(report.persisted.is_empty());
    }

    #[test]
    fn test_unknown_task() {
        let script = Script::from_yaml("steps:\n  - action: cancel\n    id: ghost\n").unwrap();
        let err = run_script(&script, options(&Rc::new(MemoryStorage::new()))).unwrap_err();
        assert!(matches!(err, LinkError::NotFound(_)));
    }

    #[test]
    fn test_duplicate_task() {
        let script = Script::from_yaml(
            r#"
steps:
  - action: request
    id: a
    document: "{ a }"
  - action: request
    id: a
    document: "{ a }"
"#,
        )
        .unwrap();
        let err = run_script(&script, options(&Rc::new(MemoryStorage::new()))).unwrap_err();
        assert!(matches!(err, LinkError::Config(_)));
    }
}
