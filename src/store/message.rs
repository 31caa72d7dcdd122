use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of trace line an agent emitted.
///
/// `Decision` marks a point that needs human input and is terminal for
/// that task's stream until resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Plan,
    Activity,
    Result,
    Decision,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MessageKind::Plan => "plan",
            MessageKind::Activity => "activity",
            MessageKind::Result => "result",
            MessageKind::Decision => "decision",
        };
        f.write_str(s)
    }
}

/// One line of a simulated agent execution trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: String,
    pub kind: MessageKind,
    pub content: String,
    pub at: DateTime<Utc>,
    pub agent: String,
    pub task_id: String,
}

impl AgentMessage {
    pub fn new(
        id: impl Into<String>,
        kind: MessageKind,
        content: impl Into<String>,
        at: DateTime<Utc>,
        agent: impl Into<String>,
        task_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            at,
            agent: agent.into(),
            task_id: task_id.into(),
        }
    }

    pub fn needs_input(&self) -> bool {
        self.kind == MessageKind::Decision
    }
}
