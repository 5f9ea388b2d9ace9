use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Execution state of a workflow session as reported by the conductor.
///
/// `Success` and `Failed` are terminal; a record carrying either will not
/// change on subsequent queries. `Running` never reaches the poller's caller
/// (the conductor reports it as a still-running error on blocking gets), but
/// listings may surface it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Success,
    Failed,
    Running,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Success => write!(f, "success"),
            SessionStatus::Failed => write!(f, "failed"),
            SessionStatus::Running => write!(f, "running"),
        }
    }
}

/// One key/value annotation attached to a session by the conductor.
///
/// The conductor always annotates workflow sessions with a `path` entry
/// naming the originating workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub key: String,
    pub value: serde_json::Value,
}

/// A named view descriptor on a session record.
///
/// `direct` is the command a front end runs when the mode is selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewMode {
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct: Option<String>,
}

/// The polled unit of work: one execution of a composed workflow.
///
/// Owned by the conductor; each poll attempt holds a transient read-only
/// copy. `kind` and `open_command` are display affordances filled in by
/// decoration on the success path, never by the conductor itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub modes: Vec<ViewMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_command: Option<String>,
}

impl SessionRecord {
    /// Look up an annotation value by key.
    pub fn annotation(&self, key: &str) -> Option<&serde_json::Value> {
        self.annotations
            .iter()
            .find(|a| a.key == key)
            .map(|a| &a.value)
    }

    /// The workflow path the conductor annotated this session with.
    pub fn path_annotation(&self) -> Option<&str> {
        self.annotation("path").and_then(|v| v.as_str())
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }
}

/// One row of a session listing.
///
/// `status_code` follows the conductor's convention: 0 means success,
/// anything else is a failure. The backend does not guarantee a sort order,
/// which is why callers over-fetch and scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub workflow_name: String,
    pub status_code: i32,
}

impl SessionSummary {
    pub fn is_failed(&self) -> bool {
        self.status_code != 0
    }
}

/// A plain (non-workflow) activation, fetched when a supplied id turns out
/// not to name a workflow session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub activation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub status_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_with_annotations(annotations: Vec<Annotation>) -> SessionRecord {
        SessionRecord {
            session_id: "s-1".to_string(),
            workflow_name: Some("demo".to_string()),
            status: SessionStatus::Success,
            start: None,
            end: None,
            annotations,
            modes: vec![],
            result: None,
            kind: None,
            open_command: None,
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SessionStatus::Success.to_string(), "success");
        assert_eq!(SessionStatus::Failed.to_string(), "failed");
        assert_eq!(SessionStatus::Running.to_string(), "running");
    }

    #[test]
    fn test_status_terminal() {
        assert!(SessionStatus::Success.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(!SessionStatus::Running.is_terminal());
    }

    #[test]
    fn test_path_annotation() {
        let record = record_with_annotations(vec![
            Annotation {
                key: "limits".to_string(),
                value: json!({"timeout": 60000}),
            },
            Annotation {
                key: "path".to_string(),
                value: json!("demo/if-else"),
            },
        ]);
        assert_eq!(record.path_annotation(), Some("demo/if-else"));

        let bare = record_with_annotations(vec![]);
        assert_eq!(bare.path_annotation(), None);
    }

    #[test]
    fn test_summary_failure_flag() {
        let ok = SessionSummary {
            session_id: "a".to_string(),
            workflow_name: "wf".to_string(),
            status_code: 0,
        };
        let failed = SessionSummary {
            session_id: "b".to_string(),
            workflow_name: "wf".to_string(),
            status_code: 1,
        };
        assert!(!ok.is_failed());
        assert!(failed.is_failed());
    }

    #[test]
    fn test_record_roundtrip_keeps_decoration_fields_optional() {
        let json = json!({
            "session_id": "s-9",
            "status": "success",
            "result": {"value": 42}
        });
        let record: SessionRecord = serde_json::from_value(json).unwrap();
        assert!(record.kind.is_none());
        assert!(record.open_command.is_none());
        assert!(record.modes.is_empty());
        assert_eq!(record.result, Some(json!({"value": 42})));
    }
}
