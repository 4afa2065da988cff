//! The slice of the monitoring SDK's event model the gate needs to classify
//! and replay events. Unknown payload fields ride along in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stacktrace {
    #[serde(default)]
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExceptionValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<Stacktrace>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExceptionList {
    #[serde(default)]
    pub values: Vec<ExceptionValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringEvent {
    #[serde(default = "Uuid::new_v4")]
    pub event_id: Uuid,
    /// `None` for plain error/message events, `Some("transaction")` etc. otherwise.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionList>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MonitoringEvent {
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: None,
            level: None,
            message: None,
            exception: None,
            extra: Map::new(),
        }
    }

    pub fn message(text: &str, level: Level) -> Self {
        Self {
            level: Some(level),
            message: Some(text.to_string()),
            ..Self::new()
        }
    }

    pub fn exception(ty: &str, value: &str, frames: Vec<Frame>) -> Self {
        let stacktrace = if frames.is_empty() { None } else { Some(Stacktrace { frames }) };
        Self {
            level: Some(Level::Error),
            exception: Some(ExceptionList {
                values: vec![ExceptionValue {
                    ty: Some(ty.to_string()),
                    value: Some(value.to_string()),
                    stacktrace,
                }],
            }),
            ..Self::new()
        }
    }

    pub fn transaction(name: &str) -> Self {
        let mut extra = Map::new();
        extra.insert("transaction".to_string(), Value::String(name.to_string()));
        Self {
            event_type: Some("transaction".to_string()),
            extra,
            ..Self::new()
        }
    }

    /// First recorded exception, if the event carries one.
    pub fn primary_exception(&self) -> Option<&ExceptionValue> {
        self.exception.as_ref().and_then(|list| list.values.first())
    }

    /// Message text, treating an empty string as absent.
    pub fn message_text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

impl Default for MonitoringEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// Side-channel data the SDK hands to event processors alongside the event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_exception: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic_exception: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub message: String,
    pub category: String,
    pub level: Level,
    #[serde(default)]
    pub data: Value,
}

/// User context attached to the scope on a page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub id: String,
}
