//! Client actions and outgoing replies.
//!
//! The dialog surface is transport-agnostic: any front end that can carry
//! free text and button presses can drive the core. An incoming action is
//! one of two kinds; the outgoing reply is a text plus the set of choices
//! to offer next, which the transport renders however it likes (inline
//! keyboard, numbered menu, links).

use serde::{Deserialize, Serialize};

use crate::job::StatusHandle;
use crate::session::{ClientId, DialogState};

/// An incoming client action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientAction {
    /// Free-form text. Creates a session (topic) when none exists;
    /// otherwise only valid in the text-expecting states.
    FreeText { client_id: ClientId, text: String },

    /// A discrete choice, stamped with the state the offering prompt was
    /// generated for so duplicate or superseded button presses can be
    /// detected and refused without mutation.
    Choice {
        client_id: ClientId,
        choice_id: String,
        expected_state: DialogState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status_handle: Option<StatusHandle>,
    },
}

impl ClientAction {
    pub fn client_id(&self) -> &ClientId {
        match self {
            ClientAction::FreeText { client_id, .. } => client_id,
            ClientAction::Choice { client_id, .. } => client_id,
        }
    }
}

/// One selectable option offered to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Stable id echoed back in [`ClientAction::Choice::choice_id`].
    pub id: String,
    /// Human label for rendering.
    pub label: String,
    /// State this option belongs to; echoed back as `expected_state`.
    pub state: DialogState,
}

impl ChoiceOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>, state: DialogState) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            state,
        }
    }
}

/// Outgoing prompt: text plus zero or more options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
}

impl Reply {
    /// A plain text reply with no options.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    /// A reply offering a set of choices.
    pub fn with_options(text: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_client_id() {
        let text = ClientAction::FreeText {
            client_id: ClientId::from("a"),
            text: "hello".to_string(),
        };
        assert_eq!(text.client_id().as_str(), "a");

        let choice = ClientAction::Choice {
            client_id: ClientId::from("b"),
            choice_id: "pdf".to_string(),
            expected_state: DialogState::ChoosingFormat,
            status_handle: None,
        };
        assert_eq!(choice.client_id().as_str(), "b");
    }

    #[test]
    fn test_choice_action_serde() {
        let json = r#"{
            "kind": "choice",
            "client_id": "c-9",
            "choice_id": "medium",
            "expected_state": "choosing_depth"
        }"#;
        let action: ClientAction = serde_json::from_str(json).unwrap();
        match action {
            ClientAction::Choice {
                choice_id,
                expected_state,
                status_handle,
                ..
            } => {
                assert_eq!(choice_id, "medium");
                assert_eq!(expected_state, DialogState::ChoosingDepth);
                assert!(status_handle.is_none());
            }
            other => panic!("expected choice, got {other:?}"),
        }
    }

    #[test]
    fn test_reply_without_options_omits_field() {
        let reply = Reply::text("done");
        let json = serde_json::to_string(&reply).unwrap();
        assert!(!json.contains("options"));
    }
}
