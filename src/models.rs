//! Request-scoped data shared by the relay components

use serde::Deserialize;
use serde::Serialize;

/// Dense vector produced by the embedding service for one piece of text
pub type EmbeddingVector = Vec<f32>;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat conversation.
///
/// Browser clients send extra fields (ids, timestamps); they are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Latest `user` turn of a conversation, the one that is embedded
pub fn latest_user_turn(history: &[ConversationTurn]) -> Option<&ConversationTurn> {
    history.iter().rev().find(|turn| turn.role == Role::User)
}

/// A stored document as returned by a similarity query.
///
/// Only `description` feeds the prompt; the rest is kept for logging. `_id`
/// is whatever the store generated (string, number or `{"$uuid": ..}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(rename = "$similarity", default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl RetrievedDocument {
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }
}

/// Accept whatever a schemaless collection holds: strings as-is, numbers and
/// booleans as their JSON text, anything else as missing.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Incremental fragment of model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk(String);

impl StreamChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_ignores_client_fields() {
        let turn: ConversationTurn = serde_json::from_str(
            r#"{"id":"msg-1","createdAt":"2024-10-01T10:00:00Z","role":"user","content":"hi"}"#,
        )
        .unwrap();
        assert_eq!(turn, ConversationTurn::user("hi"));
    }

    #[test]
    fn test_turn_rejects_unknown_role() {
        let result =
            serde_json::from_str::<ConversationTurn>(r#"{"role":"tool","content":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_turn_serializes_lowercase_role() {
        let json = serde_json::to_value(ConversationTurn::assistant("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "ok"}));
    }

    #[test]
    fn test_latest_user_turn_skips_assistant() {
        let history = vec![
            ConversationTurn::user("first"),
            ConversationTurn::assistant("answer"),
            ConversationTurn::user("second"),
            ConversationTurn::assistant("another answer"),
        ];
        assert_eq!(latest_user_turn(&history).unwrap().content, "second");
        assert!(latest_user_turn(&[]).is_none());
        assert!(latest_user_turn(&[ConversationTurn::assistant("hello")]).is_none());
    }

    #[test]
    fn test_document_from_store_json() {
        let doc: RetrievedDocument = serde_json::from_str(
            r#"{"_id":"a1","description":"Built a RAG chatbot","$similarity":0.91,"$vector":[0.1]}"#,
        )
        .unwrap();
        assert_eq!(doc.id, Some(serde_json::json!("a1")));
        assert_eq!(doc.description.as_deref(), Some("Built a RAG chatbot"));
        assert!((doc.similarity.unwrap() - 0.91).abs() < 1e-6);

        let numeric: RetrievedDocument = serde_json::from_str(r#"{"_id":42}"#).unwrap();
        assert_eq!(numeric.id, Some(serde_json::json!(42)));

        let bare: RetrievedDocument = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert!(bare.description.is_none());
    }
}
