//! Wire types for the Anthropic Messages API.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";
pub const WEB_SEARCH_TOOL_NAME: &str = "web_search";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A response content block, kept as raw JSON so it can be echoed back
/// verbatim in a follow-up turn.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ContentBlock(pub Value);

impl ContentBlock {
    pub fn text(text: &str) -> Self {
        ContentBlock(json!({ "type": "text", "text": text }))
    }

    pub fn tool_use(id: &str, name: &str) -> Self {
        ContentBlock(json!({ "type": "tool_use", "id": id, "name": name, "input": {} }))
    }

    pub fn tool_result(tool_use_id: &str, content: &str) -> Self {
        ContentBlock(json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": content,
        }))
    }

    pub fn block_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self.block_type() {
            Some("text") => self.0.get("text").and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn tool_use_id(&self) -> Option<&str> {
        match self.block_type() {
            Some("tool_use") => self.0.get("id").and_then(Value::as_str),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    pub fn user_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Blocks(blocks),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl Tool {
    pub fn web_search() -> Self {
        Self {
            kind: WEB_SEARCH_TOOL_TYPE.to_string(),
            name: WEB_SEARCH_TOOL_NAME.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl MessagesResponse {
    pub fn is_tool_use(&self) -> bool {
        self.stop_reason.as_deref() == Some("tool_use")
    }

    /// All text blocks joined with newlines, in response order.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn first_tool_use_id(&self) -> Option<&str> {
        self.content.iter().find_map(ContentBlock::tool_use_id)
    }
}
