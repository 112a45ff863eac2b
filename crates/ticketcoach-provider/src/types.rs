use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmMessage {
    pub role: String,
    pub content: String,
}

impl LlmMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<LlmMessage>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

pub fn default_max_tokens() -> u32 {
    2048
}

impl LlmRequest {
    pub fn simple(model: String, system: Option<String>, user: String) -> Self {
        Self {
            model,
            system,
            messages: vec![LlmMessage::user(user)],
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Text of the last user message, or empty.
    pub fn user_text(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub stop_reason: Option<String>,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_tokens: None,
            output_tokens: None,
            stop_reason: Some("end_turn".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_request_simple_has_single_user_message() {
        let req = LlmRequest::simple("model".into(), None, "hello".into());
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.user_text(), "hello");
        assert_eq!(req.max_tokens, 2048);
        assert!(req.temperature.is_none());
    }

    #[test]
    fn temperature_is_omitted_when_unset() {
        let req = LlmRequest::simple("m".into(), None, "hi".into());
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());

        let json = serde_json::to_value(req.with_temperature(0.2)).unwrap();
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn user_text_picks_last_user_message() {
        let req = LlmRequest {
            model: "m".into(),
            system: None,
            messages: vec![
                LlmMessage::user("first"),
                LlmMessage::assistant("reply"),
                LlmMessage::user("second"),
            ],
            max_tokens: 10,
            temperature: None,
        };
        assert_eq!(req.user_text(), "second");
    }

    #[test]
    fn user_text_empty_without_messages() {
        let req = LlmRequest {
            model: "m".into(),
            system: None,
            messages: vec![],
            max_tokens: 10,
            temperature: None,
        };
        assert_eq!(req.user_text(), "");
    }
}
