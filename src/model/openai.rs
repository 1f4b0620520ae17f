//! OpenAI chat completions client (blocking)

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LanguageModel;
use crate::config::ModelConfig;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiModel {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl OpenAiModel {
    pub fn new(config: &ModelConfig, api_key: String) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(config.timeout_secs.map(Duration::from_secs))
            .build()
            .into();

        Self {
            agent,
            endpoint: config.endpoint.clone(),
            model: config.name.clone(),
            temperature: config.temperature,
            api_key,
        }
    }

    fn request_body(&self, prompt: &str) -> Result<String> {
        // The whole transcript goes out as a single user message
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };
        serde_json::to_string(&request).context("Failed to serialize request")
    }
}

impl LanguageModel for OpenAiModel {
    fn name(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let request_body = self.request_body(prompt)?;
        log::debug!("Sending {} byte prompt to {}", prompt.len(), self.endpoint);

        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(request_body.as_bytes())
            .context("Failed to call OpenAI API")?;

        let response_body = response
            .body_mut()
            .read_to_string()
            .context("Failed to read response")?;

        let text = parse_completion(&response_body)?;
        log::debug!("Received {} byte completion", text.len());
        Ok(text)
    }
}

fn parse_completion(body: &str) -> Result<String> {
    let completion: ChatCompletionResponse =
        serde_json::from_str(body).context("Failed to parse OpenAI response")?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| eyre::eyre!("No completion in OpenAI response"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> OpenAiModel {
        OpenAiModel::new(&ModelConfig::default(), "sk-test".to_string())
    }

    #[test]
    fn test_request_body_sends_single_user_message() {
        let body = model().request_body("Incident: x\nUser: hi").unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Incident: x\nUser: hi");
    }

    #[test]
    fn test_parse_completion() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "Rolling back."}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "Rolling back.");
    }

    #[test]
    fn test_parse_completion_without_choices() {
        assert!(parse_completion(r#"{"choices": []}"#).is_err());
        assert!(parse_completion(r#"{"choices": [{"message": {"content": null}}]}"#).is_err());
        assert!(parse_completion("<html>bad gateway</html>").is_err());
    }

    #[test]
    fn test_name_is_model_name() {
        assert_eq!(model().name(), "gpt-4");
    }
}
