//! OpenAI chat-completions generation gateway.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::config::GenerationSettings;
use docqa_core::traits::Generator;
use docqa_core::{Error, Result};

use crate::http::{build_client, endpoint, post_json};
use crate::prompt::PromptTemplate;

pub struct OpenAiChatGenerator {
    client: Client,
    api_key: String,
    url: String,
    model: String,
    model_id: String,
    temperature: Option<f32>,
    template: PromptTemplate,
}

impl OpenAiChatGenerator {
    pub fn new(settings: &GenerationSettings, api_key: impl Into<String>) -> Result<Self> {
        let template = match &settings.prompt_template {
            Some(text) => PromptTemplate::parse(text)?,
            None => PromptTemplate::default(),
        };
        Ok(Self {
            client: build_client(settings.timeout_secs)?,
            api_key: api_key.into(),
            url: endpoint(&settings.base_url, "chat/completions"),
            model: settings.model.clone(),
            model_id: format!("openai:{}", settings.model),
            temperature: settings.temperature,
            template,
        })
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }
}

#[async_trait]
impl Generator for OpenAiChatGenerator {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, context: &str, question: &str) -> Result<String> {
        let prompt = self.template.render(context, question);
        debug!(model = %self.model, prompt_version = self.template.version(), prompt_chars = prompt.len(), "requesting completion");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: &prompt }],
            temperature: self.temperature,
        };
        let response: ChatResponse =
            post_json(&self.client, &self.url, &self.api_key, &request, "generation service").await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::unavailable("generation service returned no completion", false))
    }
}

// -- OpenAI API request/response types --

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
