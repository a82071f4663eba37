use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
};
use crate::ai::GenerativeModel;
use crate::models::{GenerationRequest, GenerationResult};
use crate::Result;
use async_trait::async_trait;
use base64::Engine as _;

/// [`GenerativeModel`] backed by Gemini's `generateContent` endpoint.
pub struct GeminiClient {
    http: GeminiHttpClient,
    generation_config: GenerationConfig,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::from_http(GeminiHttpClient::new(api_key, model))
    }

    pub fn from_http(http: GeminiHttpClient) -> Self {
        Self {
            http,
            generation_config: GenerationConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn build_request(&self, request: &GenerationRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: request.prompt().to_string(),
        }];

        if let Some(media) = request.media() {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: media.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&media.bytes),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: self.generation_config.clone(),
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let body = self.build_request(request);

        tracing::debug!(
            model = self.http.model(),
            prompt_chars = request.prompt().chars().count(),
            media = request.media().map(|m| m.mime_type.as_str()),
            "Sending generateContent request"
        );

        let response: GenerateContentResponse = self.http.generate_content(&body).await?;
        let text = response.first_candidate_text();

        if text.is_empty() {
            tracing::warn!("Gemini response contained no text; returning empty result");
        }

        Ok(GenerationResult { text })
    }

    fn model_id(&self) -> &str {
        self.http.model()
    }
}
