//! # 텍스트 생성 모델 클라이언트
//!
//! OpenAI 호환 `/chat/completions` API를 `reqwest`로 호출합니다.
//! 생성 파이프라인은 `TextGenerator` 트레이트에만 의존하므로 테스트에서는
//! 미리 정해진 응답을 돌려주는 구현으로 바꿔 끼울 수 있습니다.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 모델 출력 길이 상한 (토큰)
pub const MAX_OUTPUT_TOKENS: u32 = 1200;
/// 출력 다양성 (0에 가까울수록 결정적)
pub const TEMPERATURE: f32 = 0.7;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// 모델 한 번 호출에 필요한 입력
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// 모델 응답 텍스트와 토큰 사용량. 사용량이 없으면 0입니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// 모델 호출 실패 (네트워크, HTTP 상태, 응답 형식)
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model API error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// 텍스트 생성 모델
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ModelError>;
}

/// OpenAI 호환 API 클라이언트
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ModelError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let usage = parsed.usage.unwrap_or_default();
        // 선택지가 없거나 content가 null이면 빈 텍스트로 취급합니다. 파이프라인이 대체 표로 처리합니다.
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(Completion {
            text,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        })
    }
}
