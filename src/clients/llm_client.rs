/// LLM API 客户端
///
/// 封装所有与文本生成 API 相关的调用逻辑。默认对接 Gemini 的 OpenAI 兼容端点。
use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;

/// 单次生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub system_instruction: &'a str,
    pub prompt: &'a str,
    pub model: &'a str,
    pub temperature: f32,
}

/// 文本生成能力
///
/// 分析流程只依赖这个 trait，测试中用脚本化的实现替换真实 API。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 返回模型输出的原始文本；没有内容时返回空串
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String>;
}

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    ///
    /// API 密钥在启动时由配置读取一次后传入。
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.llm_api_base_url);

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("无法创建 HTTP 客户端")?;

        let client = Client::with_config(openai_config).with_http_client(http_client);

        Ok(Self { client })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        debug!("调用 LLM API，模型: {}", request.model);
        debug!("提示词长度: {} 字符", request.prompt.chars().count());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_instruction)
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt)
            .build()?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(request.model)
            .messages(messages)
            .temperature(request.temperature)
            .build()?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::ApiCallFailed {
                model: request.model.to_string(),
                message: e.to_string(),
            }
        })?;

        debug!("LLM API 调用成功");

        let choice = response.choices.first().ok_or_else(|| LlmError::EmptyResponse {
            model: request.model.to_string(),
        })?;

        Ok(choice.message.content.clone().unwrap_or_default())
    }
}
