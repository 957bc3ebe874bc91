//! LLM 客户端 - 基础设施层
//!
//! 把外部生成模型包装成"文本进、文本出"的能力
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（vLLM、TGI、Ollama 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ModelError;

const SYSTEM_MESSAGE: &str = "You are a careful writing tutor who corrects grammar and spelling.";

/// 生成模型
///
/// 调用方负责重试和超时策略，实现内部不做重试
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// 模型标识，随每条批改记录一起保存
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// 基于 OpenAI 兼容接口的模型客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    fn build_messages(&self, prompt: &str) -> Result<Vec<ChatCompletionRequestMessage>, ModelError> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_MESSAGE)
            .build()
            .map_err(|e| ModelError::RequestBuild(e.to_string()))?;

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| ModelError::RequestBuild(e.to_string()))?;

        Ok(vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ])
    }
}

#[async_trait]
impl ModelClient for LlmClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.len());

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(self.build_messages(prompt)?)
            .temperature(0.3)
            .max_tokens(1024u32)
            .build()
            .map_err(|e| ModelError::RequestBuild(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            ModelError::api_call_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        // 没有正文按空文本处理，交给解析器兜底
        Ok(choice.message.content.unwrap_or_default())
    }
}

/// 给任意模型客户端加上截止时间
pub struct DeadlineClient<C> {
    inner: C,
    timeout: Duration,
}

impl<C: ModelClient> DeadlineClient<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<C: ModelClient> ModelClient for DeadlineClient<C> {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "⏱️ LLM 调用超时 ({}ms)，模型: {}",
                    self.timeout.as_millis(),
                    self.inner.model_name()
                );
                Err(ModelError::Timeout {
                    model: self.inner.model_name().to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}
