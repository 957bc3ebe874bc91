//! 批改流程 - 业务能力层
//!
//! 只负责"把一段文本变成 (批改文本, 说明)"，不关心保存
//!
//! 模型失败在这里就地兜底：`correct` 对任何输入都返回可用的结果，从不返回错误

use std::sync::Arc;
use tracing::{debug, warn};

use crate::clients::ModelClient;
use crate::models::essay::CorrectionResult;
use crate::services::response_parser;
use crate::utils::logging::truncate_text;

const PROMPT_TEMPLATE: &str = "Correct the grammar and spelling in this text. \
Return the corrected text first, then one short feedback sentence \
explaining the main fix.\n\nText: {text}";

/// 把原文原样嵌入提示词模板
pub fn build_prompt(text: &str) -> String {
    PROMPT_TEMPLATE.replacen("{text}", text, 1)
}

/// 批改流程
#[derive(Clone)]
pub struct CorrectionPipeline {
    model: Arc<dyn ModelClient>,
}

impl CorrectionPipeline {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// 批改一段文本
    ///
    /// - 模型正常返回：解析输出，批改文本为空时回退为原文
    /// - 模型失败：原文原样返回，说明中带上失败原因，`succeeded = false`
    pub async fn correct(&self, text: &str) -> CorrectionResult {
        let prompt = build_prompt(text);

        match self.model.generate(&prompt).await {
            Ok(raw) => {
                debug!("模型原始输出: {}", truncate_text(&raw, 120));
                let parsed = response_parser::parse(&raw);
                if parsed.is_empty() {
                    warn!("⚠️ 模型没有返回批改文本，使用原文");
                }
                CorrectionResult {
                    corrected_text: parsed.corrected.unwrap_or_else(|| text.to_string()),
                    feedback: parsed.feedback,
                    succeeded: true,
                }
            }
            Err(e) => {
                warn!("⚠️ 模型调用失败，返回原文: {}", e);
                CorrectionResult {
                    corrected_text: text.to_string(),
                    feedback: format!("⚠️ Model error: {}", e),
                    succeeded: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::services::response_parser::DEFAULT_FEEDBACK;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 返回固定输出并记录收到的提示词
    struct ScriptedModel {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|_| ModelError::Timeout {
                model: "scripted".to_string(),
                timeout_ms: 10,
            })
        }
    }

    #[test]
    fn test_build_prompt_embeds_text_verbatim() {
        let prompt = build_prompt("a {text} b");
        assert!(prompt.starts_with("Correct the grammar and spelling in this text. "));
        assert!(prompt.ends_with("\n\nText: a {text} b"));
    }

    #[tokio::test]
    async fn test_correct_parses_model_output() {
        let model = ScriptedModel::replying(
            "This is my first test sentence.Feedback: Fixed a spelling error.",
        );
        let pipeline = CorrectionPipeline::new(model.clone());

        let result = pipeline.correct("This is my frst test sentnce.").await;

        assert_eq!(
            result,
            CorrectionResult {
                corrected_text: "This is my first test sentence.".to_string(),
                feedback: "Fixed a spelling error.".to_string(),
                succeeded: true,
            }
        );
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("Text: This is my frst test sentnce."));
    }

    #[tokio::test]
    async fn test_whitespace_before_marker_returns_original() {
        let pipeline = CorrectionPipeline::new(ScriptedModel::replying("   Feedback: Nothing to fix."));

        let result = pipeline.correct("My essay.").await;

        assert_eq!(result.corrected_text, "My essay.");
        assert_eq!(result.feedback, "Nothing to fix.");
        assert!(result.succeeded);
    }

    #[tokio::test]
    async fn test_empty_output_returns_original_with_default_feedback() {
        let pipeline = CorrectionPipeline::new(ScriptedModel::replying(""));

        let result = pipeline.correct("My essay.").await;

        assert_eq!(result.corrected_text, "My essay.");
        assert_eq!(result.feedback, DEFAULT_FEEDBACK);
        assert!(result.succeeded);
    }

    #[tokio::test]
    async fn test_model_failure_returns_input_unchanged() {
        let pipeline = CorrectionPipeline::new(ScriptedModel::failing());
        let input = "  Ünïcode   text\twith spacing  ";

        let result = pipeline.correct(input).await;

        assert!(!result.succeeded);
        assert_eq!(result.corrected_text, input);
        assert!(result.feedback.starts_with("⚠️ Model error: "));
        assert!(result.feedback.contains("timed out"));
    }
}
