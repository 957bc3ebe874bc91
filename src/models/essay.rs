use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 批改请求
///
/// `student_id` 在降级模式（如交互界面）下可以缺省
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub student_text: String,
}

impl CorrectionRequest {
    pub fn new(student_id: impl Into<String>, student_text: impl Into<String>) -> Self {
        Self {
            student_id: Some(student_id.into()),
            student_text: student_text.into(),
        }
    }

    /// 不带学生ID的请求
    pub fn anonymous(student_text: impl Into<String>) -> Self {
        Self {
            student_id: None,
            student_text: student_text.into(),
        }
    }
}

/// 批改流程的输出
///
/// - `corrected_text` 不为空，解析为空时回退为原文
/// - `feedback` 不为空
/// - `succeeded` 仅在模型完全不可用时为 `false`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionResult {
    pub corrected_text: String,
    pub feedback: String,
    pub succeeded: bool,
}

/// 待写入的批改记录（尚未分配ID）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEssay {
    pub student_id: Option<String>,
    pub original_text: String,
    pub corrected_text: String,
    pub feedback: String,
    pub model_name: String,
    pub latency_ms: u64,
}

/// 已持久化的批改记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EssayRecord {
    pub id: i64,
    pub student_id: Option<String>,
    pub original_text: String,
    pub corrected_text: String,
    pub feedback: String,
    pub model_name: String,
    pub latency_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// 返回给调用方的响应（与传输方式无关）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EssayResponse {
    pub id: i64,
    pub student_id: Option<String>,
    pub original: String,
    pub corrected: String,
    pub feedback: String,
    pub model: String,
    pub latency_ms: u64,
}

impl EssayResponse {
    pub fn from_saved(id: i64, essay: NewEssay) -> Self {
        Self {
            id,
            student_id: essay.student_id,
            original: essay.original_text,
            corrected: essay.corrected_text,
            feedback: essay.feedback,
            model: essay.model_name,
            latency_ms: essay.latency_ms,
        }
    }
}

/// 统一的错误响应
///
/// `detail` 只在调试模式下出现
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// 健康检查结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub ok: bool,
    pub model: String,
}

/// 一个 TOML 文件中的待批改作文
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EssayBatch {
    #[serde(default)]
    pub essays: Vec<CorrectionRequest>,
    #[serde(skip)]
    pub file_path: Option<String>,
}
