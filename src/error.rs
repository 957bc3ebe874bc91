use crate::models::essay::{ErrorResponse, NewEssay};
use thiserror::Error;

/// 应用程序错误类型
///
/// 模型调用失败不在这里出现：批改流程会就地兜底，永远不会把 `ModelError` 抛给调用方
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求不合法，未进入批改流程
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// 批改已完成但保存失败，`essay` 保留完整的批改结果，可以只重试保存
    #[error("correction succeeded but was not saved: {source}")]
    Unsaved {
        source: StoreError,
        essay: Box<NewEssay>,
    },

    /// 其他存储错误（如读取历史记录）
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// 模型调用错误
#[derive(Debug, Error)]
pub enum ModelError {
    /// API 调用失败
    #[error("model call failed ({model}): {source}")]
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回结果为空（没有任何 choice）
    #[error("model returned no choices ({model})")]
    EmptyResponse { model: String },
    /// 请求构建失败
    #[error("failed to build model request: {0}")]
    RequestBuild(String),
    /// 超过截止时间
    #[error("model call timed out after {timeout_ms}ms ({model})")]
    Timeout { model: String, timeout_ms: u64 },
}

/// 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 打开数据库连接失败
    #[error("failed to open database {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },
    /// 建表失败
    #[error("failed to provision schema: {0}")]
    Schema(#[source] rusqlite::Error),
    /// 写入失败（整个事务已回滚）
    #[error("failed to insert essay: {0}")]
    Insert(#[source] rusqlite::Error),
    /// 查询失败
    #[error("failed to query essays: {0}")]
    Query(#[source] rusqlite::Error),
    /// 耗时超出数据库整数范围
    #[error("latency {latency_ms}ms does not fit in the latency column")]
    LatencyOutOfRange { latency_ms: u64 },
    /// 行数据无法还原为记录
    #[error("corrupt essay row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
    /// 阻塞任务异常退出
    #[error("store task aborted: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// 请求校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("student_id is required")]
    MissingStudentId,
    #[error("limit must be greater than zero (got {limit})")]
    InvalidLimit { limit: usize },
}

impl ModelError {
    /// 创建 API 调用错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ModelError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

impl AppError {
    /// 保存失败时尚未落库的批改结果
    pub fn unsaved_essay(&self) -> Option<&NewEssay> {
        match self {
            AppError::Unsaved { essay, .. } => Some(essay),
            _ => None,
        }
    }

    /// 转换为统一的错误响应
    ///
    /// `debug` 为 `true` 时附带完整的错误链
    pub fn to_response(&self, debug: bool) -> ErrorResponse {
        let detail = debug.then(|| {
            let mut chain = format!("{:?}", self);
            let mut source = std::error::Error::source(self);
            while let Some(cause) = source {
                chain.push_str(&format!("\ncaused by: {}", cause));
                source = cause.source();
            }
            chain
        });

        ErrorResponse {
            message: self.to_string(),
            detail,
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
