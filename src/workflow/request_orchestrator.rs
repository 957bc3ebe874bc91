//! 单次请求处理流程 - 流程层
//!
//! 核心职责：定义"一次批改请求"的完整处理流程，任何前端（API、交互界面、批处理）都走这里
//!
//! 流程顺序：
//! 1. 校验请求
//! 2. 计时 → 批改 → 停止计时（只计批改耗时，不含保存）
//! 3. 保存记录
//! 4. 组装响应
//!
//! 模型不可用不算错误：兜底结果照常保存和返回

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::clients::ModelClient;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::essay::{CorrectionRequest, EssayRecord, EssayResponse, HealthStatus, NewEssay};
use crate::services::{CorrectionPipeline, EssayStore};
use crate::utils::logging::truncate_text;

/// 请求编排器
///
/// - 不持有任何请求级别的可变状态，可以 clone 后在多个任务中并发使用
/// - 模型和存储都是注入的共享服务，测试时可替换
#[derive(Clone)]
pub struct RequestOrchestrator {
    pipeline: CorrectionPipeline,
    store: Arc<dyn EssayStore>,
    require_student_id: bool,
}

impl RequestOrchestrator {
    /// 创建新的编排器，默认要求学生ID
    pub fn new(model: Arc<dyn ModelClient>, store: Arc<dyn EssayStore>) -> Self {
        Self {
            pipeline: CorrectionPipeline::new(model),
            store,
            require_student_id: true,
        }
    }

    /// 是否要求请求携带学生ID（交互界面等降级模式下可关闭）
    pub fn require_student_id(mut self, required: bool) -> Self {
        self.require_student_id = required;
        self
    }

    pub fn model_name(&self) -> &str {
        self.pipeline.model_name()
    }

    /// 校验请求，失败时不会进入批改流程
    ///
    /// 只检查请求格式；空白作文照常交给批改流程
    pub fn validate(&self, request: &CorrectionRequest) -> Result<(), ValidationError> {
        let has_student_id = request
            .student_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        if self.require_student_id && !has_student_id {
            return Err(ValidationError::MissingStudentId);
        }
        Ok(())
    }

    /// 处理一次批改请求
    ///
    /// # 返回
    /// - `Ok`: 已保存的批改结果（模型不可用时为原文 + 诊断说明）
    /// - `Err(AppError::Validation)`: 请求不合法
    /// - `Err(AppError::Unsaved)`: 批改完成但保存失败，错误中带有完整结果，可调用 [`Self::retry_save`]
    pub async fn handle(&self, request: &CorrectionRequest) -> AppResult<EssayResponse> {
        self.validate(request)?;

        let label = request.student_id.as_deref().unwrap_or("匿名");
        info!(
            "[学生 {}] 📝 开始批改: {}",
            label,
            truncate_text(&request.student_text, 60)
        );

        let start = Instant::now();
        let result = self.pipeline.correct(&request.student_text).await;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if result.succeeded {
            info!("[学生 {}] ✓ 批改完成，耗时 {}ms", label, latency_ms);
        } else {
            warn!(
                "[学生 {}] ⚠️ 模型不可用，返回原文 (耗时 {}ms)",
                label, latency_ms
            );
        }

        let essay = NewEssay {
            student_id: request.student_id.clone(),
            original_text: request.student_text.clone(),
            corrected_text: result.corrected_text,
            feedback: result.feedback,
            model_name: self.model_name().to_string(),
            latency_ms,
        };

        self.save(essay).await
    }

    /// 只重试保存步骤
    pub async fn retry_save(&self, essay: NewEssay) -> AppResult<EssayResponse> {
        info!("🔁 重试保存批改记录");
        self.save(essay).await
    }

    async fn save(&self, essay: NewEssay) -> AppResult<EssayResponse> {
        match self.store.insert(&essay).await {
            Ok(id) => {
                info!("✓ 批改记录已保存，ID: {}", id);
                Ok(EssayResponse::from_saved(id, essay))
            }
            Err(source) => {
                warn!("⚠️ 批改完成但保存失败: {}", source);
                Err(AppError::Unsaved {
                    source,
                    essay: Box::new(essay),
                })
            }
        }
    }

    /// 最近的批改记录，新的在前
    pub async fn recent(&self, limit: usize) -> AppResult<Vec<EssayRecord>> {
        if limit == 0 {
            return Err(ValidationError::InvalidLimit { limit }.into());
        }
        Ok(self.store.list_recent(limit).await?)
    }

    /// 健康检查
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            ok: true,
            model: self.model_name().to_string(),
        }
    }
}
