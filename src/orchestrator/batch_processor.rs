//! 批量作文处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是命令行前端的入口，负责批量作文的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：建表、创建模型客户端和存储，组装 `RequestOrchestrator`
//! 2. **批量加载**：扫描并加载所有待批改的作文（`*.toml`）
//! 3. **并发控制**：使用 Semaphore 限制同时在途的模型调用数量
//! 4. **全局统计**：汇总所有请求的处理结果，并展示最近的批改记录
//!
//! 单个请求的流程全部委托给 `workflow::RequestOrchestrator`

use crate::clients::{DeadlineClient, LlmClient, ModelClient};
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::Database;
use crate::models::{CorrectionRequest, EssayResponse};
use crate::services::SqliteEssayStore;
use crate::utils::logging;
use crate::workflow::RequestOrchestrator;
use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: RequestOrchestrator,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let db = Database::new(&config.database_path);
        db.init_schema()?;

        let llm = LlmClient::new(&config);
        let model: Arc<dyn ModelClient> = match config.llm_timeout() {
            Some(timeout) => Arc::new(DeadlineClient::new(llm, timeout)),
            None => Arc::new(llm),
        };

        logging::log_startup(model.model_name(), config.max_concurrent_requests);

        let orchestrator =
            RequestOrchestrator::new(model, Arc::new(SqliteEssayStore::new(db)))
                .require_student_id(config.require_student_id);

        Ok(Self::with_orchestrator(config, orchestrator))
    }

    /// 使用已组装好的编排器（测试或其他前端复用）
    pub fn with_orchestrator(config: Config, orchestrator: RequestOrchestrator) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn orchestrator(&self) -> &RequestOrchestrator {
        &self.orchestrator
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchStats> {
        info!("\n📁 正在扫描待批改的作文...");
        let requests: Vec<CorrectionRequest> =
            crate::models::load_all_toml_files(&self.config.essay_folder)
                .await?
                .into_iter()
                .flat_map(|batch| batch.essays)
                .collect();

        if requests.is_empty() {
            warn!("⚠️ 没有找到待批改的作文，程序结束");
            return Ok(BatchStats::default());
        }

        info!("✓ 找到 {} 篇待批改的作文", requests.len());

        let stats = self.process_all(requests).await;
        logging::print_final_stats(stats.saved, stats.rejected, stats.unsaved, stats.total);

        match self.orchestrator.recent(self.config.history_limit).await {
            Ok(records) => logging::print_history(&records),
            Err(e) => error!("❌ 无法读取历史记录: {}", e),
        }

        Ok(stats)
    }

    /// 并发处理所有请求
    pub async fn process_all(&self, requests: Vec<CorrectionRequest>) -> BatchStats {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_requests.max(1)));
        let total = requests.len();

        let handles = requests.into_iter().enumerate().map(|(idx, request)| {
            let semaphore = semaphore.clone();
            let orchestrator = self.orchestrator.clone();
            tokio::spawn(async move {
                // Semaphore 不会被关闭
                let _permit = semaphore.acquire_owned().await.ok();
                (idx + 1, orchestrator.handle(&request).await)
            })
        });

        let mut stats = BatchStats {
            total,
            ..Default::default()
        };

        for joined in join_all(handles).await {
            match joined {
                Ok((index, outcome)) => self.record(&mut stats, index, outcome),
                Err(e) => {
                    error!("任务执行失败: {}", e);
                    stats.failed += 1;
                }
            }
        }

        stats
    }

    fn record(&self, stats: &mut BatchStats, index: usize, outcome: Result<EssayResponse, AppError>) {
        match outcome {
            Ok(response) => {
                info!(
                    "[作文 {}] ✅ 已保存 (ID: {}, {}ms): {}",
                    index,
                    response.id,
                    response.latency_ms,
                    logging::truncate_text(&response.corrected, 60)
                );
                info!("[作文 {}] 💡 {}", index, response.feedback);
                stats.saved += 1;
            }
            Err(e @ AppError::Validation(_)) => {
                warn!("[作文 {}] 🚫 {}", index, e);
                stats.rejected += 1;
            }
            Err(e @ AppError::Unsaved { .. }) => {
                let response = e.to_response(self.config.debug_errors);
                error!("[作文 {}] 💾 {}", index, response.message);
                if let Some(detail) = response.detail {
                    error!("[作文 {}] {}", index, detail);
                }
                stats.unsaved += 1;
            }
            Err(e) => {
                error!("[作文 {}] ❌ {}", index, e);
                stats.failed += 1;
            }
        }
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub saved: usize,
    pub rejected: usize,
    pub unsaved: usize,
    pub failed: usize,
}
