//! # Essay Assistant
//!
//! 作文批改助手：把一段文本交给生成模型做语法和拼写批改，附一句说明，并把每次批改持久化
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Clients / Infrastructure）
//! - `clients/` - 外部生成模型，`ModelClient` 只暴露 generate() 能力
//! - `infrastructure/` - SQLite 数据库，每次操作独立打开连接
//!
//! ### ② 业务能力层（Services）
//! - `ResponseParser` - 把模型的自由文本切分为 (批改文本, 说明)
//! - `CorrectionPipeline` - 提示词 → 模型 → 解析，模型失败时就地兜底
//! - `EssayStore` - 保存批改记录、读取最近记录
//!
//! ### ③ 流程层（Workflow）
//! - `RequestOrchestrator` - 校验 → 计时批改 → 保存 → 响应，所有前端共用
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 命令行批处理，控制并发

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{DeadlineClient, LlmClient, ModelClient};
pub use config::Config;
pub use error::{AppError, AppResult, ModelError, StoreError, ValidationError};
pub use infrastructure::Database;
pub use models::{CorrectionRequest, CorrectionResult, EssayRecord, EssayResponse, NewEssay};
pub use orchestrator::{App, BatchStats};
pub use services::{CorrectionPipeline, EssayStore, SqliteEssayStore};
pub use workflow::RequestOrchestrator;
