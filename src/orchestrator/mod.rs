//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和并发调度，是命令行前端的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<CorrectionRequest>)
//!     ↓
//! workflow::RequestOrchestrator (处理单个请求)
//!     ↓
//! services (能力层：批改流程 / 响应解析 / 记录存储)
//!     ↓
//! clients + infrastructure (模型客户端 / SQLite)
//! ```
//!
//! 只做调度和统计，不做具体业务判断

pub mod batch_processor;

pub use batch_processor::{App, BatchStats};
