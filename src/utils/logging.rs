/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::essay::EssayRecord;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 `debug` 或 `info`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 重复初始化（如测试中）直接忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `model_name`: 模型名称
/// - `max_concurrent`: 最大并发数
pub fn log_startup(model_name: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 作文批改助手");
    info!("🤖 模型: {}", model_name);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `saved`: 保存成功数量
/// - `rejected`: 请求不合法数量
/// - `unsaved`: 批改完成但保存失败数量
/// - `total`: 总数
pub fn print_final_stats(saved: usize, rejected: usize, unsaved: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已保存: {}/{}", saved, total);
    info!("🚫 请求不合法: {}", rejected);
    info!("💾 未保存: {}", unsaved);
    info!("{}", "=".repeat(60));
}

/// 打印历史记录
pub fn print_history(records: &[EssayRecord]) {
    info!("\n📚 最近 {} 条批改记录", records.len());
    for record in records {
        info!(
            "#{} 学生 {} ({}) [{} / {}ms]",
            record.id,
            record.student_id.as_deref().unwrap_or("-"),
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.model_name,
            record.latency_ms
        );
        info!("  - 原文: {}", truncate_text(&record.original_text, 80));
        info!("  - 批改: {}", truncate_text(&record.corrected_text, 80));
        info!("  - 说明: {}", record.feedback);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
