/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::models::StatsSnapshot;

/// 初始化全局日志
///
/// 控制台输出带颜色，日志文件（追加写入）不带颜色。
/// `RUST_LOG` 优先于 `verbose` 设置。重复初始化时静默忽略。
///
/// # 参数
/// - `verbose`: 是否输出 debug 级别日志
/// - `log_file_path`: 日志文件路径，`None` 表示只输出到控制台
pub fn init(verbose: bool, log_file_path: Option<&str>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();

    Ok(())
}

/// 初始化日志文件（覆盖旧内容并写入标题）
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n밈 분석 로그 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `pool_size`: 并发 worker 数
/// - `model_name`: 使用的模型
pub fn log_startup(pool_size: usize, model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 并发梗分析模式");
    info!("📊 并发 worker 数: {}", pool_size);
    info!("🤖 模型: {}", model_name);
    info!("{}", "=".repeat(60));
}

/// 记录待处理文件数量
pub fn log_tasks_found(total: usize, input_dir: &str) {
    info!("✓ 在 {} 中找到 {} 个待分析的文件", input_dir, total);
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 计数器快照
/// - `total`: 文件总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(stats: &StatsSnapshot, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{} ({})", stats.success, total, percent(stats.success, total));
    info!("❌ 失败: {} ({})", stats.failure, percent(stats.failure, total));
    info!("🔄 API 重试: {} 次", stats.retry);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / total as f64)
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("무야호", 10), "무야호");
        assert_eq!(truncate_text("무야호 그만큼 신나", 3), "무야호...");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), "0.0%");
        assert_eq!(percent(1, 3), "33.3%");
        assert_eq!(percent(3, 3), "100.0%");
    }

    #[test]
    fn test_init_log_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        fs::write(&path, "old").unwrap();

        init_log_file(path.to_str().unwrap()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("밈 분석 로그"));
        assert!(!content.contains("old"));
    }
}
