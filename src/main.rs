use std::process::ExitCode;

use meme_analyzer::app::{usage, App, Mode};
use meme_analyzer::utils::logging;
use meme_analyzer::Config;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "meme_analyzer".to_string());

    let mode = match Mode::from_args(args) {
        Ok(mode) => mode,
        Err(arg) => {
            eprintln!("无法识别的参数: {}\n{}", arg, usage(&program));
            return ExitCode::from(2);
        }
    };

    // 加载配置
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ 配置加载失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // 初始化日志
    if let Err(e) = logging::init_log_file(&config.output_log_file) {
        eprintln!("⚠️ 无法初始化日志文件 {}: {}", config.output_log_file, e);
    }
    if let Err(e) = logging::init(config.verbose_logging, Some(&config.output_log_file)) {
        eprintln!("⚠️ 日志文件不可用，只输出到控制台: {}", e);
        let _ = logging::init(config.verbose_logging, None);
    }

    match App::new(config).run(mode).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ 运行失败: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
