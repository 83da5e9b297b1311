//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和并发调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文件处理器
//! - 扫描输入目录，确定文件总数
//! - 控制并发数量（Semaphore + JoinSet）
//! - 汇总成功 / 失败 / 重试计数
//!
//! ### `task_processor` - 单个文件处理器
//! - 读取 → 分析 → 清洗 → 保存 → 入队
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PathBuf>)
//!     ↓
//! task_processor (处理单个文件)
//!     ↓
//! services (能力层：analyzer / sanitizer / artifact store)
//!     ↓
//! clients + infrastructure (TextGenerator / RateLimiter / ShutdownSignal)
//! ```

pub mod batch_processor;
pub mod task_processor;

pub use batch_processor::{BatchProcessor, BatchReport};
pub use task_processor::process_file;
