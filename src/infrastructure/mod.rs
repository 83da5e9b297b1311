//! 基础设施层：跨 worker 共享的资源

pub mod rate_limiter;
pub mod shutdown;

pub use rate_limiter::RateLimiter;
pub use shutdown::ShutdownSignal;
