pub mod llm_client;
pub mod web_client;

pub use llm_client::{GenerationRequest, LlmClient, TextGenerator};
pub use web_client::{PageFetcher, WebClient};
