pub mod fallback;
pub mod model_client;
pub mod orchestrator;
pub mod prompt;

pub use fallback::FallbackController;
pub use model_client::{ChatModel, ChatStream, HttpModelClient, StreamEvent};
pub use orchestrator::{Orchestrator, TurnStream};
