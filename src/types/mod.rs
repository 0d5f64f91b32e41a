pub mod chat;
pub mod completion;
pub mod embedding;
pub mod error;
pub mod usage;

pub use chat::{ChatChoice, ChatMessage, ChatRequest, ChatResponse};
pub use completion::{CompletionChoice, CompletionRequest, CompletionResponse};
pub use embedding::{EmbeddingData, EmbeddingRequest, EmbeddingResponse};
pub use error::{ErrorResponse, ServiceError};
pub use usage::Usage;
