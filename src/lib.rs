//! Token-budgeted chat history and a function-calling completion loop.
//!
//! A [`ChatHistory`] holds the ordered conversation, the functions the model
//! may call and the token accounting. A [`CompletionDriver`] sends the
//! history to a [`CompletionService`], runs any function the model asks for,
//! feeds the result back, and returns the final assistant message.

pub mod api;
mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod function;
pub mod history;
pub mod providers;
pub mod tokenizer;
mod traffic_log;

pub use api::*;
pub use completion::{CompletionDriver, CompletionService, DEFAULT_MAX_FUNCTION_HOPS, DriverConfig};
pub use error::{CompletionError, ConfigError, HistoryError, TokenizerError};
pub use function::{CallableFunction, FunctionOutput, Stringifier, json_stringifier};
pub use funcall_macros::callable;
pub use history::ChatHistory;
pub use providers::OpenAICompletionService;
pub use tokenizer::{TiktokenTokenizer, Tokenizer};
