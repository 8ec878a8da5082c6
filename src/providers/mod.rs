pub(crate) mod openai;

pub use openai::OpenAICompletionService;
