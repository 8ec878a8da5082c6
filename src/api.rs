use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Assistant,
    User,
    Function,
}

/// One entry of the conversation history.
///
/// Messages are immutable once stored. The token count is computed a single
/// time when the message enters the history and is never recomputed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Chat {
        role: Role,
        content: String,
        token_count: usize,
        ephemeral: bool,
    },
    /// Stringified result of a function the model asked for.
    FunctionResult {
        name: String,
        content: String,
        token_count: usize,
    },
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, token_count: usize, ephemeral: bool) -> Self {
        Message::Chat {
            role,
            content: content.into(),
            token_count,
            ephemeral,
        }
    }

    /// Assistant answers are evictable like any other non-system turn.
    pub fn assistant(content: impl Into<String>, token_count: usize) -> Self {
        Self::new(Role::Assistant, content, token_count, true)
    }

    pub fn function_result(
        name: impl Into<String>,
        content: impl Into<String>,
        token_count: usize,
    ) -> Self {
        Message::FunctionResult {
            name: name.into(),
            content: content.into(),
            token_count,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::Chat { role, .. } => *role,
            Message::FunctionResult { .. } => Role::Function,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::Chat { content, .. } | Message::FunctionResult { content, .. } => content,
        }
    }

    pub fn token_count(&self) -> usize {
        match self {
            Message::Chat { token_count, .. } | Message::FunctionResult { token_count, .. } => {
                *token_count
            }
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        match self {
            Message::Chat { ephemeral, .. } => *ephemeral,
            Message::FunctionResult { .. } => true,
        }
    }

    /// Name of the function whose result this is, if any.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Message::Chat { .. } => None,
            Message::FunctionResult { name, .. } => Some(name),
        }
    }
}

/// Declaration of a function as it is advertised to the model.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: Option<String>,
    pub parameters: schemars::schema::RootSchema,
}

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionCallMode {
    Auto,
    None,
}

/// Sampling parameters forwarded verbatim to the remote service.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CompletionOptions {
    /// `None` resolves to `auto` when functions are declared, `none` otherwise.
    pub function_call: Option<FunctionCallMode>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        CompletionOptions {
            function_call: None,
            max_tokens: 1024,
            temperature: 0.9,
            top_p: 1.0,
            n: 1,
        }
    }
}

/// Provider-neutral completion request built from a history snapshot.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub functions: Vec<FunctionDefinition>,
    pub function_call: FunctionCallMode,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
}

impl CompletionRequest {
    pub fn new<'a>(
        model: impl Into<String>,
        messages: impl IntoIterator<Item = &'a Message>,
        functions: Vec<FunctionDefinition>,
        options: &CompletionOptions,
    ) -> Self {
        let function_call = options.function_call.unwrap_or(if functions.is_empty() {
            FunctionCallMode::None
        } else {
            FunctionCallMode::Auto
        });

        CompletionRequest {
            model: model.into(),
            messages: messages.into_iter().cloned().collect(),
            functions,
            function_call,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            n: options.n,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    /// Raw JSON text exactly as produced by the model.
    pub arguments: String,
}

/// One alternative completion returned by the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Candidate {
    Content(String),
    FunctionCall(FunctionCall),
}

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Usage {
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionResponse {
    pub candidates: Vec<Candidate>,
    pub usage: Option<Usage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_result_is_always_ephemeral_function_role() {
        let msg = Message::function_result("lookup", "42", 1);
        assert_eq!(msg.role(), Role::Function);
        assert!(msg.is_ephemeral());
        assert_eq!(msg.function_name(), Some("lookup"));
        assert_eq!(msg.content(), "42");
    }

    #[test]
    fn test_chat_message_has_no_function_name() {
        let msg = Message::new(Role::System, "be brief", 2, false);
        assert_eq!(msg.function_name(), None);
        assert!(!msg.is_ephemeral());
        assert_eq!(msg.token_count(), 2);
    }

    #[test]
    fn test_request_defaults_function_call_mode() {
        let options = CompletionOptions::default();
        let request = CompletionRequest::new("gpt-4o", std::iter::empty::<&Message>(), vec![], &options);
        assert_eq!(request.function_call, FunctionCallMode::None);
        assert_eq!(request.max_tokens, 1024);
        assert_eq!(request.n, 1);
    }

    #[test]
    fn test_request_respects_explicit_mode() {
        let options = CompletionOptions {
            function_call: Some(FunctionCallMode::Auto),
            ..Default::default()
        };
        let request = CompletionRequest::new("gpt-4o", std::iter::empty::<&Message>(), vec![], &options);
        assert_eq!(request.function_call, FunctionCallMode::Auto);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Function).unwrap(), "\"function\"");
        assert_eq!(serde_json::to_string(&FunctionCallMode::None).unwrap(), "\"none\"");
    }
}
