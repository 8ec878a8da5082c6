//! Token-budgeted conversation history.
//!
//! `ChatHistory` keeps messages in conversational order and guarantees that
//! `total_tokens() + token_bias() <= max_tokens()` after every successful
//! mutation. When an addition needs room, ephemeral messages are evicted
//! oldest first. Evictions and the append happen together or not at all.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::{FunctionDefinition, Message, Role};
use crate::error::{HistoryError, TokenizerError};
use crate::function::CallableFunction;
use crate::tokenizer::{TiktokenTokenizer, Tokenizer};

pub struct ChatHistory {
    model: String,
    max_tokens: usize,
    token_bias: i64,
    messages: Vec<Message>,
    functions: BTreeMap<String, CallableFunction>,
    tokenizer: Arc<dyn Tokenizer>,
    last_reported_total_tokens: Option<usize>,
}

impl ChatHistory {
    /// Create a history whose tokenizer is selected from `model`.
    ///
    /// When two functions share a name the one registered last wins.
    pub fn new(
        model: impl Into<String>,
        max_tokens: usize,
        functions: impl IntoIterator<Item = CallableFunction>,
    ) -> Result<Self, TokenizerError> {
        let model = model.into();
        let tokenizer = Arc::new(TiktokenTokenizer::for_model(&model)?);
        Ok(Self::with_tokenizer(model, max_tokens, functions, tokenizer))
    }

    pub fn with_tokenizer(
        model: impl Into<String>,
        max_tokens: usize,
        functions: impl IntoIterator<Item = CallableFunction>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Self {
        let functions = functions
            .into_iter()
            .map(|function| (function.name().to_string(), function))
            .collect();

        ChatHistory {
            model: model.into(),
            max_tokens,
            token_bias: 0,
            messages: Vec::new(),
            functions,
            tokenizer,
            last_reported_total_tokens: None,
        }
    }

    /// Append a message with `role`.
    ///
    /// Unless `ephemeral` is given, system messages are protected from
    /// eviction and every other role is evictable.
    pub fn add_message(
        &mut self,
        role: Role,
        text: &str,
        ephemeral: Option<bool>,
    ) -> Result<(), HistoryError> {
        let content = text.trim();
        let token_count = self.tokenizer.count(content);
        let ephemeral = ephemeral.unwrap_or(role != Role::System);
        self.push(Message::new(role, content, token_count, ephemeral))
    }

    /// Append a message produced by the remote service, verbatim.
    ///
    /// `total_tokens` is the service's own usage figure. It is recorded for
    /// callers that reconcile it through [`update_token_bias`](Self::update_token_bias)
    /// but plays no part in admission.
    pub fn add_response_message(
        &mut self,
        message: Message,
        total_tokens: usize,
    ) -> Result<(), HistoryError> {
        self.push(message)?;
        self.last_reported_total_tokens = Some(total_tokens);
        Ok(())
    }

    pub fn add_function_result(
        &mut self,
        function_name: &str,
        result: &str,
    ) -> Result<(), HistoryError> {
        let content = result.trim();
        let token_count = self.tokenizer.count(content);
        self.push(Message::function_result(function_name, content, token_count))
    }

    /// Reconcile local accounting with an authoritative token count, such as
    /// the usage reported by the remote service.
    pub fn update_token_bias(&mut self, bias: i64) {
        self.token_bias = bias - self.total_tokens() as i64;
    }

    pub fn total_tokens(&self) -> usize {
        self.messages.iter().map(Message::token_count).sum()
    }

    /// May be negative right after a bias update, until the next addition trims.
    pub fn tokens_left(&self) -> i64 {
        self.max_tokens as i64 - (self.total_tokens() as i64 + self.token_bias)
    }

    pub fn get_functions(&self) -> impl Iterator<Item = &CallableFunction> {
        self.functions.values()
    }

    pub fn get_function(&self, name: &str) -> Option<&CallableFunction> {
        self.functions.get(name)
    }

    pub fn function_definitions(&self) -> Vec<FunctionDefinition> {
        self.functions.values().map(CallableFunction::definition).collect()
    }

    pub fn has_functions(&self) -> bool {
        !self.functions.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn token_bias(&self) -> i64 {
        self.token_bias
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// Usage total from the most recent response message, if any.
    pub fn last_reported_total_tokens(&self) -> Option<usize> {
        self.last_reported_total_tokens
    }

    fn push(&mut self, message: Message) -> Result<(), HistoryError> {
        self.trim_history(message.token_count())?;
        self.messages.push(message);
        Ok(())
    }

    /// Make room for `required` tokens by evicting ephemeral messages oldest
    /// first. If evicting every ephemeral message would still not be enough,
    /// nothing is evicted.
    fn trim_history(&mut self, required: usize) -> Result<(), HistoryError> {
        let needed = required as i64;
        let mut available = self.tokens_left();
        if available >= needed {
            return Ok(());
        }

        let mut evict = Vec::new();
        for (index, message) in self.messages.iter().enumerate() {
            if !message.is_ephemeral() {
                continue;
            }
            evict.push(index);
            available += message.token_count() as i64;
            if available >= needed {
                break;
            }
        }

        if available < needed {
            tracing::warn!(
                required,
                available = self.tokens_left(),
                model = %self.model,
                "chat history budget exhausted"
            );
            return Err(HistoryError::BudgetExhausted {
                required,
                available: self.tokens_left(),
            });
        }

        // Indices are ascending, so removing from the back keeps them valid.
        for &index in evict.iter().rev() {
            self.messages.remove(index);
        }

        tracing::debug!(
            evicted = evict.len(),
            tokens_left = self.tokens_left(),
            "evicted ephemeral messages"
        );
        Ok(())
    }
}
