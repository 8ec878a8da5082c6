use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

use crate::api::{Candidate, CompletionOptions, CompletionRequest, CompletionResponse, Message};
use crate::error::CompletionError;
use crate::function::{FunctionOutput, Stringifier};
use crate::history::ChatHistory;

pub const DEFAULT_MAX_FUNCTION_HOPS: usize = 16;

/// Remote chat-completion endpoint.
#[async_trait]
pub trait CompletionService {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;
}

#[async_trait]
impl<T> CompletionService for Arc<T>
where
    T: CompletionService + Send + Sync + ?Sized,
{
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        (**self).complete(request).await
    }
}

/// Settings the driver is built with.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DriverConfig {
    /// Function calls allowed per `get_completion` before giving up.
    /// `None` removes the limit.
    pub max_function_hops: Option<usize>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            max_function_hops: Some(DEFAULT_MAX_FUNCTION_HOPS),
        }
    }
}

/// Runs the request/response loop against a [`CompletionService`],
/// executing any function the model asks for until it produces a final answer.
///
/// # Example
///
/// ```ignore
/// let driver = CompletionDriver::new(service, DriverConfig::default())
///     .with_stringifier(json_stringifier());
///
/// history.add_message(Role::User, "Generate a password of length 16", None)?;
/// let answer = driver.get_completion(&mut history, &CompletionOptions::default()).await?;
/// ```
pub struct CompletionDriver<S> {
    service: S,
    config: DriverConfig,
    stringifier: Option<Stringifier>,
}

impl<S> CompletionDriver<S>
where
    S: CompletionService + Send + Sync,
{
    pub fn new(service: S, config: DriverConfig) -> Self {
        CompletionDriver {
            service,
            config,
            stringifier: None,
        }
    }

    /// Hook used when a function returns something other than text.
    pub fn with_stringifier(mut self, stringifier: Stringifier) -> Self {
        self.stringifier = Some(stringifier);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Ask the model, taking the first candidate of every response.
    pub async fn get_completion(
        &self,
        history: &mut ChatHistory,
        options: &CompletionOptions,
    ) -> Result<Message, CompletionError> {
        self.get_completion_with(history, |candidates| candidates.first(), options)
            .await
    }

    /// Ask the model, using `selector` to pick among the candidates of each response.
    ///
    /// The history is only touched after a response has been received and
    /// parsed: function results are appended as they are produced and the
    /// final assistant message is appended before it is returned.
    #[instrument(level = "debug", skip_all, fields(model = %history.model()))]
    pub async fn get_completion_with<F>(
        &self,
        history: &mut ChatHistory,
        selector: F,
        options: &CompletionOptions,
    ) -> Result<Message, CompletionError>
    where
        F: Fn(&[Candidate]) -> Option<&Candidate> + Send + Sync,
    {
        let mut hops = 0usize;

        loop {
            let request = CompletionRequest::new(
                history.model(),
                history.messages(),
                history.function_definitions(),
                options,
            );

            let response = self
                .service
                .complete(&request)
                .await
                .map_err(CompletionError::RemoteServiceFailure)?;

            let candidate = selector(&response.candidates).ok_or(CompletionError::NoCandidate)?;

            match candidate {
                Candidate::FunctionCall(call) => {
                    if let Some(limit) = self.config.max_function_hops {
                        if hops >= limit {
                            tracing::warn!(limit, function = %call.name, "function call limit reached");
                            return Err(CompletionError::RecursionLimitExceeded(limit));
                        }
                    }
                    hops += 1;

                    let function = history
                        .get_function(&call.name)
                        .ok_or_else(|| CompletionError::UnknownFunction(call.name.clone()))?;
                    let output = function.call(&call.arguments)?;
                    let text = self.stringify(&call.name, output)?;

                    tracing::info!(hop = hops, function = %call.name, "function call resolved");
                    history.add_function_result(&call.name, &text)?;
                }
                Candidate::Content(content) => {
                    let token_count = match response.usage {
                        // Usage covers every candidate, so it only describes
                        // the chosen one when there is exactly one.
                        Some(usage) if response.candidates.len() == 1 => usage.completion_tokens,
                        _ => history.tokenizer().count(content),
                    };
                    let total_tokens = response.usage.map_or(0, |usage| usage.total_tokens);

                    let message = Message::assistant(content.clone(), token_count);
                    history.add_response_message(message.clone(), total_tokens)?;
                    return Ok(message);
                }
            }
        }
    }

    fn stringify(&self, function: &str, output: FunctionOutput) -> Result<String, CompletionError> {
        match output {
            FunctionOutput::Text(text) => Ok(text),
            FunctionOutput::Value(value) => match &self.stringifier {
                Some(stringify) => Ok(stringify(&value)),
                None => Err(CompletionError::MissingStringifier(function.to_string())),
            },
        }
    }
}

impl<S> fmt::Debug for CompletionDriver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionDriver")
            .field("config", &self.config)
            .field("stringifier", &self.stringifier.is_some())
            .finish_non_exhaustive()
    }
}
