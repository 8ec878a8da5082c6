#![allow(dead_code)]

use async_trait::async_trait;
use funcall::{
    Candidate, ChatHistory, CompletionRequest, CompletionResponse, CompletionService,
    FunctionCall, Tokenizer, Usage,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One token per whitespace-separated word.
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        text.split_whitespace().map(|w| w.len() as u32).collect()
    }
}

pub fn words(n: usize) -> String {
    vec!["w"; n].join(" ")
}

pub fn history(max_tokens: usize, functions: Vec<funcall::CallableFunction>) -> ChatHistory {
    ChatHistory::with_tokenizer("gpt-3.5-turbo", max_tokens, functions, Arc::new(WordTokenizer))
}

/// Replays canned responses and records every request it receives.
#[derive(Default)]
pub struct ScriptedService {
    responses: Mutex<VecDeque<anyhow::Result<CompletionResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedService {
    pub fn new(responses: Vec<anyhow::Result<CompletionResponse>>) -> Self {
        ScriptedService {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
    }
}

/// Always asks for the same function call.
pub struct LoopingService {
    pub call: FunctionCall,
    pub calls: Mutex<usize>,
}

#[async_trait]
impl CompletionService for LoopingService {
    async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        *self.calls.lock().unwrap() += 1;
        Ok(function_call(&self.call.name, &self.call.arguments))
    }
}

pub fn function_call(name: &str, arguments: &str) -> CompletionResponse {
    CompletionResponse {
        candidates: vec![Candidate::FunctionCall(FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        })],
        usage: Some(Usage {
            completion_tokens: 12,
            total_tokens: 80,
        }),
    }
}

pub fn content(text: &str, completion_tokens: usize, total_tokens: usize) -> CompletionResponse {
    CompletionResponse {
        candidates: vec![Candidate::Content(text.to_string())],
        usage: Some(Usage {
            completion_tokens,
            total_tokens,
        }),
    }
}
