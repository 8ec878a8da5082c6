use crate::api::{
    Candidate, CompletionRequest, CompletionResponse, FunctionCall, FunctionCallMode,
    FunctionDefinition, Role,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl From<&crate::api::Message> for Message {
    fn from(msg: &crate::api::Message) -> Self {
        Message {
            role: msg.role(),
            content: Some(msg.content().to_string()),
            name: msg.function_name().map(str::to_string),
            function_call: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Function {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: serde_json::Value,
}

impl TryFrom<&FunctionDefinition> for Function {
    type Error = serde_json::Error;

    fn try_from(def: &FunctionDefinition) -> Result<Self, Self::Error> {
        Ok(Function {
            name: def.name.clone(),
            description: def.description.clone(),
            parameters: serde_json::to_value(&def.parameters)?,
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// The API rejects an empty `functions` array, so both function fields
    /// are left out when nothing is declared.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub functions: Vec<Function>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallMode>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
    pub stream: bool,
}

impl ChatCompletionRequest {
    pub fn from_request(request: &CompletionRequest) -> Result<Self, serde_json::Error> {
        let functions = request
            .functions
            .iter()
            .map(Function::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let function_call = if functions.is_empty() {
            None
        } else {
            Some(request.function_call)
        };

        Ok(ChatCompletionRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(|m| m.into()).collect(),
            functions,
            function_call,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            n: request.n,
            stream: false,
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatCompletionChoice {
    #[serde(default)]
    pub index: u32,
    pub message: Message,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CompletionUsage {
    #[serde(default)]
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    pub usage: Option<CompletionUsage>,
}

impl From<ChatCompletionResponse> for CompletionResponse {
    fn from(response: ChatCompletionResponse) -> Self {
        let candidates = response
            .choices
            .into_iter()
            .map(|choice| match choice.message.function_call {
                Some(call) => Candidate::FunctionCall(call),
                None => Candidate::Content(choice.message.content.unwrap_or_default()),
            })
            .collect();

        CompletionResponse {
            candidates,
            usage: response.usage.map(|usage| crate::api::Usage {
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            }),
        }
    }
}
