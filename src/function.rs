use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::FunctionDefinition;
use crate::error::CompletionError;

/// What a function produced: text is appended to the history as-is, any
/// other value goes through the driver's stringifier first.
#[derive(Clone, Debug, PartialEq)]
pub enum FunctionOutput {
    Text(String),
    Value(Value),
}

impl FunctionOutput {
    fn from_serializable<R: Serialize>(value: R) -> anyhow::Result<Self> {
        Ok(match serde_json::to_value(value)? {
            Value::String(text) => FunctionOutput::Text(text),
            other => FunctionOutput::Value(other),
        })
    }
}

/// Turns a non-text function result into the text stored in the history.
pub type Stringifier = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Stringifier that renders values as compact JSON.
pub fn json_stringifier() -> Stringifier {
    Arc::new(|value: &Value| value.to_string())
}

type Invoker = Arc<dyn Fn(&str) -> Result<FunctionOutput, InvokeError> + Send + Sync>;

enum InvokeError {
    Validation(serde_json::Error),
    Failed(anyhow::Error),
}

/// A named capability exposed to the model.
///
/// The parameter schema is derived from the argument type. Arguments are
/// validated by deserializing into that same type before the body runs, so
/// the body never sees input that does not match the schema. The
/// `additionalProperties` clause is dropped from the advertised schema and
/// unknown keys are ignored during validation.
#[derive(Clone)]
pub struct CallableFunction {
    name: String,
    description: Option<String>,
    schema: RootSchema,
    invoker: Invoker,
}

impl CallableFunction {
    pub fn from_fn<A, R, F>(name: impl Into<String>, func: F) -> Self
    where
        A: DeserializeOwned + JsonSchema + 'static,
        R: Serialize + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::from_fallible_fn(name, move |args: A| Ok(func(args)))
    }

    pub fn from_fallible_fn<A, R, F>(name: impl Into<String>, func: F) -> Self
    where
        A: DeserializeOwned + JsonSchema + 'static,
        R: Serialize + 'static,
        F: Fn(A) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(move |arguments: &str| {
            let args: A = serde_json::from_str(arguments).map_err(InvokeError::Validation)?;
            let result = func(args).map_err(InvokeError::Failed)?;
            FunctionOutput::from_serializable(result).map_err(InvokeError::Failed)
        });

        CallableFunction {
            name: name.into(),
            description: None,
            schema: parameter_schema::<A>(),
            invoker,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn schema(&self) -> &RootSchema {
        &self.schema
    }

    pub fn definition(&self) -> FunctionDefinition {
        FunctionDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.schema.clone(),
        }
    }

    /// Validate `arguments` (raw JSON text) and run the function.
    pub fn call(&self, arguments: &str) -> Result<FunctionOutput, CompletionError> {
        (self.invoker)(arguments).map_err(|err| match err {
            InvokeError::Validation(source) => CompletionError::ArgumentValidationFailed {
                function: self.name.clone(),
                source,
            },
            InvokeError::Failed(source) => CompletionError::FunctionFailed {
                function: self.name.clone(),
                source,
            },
        })
    }
}

impl fmt::Debug for CallableFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableFunction")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

fn parameter_schema<A: JsonSchema>() -> RootSchema {
    let mut schema = schemars::schema_for!(A);
    if let Some(object) = schema.schema.object.as_mut() {
        object.additional_properties = None;
    }
    schema
}
