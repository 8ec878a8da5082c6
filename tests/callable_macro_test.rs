use funcall::{CompletionError, FunctionOutput, callable};
use pretty_assertions::assert_eq;

/// Generate a password of a given length
#[callable]
fn generate_password(len: usize) -> String {
    "a".repeat(len)
}

/// Parse a port number.
///
/// Fails when the text is not a number.
#[callable]
fn parse_port(text: String) -> Result<u16, std::num::ParseIntError> {
    text.trim().parse()
}

#[callable]
fn sum(values: Vec<i64>, offset: Option<i64>) -> i64 {
    values.iter().sum::<i64>() + offset.unwrap_or(0)
}

#[test]
fn test_function_stays_callable_directly() {
    assert_eq!(generate_password(3), "aaa");
    assert_eq!(sum(vec![1, 2], Some(3)), 6);
}

#[test]
fn test_name_and_description_from_doc_comment() {
    let function = GeneratePasswordArgs::callable();
    assert_eq!(function.name(), "generate_password");
    assert_eq!(
        function.description(),
        Some("Generate a password of a given length")
    );
}

#[test]
fn test_multi_paragraph_doc_is_joined() {
    let function = ParsePortArgs::callable();
    assert_eq!(
        function.description(),
        Some("Parse a port number. Fails when the text is not a number.")
    );
}

#[test]
fn test_undocumented_function_has_no_description() {
    assert_eq!(SumArgs::callable().description(), None);
}

#[test]
fn test_schema_lists_parameters() {
    let function = GeneratePasswordArgs::callable();
    let object = function.schema().schema.object.as_ref().unwrap();
    assert!(object.properties.contains_key("len"));
    assert!(object.required.contains("len"));
    assert!(object.additional_properties.is_none());

    let function = SumArgs::callable();
    let object = function.schema().schema.object.as_ref().unwrap();
    assert!(object.required.contains("values"));
    assert!(!object.required.contains("offset"));
}

#[test]
fn test_call_through_generated_wrapper() {
    let output = GeneratePasswordArgs::callable().call(r#"{"len": 5}"#).unwrap();
    assert_eq!(output, FunctionOutput::Text("aaaaa".to_string()));

    let output = SumArgs::callable().call(r#"{"values": [1, 2, 3]}"#).unwrap();
    assert_eq!(output, FunctionOutput::Value(serde_json::json!(6)));
}

#[test]
fn test_fallible_function_errors_are_reported() {
    let function = ParsePortArgs::callable();
    assert_eq!(
        function.call(r#"{"text": " 8080 "}"#).unwrap(),
        FunctionOutput::Value(serde_json::json!(8080))
    );

    let err = function.call(r#"{"text": "http"}"#).unwrap_err();
    assert!(matches!(
        err,
        CompletionError::FunctionFailed { ref function, .. } if function == "parse_port"
    ));
}

#[test]
fn test_wrong_argument_type_is_rejected() {
    let err = GeneratePasswordArgs::callable()
        .call(r#"{"len": -1}"#)
        .unwrap_err();
    assert!(matches!(err, CompletionError::ArgumentValidationFailed { .. }));
}
