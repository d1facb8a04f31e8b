//! Tests for model parsing and the cascade factory

use content_crew::llm::{create_provider, GeminiModel, LlmError};
use std::str::FromStr;

#[test]
fn test_model_ids() {
    assert_eq!(GeminiModel::Gemini25Flash.as_str(), "gemini-2.5-flash");
    assert_eq!(GeminiModel::Gemini25Pro.as_str(), "gemini-2.5-pro");
    assert_eq!(GeminiModel::Gemini20Pro.as_str(), "gemini-2.0-pro");
    assert_eq!(GeminiModel::Gemini20Flash.as_str(), "gemini-2.0-flash");
}

#[test]
fn test_default_cascade_order() {
    let ids: Vec<String> = GeminiModel::default_cascade()
        .iter()
        .map(|m| m.to_string())
        .collect();
    assert_eq!(ids, vec!["gemini-2.5-flash", "gemini-2.0-pro", "gemini-2.0-flash"]);
}

#[test]
fn test_parse_models() {
    assert_eq!(
        GeminiModel::from_str("models/gemini-2.0-flash").unwrap(),
        GeminiModel::Gemini20Flash
    );
    assert_eq!(
        GeminiModel::from_str("gemini-exp-1206").unwrap(),
        GeminiModel::Custom("gemini-exp-1206".to_string())
    );
    assert!(GeminiModel::from_str("  ").is_err());
}

#[test]
fn test_create_provider_builds_cascade() {
    let provider = create_provider("test-key", &GeminiModel::default_cascade(), None).unwrap();
    assert_eq!(
        provider.model_name(),
        "gemini-2.5-flash -> gemini-2.0-pro -> gemini-2.0-flash"
    );
}

#[test]
fn test_create_provider_requires_models_and_key() {
    assert!(matches!(
        create_provider("test-key", &[], None),
        Err(LlmError::InvalidRequest(_))
    ));
    assert!(matches!(
        create_provider("", &[GeminiModel::Gemini20Flash], None),
        Err(LlmError::AuthenticationError(_))
    ));
}
