//! Mapping between abstraction types and Gemini types

use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use crate::llm::core::{
    config::GenerationConfig,
    types::{
        ContentBlock, ContentBlockStart, ContentDelta, FinishReason, GenerateRequest, Message,
        MessageMetadata, MessageRole, PartialToolUse, StreamEvent, ToolDeclaration, UsageMetadata,
    },
};

use super::types::{
    Content, FunctionCall, FunctionDeclaration, FunctionResponse, GeminiGenerationConfig,
    GenerateContentRequest, GenerateContentResponse, Part, SystemInstruction, Tool,
};

/// Schema keywords the Gemini function-declaration schema does not accept
const UNSUPPORTED_SCHEMA_KEYS: &[&str] = &["$schema", "title", "format", "definitions", "$defs"];

/// Convert our abstraction request to Gemini's request format
pub fn to_gemini_request(request: GenerateRequest) -> GenerateContentRequest {
    // Gemini needs the function name on every response; remember it per call id.
    let mut tool_names: HashMap<String, String> = HashMap::new();
    let mut contents = Vec::with_capacity(request.messages.len());
    for message in request.messages {
        contents.push(to_gemini_content(message, &mut tool_names));
    }

    let tools = request
        .tools
        .filter(|tools| !tools.is_empty())
        .map(|tools| {
            vec![Tool {
                function_declarations: tools
                    .into_iter()
                    .map(to_gemini_function_declaration)
                    .collect(),
            }]
        });

    GenerateContentRequest {
        contents,
        system_instruction: request.system.map(|s| SystemInstruction {
            parts: vec![Part::Text { text: s }],
        }),
        tools,
        generation_config: Some(to_gemini_generation_config(request.config)),
    }
}

/// Convert a message to Gemini's content format
fn to_gemini_content(message: Message, tool_names: &mut HashMap<String, String>) -> Content {
    let role = match message.role {
        MessageRole::Assistant => "model",
        // Function responses travel in the user turn
        MessageRole::User | MessageRole::Tool => "user",
    };

    let parts = message
        .content
        .into_iter()
        .map(|block| to_gemini_part(block, tool_names))
        .collect();

    Content {
        role: role.to_string(),
        parts,
    }
}

/// Convert a content block to a Gemini part
fn to_gemini_part(block: ContentBlock, tool_names: &mut HashMap<String, String>) -> Part {
    match block {
        ContentBlock::Text { text } => Part::Text { text },
        ContentBlock::ToolUse { id, name, input } => {
            tool_names.insert(id, name.clone());
            Part::FunctionCall {
                function_call: FunctionCall { name, args: input },
            }
        }
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => {
            let response = if is_error {
                serde_json::json!({ "error": content })
            } else {
                match serde_json::from_str::<Value>(&content) {
                    Ok(value @ Value::Object(_)) => value,
                    Ok(other) => serde_json::json!({ "result": other }),
                    Err(_) => serde_json::json!({ "result": content }),
                }
            };

            let name = tool_names
                .get(&tool_use_id)
                .cloned()
                .unwrap_or_else(|| "function".to_string());

            Part::FunctionResponse {
                function_response: FunctionResponse { name, response },
            }
        }
    }
}

/// Convert a tool declaration to Gemini's function declaration
fn to_gemini_function_declaration(tool: ToolDeclaration) -> FunctionDeclaration {
    FunctionDeclaration {
        name: tool.name,
        description: tool.description,
        parameters: sanitize_schema(tool.input_schema),
    }
}

/// Reduce a JSON Schema document to the OpenAPI subset Gemini accepts.
///
/// Drops meta keywords and turns `["T", "null"]` type unions into
/// `type: T, nullable: true`.
pub fn sanitize_schema(schema: Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                if UNSUPPORTED_SCHEMA_KEYS.contains(&key.as_str()) {
                    continue;
                }
                if key == "type" {
                    if let Value::Array(types) = &value {
                        let concrete: Vec<&Value> =
                            types.iter().filter(|t| t.as_str() != Some("null")).collect();
                        if let Some(first) = concrete.first() {
                            out.insert("type".to_string(), (*first).clone());
                        }
                        if concrete.len() < types.len() {
                            out.insert("nullable".to_string(), Value::Bool(true));
                        }
                        continue;
                    }
                }
                out.insert(key, sanitize_schema(value));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_schema).collect()),
        other => other,
    }
}

/// Convert generation config to Gemini's format
fn to_gemini_generation_config(config: GenerationConfig) -> GeminiGenerationConfig {
    GeminiGenerationConfig {
        max_output_tokens: Some(config.max_tokens),
        temperature: config.temperature,
        top_p: config.top_p,
        top_k: config.top_k,
        stop_sequences: config.stop_sequences,
    }
}

/// Convert Gemini response to our abstraction's stream events
///
/// Text parts become deltas at the current index. Each function call becomes a
/// start/delta/end triplet and advances the index.
pub fn from_gemini_response(
    response: GenerateContentResponse,
    current_index: &mut usize,
) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    let Some(candidate) = response.candidates.first() else {
        return events;
    };

    for part in &candidate.content.parts {
        match part {
            Part::Text { text } => {
                events.push(StreamEvent::ContentDelta {
                    index: *current_index,
                    delta: ContentDelta::TextDelta { text: text.clone() },
                });
            }
            Part::FunctionCall { function_call } => {
                // Gemini does not assign call ids
                events.push(StreamEvent::ContentBlockStart {
                    index: *current_index,
                    block: ContentBlockStart::ToolUse {
                        id: Uuid::new_v4().to_string(),
                        name: function_call.name.clone(),
                    },
                });

                let args = if function_call.args.is_null() {
                    serde_json::json!({})
                } else {
                    function_call.args.clone()
                };
                events.push(StreamEvent::ContentDelta {
                    index: *current_index,
                    delta: ContentDelta::ToolUseDelta {
                        partial: PartialToolUse {
                            id: None,
                            name: Some(function_call.name.clone()),
                            partial_json: args.to_string(),
                        },
                    },
                });

                events.push(StreamEvent::ContentBlockEnd {
                    index: *current_index,
                });

                *current_index += 1;
            }
            Part::FunctionResponse { .. } => {}
        }
    }

    if let Some(finish_reason) = &candidate.finish_reason {
        let usage = response
            .usage_metadata
            .as_ref()
            .map(|usage| UsageMetadata {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            })
            .unwrap_or_default();

        events.push(StreamEvent::MessageEnd {
            finish_reason: map_finish_reason(finish_reason),
            usage,
        });
    }

    events
}

/// Map Gemini's finish reason to our abstraction
fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" => FinishReason::Safety,
        other => FinishReason::Other(other.to_string()),
    }
}

/// Helper to create initial message start event
pub fn create_message_start(message_id: String) -> StreamEvent {
    StreamEvent::MessageStart {
        message: MessageMetadata {
            id: message_id,
            role: MessageRole::Assistant,
            usage: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::gemini::types::Candidate;

    fn text_response(text: &str, finish: Option<&str>) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Content {
                    role: "model".to_string(),
                    parts: vec![Part::Text {
                        text: text.to_string(),
                    }],
                },
                finish_reason: finish.map(str::to_string),
            }],
            usage_metadata: None,
            model_version: None,
        }
    }

    #[test]
    fn test_roles_are_mapped() {
        let request = GenerateRequest {
            messages: vec![Message::user("Draft"), Message::assistant("Here it is")],
            tools: None,
            config: GenerationConfig::default(),
            system: Some("You are an editor".to_string()),
        };
        let gemini = to_gemini_request(request);
        assert_eq!(gemini.contents[0].role, "user");
        assert_eq!(gemini.contents[1].role, "model");
        assert!(gemini.system_instruction.is_some());
        assert!(gemini.tools.is_none());
    }

    #[test]
    fn test_function_response_uses_call_name() {
        let request = GenerateRequest {
            messages: vec![
                Message::user("Research solar power"),
                Message {
                    role: MessageRole::Assistant,
                    content: vec![ContentBlock::ToolUse {
                        id: "call-1".to_string(),
                        name: "web_search".to_string(),
                        input: serde_json::json!({"query": "solar power"}),
                    }],
                },
                Message::tool_result("call-1", r#"[{"title":"Solar"}]"#),
            ],
            tools: None,
            config: GenerationConfig::default(),
            system: None,
        };

        let gemini = to_gemini_request(request);
        match &gemini.contents[2].parts[0] {
            Part::FunctionResponse { function_response } => {
                assert_eq!(function_response.name, "web_search");
                // Arrays are wrapped; Gemini wants an object
                assert_eq!(function_response.response["result"][0]["title"], "Solar");
            }
            _ => panic!("Expected function response part"),
        }
        assert_eq!(gemini.contents[2].role, "user");
    }

    #[test]
    fn test_tool_error_becomes_error_object() {
        let mut names = HashMap::new();
        let part = to_gemini_part(
            ContentBlock::ToolResult {
                tool_use_id: "unknown".to_string(),
                content: "Tavily timed out".to_string(),
                is_error: true,
            },
            &mut names,
        );
        match part {
            Part::FunctionResponse { function_response } => {
                assert_eq!(function_response.name, "function");
                assert_eq!(function_response.response["error"], "Tavily timed out");
            }
            _ => panic!("Expected function response part"),
        }
    }

    #[test]
    fn test_sanitize_schema() {
        let schema = serde_json::json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "WebSearchArgs",
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search query"},
                "max_results": {"type": ["integer", "null"], "format": "uint8", "minimum": 0.0}
            },
            "required": ["query"]
        });

        let clean = sanitize_schema(schema);
        assert!(clean.get("$schema").is_none());
        assert!(clean.get("title").is_none());
        assert_eq!(clean["properties"]["query"]["description"], "Search query");
        let max = &clean["properties"]["max_results"];
        assert_eq!(max["type"], "integer");
        assert_eq!(max["nullable"], true);
        assert!(max.get("format").is_none());
        assert_eq!(clean["required"][0], "query");
    }

    #[test]
    fn test_empty_tool_list_is_omitted() {
        let request = GenerateRequest {
            messages: vec![Message::user("hi")],
            tools: Some(vec![]),
            config: GenerationConfig::default(),
            system: None,
        };
        assert!(to_gemini_request(request).tools.is_none());
    }

    #[test]
    fn test_map_finish_reason() {
        assert_eq!(map_finish_reason("STOP"), FinishReason::Stop);
        assert_eq!(map_finish_reason("MAX_TOKENS"), FinishReason::MaxTokens);
        assert_eq!(map_finish_reason("PROHIBITED_CONTENT"), FinishReason::Safety);
        assert_eq!(
            map_finish_reason("RECITATION"),
            FinishReason::Other("RECITATION".to_string())
        );
    }

    #[test]
    fn test_from_gemini_response_text_and_finish() {
        let mut response = text_response("Done", Some("STOP"));
        response.usage_metadata = Some(super::super::types::UsageMetadata {
            prompt_token_count: 10,
            candidates_token_count: 5,
            total_token_count: 15,
        });

        let mut index = 0;
        let events = from_gemini_response(response, &mut index);
        assert_eq!(events.len(), 2);
        match &events[1] {
            StreamEvent::MessageEnd {
                finish_reason,
                usage,
            } => {
                assert_eq!(*finish_reason, FinishReason::Stop);
                assert_eq!(usage.total_tokens, 15);
            }
            _ => panic!("Expected message end"),
        }
    }

    #[test]
    fn test_from_gemini_response_function_call() {
        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Content {
                    role: "model".to_string(),
                    parts: vec![Part::FunctionCall {
                        function_call: FunctionCall {
                            name: "web_search".to_string(),
                            args: Value::Null,
                        },
                    }],
                },
                finish_reason: None,
            }],
            usage_metadata: None,
            model_version: None,
        };

        let mut index = 0;
        let events = from_gemini_response(response, &mut index);
        assert_eq!(events.len(), 3);
        assert_eq!(index, 1);
        match &events[1] {
            StreamEvent::ContentDelta {
                delta: ContentDelta::ToolUseDelta { partial },
                ..
            } => assert_eq!(partial.partial_json, "{}"),
            _ => panic!("Expected tool use delta"),
        }
    }

    #[test]
    fn test_from_gemini_response_no_candidates() {
        let response = GenerateContentResponse {
            candidates: vec![],
            usage_metadata: None,
            model_version: None,
        };
        let mut index = 0;
        assert!(from_gemini_response(response, &mut index).is_empty());
    }
}
