//! Tool declaration helpers using JSON Schema generation

use schemars::{schema_for, JsonSchema};

use crate::llm::core::types::ToolDeclaration;

/// Create a tool declaration whose input schema is derived from `T`
///
/// Doc comments on the fields of `T` become parameter descriptions the model
/// sees. The Gemini mapper strips the schema keywords Gemini rejects.
///
/// ```ignore
/// #[derive(Deserialize, JsonSchema)]
/// struct WebSearchArgs {
///     /// What to look up
///     query: String,
/// }
///
/// let decl = create_tool_declaration::<WebSearchArgs>("web_search", "Search the web");
/// ```
pub fn create_tool_declaration<T: JsonSchema>(
    name: impl Into<String>,
    description: impl Into<String>,
) -> ToolDeclaration {
    let schema = schema_for!(T);
    ToolDeclaration {
        name: name.into(),
        description: description.into(),
        input_schema: serde_json::to_value(&schema).unwrap_or_default(),
    }
}
