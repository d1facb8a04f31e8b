use std::convert::Infallible;

use warp::sse::Event;

use crate::pipeline::PipelineEvent;

/// SSE event named after the pipeline event's tag, with the JSON as data
pub fn pipeline_event(event: &PipelineEvent) -> Result<Event, Infallible> {
    let sse = match serde_json::to_string(event) {
        Ok(data) => Event::default().event(event.name()).data(data),
        Err(e) => {
            let payload = serde_json::json!({
                "type": "error",
                "message": format!("Failed to encode event: {}", e)
            });
            Event::default().event("error").data(payload.to_string())
        }
    };
    Ok(sse)
}
