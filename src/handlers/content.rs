// POST /api/v1/content and /api/v1/content/stream handlers

use std::convert::Infallible;

use futures_util::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio::task::JoinHandle;
use tracing::{error, info};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;

use crate::models::{AppState, ErrorResponse};
use crate::pipeline::{ContentRequest, PipelineError};
use crate::sse::pipeline_event;

/// Run the pipeline and answer with the whole result
pub async fn create_content_handler(
    request: ContentRequest,
    state: AppState,
) -> Result<impl warp::Reply, Infallible> {
    info!(topic = %request.topic, "POST /api/v1/content");

    let reply = match state.pipeline.create_content(request, None).await {
        Ok(result) => warp::reply::with_status(warp::reply::json(&result), StatusCode::OK),
        Err(e) => error_reply(&e),
    };
    Ok(reply)
}

/// Run the pipeline in the background and stream its events as SSE
pub async fn stream_content_handler(
    request: ContentRequest,
    state: AppState,
) -> Result<Response, Infallible> {
    info!(topic = %request.topic, "POST /api/v1/content/stream");

    if let Err(e) = request.validate() {
        return Ok(error_reply(&e).into_response());
    }

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let pipeline = state.pipeline.clone();
    let task = AbortOnDrop(tokio::spawn(async move {
        // Failures were already sent as an `error` event
        match pipeline.create_content(request, Some(tx)).await {
            Ok(_) => {}
            Err(PipelineError::Cancelled) => info!("client disconnected, generation stopped"),
            Err(e) => error!(error = %e, "streamed content generation failed"),
        }
    }));

    // The stream owns the task, so a disconnect aborts the pipeline
    let events = UnboundedReceiverStream::new(rx).map(move |event| {
        let _ = &task;
        pipeline_event(&event)
    });
    Ok(warp::sse::reply(warp::sse::keep_alive().stream(events)).into_response())
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn error_reply(e: &PipelineError) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = match e {
        PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        PipelineError::Llm(_) | PipelineError::Search(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    };
    warp::reply::with_status(warp::reply::json(&ErrorResponse::new(e.to_string())), status)
}
