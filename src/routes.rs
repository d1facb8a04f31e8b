// Route definitions and handlers

use std::convert::Infallible;

use crate::handlers;
use crate::models::AppState;
use crate::pipeline::ContentRequest;
use warp::Filter;

/// Largest accepted JSON body
const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn configure_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    let api = warp::path("api").and(warp::path("v1"));

    // GET /
    let index = warp::path::end()
        .and(warp::get())
        .map(handlers::index_handler);

    // GET /api/v1/health
    let health = api
        .and(warp::path("health"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::health_handler);

    // POST /api/v1/content
    let create_content = api
        .and(warp::path("content"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::create_content_handler);

    // POST /api/v1/content/stream
    let stream_content = api
        .and(warp::path("content"))
        .and(warp::path("stream"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state))
        .and_then(handlers::stream_content_handler);

    index
        .or(health)
        .or(create_content)
        .or(stream_content)
        .recover(handlers::handle_rejection)
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body() -> impl Filter<Extract = (ContentRequest,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}
