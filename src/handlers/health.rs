// GET /api/v1/health handler

use std::convert::Infallible;

use crate::models::{AppState, HealthResponse};

pub async fn health_handler(state: AppState) -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&HealthResponse::from_state(&state)))
}
