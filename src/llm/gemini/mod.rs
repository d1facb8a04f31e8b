//! Gemini provider implementation
//!
//! Client for Google's Gemini models on the Developer API (API-key auth),
//! implementing the LlmProvider trait.

pub mod client;
pub mod mapper;
pub mod sse;
pub mod types;

pub use client::{GeminiClient, GeminiModel, DEFAULT_BASE_URL};
