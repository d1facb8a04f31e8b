// Handlers module

pub mod content;
pub mod health;
pub mod index;
pub mod rejection;

pub use content::{create_content_handler, stream_content_handler};
pub use health::health_handler;
pub use index::index_handler;
pub use rejection::handle_rejection;
