//! Domain models with validation at construction
//!
//! Request bodies are decoded leniently into [`ContentRequest`] and only
//! become a [`NewContent`] after passing validation. Stores never see
//! unvalidated input.

pub mod validation;
pub mod status;
pub mod content;
pub mod envelope;

pub use validation::ValidationError;
pub use status::ContentStatus;
pub use content::{Content, ContentRequest, NewContent};
pub use envelope::{Message, MessageData};
