//! Validated value types shared across the Mano crates.
//!
//! - [`NonEmptyText`] for document and folder names
//! - [`EntityId`] and [`DocumentId`] for backend record identifiers (`_id`)

mod ids;
mod text;

pub use ids::{DocumentId, EntityId, IdError, MAX_ID_LEN};
pub use text::{NonEmptyText, TextError, MAX_NAME_CHARS};
