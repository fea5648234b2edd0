//! # Mano Core
//!
//! Linked-document subsystem for the Mano case-management front end.
//!
//! Several unrelated entities (actions, consultations, treatments, persons) each own a list of
//! uploaded documents. They all present and mutate that list through one shared surface while
//! keeping their own persistence semantics:
//!
//! - [`entity`]: the entity kinds and the [`DocumentOwner`] accessor/mutator pair
//! - [`document`]: document records and the transient `linkedItem` annotation
//! - [`reconcile`]: pure full-array recomputation for point updates and deletes
//! - [`adapter`]: the generic per-entity adapter driving updates and refreshes
//! - [`router`]: person-level aggregation dispatching on `linkedItem`
//! - [`presentation`]: the surface configuration and callback contract
//!
//! **No transport concerns**: the REST client, the shared store refresh and the toast UI are
//! passed in as [`capabilities`].

pub mod adapter;
pub mod capabilities;
pub mod config;
pub mod constants;
pub mod document;
pub mod entity;
pub mod error;
pub mod presentation;
pub mod reconcile;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;

pub use adapter::LinkedDocumentsAdapter;
pub use capabilities::{Capabilities, EntityUpdater, ErrorNotifier, Refresher};
pub use config::{CoreConfig, MutationPolicy};
pub use document::{Document, DocumentKind, FileInfo, LinkedDocument, LinkedItem};
pub use entity::{Action, Consultation, DocumentOwner, EntityTypeTag, Person, Treatment};
pub use error::{BackendError, DocumentsError, DocumentsResult};
pub use presentation::{
    DocumentHandlers, KindProfile, PresentationSurface, SurfaceColor, SurfaceConfig,
};
pub use router::LinkedDocumentsRouter;

pub use mano_types::{DocumentId, EntityId, NonEmptyText};
