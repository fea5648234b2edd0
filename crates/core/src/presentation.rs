//! Contract with the document presentation surface.
//!
//! The surface renders a [`SurfaceConfig`] and never mutates state itself: every change goes
//! back through the [`DocumentHandlers`] it was given.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mano_types::{DocumentId, EntityId, NonEmptyText};

use crate::config::CoreConfig;
use crate::constants::{DEFAULT_DOCUMENTS_TITLE, DEFAULT_FOLDER_ID_PREFIX};
use crate::document::{Document, LinkedDocument, LinkedItem};
use crate::entity::EntityTypeTag;
use crate::error::{DocumentsError, DocumentsResult};

/// Callbacks the surface invokes on user edits.
#[async_trait]
pub trait DocumentHandlers: Send + Sync {
    /// Owner identity the handled documents are tagged with.
    fn linked_item(&self) -> LinkedItem;

    /// Documents as currently projected for display.
    fn documents(&self) -> Arc<[LinkedDocument]>;

    /// Full replace of the owner's document list.
    async fn save_documents(&self, documents: Vec<LinkedDocument>) -> DocumentsResult<()>;

    async fn update_document(&self, document: LinkedDocument) -> DocumentsResult<()>;

    /// Returns whether the surface may drop the row locally.
    async fn delete_document(&self, document: LinkedDocument) -> bool;

    /// `onUpdateFolder`: replaces the folder record, typically after a rename.
    async fn update_folder(&self, folder: LinkedDocument) -> DocumentsResult<()>;

    /// `onDeleteFolder`: removes the folder and moves its children to the root.
    async fn delete_folder(&self, folder: LinkedDocument) -> bool;
}

/// The external renderer.
pub trait PresentationSurface {
    fn render(&self, config: &SurfaceConfig);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceColor {
    Main,
    Blue900,
}

impl SurfaceColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceColor::Main => "main",
            SurfaceColor::Blue900 => "blue-900",
        }
    }
}

/// Per-kind presentation data.
///
/// The folder policy is fixed by the kind: only a person's documents support folders.
#[derive(Debug, Clone)]
pub struct KindProfile {
    kind: EntityTypeTag,
    title: String,
    color: SurfaceColor,
    supports_folders: bool,
    default_folders: Vec<Document>,
    read_only_folders: Vec<Document>,
    can_toggle_group_check: bool,
    show_full_screen: bool,
    is_inside_modal: bool,
}

impl KindProfile {
    pub fn for_kind(kind: EntityTypeTag, config: &CoreConfig) -> Self {
        let color = match kind {
            EntityTypeTag::Treatment => SurfaceColor::Blue900,
            EntityTypeTag::Action | EntityTypeTag::Consultation | EntityTypeTag::Person => {
                SurfaceColor::Main
            }
        };
        let is_person = kind == EntityTypeTag::Person;
        let default_folders = if is_person {
            config
                .person_default_folders()
                .iter()
                .filter_map(default_folder)
                .collect()
        } else {
            Vec::new()
        };

        Self {
            kind,
            title: DEFAULT_DOCUMENTS_TITLE.to_owned(),
            color,
            supports_folders: is_person,
            default_folders,
            read_only_folders: Vec::new(),
            can_toggle_group_check: false,
            show_full_screen: is_person,
            is_inside_modal: !is_person,
        }
    }

    /// Enables the "share with family" checkbox, for a person belonging to a group.
    pub fn group_check(mut self, can_toggle_group_check: bool) -> Self {
        self.can_toggle_group_check = can_toggle_group_check;
        self
    }

    /// Folders rendered first that can be neither moved nor deleted.
    pub fn with_read_only_folders(mut self, folders: Vec<Document>) -> Self {
        self.read_only_folders = folders;
        self
    }

    /// Builds the surface configuration for `documents` owned by `linked_item`.
    pub fn surface_config(
        &self,
        documents: Arc<[LinkedDocument]>,
        linked_item: LinkedItem,
        person_id: Option<EntityId>,
        handlers: Arc<dyn DocumentHandlers>,
    ) -> DocumentsResult<SurfaceConfig> {
        if linked_item.kind != self.kind {
            return Err(DocumentsError::InvalidInput(format!(
                "{} profile cannot present {} documents",
                self.kind, linked_item.kind
            )));
        }

        Ok(SurfaceConfig {
            documents,
            linked_item,
            person_id,
            supports_folders: self.supports_folders,
            default_folders: self.default_folders.clone(),
            read_only_folders: self.read_only_folders.clone(),
            can_toggle_group_check: self.can_toggle_group_check,
            title: self.title.clone(),
            color: self.color,
            show_full_screen: self.show_full_screen,
            is_inside_modal: self.is_inside_modal,
            hide_linked_item_type: self.kind,
            handlers,
        })
    }
}

fn default_folder(name: &NonEmptyText) -> Option<Document> {
    let slug: String = name
        .as_str()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let id = DocumentId::parse(&format!("{DEFAULT_FOLDER_ID_PREFIX}{slug}")).ok()?;
    Some(Document::folder(id, name.as_str()))
}

/// Declarative configuration handed to the presentation surface.
#[derive(Clone)]
pub struct SurfaceConfig {
    pub documents: Arc<[LinkedDocument]>,
    pub linked_item: LinkedItem,
    pub person_id: Option<EntityId>,
    pub supports_folders: bool,
    pub default_folders: Vec<Document>,
    pub read_only_folders: Vec<Document>,
    pub can_toggle_group_check: bool,
    pub title: String,
    pub color: SurfaceColor,
    pub show_full_screen: bool,
    pub is_inside_modal: bool,
    /// Kind whose "open entity" affordance is suppressed, to avoid linking back to itself.
    pub hide_linked_item_type: EntityTypeTag,
    pub handlers: Arc<dyn DocumentHandlers>,
}

impl fmt::Debug for SurfaceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceConfig")
            .field("documents", &self.documents.len())
            .field("linked_item", &self.linked_item)
            .field("person_id", &self.person_id)
            .field("supports_folders", &self.supports_folders)
            .field("default_folders", &self.default_folders.len())
            .field("read_only_folders", &self.read_only_folders.len())
            .field("can_toggle_group_check", &self.can_toggle_group_check)
            .field("title", &self.title)
            .field("color", &self.color)
            .field("show_full_screen", &self.show_full_screen)
            .field("is_inside_modal", &self.is_inside_modal)
            .field("hide_linked_item_type", &self.hide_linked_item_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_folders_from_env_value, MutationPolicy};
    use crate::document::DocumentKind;

    #[test]
    fn test_entity_kinds_never_support_folders() {
        let config = CoreConfig::new(
            MutationPolicy::Concurrent,
            "x".into(),
            default_folders_from_env_value(Some("Santé".into())),
        )
        .unwrap();

        for kind in [
            EntityTypeTag::Action,
            EntityTypeTag::Consultation,
            EntityTypeTag::Treatment,
        ] {
            let profile = KindProfile::for_kind(kind, &config);
            assert!(!profile.supports_folders);
            assert!(profile.default_folders.is_empty());
            assert!(profile.read_only_folders.is_empty());
        }
    }

    #[test]
    fn test_person_profile_builds_default_folders() {
        let config = CoreConfig::new(
            MutationPolicy::Concurrent,
            "x".into(),
            default_folders_from_env_value(Some("Dossier médical, Logement".into())),
        )
        .unwrap();
        let profile = KindProfile::for_kind(EntityTypeTag::Person, &config);

        assert!(profile.supports_folders);
        let folders = &profile.default_folders;
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].id.as_str(), "default-folder-dossier-médical");
        assert_eq!(folders[0].kind, DocumentKind::Folder);
        assert_eq!(folders[1].name.as_deref(), Some("Logement"));
    }

    #[test]
    fn test_color_strings() {
        assert_eq!(SurfaceColor::Main.as_str(), "main");
        assert_eq!(SurfaceColor::Blue900.as_str(), "blue-900");
    }

    #[test]
    fn test_per_kind_presentation_data() {
        let config = CoreConfig::default();
        let action = KindProfile::for_kind(EntityTypeTag::Action, &config);
        let consultation = KindProfile::for_kind(EntityTypeTag::Consultation, &config);
        let treatment = KindProfile::for_kind(EntityTypeTag::Treatment, &config);
        let person = KindProfile::for_kind(EntityTypeTag::Person, &config);

        for profile in [&action, &consultation, &treatment, &person] {
            assert_eq!(profile.title.as_str(), "Documents");
            assert!(!profile.can_toggle_group_check);
        }
        assert_eq!(action.color, SurfaceColor::Main);
        assert_eq!(consultation.color, SurfaceColor::Main);
        assert_eq!(treatment.color, SurfaceColor::Blue900);
        assert!(treatment.is_inside_modal && !treatment.show_full_screen);
        assert!(person.show_full_screen && !person.is_inside_modal);
    }

    #[test]
    fn test_builders_keep_folder_policy() {
        let folder = Document::folder(DocumentId::parse("actions").unwrap(), "Actions");
        let profile = KindProfile::for_kind(EntityTypeTag::Person, &CoreConfig::default())
            .group_check(true)
            .with_read_only_folders(vec![folder.clone()]);

        assert!(profile.can_toggle_group_check);
        assert_eq!(profile.read_only_folders, vec![folder]);
        assert!(profile.supports_folders);
    }
}
