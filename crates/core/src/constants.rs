//! Constants used throughout the Mano core crate.

/// JSON key under which a document carries its owning entity while held by the surface.
pub const LINKED_ITEM_KEY: &str = "linkedItem";

/// Message shown to the user when deleting a document fails.
pub const DELETE_ERROR_MESSAGE: &str = "Erreur lors de la suppression du document";

/// Surface title used when a profile does not set one.
pub const DEFAULT_DOCUMENTS_TITLE: &str = "Documents";

/// Prefix of the identifiers given to configured default folders.
pub const DEFAULT_FOLDER_ID_PREFIX: &str = "default-folder-";

/// Message shown to the user when deleting a folder fails.
pub const FOLDER_DELETE_ERROR_MESSAGE: &str = "Erreur lors de la suppression du dossier";

/// Message shown when a group member's document is deleted from another member's view.
pub const GROUP_DOCUMENT_DELETE_MESSAGE: &str =
    "Vous pouvez supprimer ce document uniquement depuis la personne initiale de ce document familial";

/// Identifier of the read-only folder gathering a person's action documents.
pub const ACTIONS_FOLDER_ID: &str = "actions";

pub const ACTIONS_FOLDER_NAME: &str = "Actions";

/// Parent identifier of top-level folders.
pub const ROOT_FOLDER_ID: &str = "root";
