//! Document-owning entities.
//!
//! Every entity kind that carries uploaded documents implements [`DocumentOwner`], the
//! accessor/mutator pair the generic adapter needs. Only the fields the documents surface
//! reads are modelled; everything else the backend sends is preserved in `extra` so that
//! [`DocumentOwner::with_documents`] never drops domain data on a full-entity write.

use std::fmt;
use std::str::FromStr;

use mano_types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::DocumentsError;

/// Closed set of entity kinds that can own documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityTypeTag {
    Action,
    Consultation,
    Treatment,
    Person,
}

impl EntityTypeTag {
    pub const ALL: [EntityTypeTag; 4] = [
        EntityTypeTag::Action,
        EntityTypeTag::Consultation,
        EntityTypeTag::Treatment,
        EntityTypeTag::Person,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityTypeTag::Action => "action",
            EntityTypeTag::Consultation => "consultation",
            EntityTypeTag::Treatment => "treatment",
            EntityTypeTag::Person => "person",
        }
    }
}

impl fmt::Display for EntityTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityTypeTag {
    type Err = DocumentsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityTypeTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| DocumentsError::InvalidInput(format!("unknown entity type '{s}'")))
    }
}

/// Accessor/mutator capability over an entity's document list.
pub trait DocumentOwner: Clone + Send + Sync + 'static {
    const KIND: EntityTypeTag;

    fn id(&self) -> &EntityId;

    /// Person the entity belongs to. A person belongs to itself.
    fn person_id(&self) -> Option<&EntityId>;

    /// Current documents, empty when the backend sent none.
    fn documents(&self) -> &[Document];

    /// Copy of `self` with its document list replaced.
    fn with_documents(&self, documents: Vec<Document>) -> Self;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub person: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Document>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentOwner for Action {
    const KIND: EntityTypeTag = EntityTypeTag::Action;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn person_id(&self) -> Option<&EntityId> {
        Some(&self.person)
    }

    fn documents(&self) -> &[Document] {
        self.documents.as_deref().unwrap_or(&[])
    }

    fn with_documents(&self, documents: Vec<Document>) -> Self {
        Self {
            documents: Some(documents),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub person: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Consultation type as configured by the organisation ("Psychologique", ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub consultation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Document>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentOwner for Consultation {
    const KIND: EntityTypeTag = EntityTypeTag::Consultation;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn person_id(&self) -> Option<&EntityId> {
        Some(&self.person)
    }

    fn documents(&self) -> &[Document] {
        self.documents.as_deref().unwrap_or(&[])
    }

    fn with_documents(&self, documents: Vec<Document>) -> Self {
        Self {
            documents: Some(documents),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub person: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Document>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentOwner for Treatment {
    const KIND: EntityTypeTag = EntityTypeTag::Treatment;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn person_id(&self) -> Option<&EntityId> {
        Some(&self.person)
    }

    fn documents(&self) -> &[Document] {
        self.documents.as_deref().unwrap_or(&[])
    }

    fn with_documents(&self, documents: Vec<Document>) -> Self {
        Self {
            documents: Some(documents),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Document>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentOwner for Person {
    const KIND: EntityTypeTag = EntityTypeTag::Person;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn person_id(&self) -> Option<&EntityId> {
        Some(&self.id)
    }

    fn documents(&self) -> &[Document] {
        self.documents.as_deref().unwrap_or(&[])
    }

    fn with_documents(&self, documents: Vec<Document>) -> Self {
        Self {
            documents: Some(documents),
            ..self.clone()
        }
    }
}
