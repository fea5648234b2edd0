//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the adapters. Library code
//! never reads environment variables; the parsing helpers below take the raw `Option<String>`
//! value so the binary decides where it comes from.

use std::str::FromStr;

use mano_types::NonEmptyText;

use crate::constants::DELETE_ERROR_MESSAGE;
use crate::error::{DocumentsError, DocumentsResult};

/// How point mutations against the same entity interact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationPolicy {
    /// Mutations are not serialized. Each reads the snapshot current at invocation, so two
    /// overlapping writes against one entity can lose the first one's change.
    #[default]
    Concurrent,
    /// One mutation at a time per adapter. Each reads the latest persisted snapshot once it
    /// holds the gate.
    Serialized,
}

impl FromStr for MutationPolicy {
    type Err = DocumentsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Ok(MutationPolicy::Concurrent),
            "serialized" | "serialised" => Ok(MutationPolicy::Serialized),
            other => Err(DocumentsError::InvalidInput(format!(
                "unknown mutation policy '{other}' (expected 'concurrent' or 'serialized')"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    mutation_policy: MutationPolicy,
    delete_error_message: String,
    person_default_folders: Vec<NonEmptyText>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            mutation_policy: MutationPolicy::default(),
            delete_error_message: DELETE_ERROR_MESSAGE.to_owned(),
            person_default_folders: Vec::new(),
        }
    }
}

impl CoreConfig {
    pub fn new(
        mutation_policy: MutationPolicy,
        delete_error_message: String,
        person_default_folders: Vec<NonEmptyText>,
    ) -> DocumentsResult<Self> {
        if delete_error_message.trim().is_empty() {
            return Err(DocumentsError::InvalidInput(
                "delete_error_message cannot be empty".into(),
            ));
        }

        let mut folders: Vec<NonEmptyText> = Vec::with_capacity(person_default_folders.len());
        for folder in person_default_folders {
            if !folders.contains(&folder) {
                folders.push(folder);
            }
        }

        Ok(Self {
            mutation_policy,
            delete_error_message,
            person_default_folders: folders,
        })
    }

    pub fn mutation_policy(&self) -> MutationPolicy {
        self.mutation_policy
    }

    pub fn delete_error_message(&self) -> &str {
        &self.delete_error_message
    }

    pub fn person_default_folders(&self) -> &[NonEmptyText] {
        &self.person_default_folders
    }
}

/// Parse the mutation policy from an optional string value.
///
/// `None` or blank falls back to [`MutationPolicy::Concurrent`].
pub fn mutation_policy_from_env_value(value: Option<String>) -> DocumentsResult<MutationPolicy> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.parse())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse a comma separated folder list. Blank entries are skipped.
pub fn default_folders_from_env_value(value: Option<String>) -> Vec<NonEmptyText> {
    value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(|name| NonEmptyText::new(name).ok())
        .collect()
}
