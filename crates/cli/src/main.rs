mod store;
mod surface;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mano_core::config::{default_folders_from_env_value, mutation_policy_from_env_value};
use mano_core::constants::DELETE_ERROR_MESSAGE;
use mano_core::document::tag;
use mano_core::{
    Action, Capabilities, Consultation, CoreConfig, Document, DocumentId, DocumentKind,
    DocumentOwner, EntityId, EntityTypeTag, ErrorNotifier, KindProfile, LinkedDocument,
    LinkedDocumentsAdapter, LinkedDocumentsRouter, LinkedItem, NonEmptyText, Person,
    PresentationSurface, Refresher, Treatment,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use store::{Collection, JsonFileStore};
use surface::{ConsoleNotifier, TextSurface};

const DEFAULT_STORE_PATH: &str = "mano-store.json";

#[derive(Parser)]
#[command(name = "mano")]
#[command(about = "Mano linked documents CLI")]
struct Cli {
    /// Store snapshot file (defaults to MANO_STORE, then ./mano-store.json)
    #[arg(long)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List an entity's documents
    List {
        /// action, consultation, treatment or person
        kind: EntityTypeTag,
        entity_id: EntityId,
    },
    /// List a person's documents together with those of their actions, consultations and treatments
    PersonDocuments { person_id: EntityId },
    /// Rename a document
    Rename {
        kind: EntityTypeTag,
        entity_id: EntityId,
        document_id: DocumentId,
        name: NonEmptyText,
    },
    /// Delete a document
    Delete {
        kind: EntityTypeTag,
        entity_id: EntityId,
        document_id: DocumentId,
    },
    /// Replace an entity's documents with the JSON array stored in FILE
    ///
    /// Rows without an `_id` are given a fresh one.
    Save {
        kind: EntityTypeTag,
        entity_id: EntityId,
        file: PathBuf,
    },
    /// Add a top-level folder to a person's documents
    CreateFolder { person_id: EntityId, name: NonEmptyText },
    /// Delete a person's folder, moving its content to the top level
    DeleteFolder {
        person_id: EntityId,
        folder_id: DocumentId,
    },
}

macro_rules! with_kind {
    ($kind:expr, $ty:ident => $body:expr) => {
        match $kind {
            EntityTypeTag::Action => {
                type $ty = Action;
                $body
            }
            EntityTypeTag::Consultation => {
                type $ty = Consultation;
                $body
            }
            EntityTypeTag::Treatment => {
                type $ty = Treatment;
                $body
            }
            EntityTypeTag::Person => {
                type $ty = Person;
                $body
            }
        }
    };
}

struct App<W: Write> {
    store: Arc<JsonFileStore>,
    config: CoreConfig,
    surface: TextSurface<W>,
    notifier: Arc<dyn ErrorNotifier>,
}

impl<W: Write> App<W> {
    async fn run(&self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::List { kind, entity_id } => {
                with_kind!(kind, E => self.list::<E>(&entity_id).await)
            }
            Commands::PersonDocuments { person_id } => self.person_documents(&person_id).await,
            Commands::Rename {
                kind,
                entity_id,
                document_id,
                name,
            } => {
                with_kind!(kind, E => self.rename::<E>(&entity_id, &document_id, name).await)
            }
            Commands::Delete {
                kind,
                entity_id,
                document_id,
            } => with_kind!(kind, E => self.delete::<E>(&entity_id, &document_id).await),
            Commands::Save {
                kind,
                entity_id,
                file,
            } => with_kind!(kind, E => self.save::<E>(&entity_id, &file).await),
            Commands::CreateFolder { person_id, name } => {
                self.create_folder(&person_id, name).await
            }
            Commands::DeleteFolder {
                person_id,
                folder_id,
            } => self.delete_folder(&person_id, &folder_id).await,
        }
    }

    fn capabilities<E: Collection>(&self) -> Capabilities<E> {
        Capabilities::new(
            self.store.clone(),
            self.store.clone(),
            Arc::clone(&self.notifier),
        )
    }

    async fn adapter<E: Collection>(
        &self,
        id: &EntityId,
    ) -> anyhow::Result<Arc<LinkedDocumentsAdapter<E>>> {
        let entity: E = self
            .store
            .find(id)
            .await
            .with_context(|| format!("{} {} not found", E::KIND, id))?;
        Ok(Arc::new(LinkedDocumentsAdapter::new(
            entity,
            self.capabilities::<E>(),
            &self.config,
        )))
    }

    /// Re-reads the entity from the store and renders it.
    async fn resync<E: Collection>(
        &self,
        adapter: &Arc<LinkedDocumentsAdapter<E>>,
    ) -> anyhow::Result<()> {
        let id = adapter.entity().id().clone();
        if let Some(fresh) = self.store.find::<E>(&id).await {
            adapter.set_entity(Arc::new(fresh));
        }
        self.surface.render(&adapter.surface_config()?);
        Ok(())
    }

    fn find_row<E: Collection>(
        adapter: &LinkedDocumentsAdapter<E>,
        document_id: &DocumentId,
    ) -> Option<LinkedDocument> {
        adapter
            .project()
            .iter()
            .find(|doc| doc.id() == document_id)
            .cloned()
    }

    async fn list<E: Collection>(&self, id: &EntityId) -> anyhow::Result<()> {
        let adapter = self.adapter::<E>(id).await?;
        self.surface.render(&adapter.surface_config()?);
        Ok(())
    }

    async fn rename<E: Collection>(
        &self,
        id: &EntityId,
        document_id: &DocumentId,
        name: NonEmptyText,
    ) -> anyhow::Result<()> {
        let adapter = self.adapter::<E>(id).await?;
        let mut row = Self::find_row(&adapter, document_id)
            .with_context(|| format!("document {document_id} not found on {} {id}", E::KIND))?;
        row.document.name = Some(name.into_inner());
        adapter.update_one(row).await?;
        self.resync(&adapter).await
    }

    async fn delete<E: Collection>(
        &self,
        id: &EntityId,
        document_id: &DocumentId,
    ) -> anyhow::Result<()> {
        let adapter = self.adapter::<E>(id).await?;
        // An unknown id still goes through the adapter, which treats it as a no-op.
        let row = Self::find_row(&adapter, document_id).unwrap_or_else(|| {
            tag(&Document::new(document_id.clone()), &adapter.linked_item())
        });
        if !adapter.delete_one(row).await {
            bail!("document {document_id} was not deleted");
        }
        self.resync(&adapter).await
    }

    async fn save<E: Collection>(&self, id: &EntityId, file: &Path) -> anyhow::Result<()> {
        let adapter = self.adapter::<E>(id).await?;
        let contents = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("failed to read {}", file.display()))?;
        let mut rows: Vec<serde_json::Value> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", file.display()))?;
        assign_missing_ids(&mut rows);
        let documents: Vec<Document> = serde_json::from_value(serde_json::Value::Array(rows))
            .with_context(|| format!("invalid documents in {}", file.display()))?;
        let linked_item = adapter.linked_item();
        let rows = documents
            .iter()
            .map(|document| tag(document, &linked_item))
            .collect();

        adapter.save_all(rows).await?;
        self.store.refresh().await?;
        self.resync(&adapter).await
    }

    async fn create_folder(&self, person_id: &EntityId, name: NonEmptyText) -> anyhow::Result<()> {
        let adapter = self.adapter::<Person>(person_id).await?;
        let folder = Document::folder(DocumentId::generate(), name.into_inner());
        let mut rows = adapter.project().to_vec();
        rows.push(tag(&folder, &adapter.linked_item()));

        adapter.save_all(rows).await?;
        self.store.refresh().await?;
        self.resync(&adapter).await
    }

    async fn delete_folder(
        &self,
        person_id: &EntityId,
        folder_id: &DocumentId,
    ) -> anyhow::Result<()> {
        let adapter = self.adapter::<Person>(person_id).await?;
        let folder = Self::find_row(&adapter, folder_id)
            .filter(|row| row.document.kind == DocumentKind::Folder)
            .with_context(|| format!("folder {folder_id} not found on person {person_id}"))?;
        if !adapter.delete_folder(folder).await {
            bail!("folder {folder_id} was not deleted");
        }
        self.resync(&adapter).await
    }

    async fn register_for_person<E: Collection>(
        &self,
        router: &mut LinkedDocumentsRouter,
        person_id: &EntityId,
    ) {
        for entity in self.store.for_person::<E>(person_id).await {
            let adapter =
                LinkedDocumentsAdapter::new(entity, self.capabilities::<E>(), &self.config);
            router.register(Arc::new(adapter));
        }
    }

    async fn person_documents(&self, person_id: &EntityId) -> anyhow::Result<()> {
        let person = self.adapter::<Person>(person_id).await?;
        let mut router = LinkedDocumentsRouter::new(
            LinkedItem::new(person_id.clone(), EntityTypeTag::Person),
            Arc::clone(&self.notifier),
            &self.config,
        );
        router.register(person);
        self.register_for_person::<Action>(&mut router, person_id)
            .await;
        self.register_for_person::<Consultation>(&mut router, person_id)
            .await;
        self.register_for_person::<Treatment>(&mut router, person_id)
            .await;

        let profile = KindProfile::for_kind(EntityTypeTag::Person, &self.config);
        self.surface
            .render(&Arc::new(router).surface_config(&profile)?);
        Ok(())
    }
}

/// Gives every row without an `_id` a fresh one, as the upload pipeline would.
fn assign_missing_ids(rows: &mut [serde_json::Value]) {
    for row in rows {
        if let Some(object) = row.as_object_mut() {
            if !object.contains_key("_id") {
                object.insert("_id".into(), DocumentId::generate().to_string().into());
            }
        }
    }
}

/// Main entry point for the Mano documents CLI
///
/// # Environment Variables
/// - `MANO_STORE`: store snapshot file, when `--store` is not given
/// - `MANO_MUTATION_POLICY`: `concurrent` (default) or `serialized`
/// - `MANO_PERSON_DEFAULT_FOLDERS`: comma separated default folders for person documents
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("mano=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'mano --help' for commands");
        return Ok(());
    };

    let config = CoreConfig::new(
        mutation_policy_from_env_value(std::env::var("MANO_MUTATION_POLICY").ok())?,
        DELETE_ERROR_MESSAGE.to_owned(),
        default_folders_from_env_value(std::env::var("MANO_PERSON_DEFAULT_FOLDERS").ok()),
    )?;
    let store_path = cli
        .store
        .or_else(|| std::env::var_os("MANO_STORE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
    tracing::debug!(store = %store_path.display(), policy = ?config.mutation_policy(), "starting");

    let app = App {
        store: Arc::new(JsonFileStore::open(&store_path).await?),
        config,
        surface: TextSurface::new(std::io::stdout()),
        notifier: Arc::new(ConsoleNotifier),
    };
    app.run(command).await
}
