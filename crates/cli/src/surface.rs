//! Terminal rendering of a documents surface.

use std::io::Write;
use std::sync::Mutex;

use mano_core::{DocumentKind, ErrorNotifier, LinkedDocument, PresentationSurface, SurfaceConfig};

/// Renders a [`SurfaceConfig`] as plain text lines.
pub struct TextSurface<W: Write> {
    out: Mutex<W>,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn row(document: &LinkedDocument, config: &SurfaceConfig) -> String {
    let name = document.document.name.as_deref().unwrap_or("(sans nom)");
    let marker = match document.document.kind {
        DocumentKind::Folder => "[dossier] ",
        DocumentKind::Document => "",
    };
    let mut line = format!("  {}  {marker}{name}", document.id());
    if document.linked_item.kind != config.hide_linked_item_type {
        line.push_str(&format!(
            "  ({} {})",
            document.linked_item.kind, document.linked_item.id
        ));
    }
    line
}

impl<W: Write> PresentationSurface for TextSurface<W> {
    fn render(&self, config: &SurfaceConfig) {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut lines = vec![format!(
            "{} ({}) [{}]",
            config.title,
            config.documents.len(),
            config.color.as_str()
        )];
        let folders = config.read_only_folders.iter().chain(
            config
                .default_folders
                .iter()
                .filter(|_| config.supports_folders),
        );
        for folder in folders {
            lines.push(format!(
                "  {}  [dossier] {}",
                folder.id,
                folder.name.as_deref().unwrap_or_default()
            ));
        }
        lines.extend(config.documents.iter().map(|doc| row(doc, config)));

        for line in lines {
            if let Err(err) = writeln!(out, "{line}") {
                tracing::warn!(error = %err, "failed to write surface output");
                return;
            }
        }
    }
}

/// Prints user-facing failures on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl ErrorNotifier for ConsoleNotifier {
    fn notify_error(&self, message: &str) {
        eprintln!("Erreur: {message}");
    }
}
