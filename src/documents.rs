//! `docchat docs` commands: list, upload, delete, and clear.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use doc_chat_core::api::DocChatApi;
use doc_chat_core::library::{Confirm, DocumentLibrary, Removal, UploadOutcome};
use doc_chat_core::models::UploadFile;

use crate::config::Config;
use crate::render;

/// Ask `prompt` on stderr and read a yes/no answer from stdin. Anything but
/// `y` or `yes` (including a read error) counts as no.
pub fn prompt_confirm(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    is_yes(&line)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn assume_yes(_: &str) -> bool {
    true
}

fn confirmer(yes: bool) -> &'static dyn Confirm {
    if yes {
        &assume_yes
    } else {
        &prompt_confirm
    }
}

fn library(config: &Config) -> DocumentLibrary {
    DocumentLibrary::with_allowed_extensions(config.upload.allowed_extensions.clone())
}

pub async fn run_list(api: &dyn DocChatApi) -> Result<()> {
    let docs = api.list_documents().await?;
    print!("{}", render::documents(&docs));
    Ok(())
}

pub async fn run_upload(api: &dyn DocChatApi, config: &Config, path: &Path) -> Result<()> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {}", path.display()))?;

    let mut library = library(config);
    if !library.accepts(&filename) {
        bail!(
            "Unsupported file type: {}. Allowed types: {}",
            filename,
            config.upload.allowed_extensions.join(", ")
        );
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    match library.upload(api, UploadFile::new(filename, bytes)).await {
        UploadOutcome::Uploaded(doc) => {
            println!("Uploaded {} (id {})", doc.filename, doc.id);
            println!("{} document(s) in library.", library.documents().len());
            Ok(())
        }
        UploadOutcome::Rejected { filename } => bail!("Upload rejected: {}", filename),
        UploadOutcome::Failed(e) => Err(e.into()),
    }
}

pub async fn run_delete(api: &dyn DocChatApi, id: i64, yes: bool) -> Result<()> {
    let mut library = DocumentLibrary::new();
    match library.delete(api, id, confirmer(yes)).await? {
        Removal::Cancelled => println!("Cancelled."),
        Removal::Removed => {
            println!("Deleted document {}.", id);
            println!("{} document(s) in library.", library.documents().len());
        }
    }
    Ok(())
}

pub async fn run_clear(api: &dyn DocChatApi, yes: bool) -> Result<()> {
    let mut library = DocumentLibrary::new();
    match library.clear_all(api, confirmer(yes)).await? {
        Removal::Cancelled => println!("Cancelled."),
        Removal::Removed => println!("All documents deleted."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_chat_core::api::memory::{MemoryApi, Operation};

    #[test]
    fn yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[tokio::test]
    async fn upload_rejects_extension_before_reading_file() {
        let api = MemoryApi::new();
        let err = run_upload(&api, &Config::minimal(), Path::new("/nonexistent/notes.txt"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Unsupported file type: notes.txt"));
        assert_eq!(api.calls(Operation::Upload), 0);
    }

    #[tokio::test]
    async fn upload_reads_and_sends_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let api = MemoryApi::new();
        run_upload(&api, &Config::minimal(), &path).await.unwrap();
        assert_eq!(api.documents().len(), 1);
        assert_eq!(api.documents()[0].filename, "report.pdf");
    }

    #[tokio::test]
    async fn delete_with_yes_skips_prompt() {
        let api = MemoryApi::new().with_document("a.pdf");
        run_delete(&api, 1, true).await.unwrap();
        assert!(api.documents().is_empty());
    }

    #[tokio::test]
    async fn delete_failure_is_an_error() {
        let api = MemoryApi::new();
        let err = run_delete(&api, 5, true).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete document");
    }

    #[tokio::test]
    async fn clear_with_yes_empties_store() {
        let api = MemoryApi::new().with_document("a.pdf").with_document("b.csv");
        run_clear(&api, true).await.unwrap();
        assert!(api.documents().is_empty());
        assert_eq!(api.calls(Operation::ClearAll), 1);
    }
}
