use crate::config::IngestionPolicy;
use crate::extractor::PdfExtractor;
use crate::models::{display_name, Document};
use crate::IngestError;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub fn digest_file(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn duplicate_file_name(files: &[PathBuf]) -> Option<String> {
    let mut seen = HashSet::new();
    files
        .iter()
        .filter_map(|file| file.file_name())
        .find(|name| !seen.insert(*name))
        .map(|name| name.to_string_lossy().to_string())
}

/// Nothing is copied when two files share a base name.
pub fn stage_uploads(upload_dir: &Path, files: &[PathBuf]) -> Result<Vec<PathBuf>, IngestError> {
    if let Some(name) = duplicate_file_name(files) {
        return Err(IngestError::DuplicateFileName(name));
    }

    let mut targets = Vec::with_capacity(files.len());
    for file in files {
        let name = file.file_name().ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", file.display()))
        })?;
        targets.push(upload_dir.join(name));
    }

    fs::create_dir_all(upload_dir)?;
    for (file, target) in files.iter().zip(&targets) {
        let already_staged =
            target.exists() && fs::canonicalize(file)? == fs::canonicalize(target)?;
        if !already_staged {
            fs::copy(file, target)?;
        }
        debug!(from = %file.display(), to = %target.display(), "staged upload");
    }

    Ok(targets)
}

#[derive(Debug)]
pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestionReport {
    pub documents: Vec<Document>,
    pub skipped_files: Vec<SkippedPdf>,
}

pub fn load_document(path: &Path, extractor: &dyn PdfExtractor) -> Result<Document, IngestError> {
    let pages = extractor.extract_pages(path)?;
    let checksum = digest_file(path)?;
    let source_id = path.to_string_lossy().to_string();

    Ok(Document {
        title: display_name(&source_id),
        source_id,
        checksum,
        ingested_at: Utc::now(),
        pages,
    })
}

pub fn load_documents(
    paths: &[PathBuf],
    extractor: &dyn PdfExtractor,
    policy: IngestionPolicy,
) -> Result<IngestionReport, IngestError> {
    let mut report = IngestionReport::default();

    for path in paths {
        match load_document(path, extractor) {
            Ok(document) => {
                debug!(
                    source = %document.source_id,
                    pages = document.pages.len(),
                    "loaded document"
                );
                report.documents.push(document);
            }
            Err(error) if policy == IngestionPolicy::SkipFailed => {
                warn!(path = %path.display(), reason = %error, "skipped pdf");
                report.skipped_files.push(SkippedPdf {
                    path: path.clone(),
                    reason: error.to_string(),
                });
            }
            Err(error) => return Err(error),
        }
    }

    if report.documents.is_empty() {
        return Err(IngestError::NoDocuments);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeExtractor;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn discover_pdf_files_is_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("a.pdf")).and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(nested.join("b.PDF"))
            .and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(base.join("notes.txt"))?;

        let files = discover_pdf_files(base);
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn checksum_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file_path = dir.path().join("a.pdf");
        fs::write(&file_path, b"abc")?;

        let first = digest_file(&file_path)?;
        let second = digest_file(&file_path)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn uploads_are_copied_into_scratch_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let source = dir.path().join("report.pdf");
        fs::write(&source, b"%PDF-1.4\n%fake")?;
        let upload_dir = dir.path().join("uploads");

        let staged = stage_uploads(&upload_dir, &[source])?;

        assert_eq!(staged, vec![upload_dir.join("report.pdf")]);
        assert_eq!(fs::read(&staged[0])?, b"%PDF-1.4\n%fake");
        Ok(())
    }

    #[test]
    fn staging_a_missing_upload_fails() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let result = stage_uploads(&dir.path().join("uploads"), &[dir.path().join("gone.pdf")]);
        assert!(matches!(result, Err(IngestError::Io(_))));
        Ok(())
    }

    #[test]
    fn uploads_sharing_a_file_name_are_not_staged() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("a"))?;
        fs::create_dir(dir.path().join("b"))?;
        let first = dir.path().join("a").join("report.pdf");
        let second = dir.path().join("b").join("report.pdf");
        fs::write(&first, b"first")?;
        fs::write(&second, b"second")?;
        let upload_dir = dir.path().join("uploads");

        let result = stage_uploads(&upload_dir, &[first, second]);

        assert!(matches!(
            result,
            Err(IngestError::DuplicateFileName(ref name)) if name == "report.pdf"
        ));
        assert!(!upload_dir.exists());
        Ok(())
    }

    #[test]
    fn distinct_file_names_have_no_duplicate() {
        let files = [PathBuf::from("a/report.pdf"), PathBuf::from("a/manual.pdf")];
        assert_eq!(duplicate_file_name(&files), None);
    }

    #[test]
    fn abort_policy_fails_on_first_unreadable_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let good = dir.path().join("good.pdf");
        let bad = dir.path().join("bad.pdf");
        fs::write(&good, b"good")?;
        fs::write(&bad, b"bad")?;

        let extractor = FakeExtractor::default().with_document(&good, &["Page one"]);
        let result = load_documents(
            &[good, bad],
            &extractor,
            IngestionPolicy::AbortBatch,
        );

        assert!(matches!(result, Err(IngestError::PdfParse(_))));
        Ok(())
    }

    #[test]
    fn skip_policy_keeps_readable_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let good = dir.path().join("good.pdf");
        let bad = dir.path().join("unreadable.pdf");
        fs::write(&good, b"good")?;
        fs::write(&bad, b"%PDF-1.4\n%broken")?;

        let extractor = FakeExtractor::default().with_document(&good, &["Page one", "Page two"]);
        let report = load_documents(
            &[bad, good.clone()],
            &extractor,
            IngestionPolicy::SkipFailed,
        )?;

        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].title, "good.pdf");
        assert_eq!(report.documents[0].text(), "Page one\nPage two");
        assert_eq!(report.skipped_files.len(), 1);
        assert_eq!(
            report.skipped_files[0]
                .path
                .file_name()
                .and_then(|name| name.to_str()),
            Some("unreadable.pdf")
        );
        Ok(())
    }

    #[test]
    fn skip_policy_still_fails_when_nothing_is_readable() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempdir()?;
        let bad = dir.path().join("unreadable.pdf");
        fs::write(&bad, b"%PDF-1.4\n%broken")?;

        let result = load_documents(
            &[bad],
            &FakeExtractor::default(),
            IngestionPolicy::SkipFailed,
        );
        assert!(matches!(result, Err(IngestError::NoDocuments)));
        Ok(())
    }
}
