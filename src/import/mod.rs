use crate::error::{ImportError, Result};
use crate::models::SessionRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod csv;
pub mod json;

/// Trait for reading session histories from different file formats
pub trait SessionFormat: Send + Sync {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Read all session records from the file
    fn import_file(&self, file_path: &Path) -> Result<Vec<SessionRecord>>;

    /// Get the format name for this importer
    fn format_name(&self) -> &'static str;
}

/// Anything that can produce the session history of a user
pub trait SessionSource: Send + Sync {
    fn load_sessions(&self) -> Result<Vec<SessionRecord>>;

    /// Human-readable origin, used in logs
    fn describe(&self) -> String;
}

/// Whole seconds from a non-negative duration; fractions are truncated
fn whole_seconds(seconds: f64) -> Option<u32> {
    (seconds.is_finite() && seconds >= 0.0 && seconds <= f64::from(u32::MAX)).then(|| seconds as u32)
}

fn has_extension(file_path: &Path, extensions: &[&str]) -> bool {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Manager for coordinating the session file formats
pub struct ImportManager {
    importers: Vec<Box<dyn SessionFormat>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn SessionFormat>> = vec![
            Box::new(json::JsonImporter::new()),
            Box::new(csv::CsvImporter::new()),
        ];

        Self { importers }
    }

    fn importer_for(&self, file_path: &Path) -> Result<&dyn SessionFormat> {
        self.importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .map(|importer| importer.as_ref())
            .ok_or_else(|| {
                ImportError::UnsupportedFormat {
                    format: file_path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .unwrap_or("none")
                        .to_string(),
                }
                .into()
            })
    }

    /// Import a single file, detecting the format from its extension
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<SessionRecord>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        let importer = self.importer_for(file_path)?;
        let sessions = importer.import_file(file_path)?;

        info!(
            file = %file_path.display(),
            format = importer.format_name(),
            sessions = sessions.len(),
            "Imported session history"
        );

        Ok(sessions)
    }

    /// Import and concatenate every supported file in a directory
    pub fn import_directory(&self, dir_path: &Path) -> Result<Vec<SessionRecord>> {
        let mut all_sessions = Vec::new();
        let files = self.collect_importable_files(dir_path)?;

        if files.is_empty() {
            warn!(dir = %dir_path.display(), "No session files found");
            return Ok(all_sessions);
        }

        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        for file_path in files {
            let file_name = file_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            pb.set_message(format!("Processing {}", file_name));

            match self.import_file(&file_path) {
                Ok(mut sessions) => all_sessions.append(&mut sessions),
                Err(e) => {
                    warn!(file = %file_name, error = %e, "Skipping unreadable session file");
                }
            }

            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(all_sessions)
    }

    /// Import a file or every supported file of a directory
    pub fn import_path(&self, path: &Path) -> Result<Vec<SessionRecord>> {
        if path.is_dir() {
            self.import_directory(path)
        } else {
            self.import_file(path)
        }
    }

    /// Collect all files that can be imported from a directory, sorted by name
    fn collect_importable_files(&self, dir_path: &Path) -> Result<Vec<PathBuf>> {
        if !dir_path.is_dir() {
            return Err(ImportError::FileNotFound {
                path: dir_path.to_path_buf(),
            }
            .into());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir_path)? {
            let path = entry?.path();
            if path.is_file() && self.can_import_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        Ok(files)
    }

    /// Check if this manager can import a given file
    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.can_import(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Session history stored in a file or a directory of files
pub struct FileSessionSource {
    path: PathBuf,
    manager: ImportManager,
}

impl FileSessionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            manager: ImportManager::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionSource for FileSessionSource {
    fn load_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.manager.import_path(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
