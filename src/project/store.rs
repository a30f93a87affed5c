//! On-disk layout: uploaded sources per project and the persisted analysis artifact.
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{CobolAnalysisResult, ProjectError};
use crate::analyzer::FileKind;
use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub project_id: String,
    pub uploaded_files: Vec<String>,
    pub skipped_files: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    config: Config,
}

/// Reject ids that would escape the upload or output roots.
pub fn validate_project_id(project_id: &str) -> Result<(), ProjectError> {
    let trimmed = project_id.trim();
    let bad = trimmed.is_empty()
        || trimmed != project_id
        || project_id == "."
        || project_id == ".."
        || project_id.contains(['/', '\\'])
        || project_id.contains('\0');
    if bad {
        return Err(ProjectError::InvalidProjectId(project_id.to_string()));
    }
    Ok(())
}

impl Workspace {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Upload directory of an existing project.
    pub fn project_dir(&self, project_id: &str) -> Result<PathBuf, ProjectError> {
        validate_project_id(project_id)?;
        let dir = self.config.project_dir(project_id);
        if !dir.is_dir() {
            tracing::error!("Project directory not found: {}", dir.display());
            return Err(ProjectError::NotFound(project_id.to_string()));
        }
        Ok(dir)
    }

    pub fn analysis_path(&self, project_id: &str) -> Result<PathBuf, ProjectError> {
        validate_project_id(project_id)?;
        Ok(self.config.analysis_path(project_id))
    }

    /// Store analyzable sources under a freshly allocated project id.
    ///
    /// Only the final path component of each name is used; files that are not
    /// `.cbl`, `.cpy` or `.jcl` are skipped.
    pub fn create_project<I>(&self, files: I) -> Result<UploadReceipt, ProjectError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let project_id = Uuid::new_v4().to_string();
        let dir = self.config.project_dir(&project_id);
        fs::create_dir_all(&dir)?;

        let mut receipt = UploadReceipt {
            project_id,
            uploaded_files: Vec::new(),
            skipped_files: Vec::new(),
        };

        for (name, content) in files {
            let base = Path::new(&name)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .filter(|n| FileKind::from_file_name(n).is_some());

            match base {
                Some(base) if receipt.uploaded_files.contains(&base) => {
                    warn!("Skipping {name}: {base} already uploaded");
                    receipt.skipped_files.push(name);
                }
                Some(base) => {
                    fs::write(dir.join(&base), content)?;
                    info!("Uploaded COBOL file: {base}");
                    receipt.uploaded_files.push(base);
                }
                None => {
                    warn!("Skipping invalid file: {name}");
                    receipt.skipped_files.push(name);
                }
            }
        }

        Ok(receipt)
    }

    /// Write the artifact, fully replacing any previous one.
    pub fn save_analysis(&self, result: &CobolAnalysisResult) -> Result<PathBuf, ProjectError> {
        let path = self.analysis_path(&result.project_id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(result)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;

        info!("COBOL JSON created at: {}", path.display());
        Ok(path)
    }

    pub fn load_analysis(&self, project_id: &str) -> Result<CobolAnalysisResult, ProjectError> {
        let path = self.analysis_path(project_id)?;
        if !path.exists() {
            return Err(ProjectError::AnalysisMissing(project_id.to_string()));
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
