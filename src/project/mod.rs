//! Project-level aggregation of per-file analyses.
//!
//! Per-file failures are logged and left out of the result; a missing project
//! directory aborts with [`ProjectError::NotFound`].
pub mod store;

pub use store::{UploadReceipt, Workspace};

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::analyzer::{self, AnalysisError, Analyzer, FileAnalysis};
use crate::config::Config;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("project not found: {0}")]
    NotFound(String),

    #[error("invalid project id: {0:?}")]
    InvalidProjectId(String),

    #[error("no COBOL analysis for project {0}; run analysis first")]
    AnalysisMissing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProjectError {
    /// Errors caused by the caller's request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProjectError::NotFound(_)
                | ProjectError::InvalidProjectId(_)
                | ProjectError::AnalysisMissing(_)
        )
    }
}

/// The persisted `cobol_analysis.json` artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CobolAnalysisResult {
    pub project_id: String,
    pub files: Vec<FileAnalysis>,
    /// Copybook names across all files, duplicates kept, in processing order
    pub dependencies: Vec<String>,
}

impl CobolAnalysisResult {
    pub fn empty(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            files: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Fold per-file outcomes into a result, dropping failures.
    pub fn from_outcomes<I>(project_id: impl Into<String>, outcomes: I) -> Self
    where
        I: IntoIterator<Item = Result<FileAnalysis, AnalysisError>>,
    {
        let mut result = Self::empty(project_id);

        for outcome in outcomes {
            match outcome {
                Ok(analysis) => result.push(analysis),
                Err(e) => warn!("Skipping {} ({}): {e}", e.file(), e.reason()),
            }
        }

        if result.files.is_empty() {
            warn!("No valid COBOL files found for project: {}", result.project_id);
        }
        result
    }

    fn push(&mut self, analysis: FileAnalysis) {
        let names: Vec<String> = analysis.copybook_names().map(str::to_string).collect();
        if !names.is_empty() {
            info!(
                "Extracted dependencies from {}: {names:?}",
                analysis.file_name
            );
            self.dependencies.extend(names);
        }
        self.files.push(analysis);
    }

    pub fn file(&self, file_name: &str) -> Option<&FileAnalysis> {
        self.files.iter().find(|f| f.file_name == file_name)
    }
}

pub struct ProjectAnalyzer {
    workspace: Workspace,
    analyzer: Analyzer,
}

impl ProjectAnalyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            workspace: Workspace::new(config),
            analyzer: Analyzer::new(),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Analyze every `.cbl`/`.cpy`/`.jcl` file under the project's upload directory.
    pub fn analyze_project(&self, project_id: &str) -> Result<CobolAnalysisResult, ProjectError> {
        info!("Creating COBOL JSON for project: {project_id}");
        let dir = self.workspace.project_dir(project_id)?;

        let files = collect_sources(&dir);
        info!("Found {} analyzable files in {}", files.len(), dir.display());

        let outcomes = files.iter().map(|path| self.analyzer.analyze_file(path));
        Ok(CobolAnalysisResult::from_outcomes(project_id, outcomes))
    }

    /// Analyze and persist, replacing any earlier artifact for the project.
    pub fn analyze_and_store(
        &self,
        project_id: &str,
    ) -> Result<(CobolAnalysisResult, PathBuf), ProjectError> {
        let result = self.analyze_project(project_id)?;
        let path = self.workspace.save_analysis(&result)?;
        Ok((result, path))
    }

    /// Same aggregation over sources that are already in memory.
    pub fn analyze_sources<'a, I>(&self, project_id: &str, files: I) -> CobolAnalysisResult
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let outcomes = files
            .into_iter()
            .map(|(name, content)| self.analyzer.analyze_source(name, content));
        CobolAnalysisResult::from_outcomes(project_id, outcomes)
    }
}

/// Analyzable files under `dir`, recursively, sorted by path.
fn collect_sources(dir: &Path) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(dir);
    builder
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    builder
        .build()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && analyzer::is_analyzable(path))
        .collect()
}
