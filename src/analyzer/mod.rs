//! COBOL / copybook / JCL structural analysis.
//!
//! One forward pass per file produces a [`FileAnalysis`]. Per-file problems
//! come back as [`AnalysisError`] values; the caller decides whether to skip
//! the file or abort.
pub mod jcl;
pub mod models;
pub mod scan;

pub use models::FileAnalysis;

use scan::Scanner;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::classifier::extension_of;

/// Extensions the analyzer accepts.
pub const ANALYZABLE_EXTENSIONS: &[&str] = &[".cbl", ".cpy", ".jcl"];

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("invalid extension for {file}: {extension:?} (expected .cbl, .cpy or .jcl)")]
    InvalidExtension { file: String, extension: String },

    #[error("could not read {file}: {source}")]
    Read {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    /// Stable short reason, suitable for API responses.
    pub fn reason(&self) -> &'static str {
        match self {
            AnalysisError::InvalidExtension { .. } => "invalid extension",
            AnalysisError::Read { .. } => "read failure",
        }
    }

    pub fn file(&self) -> &str {
        match self {
            AnalysisError::InvalidExtension { file, .. } | AnalysisError::Read { file, .. } => file,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Program,
    Copybook,
    Jcl,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".cbl" => Some(FileKind::Program),
            ".cpy" => Some(FileKind::Copybook),
            ".jcl" => Some(FileKind::Jcl),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Self::from_extension(&extension_of(file_name))
    }
}

pub fn is_analyzable(path: &Path) -> bool {
    path.file_name()
        .map(|n| FileKind::from_file_name(&n.to_string_lossy()).is_some())
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer;

impl Analyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a file on disk. Undecodable bytes are replaced, not rejected.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<FileAnalysis, AnalysisError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        info!("Analyzing file: {}", path.display());
        let kind = self.kind_of(&file_name)?;

        let bytes = fs::read(path).map_err(|source| {
            tracing::error!("Error reading file {}: {source}", path.display());
            AnalysisError::Read {
                file: file_name.clone(),
                source,
            }
        })?;
        let content = String::from_utf8_lossy(&bytes);

        Ok(self.scan(file_name, kind, &content))
    }

    /// Analyze content already in memory; `file_name` only selects the file kind.
    pub fn analyze_source(
        &self,
        file_name: &str,
        content: &str,
    ) -> Result<FileAnalysis, AnalysisError> {
        let kind = self.kind_of(file_name)?;
        let base_name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.to_string());
        Ok(self.scan(base_name, kind, content))
    }

    fn kind_of(&self, file_name: &str) -> Result<FileKind, AnalysisError> {
        FileKind::from_file_name(file_name).ok_or_else(|| {
            let extension = extension_of(file_name);
            warn!("Invalid file extension for {file_name}. Expected .cbl, .cpy, or .jcl.");
            AnalysisError::InvalidExtension {
                file: file_name.to_string(),
                extension,
            }
        })
    }

    fn scan(&self, file_name: String, kind: FileKind, content: &str) -> FileAnalysis {
        let file_type = extension_of(&file_name);
        let analysis = FileAnalysis::new(file_name, file_type, kind == FileKind::Jcl);

        let analysis = content
            .lines()
            .fold(Scanner::new(kind, analysis), Scanner::step)
            .finish();

        if kind == FileKind::Copybook && analysis.variables.is_empty() {
            warn!(
                "No variables found in copybook {}. Content may be empty or malformed.",
                analysis.file_name
            );
        }

        info!(
            "File {} analyzed: {} variables, {} CICS commands, {} paragraphs",
            analysis.file_name,
            analysis.variables.len(),
            analysis.cics_commands.len(),
            analysis.paragraphs.len()
        );
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::JclDefinition;
    use std::io::Write;

    const PROGRAM: &str = "\
       IDENTIFICATION DIVISION.
       PROGRAM-ID. CUSTINQ.
      * customer inquiry
       ENVIRONMENT DIVISION.
       DATA DIVISION.
       WORKING-STORAGE SECTION.
       01  CUST-NAME PIC X(30).
       COPY CUSTREC.
       LINKAGE SECTION.
       01  DFHCOMMAREA PIC X(100).
       PROCEDURE DIVISION.
       MAIN-PARA.
           MOVE 1 TO X.
           PERFORM SUB-PARA.
       SUB-PARA.
           DISPLAY X.
       READ-PARA.
           EXEC CICS READ FILE('CUSTFILE') INTO(WS-REC) END-EXEC.
           EXEC CICS RETURN END-EXEC.
";

    #[test]
    fn test_identification() {
        let analysis = Analyzer::new().analyze_source("CUSTINQ.cbl", PROGRAM).unwrap();
        assert_eq!(analysis.program_id(), Some("CUSTINQ"));
        assert_eq!(analysis.file_type, ".cbl");
        assert!(analysis.jcl_definitions.is_none());
    }

    #[test]
    fn test_variable_extraction() {
        let analysis = Analyzer::new().analyze_source("CUSTINQ.cbl", PROGRAM).unwrap();
        let ws = &analysis.divisions.data.working_storage;
        assert_eq!(ws[0].level, "01");
        assert_eq!(ws[0].name, "CUST-NAME");
        assert!(ws[0].picture.contains("PIC X(30)."));
        assert!(analysis.variables.contains(&"CUST-NAME".to_string()));
        assert_eq!(analysis.divisions.data.linkage_section[0].name, "DFHCOMMAREA");
    }

    #[test]
    fn test_copy_statements() {
        let analysis = Analyzer::new().analyze_source("CUSTINQ.cbl", PROGRAM).unwrap();
        assert_eq!(analysis.copybooks.len(), 1);
        assert_eq!(analysis.copybooks[0].name, "CUSTREC");
        assert_eq!(analysis.copybooks[0].content, "COPY CUSTREC.");
    }

    #[test]
    fn test_paragraph_grouping() {
        let analysis = Analyzer::new().analyze_source("CUSTINQ.cbl", PROGRAM).unwrap();
        assert_eq!(analysis.paragraphs, vec!["MAIN-PARA", "SUB-PARA", "READ-PARA"]);
        let procedure = &analysis.divisions.procedure;
        assert_eq!(
            procedure[0].code,
            vec!["MAIN-PARA.", "MOVE 1 TO X.", "PERFORM SUB-PARA."]
        );
        assert_eq!(procedure[1].code, vec!["SUB-PARA.", "DISPLAY X."]);
        assert_eq!(procedure[2].code.len(), 3);
    }

    #[test]
    fn test_cics_capture() {
        let analysis = Analyzer::new().analyze_source("CUSTINQ.cbl", PROGRAM).unwrap();
        assert_eq!(analysis.cics_commands.len(), 2);
        let read = &analysis.cics_commands[0];
        assert_eq!(read.kind, "READ");
        assert_eq!(read.context.as_deref(), Some("READ-PARA"));
        assert!(read.parameters.starts_with("EXEC CICS READ"));
        assert_eq!(analysis.cics_commands[1].kind, "RETURN");
    }

    #[test]
    fn test_jcl_only_populates_definitions() {
        let source = "\
//PAYJOB   JOB (ACCT),'PAYROLL'
//* sort the input
//STEP1    EXEC PGM=SORT
//SORTIN   DD DSN=PROD.PAY.IN,DISP=SHR
//SYSIN    DD *
  DEFINE CLUSTER (NAME(PROD.PAY.KSDS))
/* DEFINE CLUSTER BELOW
";
        let analysis = Analyzer::new().analyze_source("PAYJOB.JCL", source).unwrap();
        let defs = analysis.jcl_definitions.as_ref().unwrap();
        let kinds: Vec<&str> = defs.iter().map(JclDefinition::kind).collect();
        assert_eq!(kinds, vec!["EXEC", "DD", "DD"]);
        assert_eq!(
            defs[0],
            JclDefinition::Exec {
                name: "STEP1".to_string(),
                details: "//STEP1    EXEC PGM=SORT".to_string(),
            }
        );
        assert!(analysis.variables.is_empty());
        assert!(analysis.paragraphs.is_empty());
        assert!(analysis.cics_commands.is_empty());
        assert_eq!(analysis.file_type, ".jcl");
    }

    #[test]
    fn test_invalid_extension() {
        let err = Analyzer::new()
            .analyze_source("README.md", "PROGRAM-ID. X.")
            .unwrap_err();
        assert_eq!(err.reason(), "invalid extension");
        assert_eq!(err.file(), "README.md");
    }

    #[test]
    fn test_missing_file_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = Analyzer::new()
            .analyze_file(dir.path().join("GONE.cbl"))
            .unwrap_err();
        assert_eq!(err.reason(), "read failure");
    }

    #[test]
    fn test_invalid_extension_checked_before_read() {
        let err = Analyzer::new()
            .analyze_file("/nonexistent/path/notes.txt")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidExtension { .. }));
    }

    #[test]
    fn test_lossy_decoding() {
        let mut file = tempfile::Builder::new().suffix(".cpy").tempfile().unwrap();
        file.write_all(b"01  NAME\xff PIC X(4).\n").unwrap();
        let analysis = Analyzer::new().analyze_file(file.path()).unwrap();
        assert_eq!(analysis.variables.len(), 1);
        assert_eq!(analysis.file_type, ".cpy");
    }

    #[test]
    fn test_empty_copybook_is_not_an_error() {
        let analysis = Analyzer::new().analyze_source("EMPTY.cpy", "").unwrap();
        assert!(analysis.variables.is_empty());
    }
}
