//! # mainframe-lens — COBOL migration context server
//!
//! Classifies uploaded mainframe artifacts and performs a shallow structural
//! scan of COBOL programs, copybooks and JCL. The aggregated scan is persisted
//! per project as `cobol_analysis.json` and served to AI assistants via the
//! Model Context Protocol (MCP).
//!
//! ## Architecture
//!
//! - **[`config`]** — Configuration loading, validation, and derived paths
//! - **[`logging`]** — `tracing` subscriber setup (stderr + optional file)
//! - **[`classifier`]** — Extension table and content heuristics for uploads
//! - **[`analyzer`]** — Line-scan state machine for COBOL/copybook/JCL files
//! - **[`project`]** — Upload workspace, project aggregation, artifact persistence
//! - **[`mcp`]** — MCP server with 5 tool handlers (stdio transport via rmcp)

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod project;

pub use analyzer::{AnalysisError, Analyzer, FileAnalysis};
pub use classifier::{Classification, ClassifiedFile, Classifier, UploadedFile, classify_files};
pub use classifier::categories::Category;
pub use project::{CobolAnalysisResult, ProjectAnalyzer, ProjectError, Workspace};
