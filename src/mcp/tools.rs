/// MCP Tool handlers for mainframe-lens.
///
/// 1. classify_files  – bucket uploaded files into mainframe artifact categories
/// 2. analyze_source  – structural scan of one COBOL / copybook / JCL member
/// 3. upload_project  – store sources under a new project id
/// 4. analyze_project – aggregate scan of a project, persisted as cobol_analysis.json
/// 5. get_analysis    – re-read a persisted project analysis
use crate::analyzer::Analyzer;
use crate::classifier::{self, UploadedFile};
use crate::mcp::server::McpContext;
use crate::project::{ProjectAnalyzer, ProjectError, Workspace};
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{ErrorData as McpError, handler::server::tool::ToolRouter, model::*, tool, tool_router};
use schemars::JsonSchema;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

// ── Parameter structs ────────────────────────────────────────────────

#[derive(Deserialize, JsonSchema)]
struct FilesParams {
    /// Map of filename to content, or to {fileName, content} objects
    #[serde(deserialize_with = "files_in_order")]
    #[schemars(with = "BTreeMap<String, UploadedFile>")]
    files: Vec<(String, UploadedFile)>,
}

/// Keep the client's submission order; bucket order follows it.
fn files_in_order<'de, D>(deserializer: D) -> Result<Vec<(String, UploadedFile)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FilesVisitor;

    impl<'de> Visitor<'de> for FilesVisitor {
        type Value = Vec<(String, UploadedFile)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of file name to file content")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut files = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, UploadedFile>()? {
                files.push(entry);
            }
            Ok(files)
        }
    }

    deserializer.deserialize_map(FilesVisitor)
}

#[derive(Deserialize, JsonSchema)]
struct SourceParams {
    /// File name; its extension (.cbl, .cpy, .jcl) selects the scanner
    file_name: String,
    /// Raw source text
    content: String,
}

#[derive(Deserialize, JsonSchema)]
struct ProjectParams {
    /// Project identifier returned by upload_project
    project_id: String,
}

// ── Response helpers ─────────────────────────────────────────────────

fn json_result(value: serde_json::Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&value).unwrap_or_default(),
    )]))
}

fn error_result(msg: &str) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.to_string())]))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, McpError> {
    serde_json::to_value(value)
        .map_err(|e| McpError::internal_error(format!("serialization failed: {e}"), None))
}

/// Client mistakes become tool errors; everything else is internal.
fn project_failure(e: ProjectError) -> Result<CallToolResult, McpError> {
    if e.is_client_error() {
        error_result(&e.to_string())
    } else {
        Err(McpError::internal_error(e.to_string(), None))
    }
}

// ── Tool implementations ─────────────────────────────────────────────

#[derive(Clone)]
pub struct AppTools {
    pub ctx: McpContext,
    pub tool_router: ToolRouter<Self>,
}

impl ServerHandler for AppTools {}

#[tool_router]
impl AppTools {
    pub fn new(ctx: McpContext) -> Self {
        Self {
            ctx,
            tool_router: Self::tool_router(),
        }
    }

    // ── Tool 1: classify_files ──────────────────────────────────────

    #[tool(
        description = "Classify uploaded files into COBOL Code, JCL, Copybooks, VSAM Definitions, BMS Maps, Control Files, Standards Documents or Unknown, by extension first and content keywords second."
    )]
    async fn classify_files(
        &self,
        params: Parameters<FilesParams>,
    ) -> Result<CallToolResult, McpError> {
        let classification = classifier::classify_files(params.0.files);
        let candidates: Vec<String> = classification
            .analysis_candidates()
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        json_result(serde_json::json!({
            "total": classification.total(),
            "classified": to_json(&classification)?,
            "analysis_candidates": candidates,
        }))
    }

    // ── Tool 2: analyze_source ──────────────────────────────────────

    #[tool(
        description = "Scan a single COBOL program (.cbl), copybook (.cpy) or JCL member (.jcl) and return divisions, variables, paragraphs, copybooks, CICS commands and JCL steps."
    )]
    async fn analyze_source(
        &self,
        params: Parameters<SourceParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        if p.file_name.is_empty() {
            return error_result("file_name is required");
        }

        match Analyzer::new().analyze_source(&p.file_name, &p.content) {
            Ok(analysis) => json_result(to_json(&analysis)?),
            Err(e) => json_result(serde_json::json!({
                "error": e.reason(),
                "detail": e.to_string(),
            })),
        }
    }

    // ── Tool 3: upload_project ──────────────────────────────────────

    #[tool(
        description = "Create a project from COBOL sources. Only .cbl, .cpy and .jcl files are stored; returns the new project_id."
    )]
    async fn upload_project(
        &self,
        params: Parameters<FilesParams>,
    ) -> Result<CallToolResult, McpError> {
        let files = classifier::normalize(params.0.files);
        if files.is_empty() {
            return error_result("no files provided");
        }

        let workspace = Workspace::new(&self.ctx.config);
        match workspace.create_project(files) {
            Ok(receipt) => json_result(to_json(&receipt)?),
            Err(e) => project_failure(e),
        }
    }

    // ── Tool 4: analyze_project ─────────────────────────────────────

    #[tool(
        description = "Analyze every COBOL, copybook and JCL file of a project and persist the result as cobol_analysis.json (replacing any previous run)."
    )]
    async fn analyze_project(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let project_id = params.0.project_id;
        let config = self.ctx.config.clone();

        let id = project_id.clone();
        let outcome =
            tokio::task::spawn_blocking(move || ProjectAnalyzer::new(&config).analyze_and_store(&id))
                .await
                .map_err(|e| McpError::internal_error(format!("analysis task failed: {e}"), None))?;

        match outcome {
            Ok((result, path)) => json_result(serde_json::json!({
                "project_id": project_id,
                "status": "Analysis completed",
                "files_analyzed": result.files.len(),
                "dependencies": result.dependencies,
                "output_path": path.to_string_lossy(),
            })),
            Err(e) => project_failure(e),
        }
    }

    // ── Tool 5: get_analysis ────────────────────────────────────────

    #[tool(description = "Return the persisted cobol_analysis.json of a project")]
    async fn get_analysis(
        &self,
        params: Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let workspace = Workspace::new(&self.ctx.config);
        match workspace.load_analysis(&params.0.project_id) {
            Ok(result) => json_result(to_json(&result)?),
            Err(e) => project_failure(e),
        }
    }
}
