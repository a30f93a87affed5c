use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mainframe_lens::analyzer::Analyzer;
use mainframe_lens::classifier::{self, UploadedFile};
use mainframe_lens::config::Config;
use mainframe_lens::mcp::server::{McpContext, McpServer};
use mainframe_lens::project::ProjectAnalyzer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(version, about = "COBOL/JCL structural scanner and mainframe file classifier")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve MCP tools over stdio (default)
    Serve,
    /// Classify files and print the category buckets as JSON
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Analyze a single .cbl/.cpy/.jcl file
    Analyze { file: PathBuf },
    /// Analyze every source file of an uploaded project
    Project {
        project_id: String,
        /// Print the result without writing cobol_analysis.json
        #[arg(long)]
        no_save: bool,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load config
    let config = Config::load(&cli.config)?;
    config.validate().context("invalid configuration")?;

    // 2. Init logging
    let _guard = mainframe_lens::logging::init(
        &config.log_level,
        config.log_file.as_deref().map(Path::new),
    )?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting mainframe-lens MCP server...");
            let ctx = McpContext {
                config: Arc::new(config),
            };
            McpServer::new(ctx).start().await?;
        }
        Command::Classify { files } => {
            let mut inputs = Vec::with_capacity(files.len());
            for path in &files {
                let bytes =
                    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
                let content = String::from_utf8_lossy(&bytes).into_owned();
                inputs.push((display_name(path), UploadedFile::Text(content)));
            }
            print_json(&classifier::classify_files(inputs))?;
        }
        Command::Analyze { file } => {
            let analysis = Analyzer::new()
                .analyze_file(&file)
                .with_context(|| format!("analysis failed for {}", file.display()))?;
            print_json(&analysis)?;
        }
        Command::Project {
            project_id,
            no_save,
        } => {
            let analyzer = ProjectAnalyzer::new(&config);
            let result = if no_save {
                analyzer.analyze_project(&project_id)?
            } else {
                let (result, path) = analyzer.analyze_and_store(&project_id)?;
                info!("Wrote {}", path.display());
                result
            };
            print_json(&result)?;
        }
    }

    Ok(())
}
