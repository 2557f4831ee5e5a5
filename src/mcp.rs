use anyhow::Result;
use base64::Engine;
use parking_lot::Mutex;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::cuts::{interactive_config, Axis};
use crate::pdf::render::{RenderOptions, DEFAULT_RENDER_WIDTH};
use crate::session::Session;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfLoadRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfPreviewRequest {
    #[schemars(description = "Page to render (1-indexed, default: 1)")]
    #[serde(default = "default_page")]
    pub page: u32,
    #[schemars(description = "Cut direction: 'vertical' or 'horizontal' (default: vertical)")]
    #[serde(default)]
    pub axis: Axis,
    #[schemars(description = "Number of parts per page, 2-6 (default: 3, or as many as the cuts describe)")]
    pub count: Option<u32>,
    #[schemars(description = "Comma separated cut positions in percent (e.g., '30,70'); even split when empty")]
    #[serde(default)]
    pub cuts: String,
    #[schemars(description = "Image width in pixels (default: 1200)")]
    #[serde(default = "default_width")]
    pub width: u16,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Cut direction: 'vertical' or 'horizontal' (default: vertical)")]
    #[serde(default)]
    pub axis: Axis,
    #[schemars(description = "Number of parts per page, 2-6 (default: 3, or as many as the cuts describe)")]
    pub count: Option<u32>,
    #[schemars(description = "Comma separated cut positions in percent (e.g., '30,70'); even split when empty")]
    #[serde(default)]
    pub cuts: String,
    #[schemars(description = "Output file path; a temporary file owned by the session is used when omitted")]
    pub output: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_width() -> u16 {
    DEFAULT_RENDER_WIDTH
}

/// MCP front end for one splitting session. The loaded document persists
/// across tool calls until the next `pdf_load`.
#[derive(Clone)]
pub struct PdfSplitServer {
    session: Arc<Mutex<Session>>,
    tool_router: ToolRouter<Self>,
}

impl PdfSplitServer {
    pub fn new() -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfSplitServer {
    fn default() -> Self {
        Self::new()
    }
}

fn error_message(e: impl std::fmt::Display) -> String {
    tracing::warn!(error = %e, "tool call failed");
    format!("Error: {}", e)
}

#[tool_router]
impl PdfSplitServer {
    #[tool(description = "Load a PDF into the session, replacing any previously loaded one. Returns the page count and page sizes.")]
    fn pdf_load(&self, Parameters(PdfLoadRequest { path }): Parameters<PdfLoadRequest>) -> String {
        let mut session = self.session.lock();
        let page_count = match session.load_path(&path) {
            Ok(count) => count,
            Err(e) => return error_message(e),
        };

        let pages = match session.splitter() {
            Ok(splitter) => splitter
                .page_boxes()
                .into_iter()
                .map(|(page, rect)| PageSizeResult {
                    page,
                    width: rect.width(),
                    height: rect.height(),
                })
                .collect(),
            Err(e) => return error_message(e),
        };

        let result = LoadResult {
            path,
            page_count,
            pages,
        };
        serde_json::to_string_pretty(&result).unwrap_or_else(error_message)
    }

    #[tool(description = "Render a page of the loaded PDF as PNG with the cut lines drawn over it")]
    fn pdf_preview_cuts(&self, Parameters(req): Parameters<PdfPreviewRequest>) -> String {
        let config = match interactive_config(req.axis, req.count, &req.cuts) {
            Ok(c) => c,
            Err(e) => return error_message(e),
        };

        let session = self.session.lock();
        let preview = match session.preview(req.page, &config, &RenderOptions { width: req.width }) {
            Ok(p) => p,
            Err(e) => return error_message(e),
        };
        let png = match preview.to_png() {
            Ok(png) => png,
            Err(e) => return error_message(e),
        };

        let result = PreviewResult {
            page: preview.page,
            axis: preview.axis,
            cut_percentages: preview.cut_percentages.clone(),
            width: preview.width(),
            height: preview.height(),
            data_base64: base64::engine::general_purpose::STANDARD.encode(&png),
            mime_type: "image/png".to_string(),
        };
        serde_json::to_string_pretty(&result).unwrap_or_else(error_message)
    }

    #[tool(description = "Cut every page of the loaded PDF into parts along the cut lines and save the result as a new PDF")]
    fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        let config = match interactive_config(req.axis, req.count, &req.cuts) {
            Ok(c) => c,
            Err(e) => return error_message(e),
        };

        let mut session = self.session.lock();
        let outcome = match session.split(&config, req.output.as_deref().map(Path::new)) {
            Ok(o) => o,
            Err(e) => return error_message(e),
        };

        let result = SplitResult {
            output_path: outcome.path.display().to_string(),
            source_pages: outcome.source_pages,
            parts_per_page: outcome.parts_per_page as u32,
            page_count: outcome.page_count,
        };
        serde_json::to_string_pretty(&result).unwrap_or_else(error_message)
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageSizeResult {
    pub page: u32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LoadResult {
    pub path: String,
    pub page_count: u32,
    pub pages: Vec<PageSizeResult>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PreviewResult {
    pub page: u32,
    pub axis: Axis,
    pub cut_percentages: Vec<f32>,
    pub width: u32,
    pub height: u32,
    pub data_base64: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SplitResult {
    pub output_path: String,
    pub source_pages: u32,
    pub parts_per_page: u32,
    pub page_count: u32,
}

#[tool_handler]
impl ServerHandler for PdfSplitServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page splitting tools. Use pdf_load to open a PDF, pdf_preview_cuts to see \
                 where a page will be cut, and pdf_split to cut every page into parts and write \
                 the result to a new PDF."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfSplitServer::new();
    tracing::info!("starting MCP server on stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
