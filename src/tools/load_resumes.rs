//! Resume loader - reads every PDF in a folder into one observation

use super::{Tool, ToolContext, ToolKind, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Marker placed in front of each resume so the model can tell them apart
pub const DOCUMENT_SEPARATOR: &str = "\n--- NOVO CURRÍCULO ---\n";

/// Failure turning one file into text
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("falha ao ler '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("falha ao extrair texto de '{}': {message}", path.display())]
    Pdf { path: PathBuf, message: String },
}

/// Turns a document on disk into plain text
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Text extraction backed by `pdf-extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractError::Pdf {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct LoadResumesInput {
    #[serde(default)]
    path: Option<String>,
}

/// Why a folder could not be loaded
#[derive(Debug)]
enum LoadError {
    NotFound,
    NoDocuments,
    Io(io::Error),
    Extract(ExtractError),
    Crashed(String),
}

/// Loads resumes from a folder of PDFs
pub struct LoadResumesTool {
    extractor: Arc<dyn TextExtractor>,
}

impl Default for LoadResumesTool {
    fn default() -> Self {
        Self::with_extractor(PdfTextExtractor)
    }
}

impl LoadResumesTool {
    pub fn with_extractor(extractor: impl TextExtractor + 'static) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }
}

#[async_trait]
impl Tool for LoadResumesTool {
    fn name(&self) -> &str {
        ToolKind::LoadResumes.name()
    }

    fn description(&self) -> String {
        "Carrega todos os textos de currículos em formato PDF de uma pasta específica.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Pasta com os currículos em PDF. Omita para usar a pasta padrão."
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let input: LoadResumesInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("❌ Erro: argumentos inválidos: {e}")),
        };

        let folder = input
            .path
            .filter(|p| !p.trim().is_empty())
            .map_or(ctx.resume_folder, PathBuf::from);
        let shown = folder.display().to_string();

        // pdf parsing is blocking and may panic on hostile input
        let extractor = Arc::clone(&self.extractor);
        let result = tokio::task::spawn_blocking(move || load_folder(&folder, extractor.as_ref()))
            .await
            .unwrap_or_else(|e| Err(LoadError::Crashed(e.to_string())));

        match result {
            Ok(documents) => {
                tracing::info!(folder = %shown, count = documents.len(), "Loaded resumes");
                ToolOutput::success(success_observation(&documents)).with_documents(documents)
            }
            Err(err) => {
                tracing::warn!(folder = %shown, error = ?err, "Failed to load resumes");
                ToolOutput::error(error_observation(&shown, err))
            }
        }
    }
}

fn load_folder(folder: &Path, extractor: &dyn TextExtractor) -> Result<Vec<String>, LoadError> {
    let entries = std::fs::read_dir(folder).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Io(e),
    })?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let path = entry.map_err(LoadError::Io)?.path();
        if path.is_file() && is_pdf(&path) {
            pdfs.push(path);
        }
    }
    if pdfs.is_empty() {
        return Err(LoadError::NoDocuments);
    }
    pdfs.sort();

    pdfs.iter()
        .map(|path| extractor.extract(path).map_err(LoadError::Extract))
        .collect()
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn success_observation(documents: &[String]) -> String {
    let mut out = format!(
        "✅ Documentos carregados com sucesso. Total de {} currículos. Conteúdo a ser analisado: \n",
        documents.len()
    );
    for doc in documents {
        out.push_str(DOCUMENT_SEPARATOR);
        out.push_str(doc);
    }
    out
}

fn error_observation(folder: &str, err: LoadError) -> String {
    match err {
        LoadError::NotFound => {
            format!("❌ Erro: O caminho da pasta '{folder}' não foi encontrado. Verifique o caminho.")
        }
        LoadError::NoDocuments => format!("❌ Erro: Nenhum arquivo PDF encontrado na pasta: {folder}"),
        LoadError::Io(e) => format!("❌ Erro ao carregar PDFs: {e}"),
        LoadError::Extract(e) => format!("❌ Erro ao carregar PDFs: {e}"),
        LoadError::Crashed(e) => format!("❌ Erro ao carregar PDFs: extração interrompida ({e})"),
    }
}
