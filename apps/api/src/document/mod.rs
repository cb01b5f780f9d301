//! Résumé text extraction. PDF parsing itself is delegated to `pdf-extract`;
//! this module only gates the format and assembles page text.

pub mod handlers;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::warn;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid format. Please upload a PDF.")]
    Format { content_type: Option<String> },

    #[error("PDF Error: Document might be encrypted or non-standard.")]
    Extraction { detail: String },
}

/// Turns a document into per-page plain text.
pub trait DocumentExtractor: Send + Sync {
    fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>, DocumentError>;
}

/// `pdf-extract` backed extractor.
pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>, DocumentError> {
        pdf_extract::extract_text_from_mem_by_pages(data).map_err(|e| DocumentError::Extraction {
            detail: e.to_string(),
        })
    }
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Rejects anything not declared as `application/pdf`.
pub fn ensure_pdf(upload: &Upload) -> Result<(), DocumentError> {
    let is_pdf = upload
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false);

    if is_pdf {
        Ok(())
    } else {
        Err(DocumentError::Format {
            content_type: upload.content_type.clone(),
        })
    }
}

/// Runs the extractor off the async runtime. A panicking parser is reported as
/// an extraction failure rather than taking the request down.
pub async fn extract_pages(
    extractor: Arc<dyn DocumentExtractor>,
    data: Bytes,
) -> Result<Vec<String>, DocumentError> {
    tokio::task::spawn_blocking(move || extractor.extract_pages(&data))
        .await
        .unwrap_or_else(|join_error| {
            warn!("PDF extractor aborted: {join_error}");
            Err(DocumentError::Extraction {
                detail: join_error.to_string(),
            })
        })
}

/// Appends one page to the accumulated text; every page is newline-terminated.
pub fn append_page(text: &mut String, page: &str) {
    text.push_str(page);
    text.push('\n');
}
