//! PDF text extraction with an ordered ladder of fallback strategies.
//!
//! Strategies run strictly in sequence; the first one that yields non-empty
//! text wins. When none does, the first failure message is classified into a
//! [`PdfFailureKind`].

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use super::cleaner::clean_text;
use super::{ExtractionError, PdfFailureKind};

/// Pages read by the relaxed fallback.
pub const RELAXED_PAGE_LIMIT: usize = 50;
/// Pages read by the limited fallback.
pub const LIMITED_PAGE_LIMIT: usize = 5;

/// A strategy reads the raw PDF bytes and returns text or a parser message.
pub type StrategyFn = fn(&[u8]) -> Result<String, String>;

#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub run: StrategyFn,
}

impl Strategy {
    pub const fn new(name: &'static str, run: StrategyFn) -> Self {
        Self { name, run }
    }
}

/// Primary strategy followed by the three fallbacks, narrowest last.
pub fn default_strategies() -> Vec<Strategy> {
    vec![
        Strategy::new("primary", extract_all_pages),
        Strategy::new("relaxed", extract_relaxed),
        Strategy::new("limited", extract_limited),
        Strategy::new("bare", extract_bare),
    ]
}

#[derive(Clone)]
pub struct PdfExtractor {
    strategies: Vec<Strategy>,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::with_strategies(default_strategies())
    }
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategies(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name).collect()
    }

    /// Extract and clean text from a PDF buffer.
    pub fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let raw = self.extract_raw(bytes)?;
        Ok(clean_text(&raw))
    }

    /// Run the strategy ladder and return the first non-empty raw text.
    pub fn extract_raw(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut first_error: Option<String> = None;

        for strategy in &self.strategies {
            debug!("Trying PDF extraction strategy '{}'", strategy.name);
            match run_guarded(strategy, bytes) {
                Ok(text) if !text.trim().is_empty() => {
                    info!(
                        "PDF extraction strategy '{}' succeeded ({} chars)",
                        strategy.name,
                        text.len()
                    );
                    return Ok(text);
                }
                Ok(_) => {
                    warn!("PDF extraction strategy '{}' returned no text", strategy.name);
                }
                Err(message) => {
                    warn!("PDF extraction strategy '{}' failed: {}", strategy.name, message);
                    first_error.get_or_insert(message);
                }
            }
        }

        match first_error {
            Some(message) => {
                let kind = PdfFailureKind::classify(&message);
                warn!("All PDF extraction strategies failed (kind={})", kind);
                Err(ExtractionError::Failed { kind, message })
            }
            None => {
                warn!("All PDF extraction strategies returned empty text");
                Err(ExtractionError::NoText)
            }
        }
    }
}

/// pdf-extract panics on some malformed fonts; treat that as a strategy failure.
fn run_guarded(strategy: &Strategy, bytes: &[u8]) -> Result<String, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| (strategy.run)(bytes))) {
        Ok(result) => result,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("PDF parser panicked: {detail}"))
        }
    }
}

// ── Strategies ────────────────────────────────────────

fn extract_all_pages(bytes: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())
}

fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, String> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())
}

/// First 50 pages, whitespace normalised line by line, pages kept apart.
fn extract_relaxed(bytes: &[u8]) -> Result<String, String> {
    let narrowed = first_pages(bytes, RELAXED_PAGE_LIMIT)?;
    let pages = extract_pages(&narrowed)?;
    Ok(pages
        .iter()
        .map(|page| normalize_whitespace(page))
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// First 5 pages, text untouched.
fn extract_limited(bytes: &[u8]) -> Result<String, String> {
    let narrowed = first_pages(bytes, LIMITED_PAGE_LIMIT)?;
    Ok(extract_pages(&narrowed)?.join("\n"))
}

/// Rewrite the document keeping only its first `limit` pages, so pages past
/// the limit are never parsed. Short documents are returned as-is.
fn first_pages(bytes: &[u8], limit: usize) -> Result<Vec<u8>, String> {
    let mut doc = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;
    let beyond: Vec<u32> = doc
        .get_pages()
        .keys()
        .copied()
        .filter(|&n| n as usize > limit)
        .collect();
    if beyond.is_empty() {
        return Ok(bytes.to_vec());
    }

    debug!("Dropping {} pages beyond the first {}", beyond.len(), limit);
    doc.delete_pages(&beyond);
    doc.prune_objects();

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| e.to_string())?;
    Ok(out)
}

/// Independent parse through lopdf with no options.
fn extract_bare(bytes: &[u8]) -> Result<String, String> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    doc.extract_text(&page_numbers).map_err(|e| e.to_string())
}

fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
