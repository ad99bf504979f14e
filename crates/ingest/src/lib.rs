pub mod document;

pub use document::{clean_text, ExtractionError, PdfExtractor, PdfFailureKind, Strategy};
