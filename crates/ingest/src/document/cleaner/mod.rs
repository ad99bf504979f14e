//! Heuristic reformatting of raw PDF text into readable markdown.
//!
//! Rules run in a fixed order; later rules rely on the whitespace and line
//! structure produced by earlier ones. The output is deterministic but not
//! idempotent: cleaning already-cleaned text may promote headings twice, so
//! callers clean raw extractor output exactly once.

use std::sync::LazyLock;

use regex::{Captures, Regex};


static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\s+([A-Z])").unwrap());

static PATIENT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(PATIENT|NAME|DOB|DATE OF BIRTH|AGE|GENDER|SEX|TEST DATE|REPORT DATE|DOCTOR|PHYSICIAN):\s*",
    )
    .unwrap()
});

static TEST_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Z][A-Za-z0-9 ]*):[ \t]*([0-9]+(?:[.,][0-9]+)*)(?:[ \t]*([a-zA-Z%/]+))?(?:[ \t]+(Normal|Abnormal|High|Low|Critical)\b)?",
    )
    .unwrap()
});

static PAREN_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*ref[^)]*\)").unwrap());

static NUMERIC_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*-\s*([0-9]+(?:\.[0-9]+)?)").unwrap());

static REFERENCE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)reference\s+range[^0-9]*([0-9]+(?:\.[0-9]+)?)\s*-\s*([0-9]+(?:\.[0-9]+)?)")
        .unwrap()
});

static SECTION_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(COMPLETE BLOOD COUNT|CBC|LIPID PROFILE|LIVER FUNCTION|KIDNEY FUNCTION|THYROID FUNCTION|DIABETES|BLOOD SUGAR|CHOLESTEROL|HEMOGLOBIN|BLOOD PRESSURE)\b",
    )
    .unwrap()
});

static EXCESS_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

const STATUS_WORDS: &[&str] = &["Normal", "Abnormal", "High", "Low", "Critical"];

/// Convert raw extracted text into structured, markdown-like text.
pub fn clean_text(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let text = WHITESPACE_RUN.replace_all(raw, " ");
    let text = text.trim();
    let text = SENTENCE_BREAK.replace_all(text, ".\n\n${1}");
    let text = PATIENT_LABEL.replace_all(&text, "\n\n**${1}:** ");
    let text = render_result_bullets(&text);
    let text = annotate_reference_ranges(&text);
    let text = promote_section_titles(&text);
    let text = collapse_line_breaks(&text);
    let text = promote_caps_lines(&text);
    text.trim().to_string()
}

/// `Label: value unit status` → `- **Label:** value unit status`.
///
/// Reference-range fragments (`(Ref: 12-16)`, `Reference Range: 70-100`) are
/// left for [`annotate_reference_ranges`].
fn render_result_bullets(text: &str) -> String {
    TEST_RESULT
        .replace_all(text, |caps: &Captures| {
            let whole = &caps[0];
            let label = caps[1].trim();
            let start = caps.get(0).map_or(0, |m| m.start());
            if text[..start].ends_with('(') || label.to_lowercase().starts_with("ref") {
                return whole.to_string();
            }
            render_result_bullet(label, caps)
        })
        .into_owned()
}

fn render_result_bullet(label: &str, caps: &Captures) -> String {
    let value = &caps[2];
    let mut unit = caps.get(3).map(|m| m.as_str());
    let mut status = caps.get(4).map(|m| m.as_str());

    // "Glucose: 180 High" has no unit; the optional unit group swallowed the status.
    if status.is_none() && unit.is_some_and(|u| STATUS_WORDS.contains(&u)) {
        status = unit.take();
    }

    let mut fields = vec![value];
    fields.extend(unit);
    fields.extend(status);
    format!("\n- **{}:** {}", label, fields.join(" "))
}

fn annotate_reference_ranges(text: &str) -> String {
    let text = PAREN_REFERENCE.replace_all(text, |caps: &Captures| {
        match NUMERIC_RANGE.captures(&caps[0]) {
            Some(range) => format!("*(Normal: {}-{})*", &range[1], &range[2]),
            None => "*(Reference Range)*".to_string(),
        }
    });
    REFERENCE_RANGE
        .replace_all(&text, "*(Normal: ${1}-${2})*")
        .into_owned()
}

/// Panel names become `##` headers, except inside label and bullet lines.
fn promote_section_titles(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let head = line.trim_start();
            if head.starts_with("- **") || head.starts_with("**") {
                line.to_string()
            } else {
                SECTION_TITLE
                    .replace_all(line, "\n\n## ${1}\n")
                    .into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_line_breaks(text: &str) -> String {
    let trimmed = text.split('\n').map(str::trim).collect::<Vec<_>>().join("\n");
    EXCESS_BREAKS.replace_all(&trimmed, "\n\n").into_owned()
}

/// A line made only of 5+ uppercase letters and spaces is an implicit header.
fn promote_caps_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let is_caps_line = line.len() >= 5
                && line.chars().all(|c| c.is_ascii_uppercase() || c == ' ')
                && line.chars().any(|c| c.is_ascii_uppercase());
            if is_caps_line {
                format!("## {line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
