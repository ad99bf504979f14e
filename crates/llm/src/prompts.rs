//! Prompt templates for the classification gate and the health summary.
//!
//! Templates live in `crates/llm/prompts/` and are embedded at compile time.
//! Each carries exactly one `<<<report>>>` placeholder.

const CLASSIFIER_TEMPLATE: &str = include_str!("../prompts/medical-classifier.md");
const ANALYSIS_TEMPLATE: &str = include_str!("../prompts/health-analysis.md");

/// Placeholder replaced with report text.
pub const REPORT_PLACEHOLDER: &str = "<<<report>>>";
const SAMPLE_CHARS_PLACEHOLDER: &str = "<<<sample_chars>>>";

/// Strict-classifier prompt over the first `sample_chars` characters of `text`.
pub fn classification_prompt(text: &str, sample_chars: usize) -> String {
    let sample: String = text.chars().take(sample_chars).collect();
    CLASSIFIER_TEMPLATE
        .replace(SAMPLE_CHARS_PLACEHOLDER, &sample_chars.to_string())
        .replace(REPORT_PLACEHOLDER, &format!("{sample}..."))
}

/// Structured-summary prompt over the full cleaned report.
pub fn analysis_prompt(text: &str) -> String {
    ANALYSIS_TEMPLATE.replace(REPORT_PLACEHOLDER, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_have_exactly_one_report_placeholder() {
        assert_eq!(CLASSIFIER_TEMPLATE.matches(REPORT_PLACEHOLDER).count(), 1);
        assert_eq!(ANALYSIS_TEMPLATE.matches(REPORT_PLACEHOLDER).count(), 1);
    }

    #[test]
    fn classification_prompt_truncates_by_characters() {
        // Multi-byte characters must not split a code point.
        let text = "é".repeat(3000);
        let prompt = classification_prompt(&text, 2000);
        assert!(prompt.contains(&format!("{}...", "é".repeat(2000))));
        assert!(!prompt.contains(&"é".repeat(2001)));
        assert!(prompt.contains("first 2000 characters"));
        assert!(!prompt.contains(REPORT_PLACEHOLDER));
    }

    #[test]
    fn classification_prompt_asks_for_json_verdict() {
        let prompt = classification_prompt("Hemoglobin: 13.5 g/dL", 2000);
        assert!(prompt.contains("\"isValid\""));
        assert!(prompt.contains("\"confidence\""));
        assert!(prompt.contains("\"reason\""));
        assert!(prompt.contains("Prescription medications with dosages"));
        assert!(prompt.contains("Food menus, recipes"));
        assert!(prompt.trim_end().ends_with("Respond only with valid JSON:"));
    }

    #[test]
    fn analysis_prompt_embeds_full_report() {
        let report = "x".repeat(5000);
        let prompt = analysis_prompt(&report);
        assert!(prompt.contains(&report));
        for section in ["**Summary**", "**Key Findings**", "**Recommendations**", "**Next Steps**"] {
            assert!(prompt.contains(section), "missing {section}");
        }
        for indicator in ["🟢", "🟡", "🔴"] {
            assert!(prompt.contains(indicator));
        }
    }
}
