//! Human-readable rendering of product analysis.
//!
//! Converts an `AnalysisResult` into a text report and a one-line
//! summary suitable for terminal or chat display.

use foodcheck_model::{AnalysisResult, Product, Verdict};
use serde::{Deserialize, Serialize};

/// A compact summary of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub verdict: Verdict,

    /// One line, e.g. "CAUTION: 0 dangerous, 2 questionable"
    pub headline: String,

    pub dangerous_count: usize,
    pub warning_count: usize,
}

/// A titled block of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub items: Vec<String>,
    /// Render items as a bulleted list
    pub bulleted: bool,
}

/// Summarize an analysis on one line.
pub fn summarize(result: &AnalysisResult) -> Summary {
    let dangerous_count = result.dangerous.len();
    let warning_count = result.warnings.len();

    Summary {
        verdict: result.verdict,
        headline: format!(
            "{}: {} dangerous, {} questionable",
            result.verdict.label(),
            dangerous_count,
            warning_count
        ),
        dangerous_count,
        warning_count,
    }
}

/// Build the finding sections of a report; empty buckets are omitted.
pub fn sections(result: &AnalysisResult) -> Vec<Section> {
    let mut sections = Vec::new();

    if !result.dangerous.is_empty() {
        sections.push(Section {
            title: "DANGEROUS INGREDIENTS".to_string(),
            items: result.dangerous.clone(),
            bulleted: true,
        });
    }

    if !result.warnings.is_empty() {
        sections.push(Section {
            title: "QUESTIONABLE INGREDIENTS".to_string(),
            items: result.warnings.clone(),
            bulleted: true,
        });
    }

    sections.push(Section {
        title: "Recommendations".to_string(),
        items: result.recommendations.clone(),
        bulleted: false,
    });

    sections
}

/// Render a full report for a looked-up product.
pub fn render_report(product: &Product, result: &AnalysisResult) -> String {
    let mut out = format!(
        "{}\nBrand: {}\nBarcode: {}\n\nComposition:\n",
        or_unknown(&product.product_name),
        or_unknown(&product.brands),
        or_unknown(&product.code)
    );

    if product.ingredients_text.is_empty() {
        out.push_str("Not specified\n");
    } else {
        out.push_str(&product.ingredients_text);
        out.push('\n');
    }

    for section in sections(result) {
        out.push_str(&format!("\n{}:\n", section.title));
        for item in &section.items {
            if section.bulleted {
                out.push_str(&format!("  - {}\n", item));
            } else {
                out.push_str(&format!("{}\n", item));
            }
        }
    }

    out
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "Unknown"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodcheck_classify::{classify, RECOMMEND_SAFE};
    use foodcheck_lexicon::Lexicon;
    use foodcheck_model::ProductSignal;

    #[test]
    fn test_summarize() {
        let signal = ProductSignal::new("e250, palm oil").with_additives(["en:e471"]);
        let summary = summarize(&classify(&signal, Lexicon::builtin()));

        assert_eq!(summary.verdict, Verdict::Dangerous);
        assert_eq!(summary.dangerous_count, 1);
        assert_eq!(summary.warning_count, 2);
        assert_eq!(summary.headline, "DANGEROUS: 1 dangerous, 2 questionable");
    }

    #[test]
    fn test_safe_report_has_no_finding_sections() {
        let product = Product::new("12345678", "Mineral water").with_composition("water");
        let result = classify(&ProductSignal::from(&product), Lexicon::builtin());

        let report = render_report(&product, &result);
        assert!(report.starts_with("Mineral water\nBrand: Unknown\nBarcode: 12345678\n"));
        assert!(!report.contains("DANGEROUS"));
        assert!(!report.contains("QUESTIONABLE"));
        assert!(report.ends_with(&format!("Recommendations:\n{}\n", RECOMMEND_SAFE)));
    }

    #[test]
    fn test_report_lists_findings() {
        let product = Product::new("4006381333931", "Spread")
            .with_composition("sugar, palm oil, E621");
        let result = classify(&ProductSignal::from(&product), Lexicon::builtin());

        let report = render_report(&product, &result);
        assert!(report.contains("DANGEROUS INGREDIENTS:\n  - Monosodium glutamate"));
        assert!(report.contains("QUESTIONABLE INGREDIENTS:\n  - Palm oil\n"));
    }

    #[test]
    fn test_missing_composition() {
        let product = Product::new("12345678", "");
        let result = classify(&ProductSignal::from(&product), Lexicon::builtin());
        let report = render_report(&product, &result);
        assert!(report.starts_with("Unknown\n"));
        assert!(report.contains("Composition:\nNot specified\n"));
    }

    #[test]
    fn test_sections_order() {
        let result = classify(
            &ProductSignal::new("e102").with_ingredients(["gmo"]),
            Lexicon::builtin(),
        );
        let titles: Vec<_> = sections(&result).into_iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec!["DANGEROUS INGREDIENTS", "QUESTIONABLE INGREDIENTS", "Recommendations"]
        );
    }
}
