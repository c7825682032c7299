//! Ingredient risk classification.
//!
//! Matches a product's composition text, structured ingredient list and
//! additive tags against a `Lexicon`, then derives a verdict and
//! recommendation lines.
//!
//! Matching is case-insensitive substring containment, not word
//! matching: "e1020" matches the code "e102". Results are deduplicated
//! by description, so two keywords sharing a description yield one line.

use foodcheck_lexicon::Lexicon;
use foodcheck_model::{AnalysisResult, IngredientEntry, ProductSignal, Verdict};
use foodcheck_text::{fold_case, strip_namespace, DedupList};

pub const RECOMMEND_DANGEROUS: &str = "Contains potentially dangerous ingredients";
pub const RECOMMEND_QUESTIONABLE: &str = "Contains questionable ingredients";
pub const RECOMMEND_SAFE: &str = "Appears safe";
pub const RECOMMEND_ADDITIVES: &str = "Pay attention to the food additives in the composition";

/// Matches from a single text, repeats included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMatches {
    pub dangerous: Vec<String>,
    pub warnings: Vec<String>,
}

/// Running, deduplicated matches across sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    pub dangerous: DedupList,
    pub warnings: DedupList,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge raw matches, dropping descriptions already present.
    pub fn absorb(&mut self, matches: RawMatches) {
        self.dangerous.extend(matches.dangerous);
        self.warnings.extend(matches.warnings);
    }

    /// Merge another accumulator, keeping this one's order first.
    pub fn merge(&mut self, other: Findings) {
        self.dangerous.extend(other.dangerous.into_vec());
        self.warnings.extend(other.warnings.into_vec());
    }
}

/// Match free composition text.
///
/// Empty text yields no matches. Nothing is deduplicated here.
pub fn classify_composition(text: &str, lexicon: &Lexicon) -> RawMatches {
    if text.is_empty() {
        return RawMatches::default();
    }
    match_text(&fold_case(text), lexicon)
}

/// Match each structured ingredient on its own text.
pub fn classify_ingredient_list(entries: &[IngredientEntry], lexicon: &Lexicon) -> Findings {
    let mut findings = Findings::new();
    for entry in entries {
        findings.absorb(match_text(&fold_case(&entry.text), lexicon));
    }
    findings
}

/// Look up additive tags by bare code.
///
/// Tags are stripped of their namespace and folded, so `en:E471` and
/// `e471` render the same warning.
pub fn classify_additives(tags: &[String], lexicon: &Lexicon) -> DedupList {
    let mut warnings = DedupList::new();
    for tag in tags {
        let code = fold_case(strip_namespace(tag.trim()));
        if let Some(description) = lexicon.additive(&code) {
            warnings.insert(format!("Additive {}: {}", code, description));
        }
    }
    warnings
}

/// Classify a product.
///
/// Sources are merged in a fixed order: composition, ingredient list,
/// additives. Calling this twice on the same input yields equal results.
pub fn classify(product: &ProductSignal, lexicon: &Lexicon) -> AnalysisResult {
    let mut findings = Findings::new();

    findings.absorb(classify_composition(&product.composition, lexicon));
    findings.merge(classify_ingredient_list(&product.ingredients, lexicon));
    findings
        .warnings
        .extend(classify_additives(&product.additives, lexicon).into_vec());

    let (verdict, recommendations) = recommend(&findings);

    AnalysisResult {
        product: product.clone(),
        dangerous: findings.dangerous.into_vec(),
        warnings: findings.warnings.into_vec(),
        verdict,
        recommendations,
    }
}

/// Derive the verdict and recommendation lines.
///
/// Dangerous matches take precedence over warnings. Warnings alone give
/// `Caution`, which is not healthy.
fn recommend(findings: &Findings) -> (Verdict, Vec<String>) {
    let mut recommendations = Vec::new();

    let verdict = if !findings.dangerous.is_empty() {
        recommendations.push(RECOMMEND_DANGEROUS.to_string());
        Verdict::Dangerous
    } else if !findings.warnings.is_empty() {
        recommendations.push(RECOMMEND_QUESTIONABLE.to_string());
        Verdict::Caution
    } else {
        recommendations.push(RECOMMEND_SAFE.to_string());
        Verdict::Safe
    };

    if !findings.warnings.is_empty() {
        recommendations.push(RECOMMEND_ADDITIVES.to_string());
    }

    (verdict, recommendations)
}

fn match_text(folded: &str, lexicon: &Lexicon) -> RawMatches {
    let mut matches = RawMatches::default();

    for entry in lexicon.dangerous() {
        if folded.contains(entry.token.as_str()) {
            matches.dangerous.push(entry.description.clone());
        }
    }

    for entry in lexicon.suspicious() {
        if folded.contains(entry.token.as_str()) {
            matches.warnings.push(entry.description.clone());
        }
    }

    matches
}
