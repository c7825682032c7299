//! Reference tables driving ingredient classification.
//!
//! Three mappings from a folded matching token to a description:
//! - dangerous codes (E-numbers matched anywhere in the text)
//! - suspicious keywords (free text, any language)
//! - additive codes (looked up by exact bare code)
//!
//! The built-in lexicon is constructed once and shared by reference.

use std::collections::BTreeMap;

use foodcheck_text::fold_case;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const DANGEROUS: &[(&str, &str)] = &[
    ("e951", "Aspartame (artificial sweetener)"),
    ("e621", "Monosodium glutamate (flavour enhancer)"),
    ("e250", "Sodium nitrite (preservative)"),
    ("e211", "Sodium benzoate (preservative)"),
    ("e102", "Tartrazine (colouring)"),
];

const SUSPICIOUS: &[(&str, &str)] = &[
    ("пальмовое масло", "Palm oil"),
    ("palm oil", "Palm oil"),
    ("гмо", "GMO"),
    ("gmo", "GMO"),
    ("трансжиры", "Trans fats"),
    ("trans fat", "Trans fats"),
    ("краситель", "Artificial colourings"),
    ("консервант", "Preservatives"),
    ("ароматизатор", "Artificial flavourings"),
    ("усилитель вкуса", "Flavour enhancers"),
];

const ADDITIVES: &[(&str, &str)] = &[
    ("e471", "Mono- and diglycerides of fatty acids (emulsifier)"),
    ("e440", "Pectin (thickener)"),
    ("e965", "Maltitol (sweetener)"),
    ("e422", "Glycerol (humectant)"),
    ("e150a", "Plain caramel (colouring)"),
    ("e306", "Tocopherol-rich extract (antioxidant)"),
];

static BUILTIN: Lazy<Lexicon> = Lazy::new(|| {
    Lexicon::new(
        DANGEROUS.iter().copied(),
        SUSPICIOUS.iter().copied(),
        ADDITIVES.iter().copied(),
    )
});

/// A matching token and the description it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub token: String,
    pub description: String,
}

impl LexiconEntry {
    fn folded(token: &str, description: &str) -> Self {
        Self {
            token: fold_case(token),
            description: description.to_string(),
        }
    }
}

/// Immutable classification tables.
///
/// Entry lists keep their declaration order so classification output
/// is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    dangerous: Vec<LexiconEntry>,
    suspicious: Vec<LexiconEntry>,
    additives: BTreeMap<String, String>,
}

impl Lexicon {
    /// Build a lexicon, folding every token.
    pub fn new<'a, D, S, A>(dangerous: D, suspicious: S, additives: A) -> Self
    where
        D: IntoIterator<Item = (&'a str, &'a str)>,
        S: IntoIterator<Item = (&'a str, &'a str)>,
        A: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            dangerous: dangerous
                .into_iter()
                .map(|(t, d)| LexiconEntry::folded(t, d))
                .collect(),
            suspicious: suspicious
                .into_iter()
                .map(|(t, d)| LexiconEntry::folded(t, d))
                .collect(),
            additives: additives
                .into_iter()
                .map(|(code, d)| (fold_case(code), d.to_string()))
                .collect(),
        }
    }

    /// The process-wide built-in lexicon.
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }

    /// Codes whose presence marks an ingredient as dangerous.
    pub fn dangerous(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.dangerous.iter()
    }

    /// Keywords whose presence marks an ingredient as questionable.
    pub fn suspicious(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.suspicious.iter()
    }

    /// Known additives, ordered by code.
    pub fn additives(&self) -> impl Iterator<Item = (&str, &str)> {
        self.additives.iter().map(|(c, d)| (c.as_str(), d.as_str()))
    }

    /// Look up a bare, folded additive code.
    pub fn additive(&self, code: &str) -> Option<&str> {
        self.additives.get(code).map(String::as_str)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sizes() {
        let lexicon = Lexicon::builtin();
        assert_eq!(lexicon.dangerous().count(), 5);
        assert_eq!(lexicon.suspicious().count(), 10);
        assert_eq!(lexicon.additives().count(), 6);
    }

    #[test]
    fn test_builtin_is_shared() {
        assert!(std::ptr::eq(Lexicon::builtin(), Lexicon::builtin()));
        assert_eq!(&Lexicon::default(), Lexicon::builtin());
    }

    #[test]
    fn test_tokens_are_folded() {
        let lexicon = Lexicon::new([("E999", "Test")], [("Palm OIL", "Palm oil")], [("E100", "Curcumin")]);
        assert_eq!(lexicon.dangerous().next().unwrap().token, "e999");
        assert_eq!(lexicon.suspicious().next().unwrap().token, "palm oil");
        assert_eq!(lexicon.additive("e100"), Some("Curcumin"));
        assert_eq!(lexicon.additive("E100"), None);
    }

    #[test]
    fn test_declaration_order_kept() {
        let tokens: Vec<_> = Lexicon::builtin().dangerous().map(|e| e.token.as_str()).collect();
        assert_eq!(tokens, vec!["e951", "e621", "e250", "e211", "e102"]);
    }

    #[test]
    fn test_shared_descriptions() {
        let palm: Vec<_> = Lexicon::builtin()
            .suspicious()
            .filter(|e| e.description == "Palm oil")
            .map(|e| e.token.as_str())
            .collect();
        assert_eq!(palm, vec!["пальмовое масло", "palm oil"]);
    }

    #[test]
    fn test_additive_lookup() {
        let lexicon = Lexicon::builtin();
        assert_eq!(lexicon.additive("e440"), Some("Pectin (thickener)"));
        assert_eq!(lexicon.additive("e150a"), Some("Plain caramel (colouring)"));
        assert_eq!(lexicon.additive("e951"), None);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(Lexicon::builtin()).unwrap();
        assert_eq!(json["dangerous"][0]["token"], "e951");
        assert_eq!(json["additives"]["e471"], "Mono- and diglycerides of fatty acids (emulsifier)");
    }
}
