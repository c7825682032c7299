//! Core domain model for FoodCheck product analysis.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `Product`: the product record returned by the lookup service
//! - `ProductSignal`: the subset of a product the classifier reads
//! - `Verdict`: Safe, Caution, Dangerous
//! - `AnalysisResult`: the classified outcome for one product

use serde::{Deserialize, Deserializer, Serialize};

/// Overall verdict for an analyzed product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// No dangerous or questionable ingredients matched
    Safe,
    /// Only questionable ingredients or additives matched
    Caution,
    /// At least one dangerous ingredient matched
    Dangerous,
}

impl Verdict {
    /// Get a human-readable label for this verdict.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Caution => "CAUTION",
            Self::Dangerous => "DANGEROUS",
        }
    }
}

impl From<&str> for Verdict {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "safe" => Self::Safe,
            "dangerous" => Self::Dangerous,
            _ => Self::Caution,
        }
    }
}

/// A product record as returned by the lookup service.
///
/// Every field is optional on the wire; a missing or `null` field
/// deserializes to its empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Barcode the record was found under
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub product_name: String,

    /// Comma-separated brand names
    #[serde(default, deserialize_with = "null_as_default")]
    pub brands: String,

    /// Structured ingredient list
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<Ingredient>,

    /// Free-text composition as printed on the package
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients_text: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,

    /// Additive tags, usually namespaced (e.g. `en:e471`)
    #[serde(default, deserialize_with = "null_as_default")]
    pub additives_tags: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub allergens: String,
}

impl Product {
    /// Create a minimal record for testing.
    pub fn new(code: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            product_name: product_name.into(),
            ..Default::default()
        }
    }

    pub fn with_composition(mut self, text: impl Into<String>) -> Self {
        self.ingredients_text = text.into();
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_additives(mut self, tags: Vec<String>) -> Self {
        self.additives_tags = tags;
        self
    }
}

/// One entry of a product's structured ingredient list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Taxonomy id (e.g. `en:palm-oil`)
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Ingredient text in the product's language
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,

    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub percent_min: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub percent_max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegetarian: Option<String>,
}

impl Ingredient {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Envelope returned by the lookup service for a barcode query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductResponse {
    /// 1 when the product was found
    #[serde(default)]
    pub status: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_verbose: Option<String>,

    #[serde(default)]
    pub product: Option<Product>,
}

impl ProductResponse {
    pub fn is_found(&self) -> bool {
        self.status == 1 && self.product.is_some()
    }
}

/// The part of a product record the classifier consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSignal {
    /// Free-text composition
    #[serde(default)]
    pub composition: String,

    /// Discrete ingredient entries
    #[serde(default)]
    pub ingredients: Vec<IngredientEntry>,

    /// Additive tags, possibly namespaced
    #[serde(default)]
    pub additives: Vec<String>,
}

impl ProductSignal {
    pub fn new(composition: impl Into<String>) -> Self {
        Self {
            composition: composition.into(),
            ..Default::default()
        }
    }

    pub fn with_ingredients<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = texts.into_iter().map(IngredientEntry::new).collect();
        self
    }

    pub fn with_additives<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additives = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.composition.is_empty() && self.ingredients.is_empty() && self.additives.is_empty()
    }
}

impl From<&Product> for ProductSignal {
    fn from(product: &Product) -> Self {
        Self {
            composition: product.ingredients_text.clone(),
            ingredients: product
                .ingredients
                .iter()
                .map(|i| IngredientEntry::new(i.text.clone()))
                .collect(),
            additives: product.additives_tags.clone(),
        }
    }
}

/// A single structured ingredient as seen by the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientEntry {
    #[serde(default)]
    pub text: String,
}

impl IngredientEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Classified outcome for one product.
///
/// Built in a single classification pass and not modified afterwards.
/// `dangerous` and `warnings` hold each description once, in order of
/// first match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The input the result was computed from
    pub product: ProductSignal,

    /// Descriptions of dangerous ingredients
    pub dangerous: Vec<String>,

    /// Descriptions of questionable ingredients and additives
    pub warnings: Vec<String>,

    pub verdict: Verdict,

    /// Human-facing recommendation lines
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// Only a `Safe` verdict counts as healthy.
    pub fn is_healthy(&self) -> bool {
        self.verdict == Verdict::Safe
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// The lookup service emits percentages both as numbers and as strings.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_verdict_from_str() {
        assert_eq!(Verdict::from("SAFE"), Verdict::Safe);
        assert_eq!(Verdict::from("dangerous"), Verdict::Dangerous);
        assert_eq!(Verdict::from("Caution"), Verdict::Caution);
        assert_eq!(Verdict::from("whatever"), Verdict::Caution);
    }

    #[test]
    fn test_product_deserialization() {
        let json = r#"{
            "code": "4006381333931",
            "product_name": "Chocolate spread",
            "brands": null,
            "ingredients_text": "Sugar, palm oil, hazelnuts",
            "ingredients": [
                {"id": "en:sugar", "text": "Sugar", "percent_estimate": 55},
                {"id": "en:palm-oil", "text": "palm oil", "percent": "20.5"},
                {"id": "en:hazelnut", "text": "hazelnuts", "percent": 13}
            ],
            "additives_tags": ["en:e322"]
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.code, "4006381333931");
        assert_eq!(product.brands, "");
        assert_eq!(product.ingredients.len(), 3);
        assert_eq!(product.ingredients[0].percent, None);
        assert_eq!(product.ingredients[1].percent, Some(20.5));
        assert_eq!(product.ingredients[2].percent, Some(13.0));
        assert_eq!(product.additives_tags, vec!["en:e322".to_string()]);
        assert_eq!(product.allergens, "");
    }

    #[test]
    fn test_response_envelope() {
        let found: ProductResponse =
            serde_json::from_str(r#"{"status": 1, "product": {"code": "12345678"}}"#).unwrap();
        assert!(found.is_found());

        let missing: ProductResponse =
            serde_json::from_str(r#"{"status": 0, "status_verbose": "product not found"}"#)
                .unwrap();
        assert!(!missing.is_found());
    }

    #[test]
    fn test_signal_from_product() {
        let product = Product::new("12345678", "Test")
            .with_composition("water, salt")
            .with_ingredients(vec![Ingredient::new("water"), Ingredient::new("salt")])
            .with_additives(vec!["en:e471".to_string()]);

        let signal = ProductSignal::from(&product);
        assert_eq!(
            signal,
            ProductSignal::new("water, salt")
                .with_ingredients(["water", "salt"])
                .with_additives(["en:e471"])
        );
        assert!(!signal.is_empty());
        assert!(ProductSignal::default().is_empty());
    }

    #[test]
    fn test_only_safe_is_healthy() {
        let mut result = AnalysisResult {
            product: ProductSignal::default(),
            dangerous: Vec::new(),
            warnings: Vec::new(),
            verdict: Verdict::Safe,
            recommendations: Vec::new(),
        };
        assert!(result.is_healthy());

        result.verdict = Verdict::Caution;
        assert!(!result.is_healthy());

        result.verdict = Verdict::Dangerous;
        assert!(!result.is_healthy());
    }
}
