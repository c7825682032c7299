//! Open Food Facts product lookup.
//!
//! Provides the `ProductSource` trait and its Open Food Facts
//! implementation. Classification never depends on this crate, so the
//! lookup service can be swapped without touching the analysis logic.

use std::future::Future;
use std::time::Duration;

use foodcheck_barcode::ValidatedBarcode;
use foodcheck_model::{Product, ProductResponse};
use thiserror::Error;

/// Errors from product lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Product {0} not found")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Lookup service not available")]
    Unavailable,
}

/// Trait for product lookup services.
pub trait ProductSource {
    /// Fetch the product record for a barcode.
    fn lookup(
        &self,
        barcode: &ValidatedBarcode,
    ) -> impl Future<Output = Result<Product, LookupError>> + Send;

    /// Check if the service is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), LookupError>> + Send;

    /// Get the service name for logging.
    fn name(&self) -> &'static str;
}

/// Open Food Facts client configuration.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for OpenFoodFactsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org/api/v0".to_string(),
            timeout_secs: 30,
            user_agent: format!("foodcheck/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Open Food Facts lookup backend.
pub struct OpenFoodFactsBackend {
    config: OpenFoodFactsConfig,
    client: reqwest::Client,
}

impl OpenFoodFactsBackend {
    /// Create a new backend.
    pub fn new(config: OpenFoodFactsConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LookupError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Build the product URL for a barcode.
    fn product_url(&self, barcode: &ValidatedBarcode) -> String {
        format!(
            "{}/product/{}.json",
            self.config.base_url.trim_end_matches('/'),
            barcode
        )
    }
}

impl ProductSource for OpenFoodFactsBackend {
    async fn lookup(&self, barcode: &ValidatedBarcode) -> Result<Product, LookupError> {
        let url = self.product_url(barcode);

        tracing::debug!(url = %url, "Fetching product");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Connection(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(barcode.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Connection(e.to_string()))?;

        let response: ProductResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Parse(e.to_string()))?;

        let product = found_product(response, barcode)?;
        tracing::debug!(
            barcode = %barcode,
            name = %product.product_name,
            ingredients = product.ingredients.len(),
            additives = product.additives_tags.len(),
            "Product found"
        );

        Ok(product)
    }

    async fn health_check(&self) -> Result<(), LookupError> {
        let response = self
            .client
            .get(self.config.base_url.trim_end_matches('/'))
            .send()
            .await
            .map_err(|e| LookupError::Connection(e.to_string()))?;

        // The API root answers with a redirect or a 404 page when the
        // service is up; only server errors count as unavailable.
        if response.status().is_server_error() {
            tracing::warn!(status = %response.status(), "Lookup service unhealthy");
            Err(LookupError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        "openfoodfacts"
    }
}

fn found_product(
    response: ProductResponse,
    barcode: &ValidatedBarcode,
) -> Result<Product, LookupError> {
    if !response.is_found() {
        return Err(LookupError::NotFound(barcode.to_string()));
    }
    response
        .product
        .ok_or_else(|| LookupError::NotFound(barcode.to_string()))
}

/// Parse a saved lookup response or a bare product record.
///
/// A document with a `status` key is read as a lookup envelope; an
/// envelope whose status is not 1 is reported as `NotFound`.
pub fn parse_product_document(json: &str) -> Result<Product, LookupError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| LookupError::Parse(e.to_string()))?;

    if value.get("status").is_none() {
        return serde_json::from_value(value).map_err(|e| LookupError::Parse(e.to_string()));
    }

    let response: ProductResponse =
        serde_json::from_value(value).map_err(|e| LookupError::Parse(e.to_string()))?;
    let found = response.is_found();

    match response.product {
        Some(product) if found => Ok(product),
        Some(product) => Err(LookupError::NotFound(product.code)),
        None => Err(LookupError::NotFound(String::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barcode(s: &str) -> ValidatedBarcode {
        ValidatedBarcode::try_from(s).unwrap()
    }

    #[test]
    fn test_product_url() {
        let backend = OpenFoodFactsBackend::new(OpenFoodFactsConfig::default()).unwrap();
        assert_eq!(
            backend.product_url(&barcode("4006381333931")),
            "https://world.openfoodfacts.org/api/v0/product/4006381333931.json"
        );
    }

    #[test]
    fn test_product_url_trailing_slash() {
        let config = OpenFoodFactsConfig {
            base_url: "http://localhost:8080/api/v2/".to_string(),
            ..Default::default()
        };
        let backend = OpenFoodFactsBackend::new(config).unwrap();
        assert_eq!(
            backend.product_url(&barcode("12345678")),
            "http://localhost:8080/api/v2/product/12345678.json"
        );
    }

    #[test]
    fn test_found_product() {
        let response: ProductResponse = serde_json::from_str(
            r#"{"status": 1, "product": {"code": "12345678", "product_name": "Water"}}"#,
        )
        .unwrap();
        let product = found_product(response, &barcode("12345678")).unwrap();
        assert_eq!(product.product_name, "Water");
    }

    #[test]
    fn test_missing_product() {
        let response: ProductResponse =
            serde_json::from_str(r#"{"status": 0, "status_verbose": "product not found"}"#)
                .unwrap();
        assert!(matches!(
            found_product(response, &barcode("12345678")),
            Err(LookupError::NotFound(code)) if code == "12345678"
        ));
    }

    #[test]
    fn test_parse_envelope_document() {
        let json = r#"{"status": 1, "product": {"code": "4006381333931", "ingredients_text": "palm oil"}}"#;
        let product = parse_product_document(json).unwrap();
        assert_eq!(product.code, "4006381333931");
        assert_eq!(product.ingredients_text, "palm oil");
    }

    #[test]
    fn test_parse_bare_document() {
        let json = r#"{"code": "12345678", "additives_tags": ["en:e471"]}"#;
        let product = parse_product_document(json).unwrap();
        assert_eq!(product.additives_tags, vec!["en:e471".to_string()]);
    }

    #[test]
    fn test_parse_not_found_document() {
        let json = r#"{"status": 0, "code": "12345678"}"#;
        assert!(matches!(
            parse_product_document(json),
            Err(LookupError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let config = OpenFoodFactsConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        let backend = OpenFoodFactsBackend::new(config).unwrap();

        let result = backend.lookup(&barcode("4006381333931")).await;
        assert!(matches!(result, Err(LookupError::Connection(_))));
        assert!(backend.health_check().await.is_err());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_product_document("not json"),
            Err(LookupError::Parse(_))
        ));
        assert!(matches!(
            parse_product_document("[1, 2]"),
            Err(LookupError::Parse(_))
        ));
    }
}
