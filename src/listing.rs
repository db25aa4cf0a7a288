use serde::Deserialize;

/// Normalized internal listing type (provider-agnostic).
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: String,
    pub name: Option<String>,
    /// Minimum asking price in riyal. `None` covers both "field absent"
    /// and the API's zero-means-unknown convention.
    pub min_price: Option<u64>,
    pub banner_url: Option<String>,
}

const ID_PREFIX: &str = "project_";
const DETAIL_URL_BASE: &str = "https://sakani.sa/app/land-projects";

impl Listing {
    /// Public project page, derived from the listing id. Always available,
    /// so notifications stay useful even without a banner image.
    pub fn detail_url(&self) -> String {
        let number = self.id.strip_prefix(ID_PREFIX).unwrap_or(&self.id);
        format!("{}/{}", DETAIL_URL_BASE, number)
    }
}

/// Sakani search API response: `{"data": [...]}` with JSON:API-style
/// id/attributes elements.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: String,
    #[serde(default)]
    pub attributes: SearchAttributes,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchAttributes {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub min_non_bene_price: Option<f64>,
    #[serde(default)]
    pub banner_url: Option<String>,
}

impl From<SearchItem> for Listing {
    fn from(item: SearchItem) -> Self {
        // Zero is the API's stand-in for "price not published". Fractional
        // riyal amounts are truncated toward zero for display.
        let min_price = item
            .attributes
            .min_non_bene_price
            .filter(|p| *p > 0.0)
            .map(|p| p.trunc() as u64);
        Listing {
            id: item.id,
            name: item
                .attributes
                .project_name
                .filter(|n| !n.trim().is_empty()),
            min_price,
            banner_url: item.attributes.banner_url,
        }
    }
}
