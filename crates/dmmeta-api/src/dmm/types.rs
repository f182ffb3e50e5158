use serde::Deserialize;

use dmmeta_core::MetadataRecord;

// ── JSON-LD (`script[type="application/ld+json"]`) ───────────────

/// Either a single product block or an array of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LdDocument {
    One(LdProduct),
    Many(Vec<LdProduct>),
}

impl LdDocument {
    /// The product block. In an array the first `Product` wins, falling
    /// back to the first element when none is typed.
    pub fn into_first(self) -> Option<LdProduct> {
        match self {
            Self::One(product) => Some(product),
            Self::Many(mut products) => {
                let index = products
                    .iter()
                    .position(LdProduct::is_product)
                    .unwrap_or(0);
                (index < products.len()).then(|| products.swap_remove(index))
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdProduct {
    #[serde(rename = "@type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub image: Option<OneOrMany>,
    pub description: Option<String>,
    pub sku: Option<String>,
    #[serde(default)]
    pub subject_of: LdVideoObject,
    #[serde(default)]
    pub aggregate_rating: LdRating,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdVideoObject {
    pub content_url: Option<String>,
    pub genre: Option<OneOrMany>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdRating {
    /// Rendered as a string on some pages and a number on others.
    pub rating_value: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }

    pub fn as_strs(&self) -> Vec<&str> {
        match self {
            Self::One(s) => vec![s.as_str()],
            Self::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// Product fields after seeding absent or blank values from the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub image: String,
}

impl LdProduct {
    pub fn is_product(&self) -> bool {
        self.kind.as_deref() == Some("Product")
    }

    /// Fill the unconditionally applied fields from what the record already
    /// knows, so a sparse block never blanks them.
    pub fn seeded(&self, record: &MetadataRecord) -> SeededProduct {
        fn pick(value: Option<&str>, seed: &str) -> String {
            match value.map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => seed.to_string(),
            }
        }

        let image = self
            .image
            .as_ref()
            .and_then(|i| i.as_strs().first().copied());

        SeededProduct {
            sku: pick(self.sku.as_deref(), &record.id),
            name: pick(self.name.as_deref(), &record.title),
            description: pick(self.description.as_deref(), &record.summary),
            image: pick(image, &record.thumb_url),
        }
    }

    pub fn rating_text(&self) -> Option<String> {
        match self.aggregate_rating.rating_value.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

// ── Sample player payload (`const args = {...};`) ────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PlayerArgs {
    #[serde(default)]
    pub bitrates: Vec<Bitrate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bitrate {
    #[serde(default)]
    pub bitrate: u64,
    #[serde(default)]
    pub src: String,
}
