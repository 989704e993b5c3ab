use serde::{Deserialize, Serialize};

entity_id!(
    /// Identifier of a catalog product.
    ProductId,
    "product"
);

/// A catalog entry. Prices are integer currency units (VND).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: u64,
    #[serde(default, alias = "imageUrl")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<u64>,
    pub image: Option<String>,
}

/// A product as an order line names it. Kept as the client sent it, since a line may
/// point at a store other than this one (a remote catalog with its own id scheme).
/// JSON numbers are accepted and kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawProductRef", into = "String")]
pub struct ProductRef(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProductRef {
    Text(String),
    Number(u64),
}

impl TryFrom<RawProductRef> for ProductRef {
    type Error = String;

    fn try_from(raw: RawProductRef) -> Result<Self, Self::Error> {
        let text = match raw {
            RawProductRef::Text(text) => text.trim().to_string(),
            RawProductRef::Number(n) => n.to_string(),
        };
        if text.is_empty() {
            return Err("product reference must not be empty".into());
        }
        Ok(Self(text))
    }
}

impl ProductRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id in this process's product store, if the reference is in its format.
    pub fn local_id(&self) -> Option<ProductId> {
        self.0.parse().ok()
    }
}

impl From<ProductId> for ProductRef {
    fn from(id: ProductId) -> Self {
        Self(id.to_string())
    }
}

impl From<ProductRef> for String {
    fn from(product: ProductRef) -> Self {
        product.0
    }
}

impl std::fmt::Display for ProductRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an order copies from a product when it is priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product: ProductRef,
    pub name: String,
    pub price: u64,
    pub image: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            product: product.id.into(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}
