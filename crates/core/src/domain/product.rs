use serde::{Deserialize, Serialize};

/// Product line a deal or contract is sold under.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductGroup {
    EnRoute,
    Quest,
    Stokbar,
    ServiceCore,
    Varuna,
    Hosting,
    Unidox,
    Other(String),
}

pub const KNOWN_PRODUCTS: [ProductGroup; 7] = [
    ProductGroup::EnRoute,
    ProductGroup::Quest,
    ProductGroup::Stokbar,
    ProductGroup::ServiceCore,
    ProductGroup::Varuna,
    ProductGroup::Hosting,
    ProductGroup::Unidox,
];

impl ProductGroup {
    pub fn parse(name: &str) -> Self {
        let compact: String = name
            .chars()
            .filter(|ch| !ch.is_whitespace() && *ch != '-' && *ch != '_')
            .collect::<String>()
            .to_lowercase();
        match compact.as_str() {
            "enroute" => Self::EnRoute,
            "quest" => Self::Quest,
            "stokbar" => Self::Stokbar,
            "servicecore" => Self::ServiceCore,
            "varuna" => Self::Varuna,
            "hosting" => Self::Hosting,
            "unidox" => Self::Unidox,
            _ => Self::Other(name.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::EnRoute => "EnRoute",
            Self::Quest => "Quest",
            Self::Stokbar => "Stokbar",
            Self::ServiceCore => "ServiceCore",
            Self::Varuna => "Varuna",
            Self::Hosting => "Hosting",
            Self::Unidox => "Unidox",
            Self::Other(name) => name.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for ProductGroup {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for ProductGroup {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<ProductGroup> for String {
    fn from(product: ProductGroup) -> Self {
        product.name().to_string()
    }
}

impl std::fmt::Display for ProductGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
