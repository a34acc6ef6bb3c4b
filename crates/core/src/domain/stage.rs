use serde::{Deserialize, Serialize};

/// Display locale for stage labels and rendered narrative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Tr,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Tr => "tr",
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en_us" | "english" => Ok(Self::En),
            "tr" | "tr-tr" | "tr_tr" | "turkish" => Ok(Self::Tr),
            other => Err(format!("unsupported locale `{other}` (expected en|tr)")),
        }
    }
}

/// Terminal bucket a deal falls into for every aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageBucket {
    Won,
    Lost,
    Open,
}

/// Canonical pipeline stage.
///
/// Every locale synonym a CRM export may carry ("Won", "Kazanıldı", "Order",
/// "Sipariş", ...) parses into one variant, so won/lost checks never compare
/// raw strings. Labels nobody recognizes are kept verbatim and count as open.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
    Unrecognized(String),
}

/// Canonical stages in pipeline order.
pub const PIPELINE_STAGES: [Stage; 6] = [
    Stage::Lead,
    Stage::Qualified,
    Stage::Proposal,
    Stage::Negotiation,
    Stage::Won,
    Stage::Lost,
];

impl Stage {
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "lead" | "new" | "aday" | "potansiyel" => Self::Lead,
            "qualified" | "qualification" | "nitelikli" => Self::Qualified,
            "proposal" | "teklif" => Self::Proposal,
            "negotiation" | "müzakere" | "muzakere" | "pazarlık" | "pazarlik" => {
                Self::Negotiation
            }
            "won" | "closed won" | "order" | "kazanıldı" | "kazanildi" | "sipariş" | "siparis" => {
                Self::Won
            }
            "lost" | "closed lost" | "kaybedildi" => Self::Lost,
            _ => Self::Unrecognized(label.trim().to_string()),
        }
    }

    pub fn bucket(&self) -> StageBucket {
        match self {
            Self::Won => StageBucket::Won,
            Self::Lost => StageBucket::Lost,
            _ => StageBucket::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.bucket() == StageBucket::Open
    }

    /// Stable machine identifier, used for grouping and serialization.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Lead => "lead",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Unrecognized(label) => label.as_str(),
        }
    }

    pub fn label(&self, locale: Locale) -> &str {
        match (self, locale) {
            (Self::Lead, Locale::En) => "Lead",
            (Self::Lead, Locale::Tr) => "Aday",
            (Self::Qualified, Locale::En) => "Qualified",
            (Self::Qualified, Locale::Tr) => "Nitelikli",
            (Self::Proposal, Locale::En) => "Proposal",
            (Self::Proposal, Locale::Tr) => "Teklif",
            (Self::Negotiation, Locale::En) => "Negotiation",
            (Self::Negotiation, Locale::Tr) => "Müzakere",
            (Self::Won, Locale::En) => "Won",
            (Self::Won, Locale::Tr) => "Kazanıldı",
            (Self::Lost, Locale::En) => "Lost",
            (Self::Lost, Locale::Tr) => "Kaybedildi",
            (Self::Unrecognized(label), _) => label.as_str(),
        }
    }
}

impl From<String> for Stage {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Stage {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        stage.as_str().to_string()
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
