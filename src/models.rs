use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::GenerationError;

/// Form values as submitted by the script generator UI.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    #[serde(default)]
    pub script_type: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl GenerationRequest {
    /// Names of the required fields that are blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("script_type", &self.script_type),
            ("topic", &self.topic),
            ("tone", &self.tone),
            ("length", &self.length),
            ("audience", &self.audience),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Fails with a single aggregated error when any required field is blank.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GenerationError::Validation { missing })
        }
    }

    pub fn kind(&self) -> ScriptType {
        ScriptType::parse(&self.script_type)
    }

    pub fn notes_text(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

/// Script category. Unknown tags are kept as `Other` so prompt building stays total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptType {
    Youtube,
    Advertisement,
    Presentation,
    Social,
    Explainer,
    Sales,
    Educational,
    Podcast,
    Other(String),
}

impl ScriptType {
    pub const KNOWN: [ScriptType; 8] = [
        ScriptType::Youtube,
        ScriptType::Advertisement,
        ScriptType::Presentation,
        ScriptType::Social,
        ScriptType::Explainer,
        ScriptType::Sales,
        ScriptType::Educational,
        ScriptType::Podcast,
    ];

    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "youtube" => ScriptType::Youtube,
            "advertisement" => ScriptType::Advertisement,
            "presentation" => ScriptType::Presentation,
            "social" => ScriptType::Social,
            "explainer" => ScriptType::Explainer,
            "sales" => ScriptType::Sales,
            "educational" => ScriptType::Educational,
            "podcast" => ScriptType::Podcast,
            other => ScriptType::Other(other.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ScriptType::Youtube => "youtube",
            ScriptType::Advertisement => "advertisement",
            ScriptType::Presentation => "presentation",
            ScriptType::Social => "social",
            ScriptType::Explainer => "explainer",
            ScriptType::Sales => "sales",
            ScriptType::Educational => "educational",
            ScriptType::Podcast => "podcast",
            ScriptType::Other(tag) => tag,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ScriptType::Youtube => "YouTube Video",
            ScriptType::Advertisement => "Advertisement",
            ScriptType::Presentation => "Presentation",
            ScriptType::Social => "Social Media",
            ScriptType::Explainer => "Explainer Video",
            ScriptType::Sales => "Sales Pitch",
            ScriptType::Educational => "Educational",
            ScriptType::Podcast => "Podcast",
            ScriptType::Other(tag) => tag,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScriptType::Youtube => "Engaging video scripts for YouTube content",
            ScriptType::Advertisement => "Compelling ad copy that converts",
            ScriptType::Presentation => "Professional presentation scripts",
            ScriptType::Social => "Social media content and captions",
            ScriptType::Explainer => "Clear and informative explainer videos",
            ScriptType::Sales => "Persuasive sales presentations",
            ScriptType::Educational => "Educational and training content",
            ScriptType::Podcast => "Podcast episodes and interviews",
            ScriptType::Other(_) => "Custom script",
        }
    }
}

pub const TONES: [&str; 10] = [
    "Professional", "Casual", "Friendly", "Authoritative", "Conversational",
    "Energetic", "Humorous", "Inspirational", "Persuasive", "Educational",
];

pub const LENGTHS: [(&str, &str); 4] = [
    ("short", "Short (30-60 seconds)"),
    ("medium", "Medium (1-3 minutes)"),
    ("long", "Long (3-5 minutes)"),
    ("extended", "Extended (5+ minutes)"),
];

pub const AUDIENCES: [&str; 12] = [
    "General Public", "Business Professionals", "Students", "Entrepreneurs",
    "Tech Enthusiasts", "Parents", "Young Adults", "Seniors", "Investors",
    "Content Creators", "Small Business Owners", "Marketing Professionals",
];

#[derive(Debug, Serialize, Clone)]
pub struct ScriptTypeOption {
    pub id: String,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct LengthOption {
    pub value: String,
    pub label: String,
}

/// Option lists rendered by the form selectors.
#[derive(Debug, Serialize, Clone)]
pub struct Catalog {
    pub script_types: Vec<ScriptTypeOption>,
    pub tones: Vec<String>,
    pub lengths: Vec<LengthOption>,
    pub audiences: Vec<String>,
}

impl Catalog {
    pub fn standard() -> Self {
        Self {
            script_types: ScriptType::KNOWN
                .iter()
                .map(|t| ScriptTypeOption {
                    id: t.id().to_string(),
                    label: t.label().to_string(),
                    description: t.description().to_string(),
                })
                .collect(),
            tones: TONES.iter().map(|s| s.to_string()).collect(),
            lengths: LENGTHS
                .iter()
                .map(|(value, label)| LengthOption { value: value.to_string(), label: label.to_string() })
                .collect(),
            audiences: AUDIENCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// One generated script and the parameters that produced it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScriptSession {
    pub id: Uuid,
    pub request: GenerationRequest,
    pub prompt: String,
    pub script: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EditScriptRequest {
    pub script: String,
}

/// Regeneration reuses the stored parameters unless new ones are supplied.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RegenerateRequest {
    #[serde(default)]
    pub request: Option<GenerationRequest>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Toast payload the UI shows after an action.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct SessionResponse {
    pub session: ScriptSession,
    pub notice: Notice,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PromptPreview {
    pub prompt: String,
}
