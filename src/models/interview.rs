// Interview-style RAG configurations and interview type detection
// Author: kelexine (https://github.com/kelexine)

use crate::error::{RagError, Result};
use phf::phf_map;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Response-style preset selected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    Technical,
    Behavioral,
    Executive,
    SystemDesign,
    General,
}

/// Accepted names, with and without the `_interview` suffix.
static INTERVIEW_TYPES: phf::Map<&'static str, InterviewType> = phf_map! {
    "technical" => InterviewType::Technical,
    "technical_interview" => InterviewType::Technical,
    "behavioral" => InterviewType::Behavioral,
    "behavioral_interview" => InterviewType::Behavioral,
    "executive" => InterviewType::Executive,
    "executive_interview" => InterviewType::Executive,
    "system_design" => InterviewType::SystemDesign,
    "system_design_interview" => InterviewType::SystemDesign,
    "general" => InterviewType::General,
    "general_interview" => InterviewType::General,
};

impl InterviewType {
    pub const ALL: [InterviewType; 5] = [
        InterviewType::Technical,
        InterviewType::Behavioral,
        InterviewType::Executive,
        InterviewType::SystemDesign,
        InterviewType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Technical => "technical_interview",
            InterviewType::Behavioral => "behavioral_interview",
            InterviewType::Executive => "executive_interview",
            InterviewType::SystemDesign => "system_design_interview",
            InterviewType::General => "general_interview",
        }
    }

    /// The preset configuration for this interview type.
    pub fn config(self) -> RagConfig {
        let fast = "llama-3.1-8b-instant";
        let powerful = "llama-3.3-70b-versatile";
        match self {
            InterviewType::Technical => RagConfig {
                interview_type: self,
                query_model: fast.into(),
                response_model: powerful.into(),
                query_temperature: 0.3,
                response_temperature: 0.4,
                focus_areas: strings(&["technical skills", "problem solving", "architecture", "code quality", "debugging", "optimization"]),
                response_style: "detailed technical examples with specific technologies, metrics, and quantifiable improvements".into(),
                max_tokens: 600,
                emphasize_metrics: true,
                use_star_format: true,
            },
            InterviewType::Behavioral => RagConfig {
                interview_type: self,
                query_model: fast.into(),
                response_model: powerful.into(),
                query_temperature: 0.3,
                response_temperature: 0.7,
                focus_areas: strings(&["leadership", "teamwork", "communication", "conflict resolution", "adaptability", "growth mindset"]),
                response_style: "STAR format stories with emotional intelligence, team dynamics, and lessons learned".into(),
                max_tokens: 500,
                emphasize_metrics: false,
                use_star_format: true,
            },
            InterviewType::Executive => RagConfig {
                interview_type: self,
                query_model: powerful.into(),
                response_model: powerful.into(),
                query_temperature: 0.4,
                response_temperature: 0.5,
                focus_areas: strings(&["strategic thinking", "business impact", "vision", "leadership", "stakeholder management", "ROI"]),
                response_style: "high-level strategic responses with business metrics, revenue impact, and organizational influence".into(),
                max_tokens: 550,
                emphasize_metrics: true,
                use_star_format: false,
            },
            InterviewType::SystemDesign => RagConfig {
                interview_type: self,
                query_model: fast.into(),
                response_model: powerful.into(),
                query_temperature: 0.3,
                response_temperature: 0.4,
                focus_areas: strings(&["scalability", "architecture", "trade-offs", "distributed systems", "performance", "reliability"]),
                response_style: "architectural decisions with scalability metrics, trade-off analysis, and real-world constraints".into(),
                max_tokens: 650,
                emphasize_metrics: true,
                use_star_format: false,
            },
            InterviewType::General => RagConfig {
                interview_type: self,
                query_model: fast.into(),
                response_model: powerful.into(),
                query_temperature: 0.3,
                response_temperature: 0.6,
                focus_areas: strings(&["experience", "skills", "achievements", "growth", "passion", "culture fit"]),
                response_style: "balanced professional responses highlighting unique value and authentic personality".into(),
                max_tokens: 500,
                emphasize_metrics: false,
                use_star_format: true,
            },
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        INTERVIEW_TYPES.get(normalized.as_str()).copied().ok_or_else(|| {
            RagError::InvalidRequest(format!(
                "Unknown interview type: {}. Supported types: {}",
                s,
                InterviewType::ALL.map(|t| t.as_str()).join(", ")
            ))
        })
    }
}

/// Model and style settings passed through to the LLM collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    pub interview_type: InterviewType,
    pub query_model: String,
    pub response_model: String,
    pub query_temperature: f32,
    pub response_temperature: f32,
    pub focus_areas: Vec<String>,
    pub response_style: String,
    pub max_tokens: u32,
    pub emphasize_metrics: bool,
    pub use_star_format: bool,
}

impl RagConfig {
    /// Hex SHA-256 over the fields that influence the generated answer.
    ///
    /// Fields are fed in a fixed order with length prefixes, so the value does
    /// not depend on any serialization layout.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        let mut field = |bytes: &[u8]| {
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        };

        field(self.interview_type.as_str().as_bytes());
        field(self.query_model.as_bytes());
        field(self.response_model.as_bytes());
        field(&self.query_temperature.to_bits().to_le_bytes());
        field(&self.response_temperature.to_bits().to_le_bytes());
        for area in &self.focus_areas {
            field(area.as_bytes());
        }
        field(self.response_style.as_bytes());
        field(&self.max_tokens.to_le_bytes());
        field(&[self.emphasize_metrics as u8, self.use_star_format as u8]);

        format!("{:x}", hasher.finalize())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

struct Detector {
    technical: Regex,
    system_design: Regex,
    behavioral: Regex,
    executive: Regex,
}

static DETECTOR: OnceLock<Detector> = OnceLock::new();

fn detector() -> &'static Detector {
    DETECTOR.get_or_init(|| Detector {
        technical: Regex::new(r"code|algorithm|debug|optimize|performance|architecture|design pattern|api|database|sql")
            .expect("valid technical regex"),
        system_design: Regex::new(r"system design|scale|distributed|microservice|architecture")
            .expect("valid system design regex"),
        behavioral: Regex::new(r"conflict|team|leader|manage|communicate|challenge|difficult|failure|learn")
            .expect("valid behavioral regex"),
        executive: Regex::new(r"strategy|vision|business|roi|revenue|stakeholder|executive|director|organization")
            .expect("valid executive regex"),
    })
}

/// Guess the interview type from the wording of a question.
pub fn detect_interview_type(question: &str) -> InterviewType {
    let q = question.to_lowercase();
    let d = detector();

    if d.technical.is_match(&q) {
        if d.system_design.is_match(&q) {
            return InterviewType::SystemDesign;
        }
        return InterviewType::Technical;
    }

    if d.behavioral.is_match(&q) {
        return InterviewType::Behavioral;
    }

    if d.executive.is_match(&q) {
        return InterviewType::Executive;
    }

    InterviewType::General
}
