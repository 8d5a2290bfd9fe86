use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One entry of a process's stage list, as supplied by the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawStageEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,      // storage id, when the stage came from a store
    pub stage_name: String,   // authoritative for classification
    #[serde(default)]
    pub stage_number: u32,    // 0 when the source omitted it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>, // ISO-8601 date, e.g. "2024-03-15"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub voting_num: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub committees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitting_num: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_stages: Vec<RawStageEvent>,
}

impl RawStageEvent {
    /// Stable identity of the stage: the storage id if known, else its
    /// sequence number, else its 1-based `position` in the stage list.
    pub fn identity(&self, position: usize) -> u64 {
        match (self.id, self.stage_number) {
            (Some(id), _) => id,
            (None, 0) => position as u64,
            (None, number) => u64::from(number),
        }
    }

    pub(crate) fn date_str(&self) -> Option<&str> {
        self.date.as_deref().filter(|date| !date.is_empty())
    }

    pub(crate) fn comment_str(&self) -> Option<&str> {
        self.comment.as_deref().filter(|comment| !comment.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawVotingRecord {
    pub voting_number: u32, // join key to RawStageEvent::voting_num
    pub yes: u32,
    pub no: u32,
    pub abstain: u32,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitting: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl RawVotingRecord {
    /// Number of deputies who cast a yes or no vote.
    pub fn decisive_total(&self) -> u64 {
        u64::from(self.yes) + u64::from(self.no)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PrintAttachment {
    pub name: String,
    pub url: String,
}

/// A filed document ("druk") belonging to a process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawPrintRecord {
    pub number: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<PrintAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_date: Option<String>,
}

/// Everything fetched for one legislative process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    pub number: String,
    #[serde(default)]
    pub term: u32,
    pub title: String,
    /// When absent, derived from the last stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_finished: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_rejected: Option<bool>,
    #[serde(default)]
    pub stages: Vec<RawStageEvent>,
    #[serde(default)]
    pub votings: Vec<RawVotingRecord>,
    #[serde(default)]
    pub prints: Vec<RawPrintRecord>,
}

/// Visual symbol of a timeline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolShape {
    /// Start or end marker.
    Circle,
    /// Reading.
    Rectangle,
    /// Committee work.
    RoundedRect,
    /// Decision.
    Diamond,
    /// Positive end (publication).
    DoubleCircle,
    /// Negative end (rejection, withdrawal).
    CircleX,
}

impl SymbolShape {
    pub fn is_round(self) -> bool {
        matches!(self, Self::Circle | Self::DoubleCircle | Self::CircleX)
    }

    /// Shapes whose width may stretch with the stage duration.
    pub fn is_stretchable(self) -> bool {
        matches!(self, Self::Rectangle | Self::RoundedRect)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Institution {
    #[serde(rename = "sejm")]
    LowerHouse,
    #[serde(rename = "senat")]
    UpperHouse,
    #[serde(rename = "prezydent")]
    President,
    #[serde(rename = "trybunal")]
    ConstitutionalCourt,
    #[serde(rename = "publikacja")]
    Publication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Completed,
    Current,
    Future,
    Alternative,
}

impl StageStatus {
    /// Future and alternative nodes are drawn faded.
    pub fn is_dimmed(self) -> bool {
        matches!(self, Self::Future | Self::Alternative)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VotingResult {
    #[serde(rename = "for")]
    pub votes_for: u32,
    pub against: u32,
    pub abstained: u32,
}

impl From<&RawVotingRecord> for VotingResult {
    fn from(voting: &RawVotingRecord) -> Self {
        Self {
            votes_for: voting.yes,
            against: voting.no,
            abstained: voting.abstain,
        }
    }
}

/// One user-facing milestone of a legislative process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineNode {
    pub id: String,
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date_start: String, // empty when no folded stage carried a date
    #[serde(default)]
    pub date_end: String,
    pub shape: SymbolShape,
    pub institution: Institution,
    pub status: StageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_result: Option<VotingResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<TimelineNode>,
}
