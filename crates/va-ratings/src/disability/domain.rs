use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::compensation::Usd;

/// Identifier wrapper for synthesized veteran records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VeteranId(pub String);

impl VeteranId {
    /// Identifiers are derived from the synthesis seed so a replayed seed keeps its identity.
    pub fn from_seed(seed: u64) -> Self {
        Self(format!("vet-{seed:016x}"))
    }

    /// The seed encoded by [`Self::from_seed`], if this id has that shape.
    pub fn seed(&self) -> Option<u64> {
        let hex = self.0.strip_prefix("vet-")?;
        u64::from_str_radix(hex, 16).ok()
    }
}

/// A rated disability condition as it appears on a veteran record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub name: String,
    pub diagnostic_code: String,
    pub rating_percent: u8,
    pub service_connected: bool,
    pub bilateral: bool,
}

/// Service branch used to bias condition selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Branch {
    Army,
    Navy,
    AirForce,
    Marines,
    CoastGuard,
    SpaceForce,
}

impl Branch {
    pub const ALL: [Branch; 6] = [
        Branch::Army,
        Branch::Navy,
        Branch::AirForce,
        Branch::Marines,
        Branch::CoastGuard,
        Branch::SpaceForce,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Branch::Army => "ARMY",
            Branch::Navy => "NAVY",
            Branch::AirForce => "AIR_FORCE",
            Branch::Marines => "MARINES",
            Branch::CoastGuard => "COAST_GUARD",
            Branch::SpaceForce => "SPACE_FORCE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|branch| branch.label() == normalized)
    }
}

/// Service era, used by enhanced population generation to weigh combat exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceEra {
    Vietnam,
    PostVietnam,
    GulfWar,
    OifOef,
}

impl ServiceEra {
    /// Probability that a veteran of this era served in combat.
    pub const fn combat_probability(self) -> f64 {
        match self {
            ServiceEra::Vietnam => 0.6,
            ServiceEra::PostVietnam => 0.0,
            ServiceEra::GulfWar => 0.5,
            ServiceEra::OifOef => 0.7,
        }
    }
}

/// Lifecycle status of a compensation claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Pending,
    UnderReview,
    GatheringEvidence,
    PendingDecision,
    Approved,
    Denied,
    Appealed,
}

impl ClaimStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::UnderReview => "under_review",
            ClaimStatus::GatheringEvidence => "gathering_evidence",
            ClaimStatus::PendingDecision => "pending_decision",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Denied => "denied",
            ClaimStatus::Appealed => "appealed",
        }
    }
}

/// Claim mirroring one of the profile's conditions. Owned by the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub condition: String,
    pub filed_date: NaiveDate,
    pub status: ClaimStatus,
}

/// Inputs a profile was synthesized from, kept so it can be rebuilt wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisParams {
    pub seed: u64,
    pub branch: Branch,
    pub combat_service: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_rating_hint: Option<u8>,
}

/// Complete veteran record. `combined_rating` and `monthly_compensation` are derived
/// from `conditions` and `dependents`; the validator flags records where they drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VeteranProfile {
    pub id: VeteranId,
    pub conditions: Vec<Condition>,
    pub combined_rating: u8,
    pub monthly_compensation: Usd,
    #[serde(default)]
    pub compensation_approximated: bool,
    pub claims: Vec<ClaimRecord>,
    pub dependents: u8,
    /// Absent on records that were not synthesized here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<SynthesisParams>,
}

impl VeteranProfile {
    pub fn has_rating(&self) -> bool {
        self.combined_rating > 0
    }

    /// A rating with nothing on record to support it.
    pub fn is_phantom(&self) -> bool {
        self.has_rating() && (self.conditions.is_empty() || self.claims.is_empty())
    }

    pub fn service_connected(&self) -> impl Iterator<Item = &Condition> {
        self.conditions
            .iter()
            .filter(|condition| condition.service_connected)
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            id: self.id.clone(),
            combined_rating: self.combined_rating,
            conditions: self.conditions.len(),
            claims: self.claims.len(),
            monthly_compensation: self.monthly_compensation,
            condition_details: self
                .conditions
                .iter()
                .map(|condition| format!("{}: {}%", condition.name, condition.rating_percent))
                .collect(),
        }
    }
}

/// Compact view of a profile for diagnostics output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: VeteranId,
    pub combined_rating: u8,
    pub conditions: usize,
    pub claims: usize,
    pub monthly_compensation: Usd,
    pub condition_details: Vec<String>,
}
