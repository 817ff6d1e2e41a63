//! Registry of ratable disability conditions.
//!
//! Diagnostic codes are the ICD-10 codes recorded on the examination forms. Each template
//! lists the rating steps the rating schedule actually publishes for that condition, which
//! is rarely every 10% step.

use serde::Serialize;

use super::domain::{Branch, Condition};

/// Lookup failure for an unregistered diagnostic code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown diagnostic code '{0}'")]
    UnknownDiagnosticCode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCategory {
    MentalHealth,
    Musculoskeletal,
    Auditory,
    Respiratory,
    Gastrointestinal,
    Skin,
    Cardiovascular,
    Neurological,
}

/// Paired extremities eligible for the bilateral factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimbPair {
    Knees,
    Shoulders,
    Ankles,
    Hips,
}

impl LimbPair {
    pub const fn label(self) -> &'static str {
        match self {
            LimbPair::Knees => "knees",
            LimbPair::Shoulders => "shoulders",
            LimbPair::Ankles => "ankles",
            LimbPair::Hips => "hips",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Limb {
    pub pair: LimbPair,
    pub side: Side,
}

/// Definition of a ratable condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionTemplate {
    pub name: &'static str,
    pub diagnostic_code: &'static str,
    pub description: &'static str,
    pub examination: &'static str,
    pub category: ConditionCategory,
    pub allowed_ratings: &'static [u8],
    pub limb: Option<Limb>,
    /// Only claimable with documented combat exposure.
    pub combat_only: bool,
    /// Diagnostic code of the primary condition this one is secondary to.
    pub secondary_to: Option<&'static str>,
}

impl ConditionTemplate {
    pub fn bilateral(&self) -> bool {
        self.limb.is_some()
    }

    pub fn allows(&self, rating: u8) -> bool {
        self.allowed_ratings.contains(&rating)
    }

    /// Non-zero rating steps, in ascending order.
    pub fn compensable_ratings(&self) -> impl Iterator<Item = u8> + '_ {
        self.allowed_ratings
            .iter()
            .copied()
            .filter(|rating| *rating > 0)
    }

    pub fn rated(&self, rating_percent: u8, service_connected: bool) -> Condition {
        Condition {
            name: self.name.to_string(),
            diagnostic_code: self.diagnostic_code.to_string(),
            rating_percent,
            service_connected,
            bilateral: self.bilateral(),
        }
    }

    /// Relative likelihood of this condition for the given service history.
    pub fn exposure_weight(&self, branch: Branch, combat_service: bool) -> u32 {
        use ConditionCategory::*;

        let base: u32 = 10;
        let service = match (combat_service, self.category) {
            (true, MentalHealth | Auditory | Musculoskeletal) => base * 3,
            (false, Respiratory | Gastrointestinal | Skin | Cardiovascular) => base * 2,
            _ => base,
        };

        let branch_bonus = match (branch, self.category) {
            (Branch::Army | Branch::Marines, Musculoskeletal) => 10,
            (Branch::Navy | Branch::CoastGuard, Respiratory) => 10,
            (Branch::Navy | Branch::CoastGuard, Auditory) => 5,
            (Branch::AirForce | Branch::SpaceForce, Auditory) => 10,
            _ => 0,
        };

        service + branch_bonus
    }
}

const MENTAL: &[u8] = &[0, 10, 30, 50, 70, 100];

const fn limb(pair: LimbPair, side: Side) -> Option<Limb> {
    Some(Limb { pair, side })
}

const fn template(
    name: &'static str,
    diagnostic_code: &'static str,
    description: &'static str,
    examination: &'static str,
    category: ConditionCategory,
    allowed_ratings: &'static [u8],
) -> ConditionTemplate {
    ConditionTemplate {
        name,
        diagnostic_code,
        description,
        examination,
        category,
        allowed_ratings,
        limb: None,
        combat_only: false,
        secondary_to: None,
    }
}

const fn limb_template(
    name: &'static str,
    diagnostic_code: &'static str,
    description: &'static str,
    examination: &'static str,
    allowed_ratings: &'static [u8],
    pair: LimbPair,
    side: Side,
) -> ConditionTemplate {
    ConditionTemplate {
        limb: limb(pair, side),
        ..template(
            name,
            diagnostic_code,
            description,
            examination,
            ConditionCategory::Musculoskeletal,
            allowed_ratings,
        )
    }
}

pub const PTSD_CODE: &str = "F43.10";

static STANDARD_TEMPLATES: &[ConditionTemplate] = &[
    template(
        "PTSD",
        PTSD_CODE,
        "Post-Traumatic Stress Disorder",
        "Mental Disorders DBQ",
        ConditionCategory::MentalHealth,
        MENTAL,
    ),
    template(
        "Major Depression",
        "F33.1",
        "Major Depressive Disorder, Recurrent",
        "Mental Disorders DBQ",
        ConditionCategory::MentalHealth,
        MENTAL,
    ),
    template(
        "Generalized Anxiety",
        "F41.1",
        "Generalized Anxiety Disorder",
        "Mental Disorders DBQ",
        ConditionCategory::MentalHealth,
        MENTAL,
    ),
    ConditionTemplate {
        combat_only: true,
        ..template(
            "TBI",
            "S06.2X0S",
            "Traumatic Brain Injury, Residuals",
            "TBI DBQ",
            ConditionCategory::Neurological,
            &[0, 10, 40, 70, 100],
        )
    },
    template(
        "Lumbar Strain",
        "M54.5",
        "Lumbosacral Strain with DDD",
        "Back (Thoracolumbar Spine) DBQ",
        ConditionCategory::Musculoskeletal,
        &[0, 10, 20, 40],
    ),
    template(
        "Cervical Strain",
        "M54.2",
        "Cervical Spine Strain",
        "Neck (Cervical Spine) DBQ",
        ConditionCategory::Musculoskeletal,
        &[0, 10, 20, 30],
    ),
    limb_template(
        "Right Knee Strain",
        "S83.91XS",
        "Right Knee Patellofemoral Pain Syndrome",
        "Knee and Lower Leg DBQ",
        &[0, 10, 20, 30],
        LimbPair::Knees,
        Side::Right,
    ),
    limb_template(
        "Left Knee Strain",
        "S83.92XS",
        "Left Knee Patellofemoral Pain Syndrome",
        "Knee and Lower Leg DBQ",
        &[0, 10, 20, 30],
        LimbPair::Knees,
        Side::Left,
    ),
    limb_template(
        "Right Shoulder Strain",
        "M25.511",
        "Right Shoulder Impingement Syndrome",
        "Shoulder and Arm DBQ",
        &[0, 10, 20],
        LimbPair::Shoulders,
        Side::Right,
    ),
    limb_template(
        "Left Shoulder Strain",
        "M25.512",
        "Left Shoulder Impingement Syndrome",
        "Shoulder and Arm DBQ",
        &[0, 10, 20],
        LimbPair::Shoulders,
        Side::Left,
    ),
    limb_template(
        "Right Ankle Strain",
        "M25.571",
        "Right Ankle Limitation of Motion",
        "Ankle DBQ",
        &[0, 10, 20],
        LimbPair::Ankles,
        Side::Right,
    ),
    limb_template(
        "Left Ankle Strain",
        "M25.572",
        "Left Ankle Limitation of Motion",
        "Ankle DBQ",
        &[0, 10, 20],
        LimbPair::Ankles,
        Side::Left,
    ),
    limb_template(
        "Right Hip Strain",
        "M25.551",
        "Right Hip Limitation of Flexion",
        "Hip and Thigh DBQ",
        &[0, 10, 20, 30, 40],
        LimbPair::Hips,
        Side::Right,
    ),
    limb_template(
        "Left Hip Strain",
        "M25.552",
        "Left Hip Limitation of Flexion",
        "Hip and Thigh DBQ",
        &[0, 10, 20, 30, 40],
        LimbPair::Hips,
        Side::Left,
    ),
    template(
        "Bilateral Plantar Fasciitis",
        "M72.2",
        "Bilateral Plantar Fasciitis",
        "Foot DBQ",
        ConditionCategory::Musculoskeletal,
        &[0, 10, 20, 30],
    ),
    template(
        "Tinnitus",
        "H93.11",
        "Tinnitus, Bilateral",
        "Ear Conditions DBQ",
        ConditionCategory::Auditory,
        &[10],
    ),
    template(
        "Hearing Loss",
        "H90.3",
        "Bilateral Sensorineural Hearing Loss",
        "Hearing Loss and Tinnitus DBQ",
        ConditionCategory::Auditory,
        &[0, 10, 20, 30, 40, 50],
    ),
    ConditionTemplate {
        secondary_to: Some(PTSD_CODE),
        ..template(
            "Sleep Apnea",
            "G47.33",
            "Obstructive Sleep Apnea",
            "Sleep Apnea DBQ",
            ConditionCategory::Respiratory,
            &[0, 30, 50, 100],
        )
    },
    template(
        "Sinusitis",
        "J32.9",
        "Chronic Sinusitis",
        "Sinusitis/Rhinitis DBQ",
        ConditionCategory::Respiratory,
        &[0, 10, 30, 50],
    ),
    template(
        "Asthma",
        "J45.909",
        "Bronchial Asthma",
        "Respiratory DBQ",
        ConditionCategory::Respiratory,
        &[0, 10, 30, 60, 100],
    ),
    template(
        "GERD",
        "K21.9",
        "Gastroesophageal Reflux Disease",
        "Esophageal Conditions DBQ",
        ConditionCategory::Gastrointestinal,
        &[0, 10, 30, 60],
    ),
    template(
        "IBS",
        "K58.9",
        "Irritable Bowel Syndrome",
        "Intestinal Conditions DBQ",
        ConditionCategory::Gastrointestinal,
        &[0, 10, 30],
    ),
    template(
        "Eczema",
        "L30.9",
        "Atopic Dermatitis/Eczema",
        "Skin Diseases DBQ",
        ConditionCategory::Skin,
        &[0, 10, 30, 60],
    ),
    template(
        "Hypertension",
        "I10",
        "Essential Hypertension",
        "Hypertension DBQ",
        ConditionCategory::Cardiovascular,
        &[0, 10, 20, 40, 60],
    ),
    template(
        "Migraines",
        "G43.909",
        "Migraine Headaches",
        "Headaches DBQ",
        ConditionCategory::Neurological,
        &[0, 10, 30, 50],
    ),
    template(
        "Peripheral Neuropathy",
        "G90.09",
        "Peripheral Neuropathy",
        "Peripheral Nerves DBQ",
        ConditionCategory::Neurological,
        &[0, 10, 20, 40],
    ),
    template(
        "Radiculopathy Lumbar",
        "M54.16",
        "Lumbar Radiculopathy",
        "Back (Thoracolumbar Spine) DBQ",
        ConditionCategory::Neurological,
        &[0, 10, 20, 40],
    ),
    template(
        "Radiculopathy Cervical",
        "M54.12",
        "Cervical Radiculopathy",
        "Neck (Cervical Spine) DBQ",
        ConditionCategory::Neurological,
        &[0, 10, 20, 40],
    ),
];

/// Immutable condition registry.
#[derive(Debug, Clone, Copy)]
pub struct ConditionCatalog {
    templates: &'static [ConditionTemplate],
}

impl ConditionCatalog {
    pub fn standard() -> Self {
        Self {
            templates: STANDARD_TEMPLATES,
        }
    }

    pub fn templates(&self) -> &'static [ConditionTemplate] {
        self.templates
    }

    pub fn lookup(&self, diagnostic_code: &str) -> Result<&'static ConditionTemplate, CatalogError> {
        let code = diagnostic_code.trim();
        self.templates
            .iter()
            .find(|template| template.diagnostic_code.eq_ignore_ascii_case(code))
            .ok_or_else(|| CatalogError::UnknownDiagnosticCode(code.to_string()))
    }

    /// Conditions a veteran with this service history can claim directly, most likely first.
    /// Secondary conditions are left out; they are reachable only through their primary.
    pub fn list_by_eligibility(
        &self,
        branch: Branch,
        combat_service: bool,
    ) -> Vec<&'static ConditionTemplate> {
        let mut eligible: Vec<&'static ConditionTemplate> = self
            .templates
            .iter()
            .filter(|template| template.secondary_to.is_none())
            .filter(|template| combat_service || !template.combat_only)
            .collect();

        // stable: ties keep catalog order
        eligible.sort_by_key(|template| {
            std::cmp::Reverse(template.exposure_weight(branch, combat_service))
        });
        eligible
    }

    pub fn templates_in_pair(&self, pair: LimbPair) -> Vec<&'static ConditionTemplate> {
        self.templates
            .iter()
            .filter(|template| template.limb.map(|limb| limb.pair) == Some(pair))
            .collect()
    }

    /// The other side of a paired-limb condition.
    pub fn counterpart(&self, template: &ConditionTemplate) -> Option<&'static ConditionTemplate> {
        let limb = template.limb?;
        self.templates_in_pair(limb.pair).into_iter().find(|candidate| {
            candidate
                .limb
                .map(|other| other.side != limb.side)
                .unwrap_or(false)
        })
    }

    pub fn secondaries_of(&self, primary_code: &str) -> Vec<&'static ConditionTemplate> {
        self.templates
            .iter()
            .filter(|template| template.secondary_to == Some(primary_code))
            .collect()
    }
}

impl Default for ConditionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
