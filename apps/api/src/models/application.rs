use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One submitted application, exactly as it is persisted in the JSON store.
///
/// Every form-derived field is optional: the intake form enforces nothing
/// server-side beyond file types, so a record may be as sparse as an id and a
/// timestamp. Field names serialize as camelCase to match the on-disk format
/// consumed by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    /// Epoch-milliseconds at submission, stringified. Unique per store.
    pub id: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub education: Education,
    #[serde(default)]
    pub experience: Experience,
    #[serde(default)]
    pub technical: TechnicalSkills,
    #[serde(default)]
    pub role_specific: RoleSpecific,
    #[serde(default)]
    pub accommodations: Accommodations,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub rates: Rates,
    #[serde(default)]
    pub fit_assessment: FitAssessment,
    #[serde(default)]
    pub videos: VideoSlots,
    #[serde(default)]
    pub documents: DocumentSlots,
    /// Stored portfolio filenames, in upload order.
    #[serde(default)]
    pub portfolio: Vec<String>,
    /// Set by the review endpoints after submission, never by intake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub preferred_communication: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub highest_education: Option<String>,
    pub marketing_design_experience: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub years_of_experience: Option<String>,
    pub cre_experience: Option<String>,
    pub previous_role: Option<String>,
    pub marketing_experience: Option<String>,
    pub transferable_experience: Option<String>,
    pub management_experience: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSkills {
    pub microsoft_office: Option<String>,
    #[serde(default)]
    pub crm_systems: Vec<String>,
    pub crm_experience: Option<String>,
    #[serde(default)]
    pub design_tools: Vec<String>,
    pub english_proficiency: Option<String>,
    pub internet_speed: Option<String>,
    /// Form sends "yes"/"no"; anything else present maps to false.
    pub has_backup_power: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpecific {
    pub transaction_coordination: Option<String>,
    pub marketing_materials: Option<String>,
    pub deal_example: Option<String>,
    #[serde(default)]
    pub marketing_channels: Vec<String>,
    #[serde(default)]
    pub document_types: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accommodations {
    pub needed: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub timezone: Option<String>,
    pub us_hours_overlap: Option<String>,
    pub hours_per_week: Option<String>,
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rates {
    pub expected_rate: Option<String>,
    pub currency_preference: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitAssessment {
    pub why_hire_you: Option<String>,
    pub challenges: Option<String>,
    pub time_management: Option<String>,
    pub career_goals: Option<String>,
}

/// Stored filenames for the two screening videos.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSlots {
    pub video1: Option<String>,
    pub video2: Option<String>,
}

/// Stored filenames for resume and cover letter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSlots {
    pub resume: Option<String>,
    pub cover_letter: Option<String>,
}

impl ApplicationRecord {
    /// Fresh record with every form-derived section empty.
    pub fn new(id: String, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            submitted_at,
            personal_info: PersonalInfo::default(),
            education: Education::default(),
            experience: Experience::default(),
            technical: TechnicalSkills::default(),
            role_specific: RoleSpecific::default(),
            accommodations: Accommodations::default(),
            availability: Availability::default(),
            rates: Rates::default(),
            fit_assessment: FitAssessment::default(),
            videos: VideoSlots::default(),
            documents: DocumentSlots::default(),
            portfolio: Vec::new(),
            rating: None,
            notes: None,
            status: None,
        }
    }

    /// Display name for notifications, falling back when the form left it out.
    pub fn applicant_name(&self) -> &str {
        self.personal_info
            .full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Unknown applicant")
    }
}
