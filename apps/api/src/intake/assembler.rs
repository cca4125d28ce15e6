//! Pure mapping from parsed multipart form data to an `ApplicationRecord`.
//!
//! Values are copied verbatim; nothing here validates or rejects. Missing
//! fields simply stay `None`, matching the intake form's nothing-is-required
//! posture.

use chrono::{DateTime, Utc};

use crate::models::application::{
    Accommodations, ApplicationRecord, Availability, Education, Experience, FitAssessment,
    PersonalInfo, Rates, RoleSpecific, TechnicalSkills,
};
use crate::uploads::RoutedFile;

/// Text fields collected from the multipart body, in arrival order.
/// Repeated names are kept so multi-valued fields can draw on every
/// occurrence.
#[derive(Debug, Default)]
pub struct FormFields {
    entries: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    fn first(&self, name: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.clone())
    }

    /// Every occurrence contributes, and each value is additionally split on
    /// commas. Covers both clients that repeat the field and clients that
    /// send one comma-joined value.
    fn list(&self, name: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .flat_map(|(_, value)| value.split(','))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// "yes" is true; any other present value is false.
    fn yes_no(&self, name: &str) -> Option<bool> {
        self.first(name).map(|value| value == "yes")
    }
}

pub fn assemble(
    fields: &FormFields,
    files: &[RoutedFile],
    id: String,
    submitted_at: DateTime<Utc>,
) -> ApplicationRecord {
    let mut record = ApplicationRecord::new(id, submitted_at);

    record.personal_info = PersonalInfo {
        full_name: fields.first("fullName"),
        email: fields.first("email"),
        phone: fields.first("phone"),
        location: fields.first("location"),
        preferred_communication: fields.first("preferredCommunication"),
    };

    record.education = Education {
        highest_education: fields.first("highestEducation"),
        marketing_design_experience: fields.first("marketingDesignExperience"),
    };

    record.experience = Experience {
        years_of_experience: fields.first("yearsOfExperience"),
        cre_experience: fields.first("creExperience"),
        previous_role: fields.first("previousRole"),
        marketing_experience: fields.first("marketingExperience"),
        transferable_experience: fields.first("transferableExperience"),
        management_experience: fields.first("managementExperience"),
        tools: fields.list("tools"),
        strengths: fields.list("strengths"),
    };

    record.technical = TechnicalSkills {
        microsoft_office: fields.first("microsoftOffice"),
        crm_systems: fields.list("crmSystems"),
        crm_experience: fields.first("crmExperience"),
        design_tools: fields.list("designTools"),
        english_proficiency: fields.first("englishProficiency"),
        internet_speed: fields.first("internetSpeed"),
        has_backup_power: fields.yes_no("hasBackupPower"),
    };

    record.role_specific = RoleSpecific {
        transaction_coordination: fields.first("transactionCoordination"),
        marketing_materials: fields.first("marketingMaterials"),
        deal_example: fields.first("dealExample"),
        marketing_channels: fields.list("marketingChannels"),
        document_types: fields.list("documentTypes"),
    };

    record.accommodations = Accommodations {
        needed: fields.first("accommodationsNeeded"),
        details: fields.first("accommodationsDetails"),
    };

    record.availability = Availability {
        timezone: fields.first("timezone"),
        us_hours_overlap: fields.first("usHoursOverlap"),
        hours_per_week: fields.first("hoursPerWeek"),
        start_date: fields.first("startDate"),
    };

    record.rates = Rates {
        expected_rate: fields.first("expectedRate"),
        currency_preference: fields.first("currencyPreference"),
    };

    record.fit_assessment = FitAssessment {
        why_hire_you: fields.first("whyHireYou"),
        challenges: fields.first("challenges"),
        time_management: fields.first("timeManagement"),
        career_goals: fields.first("careerGoals"),
    };

    for file in files {
        match file.field_name.as_str() {
            "video1" => record.videos.video1 = Some(file.stored_name.clone()),
            "video2" => record.videos.video2 = Some(file.stored_name.clone()),
            "resume" => record.documents.resume = Some(file.stored_name.clone()),
            "coverLetter" => record.documents.cover_letter = Some(file.stored_name.clone()),
            "portfolio" => record.portfolio.push(file.stored_name.clone()),
            // Stored on disk under other/ but not referenced by the record.
            _ => {}
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploads::Category;

    fn routed(field: &str, stored: &str, category: Category) -> RoutedFile {
        RoutedFile {
            field_name: field.to_string(),
            category,
            stored_name: stored.to_string(),
        }
    }

    #[test]
    fn test_assemble_maps_text_fields() {
        let mut fields = FormFields::new();
        fields.push("fullName", "Jane Doe");
        fields.push("email", "jane@example.com");
        fields.push("previousRole", "Transaction Coordinator");
        fields.push("timezone", "GMT+2");

        let record = assemble(&fields, &[], "1".to_string(), Utc::now());

        assert_eq!(record.personal_info.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.personal_info.email.as_deref(), Some("jane@example.com"));
        assert_eq!(
            record.experience.previous_role.as_deref(),
            Some("Transaction Coordinator")
        );
        assert_eq!(record.availability.timezone.as_deref(), Some("GMT+2"));
        assert!(record.personal_info.phone.is_none());
        assert!(record.rating.is_none());
    }

    #[test]
    fn test_values_are_copied_verbatim() {
        let mut fields = FormFields::new();
        fields.push("location", "  Cape Town ");

        let record = assemble(&fields, &[], "1".to_string(), Utc::now());
        assert_eq!(record.personal_info.location.as_deref(), Some("  Cape Town "));
    }

    #[test]
    fn test_multi_value_fields_merge_repeats_and_comma_lists() {
        let mut fields = FormFields::new();
        fields.push("designTools", "Canva");
        fields.push("designTools", "Photoshop, InDesign , ");
        fields.push("crmSystems", "HubSpot,Salesforce");

        let record = assemble(&fields, &[], "1".to_string(), Utc::now());

        assert_eq!(
            record.technical.design_tools,
            vec!["Canva", "Photoshop", "InDesign"]
        );
        assert_eq!(record.technical.crm_systems, vec!["HubSpot", "Salesforce"]);
    }

    #[test]
    fn test_backup_power_mapping() {
        let mut fields = FormFields::new();
        fields.push("hasBackupPower", "yes");
        let record = assemble(&fields, &[], "1".to_string(), Utc::now());
        assert_eq!(record.technical.has_backup_power, Some(true));

        let mut fields = FormFields::new();
        fields.push("hasBackupPower", "no");
        let record = assemble(&fields, &[], "2".to_string(), Utc::now());
        assert_eq!(record.technical.has_backup_power, Some(false));

        let record = assemble(&FormFields::new(), &[], "3".to_string(), Utc::now());
        assert_eq!(record.technical.has_backup_power, None);
    }

    #[test]
    fn test_file_slots_and_portfolio_order() {
        let files = vec![
            routed("video1", "video1-1-000000001.mp4", Category::Videos),
            routed("resume", "resume-1-000000002.pdf", Category::Documents),
            routed("portfolio", "portfolio-1-000000003.pdf", Category::Portfolio),
            routed("portfolio", "portfolio-1-000000004.png", Category::Portfolio),
        ];

        let record = assemble(&FormFields::new(), &files, "1".to_string(), Utc::now());

        assert_eq!(record.videos.video1.as_deref(), Some("video1-1-000000001.mp4"));
        assert!(record.videos.video2.is_none());
        assert_eq!(record.documents.resume.as_deref(), Some("resume-1-000000002.pdf"));
        assert_eq!(
            record.portfolio,
            vec!["portfolio-1-000000003.pdf", "portfolio-1-000000004.png"]
        );
    }

    #[test]
    fn test_unrecognized_file_field_is_not_referenced() {
        let files = vec![routed("headshot", "headshot-1-000000005.png", Category::Other)];
        let record = assemble(&FormFields::new(), &files, "1".to_string(), Utc::now());

        let value = serde_json::to_value(&record).unwrap();
        assert!(!value.to_string().contains("headshot-1-000000005.png"));
    }
}
