//! Renders a one-document PDF summary of an application for the internal
//! notification attachment.
//!
//! US Letter pages, Helvetica, a single text column. Content streams are
//! not compressed.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::models::application::ApplicationRecord;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 54.0;
const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;
const LEADING: f32 = 14.0;
const MAX_LINE_CHARS: usize = 92;
const LINES_PER_PAGE: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Title,
    Heading,
    Body,
}

#[derive(Debug, Clone)]
struct Line {
    kind: LineKind,
    text: String,
}

impl Line {
    fn body(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Body,
            text: text.into(),
        }
    }
}

pub fn render_summary_pdf(record: &ApplicationRecord) -> Result<Vec<u8>, lopdf::Error> {
    let lines = section_lines(record);
    let pages: Vec<&[Line]> = lines.chunks(LINES_PER_PAGE).collect();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_regular,
            "F2" => font_bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page_lines in &pages {
        let content = page_content(page_lines);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn page_content(lines: &[Line]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
    ];
    for line in lines {
        let (font, size) = match line.kind {
            LineKind::Title => ("F2", TITLE_SIZE),
            LineKind::Heading => ("F2", HEADING_SIZE),
            LineKind::Body => ("F1", BODY_SIZE),
        };
        operations.push(Operation::new("Tf", vec![font.into(), size.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.text.clone())],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// All populated sections in their fixed render order, flattened to lines.
fn section_lines(record: &ApplicationRecord) -> Vec<Line> {
    let mut lines = vec![
        Line {
            kind: LineKind::Title,
            text: sanitize(&format!("Application {}", record.id)),
        },
        Line::body(format!(
            "Submitted {}",
            record.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
    ];

    let join = |items: &[String]| -> Option<String> {
        if items.is_empty() {
            None
        } else {
            Some(items.join(", "))
        }
    };

    push_section(
        &mut lines,
        "Personal Information",
        vec![
            ("Full name", record.personal_info.full_name.clone()),
            ("Email", record.personal_info.email.clone()),
            ("Phone", record.personal_info.phone.clone()),
            ("Location", record.personal_info.location.clone()),
            (
                "Preferred communication",
                record.personal_info.preferred_communication.clone(),
            ),
        ],
    );

    push_section(
        &mut lines,
        "Education",
        vec![
            ("Highest education", record.education.highest_education.clone()),
            (
                "Marketing/design experience",
                record.education.marketing_design_experience.clone(),
            ),
        ],
    );

    push_section(
        &mut lines,
        "Experience",
        vec![
            ("Years of experience", record.experience.years_of_experience.clone()),
            ("CRE experience", record.experience.cre_experience.clone()),
            ("Previous role", record.experience.previous_role.clone()),
            ("Marketing experience", record.experience.marketing_experience.clone()),
            (
                "Transferable experience",
                record.experience.transferable_experience.clone(),
            ),
            (
                "Management experience",
                record.experience.management_experience.clone(),
            ),
            ("Tools", join(&record.experience.tools)),
            ("Strengths", join(&record.experience.strengths)),
        ],
    );

    push_section(
        &mut lines,
        "Technical Skills",
        vec![
            ("Microsoft Office", record.technical.microsoft_office.clone()),
            ("CRM systems", join(&record.technical.crm_systems)),
            ("CRM experience", record.technical.crm_experience.clone()),
            ("Design tools", join(&record.technical.design_tools)),
            ("English proficiency", record.technical.english_proficiency.clone()),
            ("Internet speed", record.technical.internet_speed.clone()),
            (
                "Backup power",
                record
                    .technical
                    .has_backup_power
                    .map(|has| if has { "yes" } else { "no" }.to_string()),
            ),
        ],
    );

    push_section(
        &mut lines,
        "Role-Specific",
        vec![
            (
                "Transaction coordination",
                record.role_specific.transaction_coordination.clone(),
            ),
            (
                "Marketing materials",
                record.role_specific.marketing_materials.clone(),
            ),
            ("Deal example", record.role_specific.deal_example.clone()),
            ("Marketing channels", join(&record.role_specific.marketing_channels)),
            ("Document types", join(&record.role_specific.document_types)),
        ],
    );

    push_section(
        &mut lines,
        "Accommodations",
        vec![
            ("Needed", record.accommodations.needed.clone()),
            ("Details", record.accommodations.details.clone()),
        ],
    );

    push_section(
        &mut lines,
        "Availability",
        vec![
            ("Timezone", record.availability.timezone.clone()),
            ("US hours overlap", record.availability.us_hours_overlap.clone()),
            ("Hours per week", record.availability.hours_per_week.clone()),
            ("Start date", record.availability.start_date.clone()),
        ],
    );

    push_section(
        &mut lines,
        "Fit Assessment",
        vec![
            ("Why hire you", record.fit_assessment.why_hire_you.clone()),
            ("Challenges", record.fit_assessment.challenges.clone()),
            ("Time management", record.fit_assessment.time_management.clone()),
            ("Career goals", record.fit_assessment.career_goals.clone()),
        ],
    );

    push_section(
        &mut lines,
        "Attachments",
        vec![
            ("Video 1", record.videos.video1.clone()),
            ("Video 2", record.videos.video2.clone()),
            ("Resume", record.documents.resume.clone()),
            ("Cover letter", record.documents.cover_letter.clone()),
            ("Portfolio", join(&record.portfolio)),
        ],
    );

    lines
}

/// Appends a heading plus one line per present field; sections with no
/// populated field are skipped entirely.
fn push_section(lines: &mut Vec<Line>, title: &str, fields: Vec<(&str, Option<String>)>) {
    let present: Vec<(&str, String)> = fields
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .filter(|(_, v)| !v.trim().is_empty())
        .collect();
    if present.is_empty() {
        return;
    }

    lines.push(Line::body(""));
    lines.push(Line {
        kind: LineKind::Heading,
        text: title.to_string(),
    });
    for (label, value) in present {
        let wrapped = wrap_text(&sanitize(&format!("{label}: {value}")), MAX_LINE_CHARS);
        for (i, part) in wrapped.into_iter().enumerate() {
            if i == 0 {
                lines.push(Line::body(format!("  {part}")));
            } else {
                lines.push(Line::body(format!("      {part}")));
            }
        }
    }
}

/// Helvetica has no glyphs outside WinAnsi and the writer emits literal
/// strings, so anything beyond printable ASCII becomes '?'.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '?' })
        .collect()
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        // Hard-split anything that cannot fit on a line of its own.
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let (head, tail) = word.split_at(max_chars);
            lines.push(head.to_string());
            word = tail;
        }
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    fn sample_record() -> ApplicationRecord {
        let mut record = ApplicationRecord::new("1700000000000".to_string(), Utc::now());
        record.personal_info.full_name = Some("Jane Doe".to_string());
        record.personal_info.email = Some("jane@example.com".to_string());
        record.availability.timezone = Some("GMT+2".to_string());
        record.documents.resume = Some("resume-1700000000000-123456789.pdf".to_string());
        record
    }

    fn headings(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .filter(|line| line.kind == LineKind::Heading)
            .map(|line| line.text.clone())
            .collect()
    }

    #[test]
    fn test_render_produces_pdf_with_embedded_text() {
        let bytes = render_summary_pdf(&sample_record()).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert!(contains(&bytes, b"Jane Doe"));
        assert!(contains(&bytes, b"resume-1700000000000-123456789.pdf"));
    }

    #[test]
    fn test_sections_render_in_fixed_order_and_empty_ones_are_skipped() {
        let lines = section_lines(&sample_record());

        assert_eq!(
            headings(&lines),
            vec!["Personal Information", "Availability", "Attachments"]
        );
    }

    #[test]
    fn test_record_with_no_fields_has_only_title_lines() {
        let empty = ApplicationRecord::new("1".to_string(), Utc::now());
        let lines = section_lines(&empty);

        assert!(headings(&lines).is_empty());
        assert_eq!(lines[0].text, "Application 1");
    }

    #[test]
    fn test_backup_power_renders_as_yes_no() {
        let mut record = sample_record();
        record.technical.has_backup_power = Some(true);
        let lines = section_lines(&record);

        assert!(lines.iter().any(|line| line.text.contains("Backup power: yes")));
    }

    #[test]
    fn test_long_answers_paginate() {
        let mut record = sample_record();
        record.fit_assessment.why_hire_you = Some("motivation ".repeat(900));

        let lines = section_lines(&record);
        assert!(lines.len() > LINES_PER_PAGE);

        let bytes = render_summary_pdf(&record).unwrap();
        assert!(contains(&bytes, b"/Count 3") || contains(&bytes, b"/Count 2"));
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let wrapped = wrap_text("one two three four five", 9);
        assert_eq!(wrapped, vec!["one two", "three", "four five"]);

        let wrapped = wrap_text(&"x".repeat(25), 10);
        assert_eq!(wrapped, vec!["xxxxxxxxxx", "xxxxxxxxxx", "xxxxx"]);
    }

    #[test]
    fn test_sanitize_replaces_non_ascii() {
        assert_eq!(sanitize("naïve résumé"), "na?ve r?sum?");
        assert_eq!(sanitize("plain"), "plain");
    }
}
