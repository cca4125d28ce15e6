//! HTML bodies for the two notification emails.

use crate::models::application::ApplicationRecord;

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.trim().is_empty()).unwrap_or("Not provided")
}

/// Internal notification sent to the review inbox, summarizing the applicant
/// and linking to the dashboard.
pub fn internal_notification(record: &ApplicationRecord, app_url: &str) -> String {
    let submitted = record.submitted_at.format("%Y-%m-%d %H:%M UTC");
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>New Application</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            margin: 0;
            padding: 0;
        }}
        .container {{
            max-width: 600px;
            margin: 0 auto;
            padding: 20px;
        }}
        .header {{
            text-align: center;
            padding: 20px 0;
            background-color: #1d4ed8;
            color: white;
        }}
        .details {{
            background-color: #f3f4f6;
            padding: 15px;
            border-radius: 6px;
            margin: 20px 0;
        }}
        .details td {{
            padding: 4px 8px;
            vertical-align: top;
        }}
        .button {{
            display: inline-block;
            padding: 12px 24px;
            background-color: #1d4ed8;
            color: white;
            text-decoration: none;
            border-radius: 6px;
            margin: 20px 0;
        }}
        .footer {{
            text-align: center;
            padding: 20px;
            color: #666;
            font-size: 13px;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>New Application Received</h1>
        </div>
        <div class="details">
            <table>
                <tr><td><strong>Name</strong></td><td>{name}</td></tr>
                <tr><td><strong>Email</strong></td><td>{email}</td></tr>
                <tr><td><strong>Phone</strong></td><td>{phone}</td></tr>
                <tr><td><strong>Location</strong></td><td>{location}</td></tr>
                <tr><td><strong>Experience</strong></td><td>{years} ({role})</td></tr>
                <tr><td><strong>Application ID</strong></td><td>{id}</td></tr>
                <tr><td><strong>Submitted</strong></td><td>{submitted}</td></tr>
            </table>
        </div>
        <p>The full summary is attached as a PDF when available.</p>
        <div style="text-align: center;">
            <a href="{app_url}/admin.html" class="button">Open Dashboard</a>
        </div>
        <div class="footer">
            <p>Application Intake</p>
        </div>
    </div>
</body>
</html>
"#,
        name = record.applicant_name(),
        email = or_na(&record.personal_info.email),
        phone = or_na(&record.personal_info.phone),
        location = or_na(&record.personal_info.location),
        years = or_na(&record.experience.years_of_experience),
        role = or_na(&record.experience.previous_role),
        id = record.id,
        submitted = submitted,
        app_url = app_url,
    )
}

/// Confirmation sent to the applicant when they left an email address.
pub fn candidate_confirmation(record: &ApplicationRecord) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Application Received</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            margin: 0;
            padding: 0;
        }}
        .container {{
            max-width: 600px;
            margin: 0 auto;
            padding: 20px;
        }}
        .header {{
            text-align: center;
            padding: 20px 0;
            background-color: #059669;
            color: white;
        }}
        .footer {{
            text-align: center;
            padding: 20px;
            color: #666;
            font-size: 13px;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Application Received</h1>
        </div>
        <p>Hi {name},</p>
        <p>Thank you for applying. Your application has been received and our
        team will review it shortly.</p>
        <p>If your background looks like a fit, we will reach out to schedule
        the next step. No further action is needed from you right now.</p>
        <p>Reference: {id}</p>
        <div class="footer">
            <p>Application Intake</p>
        </div>
    </div>
</body>
</html>
"#,
        name = record.applicant_name(),
        id = record.id,
    )
}
