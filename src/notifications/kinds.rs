// src/notifications/kinds.rs
use super::{Notification, Recipient};
use crate::applications::models::ApplicationStatus;

/// Sent to every active admin when a user requests a new business
#[derive(Debug, Clone)]
pub struct BusinessRequested {
    pub recipient: Recipient,
    pub requester_name: String,
    pub business_id: String,
    pub business_name: String,
}

impl Notification for BusinessRequested {
    fn kind(&self) -> &'static str {
        "business_requested"
    }

    fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    fn subject(&self) -> String {
        "New Business Requested".to_string()
    }

    fn render_body(&self, frontend_url: &str) -> String {
        let link = format!("{}/businesses/{}", frontend_url, self.business_id);
        render_layout(
            "New Business Requested",
            "#4F46E5",
            &format!(
                r#"<p>Dear {},</p>

            <p><strong>{}</strong> has requested a new business, <strong>{}</strong>. It is waiting for approval.</p>

            <a class="button" href="{}">Review business</a>"#,
                escape_html(&self.recipient.name),
                escape_html(&self.requester_name),
                escape_html(&self.business_name),
                link
            ),
        )
    }

    // Admins cannot opt out
    fn should_notify(&self) -> bool {
        true
    }
}

/// Sent to the business owner when a student applies to a post
#[derive(Debug, Clone)]
pub struct ApplicationReceived {
    pub recipient: Recipient,
    pub applicant_name: String,
    pub business_id: String,
    pub post_id: i64,
    pub post_title: String,
}

impl Notification for ApplicationReceived {
    fn kind(&self) -> &'static str {
        "application_received"
    }

    fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    fn subject(&self) -> String {
        "Application Received".to_string()
    }

    fn render_body(&self, frontend_url: &str) -> String {
        let link = format!(
            "{}/businesses/{}/posts/{}/applications",
            frontend_url, self.business_id, self.post_id
        );
        render_layout(
            "Application Received",
            "#4F46E5",
            &format!(
                r#"<p>Dear {},</p>

            <p><strong>{}</strong> has applied to your post <strong>{}</strong>.</p>

            <a class="button" href="{}">View applications</a>"#,
                escape_html(&self.recipient.name),
                escape_html(&self.applicant_name),
                escape_html(&self.post_title),
                link
            ),
        )
    }

    fn should_notify(&self) -> bool {
        self.recipient.preferences.application_received
    }
}

/// Confirmation sent to the applicant once their application is stored
#[derive(Debug, Clone)]
pub struct ApplicationSubmitted {
    pub recipient: Recipient,
    pub business_name: String,
    pub post_title: String,
}

impl Notification for ApplicationSubmitted {
    fn kind(&self) -> &'static str {
        "application_submitted"
    }

    fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    fn subject(&self) -> String {
        format!("Application Received - {}", self.post_title)
    }

    fn render_body(&self, frontend_url: &str) -> String {
        render_layout(
            "Application Received",
            "#4F46E5",
            &format!(
                r#"<p>Hi {},</p>

            <p>Thank you for applying to <strong>{}</strong> at <strong>{}</strong>! You should expect to hear back about scheduling the test soon.</p>

            <a class="button" href="{}/applications">View your applications</a>"#,
                escape_html(&self.recipient.name),
                escape_html(&self.post_title),
                escape_html(&self.business_name),
                frontend_url
            ),
        )
    }

    // receipt for the applicant's own request
    fn should_notify(&self) -> bool {
        true
    }
}

/// Sent to the business owner when an applicant withdraws
#[derive(Debug, Clone)]
pub struct ApplicationWithdrawn {
    pub recipient: Recipient,
    pub applicant_name: String,
    pub business_id: String,
    pub business_name: String,
    pub post_id: i64,
    pub post_title: String,
}

impl Notification for ApplicationWithdrawn {
    fn kind(&self) -> &'static str {
        "application_withdrawn"
    }

    fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    fn subject(&self) -> String {
        "Application Withdrawn".to_string()
    }

    fn render_body(&self, frontend_url: &str) -> String {
        let link = format!(
            "{}/businesses/{}/posts/{}/applications",
            frontend_url, self.business_id, self.post_id
        );
        render_layout(
            "Application Withdrawn",
            "#6B7280",
            &format!(
                r#"<p>Dear {},</p>

            <p><strong>{}</strong> has withdrawn their application to <strong>{}</strong> at <strong>{}</strong>.</p>

            <a class="button" href="{}">View applications</a>"#,
                escape_html(&self.recipient.name),
                escape_html(&self.applicant_name),
                escape_html(&self.post_title),
                escape_html(&self.business_name),
                link
            ),
        )
    }

    fn should_notify(&self) -> bool {
        self.recipient.preferences.application_withdrawn
    }
}

/// Sent to the applicant after a business-initiated status change
#[derive(Debug, Clone)]
pub struct ApplicationUpdated {
    pub recipient: Recipient,
    pub business_name: String,
    pub post_title: String,
    pub status: ApplicationStatus,
}

impl ApplicationUpdated {
    fn status_message(&self) -> &'static str {
        match self.status {
            ApplicationStatus::Accepted => {
                "Congratulations! Your application has been accepted. The business will be in touch with next steps."
            }
            ApplicationStatus::Rejected => {
                "Thank you for applying. The business has decided to move forward with other applicants."
            }
            ApplicationStatus::Completed => {
                "The business has marked your work as completed. Thank you for participating!"
            }
            ApplicationStatus::Incomplete => {
                "The business has marked your work as incomplete. You can finish it and ask them to review it again."
            }
            ApplicationStatus::Pending | ApplicationStatus::Withdrawn => {
                "The status of your application has changed."
            }
        }
    }
}

impl Notification for ApplicationUpdated {
    fn kind(&self) -> &'static str {
        "application_updated"
    }

    fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    fn subject(&self) -> String {
        "Application Status Update".to_string()
    }

    fn render_body(&self, frontend_url: &str) -> String {
        let header_color = match self.status {
            ApplicationStatus::Rejected | ApplicationStatus::Incomplete => "#6B7280",
            _ => "#4F46E5",
        };
        render_layout(
            "Application Update",
            header_color,
            &format!(
                r#"<p>Dear {},</p>

            <p>Your application to <strong>{}</strong> at <strong>{}</strong> is now <strong>{}</strong>.</p>

            <p>{}</p>

            <a class="button" href="{}/applications">View your applications</a>"#,
                escape_html(&self.recipient.name),
                escape_html(&self.post_title),
                escape_html(&self.business_name),
                self.status.as_str(),
                self.status_message(),
                frontend_url
            ),
        )
    }

    fn should_notify(&self) -> bool {
        self.recipient.preferences.application_updated
    }
}

fn render_layout(title: &str, header_color: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: {}; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
        .button {{ display: inline-block; padding: 12px 24px; background-color: #4F46E5; color: white; text-decoration: none; border-radius: 5px; margin: 10px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{}</h1>
        </div>
        <div class="content">
            {}
        </div>
        <div class="footer">
            <p>This is an automated message. You can change your email preferences in your account settings.</p>
        </div>
    </div>
</body>
</html>"#,
        header_color, title, content
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
