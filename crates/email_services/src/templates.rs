use chrono::NaiveDate;

use crate::types::EmailMessage;

/// Data rendered into the booking confirmation email. Assembled per request
/// and discarded after the send; bookings are not persisted.
#[derive(Debug, Clone)]
pub struct BookingSummary {
    /// Traveler full name
    pub traveler_name: String,
    /// Traveler email (confirmation recipient)
    pub traveler_email: String,
    /// Generated booking reference code
    pub reference: String,
    /// Booked activity title
    pub activity_title: String,
    /// Activity meeting point / area
    pub location: String,
    /// Activity duration as displayed ("3 hours", "full day")
    pub duration: String,
    /// Price per participant
    pub price: f64,
    /// Activity date
    pub date: NaiveDate,
    /// Number of participants
    pub participants: i32,
    /// Free-form traveler notes
    pub special_requests: Option<String>,
    /// Payment method description shown on the receipt stub
    pub payment_method: String,
}

/// Generates a booking reference code: `PA-` plus six uppercase
/// alphanumerics.
pub fn generate_booking_reference() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    let code: String = (0..6)
        .map(|_| {
            let chars = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
            chars[rng.random_range(0..chars.len())] as char
        })
        .collect();
    format!("PA-{}", code)
}

/// Renders the traveler-facing booking confirmation.
pub fn booking_confirmation(booking: &BookingSummary) -> EmailMessage {
    let total = booking.price * booking.participants as f64;
    let date = booking.date.format("%B %d, %Y");
    let requests_row = match &booking.special_requests {
        Some(requests) => format!(
            r#"<tr><td style="padding: 8px 0; color: #6b7280;">Special requests</td><td style="padding: 8px 0;">{}</td></tr>"#,
            requests
        ),
        None => String::new(),
    };

    let html_body = format!(
        r#"
        <html>
        <body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <div style="background: linear-gradient(135deg, #1e3a5f 0%, #2d6a4f 100%); padding: 20px; text-align: center;">
                <h1 style="color: white; margin: 0;">🏔️ Plan A Bariloche</h1>
            </div>
            <div style="padding: 30px; background: white;">
                <h2 style="color: #1e3a5f;">Hi {name}!</h2>
                <p style="font-size: 16px; line-height: 1.6; color: #374151;">
                    Your booking is confirmed. Keep your reference code handy, your guide
                    will ask for it at the meeting point.
                </p>
                <div style="text-align: center; margin: 24px 0;">
                    <span style="display: inline-block; background: #2d6a4f; color: white; padding: 12px 24px; border-radius: 8px; font-weight: bold; font-size: 20px; letter-spacing: 2px;">{reference}</span>
                </div>
                <table style="width: 100%; font-size: 15px; color: #374151; border-top: 1px solid #e5e7eb;">
                    <tr><td style="padding: 8px 0; color: #6b7280;">Activity</td><td style="padding: 8px 0;">{activity}</td></tr>
                    <tr><td style="padding: 8px 0; color: #6b7280;">Date</td><td style="padding: 8px 0;">{date}</td></tr>
                    <tr><td style="padding: 8px 0; color: #6b7280;">Location</td><td style="padding: 8px 0;">{location}</td></tr>
                    <tr><td style="padding: 8px 0; color: #6b7280;">Duration</td><td style="padding: 8px 0;">{duration}</td></tr>
                    <tr><td style="padding: 8px 0; color: #6b7280;">Participants</td><td style="padding: 8px 0;">{participants}</td></tr>
                    {requests_row}
                    <tr><td style="padding: 8px 0; color: #6b7280;">Payment</td><td style="padding: 8px 0;">{payment}</td></tr>
                    <tr><td style="padding: 8px 0; color: #6b7280; font-weight: bold;">Total</td><td style="padding: 8px 0; font-weight: bold;">${total:.2}</td></tr>
                </table>
            </div>
            <div style="background: #f9fafb; padding: 20px; text-align: center; color: #6b7280; font-size: 12px;">
                <p>Plan A · San Carlos de Bariloche, Argentina</p>
            </div>
        </body>
        </html>
        "#,
        name = booking.traveler_name,
        reference = booking.reference,
        activity = booking.activity_title,
        date = date,
        location = booking.location,
        duration = booking.duration,
        participants = booking.participants,
        requests_row = requests_row,
        payment = booking.payment_method,
        total = total,
    );

    let text_body = format!(
        "Hi {}!\n\nYour booking is confirmed.\n\nReference: {}\nActivity: {}\nDate: {}\nLocation: {}\nDuration: {}\nParticipants: {}\nPayment: {}\nTotal: ${:.2}\n\nPlan A - San Carlos de Bariloche, Argentina",
        booking.traveler_name,
        booking.reference,
        booking.activity_title,
        date,
        booking.location,
        booking.duration,
        booking.participants,
        booking.payment_method,
        total,
    );

    EmailMessage {
        to: booking.traveler_email.clone(),
        subject: format!("Booking confirmed: {} ({})", booking.activity_title, booking.reference),
        html_body,
        text_body: Some(text_body),
    }
}

/// Renders the admin notification sent when a guide registers.
pub fn new_guide_notification(
    to: &str,
    guide_name: &str,
    guide_email: &str,
    activity_title: &str,
    specialties: &[String],
) -> EmailMessage {
    let specialties = specialties.join(", ");

    let html_body = format!(
        r#"
        <html>
        <body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <div style="background: #1e3a5f; padding: 20px; text-align: center;">
                <h1 style="color: white; margin: 0;">🏔️ Plan A — new guide registration</h1>
            </div>
            <div style="padding: 30px; background: white; font-size: 15px; color: #374151;">
                <p><strong>{guide_name}</strong> ({guide_email}) just registered and is waiting for verification.</p>
                <p>First activity: <strong>{activity_title}</strong></p>
                <p>Specialties: {specialties}</p>
                <p style="color: #6b7280; font-size: 13px;">Review the profile in the admin panel before enabling bookings.</p>
            </div>
        </body>
        </html>
        "#,
    );

    let text_body = format!(
        "New guide registration\n\nGuide: {} ({})\nFirst activity: {}\nSpecialties: {}\n\nReview the profile in the admin panel before enabling bookings.",
        guide_name, guide_email, activity_title, specialties,
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("New guide registration: {}", guide_name),
        html_body,
        text_body: Some(text_body),
    }
}

/// Wraps a free-form administrative notice in the standard frame.
pub fn admin_notice(to: &str, subject: &str, body: &str) -> EmailMessage {
    let html_body = format!(
        r#"
        <html>
        <body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <div style="background: #1e3a5f; padding: 20px; text-align: center;">
                <h1 style="color: white; margin: 0;">🏔️ Plan A — admin notice</h1>
            </div>
            <div style="padding: 30px; background: white; font-size: 15px; color: #374151; white-space: pre-line;">{body}</div>
        </body>
        </html>
        "#,
    );

    EmailMessage {
        to: to.to_string(),
        subject: subject.to_string(),
        html_body,
        text_body: Some(body.to_string()),
    }
}

/// Renders the diagnostics test email sent from the admin panel.
pub fn diagnostics_test(to: &str, provider_label: &str) -> EmailMessage {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let html_body = format!(
        r#"
        <html>
        <body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <div style="padding: 30px; font-size: 15px; color: #374151;">
                <h2 style="color: #1e3a5f;">✅ Email delivery test</h2>
                <p>This message was sent through the <strong>{provider_label}</strong> channel.</p>
                <p style="color: #6b7280; font-size: 13px;">Sent at {timestamp}</p>
            </div>
        </body>
        </html>
        "#,
    );

    let text_body = format!(
        "Email delivery test\n\nChannel: {}\nSent at {}",
        provider_label, timestamp,
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Plan A email delivery test".to_string(),
        html_body,
        text_body: Some(text_body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> BookingSummary {
        BookingSummary {
            traveler_name: "Ana García".to_string(),
            traveler_email: "ana@example.com".to_string(),
            reference: "PA-7K2M9X".to_string(),
            activity_title: "Cerro Catedral trekking".to_string(),
            location: "Villa Catedral base".to_string(),
            duration: "6 hours".to_string(),
            price: 85.0,
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            participants: 2,
            special_requests: Some("Vegetarian lunch".to_string()),
            payment_method: "card ending 4242".to_string(),
        }
    }

    #[test]
    fn booking_reference_matches_the_expected_pattern() {
        let reference = generate_booking_reference();

        assert!(reference.starts_with("PA-"));
        assert_eq!(reference.len(), 9);
        assert!(
            reference[3..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn confirmation_carries_the_booking_details() {
        let email = booking_confirmation(&summary());

        assert_eq!(email.to, "ana@example.com");
        assert!(email.subject.contains("PA-7K2M9X"));
        assert!(email.html_body.contains("Cerro Catedral trekking"));
        assert!(email.html_body.contains("Vegetarian lunch"));
        assert!(email.html_body.contains("$170.00"));

        let text = email.text_body.expect("plain-text alternative");
        assert!(text.contains("PA-7K2M9X"));
        assert!(text.contains("$170.00"));
    }

    #[test]
    fn confirmation_omits_the_requests_row_when_absent() {
        let mut booking = summary();
        booking.special_requests = None;

        let email = booking_confirmation(&booking);
        assert!(!email.html_body.contains("Special requests"));
    }

    #[test]
    fn guide_notification_names_the_guide_and_activity() {
        let email = new_guide_notification(
            "admin@planabariloche.com",
            "Marcos Pereyra",
            "marcos@example.com",
            "Lago Gutiérrez kayaking",
            &["kayaking".to_string(), "rafting".to_string()],
        );

        assert_eq!(email.to, "admin@planabariloche.com");
        assert!(email.subject.contains("Marcos Pereyra"));
        assert!(email.html_body.contains("Lago Gutiérrez kayaking"));
        assert!(email.html_body.contains("kayaking, rafting"));
    }

    #[test]
    fn admin_notice_preserves_subject_and_body() {
        let email = admin_notice("admin@planabariloche.com", "Payout run", "All settled.");

        assert_eq!(email.subject, "Payout run");
        assert_eq!(email.text_body.as_deref(), Some("All settled."));
        assert!(email.html_body.contains("All settled."));
    }
}
