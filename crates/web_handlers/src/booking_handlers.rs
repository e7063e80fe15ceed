use actix_web::{HttpResponse, web};
use email_services::{BookingSummary, EmailSender, booking_confirmation, generate_booking_reference};
use validator::Validate;

use crate::booking_types::*;

/// Assembles a booking confirmation and emails it to the traveler. The
/// booking data is request-scoped: rendered, sent, and discarded.
pub async fn send_booking_confirmation(
    email_sender: web::Data<EmailSender>,
    request: web::Json<BookingConfirmationRequest>,
) -> Result<HttpResponse, BookingError> {
    request
        .validate()
        .map_err(|e| BookingError::Validation(format!("Validation error: {}", e)))?;

    let reference = generate_booking_reference();
    let summary = BookingSummary {
        traveler_name: format!(
            "{} {}",
            request.personal_info.first_name, request.personal_info.last_name
        ),
        traveler_email: request.personal_info.email.clone(),
        reference: reference.clone(),
        activity_title: request.activity.title.clone(),
        location: request.activity.location.clone(),
        duration: request.activity.duration.clone(),
        price: request.activity.price,
        date: request.booking.date,
        participants: request.booking.participants,
        special_requests: request.booking.special_requests.clone(),
        payment_method: describe_payment(&request.payment),
    };

    log::info!(
        "📧 Sending booking confirmation {} to {}",
        reference,
        summary.traveler_email
    );

    let outcome = email_sender.send(&booking_confirmation(&summary)).await;
    if outcome.simulated {
        log::warn!(
            "Booking confirmation {} was simulated ({})",
            reference,
            outcome.error.as_deref().unwrap_or("forced")
        );
    }

    Ok(HttpResponse::Ok().json(BookingConfirmationResponse {
        booking_reference: reference,
        message_id: outcome.message_id,
        provider: outcome.provider,
        simulated: outcome.simulated,
    }))
}

fn describe_payment(payment: &PaymentStub) -> String {
    match (payment.method.as_str(), &payment.card_last4) {
        ("card", Some(last4)) => format!("card ending {}", last4),
        ("card", None) => "card".to_string(),
        ("mercado_pago", _) => "Mercado Pago".to_string(),
        (method, _) => method.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_descriptions_cover_the_stub_variants() {
        let card = PaymentStub {
            method: "card".to_string(),
            card_last4: Some("4242".to_string()),
        };
        assert_eq!(describe_payment(&card), "card ending 4242");

        let cash = PaymentStub {
            method: "cash".to_string(),
            card_last4: None,
        };
        assert_eq!(describe_payment(&cash), "cash");

        let mp = PaymentStub {
            method: "mercado_pago".to_string(),
            card_last4: None,
        };
        assert_eq!(describe_payment(&mp), "Mercado Pago");
    }
}
