//! Payment initiation and booking completion. Neither tool moves money; the
//! payment processor sits behind the (out-of-scope) airline backend.

use serde_json::json;

use crate::config::PricingConfig;
use crate::core::booking::BookingStep;
use crate::core::conversation::ConversationRecord;
use crate::error::{AgentError, Result};
use crate::pricing::compute_pricing;
use crate::tools::params::{CompleteBookingParams, InitiatePaymentParams, PaymentMethod};
use crate::tools::ToolOutcome;
use crate::types::ui::UiComponent;

pub fn initiate_payment(params: InitiatePaymentParams) -> ToolOutcome {
    let fields = match params.payment_method {
        PaymentMethod::CreditCard => json!([
            { "name": "cardholderName", "type": "text", "required": true },
            { "name": "cardNumber", "type": "text", "required": true },
            { "name": "expiry", "type": "text", "required": true },
            { "name": "cvv", "type": "password", "required": true },
        ]),
        PaymentMethod::Avios => json!([
            { "name": "membershipNumber", "type": "text", "required": true },
            { "name": "pin", "type": "password", "required": true },
        ]),
    };

    ToolOutcome {
        success: true,
        message: format!(
            "Ready to take payment of {} via {}.",
            params.total_amount,
            params.payment_method.as_str()
        ),
        ui_component: UiComponent::new(
            "paymentForm",
            json!({
                "method": params.payment_method.as_str(),
                "totalAmount": params.total_amount,
                "fields": fields,
            }),
        ),
        selection_delta: None,
        next_step: Some(BookingStep::PaymentInitiated),
        pricing: None,
    }
}

pub fn complete_booking(
    params: CompleteBookingParams,
    record: &ConversationRecord,
    pricing_config: &PricingConfig,
) -> Result<ToolOutcome> {
    if !params.payment_data.confirmed {
        return Err(AgentError::ToolExecution(
            "Payment was not confirmed; the booking is unchanged".to_string(),
        ));
    }

    let original_reference = record
        .context
        .booking
        .as_ref()
        .and_then(|b| b.reference.clone());
    let booking_reference = generate_booking_reference(original_reference.as_deref());
    let pricing = compute_pricing(&record.selection, pricing_config);

    Ok(ToolOutcome {
        success: true,
        message: format!("Your stopover is confirmed. New booking reference: {booking_reference}."),
        ui_component: UiComponent::new(
            "bookingConfirmation",
            json!({
                "bookingReference": booking_reference,
                "originalReference": original_reference,
                "paymentMethod": params.payment_data.method,
                "selection": record.selection,
                "pricing": pricing,
            }),
        ),
        selection_delta: None,
        next_step: Some(BookingStep::BookingComplete),
        pricing: Some(pricing),
    })
}

/// A fresh six-character reference, always distinct from the original PNR
fn generate_booking_reference(original: Option<&str>) -> String {
    loop {
        let candidate: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(6)
            .collect::<String>()
            .to_uppercase();
        if Some(candidate.as_str()) != original {
            return candidate;
        }
    }
}
