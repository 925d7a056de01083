//! Typed parameter structs for the booking tools. The binding contract is the
//! hand-written JSON schema each tool declares; these structs are the typed
//! landing zone after schema validation passes.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::booking::Timing;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectCategoryParams {
    pub category_id: String,
    pub category_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectHotelParams {
    pub hotel_id: String,
    pub hotel_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectTimingParams {
    pub timing: Timing,
    /// Nights at the stopover hotel, 1 to 4
    pub duration: u32,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectedTour {
    pub tour_id: String,
    #[serde(default)]
    pub tour_name: Option<String>,
    pub quantity: u32,
    pub total_price: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectExtrasParams {
    pub include_transfers: bool,
    pub selected_tours: Vec<SelectedTour>,
    pub total_extras_price: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
pub enum PaymentMethod {
    #[serde(rename = "credit-card")]
    CreditCard,
    #[serde(rename = "avios")]
    Avios,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::Avios => "avios",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentParams {
    pub payment_method: PaymentMethod,
    pub total_amount: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    pub method: String,
    pub confirmed: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBookingParams {
    pub payment_data: PaymentData,
}
