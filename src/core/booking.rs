use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::tools::ToolName;

/// The fixed forward order of booking steps. Each step corresponds to exactly
/// one tool; `BookingComplete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStep {
    #[default]
    Welcome,
    CategoriesShown,
    CategorySelected,
    HotelSelected,
    TimingSelected,
    ExtrasSelected,
    PaymentInitiated,
    BookingComplete,
}

impl BookingStep {
    pub const ALL: &'static [BookingStep] = &[
        BookingStep::Welcome,
        BookingStep::CategoriesShown,
        BookingStep::CategorySelected,
        BookingStep::HotelSelected,
        BookingStep::TimingSelected,
        BookingStep::ExtrasSelected,
        BookingStep::PaymentInitiated,
        BookingStep::BookingComplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStep::Welcome => "welcome",
            BookingStep::CategoriesShown => "categories-shown",
            BookingStep::CategorySelected => "category-selected",
            BookingStep::HotelSelected => "hotel-selected",
            BookingStep::TimingSelected => "timing-selected",
            BookingStep::ExtrasSelected => "extras-selected",
            BookingStep::PaymentInitiated => "payment-initiated",
            BookingStep::BookingComplete => "booking-complete",
        }
    }

    /// Tools the orchestrator exposes to the model at this step. Exposure is
    /// the only step-order enforcement; tool execution itself never checks the
    /// current step, so a model re-calling an earlier tool simply overwrites
    /// the matching selection fields.
    pub fn available_tools(&self) -> &'static [ToolName] {
        match self {
            BookingStep::Welcome => &[ToolName::ShowCategories],
            BookingStep::CategoriesShown => &[ToolName::SelectCategory],
            BookingStep::CategorySelected => &[ToolName::SelectHotel],
            BookingStep::HotelSelected => &[ToolName::SelectTimingAndDuration],
            BookingStep::TimingSelected => &[ToolName::SelectExtras],
            BookingStep::ExtrasSelected => &[ToolName::InitiatePayment],
            BookingStep::PaymentInitiated => &[ToolName::CompleteBooking],
            BookingStep::BookingComplete => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStep::BookingComplete)
    }
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStep {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        BookingStep::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| AgentError::InvalidRequest(format!("Unknown booking step: {s}")))
    }
}

/// Whether the stopover attaches to the outbound or the return leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    Outbound,
    Return,
}

impl Timing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timing::Outbound => "outbound",
            Timing::Return => "return",
        }
    }
}

/// One selected tour line inside the booking selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourLine {
    pub tour_id: String,
    pub quantity: u32,
    pub unit_price: i64,
}

/// Choices accumulated over the conversation, in step order. Mutated only by
/// successful tool executions through [`SelectionDelta::apply`]; a failed tool
/// call never touches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSelection {
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub hotel_id: Option<String>,
    pub hotel_name: Option<String>,
    pub timing: Option<Timing>,
    /// Nights, within 1..=4 once set (validated at the tool boundary)
    pub duration: Option<u32>,
    pub transfers_included: bool,
    pub tours: Vec<TourLine>,
}

/// The partial update a successful tool execution produces. Unset fields keep
/// their previous value; set fields overwrite (idempotent re-selection).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDelta {
    pub category: Option<(String, String)>,
    pub hotel: Option<(String, String)>,
    pub timing: Option<Timing>,
    pub duration: Option<u32>,
    pub transfers_included: Option<bool>,
    pub tours: Option<Vec<TourLine>>,
}

impl SelectionDelta {
    pub fn apply(&self, selection: &mut BookingSelection) {
        if let Some((id, name)) = &self.category {
            selection.category_id = Some(id.clone());
            selection.category_name = Some(name.clone());
        }
        if let Some((id, name)) = &self.hotel {
            selection.hotel_id = Some(id.clone());
            selection.hotel_name = Some(name.clone());
        }
        if let Some(timing) = self.timing {
            selection.timing = Some(timing);
        }
        if let Some(duration) = self.duration {
            selection.duration = Some(duration);
        }
        if let Some(transfers) = self.transfers_included {
            selection.transfers_included = transfers;
        }
        if let Some(tours) = &self.tours {
            selection.tours = tours.clone();
        }
    }
}
