//! Catalog-browsing tools: category carousel, hotel selection, and the
//! timing/duration options for the chosen hotel.

use serde_json::json;

use crate::catalog;
use crate::core::booking::{BookingStep, SelectionDelta};
use crate::core::conversation::ConversationRecord;
use crate::error::{AgentError, FieldError, Result};
use crate::tools::params::{SelectCategoryParams, SelectHotelParams};
use crate::tools::ToolOutcome;
use crate::types::ui::UiComponent;

pub fn show_categories() -> ToolOutcome {
    ToolOutcome {
        success: true,
        message: "Here are the stopover hotel categories to choose from.".to_string(),
        ui_component: UiComponent::new(
            "categoryCarousel",
            json!({ "categories": catalog::CATEGORIES }),
        ),
        selection_delta: None,
        next_step: Some(BookingStep::CategoriesShown),
        pricing: None,
    }
}

pub fn select_category(params: SelectCategoryParams) -> Result<ToolOutcome> {
    let category = catalog::category_by_id(&params.category_id).ok_or_else(|| {
        AgentError::validation(
            "selectCategory",
            vec![FieldError::new(
                "categoryId",
                format!("unknown category `{}`", params.category_id),
            )],
        )
    })?;

    let hotels = catalog::hotels_in_category(category.id);

    Ok(ToolOutcome {
        success: true,
        message: format!("{} hotels available for your stopover.", category.name),
        ui_component: UiComponent::new(
            "hotelCarousel",
            json!({
                "category": category,
                "hotels": hotels,
            }),
        ),
        selection_delta: Some(SelectionDelta {
            category: Some((category.id.to_string(), category.name.to_string())),
            ..Default::default()
        }),
        next_step: Some(BookingStep::CategorySelected),
        pricing: None,
    })
}

pub fn select_hotel(params: SelectHotelParams, record: &ConversationRecord) -> Result<ToolOutcome> {
    let hotel = catalog::hotel_by_id(&params.hotel_id).ok_or_else(|| {
        AgentError::validation(
            "selectHotel",
            vec![FieldError::new(
                "hotelId",
                format!("unknown hotel `{}`", params.hotel_id),
            )],
        )
    })?;

    let booking = record.context.booking.clone().unwrap_or_default();
    let origin = booking.origin.unwrap_or_else(|| "your origin".to_string());
    let destination = booking
        .destination
        .unwrap_or_else(|| "your destination".to_string());

    Ok(ToolOutcome {
        success: true,
        message: format!(
            "{} selected. When would you like the stopover, and for how many nights?",
            hotel.name
        ),
        ui_component: UiComponent::new(
            "timingSelector",
            json!({
                "hotel": hotel,
                "route": { "origin": origin, "destination": destination },
                "timings": [
                    { "id": "outbound", "label": format!("On the way to {destination}") },
                    { "id": "return", "label": format!("On the way back to {origin}") },
                ],
                "durations": [1, 2, 3, 4],
            }),
        ),
        selection_delta: Some(SelectionDelta {
            hotel: Some((hotel.id.to_string(), hotel.name.to_string())),
            ..Default::default()
        }),
        next_step: Some(BookingStep::HotelSelected),
        pricing: None,
    })
}
