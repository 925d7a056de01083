//! Mid-flow tools: timing/duration and extras. `select_extras` is where the
//! pricing engine produces the authoritative totals.

use serde_json::json;

use crate::catalog;
use crate::config::PricingConfig;
use crate::core::booking::{BookingStep, SelectionDelta, TourLine};
use crate::core::conversation::ConversationRecord;
use crate::error::{AgentError, FieldError, Result};
use crate::pricing::compute_pricing;
use crate::tools::params::{SelectExtrasParams, SelectTimingParams};
use crate::tools::ToolOutcome;
use crate::types::ui::UiComponent;

pub fn select_timing_and_duration(
    params: SelectTimingParams,
    pricing: &PricingConfig,
) -> ToolOutcome {
    let nights = params.duration;
    ToolOutcome {
        success: true,
        message: format!(
            "Stopover set for the {} leg, {nights} night{}. Would you like transfers or tours?",
            params.timing.as_str(),
            if nights == 1 { "" } else { "s" },
        ),
        ui_component: UiComponent::new(
            "extrasSelector",
            json!({
                "transfers": { "price": pricing.transfer_price, "description": "Return airport transfers" },
                "tours": catalog::TOURS,
            }),
        ),
        selection_delta: Some(SelectionDelta {
            timing: Some(params.timing),
            duration: Some(nights),
            ..Default::default()
        }),
        next_step: Some(BookingStep::TimingSelected),
        pricing: None,
    }
}

pub fn select_extras(
    params: SelectExtrasParams,
    record: &ConversationRecord,
    pricing_config: &PricingConfig,
) -> Result<ToolOutcome> {
    let mut errors = Vec::new();
    let mut tours = Vec::new();
    let mut tours_total = 0i64;

    for (index, selected) in params.selected_tours.iter().enumerate() {
        let Some(tour) = catalog::tour_by_id(&selected.tour_id) else {
            errors.push(FieldError::new(
                format!("selectedTours.{index}.tourId"),
                format!("unknown tour `{}`", selected.tour_id),
            ));
            continue;
        };

        let expected_total = i64::from(selected.quantity) * tour.price_per_person;
        if selected.total_price != expected_total {
            errors.push(FieldError::new(
                format!("selectedTours.{index}.totalPrice"),
                format!(
                    "expected {} for {} x {}, got {}",
                    expected_total, selected.quantity, tour.id, selected.total_price
                ),
            ));
            continue;
        }

        // Consistent zero-quantity lines are dropped, never itemized.
        if selected.quantity == 0 {
            continue;
        }

        tours_total += expected_total;
        tours.push(TourLine {
            tour_id: tour.id.to_string(),
            quantity: selected.quantity,
            unit_price: tour.price_per_person,
        });
    }

    let transfers_total = if params.include_transfers {
        pricing_config.transfer_price
    } else {
        0
    };
    if errors.is_empty() && params.total_extras_price != tours_total + transfers_total {
        errors.push(FieldError::new(
            "totalExtrasPrice",
            format!(
                "expected {}, got {}",
                tours_total + transfers_total,
                params.total_extras_price
            ),
        ));
    }

    if !errors.is_empty() {
        return Err(AgentError::validation("selectExtras", errors));
    }

    let delta = SelectionDelta {
        transfers_included: Some(params.include_transfers),
        tours: Some(tours),
        ..Default::default()
    };

    // Price the projected selection so the summary reflects this call even
    // before the store merge happens.
    let mut projected = record.selection.clone();
    delta.apply(&mut projected);
    let pricing = compute_pricing(&projected, pricing_config);

    Ok(ToolOutcome {
        success: true,
        message: format!(
            "Your stopover comes to {} or {} Avios.",
            pricing.total_cash_price, pricing.total_avios_price
        ),
        ui_component: UiComponent::new(
            "pricingSummary",
            json!({
                "selection": projected,
                "pricing": pricing,
            }),
        ),
        selection_delta: Some(delta),
        next_step: Some(BookingStep::ExtrasSelected),
        pricing: Some(pricing),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::booking::Timing;
    use crate::tools::params::SelectedTour;
    use crate::types::request::ConversationContext;

    fn record_after_timing() -> ConversationRecord {
        let mut record = ConversationRecord::new("c1".into(), ConversationContext::default());
        record.selection.category_id = Some("premium".into());
        record.selection.hotel_id = Some("millennium".into());
        record.selection.timing = Some(Timing::Outbound);
        record.selection.duration = Some(2);
        record
    }

    #[test]
    fn timing_outcome_moves_to_timing_selected() {
        let outcome = select_timing_and_duration(
            SelectTimingParams {
                timing: Timing::Outbound,
                duration: 2,
            },
            &PricingConfig::default(),
        );
        assert_eq!(outcome.next_step, Some(BookingStep::TimingSelected));
        assert_eq!(outcome.ui_component.component_type, "extrasSelector");
    }

    #[test]
    fn extras_compute_scenario_pricing() {
        let outcome = select_extras(
            SelectExtrasParams {
                include_transfers: true,
                selected_tours: vec![SelectedTour {
                    tour_id: "whale-sharks".into(),
                    tour_name: Some("Whale Sharks of Qatar".into()),
                    quantity: 2,
                    total_price: 390,
                }],
                total_extras_price: 450,
            },
            &record_after_timing(),
            &PricingConfig::default(),
        )
        .unwrap();

        let pricing = outcome.pricing.unwrap();
        assert_eq!(pricing.total_cash_price, 865);
        assert_eq!(pricing.total_avios_price, 108_125);
        assert_eq!(outcome.next_step, Some(BookingStep::ExtrasSelected));
    }

    #[test]
    fn mismatched_tour_total_is_rejected() {
        let err = select_extras(
            SelectExtrasParams {
                include_transfers: false,
                selected_tours: vec![SelectedTour {
                    tour_id: "whale-sharks".into(),
                    tour_name: None,
                    quantity: 2,
                    total_price: 400,
                }],
                total_extras_price: 400,
            },
            &record_after_timing(),
            &PricingConfig::default(),
        )
        .unwrap_err();

        match err {
            AgentError::Validation { errors, .. } => {
                assert_eq!(errors[0].field, "selectedTours.0.totalPrice");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn zero_quantity_line_is_dropped_only_when_priced_consistently() {
        let record = record_after_timing();

        // quantity 0 with totalPrice 0 is simply dropped
        let outcome = select_extras(
            SelectExtrasParams {
                include_transfers: false,
                selected_tours: vec![SelectedTour {
                    tour_id: "mia-tour".into(),
                    tour_name: None,
                    quantity: 0,
                    total_price: 0,
                }],
                total_extras_price: 0,
            },
            &record,
            &PricingConfig::default(),
        )
        .unwrap();
        let delta = outcome.selection_delta.unwrap();
        assert_eq!(delta.tours, Some(Vec::new()));

        // quantity 0 with a nonzero totalPrice is inconsistent, not droppable
        let err = select_extras(
            SelectExtrasParams {
                include_transfers: false,
                selected_tours: vec![SelectedTour {
                    tour_id: "mia-tour".into(),
                    tour_name: None,
                    quantity: 0,
                    total_price: 50,
                }],
                total_extras_price: 50,
            },
            &record,
            &PricingConfig::default(),
        )
        .unwrap_err();
        match err {
            AgentError::Validation { errors, .. } => {
                assert_eq!(errors[0].field, "selectedTours.0.totalPrice");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tour_is_rejected_without_state_change() {
        let record = record_after_timing();
        let before = record.selection.clone();
        let err = select_extras(
            SelectExtrasParams {
                include_transfers: false,
                selected_tours: vec![SelectedTour {
                    tour_id: "moon-walk".into(),
                    tour_name: None,
                    quantity: 1,
                    total_price: 100,
                }],
                total_extras_price: 100,
            },
            &record,
            &PricingConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, AgentError::Validation { .. }));
        assert_eq!(record.selection, before);
    }
}
