//! Pure pricing engine. No I/O, no side effects: the same selection and
//! configuration always produce byte-identical results, which the booking
//! summary and the tests rely on.

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::config::PricingConfig;
use crate::core::booking::BookingSelection;

/// One priced line in the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub label: String,
    pub amount: i64,
}

/// Authoritative pricing for a booking selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub hotel_cost: i64,
    pub flight_fare_difference: i64,
    pub transfers_cost: i64,
    pub tours_cost: i64,
    pub total_cash_price: i64,
    /// Always exactly `total_cash_price * avios_conversion_rate`
    pub total_avios_price: i64,
    pub line_items: Vec<LineItem>,
}

/// Compute the cash and Avios totals for a selection.
///
/// Negative quantities and unit prices are rejected at the tool boundary
/// before this is called; the engine itself only sums.
pub fn compute_pricing(selection: &BookingSelection, config: &PricingConfig) -> PricingResult {
    let nights = i64::from(selection.duration.unwrap_or(0));
    // The rate the customer was shown is the rate they are billed: the
    // selected hotel's catalog rate, with the config rate as the fallback
    // before a hotel is chosen.
    let nightly_rate = selection
        .hotel_id
        .as_deref()
        .and_then(catalog::hotel_by_id)
        .map(|hotel| hotel.price_per_night)
        .unwrap_or(config.rate_per_night);
    let hotel_cost = nightly_rate * nights;
    let flight_fare_difference = config.flight_fare_difference;
    let transfers_cost = if selection.transfers_included {
        config.transfer_price
    } else {
        0
    };

    let mut line_items = vec![
        LineItem {
            label: format!("Hotel ({nights} nights)"),
            amount: hotel_cost,
        },
        LineItem {
            label: "Flight fare difference".to_string(),
            amount: flight_fare_difference,
        },
    ];

    if selection.transfers_included {
        line_items.push(LineItem {
            label: "Airport transfers".to_string(),
            amount: transfers_cost,
        });
    }

    let mut tours_cost = 0;
    for tour in &selection.tours {
        // Zero-quantity lines contribute nothing and are not itemized.
        if tour.quantity == 0 {
            continue;
        }
        let amount = i64::from(tour.quantity) * tour.unit_price;
        tours_cost += amount;
        line_items.push(LineItem {
            label: format!("{} x{}", tour.tour_id, tour.quantity),
            amount,
        });
    }

    let total_cash_price = hotel_cost + flight_fare_difference + transfers_cost + tours_cost;
    let total_avios_price = total_cash_price * config.avios_conversion_rate;

    PricingResult {
        hotel_cost,
        flight_fare_difference,
        transfers_cost,
        tours_cost,
        total_cash_price,
        total_avios_price,
        line_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::booking::{Timing, TourLine};

    fn scenario_selection() -> BookingSelection {
        BookingSelection {
            category_id: Some("premium".into()),
            category_name: Some("Premium".into()),
            hotel_id: Some("millennium".into()),
            hotel_name: Some("Millennium Hotel Doha".into()),
            timing: Some(Timing::Outbound),
            duration: Some(2),
            transfers_included: true,
            tours: vec![TourLine {
                tour_id: "whale-sharks".into(),
                quantity: 2,
                unit_price: 195,
            }],
        }
    }

    #[test]
    fn full_scenario_totals() {
        let result = compute_pricing(&scenario_selection(), &PricingConfig::default());
        assert_eq!(result.hotel_cost, 300);
        assert_eq!(result.flight_fare_difference, 115);
        assert_eq!(result.transfers_cost, 60);
        assert_eq!(result.tours_cost, 390);
        assert_eq!(result.total_cash_price, 865);
        assert_eq!(result.total_avios_price, 108_125);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let selection = scenario_selection();
        let config = PricingConfig::default();
        let first = compute_pricing(&selection, &config);
        let second = compute_pricing(&selection, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn avios_is_exact_multiple_of_cash() {
        let config = PricingConfig::default();
        for duration in 1..=4u32 {
            for transfers in [false, true] {
                let selection = BookingSelection {
                    duration: Some(duration),
                    transfers_included: transfers,
                    tours: vec![TourLine {
                        tour_id: "desert-safari".into(),
                        quantity: duration,
                        unit_price: 85,
                    }],
                    ..Default::default()
                };
                let result = compute_pricing(&selection, &config);
                assert_eq!(
                    result.total_avios_price,
                    result.total_cash_price * config.avios_conversion_rate
                );
            }
        }
    }

    #[test]
    fn zero_quantity_tour_is_not_itemized() {
        let mut selection = scenario_selection();
        selection.tours.push(TourLine {
            tour_id: "mia-tour".into(),
            quantity: 0,
            unit_price: 35,
        });

        let result = compute_pricing(&selection, &PricingConfig::default());
        assert_eq!(result.tours_cost, 390);
        assert!(result.line_items.iter().all(|item| !item.label.starts_with("mia-tour")));
    }

    #[test]
    fn nightly_rate_follows_the_selected_hotel() {
        // The customer is billed the rate the catalog advertised, not a
        // flat programme rate.
        let mut selection = scenario_selection();
        selection.hotel_id = Some("raffles".into());
        selection.hotel_name = Some("Raffles Doha".into());

        let result = compute_pricing(&selection, &PricingConfig::default());
        assert_eq!(result.hotel_cost, 640);
        assert_eq!(result.total_cash_price, 640 + 115 + 60 + 390);

        // Without a hotel the config rate is the fallback.
        selection.hotel_id = None;
        let result = compute_pricing(&selection, &PricingConfig::default());
        assert_eq!(result.hotel_cost, 300);
    }

    #[test]
    fn transfers_excluded_when_not_selected() {
        let mut selection = scenario_selection();
        selection.transfers_included = false;
        let result = compute_pricing(&selection, &PricingConfig::default());
        assert_eq!(result.transfers_cost, 0);
        assert_eq!(result.total_cash_price, 805);
        assert!(result.line_items.iter().all(|item| item.label != "Airport transfers"));
    }
}
