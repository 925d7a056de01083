//! Static stopover catalog: hotel categories, hotels, and optional tours.
//!
//! The catalog is fixed and finite; authoritative pricing always comes from
//! the pricing engine, the amounts here are display data for UI descriptors.

use serde::Serialize;

/// A hotel category tier
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub star_rating: u8,
    pub description: &'static str,
    pub price_per_night: i64,
}

/// A bookable stopover hotel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: &'static str,
    pub name: &'static str,
    pub category_id: &'static str,
    pub area: &'static str,
    pub price_per_night: i64,
    pub amenities: &'static [&'static str],
}

/// An optional tour add-on
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: &'static str,
    pub name: &'static str,
    pub duration_hours: u8,
    pub price_per_person: i64,
}

pub const CATEGORIES: &[Category] = &[
    Category {
        id: "standard",
        name: "Standard",
        star_rating: 3,
        description: "Comfortable city hotels close to the metro",
        price_per_night: 85,
    },
    Category {
        id: "premium",
        name: "Premium",
        star_rating: 4,
        description: "Four-star hotels in central Doha",
        price_per_night: 150,
    },
    Category {
        id: "luxury",
        name: "Luxury",
        star_rating: 5,
        description: "Five-star resorts and landmark properties",
        price_per_night: 320,
    },
];

pub const HOTELS: &[Hotel] = &[
    Hotel {
        id: "premier-inn",
        name: "Premier Inn Doha Education City",
        category_id: "standard",
        area: "Education City",
        price_per_night: 85,
        amenities: &["wifi", "pool", "airport-shuttle"],
    },
    Hotel {
        id: "alwadi",
        name: "Alwadi Hotel Doha",
        category_id: "standard",
        area: "Msheireb Downtown",
        price_per_night: 95,
        amenities: &["wifi", "gym", "restaurant"],
    },
    Hotel {
        id: "millennium",
        name: "Millennium Hotel Doha",
        category_id: "premium",
        area: "Al Sadd",
        price_per_night: 150,
        amenities: &["wifi", "pool", "spa", "restaurant"],
    },
    Hotel {
        id: "souq-waqif",
        name: "Souq Waqif Boutique Hotel",
        category_id: "premium",
        area: "Souq Waqif",
        price_per_night: 165,
        amenities: &["wifi", "spa", "rooftop-pool"],
    },
    Hotel {
        id: "raffles",
        name: "Raffles Doha",
        category_id: "luxury",
        area: "Lusail",
        price_per_night: 320,
        amenities: &["wifi", "butler", "spa", "private-beach"],
    },
    Hotel {
        id: "the-ned",
        name: "The Ned Doha",
        category_id: "luxury",
        area: "Corniche",
        price_per_night: 340,
        amenities: &["wifi", "pools", "spa", "club-floor"],
    },
];

pub const TOURS: &[Tour] = &[
    Tour {
        id: "whale-sharks",
        name: "Whale Sharks of Qatar",
        duration_hours: 8,
        price_per_person: 195,
    },
    Tour {
        id: "desert-safari",
        name: "Desert Safari & Inland Sea",
        duration_hours: 6,
        price_per_person: 85,
    },
    Tour {
        id: "doha-city-tour",
        name: "Doha City Highlights",
        duration_hours: 4,
        price_per_person: 45,
    },
    Tour {
        id: "mia-tour",
        name: "Museum of Islamic Art Tour",
        duration_hours: 3,
        price_per_person: 35,
    },
];

pub fn category_by_id(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

pub fn hotel_by_id(id: &str) -> Option<&'static Hotel> {
    HOTELS.iter().find(|h| h.id == id)
}

pub fn hotels_in_category(category_id: &str) -> Vec<&'static Hotel> {
    HOTELS.iter().filter(|h| h.category_id == category_id).collect()
}

pub fn tour_by_id(id: &str) -> Option<&'static Tour> {
    TOURS.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_hotel_belongs_to_a_known_category() {
        for hotel in HOTELS {
            assert!(
                category_by_id(hotel.category_id).is_some(),
                "hotel {} references unknown category {}",
                hotel.id,
                hotel.category_id
            );
        }
    }

    #[test]
    fn lookups_resolve_known_ids() {
        assert_eq!(hotel_by_id("millennium").map(|h| h.name), Some("Millennium Hotel Doha"));
        assert_eq!(tour_by_id("whale-sharks").map(|t| t.price_per_person), Some(195));
        assert!(category_by_id("glamping").is_none());
        assert_eq!(hotels_in_category("premium").len(), 2);
    }
}
