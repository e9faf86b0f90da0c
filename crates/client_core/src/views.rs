use std::collections::HashSet;

use chrono::NaiveDateTime;
use shared::{
    domain::BookingStatus,
    protocol::{BookingSummary, Car, EarningsReport},
};

/// Fraction of a booking's total that the car owner keeps; the platform
/// retains the rest.
pub const OWNER_REVENUE_SHARE: f64 = 0.80;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Case-insensitive substring match on car name and location. Empty inputs
/// match everything, so the dashboard can feed its text fields in directly.
pub fn filter_cars<'a>(cars: &'a [Car], search: &str, location: &str) -> Vec<&'a Car> {
    let search = search.trim().to_lowercase();
    let location = location.trim().to_lowercase();
    cars.iter()
        .filter(|car| {
            (search.is_empty() || car.name.to_lowercase().contains(&search))
                && (location.is_empty() || car.location.to_lowercase().contains(&location))
        })
        .collect()
}

/// Distinct customers across the owner's bookings, by email.
pub fn unique_customer_count(bookings: &[BookingSummary]) -> usize {
    bookings
        .iter()
        .map(|booking| booking.customer_email.to_ascii_lowercase())
        .collect::<HashSet<_>>()
        .len()
}

pub fn active_booking_count(bookings: &[BookingSummary]) -> usize {
    bookings
        .iter()
        .filter(|booking| booking.status == BookingStatus::Approved)
        .count()
}

pub fn owner_share_of(total_amount: f64) -> f64 {
    total_amount * OWNER_REVENUE_SHARE
}

pub fn average_owner_share(report: &EarningsReport) -> f64 {
    if report.per_booking.is_empty() {
        return 0.0;
    }
    report.total_owner / report.per_booking.len() as f64
}

/// Price for the pickup/return range at the given daily rate. Any partial
/// day bills as a whole day, so every positive range costs at least one day;
/// non-positive ranges have no price.
pub fn booking_quote(
    pickup_at: NaiveDateTime,
    return_at: NaiveDateTime,
    price_per_day: f64,
) -> Option<f64> {
    let minutes = (return_at - pickup_at).num_minutes();
    if minutes <= 0 {
        return None;
    }
    let billed_days = (minutes + MINUTES_PER_DAY - 1) / MINUTES_PER_DAY;
    Some(billed_days as f64 * price_per_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::domain::{BookingId, CarId};

    fn car(name: &str, location: &str) -> Car {
        Car {
            car_id: CarId(1),
            name: name.to_string(),
            owner_name: "Dana".to_string(),
            location: location.to_string(),
            seats: 5,
            fuel_type: "petrol".to_string(),
            price_per_day: 120.0,
            vehicle_color: "blue".to_string(),
            image_urls: Vec::new(),
        }
    }

    fn booking(id: i64, email: &str, status: BookingStatus) -> BookingSummary {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        BookingSummary {
            booking_id: BookingId(id),
            car_name: "Sedan".to_string(),
            customer_email: email.to_string(),
            status,
            start_at: start,
            end_at: start + chrono::Duration::days(2),
            total_amount: 240.0,
        }
    }

    fn stamp(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn filter_matches_name_and_location_independently() {
        let cars = vec![
            car("City Hatch", "Berlin"),
            car("Coastal Cruiser", "Hamburg"),
            car("city Van", "Munich"),
        ];

        let by_name = filter_cars(&cars, "city", "");
        assert_eq!(by_name.len(), 2);

        let by_location = filter_cars(&cars, "", "ham");
        assert_eq!(by_location.len(), 1);
        assert_eq!(by_location[0].name, "Coastal Cruiser");

        let both = filter_cars(&cars, "city", "berlin");
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].location, "Berlin");

        assert_eq!(filter_cars(&cars, "", "").len(), 3);
    }

    #[test]
    fn customer_count_ignores_case_and_duplicates() {
        let bookings = vec![
            booking(1, "ana@example.com", BookingStatus::Approved),
            booking(2, "ANA@example.com", BookingStatus::Cancelled),
            booking(3, "ben@example.com", BookingStatus::Approved),
        ];
        assert_eq!(unique_customer_count(&bookings), 2);
    }

    #[test]
    fn only_approved_bookings_count_as_active() {
        let bookings = vec![
            booking(1, "ana@example.com", BookingStatus::Approved),
            booking(2, "ben@example.com", BookingStatus::PendingApproval),
            booking(3, "cal@example.com", BookingStatus::Cancelled),
        ];
        assert_eq!(active_booking_count(&bookings), 1);
    }

    #[test]
    fn owner_keeps_eighty_percent() {
        assert!((owner_share_of(250.0) - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_share_is_zero_for_empty_reports() {
        let empty = EarningsReport {
            total_owner: 0.0,
            per_booking: Vec::new(),
        };
        assert_eq!(average_owner_share(&empty), 0.0);
    }

    #[test]
    fn quote_rounds_partial_days_up() {
        // 26 hours bills as two days.
        let quote = booking_quote(stamp(1, 10, 0), stamp(2, 12, 0), 100.0);
        assert_eq!(quote, Some(200.0));

        // 30 minutes still bills one full day.
        let quote = booking_quote(stamp(1, 10, 0), stamp(1, 10, 30), 100.0);
        assert_eq!(quote, Some(100.0));

        // Exactly 48 hours bills exactly two days.
        let quote = booking_quote(stamp(1, 10, 0), stamp(3, 10, 0), 100.0);
        assert_eq!(quote, Some(200.0));
    }

    #[test]
    fn quote_rejects_non_positive_ranges() {
        assert_eq!(booking_quote(stamp(2, 10, 0), stamp(2, 10, 0), 100.0), None);
        assert_eq!(booking_quote(stamp(2, 10, 0), stamp(1, 10, 0), 100.0), None);
    }
}
