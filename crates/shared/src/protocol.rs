use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{BookingId, BookingStatus, CarId, OrderId, PaymentStatus, UserProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub car_id: CarId,
    pub name: String,
    pub owner_name: String,
    pub location: String,
    pub seats: u8,
    pub fuel_type: String,
    pub price_per_day: f64,
    pub vehicle_color: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveCarsResponse {
    pub cars: Vec<Car>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub booking_id: BookingId,
    pub car_name: String,
    pub customer_email: String,
    pub status: BookingStatus,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerDashboardResponse {
    pub cars: Vec<Car>,
    pub bookings: Vec<BookingSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingEarning {
    pub booking_id: BookingId,
    pub car_name: String,
    pub period: String,
    pub owner_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsReport {
    pub total_owner: f64,
    #[serde(default)]
    pub per_booking: Vec<BookingEarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub car_id: CarId,
    pub pickup_at: NaiveDateTime,
    pub return_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub booking_id: BookingId,
    pub order_id: OrderId,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub order_id: OrderId,
    pub amount: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub order_id: OrderId,
    pub status: PaymentStatus,
}
