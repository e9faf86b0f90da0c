//! UI/backend events and error modeling for the desktop controller.

use shared::{
    domain::{CarId, OrderId, PaymentStatus, UserProfile},
    protocol::{BookingSummary, Car, CreateBookingResponse, EarningsReport, PaymentOrder},
};

use crate::ui::app::CarPhoto;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    SignedIn(UserProfile),
    SessionRestored(UserProfile),
    SignedOut,
    LiveCarsLoaded(Vec<Car>),
    OwnerDashboardLoaded {
        cars: Vec<Car>,
        bookings: Vec<BookingSummary>,
    },
    OwnerEarningsLoaded(EarningsReport),
    BookingCreated(CreateBookingResponse),
    PaymentOrderLoaded(PaymentOrder),
    CheckoutPresented {
        order_id: OrderId,
    },
    PaymentStatusLoaded {
        order_id: OrderId,
        status: PaymentStatus,
    },
    CarDeleted(CarId),
    CarImageLoaded {
        car_id: CarId,
        image: CarPhoto,
    },
    CarImageFailed {
        car_id: CarId,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Payment,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    SignIn,
    Booking,
    Payment,
    OwnerAction,
    General,
}

pub fn classify_sign_in_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("backend worker startup failure")
        || lower.contains("failed to build backend runtime")
    {
        "Backend worker startup failure; verify local app environment and retry.".to_string()
    } else if lower.contains("failed to connect")
        || lower.contains("connection refused")
        || lower.contains("dns")
        || lower.contains("timed out")
    {
        "Server unreachable; check URL/network and retry sign-in.".to_string()
    } else {
        format!("Sign-in error: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("forbidden")
            || message_lower.contains("session expired")
            || message_lower.contains("invalid token")
            || message_lower.contains("invalid credential")
            || message_lower.contains("not signed in")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("payment")
            || message_lower.contains("checkout")
            || message_lower.contains("settle")
            || message_lower.contains("declin")
        {
            UiErrorCategory::Payment
        } else if message_lower.contains("invalid")
            || message_lower.contains("validation")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
            || message_lower.contains("must be after")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
