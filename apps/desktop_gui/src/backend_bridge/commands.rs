//! Backend commands queued from UI to backend worker.

use chrono::NaiveDateTime;
use shared::domain::{CarId, OrderId};

pub enum BackendCommand {
    SignIn {
        server_url: String,
        email: String,
        password: String,
    },
    SignOut,
    FetchLiveCars,
    FetchOwnerDashboard,
    FetchOwnerEarnings,
    CreateBooking {
        car_id: CarId,
        pickup_at: NaiveDateTime,
        return_at: NaiveDateTime,
    },
    FetchPaymentOrder {
        order_id: OrderId,
    },
    PresentCheckout {
        order_id: OrderId,
    },
    VerifyPayment {
        order_id: OrderId,
    },
    DeleteCar {
        car_id: CarId,
    },
    FetchCarImage {
        car_id: CarId,
        url: String,
    },
}
