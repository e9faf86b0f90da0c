use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use reqwest::{Client, Response};
use shared::{
    domain::{CarId, OrderId, Role, UserProfile},
    error::{ApiError, ApiException},
    protocol::{
        Car, CreateBookingRequest, CreateBookingResponse, EarningsReport, LiveCarsResponse,
        OwnerDashboardResponse, PaymentOrder, PaymentStatusResponse, SignInRequest,
        SignInResponse,
    },
};
use tracing::info;

pub mod payment;
pub mod session;
pub mod views;

pub use payment::{
    BrowserCheckoutGateway, CheckoutPresentError, MissingPaymentGateway, PaymentGateway,
};
pub use session::{
    JsonFileSessionStore, MemorySessionStore, PersistedSession, SessionContext, SessionStore,
};

/// Decodes the backend's `ApiError` envelope on failed statuses. Responses
/// without the envelope keep reqwest's own status error.
async fn require_success(response: Response) -> Result<Response> {
    if let Err(status_error) = response.error_for_status_ref() {
        if let Ok(envelope) = response.json::<ApiError>().await {
            return Err(ApiException::from(envelope).into());
        }
        return Err(status_error.into());
    }
    Ok(response)
}

/// HTTP client for the rental backend. Credentials are borrowed from the
/// injected [`SessionContext`] on every call, so a teardown immediately cuts
/// off authenticated traffic.
pub struct RentalClient {
    http: Client,
    session: Arc<SessionContext>,
}

impl RentalClient {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self {
            http: Client::new(),
            session,
        }
    }

    pub fn session_context(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub async fn sign_in(
        &self,
        server_url: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile> {
        let server_url = session::normalize_server_url(server_url)?;
        let response = self
            .http
            .post(format!("{server_url}/auth/login"))
            .json(&SignInRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let response: SignInResponse = require_success(response).await?.json().await?;
        self.session
            .establish(&server_url, &response.token, response.user.clone())
            .await?;
        info!(
            user_id = response.user.user_id.0,
            role = ?response.user.role,
            "signed in"
        );
        Ok(response.user)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.session.teardown().await
    }

    pub async fn live_cars(&self) -> Result<Vec<Car>> {
        let (server_url, token) = self.session.session().await?;
        let response = self
            .http
            .get(format!("{server_url}/cars/live"))
            .bearer_auth(&token)
            .send()
            .await?;
        let response: LiveCarsResponse = require_success(response).await?.json().await?;
        Ok(response.cars)
    }

    pub async fn owner_dashboard(&self) -> Result<OwnerDashboardResponse> {
        self.session.require_role(Role::Owner).await?;
        let (server_url, token) = self.session.session().await?;
        let response = self
            .http
            .get(format!("{server_url}/owner/dashboard"))
            .bearer_auth(&token)
            .send()
            .await?;
        Ok(require_success(response).await?.json().await?)
    }

    pub async fn owner_earnings(&self) -> Result<EarningsReport> {
        self.session.require_role(Role::Owner).await?;
        let (server_url, token) = self.session.session().await?;
        let response = self
            .http
            .get(format!("{server_url}/owner/earnings"))
            .bearer_auth(&token)
            .send()
            .await?;
        Ok(require_success(response).await?.json().await?)
    }

    /// Books a car for the given pickup/return range. The backend answers
    /// with the new booking id plus the payment order to settle.
    pub async fn create_booking(
        &self,
        car_id: CarId,
        pickup_at: NaiveDateTime,
        return_at: NaiveDateTime,
    ) -> Result<CreateBookingResponse> {
        if return_at <= pickup_at {
            return Err(anyhow!("return time must be after pickup time"));
        }
        let (server_url, token) = self.session.session().await?;
        let response = self
            .http
            .post(format!("{server_url}/bookings"))
            .bearer_auth(&token)
            .json(&CreateBookingRequest {
                car_id,
                pickup_at,
                return_at,
            })
            .send()
            .await?;
        let response: CreateBookingResponse = require_success(response).await?.json().await?;
        info!(
            booking_id = response.booking_id.0,
            order_id = %response.order_id,
            "booking created"
        );
        Ok(response)
    }

    pub async fn payment_order(&self, order_id: &OrderId) -> Result<PaymentOrder> {
        let (server_url, token) = self.session.session().await?;
        let response = self
            .http
            .get(format!("{server_url}/payments/orders/{order_id}"))
            .bearer_auth(&token)
            .send()
            .await?;
        Ok(require_success(response).await?.json().await?)
    }

    pub async fn payment_status(&self, order_id: &OrderId) -> Result<PaymentStatusResponse> {
        let (server_url, token) = self.session.session().await?;
        let response = self
            .http
            .get(format!("{server_url}/payments/orders/{order_id}/status"))
            .bearer_auth(&token)
            .send()
            .await?;
        Ok(require_success(response).await?.json().await?)
    }

    pub async fn delete_car(&self, car_id: CarId) -> Result<()> {
        self.session.require_role(Role::Owner).await?;
        let (server_url, token) = self.session.session().await?;
        let response = self
            .http
            .delete(format!("{server_url}/owner/cars/{}", car_id.0))
            .bearer_auth(&token)
            .send()
            .await?;
        require_success(response).await?;
        info!(car_id = car_id.0, "car removed from listing");
        Ok(())
    }

    /// Downloads a car photo. Server-relative paths are resolved against the
    /// session's backend and sent authenticated; absolute URLs go out as-is
    /// so the bearer token never leaves our backend.
    pub async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>> {
        let request = if image_url.starts_with("http://") || image_url.starts_with("https://") {
            self.http.get(image_url)
        } else {
            let (server_url, token) = self.session.session().await?;
            self.http
                .get(format!("{server_url}/{}", image_url.trim_start_matches('/')))
                .bearer_auth(token)
        };
        let response = require_success(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
