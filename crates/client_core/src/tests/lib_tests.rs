use super::*;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use shared::{
    domain::{BookingId, PaymentStatus, UserId},
    error::{ApiError, ApiException, ErrorCode},
};
use tokio::{net::TcpListener, sync::Mutex};

const TEST_TOKEN: &str = "token-123";
const TEST_PASSWORD: &str = "correct-horse";

#[derive(Clone)]
struct RentalServerState {
    last_authorization: Arc<Mutex<Option<String>>>,
    captured_booking: Arc<Mutex<Option<CreateBookingRequest>>>,
    deleted_cars: Arc<Mutex<Vec<i64>>>,
    payment_status: Arc<Mutex<PaymentStatus>>,
}

fn owner_profile() -> UserProfile {
    UserProfile {
        user_id: UserId(7),
        email: "dana@example.com".to_string(),
        name: Some("Dana".to_string()),
        role: Role::Owner,
    }
}

fn customer_profile() -> UserProfile {
    UserProfile {
        user_id: UserId(8),
        email: "ben@example.com".to_string(),
        name: None,
        role: Role::User,
    }
}

fn test_car() -> Car {
    Car {
        car_id: CarId(11),
        name: "City Hatch".to_string(),
        owner_name: "Dana".to_string(),
        location: "Berlin".to_string(),
        seats: 5,
        fuel_type: "petrol".to_string(),
        price_per_day: 120.0,
        vehicle_color: "blue".to_string(),
        image_urls: vec!["/media/hatch.png".to_string()],
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()
        .map(|value| value.to_string())
}

async fn record_and_check_auth(
    state: &RentalServerState,
    headers: &HeaderMap,
) -> Result<(), StatusCode> {
    let seen = bearer(headers);
    *state.last_authorization.lock().await = seen.clone();
    let expected = format!("Bearer {TEST_TOKEN}");
    if seen.as_deref() == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn handle_sign_in(
    Json(request): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, (StatusCode, Json<ApiError>)> {
    if request.password != TEST_PASSWORD {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiError {
                code: ErrorCode::Unauthorized,
                message: "invalid credentials".to_string(),
            }),
        ));
    }
    Ok(Json(SignInResponse {
        token: TEST_TOKEN.to_string(),
        user: owner_profile(),
    }))
}

async fn handle_live_cars(
    State(state): State<RentalServerState>,
    headers: HeaderMap,
) -> Result<Json<LiveCarsResponse>, StatusCode> {
    record_and_check_auth(&state, &headers).await?;
    Ok(Json(LiveCarsResponse {
        cars: vec![test_car()],
    }))
}

async fn handle_owner_dashboard(
    State(state): State<RentalServerState>,
    headers: HeaderMap,
) -> Result<Json<OwnerDashboardResponse>, StatusCode> {
    record_and_check_auth(&state, &headers).await?;
    Ok(Json(OwnerDashboardResponse {
        cars: vec![test_car()],
        bookings: Vec::new(),
    }))
}

async fn handle_owner_earnings(
    State(state): State<RentalServerState>,
    headers: HeaderMap,
) -> Result<Json<EarningsReport>, StatusCode> {
    record_and_check_auth(&state, &headers).await?;
    Ok(Json(EarningsReport {
        total_owner: 192.0,
        per_booking: Vec::new(),
    }))
}

async fn handle_create_booking(
    State(state): State<RentalServerState>,
    headers: HeaderMap,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, StatusCode> {
    record_and_check_auth(&state, &headers).await?;
    *state.captured_booking.lock().await = Some(request);
    Ok(Json(CreateBookingResponse {
        booking_id: BookingId(501),
        order_id: OrderId::new("ord_501"),
        total_amount: 240.0,
    }))
}

async fn handle_payment_order(
    State(state): State<RentalServerState>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PaymentOrder>, StatusCode> {
    record_and_check_auth(&state, &headers).await?;
    let status = *state.payment_status.lock().await;
    Ok(Json(PaymentOrder {
        order_id: OrderId::new(order_id),
        amount: 240.0,
        currency: "EUR".to_string(),
        checkout_url: Some("http://pay.example/checkout/ord_501".to_string()),
        status,
    }))
}

async fn handle_payment_status(
    State(state): State<RentalServerState>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PaymentStatusResponse>, StatusCode> {
    record_and_check_auth(&state, &headers).await?;
    let status = *state.payment_status.lock().await;
    Ok(Json(PaymentStatusResponse {
        order_id: OrderId::new(order_id),
        status,
    }))
}

async fn handle_delete_car(
    State(state): State<RentalServerState>,
    Path(car_id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    record_and_check_auth(&state, &headers).await?;
    state.deleted_cars.lock().await.push(car_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_media(
    State(state): State<RentalServerState>,
    headers: HeaderMap,
) -> Result<Vec<u8>, StatusCode> {
    record_and_check_auth(&state, &headers).await?;
    Ok(b"png-bytes".to_vec())
}

async fn spawn_rental_server() -> Result<(String, RentalServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = RentalServerState {
        last_authorization: Arc::new(Mutex::new(None)),
        captured_booking: Arc::new(Mutex::new(None)),
        deleted_cars: Arc::new(Mutex::new(Vec::new())),
        payment_status: Arc::new(Mutex::new(PaymentStatus::Created)),
    };
    let app = Router::new()
        .route("/auth/login", post(handle_sign_in))
        .route("/cars/live", get(handle_live_cars))
        .route("/owner/dashboard", get(handle_owner_dashboard))
        .route("/owner/earnings", get(handle_owner_earnings))
        .route("/bookings", post(handle_create_booking))
        .route("/payments/orders/:order_id", get(handle_payment_order))
        .route("/payments/orders/:order_id/status", get(handle_payment_status))
        .route("/owner/cars/:car_id", delete(handle_delete_car))
        .route("/media/hatch.png", get(handle_media))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn new_client() -> RentalClient {
    let store = Arc::new(MemorySessionStore::default());
    RentalClient::new(Arc::new(SessionContext::new(store)))
}

fn stamp(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[tokio::test]
async fn sign_in_attaches_bearer_token_to_subsequent_calls() {
    let (server_url, state) = spawn_rental_server().await.expect("spawn server");
    let client = new_client();

    let profile = client
        .sign_in(&server_url, "dana@example.com", TEST_PASSWORD)
        .await
        .expect("sign in");
    assert_eq!(profile.role, Role::Owner);
    assert!(client.session_context().is_signed_in().await);

    let cars = client.live_cars().await.expect("live cars");
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0].name, "City Hatch");

    let seen = state.last_authorization.lock().await.clone();
    assert_eq!(seen.as_deref(), Some("Bearer token-123"));
}

#[tokio::test]
async fn rejected_credentials_surface_as_unauthorized() {
    let (server_url, _state) = spawn_rental_server().await.expect("spawn server");
    let client = new_client();

    let err = client
        .sign_in(&server_url, "dana@example.com", "wrong")
        .await
        .expect_err("sign in must fail");
    let exception = err
        .downcast_ref::<ApiException>()
        .expect("decoded error envelope");
    assert_eq!(exception.code, ErrorCode::Unauthorized);
    assert!(exception.message.contains("invalid credentials"));
    assert!(!client.session_context().is_signed_in().await);
}

#[tokio::test]
async fn plain_status_errors_survive_without_an_envelope() {
    let (server_url, _state) = spawn_rental_server().await.expect("spawn server");
    let client = new_client();
    client
        .session_context()
        .establish(&server_url, "stale-token", owner_profile())
        .await
        .expect("establish");

    let err = client.live_cars().await.expect_err("stale token");
    assert!(err.downcast_ref::<ApiException>().is_none());
    assert!(err.to_string().contains("401"), "got: {err}");
}

#[tokio::test]
async fn calls_without_a_session_fail_before_any_request() {
    let client = new_client();
    let err = client.live_cars().await.expect_err("no session");
    assert!(err.to_string().contains("not signed in"));
}

#[tokio::test]
async fn owner_endpoints_require_the_owner_role() {
    let client = new_client();
    client
        .session_context()
        .establish("http://127.0.0.1:9", TEST_TOKEN, customer_profile())
        .await
        .expect("establish");

    let err = client.owner_dashboard().await.expect_err("role guard");
    assert!(err.to_string().contains("forbidden"), "got: {err}");

    let err = client.delete_car(CarId(1)).await.expect_err("role guard");
    assert!(err.to_string().contains("forbidden"), "got: {err}");
}

#[tokio::test]
async fn create_booking_sends_the_merged_timestamps() {
    let (server_url, state) = spawn_rental_server().await.expect("spawn server");
    let client = new_client();
    client
        .sign_in(&server_url, "dana@example.com", TEST_PASSWORD)
        .await
        .expect("sign in");

    let pickup_at = stamp(1, 14, 30);
    let return_at = stamp(3, 10, 0);
    let response = client
        .create_booking(CarId(11), pickup_at, return_at)
        .await
        .expect("create booking");
    assert_eq!(response.booking_id, BookingId(501));
    assert_eq!(response.order_id, OrderId::new("ord_501"));

    let captured = state
        .captured_booking
        .lock()
        .await
        .clone()
        .expect("request captured");
    assert_eq!(captured.car_id, CarId(11));
    assert_eq!(captured.pickup_at, pickup_at);
    assert_eq!(captured.return_at, return_at);
}

#[tokio::test]
async fn create_booking_rejects_inverted_ranges_locally() {
    let (server_url, state) = spawn_rental_server().await.expect("spawn server");
    let client = new_client();
    client
        .sign_in(&server_url, "dana@example.com", TEST_PASSWORD)
        .await
        .expect("sign in");

    let err = client
        .create_booking(CarId(11), stamp(3, 10, 0), stamp(1, 14, 30))
        .await
        .expect_err("inverted range");
    assert!(err.to_string().contains("after pickup"), "got: {err}");
    assert!(state.captured_booking.lock().await.is_none());
}

#[tokio::test]
async fn payment_order_and_status_reflect_settlement() {
    let (server_url, state) = spawn_rental_server().await.expect("spawn server");
    let client = new_client();
    client
        .sign_in(&server_url, "dana@example.com", TEST_PASSWORD)
        .await
        .expect("sign in");

    let order_id = OrderId::new("ord_501");
    let order = client.payment_order(&order_id).await.expect("order");
    assert_eq!(order.status, PaymentStatus::Created);
    assert!(order.checkout_url.is_some());

    *state.payment_status.lock().await = PaymentStatus::Paid;
    let status = client.payment_status(&order_id).await.expect("status");
    assert_eq!(status.status, PaymentStatus::Paid);
}

#[tokio::test]
async fn delete_car_hits_the_owner_endpoint() {
    let (server_url, state) = spawn_rental_server().await.expect("spawn server");
    let client = new_client();
    client
        .sign_in(&server_url, "dana@example.com", TEST_PASSWORD)
        .await
        .expect("sign in");

    client.delete_car(CarId(42)).await.expect("delete car");
    assert_eq!(state.deleted_cars.lock().await.clone(), vec![42]);
}

#[tokio::test]
async fn fetch_image_resolves_relative_paths_against_the_backend() {
    let (server_url, _state) = spawn_rental_server().await.expect("spawn server");
    let client = new_client();
    client
        .sign_in(&server_url, "dana@example.com", TEST_PASSWORD)
        .await
        .expect("sign in");

    let bytes = client.fetch_image("/media/hatch.png").await.expect("image");
    assert_eq!(bytes, b"png-bytes".to_vec());
}
