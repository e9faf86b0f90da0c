//! Backend worker thread. Owns the tokio runtime and the rental client;
//! commands arrive over a bounded channel and results flow back as
//! [`UiEvent`]s for the immediate-mode UI to drain each frame.

use std::sync::Arc;
use std::thread;

use client_core::{
    BrowserCheckoutGateway, JsonFileSessionStore, PaymentGateway, RentalClient, SessionContext,
};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::ui::app::{AppPaths, CarPhoto, StartupConfig};

pub fn launch(startup: StartupConfig, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let paths = match AppPaths::from_startup(&startup) {
                Ok(paths) => paths,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err}"),
                    )));
                    tracing::error!("failed to resolve app data paths: {err}");
                    return;
                }
            };
            if let Err(err) = std::fs::create_dir_all(&paths.data_root) {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!(
                        "backend worker startup failure: could not prepare data directory '{}'. Ensure it is writable and relaunch: {err}",
                        paths.data_root.display()
                    ),
                )));
                tracing::error!(
                    "failed to create data directory '{}': {err}",
                    paths.data_root.display()
                );
                return;
            }

            let store = Arc::new(JsonFileSessionStore::new(&paths.session_path));
            let session = Arc::new(SessionContext::new(store));
            let client = RentalClient::new(Arc::clone(&session));
            let gateway = BrowserCheckoutGateway;

            match session.hydrate().await {
                Ok(Some(profile)) => {
                    tracing::info!(user_id = profile.user_id.0, "restored persisted session");
                    let _ = ui_tx.try_send(UiEvent::SessionRestored(profile));
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("session hydrate failed: {err}");
                }
            }
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::SignIn {
                        server_url,
                        email,
                        password,
                    } => {
                        tracing::info!("backend: sign_in");
                        match client.sign_in(&server_url, &email, &password).await {
                            Ok(profile) => {
                                let _ = ui_tx.try_send(UiEvent::SignedIn(profile));
                            }
                            Err(err) => {
                                tracing::error!("backend: sign_in failed: {err}");
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::SignIn,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::SignOut => {
                        tracing::info!("backend: sign_out");
                        match client.sign_out().await {
                            Ok(()) => {
                                let _ = ui_tx.try_send(UiEvent::SignedOut);
                            }
                            Err(err) => {
                                tracing::error!("backend: sign_out failed: {err}");
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::General,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::FetchLiveCars => {
                        tracing::info!("backend: fetch_live_cars");
                        match client.live_cars().await {
                            Ok(cars) => {
                                let _ = ui_tx.try_send(UiEvent::LiveCarsLoaded(cars));
                            }
                            Err(err) => {
                                tracing::error!("backend: fetch_live_cars failed: {err}");
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::General,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::FetchOwnerDashboard => {
                        tracing::info!("backend: fetch_owner_dashboard");
                        match client.owner_dashboard().await {
                            Ok(dashboard) => {
                                let _ = ui_tx.try_send(UiEvent::OwnerDashboardLoaded {
                                    cars: dashboard.cars,
                                    bookings: dashboard.bookings,
                                });
                            }
                            Err(err) => {
                                tracing::error!("backend: fetch_owner_dashboard failed: {err}");
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::OwnerAction,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::FetchOwnerEarnings => {
                        tracing::info!("backend: fetch_owner_earnings");
                        match client.owner_earnings().await {
                            Ok(report) => {
                                let _ = ui_tx.try_send(UiEvent::OwnerEarningsLoaded(report));
                            }
                            Err(err) => {
                                tracing::error!("backend: fetch_owner_earnings failed: {err}");
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::OwnerAction,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::CreateBooking {
                        car_id,
                        pickup_at,
                        return_at,
                    } => {
                        tracing::info!(
                            car_id = car_id.0,
                            %pickup_at,
                            %return_at,
                            "backend: create_booking"
                        );
                        match client.create_booking(car_id, pickup_at, return_at).await {
                            Ok(response) => {
                                let _ = ui_tx.try_send(UiEvent::BookingCreated(response));
                            }
                            Err(err) => {
                                tracing::error!(
                                    car_id = car_id.0,
                                    "backend: create_booking failed: {err}"
                                );
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::Booking,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::FetchPaymentOrder { order_id } => {
                        tracing::info!(order_id = %order_id, "backend: fetch_payment_order");
                        match client.payment_order(&order_id).await {
                            Ok(order) => {
                                let _ = ui_tx.try_send(UiEvent::PaymentOrderLoaded(order));
                            }
                            Err(err) => {
                                tracing::error!(
                                    order_id = %order_id,
                                    "backend: fetch_payment_order failed: {err}"
                                );
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::Payment,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::PresentCheckout { order_id } => {
                        tracing::info!(order_id = %order_id, "backend: present_checkout");
                        let result = match client.payment_order(&order_id).await {
                            Ok(order) => gateway.present_checkout(&order).await,
                            Err(err) => Err(err),
                        };
                        match result {
                            Ok(()) => {
                                let _ = ui_tx.try_send(UiEvent::CheckoutPresented {
                                    order_id: order_id.clone(),
                                });
                            }
                            Err(err) => {
                                tracing::error!(
                                    order_id = %order_id,
                                    "backend: present_checkout failed: {err}"
                                );
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::Payment,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::VerifyPayment { order_id } => {
                        tracing::info!(order_id = %order_id, "backend: verify_payment");
                        match client.payment_status(&order_id).await {
                            Ok(response) => {
                                let _ = ui_tx.try_send(UiEvent::PaymentStatusLoaded {
                                    order_id: response.order_id,
                                    status: response.status,
                                });
                            }
                            Err(err) => {
                                tracing::error!(
                                    order_id = %order_id,
                                    "backend: verify_payment failed: {err}"
                                );
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::Payment,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::DeleteCar { car_id } => {
                        tracing::info!(car_id = car_id.0, "backend: delete_car");
                        match client.delete_car(car_id).await {
                            Ok(()) => {
                                let _ = ui_tx.try_send(UiEvent::CarDeleted(car_id));
                            }
                            Err(err) => {
                                tracing::error!(car_id = car_id.0, "backend: delete_car failed: {err}");
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::OwnerAction,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::FetchCarImage { car_id, url } => {
                        match client.fetch_image(&url).await {
                            Ok(bytes) => match decode_car_photo(&bytes) {
                                Ok(image) => {
                                    let _ =
                                        ui_tx.try_send(UiEvent::CarImageLoaded { car_id, image });
                                }
                                Err(err) => {
                                    tracing::warn!(
                                        car_id = car_id.0,
                                        "car photo decode failed: {err}"
                                    );
                                    let _ = ui_tx.try_send(UiEvent::CarImageFailed {
                                        car_id,
                                        reason: err,
                                    });
                                }
                            },
                            Err(err) => {
                                let _ = ui_tx.try_send(UiEvent::CarImageFailed {
                                    car_id,
                                    reason: format!("Failed to download photo: {err}"),
                                });
                            }
                        }
                    }
                }
            }
            tracing::info!("backend worker shutting down");
        });
    });
}

fn decode_car_photo(bytes: &[u8]) -> Result<CarPhoto, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = dynamic.thumbnail(1024, 1024).to_rgba8();
    let width = resized.width() as usize;
    let height = resized.height() as usize;
    Ok(CarPhoto {
        width,
        height,
        rgba: resized.into_raw(),
    })
}
