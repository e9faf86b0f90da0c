//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = match &cmd {
        BackendCommand::SignIn { .. } => "sign_in",
        BackendCommand::SignOut => "sign_out",
        BackendCommand::FetchLiveCars => "fetch_live_cars",
        BackendCommand::FetchOwnerDashboard => "fetch_owner_dashboard",
        BackendCommand::FetchOwnerEarnings => "fetch_owner_earnings",
        BackendCommand::CreateBooking { .. } => "create_booking",
        BackendCommand::FetchPaymentOrder { .. } => "fetch_payment_order",
        BackendCommand::PresentCheckout { .. } => "present_checkout",
        BackendCommand::VerifyPayment { .. } => "verify_payment",
        BackendCommand::DeleteCar { .. } => "delete_car",
        BackendCommand::FetchCarImage { .. } => "fetch_car_image",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); retry sign-in"
                    .to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn reports_full_queue_without_blocking() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut status = String::new();

        dispatch_backend_command(&cmd_tx, BackendCommand::FetchLiveCars, &mut status);
        assert!(status.is_empty());

        dispatch_backend_command(&cmd_tx, BackendCommand::FetchLiveCars, &mut status);
        assert!(status.contains("queue is full"));
    }

    #[test]
    fn reports_disconnected_backend_worker() {
        let (cmd_tx, cmd_rx) = bounded(4);
        drop(cmd_rx);
        let mut status = String::new();

        dispatch_backend_command(&cmd_tx, BackendCommand::SignOut, &mut status);
        assert!(status.contains("Backend command processor disconnected"));
    }
}
