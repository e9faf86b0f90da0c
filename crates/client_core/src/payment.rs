use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::protocol::PaymentOrder;
use thiserror::Error;
use tracing::info;

#[cfg(target_os = "macos")]
const OPENER: (&str, &[&str]) = ("open", &[]);
#[cfg(target_os = "windows")]
const OPENER: (&str, &[&str]) = ("cmd", &["/C", "start", ""]);
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: (&str, &[&str]) = ("xdg-open", &[]);

#[derive(Debug, Error)]
pub enum CheckoutPresentError {
    #[error("payment order {order_id} has no hosted checkout url")]
    MissingCheckoutUrl { order_id: String },
    #[error("failed to launch checkout opener '{program}': {source}")]
    OpenerLaunch {
        program: &'static str,
        source: std::io::Error,
    },
    #[error("checkout opener '{program}' exited with {status}")]
    OpenerExit {
        program: &'static str,
        status: std::process::ExitStatus,
    },
}

/// Hands a payment order to an external checkout surface. Settlement is
/// observed through the backend's order status, never through this seam.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn present_checkout(&self, order: &PaymentOrder) -> Result<()>;
}

/// Opens the order's hosted checkout page in the system browser.
pub struct BrowserCheckoutGateway;

#[async_trait]
impl PaymentGateway for BrowserCheckoutGateway {
    async fn present_checkout(&self, order: &PaymentOrder) -> Result<()> {
        let checkout_url = order.checkout_url.as_deref().ok_or_else(|| {
            CheckoutPresentError::MissingCheckoutUrl {
                order_id: order.order_id.to_string(),
            }
        })?;
        let (program, args) = OPENER;
        let status = tokio::process::Command::new(program)
            .args(args)
            .arg(checkout_url)
            .status()
            .await
            .map_err(|source| CheckoutPresentError::OpenerLaunch { program, source })?;
        if !status.success() {
            return Err(CheckoutPresentError::OpenerExit { program, status }.into());
        }
        info!(order_id = %order.order_id, "opened hosted checkout page");
        Ok(())
    }
}

pub struct MissingPaymentGateway;

#[async_trait]
impl PaymentGateway for MissingPaymentGateway {
    async fn present_checkout(&self, _order: &PaymentOrder) -> Result<()> {
        Err(anyhow!("no payment gateway configured"))
    }
}
