use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{views, MemorySessionStore, RentalClient, SessionContext};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List live cars, optionally narrowed by name or location.
    Cars {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        location: String,
    },
    /// Print dashboard statistics for the signed-in owner.
    OwnerStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let session = Arc::new(SessionContext::new(Arc::new(MemorySessionStore::default())));
    let client = RentalClient::new(session);
    let profile = client
        .sign_in(&cli.server_url, &cli.email, &cli.password)
        .await?;
    println!("Signed in as {} ({:?})", profile.display_name(), profile.role);

    match cli.command {
        Command::Cars { search, location } => {
            let cars = client.live_cars().await?;
            let filtered = views::filter_cars(&cars, &search, &location);
            if filtered.is_empty() {
                println!("No live cars match the current filters.");
            }
            for car in filtered {
                println!(
                    "#{} {} | {} | {} seats | {:.2}/day",
                    car.car_id.0, car.name, car.location, car.seats, car.price_per_day
                );
            }
        }
        Command::OwnerStats => {
            let dashboard = client.owner_dashboard().await?;
            let earnings = client.owner_earnings().await?;
            println!("Cars listed:      {}", dashboard.cars.len());
            println!("Bookings:         {}", dashboard.bookings.len());
            println!(
                "Active bookings:  {}",
                views::active_booking_count(&dashboard.bookings)
            );
            println!(
                "Unique customers: {}",
                views::unique_customer_count(&dashboard.bookings)
            );
            println!("Owner earnings:   {:.2}", earnings.total_owner);
        }
    }

    client.sign_out().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_cars_subcommand_with_filters() {
        let cli = Cli::try_parse_from([
            "cli",
            "--email",
            "owner@example.com",
            "--password",
            "secret",
            "cars",
            "--search",
            "swift",
            "--location",
            "pune",
        ])
        .expect("args should parse");

        assert_eq!(cli.server_url, "http://127.0.0.1:8080");
        match cli.command {
            Command::Cars { search, location } => {
                assert_eq!(search, "swift");
                assert_eq!(location, "pune");
            }
            other => panic!("unexpected subcommand: {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_credentials() {
        assert!(Cli::try_parse_from(["cli", "owner-stats"]).is_err());
    }
}
