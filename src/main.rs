use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use prometheus::Registry;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shop_admin::metrics::{encode_text, TransitionMetrics};
use shop_admin::{
    allowed_targets, HttpOrderService, Order, OrderId, OrderReader, OrderServiceConfig,
    OrderStatus, OrderStatusTransitionGuard, TransitionError,
};

#[derive(Parser, Debug)]
#[command(name = "shop_admin", about = "Order status administration for the shop backend")]
struct Cli {
    /// Base URL of the order service REST API
    #[arg(long, env = "ORDER_SERVICE_URL", default_value = "http://localhost:8080/api")]
    base_url: String,

    /// Bearer token for the order service
    #[arg(long, env = "ORDER_SERVICE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "ORDER_SERVICE_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show an order and the statuses it may move to
    Show { id: OrderId },
    /// List the statuses reachable from STATUS
    Transitions { status: OrderStatus },
    /// Move an order to a new status
    SetStatus {
        id: OrderId,
        status: OrderStatus,
        /// Print transition metrics in Prometheus text format afterwards
        #[arg(long)]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();

    // Default to INFO, override with RUST_LOG, e.g. RUST_LOG=debug
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,shop_admin=debug")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = OrderServiceConfig::new(cli.base_url)
        .with_request_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(token) = cli.token {
        config = config.with_token(token);
    }

    match cli.command {
        Command::Transitions { status } => {
            print_transitions(status);
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { id } => {
            let service = HttpOrderService::new(config)?;
            let order = service.fetch_order(id).await?;
            print_order(&order);
            print_transitions(order.status);
            Ok(ExitCode::SUCCESS)
        }
        Command::SetStatus { id, status, metrics: print_metrics } => {
            let registry = Registry::new();
            let metrics = TransitionMetrics::new(&registry)?;
            let service = Arc::new(HttpOrderService::new(config)?);
            let guard = OrderStatusTransitionGuard::new(service.clone()).with_metrics(metrics);

            // Current status must come from the service, never from a cache.
            let order = service.fetch_order(id).await?;

            let code = match guard.request_transition(&order, status).await {
                Ok(updated) => {
                    println!("Order {} is now {}", updated.id, updated.status);
                    ExitCode::SUCCESS
                }
                Err(TransitionError::Illegal { current, target }) => {
                    eprintln!("Not allowed: order {id} cannot move from {current} to {target}");
                    print_transitions(current);
                    ExitCode::from(2)
                }
                Err(TransitionError::Remote(e)) => {
                    eprintln!("Order service error, try again: {e}");
                    ExitCode::from(1)
                }
            };

            let exposition = encode_text(&registry)?;
            if print_metrics {
                print!("{exposition}");
            } else {
                tracing::debug!(metrics = %exposition, "Transition metrics");
            }

            Ok(code)
        }
    }
}

fn print_order(order: &Order) {
    println!("Order {}", order.id);
    println!("  status:   {}", order.status);
    println!("  customer: {}", order.customer.name);
    if let Some(email) = &order.customer.email {
        println!("  email:    {email}");
    }
    println!("  total:    {:.2}", order.total_price);
    for item in &order.items {
        let name = item.product_name.as_deref().unwrap_or("-");
        println!(
            "  - #{} {} x{} @ {:.2}",
            item.product_id, name, item.quantity, item.price
        );
    }
}

fn print_transitions(status: OrderStatus) {
    let targets = allowed_targets(status);
    if targets.is_empty() {
        println!("{status} is terminal; no further transitions");
    } else {
        let names: Vec<&str> = targets.iter().map(OrderStatus::as_str).collect();
        println!("{status} -> {}", names.join(", "));
    }
}
