use anyhow::{bail, Context};
use time::macros::format_description;
use time::Date;

use pintalab::gdpr;
use pintalab::orders::dto::{OrderFilter, StatusFilter};
use pintalab::orders::{services as orders, OrderStatus};
use pintalab::reports::{self, services::DEFAULT_POPULAR_LIMIT};
use pintalab::{AppConfig, AppState};

const USAGE: &str = "usage: pintalab <command>
  init
  stats
  popular [limit]
  orders [status|Kaikki] [from YYYY-MM-DD] [to YYYY-MM-DD]
  details <order_id>
  set-status <order_id> <status>
  delete-order <order_id>
  export <user_id>
  anonymize <user_id>";

fn parse_id(arg: Option<&String>, what: &str) -> anyhow::Result<i64> {
    let raw = arg.with_context(|| format!("missing {what}"))?;
    raw.parse().with_context(|| format!("invalid {what} {raw:?}"))
}

fn parse_date(raw: &str) -> anyhow::Result<Date> {
    let fmt = format_description!("[year]-[month]-[day]");
    Date::parse(raw, &fmt).with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "pintalab=info,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config = AppConfig::from_env().context("load configuration")?;
    let state = AppState::init(config).context("build application state")?;

    match command.as_str() {
        "init" => {
            state.pool().await.context("initialize store")?;
            println!("store ready at {}", state.db.path().display());
        }
        "stats" => {
            let stats = reports::try_admin_statistics(&state).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        "popular" => {
            let limit = match args.get(1) {
                Some(raw) => raw.parse().with_context(|| format!("invalid limit {raw:?}"))?,
                None => DEFAULT_POPULAR_LIMIT,
            };
            let materials = reports::get_popular_materials(&state, limit).await?;
            println!("{}", serde_json::to_string_pretty(&materials)?);
        }
        "orders" => {
            let status: StatusFilter = match args.get(1) {
                Some(raw) => raw.parse()?,
                None => StatusFilter::All,
            };
            let filter = OrderFilter {
                status,
                from: args.get(2).map(|d| parse_date(d)).transpose()?,
                to: args.get(3).map(|d| parse_date(d)).transpose()?,
            };
            for order in orders::try_list_orders(&state, &filter).await? {
                let contact = order.contact(&state.cipher);
                println!(
                    "{}\t{}\t{}\t{} €\t{}",
                    order.id,
                    order.formatted_created_date(),
                    order.status,
                    order.total_cost,
                    contact.name
                );
            }
        }
        "details" => {
            let id = parse_id(args.get(1), "order id")?;
            let Some(details) = orders::get_order_details(&state, id).await? else {
                bail!("order {id} not found");
            };
            let contact = details.order.contact(&state.cipher);
            println!(
                "order {} ({}), {} €, {}",
                details.order.id,
                details.order.status,
                details.order.total_cost,
                details.order.formatted_created_date()
            );
            println!("customer: {} <{}> {}", contact.name, contact.email, contact.phone);
            for item in &details.items {
                println!(
                    "  {} {} {} {}x{}x{} {} | {} | {} | {} | {} €",
                    item.room,
                    item.cabinet_type,
                    item.front_type,
                    item.width,
                    item.height,
                    item.thickness,
                    item.handedness,
                    item.material_name,
                    item.handle_name,
                    item.hinge_name,
                    item.cost
                );
            }
        }
        "set-status" => {
            let id = parse_id(args.get(1), "order id")?;
            let raw = args.get(2).context("missing status")?;
            let status: OrderStatus = raw.parse()?;
            if !orders::update_order_status(&state, id, status).await? {
                bail!("order {id} not found");
            }
            println!("order {id} is now {status}");
        }
        "delete-order" => {
            let id = parse_id(args.get(1), "order id")?;
            if !orders::delete_order(&state, id).await? {
                bail!("order {id} not found");
            }
            println!("order {id} deleted");
        }
        "export" => {
            let id = parse_id(args.get(1), "user id")?;
            let Some(json) = gdpr::export_user_data(&state, id).await? else {
                bail!("user {id} not found");
            };
            println!("{json}");
        }
        "anonymize" => {
            let id = parse_id(args.get(1), "user id")?;
            if !gdpr::anonymize_user(&state, id).await? {
                bail!("user {id} not found");
            }
            println!("user {id} anonymized");
        }
        other => {
            eprintln!("unknown command {other:?}\n{USAGE}");
            std::process::exit(2);
        }
    }

    state.db.close().await;
    Ok(())
}
