//! ListPull - decklist order intake
//!
//! Parses and prices decklists, submits orders to the local database and
//! lists them for staff.

use clap::{Parser, Subcommand};
use listpull::{
    fetch_prices, mark_ready, parse_decklist, price_decklist, submit_order, suggest_names,
    validate_decklist, validate_decklist_text, AppConfig, CardDataProvider, Game, LogNotifier,
    NewOrder, OrderStatus, OrderStore, ParseResult, PokemonTcgProvider, RequestQueue,
    ScryfallProvider, SqliteOrderStore,
};
use std::path::{Path, PathBuf};

/// Decklist order intake for a trading card store
#[derive(Parser, Debug)]
#[command(name = "listpull")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, env = "LISTPULL_DB", default_value_t = default_db_path())]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a decklist file and show what was read
    Parse {
        /// Decklist text file
        file: PathBuf,
    },
    /// Parse a decklist file and look up reference prices
    Price {
        file: PathBuf,
        /// Card game: mtg or pokemon
        #[arg(short, long, default_value = "mtg")]
        game: Game,
    },
    /// Suggest card names for a partial name
    Suggest {
        partial: String,
        #[arg(short, long, default_value = "mtg")]
        game: Game,
    },
    /// Submit a decklist file as a new order
    Submit {
        file: PathBuf,
        /// Customer name
        #[arg(long)]
        name: String,
        /// Customer email
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(short, long, default_value = "mtg")]
        game: Game,
    },
    /// List orders, newest first
    Orders {
        /// Only show orders with this status (e.g. submitted, ready)
        #[arg(short, long)]
        status: Option<OrderStatus>,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
    },
    /// Mark an order ready for pickup and email the customer
    Ready {
        /// Order id
        id: i64,
    },
}

/// Returns the default database path: ~/.local/share/listpull/listpull.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("listpull")
        .join("listpull.db")
        .to_string_lossy()
        .to_string()
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AppConfig::from_env();

    if let Err(e) = run(args, &config).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args, config: &AppConfig) -> listpull::Result<()> {
    match args.command {
        Command::Parse { file } => {
            let text = std::fs::read_to_string(&file)?;
            let parsed = parse_decklist(&text);
            print_parse_result(&parsed);
            print_warnings(&check_decklist(&text, &parsed, config));
        }
        Command::Price { file, game } => {
            let text = std::fs::read_to_string(&file)?;
            let parsed = parse_decklist(&text);
            print_warnings(&check_decklist(&text, &parsed, config));
            match game {
                Game::Magic => print_prices(&scryfall(config)?, &parsed).await,
                Game::Pokemon => print_prices(&pokemon(config)?, &parsed).await,
            }
        }
        Command::Suggest { partial, game } => {
            let names = match game {
                Game::Magic => suggest_names(&scryfall(config)?, &partial).await,
                Game::Pokemon => suggest_names(&pokemon(config)?, &partial).await,
            };
            for name in names {
                println!("{name}");
            }
        }
        Command::Submit {
            file,
            name,
            email,
            phone,
            notes,
            game,
        } => {
            let raw_decklist = std::fs::read_to_string(&file)?;
            let mut store = open_store(Path::new(&args.database))?;
            let notifier = LogNotifier::new(config.clone());
            let new_order = NewOrder {
                customer_name: name,
                customer_email: email,
                customer_phone: phone,
                game,
                notes,
                raw_decklist,
            };

            let submission = submit_order(&mut store, &notifier, config, new_order).await?;
            println!(
                "Submitted order {} ({} line items)",
                submission.order.order_number,
                submission.items.len()
            );
            for error in &submission.parse_errors {
                println!("  needs review: {error}");
            }
            print_warnings(&submission.warnings);
        }
        Command::Orders {
            status,
            limit,
            offset,
        } => {
            let store = open_store(Path::new(&args.database))?;
            let orders = store.list_orders(status, limit, offset)?;
            if orders.is_empty() {
                println!("No orders found");
            }
            for order in orders {
                let total = order
                    .estimated_total
                    .map(|t| format!("${t:.2}"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>4}  {}  {:<12} {:<8} {:>10}  {} <{}>  {}",
                    order.id,
                    order.order_number,
                    order.status.as_str(),
                    order.game.code(),
                    total,
                    order.customer_name,
                    order.customer_email,
                    order.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Ready { id } => {
            let mut store = open_store(Path::new(&args.database))?;
            let notifier = LogNotifier::new(config.clone());
            let order = mark_ready(&mut store, &notifier, id).await?;
            println!("Order {} is ready for pickup", order.order_number);
        }
    }
    Ok(())
}

fn scryfall(config: &AppConfig) -> listpull::Result<ScryfallProvider> {
    ScryfallProvider::new(
        &config.scryfall_url,
        RequestQueue::new(config.scryfall_delay),
        config.request_timeout,
    )
}

fn pokemon(config: &AppConfig) -> listpull::Result<PokemonTcgProvider> {
    PokemonTcgProvider::new(
        &config.pokemon_url,
        RequestQueue::new(config.pokemon_delay),
        config.request_timeout,
    )
}

fn open_store(db_path: &Path) -> listpull::Result<SqliteOrderStore> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            log::info!("Created directory: {}", parent.display());
        }
    }
    SqliteOrderStore::open(db_path)
}

fn check_decklist(text: &str, parsed: &ParseResult, config: &AppConfig) -> Vec<String> {
    let mut warnings = validate_decklist_text(text, &config.limits);
    warnings.extend(validate_decklist(&parsed.cards, &config.limits));
    warnings
}

fn print_parse_result(parsed: &ParseResult) {
    for card in &parsed.cards {
        let flag = if card.needs_review() { "  [review]" } else { "" };
        println!("{} {}{}", card.quantity, card.card_name, flag);
    }
    println!(
        "\n{} entries, {} cards",
        parsed.cards.len(),
        parsed.total_quantity()
    );
    for error in &parsed.errors {
        println!("  {error}");
    }
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("WARNING: {warning}");
    }
}

async fn print_prices<P: CardDataProvider>(provider: &P, parsed: &ParseResult) {
    let names: Vec<String> = parsed
        .cards
        .iter()
        .filter(|c| c.quantity > 0)
        .map(|c| c.card_name.clone())
        .collect();
    let prices = fetch_prices(provider, &names).await;

    for card in parsed.cards.iter().filter(|c| c.quantity > 0) {
        let lookup = prices.get(&card.card_name.to_lowercase());
        let record = lookup.and_then(|l| l.record.as_ref());
        let price = lookup
            .and_then(|l| l.reference_price.as_deref())
            .unwrap_or("-");
        match record {
            Some(record) => println!(
                "{} x {} [{}] {}",
                card.quantity, record.name, record.set_name, price
            ),
            None => println!("{} x {} (not found)", card.quantity, card.card_name),
        }
    }

    let pricing = price_decklist(
        parsed
            .cards
            .iter()
            .filter(|c| c.quantity > 0)
            .map(|c| (c.card_name.as_str(), c.quantity)),
        &prices,
    );
    println!("\nReference total: ${:.2}", pricing.total);
    if !pricing.missing_prices.is_empty() {
        println!("No price for: {}", pricing.missing_prices.join(", "));
    }
}
