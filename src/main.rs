use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use provenance::client::ApiClient;
use provenance::config::Config;
use provenance::controller::{Collection, ListState};
use provenance::decoder::{Resource, ResourceKind};
use provenance::display::{format_date, format_money, list_footer};
use provenance::filter::{CategoryFilter, TransactionFilter, search_categories, search_tags};
use provenance::preferences::{DateStyle, Preferences};
use provenance::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "provenance")]
#[command(about = "Browse accounts, transactions, categories and tags from the banking API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List accounts with their balances
    Accounts,
    /// List transactions
    Transactions {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
        #[arg(long)]
        settled_only: bool,
        /// Request only this account's transactions
        #[arg(long)]
        account: Option<String>,
        /// Request only transactions in this category or its children
        #[arg(long)]
        category_id: Option<String>,
        /// Request only transactions carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Follow pagination links until the last page
        #[arg(long)]
        all_pages: bool,
    },
    /// List categories
    Categories {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List tags
    Tags {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Add a tag to a transaction
    TagAdd { transaction: String, tag: String },
    /// Remove a tag from a transaction
    TagRemove { transaction: String, tag: String },
    /// Store the personal access token
    SetToken { token: String },
    /// Store the date display style (absolute or relative)
    SetDateStyle { style: DateStyle },
}

#[tokio::main]
async fn main() -> Result<()> {
    // load environment variables
    dotenv::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;
    let preferences = Preferences::open(config.preferences_path()).await;

    if let Some(token) = &config.api_token {
        preferences.set_api_token(token).await?;
    }
    if let Some(style) = config.date_style {
        preferences.set_date_style(style).await?;
    }

    let client =
        ApiClient::new(config, preferences.clone()).context("Failed to build HTTP client")?;
    let date_style = preferences.date_style().await;

    match cli.command {
        Command::SetToken { token } => {
            preferences.set_api_token(&token).await?;
            println!("Successfully changed API Key.");
        }
        Command::SetDateStyle { style } => {
            preferences.set_date_style(style).await?;
            println!("Date style set to {}.", style);
        }
        Command::Accounts => {
            let mut accounts = Collection::accounts();
            accounts.fetch(&client).await;
            ensure_loaded(&accounts)?;
            for account in accounts.items() {
                println!(
                    "{}  {:<24} {:>14}  created {}",
                    account.id,
                    account.display_name,
                    format_money(&account.balance),
                    format_date(account.created_at, date_style, OffsetDateTime::now_utc())
                );
            }
            println!("{}", list_footer(ResourceKind::Account, accounts.items().len()));
        }
        Command::Transactions {
            search,
            category,
            settled_only,
            account,
            category_id,
            tag,
            all_pages,
        } => {
            let mut transactions =
                Collection::scoped(account.as_deref(), category_id.as_deref(), tag.as_deref());
            if all_pages {
                transactions.load_all(&client).await;
            } else {
                transactions.fetch(&client).await;
            }
            ensure_loaded(&transactions)?;

            let mut filter = TransactionFilter::new()
                .search(search)
                .category(category)
                .settled_only(settled_only);
            // Filters the upstream scope did not cover
            if let Some(account) = account {
                filter = filter.account(account);
            }
            if let Some(category_id) = category_id {
                filter = filter.in_category(category_id);
            }
            if let Some(tag) = tag {
                filter = filter.tag(tag);
            }

            let visible = filter.apply(transactions.items());
            let now = OffsetDateTime::now_utc();
            for tx in &visible {
                println!(
                    "{}  {:<32} {:>12}  {}",
                    format_date(tx.created_at, date_style, now),
                    tx.description,
                    format_money(&tx.amount),
                    if tx.is_settled() { "settled" } else { "held" }
                );
            }
            if let Some(error) = transactions.load_more_error() {
                println!("{}", error);
            } else if transactions.can_load_more() {
                println!("More transactions available; pass --all-pages to load them.");
            } else {
                println!("{}", list_footer(ResourceKind::Transaction, visible.len()));
            }
        }
        Command::Categories { search } => {
            let mut categories = Collection::categories();
            categories.fetch(&client).await;
            ensure_loaded(&categories)?;
            let visible = search_categories(categories.items(), &search);
            for category in &visible {
                let parent = category.parent_id.as_deref().unwrap_or("-");
                println!("{:<36} {:<28} parent {}", category.id, category.name, parent);
            }
            println!("{}", list_footer(ResourceKind::Category, visible.len()));
        }
        Command::Tags { search } => {
            let mut tags = Collection::tags();
            tags.load_all(&client).await;
            ensure_loaded(&tags)?;
            let visible = search_tags(tags.items(), &search);
            for tag in &visible {
                println!("{}", tag.id);
            }
            println!("{}", list_footer(ResourceKind::Tag, visible.len()));
        }
        Command::TagAdd { transaction, tag } => {
            let mut state = AppState::new();
            let tx = find_transaction(&mut state, &client, &transaction).await?;
            state.add_tag(&client, &tx, &tag).await?;
            println!("Added tag \"{}\" to \"{}\".", tag, tx.description);
        }
        Command::TagRemove { transaction, tag } => {
            let mut state = AppState::new();
            let tx = find_transaction(&mut state, &client, &transaction).await?;
            state.remove_tag(&client, &tx, &tag).await?;
            println!("Removed tag \"{}\" from \"{}\".", tag, tx.description);
        }
    }

    Ok(())
}

async fn find_transaction(
    state: &mut AppState,
    client: &ApiClient,
    id: &str,
) -> Result<provenance::models::Transaction> {
    state.transactions.load_all(client).await;
    ensure_loaded(&state.transactions)?;
    state
        .transaction(id)
        .cloned()
        .with_context(|| format!("No transaction with id {}", id))
}

fn ensure_loaded<T: Resource>(collection: &Collection<T>) -> Result<()> {
    match collection.state() {
        ListState::Loaded(_) => Ok(()),
        ListState::Error(message) => bail!("{}", message),
        ListState::Unauthorized(errors) => {
            for error in errors {
                eprintln!("{}\n{}\n{}", error.title, error.detail, error.status);
            }
            bail!("{} fetch was not authorised", collection.kind().label())
        }
        ListState::Empty | ListState::Loading => {
            bail!("{} were not loaded", collection.kind().label())
        }
    }
}
