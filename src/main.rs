use std::sync::Arc;

use time::OffsetDateTime;

use finance_ledger::{
    ExpenseLedger, LedgerStore, LendBorrowLedger, LibsqlStore, RestStore,
    aggregation::DashboardSummary,
    config::{Backend, Config},
    logging,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    logging::init();

    let config = Config::from_env().map_err(|e| format!("Configuration error: {}", e))?;

    match &config.backend {
        Backend::Rest {
            url,
            api_key,
            access_token,
        } => {
            let store = RestStore::new(url, api_key, access_token)
                .map_err(|e| format!("Failed to create REST store: {}", e))?;
            report(Arc::new(store), &config).await
        }
        Backend::Local { data_path } => {
            let store = LibsqlStore::open(data_path)
                .await
                .map_err(|e| format!("Failed to open ledger database: {}", e))?;
            report(Arc::new(store), &config).await
        }
    }
}

async fn report<S: LedgerStore>(store: Arc<S>, config: &Config) -> Result<()> {
    let expenses = ExpenseLedger::new(Arc::clone(&store), config.owner.clone())
        .with_timeout(config.request_timeout);
    let lend_borrow =
        LendBorrowLedger::new(store, config.owner.clone()).with_timeout(config.request_timeout);

    let (expenses_loaded, entries_loaded) = tokio::join!(expenses.list(), lend_borrow.list());
    expenses_loaded.map_err(|e| format!("Failed to load expenses: {}", e))?;
    entries_loaded.map_err(|e| format!("Failed to load lend/borrow records: {}", e))?;

    let summary =
        DashboardSummary::from_snapshots(&expenses.expenses().await, &lend_borrow.entries().await);

    println!("Ledger for {}", config.owner);
    println!("  Total expenses:   {:.2}", summary.total_expenses);
    println!("  Money lent:       {:.2}", summary.pending_lent);
    println!("  Money borrowed:   {:.2}", summary.pending_borrowed);
    println!(
        "  Pending returns:  {:.2} ({} records)",
        summary.pending_returns, summary.pending_count
    );
    println!("  Net balance:      {:.2}", summary.net_balance);

    let by_category = expenses.by_category().await;
    if !by_category.is_empty() {
        println!("By category:");
        for (category, amount) in by_category {
            println!("  {:<14}{:.2}", category, amount);
        }
    }

    let today = OffsetDateTime::now_utc().date();
    let overdue = lend_borrow.overdue(today).await;
    if !overdue.is_empty() {
        println!("Overdue:");
        for entry in overdue {
            println!(
                "  {} {:.2} ({:?}, due {})",
                entry.counterparty,
                entry.amount,
                entry.direction,
                entry.due_date.map(|d| d.to_string()).unwrap_or_default()
            );
        }
    }

    Ok(())
}
