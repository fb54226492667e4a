use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use time::Date;

use crate::aggregation;
use crate::error::LedgerError;
use crate::models::{Category, Expense, ExpensePatch, NewExpense, OwnerId};
use crate::repository::Repository;
use crate::store::LedgerStore;
use crate::utils::{validate_expense_patch, validate_new_expense};

/// Expense records of one principal.
///
/// Payloads are validated here, before they reach the repository.
pub struct ExpenseLedger<S> {
    repo: Repository<S, Expense>,
}

impl<S> Clone for ExpenseLedger<S> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<S: LedgerStore> ExpenseLedger<S> {
    pub fn new(store: Arc<S>, owner: OwnerId) -> Self {
        Self {
            repo: Repository::new(store, owner),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            repo: self.repo.with_timeout(timeout),
        }
    }

    pub fn repository(&self) -> &Repository<S, Expense> {
        &self.repo
    }

    pub async fn list(&self) -> Result<(), LedgerError> {
        Ok(self.repo.list().await?)
    }

    pub async fn add(&self, expense: NewExpense) -> Result<Expense, LedgerError> {
        validate_new_expense(&expense)?;
        Ok(self.repo.add(&expense).await?)
    }

    pub async fn update(&self, id: &str, patch: ExpensePatch) -> Result<Expense, LedgerError> {
        validate_expense_patch(&patch)?;
        Ok(self.repo.update(id, &patch).await?)
    }

    pub async fn remove(&self, id: &str) -> Result<(), LedgerError> {
        Ok(self.repo.remove(id).await?)
    }

    pub async fn switch_owner(&self, owner: OwnerId) -> Result<(), LedgerError> {
        Ok(self.repo.switch_owner(owner).await?)
    }

    pub async fn expenses(&self) -> Vec<Expense> {
        self.repo.records().await
    }

    pub async fn is_loading(&self) -> bool {
        self.repo.is_loading().await
    }

    pub async fn error(&self) -> Option<String> {
        self.repo.error().await
    }

    /// The first `count` expenses in cache order (most recent first after a
    /// list).
    pub async fn recent(&self, count: usize) -> Vec<Expense> {
        self.repo.records().await.into_iter().take(count).collect()
    }

    /// Expenses whose description or category name contains `term`
    /// (case-insensitive), optionally restricted to one category.
    pub async fn search(&self, term: &str, category: Option<Category>) -> Vec<Expense> {
        let term = term.to_lowercase();
        self.repo
            .records()
            .await
            .into_iter()
            .filter(|expense| {
                let matches_term = expense.description.to_lowercase().contains(&term)
                    || expense.category.as_str().to_lowercase().contains(&term);
                let matches_category = category.is_none_or(|category| expense.category == category);
                matches_term && matches_category
            })
            .collect()
    }

    pub async fn filtered_total(&self, term: &str, category: Option<Category>) -> f64 {
        aggregation::total_expenses(&self.search(term, category).await)
    }

    pub async fn total(&self) -> f64 {
        aggregation::total_expenses(&self.repo.records().await)
    }

    pub async fn by_category(&self) -> Vec<(Category, f64)> {
        aggregation::by_category(&self.repo.records().await)
    }

    pub async fn by_date(&self) -> BTreeMap<Date, f64> {
        aggregation::by_date(&self.repo.records().await)
    }
}
