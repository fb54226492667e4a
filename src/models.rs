use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use time::{Date, OffsetDateTime};

use crate::constants::{EXPENSES_TABLE, LEND_BORROW_TABLE};
use crate::error::ValidationError;
use crate::store::Record;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Identity of the authenticated principal that owns a row.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Utilities,
    Healthcare,
    Education,
    /// Also catches categories the store knows but this client does not.
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Utilities,
        Category::Healthcare,
        Category::Education,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| ValidationError(format!("Unknown category: {}", value)))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Lent,
    Borrowed,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => f.write_str("pending"),
            Status::Completed => f.write_str("completed"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    pub category: Category,
    pub amount: f64,
    /// When the expense happened, not when the row was created.
    #[serde(with = "iso_date")]
    pub date: Date,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub category: Category,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub description: String,
}

/// Partial update for an [`Expense`]. Only `Some` fields are sent.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_patch_date"
    )]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.amount.is_none()
            && self.date.is_none()
            && self.description.is_none()
    }
}

impl Record for Expense {
    const TABLE: &'static str = EXPENSES_TABLE;
    type New = NewExpense;
    type Patch = ExpensePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &OwnerId {
        &self.owner
    }
}

/// A lend/borrow record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    #[serde(rename = "person")]
    pub counterparty: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub direction: Direction,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(with = "iso_date::option", default)]
    pub due_date: Option<Date>,
    pub description: String,
    pub status: Status,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl LedgerEntry {
    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }
}

/// Insert payload for a [`LedgerEntry`]. Every new entry starts out pending.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewLedgerEntry {
    #[serde(rename = "person")]
    pub counterparty: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub direction: Direction,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(with = "iso_date::option")]
    pub due_date: Option<Date>,
    pub description: String,
    status: Status,
}

impl NewLedgerEntry {
    pub fn new(
        counterparty: impl Into<String>,
        amount: f64,
        direction: Direction,
        date: Date,
        description: impl Into<String>,
    ) -> Self {
        Self {
            counterparty: counterparty.into(),
            amount,
            direction,
            date,
            due_date: None,
            description: description.into(),
            status: Status::Pending,
        }
    }

    pub fn with_due_date(mut self, due_date: Date) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }
}

/// Partial update for a [`LedgerEntry`].
///
/// `due_date` is doubly optional: `Some(None)` clears the due date.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct LedgerEntryPatch {
    #[serde(rename = "person", skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_patch_date"
    )]
    pub date: Option<Date>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_patch_due_date"
    )]
    pub due_date: Option<Option<Date>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl LedgerEntryPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counterparty.is_none()
            && self.amount.is_none()
            && self.direction.is_none()
            && self.date.is_none()
            && self.due_date.is_none()
            && self.description.is_none()
            && self.status.is_none()
    }
}

impl Record for LedgerEntry {
    const TABLE: &'static str = LEND_BORROW_TABLE;
    type New = NewLedgerEntry;
    type Patch = LedgerEntryPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &OwnerId {
        &self.owner
    }
}

fn serialize_patch_date<S: Serializer>(
    value: &Option<Date>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(date) => iso_date::serialize(date, serializer),
        None => serializer.serialize_none(),
    }
}

fn serialize_patch_due_date<S: Serializer>(
    value: &Option<Option<Date>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(Some(date)) => iso_date::serialize(date, serializer),
        _ => serializer.serialize_none(),
    }
}
