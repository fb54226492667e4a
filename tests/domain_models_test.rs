use finance_ledger::constants::*;
use finance_ledger::models::*;
use time::macros::date;

#[test]
fn serde_expense_row_from_store() {
    let json = r#"{
        "id": "9b2f",
        "user_id": "user-123",
        "category": "Transport",
        "amount": 4.2,
        "date": "2024-03-15",
        "description": "Metro",
        "created_at": "2024-03-15T08:30:00Z",
        "updated_at": "2024-03-15T08:30:00+00:00"
    }"#;
    let expense: Expense = serde_json::from_str(json).unwrap();
    assert_eq!(expense.owner, OwnerId::from("user-123"));
    assert_eq!(expense.category, Category::Transport);
    assert_eq!(expense.date, date!(2024 - 03 - 15));
    assert_eq!(expense.created_at, expense.updated_at);
}

#[test]
fn serde_expense_unknown_category() {
    let json = r#"{
        "id": "1",
        "user_id": "u",
        "category": "Pets",
        "amount": 30,
        "date": "2024-01-01",
        "description": "Vet",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    }"#;
    let expense: Expense = serde_json::from_str(json).unwrap();
    assert_eq!(expense.category, Category::Other);
    assert_eq!(expense.amount, 30.0);
}

#[test]
fn serde_ledger_entry_row_from_store() {
    let json = r#"{
        "id": "e-1",
        "user_id": "user-123",
        "person": "Jo",
        "amount": 75.5,
        "type": "borrowed",
        "date": "2024-02-01",
        "due_date": null,
        "description": "Flight",
        "status": "completed",
        "created_at": "2024-02-01T10:00:00Z",
        "updated_at": "2024-02-05T10:00:00Z"
    }"#;
    let entry: LedgerEntry = serde_json::from_str(json).unwrap();
    assert_eq!(entry.counterparty, "Jo");
    assert_eq!(entry.direction, Direction::Borrowed);
    assert_eq!(entry.status, Status::Completed);
    assert_eq!(entry.due_date, None);
    assert!(!entry.is_pending());
}

#[test]
fn serde_ledger_entry_without_due_date_column() {
    let json = r#"{
        "id": "e-2",
        "user_id": "user-123",
        "person": "Kim",
        "amount": 10,
        "type": "lent",
        "date": "2024-02-01",
        "description": "Lunch",
        "status": "pending",
        "created_at": "2024-02-01T10:00:00Z",
        "updated_at": "2024-02-01T10:00:00Z"
    }"#;
    let entry: LedgerEntry = serde_json::from_str(json).unwrap();
    assert_eq!(entry.due_date, None);
    assert!(entry.is_pending());
}

#[test]
fn new_payloads_exclude_store_managed_columns() {
    let expense = NewExpense {
        category: Category::Food,
        amount: 3.0,
        date: date!(2024 - 01 - 01),
        description: "Bagel".to_string(),
    };
    let entry = NewLedgerEntry::new("Lee", 5.0, Direction::Lent, date!(2024 - 01 - 01), "Cab")
        .with_due_date(date!(2024 - 02 - 01));

    for payload in [
        serde_json::to_value(&expense).unwrap(),
        serde_json::to_value(&entry).unwrap(),
        serde_json::to_value(LedgerEntryPatch::status(Status::Completed)).unwrap(),
    ] {
        let columns = payload.as_object().unwrap();
        for column in STORE_MANAGED_COLUMNS {
            assert!(!columns.contains_key(column), "{column} in {payload}");
        }
    }
}

#[test]
fn status_patch_touches_only_status() {
    let patch = LedgerEntryPatch::status(Status::Pending);
    let json = serde_json::to_value(&patch).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "pending" }));
    assert!(!patch.is_empty());
    assert!(LedgerEntryPatch::default().is_empty());
    assert!(ExpensePatch::default().is_empty());
}
