// Store configuration
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DATABASE_FILE_NAME: &str = "ledger.db";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LOG_FILTER: &str = "finance_ledger=info";

// Remote tables
pub const EXPENSES_TABLE: &str = "expenses";
pub const LEND_BORROW_TABLE: &str = "lend_borrow_records";
pub const REST_PATH_PREFIX: &str = "rest/v1/";

// Columns the store owns; never client-settable
pub const COLUMN_ID: &str = "id";
pub const COLUMN_OWNER: &str = "user_id";
pub const COLUMN_CREATED_AT: &str = "created_at";
pub const COLUMN_UPDATED_AT: &str = "updated_at";
pub const STORE_MANAGED_COLUMNS: [&str; 4] =
    [COLUMN_ID, COLUMN_OWNER, COLUMN_CREATED_AT, COLUMN_UPDATED_AT];

// Validation limits
pub const MAX_DESCRIPTION_LENGTH: usize = 255;
pub const MAX_COUNTERPARTY_LENGTH: usize = 100;

// Environment variables
pub const ENV_STORE_URL: &str = "LEDGER_STORE_URL";
pub const ENV_STORE_API_KEY: &str = "LEDGER_STORE_API_KEY";
pub const ENV_ACCESS_TOKEN: &str = "LEDGER_ACCESS_TOKEN";
pub const ENV_DATABASE_PATH: &str = "DATABASE_PATH";
pub const ENV_OWNER_ID: &str = "LEDGER_OWNER_ID";
pub const ENV_REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT_SECS";

// Error messages
pub const ERR_EMPTY_PATCH: &str = "At least one field must be provided for update";
pub const ERR_EMPTY_INSERT_RESPONSE: &str = "Store returned no row for insert";
pub const ERR_INVALID_AMOUNT: &str = "Amount must be a valid number";
pub const ERR_NEGATIVE_AMOUNT: &str = "Amount cannot be negative";
pub const ERR_INVALID_DATE: &str = "Invalid date format";
