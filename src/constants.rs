// Upstream API
pub const DEFAULT_BASE_URL: &str = "https://api.up.com.au/api/v1";
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

// Resource paths, relative to the base URL
pub const ACCOUNTS_PATH: &str = "accounts";
pub const TRANSACTIONS_PATH: &str = "transactions";
pub const CATEGORIES_PATH: &str = "categories";
pub const TAGS_PATH: &str = "tags";

// Query parameters
pub const PAGE_SIZE_PARAM: &str = "page[size]";
pub const FILTER_CATEGORY_PARAM: &str = "filter[category]";
pub const FILTER_TAG_PARAM: &str = "filter[tag]";

// Page sizes; the tags endpoint accepts a larger batch
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const TAGS_PAGE_SIZE: u32 = 200;

// Tag mutation
pub const TAG_RESOURCE_TYPE: &str = "tags";

// Preference store keys
pub const PREF_API_TOKEN: &str = "Settings.apiToken";
pub const PREF_DATE_STYLE: &str = "Settings.dateStyle";

// Error messages
pub const ERR_AUTHORISATION: &str = "Authorisation Error!";
pub const ERR_JSON_DECODING: &str = "JSON Decoding Failed!";
pub const ERR_TAG_LIMIT: &str =
    "Too many tags added to this transaction. Each transaction may have up to 6 tags.";
pub const ERR_TAG_NOT_ADDED: &str = "The tag was not added to the transaction.";
pub const ERR_TAG_NOT_REMOVED: &str = "The tag was not removed from the transaction.";
