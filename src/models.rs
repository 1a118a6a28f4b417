use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Monetary amount as reported by the API.
///
/// `value_in_base_units` is authoritative for the sign: negative amounts are
/// debits, everything else (zero included) is a credit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub currency_code: String,
    pub value: String,
    pub value_in_base_units: i64,
}

impl Money {
    pub fn is_debit(&self) -> bool {
        self.value_in_base_units < 0
    }

    pub fn transaction_type(&self) -> &'static str {
        if self.is_debit() { "Debit" } else { "Credit" }
    }

    pub fn symbol(&self) -> &'static str {
        if self.is_debit() { "-$" } else { "$" }
    }

    /// The value without its sign, for display next to [`Money::symbol`].
    pub fn absolute_value(&self) -> &str {
        if self.is_debit() {
            self.value.trim_start_matches('-')
        } else {
            &self.value
        }
    }

    /// True when the textual sign of `value` agrees with `value_in_base_units`.
    pub fn sign_is_consistent(&self) -> bool {
        self.value.trim_start().starts_with('-') == self.is_debit()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Saver,
    Transactional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub display_name: String,
    pub account_type: AccountType,
    pub balance: Money,
    pub created_at: OffsetDateTime,
    pub transactions_link: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Held,
    Settled,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HoldInfo {
    pub amount: Money,
    pub foreign_amount: Option<Money>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundUp {
    pub amount: Money,
    pub boost_portion: Option<Money>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cashback {
    pub description: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionRelationships {
    pub account_id: String,
    pub category_id: Option<String>,
    pub parent_category_id: Option<String>,
    pub tag_ids: BTreeSet<String>,
    /// `relationships.tags.links.self`, the endpoint for tag mutation.
    pub tags_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub raw_text: Option<String>,
    pub message: Option<String>,
    pub status: TransactionStatus,
    pub amount: Money,
    pub foreign_amount: Option<Money>,
    pub hold_info: Option<HoldInfo>,
    pub round_up: Option<RoundUp>,
    pub cashback: Option<Cashback>,
    pub created_at: OffsetDateTime,
    pub settled_at: Option<OffsetDateTime>,
    pub relationships: TransactionRelationships,
}

impl Transaction {
    pub fn is_settled(&self) -> bool {
        self.status == TransactionStatus::Settled
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.relationships.tag_ids.contains(tag_id)
    }
}

/// Node of the two-level category tree. Depth is enforced upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub child_ids: BTreeSet<String>,
}

impl Category {
    pub fn is_parent(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A tag is identified by its own label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    pub id: String,
}

/// Continuation links of a page. Opaque URLs, never offsets.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    #[serde(rename = "prev", default)]
    pub prev_url: Option<String>,
    #[serde(rename = "next", default)]
    pub next_url: Option<String>,
}

impl Cursor {
    pub fn has_next(&self) -> bool {
        self.next_url.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: String,
    pub title: String,
    pub detail: String,
    pub source_pointer: Option<String>,
}

/// One decoded page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Cursor,
}
