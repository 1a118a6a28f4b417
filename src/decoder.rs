//! JSON:API envelope decoding.
//!
//! List bodies are `{ data: [...], links: { prev, next } }`; a 401 body is
//! `{ errors: [...] }`. Decoding is all-or-nothing per page.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

use crate::client::Outcome;
use crate::error::{FetchError, synthetic_authorisation_error};
use crate::models::{
    Account, AccountType, ApiError, Cashback, Category, Cursor, HoldInfo, Money, Page, RoundUp,
    Tag, Transaction, TransactionRelationships, TransactionStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Account,
    Transaction,
    Category,
    Tag,
}

impl ResourceKind {
    /// Plural display name, as used in list titles and log lines.
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Account => "Accounts",
            ResourceKind::Transaction => "Transactions",
            ResourceKind::Category => "Categories",
            ResourceKind::Tag => "Tags",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            ResourceKind::Account => "Account",
            ResourceKind::Transaction => "Transaction",
            ResourceKind::Category => "Category",
            ResourceKind::Tag => "Tag",
        }
    }
}

/// A record type served by a list endpoint.
pub trait Resource: Sized + Send + 'static {
    const KIND: ResourceKind;
    type Wire: DeserializeOwned;

    /// Maps the wire record, rejecting values that break model invariants.
    fn from_wire(wire: Self::Wire) -> Result<Self, String>;
}

/// Turns a raw outcome into a page of `R`, or the classified failure.
pub fn decode_page<R: Resource>(outcome: Outcome) -> Result<Page<R>, FetchError> {
    match outcome {
        Outcome::TransportFailure(message) => Err(FetchError::Transport(message)),
        Outcome::Http { status: 401, body } => Err(FetchError::Unauthorized(decode_errors(&body))),
        Outcome::Http { body, .. } => decode_list(&body),
    }
}

pub fn decode_list<R: Resource>(body: &[u8]) -> Result<Page<R>, FetchError> {
    let envelope: Envelope<R::Wire> =
        serde_json::from_slice(body).map_err(|e| FetchError::Decoding {
            reason: e.to_string(),
        })?;

    let items = envelope
        .data
        .into_iter()
        .map(R::from_wire)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| FetchError::Decoding { reason })?;

    Ok(Page {
        items,
        cursor: envelope.links,
    })
}

/// Decodes a 401 error envelope. Never returns an empty list.
pub fn decode_errors(body: &[u8]) -> Vec<ApiError> {
    let errors = serde_json::from_slice::<ErrorEnvelope>(body)
        .map(|envelope| {
            envelope
                .errors
                .into_iter()
                .map(|e| ApiError {
                    status: e.status,
                    title: e.title,
                    detail: e.detail,
                    source_pointer: e.source.and_then(|s| s.pointer),
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if errors.is_empty() {
        vec![synthetic_authorisation_error()]
    } else {
        errors
    }
}

#[derive(Deserialize)]
struct Envelope<W> {
    data: Vec<W>,
    #[serde(default)]
    links: Cursor,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    errors: Vec<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    status: String,
    title: String,
    detail: String,
    source: Option<ErrorSource>,
}

#[derive(Deserialize)]
struct ErrorSource {
    pointer: Option<String>,
}

#[derive(Deserialize)]
struct RelationshipData {
    id: String,
}

#[derive(Deserialize)]
struct ToOne {
    data: RelationshipData,
}

#[derive(Deserialize)]
struct OptionalToOne {
    data: Option<RelationshipData>,
}

#[derive(Deserialize)]
struct RelatedLink {
    related: String,
}

#[derive(Deserialize)]
struct SelfLink {
    #[serde(rename = "self")]
    self_link: String,
}

// Accounts

#[derive(Deserialize)]
pub struct AccountWire {
    id: String,
    attributes: AccountAttributes,
    relationships: AccountRelationships,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountAttributes {
    display_name: String,
    account_type: AccountType,
    balance: Money,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

#[derive(Deserialize)]
struct AccountRelationships {
    transactions: AccountTransactions,
}

#[derive(Deserialize)]
struct AccountTransactions {
    links: Option<RelatedLink>,
}

impl Resource for Account {
    const KIND: ResourceKind = ResourceKind::Account;
    type Wire = AccountWire;

    fn from_wire(wire: AccountWire) -> Result<Self, String> {
        check_money(&wire.id, &wire.attributes.balance)?;
        Ok(Account {
            id: wire.id,
            display_name: wire.attributes.display_name,
            account_type: wire.attributes.account_type,
            balance: wire.attributes.balance,
            created_at: wire.attributes.created_at,
            transactions_link: wire.relationships.transactions.links.map(|l| l.related),
        })
    }
}

// Transactions

#[derive(Deserialize)]
pub struct TransactionWire {
    id: String,
    attributes: TransactionAttributes,
    relationships: TransactionRelationshipsWire,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionAttributes {
    status: TransactionStatus,
    raw_text: Option<String>,
    description: String,
    message: Option<String>,
    hold_info: Option<HoldInfo>,
    round_up: Option<RoundUp>,
    cashback: Option<Cashback>,
    amount: Money,
    foreign_amount: Option<Money>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    settled_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRelationshipsWire {
    account: ToOne,
    category: OptionalToOne,
    parent_category: OptionalToOne,
    tags: TagsRelationship,
}

#[derive(Deserialize)]
struct TagsRelationship {
    data: Vec<RelationshipData>,
    links: Option<SelfLink>,
}

impl Resource for Transaction {
    const KIND: ResourceKind = ResourceKind::Transaction;
    type Wire = TransactionWire;

    fn from_wire(wire: TransactionWire) -> Result<Self, String> {
        let TransactionWire {
            id,
            attributes: attrs,
            relationships: rels,
        } = wire;

        match (attrs.status, attrs.settled_at.is_some()) {
            (TransactionStatus::Settled, false) => {
                return Err(format!("transaction {} is SETTLED without settledAt", id));
            }
            (TransactionStatus::Held, true) => {
                return Err(format!("transaction {} is HELD but has settledAt", id));
            }
            _ => {}
        }

        check_money(&id, &attrs.amount)?;
        for money in [&attrs.foreign_amount]
            .into_iter()
            .flatten()
            .chain(attrs.hold_info.iter().map(|h| &h.amount))
            .chain(attrs.hold_info.iter().filter_map(|h| h.foreign_amount.as_ref()))
            .chain(attrs.round_up.iter().map(|r| &r.amount))
            .chain(attrs.round_up.iter().filter_map(|r| r.boost_portion.as_ref()))
            .chain(attrs.cashback.iter().map(|c| &c.amount))
        {
            check_money(&id, money)?;
        }

        Ok(Transaction {
            id,
            description: attrs.description,
            raw_text: attrs.raw_text,
            message: attrs.message,
            status: attrs.status,
            amount: attrs.amount,
            foreign_amount: attrs.foreign_amount,
            hold_info: attrs.hold_info,
            round_up: attrs.round_up,
            cashback: attrs.cashback,
            created_at: attrs.created_at,
            settled_at: attrs.settled_at,
            relationships: TransactionRelationships {
                account_id: rels.account.data.id,
                category_id: rels.category.data.map(|d| d.id),
                parent_category_id: rels.parent_category.data.map(|d| d.id),
                tag_ids: rels.tags.data.into_iter().map(|d| d.id).collect(),
                tags_link: rels.tags.links.map(|l| l.self_link),
            },
        })
    }
}

// Categories

#[derive(Deserialize)]
pub struct CategoryWire {
    id: String,
    attributes: CategoryAttributes,
    relationships: CategoryRelationships,
}

#[derive(Deserialize)]
struct CategoryAttributes {
    name: String,
}

#[derive(Deserialize)]
struct CategoryRelationships {
    parent: OptionalToOne,
    children: ToMany,
}

#[derive(Deserialize)]
struct ToMany {
    data: Vec<RelationshipData>,
}

impl Resource for Category {
    const KIND: ResourceKind = ResourceKind::Category;
    type Wire = CategoryWire;

    fn from_wire(wire: CategoryWire) -> Result<Self, String> {
        Ok(Category {
            id: wire.id,
            name: wire.attributes.name,
            parent_id: wire.relationships.parent.data.map(|d| d.id),
            child_ids: wire
                .relationships
                .children
                .data
                .into_iter()
                .map(|d| d.id)
                .collect::<BTreeSet<_>>(),
        })
    }
}

// Tags

#[derive(Deserialize)]
pub struct TagWire {
    id: String,
}

impl Resource for Tag {
    const KIND: ResourceKind = ResourceKind::Tag;
    type Wire = TagWire;

    fn from_wire(wire: TagWire) -> Result<Self, String> {
        Ok(Tag { id: wire.id })
    }
}

fn check_money(owner: &str, money: &Money) -> Result<(), String> {
    if money.sign_is_consistent() {
        Ok(())
    } else {
        Err(format!(
            "{}: value {} disagrees in sign with {} base units",
            owner, money.value, money.value_in_base_units
        ))
    }
}
