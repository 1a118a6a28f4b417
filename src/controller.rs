use std::collections::HashSet;

use crate::client::{ApiClient, Endpoint, PageTarget, Transport};
use crate::config::Config;
use crate::constants::*;
use crate::decoder::{Resource, ResourceKind};
use crate::error::FetchError;
use crate::models::{Account, ApiError, Category, Cursor, Page, Tag, Transaction};

/// Which list a collection mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Accounts,
    Transactions,
    TransactionsByAccount(String),
    TransactionsByCategory(String),
    TransactionsByTag(String),
    Categories,
    Tags,
}

impl Scope {
    /// First-page endpoint for this scope.
    pub fn endpoint(&self, config: &Config) -> Endpoint {
        match self {
            Scope::Accounts => Endpoint::new(ACCOUNTS_PATH).page_size(config.page_size),
            Scope::Transactions => Endpoint::new(TRANSACTIONS_PATH).page_size(config.page_size),
            Scope::TransactionsByAccount(id) => Endpoint::new(ACCOUNTS_PATH)
                .segment(id)
                .segment(TRANSACTIONS_PATH)
                .page_size(config.page_size),
            Scope::TransactionsByCategory(id) => Endpoint::new(TRANSACTIONS_PATH)
                .param(FILTER_CATEGORY_PARAM, id)
                .page_size(config.page_size),
            Scope::TransactionsByTag(id) => Endpoint::new(TRANSACTIONS_PATH)
                .param(FILTER_TAG_PARAM, id)
                .page_size(config.page_size),
            // The categories endpoint is not paginated
            Scope::Categories => Endpoint::new(CATEGORIES_PATH),
            Scope::Tags => Endpoint::new(TAGS_PATH).page_size(config.tags_page_size),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedList<T> {
    pub items: Vec<T>,
    pub cursor: Cursor,
    pub loading_more: bool,
    /// Set when the last "load more" failed; the loaded pages are kept.
    pub load_more_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Empty,
    Loading,
    Loaded(LoadedList<T>),
    Error(String),
    Unauthorized(Vec<ApiError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TicketKind {
    FirstPage,
    NextPage,
}

/// Handle for one in-flight request against a collection.
///
/// Completing with a ticket from before the last [`Collection::reset`] is a
/// no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    kind: TicketKind,
    pub target: PageTarget,
}

/// Loading state machine for one list.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    scope: Scope,
    state: ListState<T>,
    generation: u64,
}

impl Collection<Account> {
    pub fn accounts() -> Self {
        Self::new(Scope::Accounts)
    }
}

impl Collection<Transaction> {
    pub fn transactions() -> Self {
        Self::new(Scope::Transactions)
    }

    pub fn for_account(account_id: &str) -> Self {
        Self::new(Scope::TransactionsByAccount(account_id.to_string()))
    }

    pub fn for_category(category_id: &str) -> Self {
        Self::new(Scope::TransactionsByCategory(category_id.to_string()))
    }

    pub fn for_tag(tag_id: &str) -> Self {
        Self::new(Scope::TransactionsByTag(tag_id.to_string()))
    }

    /// The narrowest upstream list for the given relationship filters.
    ///
    /// The API takes one scope per request: account wins over category,
    /// category over tag. Callers apply any remaining filters locally.
    pub fn scoped(
        account_id: Option<&str>,
        category_id: Option<&str>,
        tag_id: Option<&str>,
    ) -> Self {
        match (account_id, category_id, tag_id) {
            (Some(id), _, _) => Self::for_account(id),
            (None, Some(id), _) => Self::for_category(id),
            (None, None, Some(id)) => Self::for_tag(id),
            (None, None, None) => Self::transactions(),
        }
    }
}

impl Collection<Category> {
    pub fn categories() -> Self {
        Self::new(Scope::Categories)
    }
}

impl Collection<Tag> {
    pub fn tags() -> Self {
        Self::new(Scope::Tags)
    }
}

impl<T: Resource> Collection<T> {
    fn new(scope: Scope) -> Self {
        Self {
            scope,
            state: ListState::Empty,
            generation: 0,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        T::KIND
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn state(&self) -> &ListState<T> {
        &self.state
    }

    /// Loaded items in upstream order; empty in every other state.
    pub fn items(&self) -> &[T] {
        match &self.state {
            ListState::Loaded(list) => &list.items,
            _ => &[],
        }
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        match &self.state {
            ListState::Loaded(list) => Some(&list.cursor),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ListState::Loading)
    }

    /// Whether a "load more" control should be offered.
    pub fn can_load_more(&self) -> bool {
        match &self.state {
            ListState::Loaded(list) => list.cursor.has_next() && !list.loading_more,
            _ => false,
        }
    }

    pub fn load_more_error(&self) -> Option<&str> {
        match &self.state {
            ListState::Loaded(list) => list.load_more_error.as_deref(),
            _ => None,
        }
    }

    /// Drops all state and orphans any in-flight request.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.state = ListState::Empty;
    }

    /// Starts a first-page fetch, replacing whatever was shown.
    pub fn begin_fetch(&mut self, config: &Config) -> Ticket {
        self.generation = self.generation.wrapping_add(1);
        self.state = ListState::Loading;
        Ticket {
            generation: self.generation,
            kind: TicketKind::FirstPage,
            target: PageTarget::First(self.scope.endpoint(config)),
        }
    }

    /// Applies a first-page result. Returns false when the ticket is stale.
    pub fn complete_fetch(&mut self, ticket: Ticket, result: Result<Page<T>, FetchError>) -> bool {
        if !self.accepts(&ticket, TicketKind::FirstPage) || !self.is_loading() {
            tracing::debug!(kind = T::KIND.label(), "discarding stale fetch result");
            return false;
        }

        self.state = match result {
            Ok(page) => ListState::Loaded(LoadedList {
                items: page.items,
                cursor: page.cursor,
                loading_more: false,
                load_more_error: None,
            }),
            Err(FetchError::Unauthorized(errors)) => ListState::Unauthorized(errors),
            Err(e) => ListState::Error(e.to_string()),
        };
        true
    }

    /// Starts a next-page fetch if a next page exists and none is in flight.
    pub fn begin_load_more(&mut self) -> Option<Ticket> {
        let ListState::Loaded(list) = &mut self.state else {
            return None;
        };
        if list.loading_more {
            return None;
        }
        let next = list.cursor.next_url.clone()?;

        list.loading_more = true;
        list.load_more_error = None;
        Some(Ticket {
            generation: self.generation,
            kind: TicketKind::NextPage,
            target: PageTarget::Next(next),
        })
    }

    /// Appends a next-page result, or records why it failed.
    pub fn complete_load_more(
        &mut self,
        ticket: Ticket,
        result: Result<Page<T>, FetchError>,
    ) -> bool {
        if !self.accepts(&ticket, TicketKind::NextPage) {
            tracing::debug!(kind = T::KIND.label(), "discarding stale load-more result");
            return false;
        }
        let ListState::Loaded(list) = &mut self.state else {
            return false;
        };
        if !list.loading_more {
            return false;
        }

        list.loading_more = false;
        match result {
            Ok(page) => {
                list.items.extend(page.items);
                list.cursor = page.cursor;
            }
            Err(e) => list.load_more_error = Some(e.load_more_message()),
        }
        true
    }

    fn accepts(&self, ticket: &Ticket, kind: TicketKind) -> bool {
        ticket.generation == self.generation && ticket.kind == kind
    }

    pub async fn fetch<X: Transport>(&mut self, client: &ApiClient<X>) {
        let ticket = self.begin_fetch(client.config());
        let result = client.fetch_page::<T>(&ticket.target).await;
        self.complete_fetch(ticket, result);
    }

    /// Fetches the next page. Returns false if no request was issued.
    pub async fn load_more<X: Transport>(&mut self, client: &ApiClient<X>) -> bool {
        let Some(ticket) = self.begin_load_more() else {
            return false;
        };
        let result = client.fetch_page::<T>(&ticket.target).await;
        self.complete_load_more(ticket, result)
    }

    /// Follows `links.next` until it runs out or a page fails.
    ///
    /// A continuation URL seen twice ends the walk.
    pub async fn load_all<X: Transport>(&mut self, client: &ApiClient<X>) {
        if !matches!(self.state, ListState::Loaded(_)) {
            self.fetch(client).await;
        }

        let mut seen = HashSet::new();
        while let Some(next) = self.cursor().and_then(|c| c.next_url.clone()) {
            if !seen.insert(next) {
                tracing::warn!(kind = T::KIND.label(), "pagination cycle detected");
                break;
            }
            if !self.load_more(client).await || self.load_more_error().is_some() {
                break;
            }
        }
    }
}
