use crate::client::{ApiClient, Transport};
use crate::controller::Collection;
use crate::error::MutationError;
use crate::models::{Account, Category, Tag, Transaction};

/// The four cross-referenced collections every screen reads from.
///
/// Only the methods here mutate the collections. Fetches run concurrently
/// but their results are applied by the owner, one at a time.
#[derive(Debug, Clone)]
pub struct AppState {
    pub accounts: Collection<Account>,
    pub transactions: Collection<Transaction>,
    pub categories: Collection<Category>,
    pub tags: Collection<Tag>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            accounts: Collection::accounts(),
            transactions: Collection::transactions(),
            categories: Collection::categories(),
            tags: Collection::tags(),
        }
    }

    /// Resets all four collections, orphaning anything in flight.
    pub fn invalidate_all(&mut self) {
        self.accounts.reset();
        self.transactions.reset();
        self.categories.reset();
        self.tags.reset();
    }

    /// Clears everything and refetches the four lists concurrently.
    pub async fn refresh_all<T: Transport>(&mut self, client: &ApiClient<T>) {
        self.invalidate_all();

        let config = client.config();
        let accounts = self.accounts.begin_fetch(config);
        let transactions = self.transactions.begin_fetch(config);
        let categories = self.categories.begin_fetch(config);
        let tags = self.tags.begin_fetch(config);

        let (accounts_result, transactions_result, categories_result, tags_result) = tokio::join!(
            client.fetch_page::<Account>(&accounts.target),
            client.fetch_page::<Transaction>(&transactions.target),
            client.fetch_page::<Category>(&categories.target),
            client.fetch_page::<Tag>(&tags.target),
        );

        self.accounts.complete_fetch(accounts, accounts_result);
        self.transactions.complete_fetch(transactions, transactions_result);
        self.categories.complete_fetch(categories, categories_result);
        self.tags.complete_fetch(tags, tags_result);
    }

    /// Adds a tag upstream; on success every collection is refetched.
    pub async fn add_tag<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        transaction: &Transaction,
        tag_id: &str,
    ) -> Result<(), MutationError> {
        client.add_tag(transaction, tag_id).await?;
        self.refresh_all(client).await;
        Ok(())
    }

    /// Removes a tag upstream; on success every collection is refetched.
    pub async fn remove_tag<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        transaction: &Transaction,
        tag_id: &str,
    ) -> Result<(), MutationError> {
        client.remove_tag(transaction, tag_id).await?;
        self.refresh_all(client).await;
        Ok(())
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.items().iter().find(|t| t.id == id)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.items().iter().find(|a| a.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.items().iter().find(|c| c.id == id)
    }

    pub fn account_of(&self, transaction: &Transaction) -> Option<&Account> {
        self.account(&transaction.relationships.account_id)
    }

    pub fn category_of(&self, transaction: &Transaction) -> Option<&Category> {
        transaction
            .relationships
            .category_id
            .as_deref()
            .and_then(|id| self.category(id))
    }

    pub fn parent_category_of(&self, transaction: &Transaction) -> Option<&Category> {
        transaction
            .relationships
            .parent_category_id
            .as_deref()
            .and_then(|id| self.category(id))
    }

    /// Loaded tags attached to the transaction, in tag list order.
    pub fn tags_of(&self, transaction: &Transaction) -> Vec<&Tag> {
        self.tags
            .items()
            .iter()
            .filter(|tag| transaction.has_tag(&tag.id))
            .collect()
    }

    pub fn children_of(&self, category: &Category) -> Vec<&Category> {
        self.categories
            .items()
            .iter()
            .filter(|c| category.child_ids.contains(&c.id))
            .collect()
    }

    pub fn parent_categories(&self) -> Vec<&Category> {
        self.categories
            .items()
            .iter()
            .filter(|c| c.is_parent())
            .collect()
    }

    pub fn transactions_of_account(&self, account_id: &str) -> Vec<&Transaction> {
        self.transactions
            .items()
            .iter()
            .filter(|t| t.relationships.account_id == account_id)
            .collect()
    }

    pub fn transactions_with_tag(&self, tag_id: &str) -> Vec<&Transaction> {
        self.transactions
            .items()
            .iter()
            .filter(|t| t.has_tag(tag_id))
            .collect()
    }

    pub fn transactions_in_category(&self, category_id: &str) -> Vec<&Transaction> {
        self.transactions
            .items()
            .iter()
            .filter(|t| {
                t.relationships.category_id.as_deref() == Some(category_id)
                    || t.relationships.parent_category_id.as_deref() == Some(category_id)
            })
            .collect()
    }
}
