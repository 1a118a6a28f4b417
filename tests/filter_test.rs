/*!
 * Transaction Filter Tests
 *
 * Checks live filtering over decoded transactions: search folding,
 * settled-only, category slugs and relationship filters, and that the
 * visible subset always keeps upstream order.
 */

mod common;

use common::*;
use provenance::decoder::decode_list;
use provenance::filter::{
    CategoryFilter, CategorySlug, TransactionFilter, search_accounts, search_tags,
};
use provenance::models::{Account, Tag};

fn ids<'a>(visible: &[&'a provenance::models::Transaction]) -> Vec<&'a str> {
    visible.iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn test_coffee_search_keeps_upstream_order() {
    let data = (0..50)
        .map(|i| {
            let description = match i {
                4 => "Coffee Club".to_string(),
                17 => "Le Café Noir".to_string(),
                23 => "Single O coffee".to_string(),
                41 => "COFFEE SUPREME".to_string(),
                _ => format!("Merchant {}", i),
            };
            TransactionFixture::new(&description, -500)
                .id(&format!("tx-{}", i))
                .json()
        })
        .collect();
    let transactions = decode_transactions(data);

    let coffee = TransactionFilter::new().search("coffee").apply(&transactions);
    assert_eq!(ids(&coffee), vec!["tx-4", "tx-23", "tx-41"]);

    let cafe = TransactionFilter::new().search("cafe").apply(&transactions);
    assert_eq!(ids(&cafe), vec!["tx-17"]);

    let all = TransactionFilter::new().apply(&transactions);
    assert_eq!(all.len(), 50);
}

#[test]
fn test_filters_compose_as_intersection() {
    let transactions = decode_transactions(vec![
        TransactionFixture::new("Coffee Club", -450)
            .id("settled-cafe")
            .category("restaurants-and-cafes", "good-life")
            .json(),
        TransactionFixture::new("Coffee Club", -450)
            .id("held-cafe")
            .category("restaurants-and-cafes", "good-life")
            .held()
            .json(),
        TransactionFixture::new("Coffee Beans", -1800)
            .id("settled-groceries")
            .category("groceries", "home")
            .json(),
        TransactionFixture::new("Bottle Shop", -3000)
            .id("settled-booze")
            .category("booze", "good-life")
            .json(),
    ]);

    let search = TransactionFilter::new().search("coffee");
    let settled = TransactionFilter::new().settled_only(true);
    let cafes = TransactionFilter::new()
        .category(CategoryFilter::Only(CategorySlug::RestaurantsAndCafes));
    let combined = TransactionFilter::new()
        .search("coffee")
        .settled_only(true)
        .category(CategoryFilter::Only(CategorySlug::RestaurantsAndCafes));

    for tx in &transactions {
        assert_eq!(
            combined.matches(tx),
            search.matches(tx) && settled.matches(tx) && cafes.matches(tx),
            "composition broke for {}",
            tx.id
        );
    }
    assert_eq!(ids(&combined.apply(&transactions)), vec!["settled-cafe"]);
}

#[test]
fn test_uncategorised_transactions_only_match_all() {
    let transactions = decode_transactions(vec![
        TransactionFixture::new("Transfer", 10000).id("plain").json(),
    ]);

    assert_eq!(TransactionFilter::new().apply(&transactions).len(), 1);
    let booze = TransactionFilter::new().category(CategoryFilter::Only(CategorySlug::Booze));
    assert!(booze.apply(&transactions).is_empty());
}

#[test]
fn test_relationship_filters() {
    let transactions = decode_transactions(vec![
        TransactionFixture::new("Rent", -50000)
            .id("rent")
            .account("acc-2")
            .category("rent-and-mortgage", "home")
            .tags(&["Bills"])
            .json(),
        TransactionFixture::new("Pub", -2000)
            .id("pub")
            .category("pubs-and-bars", "good-life")
            .tags(&["Friday", "Bills"])
            .json(),
    ]);

    let by_account = TransactionFilter::new().account("acc-2").apply(&transactions);
    assert_eq!(ids(&by_account), vec!["rent"]);

    let by_parent = TransactionFilter::new().in_category("good-life").apply(&transactions);
    assert_eq!(ids(&by_parent), vec!["pub"]);

    let by_child = TransactionFilter::new().in_category("rent-and-mortgage").apply(&transactions);
    assert_eq!(ids(&by_child), vec!["rent"]);

    let by_tag = TransactionFilter::new().tag("Bills").apply(&transactions);
    assert_eq!(ids(&by_tag), vec!["rent", "pub"]);
}

#[test]
fn test_tag_search_matches_label() {
    let tags = vec![
        Tag { id: "Holiday".to_string() },
        Tag { id: "Coffee".to_string() },
        Tag { id: "Crème Brûlée".to_string() },
    ];

    let visible = search_tags(&tags, "creme");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "Crème Brûlée");
    assert_eq!(search_tags(&tags, "").len(), 3);
}

#[test]
fn test_account_search_matches_display_name() {
    let body = page(
        vec![
            account("acc-1", "Spending", 1000),
            account("acc-2", "Rainy Day Saver", 250000),
        ],
        None,
    )
    .to_string();
    let accounts: Vec<Account> = decode_list::<Account>(body.as_bytes())
        .expect("Accounts failed to decode")
        .items;

    let visible = search_accounts(&accounts, "SAVER");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "acc-2");
}
