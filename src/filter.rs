//! Live filtering of loaded collections.
//!
//! Every function here is pure: it takes a loaded slice plus the current
//! predicates and returns the visible subset in upstream order. Callers
//! recompute whenever the collection or a predicate changes.

use std::fmt;
use std::str::FromStr;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::models::{Account, Category, Tag, Transaction};

macro_rules! category_slugs {
    ($($variant:ident => $slug:literal,)+) => {
        /// The fixed set of child categories offered by the category picker.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum CategorySlug {
            $($variant,)+
        }

        impl CategorySlug {
            pub const ALL: &'static [CategorySlug] = &[$(CategorySlug::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(CategorySlug::$variant => $slug,)+
                }
            }
        }

        impl FromStr for CategorySlug {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($slug => Ok(CategorySlug::$variant),)+
                    other => Err(format!("unknown category: {}", other)),
                }
            }
        }
    };
}

category_slugs! {
    GamesAndSoftware => "games-and-software",
    CarInsuranceAndMaintenance => "car-insurance-and-maintenance",
    Family => "family",
    Groceries => "groceries",
    Booze => "booze",
    ClothingAndAccessories => "clothing-and-accessories",
    Cycling => "cycling",
    HomewareAndAppliances => "homeware-and-appliances",
    EducationAndStudentLoans => "education-and-student-loans",
    EventsAndGigs => "events-and-gigs",
    Fuel => "fuel",
    Internet => "internet",
    FitnessAndWellbeing => "fitness-and-wellbeing",
    Hobbies => "hobbies",
    HomeMaintenanceAndImprovements => "home-maintenance-and-improvements",
    Parking => "parking",
    GiftsAndCharity => "gifts-and-charity",
    HolidaysAndTravel => "holidays-and-travel",
    Pets => "pets",
    PublicTransport => "public-transport",
    HairAndBeauty => "hair-and-beauty",
    LotteryAndGambling => "lottery-and-gambling",
    HomeInsuranceAndRates => "home-insurance-and-rates",
    CarRepayments => "car-repayments",
    HealthAndMedical => "health-and-medical",
    PubsAndBars => "pubs-and-bars",
    RentAndMortgage => "rent-and-mortgage",
    TaxisAndShareCars => "taxis-and-share-cars",
    Investments => "investments",
    RestaurantsAndCafes => "restaurants-and-cafes",
    TollRoads => "toll-roads",
    Utilities => "utilities",
    LifeAdmin => "life-admin",
    Takeaway => "takeaway",
    MobilePhone => "mobile-phone",
    TobaccoAndVaping => "tobacco-and-vaping",
    NewsMagazinesAndBooks => "news-magazines-and-books",
    TvAndMusic => "tv-and-music",
    Adult => "adult",
    Technology => "technology",
}

impl CategorySlug {
    /// Human label, e.g. `pubs-and-bars` becomes "Pubs & Bars".
    pub fn label(self) -> String {
        match self {
            CategorySlug::GamesAndSoftware => "Apps, Games & Software".to_string(),
            CategorySlug::CarInsuranceAndMaintenance => {
                "Car Insurance, Rego & Maintenance".to_string()
            }
            CategorySlug::TvAndMusic => "TV, Music & Streaming".to_string(),
            other => slug_label(other.as_str()),
        }
    }
}

impl fmt::Display for CategorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn slug_label(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            if word == "and" {
                return "&".to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Category picker value. `All` matches every transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CategorySlug),
}

impl CategoryFilter {
    pub fn matches(self, category_id: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(slug) => category_id == Some(slug.as_str()),
        }
    }

    pub fn label(self) -> String {
        match self {
            CategoryFilter::All => "All".to_string(),
            CategoryFilter::Only(slug) => slug.label(),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

/// Lowercases and strips diacritics, so "Café" and "cafe" compare equal.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Pre-folded search needle. An empty needle matches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchText {
    needle: String,
}

impl SearchText {
    pub fn new(text: &str) -> Self {
        Self { needle: fold(text) }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.needle.is_empty() || fold(haystack).contains(&self.needle)
    }
}

/// Every predicate a transaction list can apply. Unset predicates match all.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    pub search: String,
    pub category: CategoryFilter,
    pub settled_only: bool,
    pub account_id: Option<String>,
    /// Matches either the category or the parent category relationship.
    pub category_id: Option<String>,
    pub tag_id: Option<String>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    #[must_use]
    pub fn category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn settled_only(mut self, settled_only: bool) -> Self {
        self.settled_only = settled_only;
        self
    }

    #[must_use]
    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    #[must_use]
    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag_id: impl Into<String>) -> Self {
        self.tag_id = Some(tag_id.into());
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_with(&SearchText::new(&self.search), tx)
    }

    /// Visible subset in upstream order.
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        let search = SearchText::new(&self.search);
        transactions
            .iter()
            .filter(|tx| self.matches_with(&search, tx))
            .collect()
    }

    fn matches_with(&self, search: &SearchText, tx: &Transaction) -> bool {
        let rels = &tx.relationships;
        (!self.settled_only || tx.is_settled())
            && self.category.matches(rels.category_id.as_deref())
            && self
                .account_id
                .as_ref()
                .is_none_or(|id| rels.account_id == *id)
            && self.category_id.as_deref().is_none_or(|id| {
                rels.category_id.as_deref() == Some(id)
                    || rels.parent_category_id.as_deref() == Some(id)
            })
            && self.tag_id.as_deref().is_none_or(|id| tx.has_tag(id))
            && search.matches(&tx.description)
    }
}

pub fn search_accounts<'a>(accounts: &'a [Account], text: &str) -> Vec<&'a Account> {
    search_by(accounts, text, |a| a.display_name.as_str())
}

pub fn search_categories<'a>(categories: &'a [Category], text: &str) -> Vec<&'a Category> {
    search_by(categories, text, |c| c.name.as_str())
}

pub fn search_tags<'a>(tags: &'a [Tag], text: &str) -> Vec<&'a Tag> {
    search_by(tags, text, |t| t.id.as_str())
}

/// Substring search over one text field of each item.
pub fn search_by<'a, T, F>(items: &'a [T], text: &str, field: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    let search = SearchText::new(text);
    items
        .iter()
        .filter(|item| search.matches(field(*item)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_ignores_case_and_accents() {
        assert_eq!(fold("Café CRÈME"), "cafe creme");
        assert!(SearchText::new("cafe").matches("Le Café du Coin"));
        assert!(SearchText::new("").matches("anything"));
        assert!(!SearchText::new("tea").matches("coffee"));
    }

    #[test]
    fn slug_labels() {
        assert_eq!(CategorySlug::PubsAndBars.label(), "Pubs & Bars");
        assert_eq!(CategorySlug::LifeAdmin.label(), "Life Admin");
        assert_eq!(
            CategorySlug::NewsMagazinesAndBooks.label(),
            "News Magazines & Books"
        );
        assert_eq!(CategorySlug::TvAndMusic.label(), "TV, Music & Streaming");
        assert_eq!(CategoryFilter::All.label(), "All");
    }

    #[test]
    fn slugs_round_trip_through_from_str() {
        for slug in CategorySlug::ALL {
            assert_eq!(slug.as_str().parse::<CategorySlug>(), Ok(*slug));
        }
        assert_eq!(CategorySlug::ALL.len(), 40);
        assert!("good-life".parse::<CategorySlug>().is_err());
    }

    #[test]
    fn category_filter_parses_all() {
        assert_eq!("All".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "booze".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(CategorySlug::Booze))
        );
    }

    #[test]
    fn category_filter_is_exact() {
        let filter = CategoryFilter::Only(CategorySlug::Booze);
        assert!(filter.matches(Some("booze")));
        assert!(!filter.matches(Some("groceries")));
        assert!(!filter.matches(None));
        assert!(CategoryFilter::All.matches(None));
    }
}
