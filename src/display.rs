use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use crate::decoder::ResourceKind;
use crate::models::Money;
use crate::preferences::DateStyle;

/// `-$12.50` / `$1500.00`.
pub fn format_money(money: &Money) -> String {
    format!("{}{}", money.symbol(), money.absolute_value())
}

/// Renders a timestamp in the chosen style, relative to `now`.
pub fn format_date(at: OffsetDateTime, style: DateStyle, now: OffsetDateTime) -> String {
    match style {
        DateStyle::Absolute => format_absolute(at),
        DateStyle::Relative => format_relative(at, now),
    }
}

/// `dd/MM/yyyy hh:mm:ss AM`, in the timestamp's own offset.
pub fn format_absolute(at: OffsetDateTime) -> String {
    let format = format_description!(
        "[day]/[month]/[year] [hour repr:12]:[minute]:[second] [period case:upper]"
    );
    at.format(format).unwrap_or_else(|_| at.to_string())
}

/// `HH:MM:SS ago`, hours unbounded.
pub fn format_relative(at: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed: Duration = (now - at).abs();
    let total = elapsed.whole_seconds();
    format!(
        "{:02}:{:02}:{:02} ago",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Footer shown below a list: "No Transactions" or "No More Transactions".
pub fn list_footer(kind: ResourceKind, visible: usize) -> String {
    if visible == 0 {
        format!("No {}", kind.label())
    } else {
        format!("No More {}", kind.label())
    }
}

/// Search field placeholder counting the items being searched.
pub fn search_placeholder(kind: ResourceKind, count: usize) -> String {
    if count == 1 {
        format!("Search 1 {}", kind.singular())
    } else {
        format!("Search {} {}", count, kind.label())
    }
}
