use std::sync::LazyLock;

use ipo_core::{normalize, SubscriptionRow};
use scraper::{ElementRef, Html, Selector};

static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("table selector"));
static HEADER_CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("thead th").expect("header selector"));
static BODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody").expect("body selector"));
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("row selector"));
static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("cell selector"));

fn cell_text(el: ElementRef) -> String {
    normalize(Some(&el.text().collect::<String>()))
}

/// First table whose class mentions `subscription`.
pub(crate) fn parse_subscription_table(document: &Html) -> Option<Vec<SubscriptionRow>> {
    let table = document.select(&TABLE_SEL).find(|table| {
        table
            .value()
            .classes()
            .any(|class| class.contains("subscription"))
    })?;
    Some(table_rows(table))
}

// Without header labels no row is emitted.
fn table_rows(table: ElementRef) -> Vec<SubscriptionRow> {
    let headers: Vec<String> = table.select(&HEADER_CELL_SEL).map(cell_text).collect();
    if headers.is_empty() {
        return Vec::new();
    }
    let Some(body) = table.select(&BODY_SEL).next() else {
        return Vec::new();
    };

    body.select(&ROW_SEL)
        .map(|tr| tr.select(&CELL_SEL).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .map(|cells| SubscriptionRow::zip(headers.iter().cloned(), cells))
        .collect()
}
