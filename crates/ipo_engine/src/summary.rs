//! Plain-text overview of an extracted record.

use std::fmt::Write;

use ipo_core::{CurrencyValue, IpoRecord};

const DESCRIPTION_PREVIEW_CHARS: usize = 100;
const RULE_WIDTH: usize = 80;

/// Renders the populated parts of `record`; empty sections are left out.
pub fn render_summary(record: &IpoRecord) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("{rule}\nIPO DATA EXTRACTION SUMMARY\n{rule}\n");

    let basic = &record.basic_info;
    section(
        &mut out,
        "BASIC INFORMATION",
        vec![
            line("Company Name", basic.company_name.clone()),
            line("Ipo Category", basic.ipo_category.clone()),
            line("Exchange", basic.exchange.clone()),
            line("Issue Type", basic.issue_type.clone()),
        ],
    );

    let dates = &record.dates;
    section(
        &mut out,
        "IMPORTANT DATES",
        vec![
            line("Drhp Date", dates.drhp_date.clone()),
            line("Ipo Open Date", dates.ipo_open_date.clone()),
            line("Ipo Close Date", dates.ipo_close_date.clone()),
            line("Allotment Date", dates.allotment_date.clone()),
            line("Refund Date", dates.refund_date.clone()),
            line("Listing Date", dates.listing_date.clone()),
        ],
    );

    let pricing = &record.pricing;
    section(
        &mut out,
        "PRICING DETAILS",
        vec![
            line("Ipo Size", raw(&pricing.ipo_size)),
            line("Issue Price", raw(&pricing.issue_price)),
            line("Price Band Upper", raw(&pricing.price_band_upper)),
            line("Face Value", raw(&pricing.face_value)),
            line("Lot Size", pricing.lot_size.map(|n| n.to_string())),
        ],
    );

    let financial = &record.financial_info;
    section(
        &mut out,
        "FINANCIAL INFORMATION",
        vec![
            line("Market Cap", raw(&financial.market_cap)),
            line("Pe Ratio", financial.pe_ratio.map(|n| n.to_string())),
            line("Revenue Annualised", raw(&financial.revenue_annualised)),
            line("Pat Annualised", raw(&financial.pat_annualised)),
            line(
                "Pre Issue Promoter Holding",
                financial.pre_issue_promoter_holding_percent.map(|n| format!("{n}%")),
            ),
            line(
                "Post Issue Promoter Holding",
                financial.post_issue_promoter_holding_percent.map(|n| format!("{n}%")),
            ),
        ],
    );

    let info = &record.company_info;
    section(
        &mut out,
        "COMPANY INFORMATION",
        vec![
            line("Sector", info.sector.clone()),
            line("City", info.city.clone()),
            line("Sub Sector", info.sub_sector.clone()),
            line(
                "Description",
                info.description
                    .as_deref()
                    .map(|d| preview(d, DESCRIPTION_PREVIEW_CHARS)),
            ),
        ],
    );

    let stakeholders = &record.stakeholders;
    let mut people = vec![line("Registrar", stakeholders.registrar.clone())];
    if let Some(managers) = &stakeholders.lead_managers {
        let list = managers
            .iter()
            .map(|m| format!("\n    - {m}"))
            .collect::<String>();
        people.insert(0, Some(format!("Lead Managers:{list}")));
    }
    section(&mut out, "STAKEHOLDERS", people);

    let subscription = &record.subscription;
    section(
        &mut out,
        "SUBSCRIPTION",
        vec![
            line(
                "Total Subscription",
                subscription
                    .total_subscription_times
                    .map(|t| format!("{t} times"))
                    .or_else(|| subscription.total_subscription_raw.clone()),
            ),
            line(
                "Category Rows",
                subscription.category_wise.as_ref().map(|rows| rows.len().to_string()),
            ),
        ],
    );

    out.push_str(&rule);
    out.push('\n');
    out
}

fn section(out: &mut String, title: &str, lines: Vec<Option<String>>) {
    let lines: Vec<String> = lines.into_iter().flatten().collect();
    if lines.is_empty() {
        return;
    }
    let _ = write!(out, "\n{title}\n{}\n", "-".repeat(40));
    for entry in lines {
        let _ = writeln!(out, "  {entry}");
    }
}

fn line(label: &str, value: Option<String>) -> Option<String> {
    value.map(|v| format!("{label}: {v}"))
}

fn raw(value: &Option<CurrencyValue>) -> Option<String> {
    value.as_ref().map(|v| v.raw.clone())
}

/// First `max_chars` characters of `text`, marked with `...` when cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
