use std::sync::Once;

use ipo_core::{CurrencyValue, IpoRecord};
use ipo_engine::{ExtractError, Extractor, IpoPageExtractor};
use pretty_assertions::assert_eq;

const LISTING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Sudeep Pharma IPO (2025) - Dates, Price Band, GMP</title></head>
<body>
<span class="mainboard-ipo">Mainboard IPO</span>
<p>Exchange: <span class="badge">BSE, NSE</span></p>
<p>Issue Type: <span class="badge">Book Built Issue</span></p>
<p>Sudeep Pharma filed its Draft Red Herring Prospectus with SEBI on <b>28th March 2025</b>.</p>
<p>The IPO open date is <b>21st November 2025</b>.</p>
<p>The IPO Close date is <b>25th November 2025</b>.</p>
<p>The IPO Allotment Date is <b>26th November 2025</b>.</p>
<p>Initiation of Refund is on <b>27th November 2025</b>.</p>
<p>The Listing date is <b>28th November 2025</b>.</p>
<p>The IPO size is <b>₹895.00 Crores</b> in total.</p>
<p>Issue Price: <b>₹593</b> per share</p>
<p>The upper price band of the issue is set at ₹593 per share.</p>
<p>Face Value: <b>₹1 per share</b></p>
<p>Lot Size: <b>25 shares</b></p>
<p>Market Capitalisation: <b>₹6,694.71 Cr.</b></p>
<p>PE Ratio: <b>46.2x</b></p>
<p>Revenue (annualised) is <b>₹502.10 Cr.</b></p>
<p>PAT: (annualised) <b>₹145.30 Cr.</b></p>
<p>Pre Issue Promoter Holding : <b>99.98 %</b></p>
<p>Post Issue Promoter Holding : <b>89.73%</b></p>
<p>Lead managers:
<a href="/merchant-banker/equirus"><b>Equirus Capital Private Limited</b></a>
<a href="/merchant-banker/iifl"><b>IIFL Capital Services Limited</b></a>
<a href="/merchant-banker/equirus"><b>Equirus Capital Private Limited</b></a>
<a href="/merchant-banker/jm"><b>JM Financial Securities Limited</b></a>
<a href="/merchant-banker/axis"><b>Axis Capital Limited</b></a>
</p>
<p>Registrar: <a href="/ipo-registrar/mufg">MUFG Intime Consultants Private Limited</a></p>
<p>The company caters to the <a href="/know-your-sector/pharmaceuticals"><b>Pharmaceuticals</b></a> sector.</p>
<p>It is based in <a href="/geography-wise-ipos/vadodara"><b>Vadodara</b></a>.</p>
<p>Sub Sector : <b>Excipients</b></p>
<div id="company-info-preview">"Sudeep Pharma   manufactures excipients and specialty ingredients."</div>
<p>Total Subscription: <b>93.71 times</b></p>
<table class="table subscription-status">
<thead><tr><th>Category</th><th>Times</th></tr></thead>
<tbody>
<tr><td>QIB</td><td>213.08</td></tr>
<tr><td>NII</td><td>[●]</td></tr>
</tbody>
</table>
<p>The offer has a fresh issue size of ₹95.00 Cr and Offer for sale being ₹800.00 Cr.</p>
<a href="/docs/sudeep_RHP.pdf">RHP</a>
<a href="/docs/sudeep_DRHP.pdf">DRHP</a>
</body>
</html>"#;

fn rupees(value: f64, unit: Option<&str>, raw: &str) -> CurrencyValue {
    CurrencyValue {
        value: Some(value),
        unit: unit.map(str::to_string),
        currency_symbol: Some("₹".to_string()),
        raw: raw.to_string(),
    }
}

static INIT: Once = Once::new();

fn extract(html: &str) -> IpoRecord {
    INIT.call_once(ipo_logging::initialize_for_tests);
    IpoPageExtractor::new().extract(html).expect("markup parses")
}

#[test]
fn listing_page_fills_every_group() {
    let record = extract(LISTING_PAGE);

    let basic = &record.basic_info;
    assert_eq!(basic.company_name.as_deref(), Some("Sudeep Pharma"));
    assert_eq!(basic.ipo_category.as_deref(), Some("Mainboard IPO"));
    assert_eq!(basic.exchange.as_deref(), Some("BSE, NSE"));
    assert_eq!(basic.issue_type.as_deref(), Some("Book Built Issue"));

    let dates = &record.dates;
    assert_eq!(dates.drhp_date.as_deref(), Some("28th March 2025"));
    assert_eq!(dates.ipo_open_date.as_deref(), Some("21st November 2025"));
    assert_eq!(dates.ipo_close_date.as_deref(), Some("25th November 2025"));
    assert_eq!(dates.allotment_date.as_deref(), Some("26th November 2025"));
    assert_eq!(dates.refund_date.as_deref(), Some("27th November 2025"));
    assert_eq!(dates.listing_date.as_deref(), Some("28th November 2025"));

    let pricing = &record.pricing;
    assert_eq!(
        pricing.ipo_size,
        Some(rupees(895.0, Some("Crore"), "₹895.00 Crore"))
    );
    assert_eq!(pricing.issue_price, Some(rupees(593.0, None, "₹593")));
    assert_eq!(pricing.price_band_upper, Some(rupees(593.0, None, "₹593")));
    assert_eq!(pricing.face_value, Some(rupees(1.0, None, "₹1")));
    assert_eq!(pricing.lot_size, Some(25));

    let financial = &record.financial_info;
    assert_eq!(
        financial.market_cap,
        Some(rupees(6694.71, Some("Cr"), "₹6,694.71 Cr."))
    );
    assert_eq!(financial.pe_ratio, Some(46.2));
    assert_eq!(
        financial.revenue_annualised,
        Some(rupees(502.10, Some("Cr"), "₹502.10 Cr."))
    );
    assert_eq!(
        financial.pat_annualised,
        Some(rupees(145.30, Some("Cr"), "₹145.30 Cr."))
    );
    assert_eq!(financial.pre_issue_promoter_holding_percent, Some(99.98));
    assert_eq!(financial.post_issue_promoter_holding_percent, Some(89.73));

    assert_eq!(
        record.stakeholders.lead_managers,
        Some(vec![
            "Equirus Capital Private Limited".to_string(),
            "IIFL Capital Services Limited".to_string(),
            "JM Financial Securities Limited".to_string(),
        ])
    );
    assert_eq!(
        record.stakeholders.registrar.as_deref(),
        Some("MUFG Intime Consultants Private Limited")
    );

    let info = &record.company_info;
    assert_eq!(info.sector.as_deref(), Some("Pharmaceuticals"));
    assert_eq!(info.city.as_deref(), Some("Vadodara"));
    assert_eq!(info.sub_sector.as_deref(), Some("Excipients"));
    assert_eq!(
        info.description.as_deref(),
        Some("Sudeep Pharma manufactures excipients and specialty ingredients.")
    );

    let subscription = &record.subscription;
    assert_eq!(subscription.total_subscription_times, Some(93.71));
    assert_eq!(subscription.total_subscription_raw, None);
    let rows = subscription.category_wise.as_ref().expect("table rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("Category"), Some("QIB"));
    assert_eq!(rows[0].get("Times"), Some("213.08"));
    assert_eq!(rows[1].get("Times"), Some(""));

    assert_eq!(
        record.issue_composition.fresh_issue,
        Some(rupees(95.0, Some("Cr"), "₹95.00 Cr"))
    );
    assert_eq!(
        record.issue_composition.offer_for_sale,
        Some(rupees(800.0, Some("Cr"), "₹800.00 Cr"))
    );

    assert_eq!(record.documents.rhp_url.as_deref(), Some("/docs/sudeep_RHP.pdf"));
    assert_eq!(record.documents.drhp_url.as_deref(), Some("/docs/sudeep_DRHP.pdf"));
}

#[test]
fn missing_labels_leave_only_their_fields_empty() {
    let html = r#"<html><head><title>Tiny Foods IPO</title></head><body>
<span class="sme-ipo">SME IPO</span>
<p>Lot Size: <b>1200 shares</b></p>
</body></html>"#;
    let record = extract(html);

    assert_eq!(record.basic_info.company_name.as_deref(), Some("Tiny Foods"));
    assert_eq!(record.basic_info.ipo_category.as_deref(), Some("SME IPO"));
    assert_eq!(record.basic_info.exchange, None);
    assert_eq!(record.pricing.lot_size, Some(1200));
    assert_eq!(record.pricing.ipo_size, None);
    assert_eq!(record.dates.field_count(), 0);
    assert_eq!(record.stakeholders.lead_managers, None);
    assert_eq!(record.subscription.category_wise, None);
    assert_eq!(record.populated_fields(), 3);
}

#[test]
fn placeholder_date_is_not_reported() {
    let html = "<html><body>\
<p>The IPO open date is <b>21st November 2025</b>.</p>\
<p>The Listing date is <b>[●]</b>.</p>\
</body></html>";
    let record = extract(html);

    assert_eq!(record.dates.ipo_open_date.as_deref(), Some("21st November 2025"));
    assert_eq!(record.dates.listing_date, None);
}

#[test]
fn date_without_ordinal_shape_is_discarded() {
    let html = "<html><body><p>The Listing date is <b>To be announced</b>.</p></body></html>";
    assert_eq!(extract(html).dates.listing_date, None);
}

#[test]
fn earlier_candidate_wins_when_several_match() {
    let html = "<html><body>\
<p>It comes with an ipo size of ₹120.00 Cr. for retail.</p>\
<p>The IPO size is <b>₹895.00 Cr.</b></p>\
</body></html>";
    let size = extract(html).pricing.ipo_size.expect("size");

    assert_eq!(size.value, Some(895.0));
    assert_eq!(size.raw, "₹895.00 Cr.");
}

#[test]
fn later_candidate_covers_other_markup_variant() {
    let html = "<html><body><p>It comes with an ipo size of ₹120.00 Cr. for retail.</p></body></html>";
    let size = extract(html).pricing.ipo_size.expect("size");

    assert_eq!(size.value, Some(120.0));
    assert_eq!(size.unit.as_deref(), Some("Cr"));
}

#[test]
fn subscription_without_times_keeps_raw_text() {
    let html = "<html><body><p>Total Subscription: <b>Not yet open</b></p></body></html>";
    let subscription = extract(html).subscription;

    assert_eq!(subscription.total_subscription_times, None);
    assert_eq!(
        subscription.total_subscription_raw.as_deref(),
        Some("Not yet open")
    );
}

#[test]
fn non_breaking_space_inside_amount_still_parses() {
    let html = "<html><body><p>The IPO size is <b>₹&nbsp;42.50 Crore</b></p></body></html>";
    let size = extract(html).pricing.ipo_size.expect("size");

    assert_eq!(size.value, Some(42.5));
    assert_eq!(size.unit.as_deref(), Some("Crore"));
}

#[test]
fn extraction_is_idempotent() {
    let extractor = IpoPageExtractor::new();
    let first = extractor.extract(LISTING_PAGE).unwrap();
    let second = extractor.extract(LISTING_PAGE).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn record_json_omits_absent_fields() {
    let html = "<html><head><title>Tiny Foods IPO</title></head><body></body></html>";
    let json = serde_json::to_value(extract(html)).unwrap();

    assert_eq!(json["basic_info"], serde_json::json!({"company_name": "Tiny Foods"}));
    assert_eq!(json["pricing"], serde_json::json!({}));
    assert_eq!(json.as_object().unwrap().len(), IpoRecord::GROUP_COUNT);
}

#[test]
fn unreadable_documents_are_errors() {
    let extractor = IpoPageExtractor::new();
    assert_eq!(extractor.extract("   \n"), Err(ExtractError::EmptyDocument));
    assert_eq!(
        extractor.extract("just some words"),
        Err(ExtractError::NotMarkup)
    );
}

#[test]
fn long_description_is_capped_at_five_hundred_characters() {
    let body = "Makes excipients and specialty ingredients for pharma. ".repeat(13);
    let html = format!(
        "<html><body><div id=\"company-info-preview\">“{}”</div></body></html>",
        body.trim()
    );
    assert!(body.trim().chars().count() > 700);

    let description = extract(&html).company_info.description.expect("description");
    assert_eq!(description.chars().count(), 500);
    assert!(description.starts_with("Makes excipients"));
    assert!(!description.starts_with('“'));
}

#[test]
fn sector_and_city_fall_back_to_prose_links() {
    let html = r#"<html><body>
<p>The company caters to the <a href="/sectors/chemicals"><b>Chemicals</b></a> sector.</p>
<p>It is based in <a href="/cities/pune"><b>Pune</b></a>.</p>
</body></html>"#;
    let info = extract(html).company_info;

    assert_eq!(info.sector.as_deref(), Some("Chemicals"));
    assert_eq!(info.city.as_deref(), Some("Pune"));
}

#[test]
fn compact_pe_ratio_markup_parses() {
    let html = "<html><body><p>PE Ratio:<b>12.5x</b></p></body></html>";
    assert_eq!(extract(html).financial_info.pe_ratio, Some(12.5));
}

#[test]
fn red_herring_link_is_rhp_and_drhp_link_is_not() {
    let html = r#"<html><body>
<a href="/d/X_DRHP.pdf">Draft</a>
<a href="/d/Red_Herring_Prospectus.pdf">Prospectus</a>
</body></html>"#;
    let documents = extract(html).documents;

    assert_eq!(documents.rhp_url.as_deref(), Some("/d/Red_Herring_Prospectus.pdf"));
    assert_eq!(documents.drhp_url.as_deref(), Some("/d/X_DRHP.pdf"));
}
