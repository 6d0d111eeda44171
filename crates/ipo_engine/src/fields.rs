//! Pattern tables for every extracted field, in priority order.

use std::collections::HashMap;

use crate::chain::{CandidateSpec, FallbackChain, Page};
use CandidateSpec::{Element, Markup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Field {
    IpoCategory,
    Exchange,
    IssueType,
    DrhpDate,
    OpenDate,
    CloseDate,
    AllotmentDate,
    RefundDate,
    ListingDate,
    IpoSize,
    IssuePrice,
    PriceBandUpper,
    FaceValue,
    LotSize,
    MarketCap,
    PeRatio,
    Revenue,
    ProfitAfterTax,
    PreIssueHolding,
    PostIssueHolding,
    LeadManagers,
    Registrar,
    Sector,
    City,
    SubSector,
    Description,
    SubscriptionTimes,
    FreshIssue,
    OfferForSale,
}

impl Field {
    pub(crate) const ALL: [Field; 29] = [
        Field::IpoCategory,
        Field::Exchange,
        Field::IssueType,
        Field::DrhpDate,
        Field::OpenDate,
        Field::CloseDate,
        Field::AllotmentDate,
        Field::RefundDate,
        Field::ListingDate,
        Field::IpoSize,
        Field::IssuePrice,
        Field::PriceBandUpper,
        Field::FaceValue,
        Field::LotSize,
        Field::MarketCap,
        Field::PeRatio,
        Field::Revenue,
        Field::ProfitAfterTax,
        Field::PreIssueHolding,
        Field::PostIssueHolding,
        Field::LeadManagers,
        Field::Registrar,
        Field::Sector,
        Field::City,
        Field::SubSector,
        Field::Description,
        Field::SubscriptionTimes,
        Field::FreshIssue,
        Field::OfferForSale,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Field::IpoCategory => "ipo_category",
            Field::Exchange => "exchange",
            Field::IssueType => "issue_type",
            Field::DrhpDate => "drhp_date",
            Field::OpenDate => "ipo_open_date",
            Field::CloseDate => "ipo_close_date",
            Field::AllotmentDate => "allotment_date",
            Field::RefundDate => "refund_date",
            Field::ListingDate => "listing_date",
            Field::IpoSize => "ipo_size",
            Field::IssuePrice => "issue_price",
            Field::PriceBandUpper => "price_band_upper",
            Field::FaceValue => "face_value",
            Field::LotSize => "lot_size",
            Field::MarketCap => "market_cap",
            Field::PeRatio => "pe_ratio",
            Field::Revenue => "revenue_annualised",
            Field::ProfitAfterTax => "pat_annualised",
            Field::PreIssueHolding => "pre_issue_promoter_holding_percent",
            Field::PostIssueHolding => "post_issue_promoter_holding_percent",
            Field::LeadManagers => "lead_managers",
            Field::Registrar => "registrar",
            Field::Sector => "sector",
            Field::City => "city",
            Field::SubSector => "sub_sector",
            Field::Description => "description",
            Field::SubscriptionTimes => "total_subscription",
            Field::FreshIssue => "fresh_issue",
            Field::OfferForSale => "offer_for_sale",
        }
    }

    /// Candidates in the order they are tried.
    pub(crate) fn candidates(self) -> &'static [CandidateSpec] {
        match self {
            Field::IpoCategory => &[Element("span.mainboard-ipo"), Element("span.sme-ipo")],
            Field::Exchange => &[Markup(r"Exchange\s*:\s*<span[^>]*>([^<]+)</span>")],
            Field::IssueType => &[Markup(r"Issue Type\s*:\s*<span[^>]*>([^<]+)</span>")],

            Field::DrhpDate => &[Markup(
                r"(?is)(?:Date of DRHP|filed its Draft Red Herring Prospectus.*?on).*?<b[^>]*>([^<]+)</b>",
            )],
            Field::OpenDate => &[Markup(r"(?is)IPO open date is.*?<b[^>]*>([^<]+)</b>")],
            Field::CloseDate => &[Markup(
                r"(?is)(?:close|IPO Close).*?date is.*?<b[^>]*>([^<]+)</b>",
            )],
            Field::AllotmentDate => &[Markup(
                r"(?is)(?:IPO )?Allotment Date is.*?<b[^>]*>([^<]+)</b>",
            )],
            Field::RefundDate => &[Markup(
                r"(?is)(?:Initiation of Refund|refund dates).*?<b[^>]*>([^<]+)</b>",
            )],
            Field::ListingDate => &[Markup(r"(?is)Listing date is.*?<b[^>]*>([^<]+)</b>")],

            Field::IpoSize => &[
                Markup(r"(?i)IPO size is.*?<b>(₹\s*[\d,]+\.?\d*\s*(?:Crore|Cr\.?))"),
                Markup(r"(?i)ipo size of (₹\s*[\d,]+\.?\d*\s*Cr\.?)"),
                Markup(r"(?i)IPO\s+Size\s*:.*?<b[^>]*>(₹\s*[\d,]+\.?\d*\s*Cr\.?)"),
            ],
            Field::IssuePrice => &[
                Markup(r"(?i)Issue Price\s*:.*?<b[^>]*>(₹\s*[\d,]+\.?\d*)"),
                Markup(r"(?i)IPO price of.*?<b>(₹\s*[\d,]+\.?\d*)</b>"),
            ],
            Field::PriceBandUpper => &[Markup(
                r"(?i)upper price band.*?is set at (₹\s*[\d,]+\.?\d*)",
            )],
            Field::FaceValue => &[Markup(r"(?i)Face Value.*?(₹\s*[\d,]+\.?\d*)")],
            Field::LotSize => &[Markup(
                r"(?i)(?:Lot Size|Market Lot).*?(\d+)\s*(?:shares?)?",
            )],

            Field::MarketCap => &[Markup(
                r"(?i)Market Capitalisation\s*:.*?<b[^>]*>(₹\s*[\d,]+\.?\d*\s*Cr\.)",
            )],
            Field::PeRatio => &[Markup(
                r"(?i)PE\s+(?:multiple|Ratio)\s*:.*?<b[^>]*>([\d,]+\.?\d*)",
            )],
            Field::Revenue => &[Markup(
                r"(?i)Revenue\s*\(annualised\).*?<b[^>]*>(₹\s*[\d,]+\.?\d*\s*cr\.)",
            )],
            Field::ProfitAfterTax => &[Markup(
                r"(?i)PAT:\s*\(annualised\).*?<b[^>]*>(₹\s*[\d,]+\.?\d*\s*cr\.)",
            )],
            Field::PreIssueHolding => &[Markup(
                r"(?i)Pre Issue Promoter Holding\s*:.*?<b[^>]*>([\d.]+)\s*%",
            )],
            Field::PostIssueHolding => &[Markup(
                r"(?i)Post Issue Promoter Holding\s*:.*?<b[^>]*>([\d.]+)\s*%",
            )],

            Field::LeadManagers => &[Markup(
                r#"(?i)<a[^>]*href="[^"]*merchant-banker[^"]*"[^>]*>\s*<b[^>]*>\s*([^<]+?(?:Securities|Capital|Advisory)[^<]*?Limited)\s*</b>"#,
            )],
            Field::Registrar => &[Markup(
                r#"(?i)<a[^>]*href="[^"]*ipo-registrar[^"]*"[^>]*>\s*([^<]+?(?:Securities|Capital|Computers|Consultants)[^<]*?Limited[^<]*?)\s*(?:<i|</a>)"#,
            )],

            Field::Sector => &[
                Markup(r#"(?i)<a[^>]*href="[^"]*know-your-sector/[^"]+"[^>]*>\s*<b[^>]*>([^<]+)</b>"#),
                Markup(r"(?i)caters to.*?<a[^>]*>\s*<b[^>]*>([^<]+)</b>\s*</a>\s*sector"),
            ],
            Field::City => &[
                Markup(r#"(?i)<a[^>]*href="[^"]*geography-wise-ipos/[^"]+"[^>]*>\s*<b[^>]*>([^<]+)</b>"#),
                Markup(r"(?i)based in.*?<a[^>]*>\s*<b[^>]*>([^<]+)</b>\s*</a>"),
            ],
            Field::SubSector => &[Markup(r"(?i)Sub Sector\s*:\s*<b[^>]*>([^<]+)</b>")],
            Field::Description => &[Element("div#company-info-preview")],

            Field::SubscriptionTimes => &[Markup(r"(?i)Subscription\s*:.*?<b[^>]*>([^<]+)</b>")],

            Field::FreshIssue => &[Markup(
                r"(?i)fresh issue size of\s*(₹\s*[\d,]+\.?\d*\s*Cr)",
            )],
            Field::OfferForSale => &[Markup(
                r"(?i)Offer for sale being\s*(₹\s*[\d,]+\.?\d*\s*Cr)",
            )],
        }
    }
}

/// Compiled chains for every field.
pub(crate) struct PatternBook {
    chains: HashMap<Field, FallbackChain>,
}

impl PatternBook {
    pub(crate) fn compile() -> Self {
        let chains = Field::ALL
            .iter()
            .map(|&field| (field, FallbackChain::compile(field.name(), field.candidates())))
            .collect();
        Self { chains }
    }

    pub(crate) fn first(&self, field: Field, page: &Page) -> Option<String> {
        self.chains.get(&field)?.first_match(page)
    }

    pub(crate) fn all(&self, field: Field, page: &Page) -> Vec<String> {
        self.chains
            .get(&field)
            .map(|chain| chain.all_matches(page))
            .unwrap_or_default()
    }
}
