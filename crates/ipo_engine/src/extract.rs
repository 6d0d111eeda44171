use std::sync::LazyLock;

use ipo_core::{
    normalize, parse_currency, BasicInfo, CompanyInfo, CurrencyValue, Documents, FinancialInfo,
    IpoDates, IpoRecord, IssueComposition, Pricing, Stakeholders, Subscription,
};
use ipo_logging::ipo_debug;
use regex::Regex;
use scraper::{Html, Selector};

use crate::chain::Page;
use crate::fields::{Field, PatternBook};
use crate::table::parse_subscription_table;

const MAX_LEAD_MANAGERS: usize = 3;
const MAX_DESCRIPTION_CHARS: usize = 500;

static TITLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+IPO").expect("title pattern"));

static DATE_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\d{1,2}(?:st|nd|rd|th)\s+(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}",
    )
    .expect("date pattern")
});

static TIMES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*times").expect("times pattern"));

// `DRHP.pdf` also ends in `RHP.pdf`, so the letter before `RHP` must not be a `D`.
static RHP_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^dD])RHP\.pdf|Red_Herring.*\.pdf").expect("rhp pattern")
});

static DRHP_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DRHP\.pdf").expect("drhp pattern"));

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector"));

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("document contains no markup")]
    NotMarkup,
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Parses raw text into a document, rejecting input with no markup at all.
pub(crate) fn parse_document(html: &str) -> Result<Html, ExtractError> {
    if html.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    if !html.contains('<') {
        return Err(ExtractError::NotMarkup);
    }
    Ok(Html::parse_document(html))
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<IpoRecord, ExtractError>;
}

/// Field extraction engine for directory listing pages.
///
/// Each field group is recovered independently; a group that finds nothing is left
/// empty without affecting the others. Only a document that cannot be read as
/// markup at all is an error.
pub struct IpoPageExtractor {
    patterns: PatternBook,
}

impl IpoPageExtractor {
    pub fn new() -> Self {
        Self {
            patterns: PatternBook::compile(),
        }
    }

    fn text(&self, field: Field, page: &Page) -> Option<String> {
        let value = self
            .patterns
            .first(field, page)
            .map(|raw| normalize(Some(&raw)))
            .filter(|text| !text.is_empty());
        if value.is_none() {
            ipo_debug!("{}: not found", field.name());
        }
        value
    }

    fn currency(&self, field: Field, page: &Page) -> Option<CurrencyValue> {
        self.text(field, page)
            .and_then(|text| parse_currency(Some(&text)))
    }

    fn number(&self, field: Field, page: &Page) -> Option<f64> {
        self.text(field, page)
            .and_then(|text| text.replace(',', "").parse::<f64>().ok())
    }

    fn date(&self, field: Field, page: &Page) -> Option<String> {
        let text = self.text(field, page)?;
        if DATE_SHAPE_RE.is_match(&text) {
            Some(text)
        } else {
            ipo_debug!("{}: discarding non-date value {text:?}", field.name());
            None
        }
    }

    fn basic_info(&self, page: &Page) -> BasicInfo {
        let company_name = page
            .first_text(&TITLE_SEL)
            .map(|title| normalize(Some(&title)))
            .and_then(|title| {
                TITLE_NAME_RE
                    .captures(&title)
                    .map(|caps| caps[1].trim().to_string())
            })
            .filter(|name| !name.is_empty());

        BasicInfo {
            company_name,
            ipo_category: self.text(Field::IpoCategory, page),
            exchange: self.text(Field::Exchange, page),
            issue_type: self.text(Field::IssueType, page),
        }
    }

    fn dates(&self, page: &Page) -> IpoDates {
        IpoDates {
            drhp_date: self.date(Field::DrhpDate, page),
            ipo_open_date: self.date(Field::OpenDate, page),
            ipo_close_date: self.date(Field::CloseDate, page),
            allotment_date: self.date(Field::AllotmentDate, page),
            refund_date: self.date(Field::RefundDate, page),
            listing_date: self.date(Field::ListingDate, page),
        }
    }

    fn pricing(&self, page: &Page) -> Pricing {
        Pricing {
            ipo_size: self.currency(Field::IpoSize, page),
            issue_price: self.currency(Field::IssuePrice, page),
            price_band_upper: self.currency(Field::PriceBandUpper, page),
            face_value: self.currency(Field::FaceValue, page),
            lot_size: self
                .text(Field::LotSize, page)
                .and_then(|text| text.parse::<u64>().ok()),
        }
    }

    fn financial_info(&self, page: &Page) -> FinancialInfo {
        FinancialInfo {
            market_cap: self.currency(Field::MarketCap, page),
            pe_ratio: self.number(Field::PeRatio, page),
            revenue_annualised: self.currency(Field::Revenue, page),
            pat_annualised: self.currency(Field::ProfitAfterTax, page),
            pre_issue_promoter_holding_percent: self.number(Field::PreIssueHolding, page),
            post_issue_promoter_holding_percent: self.number(Field::PostIssueHolding, page),
        }
    }

    fn stakeholders(&self, page: &Page) -> Stakeholders {
        let mut lead_managers: Vec<String> = Vec::new();
        for raw in self.patterns.all(Field::LeadManagers, page) {
            let name = normalize(Some(&raw));
            if !name.is_empty() && !lead_managers.contains(&name) {
                lead_managers.push(name);
            }
        }
        lead_managers.truncate(MAX_LEAD_MANAGERS);

        Stakeholders {
            lead_managers: Some(lead_managers).filter(|list| !list.is_empty()),
            registrar: self.text(Field::Registrar, page),
        }
    }

    fn company_info(&self, page: &Page) -> CompanyInfo {
        let description = self.text(Field::Description, page).and_then(|text| {
            let trimmed = text.trim_matches(&['"', '“', '”'][..]).trim();
            let clipped: String = trimmed.chars().take(MAX_DESCRIPTION_CHARS).collect();
            Some(clipped).filter(|d| !d.is_empty())
        });

        CompanyInfo {
            sector: self.text(Field::Sector, page),
            city: self.text(Field::City, page),
            sub_sector: self.text(Field::SubSector, page),
            description,
        }
    }

    fn subscription(&self, page: &Page) -> Subscription {
        let mut subscription = Subscription::default();

        // The placeholder glyph normalizes away, so a pending value never gets here.
        if let Some(text) = self.text(Field::SubscriptionTimes, page) {
            match TIMES_RE
                .captures(&text)
                .and_then(|caps| caps[1].parse::<f64>().ok())
            {
                Some(times) => subscription.total_subscription_times = Some(times),
                None => subscription.total_subscription_raw = Some(text),
            }
        }

        subscription.category_wise =
            parse_subscription_table(&page.document).filter(|rows| !rows.is_empty());
        subscription
    }

    fn issue_composition(&self, page: &Page) -> IssueComposition {
        IssueComposition {
            fresh_issue: self.currency(Field::FreshIssue, page),
            offer_for_sale: self.currency(Field::OfferForSale, page),
        }
    }

    fn documents(&self, page: &Page) -> Documents {
        let first_href = |re: &Regex| {
            page.document
                .select(&ANCHOR_SEL)
                .filter_map(|a| a.value().attr("href"))
                .find(|href| re.is_match(href))
                .map(str::to_string)
        };
        Documents {
            rhp_url: first_href(&RHP_HREF_RE),
            drhp_url: first_href(&DRHP_HREF_RE),
        }
    }
}

impl Default for IpoPageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for IpoPageExtractor {
    fn extract(&self, html: &str) -> Result<IpoRecord, ExtractError> {
        let page = Page::new(parse_document(html)?);

        Ok(IpoRecord {
            basic_info: self.basic_info(&page),
            dates: self.dates(&page),
            pricing: self.pricing(&page),
            financial_info: self.financial_info(&page),
            stakeholders: self.stakeholders(&page),
            company_info: self.company_info(&page),
            subscription: self.subscription(&page),
            issue_composition: self.issue_composition(&page),
            documents: self.documents(&page),
        })
    }
}
