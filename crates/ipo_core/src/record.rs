//! The structured record produced from one listing page.
//!
//! Every field is optional: presence means the value was recovered and typed,
//! absence means it was not found.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::currency::CurrencyValue;

macro_rules! count_present {
    ($self:ident; $($field:ident),+ $(,)?) => {
        0 $(+ usize::from($self.$field.is_some()))+
    };
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct IpoRecord {
    pub basic_info: BasicInfo,
    pub dates: IpoDates,
    pub pricing: Pricing,
    pub financial_info: FinancialInfo,
    pub stakeholders: Stakeholders,
    pub company_info: CompanyInfo,
    pub subscription: Subscription,
    pub issue_composition: IssueComposition,
    pub documents: Documents,
}

impl IpoRecord {
    /// Number of field groups every record carries.
    pub const GROUP_COUNT: usize = 9;

    /// Populated field count per group, in record order.
    pub fn group_field_counts(&self) -> [(&'static str, usize); Self::GROUP_COUNT] {
        [
            ("basic_info", self.basic_info.field_count()),
            ("dates", self.dates.field_count()),
            ("pricing", self.pricing.field_count()),
            ("financial_info", self.financial_info.field_count()),
            ("stakeholders", self.stakeholders.field_count()),
            ("company_info", self.company_info.field_count()),
            ("subscription", self.subscription.field_count()),
            ("issue_composition", self.issue_composition.field_count()),
            ("documents", self.documents.field_count()),
        ]
    }

    pub fn populated_fields(&self) -> usize {
        self.group_field_counts().iter().map(|(_, n)| n).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct BasicInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipo_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
}

impl BasicInfo {
    pub fn field_count(&self) -> usize {
        count_present!(self; company_name, ipo_category, exchange, issue_type)
    }
}

/// Key dates, each in `21st November 2025` form.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct IpoDates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drhp_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipo_open_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipo_close_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allotment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_date: Option<String>,
}

impl IpoDates {
    pub fn field_count(&self) -> usize {
        count_present!(self; drhp_date, ipo_open_date, ipo_close_date, allotment_date, refund_date, listing_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Pricing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipo_size: Option<CurrencyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_price: Option<CurrencyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_band_upper: Option<CurrencyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_value: Option<CurrencyValue>,
    /// Shares per application lot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_size: Option<u64>,
}

impl Pricing {
    pub fn field_count(&self) -> usize {
        count_present!(self; ipo_size, issue_price, price_band_upper, face_value, lot_size)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct FinancialInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<CurrencyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_annualised: Option<CurrencyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pat_annualised: Option<CurrencyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_issue_promoter_holding_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_issue_promoter_holding_percent: Option<f64>,
}

impl FinancialInfo {
    pub fn field_count(&self) -> usize {
        count_present!(self;
            market_cap,
            pe_ratio,
            revenue_annualised,
            pat_annualised,
            pre_issue_promoter_holding_percent,
            post_issue_promoter_holding_percent,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Stakeholders {
    /// Book-running lead managers, first-seen order, at most three.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_managers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,
}

impl Stakeholders {
    pub fn field_count(&self) -> usize {
        count_present!(self; lead_managers, registrar)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CompanyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CompanyInfo {
    pub fn field_count(&self) -> usize {
        count_present!(self; sector, city, sub_sector, description)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Subscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_subscription_times: Option<f64>,
    /// Kept when the labeled value carries no `<n> times` figure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_subscription_raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_wise: Option<Vec<SubscriptionRow>>,
}

impl Subscription {
    pub fn field_count(&self) -> usize {
        count_present!(self; total_subscription_times, total_subscription_raw, category_wise)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct IssueComposition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fresh_issue: Option<CurrencyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_for_sale: Option<CurrencyValue>,
}

impl IssueComposition {
    pub fn field_count(&self) -> usize {
        count_present!(self; fresh_issue, offer_for_sale)
    }
}

/// Raw link targets of the offer documents.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Documents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drhp_url: Option<String>,
}

impl Documents {
    pub fn field_count(&self) -> usize {
        count_present!(self; rhp_url, drhp_url)
    }
}

/// One body row of a subscription table keyed by the header labels, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionRow {
    cells: Vec<(String, String)>,
}

impl SubscriptionRow {
    /// Zips header labels with cell texts, stopping at the shorter of the two.
    ///
    /// A repeated header keeps its first column position and takes the later value.
    pub fn zip<H, C>(headers: H, cells: C) -> Self
    where
        H: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        let mut row = Self::default();
        for (header, cell) in headers.into_iter().zip(cells) {
            match row.cells.iter_mut().find(|(key, _)| *key == header) {
                Some(existing) => existing.1 = cell,
                None => row.cells.push((header, cell)),
            }
        }
        row
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(key, _)| key == header)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for SubscriptionRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
