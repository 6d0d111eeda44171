//! IPO scout core: pure text normalization, currency parsing, record model and company search.
mod company;
mod currency;
mod record;
mod search;
mod similarity;
mod text;

pub use company::{detail_url, Company, CompanyCollection, ScoredCompany};
pub use currency::{parse_currency, CurrencyValue, RUPEE_SYMBOL};
pub use record::{
    BasicInfo, CompanyInfo, Documents, FinancialInfo, IpoDates, IpoRecord, IssueComposition,
    Pricing, Stakeholders, Subscription, SubscriptionRow,
};
pub use search::{SearchIndex, DEFAULT_MIN_SCORE};
pub use similarity::{ratio, score, SUBSTRING_FLOOR};
pub use text::{normalize, PLACEHOLDER};
