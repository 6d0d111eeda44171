use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use ipo_core::{normalize, Company, CompanyCollection};
use ipo_logging::{ipo_debug, ipo_info, ipo_warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::decode::decode_html;
use crate::fetch::{Fetcher, NoopProgressSink};

pub const DEFAULT_BASE_URL: &str = "https://www.ipoplatform.com";
const DEFAULT_MAX_LINKS: usize = 5_000;

static LISTING_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:/ipo/|https://www\.ipoplatform\.com/ipo/)[^/]+/\d+").expect("listing pattern")
});
static SLUG_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/ipo/([^/?#]+)/(\d+)").expect("slug pattern"));
static IPO_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+IPO\s*$").expect("suffix pattern"));
static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySource {
    pub name: String,
    pub path: String,
}

impl CategorySource {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub base_url: String,
    pub categories: Vec<CategorySource>,
    pub politeness_delay: Duration,
    pub max_links_per_page: usize,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            categories: vec![
                CategorySource::new("mainboard", "/list-of-mainboard-ipos"),
                CategorySource::new("sme", "/list-of-sme-ipos"),
                CategorySource::new("upcoming", "/upcoming-mainboard-ipo"),
            ],
            politeness_delay: Duration::from_secs(1),
            max_links_per_page: DEFAULT_MAX_LINKS,
        }
    }
}

/// Turns listing links on one category page into companies.
pub struct CompanyLinkHarvester {
    base_url: String,
    max_links_per_page: usize,
}

impl CompanyLinkHarvester {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_max_links(base_url, DEFAULT_MAX_LINKS)
    }

    pub fn with_max_links(base_url: impl Into<String>, max_links_per_page: usize) -> Self {
        Self {
            base_url: base_url.into(),
            max_links_per_page,
        }
    }

    /// The first link seen for an id wins within one page.
    pub fn harvest(&self, html: &str, category: &str) -> Vec<Company> {
        let document = Html::parse_document(html);
        let base = Url::parse(&self.base_url).ok();
        let mut seen = HashSet::new();
        let mut companies = Vec::new();

        let links = document
            .select(&ANCHOR_SEL)
            .filter(|a| a.value().attr("href").is_some_and(|h| LISTING_HREF_RE.is_match(h)))
            .take(self.max_links_per_page);

        for anchor in links {
            let Some(company) = self.company_from_link(anchor, base.as_ref(), category) else {
                continue;
            };
            if seen.insert(company.id.clone()) {
                ipo_debug!("{} ({}) in {category}", company.name, company.id);
                companies.push(company);
            }
        }
        companies
    }

    fn company_from_link(
        &self,
        anchor: ElementRef,
        base: Option<&Url>,
        category: &str,
    ) -> Option<Company> {
        let href = anchor.value().attr("href")?.trim();
        let path = resolve_path(href, base)?;
        let caps = SLUG_ID_RE.captures(&path)?;
        let (slug, id) = (caps[1].to_string(), caps[2].to_string());

        let text = normalize(Some(&anchor.text().collect::<String>()));
        let mut name = IPO_SUFFIX_RE.replace(&text, "").trim().to_string();
        if name.is_empty() {
            name = anchor
                .value()
                .attr("title")
                .map(|title| normalize(Some(&title.replace(" IPO", ""))))
                .unwrap_or_default();
        }
        if name.is_empty() {
            return None;
        }

        Some(Company::new(&self.base_url, id, slug, name, category))
    }
}

fn resolve_path(reference: &str, base: Option<&Url>) -> Option<String> {
    if reference.is_empty() {
        return None;
    }
    let url = match Url::parse(reference) {
        Ok(url) => url,
        Err(_) => base?.join(reference).ok()?,
    };
    Some(url.path().to_string())
}

/// Ids repeated across categories keep their first position and take the later entry.
pub async fn collect_companies(
    fetcher: &dyn Fetcher,
    settings: &CollectorSettings,
) -> CompanyCollection {
    let harvester =
        CompanyLinkHarvester::with_max_links(settings.base_url.clone(), settings.max_links_per_page);
    let mut collection = CompanyCollection::new();

    for (idx, category) in settings.categories.iter().enumerate() {
        if idx > 0 && !settings.politeness_delay.is_zero() {
            tokio::time::sleep(settings.politeness_delay).await;
        }

        let url = format!("{}{}", settings.base_url.trim_end_matches('/'), category.path);
        ipo_info!("Collecting {} listings from {url}", category.name);
        let output = match fetcher.fetch(idx as u64, &url, &NoopProgressSink).await {
            Ok(output) => output,
            Err(err) => {
                ipo_warn!("Skipping category {}: {err}", category.name);
                continue;
            }
        };
        let html = match decode_html(&output.bytes, output.metadata.content_type.as_deref()) {
            Ok(html) => html,
            Err(err) => {
                ipo_warn!("Skipping category {}: {err}", category.name);
                continue;
            }
        };

        let companies = harvester.harvest(&html, &category.name);
        ipo_info!("Found {} companies in {}", companies.len(), category.name);
        collection.extend(companies);
    }

    ipo_info!("Collected {} unique companies", collection.len());
    collection
}
