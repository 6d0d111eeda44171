use std::time::Duration;

use ipo_core::Company;
use ipo_engine::{
    collect_companies, CategorySource, CollectorSettings, CompanyLinkHarvester, FetchSettings,
    ReqwestFetcher,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "https://www.ipoplatform.com";

#[test]
fn harvest_reads_slug_id_and_name_from_listing_links() {
    let html = r#"<html><body>
<a href="/ipo/sudeep-pharma/2345">Sudeep Pharma IPO</a>
<a href="https://www.ipoplatform.com/ipo/tiny-foods/2350?ref=list">Tiny Foods</a>
<a href="/about-us">About</a>
<a href="/ipo/no-id/">Broken</a>
</body></html>"#;
    let companies = CompanyLinkHarvester::new(BASE).harvest(html, "mainboard");

    assert_eq!(
        companies,
        vec![
            Company::new(BASE, "2345", "sudeep-pharma", "Sudeep Pharma", "mainboard"),
            Company::new(BASE, "2350", "tiny-foods", "Tiny Foods", "mainboard"),
        ]
    );
    assert_eq!(
        companies[0].url,
        "https://www.ipoplatform.com/ipo/sudeep-pharma/2345"
    );
}

#[test]
fn harvest_keeps_first_link_per_id_and_falls_back_to_title() {
    let html = r#"<html><body>
<a href="/ipo/acme-steel/10" title="Acme Steel IPO"><img src="logo.png"></a>
<a href="/ipo/acme-steel/10">Acme Steel Renamed IPO</a>
<a href="/ipo/ghost/11"> </a>
</body></html>"#;
    let companies = CompanyLinkHarvester::new(BASE).harvest(html, "sme");

    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].name, "Acme Steel");
    assert_eq!(companies[0].category, "sme");
}

#[test]
fn harvest_respects_link_cap() {
    let html = r#"<html><body>
<a href="/ipo/a/1">A IPO</a><a href="/ipo/b/2">B IPO</a><a href="/ipo/c/3">C IPO</a>
</body></html>"#;
    let companies = CompanyLinkHarvester::with_max_links(BASE, 2).harvest(html, "sme");
    assert_eq!(companies.len(), 2);
}

#[tokio::test]
async fn collect_merges_categories_last_write_wins_and_skips_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list-of-mainboard-ipos"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<a href="/ipo/alpha/1">Alpha IPO</a><a href="/ipo/beta/2">Beta IPO</a>"#,
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/list-of-sme-ipos"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/upcoming-mainboard-ipo"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<a href="/ipo/gamma/3">Gamma IPO</a><a href="/ipo/alpha/1">Alpha Ltd IPO</a>"#,
            "text/html",
        ))
        .mount(&server)
        .await;

    let settings = CollectorSettings {
        base_url: server.uri(),
        categories: vec![
            CategorySource::new("mainboard", "/list-of-mainboard-ipos"),
            CategorySource::new("sme", "/list-of-sme-ipos"),
            CategorySource::new("upcoming", "/upcoming-mainboard-ipo"),
        ],
        politeness_delay: Duration::ZERO,
        ..CollectorSettings::default()
    };
    let fetcher = ReqwestFetcher::new(FetchSettings::default()).expect("client builds");

    let collection = collect_companies(&fetcher, &settings).await;
    let summary: Vec<(&str, &str, &str)> = collection
        .as_slice()
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str(), c.category.as_str()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("1", "Alpha Ltd", "upcoming"),
            ("2", "Beta", "mainboard"),
            ("3", "Gamma", "upcoming"),
        ]
    );
    assert_eq!(
        collection.get("1").map(|c| c.url.clone()),
        Some(format!("{}/ipo/alpha/1", server.uri()))
    );
}
