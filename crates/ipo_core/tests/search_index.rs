use std::sync::Once;

use ipo_core::{detail_url, score, Company, CompanyCollection, SearchIndex, DEFAULT_MIN_SCORE};
use pretty_assertions::assert_eq;

const BASE: &str = "https://www.ipoplatform.com";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(ipo_logging::initialize_for_tests);
}

fn company(id: &str, name: &str, category: &str) -> Company {
    let slug = format!("{}-ipo", name.to_lowercase().replace(' ', "-"));
    Company::new(BASE, id, slug, name, category)
}

fn names(results: &[ipo_core::ScoredCompany]) -> Vec<&str> {
    results.iter().map(|r| r.company.name.as_str()).collect()
}

#[test]
fn url_is_derived_from_slug_and_id() {
    let c = company("1234", "Sudeep Pharma", "mainboard");
    assert_eq!(c.url, "https://www.ipoplatform.com/ipo/sudeep-pharma-ipo/1234");
    assert_eq!(detail_url("https://x.test/", "a", "1"), "https://x.test/ipo/a/1");
}

#[test]
fn empty_query_or_collection_is_empty() {
    init_logging();
    let index = SearchIndex::new(vec![company("1", "Sudeep Pharma", "sme")]);
    assert!(index.search("", 10, DEFAULT_MIN_SCORE).is_empty());
    assert!(SearchIndex::default()
        .search("Sudeep", 10, DEFAULT_MIN_SCORE)
        .is_empty());
}

#[test]
fn exact_prefix_outranks_near_miss() {
    init_logging();
    let index = SearchIndex::new(vec![
        company("1", "Sudeep Pharma", "mainboard"),
        company("2", "Suyog Pharma", "sme"),
    ]);

    let results = index.search("Sudeep", 10, DEFAULT_MIN_SCORE);
    assert_eq!(results[0].company.name, "Sudeep Pharma");
    assert!(results[0].match_score >= 0.6);
    if let Some(second) = results.get(1) {
        assert_eq!(second.company.name, "Suyog Pharma");
        assert!(second.match_score < results[0].match_score);
    }
}

#[test]
fn equal_scores_keep_collection_order() {
    init_logging();
    let index = SearchIndex::new(vec![
        company("10", "Alpha Pharma", "sme"),
        company("11", "Gamma Pharma", "mainboard"),
        company("12", "Delta Pharma", "sme"),
    ]);
    assert_eq!(
        score("Pharma", "Alpha Pharma"),
        score("Pharma", "Gamma Pharma")
    );

    let results = index.search("Pharma", 10, 0.0);
    assert_eq!(
        names(&results),
        vec!["Alpha Pharma", "Gamma Pharma", "Delta Pharma"]
    );
}

#[test]
fn min_score_filters_and_limit_truncates_after_sorting() {
    init_logging();
    let index = SearchIndex::new(vec![
        company("1", "Zenith Steel", "sme"),
        company("2", "Orient Pharma", "sme"),
        company("3", "Pharma", "mainboard"),
    ]);

    let results = index.search("Pharma", 1, DEFAULT_MIN_SCORE);
    assert_eq!(names(&results), vec!["Pharma"]);
    assert_eq!(results[0].match_score, 1.0);

    let strict = index.search("Pharma", 10, 0.95);
    assert_eq!(names(&strict), vec!["Pharma"]);
}

#[test]
fn duplicate_ids_collapse_last_write_wins() {
    init_logging();
    let index = SearchIndex::new(vec![
        company("7", "Old Name", "upcoming"),
        company("8", "Other", "sme"),
        company("7", "New Name", "mainboard"),
    ]);

    assert_eq!(index.len(), 2);
    let entry = index.lookup_by_id("7").expect("id 7");
    assert_eq!(entry.name, "New Name");
    assert_eq!(entry.category, "mainboard");
    assert_eq!(index.companies()[0].id, "7");
}

#[test]
fn collection_insert_reports_new_ids() {
    let mut collection = CompanyCollection::new();
    assert!(collection.insert(company("1", "A", "sme")));
    assert!(!collection.insert(company("1", "B", "sme")));
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.get("1").map(|c| c.name.as_str()), Some("B"));
}

#[test]
fn exact_lookups_and_categories() {
    init_logging();
    let index = SearchIndex::new(vec![
        company("1", "Sudeep Pharma", "mainboard"),
        company("2", "Suyog Pharma", "SME"),
        company("3", "Orient Tech", "sme"),
        company("4", "Future Corp", "upcoming"),
    ]);

    assert_eq!(
        index.lookup_by_slug("suyog-pharma-ipo").map(|c| c.id.as_str()),
        Some("2")
    );
    assert!(index.lookup_by_slug("missing").is_none());
    assert!(index.lookup_by_id("99").is_none());

    let sme: Vec<&str> = index
        .list_by_category("sme")
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(sme, vec!["2", "3"]);

    assert_eq!(
        index.list_categories(),
        vec!["SME", "mainboard", "sme", "upcoming"]
    );
}
