use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::company::{Company, CompanyCollection, ScoredCompany};
use crate::similarity::score;

/// Candidates scoring below this are dropped unless the caller asks otherwise.
pub const DEFAULT_MIN_SCORE: f64 = 0.3;

/// In-memory search over a loaded company collection. Read-only after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndex {
    companies: Vec<Company>,
}

impl SearchIndex {
    /// Builds the index, collapsing duplicate ids with last-write-wins.
    pub fn new(companies: impl IntoIterator<Item = Company>) -> Self {
        companies.into_iter().collect::<CompanyCollection>().into()
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Ranks companies by similarity of their name to `query`.
    ///
    /// Scores below `min_score` are dropped, the rest are sorted by descending score
    /// with ties kept in collection order, then truncated to `limit`.
    pub fn search(&self, query: &str, limit: usize, min_score: f64) -> Vec<ScoredCompany> {
        if query.is_empty() || self.companies.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<ScoredCompany> = self
            .companies
            .iter()
            .map(|company| ScoredCompany {
                match_score: score(query, &company.name),
                company: company.clone(),
            })
            .filter(|scored| scored.match_score >= min_score)
            .collect();

        // `sort_by` is stable, which keeps equal scores in collection order.
        results.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(limit);
        results
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn lookup_by_slug(&self, slug: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.slug == slug)
    }

    /// Companies whose category equals `category`, ignoring case.
    pub fn list_by_category(&self, category: &str) -> Vec<&Company> {
        self.companies
            .iter()
            .filter(|c| c.category.to_lowercase() == category.to_lowercase())
            .collect()
    }

    /// Sorted distinct categories. Companies without a category are skipped.
    pub fn list_categories(&self) -> Vec<String> {
        self.companies
            .iter()
            .filter(|c| !c.category.is_empty())
            .map(|c| c.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl From<CompanyCollection> for SearchIndex {
    fn from(collection: CompanyCollection) -> Self {
        Self {
            companies: collection.into_vec(),
        }
    }
}
