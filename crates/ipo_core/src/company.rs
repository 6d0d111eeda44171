use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Detail-page address of a listing: `{base}/ipo/{slug}/{id}`.
pub fn detail_url(base_url: &str, slug: &str, id: &str) -> String {
    format!("{}/ipo/{slug}/{id}", base_url.trim_end_matches('/'))
}

/// A listing candidate discovered on a category page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub url: String,
}

impl Company {
    pub fn new(
        base_url: &str,
        id: impl Into<String>,
        slug: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let slug = slug.into();
        let url = detail_url(base_url, &slug, &id);
        Self {
            id,
            slug,
            name: name.into(),
            category: category.into(),
            url,
        }
    }
}

/// A company decorated with its match score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCompany {
    #[serde(flatten)]
    pub company: Company,
    pub match_score: f64,
}

/// Ordered company collection keyed by `id`.
///
/// Inserting an `id` that is already present replaces the earlier entry in place,
/// so the collection keeps first-insertion order with last-write-wins contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyCollection {
    companies: Vec<Company>,
    positions: HashMap<String, usize>,
}

impl CompanyCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the `id` was new.
    pub fn insert(&mut self, company: Company) -> bool {
        match self.positions.get(&company.id) {
            Some(&idx) => {
                self.companies[idx] = company;
                false
            }
            None => {
                self.positions.insert(company.id.clone(), self.companies.len());
                self.companies.push(company);
                true
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Company> {
        self.positions.get(id).map(|&idx| &self.companies[idx])
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn as_slice(&self) -> &[Company] {
        &self.companies
    }

    pub fn into_vec(self) -> Vec<Company> {
        self.companies
    }
}

impl FromIterator<Company> for CompanyCollection {
    fn from_iter<I: IntoIterator<Item = Company>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

impl Extend<Company> for CompanyCollection {
    fn extend<I: IntoIterator<Item = Company>>(&mut self, iter: I) {
        for company in iter {
            self.insert(company);
        }
    }
}
