use ipo_logging::{ipo_error, ipo_trace};
use regex::Regex;
use scraper::{Html, Selector};

pub(crate) struct Page {
    pub(crate) document: Html,
    pub(crate) markup: String,
}

impl Page {
    pub(crate) fn new(document: Html) -> Self {
        // The serializer re-escapes these in text; patterns expect the literal characters.
        let markup = document
            .html()
            .replace("&nbsp;", "\u{a0}")
            .replace("&amp;", "&");
        Self { document, markup }
    }

    pub(crate) fn first_text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CandidateSpec {
    /// Capture group 1 is the value.
    Markup(&'static str),
    Element(&'static str),
}

pub(crate) enum Candidate {
    Markup(Regex),
    Element(Selector),
}

impl Candidate {
    fn compile(field: &str, spec: CandidateSpec) -> Option<Self> {
        match spec {
            CandidateSpec::Markup(pattern) => match Regex::new(pattern) {
                Ok(re) => Some(Candidate::Markup(re)),
                Err(err) => {
                    ipo_error!("{field}: dropping invalid pattern {pattern:?}: {err}");
                    None
                }
            },
            CandidateSpec::Element(selector) => match Selector::parse(selector) {
                Ok(sel) => Some(Candidate::Element(sel)),
                Err(err) => {
                    ipo_error!("{field}: dropping invalid selector {selector:?}: {err}");
                    None
                }
            },
        }
    }

    fn capture(&self, page: &Page) -> Option<String> {
        match self {
            Candidate::Markup(re) => re
                .captures(&page.markup)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
            Candidate::Element(sel) => page.first_text(sel),
        }
    }

    fn capture_all(&self, page: &Page) -> Vec<String> {
        match self {
            Candidate::Markup(re) => re
                .captures_iter(&page.markup)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .collect(),
            Candidate::Element(sel) => page
                .document
                .select(sel)
                .map(|el| el.text().collect::<String>())
                .collect(),
        }
    }
}

/// Candidates in priority order; the first one that matches supplies the value.
pub(crate) struct FallbackChain {
    field: &'static str,
    candidates: Vec<Candidate>,
}

impl FallbackChain {
    pub(crate) fn compile(field: &'static str, specs: &[CandidateSpec]) -> Self {
        let candidates = specs
            .iter()
            .filter_map(|spec| Candidate::compile(field, *spec))
            .collect();
        Self { field, candidates }
    }

    pub(crate) fn first_match(&self, page: &Page) -> Option<String> {
        self.candidates
            .iter()
            .enumerate()
            .find_map(|(idx, candidate)| {
                candidate.capture(page).inspect(|_| {
                    ipo_trace!("{}: candidate #{idx} matched", self.field);
                })
            })
    }

    /// Every value from the first candidate that matches at least once.
    pub(crate) fn all_matches(&self, page: &Page) -> Vec<String> {
        self.candidates
            .iter()
            .map(|candidate| candidate.capture_all(page))
            .find(|values| !values.is_empty())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.candidates.len()
    }
}
