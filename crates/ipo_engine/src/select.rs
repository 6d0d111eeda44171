use scraper::{Html, Selector};

use crate::extract::{parse_document, ExtractError};

/// Values recovered for one ad-hoc request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub label: String,
    pub values: Vec<String>,
}

/// Ad-hoc CSS requests against one parsed document. Repeating a label replaces its values.
pub struct SelectionSession {
    document: Html,
    selections: Vec<Selection>,
}

impl SelectionSession {
    pub fn new(html: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            document: parse_document(html)?,
            selections: Vec::new(),
        })
    }

    /// Records the trimmed, non-empty text of each match, or the named attribute
    /// for a `selector@attr` request. Unlabelled requests are filed under the selector.
    pub fn extract(
        &mut self,
        selector: &str,
        label: Option<&str>,
    ) -> Result<Vec<String>, ExtractError> {
        let (css, attribute) = split_attribute(selector);
        let parsed = Selector::parse(css).map_err(|err| ExtractError::InvalidSelector {
            selector: selector.to_string(),
            message: err.to_string(),
        })?;

        let values: Vec<String> = self
            .document
            .select(&parsed)
            .filter_map(|el| match attribute {
                Some(name) => el.value().attr(name).map(|value| value.trim().to_string()),
                None => Some(el.text().collect::<String>().trim().to_string()),
            })
            .filter(|text| !text.is_empty())
            .collect();

        let label = label.unwrap_or(selector).to_string();
        match self.selections.iter_mut().find(|s| s.label == label) {
            Some(existing) => existing.values = values.clone(),
            None => self.selections.push(Selection {
                label,
                values: values.clone(),
            }),
        }
        Ok(values)
    }

    /// A failing request does not stop the rest.
    pub fn extract_many<'a>(
        &mut self,
        requests: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Vec<Result<Vec<String>, ExtractError>> {
        requests
            .into_iter()
            .map(|(label, selector)| self.extract(selector, Some(label)))
            .collect()
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn into_selections(self) -> Vec<Selection> {
        self.selections
    }
}

fn split_attribute(selector: &str) -> (&str, Option<&str>) {
    match selector.rsplit_once('@') {
        Some((css, attr))
            if !css.trim().is_empty()
                && !attr.is_empty()
                && attr
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')) =>
        {
            (css.trim(), Some(attr))
        }
        _ => (selector, None),
    }
}
