//! On-disk shapes of the company index, extracted records and ad-hoc selections.

use std::fs;
use std::path::{Path, PathBuf};

use ipo_core::{Company, CompanyCollection, IpoRecord, SearchIndex};
use ipo_logging::ipo_info;
use serde::{Deserialize, Serialize};

use crate::persist::{AtomicFileWriter, PersistError};
use crate::select::Selection;

pub const DEFAULT_INDEX_FILENAME: &str = "companies_index.json";

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    total_companies: usize,
    last_updated: String,
    #[serde(default)]
    companies: Vec<Company>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedIndex {
    pub last_updated: Option<String>,
    pub index: SearchIndex,
}

pub fn save_index(
    path: &Path,
    companies: &CompanyCollection,
    last_updated: &str,
) -> Result<PathBuf, PersistError> {
    let file = IndexFile {
        total_companies: companies.len(),
        last_updated: last_updated.to_string(),
        companies: companies.as_slice().to_vec(),
    };
    let (writer, filename) = AtomicFileWriter::for_path(path);
    let written = writer.write_json(&filename, &file)?;
    ipo_info!("Index with {} companies saved to {:?}", file.total_companies, written);
    Ok(written)
}

/// Loads an index file. Duplicate ids collapse last-write-wins.
pub fn load_index(path: &Path) -> Result<LoadedIndex, PersistError> {
    #[derive(Deserialize)]
    struct Partial {
        last_updated: Option<String>,
        #[serde(default)]
        companies: Vec<Company>,
    }

    let content = fs::read_to_string(path)?;
    let partial: Partial = serde_json::from_str(&content)?;
    let index = SearchIndex::new(partial.companies);
    ipo_info!("Loaded {} companies from {:?}", index.len(), path);
    Ok(LoadedIndex {
        last_updated: partial.last_updated,
        index,
    })
}

#[derive(Serialize)]
struct RecordFile<'a> {
    source: &'a str,
    extraction_time: &'a str,
    total_fields: usize,
    data: &'a IpoRecord,
}

/// Default record filename for a company slug.
pub fn record_filename(slug: &str) -> String {
    format!("{slug}_data.json")
}

pub fn save_record(
    dir: &Path,
    filename: &str,
    source: &str,
    extraction_time: &str,
    record: &IpoRecord,
) -> Result<PathBuf, PersistError> {
    let file = RecordFile {
        source,
        extraction_time,
        total_fields: record.populated_fields(),
        data: record,
    };
    AtomicFileWriter::new(dir.to_path_buf()).write_json(filename, &file)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionFormat {
    Json,
    Text,
}

impl SelectionFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SelectionFormat::Json => "json",
            SelectionFormat::Text => "txt",
        }
    }
}

#[derive(Serialize)]
struct SelectionFile<'a> {
    source_file: &'a str,
    extraction_time: &'a str,
    total_fields: usize,
    data: SelectionMap<'a>,
}

/// Label to values, in request order.
struct SelectionMap<'a>(&'a [Selection]);

impl Serialize for SelectionMap<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|s| (&s.label, &s.values)))
    }
}

/// `{stem}_extracted_{stamp}.{ext}` for a source file path.
pub fn selection_filename(source_file: &str, stamp: &str, format: SelectionFormat) -> String {
    let stem = Path::new(source_file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{stem}_extracted_{stamp}.{}", format.extension())
}

pub fn save_selections(
    dir: &Path,
    filename: &str,
    source_file: &str,
    extraction_time: &str,
    selections: &[Selection],
    format: SelectionFormat,
) -> Result<PathBuf, PersistError> {
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    match format {
        SelectionFormat::Json => {
            let file = SelectionFile {
                source_file,
                extraction_time,
                total_fields: selections.len(),
                data: SelectionMap(selections),
            };
            writer.write_json(filename, &file)
        }
        SelectionFormat::Text => writer.write(
            filename,
            &render_selections(source_file, extraction_time, selections),
        ),
    }
}

pub fn render_selections(source_file: &str, extraction_time: &str, selections: &[Selection]) -> String {
    let rule = "=".repeat(80);
    let mut out = format!(
        "{rule}\nEXTRACTION RESULTS\n{rule}\n\nSource File: {source_file}\nExtraction Time: {extraction_time}\nTotal Fields: {}\n",
        selections.len()
    );
    for selection in selections {
        out.push_str(&format!("\n{rule}\n{}\n{}\n", selection.label, "-".repeat(80)));
        if selection.values.is_empty() {
            out.push_str("(No data found)\n");
        }
        for (i, value) in selection.values.iter().enumerate() {
            out.push_str(&format!("{}. {value}\n", i + 1));
        }
    }
    out
}
