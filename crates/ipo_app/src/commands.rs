//! Subcommand handlers. Reports go to stdout; diagnostics go through the logger.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::Local;
use ipo_core::{ScoredCompany, SearchIndex};
use ipo_engine::{
    collect_companies, decode_html, load_index, record_filename, render_summary, save_index,
    save_record, save_selections, selection_filename, EngineEvent, EngineHandle, Extractor,
    IpoPageExtractor, JobProgress, LoadedIndex, ReqwestFetcher, SelectionFormat,
    SelectionSession, Stage,
};
use ipo_logging::{ipo_info, ipo_warn};

use crate::config::AppConfig;

const RULE_WIDTH: usize = 80;
const SCORE_BAR_WIDTH: f64 = 10.0;
const DETAILS_SEARCH_LIMIT: usize = 5;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn open_index(config: &AppConfig) -> anyhow::Result<LoadedIndex> {
    load_index(&config.index_path).with_context(|| {
        format!(
            "no usable index at {:?}; run `ipo_scout build-index` first",
            config.index_path
        )
    })
}

pub fn build_index(config: &AppConfig) -> anyhow::Result<()> {
    let collector = config.collector.to_settings();
    let fetcher =
        ReqwestFetcher::new(config.fetch.to_settings()).context("failed to build HTTP client")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    println!("Building company index from {}...", collector.base_url);
    let companies = runtime.block_on(collect_companies(&fetcher, &collector));
    if companies.is_empty() {
        ipo_warn!("No companies were collected");
    }

    let written = save_index(&config.index_path, &companies, &now_iso())
        .with_context(|| format!("failed to save index to {:?}", config.index_path))?;

    let index = SearchIndex::from(companies);
    println!("Indexed {} companies into {}", index.len(), written.display());
    for (category, count) in category_counts(&index) {
        println!("  {}: {count}", title_case(&category));
    }
    Ok(())
}

pub fn search(config: &AppConfig, query: &str, limit: usize, min_score: f64) -> anyhow::Result<()> {
    let loaded = open_index(config)?;
    let results = loaded.index.search(query, limit, min_score);
    print!("{}", render_results(&results));
    Ok(())
}

fn render_results(results: &[ScoredCompany]) -> String {
    if results.is_empty() {
        return "No companies found matching your search.\n".to_string();
    }
    let mut out = format!("{}\nSEARCH RESULTS ({} found)\n{}\n\n", rule(), results.len(), rule());
    for (i, scored) in results.iter().enumerate() {
        let company = &scored.company;
        let category = if company.category.is_empty() {
            "N/A"
        } else {
            &company.category
        };
        out.push_str(&format!(
            "{}. {}\n   Category: {} | ID: {}\n   Match: {} {:.2}%\n   URL: {}\n\n",
            i + 1,
            company.name,
            category,
            company.id,
            score_bar(scored.match_score),
            scored.match_score * 100.0,
            company.url
        ));
    }
    out
}

fn score_bar(score: f64) -> String {
    "█".repeat((score * SCORE_BAR_WIDTH) as usize)
}

pub fn details(config: &AppConfig, query: &str, top: usize, save: bool) -> anyhow::Result<()> {
    let loaded = open_index(config)?;
    let matches = loaded
        .index
        .search(query, DETAILS_SEARCH_LIMIT.max(top), ipo_core::DEFAULT_MIN_SCORE);
    if matches.is_empty() {
        bail!("no companies found matching {query:?}");
    }

    let engine =
        EngineHandle::new(config.fetch.to_settings()).context("failed to build HTTP client")?;
    let selected: Vec<_> = matches.into_iter().take(top.max(1)).collect();
    for (job_id, scored) in selected.iter().enumerate() {
        println!(
            "Best match: {} (Score: {:.1}%)",
            scored.company.name,
            scored.match_score * 100.0
        );
        engine.enqueue(job_id as u64, scored.company.clone());
    }

    let mut pending = selected.len();
    let mut failures = 0;
    let mut stages = vec![None; selected.len()];
    while pending > 0 {
        let Some(event) = engine.recv() else {
            bail!("extraction engine stopped with {pending} jobs outstanding");
        };
        let (job_id, result) = match event {
            EngineEvent::Progress(progress) => {
                if stage_changed(&mut stages, &progress) {
                    let company = &selected[progress.job_id as usize].company;
                    println!("  [{}] {}", company.name, progress.stage);
                }
                continue;
            }
            EngineEvent::JobCompleted { job_id, result } => (job_id, result),
        };
        pending -= 1;

        let company = &selected[job_id as usize].company;
        match result {
            Ok(outcome) => {
                print!("{}", render_summary(&outcome.record));
                if save {
                    let written = save_record(
                        &config.output_dir,
                        &record_filename(&outcome.company.slug),
                        &outcome.final_url,
                        &now_iso(),
                        &outcome.record,
                    )
                    .with_context(|| format!("failed to save record for {}", company.name))?;
                    println!("Data saved to {}", written.display());
                }
            }
            Err(kind) => {
                failures += 1;
                eprintln!("Could not extract {} ({}): {kind}", company.name, company.url);
            }
        }
    }

    if failures == selected.len() {
        bail!("no detail page could be extracted");
    }
    Ok(())
}

/// Records the latest stage of a job; false while the job stays in one stage.
fn stage_changed(stages: &mut [Option<Stage>], progress: &JobProgress) -> bool {
    match stages.get_mut(progress.job_id as usize) {
        Some(last) if *last != Some(progress.stage) => {
            *last = Some(progress.stage);
            true
        }
        _ => false,
    }
}

fn read_page(html_file: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(html_file).with_context(|| format!("failed to read {html_file:?}"))?;
    decode_html(&bytes, None).with_context(|| format!("failed to decode {html_file:?}"))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

pub fn extract(config: &AppConfig, html_file: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let html = read_page(html_file)?;
    let record = IpoPageExtractor::new()
        .extract(&html)
        .with_context(|| format!("failed to extract {html_file:?}"))?;
    print!("{}", render_summary(&record));

    let (dir, filename) = match output {
        Some(path) => (
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf(),
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("output path has no file name")?,
        ),
        None => (config.output_dir.clone(), record_filename(&file_stem(html_file))),
    };
    let source = html_file.display().to_string();
    let written = save_record(&dir, &filename, &source, &now_iso(), &record)
        .with_context(|| format!("failed to save record to {dir:?}"))?;

    for (group, count) in record.group_field_counts() {
        ipo_info!("{group}: {count} fields");
    }
    println!(
        "Extracted {} fields; data saved to {}",
        record.populated_fields(),
        written.display()
    );
    Ok(())
}

pub fn select(
    html_file: &Path,
    selectors: &[String],
    labels: &[String],
    formats: &[SelectionFormat],
    output_dir: &Path,
    filename: Option<&str>,
) -> anyhow::Result<()> {
    let html = read_page(html_file)?;
    let mut session = SelectionSession::new(&html)
        .with_context(|| format!("failed to parse {html_file:?}"))?;

    for (idx, selector) in selectors.iter().enumerate() {
        let label = labels.get(idx).map(String::as_str);
        match session.extract(selector, label) {
            Ok(values) => println!(
                "{}: {} element(s)",
                label.unwrap_or(selector),
                values.len()
            ),
            Err(err) => ipo_warn!("{err}"),
        }
    }

    let selections = session.into_selections();
    let source = html_file.display().to_string();
    let extraction_time = now_iso();
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    for &format in formats {
        let filename = match filename {
            Some(name) => named_selection_file(name, format),
            None => selection_filename(&source, &stamp, format),
        };
        let written = save_selections(
            output_dir,
            &filename,
            &source,
            &extraction_time,
            &selections,
            format,
        )
        .with_context(|| format!("failed to save selections to {output_dir:?}"))?;
        println!("Saved {}", written.display());
    }
    Ok(())
}

/// Gives a user-chosen file name the extension of `format`.
fn named_selection_file(name: &str, format: SelectionFormat) -> String {
    Path::new(name)
        .with_extension(format.extension())
        .to_string_lossy()
        .into_owned()
}

pub fn categories(config: &AppConfig) -> anyhow::Result<()> {
    let loaded = open_index(config)?;
    println!("Available IPO Categories:\n{}", "=".repeat(40));
    for (category, count) in category_counts(&loaded.index) {
        println!("  - {}: {count} companies", title_case(&category));
    }
    Ok(())
}

pub fn stats(config: &AppConfig) -> anyhow::Result<()> {
    let loaded = open_index(config)?;
    println!("IPO Index Statistics\n{}", "=".repeat(40));
    println!("  Total Companies: {}", loaded.index.len());
    if let Some(updated) = &loaded.last_updated {
        println!("  Last Updated: {updated}");
    }
    for (category, count) in category_counts(&loaded.index) {
        println!("  {}: {count}", title_case(&category));
    }
    Ok(())
}

/// Categories that differ only in case are reported once, under their first spelling.
fn category_counts(index: &SearchIndex) -> Vec<(String, usize)> {
    let mut seen = HashSet::new();
    index
        .list_categories()
        .into_iter()
        .filter(|category| seen.insert(category.to_lowercase()))
        .map(|category| {
            let count = index.list_by_category(&category).len();
            (category, count)
        })
        .collect()
}

/// Upper-cases the first letter of every word and lower-cases the rest.
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
