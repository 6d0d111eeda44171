//! IPO scout engine: page extraction, company discovery, fetching and persistence.
mod chain;
mod collect;
mod decode;
mod engine;
mod extract;
mod fetch;
mod fields;
mod persist;
mod select;
mod store;
mod summary;
mod table;
mod types;

pub use collect::{
    collect_companies, CategorySource, CollectorSettings, CompanyLinkHarvester, DEFAULT_BASE_URL,
};
pub use decode::{decode_html, DecodeError};
pub use engine::EngineHandle;
pub use extract::{ExtractError, Extractor, IpoPageExtractor};
pub use fetch::{
    ChannelProgressSink, FetchSettings, Fetcher, NoopProgressSink, ProgressSink, ReqwestFetcher,
    DEFAULT_USER_AGENT,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use select::{Selection, SelectionSession};
pub use store::{
    load_index, record_filename, render_selections, save_index, save_record, save_selections,
    selection_filename, LoadedIndex, SelectionFormat, DEFAULT_INDEX_FILENAME,
};
pub use summary::render_summary;
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, JobId, JobOutcome,
    JobProgress, Stage,
};
