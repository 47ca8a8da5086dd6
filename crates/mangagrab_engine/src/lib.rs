//! Mangagrab engine: fetching, bounded dispatch and archive assembly.
mod archive;
mod decode;
mod dispatch;
mod fetch;
mod filename;
mod persist;
mod pipeline;
mod sink;
mod source;
mod types;

pub use archive::{ArchiveAssembler, AssembleOutcome, AssemblyError};
pub use decode::{decode_html, DecodedHtml};
pub use dispatch::{DispatchError, Dispatcher, DEFAULT_CONCURRENCY};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_MAX_ATTEMPTS};
pub use filename::{archive_filename, entry_name, image_extension, ARCHIVE_EXTENSION};
pub use persist::{ensure_output_dir, expand_home, PersistError, TEMP_SUFFIX};
pub use pipeline::{ChapterOutcome, ChapterPipeline, PipelineError, PipelineSettings};
pub use sink::{ChannelProgressSink, NullProgressSink, ProgressSink};
pub use source::{
    ChapterSource, ListingOrder, PageUrlRule, SelectorSource, SiteProfile, SourceError, TitleRule,
};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, PageAsset,
};
