//! Mangagrab core: data model, chapter state machine and progress helpers.
mod error;
mod model;
mod progress;
mod selection;
mod state;

pub use error::ErrorCategory;
pub use model::{Chapter, ChapterEntry, ChapterError, Page};
pub use progress::{render_progress_bar, OrderedProgress, Progress, PROGRESS_BAR_WIDTH};
pub use selection::{ChapterSelection, SelectionError};
pub use state::{transition, ChapterEvent, ChapterState, TransitionError};
