//! Timeline construction and diagram layout for legislative processes.

pub mod classify;
pub mod config;
pub mod dates;
pub mod db;
pub mod errors;
pub mod layout;
pub mod schema;
pub mod stats;
pub mod timeline;
pub mod vocabulary;

pub use classify::StageClassifier;
pub use errors::ConfigError;
pub use timeline::{ProcessOutcome, TimelineBuilder, build_timeline};
pub use vocabulary::Vocabulary;
