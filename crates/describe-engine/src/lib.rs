//! Describe dispatch engine
//!
//! Classifies the fields of a table or query result, builds the predicate
//! that drops missing values, synthesizes the extraction query and drives
//! one plot per field (or one XY plot per field group) through a
//! [`StatsEngine`] and a [`Renderer`]. A separate pass indexes the
//! produced files as markdown.

mod classify;
mod drive;
mod error;
mod format;
mod index;
mod plot;
mod predicate;
mod synth;
mod traits;

pub use classify::{classify, output_name, query_field, table_field};
pub use drive::{Describer, RunReport};
pub use error::{EngineError, IndexError};
pub use format::thousands;
pub use index::{index_entries, markdown, write_index, IndexEntry, INDEX_EXTENSIONS};
pub use plot::{FieldOutcome, FieldPlot, SKIP_LEVEL};
pub use predicate::{missing_predicate, Predicate};
pub use synth::{extraction_query, sql_ident, table_query};
pub use traits::*;
