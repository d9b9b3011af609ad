pub mod inputs;
pub mod journal;
pub mod store;

pub use inputs::{load_call_graph, load_sources};
pub use journal::SummaryJournal;
pub use store::SummaryStore;
