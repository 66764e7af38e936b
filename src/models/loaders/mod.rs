pub mod paper_loader;

pub use paper_loader::{load_paper_set, sequence_tag};
