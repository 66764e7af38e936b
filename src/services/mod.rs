pub mod filename_codec;
pub mod metadata_record;
pub mod page_range;
pub mod run_log;
pub mod sequencer;
pub mod title_page;

pub use filename_codec::FilenameCodec;
pub use metadata_record::{apply_updates, MetadataKey, MetadataRecord, MetadataReport};
pub use page_range::compute_range;
pub use run_log::RunLog;
pub use sequencer::Sequencer;
pub use title_page::TitleRewriter;
