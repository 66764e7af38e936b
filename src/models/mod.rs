pub mod issue;
pub mod loaders;
pub mod paper;
pub mod record;

pub use issue::{IssueTarget, PageRange, RunningIssueState};
pub use loaders::{load_paper_set, sequence_tag};
pub use paper::{FilenameFields, FilenameTags, PaperDocument};
pub use record::{PublicationRecord, RecordField, ResumePoint};
