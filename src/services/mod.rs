pub mod batch_merger;
pub mod name_parser;
pub mod report_transformer;
pub mod report_writer;

pub use batch_merger::{merge_batches, BatchMerger};
pub use name_parser::{NameParser, ParsedName};
pub use report_transformer::{Report, ReportRow, ReportTransformer};
pub use report_writer::{log_report_preview, report_to_csv, ReportWriter};
