//! Call-profile record schema.
//!
//! Defines the record emitted by the call-graph profiler runtime
//! (`profile-results.csv`) and the line format it is written in.

mod record;

pub use record::{
    basename, parse_record_line, CallRecord, RecordError, RecordField, RowShape, FIELD_COUNT,
    FIELD_DELIMITER,
};
