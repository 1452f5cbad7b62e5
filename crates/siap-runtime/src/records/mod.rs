//! Record schemas and the generic record service.
//!
//! Each record resource (workers, assets, on-call reports, routine
//! inspections, user accounts) is described by a static [`Schema`]. A
//! single [`RecordService`] runs list/show/watch/create/edit/delete for
//! all of them.

mod error;
mod field;
mod input;
mod outcome;
mod schema;
mod service;

pub use error::RecordError;
pub use field::FieldKind;
pub use input::{RecordInput, Upload};
pub use outcome::{Notice, NoticeLevel, RecordOutcome};
pub use schema::{
    AttachmentSpec, BlobNaming, FieldSpec, IdStrategy, Location, Schema, ASSETS, ONCALL, ROUTINE,
    SCHEMAS, USERS, WORKERS,
};
pub use service::{Record, RecordService};
