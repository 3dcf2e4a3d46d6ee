#![forbid(unsafe_code)]

pub mod defaults;
pub mod entry;
pub mod gate;
pub mod ops;
pub mod service;
pub mod view;
pub mod wire;

pub use gate::{ImportGate, ImportPermit};
pub use service::{ChapterImportPayload, ImportReport, ImportService, ServiceError};
