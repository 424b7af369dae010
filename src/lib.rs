#![doc(test(attr(deny(warnings))))]

//! SMS journal core turns an accrual export into balanced DDI and Plan Usage journals,
//! split into batches sized for bulk upload to an external ledger.
//!
//! The stages run in a fixed order: classification, location resolution, aggregation,
//! journal generation and batch splitting. See [`core::Pipeline`].

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod location;
pub mod storage;
pub mod utils;

pub use crate::config::{ConfigManager, PipelineConfig};
pub use crate::core::{Pipeline, PipelineOutput};
pub use crate::errors::{PipelineError, PipelineResult};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("SMS journal core tracing initialized.");
    });
}
