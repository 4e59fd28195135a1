//! Asynchronous short-code supply.
//!
//! Codes are produced ahead of demand: a background refill task draws random
//! candidates, verifies them against the durable store, and parks the
//! survivors in a bounded buffer. The link-creation path pops a pre-verified
//! code from the buffer instead of paying generation and uniqueness-check
//! latency per request.
//!
//! The pipeline is constructed once at startup, [`CodePipeline::start`]ed
//! after the database is reachable, and [`CodePipeline::stop`]ped on
//! shutdown.

mod pipeline;
mod prober;
mod random;

pub use pipeline::{CodePipeline, PipelineConfig, PipelineError};
pub use prober::{CodeStore, UniquenessProber};
pub use random::{CODE_ALPHABET, CodeGenError, RandomCodeGenerator};

#[cfg(test)]
pub use prober::MockCodeStore;
