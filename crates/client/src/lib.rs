//! # Strata Client
//!
//! Async HTTP client for the Strata cloud analytics service.
//!
//! This crate contains:
//! - The HTTP transport core: authentication headers, TLS policy, proxy
//!   support, and the exponential-backoff retry loop
//! - The error classifier mapping response statuses to the
//!   [`ClientError`] taxonomy
//! - The streaming record decoder (transfer decompression + msgpack
//!   splitting) used by job results, table tails, and bulk import error
//!   records
//! - One operation family per service resource on [`Client`], and the
//!   [`JobHandle`] polling state machine
//!
//! ## Usage
//! ```no_run
//! use strata_client::Client;
//! use strata_domain::JobType;
//!
//! # async fn run() -> strata_client::Result<()> {
//! let client = Client::from_env()?;
//! let mut job = client
//!     .issue_job(JobType::Presto, "sample_db", "select count(1) from www_access", &[])
//!     .await?;
//! job.wait(None, std::time::Duration::from_secs(2)).await?;
//! for record in job.result().await? {
//!     println!("{record}");
//! }
//! # Ok(())
//! # }
//! ```

mod classify;
mod client;
pub mod config;
pub mod decode;
mod endpoints;
mod job;
mod transport;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_HOST, DEFAULT_IMPORT_HOST};
pub use job::JobHandle;
pub use transport::{RawResponse, StreamingGet, Transport};

// The domain crate is part of this crate's public API surface.
pub use strata_domain::{ClientError, ErrorKind, Result};
