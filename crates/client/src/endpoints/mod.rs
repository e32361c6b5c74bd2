//! Resource endpoint families
//!
//! Each submodule contributes one family of operations to
//! [`crate::Client`] via its own `impl` block: thin parameter marshaling
//! over the transport, with client-side name validation where the service
//! enforces a naming rule, and every failure routed through the error
//! classifier.

mod acl;
mod bulk_import;
mod database;
mod job;
mod schedule;
mod server_status;
mod table;
mod user;
