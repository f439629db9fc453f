//! Parsing of `git remote -v` output into structured remote descriptors.
//!
//! The pipeline has three parts:
//! - [`url_parser`] classifies a single remote URL into scheme, host and path
//! - [`alias`] resolves SSH host aliases through the system `ssh` client
//! - [`remote`] splits the listing into records and groups them by identity

pub mod alias;
pub mod client;
pub mod config;
pub mod context;
pub mod errors;
pub mod remote;
pub mod url_parser;

pub use alias::{AliasResolver, IdentityResolver, SshAliasResolver};
pub use config::Settings;
pub use remote::{Direction, DirectionEntry, RemoteDescriptor, RemoteParser};
