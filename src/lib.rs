//! Dora editor assist - Library
//! Query-chain context detection and connection-string recognition

pub mod completion;
pub mod config;
pub mod connection;

pub use completion::{extract_context, get_candidates, get_chain_mode, ChainContext, ChainMode};
pub use connection::{parse_connection_url, ParsedConnection, Protocol};
