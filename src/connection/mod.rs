//! Connection string recognition: fuzzy scheme matching and field extraction

mod error;
mod parser;
mod protocol;

pub use error::ConnectionUrlError;
pub use parser::{
    parse_connection_url, try_parse_connection_url, ConnectionMatcher, ParsedConnection,
};
pub use protocol::{edit_distance, match_protocol, MatchRules, Protocol, ProtocolMatch};
