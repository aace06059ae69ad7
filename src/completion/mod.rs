//! Query-builder autocomplete - chain-aware completion engine
//!
//! Provides completion context for fluent query-builder code based on:
//! - Chain mode (select/insert/update/delete) of the expression at the cursor
//! - Open argument lists (`.from(`, `.where(`, join conditions, helper calls)
//! - Dotted paths (`db.`, `table.`, `table.column.`)

mod candidates;
mod context;
mod patterns;
mod schema;

pub use candidates::{chain_methods, get_candidates};
pub use context::{extract_context, ChainContext};
pub use patterns::{
    get_chain_mode, get_column_match, get_db_name, get_helper_match, get_join_match,
    get_table_match, get_value_match, is_inside_from_parens, is_inside_where_parens, ChainMode,
    ColumnMatch, DbName, HelperMatch, JoinMatch, TableMatch, ValueMatch,
};
pub use schema::{ColumnSchema, TableSchema};

use serde::Serialize;

/// A single completion item
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionItem {
    /// Display label (e.g., "leftJoin")
    pub label: String,
    /// Type of completion
    pub kind: CompletionKind,
    /// Text to insert when selected
    pub insert_text: String,
    /// Additional detail (e.g., column type)
    pub detail: Option<String>,
}

impl CompletionItem {
    /// Create a new completion item
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
            kind,
            detail: None,
        }
    }

    /// Create a completion item with a detail line
    pub fn with_detail(
        label: impl Into<String>,
        kind: CompletionKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(label, kind)
        }
    }
}

/// Type of completion item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    /// Builder or chain method (select, from, where, ...)
    Method,
    /// Table from the schema snapshot
    Table,
    /// Table column
    Column,
    /// Condition helper (eq, and, inArray, ...)
    Helper,
    /// Root identifier (db, tx)
    Keyword,
    /// Pre-built expression (join condition, placeholder)
    Snippet,
}

impl CompletionKind {
    /// Get a short label for this kind
    pub fn label(&self) -> &'static str {
        match self {
            CompletionKind::Method => "mt",
            CompletionKind::Table => "tb",
            CompletionKind::Column => "cl",
            CompletionKind::Helper => "fn",
            CompletionKind::Keyword => "kw",
            CompletionKind::Snippet => "sn",
        }
    }
}
