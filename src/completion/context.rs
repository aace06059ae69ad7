//! Chain context extraction for autocomplete
//!
//! Combines the trailing-text patterns into a single answer for the
//! completion engine: what is the cursor waiting for right now?

use super::patterns::{
    current_statement, get_chain_mode, get_column_match, get_db_name, get_helper_match,
    get_join_match, get_table_match, get_value_match, is_inside_from_parens,
    is_inside_where_parens, ChainMode, DbName,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// The chain context at the cursor position
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainContext {
    /// Comparison helper waiting for its value
    /// Example: .where(eq(users.id, |
    ValuePosition {
        operator: String,
        table: String,
        column: String,
    },

    /// Join call waiting for its condition
    /// Example: .from(users).leftJoin(posts, |
    JoinCondition {
        from_table: String,
        join_table: String,
    },

    /// Open helper call
    /// Example: .where(and(|
    HelperArgument { name: String },

    /// Open `.where(` with nothing typed
    /// Example: .where(|
    WhereArgument,

    /// Table name inside `.from(`
    /// Example: .from(us|
    FromArgument { prefix: String },

    /// Third segment of a dotted path
    /// Example: users.profile.ci|
    NestedColumn {
        table: String,
        column: String,
        prefix: String,
    },

    /// Builder method on the query root
    /// Example: db.sel|
    DbRoot {
        name: DbName,
        prefix: String,
    },

    /// Column of a table
    /// Example: eq(users.na|
    TableMember {
        table: String,
        prefix: String,
    },

    /// Next method after a closed call in a known chain
    /// Example: db.select().from(users).|
    AfterChain {
        mode: ChainMode,
        prefix: String,
    },

    /// Nothing specific - suggest roots, helpers and tables
    General { prefix: String },
}

impl ChainContext {
    /// The partial word the user is typing, used to filter candidates
    pub fn prefix(&self) -> &str {
        match self {
            ChainContext::FromArgument { prefix }
            | ChainContext::NestedColumn { prefix, .. }
            | ChainContext::DbRoot { prefix, .. }
            | ChainContext::TableMember { prefix, .. }
            | ChainContext::AfterChain { prefix, .. }
            | ChainContext::General { prefix } => prefix.as_str(),
            _ => "",
        }
    }
}

/// `)` then `.` and a partial method name
static AFTER_CALL_DOT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\)\s*\.\s*(\w*)$").unwrap_or_else(|e| panic!("invalid chain pattern: {e}"))
});

/// Extract the chain context for the text before the cursor
pub fn extract_context(text: &str) -> ChainContext {
    // === PRIORITY 0: argument positions inside open calls ===
    // The innermost open call decides, so these go before any dotted-path check
    if let Some(value) = get_value_match(text) {
        return ChainContext::ValuePosition {
            operator: value.operator,
            table: value.table,
            column: value.column,
        };
    }

    if let Some(join) = get_join_match(text) {
        return ChainContext::JoinCondition {
            from_table: join.from_table,
            join_table: join.join_table,
        };
    }

    if let Some(helper) = get_helper_match(text) {
        return ChainContext::HelperArgument { name: helper.name };
    }

    if is_inside_where_parens(text) {
        return ChainContext::WhereArgument;
    }

    if is_inside_from_parens(text) {
        return ChainContext::FromArgument {
            prefix: extract_current_word(text),
        };
    }

    // === PRIORITY 1: dotted paths ===
    if let Some(column) = get_column_match(text) {
        return ChainContext::NestedColumn {
            table: column.table,
            column: column.column,
            prefix: column.partial.unwrap_or_default(),
        };
    }

    // db./tx. would also match as a table path, so it is checked first
    if let Some(name) = get_db_name(text) {
        return ChainContext::DbRoot {
            name,
            prefix: extract_current_word(text),
        };
    }

    if let Some(table) = get_table_match(text) {
        return ChainContext::TableMember {
            table: table.table,
            prefix: table.column.unwrap_or_default(),
        };
    }

    // === PRIORITY 2: continuing a chain after a closed call ===
    if let Some(caps) = AFTER_CALL_DOT_RE.captures(current_statement(text)) {
        if let Some(mode) = get_chain_mode(text) {
            let prefix = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            return ChainContext::AfterChain { mode, prefix };
        }
    }

    ChainContext::General {
        prefix: extract_current_word(text),
    }
}

/// Extract the current word being typed (for filtering)
fn extract_current_word(text: &str) -> String {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_position() {
        let ctx = extract_context("db.select().from(users).where(eq(users.id, ");
        assert!(
            matches!(
                &ctx,
                ChainContext::ValuePosition { operator, table, column }
                if operator == "eq" && table == "users" && column == "id"
            ),
            "Expected ValuePosition, got {:?}",
            ctx
        );
    }

    #[test]
    fn test_join_condition() {
        let ctx = extract_context("db.select().from(users).leftJoin(posts, ");
        assert!(
            matches!(
                &ctx,
                ChainContext::JoinCondition { from_table, join_table }
                if from_table == "users" && join_table == "posts"
            ),
            "Expected JoinCondition, got {:?}",
            ctx
        );
    }

    #[test]
    fn test_helper_argument() {
        let ctx = extract_context("db.select().from(users).where(and(");
        assert!(matches!(ctx, ChainContext::HelperArgument { name } if name == "and"));
    }

    #[test]
    fn test_where_argument() {
        let ctx = extract_context("db.select().from(users).where(");
        assert_eq!(ctx, ChainContext::WhereArgument);
    }

    #[test]
    fn test_from_argument() {
        let ctx = extract_context("db.select().from(us");
        assert!(matches!(ctx, ChainContext::FromArgument { prefix } if prefix == "us"));

        let ctx = extract_context("db.select().from(");
        assert!(matches!(ctx, ChainContext::FromArgument { prefix } if prefix.is_empty()));
    }

    #[test]
    fn test_db_root_before_table_member() {
        let ctx = extract_context("const rows = await db.sel");
        assert!(
            matches!(
                &ctx,
                ChainContext::DbRoot { name: DbName::Db, prefix } if prefix == "sel"
            ),
            "Expected DbRoot, got {:?}",
            ctx
        );
    }

    #[test]
    fn test_table_member() {
        let ctx = extract_context("db.select().from(users).where(gt(users.ag");
        assert!(
            matches!(
                &ctx,
                ChainContext::TableMember { table, prefix } if table == "users" && prefix == "ag"
            ),
            "Expected TableMember, got {:?}",
            ctx
        );
    }

    #[test]
    fn test_nested_column() {
        let ctx = extract_context("users.profile.");
        assert!(
            matches!(
                &ctx,
                ChainContext::NestedColumn { table, column, prefix }
                if table == "users" && column == "profile" && prefix.is_empty()
            ),
            "Expected NestedColumn, got {:?}",
            ctx
        );
    }

    #[test]
    fn test_after_chain() {
        let ctx = extract_context("db.select().from(users).or");
        assert!(
            matches!(
                &ctx,
                ChainContext::AfterChain { mode: ChainMode::Select, prefix } if prefix == "or"
            ),
            "Expected AfterChain, got {:?}",
            ctx
        );

        let ctx = extract_context("tx.delete(sessions).");
        assert!(
            matches!(
                &ctx,
                ChainContext::AfterChain { mode: ChainMode::Delete, prefix } if prefix.is_empty()
            ),
            "Expected AfterChain, got {:?}",
            ctx
        );
    }

    #[test]
    fn test_after_chain_skips_closed_subquery() {
        let ctx = extract_context(concat!(
            "db.delete(users)",
            ".where(inArray(users.id, db.select({ id: posts.userId }).from(posts)))."
        ));
        assert_eq!(
            ctx,
            ChainContext::AfterChain {
                mode: ChainMode::Delete,
                prefix: String::new(),
            }
        );

        let ctx = extract_context(
            "db.update(users).set({ n: 1 }).where(exists(db.select().from(posts))).re",
        );
        assert!(
            matches!(
                &ctx,
                ChainContext::AfterChain { mode: ChainMode::Update, prefix } if prefix == "re"
            ),
            "Expected AfterChain, got {:?}",
            ctx
        );
    }

    #[test]
    fn test_general() {
        let ctx = extract_context("const rows = awa");
        assert!(matches!(ctx, ChainContext::General { prefix } if prefix == "awa"));

        let ctx = extract_context("");
        assert!(matches!(ctx, ChainContext::General { prefix } if prefix.is_empty()));
    }

    #[test]
    fn test_prefix_accessor() {
        assert_eq!(extract_context("db.ins").prefix(), "ins");
        assert_eq!(extract_context(".where(").prefix(), "");
    }

    #[test]
    fn test_current_word_unicode() {
        assert_eq!(extract_current_word("eq(usuários"), "usuários");
        assert_eq!(extract_current_word("foo "), "");
    }
}
