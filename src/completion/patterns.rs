//! Trailing-text patterns for query-builder chains
//!
//! Every function here looks only at the text up to the cursor and answers
//! with `None`/`false` when the shape is not recognised. Buffers are usually
//! half-typed and syntactically broken, so all patterns are anchored at the
//! end of the text and never try to parse the whole expression.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Argument list with up to two levels of nested parentheses
const ARGS: &str = r"(?:[^()]|\((?:[^()]|\([^()]*\))*\))*";

/// Identifier: letter or underscore, then word characters
const IDENT: &str = r"[A-Za-z_]\w*";

/// Builder verbs that start a chain
const VERBS: &str = "select|selectDistinct|selectDistinctOn|insert|update|delete";

/// Comparison helpers that take `table.column` as first argument
const COMPARISON_HELPERS: &str = "eq|ne|gt|gte|lt|lte|inArray|notInArray|like|ilike";

/// All helpers recognised at an open paren
const HELPERS: &str =
    "eq|ne|gt|gte|lt|lte|and|or|inArray|notInArray|like|ilike|between|not|exists|notExists";

/// Which query object the chain is rooted on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DbName {
    Db,
    Tx,
}

impl DbName {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbName::Db => "db",
            DbName::Tx => "tx",
        }
    }
}

/// Phase of the fluent chain the cursor is in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainMode {
    Select,
    Insert,
    Update,
    Delete,
}

impl ChainMode {
    /// Order in which modes are tried. `.where` and `.returning` belong to
    /// more than one chain, so the first mode that matches wins.
    pub const PRIORITY: [ChainMode; 4] = [
        ChainMode::Delete,
        ChainMode::Select,
        ChainMode::Insert,
        ChainMode::Update,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainMode::Select => "select",
            ChainMode::Insert => "insert",
            ChainMode::Update => "update",
            ChainMode::Delete => "delete",
        }
    }

    /// Chain methods that may make up a chain of this mode
    pub fn fragments(&self) -> &'static [&'static str] {
        match self {
            ChainMode::Delete => &["delete", "where", "returning"],
            ChainMode::Select => &[
                "select",
                "selectDistinct",
                "selectDistinctOn",
                "from",
                "where",
                "leftJoin",
                "rightJoin",
                "innerJoin",
                "fullJoin",
                "groupBy",
                "having",
                "orderBy",
                "limit",
                "offset",
                "union",
                "unionAll",
                "intersect",
                "except",
            ],
            ChainMode::Insert => &[
                "insert",
                "values",
                "onConflictDoUpdate",
                "onConflictDoNothing",
                "returning",
            ],
            ChainMode::Update => &["update", "set", "where", "returning"],
        }
    }

    fn chain_regex(&self) -> &'static Regex {
        match self {
            ChainMode::Delete => &*DELETE_CHAIN_RE,
            ChainMode::Select => &*SELECT_CHAIN_RE,
            ChainMode::Insert => &*INSERT_CHAIN_RE,
            ChainMode::Update => &*UPDATE_CHAIN_RE,
        }
    }
}

impl std::fmt::Display for ChainMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `table.` or `table.col` at the cursor
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableMatch {
    pub table: String,
    pub column: Option<String>,
}

/// `table.column.` or `table.column.part` at the cursor
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnMatch {
    pub table: String,
    pub column: String,
    pub partial: Option<String>,
}

/// Comparison helper waiting for its value argument, e.g. `eq(users.id, `
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValueMatch {
    pub operator: String,
    pub table: String,
    pub column: String,
}

/// Join call waiting for its condition, e.g. `.from(users).leftJoin(posts, `
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JoinMatch {
    pub from_table: String,
    pub join_table: String,
}

/// Helper call with an open paren, e.g. `and(`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HelperMatch {
    pub name: String,
}

fn compile(pattern: &str) -> Regex {
    // Only called with the constant patterns in this file
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid chain pattern {pattern:?}: {e}"))
}

/// A chain made only of `methods`, anchored at both ends. Argument lists
/// are expected collapsed to `()`; the last call may be left open.
fn chain_pattern(methods: &[&str]) -> String {
    let methods = methods.join("|");
    format!(r"^(?:\.\s*(?:{methods})\s*\(\)\s*)*(?:\.\s*(?:(?:{methods})\s*\(|\w*))?$")
}

static DB_NAME_RE: Lazy<Regex> = Lazy::new(|| compile(r"\b(db|tx)\.\w*$"));

static VERB_RE: Lazy<Regex> = Lazy::new(|| compile(&format!(r"\.\s*(?:{VERBS})\s*\(")));

static FIRST_CALL_RE: Lazy<Regex> = Lazy::new(|| compile(r"\.\s*\w+\s*\("));

static DELETE_CHAIN_RE: Lazy<Regex> =
    Lazy::new(|| compile(&chain_pattern(ChainMode::Delete.fragments())));
static SELECT_CHAIN_RE: Lazy<Regex> =
    Lazy::new(|| compile(&chain_pattern(ChainMode::Select.fragments())));
static INSERT_CHAIN_RE: Lazy<Regex> =
    Lazy::new(|| compile(&chain_pattern(ChainMode::Insert.fragments())));
static UPDATE_CHAIN_RE: Lazy<Regex> =
    Lazy::new(|| compile(&chain_pattern(ChainMode::Update.fragments())));

static TABLE_RE: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?:^|[^\w.])({IDENT})\.({IDENT})?$")));

static COLUMN_RE: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?:^|[^\w.])({IDENT})\.({IDENT})\.({IDENT})?$")));

static VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"\b({COMPARISON_HELPERS})\s*\(\s*({IDENT})\.({IDENT})\s*,\s*$"
    ))
});

static JOIN_RE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        concat!(
            r"\.from\s*\(\s*({IDENT})\s*\)",
            r"(?:\s*\.\s*\w+Join\s*\({ARGS}\))*",
            r"\s*\.\s*\w+Join\s*\(\s*({IDENT})\s*,\s*$"
        ),
        IDENT = IDENT,
        ARGS = ARGS,
    ))
});

static FROM_PARENS_RE: Lazy<Regex> = Lazy::new(|| compile(r"\.from\s*\(\s*\w*$"));

static WHERE_PARENS_RE: Lazy<Regex> = Lazy::new(|| compile(r"(?:\.where|\band|\bor)\s*\(\s*$"));

static HELPER_RE: Lazy<Regex> = Lazy::new(|| compile(&format!(r"\b({HELPERS})\s*\(\s*$")));

/// Text of the statement the cursor is in (everything after the last `;`)
pub(crate) fn current_statement(text: &str) -> &str {
    match text.rfind(';') {
        Some(pos) => &text[pos + 1..],
        None => text,
    }
}

/// `db` or `tx` when the text ends with `db.`/`tx.` plus an optional partial word
pub fn get_db_name(text: &str) -> Option<DbName> {
    let caps = DB_NAME_RE.captures(text)?;
    match caps.get(1)?.as_str() {
        "tx" => Some(DbName::Tx),
        _ => Some(DbName::Db),
    }
}

/// Split a statement into the chains it nests, outermost first.
///
/// Closed argument lists are collapsed to `()`, so a subquery inside
/// `.where(...)` never leaks into the chain around it. Every scope except
/// the last ends with the open call that holds the next one.
fn chain_scopes(statement: &str) -> Vec<String> {
    let mut collapsed = String::with_capacity(statement.len());
    let mut open: Vec<usize> = Vec::new();

    for c in statement.chars() {
        match c {
            '(' => {
                open.push(collapsed.len());
                collapsed.push('(');
            }
            ')' => {
                if let Some(start) = open.pop() {
                    collapsed.truncate(start + 1);
                }
                collapsed.push(')');
            }
            _ => collapsed.push(c),
        }
    }

    let mut scopes = Vec::with_capacity(open.len() + 1);
    let mut start = 0;
    for paren in open {
        scopes.push(collapsed[start..=paren].to_string());
        start = paren + 1;
    }
    scopes.push(collapsed[start..].to_string());
    scopes
}

/// Mode of the chain in one scope. The chain starts at the first builder
/// verb, or at the first method call when there is none.
fn scope_mode(scope: &str) -> Option<ChainMode> {
    let root = VERB_RE.find(scope).or_else(|| FIRST_CALL_RE.find(scope))?;
    let chain = &scope[root.start()..];

    ChainMode::PRIORITY
        .into_iter()
        .find(|mode| mode.chain_regex().is_match(chain))
}

/// Detect which kind of query chain the cursor is in.
///
/// Only the current statement (text after the last `;`) is looked at. The
/// innermost open call that holds a chain wins, so the cursor inside a
/// subquery gets the subquery's mode while a subquery that is already
/// closed does not affect the outer chain. Modes are tried in
/// [`ChainMode::PRIORITY`] order, so `.delete(t).where(..)` is a delete
/// chain and a bare `.where(..)` fragment too.
pub fn get_chain_mode(text: &str) -> Option<ChainMode> {
    chain_scopes(current_statement(text))
        .iter()
        .rev()
        .find_map(|scope| scope_mode(scope))
}

pub fn get_table_match(text: &str) -> Option<TableMatch> {
    let caps = TABLE_RE.captures(text)?;
    Some(TableMatch {
        table: caps.get(1)?.as_str().to_string(),
        column: caps.get(2).map(|m| m.as_str().to_string()),
    })
}

pub fn get_column_match(text: &str) -> Option<ColumnMatch> {
    let caps = COLUMN_RE.captures(text)?;
    Some(ColumnMatch {
        table: caps.get(1)?.as_str().to_string(),
        column: caps.get(2)?.as_str().to_string(),
        partial: caps.get(3).map(|m| m.as_str().to_string()),
    })
}

pub fn get_value_match(text: &str) -> Option<ValueMatch> {
    let caps = VALUE_RE.captures(text)?;
    Some(ValueMatch {
        operator: caps.get(1)?.as_str().to_string(),
        table: caps.get(2)?.as_str().to_string(),
        column: caps.get(3)?.as_str().to_string(),
    })
}

pub fn get_join_match(text: &str) -> Option<JoinMatch> {
    let caps = JOIN_RE.captures(text)?;
    Some(JoinMatch {
        from_table: caps.get(1)?.as_str().to_string(),
        join_table: caps.get(2)?.as_str().to_string(),
    })
}

/// Open `.from(` with at most a partial table name typed
pub fn is_inside_from_parens(text: &str) -> bool {
    FROM_PARENS_RE.is_match(text)
}

/// Open `.where(`, `and(` or `or(` with nothing typed yet
pub fn is_inside_where_parens(text: &str) -> bool {
    WHERE_PARENS_RE.is_match(text)
}

pub fn get_helper_match(text: &str) -> Option<HelperMatch> {
    let caps = HELPER_RE.captures(text)?;
    Some(HelperMatch {
        name: caps.get(1)?.as_str().to_string(),
    })
}
