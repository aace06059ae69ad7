//! Completion candidate generation
//!
//! Generates completion candidates based on chain context and schema snapshot.

use super::{ChainContext, ChainMode, CompletionItem, CompletionKind, DbName, TableSchema};

/// Builder methods available directly on `db`
const DB_METHODS: &[&str] = &[
    "select",
    "selectDistinct",
    "insert",
    "update",
    "delete",
    "query",
    "transaction",
    "execute",
    "with",
];

/// `tx` exposes the same builder plus `rollback`
const TX_METHODS: &[&str] = &["rollback"];

/// Helper functions offered where a condition is expected
const HELPER_FUNCTIONS: &[&str] = &[
    "eq",
    "ne",
    "gt",
    "gte",
    "lt",
    "lte",
    "and",
    "or",
    "not",
    "inArray",
    "notInArray",
    "like",
    "ilike",
    "between",
    "isNull",
    "isNotNull",
    "exists",
    "notExists",
];

/// Generate completion candidates for the given context
pub fn get_candidates(context: &ChainContext, schema: &[TableSchema]) -> Vec<CompletionItem> {
    let mut items = match context {
        ChainContext::DbRoot { name, .. } => {
            let mut items: Vec<CompletionItem> = DB_METHODS
                .iter()
                .map(|m| CompletionItem::new(*m, CompletionKind::Method))
                .collect();
            if *name == DbName::Tx {
                items.extend(
                    TX_METHODS
                        .iter()
                        .map(|m| CompletionItem::new(*m, CompletionKind::Method)),
                );
            }
            items
        }
        ChainContext::AfterChain { mode, .. } => chain_methods(*mode)
            .iter()
            .map(|m| CompletionItem::with_detail(*m, CompletionKind::Method, mode.as_str()))
            .collect(),
        ChainContext::FromArgument { .. } => table_items(schema),
        ChainContext::TableMember { table, .. } => TableSchema::find(schema, table)
            .map(column_items)
            .unwrap_or_default(),
        ChainContext::NestedColumn { .. } => {
            // Schema snapshot has no nested column types
            Vec::new()
        }
        ChainContext::WhereArgument => {
            let mut items = helper_items();
            items.extend(table_items(schema));
            items
        }
        ChainContext::HelperArgument { name } => match name.as_str() {
            "and" | "or" | "not" => {
                let mut items = helper_items();
                items.extend(table_items(schema));
                items
            }
            "exists" | "notExists" => {
                vec![CompletionItem::new("db.select()", CompletionKind::Snippet)]
            }
            _ => table_items(schema),
        },
        ChainContext::ValuePosition { operator, column, .. } => value_items(operator, column),
        ChainContext::JoinCondition { from_table, join_table } => {
            join_condition_items(schema, from_table, join_table)
        }
        ChainContext::General { .. } => {
            let mut items = vec![
                CompletionItem::new("db", CompletionKind::Keyword),
                CompletionItem::new("tx", CompletionKind::Keyword),
            ];
            items.extend(helper_items());
            items.extend(table_items(schema));
            items
        }
    };

    // Filter by prefix if provided
    let prefix = context.prefix();
    if !prefix.is_empty() {
        let prefix_lower = prefix.to_lowercase();
        items.retain(|item| item.label.to_lowercase().starts_with(&prefix_lower));
    }

    // Sort: columns first, then snippets, then methods, then the rest, each by label
    items.sort_by(|a, b| {
        kind_rank(a.kind)
            .cmp(&kind_rank(b.kind))
            .then_with(|| a.label.cmp(&b.label))
    });

    items
}

/// Methods that may follow a closed call in each chain
pub fn chain_methods(mode: ChainMode) -> &'static [&'static str] {
    match mode {
        ChainMode::Select => &[
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
        ChainMode::Insert => &["values", "onConflictDoUpdate", "onConflictDoNothing", "returning"],
        ChainMode::Update => &["set", "where", "returning"],
        ChainMode::Delete => &["where", "returning"],
    }
}

fn kind_rank(kind: CompletionKind) -> u8 {
    match kind {
        CompletionKind::Column => 0,
        CompletionKind::Snippet => 1,
        CompletionKind::Method => 2,
        CompletionKind::Keyword => 3,
        CompletionKind::Helper => 4,
        CompletionKind::Table => 5,
    }
}

fn helper_items() -> Vec<CompletionItem> {
    HELPER_FUNCTIONS
        .iter()
        .map(|h| CompletionItem::new(*h, CompletionKind::Helper))
        .collect()
}

fn table_items(schema: &[TableSchema]) -> Vec<CompletionItem> {
    schema
        .iter()
        .map(|t| CompletionItem::new(t.name.clone(), CompletionKind::Table))
        .collect()
}

fn column_items(table: &TableSchema) -> Vec<CompletionItem> {
    table
        .columns
        .iter()
        .map(|col| {
            let detail = format!(
                "{} ({})",
                col.data_type,
                if col.is_nullable { "NULL" } else { "NOT NULL" }
            );
            CompletionItem {
                label: col.name.clone(),
                kind: CompletionKind::Column,
                insert_text: col.name.clone(),
                detail: Some(detail),
            }
        })
        .collect()
}

fn value_items(operator: &str, column: &str) -> Vec<CompletionItem> {
    let mut items = vec![
        CompletionItem::with_detail(
            format!("placeholder('{column}')"),
            CompletionKind::Snippet,
            "prepared statement parameter",
        ),
        CompletionItem::new("sql``", CompletionKind::Snippet),
    ];
    if operator == "inArray" || operator == "notInArray" {
        items.push(CompletionItem::new("[]", CompletionKind::Snippet));
    }
    items
}

/// Suggest `eq(join.col, from.col)` for columns that look related
fn join_condition_items(
    schema: &[TableSchema],
    from_table: &str,
    join_table: &str,
) -> Vec<CompletionItem> {
    let (Some(from), Some(join)) = (
        TableSchema::find(schema, from_table),
        TableSchema::find(schema, join_table),
    ) else {
        return Vec::new();
    };

    let from_keys = foreign_key_names(&from.name);
    let join_keys = foreign_key_names(&join.name);

    let mut items = Vec::new();
    for jc in &join.columns {
        for fc in &from.columns {
            let same_name = jc.name == fc.name && !jc.name.eq_ignore_ascii_case("id");
            let join_refs_from = fc.name == "id" && from_keys.contains(&jc.name);
            let from_refs_join = jc.name == "id" && join_keys.contains(&fc.name);

            if same_name || join_refs_from || from_refs_join {
                let label = format!("eq({}.{}, {}.{})", join.name, jc.name, from.name, fc.name);
                items.push(CompletionItem::with_detail(
                    label,
                    CompletionKind::Snippet,
                    "join condition",
                ));
            }
        }
    }
    items
}

/// Column names commonly used to reference `table`: users -> user_id, userId
fn foreign_key_names(table: &str) -> Vec<String> {
    let singular = match table.strip_suffix('s') {
        Some(s) if !s.is_empty() => s,
        _ => table,
    };
    vec![format!("{singular}_id"), format!("{singular}Id")]
}
