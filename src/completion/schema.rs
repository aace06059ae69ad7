//! Schema snapshot supplied by the caller for candidate generation

use serde::{Deserialize, Serialize};

/// Column definition as known to the editor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub is_nullable: bool,
}

/// Table with its columns
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Find a table by name (case-insensitive)
    pub fn find<'a>(tables: &'a [TableSchema], name: &str) -> Option<&'a TableSchema> {
        tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"[{"name": "users", "columns": [{"name": "id"}]}, {"name": "posts"}]"#;
        let tables: Vec<TableSchema> = serde_json::from_str(json).unwrap();

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].columns[0].data_type, "");
        assert!(tables[1].columns.is_empty());
    }

    #[test]
    fn test_find_case_insensitive() {
        let tables = vec![TableSchema {
            name: "Users".into(),
            columns: vec![ColumnSchema {
                name: "Email".into(),
                data_type: "text".into(),
                is_nullable: false,
            }],
        }];

        let users = TableSchema::find(&tables, "users").unwrap();
        assert!(users.column("email").is_some());
        assert!(TableSchema::find(&tables, "posts").is_none());
    }
}
