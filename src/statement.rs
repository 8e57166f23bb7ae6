use std::fmt;

use crate::{schema::TableSchema, value::Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable,
    Insert,
    Select,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateTable => "CREATE TABLE",
            Self::Insert => "INSERT",
            Self::Select => "SELECT",
        })
    }
}

/// One command string, submitted to the collaborator as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StatementKind,
    pub text: String,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub struct StatementBuilder<'a> {
    schema: &'a TableSchema,
}

impl<'a> StatementBuilder<'a> {
    #[must_use]
    pub const fn new(schema: &'a TableSchema) -> Self {
        Self { schema }
    }

    #[must_use]
    pub fn create_table(&self) -> Statement {
        let columns = self
            .schema
            .columns
            .iter()
            .map(|(name, column)| {
                if column.nullable {
                    format!("{name} {}", column.column_type)
                } else {
                    format!("{name} {} NOT NULL", column.column_type)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        Statement {
            kind: StatementKind::CreateTable,
            text: format!("CREATE TABLE {} ({columns});", self.schema.name),
        }
    }

    /// `row` must hold one value per column, in schema order.
    #[must_use]
    pub fn insert(&self, row: &[Value]) -> Statement {
        debug_assert_eq!(self.schema.columns.len(), row.len());

        let values = row
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        Statement {
            kind: StatementKind::Insert,
            text: format!("INSERT INTO {} VALUES ({values});", self.schema.name),
        }
    }

    #[must_use]
    pub fn select_all(&self) -> Statement {
        Statement {
            kind: StatementKind::Select,
            text: format!("SELECT * FROM {};", self.schema.name),
        }
    }
}
