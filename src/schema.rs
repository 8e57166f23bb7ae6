use std::{fmt, fs::File, path::Path};

use anyhow::Context;
use indexmap::IndexMap;
use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};

use crate::common::{DbLoadError, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    /// Max length in characters.
    String(usize),
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("INT"),
            Self::String(max_length) => write!(f, "STRING({max_length})"),
        }
    }
}

/// Shape of the synthetic values generated for a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// 1-based row ordinal.
    RowId,
    /// Uniform integer, both ends inclusive.
    IntRange { min: i64, max: i64 },
    Letters { len: usize },
    Email { local_len: usize, host: String },
    /// Digit string without a leading zero.
    Digits { len: usize },
    OneOf(Vec<String>),
}

impl Domain {
    /// Longest literal (unquoted) the domain can produce. `None` for integer domains.
    #[must_use]
    pub fn max_text_len(&self) -> Option<usize> {
        match self {
            Self::RowId | Self::IntRange { .. } => None,
            Self::Letters { len } | Self::Digits { len } => Some(*len),
            Self::Email { local_len, host } => Some(local_len + 1 + host.chars().count()),
            Self::OneOf(options) => options.iter().map(|o| o.chars().count()).max(),
        }
    }

    const fn is_integer(&self) -> bool {
        matches!(self, Self::RowId | Self::IntRange { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub column_type: ColumnType,
    #[serde(default)]
    pub nullable: bool,
    pub domain: Domain,
}

impl ColumnSpec {
    #[must_use]
    pub const fn not_null(column_type: ColumnType, domain: Domain) -> Self {
        Self {
            column_type,
            nullable: false,
            domain,
        }
    }

    #[must_use]
    pub const fn nullable(column_type: ColumnType, domain: Domain) -> Self {
        Self {
            column_type,
            nullable: true,
            domain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    /// Column order is the order of values in every insert.
    #[serde(deserialize_with = "deserialize_unique_columns")]
    pub columns: IndexMap<String, ColumnSpec>,
}

/// Like the `IndexMap` impl, but a repeated column name is an error instead of overwriting.
fn deserialize_unique_columns<'de, D>(
    deserializer: D,
) -> Result<IndexMap<String, ColumnSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ColumnsVisitor;

    impl<'de> Visitor<'de> for ColumnsVisitor {
        type Value = IndexMap<String, ColumnSpec>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of column names to column specs")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut columns = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, column)) = access.next_entry::<String, ColumnSpec>()? {
                if columns.contains_key(&name) {
                    return Err(de::Error::custom(format!("duplicate column {name}")));
                }
                columns.insert(name, column);
            }
            Ok(columns)
        }
    }

    deserializer.deserialize_map(ColumnsVisitor)
}

impl TableSchema {
    /// The reference `users` table.
    #[must_use]
    pub fn users() -> Self {
        Self {
            name: "users".into(),
            columns: IndexMap::from([
                (
                    "id".into(),
                    ColumnSpec::not_null(ColumnType::Int, Domain::RowId),
                ),
                (
                    "username".into(),
                    ColumnSpec::not_null(ColumnType::String(100), Domain::Letters { len: 8 }),
                ),
                (
                    "age".into(),
                    ColumnSpec::nullable(ColumnType::Int, Domain::IntRange { min: 18, max: 100 }),
                ),
                (
                    "email".into(),
                    ColumnSpec::not_null(
                        ColumnType::String(100),
                        Domain::Email {
                            local_len: 5,
                            host: "example.com".into(),
                        },
                    ),
                ),
                (
                    "phone".into(),
                    ColumnSpec::nullable(ColumnType::String(20), Domain::Digits { len: 10 }),
                ),
                (
                    "city".into(),
                    ColumnSpec::not_null(ColumnType::String(50), Domain::Letters { len: 6 }),
                ),
                (
                    "state".into(),
                    ColumnSpec::nullable(ColumnType::String(50), Domain::Letters { len: 6 }),
                ),
                (
                    "zip_code".into(),
                    ColumnSpec::nullable(
                        ColumnType::Int,
                        Domain::IntRange {
                            min: 10_000,
                            max: 99_999,
                        },
                    ),
                ),
                (
                    "account_balance".into(),
                    ColumnSpec::nullable(
                        ColumnType::Int,
                        Domain::IntRange {
                            min: 0,
                            max: 10_000,
                        },
                    ),
                ),
                (
                    "membership".into(),
                    ColumnSpec::not_null(
                        ColumnType::String(20),
                        Domain::OneOf(vec!["Basic".into(), "Premium".into(), "VIP".into()]),
                    ),
                ),
            ]),
        }
    }

    /// # Errors
    ///
    /// On file operations, malformed JSON, a column name given twice, or a schema failing
    /// [`TableSchema::validate`].
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let schema_file = File::open(path)
            .with_context(|| format!("Failed to open schema file {}", path.display()))?;
        let schema: Self = serde_json::from_reader(schema_file).context("Failed parsing schema")?;
        schema.validate()?;
        Ok(schema)
    }

    /// # Errors
    ///
    /// When the table has no name or columns, a column domain does not fit its type, or the
    /// row id column is nullable. Integer ranges must not go below zero.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |message: String| -> Error { DbLoadError::InvalidSchema(message).into() };

        if self.name.is_empty() {
            return Err(invalid("table name is empty".into()));
        }
        if self.columns.is_empty() {
            return Err(invalid(format!("table {} has no columns", self.name)));
        }

        for (column_name, column) in &self.columns {
            if column_name.is_empty() {
                return Err(invalid("column name is empty".into()));
            }

            match (&column.column_type, &column.domain) {
                (ColumnType::Int, Domain::IntRange { min, max }) if min > max => {
                    return Err(invalid(format!("{column_name}: range {min}..={max} is empty")));
                }
                (ColumnType::Int, Domain::IntRange { min, .. }) if *min < 0 => {
                    return Err(invalid(format!("{column_name}: range starts below zero")));
                }
                (_, Domain::RowId) if column.nullable => {
                    return Err(invalid(format!(
                        "{column_name}: row id column cannot be nullable"
                    )));
                }
                (ColumnType::Int, domain) if !domain.is_integer() => {
                    return Err(invalid(format!(
                        "{column_name}: INT column needs an integer domain"
                    )));
                }
                (ColumnType::String(_), domain) if domain.is_integer() => {
                    return Err(invalid(format!(
                        "{column_name}: STRING column needs a text domain"
                    )));
                }
                _ => {}
            }

            match &column.domain {
                Domain::OneOf(options) if options.is_empty() => {
                    return Err(invalid(format!("{column_name}: empty option list")));
                }
                Domain::OneOf(options) if options.iter().any(|o| o.contains('\'')) => {
                    return Err(invalid(format!("{column_name}: option contains a quote")));
                }
                Domain::Email { host, .. } if host.contains('\'') => {
                    return Err(invalid(format!("{column_name}: host contains a quote")));
                }
                Domain::Digits { len: 0 } => {
                    return Err(invalid(format!("{column_name}: zero length digits")));
                }
                _ => {}
            }

            if let (ColumnType::String(max_length), Some(len)) =
                (column.column_type, column.domain.max_text_len())
            {
                if len > max_length {
                    return Err(invalid(format!(
                        "{column_name}: values up to {len} chars exceed STRING({max_length})"
                    )));
                }
            }
        }

        Ok(())
    }
}
