//! Missing-value predicates.

use std::fmt;

use describe_model::{BaseKind, DeclaredType, Sentinels};

use crate::sql_ident;

/// A SQL boolean fragment restricting rows, or nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate(Option<String>);

impl Predicate {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        if sql.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(sql))
        }
    }

    pub fn sql(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Conjunction; an empty side is the identity.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Predicate(Some(format!("{a} AND {b}"))),
            (a, b) => Predicate(a.or(b)),
        }
    }

    /// ` WHERE <sql>` or an empty string.
    pub fn where_clause(&self) -> String {
        match &self.0 {
            Some(sql) => format!(" WHERE {sql}"),
            None => String::new(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql().unwrap_or_default())
    }
}

/// Predicate excluding the sentinel configured for the field's base kind.
///
/// Integer, string and date sentinels are excluded by inequality; for
/// floats, only values strictly above the sentinel are kept.
pub fn missing_predicate(sentinels: &Sentinels, field: &str, declared: &DeclaredType) -> Predicate {
    let Some(kind) = declared.base else {
        return Predicate::none();
    };
    let Some(sentinel) = sentinels.for_kind(kind) else {
        return Predicate::none();
    };
    let op = match kind {
        BaseKind::Float => ">",
        BaseKind::Int | BaseKind::String | BaseKind::Date => "!=",
    };
    Predicate(Some(format!(
        "{} {op} {}",
        sql_ident(field),
        sentinel.to_sql_literal()
    )))
}
