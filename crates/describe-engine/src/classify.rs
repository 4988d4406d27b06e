//! Field type classification.
//!
//! Declared types come from ClickHouse-style (`Nullable(Array(Int32))`) and
//! DuckDB-style (`INTEGER[]`) stores. Wrappers are peeled off into flags and
//! the remaining type family is mapped onto the closed set of base kinds.

use describe_model::{BaseKind, ColumnDef, DeclaredType, FieldDescriptor};

use crate::EngineError;

/// Strip `Name(...)`, matching the name case-insensitively.
fn strip_wrapper<'a>(t: &'a str, name: &str) -> Option<&'a str> {
    let head = t.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    t[name.len()..]
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
}

/// Strip a trailing `[]` or `[N]`.
fn strip_list_suffix(t: &str) -> Option<&str> {
    let open = t.strip_suffix(']')?.rfind('[')?;
    Some(t[..open].trim_end())
}

fn base_kind(family: &str) -> Option<BaseKind> {
    let family = family
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_uppercase();

    match family.as_str() {
        "INTERVAL" => None,
        "TINYINT" | "SMALLINT" | "BIGINT" | "HUGEINT" | "UTINYINT" | "USMALLINT" | "UBIGINT"
        | "UHUGEINT" | "LONG" | "SHORT" => Some(BaseKind::Int),
        f if f.starts_with("INT") || f.starts_with("UINT") => Some(BaseKind::Int),
        "REAL" => Some(BaseKind::Float),
        f if f.starts_with("FLOAT") || f.starts_with("DOUBLE") => Some(BaseKind::Float),
        "STRING" | "FIXEDSTRING" | "VARCHAR" | "BPCHAR" | "TEXT" => Some(BaseKind::String),
        f if f.starts_with("CHAR") => Some(BaseKind::String),
        f if f.starts_with("DATE") || f.starts_with("TIMESTAMP") => Some(BaseKind::Date),
        _ => None,
    }
}

/// Classify a declared type string. Never fails: unknown families get no
/// base kind and are described as histograms.
pub fn classify(declared: &str) -> DeclaredType {
    let mut t = declared.trim();
    let mut is_array = false;
    let mut is_nullable = false;

    loop {
        if let Some(inner) = strip_wrapper(t, "Nullable") {
            is_nullable = true;
            t = inner;
        } else if let Some(inner) = strip_wrapper(t, "LowCardinality") {
            t = inner;
        } else if let Some(inner) =
            strip_wrapper(t, "Array").or_else(|| strip_wrapper(t, "List"))
        {
            is_array = true;
            t = inner;
        } else if let Some(inner) = strip_list_suffix(t) {
            is_array = true;
            t = inner;
        } else {
            break;
        }
    }

    DeclaredType {
        raw: declared.to_string(),
        base: base_kind(t),
        is_array,
        is_nullable,
    }
}

/// Output-facing name: an array member `container.member` becomes
/// `container_member`. Deeper nesting is rejected.
pub fn output_name(name: &str, declared: &DeclaredType) -> Result<String, EngineError> {
    if !declared.is_array {
        return Ok(name.to_string());
    }
    match name.split_once('.') {
        None => Ok(name.to_string()),
        Some((_, member)) if member.contains('.') => Err(EngineError::UnsupportedNesting {
            field: name.to_string(),
        }),
        Some((container, member)) => Ok(format!("{container}_{member}")),
    }
}

/// Describe a table column.
pub fn table_field(
    column: &ColumnDef,
    comment: Option<String>,
) -> Result<FieldDescriptor, EngineError> {
    let declared = classify(&column.declared_type);
    Ok(FieldDescriptor {
        name: column.name.clone(),
        output_name: output_name(&column.name, &declared)?,
        declared,
        comment: comment.filter(|c| !c.trim().is_empty()),
    })
}

/// Describe a column of query results. Names are used as-is since the
/// query is never rewritten.
pub fn query_field(column: &ColumnDef) -> FieldDescriptor {
    FieldDescriptor {
        name: column.name.clone(),
        output_name: column.name.clone(),
        declared: classify(&column.declared_type),
        comment: None,
    }
}
