//! Extraction query synthesis.

use std::borrow::Cow;

use describe_model::{FieldDescriptor, Source};

fn is_plain(part: &str) -> bool {
    let mut chars = part.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A field name as it must appear in SQL. Plain and dotted names are left
/// alone; anything else, such as the `(fare * 2)` name of an unaliased
/// expression column, is double-quoted.
pub fn sql_ident(name: &str) -> Cow<'_, str> {
    if name.split('.').all(is_plain) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("\"{}\"", name.replace('"', "\"\"")))
    }
}

/// Query pulling one column of a table. Array columns are unnested so that
/// each element becomes a row.
pub fn table_query(table: &str, field: &FieldDescriptor) -> String {
    if field.declared.is_array {
        format!(
            "SELECT arrayJoin({}) AS {} FROM {}",
            sql_ident(&field.name),
            sql_ident(&field.output_name),
            table
        )
    } else {
        format!("SELECT {} FROM {}", sql_ident(&field.name), table)
    }
}

/// Query the statistics for `field` run against. A query source is used
/// verbatim.
pub fn extraction_query(source: &Source, field: &FieldDescriptor) -> String {
    match source {
        Source::Table(table) => table_query(table, field),
        Source::Query(query) => query.clone(),
    }
}
