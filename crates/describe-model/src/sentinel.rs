//! Missing-value sentinels, one optional value per base kind.

use chrono::NaiveDate;

use crate::{BaseKind, ConfigError};

/// A configured "missing" marker for one base kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SentinelValue {
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
}

impl SentinelValue {
    /// Render as a SQL literal.
    pub fn to_sql_literal(&self) -> String {
        match self {
            SentinelValue::Int(v) => v.to_string(),
            SentinelValue::Float(v) => v.to_string(),
            SentinelValue::Str(s) => format!("'{}'", s.replace('\'', "''")),
            SentinelValue::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        }
    }
}

/// Sentinels for each base kind; `None` disables filtering for that kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sentinels {
    pub int: Option<i64>,
    pub float: Option<f64>,
    pub string: Option<String>,
    pub date: Option<NaiveDate>,
}

impl Sentinels {
    /// Parse sentinel literals. Dates are accepted as `YYYYMMDD` or `YYYY-MM-DD`.
    pub fn parse(
        int: Option<&str>,
        float: Option<&str>,
        string: Option<&str>,
        date: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let int = int
            .map(|v| {
                v.trim().parse::<i64>().map_err(|_| ConfigError::MalformedSentinel {
                    kind: BaseKind::Int,
                    value: v.to_string(),
                })
            })
            .transpose()?;

        let float = float
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .ok_or_else(|| ConfigError::MalformedSentinel {
                        kind: BaseKind::Float,
                        value: v.to_string(),
                    })
            })
            .transpose()?;

        let date = date
            .map(|v| {
                let v = v.trim();
                NaiveDate::parse_from_str(v, "%Y%m%d")
                    .or_else(|_| NaiveDate::parse_from_str(v, "%Y-%m-%d"))
                    .map_err(|_| ConfigError::MalformedSentinel {
                        kind: BaseKind::Date,
                        value: v.to_string(),
                    })
            })
            .transpose()?;

        Ok(Self {
            int,
            float,
            string: string.map(str::to_string),
            date,
        })
    }

    pub fn for_kind(&self, kind: BaseKind) -> Option<SentinelValue> {
        match kind {
            BaseKind::Int => self.int.map(SentinelValue::Int),
            BaseKind::Float => self.float.map(SentinelValue::Float),
            BaseKind::String => self.string.clone().map(SentinelValue::Str),
            BaseKind::Date => self.date.map(SentinelValue::Date),
        }
    }
}
