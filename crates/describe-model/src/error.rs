use thiserror::Error;

use crate::BaseKind;

/// Problems with the requested run, detected before any I/O happens.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("cannot have both a query and a table")]
    BothSources,

    #[error("one of a query or a table must be given")]
    MissingSource,

    #[error("unknown image type: {0}")]
    UnknownImageFormat(String),

    #[error("malformed {kind} missing value: {value}")]
    MalformedSentinel { kind: BaseKind, value: String },

    #[error("xy plots require a query source")]
    XyRequiresQuery,

    #[error("xy plots need at least two fields, got {0:?}")]
    XyTooFewFields(String),

    #[error("unknown line type: {0} (expected m, l or lm)")]
    UnknownLineStyle(String),

    #[error("an output directory requires at least one image type")]
    OutDirWithoutFormats,

    #[error("cannot create a markdown index in the same run as image creation")]
    IndexWithTask,

    #[error("malformed axis limits {0:?}: need min,max with min < max")]
    MalformedLimits(String),

    #[error("the markdown index path is empty")]
    EmptyIndexPath,

    #[error("plot {0} must be at least one pixel")]
    ZeroSize(&'static str),
}
