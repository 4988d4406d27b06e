//! Type system for describe

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Semantic family of a column; drives plot kind and missing-value handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseKind {
    Int,
    Float,
    String,
    Date,
}

impl BaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseKind::Int => "integer",
            BaseKind::Float => "float",
            BaseKind::String => "string",
            BaseKind::Date => "date",
        }
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared column type, reduced to what plotting needs.
///
/// `base` is `None` for types outside the closed set (structs, maps, blobs,
/// booleans, ...). Such fields are still described, as histograms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredType {
    pub raw: String,
    pub base: Option<BaseKind>,
    pub is_array: bool,
    pub is_nullable: bool,
}

impl DeclaredType {
    pub fn plot_kind(&self) -> PlotKind {
        match self.base {
            Some(BaseKind::Float) => PlotKind::Quantile,
            _ => PlotKind::Histogram,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotKind {
    Histogram,
    Quantile,
    Xy,
}

impl PlotKind {
    /// Leading words of a synthesized title.
    pub fn label(&self) -> &'static str {
        match self {
            PlotKind::Histogram => "Histogram of",
            PlotKind::Quantile => "Quantile of",
            PlotKind::Xy => "XY plot of",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlotKind::Histogram => "histogram",
            PlotKind::Quantile => "quantile",
            PlotKind::Xy => "xy",
        })
    }
}

/// Column as reported by a store: name plus declared type text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub declared_type: String,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// A field ready for plotting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name as it appears in the source (`container.member` for nested arrays).
    pub name: String,
    /// Name used in predicates, file stems and titles (`container_member`).
    pub output_name: String,
    pub declared: DeclaredType,
    pub comment: Option<String>,
}

impl FieldDescriptor {
    pub fn plot_kind(&self) -> PlotKind {
        self.declared.plot_kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Html,
    Pdf,
    Webp,
    Svg,
    Eps,
    Emf,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 8] = [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::Html,
        ImageFormat::Pdf,
        ImageFormat::Webp,
        ImageFormat::Svg,
        ImageFormat::Eps,
        ImageFormat::Emf,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Html => "html",
            ImageFormat::Pdf => "pdf",
            ImageFormat::Webp => "webp",
            ImageFormat::Svg => "svg",
            ImageFormat::Eps => "eps",
            ImageFormat::Emf => "emf",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Parse a comma-separated list. Whitespace is ignored, order is kept
    /// and repeats are dropped.
    pub fn parse_list(list: &str) -> Result<Vec<ImageFormat>, ConfigError> {
        let mut formats = Vec::new();
        for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let format: ImageFormat = token.parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(formats)
    }
}

impl FromStr for ImageFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| ConfigError::UnknownImageFormat(s.to_string()))
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How an XY series is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Markers,
    Lines,
    LinesMarkers,
}

impl FromStr for LineStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m" => Ok(LineStyle::Markers),
            "l" => Ok(LineStyle::Lines),
            "lm" | "ml" => Ok(LineStyle::LinesMarkers),
            other => Err(ConfigError::UnknownLineStyle(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLimits {
    pub min: f64,
    pub max: f64,
}

impl FromStr for AxisLimits {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedLimits(s.to_string());
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [min, max] = parts.as_slice() else {
            return Err(malformed());
        };
        let min: f64 = min.parse().map_err(|_| malformed())?;
        let max: f64 = max.parse().map_err(|_| malformed())?;
        if !(min < max) {
            return Err(malformed());
        }
        Ok(AxisLimits { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_list_dedup_keeps_order() {
        let formats = ImageFormat::parse_list(" html, png ,html,svg").unwrap();
        assert_eq!(
            formats,
            vec![ImageFormat::Html, ImageFormat::Png, ImageFormat::Svg]
        );
    }

    #[test]
    fn test_image_list_rejects_unknown() {
        let err = ImageFormat::parse_list("png,gif").unwrap_err();
        assert_eq!(err, ConfigError::UnknownImageFormat("gif".to_string()));
    }

    #[test]
    fn test_empty_image_list() {
        assert!(ImageFormat::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_axis_limits() {
        let lims: AxisLimits = "0, 10.5".parse().unwrap();
        assert_eq!(lims, AxisLimits { min: 0.0, max: 10.5 });

        assert!("1".parse::<AxisLimits>().is_err());
        assert!("5,5".parse::<AxisLimits>().is_err());
        assert!("a,b".parse::<AxisLimits>().is_err());
    }

    #[test]
    fn test_line_style() {
        assert_eq!("m".parse::<LineStyle>().unwrap(), LineStyle::Markers);
        assert_eq!("lm".parse::<LineStyle>().unwrap(), LineStyle::LinesMarkers);
        assert!("dots".parse::<LineStyle>().is_err());
    }
}
