use serde::{Deserialize, Serialize};

/// Paragraph justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// Character formatting carried by a single run.
///
/// A run is a maximal span of text sharing one formatting set; splitting and
/// merging runs is the serializer's concern, the model only records the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font size in half-points, following the wire format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
    /// Text color as RRGGBB hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub all_caps: bool,
}

/// Paragraph-level formatting (everything except the named style).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    /// Spacing before/after the paragraph, in twips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing_before: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing_after: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent_left: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent_first_line: Option<i32>,
}

/// Section properties. Carried on the document and preserved verbatim when a
/// redline is built from a base document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<u32>,
}
