//! Plotly-compatible figure JSON. The browser hands these straight to
//! `Plotly.react`, so field names follow plotly.js rather than Rust style.

use serde::Serialize;

pub const FONT_GREY: &str = "#818181";
pub const PLOT_BACKGROUND: &str = "#171717";
pub const BAR_BASE: &str = "#0074D9";
pub const BAR_SELECTED: &str = "#7FDBFF";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub x: Vec<Option<String>>,
    pub y: Vec<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: MarkerColor,
}

/// Plotly accepts either one colour for the whole trace or one per point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Uniform(&'static str),
    PerPoint(Vec<&'static str>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Text>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automargin: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub t: u32,
    pub l: u32,
    pub r: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Text>,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<&'static str>,
    pub font: Font,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
}

impl Layout {
    /// Dark layout shared by every chart on the page.
    pub fn dark(height: u32) -> Self {
        Self {
            title: None,
            xaxis: Axis::default(),
            yaxis: Axis::default(),
            height,
            margin: None,
            hovermode: None,
            font: Font { color: FONT_GREY },
            plot_bgcolor: PLOT_BACKGROUND,
            paper_bgcolor: PLOT_BACKGROUND,
        }
    }
}

pub fn title(text: impl Into<String>) -> Option<Text> {
    Some(Text { text: text.into() })
}
