use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::DisplayConfig;
use crate::figure::{
    self, Axis, Figure, Layout, Margin, Marker, MarkerColor, Trace, TraceKind, BAR_BASE,
    BAR_SELECTED,
};
use crate::record::{Column, ColumnSet};
use crate::table::TableRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub id: Column,
    pub figure: Figure,
}

/// Builds one bar chart per count column still present in the table.
///
/// `visible` is the table's filtered and sorted row set across all pages; an
/// unset or empty set falls back to `all_rows`. `selected` holds positions in
/// that row set as the table shows it. Rows are re-sorted by `date_time`
/// before charting and keep their selection through the sort.
pub fn column_charts(
    all_rows: &[TableRow],
    visible: Option<&[&TableRow]>,
    selected: &BTreeSet<usize>,
    columns: &ColumnSet,
    display: &DisplayConfig,
) -> Vec<BarChart> {
    let rows: Vec<&TableRow> = match visible {
        Some(visible) if !visible.is_empty() => visible.to_vec(),
        _ => all_rows.iter().collect(),
    };
    let mut marked: Vec<(&TableRow, bool)> = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| (row, selected.contains(&idx)))
        .collect();
    // Stable, nulls last.
    marked.sort_by_key(|(row, _)| (row.date_time.is_none(), row.date_time));

    let colors: Vec<&'static str> = marked
        .iter()
        .map(|(_, is_selected)| if *is_selected { BAR_SELECTED } else { BAR_BASE })
        .collect();
    let rows: Vec<&TableRow> = marked.into_iter().map(|(row, _)| row).collect();
    let x: Vec<Option<String>> = rows.iter().map(|row| row.formatted_date_time()).collect();

    Column::CHARTED
        .into_iter()
        .filter(|column| columns.contains(*column))
        .map(|column| BarChart {
            id: column,
            figure: bar_figure(
                display.label(column),
                x.clone(),
                rows.iter().map(|row| row.count(column)).collect(),
                colors.clone(),
            ),
        })
        .collect()
}

fn bar_figure(
    label: &str,
    x: Vec<Option<String>>,
    y: Vec<Option<i64>>,
    colors: Vec<&'static str>,
) -> Figure {
    let mut layout = Layout::dark(500);
    layout.xaxis = Axis {
        title: None,
        automargin: Some(true),
    };
    layout.yaxis = Axis {
        title: figure::title(label),
        automargin: Some(true),
    };
    layout.margin = Some(Margin { t: 10, l: 10, r: 10 });

    Figure {
        data: vec![Trace {
            kind: TraceKind::Bar,
            x,
            y,
            mode: None,
            marker: Some(Marker {
                color: MarkerColor::PerPoint(colors),
            }),
        }],
        layout,
    }
}
