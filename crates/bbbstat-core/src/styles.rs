use serde::Serialize;

use crate::record::Column;

pub const SELECTED_COLUMN_BACKGROUND: &str = "#D2F3FF";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnCondition {
    pub column_id: Column,
}

/// One `style_data_conditional` entry for the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleOverride {
    #[serde(rename = "if")]
    pub condition: ColumnCondition,
    pub background_color: &'static str,
}

/// Highlights each selected column once, in selection order. Ids that do not
/// name a table column are skipped.
pub fn column_highlights<S: AsRef<str>>(selected: &[S]) -> Vec<StyleOverride> {
    let mut seen: Vec<Column> = Vec::with_capacity(selected.len());
    for column in selected.iter().filter_map(|id| id.as_ref().parse::<Column>().ok()) {
        if !seen.contains(&column) {
            seen.push(column);
        }
    }

    seen.into_iter()
        .map(|column_id| StyleOverride {
            condition: ColumnCondition { column_id },
            background_color: SELECTED_COLUMN_BACKGROUND,
        })
        .collect()
}
