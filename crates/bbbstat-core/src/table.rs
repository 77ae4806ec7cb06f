use std::cmp::Ordering;

use chrono::NaiveDateTime;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::DisplayConfig;
use crate::error::{DashboardError, Result};
use crate::normalize::naive_from_micros;
use crate::record::{
    Column, ColumnSet, DATE_TIME, LISTENER_COUNT, MEETING_COUNT, PARTICIPANT_COUNT, VIDEO_COUNT,
    VOICE_PARTICIPANT_COUNT,
};

pub const TABLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M %a";

/// One row of the chronological view, detached from the frame so the table
/// can filter and sort without touching polars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub date_time: Option<NaiveDateTime>,
    pub meeting_count: Option<i64>,
    pub listener_count: Option<i64>,
    pub participant_count: Option<i64>,
    pub video_count: Option<i64>,
    pub voice_participant_count: Option<i64>,
}

impl TableRow {
    pub fn from_frame(frame: &DataFrame) -> Result<Vec<TableRow>> {
        let timestamps = frame.column(DATE_TIME)?.datetime()?;
        let meetings = frame.column(MEETING_COUNT)?.i64()?;
        let listeners = frame.column(LISTENER_COUNT)?.i64()?;
        let participants = frame.column(PARTICIPANT_COUNT)?.i64()?;
        let videos = frame.column(VIDEO_COUNT)?.i64()?;
        let speakers = frame.column(VOICE_PARTICIPANT_COUNT)?.i64()?;

        (0..frame.height())
            .map(|idx| -> Result<TableRow> {
                let date_time = match timestamps.get(idx) {
                    Some(micros) => Some(naive_from_micros(micros).ok_or_else(|| {
                        DashboardError::Processing(format!("timestamp {micros} out of range"))
                    })?),
                    None => None,
                };
                Ok(TableRow {
                    date_time,
                    meeting_count: meetings.get(idx),
                    listener_count: listeners.get(idx),
                    participant_count: participants.get(idx),
                    video_count: videos.get(idx),
                    voice_participant_count: speakers.get(idx),
                })
            })
            .collect()
    }

    pub fn count(&self, column: Column) -> Option<i64> {
        match column {
            Column::DateTime => None,
            Column::MeetingCount => self.meeting_count,
            Column::ListenerCount => self.listener_count,
            Column::ParticipantCount => self.participant_count,
            Column::VideoCount => self.video_count,
            Column::VoiceParticipantCount => self.voice_participant_count,
        }
    }

    pub fn formatted_date_time(&self) -> Option<String> {
        self.date_time
            .map(|ts| ts.format(TABLE_TIMESTAMP_FORMAT).to_string())
    }

    /// JSON object keyed by column id, limited to the present columns.
    pub fn to_json(&self, columns: &ColumnSet) -> Map<String, Value> {
        columns
            .iter()
            .map(|column| {
                let value = match column {
                    Column::DateTime => self.formatted_date_time().map(Value::from),
                    count => self.count(count).map(Value::from),
                };
                (column.id().to_string(), value.unwrap_or(Value::Null))
            })
            .collect()
    }

    fn compare(&self, other: &TableRow, column: Column) -> Option<Ordering> {
        match column {
            Column::DateTime => compare_present(self.date_time, other.date_time),
            count => compare_present(self.count(count), other.count(count)),
        }
    }
}

/// `None` means at least one side is null; callers place nulls last.
fn compare_present<T: Ord>(left: Option<T>, right: Option<T>) -> Option<Ordering> {
    match (left, right) {
        (Some(left), Some(right)) => Some(left.cmp(&right)),
        _ => None,
    }
}

fn nulls_last<T>(left: &Option<T>, right: &Option<T>) -> Ordering {
    left.is_none().cmp(&right.is_none())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: Column,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    pub column: Column,
    pub query: String,
}

/// Everything the browser table sends when its filter, sort, page or column
/// set changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableQuery {
    pub filters: Vec<FilterClause>,
    pub sort_by: Vec<SortKey>,
    pub deleted_columns: Vec<Column>,
    pub page: usize,
    pub page_size: Option<usize>,
}

impl TableQuery {
    pub fn columns(&self) -> ColumnSet {
        ColumnSet::without(&self.deleted_columns)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
}

const WORD_OPS: [(&str, FilterOp); 7] = [
    ("eq", FilterOp::Eq),
    ("ne", FilterOp::Ne),
    ("lt", FilterOp::Lt),
    ("le", FilterOp::Le),
    ("gt", FilterOp::Gt),
    ("ge", FilterOp::Ge),
    ("contains", FilterOp::Contains),
];

// Two-character operators first so `>=` is not read as `>`.
const SYMBOL_OPS: [(&str, FilterOp); 6] = [
    (">=", FilterOp::Ge),
    ("<=", FilterOp::Le),
    ("!=", FilterOp::Ne),
    (">", FilterOp::Gt),
    ("<", FilterOp::Lt),
    ("=", FilterOp::Eq),
];

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    column: Column,
    op: FilterOp,
    operand: Operand,
}

impl ColumnFilter {
    pub fn parse(column: Column, query: &str) -> Result<Self> {
        let invalid = |reason: String| DashboardError::InvalidFilter {
            column: column.id().to_string(),
            reason,
        };

        let query = query.trim();
        let (op, rest) = split_operator(query).unwrap_or_else(|| {
            let op = if column.is_count() {
                FilterOp::Eq
            } else {
                FilterOp::Contains
            };
            (op, query)
        });

        let raw = unquote(rest.trim());
        if raw.is_empty() {
            return Err(invalid(format!("missing operand in '{query}'")));
        }

        let operand = if column.is_count() && op != FilterOp::Contains {
            let number = raw
                .parse::<f64>()
                .map_err(|_| invalid(format!("'{raw}' is not a number")))?;
            Operand::Number(number)
        } else {
            Operand::Text(raw.to_string())
        };

        Ok(Self {
            column,
            op,
            operand,
        })
    }

    pub fn column(&self) -> Column {
        self.column
    }

    pub fn matches(&self, row: &TableRow) -> bool {
        match &self.operand {
            Operand::Number(expected) => match row.count(self.column) {
                Some(value) => compare_with(self.op, (value as f64).partial_cmp(expected)),
                None => false,
            },
            Operand::Text(expected) => {
                let actual = match self.column {
                    Column::DateTime => row.formatted_date_time(),
                    count => row.count(count).map(|value| value.to_string()),
                };
                match actual {
                    Some(actual) if self.op == FilterOp::Contains => actual.contains(expected.as_str()),
                    Some(actual) => compare_with(self.op, Some(actual.as_str().cmp(expected.as_str()))),
                    None => false,
                }
            }
        }
    }
}

fn split_operator(query: &str) -> Option<(FilterOp, &str)> {
    if let Some((word, rest)) = query.split_once(char::is_whitespace) {
        let word = word.to_ascii_lowercase();
        if let Some((_, op)) = WORD_OPS.iter().find(|(name, _)| *name == word) {
            return Some((*op, rest));
        }
    }

    SYMBOL_OPS
        .iter()
        .find_map(|(symbol, op)| query.strip_prefix(symbol).map(|rest| (*op, rest)))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn compare_with(op: FilterOp, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        FilterOp::Eq => ordering == Ordering::Equal,
        FilterOp::Ne => ordering != Ordering::Equal,
        FilterOp::Lt => ordering == Ordering::Less,
        FilterOp::Le => ordering != Ordering::Greater,
        FilterOp::Gt => ordering == Ordering::Greater,
        FilterOp::Ge => ordering != Ordering::Less,
        FilterOp::Contains => ordering == Ordering::Equal,
    }
}

/// Applies the query's filters and sort to `rows`, returning every matching
/// row across all pages (the table's "virtual data"). Filters and sort keys on
/// deleted columns are ignored.
pub fn virtual_rows<'a>(rows: &'a [TableRow], query: &TableQuery) -> Result<Vec<&'a TableRow>> {
    let columns = query.columns();
    let filters = query
        .filters
        .iter()
        .filter(|clause| columns.contains(clause.column) && !clause.query.trim().is_empty())
        .map(|clause| ColumnFilter::parse(clause.column, &clause.query))
        .collect::<Result<Vec<_>>>()?;

    let mut selected: Vec<&TableRow> = rows
        .iter()
        .filter(|row| filters.iter().all(|filter| filter.matches(row)))
        .collect();

    let keys: Vec<SortKey> = query
        .sort_by
        .iter()
        .copied()
        .filter(|key| columns.contains(key.column))
        .collect();
    sort_rows(&mut selected, &keys);

    Ok(selected)
}

/// Stable multi-key sort. Nulls sort last whatever the direction.
pub fn sort_rows(rows: &mut [&TableRow], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    rows.sort_by(|left, right| {
        keys.iter()
            .map(|key| match left.compare(right, key.column) {
                Some(ordering) if key.direction == SortDirection::Desc => ordering.reverse(),
                Some(ordering) => ordering,
                None => match key.column {
                    Column::DateTime => nulls_last(&left.date_time, &right.date_time),
                    count => nulls_last(&left.count(count), &right.count(count)),
                },
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHeader {
    pub id: Column,
    pub name: String,
    pub deletable: bool,
    pub selectable: bool,
}

pub fn column_headers(columns: &ColumnSet, display: &DisplayConfig) -> Vec<ColumnHeader> {
    columns
        .iter()
        .map(|column| ColumnHeader {
            id: column,
            name: display.label(column).to_string(),
            deletable: true,
            selectable: true,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<Map<String, Value>>,
    pub total_rows: usize,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
}

pub fn table_page(rows: &[TableRow], query: &TableQuery, display: &DisplayConfig) -> Result<TablePage> {
    let columns = query.columns();
    let matching = virtual_rows(rows, query)?;
    let page_size = query.page_size.filter(|size| *size > 0).unwrap_or(display.page_size);
    let page_count = matching.len().div_ceil(page_size);

    let page_rows = matching
        .iter()
        .skip(query.page.saturating_mul(page_size))
        .take(page_size)
        .map(|row| row.to_json(&columns))
        .collect();

    Ok(TablePage {
        columns: column_headers(&columns, display),
        rows: page_rows,
        total_rows: matching.len(),
        page: query.page,
        page_count,
        page_size,
    })
}
