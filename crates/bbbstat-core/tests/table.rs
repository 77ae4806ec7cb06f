use bbbstat_core::config::DisplayConfig;
use bbbstat_core::normalize::NormalizeConfig;
use bbbstat_core::table::{
    table_page, virtual_rows, FilterClause, SortDirection, SortKey, TableQuery, TableRow,
};
use bbbstat_core::{Column, DashboardError, Dataset, MeetingRecord};
use serde_json::json;

fn record(
    date_time: &str,
    meetings: i64,
    participants: i64,
    videos: Option<i64>,
) -> MeetingRecord {
    MeetingRecord {
        id: None,
        date_time: Some(date_time.to_string()),
        meeting_count: Some(meetings),
        listener_count: Some(0),
        participant_count: Some(participants),
        video_count: videos,
        voice_participant_count: Some(0),
    }
}

/// Chronological rows: Sun 15th, Mon 16th, Tue 17th, Wed 18th, then the
/// unparseable record.
fn dataset() -> Dataset {
    let records = vec![
        record("2020-03-15 10:00:00", 3, 12, Some(1)),
        record("2020-03-16 10:00:00", 1, 5, None),
        record("2020-03-17 10:00:00", 7, 30, Some(4)),
        record("garbage", 2, 11, Some(2)),
        record("2020-03-18 10:00:00", 3, 8, None),
    ];
    Dataset::build(&records, &NormalizeConfig::default()).expect("dataset")
}

fn filtered(column: Column, query: &str) -> TableQuery {
    TableQuery {
        filters: vec![FilterClause {
            column,
            query: query.to_string(),
        }],
        ..TableQuery::default()
    }
}

fn meetings(rows: &[&TableRow]) -> Vec<Option<i64>> {
    rows.iter().map(|row| row.meeting_count).collect()
}

#[test]
fn numeric_filters_compare_counts() {
    let dataset = dataset();

    let rows = virtual_rows(dataset.rows(), &filtered(Column::ParticipantCount, "> 10")).expect("filter");
    assert_eq!(meetings(&rows), vec![Some(3), Some(7), Some(2)]);

    let rows = virtual_rows(dataset.rows(), &filtered(Column::MeetingCount, "3")).expect("filter");
    assert_eq!(rows.len(), 2);

    let rows = virtual_rows(dataset.rows(), &filtered(Column::MeetingCount, "eq 3")).expect("filter");
    assert_eq!(rows.len(), 2);

    let rows = virtual_rows(dataset.rows(), &filtered(Column::ParticipantCount, "<=8")).expect("filter");
    assert_eq!(meetings(&rows), vec![Some(1), Some(3)]);

    let rows = virtual_rows(dataset.rows(), &filtered(Column::ParticipantCount, "contains 1")).expect("filter");
    assert_eq!(meetings(&rows), vec![Some(3), Some(2)]);
}

#[test]
fn null_values_never_match_a_filter() {
    let dataset = dataset();
    let rows = virtual_rows(dataset.rows(), &filtered(Column::VideoCount, "!= 100")).expect("filter");
    assert_eq!(rows.len(), 3);

    let rows = virtual_rows(dataset.rows(), &filtered(Column::DateTime, "2020-03-1")).expect("filter");
    assert_eq!(rows.len(), 4);
}

#[test]
fn date_filters_match_the_displayed_text() {
    let dataset = dataset();
    let rows = virtual_rows(dataset.rows(), &filtered(Column::DateTime, "Mon")).expect("filter");
    assert_eq!(meetings(&rows), vec![Some(1)]);
    assert_eq!(
        rows[0].formatted_date_time().as_deref(),
        Some("2020-03-16 12:00 Mon")
    );
}

#[test]
fn malformed_filter_is_a_client_error() {
    let dataset = dataset();
    let err = virtual_rows(dataset.rows(), &filtered(Column::MeetingCount, "> many")).expect_err("invalid");
    assert!(matches!(err, DashboardError::InvalidFilter { .. }));
    assert!(err.is_client_error());

    assert!(virtual_rows(dataset.rows(), &filtered(Column::MeetingCount, ">")).is_err());

    let blank = virtual_rows(dataset.rows(), &filtered(Column::MeetingCount, "   ")).expect("blank");
    assert_eq!(blank.len(), 5);
}

#[test]
fn sort_places_nulls_last_in_both_directions() {
    let dataset = dataset();

    let mut query = TableQuery {
        sort_by: vec![SortKey {
            column: Column::VideoCount,
            direction: SortDirection::Desc,
        }],
        ..TableQuery::default()
    };
    let rows = virtual_rows(dataset.rows(), &query).expect("sort");
    let videos: Vec<Option<i64>> = rows.iter().map(|row| row.video_count).collect();
    assert_eq!(videos, vec![Some(4), Some(2), Some(1), None, None]);
    // Ties among nulls keep chronological order.
    assert_eq!(rows[3].meeting_count, Some(1));
    assert_eq!(rows[4].meeting_count, Some(3));

    query.sort_by[0].direction = SortDirection::Asc;
    let rows = virtual_rows(dataset.rows(), &query).expect("sort");
    let videos: Vec<Option<i64>> = rows.iter().map(|row| row.video_count).collect();
    assert_eq!(videos, vec![Some(1), Some(2), Some(4), None, None]);
}

#[test]
fn later_sort_keys_break_ties() {
    let dataset = dataset();
    let query = TableQuery {
        sort_by: vec![
            SortKey {
                column: Column::MeetingCount,
                direction: SortDirection::Desc,
            },
            SortKey {
                column: Column::DateTime,
                direction: SortDirection::Desc,
            },
        ],
        ..TableQuery::default()
    };

    let rows = virtual_rows(dataset.rows(), &query).expect("sort");
    let participants: Vec<Option<i64>> = rows.iter().map(|row| row.participant_count).collect();
    assert_eq!(participants, vec![Some(30), Some(8), Some(12), Some(11), Some(5)]);
}

#[test]
fn deleted_columns_drop_their_filters_and_values() {
    let dataset = dataset();
    let mut query = filtered(Column::ParticipantCount, "> 10");
    query.deleted_columns = vec![Column::ParticipantCount];

    let rows = virtual_rows(dataset.rows(), &query).expect("filter");
    assert_eq!(rows.len(), 5);

    let page = table_page(dataset.rows(), &query, &DisplayConfig::default()).expect("page");
    let ids: Vec<Column> = page.columns.iter().map(|header| header.id).collect();
    assert_eq!(
        ids,
        vec![
            Column::DateTime,
            Column::MeetingCount,
            Column::ListenerCount,
            Column::VideoCount,
            Column::VoiceParticipantCount,
        ]
    );
    assert!(page.rows.iter().all(|row| !row.contains_key("participantCount")));
    assert!(page.columns.iter().all(|header| header.deletable && header.selectable));
}

#[test]
fn pages_split_the_virtual_rows() {
    let dataset = dataset();
    let display = DisplayConfig::default();
    let mut query = TableQuery {
        page_size: Some(2),
        page: 1,
        ..TableQuery::default()
    };

    let page = table_page(dataset.rows(), &query, &display).expect("page");
    assert_eq!(page.total_rows, 5);
    assert_eq!(page.page_count, 3);
    assert_eq!(page.page_size, 2);
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[0]["meetingCount"], json!(7));
    assert_eq!(page.rows[0]["date_time"], json!("2020-03-17 12:00 Tue"));

    query.page = 2;
    let last = table_page(dataset.rows(), &query, &display).expect("page");
    assert_eq!(last.rows.len(), 1);
    assert_eq!(last.rows[0]["date_time"], json!(null));

    query.page = 7;
    let past_end = table_page(dataset.rows(), &query, &display).expect("page");
    assert!(past_end.rows.is_empty());

    let default_size = table_page(dataset.rows(), &TableQuery::default(), &display).expect("page");
    assert_eq!(default_size.page_size, 10);
    assert_eq!(default_size.page_count, 1);
}

#[test]
fn query_deserializes_from_browser_json() {
    let query: TableQuery = serde_json::from_value(json!({
        "filters": [{ "column": "participantCount", "query": "> 10" }],
        "sort_by": [{ "column": "videoCount" }],
        "deleted_columns": ["listenerCount"],
    }))
    .expect("query");

    assert_eq!(query.page, 0);
    assert_eq!(query.page_size, None);
    assert_eq!(query.sort_by[0].direction, SortDirection::Asc);
    assert!(!query.columns().contains(Column::ListenerCount));

    let unknown = serde_json::from_value::<TableQuery>(json!({ "deleted_columns": ["nope"] }));
    assert!(unknown.is_err());
}
