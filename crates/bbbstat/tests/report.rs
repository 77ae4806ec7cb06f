use bbbstat::report::render_summary;
use bbbstat_core::config::DisplayConfig;
use bbbstat_core::normalize::NormalizeConfig;
use bbbstat_core::{Dashboard, MeetingRecord};

#[test]
fn summary_lists_every_card_and_the_record_count() {
    let records = vec![
        MeetingRecord {
            date_time: Some("2020-03-15 10:00:00".into()),
            meeting_count: Some(3),
            listener_count: Some(11),
            participant_count: Some(42),
            video_count: Some(5),
            voice_participant_count: Some(7),
            ..MeetingRecord::default()
        },
        MeetingRecord {
            date_time: Some("2020-03-15 10:15:00".into()),
            meeting_count: Some(5),
            ..MeetingRecord::default()
        },
    ];
    let dashboard = Dashboard::build(&records, &NormalizeConfig::default(), DisplayConfig::default())
        .expect("dashboard");

    let output = render_summary(&dashboard);

    for header in ["Spalte", "Summe"] {
        assert!(output.contains(header), "{output}");
    }
    let lines: Vec<&str> = output.lines().collect();
    for (title, total) in [
        ("Meetings", "8"),
        ("Zuhörer", "11"),
        ("Teilnehmer", "42"),
        ("Video", "5"),
        ("Sprecher", "7"),
    ] {
        assert!(
            lines.iter().any(|line| line.contains(title) && line.contains(total)),
            "missing {title} = {total} in\n{output}"
        );
    }
    assert_eq!(lines.last().copied(), Some("2 records"));
}

#[test]
fn summary_of_an_empty_dataset_is_all_zero() {
    let dashboard = Dashboard::build(&[], &NormalizeConfig::default(), DisplayConfig::default())
        .expect("dashboard");
    let output = render_summary(&dashboard);
    assert!(output.contains("Meetings"));
    assert!(output.ends_with("0 records"));
}
