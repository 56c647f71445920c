use chrono::NaiveDate;
use framelord_core::{
    derive_markdown_preview, parse_timestamp, FrameScanDomain, FrameScanService, FrameScanStore,
    FrameScanValidationError, MarkdownPreview, NoteService, NoteServiceError, NoteSource,
    NoteStore, RecordScanRequest, WantService, WantServiceError, WantStatus, WantStore,
};
use serde_json::json;

fn scan(contacts: &[&str], score: u8, day: &str) -> RecordScanRequest {
    RecordScanRequest {
        contact_ids: contacts.iter().map(|c| c.to_string()).collect(),
        score,
        summary: format!("scan on {day}"),
        created_at: parse_timestamp(day),
        ..RecordScanRequest::default()
    }
}

#[test]
fn record_scan_rejects_out_of_range_score() {
    let store = FrameScanStore::new();
    let service = FrameScanService::new(&store);

    let err = service.record_scan(scan(&["c1"], 101, "2024-01-01")).unwrap_err();

    assert_eq!(err, FrameScanValidationError::ScoreOutOfRange(101));
    assert!(store.is_empty());
}

#[test]
fn record_scan_keeps_raw_result_and_normalizes_contacts() {
    let store = FrameScanStore::new();
    let service = FrameScanService::new(&store);

    let record = service
        .record_scan(RecordScanRequest {
            contact_ids: vec![" c1 ".to_string(), "c2".to_string(), "c1".to_string()],
            domain: FrameScanDomain::Image,
            score: 100,
            raw_result: json!({"axes": {"dominance": 0.7}}),
            ..RecordScanRequest::default()
        })
        .unwrap();

    assert_eq!(record.owner_refs, vec!["c1", "c2"]);
    assert_eq!(record.primary_owner(), Some("c1"));
    assert_eq!(record.payload.raw_result["axes"]["dominance"], 0.7);
    assert!(record.id.as_str().starts_with("fs_"));
}

#[test]
fn frame_scan_aggregates_per_contact() {
    let store = FrameScanStore::new();
    let service = FrameScanService::new(&store);
    service.record_scan(scan(&["c1"], 40, "2024-01-01")).unwrap();
    service.record_scan(scan(&["c1", "c2"], 80, "2024-01-03")).unwrap();
    service.record_scan(scan(&["c2"], 30, "2024-01-02")).unwrap();
    service
        .record_scan(RecordScanRequest {
            domain: FrameScanDomain::Audio,
            ..scan(&[], 50, "2024-01-04")
        })
        .unwrap();

    assert_eq!(service.history_for_contact("c1").len(), 2);
    assert_eq!(service.latest_for_contact("c2").unwrap().payload.score, 80);
    assert!(service.latest_for_contact("nobody").is_none());
    assert_eq!(service.average_score(Some("c1")), Some(60.0));
    assert_eq!(service.average_score(None), Some(50.0));
    assert_eq!(service.average_score(Some("nobody")), None);

    let per_contact = service.reports_per_contact();
    assert_eq!(per_contact.get("c1"), Some(&2));
    assert_eq!(per_contact.get("c2"), Some(&2));
    assert_eq!(service.count_in_domain(FrameScanDomain::Audio), 1);
    assert_eq!(service.count_in_domain(FrameScanDomain::Text), 3);
}

#[test]
fn ai_output_becomes_note_with_title_and_preview() {
    let store = NoteStore::new();
    let service = NoteService::new(&store);

    let record = service
        .create_from_ai_output(
            "\n## Frame read\nThey lead with **certainty**.\n![chart](scan.png)",
            &["c1"],
        )
        .unwrap();

    assert_eq!(record.payload.title, "Frame read");
    assert_eq!(record.payload.source, NoteSource::AiConversion);
    assert_eq!(record.payload.preview_image.as_deref(), Some("scan.png"));
    assert_eq!(
        record.payload.preview_text.as_deref(),
        Some("Frame read They lead with certainty.")
    );
    assert_eq!(service.notes_for_owner("c1").len(), 1);
}

#[test]
fn blank_ai_output_is_rejected() {
    let store = NoteStore::new();
    let service = NoteService::new(&store);

    assert_eq!(
        service.create_from_ai_output("  \n ", &[]).unwrap_err(),
        NoteServiceError::EmptyContent
    );
    assert_eq!(
        service.create_note(" ", "", &[]).unwrap_err(),
        NoteServiceError::EmptyContent
    );
    assert!(store.is_empty());
}

#[test]
fn update_content_recomputes_preview() {
    let store = NoteStore::new();
    let service = NoteService::new(&store);
    let note = service
        .create_note("Draft", "![a](old.png) old", &[])
        .unwrap();

    let updated = service.update_content(note.id.as_str(), "plain now").unwrap();

    assert_eq!(updated.payload.preview_image, None);
    assert_eq!(updated.payload.preview_text.as_deref(), Some("plain now"));
    assert_eq!(updated.payload.title, "Draft");
    assert_eq!(
        service.update_content("note_missing", "x").unwrap_err(),
        NoteServiceError::NoteNotFound("note_missing".to_string())
    );
}

#[test]
fn update_content_cannot_blank_an_untitled_note() {
    let store = NoteStore::new();
    let service = NoteService::new(&store);
    let note = service.create_note("", "body", &[]).unwrap();

    let err = service.update_content(note.id.as_str(), "   ").unwrap_err();

    assert_eq!(err, NoteServiceError::EmptyContent);
    let stored = store.get_by_id(note.id.as_str()).unwrap();
    assert_eq!(stored.payload.content, "body");
    assert!(stored.payload.validate().is_ok());
}

#[test]
fn titled_note_may_have_its_content_cleared() {
    let store = NoteStore::new();
    let service = NoteService::new(&store);
    let note = service.create_note("Keep", "body", &[]).unwrap();

    let updated = service.update_content(note.id.as_str(), "").unwrap();

    assert_eq!(updated.payload.content, "");
    assert_eq!(updated.payload.preview_text, None);
}

#[test]
fn markdown_preview_is_public() {
    let preview: MarkdownPreview = derive_markdown_preview("**bold** ![x](a.png)");
    assert_eq!(
        preview,
        MarkdownPreview {
            preview_text: Some("bold".to_string()),
            preview_image: Some("a.png".to_string()),
        }
    );
}

#[test]
fn tags_are_normalized_and_listable() {
    let store = NoteStore::new();
    let service = NoteService::new(&store);
    let first = service.create_note("One", "a", &[]).unwrap();
    let second = service.create_note("Two", "b", &[]).unwrap();

    service
        .set_tags(first.id.as_str(), &["Work", " work ", "Focus"])
        .unwrap();
    service.set_tags(second.id.as_str(), &["focus"]).unwrap();

    assert_eq!(
        store.get_by_id(first.id.as_str()).unwrap().payload.tags,
        vec!["focus", "work"]
    );
    assert_eq!(service.list_by_tag("FOCUS").len(), 2);
    assert_eq!(service.list_by_tag("work").len(), 1);
    assert!(service.list_by_tag("  ").is_empty());
    assert_eq!(service.list_tags(), vec!["focus", "work"]);

    assert_eq!(
        service.set_tags(first.id.as_str(), &["ok", " "]).unwrap_err(),
        NoteServiceError::InvalidTag(" ".to_string())
    );
}

#[test]
fn wants_track_status_and_overdue_dates() {
    let store = WantStore::new();
    let service = WantService::new(&store);
    let day = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();

    let late = service
        .create_want("  Close the deal ", &["c1"], Some(day("2024-01-10")))
        .unwrap();
    let done = service
        .create_want("Run daily", &[], Some(day("2024-01-05")))
        .unwrap();
    service.create_want("Someday", &["c1"], None).unwrap();

    assert_eq!(late.payload.title, "Close the deal");
    assert_eq!(late.payload.status, WantStatus::Active);

    service
        .set_status(done.id.as_str(), WantStatus::Achieved)
        .unwrap();

    assert_eq!(service.active_wants().len(), 2);
    let overdue = service.overdue(day("2024-02-01"));
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, late.id);
    assert!(service.overdue(day("2024-01-10")).is_empty());
    assert_eq!(service.wants_for_owner("c1").len(), 2);
}

#[test]
fn want_errors_are_reported() {
    let store = WantStore::new();
    let service = WantService::new(&store);

    assert!(matches!(
        service.create_want("   ", &[], None),
        Err(WantServiceError::Validation(_))
    ));
    assert_eq!(
        service
            .set_status("want_missing", WantStatus::Abandoned)
            .unwrap_err(),
        WantServiceError::WantNotFound("want_missing".to_string())
    );
}
