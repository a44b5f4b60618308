mod support;

use chrono::{TimeZone, Utc};
use review_report::charts::{render_bar, Color, ChartOptions, Palette};
use review_report::document::{serialize, DocumentComposer, PageHeader};
use review_report::report::ChartPoint;

fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 30, 17, 45, 0)
        .single()
        .expect("valid timestamp")
}

fn composer() -> DocumentComposer {
    DocumentComposer::new(
        PageHeader {
            title: "Team review".to_string(),
            subtitle: Some("Quarterly summary".to_string()),
            logo: None,
        },
        Color::rgb(15, 42, 68),
        fixed_time(),
    )
}

fn assert_offsets_point_at_objects(bytes: &[u8]) -> support::ParsedPdf<'_> {
    let pdf = support::parse(bytes);
    for (number, offset) in &pdf.offsets {
        let marker = format!("{number} 0 obj");
        assert!(
            bytes[*offset..].starts_with(marker.as_bytes()),
            "offset for object {number} must point at its header"
        );
    }
    pdf
}

#[test]
fn single_page_document_is_well_formed() {
    let mut composer = composer();
    composer.add_heading("Overview");
    composer.add_paragraph("Everything went to plan this quarter.");
    let model = composer.finish();
    let bytes = serialize(&model).expect("document serializes");

    let pdf = assert_offsets_point_at_objects(&bytes);
    assert_eq!(pdf.page_objects().len(), 1);
    assert!(pdf.trailer.contains("/Root 1 0 R"));
    assert!(pdf.object_text(2).contains("/Count 1"));

    let contents = pdf.page_contents();
    assert!(support::contains(&contents, b"(Everything went to plan this quarter.) Tj"));
    assert!(support::contains(&contents, b"(Page 1 of 1) Tj"));
}

#[test]
fn multi_page_document_lists_every_page() {
    let mut composer = composer();
    let rows: Vec<Vec<String>> = (0..180)
        .map(|index| vec![format!("Participant {index}"), format!("{}%", index % 100)])
        .collect();
    composer.add_table(&["Name".to_string(), "Score".to_string()], &rows, &[3.0, 1.0]);
    let expected_pages = composer.page_count();
    assert!(expected_pages >= 3);

    let bytes = serialize(&composer.finish()).expect("document serializes");
    let pdf = assert_offsets_point_at_objects(&bytes);
    assert_eq!(pdf.page_objects().len(), expected_pages);
    assert!(pdf
        .object_text(2)
        .contains(&format!("/Count {expected_pages}")));

    let last = format!("(Page {expected_pages} of {expected_pages}) Tj");
    assert!(support::contains(&pdf.page_contents(), last.as_bytes()));
}

#[test]
fn embedded_chart_is_an_image_object() {
    let points = vec![
        ChartPoint::new("Engineering", 78.0, 6),
        ChartPoint::new("Sales", 64.5, 4),
    ];
    let chart = render_bar(&points, &Palette::default(), &ChartOptions::bar()).expect("chart renders");
    let (width, height) = (chart.width, chart.height);
    let payload_len = chart.bytes.len();

    let mut composer = composer();
    composer.add_raster(chart, 495.0);
    let bytes = serialize(&composer.finish()).expect("document serializes");
    let pdf = assert_offsets_point_at_objects(&bytes);

    let image = pdf.object_text(6);
    assert!(image.contains("/Subtype /Image"));
    assert!(image.contains(&format!("/Width {width} /Height {height}")));
    assert!(image.contains("/Filter /DCTDecode"));
    assert_eq!(pdf.stream(6).len(), payload_len);
    assert!(support::contains(&pdf.page_contents(), b"/Im1 Do"));
}

#[test]
fn adding_content_never_loses_pages() {
    let mut composer = composer();
    let top = composer.content_top();
    let mut pages = composer.page_count();

    for round in 0..60 {
        match round % 4 {
            0 => composer.add_heading(&format!("Section {round}")),
            1 => composer.add_paragraph(&"word ".repeat(120)),
            2 => composer.add_table(
                &["A".to_string(), "B".to_string()],
                &vec![vec!["1".to_string(), "2".to_string()]; 9],
                &[1.0, 1.0],
            ),
            _ => composer.add_image_block(vec![0xFF, 0xD8, 0xFF, 0xD9], 900, 900, 300.0),
        }
        assert!(composer.page_count() >= pages, "page count never decreases");
        pages = composer.page_count();
        assert_eq!(composer.content_top(), top);
        assert!(composer.cursor() >= top);
    }
}

#[test]
fn non_latin_text_is_replaced_not_dropped() {
    let mut composer = composer();
    composer.add_paragraph("Caf\u{e9} \u{2014} \u{65e5}\u{672c}");
    let bytes = serialize(&composer.finish()).expect("document serializes");
    let contents = support::parse(&bytes).page_contents();
    assert!(support::contains(&contents, b"(Caf\xe9 \x97 ??) Tj"));
}
