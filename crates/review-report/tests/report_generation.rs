mod support;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use review_report::charts::{render_bar, ChartOptions, Palette, SiteBranding};
use review_report::i18n::Catalog;
use review_report::report::{
    PerformancePeriod, QuestionnaireRow, ReportInputs, ResponseRow, ResponseStatus, SnapshotBuilder,
    UserRow,
};
use review_report::scoring::{AnswerValue, AnswersByLinkId, ItemType, QuestionItem, SectionDef};
use review_report::{generate_report, render_report, ReportOptions, ReportSnapshot};

const NOT_ENOUGH_DATA: &[u8] = b"(Not enough response data is available to generate charts yet.) Tj";

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 8, 30, 15)
        .single()
        .expect("valid timestamp")
}

fn questionnaire() -> QuestionnaireRow {
    QuestionnaireRow {
        id: 3,
        title: "Engineering Competency Review".to_string(),
        sections: vec![
            SectionDef { id: 1, title: "Craft".to_string() },
            SectionDef { id: 2, title: "Impact".to_string() },
            SectionDef { id: 3, title: "Leadership".to_string() },
        ],
        items: vec![
            QuestionItem::new(1, "craft", ItemType::Likert).in_section(1),
            QuestionItem::new(2, "impact", ItemType::Likert).in_section(2),
            QuestionItem::new(3, "lead", ItemType::Likert).in_section(3),
            QuestionItem::new(4, "note", ItemType::Display),
        ],
    }
}

fn response(id: i64, user_id: i64, score: i64, period: (i64, &str, u32)) -> ResponseRow {
    let answers: AnswersByLinkId = ["craft", "impact", "lead"]
        .iter()
        .map(|link_id| (link_id.to_string(), vec![AnswerValue::Integer(score)]))
        .collect();
    ResponseRow {
        id,
        questionnaire_id: 3,
        user_id,
        status: ResponseStatus::Submitted,
        submitted_at: Some(fixed_time()),
        period: Some(PerformancePeriod {
            id: period.0,
            label: period.1.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, period.2, 1),
        }),
        answers,
    }
}

fn inputs() -> ReportInputs {
    ReportInputs {
        questionnaires: vec![questionnaire()],
        responses: vec![
            response(1, 1, 4, (1, "2024 Q1", 1)),
            response(2, 2, 3, (1, "2024 Q1", 1)),
            response(3, 1, 5, (2, "2024 Q2", 4)),
        ],
        users: vec![
            UserRow { id: 1, name: "Dana Fox".to_string(), work_function: Some("Platform".to_string()) },
            UserRow { id: 2, name: "Lee Park".to_string(), work_function: None },
        ],
    }
}

fn options() -> ReportOptions {
    ReportOptions {
        generated_at: Some(fixed_time()),
        ..ReportOptions::default()
    }
}

#[test]
fn empty_bar_series_falls_back_to_text() {
    assert!(render_bar(&[], &Palette::default(), &ChartOptions::default()).is_none());

    let snapshot = ReportSnapshot::empty(fixed_time());
    let report = render_report(
        &snapshot,
        &SiteBranding::default(),
        None,
        &Catalog::new(),
        &options(),
    )
    .expect("report renders");

    let pdf = support::parse(&report.bytes);
    assert_eq!(pdf.page_objects().len(), report.page_count);
    assert!(support::contains(&pdf.page_contents(), NOT_ENOUGH_DATA));
    assert_eq!(report.filename, "analytics-report-20250401_083015.pdf");
}

#[test]
fn full_report_embeds_charts_and_logo() {
    let branding = SiteBranding {
        site_name: Some("Acme Corp".to_string()),
        primary_color: Some("#7a1f5c".to_string()),
        ..SiteBranding::default()
    };
    let report = generate_report(
        &inputs(),
        &branding,
        None,
        &Catalog::new(),
        &ReportOptions {
            include_details: true,
            ..options()
        },
    )
    .expect("report renders");

    let pdf = support::parse(&report.bytes);
    assert_eq!(pdf.page_objects().len(), report.page_count);
    let images = pdf
        .offsets
        .keys()
        .filter(|number| pdf.object_text(**number).contains("/Subtype /Image"))
        .count();
    // placeholder logo, two bar charts, two trend lines, three radars
    assert_eq!(images, 8);

    let contents = pdf.page_contents();
    assert!(!support::contains(&contents, NOT_ENOUGH_DATA));
    assert!(support::contains(&contents, b"(Dana Fox"));
    assert_eq!(report.filename, "analytics-report-q3-20250401_083015.pdf");
}

#[test]
fn disabled_charts_render_tables_only() {
    let report = generate_report(
        &inputs(),
        &SiteBranding::default(),
        None,
        &Catalog::new(),
        &ReportOptions {
            charts_enabled: false,
            ..options()
        },
    )
    .expect("report renders");

    let pdf = support::parse(&report.bytes);
    assert!(pdf
        .offsets
        .keys()
        .all(|number| !pdf.object_text(*number).contains("/Subtype /Image")));
    let contents = pdf.page_contents();
    assert!(support::contains(&contents, b"(Label"));
    assert!(support::contains(&contents, b"(Craft"));
}

#[test]
fn unknown_questionnaire_filter_falls_back_to_first() {
    let snapshot = SnapshotBuilder::new(&inputs())
        .generated_at(fixed_time())
        .build(Some(999), false);
    assert_eq!(snapshot.selected_questionnaire_id, Some(3));
    assert!(snapshot.user_breakdown.is_none());
}

#[test]
fn translated_labels_reach_the_document() {
    let catalog: Catalog = [
        ("Summary".to_string(), "Resumen".to_string()),
        ("Page {page} of {pages}".to_string(), "Pagina {page} de {pages}".to_string()),
    ]
    .into_iter()
    .collect();
    let report = generate_report(
        &inputs(),
        &SiteBranding::default(),
        None,
        &catalog,
        &ReportOptions {
            charts_enabled: false,
            ..options()
        },
    )
    .expect("report renders");

    let contents = support::parse(&report.bytes).page_contents();
    assert!(support::contains(&contents, b"(Resumen) Tj"));
    assert!(support::contains(&contents, b"(Pagina 1 de "));
}

#[test]
fn uploaded_logo_replaces_placeholder() {
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    let mut png = Vec::new();
    RgbImage::from_pixel(320, 80, Rgb([10, 90, 160]))
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .expect("png encodes");

    let report = generate_report(
        &ReportInputs::default(),
        &SiteBranding::default(),
        Some(&png),
        &Catalog::new(),
        &options(),
    )
    .expect("report renders");

    let pdf = support::parse(&report.bytes);
    let logo = pdf.object_text(6);
    assert!(logo.contains("/Width 320 /Height 80"));
}
