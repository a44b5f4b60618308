//! End-to-end analytics report: snapshot, charts, layout and serialization.

use crate::charts::{
    decode_logo, placeholder_logo, render_bar, render_line, render_radar, resolve_palette,
    ChartOptions, Palette, RasterImage, SiteBranding, DEFAULT_JPEG_QUALITY, RADAR_MIN_AXES,
};
use crate::document::layout::CONTENT_WIDTH;
use crate::document::{serialize, DocumentComposer, PageHeader, SerializeError, DEFAULT_FOOTER_TEMPLATE};
use crate::i18n::Translate;
use crate::report::{ChartPoint, ReportInputs, ReportSnapshot, SectionBreakdown, SnapshotBuilder};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

pub const NOT_ENOUGH_DATA: &str = "Not enough response data is available to generate charts yet.";
const DEFAULT_SECTION_CHARTS: usize = 6;
const RADAR_DISPLAY_WIDTH: f64 = 340.0;

/// Caller-controlled switches for one report request.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// `false` renders every chart as its tabular fallback.
    pub charts_enabled: bool,
    pub jpeg_quality: u8,
    pub include_details: bool,
    pub questionnaire_filter: Option<i64>,
    /// Responses whose section breakdown is drawn; the rest are counted.
    pub max_section_charts: usize,
    /// Report timestamp; the current time when unset.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            charts_enabled: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            include_details: false,
            questionnaire_filter: None,
            max_section_charts: DEFAULT_SECTION_CHARTS,
            generated_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub page_count: usize,
}

/// `analytics-report[-q<id>]-YYYYMMDD_HHMMSS.pdf`
pub fn suggested_filename(questionnaire_id: Option<i64>, at: DateTime<Utc>) -> String {
    let stamp = at.format("%Y%m%d_%H%M%S");
    match questionnaire_id {
        Some(id) => format!("analytics-report-q{id}-{stamp}.pdf"),
        None => format!("analytics-report-{stamp}.pdf"),
    }
}

/// Builds the snapshot from raw rows and renders it.
pub fn generate_report(
    inputs: &ReportInputs,
    branding: &SiteBranding,
    logo: Option<&[u8]>,
    translator: &dyn Translate,
    options: &ReportOptions,
) -> Result<RenderedReport, SerializeError> {
    let snapshot = SnapshotBuilder::new(inputs)
        .with_translator(translator)
        .generated_at(options.generated_at.unwrap_or_else(Utc::now))
        .build(options.questionnaire_filter, options.include_details);
    render_report(&snapshot, branding, logo, translator, options)
}

/// Lays out and serializes an already built snapshot.
///
/// Chart and logo rendering failures degrade to tables or plain text; only a
/// serialization failure is returned as an error.
pub fn render_report(
    snapshot: &ReportSnapshot,
    branding: &SiteBranding,
    logo: Option<&[u8]>,
    translator: &dyn Translate,
    options: &ReportOptions,
) -> Result<RenderedReport, SerializeError> {
    let palette = resolve_palette(branding);
    let site_name = branding
        .site_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let generated_at = snapshot.generated_at;

    let logo = resolve_logo(logo, site_name, &palette, options);
    let subtitle = {
        let stamp = generated_at.format("%Y-%m-%d %H:%M UTC").to_string();
        let generated = format!("{} {}", translator.translate("Generated"), stamp);
        match site_name {
            Some(name) => format!("{name} \u{b7} {generated}"),
            None => generated,
        }
    };
    let header = PageHeader {
        title: translator.translate("Analytics report"),
        subtitle: Some(subtitle),
        logo,
    };

    let mut composer = DocumentComposer::new(header, palette.dark, generated_at)
        .with_footer_template(translator.translate(DEFAULT_FOOTER_TEMPLATE));
    let mut report = ReportWriter {
        composer: &mut composer,
        palette,
        translator,
        options,
    };

    report.summary(snapshot);
    report.charts(snapshot);
    report.rollups(snapshot);
    report.sections(snapshot);
    report.participants(snapshot);
    report.sign_off();

    let model = composer.finish();
    let page_count = model.pages.len();
    let bytes = serialize(&model)?;
    let filename = suggested_filename(snapshot.selected_questionnaire_id, generated_at);
    info!(%filename, pages = page_count, bytes = bytes.len(), "report rendered");

    Ok(RenderedReport {
        bytes,
        filename,
        page_count,
    })
}

fn resolve_logo(
    bytes: Option<&[u8]>,
    site_name: Option<&str>,
    palette: &Palette,
    options: &ReportOptions,
) -> Option<RasterImage> {
    if let Some(logo) = bytes.and_then(|bytes| decode_logo(bytes, options.jpeg_quality)) {
        return Some(logo);
    }
    if !options.charts_enabled {
        debug!("placeholder logo skipped: rendering disabled");
        return None;
    }
    placeholder_logo(site_name.unwrap_or_default(), palette, options.jpeg_quality)
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.1}%"),
        None => "n/a".to_string(),
    }
}

enum ChartKind {
    Bar,
    Line,
}

struct ReportWriter<'a> {
    composer: &'a mut DocumentComposer,
    palette: Palette,
    translator: &'a dyn Translate,
    options: &'a ReportOptions,
}

impl ReportWriter<'_> {
    fn t(&self, text: &str) -> String {
        self.translator.translate(text)
    }

    fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>, weights: &[f64]) {
        let headers: Vec<String> = headers.iter().map(|header| self.t(header)).collect();
        self.composer.add_table(&headers, &rows, weights);
    }

    fn summary(&mut self, snapshot: &ReportSnapshot) {
        let heading = self.t("Summary");
        self.composer.add_heading(&heading);

        let summary = &snapshot.summary;
        let rows = vec![
            vec![self.t("Questionnaires"), summary.questionnaires.to_string()],
            vec![self.t("Total responses"), summary.total_responses.to_string()],
            vec![self.t("Submitted responses"), summary.submitted_responses.to_string()],
            vec![self.t("Draft responses"), summary.draft_responses.to_string()],
            vec![self.t("Participants"), snapshot.total_participants.to_string()],
            vec![self.t("Average score"), percent(summary.average_score)],
        ];
        self.table(&["Metric", "Value"], rows, &[3.0, 1.0]);
    }

    fn charts(&mut self, snapshot: &ReportSnapshot) {
        let heading = self.t("Charts");
        self.composer.add_heading(&heading);
        if !snapshot.has_chart_data() {
            let message = self.t(NOT_ENOUGH_DATA);
            self.composer.add_paragraph(&message);
            return;
        }

        self.chart("Average score by questionnaire", &snapshot.questionnaire_chart, ChartKind::Bar);
        self.chart("Average score by work function", &snapshot.work_function_chart, ChartKind::Bar);
        self.chart("Score trend by period", &snapshot.period_chart, ChartKind::Line);

        if let Some(title) = &snapshot.selected_questionnaire_title {
            if !snapshot.period_chart_selected.is_empty() {
                let caption = format!("{}: {}", self.t("Score trend"), title);
                self.chart(&caption, &snapshot.period_chart_selected, ChartKind::Line);
            }
        }
    }

    fn chart(&mut self, caption: &str, points: &[ChartPoint], kind: ChartKind) {
        let caption = self.t(caption);
        self.composer.add_subheading(&caption);

        let options = ChartOptions::bar().with_quality(self.options.jpeg_quality);
        let image = if self.options.charts_enabled {
            match kind {
                ChartKind::Bar => render_bar(points, &self.palette, &options),
                ChartKind::Line => render_line(points, &self.palette, &options),
            }
        } else {
            None
        };

        match image {
            Some(image) => self.composer.add_raster(image, CONTENT_WIDTH),
            None if points.is_empty() => {
                let message = self.t(NOT_ENOUGH_DATA);
                self.composer.add_paragraph(&message);
            }
            None => {
                if self.options.charts_enabled {
                    warn!(%caption, "chart unavailable, using table fallback");
                }
                let rows = points
                    .iter()
                    .map(|point| {
                        vec![
                            point.label.clone(),
                            percent(Some(point.value)),
                            point.count.to_string(),
                        ]
                    })
                    .collect();
                self.table(&["Label", "Average", "Responses"], rows, &[3.0, 1.0, 1.0]);
            }
        }
    }

    fn rollups(&mut self, snapshot: &ReportSnapshot) {
        if !snapshot.questionnaires.is_empty() {
            let heading = self.t("Questionnaires");
            self.composer.add_heading(&heading);
            let rows = snapshot
                .questionnaires
                .iter()
                .map(|questionnaire| {
                    vec![
                        questionnaire.title.clone(),
                        questionnaire.responses.to_string(),
                        questionnaire.participants.to_string(),
                        percent(questionnaire.average_score),
                    ]
                })
                .collect();
            self.table(
                &["Questionnaire", "Responses", "Participants", "Average"],
                rows,
                &[3.0, 1.0, 1.0, 1.0],
            );
        }

        if !snapshot.work_functions.is_empty() {
            let heading = self.t("Work functions");
            self.composer.add_heading(&heading);
            let rows = snapshot
                .work_functions
                .iter()
                .map(|function| {
                    vec![
                        function.name.clone(),
                        function.participants.to_string(),
                        function.responses.to_string(),
                        percent(function.average_score),
                    ]
                })
                .collect();
            self.table(
                &["Work function", "Participants", "Responses", "Average"],
                rows,
                &[3.0, 1.0, 1.0, 1.0],
            );
        }
    }

    fn sections(&mut self, snapshot: &ReportSnapshot) {
        let Some(title) = &snapshot.selected_questionnaire_title else {
            return;
        };
        let heading = format!("{}: {}", self.t("Section breakdown"), title);
        self.composer.add_heading(&heading);

        if snapshot.section_breakdowns.is_empty() {
            let message = self.t("No section data is available for this questionnaire.");
            self.composer.add_paragraph(&message);
            return;
        }

        let shown = self.options.max_section_charts;
        for breakdown in snapshot.section_breakdowns.iter().take(shown) {
            self.section(breakdown);
        }

        let hidden = snapshot.section_breakdowns.len().saturating_sub(shown);
        if hidden > 0 {
            let message = format!("{} {}", hidden, self.t("further responses are not shown."));
            self.composer.add_paragraph(&message);
        }
    }

    fn section(&mut self, breakdown: &SectionBreakdown) {
        let caption = match &breakdown.period {
            Some(period) => format!("{} ({period})", breakdown.title),
            None => breakdown.title.clone(),
        };
        self.composer.add_subheading(&caption);

        let radar = if self.options.charts_enabled && breakdown.sections.len() >= RADAR_MIN_AXES {
            let options = ChartOptions::radar().with_quality(self.options.jpeg_quality);
            render_radar(&breakdown.sections, &self.palette, &options)
        } else {
            None
        };

        match radar {
            Some(image) => self.composer.add_raster(image, RADAR_DISPLAY_WIDTH),
            None => {
                let rows = breakdown
                    .sections
                    .iter()
                    .map(|section| vec![section.label.clone(), percent(Some(section.score))])
                    .collect();
                self.table(&["Section", "Score"], rows, &[3.0, 1.0]);
            }
        }
    }

    fn participants(&mut self, snapshot: &ReportSnapshot) {
        let Some(entries) = &snapshot.user_breakdown else {
            return;
        };
        let heading = self.t("Top participants");
        self.composer.add_heading(&heading);
        if entries.is_empty() {
            let message = self.t("No participant scores are available yet.");
            self.composer.add_paragraph(&message);
            return;
        }

        let unassigned = self.t("Unassigned");
        let rows = entries
            .iter()
            .map(|entry| {
                vec![
                    entry.name.clone(),
                    entry.work_function.clone().unwrap_or_else(|| unassigned.clone()),
                    entry.responses.to_string(),
                    percent(entry.average_score),
                ]
            })
            .collect();
        self.table(
            &["Participant", "Work function", "Responses", "Average"],
            rows,
            &[3.0, 2.0, 1.0, 1.0],
        );
    }

    fn sign_off(&mut self) {
        let heading = self.t("Sign-off");
        self.composer.add_heading(&heading);
        let rows = vec![
            vec![self.t("Prepared by"), self.t("Date")],
            vec![self.t("Reviewed by"), self.t("Date")],
        ];
        self.composer.add_signature_fields(&rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filenames_include_questionnaire_and_timestamp() {
        let at = Utc
            .with_ymd_and_hms(2025, 11, 2, 9, 5, 3)
            .single()
            .expect("valid timestamp");
        assert_eq!(suggested_filename(None, at), "analytics-report-20251102_090503.pdf");
        assert_eq!(
            suggested_filename(Some(42), at),
            "analytics-report-q42-20251102_090503.pdf"
        );
    }

    #[test]
    fn percentages_format_with_one_decimal() {
        assert_eq!(percent(Some(87.54)), "87.5%");
        assert_eq!(percent(None), "n/a");
    }
}
