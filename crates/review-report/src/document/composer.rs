use super::layout::{
    distribute_columns, estimate_text_width, logo_display_size, monospace_char_width, wrap_text,
    CONTENT_WIDTH, LOGO_MAX_HEIGHT, MARGIN, PAGE_HEIGHT, PAGE_WIDTH,
};
use super::model::{DocumentModel, DrawOp, FontKind, Page};
use crate::charts::{Color, RasterImage};
use crate::report::truncate_label;
use chrono::{DateTime, Utc};
use tracing::debug;

const TITLE_SIZE: f64 = 18.0;
const SUBTITLE_SIZE: f64 = 10.0;
const HEADING_SIZE: f64 = 15.0;
const SUBHEADING_SIZE: f64 = 12.0;
const BODY_SIZE: f64 = 10.0;
const TABLE_SIZE: f64 = 8.5;
const SIGNATURE_SIZE: f64 = 9.0;
const FOOTER_SIZE: f64 = 8.0;
const LINE_SPACING: f64 = 1.4;
const HEADER_GAP: f64 = 18.0;
const BLOCK_GAP: f64 = 10.0;
const COLUMN_GAP: usize = 2;
const SIGNATURE_COLUMNS: usize = 2;
const SIGNATURE_MIN_RULE: f64 = 90.0;
const SIGNATURE_GAP: f64 = 24.0;
const SIGNATURE_WRITING_SPACE: f64 = 28.0;
const FOOTER_BASELINE: f64 = 30.0;
/// The header never takes more than the top third of a page.
const HEADER_MAX_HEIGHT: f64 = PAGE_HEIGHT / 3.0 - MARGIN - HEADER_GAP;
const TITLE_LINE_HEIGHT: f64 = TITLE_SIZE * 1.25;
const SUBTITLE_LINE_HEIGHT: f64 = SUBTITLE_SIZE * LINE_SPACING;

pub const DEFAULT_FOOTER_TEMPLATE: &str = "Page {page} of {pages}";

/// Content repeated at the top of every page.
#[derive(Debug, Clone, Default)]
pub struct PageHeader {
    pub title: String,
    pub subtitle: Option<String>,
    pub logo: Option<RasterImage>,
}

#[derive(Debug, Clone)]
struct PlacedLogo {
    name: String,
    width: f64,
    height: f64,
}

/// Flows blocks of content down fixed-size pages.
///
/// Positions handed to callers (`cursor`, `content_top`) are measured in
/// points from the top edge of the page. Draw operations are stored in page
/// space with the origin at the bottom left.
pub struct DocumentComposer {
    model: DocumentModel,
    title_lines: Vec<String>,
    subtitle_lines: Vec<String>,
    logo: Option<PlacedLogo>,
    accent: Color,
    footer_template: String,
    content_top: f64,
    cursor: f64,
}

impl DocumentComposer {
    pub fn new(header: PageHeader, accent: Color, created_at: DateTime<Utc>) -> Self {
        let mut model = DocumentModel::new(created_at);
        if !header.title.trim().is_empty() {
            model.title = Some(header.title.clone());
        }

        let logo = header.logo.and_then(|raster| {
            let (mut width, mut height) = logo_display_size(raster.width, raster.height)?;
            // Very tall logos keep the minimum width in nominal sizing; the
            // placed copy is scaled down to the height cap instead.
            if height > LOGO_MAX_HEIGHT {
                width *= LOGO_MAX_HEIGHT / height;
                height = LOGO_MAX_HEIGHT;
            }
            let name = model.register_image(raster.bytes, raster.width, raster.height);
            Some(PlacedLogo { name, width, height })
        });

        let text_width = match &logo {
            Some(logo) => CONTENT_WIDTH - logo.width - 12.0,
            None => CONTENT_WIDTH,
        };
        let mut title_lines = wrap_text(&header.title, TITLE_SIZE, text_width);
        title_lines.truncate((HEADER_MAX_HEIGHT / TITLE_LINE_HEIGHT).floor() as usize);
        let title_height = title_lines.len() as f64 * TITLE_LINE_HEIGHT;
        let mut subtitle_lines = header
            .subtitle
            .as_deref()
            .map(|subtitle| wrap_text(subtitle, SUBTITLE_SIZE, text_width))
            .unwrap_or_default();
        subtitle_lines
            .truncate(((HEADER_MAX_HEIGHT - title_height) / SUBTITLE_LINE_HEIGHT).floor() as usize);

        let text_height = title_height + subtitle_lines.len() as f64 * SUBTITLE_LINE_HEIGHT;
        let logo_height = logo.as_ref().map_or(0.0, |logo| logo.height);
        let header_height = text_height.max(logo_height).min(HEADER_MAX_HEIGHT);
        let content_top = if header_height > 0.0 {
            MARGIN + header_height + HEADER_GAP
        } else {
            MARGIN
        };

        let mut composer = Self {
            model,
            title_lines,
            subtitle_lines,
            logo,
            accent,
            footer_template: DEFAULT_FOOTER_TEMPLATE.to_string(),
            content_top,
            cursor: content_top,
        };
        composer.start_page();
        composer
    }

    /// Footer text with `{page}` and `{pages}` placeholders.
    pub fn with_footer_template(mut self, template: impl Into<String>) -> Self {
        self.footer_template = template.into();
        self
    }

    pub fn page_count(&self) -> usize {
        self.model.pages.len()
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Where the cursor sits on a freshly started page.
    pub fn content_top(&self) -> f64 {
        self.content_top
    }

    pub fn content_bottom(&self) -> f64 {
        PAGE_HEIGHT - MARGIN
    }

    pub fn add_heading(&mut self, text: &str) {
        self.add_gap_unless_top(BLOCK_GAP);
        self.add_lines(text, HEADING_SIZE, FontKind::Bold, self.accent);
        self.advance(4.0);
    }

    pub fn add_subheading(&mut self, text: &str) {
        self.add_gap_unless_top(6.0);
        self.add_lines(text, SUBHEADING_SIZE, FontKind::Bold, Color::TEXT);
        self.advance(2.0);
    }

    pub fn add_paragraph(&mut self, text: &str) {
        self.add_lines(text, BODY_SIZE, FontKind::Regular, Color::TEXT);
        self.advance(6.0);
    }

    /// Moves the cursor down, starting a new page instead when the gap does
    /// not fit on the current one.
    pub fn add_spacer(&mut self, height: f64) {
        if height <= 0.0 {
            return;
        }
        if self.cursor + height > self.content_bottom() {
            self.start_page();
        } else {
            self.cursor += height;
        }
    }

    /// Monospaced table. Column widths come from `weights`; cells wider
    /// than their column are truncated. The header row is repeated after
    /// every page break.
    pub fn add_table(&mut self, headers: &[String], rows: &[Vec<String>], weights: &[f64]) {
        let columns = headers.len().max(rows.iter().map(Vec::len).max().unwrap_or(0));
        if columns == 0 {
            return;
        }

        let char_budget = (CONTENT_WIDTH / monospace_char_width(TABLE_SIZE)).floor() as usize;
        let cell_budget = char_budget.saturating_sub(COLUMN_GAP * (columns - 1));
        let weights: Vec<f64> = (0..columns)
            .map(|index| weights.get(index).copied().unwrap_or(1.0))
            .collect();
        let widths = distribute_columns(cell_budget, &weights);

        let header_line = format_row(headers, &widths);
        let separator = "-".repeat(widths.iter().sum::<usize>() + COLUMN_GAP * (columns - 1));
        let line_height = TABLE_SIZE * LINE_SPACING;

        self.add_gap_unless_top(4.0);
        self.ensure_space(line_height * 3.0);
        self.table_header(&header_line, &separator);

        for row in rows {
            let page_before = self.page_count();
            self.ensure_space(line_height);
            if self.page_count() != page_before {
                self.table_header(&header_line, &separator);
            }
            let line = format_row(row, &widths);
            self.put_line(&line, TABLE_SIZE, FontKind::Monospace, Color::TEXT, MARGIN);
        }
        self.advance(8.0);
    }

    /// Places an image scaled to `max_width` points (never wider than the
    /// content area), keeping its aspect ratio.
    pub fn add_image_block(&mut self, bytes: Vec<u8>, pixel_width: u32, pixel_height: u32, max_width: f64) {
        if bytes.is_empty() || pixel_width == 0 || pixel_height == 0 {
            debug!(pixel_width, pixel_height, "image block skipped: empty image");
            return;
        }

        let (pixel_w, pixel_h) = (pixel_width as f64, pixel_height as f64);
        let mut width = max_width.min(CONTENT_WIDTH).max(1.0);
        let mut height = width * pixel_h / pixel_w;
        let page_room = self.content_bottom() - self.content_top;
        if page_room <= 0.0 {
            debug!(page_room, "image block skipped: no room below header");
            return;
        }
        if height > page_room {
            height = page_room;
            width = height * pixel_w / pixel_h;
        }

        self.ensure_space(height);
        let name = self.model.register_image(bytes, pixel_width, pixel_height);
        let x = MARGIN + (CONTENT_WIDTH - width) / 2.0;
        let y = PAGE_HEIGHT - (self.cursor + height);
        self.push(DrawOp::Image {
            name,
            x,
            y,
            width,
            height,
        });
        self.cursor += height;
        self.advance(BLOCK_GAP);
    }

    pub fn add_raster(&mut self, image: RasterImage, max_width: f64) {
        self.add_image_block(image.bytes, image.width, image.height, max_width);
    }

    /// Signature lines laid out in rows of at least two columns: each label
    /// sits above a rule with room to sign in between. Rows with more labels
    /// than fit at the minimum rule width wrap onto further rows.
    pub fn add_signature_fields(&mut self, rows: &[Vec<String>]) {
        let label_height = SIGNATURE_SIZE * LINE_SPACING;
        let row_height = label_height + SIGNATURE_WRITING_SPACE + 8.0;
        let max_columns = ((CONTENT_WIDTH + SIGNATURE_GAP) / (SIGNATURE_MIN_RULE + SIGNATURE_GAP))
            .floor()
            .max(1.0) as usize;
        self.add_gap_unless_top(BLOCK_GAP);

        for row in rows.iter().flat_map(|row| row.chunks(max_columns)) {
            let columns = row.len().max(SIGNATURE_COLUMNS);
            let column_width =
                (CONTENT_WIDTH - SIGNATURE_GAP * (columns - 1) as f64) / columns as f64;
            let rule = column_width.max(SIGNATURE_MIN_RULE);

            self.ensure_space(row_height);
            let baseline = self.cursor + SIGNATURE_SIZE;
            let rule_y = PAGE_HEIGHT - (self.cursor + label_height + SIGNATURE_WRITING_SPACE);
            for (index, label) in row.iter().enumerate() {
                let x = MARGIN + index as f64 * (column_width + SIGNATURE_GAP);
                self.push(DrawOp::Text {
                    x,
                    y: PAGE_HEIGHT - baseline,
                    size: SIGNATURE_SIZE,
                    font: FontKind::Regular,
                    color: Color::TEXT,
                    text: label.clone(),
                });
                self.push(DrawOp::Line {
                    x1: x,
                    y1: rule_y,
                    x2: x + rule,
                    y2: rule_y,
                    width: 0.75,
                    color: Color::MUTED,
                });
            }
            self.cursor += row_height;
        }
    }

    /// Stamps page footers and hands back the finished model.
    pub fn finish(mut self) -> DocumentModel {
        let total = self.model.pages.len();
        let stamp = self.model.created_at.format("%Y-%m-%d %H:%M UTC").to_string();

        for (index, page) in self.model.pages.iter_mut().enumerate() {
            let label = self
                .footer_template
                .replace("{page}", &(index + 1).to_string())
                .replace("{pages}", &total.to_string());
            let width = estimate_text_width(&label, FOOTER_SIZE);
            page.ops.push(DrawOp::Line {
                x1: MARGIN,
                y1: FOOTER_BASELINE + 12.0,
                x2: PAGE_WIDTH - MARGIN,
                y2: FOOTER_BASELINE + 12.0,
                width: 0.5,
                color: Color::GRID,
            });
            page.ops.push(DrawOp::Text {
                x: MARGIN,
                y: FOOTER_BASELINE,
                size: FOOTER_SIZE,
                font: FontKind::Regular,
                color: Color::MUTED,
                text: stamp.clone(),
            });
            page.ops.push(DrawOp::Text {
                x: PAGE_WIDTH - MARGIN - width,
                y: FOOTER_BASELINE,
                size: FOOTER_SIZE,
                font: FontKind::Regular,
                color: Color::MUTED,
                text: label,
            });
        }

        debug!(pages = total, images = self.model.images.len(), "document composed");
        self.model
    }

    /// Trailing gap after a block, clamped to the bottom margin.
    fn advance(&mut self, gap: f64) {
        self.cursor = (self.cursor + gap).min(self.content_bottom());
    }

    fn add_gap_unless_top(&mut self, gap: f64) {
        if self.cursor > self.content_top {
            self.add_spacer(gap);
        }
    }

    fn add_lines(&mut self, text: &str, size: f64, font: FontKind, color: Color) {
        for line in wrap_text(text, size, CONTENT_WIDTH) {
            self.ensure_space(size * LINE_SPACING);
            self.put_line(&line, size, font, color, MARGIN);
        }
    }

    fn put_line(&mut self, text: &str, size: f64, font: FontKind, color: Color, x: f64) {
        let baseline = self.cursor + size;
        self.push(DrawOp::Text {
            x,
            y: PAGE_HEIGHT - baseline,
            size,
            font,
            color,
            text: text.to_string(),
        });
        self.cursor += size * LINE_SPACING;
    }

    fn table_header(&mut self, header_line: &str, separator: &str) {
        self.put_line(header_line, TABLE_SIZE, FontKind::Monospace, self.accent, MARGIN);
        self.put_line(separator, TABLE_SIZE, FontKind::Monospace, Color::MUTED, MARGIN);
    }

    /// Starts a new page when `height` does not fit below the cursor. A
    /// block taller than a whole page is placed at the top of a page anyway.
    fn ensure_space(&mut self, height: f64) {
        if self.cursor + height > self.content_bottom() && self.cursor > self.content_top {
            self.start_page();
        }
    }

    fn start_page(&mut self) {
        self.model.pages.push(Page::default());
        self.cursor = self.content_top;
        self.draw_header();
        if self.model.pages.len() > 1 {
            debug!(page = self.model.pages.len(), "page break");
        }
    }

    fn draw_header(&mut self) {
        let mut y = MARGIN;
        let title_lines = self.title_lines.clone();
        for line in title_lines {
            self.push(DrawOp::Text {
                x: MARGIN,
                y: PAGE_HEIGHT - (y + TITLE_SIZE),
                size: TITLE_SIZE,
                font: FontKind::Bold,
                color: self.accent,
                text: line,
            });
            y += TITLE_LINE_HEIGHT;
        }

        let subtitle_lines = self.subtitle_lines.clone();
        for line in subtitle_lines {
            self.push(DrawOp::Text {
                x: MARGIN,
                y: PAGE_HEIGHT - (y + SUBTITLE_SIZE),
                size: SUBTITLE_SIZE,
                font: FontKind::Regular,
                color: Color::MUTED,
                text: line,
            });
            y += SUBTITLE_LINE_HEIGHT;
        }

        if let Some(logo) = self.logo.clone() {
            self.push(DrawOp::Image {
                name: logo.name,
                x: PAGE_WIDTH - MARGIN - logo.width,
                y: PAGE_HEIGHT - (MARGIN + logo.height),
                width: logo.width,
                height: logo.height,
            });
        }

        if self.content_top > MARGIN {
            let rule_y = PAGE_HEIGHT - (self.content_top - HEADER_GAP / 2.0);
            self.push(DrawOp::Line {
                x1: MARGIN,
                y1: rule_y,
                x2: PAGE_WIDTH - MARGIN,
                y2: rule_y,
                width: 1.0,
                color: self.accent,
            });
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.model.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let gap = " ".repeat(COLUMN_GAP);
    widths
        .iter()
        .enumerate()
        .map(|(index, width)| {
            let cell = cells.get(index).map(|cell| cell.trim()).unwrap_or("");
            format!("{:<width$}", truncate_label(cell, *width), width = *width)
        })
        .collect::<Vec<_>>()
        .join(&gap)
        .trim_end()
        .to_string()
}
