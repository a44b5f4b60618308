//! PDF 1.4 writer for a finished [`DocumentModel`].
//!
//! Object numbers are assigned in one forward pass: 1 is the catalog, 2 the
//! page tree, 3 to 5 the standard fonts, then one object per image, then a
//! content stream and page object pair per page, and finally the document
//! information dictionary. Objects are written in ascending order so the
//! cross-reference offsets are recorded while streaming.

use super::layout::{PAGE_HEIGHT, PAGE_WIDTH};
use super::model::{DocumentModel, DrawOp, FontKind, ImageResource, Page};
use crate::charts::Color;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use thiserror::Error;
use tracing::info;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FIRST_FONT_ID: usize = 3;
const FIRST_IMAGE_ID: usize = FIRST_FONT_ID + 3;
const PRODUCER: &str = "review-report";
const JPEG_START: [u8; 2] = [0xFF, 0xD8];
const JPEG_END: [u8; 2] = [0xFF, 0xD9];

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("document has no pages")]
    NoPages,
    #[error("page references unknown image `{name}`")]
    UnknownImage { name: String },
    #[error("image `{name}` is invalid: {reason}")]
    InvalidImage { name: String, reason: String },
    #[error("failed to write document bytes: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes the model to PDF bytes. Either the whole document is produced
/// or an error is returned; partial output never escapes.
pub fn serialize(model: &DocumentModel) -> Result<Vec<u8>, SerializeError> {
    if model.pages.is_empty() {
        return Err(SerializeError::NoPages);
    }

    let mut image_ids = HashMap::with_capacity(model.images.len());
    for (index, image) in model.images.iter().enumerate() {
        validate_image(image)?;
        image_ids.insert(image.name.as_str(), FIRST_IMAGE_ID + index);
    }

    let first_page_id = FIRST_IMAGE_ID + model.images.len();
    let content_id = |page: usize| first_page_id + page * 2;
    let page_id = |page: usize| first_page_id + page * 2 + 1;
    let info_id = first_page_id + model.pages.len() * 2;

    let mut writer = ObjectWriter::new()?;

    writer.object(
        CATALOG_ID,
        format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").as_bytes(),
    )?;

    let kids: Vec<String> = (0..model.pages.len())
        .map(|page| format!("{} 0 R", page_id(page)))
        .collect();
    writer.object(
        PAGES_ID,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            model.pages.len()
        )
        .as_bytes(),
    )?;

    for (offset, font) in FontKind::ordered().iter().enumerate() {
        writer.object(
            FIRST_FONT_ID + offset,
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            )
            .as_bytes(),
        )?;
    }

    for (index, image) in model.images.iter().enumerate() {
        let dictionary = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /{} /BitsPerComponent {} /Filter /DCTDecode",
            image.width,
            image.height,
            color_space(image.components),
            image.bits_per_component
        );
        writer.stream(FIRST_IMAGE_ID + index, &dictionary, &image.data)?;
    }

    for (index, page) in model.pages.iter().enumerate() {
        let content = content_stream(page)?;
        writer.stream(content_id(index), "", &content)?;

        let mut used = BTreeSet::new();
        for op in &page.ops {
            if let DrawOp::Image { name, .. } = op {
                let id = image_ids
                    .get(name.as_str())
                    .ok_or_else(|| SerializeError::UnknownImage { name: name.clone() })?;
                used.insert((name.as_str(), *id));
            }
        }

        let fonts: Vec<String> = FontKind::ordered()
            .iter()
            .enumerate()
            .map(|(offset, font)| format!("/{} {} 0 R", font.resource_name(), FIRST_FONT_ID + offset))
            .collect();
        let mut resources = format!("/Font << {} >>", fonts.join(" "));
        if !used.is_empty() {
            let objects: Vec<String> = used
                .iter()
                .map(|(name, id)| format!("/{name} {id} 0 R"))
                .collect();
            resources.push_str(&format!(" /XObject << {} >>", objects.join(" ")));
        }

        writer.object(
            page_id(index),
            format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {} {}] /Resources << {} >> /Contents {} 0 R >>",
                pdf_number(PAGE_WIDTH),
                pdf_number(PAGE_HEIGHT),
                resources,
                content_id(index)
            )
            .as_bytes(),
        )?;
    }

    let mut info = Vec::new();
    info.extend_from_slice(b"<< ");
    if let Some(title) = model.title.as_deref() {
        info.extend_from_slice(b"/Title ");
        write_string(&mut info, title);
        info.push(b' ');
    }
    info.extend_from_slice(b"/Producer ");
    write_string(&mut info, PRODUCER);
    write!(
        info,
        " /CreationDate (D:{}Z) >>",
        model.created_at.format("%Y%m%d%H%M%S")
    )?;
    writer.object(info_id, &info)?;

    let bytes = writer.finish(CATALOG_ID, info_id)?;
    info!(
        pages = model.pages.len(),
        images = model.images.len(),
        bytes = bytes.len(),
        "document serialized"
    );
    Ok(bytes)
}

struct ObjectWriter {
    buffer: Vec<u8>,
    offsets: Vec<usize>,
}

impl ObjectWriter {
    fn new() -> Result<Self, SerializeError> {
        let mut buffer = Vec::new();
        buffer.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;
        Ok(Self {
            buffer,
            offsets: Vec::new(),
        })
    }

    fn begin(&mut self, id: usize) -> Result<(), SerializeError> {
        debug_assert_eq!(id, self.offsets.len() + 1, "objects must be written in order");
        self.offsets.push(self.buffer.len());
        write!(self.buffer, "{id} 0 obj\n")?;
        Ok(())
    }

    fn object(&mut self, id: usize, body: &[u8]) -> Result<(), SerializeError> {
        self.begin(id)?;
        self.buffer.write_all(body)?;
        self.buffer.write_all(b"\nendobj\n")?;
        Ok(())
    }

    fn stream(&mut self, id: usize, dictionary: &str, data: &[u8]) -> Result<(), SerializeError> {
        self.begin(id)?;
        if dictionary.is_empty() {
            write!(self.buffer, "<< /Length {} >>\nstream\n", data.len())?;
        } else {
            write!(self.buffer, "<< {dictionary} /Length {} >>\nstream\n", data.len())?;
        }
        self.buffer.write_all(data)?;
        self.buffer.write_all(b"\nendstream\nendobj\n")?;
        Ok(())
    }

    fn finish(mut self, root: usize, info: usize) -> Result<Vec<u8>, SerializeError> {
        let xref_offset = self.buffer.len();
        let size = self.offsets.len() + 1;
        write!(self.buffer, "xref\n0 {size}\n")?;
        self.buffer.write_all(b"0000000000 65535 f \n")?;
        for offset in &self.offsets {
            write!(self.buffer, "{offset:010} 00000 n \n")?;
        }
        write!(
            self.buffer,
            "trailer\n<< /Size {size} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        )?;
        Ok(self.buffer)
    }
}

fn validate_image(image: &ImageResource) -> Result<(), SerializeError> {
    let invalid = |reason: &str| SerializeError::InvalidImage {
        name: image.name.clone(),
        reason: reason.to_string(),
    };

    if image.width == 0 || image.height == 0 {
        return Err(invalid("zero dimension"));
    }
    if image.data.is_empty() {
        return Err(invalid("empty payload"));
    }
    // Every image is written with /DCTDecode.
    if !image.data.starts_with(&JPEG_START) || !image.data.ends_with(&JPEG_END) {
        return Err(invalid("payload is not a baseline JPEG stream"));
    }
    if !matches!(image.components, 1 | 3 | 4) {
        return Err(invalid("unsupported colour component count"));
    }
    if image.bits_per_component != 8 {
        return Err(invalid("unsupported bit depth"));
    }
    Ok(())
}

fn color_space(components: u8) -> &'static str {
    match components {
        1 => "DeviceGray",
        4 => "DeviceCMYK",
        _ => "DeviceRGB",
    }
}

fn content_stream(page: &Page) -> Result<Vec<u8>, SerializeError> {
    let mut out = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                write!(
                    out,
                    "BT /{} {} Tf {} rg {} {} Td ",
                    font.resource_name(),
                    pdf_number(*size),
                    color_operands(*color),
                    pdf_number(*x),
                    pdf_number(*y)
                )?;
                write_string(&mut out, text);
                out.write_all(b" Tj ET\n")?;
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                write!(
                    out,
                    "q {} RG {} w {} {} m {} {} l S Q\n",
                    color_operands(*color),
                    pdf_number(*width),
                    pdf_number(*x1),
                    pdf_number(*y1),
                    pdf_number(*x2),
                    pdf_number(*y2)
                )?;
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                let paint = match (fill, stroke) {
                    (Some(_), Some(_)) => "B",
                    (Some(_), None) => "f",
                    (None, Some(_)) => "S",
                    (None, None) => continue,
                };
                out.write_all(b"q ")?;
                if let Some(fill) = fill {
                    write!(out, "{} rg ", color_operands(*fill))?;
                }
                if let Some(stroke) = stroke {
                    write!(out, "{} RG ", color_operands(*stroke))?;
                }
                write!(
                    out,
                    "{} {} {} {} re {paint} Q\n",
                    pdf_number(*x),
                    pdf_number(*y),
                    pdf_number(*width),
                    pdf_number(*height)
                )?;
            }
            DrawOp::Image {
                name,
                x,
                y,
                width,
                height,
            } => {
                write!(
                    out,
                    "q {} 0 0 {} {} {} cm /{name} Do Q\n",
                    pdf_number(*width),
                    pdf_number(*height),
                    pdf_number(*x),
                    pdf_number(*y)
                )?;
            }
        }
    }
    Ok(out)
}

fn color_operands(color: Color) -> String {
    let [r, g, b] = color.unit_components();
    format!("{} {} {}", pdf_number(r), pdf_number(g), pdf_number(b))
}

/// Shortest decimal form with at most three fractional digits.
pub fn pdf_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let formatted = format!("{value:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Maps a character to its WinAnsiEncoding byte; `?` when it has none.
pub fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7e}' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u8,
        '\t' => b' ',
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => b'?',
    }
}

/// Writes `text` as a literal string in WinAnsi bytes, escaping delimiters.
fn write_string(out: &mut Vec<u8>, text: &str) {
    out.push(b'(');
    for c in text.chars() {
        let byte = win_ansi_byte(c);
        if matches!(byte, b'\\' | b'(' | b')') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out.push(b')');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn model_with_pages(count: usize) -> DocumentModel {
        let mut model = DocumentModel::new(Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap());
        model.title = Some("Quarterly (draft)".to_string());
        for index in 0..count {
            model.pages.push(Page {
                ops: vec![DrawOp::Text {
                    x: 50.0,
                    y: 780.0,
                    size: 12.0,
                    font: FontKind::Regular,
                    color: Color::BLACK,
                    text: format!("Page {index}"),
                }],
            });
        }
        model
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(pdf_number(50.0), "50");
        assert_eq!(pdf_number(0.5), "0.5");
        assert_eq!(pdf_number(1.0 / 3.0), "0.333");
        assert_eq!(pdf_number(-0.0001), "0");
        assert_eq!(pdf_number(f64::NAN), "0");
    }

    #[test]
    fn strings_are_escaped_and_transcoded() {
        let mut out = Vec::new();
        write_string(&mut out, "a(b)\\c \u{2026} \u{e9} \u{4e2d}");
        assert_eq!(out, b"(a\\(b\\)\\\\c \x85 \xe9 ?)".to_vec());
    }

    #[test]
    fn empty_documents_are_rejected() {
        let model = model_with_pages(0);
        assert!(matches!(serialize(&model), Err(SerializeError::NoPages)));
    }

    #[test]
    fn unknown_images_are_rejected() {
        let mut model = model_with_pages(1);
        model.pages[0].ops.push(DrawOp::Image {
            name: "Im9".to_string(),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        });
        let err = serialize(&model).expect_err("unknown image fails");
        assert!(matches!(err, SerializeError::UnknownImage { ref name } if name == "Im9"));
    }

    #[test]
    fn invalid_images_are_rejected() {
        let mut model = model_with_pages(1);
        model.register_image(Vec::new(), 10, 10);
        assert!(matches!(
            serialize(&model),
            Err(SerializeError::InvalidImage { .. })
        ));
    }

    #[test]
    fn non_jpeg_payloads_are_rejected() {
        let mut model = model_with_pages(1);
        model.register_image(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec(), 10, 10);
        let err = serialize(&model).expect_err("png payload fails");
        assert!(matches!(err, SerializeError::InvalidImage { ref name, .. } if name == "Im1"));

        let mut truncated = model_with_pages(1);
        truncated.register_image(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00], 10, 10);
        assert!(matches!(
            serialize(&truncated),
            Err(SerializeError::InvalidImage { .. })
        ));
    }

    #[test]
    fn object_layout_follows_fixed_numbering() {
        let mut model = model_with_pages(2);
        let name = model.register_image(vec![0xFF, 0xD8, 0xFF, 0xD9], 4, 2);
        model.pages[1].ops.push(DrawOp::Image {
            name,
            x: 10.0,
            y: 10.0,
            width: 40.0,
            height: 20.0,
        });

        let bytes = serialize(&model).expect("document serializes");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.contains("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>"));
        assert!(text.contains("/Kids [8 0 R 10 0 R] /Count 2"));
        assert!(text.contains("5 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Courier"));
        assert!(text.contains("6 0 obj\n<< /Type /XObject /Subtype /Image /Width 4 /Height 2"));
        assert!(text.contains("/XObject << /Im1 6 0 R >> >> /Contents 9 0 R"));
        assert!(text.contains("/Title (Quarterly \\(draft\\))"));
        assert!(text.contains("/CreationDate (D:20250304050607Z)"));
        assert!(text.contains("trailer\n<< /Size 12 /Root 1 0 R /Info 11 0 R >>"));
        assert!(text.ends_with("%%EOF\n"));
    }
}
