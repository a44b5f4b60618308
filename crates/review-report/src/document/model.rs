use crate::charts::Color;
use chrono::{DateTime, Utc};

/// The three standard fonts every document declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontKind {
    Regular,
    Bold,
    Monospace,
}

impl FontKind {
    pub const fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Monospace => "F3",
        }
    }

    pub const fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Monospace => "Courier",
        }
    }

    pub const fn ordered() -> [Self; 3] {
        [Self::Regular, Self::Bold, Self::Monospace]
    }
}

/// One drawing operation in page space (points, origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `y` is the text baseline.
    Text {
        x: f64,
        y: f64,
        size: f64,
        font: FontKind,
        color: Color,
        text: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    /// `(x, y)` is the lower-left corner of the placed image.
    Image {
        name: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// JPEG payload embedded once and referenced by name from any page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResource {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub components: u8,
    pub bits_per_component: u8,
    pub data: Vec<u8>,
}

/// Finished page content plus shared resources, ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentModel {
    pub pages: Vec<Page>,
    pub images: Vec<ImageResource>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DocumentModel {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            pages: Vec::new(),
            images: Vec::new(),
            title: None,
            created_at,
        }
    }

    /// Stores an RGB JPEG and returns the name pages use to draw it.
    pub fn register_image(&mut self, data: Vec<u8>, width: u32, height: u32) -> String {
        let name = format!("Im{}", self.images.len() + 1);
        self.images.push(ImageResource {
            name: name.clone(),
            width,
            height,
            components: 3,
            bits_per_component: 8,
            data,
        });
        name
    }

    pub fn image(&self, name: &str) -> Option<&ImageResource> {
        self.images.iter().find(|image| image.name == name)
    }
}
