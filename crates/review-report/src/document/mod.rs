//! Paginated document composition and PDF serialization.

pub mod composer;
pub mod layout;
pub mod model;
pub mod serializer;

pub use composer::{DocumentComposer, PageHeader, DEFAULT_FOOTER_TEMPLATE};
pub use model::{DocumentModel, DrawOp, FontKind, ImageResource, Page};
pub use serializer::{serialize, SerializeError};
