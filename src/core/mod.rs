pub mod block;
pub mod detect;
mod dom;
pub mod engine;
pub mod inline;
pub mod normalize;
pub mod sanitize;
pub mod walker;

pub use crate::domain::model::{
    ConversionMode, ConversionOutcome, PayloadNode, RichContent, Run, ScalarValue,
};
pub use crate::domain::ports::{ConfigProvider, DocFormat, DocumentConverter, TemplateEngine};
pub use crate::utils::error::Result;
