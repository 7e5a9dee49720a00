pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use adapters::CommandConverter;
pub use core::block::BlockConverter;
pub use core::engine::{OutputFormat, RenderEngine, RenderRequest, RenderedDocument};
pub use core::walker::{ContextTransformer, RequestContext};
pub use domain::model::{ConversionMode, ConversionOutcome, PayloadNode, RichContent, Run};
pub use utils::error::{PressError, Result};
