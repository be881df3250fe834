//! Rendering module for converting documents to output trees.
//!
//! [`StaticRenderer`] is the generic walker; [`markup_renderer`] and
//! [`text_renderer`] build the two targets shipped with the crate.

mod html;
mod json;
mod markup;
mod options;
pub mod output;
mod renderer;
mod text;

pub use html::{markup_renderer, render_batch, render_content, render_html, render_to_markup};
pub use json::{serialize_document, to_json, JsonFormat};
pub use markup::{escape_html, is_valid_name, Element, Markup};
pub use options::{RenderOptions, UnhandledPolicy, DEFAULT_ROOT_CLASS};
pub use renderer::{
    Children, MarkProps, MarkRenderer, NodeProps, NodeRenderer, StaticRenderer, DEFAULT_MAX_DEPTH,
};
pub use text::{render_to_text, text_renderer, to_text};

pub(crate) use html::render_resolved;
