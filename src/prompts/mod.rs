//! Prompt variation engine for stylebench.
//!
//! Every sampled question is rewritten in five styles that all request the
//! same answer format. Rendered sets are persisted so the inference and
//! scoring stages can run independently of dataset fetching.
//!
//! - [`templates`] - the five style templates per dataset
//! - [`render`] - template rendering and prompt-set persistence

pub mod render;
pub mod templates;

pub use render::{
    build_prompt_file, render_prompt_set, PromptFile, PromptSet, CONTEXT_CHAR_LIMIT,
};
pub use templates::template;
