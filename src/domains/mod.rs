//! Pluggable artifact generators.
//!
//! A domain turns a concept plus a concretized design space into one
//! artifact. Image, SVG, and 3D backends live outside this crate; the
//! contract is the trait below, and [`text::TextDomain`] is the in-repo
//! reference implementation.

pub mod text;

use crate::space::{DesignSpace, Generation};
use std::future::Future;
use std::pin::Pin;

pub use text::TextDomain;

pub trait Domain: Send + Sync {
    /// Short machine identifier (e.g. "text"), used as part of history keys.
    fn name(&self) -> &str;

    /// Human-facing domain name (e.g. "Text"), used to condition oracle
    /// prompts.
    fn display_name(&self) -> &str;

    /// Produce one artifact for the concept under the given design space.
    /// May make its own oracle and backend calls.
    fn generate_one<'a>(
        &'a self,
        concept: &'a str,
        space: &'a DesignSpace,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Generation>> + Send + 'a>>;
}
