//! Rendering backends bundled with the crate
//!
//! Hosts normally implement [`Surface`](super::Surface),
//! [`Renderer`](super::Renderer) and [`ResourceFactory`](super::ResourceFactory)
//! over their own graphics API. The headless backend records draw calls and is
//! used wherever no pixels are needed.

pub mod headless;

pub use headless::{
    DrawCommand, HeadlessGlyphFactory, HeadlessRenderer, HeadlessResourceFactory, HeadlessSurface,
};
