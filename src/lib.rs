//! # swf-raster
//!
//! Decoding and anti-aliased rasterization of SWF vector shapes.
//!
//! The crate reads DefineShape/DefineFont definitions from an SWF tag
//! stream, resolves their fill and line styles into span generators, and
//! renders them with a compound scanline rasterizer into an RGBA buffer.
//! The same outlines answer geometric hit tests.
//!
//! ## Architecture
//!
//! 1. **Stream** — bit-packed reads bounded by nested tag frames
//! 2. **Shape parser** — style arrays and edge records into paths
//! 3. **Style resolver** — fills become solid colors, gradient or bitmap spans
//! 4. **Compound rasterizer** — per-style coverage with shared edges
//! 5. **Renderer** — layered blending into premultiplied RGBA
//!
//! ```no_run
//! use std::fs::File;
//! use swf_raster::color::ColorTransform;
//! use swf_raster::render_context::RenderContext;
//! use swf_raster::renderer_scanline::render_shape;
//! use swf_raster::rendering_buffer::RenderingBuffer;
//! use swf_raster::tag_loader::{load_movie, Library};
//! use swf_raster::trans_affine::TransAffine;
//!
//! let movie = load_movie(File::open("movie.swf")?, Library::new())?;
//! if let Some(shape) = movie.library.shape(1) {
//!     let mut buf = RenderingBuffer::new(550, 400);
//!     let twips = TransAffine::new_scaling(0.05, 0.05);
//!     render_shape(&mut buf, shape, &twips, &ColorTransform::IDENTITY, &RenderContext::default());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Stream & errors
pub mod error;
pub mod header;
pub mod stream;

// Geometry & color
pub mod basics;
pub mod bounding_rect;
pub mod color;
pub mod curves;
pub mod trans_affine;

// Shapes
pub mod fill_style;
pub mod path;
pub mod shape;
pub mod shape_parser;
pub mod tag_loader;

// Styles & spans
pub mod bitmap;
pub mod gradient_lut;
pub mod image_accessors;
pub mod span_gradient;
pub mod span_image_filter_rgba;
pub mod span_interpolator_linear;
pub mod style_handler;

// Rasterization & rendering
pub mod gamma;
pub mod math_stroke;
pub mod pixfmt_rgba;
pub mod rasterizer_compound_aa;
pub mod render_context;
pub mod renderer_scanline;
pub mod rendering_buffer;
pub mod scanline_u;

pub mod log_once;

#[cfg(test)]
pub(crate) mod bit_writer;
