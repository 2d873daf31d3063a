//! Command line front end for swf-raster.
//!
//!   swf-render list <file.swf>
//!   swf-render render <file.swf> <id> -o <out.bmp> [--scale 2]
//!   swf-render hit <file.swf> <id> <x> <y>

mod bmp;

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use swf_raster::basics::RectI;
use swf_raster::color::{ColorTransform, Rgba8};
use swf_raster::render_context::{RenderConfig, RenderContext, SmoothingPolicy};
use swf_raster::renderer_scanline::{render_shape, render_shape_mask};
use swf_raster::rendering_buffer::RenderingBuffer;
use swf_raster::shape::Shape;
use swf_raster::tag_loader::{load_movie, Character, Library, LoadedMovie};
use swf_raster::trans_affine::TransAffine;

#[derive(Parser)]
#[command(name = "swf-render", about = "Inspect, render and hit-test SWF shapes")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the shape and font definitions of a file.
    List { swf_path: PathBuf },
    /// Render one shape definition to a BMP image.
    Render {
        swf_path: PathBuf,
        id: u16,
        #[arg(short, long)]
        output: PathBuf,
        /// Pixels per stage pixel.
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        #[arg(long, default_value_t = 1.0)]
        gamma: f64,
        /// Maximum curve flattening error in pixels.
        #[arg(long, default_value_t = 0.25)]
        tolerance: f64,
        #[arg(long, default_value_t = 1.0)]
        hairline: f64,
        #[arg(long, value_enum, default_value_t = Smoothing::FromStyle)]
        smoothing: Smoothing,
        /// Background as RRGGBB; transparent when omitted.
        #[arg(long)]
        background: Option<String>,
        /// Render coverage only, as opaque white.
        #[arg(long)]
        mask: bool,
    },
    /// Test whether a point, in shape twips, hits a shape.
    Hit {
        swf_path: PathBuf,
        id: u16,
        x: f64,
        y: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Smoothing {
    FromStyle,
    Always,
    Never,
}

impl From<Smoothing> for SmoothingPolicy {
    fn from(s: Smoothing) -> Self {
        match s {
            Smoothing::FromStyle => SmoothingPolicy::FromStyle,
            Smoothing::Always => SmoothingPolicy::Always,
            Smoothing::Never => SmoothingPolicy::Never,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let opts = Opts::parse();
    match opts.command {
        Command::List { swf_path } => list(&swf_path),
        Command::Render {
            swf_path,
            id,
            output,
            scale,
            gamma,
            tolerance,
            hairline,
            smoothing,
            background,
            mask,
        } => {
            let config = RenderConfig {
                bitmap_smoothing: smoothing.into(),
                curve_tolerance: tolerance,
                gamma,
                hairline_width: hairline,
            };
            let background = background.as_deref().map(parse_color).transpose()?;
            render(&swf_path, id, &output, scale, config, background, mask)
        }
        Command::Hit { swf_path, id, x, y } => hit(&swf_path, id, x, y),
    }
}

fn load(path: &Path) -> Result<LoadedMovie, Box<dyn Error>> {
    let movie = load_movie(File::open(path)?, Library::new())?;
    if let Some(e) = &movie.error {
        eprintln!("warning: loading stopped early: {}", e);
    }
    Ok(movie)
}

fn find_shape(movie: &LoadedMovie, id: u16) -> Result<Arc<Shape>, Box<dyn Error>> {
    movie
        .library
        .shape(id)
        .cloned()
        .ok_or_else(|| format!("no shape with id {}", id).into())
}

fn list(path: &Path) -> Result<(), Box<dyn Error>> {
    let movie = load(path)?;
    let h = &movie.header;
    println!(
        "SWF {} ({:?}), {} frames at {} fps",
        h.version, h.compression, h.frame_count, h.frame_rate
    );
    for (id, c) in movie.library.iter() {
        match c {
            Character::Shape(s) => {
                let bounds = s
                    .bounds()
                    .rect()
                    .map(|r| format!("({}, {})-({}, {})", r.x1, r.y1, r.x2, r.y2))
                    .unwrap_or_else(|| "empty".into());
                println!(
                    "  {:5}  shape  {} paths, {} fills, {} lines, bounds {}",
                    id,
                    s.paths.len(),
                    s.fill_styles.len(),
                    s.line_styles.len(),
                    bounds
                );
            }
            Character::Font(f) => println!("  {:5}  font   {} glyphs", id, f.glyphs.len()),
        }
    }
    Ok(())
}

fn render(
    path: &Path,
    id: u16,
    output: &Path,
    scale: f64,
    config: RenderConfig,
    background: Option<Rgba8>,
    mask: bool,
) -> Result<(), Box<dyn Error>> {
    let movie = load(path)?;
    let shape = find_shape(&movie, id)?;
    let r = shape.bounds().rect().ok_or("shape has no extent")?;
    let (width, height, mtx) = fit_bounds(&r, scale);

    let mut buf = RenderingBuffer::new(width, height);
    if let Some(c) = background {
        buf.clear(c);
    }
    let ctx = RenderContext::new(config).with_bitmap_resolver(Arc::new(movie.library));
    if mask {
        render_shape_mask(&mut buf, &shape, &mtx, &ctx);
    } else {
        render_shape(&mut buf, &shape, &mtx, &ColorTransform::IDENTITY, &ctx);
    }

    let mut out = BufWriter::new(File::create(output)?);
    bmp::write_bmp(&mut out, &buf)?;
    info!("wrote {}x{} image to {}", width, height, output.display());
    Ok(())
}

/// Image size and twips-to-pixels matrix that place `r` at the origin.
fn fit_bounds(r: &RectI, scale: f64) -> (u32, u32, TransAffine) {
    let px = scale / 20.0;
    let width = ((r.x2 as f64 - r.x1 as f64) * px).ceil().max(1.0) as u32;
    let height = ((r.y2 as f64 - r.y1 as f64) * px).ceil().max(1.0) as u32;
    let mut mtx = TransAffine::new_translation(-(r.x1 as f64), -(r.y1 as f64));
    mtx.multiply(&TransAffine::new_scaling(px, px));
    (width, height, mtx)
}

fn hit(path: &Path, id: u16, x: f64, y: f64) -> Result<(), Box<dyn Error>> {
    let movie = load(path)?;
    let shape = find_shape(&movie, id)?;
    let hit = shape.point_test_local(x, y, &TransAffine::new());
    println!("{}", if hit { "hit" } else { "miss" });
    Ok(())
}

fn parse_color(s: &str) -> Result<Rgba8, Box<dyn Error>> {
    let s = s.trim_start_matches('#');
    if s.len() != 6 {
        return Err(format!("expected RRGGBB, got {:?}", s).into());
    }
    let v = u32::from_str_radix(s, 16)?;
    Ok(Rgba8::new_opaque((v >> 16) as u8, (v >> 8) as u8, v as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_bounds() {
        let (w, h, mtx) = fit_bounds(&RectI::new(100, 200, 300, 600), 2.0);
        assert_eq!((w, h), (20, 40));
        let (mut x, mut y) = (100.0, 200.0);
        mtx.transform(&mut x, &mut y);
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn test_fit_bounds_full_i32_range() {
        let r = RectI::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        let (w, h, _) = fit_bounds(&r, 1.0);
        assert_eq!(w, 214_748_365);
        assert_eq!(w, h);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8000").unwrap(), Rgba8::new_opaque(255, 128, 0));
        assert!(parse_color("fff").is_err());
    }
}
