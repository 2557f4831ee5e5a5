use image::{ImageFormat, Rgba, RgbaImage};
use pdfium_render::prelude::{PdfRenderConfig, Pdfium};
use std::io::Cursor;
use std::path::Path;

use crate::cuts::Axis;
use crate::error::{Result, SplitError};

pub const DEFAULT_RENDER_WIDTH: u16 = 1200;

pub(crate) const LINE_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const LINE_WIDTH: u32 = 2;
const DASH_LENGTH: u32 = 12;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Target width in pixels; height follows the page aspect ratio
    pub width: u16,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            width: DEFAULT_RENDER_WIDTH,
        }
    }
}

/// A rasterized page with its cut lines drawn in
pub struct Preview {
    pub page: u32,
    pub axis: Axis,
    pub cut_percentages: Vec<f32>,
    pub image: RgbaImage,
}

impl Preview {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| SplitError::render(format!("PNG encoding failed: {}", e)))?;
        Ok(png)
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_png()?)?;
        Ok(())
    }
}

/// Bind PDFium from the working directory, /opt/pdfium/lib, or the system.
/// A fresh instance per call; PDFium is not thread-safe.
fn create_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| SplitError::render(format!("Failed to initialize PDFium: {}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Rasterize one page (1-based). The caller checks the range.
pub fn render_page(bytes: &[u8], page: u32, options: &RenderOptions) -> Result<RgbaImage> {
    let pdfium = create_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(SplitError::render)?;

    let index = u16::try_from(page - 1)
        .map_err(|_| SplitError::render(format!("page {} beyond PDFium's page limit", page)))?;
    let pdf_page = document
        .pages()
        .get(index)
        .map_err(|e| SplitError::render(format!("Failed to get page {}: {}", page, e)))?;

    let config = PdfRenderConfig::new()
        .set_target_width(options.width as i32)
        .render_form_data(true)
        .render_annotations(true);

    let bitmap = pdf_page
        .render_with_config(&config)
        .map_err(|e| SplitError::render(format!("Failed to render page {}: {}", page, e)))?;

    Ok(bitmap.as_image().to_rgba8())
}

/// Draw a dashed line at each percentage along `axis`.
pub fn draw_cut_lines(image: &mut RgbaImage, axis: Axis, percentages: &[f32]) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    for &p in percentages {
        match axis {
            Axis::Vertical => {
                let x = pixel_position(width, p);
                for y in (0..height).filter(|y| on_dash(*y)) {
                    for dx in 0..LINE_WIDTH {
                        if x + dx < width {
                            image.put_pixel(x + dx, y, LINE_COLOR);
                        }
                    }
                }
            }
            Axis::Horizontal => {
                let y = pixel_position(height, p);
                for x in (0..width).filter(|x| on_dash(*x)) {
                    for dy in 0..LINE_WIDTH {
                        if y + dy < height {
                            image.put_pixel(x, y + dy, LINE_COLOR);
                        }
                    }
                }
            }
        }
    }
}

fn pixel_position(extent: u32, percentage: f32) -> u32 {
    let pos = (extent as f32 * percentage / 100.0) as u32;
    pos.min(extent - 1)
}

fn on_dash(offset: u32) -> bool {
    (offset / DASH_LENGTH) % 2 == 0
}
