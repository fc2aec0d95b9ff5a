//! PDF output with printpdf's built-in Helvetica fonts

use super::layout::{
    ChartImage, DocumentLayout, FontStyle, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, PlacedItem,
    layout_report,
};
use super::text::MM_PER_PT;
use crate::error::{ResearchError, Result};
use printpdf::{
    BuiltinFont, Color, Greyscale, Image, ImageTransform, IndirectFontRef, Line, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Rect, image_crate, path::PaintMode,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

const IMAGE_DPI: f32 = 300.0;

/// Writes laid-out reports to PDF files
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentRenderer;

/// A written PDF and the layout that was drawn into it
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub path: PathBuf,
    pub layout: DocumentLayout,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let font = |builtin| doc.add_builtin_font(builtin).map_err(render_error);
        Ok(Self {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Lay out `markdown` and write it to `output`
    ///
    /// A chart path that does not exist or cannot be decoded is skipped with
    /// a warning.
    #[instrument(skip(self, markdown))]
    pub fn render(
        &self,
        ticker: &str,
        markdown: &str,
        output: &Path,
        chart: Option<&Path>,
    ) -> Result<RenderedReport> {
        let chart = chart.and_then(load_chart);
        let layout = layout_report(ticker, markdown, chart.as_ref());
        self.write(&layout, output)?;
        debug!(pages = layout.pages.len(), path = %output.display(), "PDF written");
        Ok(RenderedReport {
            path: output.to_path_buf(),
            layout,
        })
    }

    /// Draw a prepared layout
    pub fn write(&self, layout: &DocumentLayout, output: &Path) -> Result<()> {
        let (doc, first_page, first_layer) = PdfDocument::new(
            layout.title.as_str(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let fonts = Fonts::load(&doc)?;

        for (index, page) in layout.pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                doc.get_page(page_index).get_layer(layer_index)
            };

            for item in page.items() {
                draw_item(&layer, &fonts, item)?;
            }
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(output)?);
        doc.save(&mut writer).map_err(render_error)?;
        Ok(())
    }
}

fn load_chart(path: &Path) -> Option<ChartImage> {
    if !path.exists() {
        warn!(path = %path.display(), "Chart file missing, rendering without it");
        return None;
    }
    match image_crate::image_dimensions(path) {
        Ok((width_px, height_px)) => Some(ChartImage {
            path: path.to_path_buf(),
            width_px,
            height_px,
        }),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Chart unreadable, rendering without it");
            None
        }
    }
}

/// Convert a top-based coordinate to PDF's bottom-left origin
fn pdf_y(top_mm: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - top_mm)
}

fn gray(level: f32) -> Color {
    Color::Greyscale(Greyscale::new(level, None))
}

fn draw_item(layer: &PdfLayerReference, fonts: &Fonts, item: &PlacedItem) -> Result<()> {
    match item {
        PlacedItem::Text {
            text,
            x,
            y,
            size,
            style,
            gray: level,
        } => {
            // `y` is the top of the line box; text is placed on its baseline
            let baseline = y + size * MM_PER_PT * 0.8;
            layer.set_fill_color(gray(*level));
            layer.use_text(text.as_str(), *size, Mm(*x), pdf_y(baseline), fonts.get(*style));
        }
        PlacedItem::Rule { x1, x2, y } => {
            layer.set_outline_color(gray(0.0));
            layer.set_outline_thickness(0.5);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), pdf_y(*y)), false),
                    (Point::new(Mm(*x2), pdf_y(*y)), false),
                ],
                is_closed: false,
            });
        }
        PlacedItem::Fill {
            x,
            y,
            width,
            height,
            gray: level,
        } => {
            layer.set_fill_color(gray(*level));
            layer.add_rect(
                Rect::new(Mm(*x), pdf_y(y + height), Mm(x + width), pdf_y(*y))
                    .with_mode(PaintMode::Fill),
            );
        }
        PlacedItem::Image {
            path,
            x,
            y,
            width,
            height,
        } => {
            let decoded = image_crate::open(path)
                .map_err(|e| ResearchError::Render(format!("{}: {e}", path.display())))?;
            let (width_px, height_px) = (decoded.width() as f32, decoded.height() as f32);
            let natural_width_mm = width_px / IMAGE_DPI * 25.4;
            let natural_height_mm = height_px / IMAGE_DPI * 25.4;

            Image::from_dynamic_image(&decoded).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(*x)),
                    translate_y: Some(pdf_y(y + height)),
                    scale_x: Some(width / natural_width_mm),
                    scale_y: Some(height / natural_height_mm),
                    dpi: Some(IMAGE_DPI),
                    ..ImageTransform::default()
                },
            );
        }
    }
    Ok(())
}

fn render_error(err: impl std::fmt::Display) -> ResearchError {
    ResearchError::Render(err.to_string())
}
