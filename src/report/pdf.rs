//! A4 report: title, timestamp, summary text, then every chart image.

use super::summary::summarize;
use crate::error::{Result, ResultExt as _};
use polars::prelude::DataFrame;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub const TITLE: &str = "Local Data Analysis Report";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 17.0;
const MARGIN_TOP: f32 = 20.0;
const TEXT_BOTTOM: f32 = 20.0;
/// Images are not started below this line.
const IMAGE_BOTTOM: f32 = 35.0;
const IMAGE_BOX: (f32, f32) = (176.0, 70.0);
const IMAGE_GAP: f32 = 8.0;
const IMAGE_DPI: f32 = 300.0;
const BODY_SIZE: f32 = 9.0;
const LINE_HEIGHT: f32 = 4.2;
/// Courier characters per line at the body size.
const MAX_LINE_CHARS: usize = 88;

/// `.png` files of `dir`, sorted by file name. A missing directory has none.
pub fn chart_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read chart directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("png"))
        })
        .collect();
    images.sort();
    Ok(images)
}

/// What [`generate_pdf`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub path: PathBuf,
    pub pages: usize,
    pub images_placed: usize,
    /// Chart files that could not be decoded
    pub images_skipped: usize,
}

/// Page cursor over a growing document.
struct Writer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    /// Distance of the next baseline/top edge from the page bottom, in mm
    y: f32,
    pages: usize,
}

impl Writer {
    fn new() -> Self {
        let (doc, page, layer) =
            PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        Self {
            doc,
            layer,
            y: PAGE_HEIGHT - MARGIN_TOP,
            pages: 1,
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN_TOP;
        self.pages += 1;
    }

    fn line(&mut self, text: &str, size: f32, advance: f32, font: &IndirectFontRef) {
        if self.y < TEXT_BOTTOM {
            self.new_page();
        }
        self.layer
            .use_text(text, size, Mm(MARGIN_LEFT), Mm(self.y), font);
        self.y -= advance;
    }

    /// Places an image inside [`IMAGE_BOX`], keeping its aspect ratio.
    fn image(&mut self, path: &Path) -> std::result::Result<(), String> {
        let decoded = image::open(path).map_err(|e| e.to_string())?;
        let (px_w, px_h) = (decoded.width(), decoded.height());
        if px_w == 0 || px_h == 0 {
            return Err("image has no pixels".to_owned());
        }
        let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

        let natural_w = px_w as f32 / IMAGE_DPI * 25.4;
        let natural_h = px_h as f32 / IMAGE_DPI * 25.4;
        let scale = (IMAGE_BOX.0 / natural_w).min(IMAGE_BOX.1 / natural_h);
        let drawn_h = natural_h * scale;

        if self.y - drawn_h < IMAGE_BOTTOM {
            self.new_page();
        }
        Image::from_dynamic_image(&rgb).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN_LEFT)),
                translate_y: Some(Mm(self.y - drawn_h)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        self.y -= drawn_h + IMAGE_GAP;
        Ok(())
    }

    fn save(self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report {}", path.display()))?;
        self.doc.save(&mut BufWriter::new(file))?;
        Ok(())
    }
}

/// Writes the report for `df` to `out_path`, embedding every chart of
/// `chart_dir`. Unreadable images are skipped with a warning.
pub fn generate_pdf(df: &DataFrame, chart_dir: &Path, out_path: &Path) -> Result<ReportOutcome> {
    let mut writer = Writer::new();
    let bold = writer.doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let regular = writer.doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let mono = writer.doc.add_builtin_font(BuiltinFont::Courier)?;

    writer.line(TITLE, 16.0, 7.0, &bold);
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    writer.line(&format!("Generated {generated}"), 10.0, 10.0, &regular);

    for line in summarize(df)?.lines() {
        for chunk in wrap(line) {
            writer.line(&chunk, BODY_SIZE, LINE_HEIGHT, &mono);
        }
    }
    writer.y -= IMAGE_GAP;

    let images = chart_images(chart_dir)?;
    let mut placed = 0;
    for path in &images {
        match writer.image(path) {
            Ok(()) => placed += 1,
            Err(e) => tracing::warn!(file = %path.display(), "Skipping image: {e}"),
        }
    }
    if images.is_empty() {
        writer.line(
            &format!("No charts were found in {}.", chart_dir.display()),
            10.0,
            LINE_HEIGHT,
            &regular,
        );
    }

    let outcome = ReportOutcome {
        path: out_path.to_path_buf(),
        pages: writer.pages,
        images_placed: placed,
        images_skipped: images.len() - placed,
    };
    writer.save(out_path)?;
    tracing::info!(
        file = %out_path.display(),
        pages = outcome.pages,
        images = outcome.images_placed,
        skipped = outcome.images_skipped,
        "PDF report generated"
    );
    Ok(outcome)
}

/// Splits a line into chunks that fit the page width.
fn wrap(line: &str) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(MAX_LINE_CHARS)
        .map(|c| c.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn write_png(path: &Path, w: u32, h: u32) -> anyhow::Result<()> {
        image::RgbImage::from_pixel(w, h, image::Rgb([200, 30, 30])).save(path)?;
        Ok(())
    }

    #[test]
    fn test_chart_images_sorted_png_only() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write_png(&dir.path().join("b.png"), 4, 4)?;
        write_png(&dir.path().join("a.PNG"), 4, 4)?;
        std::fs::write(dir.path().join("c.csv"), "x\n")?;

        let images = chart_images(dir.path())?;
        assert_eq!(images, vec![dir.path().join("a.PNG"), dir.path().join("b.png")]);
        assert!(chart_images(&dir.path().join("missing"))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_report_with_images_and_broken_file() -> anyhow::Result<()> {
        let charts = tempfile::tempdir()?;
        let reports = tempfile::tempdir()?;
        for i in 0..5 {
            write_png(&charts.path().join(format!("chart_{i}.png")), 1000, 600)?;
        }
        std::fs::write(charts.path().join("broken.png"), "not an image")?;
        let df = df!["Ship" => ["a", "b"], "Hours" => [1.0, 2.0]]?;

        let out = reports.path().join("Data_Report.pdf");
        let outcome = generate_pdf(&df, charts.path(), &out)?;
        assert_eq!(outcome.path, out);
        assert_eq!(outcome.images_placed, 5);
        assert_eq!(outcome.images_skipped, 1);
        // five 70 mm images cannot all sit above the bottom image line
        assert!(outcome.pages >= 2, "got {} page(s)", outcome.pages);
        let bytes = std::fs::read(&out)?;
        assert!(bytes.starts_with(b"%PDF"));
        Ok(())
    }

    #[test]
    fn test_report_without_charts() -> anyhow::Result<()> {
        let charts = tempfile::tempdir()?;
        let reports = tempfile::tempdir()?;
        let df = df!["Ship" => ["a"]]?;

        let out = reports.path().join("report.pdf");
        let outcome = generate_pdf(&df, charts.path(), &out)?;
        assert!(out.exists());
        assert_eq!(outcome.pages, 1);
        assert_eq!((outcome.images_placed, outcome.images_skipped), (0, 0));
        Ok(())
    }

    #[test]
    fn test_wrap_long_lines() {
        assert_eq!(wrap(""), vec![String::new()]);
        let long = "x".repeat(MAX_LINE_CHARS + 5);
        let parts = wrap(&long);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts.get(1).map(String::len), Some(5));
    }
}
