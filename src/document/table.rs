//! Draws detected tables as bordered grids so they can be sent as images.

use crate::document::raster::RasterImage;
use crate::error::{AppError, Result};
use eframe::egui::{FontDefinitions, FontFamily};
use image::{DynamicImage, Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use std::sync::LazyLock;

const FONT_SIZE: f32 = 16.0;
const CELL_PADDING: u32 = 6;
const MAX_CELL_CHARS: usize = 80;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const HEADER_FILL: Rgba<u8> = Rgba([232, 236, 241, 255]);
const GRID: Rgba<u8> = Rgba([90, 90, 90, 255]);
const INK: [u8; 3] = [20, 20, 20];

/// egui's bundled proportional face, so rendering never depends on system fonts.
static FONT: LazyLock<Option<Font<'static>>> = LazyLock::new(bundled_font);

fn bundled_font() -> Option<Font<'static>> {
    let definitions = FontDefinitions::default();
    definitions
        .families
        .get(&FontFamily::Proportional)?
        .iter()
        .find_map(|name| definitions.font_data.get(name))
        .and_then(|data| Font::try_from_vec(data.font.to_vec()))
}

/// Renders `rows` as a grid with a shaded header row. Short rows leave their
/// trailing cells empty.
pub fn render_table(rows: &[Vec<String>]) -> Result<RasterImage> {
    let font = FONT
        .as_ref()
        .ok_or_else(|| AppError::Image("no font available to draw tables".to_string()))?;
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return Err(AppError::Image("table has no cells".to_string()));
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.chars().take(MAX_CELL_CHARS).collect()).collect())
        .collect();

    let scale = Scale::uniform(FONT_SIZE);
    let metrics = font.v_metrics(scale);
    let row_height = (metrics.ascent - metrics.descent).ceil() as u32 + 2 * CELL_PADDING;

    let mut widths = vec![2 * CELL_PADDING; columns];
    for row in &cells {
        for (column, cell) in row.iter().enumerate() {
            let width = text_width(font, scale, cell).ceil() as u32 + 2 * CELL_PADDING;
            widths[column] = widths[column].max(width);
        }
    }

    let width = widths.iter().sum::<u32>() + 1;
    let height = row_height * cells.len() as u32 + 1;
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);
    for y in 0..row_height {
        for x in 0..width {
            canvas.put_pixel(x, y, HEADER_FILL);
        }
    }

    for (index, row) in cells.iter().enumerate() {
        let baseline = (index as u32 * row_height + CELL_PADDING) as f32 + metrics.ascent;
        let mut left = 0;
        for (column, cell) in row.iter().enumerate() {
            draw_text(&mut canvas, font, scale, cell, (left + CELL_PADDING) as f32, baseline);
            left += widths[column];
        }
    }

    for index in 0..=cells.len() {
        let y = index as u32 * row_height;
        for x in 0..width {
            canvas.put_pixel(x, y, GRID);
        }
    }
    let mut x = 0;
    for column_width in std::iter::once(0).chain(widths.iter().copied()) {
        x += column_width;
        for y in 0..height {
            canvas.put_pixel(x, y, GRID);
        }
    }

    RasterImage::from_dynamic(DynamicImage::ImageRgba8(canvas))
}

fn text_width(font: &Font<'_>, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

fn draw_text(canvas: &mut RgbaImage, font: &Font<'_>, scale: Scale, text: &str, x: f32, baseline: f32) {
    let (width, height) = canvas.dimensions();
    for glyph in font.layout(text, scale, point(x, baseline)) {
        let Some(bounds) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = bounds.min.x + gx as i32;
            let py = bounds.min.y + gy as i32;
            if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                return;
            }
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            for (channel, ink) in INK.iter().enumerate() {
                let base = pixel[channel] as f32;
                pixel[channel] = (base + (*ink as f32 - base) * coverage).round() as u8;
            }
        });
    }
}
