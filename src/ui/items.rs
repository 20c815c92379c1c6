use crate::document::{DocumentItem, RasterImage};
use crate::theme::Theme;
use crate::ui::textures::TextureCache;
use eframe::egui::{self, CursorIcon, Label, RichText, Sense};
use std::sync::Arc;

/// Draws the extracted items top to bottom and returns the index of the item
/// clicked this frame, if any.
pub fn render_items(
    ui: &mut egui::Ui,
    items: &[DocumentItem],
    theme: &Theme,
    textures: &mut TextureCache,
) -> Option<usize> {
    let mut clicked = None;
    let mut tables = 0;
    let mut pictures = 0;

    for (index, item) in items.iter().enumerate() {
        let response = match item {
            DocumentItem::Text {
                text, needs_review, ..
            } => {
                let response = theme
                    .fragment_frame(*needs_review, false)
                    .show(ui, |ui| {
                        ui.add(Label::new(text.as_str()).wrap().sense(Sense::click()))
                    })
                    .inner;
                if *needs_review {
                    response.on_hover_text("Extracted text may not match the PDF; consider adding it as an image")
                } else {
                    response
                }
            }
            DocumentItem::Table { page, rows, image } => {
                tables += 1;
                caption(
                    ui,
                    theme,
                    format!("Table {tables} · page {page} · {} rows", rows.len()),
                );
                clickable_image(ui, textures, image)
            }
            DocumentItem::Picture { page, image } => {
                pictures += 1;
                caption(ui, theme, format!("Picture {pictures} · page {page}"));
                clickable_image(ui, textures, image)
            }
        };

        if response.on_hover_cursor(CursorIcon::PointingHand).clicked() {
            clicked = Some(index);
        }
    }

    clicked
}

fn clickable_image(
    ui: &mut egui::Ui,
    textures: &mut TextureCache,
    image: &Arc<RasterImage>,
) -> egui::Response {
    let texture = textures.get_or_load(ui.ctx(), image);
    ui.add(
        egui::Image::new(&texture)
            .max_width(ui.available_width())
            .sense(Sense::click()),
    )
}

fn caption(ui: &mut egui::Ui, theme: &Theme, text: String) {
    ui.label(RichText::new(text).small().color(theme.text_muted));
}
