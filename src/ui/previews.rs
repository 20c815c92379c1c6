use crate::theme::Theme;
use crate::ui::textures::TextureCache;
use crate::workbench::{Preview, PreviewContent};
use eframe::egui::{self, CursorIcon, Label, Sense};

const PREVIEW_PADDING: f32 = 20.0;

/// Draws the selected fragments. Returns the fragment id of a text preview
/// clicked this frame.
pub fn render_previews(
    ui: &mut egui::Ui,
    previews: &[Preview],
    theme: &Theme,
    textures: &mut TextureCache,
) -> Option<u32> {
    let mut clicked = None;

    for preview in previews {
        match &preview.content {
            PreviewContent::Text(text) => {
                let response = theme
                    .fragment_frame(false, preview.is_point)
                    .show(ui, |ui| {
                        ui.add(Label::new(text.as_str()).wrap().sense(Sense::click()))
                    })
                    .inner
                    .on_hover_cursor(CursorIcon::PointingHand)
                    .on_hover_text("Click to mark as point");
                if response.clicked() {
                    clicked = Some(preview.fragment_id);
                }
            }
            PreviewContent::Image(image) => {
                let texture = textures.get_or_load(ui.ctx(), image);
                let width = (ui.available_width() - PREVIEW_PADDING).max(PREVIEW_PADDING);
                ui.vertical_centered(|ui| {
                    ui.add(egui::Image::new(&texture).max_width(width));
                });
            }
        }
    }

    clicked
}
