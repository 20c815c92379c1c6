use crate::document::RasterImage;
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use std::collections::HashMap;
use std::sync::Arc;

/// GPU textures for rasters shown in either panel, keyed by the shared
/// raster allocation so a picture and its preview upload once.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<usize, TextureHandle>,
}

impl TextureCache {
    pub fn get_or_load(&mut self, ctx: &egui::Context, image: &Arc<RasterImage>) -> TextureHandle {
        let key = Arc::as_ptr(image) as usize;
        self.textures
            .entry(key)
            .or_insert_with(|| {
                let color_image = ColorImage::from_rgba_unmultiplied(image.size(), image.rgba());
                ctx.load_texture(format!("raster-{key}"), color_image, TextureOptions::LINEAR)
            })
            .clone()
    }

    /// Drops textures whose rasters are no longer referenced by `live`.
    pub fn retain<'a>(&mut self, live: impl IntoIterator<Item = &'a Arc<RasterImage>>) {
        let keep: Vec<usize> = live
            .into_iter()
            .map(|image| Arc::as_ptr(image) as usize)
            .collect();
        self.textures.retain(|key, _| keep.contains(key));
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster() -> Arc<RasterImage> {
        Arc::new(RasterImage::from_samples(2, 2, 1, &[0, 64, 128, 255]).expect("raster should build"))
    }

    #[test]
    fn shared_raster_uploads_once_and_stale_entries_are_dropped() {
        let ctx = egui::Context::default();
        let mut cache = TextureCache::default();
        let kept = raster();
        let dropped = raster();

        let first = cache.get_or_load(&ctx, &kept);
        let again = cache.get_or_load(&ctx, &Arc::clone(&kept));
        assert_eq!(first.id(), again.id());
        assert_eq!(first.size(), [2, 2]);

        let other = cache.get_or_load(&ctx, &dropped);
        assert_ne!(other.id(), first.id());
        assert_eq!(cache.len(), 2);

        cache.retain([&kept]);
        assert_eq!(cache.len(), 1);
    }
}
