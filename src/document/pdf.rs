//! `lopdf`-backed converter: page text goes through the segmenter, image
//! XObjects become pictures.

use crate::document::raster::RasterImage;
use crate::document::segment::segment_page;
use crate::document::{ConvertedDocument, DocumentConverter, DocumentItem};
use crate::error::{AppError, Result};
use image::ImageFormat;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const MAX_PARENT_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct PdfConverter {
    min_picture_side: u32,
}

impl PdfConverter {
    pub fn new(min_picture_side: u32) -> Self {
        Self { min_picture_side }
    }

    fn collect_pictures(
        &self,
        document: &Document,
        page_number: u32,
        page_id: ObjectId,
        converted: &mut ConvertedDocument,
    ) {
        let Some(xobjects) = page_xobjects(document, page_id) else {
            return;
        };

        for (name, object) in xobjects.iter() {
            let name = String::from_utf8_lossy(name);
            let Some(stream) = resolve(document, object).and_then(|object| object.as_stream().ok()) else {
                continue;
            };
            if name_of(stream.dict.get(b"Subtype").ok()) != Some(b"Image".as_slice()) {
                continue;
            }

            match self.decode_image(document, stream) {
                Ok(Some(image)) => converted.items.push(DocumentItem::Picture {
                    page: page_number,
                    image: Arc::new(image),
                }),
                Ok(None) => debug!(page = page_number, "picture {name} skipped"),
                Err(err) => converted
                    .warnings
                    .push(format!("picture {name} on page {page_number} skipped: {err}")),
            }
        }
    }

    /// `Ok(None)` means the image is deliberately ignored: too small, a mask,
    /// or an encoding this converter does not rebuild.
    fn decode_image(&self, document: &Document, stream: &Stream) -> Result<Option<RasterImage>> {
        let dict = &stream.dict;
        let width = integer_of(document, dict.get(b"Width").ok()).unwrap_or(0);
        let height = integer_of(document, dict.get(b"Height").ok()).unwrap_or(0);
        if width <= 0 || height <= 0 {
            return Err(AppError::Image("missing image dimensions".to_string()));
        }
        let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(AppError::Image(format!("image dimensions {width}x{height} out of range")));
        };
        if width < self.min_picture_side || height < self.min_picture_side {
            return Ok(None);
        }
        if matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true))) {
            return Ok(None);
        }

        let filters = filters_of(document, dict);
        match filters.as_slice() {
            [only] if only.as_slice() == b"DCTDecode" => {
                return RasterImage::from_encoded(&stream.content, ImageFormat::Jpeg).map(Some);
            }
            [] => {}
            [only] if only.as_slice() == b"FlateDecode" => {}
            _ => {
                debug!(
                    "unsupported image filters: {:?}",
                    filters
                        .iter()
                        .map(|filter| String::from_utf8_lossy(filter).into_owned())
                        .collect::<Vec<_>>()
                );
                return Ok(None);
            }
        }

        let bits = integer_of(document, dict.get(b"BitsPerComponent").ok()).unwrap_or(8);
        if bits != 8 {
            return Ok(None);
        }
        let Some(components) = color_components(document, dict.get(b"ColorSpace").ok()) else {
            return Ok(None);
        };

        let samples = if filters.is_empty() {
            stream.content.clone()
        } else {
            stream.decompressed_content()?
        };
        RasterImage::from_samples(width, height, components, &samples).map(Some)
    }
}

impl DocumentConverter for PdfConverter {
    fn convert(&self, path: &Path) -> Result<ConvertedDocument> {
        let document = Document::load(path)?;
        let pages = document.get_pages();

        let mut converted = ConvertedDocument {
            source: path.to_path_buf(),
            stem: path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
            page_count: pages.len(),
            ..Default::default()
        };

        for (&page_number, &page_id) in &pages {
            match document.extract_text(&[page_number]) {
                Ok(text) => {
                    let items = segment_page(page_number, &text);
                    if items.is_empty() {
                        debug!(page = page_number, "no extractable text");
                    }
                    converted.items.extend(items);
                }
                Err(err) => converted
                    .warnings
                    .push(format!("text on page {page_number} skipped: {err}")),
            }
            self.collect_pictures(&document, page_number, page_id, &mut converted);
        }

        Ok(converted)
    }
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn name_of(object: Option<&Object>) -> Option<&[u8]> {
    match object {
        Some(Object::Name(name)) => Some(name.as_slice()),
        _ => None,
    }
}

fn integer_of(document: &Document, object: Option<&Object>) -> Option<i64> {
    match resolve(document, object?)? {
        Object::Integer(value) => Some(*value),
        _ => None,
    }
}

fn dictionary_of<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    resolve(document, object)?.as_dict().ok()
}

/// Walks up the page tree until a `/Resources` entry is found, then returns
/// its `/XObject` dictionary.
fn page_xobjects(document: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = document.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            let resources = dictionary_of(document, resources)?;
            return dictionary_of(document, resources.get(b"XObject").ok()?);
        }
        node = dictionary_of(document, node.get(b"Parent").ok()?)?;
    }
    None
}

fn filters_of(document: &Document, dict: &Dictionary) -> Vec<Vec<u8>> {
    let Some(filter) = dict.get(b"Filter").ok().and_then(|object| resolve(document, object)) else {
        return Vec::new();
    };
    match filter {
        Object::Name(name) => vec![name.clone()],
        Object::Array(items) => items
            .iter()
            .filter_map(|item| name_of(resolve(document, item)).map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

fn color_components(document: &Document, object: Option<&Object>) -> Option<u8> {
    match resolve(document, object?)? {
        Object::Name(name) => components_for_family(name),
        Object::Array(items) => {
            let family = name_of(items.first().and_then(|item| resolve(document, item)))?;
            if family == b"ICCBased" {
                let profile = resolve(document, items.get(1)?)?.as_stream().ok()?;
                let count = integer_of(document, profile.dict.get(b"N").ok())?;
                matches!(count, 1 | 3 | 4).then_some(count as u8)
            } else {
                components_for_family(family)
            }
        }
        _ => None,
    }
}

fn components_for_family(family: &[u8]) -> Option<u8> {
    match family {
        b"DeviceGray" | b"CalGray" | b"G" => Some(1),
        b"DeviceRGB" | b"CalRGB" | b"RGB" => Some(3),
        b"DeviceCMYK" | b"CMYK" => Some(4),
        _ => None,
    }
}
