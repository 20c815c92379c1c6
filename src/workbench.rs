//! Window state that does not depend on egui: the loaded items, the record
//! being assembled, the previews mirroring it and the filter form.

use crate::document::{ConvertedDocument, DocumentItem, RasterImage};
use crate::error::Result;
use crate::session::{Filter, FragmentType, SessionRecord};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewContent {
    Text(String),
    Image(Arc<RasterImage>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub fragment_id: u32,
    pub content: PreviewContent,
    pub is_point: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    selected_subjects: Vec<String>,
    pub assunto: String,
    pub sub_assunto: String,
    pub faculdade: String,
    pub ano: String,
}

impl FilterForm {
    #[cfg(test)]
    pub fn selected_subjects(&self) -> &[String] {
        &self.selected_subjects
    }

    pub fn is_selected(&self, subject: &str) -> bool {
        self.selected_subjects.iter().any(|selected| selected == subject)
    }

    /// Keeps subjects in the order they were checked.
    pub fn set_subject(&mut self, subject: &str, checked: bool) {
        if checked {
            if !self.is_selected(subject) {
                self.selected_subjects.push(subject.to_string());
            }
        } else {
            self.selected_subjects.retain(|selected| selected != subject);
        }
        debug!("selected subjects: {:?}", self.selected_subjects);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_filter(&self) -> Filter {
        Filter::confirmed(
            self.selected_subjects.clone(),
            &self.assunto,
            &self.sub_assunto,
            &self.faculdade,
            &self.ano,
        )
    }
}

#[derive(Debug, Default)]
pub struct Workbench {
    document: Option<ConvertedDocument>,
    record: SessionRecord,
    previews: Vec<Preview>,
    pub form: FilterForm,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&ConvertedDocument> {
        self.document.as_ref()
    }

    pub fn items(&self) -> &[DocumentItem] {
        self.document
            .as_ref()
            .map(|document| document.items.as_slice())
            .unwrap_or_default()
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn previews(&self) -> &[Preview] {
        &self.previews
    }

    /// Replaces the left panel contents and starts a fresh record.
    pub fn load_document(&mut self, document: ConvertedDocument) {
        self.clear_panel();
        self.document = Some(document);
    }

    /// Appends the fragment for the item at `index`. Returns the new fragment
    /// id, or `None` when the index is out of range.
    pub fn select_item(&mut self, index: usize) -> Option<u32> {
        let item = self.items().get(index)?;
        let (value, kind) = item.fragment();
        let content = match item.image() {
            Some(image) => PreviewContent::Image(Arc::clone(image)),
            None => PreviewContent::Text(value.clone()),
        };

        let id = self.record.append(value, kind);
        self.previews.push(Preview {
            fragment_id: id,
            content,
            is_point: false,
        });
        Some(id)
    }

    pub fn add_image(&mut self, image: Arc<RasterImage>) -> u32 {
        let id = self
            .record
            .append(image.png_base64().to_string(), FragmentType::Image);
        self.previews.push(Preview {
            fragment_id: id,
            content: PreviewContent::Image(image),
            is_point: false,
        });
        id
    }

    pub fn add_image_file(&mut self, path: &Path) -> Result<u32> {
        let image = RasterImage::open(path)?;
        Ok(self.add_image(Arc::new(image)))
    }

    /// Re-tags a text preview and its fragment as a point. Image previews and
    /// unknown ids are left alone.
    pub fn mark_point(&mut self, fragment_id: u32) {
        let Some(preview) = self
            .previews
            .iter_mut()
            .find(|preview| preview.fragment_id == fragment_id)
        else {
            self.record.mark_as_point(fragment_id);
            return;
        };
        if matches!(preview.content, PreviewContent::Text(_)) {
            preview.is_point = true;
            self.record.mark_as_point(fragment_id);
        }
    }

    /// Drops previews, fragments, the id counter and the filter form.
    pub fn clear_panel(&mut self) {
        self.record.reset();
        self.previews.clear();
        self.form.clear();
    }

    /// Copies the form into the record filter and returns what should be sent.
    pub fn confirm(&mut self) -> &SessionRecord {
        self.record.set_filter(self.form.to_filter());
        &self.record
    }
}
