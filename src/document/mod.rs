use crate::error::Result;
use crate::event::AppEvent;
use crate::session::FragmentType;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

pub mod pdf;
pub mod raster;
pub mod segment;
pub mod table;

pub use pdf::PdfConverter;
pub use raster::RasterImage;

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentItem {
    Text {
        page: u32,
        text: String,
        needs_review: bool,
    },
    Table {
        page: u32,
        rows: Vec<Vec<String>>,
        image: Arc<RasterImage>,
    },
    Picture {
        page: u32,
        image: Arc<RasterImage>,
    },
}

impl DocumentItem {
    pub fn page(&self) -> u32 {
        match self {
            Self::Text { page, .. } | Self::Table { page, .. } | Self::Picture { page, .. } => *page,
        }
    }

    /// The raster shown and sent for tables and pictures.
    pub fn image(&self) -> Option<&Arc<RasterImage>> {
        match self {
            Self::Text { .. } => None,
            Self::Table { image, .. } | Self::Picture { image, .. } => Some(image),
        }
    }

    /// The value and type a click on this item contributes to the record.
    pub fn fragment(&self) -> (String, FragmentType) {
        match self {
            Self::Text { text, .. } => (text.clone(), FragmentType::Question),
            Self::Table { image, .. } | Self::Picture { image, .. } => {
                (image.png_base64().to_string(), FragmentType::Image)
            }
        }
    }
}

/// Plain-text form of a table, used when it cannot be drawn.

pub fn table_as_text(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| row.join(" | "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Default)]
pub struct ConvertedDocument {
    pub source: PathBuf,
    pub stem: String,
    pub page_count: usize,
    pub items: Vec<DocumentItem>,
    /// Per-page or per-image failures that did not stop the conversion.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemCounts {
    pub text: usize,
    pub tables: usize,
    pub pictures: usize,
}

impl ConvertedDocument {
    pub fn counts(&self) -> ItemCounts {
        self.items.iter().fold(ItemCounts::default(), |mut counts, item| {
            match item {
                DocumentItem::Text { .. } => counts.text += 1,
                DocumentItem::Table { .. } => counts.tables += 1,
                DocumentItem::Picture { .. } => counts.pictures += 1,
            }
            counts
        })
    }
}

pub trait DocumentConverter: Send + Sync {
    fn convert(&self, path: &Path) -> Result<ConvertedDocument>;
}

/// Runs conversions off the UI thread and reports back over the event channel.
#[derive(Clone)]
pub struct DocumentLoader {
    converter: Arc<dyn DocumentConverter>,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl DocumentLoader {
    pub fn new(
        converter: Arc<dyn DocumentConverter>,
        tx: mpsc::Sender<AppEvent>,
        runtime_handle: Handle,
    ) -> Self {
        Self {
            converter,
            tx,
            runtime_handle,
        }
    }

    pub fn load(&self, path: PathBuf) {
        let converter = Arc::clone(&self.converter);
        let tx = self.tx.clone();

        self.runtime_handle.spawn_blocking(move || {
            let event = run_conversion(converter.as_ref(), path);
            let _ = tx.send(event);
        });
    }
}

fn run_conversion(converter: &dyn DocumentConverter, path: PathBuf) -> AppEvent {
    let started = Instant::now();
    info!(path = %path.display(), "converting document");

    match converter.convert(&path) {
        Ok(document) => {
            for warning in &document.warnings {
                warn!("{warning}");
            }
            let counts = document.counts();
            info!(
                "Document processed in {:.2} seconds ({} pages, {} text, {} tables, {} pictures)",
                started.elapsed().as_secs_f64(),
                document.page_count,
                counts.text,
                counts.tables,
                counts.pictures,
            );
            AppEvent::DocumentLoaded(Box::new(document))
        }
        Err(err) => {
            error!(path = %path.display(), "failed to process document: {err}");
            AppEvent::DocumentFailed {
                path,
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    struct FixedConverter(Option<Vec<DocumentItem>>);

    impl DocumentConverter for FixedConverter {
        fn convert(&self, path: &Path) -> Result<ConvertedDocument> {
            match &self.0 {
                Some(items) => Ok(ConvertedDocument {
                    source: path.to_path_buf(),
                    stem: "prova".to_string(),
                    page_count: 1,
                    items: items.clone(),
                    warnings: vec!["picture 1 on page 1 skipped".to_string()],
                }),
                None => Err(AppError::Image("unreadable".to_string())),
            }
        }
    }

    #[test]
    fn table_fragment_is_its_rendered_image() {
        let rows = vec![
            vec!["x".to_string(), "y".to_string()],
            vec!["1".to_string(), "2".to_string()],
        ];
        let image = table::render_table(&rows).expect("table should render");
        let expected = image.png_base64().to_string();
        let item = DocumentItem::Table {
            page: 3,
            rows,
            image: Arc::new(image),
        };
        assert_eq!(item.fragment(), (expected, FragmentType::Image));
        assert_eq!(item.page(), 3);
        assert!(item.image().is_some());
    }

    #[test]
    fn table_text_joins_cells_and_rows() {
        let rows = vec![
            vec!["x".to_string(), "y".to_string()],
            vec!["1".to_string(), "2".to_string()],
        ];
        assert_eq!(table_as_text(&rows), "x | y\n1 | 2");
    }

    #[test]
    fn counts_split_items_by_variant() {
        let picture = Arc::new(RasterImage::from_samples(1, 1, 1, &[0]).expect("raster should build"));
        let document = ConvertedDocument {
            items: vec![
                DocumentItem::Text {
                    page: 1,
                    text: "a".to_string(),
                    needs_review: false,
                },
                DocumentItem::Picture {
                    page: 1,
                    image: Arc::clone(&picture),
                },
                DocumentItem::Picture { page: 2, image: picture },
            ],
            ..Default::default()
        };
        assert_eq!(
            document.counts(),
            ItemCounts {
                text: 1,
                tables: 0,
                pictures: 2
            }
        );
    }

    #[test]
    fn picture_fragment_carries_base64_png() {
        let image = RasterImage::from_samples(1, 1, 1, &[128]).expect("raster should build");
        let expected = image.png_base64().to_string();
        let item = DocumentItem::Picture {
            page: 1,
            image: Arc::new(image),
        };
        assert_eq!(item.fragment(), (expected, FragmentType::Image));
    }

    #[test]
    fn successful_conversion_becomes_loaded_event() {
        let converter = FixedConverter(Some(vec![DocumentItem::Text {
            page: 1,
            text: "1. Enunciado".to_string(),
            needs_review: false,
        }]));
        match run_conversion(&converter, PathBuf::from("prova.pdf")) {
            AppEvent::DocumentLoaded(document) => {
                assert_eq!(document.items.len(), 1);
                assert_eq!(document.counts().text, 1);
                assert_eq!(document.warnings.len(), 1);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn failed_conversion_becomes_failed_event() {
        let converter = FixedConverter(None);
        match run_conversion(&converter, PathBuf::from("broken.pdf")) {
            AppEvent::DocumentFailed { path, message } => {
                assert_eq!(path, PathBuf::from("broken.pdf"));
                assert!(message.contains("unreadable"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn loader_delivers_result_over_channel() {
        let (tx, rx) = mpsc::channel();
        let loader = DocumentLoader::new(
            Arc::new(FixedConverter(Some(Vec::new()))),
            tx,
            Handle::current(),
        );
        loader.load(PathBuf::from("empty.pdf"));

        let event = tokio::task::spawn_blocking(move || rx.recv_timeout(std::time::Duration::from_secs(5)))
            .await
            .expect("receiver task should join")
            .expect("loader should send an event");
        assert!(matches!(event, AppEvent::DocumentLoaded(_)));
    }
}
