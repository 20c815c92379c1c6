use crate::config::Config;
use crate::document::{DocumentItem, DocumentLoader};
use crate::event::AppEvent;
use crate::session::store;
use crate::submit::SubmitClient;
use crate::theme::Theme;
use crate::ui::dialog::DialogQueue;
use crate::ui::filter_form::render_filter_form;
use crate::ui::items::render_items;
use crate::ui::previews::render_previews;
use crate::ui::textures::TextureCache;
use crate::workbench::{PreviewContent, Workbench};
use eframe::egui::{self, Color32, RichText, ScrollArea};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

const BUSY_REPAINT_INTERVAL: Duration = Duration::from_millis(100);

pub struct ExamTaggerApp {
    rx: Receiver<AppEvent>,
    loader: DocumentLoader,
    submitter: SubmitClient,
    config: Config,
    theme: Theme,
    workbench: Workbench,
    textures: TextureCache,
    dialogs: DialogQueue,
    pdf_path_input: String,
    image_path_input: String,
    is_converting: bool,
    is_submitting: bool,
    diagnostics_log: Vec<String>,
}

impl ExamTaggerApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        loader: DocumentLoader,
        submitter: SubmitClient,
        config: Config,
        initial_pdf: Option<PathBuf>,
    ) -> Self {
        let mut app = Self {
            rx,
            loader,
            submitter,
            config,
            theme: Theme::default(),
            workbench: Workbench::new(),
            textures: TextureCache::default(),
            dialogs: DialogQueue::default(),
            pdf_path_input: String::new(),
            image_path_input: String::new(),
            is_converting: false,
            is_submitting: false,
            diagnostics_log: Vec::new(),
        };

        if let Some(path) = initial_pdf {
            app.pdf_path_input = path.display().to_string();
            app.upload_pdf();
        }

        app
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn warn_user(&mut self, title: &str, message: String) {
        warn!("{title}: {message}");
        self.log_diagnostic(format!("{title}: {message}"));
        self.dialogs.warning(title, message);
    }

    fn upload_pdf(&mut self) {
        let path = self.pdf_path_input.trim();
        if path.is_empty() {
            self.warn_user("Open PDF", "Enter the path of a PDF file first".to_string());
            return;
        }
        if self.is_converting {
            return;
        }

        let path = PathBuf::from(path);
        self.log_diagnostic(format!("converting {}", path.display()));
        self.is_converting = true;
        self.loader.load(path);
    }

    /// The record must stay exactly as posted until the endpoint answers,
    /// since a 2xx clears the whole panel.
    fn record_locked(&mut self, action: &str) -> bool {
        if self.is_submitting {
            self.log_diagnostic(format!("{action} ignored while a submission is in flight"));
        }
        self.is_submitting
    }

    fn select_item(&mut self, index: usize) {
        if self.record_locked("item click") {
            return;
        }
        let page = self.workbench.items().get(index).map(DocumentItem::page);
        if let (Some(id), Some(page)) = (self.workbench.select_item(index), page) {
            self.log_diagnostic(format!("item {index} on page {page} selected as fragment {id}"));
        }
    }

    fn mark_point(&mut self, fragment_id: u32) {
        if self.record_locked("mark as point") {
            return;
        }
        self.workbench.mark_point(fragment_id);
        self.log_diagnostic(format!("fragment {fragment_id} marked as point"));
    }

    fn add_image(&mut self) {
        if self.record_locked("add image") {
            return;
        }
        let path = self.image_path_input.trim();
        if path.is_empty() {
            self.warn_user("Image Error", "Enter the path of an image file first".to_string());
            return;
        }

        let path = PathBuf::from(path);
        match self.workbench.add_image_file(&path) {
            Ok(id) => {
                self.log_diagnostic(format!("image {} added as fragment {id}", path.display()));
                self.image_path_input.clear();
            }
            Err(err) => self.warn_user("Image Error", format!("Failed to add image:\n{err}")),
        }
    }

    fn confirm_inputs(&mut self) {
        if self.is_submitting {
            return;
        }
        let record = self.workbench.confirm();
        match self.submitter.submit(record) {
            Ok(()) => {
                self.is_submitting = true;
                self.log_diagnostic(format!("submitting to {}", self.submitter.endpoint()));
            }
            Err(err) => self.warn_user("Submission Error", format!("Failed to serialize question:\n{err}")),
        }
    }

    fn export_record(&mut self) {
        let record = self.workbench.confirm();
        match store::export(record, &self.config.export_dir) {
            Ok(path) => {
                info!(path = %path.display(), "question exported");
                self.log_diagnostic(format!("exported {}", path.display()));
            }
            Err(err) => self.warn_user("Export Error", format!("Failed to export question:\n{err}")),
        }
    }

    fn clear_requested(&mut self) {
        if self.record_locked("clear") {
            return;
        }
        self.clear_right_panel();
    }

    fn clear_right_panel(&mut self) {
        self.workbench.clear_panel();
        self.prune_textures();
    }

    fn prune_textures(&mut self) {
        let pictures = self.workbench.items().iter().filter_map(DocumentItem::image);
        let previews = self
            .workbench
            .previews()
            .iter()
            .filter_map(|preview| match &preview.content {
                PreviewContent::Image(image) => Some(image),
                PreviewContent::Text(_) => None,
            });
        self.textures.retain(pictures.chain(previews));
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::DocumentLoaded(document) => {
                self.is_converting = false;
                self.log_diagnostic(format!(
                    "loaded {} ({} pages, {} items)",
                    document.source.display(),
                    document.page_count,
                    document.items.len()
                ));
                let warnings = document.warnings.clone();
                self.workbench.load_document(*document);
                self.textures.clear();
                for warning in warnings {
                    self.log_diagnostic(format!("Processing Warning: {warning}"));
                    self.dialogs.warning("Processing Warning", warning);
                }
            }
            AppEvent::DocumentFailed { path, message } => {
                self.is_converting = false;
                self.log_diagnostic(format!("failed to process {}: {message}", path.display()));
                self.dialogs
                    .critical("Critical Error", format!("Failed to process PDF:\n{message}"));
            }
            AppEvent::SubmitSucceeded { status, body } => {
                self.is_submitting = false;
                self.log_diagnostic(format!("submitted ({status}): {body}"));
                self.clear_right_panel();
            }
            AppEvent::SubmitFailed(message) => {
                self.is_submitting = false;
                self.warn_user("Submission Error", format!("Failed to submit question:\n{message}"));
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Exam Tagger");
                ui.separator();
                match self.workbench.document() {
                    Some(document) => ui.label(format!(
                        "{} · {} pages",
                        document.stem, document.page_count
                    )),
                    None => ui.label(RichText::new("No document").color(Color32::GRAY)),
                };
                ui.separator();
                ui.label(format!("{} fragments", self.workbench.record().fragments().len()));
                ui.separator();
                ui.label(RichText::new(self.submitter.endpoint()).color(self.theme.text_muted));
                if self.is_converting || self.is_submitting {
                    ui.spinner();
                }
            });
        });
    }

    fn render_diagnostics(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("diagnostics").show(ctx, |ui| {
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(entry);
                            }
                        });
                });
        });
    }

    fn render_right_panel(&mut self, ctx: &egui::Context) {
        let default_width = ctx.screen_rect().width() / 3.0;
        egui::SidePanel::right("question_panel")
            .resizable(true)
            .default_width(default_width)
            .show(ctx, |ui| {
                let editable = !self.is_submitting;
                self.theme.card_frame().show(ui, |ui| {
                    ui.add_enabled_ui(editable, |ui| {
                        render_filter_form(ui, &self.config.subjects, &mut self.workbench.form);
                    });
                });
                ui.add_space(self.theme.spacing_8);
                ui.separator();
                ui.add_space(self.theme.spacing_8);

                let actions_height = 150.0;
                let mut clicked_preview = None;
                ScrollArea::vertical()
                    .id_salt("previews")
                    .max_height((ui.available_height() - actions_height).max(120.0))
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        clicked_preview = render_previews(
                            ui,
                            self.workbench.previews(),
                            &self.theme,
                            &mut self.textures,
                        );
                    });
                if let Some(fragment_id) = clicked_preview {
                    self.mark_point(fragment_id);
                }

                ui.add_space(self.theme.spacing_8);
                if ui
                    .add_enabled(!self.is_submitting, egui::Button::new("Confirm"))
                    .clicked()
                {
                    self.confirm_inputs();
                }

                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.image_path_input)
                            .hint_text("Image path (png, jpg, bmp)")
                            .desired_width(ui.available_width() - 90.0),
                    );
                    if ui
                        .add_enabled(editable, egui::Button::new("Add Image"))
                        .clicked()
                    {
                        self.add_image();
                    }
                });

                ui.horizontal(|ui| {
                    if ui.add_enabled(editable, egui::Button::new("Clear")).clicked() {
                        self.clear_requested();
                    }
                    if ui.button("Export JSON").clicked() {
                        self.export_record();
                    }
                });
            });
    }

    fn render_left_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.pdf_path_input)
                        .hint_text("PDF path")
                        .desired_width(ui.available_width() - 110.0),
                );
                let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let clicked = ui
                    .add_enabled(!self.is_converting, egui::Button::new("Upload PDF"))
                    .clicked();
                if clicked || submitted {
                    self.upload_pdf();
                }
            });
            ui.separator();

            let mut clicked_item = None;
            ScrollArea::vertical()
                .id_salt("document_items")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if self.is_converting {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Processing document...");
                        });
                    }
                    clicked_item =
                        render_items(ui, self.workbench.items(), &self.theme, &mut self.textures);
                });

            if let Some(index) = clicked_item {
                self.select_item(index);
            }
        });
    }
}

impl eframe::App for ExamTaggerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        if self.is_converting || self.is_submitting {
            ctx.request_repaint_after(BUSY_REPAINT_INTERVAL);
        }

        self.render_top_bar(ctx);
        self.render_diagnostics(ctx);
        self.render_right_panel(ctx);
        self.render_left_panel(ctx);
        self.dialogs.show(ctx, &self.theme);
    }
}
