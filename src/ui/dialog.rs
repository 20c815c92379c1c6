use crate::theme::Theme;
use eframe::egui::{self, Align2, RichText};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Message boxes waiting to be acknowledged, shown one at a time.
#[derive(Debug, Default)]
pub struct DialogQueue {
    pending: VecDeque<Dialog>,
}

impl DialogQueue {
    pub fn warning(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, title.into(), message.into());
    }

    pub fn critical(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Critical, title.into(), message.into());
    }

    fn push(&mut self, severity: Severity, title: String, message: String) {
        self.pending.push_back(Dialog {
            severity,
            title,
            message,
        });
    }

    pub fn current(&self) -> Option<&Dialog> {
        self.pending.front()
    }

    pub fn dismiss(&mut self) {
        self.pending.pop_front();
    }

    pub fn show(&mut self, ctx: &egui::Context, theme: &Theme) {
        let Some(dialog) = self.current() else {
            return;
        };

        let color = match dialog.severity {
            Severity::Warning => theme.warning,
            Severity::Critical => theme.danger,
        };
        let mut dismissed = false;
        egui::Window::new(RichText::new(&dialog.title).color(color))
            .id(egui::Id::new("message_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&dialog.message);
                ui.add_space(theme.spacing_8);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            self.dismiss();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialogs_are_acknowledged_in_order() {
        let mut queue = DialogQueue::default();
        queue.warning("Image Error", "Failed to add image");
        queue.critical("Critical Error", "Failed to process PDF");

        assert_eq!(queue.current().map(|dialog| dialog.severity), Some(Severity::Warning));
        queue.dismiss();
        let current = queue.current().expect("second dialog should remain");
        assert_eq!(current.severity, Severity::Critical);
        assert_eq!(current.title, "Critical Error");
        queue.dismiss();
        assert!(queue.current().is_none());
        queue.dismiss();
    }
}
