use crate::workbench::FilterForm;
use eframe::egui;

pub fn render_filter_form(ui: &mut egui::Ui, subjects: &[String], form: &mut FilterForm) {
    ui.strong("Matéria");
    ui.horizontal_wrapped(|ui| {
        for subject in subjects {
            let selected = form.is_selected(subject);
            if ui.selectable_label(selected, subject.as_str()).clicked() {
                form.set_subject(subject, !selected);
            }
        }
    });

    egui::Grid::new("filter_form")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            field(ui, "Assunto:", &mut form.assunto);
            field(ui, "Sub assunto:", &mut form.sub_assunto);
            field(ui, "Faculdade:", &mut form.faculdade);
            field(ui, "Ano:", &mut form.ano);
        });
}

fn field(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.label(label);
    ui.add(egui::TextEdit::singleline(value).desired_width(f32::INFINITY));
    ui.end_row();
}
