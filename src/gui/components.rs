    use crate::models::{AttributeStatus, Verdict};
    use eframe::egui;

    pub fn stat_card(ui: &mut egui::Ui, width: f32, height: f32, label: &str, value: &str, color: egui::Color32) {
        egui::Frame::none()
            .fill(egui::Color32::WHITE)
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(230)))
            .rounding(10.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(width);
                ui.set_height(height);
                ui.vertical(|ui| {
                    ui.label(
                        egui::RichText::new(label)
                            .size(11.0)
                            .color(egui::Color32::from_gray(120)),
                    );
                    ui.add_space(8.0);
                    ui.label(egui::RichText::new(value).size(22.0).color(color).strong());
                });
            });
    }

    /// White rounded card with a title, used for every section of the detail panel.
    pub fn section_card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        ui.horizontal(|ui| {
            ui.add_space(20.0);
            egui::Frame::none()
                .fill(egui::Color32::WHITE)
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(220)))
                .rounding(10.0)
                .inner_margin(15.0)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width() - 40.0);
                    ui.label(egui::RichText::new(title).size(14.0).strong());
                    ui.add_space(8.0);
                    add_contents(ui);
                });
            ui.add_space(20.0);
        });
    }

    // Badge colours per verdict band
    pub fn verdict_color(verdict: Verdict) -> egui::Color32 {
        match verdict {
            Verdict::Excellent => egui::Color32::from_rgb(16, 185, 129),
            Verdict::Good => egui::Color32::from_rgb(132, 204, 22),
            Verdict::Fair => egui::Color32::from_rgb(245, 158, 11),
            Verdict::Critical => egui::Color32::from_rgb(239, 68, 68),
            Verdict::Unknown => egui::Color32::from_gray(150),
        }
    }

    pub fn status_color(status: AttributeStatus) -> egui::Color32 {
        match status {
            AttributeStatus::Good => egui::Color32::from_gray(60),
            AttributeStatus::Warning => egui::Color32::from_rgb(217, 119, 6),
            AttributeStatus::Critical => egui::Color32::from_rgb(220, 38, 38),
        }
    }
