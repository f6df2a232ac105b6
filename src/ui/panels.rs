use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{ChartExport, ViewerState};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the toolbar: run summary, re-export button, export status.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Save chart again").clicked() {
                state.export = ChartExport::Pending;
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(state.summary());
        ui.separator();

        match &state.export {
            ChartExport::Failed(_) => {
                if let Some(msg) = state.status_message() {
                    ui.label(RichText::new(msg).color(Color32::RED));
                }
            }
            ChartExport::Saved(_) => {
                if let Some(msg) = state.status_message() {
                    ui.label(msg);
                }
            }
            ChartExport::Pending | ChartExport::Requested => {
                ui.spinner();
            }
        }
    });
}
