use eframe::egui;

use crate::state::{ChartExport, ViewerState};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ResultsApp {
    pub state: ViewerState,
}

impl ResultsApp {
    pub fn new(state: ViewerState) -> Self {
        Self { state }
    }

    /// Ask for a capture once a frame with the plots has been painted, then
    /// write whatever capture comes back.
    fn drive_export(&mut self, ctx: &egui::Context) {
        let captured = ctx.input(|i| {
            i.raw.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });

        match self.state.export {
            ChartExport::Pending => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
                self.state.export = ChartExport::Requested;
                ctx.request_repaint();
            }
            ChartExport::Requested => match captured {
                Some(image) => self.state.finish_export(&image),
                None => ctx.request_repaint(),
            },
            ChartExport::Saved(_) | ChartExport::Failed(_) => {}
        }
    }
}

impl eframe::App for ResultsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: summary + export status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: loss | accuracy ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::metrics_plots(ui, &self.state);
        });

        self.drive_export(ctx);
    }
}
