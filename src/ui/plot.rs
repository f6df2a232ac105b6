use eframe::egui::{Id, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};
use seg_pipeline::results::metrics::Curve;

use crate::color::CurveColors;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Loss / accuracy plots (central panel)
// ---------------------------------------------------------------------------

/// Render loss (left) and accuracy (right) side by side over one epoch axis.
pub fn metrics_plots(ui: &mut Ui, state: &ViewerState) {
    let loss = state.metrics.loss_curves();
    let accuracy = state.metrics.accuracy_curves();

    ui.columns(2, |columns: &mut [Ui]| {
        curve_plot(&mut columns[0], "loss_plot", "Loss", &loss, &state.colors);
        curve_plot(&mut columns[1], "accuracy_plot", "Accuracy", &accuracy, &state.colors);
    });
}

fn curve_plot(ui: &mut Ui, id: &str, y_label: &str, curves: &[Curve], colors: &CurveColors) {
    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("Epoch")
        .y_axis_label(y_label)
        .link_axis(Id::new("epoch_axis"), [true, false])
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for curve in curves {
                let points: PlotPoints = curve.points.iter().copied().collect();
                let line = Line::new(points)
                    .name(curve.name)
                    .color(colors.color_for(curve.name))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}
