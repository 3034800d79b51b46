use std::collections::BTreeMap;
use std::f32::consts::TAU;

use datanexus::color::{diverging, generate_palette, ColorMap};
use datanexus::data::chart::{Chart, Marks, XAxis};
use datanexus::data::model::DataType;
use datanexus::data::profile::{CorrelationMatrix, NullCount};
use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points,
};

// ---------------------------------------------------------------------------
// Chart builder output (visualization page)
// ---------------------------------------------------------------------------

/// Draw a [`Chart`] built by the chart builder.
pub fn chart(ui: &mut Ui, chart: &Chart) {
    ui.heading(&chart.title);

    let colors = ColorMap::new(chart.series.iter().map(|s| s.name.as_str()));
    let x_axis = chart.x_axis.clone();

    Plot::new("chart_builder_plot")
        .legend(Legend::default())
        .height(420.0)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .x_axis_formatter(move |mark, _range| match &x_axis {
            XAxis::Numeric => format!("{}", mark.value),
            XAxis::Categorical(_) => x_axis.label_at(mark.value).unwrap_or_default().to_owned(),
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let color = colors.color_for(&series.name);
                match &series.marks {
                    Marks::Line(pts) => {
                        let points: PlotPoints = pts.iter().copied().collect();
                        plot_ui.line(Line::new(points).name(&series.name).color(color).width(1.5));
                    }
                    Marks::Points(pts) => {
                        let points: PlotPoints = pts.iter().copied().collect();
                        plot_ui.points(
                            Points::new(points)
                                .name(&series.name)
                                .color(color)
                                .radius(3.0),
                        );
                    }
                    Marks::Bars(bars) => {
                        let bars = bars
                            .iter()
                            .map(|b| Bar::new(b.x, b.height).width(b.width))
                            .collect();
                        plot_ui.bar_chart(
                            BarChart::new(bars)
                                .name(&series.name)
                                .color(color.gamma_multiply(0.8)),
                        );
                    }
                    Marks::Boxes(boxes) => {
                        let elems = boxes
                            .iter()
                            .map(|b| {
                                BoxElem::new(
                                    b.x,
                                    BoxSpread::new(
                                        b.lower_whisker,
                                        b.q1,
                                        b.median,
                                        b.q3,
                                        b.upper_whisker,
                                    ),
                                )
                                .box_width(b.width)
                            })
                            .collect();
                        plot_ui.box_plot(BoxPlot::new(elems).name(&series.name).color(color));
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Missing values (profiling page)
// ---------------------------------------------------------------------------

/// Bar chart of missing values per column; callers pass only the columns
/// that actually have missing values.
pub fn null_counts(ui: &mut Ui, counts: &[&NullCount]) {
    let labels: Vec<String> = counts.iter().map(|c| c.column.clone()).collect();
    let bars = counts
        .iter()
        .enumerate()
        .map(|(i, c)| Bar::new(i as f64, c.missing as f64).width(0.7).name(&c.column))
        .collect();

    Plot::new("null_counts_plot")
        .height(260.0)
        .y_axis_label("missing values")
        .x_axis_formatter(move |mark, _range| {
            let v = mark.value;
            if v < 0.0 || (v - v.round()).abs() > 1e-6 {
                return String::new();
            }
            labels.get(v.round() as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("missing")
                    .color(Color32::from_rgb(230, 120, 60)),
            );
        });
}

// ---------------------------------------------------------------------------
// Type distribution (profiling page)
// ---------------------------------------------------------------------------

/// Donut chart of columns per type, with a legend.
pub fn type_pie(ui: &mut Ui, distribution: &BTreeMap<DataType, usize>) {
    let total: usize = distribution.values().sum();
    if total == 0 {
        ui.label("No columns.");
        return;
    }
    let palette = generate_palette(distribution.len());

    ui.horizontal(|ui: &mut Ui| {
        let size = 200.0;
        let (rect, _response) = ui.allocate_exact_size(egui::vec2(size, size), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let outer = size / 2.0 - 4.0;
        let inner = outer * 0.4;

        let mut start = -TAU / 4.0;
        for ((_, &count), &color) in distribution.iter().zip(&palette) {
            let sweep = TAU * count as f32 / total as f32;
            // Small wedges keep every polygon convex.
            let steps = ((sweep / 0.1).ceil() as usize).max(1);
            for s in 0..steps {
                let a0 = start + sweep * s as f32 / steps as f32;
                let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                let at = |r: f32, a: f32| center + egui::vec2(a.cos(), a.sin()) * r;
                painter.add(Shape::convex_polygon(
                    vec![at(inner, a0), at(outer, a0), at(outer, a1), at(inner, a1)],
                    color,
                    Stroke::NONE,
                ));
            }
            start += sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            for ((dtype, &count), &color) in distribution.iter().zip(&palette) {
                ui.horizontal(|ui: &mut Ui| {
                    let (swatch, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, color);
                    let pct = 100.0 * count as f64 / total as f64;
                    ui.label(format!("{dtype}: {count} ({pct:.1}%)"));
                });
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Correlation heatmap (profiling page)
// ---------------------------------------------------------------------------

pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.columns.len();
    let cell_size = 48.0;
    let label_width = 140.0;
    let header_height = 24.0;

    egui::ScrollArea::both()
        .id_salt("correlation_heatmap_scroll")
        .show(ui, |ui: &mut Ui| {
            let (rect, _response) = ui.allocate_exact_size(
                egui::vec2(
                    label_width + n as f32 * cell_size,
                    header_height + n as f32 * cell_size,
                ),
                Sense::hover(),
            );
            let painter = ui.painter();
            let text_color = ui.visuals().text_color();

            for (j, name) in matrix.columns.iter().enumerate() {
                painter.text(
                    rect.min
                        + egui::vec2(
                            label_width + (j as f32 + 0.5) * cell_size,
                            header_height - 4.0,
                        ),
                    Align2::CENTER_BOTTOM,
                    truncate(name, 8),
                    FontId::proportional(10.0),
                    text_color,
                );
            }

            for (i, row_name) in matrix.columns.iter().enumerate() {
                let row_top = header_height + i as f32 * cell_size;
                painter.text(
                    rect.min + egui::vec2(label_width - 8.0, row_top + cell_size / 2.0),
                    Align2::RIGHT_CENTER,
                    truncate(row_name, 20),
                    FontId::proportional(11.0),
                    text_color,
                );

                for j in 0..n {
                    let min = rect.min + egui::vec2(label_width + j as f32 * cell_size, row_top);
                    let cell = egui::Rect::from_min_size(min, egui::vec2(cell_size, cell_size));
                    let (fill, label) = match matrix.get(i, j) {
                        Some(r) => (diverging(r), format!("{r:.2}")),
                        None => (ui.visuals().extreme_bg_color, "–".to_owned()),
                    };
                    painter.rect_filled(cell.shrink(1.0), 2.0, fill);
                    painter.text(
                        cell.center(),
                        Align2::CENTER_CENTER,
                        label,
                        FontId::proportional(11.0),
                        contrast_text(fill),
                    );
                }
            }
        });
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_owned()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

fn contrast_text(fill: Color32) -> Color32 {
    let luma = 0.299 * fill.r() as f32 + 0.587 * fill.g() as f32 + 0.114 * fill.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
