use eframe::egui::{Color32, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points, Polygon,
};

use crate::chart::ChartData;
use crate::color::ColorMap;

const LINE_COLOR: Color32 = Color32::from_rgb(0x02, 0xe6, 0xbe);
const HIST_COLOR: Color32 = Color32::from_rgb(0x22, 0xe6, 0xaf);

// ---------------------------------------------------------------------------
// Chart plot (central panel of the charts page)
// ---------------------------------------------------------------------------

/// Render a built chart. Categorical axes use the group position as x; the
/// legend carries the labels.
pub fn chart_plot(ui: &mut Ui, chart: &ChartData) {
    ui.heading(chart.title());

    let plot = Plot::new("chart_plot")
        .legend(Legend::default())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    match chart {
        ChartData::Histogram { column, bins } => {
            let bars: Vec<Bar> = bins
                .iter()
                .map(|b| {
                    Bar::new((b.start + b.end) / 2.0, b.count as f64)
                        .width(b.end - b.start)
                        .fill(HIST_COLOR)
                })
                .collect();
            plot.x_axis_label(column.as_str())
                .y_axis_label("count")
                .show(ui, |plot_ui| {
                    plot_ui.bar_chart(BarChart::new(bars).name(column.as_str()));
                });
        }

        ChartData::Boxplot {
            value_column,
            boxes,
            ..
        } => {
            let colors = ColorMap::new(boxes.iter().map(|b| b.label.as_str()));
            let elems: Vec<BoxElem> = boxes
                .iter()
                .enumerate()
                .map(|(i, b)| {
                    BoxElem::new(
                        i as f64,
                        BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                    )
                    .name(&b.label)
                    .fill(colors.color_for(&b.label).gamma_multiply(0.5))
                })
                .collect();
            plot.y_axis_label(value_column.as_str()).show(ui, |plot_ui| {
                plot_ui.box_plot(BoxPlot::new(elems).name(value_column.as_str()));
            });
        }

        ChartData::Line(grouped) => {
            let points: Vec<[f64; 2]> = grouped
                .groups
                .iter()
                .enumerate()
                .map(|(i, g)| [i as f64, g.mean])
                .collect();
            let labels: Vec<String> = grouped.groups.iter().map(|g| g.label.clone()).collect();
            plot.x_axis_label(grouped.group_column.as_str())
                .y_axis_label(grouped.value_column.as_str())
                .label_formatter(move |_name, value| {
                    let idx = value.x.round().max(0.0) as usize;
                    let label = labels.get(idx).map(String::as_str).unwrap_or("");
                    format!("{label}\n{:.0}", value.y)
                })
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new(PlotPoints::from(points.clone()))
                            .name(grouped.value_column.as_str())
                            .color(LINE_COLOR)
                            .width(3.5),
                    );
                    plot_ui.points(Points::new(PlotPoints::from(points)).radius(4.0).color(LINE_COLOR));
                });
        }

        ChartData::Bar(grouped) => {
            let colors = ColorMap::new(grouped.groups.iter().map(|g| g.label.as_str()));
            let charts: Vec<BarChart> = grouped
                .groups
                .iter()
                .enumerate()
                .map(|(i, g)| {
                    let color = colors.color_for(&g.label);
                    BarChart::new(vec![Bar::new(i as f64, g.mean).name(&g.label).fill(color)])
                        .name(&g.label)
                        .color(color)
                })
                .collect();
            plot.y_axis_label(format!("Avg. {}", grouped.value_column))
                .show(ui, |plot_ui| {
                    for chart in charts {
                        plot_ui.bar_chart(chart);
                    }
                });
        }

        ChartData::Pie(series) => {
            let mut polygons = Vec::new();
            for (s_idx, s) in series.iter().enumerate() {
                let total = s.total().max(1) as f64;
                let colors = ColorMap::new(s.slices.iter().map(|(l, _)| l.as_str()));
                let center = [s_idx as f64 * 2.5, 0.0];
                let mut start = 0.0_f64;
                for (label, count) in &s.slices {
                    let sweep = *count as f64 / total * std::f64::consts::TAU;
                    let share = *count as f64 / total * 100.0;
                    polygons.push(
                        Polygon::new(wedge(center, 1.0, start, start + sweep))
                            .fill_color(colors.color_for(label))
                            .name(format!("{}: {label} ({share:.1}%)", s.column)),
                    );
                    start += sweep;
                }
            }
            plot.data_aspect(1.0)
                .show_axes(false)
                .show_grid(false)
                .show(ui, |plot_ui| {
                    for polygon in polygons {
                        plot_ui.polygon(polygon);
                    }
                });
        }
    }
}

/// Closed polygon approximating a pie wedge between two angles (radians).
fn wedge(center: [f64; 2], radius: f64, from: f64, to: f64) -> PlotPoints<'static> {
    let steps = (((to - from) / std::f64::consts::TAU) * 90.0).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let angle = from + (to - from) * i as f64 / steps as f64;
        points.push([
            center[0] + radius * angle.cos(),
            center[1] + radius * angle.sin(),
        ]);
    }
    PlotPoints::from(points)
}
