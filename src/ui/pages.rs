use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::chart::ChartKind;
use crate::data::filter::Selection;
use crate::insights::format_usd;
use crate::ml::features::CATEGORICAL_COLUMNS;
use crate::state::AppState;
use crate::ui::plot;

const ACCENT: Color32 = Color32::from_rgb(0x1d, 0xe9, 0xb6);

fn pretty(column: &str) -> String {
    column
        .split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// View Data
// ---------------------------------------------------------------------------

/// Filter drop-downs above the capped data table.
pub fn table_page(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for (column, current) in state.filters.clone() {
            ui.label(format!("{}:", pretty(&column)));
            let choices = state.dashboard.choices(&column).unwrap_or_default();
            let shown = match &current {
                Selection::All => "All".to_string(),
                Selection::Value(v) => v.clone(),
            };
            egui::ComboBox::from_id_salt(format!("filter_{column}"))
                .selected_text(shown)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(current == Selection::All, "All")
                        .clicked()
                    {
                        state.set_filter(&column, Selection::All);
                    }
                    for choice in &choices {
                        let selected = matches!(&current, Selection::Value(v) if v == choice);
                        if ui.selectable_label(selected, choice).clicked() {
                            state.set_filter(&column, Selection::Value(choice.clone()));
                        }
                    }
                });
        }
        if ui.button("Export this View").clicked() {
            crate::ui::panels::export_file_dialog(state);
        }
    });

    let shown = state.view.table.len();
    ui.label(format!(
        "Showing {shown} of {} matching rows",
        state.view.total_matches
    ));
    ui.separator();

    let table = &state.view.table;
    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0), table.columns().len())
            .header(22.0, |mut header| {
                for col in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col);
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, table.len(), |mut row| {
                    let cells = &table.rows()[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Graphs & Trends
// ---------------------------------------------------------------------------

/// Chart kind, column checkboxes and the rendered chart.
pub fn charts_page(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Chart Type:");
        egui::ComboBox::from_id_salt("chart_kind")
            .selected_text(state.chart_kind.label())
            .show_ui(ui, |ui: &mut Ui| {
                for kind in ChartKind::ALL {
                    if ui
                        .selectable_label(state.chart_kind == kind, kind.label())
                        .clicked()
                    {
                        state.set_chart_kind(kind);
                    }
                }
            });

        if ui.button("Visualize").clicked() {
            state.render_chart();
        }
    });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.strong("Select Columns:");
        for col in state.chart_column_options() {
            let mut checked = state.chart_columns.contains(&col);
            if ui.checkbox(&mut checked, &col).changed() {
                state.toggle_chart_column(&col);
            }
        }
    });
    ui.label(
        RichText::new("Histogram: 1 numeric column | Boxplot/Line/Bar: 2 columns (group, value) | Pie: 1 or more")
            .italics(),
    );
    ui.separator();

    match &state.chart {
        Some(chart) => plot::chart_plot(ui, chart),
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Pick a chart type and columns, then press Visualize");
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

fn card(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new(title).size(19.0).strong());
        ui.add_space(6.0);
        add_contents(ui);
    });
    ui.add_space(12.0);
}

fn ranking(ui: &mut Ui, entries: &[(String, f64)], color: Color32) {
    for (label, mean) in entries {
        ui.horizontal(|ui: &mut Ui| {
            ui.strong(format!("{label}:"));
            ui.label(RichText::new(format_usd(*mean)).size(17.0).color(color));
        });
    }
}

/// Precomputed summary cards.
pub fn insights_page(ui: &mut Ui, state: &AppState) {
    let insights = state.dashboard.insights();
    let top_n = state.config.insight_top_n;

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        card(ui, &format!("Top {top_n} Highest Paying Roles"), |ui| {
            ranking(ui, &insights.top_roles, Color32::from_rgb(0x00, 0xff, 0xc0));
        });
        card(ui, &format!("Top {top_n} Countries by Avg. Salary"), |ui| {
            ranking(ui, &insights.top_countries, Color32::from_rgb(0xe1, 0x84, 0xff));
        });
        card(ui, "At a Glance", |ui| {
            ui.label(format!("Distinct Roles: {}", insights.distinct_roles));
            ui.label(format!("Distinct Countries: {}", insights.distinct_countries));
            ui.label(format!("Records: {}", insights.rows));
            if let Some(mean) = insights.mean_salary {
                ui.label(format!("Average Salary: {}", format_usd(mean)));
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Salary Predictor
// ---------------------------------------------------------------------------

/// One drop-down per feature and the prediction readout.
pub fn predictor_page(ui: &mut Ui, state: &mut AppState) {
    ui.label(
        RichText::new("Live Salary Prediction Terminal")
            .monospace()
            .size(19.0)
            .color(ACCENT),
    );
    ui.add_space(12.0);

    egui::Grid::new("predictor_fields")
        .num_columns(2)
        .spacing([24.0, 10.0])
        .show(ui, |ui: &mut Ui| {
            for col in CATEGORICAL_COLUMNS {
                ui.label(RichText::new(format!("{}:", pretty(col))).monospace());
                let current = state.request.categorical(col).unwrap_or_default().to_string();
                let choices = state.dashboard.bank().classes(col).unwrap_or_default();
                let mut picked = None;
                egui::ComboBox::from_id_salt(format!("predict_{col}"))
                    .selected_text(&current)
                    .width(260.0)
                    .show_ui(ui, |ui: &mut Ui| {
                        for choice in choices {
                            if ui.selectable_label(*choice == current, choice).clicked() {
                                picked = Some(choice.clone());
                            }
                        }
                    });
                if let Some(value) = picked {
                    state.request.set_categorical(col, value);
                }
                ui.end_row();
            }

            ui.label(RichText::new("Remote Ratio:").monospace());
            let ratios = state.dashboard.remote_ratio_choices();
            egui::ComboBox::from_id_salt("predict_remote_ratio")
                .selected_text(state.request.remote_ratio.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for ratio in ratios {
                        ui.selectable_value(&mut state.request.remote_ratio, ratio, ratio.to_string());
                    }
                });
            ui.end_row();
        });

    ui.add_space(16.0);
    if ui
        .button(RichText::new("PREDICT ✦").size(19.0).strong())
        .clicked()
    {
        state.predict();
    }
    ui.add_space(10.0);

    if let Some(p) = &state.prediction {
        ui.label(
            RichText::new(format!("Estimated Salary: {}", format_usd(p.value)))
                .monospace()
                .size(19.0)
                .color(ACCENT),
        );
        ui.label(
            RichText::new(format!(
                "Tree range (10th–90th pct): {} – {}",
                format_usd(p.low),
                format_usd(p.high)
            ))
            .monospace(),
        );
    }
}

// ---------------------------------------------------------------------------
// Exit
// ---------------------------------------------------------------------------

pub fn exit_page(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(30.0);
    ui.label(
        RichText::new("Thank you for using the Salary Analytics Dashboard.")
            .size(22.0)
            .strong()
            .color(ACCENT),
    );
    ui.add_space(16.0);
    if ui.button(RichText::new("Close Application").size(19.0)).clicked() {
        state.quit_requested = true;
    }
}
