use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the sidebar: title and one entry per page.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(16.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new("Data Science\nSalary Analytics")
                .size(22.0)
                .strong()
                .color(Color32::from_rgb(0x0f, 0xf7, 0xdc)),
        );
    });
    ui.add_space(20.0);
    ui.separator();

    for page in Page::ALL {
        let text = RichText::new(page.label()).size(16.0).strong();
        if ui.selectable_label(state.page == page, text).clicked() {
            state.page = page;
        }
        ui.add_space(4.0);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export this View…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows loaded, {} matching filters",
            state.dashboard.len(),
            state.view.total_matches
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open salary data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save CSV")
        .set_file_name("salaries_view.csv")
        .add_filter("CSV Files", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
