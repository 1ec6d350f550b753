use eframe::egui;

use crate::state::{AppState, Page};
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalaryDashboardApp {
    pub state: AppState,
}

impl SalaryDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SalaryDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("nav_panel")
            .default_width(220.0)
            .resizable(false)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::ViewData => pages::table_page(ui, &mut self.state),
            Page::Charts => pages::charts_page(ui, &mut self.state),
            Page::Insights => pages::insights_page(ui, &self.state),
            Page::Predictor => pages::predictor_page(ui, &mut self.state),
            Page::Exit => pages::exit_page(ui, &mut self.state),
        });

        if self.state.quit_requested {
            log::info!("closing dashboard");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}
