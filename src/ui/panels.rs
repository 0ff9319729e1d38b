use egui::{Color32, Context, RichText, Ui};

use crate::ui::state::{MessageLevel, UiState};
use crate::ui::theme::*;
use crate::viewer::ViewerStatus;

#[derive(Default)]
pub struct UiActions {
    pub open_file: bool,
    pub vsync_changed: bool,
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    status: &ViewerStatus,
    fps: f32,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(240.0)
        .max_width(360.0)
        .default_width(280.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(14.0))
        .show(ctx, |ui| {
            ui.heading(RichText::new("OBJ Viewer").strong());
            ui.add_space(4.0);
            ui.label(
                RichText::new("Drag to rotate, scroll to zoom")
                    .color(TEXT_MUTED)
                    .size(11.0),
            );
            ui.add_space(12.0);

            let open = egui::Button::new(RichText::new("Open .obj").color(TEXT_BRIGHT))
                .fill(ACCENT_BLUE)
                .min_size(egui::vec2(ui.available_width(), 32.0));
            if ui.add_enabled(open_button_enabled(state), open).clicked() {
                actions.open_file = true;
            }
            ui.add_space(12.0);
            ui.separator();
            ui.add_space(8.0);

            section_header(ui, "MODEL");
            model_info(ui, status);
            ui.add_space(12.0);

            section_header(ui, "DISPLAY");
            ui.horizontal(|ui| {
                if ui.checkbox(&mut state.vsync_enabled, "VSync").changed() {
                    actions.vsync_changed = true;
                }
                ui.checkbox(&mut state.show_stats, "Stats");
                ui.checkbox(&mut state.show_help, "Help");
            });

            if state.show_stats {
                ui.add_space(12.0);
                stats_panel(ui, status, fps);
            }

            let mut messages = state.messages().peekable();
            if messages.peek().is_some() {
                ui.add_space(12.0);
                section_header(ui, "LOG");
                for message in messages {
                    let color = match message.level {
                        MessageLevel::Info => TEXT_PRIMARY,
                        MessageLevel::Warning => ACCENT_ORANGE,
                        MessageLevel::Error => ACCENT_RED,
                    };
                    ui.label(RichText::new(&message.text).color(color).size(11.0));
                }
            }
        });

    actions
}

/// A running load never blocks the picker; a newer pick supersedes it.
fn open_button_enabled(state: &UiState) -> bool {
    !state.picker_open
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn model_info(ui: &mut Ui, status: &ViewerStatus) {
    if let Some(text) = activity_label(status) {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new(text).color(ACCENT_BLUE));
        });
    }

    match &status.loaded {
        Some(file) => {
            egui::Grid::new("model_info")
                .num_columns(2)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("File").color(TEXT_MUTED));
                    ui.label(RichText::new(&file.file_name).color(TEXT_BRIGHT));
                    ui.end_row();

                    ui.label(RichText::new("Size").color(TEXT_MUTED));
                    ui.label(&file.size);
                    ui.end_row();

                    ui.label(RichText::new("Triangles").color(TEXT_MUTED));
                    ui.label(fmt_num(file.triangles));
                    ui.end_row();
                });
        }
        None if !status.is_loading() => {
            ui.label(RichText::new("No model loaded").color(TEXT_MUTED).italics());
        }
        None => {}
    }

    if let Some(warning) = &status.warning {
        ui.add_space(6.0);
        notice_box(ui, warning, ACCENT_ORANGE, Color32::from_rgb(40, 32, 12));
    }
    if let Some(err) = &status.last_error {
        ui.add_space(6.0);
        notice_box(ui, err, ACCENT_RED, Color32::from_rgb(40, 15, 15));
    }
}

fn activity_label(status: &ViewerStatus) -> Option<String> {
    match (&status.parsing, &status.loading) {
        (Some(parsing), _) => Some(format!("Parsing {}", parsing)),
        (None, Some(loading)) => Some(format!("Loading {}", loading)),
        (None, None) if status.loader_busy => Some("Finishing earlier loads".to_string()),
        (None, None) => None,
    }
}

fn notice_box(ui: &mut Ui, text: &str, color: Color32, fill: Color32) {
    egui::Frame::default()
        .fill(fill)
        .stroke(egui::Stroke::new(1.0, color))
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(text).color(color).size(11.0));
        });
}

fn stats_panel(ui: &mut Ui, status: &ViewerStatus, fps: f32) {
    section_header(ui, "STATISTICS");
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id =
                Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps_color = if fps >= 55.0 {
                ACCENT_GREEN
            } else if fps >= 30.0 {
                ACCENT_ORANGE
            } else {
                ACCENT_RED
            };

            egui::Grid::new("stats")
                .num_columns(2)
                .spacing([20.0, 4.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("FPS").color(TEXT_MUTED));
                    ui.label(RichText::new(format!("{:.0}", fps)).color(fps_color));
                    ui.end_row();

                    let triangles = status.loaded.as_ref().map_or(0, |f| f.triangles);
                    ui.label(RichText::new("Drawn").color(TEXT_MUTED));
                    ui.label(RichText::new(fmt_num(triangles)).color(ACCENT_BLUE));
                    ui.end_row();
                });
        });
}

/// Centered prompt shown while nothing is loaded.
pub fn draw_drop_hint(ctx: &Context) {
    egui::Area::new(egui::Id::new("drop_hint"))
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(-140.0, 0.0))
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                RichText::new("Drop an .obj file here")
                    .color(TEXT_MUTED)
                    .size(18.0),
            );
        });
}

pub fn draw_help_overlay(ctx: &Context, distance: f32) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id =
                        Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(
                        RichText::new("LMB+Drag - Rotate | Scroll - Zoom | Drop - Open")
                            .color(TEXT_MUTED),
                    );
                    ui.label(RichText::new(format!("Distance: {:.2}", distance)).color(TEXT_MUTED));
                });
        });
}

fn fmt_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}
