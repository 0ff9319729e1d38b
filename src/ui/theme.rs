use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

pub const BG_PANEL: Color32 = Color32::from_rgb(20, 20, 23);
pub const BG_WIDGET: Color32 = Color32::from_rgb(32, 32, 38);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(44, 44, 54);
pub const BG_WIDGET_ACTIVE: Color32 = Color32::from_rgb(56, 56, 70);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(200, 200, 205);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 120, 128);
pub const TEXT_BRIGHT: Color32 = Color32::from_rgb(235, 235, 240);

pub const ACCENT_BLUE: Color32 = Color32::from_rgb(74, 144, 226);
pub const ACCENT_GREEN: Color32 = Color32::from_rgb(70, 170, 90);
pub const ACCENT_ORANGE: Color32 = Color32::from_rgb(210, 150, 50);
pub const ACCENT_RED: Color32 = Color32::from_rgb(200, 60, 60);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 50, 60);

/// Dark panel styling tinted with the default material colour.
pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.window_rounding = Rounding::same(6.0);
    visuals.hyperlink_color = ACCENT_BLUE;
    visuals.warn_fg_color = ACCENT_ORANGE;
    visuals.error_fg_color = ACCENT_RED;
    visuals.selection.bg_fill = ACCENT_BLUE.gamma_multiply(0.4);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT_BLUE);

    let widgets = &mut visuals.widgets;
    widgets.noninteractive.bg_fill = BG_WIDGET;
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    widgets.inactive.bg_fill = BG_WIDGET;
    widgets.inactive.weak_bg_fill = BG_WIDGET;
    widgets.hovered.bg_fill = BG_WIDGET_HOVER;
    widgets.hovered.weak_bg_fill = BG_WIDGET_HOVER;
    widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT_BLUE);
    widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_BRIGHT);
    widgets.active.bg_fill = BG_WIDGET_ACTIVE;
    widgets.active.weak_bg_fill = BG_WIDGET_ACTIVE;
    widgets.active.fg_stroke = Stroke::new(1.0, TEXT_BRIGHT);
    for w in [
        &mut widgets.noninteractive,
        &mut widgets.inactive,
        &mut widgets.hovered,
        &mut widgets.active,
    ] {
        w.rounding = Rounding::same(4.0);
    }

    ctx.style_mut(|style| {
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);
        style.text_styles = [
            (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
            (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
            (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
            (TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional)),
            (TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace)),
        ]
        .into();
    });
}
