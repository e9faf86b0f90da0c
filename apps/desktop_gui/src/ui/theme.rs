//! Theme presets, palette, and text-scale plumbing for the desktop app.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThemePreset {
    SlateDark,
    GraphiteDark,
    PaperLight,
}

impl ThemePreset {
    pub(crate) fn label(self) -> &'static str {
        match self {
            ThemePreset::SlateDark => "Slate (Dark)",
            ThemePreset::GraphiteDark => "Graphite (Dark)",
            ThemePreset::PaperLight => "Paper (Light)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ThemeSettings {
    pub(crate) preset: ThemePreset,
    pub(crate) accent_color: egui::Color32,
    pub(crate) panel_rounding: u8,
    pub(crate) list_row_shading: bool,
}

impl ThemeSettings {
    pub(crate) fn slate_default() -> Self {
        Self {
            preset: ThemePreset::SlateDark,
            accent_color: egui::Color32::from_rgb(47, 137, 108),
            panel_rounding: 10,
            list_row_shading: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct UiReadabilitySettings {
    pub(crate) text_scale: f32,
    pub(crate) compact_density: bool,
    pub(crate) show_car_photos: bool,
}

impl UiReadabilitySettings {
    pub(crate) fn defaults() -> Self {
        Self {
            text_scale: 1.0,
            compact_density: false,
            show_car_photos: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SlateDarkPalette {
    // Backgrounds:
    pub(crate) app_background: egui::Color32,
    pub(crate) nav_background: egui::Color32,
    pub(crate) card_background: egui::Color32,
    pub(crate) card_hover: egui::Color32,

    // Text:
    pub(crate) title_text: egui::Color32,
    pub(crate) body_text: egui::Color32,
    pub(crate) hint_text: egui::Color32,

    // Strokes:
    pub(crate) item_stroke: egui::Color32,
    pub(crate) item_stroke_active: egui::Color32,
}

pub(crate) fn slate_dark_palette(theme: ThemeSettings) -> Option<SlateDarkPalette> {
    (theme.preset == ThemePreset::SlateDark).then_some({
        SlateDarkPalette {
            // Backgrounds:
            app_background: egui::Color32::from_rgb(24, 26, 29),
            nav_background: egui::Color32::from_rgb(17, 18, 21),
            card_background: egui::Color32::from_rgb(31, 34, 38),
            card_hover: egui::Color32::from_rgb(40, 44, 49),
            // Text:
            title_text: egui::Color32::from_rgb(245, 246, 248),
            body_text: egui::Color32::from_rgb(222, 224, 228),
            hint_text: egui::Color32::from_rgb(128, 132, 141),
            // Strokes:
            item_stroke: egui::Color32::from_rgb(48, 51, 58),
            item_stroke_active: egui::Color32::from_rgb(95, 99, 110),
        }
    })
}

pub(crate) fn slate_dark_fallback_palette() -> SlateDarkPalette {
    slate_dark_palette(ThemeSettings::slate_default())
        .expect("SlateDark fallback palette should always exist")
}

pub(crate) fn visuals_for_theme(theme: ThemeSettings) -> egui::Visuals {
    let mut visuals = match theme.preset {
        ThemePreset::SlateDark => {
            let mut v = egui::Visuals::dark();
            let palette = slate_dark_palette(theme)
                .expect("SlateDark palette should exist for SlateDark preset");
            v.override_text_color = None;
            v.window_fill = palette.app_background;
            v.panel_fill = palette.app_background;
            v.extreme_bg_color = palette.card_background;
            v.faint_bg_color = egui::Color32::from_rgb(29, 31, 34);
            v
        }
        ThemePreset::GraphiteDark => {
            let mut v = egui::Visuals::dark();
            v.override_text_color = Some(egui::Color32::from_rgb(200, 203, 207));
            v.window_fill = egui::Color32::from_rgb(34, 36, 40);
            v.panel_fill = egui::Color32::from_rgb(28, 30, 34);
            v.extreme_bg_color = egui::Color32::from_rgb(20, 21, 24);
            v.faint_bg_color = egui::Color32::from_rgb(44, 47, 52);
            v
        }
        ThemePreset::PaperLight => egui::Visuals::light(),
    };

    visuals.hyperlink_color = theme.accent_color;
    visuals.selection.bg_fill = theme.accent_color;
    visuals.widgets.active.bg_fill = theme.accent_color;
    visuals.widgets.hovered.bg_fill = theme.accent_color.gamma_multiply(0.85);

    // Popup/menu polish so menu_button dropdowns match the active theme.
    let popup_radius = theme.panel_rounding.clamp(4, 16);
    visuals.menu_corner_radius = egui::CornerRadius::same(popup_radius);
    visuals.window_corner_radius = egui::CornerRadius::same(popup_radius.saturating_add(2));

    if let Some(palette) = slate_dark_palette(theme) {
        visuals.window_fill = palette.nav_background;
        visuals.panel_fill = palette.app_background;
        visuals.window_stroke = egui::Stroke::new(1.0, palette.item_stroke);
        visuals.widgets.noninteractive.bg_fill = palette.nav_background;
        visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, palette.item_stroke);
        visuals.widgets.inactive.bg_fill = palette.card_hover;
        visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, palette.item_stroke);
        visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, palette.item_stroke_active);
    }

    visuals
}

pub(crate) fn scaled_text_styles(text_scale: f32) -> BTreeMap<egui::TextStyle, egui::FontId> {
    let mut styles = egui::Style::default().text_styles;
    for font in styles.values_mut() {
        font.size *= text_scale;
    }
    styles
}

pub(crate) fn lighten_color(c: egui::Color32, t: f32) -> egui::Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |channel: u8| -> u8 {
        let channel = channel as f32;
        (channel + (255.0 - channel) * t).round().clamp(0.0, 255.0) as u8
    };
    egui::Color32::from_rgba_unmultiplied(mix(c.r()), mix(c.g()), mix(c.b()), c.a())
}
