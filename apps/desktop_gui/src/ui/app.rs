use std::{collections::HashMap, fs, path::PathBuf};

use arboard::Clipboard;
use serde::{Deserialize, Serialize};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{
    classify_sign_in_failure, UiErrorCategory, UiErrorContext, UiEvent,
};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::theme::{
    lighten_color, scaled_text_styles, slate_dark_fallback_palette, slate_dark_palette,
    visuals_for_theme, SlateDarkPalette, ThemePreset, ThemeSettings, UiReadabilitySettings,
};
use crate::ui::widgets::{
    booking_status_color, payment_status_color, stat_card, DateTimeField,
};
use client_core::views;
use crossbeam_channel::{Receiver, Sender};
use datetime_picker::{DateTimeSelector, SelectorConfig};
use eframe::egui;
use egui::TextureHandle;
use shared::{
    domain::{CarId, OrderId, PaymentStatus, Role, UserProfile},
    protocol::{BookingSummary, Car, EarningsReport, PaymentOrder},
};

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
    pub data_dir: Option<PathBuf>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
            data_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_root: PathBuf,
    pub session_path: PathBuf,
}

impl AppPaths {
    pub fn from_startup(startup: &StartupConfig) -> anyhow::Result<Self> {
        let root = if let Some(p) = &startup.data_dir {
            p.clone()
        } else {
            let base = dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("unable to resolve local app data dir"))?;
            base.join("rental_desk")
        };

        Ok(Self {
            session_path: root.join("session.json"),
            data_root: root,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
    Success,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Auth => "Authentication",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Payment => "Payment",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Admin => "Admin",
        Role::Owner => "Owner",
    }
}

fn server_environment_label(server_url: &str) -> &'static str {
    let server = server_url.to_ascii_lowercase();
    if server.contains("127.0.0.1") || server.contains("localhost") {
        "Local"
    } else if server.contains("staging") {
        "Staging"
    } else if server.contains("dev") {
        "Development"
    } else {
        "Production"
    }
}

fn status_chip(ui: &mut egui::Ui, color: egui::Color32, label: &str) {
    egui::Frame::NONE
        .fill(color.gamma_multiply(0.18))
        .stroke(egui::Stroke::new(1.0, color))
        .corner_radius(egui::CornerRadius::same(6))
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(label).small().color(color));
        });
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn bookings_csv(bookings: &[BookingSummary]) -> String {
    let mut out =
        String::from("booking_id,car_name,customer_email,start_at,end_at,status,total_amount\n");
    for booking in bookings {
        out.push_str(&format!(
            "{},{},{},{},{},{},{:.2}\n",
            booking.booking_id.0,
            csv_field(&booking.car_name),
            csv_field(&booking.customer_email),
            booking.start_at.format("%Y-%m-%d %H:%M"),
            booking.end_at.format("%Y-%m-%d %H:%M"),
            booking.status.label(),
            booking.total_amount,
        ));
    }
    out
}

#[derive(Clone)]
pub(crate) struct CarPhoto {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) rgba: Vec<u8>,
}

enum CarPhotoState {
    Loading,
    Ready {
        photo: CarPhoto,
        texture: Option<TextureHandle>,
    },
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    SignIn,
    Dashboard,
    Owner,
    Payment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignInFocusField {
    Server,
    Email,
    Password,
}

#[derive(Debug, Clone)]
struct SignInUiState {
    focus: Option<SignInFocusField>,
    attempted_auto_focus: bool,
}

impl Default for SignInUiState {
    fn default() -> Self {
        Self {
            focus: Some(SignInFocusField::Email),
            attempted_auto_focus: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnerTab {
    Overview,
    Cars,
    Bookings,
    Earnings,
}

impl OwnerTab {
    fn label(self) -> &'static str {
        match self {
            OwnerTab::Overview => "Overview",
            OwnerTab::Cars => "Cars",
            OwnerTab::Bookings => "Bookings",
            OwnerTab::Earnings => "Earnings",
        }
    }
}

/// Booking dialog state. Each selector keeps its own committed value, so a
/// cancelled dialog never leaks half-edited dates into the request.
struct BookingDialogState {
    car_id: CarId,
    car_name: String,
    price_per_day: f64,
    pickup_at: DateTimeSelector,
    return_at: DateTimeSelector,
}

impl BookingDialogState {
    fn for_car(car: &Car) -> Self {
        Self {
            car_id: car.car_id,
            car_name: car.name.clone(),
            price_per_day: car.price_per_day,
            pickup_at: DateTimeSelector::new(SelectorConfig {
                placeholder: "Pick pickup date and time".to_string(),
                ..SelectorConfig::default()
            }),
            return_at: DateTimeSelector::new(SelectorConfig {
                placeholder: "Pick return date and time".to_string(),
                ..SelectorConfig::default()
            }),
        }
    }
}

struct PaymentUiState {
    order_id: OrderId,
    order: Option<PaymentOrder>,
    verified: Option<PaymentStatus>,
    checkout_presented: bool,
}

impl PaymentUiState {
    fn for_order(order_id: OrderId) -> Self {
        Self {
            order_id,
            order: None,
            verified: None,
            checkout_presented: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum PersistedThemePreset {
    SlateDark,
    GraphiteDark,
    PaperLight,
}

impl From<ThemePreset> for PersistedThemePreset {
    fn from(value: ThemePreset) -> Self {
        match value {
            ThemePreset::SlateDark => Self::SlateDark,
            ThemePreset::GraphiteDark => Self::GraphiteDark,
            ThemePreset::PaperLight => Self::PaperLight,
        }
    }
}

impl From<PersistedThemePreset> for ThemePreset {
    fn from(value: PersistedThemePreset) -> Self {
        match value {
            PersistedThemePreset::SlateDark => Self::SlateDark,
            PersistedThemePreset::GraphiteDark => Self::GraphiteDark,
            PersistedThemePreset::PaperLight => Self::PaperLight,
        }
    }
}

const DEFAULT_CAR_CARD_WIDTH: f32 = 260.0;
const MIN_CAR_CARD_WIDTH: f32 = 220.0;
const MAX_CAR_CARD_WIDTH: f32 = 360.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedDesktopSettings {
    theme_preset: PersistedThemePreset,
    accent_color: [u8; 4],
    panel_rounding: u8,
    list_row_shading: bool,
    text_scale: f32,
    compact_density: bool,
    show_car_photos: bool,
    car_card_width: f32,
}

impl Default for PersistedDesktopSettings {
    fn default() -> Self {
        let theme = ThemeSettings::slate_default();
        let readability = UiReadabilitySettings::defaults();
        Self {
            theme_preset: theme.preset.into(),
            accent_color: [
                theme.accent_color.r(),
                theme.accent_color.g(),
                theme.accent_color.b(),
                theme.accent_color.a(),
            ],
            panel_rounding: theme.panel_rounding,
            list_row_shading: theme.list_row_shading,
            text_scale: readability.text_scale,
            compact_density: readability.compact_density,
            show_car_photos: readability.show_car_photos,
            car_card_width: DEFAULT_CAR_CARD_WIDTH,
        }
    }
}

impl PersistedDesktopSettings {
    fn into_runtime(self) -> (ThemeSettings, UiReadabilitySettings, f32) {
        (
            ThemeSettings {
                preset: self.theme_preset.into(),
                accent_color: egui::Color32::from_rgba_unmultiplied(
                    self.accent_color[0],
                    self.accent_color[1],
                    self.accent_color[2],
                    self.accent_color[3],
                ),
                panel_rounding: self.panel_rounding.min(16),
                list_row_shading: self.list_row_shading,
            },
            UiReadabilitySettings {
                text_scale: self.text_scale.clamp(0.8, 1.4),
                compact_density: self.compact_density,
                show_car_photos: self.show_car_photos,
            },
            self.car_card_width
                .clamp(MIN_CAR_CARD_WIDTH, MAX_CAR_CARD_WIDTH),
        )
    }

    fn from_runtime(
        theme: ThemeSettings,
        readability: UiReadabilitySettings,
        car_card_width: f32,
    ) -> Self {
        Self {
            theme_preset: theme.preset.into(),
            accent_color: [
                theme.accent_color.r(),
                theme.accent_color.g(),
                theme.accent_color.b(),
                theme.accent_color.a(),
            ],
            panel_rounding: theme.panel_rounding,
            list_row_shading: theme.list_row_shading,
            text_scale: readability.text_scale,
            compact_density: readability.compact_density,
            show_car_photos: readability.show_car_photos,
            car_card_width: car_card_width.clamp(MIN_CAR_CARD_WIDTH, MAX_CAR_CARD_WIDTH),
        }
    }
}

pub const SETTINGS_STORAGE_KEY: &str = "rental_desk.settings";

pub struct RentalDeskApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    server_url: String,
    email: String,
    password: String,
    profile: Option<UserProfile>,
    screen: Screen,
    sign_in_ui: SignInUiState,

    status: String,
    status_banner: Option<StatusBanner>,

    live_cars: Vec<Car>,
    search_input: String,
    location_input: String,
    car_photos: HashMap<CarId, CarPhotoState>,
    booking: Option<BookingDialogState>,
    payment: Option<PaymentUiState>,

    owner_tab: OwnerTab,
    owner_cars: Vec<Car>,
    owner_bookings: Vec<BookingSummary>,
    owner_earnings: Option<EarningsReport>,

    settings_open: bool,
    theme: ThemeSettings,
    applied_theme: Option<ThemeSettings>,
    readability: UiReadabilitySettings,
    applied_readability: Option<UiReadabilitySettings>,
    car_card_width: f32,
}

impl RentalDeskApp {
    pub(crate) fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted_settings: Option<PersistedDesktopSettings>,
        startup: StartupConfig,
    ) -> Self {
        let (theme, readability, car_card_width) =
            persisted_settings.unwrap_or_default().into_runtime();
        Self {
            cmd_tx,
            ui_rx,
            server_url: startup.server_url,
            email: String::new(),
            password: String::new(),
            profile: None,
            screen: Screen::SignIn,
            sign_in_ui: SignInUiState::default(),
            status: "Not signed in".to_string(),
            status_banner: None,
            live_cars: Vec::new(),
            search_input: String::new(),
            location_input: String::new(),
            car_photos: HashMap::new(),
            booking: None,
            payment: None,
            owner_tab: OwnerTab::Overview,
            owner_cars: Vec::new(),
            owner_bookings: Vec::new(),
            owner_earnings: None,
            settings_open: false,
            theme,
            applied_theme: None,
            readability,
            applied_readability: None,
            car_card_width,
        }
    }

    fn palette(&self) -> SlateDarkPalette {
        slate_dark_palette(self.theme).unwrap_or_else(slate_dark_fallback_palette)
    }

    fn adopt_profile(&mut self, profile: UserProfile, headline: &str) {
        self.status = format!("{headline} as {}", profile.display_name());
        self.status_banner = None;
        self.profile = Some(profile);
        self.screen = Screen::Dashboard;
        self.booking = None;
        self.payment = None;
        self.owner_cars.clear();
        self.owner_bookings.clear();
        self.owner_earnings = None;
        dispatch_backend_command(&self.cmd_tx, BackendCommand::FetchLiveCars, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::SignedIn(profile) => {
                    self.password.clear();
                    self.adopt_profile(profile, "Signed in");
                }
                UiEvent::SessionRestored(profile) => {
                    self.adopt_profile(profile, "Session restored");
                }
                UiEvent::SignedOut => {
                    self.profile = None;
                    self.screen = Screen::SignIn;
                    self.status = "Signed out".to_string();
                    self.status_banner = None;
                    self.password.clear();
                    self.live_cars.clear();
                    self.car_photos.clear();
                    self.booking = None;
                    self.payment = None;
                    self.owner_cars.clear();
                    self.owner_bookings.clear();
                    self.owner_earnings = None;
                }
                UiEvent::LiveCarsLoaded(cars) => {
                    self.status = format!("{} cars live", cars.len());
                    self.car_photos
                        .retain(|car_id, _| cars.iter().any(|car| car.car_id == *car_id));
                    self.live_cars = cars;
                }
                UiEvent::OwnerDashboardLoaded { cars, bookings } => {
                    self.owner_cars = cars;
                    self.owner_bookings = bookings;
                    self.status = "Owner dashboard refreshed".to_string();
                }
                UiEvent::OwnerEarningsLoaded(report) => {
                    self.owner_earnings = Some(report);
                }
                UiEvent::BookingCreated(response) => {
                    self.booking = None;
                    self.payment = Some(PaymentUiState::for_order(response.order_id.clone()));
                    self.screen = Screen::Payment;
                    self.status = format!(
                        "Booking #{} created - settle the payment to hold the car",
                        response.booking_id.0
                    );
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::FetchPaymentOrder {
                            order_id: response.order_id,
                        },
                        &mut self.status,
                    );
                }
                UiEvent::PaymentOrderLoaded(order) => {
                    if let Some(payment) = self.payment.as_mut() {
                        if payment.order_id == order.order_id {
                            payment.order = Some(order);
                        }
                    }
                }
                UiEvent::CheckoutPresented { order_id } => {
                    if let Some(payment) = self.payment.as_mut() {
                        payment.checkout_presented = true;
                    }
                    self.status = format!("Opened checkout for {order_id} in your browser");
                }
                UiEvent::PaymentStatusLoaded { order_id, status } => {
                    if let Some(payment) = self.payment.as_mut() {
                        payment.verified = Some(status);
                        if let Some(order) = payment.order.as_mut() {
                            order.status = status;
                        }
                    }
                    match status {
                        PaymentStatus::Paid => {
                            self.status = format!("Payment {order_id} settled");
                            self.status_banner = Some(StatusBanner {
                                severity: StatusBannerSeverity::Success,
                                message:
                                    "Payment confirmed. Your booking now awaits owner approval."
                                        .to_string(),
                            });
                        }
                        PaymentStatus::Failed => {
                            self.status = format!("Payment {order_id} failed");
                            self.status_banner = Some(StatusBanner {
                                severity: StatusBannerSeverity::Error,
                                message: "Payment failed. Reopen checkout to try again."
                                    .to_string(),
                            });
                        }
                        PaymentStatus::Created => {
                            self.status =
                                format!("Payment {order_id} is not settled yet");
                        }
                    }
                }
                UiEvent::CarDeleted(car_id) => {
                    self.owner_cars.retain(|car| car.car_id != car_id);
                    self.live_cars.retain(|car| car.car_id != car_id);
                    self.car_photos.remove(&car_id);
                    self.status = format!("Car #{} removed from the listing", car_id.0);
                }
                UiEvent::CarImageLoaded { car_id, image } => {
                    self.car_photos.insert(
                        car_id,
                        CarPhotoState::Ready {
                            photo: image,
                            texture: None,
                        },
                    );
                }
                UiEvent::CarImageFailed { car_id, reason } => {
                    self.car_photos.insert(car_id, CarPhotoState::Failed(reason));
                }
                UiEvent::Error(err) => {
                    if err.requires_reauth() {
                        self.profile = None;
                        self.screen = Screen::SignIn;
                        self.status = format!("Authentication error: {}", err.message());
                        self.status_banner = Some(StatusBanner {
                            severity: StatusBannerSeverity::Error,
                            message:
                                "Session expired or invalid credentials. Please sign in again."
                                    .to_string(),
                        });
                        self.sign_in_ui.focus = Some(SignInFocusField::Email);
                    } else {
                        self.status = if err.context() == UiErrorContext::SignIn {
                            classify_sign_in_failure(err.message())
                        } else {
                            format!("{} error: {}", err_label(err.category()), err.message())
                        };
                        if matches!(
                            err.context(),
                            UiErrorContext::SignIn
                                | UiErrorContext::Booking
                                | UiErrorContext::Payment
                                | UiErrorContext::BackendStartup
                        ) {
                            self.status_banner = Some(StatusBanner {
                                severity: StatusBannerSeverity::Error,
                                message: self.status.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    fn apply_theme_if_needed(&mut self, ctx: &egui::Context) {
        if self.applied_theme == Some(self.theme)
            && self.applied_readability == Some(self.readability)
        {
            return;
        }

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals_for_theme(self.theme);
        style.text_styles = scaled_text_styles(self.readability.text_scale);

        // Make text inputs reliably clickable and visible:
        style.visuals.widgets.inactive.bg_stroke =
            egui::Stroke::new(1.0, style.visuals.widgets.noninteractive.bg_stroke.color);
        style.visuals.widgets.hovered.bg_stroke =
            egui::Stroke::new(1.0, style.visuals.widgets.hovered.bg_stroke.color);
        style.visuals.widgets.active.bg_stroke =
            egui::Stroke::new(1.2, style.visuals.selection.bg_fill.gamma_multiply(0.9));

        if self.readability.compact_density {
            style.spacing.item_spacing = egui::vec2(6.0, 4.0);
            style.spacing.button_padding = egui::vec2(8.0, 5.0);
            style.spacing.interact_size = egui::vec2(40.0, 24.0);
        } else {
            style.spacing.item_spacing = egui::vec2(8.0, 6.0);
            style.spacing.button_padding = egui::vec2(10.0, 6.0);
            style.spacing.interact_size = egui::vec2(40.0, 30.0);
        }
        ctx.set_style(style);
        self.applied_theme = Some(self.theme);
        self.applied_readability = Some(self.readability);
    }

    fn popup_corner_radius(&self) -> egui::CornerRadius {
        egui::CornerRadius::same(self.theme.panel_rounding)
    }

    fn apply_popup_menu_style(&self, ui: &mut egui::Ui) {
        let s = ui.style_mut();
        let radius = self.popup_corner_radius();
        s.spacing.button_padding = egui::vec2(8.0, 4.0);
        s.spacing.item_spacing = egui::vec2(6.0, 4.0);
        s.visuals.widgets.inactive.corner_radius = radius;
        s.visuals.widgets.hovered.corner_radius = radius;
        s.visuals.widgets.active.corner_radius = radius;
        s.visuals.widgets.open.corner_radius = radius;
        s.visuals.widgets.noninteractive.corner_radius = radius;
    }

    fn show_popup_section_title(&self, ui: &mut egui::Ui, title: &str) {
        ui.label(
            egui::RichText::new(title)
                .strong()
                .size(13.0 * self.readability.text_scale),
        );
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        if !self.settings_open {
            return;
        }

        let window_frame = egui::Frame::NONE
            .fill(ctx.style().visuals.window_fill)
            .stroke(egui::Stroke::new(
                1.0,
                ctx.style().visuals.window_stroke().color,
            ))
            .corner_radius(self.popup_corner_radius())
            .inner_margin(egui::Margin::symmetric(12, 10));

        let mut settings_open = self.settings_open;
        let mut close_requested = false;

        egui::Window::new("settings_window")
            .title_bar(false)
            .frame(window_frame)
            .open(&mut settings_open)
            .resizable(false)
            .show(ctx, |ui| {
                self.apply_popup_menu_style(ui);
                ui.horizontal(|ui| {
                    self.show_popup_section_title(ui, "Settings");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").clicked() {
                            close_requested = true;
                        }
                    });
                });
                ui.separator();
                self.show_popup_section_title(ui, "Theme");
                ui.label("Theme preset");
                egui::ComboBox::from_id_salt("theme_preset")
                    .selected_text(self.theme.preset.label())
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.theme.preset,
                            ThemePreset::SlateDark,
                            ThemePreset::SlateDark.label(),
                        );
                        ui.selectable_value(
                            &mut self.theme.preset,
                            ThemePreset::GraphiteDark,
                            ThemePreset::GraphiteDark.label(),
                        );
                        ui.selectable_value(
                            &mut self.theme.preset,
                            ThemePreset::PaperLight,
                            ThemePreset::PaperLight.label(),
                        );
                    });

                ui.separator();
                self.show_popup_section_title(ui, "Colors");
                ui.label("Accent color");
                ui.color_edit_button_srgba(&mut self.theme.accent_color);
                ui.small("Used for primary actions, selected days, and price tags.");
                ui.add(
                    egui::Slider::new(&mut self.theme.panel_rounding, 0..=16)
                        .text("Panel rounding"),
                );
                ui.checkbox(
                    &mut self.theme.list_row_shading,
                    "Use shaded backgrounds for list rows",
                );
                ui.separator();
                self.show_popup_section_title(ui, "Readability");
                ui.add(
                    egui::Slider::new(&mut self.readability.text_scale, 0.8..=1.4)
                        .text("Text scale")
                        .step_by(0.05),
                );
                ui.checkbox(&mut self.readability.compact_density, "Compact UI density");
                ui.checkbox(
                    &mut self.readability.show_car_photos,
                    "Download and show car photos",
                );
                ui.add(
                    egui::Slider::new(
                        &mut self.car_card_width,
                        MIN_CAR_CARD_WIDTH..=MAX_CAR_CARD_WIDTH,
                    )
                    .text("Car card width"),
                );

                if ui.button("Reset all settings to defaults").clicked() {
                    self.theme = ThemeSettings::slate_default();
                    self.readability = UiReadabilitySettings::defaults();
                    self.car_card_width = DEFAULT_CAR_CARD_WIDTH;
                }
            });

        self.settings_open = settings_open && !close_requested;
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
                StatusBannerSeverity::Success => (
                    egui::Color32::from_rgb(45, 92, 63),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(87, 171, 90)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn sign_in_text_field(
        &mut self,
        ui: &mut egui::Ui,
        id: &'static str,
        label: &str,
        hint: &str,
        value: &mut String,
        password: bool,
        should_focus: bool,
    ) -> egui::Response {
        ui.label(egui::RichText::new(label).strong());
        let edit = egui::TextEdit::singleline(value)
            .id_salt(id)
            .password(password)
            .hint_text(
                egui::RichText::new(hint)
                    .color(ui.visuals().weak_text_color().gamma_multiply(0.85)),
            )
            .desired_width(f32::INFINITY);

        let response = ui.add_sized([ui.available_width(), 34.0], edit);

        if should_focus {
            response.request_focus();
        }

        response
    }

    fn show_sign_in_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let avail = ui.available_size();
            let card_width = avail.x.clamp(440.0, 560.0);
            let top_space = (avail.y * 0.12).clamp(18.0, 90.0);

            ui.add_space(top_space);

            ui.vertical_centered(|ui| {
                ui.set_width(card_width);

                let palette = slate_dark_palette(self.theme);
                let card_fill = palette
                    .map(|p| lighten_color(p.app_background, 0.06))
                    .unwrap_or_else(|| lighten_color(ui.visuals().panel_fill, 0.02));

                egui::Frame::NONE
                    .fill(card_fill)
                    .corner_radius(14.0)
                    .stroke(egui::Stroke::new(
                        1.0,
                        ui.visuals().widgets.noninteractive.bg_stroke.color,
                    ))
                    .inner_margin(egui::Margin::symmetric(20, 18))
                    .show(ui, |ui| {
                        ui.style_mut().spacing.item_spacing = egui::vec2(10.0, 10.0);

                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new("🚗").size(24.0));
                            ui.vertical(|ui| {
                                ui.heading("Rental Desk");
                                ui.weak("Sign in to book and manage cars.");
                            });
                        });

                        ui.add_space(8.0);
                        self.show_status_banner(ui);

                        let mut focus_to_set = None;
                        if !self.sign_in_ui.attempted_auto_focus {
                            self.sign_in_ui.attempted_auto_focus = true;
                            focus_to_set = self.sign_in_ui.focus;
                        } else if self.sign_in_ui.focus.is_some() {
                            focus_to_set = self.sign_in_ui.focus;
                            self.sign_in_ui.focus = None;
                        }

                        egui::Frame::NONE
                            .fill(ui.visuals().faint_bg_color.gamma_multiply(0.55))
                            .corner_radius(12.0)
                            .inner_margin(egui::Margin::symmetric(14, 12))
                            .show(ui, |ui| {
                                ui.label(
                                    egui::RichText::new("Account")
                                        .strong()
                                        .size(20.0 * self.readability.text_scale),
                                );
                                ui.add_space(6.0);

                                let mut server_url_buf = self.server_url.clone();
                                let mut email_buf = self.email.clone();
                                let mut password_buf = self.password.clone();

                                let server_resp = self.sign_in_text_field(
                                    ui,
                                    "sign_in_server_url",
                                    "Server URL",
                                    "http://127.0.0.1:8080",
                                    &mut server_url_buf,
                                    false,
                                    focus_to_set == Some(SignInFocusField::Server),
                                );

                                ui.add_space(6.0);

                                let email_resp = self.sign_in_text_field(
                                    ui,
                                    "sign_in_email",
                                    "Email",
                                    "renter@example.com",
                                    &mut email_buf,
                                    false,
                                    focus_to_set == Some(SignInFocusField::Email),
                                );

                                ui.add_space(6.0);

                                let password_resp = self.sign_in_text_field(
                                    ui,
                                    "sign_in_password",
                                    "Password",
                                    "password",
                                    &mut password_buf,
                                    true,
                                    focus_to_set == Some(SignInFocusField::Password),
                                );

                                self.server_url = server_url_buf;
                                self.email = email_buf;
                                self.password = password_buf;

                                let enter_pressed =
                                    ctx.input(|i| i.key_pressed(egui::Key::Enter));
                                let can_submit = server_resp.has_focus()
                                    || email_resp.has_focus()
                                    || password_resp.has_focus();
                                if can_submit && enter_pressed {
                                    self.try_sign_in();
                                }
                            });

                        ui.add_space(10.0);

                        ui.horizontal(|ui| {
                            let is_busy =
                                self.status.to_ascii_lowercase().contains("signing in");
                            let mut btn = egui::Button::new(
                                egui::RichText::new("Sign in").strong().size(16.0),
                            )
                            .min_size(egui::vec2(ui.available_width(), 40.0));
                            if let Some(p) = slate_dark_palette(self.theme) {
                                btn = btn
                                    .fill(self.theme.accent_color)
                                    .stroke(egui::Stroke::new(1.0, p.item_stroke_active));
                            }

                            if ui.add_enabled(!is_busy, btn).clicked() {
                                self.try_sign_in();
                            }
                        });

                        ui.add_space(10.0);
                        ui.separator();
                        ui.add_space(6.0);

                        ui.horizontal_wrapped(|ui| {
                            ui.small("Status:");
                            ui.small(egui::RichText::new(&self.status).weak());
                        });
                    });
            });

            ui.add_space((avail.y * 0.08).clamp(12.0, 60.0));
        });
    }

    fn try_sign_in(&mut self) {
        let email = self.email.trim().to_string();
        if email.is_empty() {
            self.status = "Email is required".to_string();
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Error,
                message: "Please enter your email.".to_string(),
            });
            self.sign_in_ui.focus = Some(SignInFocusField::Email);
            return;
        }

        if self.password.is_empty() {
            self.status = "Password is required".to_string();
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Error,
                message: "Please enter your password.".to_string(),
            });
            self.sign_in_ui.focus = Some(SignInFocusField::Password);
            return;
        }

        let server = self.server_url.trim().to_string();
        if server.is_empty() {
            self.status = "Server URL is required".to_string();
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Error,
                message: "Please enter a server URL.".to_string(),
            });
            self.sign_in_ui.focus = Some(SignInFocusField::Server);
            return;
        }

        self.status_banner = None;
        self.status = "Signing in...".to_string();
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::SignIn {
                server_url: server,
                email,
                password: self.password.clone(),
            },
            &mut self.status,
        );
    }

    fn sign_out(&mut self) {
        self.status = "Signing out...".to_string();
        dispatch_backend_command(&self.cmd_tx, BackendCommand::SignOut, &mut self.status);
    }

    fn enter_owner_screen(&mut self) {
        self.screen = Screen::Owner;
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::FetchOwnerDashboard,
            &mut self.status,
        );
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::FetchOwnerEarnings,
            &mut self.status,
        );
    }

    fn is_owner(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|profile| profile.role == Role::Owner)
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        let palette = self.palette();

        egui::TopBottomPanel::top("app_top_bar")
            .resizable(false)
            .exact_height(30.0)
            .frame(
                egui::Frame::new()
                    .fill(palette.nav_background)
                    .inner_margin(egui::Margin {
                        top: 2,
                        bottom: 2,
                        left: 8,
                        right: 8,
                    }),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("🚗 Rental Desk")
                            .strong()
                            .color(palette.title_text),
                    );
                    ui.add_space(8.0);

                    if ui
                        .selectable_label(self.screen == Screen::Dashboard, "Browse")
                        .clicked()
                    {
                        self.screen = Screen::Dashboard;
                        dispatch_backend_command(
                            &self.cmd_tx,
                            BackendCommand::FetchLiveCars,
                            &mut self.status,
                        );
                    }
                    if self.is_owner()
                        && ui
                            .selectable_label(self.screen == Screen::Owner, "Owner")
                            .clicked()
                    {
                        self.enter_owner_screen();
                    }
                    if self.payment.is_some()
                        && ui
                            .selectable_label(self.screen == Screen::Payment, "Payment")
                            .clicked()
                    {
                        self.screen = Screen::Payment;
                    }
                    if ui.selectable_label(self.settings_open, "Settings").clicked() {
                        self.settings_open = !self.settings_open;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Sign out").clicked() {
                            self.sign_out();
                        }
                        if let Some(profile) = &self.profile {
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} ({})",
                                    profile.display_name(),
                                    role_label(profile.role)
                                ))
                                .small()
                                .color(palette.hint_text),
                            );
                        }
                        ui.label(
                            egui::RichText::new(server_environment_label(&self.server_url))
                                .small()
                                .color(palette.hint_text),
                        );
                    });
                });
            });
    }

    fn show_dashboard(&mut self, ctx: &egui::Context) {
        self.show_top_bar(ctx);
        let palette = self.palette();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);

            ui.horizontal(|ui| {
                ui.heading("Live cars");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Refresh").clicked() {
                        dispatch_backend_command(
                            &self.cmd_tx,
                            BackendCommand::FetchLiveCars,
                            &mut self.status,
                        );
                    }
                    ui.small(egui::RichText::new(&self.status).color(palette.hint_text));
                });
            });

            ui.horizontal(|ui| {
                ui.label("Search");
                ui.add(
                    egui::TextEdit::singleline(&mut self.search_input)
                        .id_salt("car_search")
                        .hint_text("car name")
                        .desired_width(180.0),
                );
                ui.label("Location");
                ui.add(
                    egui::TextEdit::singleline(&mut self.location_input)
                        .id_salt("car_location")
                        .hint_text("city")
                        .desired_width(160.0),
                );
                if ui.small_button("Clear").clicked() {
                    self.search_input.clear();
                    self.location_input.clear();
                }
            });

            ui.add_space(6.0);

            let filtered: Vec<Car> =
                views::filter_cars(&self.live_cars, &self.search_input, &self.location_input)
                    .into_iter()
                    .cloned()
                    .collect();

            if self.live_cars.is_empty() {
                ui.weak("No cars are live right now. Refresh to check again.");
            } else if filtered.is_empty() {
                ui.weak("No cars match the current search.");
            }

            egui::ScrollArea::vertical()
                .id_salt("car_grid_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for car in &filtered {
                            self.render_car_card(ui, car, palette);
                        }
                    });
                });
        });

        self.show_booking_dialog(ctx);
    }

    fn render_car_card(&mut self, ui: &mut egui::Ui, car: &Car, palette: SlateDarkPalette) {
        let card_width = self.car_card_width;
        let accent = self.theme.accent_color;

        egui::Frame::NONE
            .fill(palette.card_background)
            .stroke(egui::Stroke::new(1.0, palette.item_stroke))
            .corner_radius(egui::CornerRadius::same(self.theme.panel_rounding))
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.set_width(card_width);

                self.render_car_photo(ui, car, card_width);

                ui.label(
                    egui::RichText::new(&car.name)
                        .strong()
                        .size(16.0)
                        .color(palette.title_text),
                );
                ui.label(
                    egui::RichText::new(format!(
                        "{} - listed by {}",
                        car.location, car.owner_name
                    ))
                    .small()
                    .color(palette.hint_text),
                );
                ui.small(format!("{} seats | {}", car.seats, car.fuel_type));

                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("${:.2}/day", car.price_per_day))
                            .strong()
                            .color(accent),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let book_btn = egui::Button::new(
                            egui::RichText::new("Book")
                                .strong()
                                .color(egui::Color32::WHITE),
                        )
                        .fill(accent)
                        .corner_radius(egui::CornerRadius::same(8));
                        if ui.add(book_btn).clicked() {
                            self.booking = Some(BookingDialogState::for_car(car));
                        }
                    });
                });
            });
    }

    fn render_car_photo(&mut self, ui: &mut egui::Ui, car: &Car, width: f32) {
        if !self.readability.show_car_photos {
            return;
        }
        let Some(url) = car.image_urls.first() else {
            return;
        };

        if !self.car_photos.contains_key(&car.car_id) {
            self.car_photos.insert(car.car_id, CarPhotoState::Loading);
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::FetchCarImage {
                    car_id: car.car_id,
                    url: url.clone(),
                },
                &mut self.status,
            );
        }

        let photo_height = (width * 0.56).round();
        match self.car_photos.get_mut(&car.car_id) {
            Some(CarPhotoState::Ready { photo, texture }) => {
                if texture.is_none() {
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(
                        [photo.width, photo.height],
                        &photo.rgba,
                    );
                    *texture = Some(ui.ctx().load_texture(
                        format!("car_photo_{}", car.car_id.0),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
                if let Some(texture) = texture.as_ref() {
                    let aspect = photo.height.max(1) as f32 / photo.width.max(1) as f32;
                    let size = egui::vec2(width, (width * aspect).min(photo_height));
                    ui.add(egui::Image::new(texture).fit_to_exact_size(size));
                }
            }
            Some(CarPhotoState::Loading) => {
                ui.add_sized([width, photo_height], egui::Spinner::new());
            }
            Some(CarPhotoState::Failed(reason)) => {
                ui.small(format!("Photo unavailable: {reason}"));
            }
            None => {}
        }
    }

    fn show_booking_dialog(&mut self, ctx: &egui::Context) {
        let Some(mut dialog) = self.booking.take() else {
            return;
        };
        let palette = self.palette();
        let accent = self.theme.accent_color;
        let mut keep_open = true;

        egui::Window::new("booking_dialog")
            .title_bar(false)
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 80.0))
            .frame(
                egui::Frame::popup(&ctx.style())
                    .fill(palette.card_background)
                    .stroke(egui::Stroke::new(1.0, palette.item_stroke))
                    .corner_radius(self.popup_corner_radius()),
            )
            .show(ctx, |ui| {
                ui.set_min_width(320.0);
                self.apply_popup_menu_style(ui);

                ui.horizontal(|ui| {
                    self.show_popup_section_title(ui, &format!("Book {}", dialog.car_name));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").clicked() {
                            keep_open = false;
                        }
                    });
                });
                ui.separator();

                let _ = DateTimeField::new("booking_pickup", "Pickup", &mut dialog.pickup_at)
                    .accent(accent)
                    .palette(palette)
                    .show(ui);
                ui.add_space(4.0);
                let _ = DateTimeField::new("booking_return", "Return", &mut dialog.return_at)
                    .accent(accent)
                    .palette(palette)
                    .show(ui);

                let pickup = dialog.pickup_at.committed_merged();
                let return_at = dialog.return_at.committed_merged();
                let quote = match (pickup, return_at) {
                    (Some(pickup), Some(return_at)) => {
                        views::booking_quote(pickup, return_at, dialog.price_per_day)
                    }
                    _ => None,
                };

                ui.add_space(4.0);
                match (pickup, return_at, quote) {
                    (Some(_), Some(_), Some(total)) => {
                        ui.label(
                            egui::RichText::new(format!("Estimated total: ${total:.2}"))
                                .strong()
                                .color(accent),
                        );
                        ui.small("Billed per started day.");
                    }
                    (Some(_), Some(_), None) => {
                        ui.colored_label(
                            egui::Color32::from_rgb(230, 140, 90),
                            "Return must be after pickup.",
                        );
                    }
                    _ => {
                        ui.weak("Pick both pickup and return to see the total.");
                    }
                }

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        keep_open = false;
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let confirm_btn = egui::Button::new(
                            egui::RichText::new("Confirm booking")
                                .strong()
                                .color(egui::Color32::WHITE),
                        )
                        .fill(accent)
                        .corner_radius(egui::CornerRadius::same(8));
                        if ui.add_enabled(quote.is_some(), confirm_btn).clicked() {
                            if let (Some(pickup), Some(return_at)) = (pickup, return_at) {
                                self.status = "Requesting booking...".to_string();
                                dispatch_backend_command(
                                    &self.cmd_tx,
                                    BackendCommand::CreateBooking {
                                        car_id: dialog.car_id,
                                        pickup_at: pickup,
                                        return_at,
                                    },
                                    &mut self.status,
                                );
                                keep_open = false;
                            }
                        }
                    });
                });
            });

        if keep_open {
            self.booking = Some(dialog);
        }
    }

    fn show_payment_screen(&mut self, ctx: &egui::Context) {
        self.show_top_bar(ctx);
        let palette = self.palette();
        let accent = self.theme.accent_color;

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            ui.heading("Payment");

            let Some(payment) = self.payment.as_ref() else {
                ui.weak("No payment in progress. Book a car to create an order.");
                return;
            };
            let order_id = payment.order_id.clone();
            let order = payment.order.clone();
            let verified = payment.verified;
            let checkout_presented = payment.checkout_presented;

            egui::Frame::NONE
                .fill(palette.card_background)
                .stroke(egui::Stroke::new(1.0, palette.item_stroke))
                .corner_radius(egui::CornerRadius::same(self.theme.panel_rounding))
                .inner_margin(egui::Margin::symmetric(14, 12))
                .show(ui, |ui| {
                    ui.set_max_width(520.0);

                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new("Order").color(palette.hint_text));
                        ui.label(
                            egui::RichText::new(order_id.as_str())
                                .monospace()
                                .color(palette.title_text),
                        );
                        if ui.small_button("Copy").clicked() {
                            self.copy_order_id_to_clipboard(&order_id);
                        }
                    });

                    match &order {
                        Some(order) => {
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(format!(
                                        "{:.2} {}",
                                        order.amount, order.currency
                                    ))
                                    .strong()
                                    .size(22.0)
                                    .color(palette.title_text),
                                );
                                let shown_status = verified.unwrap_or(order.status);
                                status_chip(
                                    ui,
                                    payment_status_color(shown_status),
                                    shown_status.label(),
                                );
                            });
                            if order.checkout_url.is_none() {
                                ui.colored_label(
                                    egui::Color32::from_rgb(230, 140, 90),
                                    "Checkout link unavailable for this order. Refresh or contact support.",
                                );
                            }
                        }
                        None => {
                            ui.horizontal(|ui| {
                                ui.add(egui::Spinner::new());
                                ui.weak("Loading order...");
                            });
                        }
                    }

                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        let can_checkout = order
                            .as_ref()
                            .is_some_and(|order| order.checkout_url.is_some())
                            && verified != Some(PaymentStatus::Paid);
                        let checkout_btn = egui::Button::new(
                            egui::RichText::new("Open checkout in browser")
                                .strong()
                                .color(egui::Color32::WHITE),
                        )
                        .fill(accent)
                        .corner_radius(egui::CornerRadius::same(8));
                        if ui.add_enabled(can_checkout, checkout_btn).clicked() {
                            self.status = "Opening checkout...".to_string();
                            dispatch_backend_command(
                                &self.cmd_tx,
                                BackendCommand::PresentCheckout {
                                    order_id: order_id.clone(),
                                },
                                &mut self.status,
                            );
                        }

                        if ui
                            .add_enabled(order.is_some(), egui::Button::new("Verify payment"))
                            .clicked()
                        {
                            dispatch_backend_command(
                                &self.cmd_tx,
                                BackendCommand::VerifyPayment {
                                    order_id: order_id.clone(),
                                },
                                &mut self.status,
                            );
                        }

                        if ui.button("Refresh order").clicked() {
                            dispatch_backend_command(
                                &self.cmd_tx,
                                BackendCommand::FetchPaymentOrder {
                                    order_id: order_id.clone(),
                                },
                                &mut self.status,
                            );
                        }
                    });

                    ui.add_space(6.0);
                    match verified {
                        Some(PaymentStatus::Paid) => {
                            ui.colored_label(
                                egui::Color32::from_rgb(87, 171, 90),
                                "Payment confirmed. The owner has been asked to approve your booking.",
                            );
                        }
                        Some(PaymentStatus::Failed) => {
                            ui.colored_label(
                                egui::Color32::from_rgb(175, 96, 96),
                                "Payment failed. Reopen checkout to try again.",
                            );
                        }
                        Some(PaymentStatus::Created) => {
                            ui.colored_label(
                                egui::Color32::from_rgb(204, 163, 62),
                                "Not settled yet. Finish checkout in the browser, then verify again.",
                            );
                        }
                        None if checkout_presented => {
                            ui.weak("Complete the checkout in your browser, then hit Verify.");
                        }
                        None => {}
                    }
                });

            ui.add_space(8.0);
            if ui.button("Back to cars").clicked() {
                self.screen = Screen::Dashboard;
            }
        });
    }

    fn copy_order_id_to_clipboard(&mut self, order_id: &OrderId) {
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(order_id.to_string())) {
            Ok(()) => self.status = format!("Copied order id {order_id} to clipboard"),
            Err(err) => self.status = format!("Failed to copy order id: {err}"),
        }
    }

    fn show_owner_screen(&mut self, ctx: &egui::Context) {
        self.show_top_bar(ctx);
        let palette = self.palette();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);

            if !self.is_owner() {
                ui.heading("Owner dashboard");
                ui.weak("Owner tools are only available to owner accounts.");
                return;
            }

            ui.horizontal(|ui| {
                ui.heading("Owner dashboard");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Refresh").clicked() {
                        dispatch_backend_command(
                            &self.cmd_tx,
                            BackendCommand::FetchOwnerDashboard,
                            &mut self.status,
                        );
                        dispatch_backend_command(
                            &self.cmd_tx,
                            BackendCommand::FetchOwnerEarnings,
                            &mut self.status,
                        );
                    }
                });
            });

            ui.horizontal(|ui| {
                for tab in [
                    OwnerTab::Overview,
                    OwnerTab::Cars,
                    OwnerTab::Bookings,
                    OwnerTab::Earnings,
                ] {
                    if ui
                        .selectable_label(self.owner_tab == tab, tab.label())
                        .clicked()
                    {
                        self.owner_tab = tab;
                    }
                }
            });
            ui.separator();

            match self.owner_tab {
                OwnerTab::Overview => self.show_owner_overview(ui, palette),
                OwnerTab::Cars => self.show_owner_cars(ui, palette),
                OwnerTab::Bookings => self.show_owner_bookings(ui, palette),
                OwnerTab::Earnings => self.show_owner_earnings(ui, palette),
            }
        });
    }

    fn show_owner_overview(&mut self, ui: &mut egui::Ui, palette: SlateDarkPalette) {
        ui.horizontal_wrapped(|ui| {
            stat_card(ui, &palette, "Fleet size", &self.owner_cars.len().to_string());
            stat_card(
                ui,
                &palette,
                "Active bookings",
                &views::active_booking_count(&self.owner_bookings).to_string(),
            );
            stat_card(
                ui,
                &palette,
                "Unique customers",
                &views::unique_customer_count(&self.owner_bookings).to_string(),
            );
            if let Some(report) = &self.owner_earnings {
                stat_card(
                    ui,
                    &palette,
                    "Total earnings",
                    &format!("${:.2}", report.total_owner),
                );
            }
        });
        ui.add_space(8.0);
        ui.small("Earnings reflect your 80% share of each booking total.");
    }

    fn show_owner_cars(&mut self, ui: &mut egui::Ui, palette: SlateDarkPalette) {
        let cars = self.owner_cars.clone();
        if cars.is_empty() {
            ui.weak("No cars listed yet.");
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("owner_cars_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (index, car) in cars.iter().enumerate() {
                    let row_fill = if self.theme.list_row_shading && index % 2 == 0 {
                        palette.card_background
                    } else {
                        egui::Color32::TRANSPARENT
                    };
                    egui::Frame::NONE
                        .fill(row_fill)
                        .corner_radius(egui::CornerRadius::same(8))
                        .inner_margin(egui::Margin::symmetric(10, 6))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(&car.name)
                                        .strong()
                                        .color(palette.title_text),
                                );
                                ui.small(
                                    egui::RichText::new(format!(
                                        "{} | {} seats | {}",
                                        car.location, car.seats, car.fuel_type
                                    ))
                                    .color(palette.hint_text),
                                );
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        let delist_btn = egui::Button::new(
                                            egui::RichText::new("Delist")
                                                .color(egui::Color32::WHITE),
                                        )
                                        .fill(egui::Color32::from_rgb(140, 58, 58))
                                        .corner_radius(egui::CornerRadius::same(6));
                                        if ui.add(delist_btn).clicked() {
                                            self.status =
                                                format!("Removing {}...", car.name);
                                            dispatch_backend_command(
                                                &self.cmd_tx,
                                                BackendCommand::DeleteCar { car_id: car.car_id },
                                                &mut self.status,
                                            );
                                        }
                                        ui.label(format!("${:.2}/day", car.price_per_day));
                                    },
                                );
                            });
                        });
                }
            });
    }

    fn show_owner_bookings(&mut self, ui: &mut egui::Ui, palette: SlateDarkPalette) {
        ui.horizontal(|ui| {
            ui.label(format!("{} bookings", self.owner_bookings.len()));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Export CSV").clicked() {
                    self.export_bookings_csv();
                }
            });
        });

        if self.owner_bookings.is_empty() {
            ui.weak("No bookings yet.");
            return;
        }

        let bookings = self.owner_bookings.clone();
        egui::ScrollArea::vertical()
            .id_salt("owner_bookings_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (index, booking) in bookings.iter().enumerate() {
                    let row_fill = if self.theme.list_row_shading && index % 2 == 0 {
                        palette.card_background
                    } else {
                        egui::Color32::TRANSPARENT
                    };
                    egui::Frame::NONE
                        .fill(row_fill)
                        .corner_radius(egui::CornerRadius::same(8))
                        .inner_margin(egui::Margin::symmetric(10, 6))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(format!("#{}", booking.booking_id.0))
                                        .monospace()
                                        .color(palette.hint_text),
                                );
                                ui.label(
                                    egui::RichText::new(&booking.car_name)
                                        .strong()
                                        .color(palette.title_text),
                                );
                                ui.small(
                                    egui::RichText::new(&booking.customer_email)
                                        .color(palette.hint_text),
                                );
                                status_chip(
                                    ui,
                                    booking_status_color(booking.status),
                                    booking.status.label(),
                                );
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        ui.label(format!("${:.2}", booking.total_amount));
                                        ui.small(
                                            egui::RichText::new(format!(
                                                "{} to {}",
                                                booking.start_at.format("%b %-d %H:%M"),
                                                booking.end_at.format("%b %-d %H:%M")
                                            ))
                                            .color(palette.hint_text),
                                        );
                                    },
                                );
                            });
                        });
                }
            });
    }

    fn show_owner_earnings(&mut self, ui: &mut egui::Ui, palette: SlateDarkPalette) {
        let Some(report) = self.owner_earnings.clone() else {
            ui.weak("Earnings have not loaded yet. Refresh to fetch them.");
            return;
        };

        ui.horizontal_wrapped(|ui| {
            stat_card(
                ui,
                &palette,
                "Total earnings",
                &format!("${:.2}", report.total_owner),
            );
            stat_card(
                ui,
                &palette,
                "Average per booking",
                &format!("${:.2}", views::average_owner_share(&report)),
            );
            stat_card(
                ui,
                &palette,
                "Bookings counted",
                &report.per_booking.len().to_string(),
            );
        });
        ui.add_space(6.0);
        ui.small("Owner share is 80% of each booking total.");
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .id_salt("owner_earnings_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (index, earning) in report.per_booking.iter().enumerate() {
                    let row_fill = if self.theme.list_row_shading && index % 2 == 0 {
                        palette.card_background
                    } else {
                        egui::Color32::TRANSPARENT
                    };
                    egui::Frame::NONE
                        .fill(row_fill)
                        .corner_radius(egui::CornerRadius::same(8))
                        .inner_margin(egui::Margin::symmetric(10, 6))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(format!("#{}", earning.booking_id.0))
                                        .monospace()
                                        .color(palette.hint_text),
                                );
                                ui.label(
                                    egui::RichText::new(&earning.car_name)
                                        .color(palette.title_text),
                                );
                                ui.small(
                                    egui::RichText::new(&earning.period)
                                        .color(palette.hint_text),
                                );
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        ui.label(format!("${:.2}", earning.owner_share));
                                    },
                                );
                            });
                        });
                }
            });
    }

    fn export_bookings_csv(&mut self) {
        if self.owner_bookings.is_empty() {
            self.status = "No bookings to export".to_string();
            return;
        }

        let mut file_dialog = rfd::FileDialog::new().set_file_name("bookings.csv");
        if let Some(dir) = dirs::download_dir()
            .or_else(dirs::document_dir)
            .or_else(dirs::home_dir)
        {
            file_dialog = file_dialog.set_directory(dir);
        }

        if let Some(path) = file_dialog.save_file() {
            match fs::write(&path, bookings_csv(&self.owner_bookings)) {
                Ok(()) => {
                    self.status = format!(
                        "Exported {} bookings to {}",
                        self.owner_bookings.len(),
                        path.display()
                    );
                }
                Err(err) => {
                    self.status = format!("Failed to export bookings: {err}");
                }
            }
        }
    }
}

impl eframe::App for RentalDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.apply_theme_if_needed(ctx);

        match self.screen {
            Screen::SignIn => self.show_sign_in_screen(ctx),
            Screen::Dashboard => self.show_dashboard(ctx),
            Screen::Owner => self.show_owner_screen(ctx),
            Screen::Payment => self.show_payment_screen(ctx),
        }
        self.show_settings_window(ctx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings =
            PersistedDesktopSettings::from_runtime(self.theme, self.readability, self.car_card_width);
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::UiError;
    use chrono::NaiveDate;
    use shared::domain::{BookingId, BookingStatus};

    #[test]
    fn classifies_backend_command_processor_disconnect_as_transport_error() {
        let err = UiError::from_message(
            UiErrorContext::General,
            "Backend command processor disconnected (possible startup/runtime failure)",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert!(!err.requires_reauth());
    }

    #[test]
    fn expired_sessions_classify_as_auth_and_require_reauth() {
        let err = UiError::from_message(UiErrorContext::General, "401 Unauthorized");
        assert_eq!(err.category(), UiErrorCategory::Auth);
        assert!(err.requires_reauth());
    }

    #[test]
    fn inverted_booking_ranges_classify_as_validation_errors() {
        let err = UiError::from_message(
            UiErrorContext::Booking,
            "return time must be after pickup time",
        );
        assert_eq!(err.category(), UiErrorCategory::Validation);
        assert!(!err.requires_reauth());
    }

    #[test]
    fn payment_failures_classify_as_payment_errors() {
        let err = UiError::from_message(UiErrorContext::Payment, "payment declined by provider");
        assert_eq!(err.category(), UiErrorCategory::Payment);
        assert!(!err.requires_reauth());
    }

    #[test]
    fn persisted_settings_clamp_out_of_range_values() {
        let settings = PersistedDesktopSettings {
            text_scale: 9.0,
            panel_rounding: 99,
            car_card_width: 9999.0,
            ..PersistedDesktopSettings::default()
        };
        let (theme, readability, car_card_width) = settings.into_runtime();
        assert_eq!(theme.panel_rounding, 16);
        assert!((readability.text_scale - 1.4).abs() < f32::EPSILON);
        assert!((car_card_width - MAX_CAR_CARD_WIDTH).abs() < f32::EPSILON);
    }

    #[test]
    fn persisted_settings_survive_a_runtime_round_trip() {
        let theme = ThemeSettings::slate_default();
        let readability = UiReadabilitySettings::defaults();
        let settings = PersistedDesktopSettings::from_runtime(theme, readability, 280.0);
        let (theme_back, readability_back, width_back) = settings.into_runtime();
        assert_eq!(theme_back, theme);
        assert_eq!(readability_back, readability);
        assert!((width_back - 280.0).abs() < f32::EPSILON);
    }

    #[test]
    fn bookings_csv_quotes_fields_with_commas() {
        let bookings = vec![BookingSummary {
            booking_id: BookingId(7),
            car_name: "Swift, Dzire".to_string(),
            customer_email: "renter@example.com".to_string(),
            status: BookingStatus::Approved,
            start_at: NaiveDate::from_ymd_opt(2024, 7, 1)
                .expect("date")
                .and_hms_opt(14, 30, 0)
                .expect("time"),
            end_at: NaiveDate::from_ymd_opt(2024, 7, 3)
                .expect("date")
                .and_hms_opt(10, 0, 0)
                .expect("time"),
            total_amount: 5200.0,
        }];

        let csv = bookings_csv(&bookings);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().expect("header"),
            "booking_id,car_name,customer_email,start_at,end_at,status,total_amount"
        );
        let row = lines.next().expect("row");
        assert!(row.starts_with(
            "7,\"Swift, Dzire\",renter@example.com,2024-07-01 14:30,2024-07-03 10:00,"
        ));
        assert!(row.ends_with("Approved,5200.00"));
    }

    #[test]
    fn environment_label_reads_the_server_url() {
        assert_eq!(server_environment_label("http://127.0.0.1:8080"), "Local");
        assert_eq!(
            server_environment_label("https://staging.rentals.example"),
            "Staging"
        );
        assert_eq!(
            server_environment_label("https://rentals.example"),
            "Production"
        );
    }
}
