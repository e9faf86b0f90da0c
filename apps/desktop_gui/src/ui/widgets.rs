//! Reusable widgets: the two-stage date/time field plus small card helpers
//! shared by the dashboard and owner screens.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use datetime_picker::{month_grid, weekday_labels, DateTimeSelector, DayPeriod, GRID_COLUMNS};
use shared::domain::{BookingStatus, PaymentStatus};

use crate::ui::theme::{slate_dark_fallback_palette, SlateDarkPalette};

const MINUTE_STEP: u8 = 5;
const DAY_CELL: egui::Vec2 = egui::Vec2::new(30.0, 24.0);

/// Picker field backed by a [`DateTimeSelector`]. The collapsed trigger shows
/// the committed value (or the placeholder); the expanded dialog stages edits
/// and only the Set button publishes them. Returns the merged timestamp on
/// the frame a commit happens, `None` otherwise.
pub(crate) struct DateTimeField<'a> {
    id: egui::Id,
    label: &'a str,
    selector: &'a mut DateTimeSelector,
    accent: egui::Color32,
    palette: SlateDarkPalette,
}

impl<'a> DateTimeField<'a> {
    pub(crate) fn new(
        id_salt: impl std::hash::Hash,
        label: &'a str,
        selector: &'a mut DateTimeSelector,
    ) -> Self {
        Self {
            id: egui::Id::new(id_salt),
            label,
            selector,
            accent: egui::Color32::from_rgb(47, 137, 108),
            palette: slate_dark_fallback_palette(),
        }
    }

    pub(crate) fn accent(mut self, accent: egui::Color32) -> Self {
        self.accent = accent;
        self
    }

    pub(crate) fn palette(mut self, palette: SlateDarkPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Renders the field. "Today" is re-read from the wall clock every frame,
    /// so a dialog left open across midnight repaints with yesterday greyed
    /// out.
    pub(crate) fn show(mut self, ui: &mut egui::Ui) -> Option<NaiveDateTime> {
        let today = Local::now().date_naive();
        self.show_with_today(ui, today)
    }

    fn show_with_today(&mut self, ui: &mut egui::Ui, today: NaiveDate) -> Option<NaiveDateTime> {
        let mut committed = None;

        ui.label(egui::RichText::new(self.label).strong());
        let has_value = self.selector.committed().is_some();
        let trigger = egui::Button::new(egui::RichText::new(self.selector.display_label()).color(
            if has_value {
                self.palette.body_text
            } else {
                self.palette.hint_text
            },
        ))
        .fill(self.palette.card_background)
        .stroke(egui::Stroke::new(1.0, self.palette.item_stroke))
        .corner_radius(egui::CornerRadius::same(8))
        .min_size(egui::vec2(ui.available_width(), 32.0));

        let response = ui.add_enabled(!self.selector.is_disabled(), trigger);
        if response.clicked() {
            if self.selector.is_open() {
                self.selector.cancel();
            } else {
                self.selector.open(today);
            }
        }

        if self.selector.is_open() {
            let anchor = response.rect;
            egui::Area::new(self.id.with("picker_dialog"))
                .order(egui::Order::Foreground)
                .pivot(egui::Align2::LEFT_TOP)
                .fixed_pos(egui::pos2(anchor.left(), anchor.bottom() + 6.0))
                .show(ui.ctx(), |ui| {
                    egui::Frame::popup(ui.style())
                        .fill(self.palette.card_background)
                        .stroke(egui::Stroke::new(1.0, self.palette.item_stroke))
                        .corner_radius(egui::CornerRadius::same(10))
                        .inner_margin(egui::Margin::symmetric(12, 10))
                        .show(ui, |ui| {
                            ui.set_min_width(236.0);
                            committed = self.show_dialog_contents(ui, today);
                        });
                });
        }

        committed
    }

    fn show_dialog_contents(&mut self, ui: &mut egui::Ui, today: NaiveDate) -> Option<NaiveDateTime> {
        let mut committed = None;

        ui.horizontal(|ui| {
            if ui.small_button("◀").clicked() {
                self.selector.previous_month();
            }
            let month_label = self
                .selector
                .displayed_month()
                .map(|month| month.label())
                .unwrap_or_default();
            ui.add_sized(
                [ui.available_width() - 28.0, 20.0],
                egui::Label::new(
                    egui::RichText::new(month_label)
                        .strong()
                        .color(self.palette.title_text),
                ),
            );
            if ui.small_button("▶").clicked() {
                self.selector.next_month();
            }
        });

        egui::Grid::new(self.id.with("weekday_header"))
            .spacing(egui::vec2(2.0, 2.0))
            .min_col_width(DAY_CELL.x)
            .show(ui, |ui| {
                for label in weekday_labels() {
                    ui.add_sized(
                        DAY_CELL,
                        egui::Label::new(
                            egui::RichText::new(label).small().color(self.palette.hint_text),
                        ),
                    );
                }
                ui.end_row();
            });

        egui::Grid::new(self.id.with("day_grid"))
            .spacing(egui::vec2(2.0, 2.0))
            .min_col_width(DAY_CELL.x)
            .show(ui, |ui| {
                let Some(month) = self.selector.displayed_month() else {
                    return;
                };
                for (index, slot) in month_grid(month).into_iter().enumerate() {
                    match slot {
                        Some(date) => {
                            let selectable = self.selector.is_date_selectable(date, today);
                            let selected = self.selector.pending_date() == Some(date);
                            let mut text = egui::RichText::new(date.day().to_string());
                            if date == today {
                                text = text.underline();
                            }
                            text = if selected {
                                text.color(egui::Color32::WHITE)
                            } else if selectable {
                                text.color(self.palette.body_text)
                            } else {
                                text.color(self.palette.hint_text)
                            };
                            let day_btn = egui::Button::new(text)
                                .min_size(DAY_CELL)
                                .corner_radius(egui::CornerRadius::same(6))
                                .stroke(egui::Stroke::NONE)
                                .fill(if selected {
                                    self.accent
                                } else {
                                    egui::Color32::TRANSPARENT
                                });
                            if ui.add_enabled(selectable, day_btn).clicked() {
                                self.selector.select_date(date, today);
                            }
                        }
                        None => {
                            ui.add_sized(DAY_CELL, egui::Label::new(""));
                        }
                    }
                    if (index + 1) % GRID_COLUMNS == 0 {
                        ui.end_row();
                    }
                }
            });

        ui.separator();

        if let Some(time) = self.selector.pending_time() {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new("Time")
                        .small()
                        .color(self.palette.hint_text),
                );
                if ui.small_button("-").clicked() {
                    self.selector.set_time(time.previous_hour());
                }
                ui.label(egui::RichText::new(format!("{:02}", time.hour12())).monospace());
                if ui.small_button("+").clicked() {
                    self.selector.set_time(time.next_hour());
                }
                ui.label(":");
                if ui.small_button("-").clicked() {
                    self.selector.set_time(time.previous_minute(MINUTE_STEP));
                }
                ui.label(egui::RichText::new(format!("{:02}", time.minute())).monospace());
                if ui.small_button("+").clicked() {
                    self.selector.set_time(time.next_minute(MINUTE_STEP));
                }

                ui.add_space(6.0);
                for period in [DayPeriod::Am, DayPeriod::Pm] {
                    let active = time.period() == period;
                    let period_btn = egui::Button::new(
                        egui::RichText::new(period.label()).small().color(if active {
                            egui::Color32::WHITE
                        } else {
                            self.palette.body_text
                        }),
                    )
                    .corner_radius(egui::CornerRadius::same(6))
                    .fill(if active {
                        self.accent
                    } else {
                        self.palette.card_hover
                    });
                    if ui.add(period_btn).clicked() {
                        self.selector.set_time(time.with_period(period));
                    }
                }
            });
        }

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                self.selector.cancel();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let set_btn = egui::Button::new(
                    egui::RichText::new("Set").strong().color(egui::Color32::WHITE),
                )
                .fill(self.accent)
                .corner_radius(egui::CornerRadius::same(6));
                if ui.add_enabled(self.selector.can_commit(), set_btn).clicked() {
                    committed = self.selector.commit();
                }
            });
        });

        committed
    }
}

pub(crate) fn stat_card(ui: &mut egui::Ui, palette: &SlateDarkPalette, title: &str, value: &str) {
    egui::Frame::NONE
        .fill(palette.card_background)
        .stroke(egui::Stroke::new(1.0, palette.item_stroke))
        .corner_radius(egui::CornerRadius::same(10))
        .inner_margin(egui::Margin::symmetric(14, 10))
        .show(ui, |ui| {
            ui.set_min_width(150.0);
            ui.label(egui::RichText::new(title).small().color(palette.hint_text));
            ui.label(
                egui::RichText::new(value)
                    .strong()
                    .size(20.0)
                    .color(palette.title_text),
            );
        });
}

pub(crate) fn booking_status_color(status: BookingStatus) -> egui::Color32 {
    match status {
        BookingStatus::Approved => egui::Color32::from_rgb(87, 171, 90),
        BookingStatus::PendingApproval => egui::Color32::from_rgb(204, 163, 62),
        BookingStatus::Cancelled => egui::Color32::from_rgb(175, 96, 96),
    }
}

pub(crate) fn payment_status_color(status: PaymentStatus) -> egui::Color32 {
    match status {
        PaymentStatus::Paid => egui::Color32::from_rgb(87, 171, 90),
        PaymentStatus::Created => egui::Color32::from_rgb(204, 163, 62),
        PaymentStatus::Failed => egui::Color32::from_rgb(175, 96, 96),
    }
}
