use chrono::{NaiveDate, NaiveDateTime};

use crate::calendar::YearMonth;
use crate::time::TimeOfDay;

/// Host-facing configuration for a [`DateTimeSelector`].
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorConfig {
    /// Trigger text shown while nothing is committed.
    pub placeholder: String,
    /// Suppresses all interaction, including opening the dialog.
    pub disabled: bool,
    /// Accepted bounds, recorded but not applied; selection is limited only
    /// by the past-date rule.
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            placeholder: "Pick date and time".to_string(),
            disabled: false,
            min_date: None,
            max_date: None,
        }
    }
}

/// A confirmed date/time pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub date: NaiveDate,
    pub time: TimeOfDay,
}

impl Selection {
    /// Merges the pair into a single timestamp on the 24-hour clock.
    pub fn merged(self) -> NaiveDateTime {
        self.date.and_time(self.time.to_naive())
    }

    pub fn from_merged(stamp: NaiveDateTime) -> Self {
        Self {
            date: stamp.date(),
            time: TimeOfDay::from_naive(stamp.time()),
        }
    }
}

/// The in-progress edit owned by an open dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    pub date: Option<NaiveDate>,
    pub time: TimeOfDay,
}

impl PendingSelection {
    fn from_committed(committed: Option<Selection>) -> Self {
        match committed {
            Some(selection) => Self {
                date: Some(selection.date),
                time: selection.time,
            },
            None => Self {
                date: None,
                time: TimeOfDay::default(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum DialogState {
    Closed,
    Open {
        pending: PendingSelection,
        displayed_month: YearMonth,
    },
}

/// Two-stage date/time picker.
///
/// The committed value changes in exactly one place: a successful
/// [`commit`](Self::commit), which also yields the merged timestamp for the
/// host. Every other path out of the dialog discards the pending edit.
#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeSelector {
    config: SelectorConfig,
    committed: Option<Selection>,
    dialog: DialogState,
}

impl DateTimeSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            committed: None,
            dialog: DialogState::Closed,
        }
    }

    pub fn with_value(config: SelectorConfig, value: Option<NaiveDateTime>) -> Self {
        let mut selector = Self::new(config);
        selector.set_value(value);
        selector
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
    }

    /// Adopts an externally controlled value. Both the committed value and,
    /// when the dialog is open, the pending edit are reinitialized from it.
    pub fn set_value(&mut self, value: Option<NaiveDateTime>) {
        self.committed = value.map(Selection::from_merged);
        if let DialogState::Open { pending, .. } = &mut self.dialog {
            *pending = PendingSelection::from_committed(self.committed);
        }
    }

    pub fn committed(&self) -> Option<Selection> {
        self.committed
    }

    pub fn committed_merged(&self) -> Option<NaiveDateTime> {
        self.committed.map(Selection::merged)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.dialog, DialogState::Open { .. })
    }

    pub fn is_disabled(&self) -> bool {
        self.config.disabled
    }

    /// Trigger label: the committed pair, or the placeholder when absent.
    pub fn display_label(&self) -> String {
        match self.committed {
            Some(selection) => format!(
                "{} at {}",
                selection.date.format("%B %-d, %Y"),
                selection.time
            ),
            None => self.config.placeholder.clone(),
        }
    }

    /// Opens the dialog, seeding the pending edit from the committed value
    /// (or defaults when nothing is committed). No-op while disabled or
    /// already open.
    pub fn open(&mut self, today: NaiveDate) {
        if self.config.disabled || self.is_open() {
            return;
        }
        let pending = PendingSelection::from_committed(self.committed);
        let displayed_month = YearMonth::of(pending.date.unwrap_or(today));
        self.dialog = DialogState::Open {
            pending,
            displayed_month,
        };
    }

    /// True when `date` may be picked with respect to `today`: anything
    /// strictly before the current calendar day is excluded. Callers pass the
    /// wall-clock day at interaction time, so the boundary advances at
    /// midnight without any cached state.
    pub fn is_date_selectable(&self, date: NaiveDate, today: NaiveDate) -> bool {
        date >= today
    }

    /// Stages a pending date. Returns false (leaving the edit untouched) when
    /// the dialog is closed or the date fails the past-date rule.
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> bool {
        if !self.is_date_selectable(date, today) {
            return false;
        }
        match &mut self.dialog {
            DialogState::Open {
                pending,
                displayed_month,
            } => {
                pending.date = Some(date);
                *displayed_month = YearMonth::of(date);
                true
            }
            DialogState::Closed => false,
        }
    }

    /// Stages a pending time of day. No-op while closed.
    pub fn set_time(&mut self, time: TimeOfDay) {
        if let DialogState::Open { pending, .. } = &mut self.dialog {
            pending.time = time;
        }
    }

    pub fn pending(&self) -> Option<&PendingSelection> {
        match &self.dialog {
            DialogState::Open { pending, .. } => Some(pending),
            DialogState::Closed => None,
        }
    }

    pub fn pending_date(&self) -> Option<NaiveDate> {
        self.pending().and_then(|pending| pending.date)
    }

    pub fn pending_time(&self) -> Option<TimeOfDay> {
        self.pending().map(|pending| pending.time)
    }

    pub fn displayed_month(&self) -> Option<YearMonth> {
        match &self.dialog {
            DialogState::Open {
                displayed_month, ..
            } => Some(*displayed_month),
            DialogState::Closed => None,
        }
    }

    pub fn show_month(&mut self, month: YearMonth) {
        if let DialogState::Open {
            displayed_month, ..
        } = &mut self.dialog
        {
            *displayed_month = month;
        }
    }

    pub fn next_month(&mut self) {
        if let Some(month) = self.displayed_month() {
            self.show_month(month.add_months(1));
        }
    }

    pub fn previous_month(&mut self) {
        if let Some(month) = self.displayed_month() {
            self.show_month(month.add_months(-1));
        }
    }

    /// A commit is possible only while open with a pending date staged; the
    /// pending time always holds a value, so it never blocks.
    pub fn can_commit(&self) -> bool {
        self.pending_date().is_some()
    }

    /// Promotes the pending edit to the committed value and closes the
    /// dialog, yielding the merged timestamp exactly once. Without a pending
    /// date the dialog stays open and nothing is yielded.
    pub fn commit(&mut self) -> Option<NaiveDateTime> {
        let DialogState::Open { pending, .. } = &self.dialog else {
            return None;
        };
        let date = pending.date?;
        let selection = Selection {
            date,
            time: pending.time,
        };
        self.committed = Some(selection);
        self.dialog = DialogState::Closed;
        Some(selection.merged())
    }

    /// Discards the pending edit and closes the dialog. Never yields a value
    /// and never touches the committed selection.
    pub fn cancel(&mut self) {
        self.dialog = DialogState::Closed;
    }
}

impl Default for DateTimeSelector {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::DayPeriod;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn time(hour12: u8, minute: u8, period: DayPeriod) -> TimeOfDay {
        TimeOfDay::new(hour12, minute, period).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 15)
    }

    #[test]
    fn default_state_has_placeholder_and_noon_time() {
        let mut selector = DateTimeSelector::default();
        assert_eq!(selector.display_label(), "Pick date and time");
        assert_eq!(selector.committed(), None);

        selector.open(today());
        assert_eq!(selector.pending_date(), None);
        assert_eq!(selector.pending_time().unwrap().to_string(), "12:00 PM");
    }

    #[test]
    fn open_seeds_pending_from_committed() {
        let mut selector = DateTimeSelector::default();
        selector.open(today());
        assert!(selector.select_date(date(2024, 7, 1), today()));
        selector.set_time(time(9, 15, DayPeriod::Am));
        selector.commit().unwrap();

        selector.open(today());
        assert_eq!(selector.pending_date(), Some(date(2024, 7, 1)));
        assert_eq!(
            selector.pending_time(),
            Some(time(9, 15, DayPeriod::Am))
        );
    }

    #[test]
    fn reopen_then_cancel_leaves_committed_untouched() {
        let mut selector = DateTimeSelector::default();
        selector.open(today());
        selector.select_date(date(2024, 7, 1), today());
        selector.set_time(time(9, 15, DayPeriod::Am));
        let committed = selector.commit().unwrap();

        selector.open(today());
        selector.cancel();
        assert_eq!(selector.committed_merged(), Some(committed));
        assert!(!selector.is_open());
    }

    #[test]
    fn past_dates_are_rejected_and_today_onward_allowed() {
        let mut selector = DateTimeSelector::default();
        selector.open(today());

        assert!(!selector.is_date_selectable(date(2024, 6, 14), today()));
        assert!(selector.is_date_selectable(date(2024, 6, 15), today()));
        assert!(selector.is_date_selectable(date(2024, 6, 16), today()));

        assert!(!selector.select_date(date(2024, 6, 14), today()));
        assert_eq!(selector.pending_date(), None);

        assert!(selector.select_date(date(2024, 6, 15), today()));
        assert_eq!(selector.pending_date(), Some(today()));
    }

    #[test]
    fn min_and_max_bounds_are_recorded_without_restricting_selection() {
        let config = SelectorConfig {
            min_date: Some(date(2024, 7, 1)),
            max_date: Some(date(2024, 7, 31)),
            ..SelectorConfig::default()
        };
        let mut selector = DateTimeSelector::new(config);
        selector.open(today());

        // Outside the recorded bounds but not in the past, so still allowed.
        assert!(selector.select_date(date(2024, 8, 15), today()));
    }

    #[test]
    fn commit_requires_a_pending_date() {
        let mut selector = DateTimeSelector::default();
        selector.open(today());
        assert!(!selector.can_commit());
        selector.set_time(time(5, 45, DayPeriod::Pm));
        assert!(!selector.can_commit());

        assert_eq!(selector.commit(), None);
        assert!(selector.is_open(), "failed commit keeps the dialog open");

        selector.select_date(date(2024, 6, 20), today());
        assert!(selector.can_commit());
    }

    #[test]
    fn cancel_discards_staged_edits_without_yielding() {
        let mut selector = DateTimeSelector::default();
        selector.open(today());
        selector.select_date(date(2024, 8, 2), today());
        selector.set_time(time(7, 30, DayPeriod::Am));
        selector.cancel();

        assert_eq!(selector.committed(), None);
        assert_eq!(selector.display_label(), "Pick date and time");

        selector.open(today());
        assert_eq!(selector.pending_date(), None);
        assert_eq!(selector.pending_time().unwrap().to_string(), "12:00 PM");
    }

    #[test]
    fn commit_merges_date_and_time_exactly_once() {
        let mut selector = DateTimeSelector::default();
        selector.open(today());
        assert!(selector.select_date(date(2024, 7, 1), today()));
        selector.set_time(time(2, 30, DayPeriod::Pm));

        let stamp = selector.commit().expect("commit yields the merged stamp");
        assert_eq!(stamp.to_string(), "2024-07-01 14:30:00");
        assert!(!selector.is_open());

        // A second commit without a reopened dialog yields nothing.
        assert_eq!(selector.commit(), None);

        selector.open(today());
        assert_eq!(selector.pending_date(), Some(date(2024, 7, 1)));
        assert_eq!(selector.pending_time(), Some(time(2, 30, DayPeriod::Pm)));
    }

    #[test]
    fn external_value_reinitializes_committed_and_pending() {
        let mut selector = DateTimeSelector::default();
        selector.open(today());
        selector.select_date(date(2024, 7, 4), today());

        let external = date(2024, 9, 9).and_hms_opt(8, 0, 0).unwrap();
        selector.set_value(Some(external));

        assert_eq!(selector.committed_merged(), Some(external));
        assert_eq!(selector.pending_date(), Some(date(2024, 9, 9)));
        assert_eq!(selector.pending_time().unwrap().to_string(), "08:00 AM");

        selector.set_value(None);
        assert_eq!(selector.committed(), None);
        assert_eq!(selector.pending_date(), None);
    }

    #[test]
    fn disabled_selector_never_opens() {
        let config = SelectorConfig {
            disabled: true,
            ..SelectorConfig::default()
        };
        let mut selector = DateTimeSelector::new(config);
        selector.open(today());
        assert!(!selector.is_open());
        assert_eq!(selector.commit(), None);
    }

    #[test]
    fn display_label_formats_committed_pair() {
        let value = date(2024, 7, 1).and_hms_opt(14, 30, 0).unwrap();
        let selector = DateTimeSelector::with_value(SelectorConfig::default(), Some(value));
        assert_eq!(selector.display_label(), "July 1, 2024 at 02:30 PM");
    }

    #[test]
    fn month_navigation_follows_pending_date() {
        let mut selector = DateTimeSelector::default();
        selector.open(today());
        let opened = selector.displayed_month().unwrap();
        assert_eq!((opened.year(), opened.month()), (2024, 6));

        selector.next_month();
        let forward = selector.displayed_month().unwrap();
        assert_eq!((forward.year(), forward.month()), (2024, 7));

        assert!(selector.select_date(date(2024, 7, 10), today()));
        selector.previous_month();
        selector.cancel();

        // Reopening lands on the committed (or today's) month again.
        selector.open(today());
        let reopened = selector.displayed_month().unwrap();
        assert_eq!((reopened.year(), reopened.month()), (2024, 6));
    }
}
