use tvmap_core::vocabulary::FilterKind;
use tvmap_core::{Action, Dashboard, DashboardError, DerivedViews};

/// What a key press asks the page to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Cycle(FilterKind),
    Reset,
    ScrollUp,
    ScrollDown,
    Dismiss,
}

impl Command {
    pub const fn for_char(ch: char) -> Option<Self> {
        match ch {
            'b' => Some(Self::Cycle(FilterKind::Brand)),
            'm' => Some(Self::Cycle(FilterKind::Model)),
            'p' => Some(Self::Cycle(FilterKind::Province)),
            'r' => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Position of each selector in its vocabulary; 0 is the "all" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub brand: usize,
    pub model: usize,
    pub province: usize,
}

impl Cursor {
    fn slot(&mut self, kind: FilterKind) -> &mut usize {
        match kind {
            FilterKind::Brand => &mut self.brand,
            FilterKind::Model => &mut self.model,
            FilterKind::Province => &mut self.province,
        }
    }
}

#[derive(Debug, Default)]
pub struct WebState {
    pub dashboard: Option<Dashboard>,
    pub cursor: Cursor,
    pub row_offset: usize,
}

impl WebState {
    pub fn views(&self) -> Option<&DerivedViews> {
        self.dashboard.as_ref().and_then(Dashboard::views)
    }

    /// Rows the hotel table can scroll through.
    pub fn hotel_count(&self) -> usize {
        self.views().map_or(0, |views| views.markers.len())
    }

    /// Applies a command. Dashboard rejections are returned after they have
    /// been recorded as notices.
    pub fn handle(&mut self, command: Command) -> Result<(), DashboardError> {
        match command {
            Command::ScrollUp => self.row_offset = self.row_offset.saturating_sub(1),
            Command::ScrollDown => {
                self.row_offset = (self.row_offset + 1).min(self.hotel_count().saturating_sub(1));
            }
            Command::Dismiss => {
                if let Some(dashboard) = self.dashboard.as_mut() {
                    dashboard.clear_notices();
                }
            }
            Command::Reset => {
                self.cursor.province = 0;
                return self.dispatch(&Action::Reset);
            }
            Command::Cycle(kind) => {
                let Some(dashboard) = self.dashboard.as_ref() else {
                    return Ok(());
                };
                let values = dashboard.vocabulary().list(kind);
                if values.is_empty() {
                    return Ok(());
                }
                let slot = self.cursor.slot(kind);
                *slot = (*slot + 1) % values.len();
                let value = values[*slot].clone();
                let action = match kind {
                    FilterKind::Brand => Action::ChooseBrand(value),
                    FilterKind::Model => Action::ChooseModel(value),
                    FilterKind::Province => Action::ChooseProvince(value),
                };
                return self.dispatch(&action);
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, action: &Action) -> Result<(), DashboardError> {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return Ok(());
        };
        let mut rendered = false;
        let outcome = dashboard.dispatch(action, &mut |_: &DerivedViews| rendered = true);
        if rendered {
            self.row_offset = 0;
        }
        outcome
    }
}
