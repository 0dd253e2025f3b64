use crate::render::{CardOption, CardRow, FileLogTable};
use crate::status::StatusLog;
use crate::upload::UploadSelection;

/// Scroll offset past which the back-to-top button shows.
pub const BACK_TO_TOP_THRESHOLD: f32 = 100.0;
/// Length of the scroll-to-top animation, in seconds.
pub const BACK_TO_TOP_DURATION: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavTab {
    #[default]
    FileLog,
    CardView,
}

impl NavTab {
    pub const ALL: [NavTab; 2] = [NavTab::FileLog, NavTab::CardView];

    pub fn label(self) -> &'static str {
        match self {
            NavTab::FileLog => "File Log",
            NavTab::CardView => "Card View",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    pub from: f32,
    pub started_at: f64,
}

impl ScrollAnimation {
    /// Offset at time `now`, or `None` once the animation has finished.
    pub fn offset_at(&self, now: f64) -> Option<f32> {
        let t = (now - self.started_at) / BACK_TO_TOP_DURATION;
        if t >= 1.0 {
            return None;
        }
        let t = t.max(0.0) as f32;
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        Some(self.from * (1.0 - eased))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackToTop {
    pub visible: bool,
    pub animation: Option<ScrollAnimation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardView {
    /// Value of the selected dropdown option; `None` is the placeholder.
    pub selected: Option<usize>,
    pub rows: Vec<CardRow>,
}

#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub status: StatusLog,
    pub file_log: FileLogTable,
    pub card_options: Vec<CardOption>,
    pub card_view: CardView,
    pub upload: UploadSelection,
    pub nav: NavTab,
    pub back_to_top: BackToTop,
    /// Bumped on every directory listing request.
    pub listing_generation: u64,
}

impl PageState {
    pub fn selected_option(&self) -> Option<&CardOption> {
        let value = self.card_view.selected?;
        self.card_options.iter().find(|option| option.value == value)
    }

    /// Forget everything fetched from the server, as a page reload would.
    pub fn clear_listing(&mut self) {
        self.file_log = FileLogTable::Loading;
        self.card_options.clear();
        self.card_view = CardView::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_reaches_top_and_ends() {
        let anim = ScrollAnimation {
            from: 400.0,
            started_at: 10.0,
        };
        assert_eq!(anim.offset_at(10.0), Some(400.0));
        let mid = anim.offset_at(10.4).unwrap();
        assert!(mid > 0.0 && mid < 200.0, "ease-out should pass halfway early: {mid}");
        assert_eq!(anim.offset_at(10.8), None);
        assert_eq!(anim.offset_at(99.0), None);
    }

    #[test]
    fn selected_option_resolves_by_value() {
        let mut state = PageState::default();
        state.card_options = vec![
            CardOption {
                label: "a.vcf".into(),
                value: 0,
            },
            CardOption {
                label: "c.vcf".into(),
                value: 2,
            },
        ];
        state.card_view.selected = Some(2);
        assert_eq!(state.selected_option().unwrap().label, "c.vcf");
        state.card_view.selected = None;
        assert!(state.selected_option().is_none());
    }
}
