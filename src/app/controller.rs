use std::path::PathBuf;

use url::Url;

use super::state::{NavTab, PageState, ScrollAnimation, BACK_TO_TOP_THRESHOLD};
use crate::persistence::{KeyValueStore, StoreError, STATUS_KEY};
use crate::render::{self, FileLogTable};
use crate::server::{CardProperty, FileLogResult, FileName};
use crate::upload::{is_card_file, strip_fake_path, Validity};

/// Work the controller wants done outside itself. The app shell runs
/// network commands on its runtime and feeds the outcome back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListUploads {
        generation: u64,
    },
    FetchFileLogs {
        generation: u64,
        files: Vec<FileName>,
    },
    FetchCard(FileName),
    Upload(PathBuf),
    OpenLink(String),
}

/// Page state plus the operations the user and the server drive it with.
/// Holds no network handles.
#[derive(Debug)]
pub struct PageController<S> {
    pub state: PageState,
    store: S,
    server_url: Url,
}

impl<S: KeyValueStore> PageController<S> {
    pub fn new(store: S, server_url: Url) -> Self {
        Self {
            state: PageState::default(),
            store,
            server_url,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Restores the persisted status, resets the upload form and asks for
    /// the directory listing.
    pub fn initialize(&mut self) -> Command {
        match self.store.get(STATUS_KEY) {
            Ok(Some(text)) => self.state.status.restore(text),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not restore status"),
        }
        self.state.upload.reset();
        self.begin_listing()
    }

    /// Starts a new directory listing. Results tagged with an older
    /// generation are ignored from now on.
    fn begin_listing(&mut self) -> Command {
        self.state.listing_generation += 1;
        self.state.clear_listing();
        Command::ListUploads {
            generation: self.state.listing_generation,
        }
    }

    fn is_current_listing(&self, generation: u64) -> bool {
        if generation != self.state.listing_generation {
            tracing::debug!(
                generation,
                current = self.state.listing_generation,
                "dropping results of a superseded listing"
            );
            return false;
        }
        true
    }

    pub fn listing_received(&mut self, generation: u64, files: Vec<FileName>) -> Option<Command> {
        if !self.is_current_listing(generation) {
            return None;
        }
        tracing::info!(count = files.len(), "upload directory listed");
        self.state.clear_listing();
        if files.is_empty() {
            self.state.file_log = FileLogTable::Empty;
            return None;
        }
        Some(Command::FetchFileLogs { generation, files })
    }

    /// The directory listing request failed; stop showing it as pending.
    pub fn listing_failed(&mut self, generation: u64) {
        if self.is_current_listing(generation) {
            self.state.file_log = FileLogTable::Unavailable;
        }
    }

    /// Renders all settled per-file fetches at once, in listing order.
    pub fn file_logs_settled(&mut self, generation: u64, results: Vec<FileLogResult>) {
        if !self.is_current_listing(generation) {
            return;
        }
        let (rows, options) = render::file_log_view(&self.server_url, &results);
        let failed = results.len() - rows.len();
        if failed > 0 {
            tracing::warn!(failed, "some files are missing from the file log");
        }
        self.state.file_log = FileLogTable::Rows(rows);
        self.state.card_options = options;
    }

    /// Dropdown change. `None` is the placeholder option.
    pub fn select_card(&mut self, value: Option<usize>) -> Option<Command> {
        self.state.card_view.rows.clear();
        self.state.card_view.selected = value;

        let file = self.state.selected_option().map(|option| option.label.clone());
        if file.is_none() {
            self.state.card_view.selected = None;
        }
        file.map(Command::FetchCard)
    }

    pub fn card_view_received(&mut self, file: &str, properties: &[CardProperty]) {
        let still_selected = self
            .state
            .selected_option()
            .is_some_and(|option| option.label == file);
        if !still_selected {
            tracing::debug!(file, "dropping card view for a card no longer selected");
            return;
        }
        self.state.card_view.rows = render::card_rows(properties);
    }

    /// File picked through the browse dialog.
    pub fn choose_upload_file(&mut self, path: PathBuf, size: Option<u64>) -> Validity {
        let display = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        self.state.upload.path = Some(path);
        self.state.upload.size = size;
        self.validate_upload_selection(&display)
    }

    /// Checks the picked file name; only `.vcf` and `.vcard` may be
    /// uploaded. A rejected name is noted in the status log.
    pub fn validate_upload_selection(&mut self, raw: &str) -> Validity {
        let name = strip_fake_path(raw).to_string();
        let validity = if is_card_file(&name) {
            Validity::Valid
        } else {
            tracing::info!(file = %name, "rejected upload selection");
            self.state.status.invalid_extension();
            Validity::Invalid
        };
        self.state.upload.display = name;
        self.state.upload.validity = validity;
        validity
    }

    pub fn submit_upload(&mut self) -> Option<Command> {
        if !self.state.upload.can_upload() {
            return None;
        }
        let path = self.state.upload.path.clone()?;
        self.state.status.uploaded(&self.state.upload.display);
        self.state.upload.in_flight = true;
        Some(Command::Upload(path))
    }

    /// A finished upload reloads the listing; a failed one keeps the form
    /// as it was.
    pub fn upload_finished(&mut self, succeeded: bool) -> Option<Command> {
        self.state.upload.in_flight = false;
        if !succeeded {
            return None;
        }
        self.state.upload.reset();
        Some(self.begin_listing())
    }

    pub fn log_download(&mut self, link_text: &str, href: &str) -> Command {
        self.state.status.downloaded(link_text);
        Command::OpenLink(href.to_string())
    }

    pub fn persist_status(&mut self) -> Result<(), StoreError> {
        self.store.set(STATUS_KEY, self.state.status.text())
    }

    pub fn clear_status(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "could not clear stored status");
        }
        self.state.status.clear();
    }

    pub fn toggle_back_to_top(&mut self, scroll_offset: f32) {
        self.state.back_to_top.visible = scroll_offset > BACK_TO_TOP_THRESHOLD;
    }

    pub fn scroll_to_top(&mut self, from: f32, now: f64) {
        self.state.back_to_top.animation = Some(ScrollAnimation {
            from,
            started_at: now,
        });
    }

    /// Offset the page should be forced to this frame while the
    /// back-to-top animation runs.
    pub fn animated_offset(&mut self, now: f64) -> Option<f32> {
        let animation = self.state.back_to_top.animation?;
        match animation.offset_at(now) {
            Some(offset) => Some(offset),
            None => {
                self.state.back_to_top.animation = None;
                Some(0.0)
            }
        }
    }

    pub fn toggle_nav_tab(&mut self, clicked: NavTab) {
        self.state.nav = clicked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::render::{CardOption, NO_FILES};
    use crate::server::FileLogEntry;
    use crate::status::INVALID_EXTENSION_MESSAGE;

    fn controller() -> PageController<MemoryStore> {
        PageController::new(
            MemoryStore::default(),
            Url::parse("http://localhost:3000/").unwrap(),
        )
    }

    fn settled(names: &[&str]) -> Vec<FileLogResult> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| FileLogResult {
                index,
                name: name.to_string(),
                entry: Some(FileLogEntry {
                    individual_name: format!("Person {index}"),
                    additional_properties: "1".into(),
                }),
            })
            .collect()
    }

    fn loaded(names: &[&str]) -> PageController<MemoryStore> {
        let mut page = controller();
        let generation = listing_generation(page.initialize());
        let files = names.iter().map(|n| n.to_string()).collect();
        page.listing_received(generation, files);
        page.file_logs_settled(generation, settled(names));
        page
    }

    fn listing_generation(command: Command) -> u64 {
        match command {
            Command::ListUploads { generation } => generation,
            other => panic!("expected a listing request, got {other:?}"),
        }
    }

    #[test]
    fn initialize_restores_status_and_disables_upload() {
        let mut store = MemoryStore::default();
        store.set(STATUS_KEY, "Uploaded a.vcf\n").unwrap();
        let mut page = PageController::new(store, Url::parse("http://h/").unwrap());
        page.state.upload.display = "stale.vcf".into();
        page.state.upload.validity = Validity::Valid;

        assert_eq!(page.initialize(), Command::ListUploads { generation: 1 });
        assert_eq!(page.state.status.text(), "Uploaded a.vcf\n");
        assert_eq!(page.state.upload.display, "");
        assert!(!page.state.upload.can_upload());
    }

    #[test]
    fn initialize_without_stored_status_leaves_log_empty() {
        let mut page = controller();
        page.initialize();
        assert!(page.state.status.is_empty());
    }

    #[test]
    fn empty_listing_shows_no_files_row() {
        let mut page = controller();
        let generation = listing_generation(page.initialize());
        assert_eq!(page.listing_received(generation, Vec::new()), None);
        assert_eq!(page.state.file_log.cells(), vec![[NO_FILES; 3]]);
        assert!(page.state.card_options.is_empty());
    }

    #[test]
    fn listing_requests_every_file_log() {
        let mut page = controller();
        let generation = listing_generation(page.initialize());
        let cmd = page.listing_received(generation, vec!["a.vcf".into(), "b.vcf".into()]);
        assert_eq!(
            cmd,
            Some(Command::FetchFileLogs {
                generation,
                files: vec!["a.vcf".into(), "b.vcf".into()],
            })
        );
    }

    #[test]
    fn two_files_give_two_rows_and_options() {
        let page = loaded(&["a.vcf", "b.vcf"]);
        let FileLogTable::Rows(rows) = &page.state.file_log else {
            panic!("expected rows, got {:?}", page.state.file_log);
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].link.href, "http://localhost:3000/uploads/a.vcf");
        assert_eq!(rows[1].link.href, "http://localhost:3000/uploads/b.vcf");
        assert_eq!(
            page.state.card_options,
            vec![
                CardOption {
                    label: "a.vcf".into(),
                    value: 0
                },
                CardOption {
                    label: "b.vcf".into(),
                    value: 1
                },
            ]
        );
    }

    #[test]
    fn out_of_order_results_render_in_listing_order() {
        let mut page = controller();
        let generation = listing_generation(page.initialize());
        page.listing_received(
            generation,
            vec!["a.vcf".into(), "b.vcf".into(), "c.vcf".into()],
        );
        let mut results = settled(&["a.vcf", "b.vcf", "c.vcf"]);
        results.reverse();
        page.file_logs_settled(generation, results);

        let labels: Vec<_> = page
            .state
            .card_options
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(labels, ["a.vcf", "b.vcf", "c.vcf"]);
    }

    #[test]
    fn superseded_listing_results_are_dropped() {
        let mut page = controller();
        let first = listing_generation(page.initialize());
        page.listing_received(first, vec!["a.vcf".into()]);

        page.choose_upload_file(PathBuf::from("/tmp/new.vcf"), None);
        page.submit_upload();
        let second = listing_generation(page.upload_finished(true).unwrap());
        assert_ne!(first, second);

        page.listing_received(second, vec!["a.vcf".into(), "new.vcf".into()]);
        page.file_logs_settled(second, settled(&["a.vcf", "new.vcf"]));
        // The first batch settles late.
        page.file_logs_settled(first, settled(&["a.vcf"]));
        assert_eq!(page.listing_received(first, vec!["a.vcf".into()]), None);

        let labels: Vec<_> = page
            .state
            .card_options
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(labels, ["a.vcf", "new.vcf"]);
        assert_eq!(page.state.file_log.row_count(), 2);
    }

    #[test]
    fn failed_listing_stops_loading() {
        let mut page = controller();
        let generation = listing_generation(page.initialize());
        assert_eq!(page.state.file_log, FileLogTable::Loading);

        page.listing_failed(generation + 1);
        assert_eq!(page.state.file_log, FileLogTable::Loading);

        page.listing_failed(generation);
        assert_eq!(page.state.file_log, FileLogTable::Unavailable);
        assert!(page.state.file_log.cells().is_empty());
        assert!(page.state.card_options.is_empty());
    }

    #[test]
    fn placeholder_selection_clears_card_table() {
        let mut page = loaded(&["a.vcf"]);
        assert_eq!(
            page.select_card(Some(0)),
            Some(Command::FetchCard("a.vcf".into()))
        );
        page.card_view_received(
            "a.vcf",
            &[CardProperty {
                property_name: "FN".into(),
                property_values: "A".into(),
            }],
        );
        assert_eq!(page.state.card_view.rows.len(), 1);

        assert_eq!(page.select_card(None), None);
        assert!(page.state.card_view.rows.is_empty());
        assert_eq!(page.state.card_view.selected, None);
    }

    #[test]
    fn card_rows_follow_response_order() {
        let mut page = loaded(&["a.vcf"]);
        page.select_card(Some(0));
        let props: Vec<_> = ["FN", "N", "TEL"]
            .iter()
            .map(|name| CardProperty {
                property_name: name.to_string(),
                property_values: format!("{name} value"),
            })
            .collect();
        page.card_view_received("a.vcf", &props);

        let rows = &page.state.card_view.rows;
        assert_eq!(rows.len(), 3);
        let numbers: Vec<_> = rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, [1, 2, 3]);
        assert_eq!(rows[2].name, "TEL");
    }

    #[test]
    fn stale_card_view_is_dropped() {
        let mut page = loaded(&["a.vcf", "b.vcf"]);
        page.select_card(Some(0));
        page.select_card(Some(1));
        page.card_view_received(
            "a.vcf",
            &[CardProperty {
                property_name: "FN".into(),
                property_values: "A".into(),
            }],
        );
        assert!(page.state.card_view.rows.is_empty());
    }

    #[test]
    fn unknown_option_value_acts_as_placeholder() {
        let mut page = loaded(&["a.vcf"]);
        assert_eq!(page.select_card(Some(7)), None);
        assert_eq!(page.state.card_view.selected, None);
    }

    #[test]
    fn valid_selection_enables_upload() {
        let mut page = controller();
        page.initialize();
        let validity = page.choose_upload_file(PathBuf::from("/home/u/Card.VCARD"), Some(120));
        assert_eq!(validity, Validity::Valid);
        assert_eq!(page.state.upload.display, "Card.VCARD");
        assert!(page.state.upload.can_upload());
        assert!(page.state.status.is_empty());
    }

    #[test]
    fn invalid_selection_logs_warning_and_disables_upload() {
        let mut page = controller();
        page.initialize();
        page.choose_upload_file(PathBuf::from("/tmp/a.vcf"), None);
        assert!(page.state.upload.can_upload());

        let validity = page.choose_upload_file(PathBuf::from("/tmp/notes.txt"), None);
        assert_eq!(validity, Validity::Invalid);
        assert!(!page.state.upload.can_upload());
        assert_eq!(
            page.state.status.text(),
            format!("{INVALID_EXTENSION_MESSAGE}\n")
        );
    }

    #[test]
    fn browser_path_prefix_is_stripped() {
        let mut page = controller();
        assert_eq!(
            page.validate_upload_selection("C:\\fakepath\\a.vcf"),
            Validity::Valid
        );
        assert_eq!(page.state.upload.display, "a.vcf");
        assert_eq!(page.validate_upload_selection("noext"), Validity::Invalid);
    }

    #[test]
    fn submit_logs_upload_and_reloads_on_success() {
        let mut page = loaded(&["a.vcf"]);
        page.choose_upload_file(PathBuf::from("/tmp/new.vcf"), None);

        assert_eq!(
            page.submit_upload(),
            Some(Command::Upload(PathBuf::from("/tmp/new.vcf")))
        );
        assert_eq!(page.state.status.text(), "Uploaded new.vcf\n");
        assert!(!page.state.upload.can_upload());
        // Double submit while in flight does nothing.
        assert_eq!(page.submit_upload(), None);

        assert_eq!(
            page.upload_finished(true),
            Some(Command::ListUploads { generation: 2 })
        );
        assert_eq!(page.state.file_log, FileLogTable::Loading);
        assert_eq!(page.state.upload.display, "");
    }

    #[test]
    fn failed_upload_keeps_selection() {
        let mut page = controller();
        page.choose_upload_file(PathBuf::from("/tmp/new.vcf"), None);
        page.submit_upload();
        assert_eq!(page.upload_finished(false), None);
        assert!(page.state.upload.can_upload());
    }

    #[test]
    fn submit_without_valid_selection_does_nothing() {
        let mut page = controller();
        assert_eq!(page.submit_upload(), None);
        assert!(page.state.status.is_empty());
    }

    #[test]
    fn download_is_logged() {
        let mut page = controller();
        let cmd = page.log_download("a.vcf", "http://localhost:3000/uploads/a.vcf");
        assert_eq!(
            cmd,
            Command::OpenLink("http://localhost:3000/uploads/a.vcf".into())
        );
        assert_eq!(page.state.status.text(), "Downloaded a.vcf\n");
    }

    #[test]
    fn status_survives_reload_until_cleared() {
        let mut page = controller();
        page.state.status.uploaded("a.vcf");
        page.state.status.downloaded("b.vcf");
        let before = page.state.status.text().to_string();
        page.persist_status().unwrap();

        let store = page.store().clone();
        let mut reloaded = PageController::new(store, Url::parse("http://h/").unwrap());
        reloaded.initialize();
        assert_eq!(reloaded.state.status.text(), before);

        reloaded.clear_status();
        assert!(reloaded.state.status.is_empty());
        assert_eq!(reloaded.store().get(STATUS_KEY).unwrap(), None);
    }

    #[test]
    fn back_to_top_threshold() {
        let mut page = controller();
        page.toggle_back_to_top(100.0);
        assert!(!page.state.back_to_top.visible);
        page.toggle_back_to_top(100.5);
        assert!(page.state.back_to_top.visible);
        page.toggle_back_to_top(0.0);
        assert!(!page.state.back_to_top.visible);
    }

    #[test]
    fn back_to_top_animation_finishes_at_zero() {
        let mut page = controller();
        assert_eq!(page.animated_offset(0.0), None);
        page.scroll_to_top(500.0, 1.0);
        assert_eq!(page.animated_offset(1.0), Some(500.0));
        assert_eq!(page.animated_offset(5.0), Some(0.0));
        assert_eq!(page.animated_offset(5.1), None);
    }

    #[test]
    fn one_nav_tab_active() {
        let mut page = controller();
        assert_eq!(page.state.nav, NavTab::FileLog);
        page.toggle_nav_tab(NavTab::CardView);
        assert_eq!(page.state.nav, NavTab::CardView);
    }
}
