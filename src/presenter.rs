//! Result Presenter
//!
//! Owns everything the user sees. Lives on the UI thread, starts searches
//! through a [`Dispatch`] and picks their outcomes up from the [`Inbox`] in
//! [`Presenter::poll`], which never waits.
//!
//! Each search gets a sequence number. Only the outcome of the most recently
//! started search is shown; anything older that arrives late is dropped.

use crate::dispatcher::{Dispatch, SearchOptions, SearchRequest};
use crate::error::Result;
use crate::inbox::{Inbox, InboxMessage, RevealOutcome, SearchOutcome};
use crate::logging;

/// Everything the window renders, and nothing else
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Paths of the current search, in locate's order
    pub results: Vec<String>,
    /// A search is running
    pub busy: bool,
    /// Status line text
    pub status: String,
    /// Selected row
    pub selected: Option<usize>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            busy: false,
            status: "Ready".to_string(),
            selected: None,
        }
    }
}

impl ViewState {
    /// Whether the Search button accepts clicks
    pub fn trigger_enabled(&self) -> bool {
        !self.busy
    }

    pub fn selected_path(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.results.get(i))
            .map(String::as_str)
    }
}

pub struct Presenter<D: Dispatch> {
    dispatcher: D,
    inbox: Inbox,
    view: ViewState,
    /// Highest sequence number handed out so far
    last_seq: u64,
    /// Search whose outcome we are waiting for
    awaiting: Option<u64>,
}

impl<D: Dispatch> Presenter<D> {
    /// `inbox` must be the one `dispatcher` posts to
    pub fn new(dispatcher: D, inbox: Inbox) -> Self {
        Self {
            dispatcher,
            inbox,
            view: ViewState::default(),
            last_seq: 0,
            awaiting: None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Start a search for `term`. An empty term only updates the status line.
    /// Returns the sequence number of the new search.
    pub fn start_search(&mut self, term: &str, options: SearchOptions) -> Result<u64> {
        let request = match SearchRequest::new(self.last_seq + 1, term, options) {
            Ok(request) => request,
            Err(e) => {
                self.view.status = e.to_string();
                return Err(e);
            }
        };

        let seq = request.seq();
        self.last_seq = seq;
        self.awaiting = Some(seq);

        self.view.results.clear();
        self.view.selected = None;
        self.view.busy = true;
        self.view.status = "Searching...".to_string();

        self.dispatcher.dispatch(request);
        Ok(seq)
    }

    /// Apply every message currently in the inbox. Returns how many were taken.
    pub fn poll(&mut self) -> usize {
        let messages = self.inbox.drain();
        let count = messages.len();
        for message in messages {
            self.apply(message);
        }
        count
    }

    fn apply(&mut self, message: InboxMessage) {
        match message {
            InboxMessage::Search { seq, outcome } => {
                if self.awaiting != Some(seq) {
                    logging::debug("PRESENTER", &format!("dropping stale outcome #{}", seq));
                    return;
                }
                self.awaiting = None;
                self.view.busy = false;

                match outcome {
                    SearchOutcome::Results(paths) => {
                        self.view.status = format!("Found {} results", paths.len());
                        self.view.results.extend(paths);
                    }
                    SearchOutcome::Failure(message) => {
                        self.view.status = format!("Error: {}", message);
                    }
                }
            }
            InboxMessage::Reveal(RevealOutcome::Revealed { wsl_path, host_path }) => {
                logging::debug("PRESENTER", &format!("{} shown as {}", wsl_path, host_path));
            }
            InboxMessage::Reveal(RevealOutcome::Failed { message, .. }) => {
                self.view.status = format!("Error opening file: {}", message);
            }
        }
    }

    /// Select the row at `index`; out-of-range clears the selection
    pub fn select(&mut self, index: Option<usize>) {
        self.view.selected = index.filter(|&i| i < self.view.results.len());
    }

    pub fn select_next(&mut self) {
        let total = self.view.results.len();
        if total == 0 {
            return;
        }
        self.view.selected = Some(match self.view.selected {
            Some(i) => (i + 1).min(total - 1),
            None => 0,
        });
    }

    pub fn select_prev(&mut self) {
        if self.view.results.is_empty() {
            return;
        }
        self.view.selected = Some(match self.view.selected {
            Some(0) | None => 0,
            Some(i) => i - 1,
        });
    }

    /// Show the selected row in Explorer. Does nothing without a selection.
    pub fn open_selection(&mut self) {
        let Some(path) = self.view.selected_path() else {
            return;
        };
        self.dispatcher.reveal(path.to_string());
    }

    /// Put a message from the window itself (clipboard, menus) on the status line
    pub fn notify(&mut self, status: impl Into<String>) {
        self.view.status = status.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::StubRunner;
    use crate::bridge::CapturedOutput;
    use crate::dispatcher::Dispatcher;
    use crate::error::LocateError;
    use crate::inbox::InboxSender;
    use crate::BridgeConfig;
    use std::cell::RefCell;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Records requests instead of running them
    #[derive(Default)]
    struct SpyDispatcher {
        searches: RefCell<Vec<SearchRequest>>,
        reveals: RefCell<Vec<String>>,
    }

    impl Dispatch for SpyDispatcher {
        fn dispatch(&self, request: SearchRequest) {
            self.searches.borrow_mut().push(request);
        }

        fn reveal(&self, wsl_path: String) {
            self.reveals.borrow_mut().push(wsl_path);
        }
    }

    fn spy_presenter() -> (Presenter<SpyDispatcher>, InboxSender) {
        let inbox = Inbox::new();
        let sender = inbox.sender();
        (Presenter::new(SpyDispatcher::default(), inbox), sender)
    }

    fn results(seq: u64, paths: &[&str]) -> InboxMessage {
        InboxMessage::Search {
            seq,
            outcome: SearchOutcome::Results(paths.iter().map(|p| p.to_string()).collect()),
        }
    }

    fn poll_until_idle<D: Dispatch>(presenter: &mut Presenter<D>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while presenter.view().busy && Instant::now() < deadline {
            presenter.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn empty_term_never_dispatches() {
        let (mut presenter, _) = spy_presenter();

        let err = presenter.start_search("", SearchOptions::default()).unwrap_err();

        assert!(matches!(err, LocateError::EmptyTerm));
        assert!(presenter.dispatcher().searches.borrow().is_empty());
        assert_eq!(presenter.view().status, "Please enter a search term");
        assert!(!presenter.view().busy);
    }

    #[test]
    fn starting_a_search_clears_and_goes_busy() {
        let (mut presenter, sender) = spy_presenter();
        presenter.start_search("old", SearchOptions::default()).unwrap();
        sender.post(results(1, &["/old"]));
        presenter.poll();
        presenter.select(Some(0));

        let seq = presenter.start_search("new", SearchOptions::default()).unwrap();

        assert_eq!(seq, 2);
        let view = presenter.view();
        assert!(view.busy);
        assert!(!view.trigger_enabled());
        assert!(view.results.is_empty());
        assert_eq!(view.selected, None);
        assert_eq!(view.status, "Searching...");
        assert_eq!(presenter.dispatcher().searches.borrow().len(), 2);
    }

    #[test]
    fn poll_on_empty_inbox_changes_nothing() {
        let (mut presenter, _) = spy_presenter();
        presenter.start_search("x", SearchOptions::default()).unwrap();
        let before = presenter.view().clone();

        assert_eq!(presenter.poll(), 0);
        assert_eq!(presenter.view(), &before);
    }

    #[test]
    fn poll_drains_every_pending_message() {
        let (mut presenter, sender) = spy_presenter();
        for _ in 0..3 {
            presenter.start_search("x", SearchOptions::default()).unwrap();
        }
        sender.post(results(1, &["/one"]));
        sender.post(results(3, &["/three"]));
        sender.post(results(2, &["/two"]));
        sender.post(InboxMessage::Reveal(RevealOutcome::Revealed {
            wsl_path: "/x".into(),
            host_path: "C:\\x".into(),
        }));

        assert_eq!(presenter.poll(), 4);
        assert_eq!(presenter.poll(), 0);
        assert_eq!(presenter.view().results, vec!["/three"]);
    }

    #[test]
    fn failure_clears_busy_and_reports() {
        let (mut presenter, sender) = spy_presenter();
        presenter.start_search("x", SearchOptions::default()).unwrap();
        sender.post(InboxMessage::Search {
            seq: 1,
            outcome: SearchOutcome::Failure("wsl: not found".to_string()),
        });

        presenter.poll();

        let view = presenter.view();
        assert!(!view.busy);
        assert!(view.trigger_enabled());
        assert!(view.results.is_empty());
        assert!(view.status.contains("wsl: not found"));
    }

    #[test]
    fn late_outcome_of_older_search_is_dropped() {
        let (mut presenter, sender) = spy_presenter();
        presenter.start_search("first", SearchOptions::default()).unwrap();
        presenter.start_search("second", SearchOptions::default()).unwrap();

        sender.post(results(1, &["/first"]));
        presenter.poll();
        assert!(presenter.view().busy);
        assert!(presenter.view().results.is_empty());

        sender.post(results(2, &["/second/a", "/second/b"]));
        presenter.poll();
        assert!(!presenter.view().busy);
        assert_eq!(presenter.view().results, vec!["/second/a", "/second/b"]);
    }

    #[test]
    fn duplicate_outcome_is_ignored() {
        let (mut presenter, sender) = spy_presenter();
        presenter.start_search("x", SearchOptions::default()).unwrap();
        sender.post(results(1, &["/a"]));
        sender.post(results(1, &["/a"]));

        presenter.poll();

        assert_eq!(presenter.view().results, vec!["/a"]);
        assert_eq!(presenter.view().status, "Found 1 results");
    }

    #[test]
    fn open_without_selection_is_noop() {
        let (mut presenter, sender) = spy_presenter();
        presenter.start_search("x", SearchOptions::default()).unwrap();
        sender.post(results(1, &["/a"]));
        presenter.poll();
        let before = presenter.view().clone();

        presenter.open_selection();

        assert!(presenter.dispatcher().reveals.borrow().is_empty());
        assert_eq!(presenter.view(), &before);
    }

    #[test]
    fn open_selection_reveals_selected_path() {
        let (mut presenter, sender) = spy_presenter();
        presenter.start_search("x", SearchOptions::default()).unwrap();
        sender.post(results(1, &["/a", "/b"]));
        presenter.poll();

        presenter.select(Some(1));
        presenter.open_selection();

        assert_eq!(*presenter.dispatcher().reveals.borrow(), vec!["/b".to_string()]);
    }

    #[test]
    fn reveal_failure_only_touches_status() {
        let (mut presenter, sender) = spy_presenter();
        presenter.start_search("x", SearchOptions::default()).unwrap();
        sender.post(results(1, &["/a"]));
        presenter.poll();

        sender.post(InboxMessage::Reveal(RevealOutcome::Failed {
            wsl_path: "/a".into(),
            message: "wslpath: /a: No such file or directory".into(),
        }));
        presenter.poll();

        assert_eq!(presenter.view().results, vec!["/a"]);
        assert!(presenter.view().status.starts_with("Error opening file:"));
    }

    #[test]
    fn selection_stays_in_bounds() {
        let (mut presenter, sender) = spy_presenter();
        presenter.select_next();
        assert_eq!(presenter.view().selected, None);

        presenter.start_search("x", SearchOptions::default()).unwrap();
        sender.post(results(1, &["/a", "/b"]));
        presenter.poll();

        presenter.select_next();
        presenter.select_next();
        presenter.select_next();
        assert_eq!(presenter.view().selected, Some(1));
        presenter.select_prev();
        presenter.select_prev();
        assert_eq!(presenter.view().selected, Some(0));
        presenter.select(Some(9));
        assert_eq!(presenter.view().selected, None);
    }

    #[test]
    fn report_search_end_to_end() {
        let inbox = Inbox::new();
        let runner = Arc::new(StubRunner::replying(vec![Ok(CapturedOutput::ok(
            "/mnt/c/Users/me/report.docx\n/mnt/d/archive/Report.pdf\n",
        ))]));
        let dispatcher = Dispatcher::new(runner.clone(), BridgeConfig::default(), inbox.sender());
        let mut presenter = Presenter::new(dispatcher, inbox);

        let options = SearchOptions {
            ignore_case: true,
            existing_only: true,
            basename_only: false,
        };
        presenter.start_search("report", options).unwrap();
        poll_until_idle(&mut presenter);

        let view = presenter.view();
        assert_eq!(
            view.results,
            vec!["/mnt/c/Users/me/report.docx", "/mnt/d/archive/Report.pdf"]
        );
        assert_eq!(view.status, "Found 2 results");
        assert!(view.trigger_enabled());

        let captured = runner.captured();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].args, vec!["--exec", "locate", "--ignore-case", "--existing", "report"]);
    }
}
