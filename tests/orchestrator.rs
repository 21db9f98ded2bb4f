use follow_sync::api::FollowApi;
use follow_sync::app::{execute_batch, launch, App, BatchAction, BatchReport};
use follow_sync::config::Config;
use follow_sync::diff::{Login, RelationshipDiff};
use follow_sync::error::SyncError;
use follow_sync::ui::{MenuChoice, NoProgress, Presenter, Progress};
use reqwest::StatusCode;
use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::io;

fn logins(names: &[&str]) -> Vec<Login> {
    names.iter().map(|n| n.to_string()).collect()
}

/// In-memory platform that records every mutation call.
#[derive(Default)]
struct FakeApi {
    following: Vec<Login>,
    followers: Vec<Login>,
    reject_token: bool,
    failing: HashSet<Login>,
    revoked_at: HashSet<Login>,
    calls: RefCell<Vec<String>>,
}

impl FakeApi {
    fn new(following: &[&str], followers: &[&str]) -> Self {
        FakeApi {
            following: logins(following),
            followers: logins(followers),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn mutate(&self, verb: &str, login: &str) -> Result<(), SyncError> {
        self.calls.borrow_mut().push(format!("{} {}", verb, login));
        if self.revoked_at.contains(login) {
            return Err(SyncError::Authentication("revoked".into()));
        }
        if self.failing.contains(login) {
            return Err(SyncError::Api {
                status: StatusCode::BAD_GATEWAY,
                body: "simulated transport failure".into(),
            });
        }
        Ok(())
    }
}

impl FollowApi for FakeApi {
    fn current_user(&self) -> Result<Option<Login>, SyncError> {
        if self.reject_token {
            return Err(SyncError::Authentication("invalid or expired token".into()));
        }
        Ok(Some("me".into()))
    }

    fn fetch_following(&self) -> Result<Vec<Login>, SyncError> {
        Ok(self.following.clone())
    }

    fn fetch_followers(&self) -> Result<Vec<Login>, SyncError> {
        Ok(self.followers.clone())
    }

    fn unfollow(&self, login: &str) -> Result<(), SyncError> {
        self.mutate("unfollow", login)
    }

    fn follow(&self, login: &str) -> Result<(), SyncError> {
        self.mutate("follow", login)
    }
}

/// Presenter that answers from a script and remembers what it showed.
#[derive(Default)]
struct ScriptedPresenter {
    menu: VecDeque<MenuChoice>,
    answers: VecDeque<String>,
    confirms: VecDeque<bool>,
    tables: RefCell<Vec<(String, Vec<Login>)>>,
    warnings: RefCell<Vec<String>>,
    infos: RefCell<Vec<String>>,
    summaries: Cell<usize>,
    progress_total: Cell<Option<usize>>,
}

impl ScriptedPresenter {
    fn new() -> Self {
        Self::default()
    }

    fn choose(mut self, choice: MenuChoice) -> Self {
        self.menu.push_back(choice);
        self
    }

    fn answer(mut self, text: &str) -> Self {
        self.answers.push_back(text.to_string());
        self
    }

    fn confirm_with(mut self, yes: bool) -> Self {
        self.confirms.push_back(yes);
        self
    }
}

fn script_exhausted(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, format!("no scripted {}", what))
}

impl Presenter for ScriptedPresenter {
    fn intro(&self) {}

    fn info(&self, message: &str) {
        self.infos.borrow_mut().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }

    fn render_table(&self, title: &str, accounts: &[Login]) {
        self.tables
            .borrow_mut()
            .push((title.to_string(), accounts.to_vec()));
    }

    fn choose_action(&mut self, _diff: &RelationshipDiff) -> io::Result<MenuChoice> {
        self.menu.pop_front().ok_or_else(|| script_exhausted("menu choice"))
    }

    fn prompt(&mut self, _text: &str) -> io::Result<String> {
        self.answers.pop_front().ok_or_else(|| script_exhausted("answer"))
    }

    fn confirm(&mut self, _text: &str) -> io::Result<bool> {
        self.confirms.pop_front().ok_or_else(|| script_exhausted("confirmation"))
    }

    fn spinner(&self, _message: &str) -> Box<dyn Progress> {
        Box::new(NoProgress)
    }

    fn progress(&self, total: usize, _label: &str) -> Box<dyn Progress> {
        self.progress_total.set(Some(total));
        Box::new(NoProgress)
    }

    fn summary(&self, _report: &BatchReport) {
        self.summaries.set(self.summaries.get() + 1);
    }
}

#[test]
fn unfollows_the_single_selected_account() {
    let api = FakeApi::new(&["A", "B", "C"], &["X"]);
    let presenter = ScriptedPresenter::new()
        .choose(MenuChoice::Unfollow)
        .confirm_with(true)
        .answer("1")
        .confirm_with(true);

    let mut app = App::new(api, presenter);
    let report = app.run().unwrap().expect("a batch should run");
    let (api, presenter) = app.into_parts();

    assert_eq!(api.calls(), vec!["unfollow A"]);
    assert_eq!(report.succeeded, logins(&["A"]));
    assert!(report.failed.is_empty());
    assert_eq!(presenter.summaries.get(), 1);
    assert_eq!(presenter.tables.borrow()[0].1, logins(&["A", "B", "C"]));
}

#[test]
fn end_to_end_diff_drives_both_menus() {
    let api = FakeApi::new(&["A", "B", "C"], &["B", "C", "D"]);
    let presenter = ScriptedPresenter::new()
        .choose(MenuChoice::FollowBack)
        .confirm_with(true)
        .answer("all")
        .confirm_with(true);

    let mut app = App::new(api, presenter);
    let report = app.run().unwrap().unwrap();
    let (api, presenter) = app.into_parts();

    assert_eq!(report.action, BatchAction::Follow);
    assert_eq!(api.calls(), vec!["follow D"]);
    assert_eq!(presenter.tables.borrow()[0].1, logins(&["D"]));
}

#[test]
fn partial_failure_keeps_going() {
    let mut api = FakeApi::new(&["A", "B", "C"], &[]);
    api.failing.insert("B".into());
    let presenter = ScriptedPresenter::new()
        .choose(MenuChoice::Unfollow)
        .confirm_with(true)
        .answer("1-3")
        .confirm_with(true);

    let mut app = App::new(api, presenter);
    let report = app.run().unwrap().unwrap();
    let (api, presenter) = app.into_parts();

    assert_eq!(api.calls(), vec!["unfollow A", "unfollow B", "unfollow C"]);
    assert_eq!(report.succeeded, logins(&["A", "C"]));
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "B");
    assert_eq!(report.attempted(), 3);
    assert_eq!(presenter.progress_total.get(), Some(3));
}

#[test]
fn invalid_selection_reprompts() {
    let api = FakeApi::new(&["A", "B", "C"], &[]);
    let presenter = ScriptedPresenter::new()
        .choose(MenuChoice::Unfollow)
        .confirm_with(true)
        .answer("5-3")
        .answer("abc")
        .answer("2")
        .confirm_with(true);

    let mut app = App::new(api, presenter);
    let report = app.run().unwrap().unwrap();
    let (api, presenter) = app.into_parts();

    assert_eq!(api.calls(), vec!["unfollow B"]);
    assert_eq!(report.succeeded, logins(&["B"]));
    assert_eq!(presenter.warnings.borrow().len(), 2);
}

#[test]
fn empty_selection_is_a_no_op() {
    let api = FakeApi::new(&["A"], &[]);
    let presenter = ScriptedPresenter::new()
        .choose(MenuChoice::Unfollow)
        .confirm_with(true)
        .answer("   ");

    let mut app = App::new(api, presenter);
    assert!(app.run().unwrap().is_none());
    let (api, presenter) = app.into_parts();
    assert!(api.calls().is_empty());
    assert_eq!(presenter.summaries.get(), 0);
}

#[test]
fn declining_final_confirmation_unfollows_nothing() {
    let api = FakeApi::new(&["A", "B"], &[]);
    let presenter = ScriptedPresenter::new()
        .choose(MenuChoice::Unfollow)
        .confirm_with(true)
        .answer("all")
        .confirm_with(false);

    let mut app = App::new(api, presenter);
    assert!(app.run().unwrap().is_none());
    assert!(app.into_parts().0.calls().is_empty());
}

#[test]
fn exit_from_menu_does_nothing() {
    let api = FakeApi::new(&["A"], &["B"]);
    let presenter = ScriptedPresenter::new().choose(MenuChoice::Exit);

    let mut app = App::new(api, presenter);
    assert!(app.run().unwrap().is_none());
    assert!(app.into_parts().0.calls().is_empty());
}

#[test]
fn in_sync_skips_the_menu() {
    let api = FakeApi::new(&["A", "B"], &["B", "A"]);
    // No scripted menu choice: reaching the menu would fail the run.
    let mut app = App::new(api, ScriptedPresenter::new());
    assert!(app.run().unwrap().is_none());
    let (_, presenter) = app.into_parts();
    assert!(presenter
        .infos
        .borrow()
        .iter()
        .any(|m| m.contains("perfect sync")));
}

#[test]
fn rejected_token_is_fatal() {
    let mut api = FakeApi::new(&["A"], &[]);
    api.reject_token = true;

    let mut app = App::new(api, ScriptedPresenter::new());
    let err = app.run().unwrap_err();
    assert!(matches!(err, SyncError::Authentication(_)));
    assert!(err.is_fatal());
}

#[test]
fn missing_token_never_connects() {
    let connected = Cell::new(false);
    let result = launch(
        || Config::from_lookup(|_| None),
        |_config| {
            connected.set(true);
            Ok(FakeApi::default())
        },
        ScriptedPresenter::new(),
    );

    assert!(matches!(result, Err(SyncError::Configuration(_))));
    assert!(!connected.get());
}

#[test]
fn launch_passes_config_to_connect() {
    let result = launch(
        || {
            Config::from_lookup(|key| match key {
                "GITHUB_TOKEN" => Some("tok".to_string()),
                _ => None,
            })
        },
        |config| {
            assert_eq!(config.token, "tok");
            Ok(FakeApi::new(&["A"], &["A"]))
        },
        ScriptedPresenter::new(),
    );
    assert!(result.unwrap().is_none());
}

#[test]
fn batch_runs_in_given_order() {
    let api = FakeApi::new(&[], &[]);
    let presenter = ScriptedPresenter::new();
    let report = execute_batch(
        &api,
        &presenter,
        BatchAction::Unfollow,
        &logins(&["c", "a", "b"]),
    );
    assert_eq!(api.calls(), vec!["unfollow c", "unfollow a", "unfollow b"]);
    assert_eq!(report.succeeded, logins(&["c", "a", "b"]));
}

#[test]
fn revoked_token_stops_the_batch() {
    let mut api = FakeApi::new(&[], &[]);
    api.revoked_at.insert("b".into());
    let presenter = ScriptedPresenter::new();

    let report = execute_batch(
        &api,
        &presenter,
        BatchAction::Unfollow,
        &logins(&["a", "b", "c", "d"]),
    );

    assert_eq!(api.calls(), vec!["unfollow a", "unfollow b"]);
    assert_eq!(report.succeeded, logins(&["a"]));
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "b");
    assert_eq!(report.skipped, logins(&["c", "d"]));
    assert_eq!(report.attempted(), 2);
}

#[test]
fn non_fatal_failures_skip_nothing() {
    let mut api = FakeApi::new(&[], &[]);
    api.failing.insert("a".into());
    let report = execute_batch(
        &api,
        &ScriptedPresenter::new(),
        BatchAction::Follow,
        &logins(&["a", "b"]),
    );
    assert_eq!(api.calls(), vec!["follow a", "follow b"]);
    assert!(report.skipped.is_empty());
}
