// Orchestrator: verify the token, fetch both relationship lists, compare
// them, let the user pick accounts and apply the chosen action one account
// at a time. Fatal errors are returned; per-account failures end up in the
// `BatchReport`.

use crate::api::FollowApi;
use crate::config::Config;
use crate::diff::{diff_relationships, Login};
use crate::error::SyncError;
use crate::selection::parse_selection;
use crate::ui::{table_title, MenuChoice, Presenter};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Mutation applied to every selected account of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Unfollow,
    Follow,
}

impl BatchAction {
    pub fn label(self) -> &'static str {
        match self {
            BatchAction::Unfollow => "Unfollow",
            BatchAction::Follow => "Follow",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            BatchAction::Unfollow => "unfollow",
            BatchAction::Follow => "follow",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            BatchAction::Unfollow => "Unfollowed",
            BatchAction::Follow => "Followed",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            BatchAction::Unfollow => "🚫",
            BatchAction::Follow => "➕",
        }
    }

    fn apply<A: FollowApi + ?Sized>(self, api: &A, login: &str) -> Result<(), SyncError> {
        match self {
            BatchAction::Unfollow => api.unfollow(login),
            BatchAction::Follow => api.follow(login),
        }
    }
}

/// Outcome of one batch, in the order the accounts were processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub action: BatchAction,
    pub succeeded: Vec<Login>,
    /// Failed accounts with the error message for each.
    pub failed: Vec<(Login, String)>,
    /// Accounts left untouched because a fatal error stopped the batch.
    pub skipped: Vec<Login>,
}

impl BatchReport {
    fn new(action: BatchAction) -> Self {
        BatchReport {
            action,
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Load the config, connect and run the interactive flow. `connect` is only
/// called once a valid config exists, so a missing token never reaches the
/// network.
pub fn launch<A, P, L, C>(
    load: L,
    connect: C,
    presenter: P,
) -> Result<Option<BatchReport>, SyncError>
where
    A: FollowApi,
    P: Presenter,
    L: FnOnce() -> Result<Config, SyncError>,
    C: FnOnce(Config) -> Result<A, SyncError>,
{
    let config = load()?;
    debug!("Loaded {:?}", config);
    let api = connect(config)?;
    App::new(api, presenter).run()
}

pub struct App<A, P> {
    api: A,
    presenter: P,
}

impl<A: FollowApi, P: Presenter> App<A, P> {
    pub fn new(api: A, presenter: P) -> Self {
        App { api, presenter }
    }

    pub fn into_parts(self) -> (A, P) {
        (self.api, self.presenter)
    }

    /// Run one pass of the flow. Returns the batch report when a batch was
    /// executed, `None` when the user stopped earlier or nothing needed
    /// doing.
    pub fn run(&mut self) -> Result<Option<BatchReport>, SyncError> {
        match self.api.current_user()? {
            Some(login) => self.presenter.info(&format!("🔐 Authenticated as {}\n", login)),
            None => self
                .presenter
                .warn("could not confirm the authenticated user, continuing anyway"),
        }

        let following = self.fetch("📥 Fetching accounts you follow...", |api| {
            api.fetch_following()
        })?;
        let followers = self.fetch("📥 Fetching your followers...", |api| {
            api.fetch_followers()
        })?;
        info!(
            "following {} accounts, followed by {}",
            following.len(),
            followers.len()
        );

        let diff = diff_relationships(&following, &followers);
        if diff.is_in_sync() {
            self.presenter
                .info("🎉 You and your followers are in perfect sync!");
            return Ok(None);
        }

        let (action, candidates) = match self.presenter.choose_action(&diff)? {
            MenuChoice::Unfollow => (BatchAction::Unfollow, &diff.not_following_back),
            MenuChoice::FollowBack => (BatchAction::Follow, &diff.not_followed_back),
            MenuChoice::Exit => return Ok(None),
        };
        self.pick_and_apply(action, candidates)
    }

    fn fetch<F>(&self, message: &str, fetch: F) -> Result<Vec<Login>, SyncError>
    where
        F: FnOnce(&A) -> Result<Vec<Login>, SyncError>,
    {
        let mut spinner = self.presenter.spinner(message);
        let result = fetch(&self.api);
        match &result {
            Ok(logins) => spinner.finish(&format!("✅ Fetched {} users", logins.len())),
            Err(_) => spinner.finish("❌ Fetch failed"),
        }
        result
    }

    fn pick_and_apply(
        &mut self,
        action: BatchAction,
        candidates: &[Login],
    ) -> Result<Option<BatchReport>, SyncError> {
        self.presenter
            .render_table(&table_title(action, candidates.len()), candidates);

        let wants = self.presenter.confirm(&format!(
            "Do you want to {} some or all of them?",
            action.verb()
        ))?;
        if !wants {
            return Ok(None);
        }

        let selected = match self.await_selection(action, candidates.len())? {
            Some(selected) => selected,
            None => {
                self.presenter.info("🛑 No selection.");
                return Ok(None);
            }
        };
        let chosen: Vec<Login> = selected
            .iter()
            .map(|&index| candidates[index - 1].clone())
            .collect();

        let sure = self.presenter.confirm(&format!(
            "{} {} {} account(s)?",
            action.emoji(),
            action.label(),
            chosen.len()
        ))?;
        if !sure {
            self.presenter.info("🛑 Cancelled.");
            return Ok(None);
        }

        let report = execute_batch(&self.api, &self.presenter, action, &chosen);
        self.presenter.summary(&report);
        Ok(Some(report))
    }

    /// Prompt until the input parses. Empty input means the user backed out.
    fn await_selection(
        &mut self,
        action: BatchAction,
        max: usize,
    ) -> Result<Option<BTreeSet<usize>>, SyncError> {
        let question = format!(
            "🎯 Enter indexes to {} (e.g. 1-3,5,8 or all), Enter to cancel",
            action.verb()
        );
        loop {
            let raw = self.presenter.prompt(&question)?;
            match parse_selection(&raw, max) {
                Ok(selected) if selected.is_empty() => return Ok(None),
                Ok(selected) => return Ok(Some(selected)),
                Err(e) => self.presenter.warn(&format!("Invalid selection: {}", e)),
            }
        }
    }
}

/// Apply `action` to each account in order, one request at a time. A failed
/// account is recorded and the batch moves on, unless the error is fatal
/// (rejected token): then the remaining accounts are skipped.
pub fn execute_batch<A, P>(
    api: &A,
    presenter: &P,
    action: BatchAction,
    accounts: &[Login],
) -> BatchReport
where
    A: FollowApi + ?Sized,
    P: Presenter + ?Sized,
{
    let mut report = BatchReport::new(action);
    let mut progress = presenter.progress(
        accounts.len(),
        &format!("{} {}ing...", action.emoji(), action.label()),
    );
    for (position, login) in accounts.iter().enumerate() {
        match action.apply(api, login) {
            Ok(()) => {
                info!("{} {}", action.past_tense(), login);
                report.succeeded.push(login.clone());
            }
            Err(e) if e.is_fatal() => {
                warn!("{} {} failed, stopping batch: {}", action.label(), login, e);
                report.failed.push((login.clone(), e.to_string()));
                report.skipped = accounts[position + 1..].to_vec();
                progress.advance();
                break;
            }
            Err(e) => {
                warn!("{} {} failed: {}", action.label(), login, e);
                report.failed.push((login.clone(), e.to_string()));
            }
        }
        progress.advance();
    }
    progress.finish(&format!("{} {} of {}", action.past_tense(), report.succeeded.len(), accounts.len()));
    report
}
