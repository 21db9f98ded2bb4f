// UI layer: the `Presenter` trait is everything the orchestrator needs from
// a terminal, and `TerminalPresenter` implements it with `dialoguer` prompts,
// `indicatif` progress bars and `tabled` tables. Tests swap in a scripted
// presenter instead of a real terminal.

use crate::app::{BatchAction, BatchReport};
use crate::diff::{Login, RelationshipDiff};
use crossterm::style::Stylize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub const PROFILE_BASE: &str = "https://github.com";

/// What the user picked from the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Unfollow,
    FollowBack,
    Exit,
}

/// A visual progress indicator advanced once per processed item.
pub trait Progress {
    fn advance(&mut self);
    fn finish(&mut self, message: &str);
}

/// Terminal interactions used by the orchestrator. Every method that waits
/// for the user returns `io::Result` so a closed terminal ends the run.
pub trait Presenter {
    fn intro(&self);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    /// Show `accounts` as a numbered (1-based) table.
    fn render_table(&self, title: &str, accounts: &[Login]);
    fn choose_action(&mut self, diff: &RelationshipDiff) -> io::Result<MenuChoice>;
    /// Free-text question; the answer is returned as typed.
    fn prompt(&mut self, text: &str) -> io::Result<String>;
    /// Yes/no question. Anything other than an explicit yes is a no.
    fn confirm(&mut self, text: &str) -> io::Result<bool>;
    /// Indeterminate indicator for a single long call.
    fn spinner(&self, message: &str) -> Box<dyn Progress>;
    /// Determinate indicator over `total` steps.
    fn progress(&self, total: usize, label: &str) -> Box<dyn Progress>;
    fn summary(&self, report: &BatchReport);
}

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Username")]
    login: String,
    #[tabled(rename = "Profile")]
    profile: String,
}

/// Render accounts as a numbered table with profile links.
pub fn format_table(accounts: &[Login]) -> String {
    let rows = accounts.iter().enumerate().map(|(i, login)| AccountRow {
        index: i + 1,
        login: login.clone(),
        profile: format!("{}/{}", PROFILE_BASE, login),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Menu entries for the sets that have something in them, plus Exit.
pub fn menu_entries(diff: &RelationshipDiff) -> Vec<(MenuChoice, String)> {
    let mut entries = Vec::new();
    if !diff.not_following_back.is_empty() {
        entries.push((
            MenuChoice::Unfollow,
            format!(
                "🚫 Show and optionally unfollow users who don't follow you back [{}]",
                diff.not_following_back.len()
            ),
        ));
    }
    if !diff.not_followed_back.is_empty() {
        entries.push((
            MenuChoice::FollowBack,
            format!(
                "➕ Show and optionally follow users you don't follow back [{}]",
                diff.not_followed_back.len()
            ),
        ));
    }
    entries.push((MenuChoice::Exit, "🚪 Exit".to_string()));
    entries
}

/// One line per failed account, then one naming the skipped accounts.
pub fn summary_details(report: &BatchReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .failed
        .iter()
        .map(|(login, reason)| format!("✗ {}: {}", login, reason))
        .collect();
    if !report.skipped.is_empty() {
        lines.push(format!(
            "⏭ not attempted ({}): {}",
            report.skipped.len(),
            report.skipped.join(", ")
        ));
    }
    lines
}

/// `Presenter` backed by the real terminal.
pub struct TerminalPresenter {
    theme: ColorfulTheme,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        TerminalPresenter {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for TerminalPresenter {
    fn intro(&self) {
        println!("{}", "🔄 GitHub Follow Sync".cyan().bold());
        println!(
            "{}\n",
            "🧹 Unfollow non-followers, 🤝 follow back your supporters".dim()
        );
    }

    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn warn(&self, message: &str) {
        println!("{} {}", "⚠️ Warning:".yellow(), message);
    }

    fn render_table(&self, title: &str, accounts: &[Login]) {
        println!("\n{}", title.bold());
        println!("{}", format_table(accounts));
    }

    fn choose_action(&mut self, diff: &RelationshipDiff) -> io::Result<MenuChoice> {
        let entries = menu_entries(diff);
        let labels: Vec<&str> = entries.iter().map(|(_, label)| label.as_str()).collect();
        // `Select` is keyboard-driven: arrow keys and Enter.
        let picked = Select::with_theme(&self.theme)
            .with_prompt("📋 Choose an option")
            .items(&labels)
            .default(labels.len() - 1)
            .interact()?;
        Ok(entries[picked].0)
    }

    fn prompt(&mut self, text: &str) -> io::Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(text)
            .allow_empty(true)
            .interact_text()
    }

    fn confirm(&mut self, text: &str) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(text)
            .default(false)
            .interact()
    }

    fn spinner(&self, message: &str) -> Box<dyn Progress> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Box::new(spinner)
    }

    fn progress(&self, total: usize, label: &str) -> Box<dyn Progress> {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_message(label.to_string());
        Box::new(bar)
    }

    fn summary(&self, report: &BatchReport) {
        println!(
            "✅ {} • ❌ {}",
            format!("{} {}", report.action.past_tense(), report.succeeded.len()).green(),
            format!("failed {}", report.failed.len()).red()
        );
        for line in summary_details(report) {
            println!("   {}", line);
        }
    }
}

impl Progress for ProgressBar {
    fn advance(&mut self) {
        self.inc(1);
    }

    fn finish(&mut self, message: &str) {
        self.finish_with_message(message.to_string());
    }
}

/// Progress indicator that draws nothing.
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&mut self) {}
    fn finish(&mut self, _message: &str) {}
}

/// Label shown above a candidate table for `action`.
pub fn table_title(action: BatchAction, count: usize) -> String {
    format!("{} {} candidates ({})", action.emoji(), action.label(), count)
}
