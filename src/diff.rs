// Relationship comparison. Pure functions only; output order follows the
// input sequences so table numbering is reproducible within a run.

use std::collections::HashSet;

pub type Login = String;

/// Both one-sided relationship sets for a single snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipDiff {
    /// Accounts you follow that don't follow you.
    pub not_following_back: Vec<Login>,
    /// Accounts following you that you don't follow.
    pub not_followed_back: Vec<Login>,
}

impl RelationshipDiff {
    pub fn is_in_sync(&self) -> bool {
        self.not_following_back.is_empty() && self.not_followed_back.is_empty()
    }
}

pub fn diff_relationships(following: &[Login], followers: &[Login]) -> RelationshipDiff {
    RelationshipDiff {
        not_following_back: difference(following, followers),
        not_followed_back: difference(followers, following),
    }
}

/// `left - right`, keeping first-seen order of `left` and dropping repeats.
fn difference(left: &[Login], right: &[Login]) -> Vec<Login> {
    let exclude: HashSet<&str> = right.iter().map(String::as_str).collect();
    let mut seen: HashSet<&Login> = HashSet::new();
    left.iter()
        .filter(|login| !exclude.contains(login.as_str()) && seen.insert(*login))
        .cloned()
        .collect()
}

/// Drop repeated logins, keeping the first occurrence.
pub fn dedup_preserving_order(logins: Vec<Login>) -> Vec<Login> {
    let mut seen = HashSet::new();
    logins
        .into_iter()
        .filter(|login| seen.insert(login.clone()))
        .collect()
}
