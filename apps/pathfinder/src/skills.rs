//! Skill tags — the de-duplicated, ordered list the user has typed or had extracted.
//!
//! Order is insertion order and is meaningful: it is both the display order and the
//! order sent to the backend. Uniqueness is case-insensitive.

use std::fmt;

use serde::Serialize;

/// A single normalized skill token. Never empty, never padded with whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Skill(String);

impl Skill {
    /// Trims `raw` and returns `None` if nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Skill(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used for duplicate detection.
    fn fold(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Skill {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Result of [`SkillSet::add`]. A duplicate never aborts the rest of the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddOutcome {
    pub added: Vec<Skill>,
    pub duplicates: Vec<String>,
}

impl AddOutcome {
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SkillSet {
    skills: Vec<Skill>,
    revision: u64,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `raw_text` on whitespace and appends every token not already present.
    pub fn add(&mut self, raw_text: &str) -> AddOutcome {
        let mut outcome = AddOutcome::default();

        for token in raw_text.split_whitespace() {
            let Some(skill) = Skill::parse(token) else {
                continue;
            };
            if self.contains(skill.as_str()) {
                outcome.duplicates.push(skill.0);
                continue;
            }
            self.skills.push(skill.clone());
            outcome.added.push(skill);
        }

        if outcome.changed() {
            self.revision += 1;
        }
        outcome
    }

    /// Removes an exact match. Returns `false` (and changes nothing) if absent.
    pub fn remove(&mut self, skill: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s.as_str() != skill);
        let removed = self.skills.len() != before;
        if removed {
            self.revision += 1;
        }
        removed
    }

    /// Clears and repopulates from a server-supplied list, keeping its order.
    /// Later duplicates and blank entries are dropped silently.
    pub fn replace_all<I, S>(&mut self, skills: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.skills.clear();
        for raw in skills {
            if let Some(skill) = Skill::parse(raw.as_ref()) {
                if !self.contains(skill.as_str()) {
                    self.skills.push(skill);
                }
            }
        }
        self.revision += 1;
    }

    pub fn list(&self) -> &[Skill] {
        &self.skills
    }

    /// Owned copy as plain strings, the shape request payloads use.
    pub fn to_vec(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.0.clone()).collect()
    }

    /// Space-joined text, the shape manual session creation expects.
    pub fn joined(&self) -> String {
        self.to_vec().join(" ")
    }

    pub fn contains(&self, skill: &str) -> bool {
        let needle = skill.trim().to_lowercase();
        self.skills.iter().any(|s| s.fold() == needle)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Bumped on every change to the contents.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
