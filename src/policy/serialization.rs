//! On-disk persistence for trained policies.
//!
//! Policies are stored as a versioned map from state labels to move
//! positions. JSON and MessagePack are supported, chosen by file extension
//! (`.json` for JSON, anything else for MessagePack).

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{policy::Policy, tictactoe::BoardState};

/// Serializable snapshot of a [`Policy`].
///
/// Entries are keyed by the board label format so files are diffable and
/// ordering is stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPolicy {
    pub version: u32,
    pub entries: BTreeMap<String, usize>,
}

impl SavedPolicy {
    pub const VERSION: u32 = 1;

    /// Snapshot a policy for writing to disk
    pub fn from_policy(policy: &Policy) -> Self {
        let entries = policy
            .iter()
            .map(|(state, action)| (state.encode(), action.position))
            .collect();
        Self {
            version: Self::VERSION,
            entries,
        }
    }

    /// Rebuild an in-memory policy, validating every entry.
    ///
    /// # Errors
    ///
    /// Fails if the version is unsupported, a label does not parse, a state
    /// is terminal, or a recorded position is not legal in its state.
    pub fn into_policy(self) -> Result<Policy> {
        if self.version != Self::VERSION {
            return Err(anyhow!(
                "unsupported policy file version {} (expected {})",
                self.version,
                Self::VERSION
            ));
        }

        let mut policy = Policy::new();
        for (label, position) in self.entries {
            let state = BoardState::from_label(&label)
                .with_context(|| format!("invalid state label '{label}' in policy file"))?;
            if state.is_terminal() {
                return Err(anyhow!("policy file maps terminal state '{label}'"));
            }
            let action = state
                .possible_actions()
                .into_iter()
                .find(|a| a.position == position)
                .ok_or_else(|| {
                    anyhow!("position {position} is not legal in state '{label}'")
                })?;
            policy.insert(state, action);
        }
        Ok(policy)
    }

    /// Write the snapshot to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create policy file {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        if is_json(path) {
            serde_json::to_writer_pretty(&mut writer, self)
                .with_context(|| format!("failed to write JSON policy to {}", path.display()))?;
        } else {
            rmp_serde::encode::write(&mut writer, self).with_context(|| {
                format!("failed to write MessagePack policy to {}", path.display())
            })?;
        }
        Ok(())
    }

    /// Read a snapshot from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open policy file {}", path.display()))?;
        let reader = BufReader::new(file);

        if is_json(path) {
            serde_json::from_reader(reader)
                .with_context(|| format!("failed to parse JSON policy from {}", path.display()))
        } else {
            rmp_serde::from_read(reader).with_context(|| {
                format!("failed to parse MessagePack policy from {}", path.display())
            })
        }
    }
}

/// Save a policy to `path`, format chosen by extension
pub fn save_policy(policy: &Policy, path: &Path) -> Result<()> {
    SavedPolicy::from_policy(policy).save(path)
}

/// Load a policy from `path`, format chosen by extension
pub fn load_policy(path: &Path) -> Result<Policy> {
    SavedPolicy::load(path)?.into_policy()
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
