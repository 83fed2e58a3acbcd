// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context-window selection over an append-only transcript.
//!
//! The orchestrator loads a user's whole transcript and hands it to a
//! [`ContextWindow`], which decides which suffix is sent to the model.
//! Every policy returns a contiguous chronological suffix of its input and
//! always keeps the newest turn, even when that turn alone exceeds the
//! budget.

use parley_config::model::{ContextConfig, ContextPolicy};
use parley_core::Turn;
use tracing::debug;

/// Rough characters-per-token ratio used for budget estimates.
const CHARS_PER_TOKEN: usize = 4;

/// Policy deciding how much of a transcript reaches the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextWindow {
    /// The whole transcript.
    #[default]
    Unbounded,
    /// The newest `max_turns` turns.
    MostRecent { max_turns: usize },
    /// The longest suffix whose estimated token count fits in `tokens`.
    TokenBudget { tokens: usize },
}

impl ContextWindow {
    /// Builds the policy described by the `[context]` section.
    pub fn from_config(config: &ContextConfig) -> Self {
        match config.policy {
            ContextPolicy::Unbounded => Self::Unbounded,
            ContextPolicy::MostRecent => Self::MostRecent {
                max_turns: config.max_turns,
            },
            ContextPolicy::TokenBudget => Self::TokenBudget {
                tokens: config.token_budget,
            },
        }
    }

    /// Selects the turns sent to the model, oldest first.
    pub fn select(&self, mut transcript: Vec<Turn>) -> Vec<Turn> {
        let keep = self.suffix_len(&transcript);
        let dropped = transcript.len() - keep;
        if dropped > 0 {
            debug!(dropped, kept = keep, policy = ?self, "context window trimmed transcript");
            transcript.drain(..dropped);
        }
        transcript
    }

    /// Number of trailing turns to keep.
    fn suffix_len(&self, transcript: &[Turn]) -> usize {
        let total = transcript.len();
        if total == 0 {
            return 0;
        }
        match *self {
            Self::Unbounded => total,
            Self::MostRecent { max_turns } => max_turns.clamp(1, total),
            Self::TokenBudget { tokens } => {
                let mut used = 0;
                let mut keep = 0;
                for turn in transcript.iter().rev() {
                    let cost = estimate_tokens(&turn.content);
                    if keep > 0 && used + cost > tokens {
                        break;
                    }
                    used += cost;
                    keep += 1;
                }
                keep
            }
        }
    }
}

/// Estimated token count of `text`: about four characters per token, and
/// never less than one so every turn costs something.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() / CHARS_PER_TOKEN).max(1)
}
