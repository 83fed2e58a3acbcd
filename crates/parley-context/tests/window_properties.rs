// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for context-window selection.

use parley_context::{ContextWindow, estimate_tokens};
use parley_core::{Role, Turn, UserId};
use proptest::prelude::*;

fn build(contents: Vec<String>) -> Vec<Turn> {
    contents
        .into_iter()
        .enumerate()
        .map(|(i, content)| Turn {
            id: i as i64 + 1,
            user_id: UserId::new(1).unwrap(),
            role: if i % 2 == 0 { Role::User } else { Role::Assistant },
            content,
            created_at: format!("2026-01-01T00:00:00.{i:06}Z"),
        })
        .collect()
}

fn any_window() -> impl Strategy<Value = ContextWindow> {
    prop_oneof![
        Just(ContextWindow::Unbounded),
        (0usize..20).prop_map(|max_turns| ContextWindow::MostRecent { max_turns }),
        (0usize..200).prop_map(|tokens| ContextWindow::TokenBudget { tokens }),
    ]
}

proptest! {
    #[test]
    fn selection_is_a_suffix_containing_the_newest_turn(
        contents in prop::collection::vec(".{0,60}", 0..30),
        window in any_window(),
    ) {
        let turns = build(contents);
        let selected = window.select(turns.clone());

        prop_assert!(selected.len() <= turns.len());
        prop_assert_eq!(&turns[turns.len() - selected.len()..], &selected[..]);
        if !turns.is_empty() {
            prop_assert_eq!(selected.last(), turns.last());
        }
    }

    #[test]
    fn most_recent_never_exceeds_its_limit(
        contents in prop::collection::vec("[a-z]{0,10}", 1..30),
        max_turns in 1usize..20,
    ) {
        let turns = build(contents);
        let selected = ContextWindow::MostRecent { max_turns }.select(turns.clone());
        prop_assert_eq!(selected.len(), max_turns.min(turns.len()));
    }

    #[test]
    fn token_budget_fits_unless_only_newest_is_kept(
        contents in prop::collection::vec(".{0,80}", 1..30),
        tokens in 1usize..200,
    ) {
        let turns = build(contents);
        let selected = ContextWindow::TokenBudget { tokens }.select(turns.clone());
        let used: usize = selected.iter().map(|t| estimate_tokens(&t.content)).sum();

        prop_assert!(selected.len() == 1 || used <= tokens);

        // Maximal: one more turn would not have fit.
        if selected.len() < turns.len() {
            let next = &turns[turns.len() - selected.len() - 1];
            prop_assert!(used + estimate_tokens(&next.content) > tokens);
        }
    }
}
