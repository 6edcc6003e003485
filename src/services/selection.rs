//! Multi-select state for genre checkboxes.
//!
//! The fetched genres are left untouched; [`reconcile`] builds a separate list of
//! choices, each flagged `checked` when its identifier is among the chosen ones.
//! Both the edit form and the re-display of a rejected submission go through it.

use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use crate::forms::sanitize::canonical_id;
use crate::models::{Genre, Record};

/// A genre option as rendered on a book form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GenreChoice {
    pub id: String,
    pub name: String,
    pub url: String,
    pub checked: bool,
}

/// Flag each of `all` as checked iff its identifier appears in `chosen`
pub fn reconcile<S: AsRef<str>>(all: &[Genre], chosen: &[S]) -> Vec<GenreChoice> {
    let chosen: HashSet<String> = chosen.iter().map(|id| canonical_id(id.as_ref())).collect();
    all.iter()
        .map(|genre| GenreChoice {
            id: genre.id.clone(),
            name: genre.name.clone(),
            url: genre.url(),
            checked: chosen.contains(&canonical_id(&genre.id)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::new_id;

    fn genres(names: &[&str]) -> Vec<Genre> {
        names
            .iter()
            .map(|name| Genre {
                id: new_id(),
                name: name.to_string(),
            })
            .collect()
    }

    fn checked(choices: &[GenreChoice]) -> Vec<&str> {
        choices
            .iter()
            .filter(|c| c.checked)
            .map(|c| c.name.as_str())
            .collect()
    }

    #[test]
    fn test_marks_exactly_the_chosen() {
        let all = genres(&["Fantasy", "Poetry", "Science Fiction"]);
        let chosen = vec![all[0].id.clone(), all[2].id.clone()];

        let choices = reconcile(&all, &chosen);
        assert_eq!(choices.len(), 3);
        assert_eq!(checked(&choices), vec!["Fantasy", "Science Fiction"]);
    }

    #[test]
    fn test_empty_choice_marks_nothing() {
        let all = genres(&["Fantasy", "Poetry"]);
        let choices = reconcile::<String>(&all, &[]);
        assert!(checked(&choices).is_empty());
    }

    #[test]
    fn test_compares_by_identifier_value() {
        let all = genres(&["Fantasy"]);
        let echoed = vec![format!(" {} ", all[0].id.to_uppercase())];
        assert_eq!(checked(&reconcile(&all, &echoed)), vec!["Fantasy"]);
    }

    #[test]
    fn test_unknown_chosen_ids_are_ignored() {
        let all = genres(&["Fantasy"]);
        let choices = reconcile(&all, &[new_id(), "garbage".to_string()]);
        assert!(checked(&choices).is_empty());
    }

    #[test]
    fn test_deterministic_in_chosen_order() {
        let all = genres(&["A", "B", "C", "D"]);
        let forward = vec![all[1].id.clone(), all[3].id.clone()];
        let backward: Vec<String> = forward.iter().rev().cloned().collect();

        let first = reconcile(&all, &forward);
        assert_eq!(first, reconcile(&all, &backward));
        assert_eq!(first, reconcile(&all, &forward));
        // fetched genres are not modified
        assert_eq!(all.len(), 4);
    }
}
