use super::command::ShelfCommand;
use super::store::Shelf;

/// Where a search term must appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    /// Name, description, command or any tag
    Any,
    Name,
    Description,
    Command,
    Tags,
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn term_matches(command: &ShelfCommand, field: SearchField, term: &str) -> bool {
    let term = term.to_lowercase();
    match field {
        SearchField::Any => {
            contains(&command.name, &term)
                || contains(&command.description, &term)
                || contains(&command.command, &term)
                || command.tags.iter().any(|t| contains(t, &term))
        }
        SearchField::Name => contains(&command.name, &term),
        SearchField::Description => contains(&command.description, &term),
        SearchField::Command => contains(&command.command, &term),
        SearchField::Tags => command.tags.iter().any(|t| contains(t, &term)),
    }
}

/// Whether every term appears in `field`, ignoring case
pub fn matches_all(command: &ShelfCommand, field: SearchField, terms: &[String]) -> bool {
    terms.iter().all(|term| term_matches(command, field, term))
}

/// Ids of commands matching every term in at least one of `fields`
pub fn find(shelf: &Shelf, terms: &[String], fields: &[SearchField]) -> Vec<u32> {
    let fields = if fields.is_empty() {
        &[SearchField::Any][..]
    } else {
        fields
    };
    shelf
        .commands
        .iter()
        .filter(|(_, cmd)| fields.iter().any(|f| matches_all(cmd, *f, terms)))
        .map(|(id, _)| *id)
        .collect()
}

/// Ids of commands in which none of the terms appear anywhere
pub fn find_excluding(shelf: &Shelf, terms: &[String]) -> Vec<u32> {
    shelf
        .commands
        .iter()
        .filter(|(_, cmd)| !terms.iter().any(|t| term_matches(cmd, SearchField::Any, t)))
        .map(|(id, _)| *id)
        .collect()
}
