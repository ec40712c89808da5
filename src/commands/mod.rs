//! `gt` subcommands.
//!
//! Every command works on a [`Session`]: the loaded ledger, the clock reading
//! taken at startup, an output sink and a [`Prompt`] for anything interactive.
//! The binary saves the ledger afterwards when the session reports changes.

pub mod entries;
pub mod labels;
pub mod list;
pub mod stash;
pub mod status;
pub mod table;
pub mod track;
pub mod undo;

use crate::cli::{Command, KeywordsCommand, StashCommand, TagsCommand};
use crate::domain::{format_readable, parse_target, Entry, Ledger, Target, TimeRange};
use crate::report;
use crate::ui::{self, SelectorItem, SelectorState};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use std::io::Write;
use uuid::Uuid;

/// Interactive collaborators a command may need
pub trait Prompt {
    fn confirm(&mut self, message: &str) -> Result<bool>;
    /// Ids of the chosen rows, or `None` when cancelled
    fn select(&mut self, state: SelectorState) -> Result<Option<Vec<String>>>;
    fn start_input(&mut self) -> Result<Option<(String, Vec<String>)>>;
    /// Edited copy of `entry`, or `None` when cancelled
    fn edit_entry(&mut self, entry: &Entry, now: DateTime<Local>) -> Result<Option<Entry>>;
}

/// Prompts drawn on the terminal
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        ui::confirm(message)
    }

    fn select(&mut self, state: SelectorState) -> Result<Option<Vec<String>>> {
        ui::select(state)
    }

    fn start_input(&mut self) -> Result<Option<(String, Vec<String>)>> {
        ui::prompt_start()
    }

    fn edit_entry(&mut self, entry: &Entry, now: DateTime<Local>) -> Result<Option<Entry>> {
        ui::edit_entry(entry, now)
    }
}

pub struct Session<'a> {
    pub ledger: Ledger,
    pub now: DateTime<Local>,
    pub verbose: bool,
    prompt: &'a mut dyn Prompt,
    out: &'a mut dyn Write,
    dirty: bool,
}

impl<'a> Session<'a> {
    pub fn new(
        ledger: Ledger,
        now: DateTime<Local>,
        prompt: &'a mut dyn Prompt,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            ledger,
            now,
            verbose: false,
            prompt,
            out,
            dirty: false,
        }
    }

    /// Whether the ledger needs saving
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn touch(&mut self) {
        self.dirty = true;
    }

    fn entry(&self, id: Uuid) -> Result<&Entry> {
        self.ledger
            .get(id)
            .ok_or_else(|| anyhow!("Entry {} disappeared", id))
    }
}

/// How a command argument resolved against the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Entry(Uuid),
    Keyword(String),
}

/// Integers 1..=1000 name short ids, anything else is a keyword
pub fn resolve_target(ledger: &Ledger, arg: &str) -> Result<Resolved> {
    match parse_target(arg) {
        Target::ShortId(n) => ledger
            .by_short_id(n)
            .map(|e| Resolved::Entry(e.id))
            .ok_or_else(|| anyhow!("No entry found with ID {}", n)),
        Target::Keyword(k) => Ok(Resolved::Keyword(k)),
    }
}

/// Tags for display, `-` when there are none
pub fn tags_text(tags: &[String]) -> String {
    if tags.is_empty() {
        "-".to_string()
    } else {
        tags.join(", ")
    }
}

/// `keyword [a b]` as used in one-line confirmations
pub fn describe(entry: &Entry) -> String {
    if entry.tags.is_empty() {
        entry.keyword.clone()
    } else {
        format!("{} [{}]", entry.keyword, entry.tags.join(" "))
    }
}

pub fn format_clock(t: &DateTime<Local>) -> String {
    t.format("%b %-d %-I:%M %p").to_string()
}

pub fn status_text(entry: &Entry) -> &'static str {
    if entry.active {
        "▶ Running"
    } else if entry.stashed {
        "Stashed"
    } else {
        "Stopped"
    }
}

/// Selector listing entries keyed by UUID
pub fn entry_selector(title: &str, entries: &[&Entry], now: DateTime<Local>, multi: bool) -> SelectorState {
    let headers = ["ID", "Keyword", "Duration", "Tags", "Started", "Status"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let items = entries
        .iter()
        .map(|e| {
            SelectorItem::new(
                e.id.to_string(),
                vec![
                    e.short_id.to_string(),
                    e.keyword.clone(),
                    format_readable(e.current_duration(now)),
                    tags_text(&e.tags),
                    format_clock(&e.start_time),
                    status_text(e).to_string(),
                ],
            )
        })
        .collect();
    if multi {
        SelectorState::multi(title, headers, items)
    } else {
        SelectorState::single(title, headers, items)
    }
}

/// Run the selector and map the chosen ids back to UUIDs
fn pick_entries(session: &mut Session, state: SelectorState) -> Result<Vec<Uuid>> {
    let chosen = session.prompt.select(state)?.unwrap_or_default();
    chosen
        .iter()
        .map(|id| Uuid::parse_str(id).map_err(|e| anyhow!("Invalid entry id {}: {}", id, e)))
        .collect()
}

/// Execute one parsed `gt` command
pub fn run(session: &mut Session, command: Option<Command>) -> Result<()> {
    let Some(command) = command else {
        return status::run(session);
    };

    match command {
        Command::Start {
            keyword,
            tags,
            backdate,
        } => track::start(session, keyword, tags, backdate.as_deref()),
        Command::Stop { target, all } => track::stop(session, target.as_deref(), all),
        Command::Continue { target, last } => track::resume(session, target.as_deref(), last),
        Command::Add => entries::add(session),
        Command::Set {
            target,
            field,
            value,
        } => entries::set(session, target.as_deref(), field.as_deref(), &value),
        Command::Delete { target } => entries::delete(session, target.as_deref()),
        Command::List { filter, json } => {
            let mut filter = filter.to_filter(TimeRange::Today)?;
            filter.include_stashed = true;
            list::run(session, &filter, json)
        }
        Command::Report { filter, json } => {
            let filter = filter.to_filter(TimeRange::Week)?;
            let entries = filter.apply(&session.ledger.entries, session.now);
            let output = if json {
                report::render_json(&entries, &filter.range, session.now)?
            } else {
                report::render_text(&entries, &filter.range, session.now)
            };
            write!(session.out, "{}", output)?;
            Ok(())
        }
        Command::Stash { command } => match command {
            None => stash::stash(session),
            Some(StashCommand::Show) => stash::show(session),
            Some(StashCommand::Apply) => stash::apply(session),
            Some(StashCommand::Pop(args)) => stash::pop(session, &args.targets, args.backdate.as_deref()),
            Some(StashCommand::Clear) => stash::clear(session),
        },
        Command::Pop(args) => stash::pop(session, &args.targets, args.backdate.as_deref()),
        Command::Undo { list } => undo::run(session, list),
        Command::Keywords {
            command: KeywordsCommand::List { json },
        } => labels::list_keywords(session, json),
        Command::Tags { command } => match command {
            TagsCommand::List { json } => labels::list_tags(session, json),
            TagsCommand::Rename { old, new } => labels::rename_tag(session, &old, &new),
            TagsCommand::Remove { tag } => labels::remove_tag(session, &tag),
        },
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::domain::parse_timestamp;
    use crate::editor::{FieldEditor, FieldName};
    use std::collections::VecDeque;

    pub fn at(text: &str) -> DateTime<Local> {
        parse_timestamp(text).unwrap()
    }

    /// Prompt answering from queues; panics when a command asks for more
    #[derive(Default)]
    pub struct ScriptedPrompt {
        pub confirms: VecDeque<bool>,
        pub selections: VecDeque<Option<Vec<String>>>,
        pub starts: VecDeque<Option<(String, Vec<String>)>>,
        /// Field texts typed into the editor before pressing Enter
        pub edits: VecDeque<Vec<(FieldName, String)>>,
        pub confirm_messages: Vec<String>,
        pub shown: Vec<SelectorState>,
    }

    impl Prompt for ScriptedPrompt {
        fn confirm(&mut self, message: &str) -> Result<bool> {
            self.confirm_messages.push(message.to_string());
            Ok(self.confirms.pop_front().expect("unexpected confirm"))
        }

        fn select(&mut self, state: SelectorState) -> Result<Option<Vec<String>>> {
            self.shown.push(state);
            Ok(self.selections.pop_front().expect("unexpected selector"))
        }

        fn start_input(&mut self) -> Result<Option<(String, Vec<String>)>> {
            Ok(self.starts.pop_front().expect("unexpected start prompt"))
        }

        fn edit_entry(&mut self, entry: &Entry, now: DateTime<Local>) -> Result<Option<Entry>> {
            let typed = self.edits.pop_front().expect("unexpected editor");
            let mut editor = FieldEditor::new(entry, now);
            for (name, text) in typed {
                editor.set_value(name, &text);
            }
            let mut draft = entry.clone();
            editor.submit(&mut draft)?;
            Ok(Some(draft))
        }
    }

    /// Run `f` against a session and return the ledger, dirty flag and output
    pub fn with_session<F>(ledger: Ledger, now: &str, prompt: &mut ScriptedPrompt, f: F) -> (Ledger, bool, String)
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        let mut out = Vec::new();
        let (ledger, dirty) = {
            let mut session = Session::new(ledger, at(now), prompt, &mut out);
            f(&mut session).unwrap();
            let dirty = session.is_dirty();
            (session.ledger, dirty)
        };
        (ledger, dirty, String::from_utf8(out).unwrap())
    }

    pub fn finished(keyword: &str, tags: &[&str], start: &str, end: &str) -> Entry {
        Entry::completed(
            keyword.into(),
            tags.iter().map(|t| t.to_string()).collect(),
            at(start),
            at(end),
        ).unwrap()
    }

    pub fn running(keyword: &str, tags: &[&str], start: &str) -> Entry {
        Entry::start_new(
            keyword.into(),
            tags.iter().map(|t| t.to_string()).collect(),
            at(start),
        )
    }

    pub fn ledger_of(entries: Vec<Entry>) -> Ledger {
        let mut ledger = Ledger::default();
        for entry in entries {
            ledger.add_entry(entry);
        }
        ledger
    }
}
