//! What each `shelf` subcommand does to a loaded [`Shelf`].

use super::cli::{AliasAction, FindArgs, ShelfAction};
use super::command::ShelfCommand;
use super::external;
use super::search::{self, SearchField};
use super::store::Shelf;
use anyhow::{bail, Result};
use std::io::Write;
use tracing::{info, warn};

/// Side effects a shelf command needs from the outside world
pub trait ShelfHost {
    fn confirm(&mut self, message: &str) -> Result<bool>;
    /// Open `initial` in the user's editor and return the saved text
    fn edit(&mut self, initial: &str) -> Result<String>;
    fn execute(&mut self, command: &str) -> Result<()>;
}

/// Host backed by the terminal, the configured editor and `/bin/sh`
pub struct TerminalHost {
    pub editor: String,
}

impl ShelfHost for TerminalHost {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        crate::ui::confirm(message)
    }

    fn edit(&mut self, initial: &str) -> Result<String> {
        external::edit_text(&self.editor, initial)
    }

    fn execute(&mut self, command: &str) -> Result<()> {
        let status = external::run_shell(command)?;
        if !status.success() {
            bail!("Command exited with {}", status);
        }
        Ok(())
    }
}

pub struct ShelfSession<'a> {
    pub shelf: Shelf,
    /// Ask before running; resolved from settings
    pub confirm_before_run: bool,
    host: &'a mut dyn ShelfHost,
    out: &'a mut dyn Write,
    dirty: bool,
}

impl<'a> ShelfSession<'a> {
    pub fn new(shelf: Shelf, host: &'a mut dyn ShelfHost, out: &'a mut dyn Write) -> Self {
        let confirm_before_run = shelf.settings.confirm_before_run;
        Self {
            shelf,
            confirm_before_run,
            host,
            out,
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

pub fn run(session: &mut ShelfSession, action: ShelfAction) -> Result<()> {
    match action {
        ShelfAction::Add {
            name,
            command,
            editor,
            description,
            tags,
        } => add(session, name, command, editor, description, tags),
        ShelfAction::Find(args) => find(session, &args),
        ShelfAction::Run {
            name,
            id,
            alias,
            print,
        } => run_command(session, name, id, alias, print),
        ShelfAction::Edit { id } => edit(session, id),
        ShelfAction::Remove { ids, all } => remove(session, &ids, all),
        ShelfAction::Alias(action) => alias(session, action),
    }
}

fn add(
    session: &mut ShelfSession,
    name: String,
    command: Option<String>,
    editor: bool,
    description: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    if session.shelf.id_by_name(&name).is_some()
        && !session.host.confirm(&format!(
            "A command named '{}' already exists. Overwrite it?",
            name
        ))?
    {
        bail!("Operation aborted");
    }

    let text = match command {
        Some(text) => text,
        None if editor => session.host.edit("")?.trim().to_string(),
        None => bail!("You must specify either --editor or --command"),
    };

    let tags = tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let cmd = ShelfCommand::new(name, text)
        .with_description(description.unwrap_or_default())
        .with_tags(tags);
    let id = session.shelf.upsert(cmd)?;
    session.dirty = true;
    writeln!(session.out, "Command shelved with ID {}", id)?;
    Ok(())
}

fn print_command(out: &mut dyn Write, id: u32, cmd: &ShelfCommand) -> Result<()> {
    if cmd.description.is_empty() {
        writeln!(out, "[{}] {}", id, cmd.name)?;
    } else {
        writeln!(out, "[{}] {} - {}", id, cmd.name, cmd.description)?;
    }
    if !cmd.tags.is_empty() {
        writeln!(out, "Tags: {}", cmd.tags.join(", "))?;
    }
    writeln!(out, "{}", cmd.command)?;
    Ok(())
}

fn find(session: &mut ShelfSession, args: &FindArgs) -> Result<()> {
    let ids: Vec<u32> = if args.all {
        session.shelf.commands.keys().copied().collect()
    } else {
        if args.terms.is_empty() {
            bail!("You must specify at least one search term");
        }
        if args.exclude {
            search::find_excluding(&session.shelf, &args.terms)
        } else {
            let fields: Vec<SearchField> = [
                (args.name, SearchField::Name),
                (args.command, SearchField::Command),
                (args.description, SearchField::Description),
                (args.tags, SearchField::Tags),
            ]
            .into_iter()
            .filter(|(on, _)| *on)
            .map(|(_, field)| field)
            .collect();
            search::find(&session.shelf, &args.terms, &fields)
        }
    };

    if ids.is_empty() {
        writeln!(session.out, "No matches found")?;
        return Ok(());
    }
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            writeln!(session.out)?;
        }
        print_command(session.out, *id, session.shelf.get(*id)?)?;
    }
    Ok(())
}

fn run_command(
    session: &mut ShelfSession,
    name: Option<String>,
    id: Option<u32>,
    alias: Option<String>,
    print: bool,
) -> Result<()> {
    let text = match (name, id, alias) {
        (Some(name), _, _) => session.shelf.by_name(&name)?.1.command.clone(),
        (None, Some(id), _) => session.shelf.get(id)?.command.clone(),
        (None, None, Some(alias)) => session.shelf.by_alias(&alias)?.1.command.clone(),
        (None, None, None) => bail!("You must specify a name, --id or --alias"),
    };

    if print {
        writeln!(session.out, "Would run the following command:\n{}", text)?;
        return Ok(());
    }
    if session.confirm_before_run {
        let question = format!("About to run the following command:\n{}\n\nProceed?", text);
        if !session.host.confirm(&question)? {
            bail!("Operation aborted");
        }
    }
    info!(command = %text, "running");
    session.host.execute(&text)
}

fn edit(session: &mut ShelfSession, id: u32) -> Result<()> {
    let current = session.shelf.get(id)?;
    let edited = session.host.edit(&external::render_template(current))?;
    let updated = external::parse_template(&edited);
    if &updated == session.shelf.get(id)? {
        writeln!(session.out, "No changes made")?;
        return Ok(());
    }
    if let Some(other) = session.shelf.id_by_name(&updated.name).filter(|other| *other != id) {
        bail!("Command ID {} is already named '{}'", other, updated.name);
    }
    session.shelf.replace(id, updated)?;
    session.dirty = true;
    writeln!(session.out, "Command {} updated", id)?;
    Ok(())
}

fn remove(session: &mut ShelfSession, ids: &[u32], all: bool) -> Result<()> {
    if all {
        if session.shelf.commands.is_empty() {
            writeln!(session.out, "The shelf is already empty")?;
            return Ok(());
        }
        let question = format!(
            "Remove all {} commands and their aliases?",
            session.shelf.commands.len()
        );
        if !session.host.confirm(&question)? {
            bail!("Aborting");
        }
        let removed = session.shelf.remove_all();
        session.dirty = true;
        writeln!(session.out, "{} commands removed", removed)?;
        return Ok(());
    }

    let mut question = String::from("Are you sure you want to remove the following command(s)?");
    for id in ids {
        let cmd = session.shelf.get(*id)?;
        question.push_str(&format!("\n[{}] {}", id, cmd.name));
        if !cmd.description.is_empty() {
            question.push_str(&format!(" - {}", cmd.description));
        }
    }
    if !session.host.confirm(&question)? {
        bail!("Aborting");
    }

    let mut dropped: Vec<String> = Vec::new();
    for (alias, target) in &session.shelf.aliases {
        if ids.contains(target) {
            dropped.push(alias.clone());
        }
    }
    let removed = session.shelf.remove(ids)?;
    session.dirty = true;
    for alias in dropped {
        writeln!(session.out, "Removing alias '{}'", alias)?;
    }
    writeln!(session.out, "{} command(s) removed", removed)?;
    Ok(())
}

fn alias(session: &mut ShelfSession, action: AliasAction) -> Result<()> {
    match action {
        AliasAction::Add { id, name } => {
            session.shelf.add_alias(id, &name)?;
            session.dirty = true;
            writeln!(session.out, "Alias shelved successfully!")?;
        }
        AliasAction::Remove { names } => {
            let removed = session.shelf.remove_aliases(&names)?;
            session.dirty = true;
            if removed == 1 {
                writeln!(session.out, "Alias removed successfully!")?;
            } else {
                writeln!(session.out, "{} aliases removed successfully!", removed)?;
            }
        }
        AliasAction::List => {
            if session.shelf.aliases.is_empty() {
                writeln!(session.out, "No aliases defined")?;
            }
            for (name, id) in &session.shelf.aliases {
                let target = match session.shelf.commands.get(id) {
                    Some(cmd) => cmd.name.as_str(),
                    None => {
                        warn!(alias = %name, id, "alias points at a missing command");
                        "?"
                    }
                };
                writeln!(session.out, "{} -> [{}] {}", name, id, target)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeHost {
        confirms: VecDeque<bool>,
        edits: VecDeque<String>,
        asked: Vec<String>,
        edited_from: Vec<String>,
        executed: Vec<String>,
    }

    impl ShelfHost for FakeHost {
        fn confirm(&mut self, message: &str) -> Result<bool> {
            self.asked.push(message.to_string());
            Ok(self.confirms.pop_front().unwrap_or(false))
        }

        fn edit(&mut self, initial: &str) -> Result<String> {
            self.edited_from.push(initial.to_string());
            Ok(self.edits.pop_front().unwrap_or_else(|| initial.to_string()))
        }

        fn execute(&mut self, command: &str) -> Result<()> {
            self.executed.push(command.to_string());
            Ok(())
        }
    }

    fn sample() -> Shelf {
        let mut shelf = Shelf::default();
        shelf
            .upsert(ShelfCommand::new("hello", "echo hello").with_description("Greets"))
            .unwrap();
        shelf
            .upsert(ShelfCommand::new("disk", "du -sh *").with_tags(vec!["fs".into()]))
            .unwrap();
        shelf.add_alias(2, "du").unwrap();
        shelf
    }

    fn exec(shelf: Shelf, host: &mut FakeHost, action: ShelfAction) -> (Result<()>, Shelf, bool, String) {
        let mut out: Vec<u8> = Vec::new();
        let (result, shelf, dirty) = {
            let mut session = ShelfSession::new(shelf, host, &mut out);
            let result = run(&mut session, action);
            let dirty = session.is_dirty();
            (result, session.shelf, dirty)
        };
        (result, shelf, dirty, String::from_utf8(out).unwrap())
    }

    fn add_action(name: &str, command: Option<&str>) -> ShelfAction {
        ShelfAction::Add {
            name: name.to_string(),
            command: command.map(String::from),
            editor: command.is_none(),
            description: None,
            tags: vec!["a".into(), " ".into()],
        }
    }

    #[test]
    fn test_add_new_command() {
        let mut host = FakeHost::default();
        let (result, shelf, dirty, out) = exec(sample(), &mut host, add_action("list", Some("ls -la")));
        result.unwrap();
        assert!(dirty);
        assert_eq!(out, "Command shelved with ID 3\n");
        assert_eq!(shelf.get(3).unwrap().tags, vec!["a"]);
        assert!(host.asked.is_empty());
    }

    #[test]
    fn test_add_existing_name_requires_confirmation() {
        let mut host = FakeHost::default();
        let (result, shelf, dirty, _) = exec(sample(), &mut host, add_action("hello", Some("echo hi")));
        assert_eq!(result.unwrap_err().to_string(), "Operation aborted");
        assert!(!dirty);
        assert_eq!(shelf.get(1).unwrap().command, "echo hello");

        let mut host = FakeHost {
            confirms: VecDeque::from([true]),
            ..FakeHost::default()
        };
        let (result, shelf, _, out) = exec(sample(), &mut host, add_action("hello", Some("echo hi")));
        result.unwrap();
        assert_eq!(out, "Command shelved with ID 1\n");
        assert_eq!(shelf.get(1).unwrap().command, "echo hi");
    }

    #[test]
    fn test_add_from_editor() {
        let mut host = FakeHost {
            edits: VecDeque::from(["git status\n".to_string()]),
            ..FakeHost::default()
        };
        let (result, shelf, _, _) = exec(sample(), &mut host, add_action("st", None));
        result.unwrap();
        assert_eq!(shelf.get(3).unwrap().command, "git status");
    }

    #[test]
    fn test_find_prints_matches() {
        let mut host = FakeHost::default();
        let args = FindArgs {
            terms: vec!["E".into()],
            ..FindArgs::default()
        };
        let (result, _, dirty, out) = exec(sample(), &mut host, ShelfAction::Find(args));
        result.unwrap();
        assert!(!dirty);
        assert_eq!(out, "[1] hello - Greets\necho hello\n");

        let args = FindArgs {
            terms: vec!["hello".into()],
            exclude: true,
            ..FindArgs::default()
        };
        let (_, _, _, out) = exec(sample(), &mut host, ShelfAction::Find(args));
        assert_eq!(out, "[2] disk\nTags: fs\ndu -sh *\n");

        let args = FindArgs {
            terms: vec!["zzz".into()],
            ..FindArgs::default()
        };
        let (_, _, _, out) = exec(sample(), &mut host, ShelfAction::Find(args));
        assert_eq!(out, "No matches found\n");
    }

    #[test]
    fn test_find_requires_terms_unless_all() {
        let mut host = FakeHost::default();
        let (result, _, _, _) = exec(sample(), &mut host, ShelfAction::Find(FindArgs::default()));
        assert!(result.is_err());

        let args = FindArgs {
            all: true,
            ..FindArgs::default()
        };
        let (_, _, _, out) = exec(sample(), &mut host, ShelfAction::Find(args));
        assert_eq!(out.lines().filter(|l| l.starts_with('[')).count(), 2);
    }

    fn run_action(name: Option<&str>, id: Option<u32>, alias: Option<&str>, print: bool) -> ShelfAction {
        ShelfAction::Run {
            name: name.map(String::from),
            id,
            alias: alias.map(String::from),
            print,
        }
    }

    #[test]
    fn test_run_print_only() {
        let mut host = FakeHost::default();
        let (result, _, _, out) = exec(sample(), &mut host, run_action(Some("hello"), None, None, true));
        result.unwrap();
        assert_eq!(out, "Would run the following command:\necho hello\n");
        assert!(host.executed.is_empty());
    }

    #[test]
    fn test_run_confirms_then_executes() {
        let mut host = FakeHost {
            confirms: VecDeque::from([true]),
            ..FakeHost::default()
        };
        let (result, _, _, _) = exec(sample(), &mut host, run_action(None, None, Some("du"), false));
        result.unwrap();
        assert_eq!(host.executed, vec!["du -sh *"]);
        assert!(host.asked[0].contains("du -sh *"));

        let mut host = FakeHost::default();
        let (result, _, _, _) = exec(sample(), &mut host, run_action(None, Some(1), None, false));
        assert_eq!(result.unwrap_err().to_string(), "Operation aborted");
        assert!(host.executed.is_empty());
    }

    #[test]
    fn test_run_without_confirmation_setting() {
        let mut host = FakeHost::default();
        let mut out: Vec<u8> = Vec::new();
        let mut session = ShelfSession::new(sample(), &mut host, &mut out);
        session.confirm_before_run = false;
        run(&mut session, run_action(None, Some(1), None, false)).unwrap();
        drop(session);
        assert_eq!(host.executed, vec!["echo hello"]);
        assert!(host.asked.is_empty());
    }

    #[test]
    fn test_run_unknown_targets() {
        let mut host = FakeHost::default();
        let (result, _, _, _) = exec(sample(), &mut host, run_action(None, Some(9), None, false));
        assert_eq!(result.unwrap_err().to_string(), "command ID '9' does not exist");
        let (result, _, _, _) = exec(sample(), &mut host, run_action(None, None, Some("x"), false));
        assert_eq!(result.unwrap_err().to_string(), "alias 'x' not found");
    }

    #[test]
    fn test_edit_replaces_fields() {
        let shelf = sample();
        let mut changed = shelf.get(1).unwrap().clone();
        changed.command = "echo hello\necho again".into();
        let mut host = FakeHost {
            edits: VecDeque::from([external::render_template(&changed)]),
            ..FakeHost::default()
        };
        let (result, shelf, dirty, out) = exec(shelf, &mut host, ShelfAction::Edit { id: 1 });
        result.unwrap();
        assert!(dirty);
        assert_eq!(out, "Command 1 updated\n");
        assert_eq!(shelf.get(1).unwrap().command, "echo hello\necho again");
        assert!(host.edited_from[0].contains("echo hello"));
    }

    #[test]
    fn test_edit_without_changes() {
        let mut host = FakeHost::default();
        let (result, _, dirty, out) = exec(sample(), &mut host, ShelfAction::Edit { id: 2 });
        result.unwrap();
        assert!(!dirty);
        assert_eq!(out, "No changes made\n");
    }

    #[test]
    fn test_remove_drops_aliases() {
        let mut host = FakeHost {
            confirms: VecDeque::from([true]),
            ..FakeHost::default()
        };
        let (result, shelf, dirty, out) = exec(
            sample(),
            &mut host,
            ShelfAction::Remove {
                ids: vec![2],
                all: false,
            },
        );
        result.unwrap();
        assert!(dirty);
        assert_eq!(out, "Removing alias 'du'\n1 command(s) removed\n");
        assert!(shelf.aliases.is_empty());
        assert_eq!(shelf.commands.len(), 1);
        assert!(host.asked[0].contains("[2] disk"));
    }

    #[test]
    fn test_remove_declined_or_unknown() {
        let mut host = FakeHost::default();
        let (result, shelf, dirty, _) = exec(
            sample(),
            &mut host,
            ShelfAction::Remove {
                ids: vec![1],
                all: false,
            },
        );
        assert!(result.is_err());
        assert!(!dirty);
        assert_eq!(shelf.commands.len(), 2);

        let (result, _, _, _) = exec(
            sample(),
            &mut host,
            ShelfAction::Remove {
                ids: vec![1, 7],
                all: false,
            },
        );
        assert_eq!(result.unwrap_err().to_string(), "command ID '7' does not exist");
    }

    #[test]
    fn test_remove_all() {
        let mut host = FakeHost {
            confirms: VecDeque::from([true]),
            ..FakeHost::default()
        };
        let (result, shelf, _, out) = exec(sample(), &mut host, ShelfAction::Remove { ids: vec![], all: true });
        result.unwrap();
        assert_eq!(out, "2 commands removed\n");
        assert!(shelf.commands.is_empty());
        assert!(shelf.aliases.is_empty());
    }

    #[test]
    fn test_alias_commands() {
        let mut host = FakeHost::default();
        let (result, shelf, _, out) = exec(
            sample(),
            &mut host,
            ShelfAction::Alias(AliasAction::Add {
                id: 1,
                name: "hi".into(),
            }),
        );
        result.unwrap();
        assert_eq!(out, "Alias shelved successfully!\n");

        let (_, shelf, _, out) = exec(shelf, &mut host, ShelfAction::Alias(AliasAction::List));
        assert_eq!(out, "du -> [2] disk\nhi -> [1] hello\n");

        let (result, shelf, _, out) = exec(
            shelf,
            &mut host,
            ShelfAction::Alias(AliasAction::Remove {
                names: vec!["du".into(), "hi".into()],
            }),
        );
        result.unwrap();
        assert_eq!(out, "2 aliases removed successfully!\n");
        assert!(shelf.aliases.is_empty());

        let (result, _, _, _) = exec(
            sample(),
            &mut host,
            ShelfAction::Alias(AliasAction::Add {
                id: 1,
                name: "du".into(),
            }),
        );
        assert_eq!(result.unwrap_err().to_string(), "alias 'du' already exists");
    }
}
