//! Launching the user's editor and shell.

use super::command::ShelfCommand;
use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::process::{Command, ExitStatus};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Marks every header line of the edit template
pub const FIELD_SEPARATOR: &str = "+~~~~+~~~~+";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Name,
    Description,
    Tags,
    Command,
}

impl Section {
    fn title(self) -> &'static str {
        match self {
            Self::Name => "name:",
            Self::Description => "description:",
            Self::Tags => "tags:",
            Self::Command => "command:",
        }
    }

    fn from_header(line: &str) -> Option<Self> {
        let title = line.strip_prefix(FIELD_SEPARATOR)?.trim();
        [Self::Name, Self::Description, Self::Tags, Self::Command]
            .into_iter()
            .find(|s| s.title() == title)
    }
}

fn header(title: &str) -> String {
    format!("{} {}\n", FIELD_SEPARATOR, title)
}

/// Text handed to the editor for `shelf edit`
pub fn render_template(command: &ShelfCommand) -> String {
    let mut out = String::new();
    out.push_str(&header("do not edit these line separators"));
    out.push_str(&header("fields can span multiple lines"));
    out.push_str(&header(Section::Name.title()));
    out.push_str(&command.name);
    out.push('\n');
    out.push_str(&header(Section::Description.title()));
    out.push_str(&command.description);
    out.push('\n');
    out.push_str(&header(Section::Tags.title()));
    if command.tags.is_empty() {
        out.push('\n');
    }
    for tag in &command.tags {
        out.push_str(tag);
        out.push('\n');
    }
    out.push_str(&header(Section::Command.title()));
    out.push_str(&command.command);
    out.push('\n');
    out.push_str(FIELD_SEPARATOR);
    out
}

/// Read an edited template back.
///
/// Lines under a header accumulate into that field; tags may be one per line
/// or comma-separated. Separator lines that are not known headers are ignored.
pub fn parse_template(text: &str) -> ShelfCommand {
    let mut parsed = ShelfCommand::default();
    let mut current: Option<Section> = None;
    let mut name: Vec<&str> = Vec::new();
    let mut description: Vec<&str> = Vec::new();
    let mut command: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.starts_with(FIELD_SEPARATOR) {
            if let Some(section) = Section::from_header(line) {
                current = Some(section);
            }
            continue;
        }
        match current {
            Some(Section::Name) => name.push(line.trim()),
            Some(Section::Description) => description.push(line.trim()),
            Some(Section::Command) => command.push(line.trim_end()),
            Some(Section::Tags) => parsed.tags.extend(
                line.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from),
            ),
            None => {}
        }
    }

    parsed.name = name.join("\n").trim().to_string();
    parsed.description = description.join("\n").trim().to_string();
    parsed.command = command.join("\n").trim().to_string();
    parsed
}

/// Program and arguments used to open `path`; VS Code needs to block until closed
pub fn editor_args(editor: &str, path: &str) -> Vec<String> {
    let mut args: Vec<String> = editor.split_whitespace().map(String::from).collect();
    if editor.trim() == "code" {
        args.push("--new-window".into());
        args.push("--wait".into());
    }
    args.push(path.to_string());
    args
}

/// Open `initial` in the editor and return what the user saved
#[instrument(skip(initial))]
pub fn edit_text(editor: &str, initial: &str) -> Result<String> {
    let mut temp_file = NamedTempFile::new().context("Failed to create temporary file")?;
    temp_file
        .write_all(initial.as_bytes())
        .context("Failed to write temporary file")?;
    let temp_path = temp_file.into_temp_path();
    let path = temp_path.to_string_lossy().to_string();

    let args = editor_args(editor, &path);
    let (program, rest) = args.split_first().context("No editor specified")?;
    debug!(editor = %program, "opening editor");
    let status = Command::new(program)
        .args(rest)
        .status()
        .with_context(|| format!("Failed to open editor '{}'", program))?;
    if !status.success() {
        bail!("Editor '{}' exited with {}", program, status);
    }

    fs::read_to_string(&temp_path).context("Failed to read temporary file")
}

/// Run `command` through `/bin/sh -c`, inheriting the terminal
#[instrument]
pub fn run_shell(command: &str) -> Result<ExitStatus> {
    debug!("spawning shell");
    Command::new("/bin/sh")
        .arg("-c")
        .arg(command)
        .status()
        .context("Failed to start /bin/sh")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_template_round_trip() {
        let cmd = ShelfCommand::new("backup", "rsync -av \\\n  ~/docs /mnt/backup")
            .with_description("Nightly docs backup")
            .with_tags(vec!["sync".into(), "home".into()]);

        let text = render_template(&cmd);
        assert!(text.starts_with("+~~~~+~~~~+ do not edit these line separators\n"));
        assert_eq!(parse_template(&text), cmd);
    }

    #[test]
    fn test_parse_multiline_and_comma_tags() {
        let text = "\
+~~~~+~~~~+ name:
  spaced name
+~~~~+~~~~+ description:
first line
second line
+~~~~+~~~~+ tags:
a, b
c
+~~~~+~~~~+ command:
echo one
echo two
+~~~~+~~~~+";
        let cmd = parse_template(text);
        assert_eq!(cmd.name, "spaced name");
        assert_eq!(cmd.description, "first line\nsecond line");
        assert_eq!(cmd.tags, vec!["a", "b", "c"]);
        assert_eq!(cmd.command, "echo one\necho two");
    }

    #[test]
    fn test_editor_args() {
        assert_eq!(editor_args("vim", "/tmp/x"), vec!["vim", "/tmp/x"]);
        assert_eq!(
            editor_args("code", "/tmp/x"),
            vec!["code", "--new-window", "--wait", "/tmp/x"]
        );
        assert_eq!(editor_args("emacs -nw", "/tmp/x"), vec!["emacs", "-nw", "/tmp/x"]);
    }

    #[test]
    fn test_edit_text_with_noop_editor() {
        let edited = edit_text("true", "unchanged").unwrap();
        assert_eq!(edited, "unchanged");
        assert!(edit_text("false", "x").is_err());
    }

    #[test]
    fn test_run_shell_status() {
        assert!(run_shell("exit 0").unwrap().success());
        assert!(!run_shell("exit 3").unwrap().success());
    }
}
