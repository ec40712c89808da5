use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(about = "Shelve your favorite shell commands and run them later", long_about = None)]
#[command(version)]
pub struct ShelfCli {
    /// Shelf file (default: ~/.shellshelf.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output, also mirrors logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: ShelfAction,
}

#[derive(Subcommand, Debug)]
pub enum ShelfAction {
    /// Add a command to the shelf
    #[command(visible_alias = "a")]
    #[command(group(ArgGroup::new("source").required(true).args(["command", "editor"])))]
    Add {
        #[arg(short, long)]
        name: String,
        /// The command itself
        #[arg(short, long)]
        command: Option<String>,
        /// Type the command in the external editor
        #[arg(short, long)]
        editor: bool,
        #[arg(short, long)]
        description: Option<String>,
        /// Comma-separated tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Find commands on the shelf
    #[command(visible_alias = "f")]
    Find(FindArgs),
    /// Run a command by name, id or alias
    #[command(visible_alias = "r")]
    #[command(group(ArgGroup::new("which").required(true).args(["name", "id", "alias"])))]
    Run {
        name: Option<String>,
        #[arg(short, long)]
        id: Option<u32>,
        #[arg(short, long)]
        alias: Option<String>,
        /// Only print the command
        #[arg(short, long)]
        print: bool,
    },
    /// Edit a command in the external editor
    Edit { id: u32 },
    /// Remove commands from the shelf
    #[command(visible_alias = "rm")]
    Remove {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        ids: Vec<u32>,
        #[arg(long)]
        all: bool,
    },
    /// Manage command aliases
    #[command(subcommand)]
    Alias(AliasAction),
}

#[derive(Args, Debug, Default, Clone)]
pub struct FindArgs {
    pub terms: Vec<String>,
    /// Restrict the search to names
    #[arg(short, long)]
    pub name: bool,
    /// Restrict the search to the command text
    #[arg(short, long)]
    pub command: bool,
    /// Restrict the search to descriptions
    #[arg(short, long)]
    pub description: bool,
    /// Restrict the search to tags
    #[arg(short, long)]
    pub tags: bool,
    /// List every command, ignoring search terms
    #[arg(short, long, conflicts_with = "exclude")]
    pub all: bool,
    /// List commands matching none of the terms
    #[arg(short = 'x', long)]
    pub exclude: bool,
}

#[derive(Subcommand, Debug)]
pub enum AliasAction {
    /// Point a new alias at a command id
    Add { id: u32, name: String },
    /// Remove aliases by name
    #[command(visible_alias = "rm")]
    Remove {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// List every alias
    #[command(visible_alias = "ls")]
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<ShelfCli, clap::Error> {
        ShelfCli::try_parse_from(std::iter::once("shelf").chain(args.iter().copied()))
    }

    #[test]
    fn test_add_needs_exactly_one_source() {
        assert!(parse(&["add", "-n", "x"]).is_err());
        assert!(parse(&["add", "-n", "x", "-c", "ls", "-e"]).is_err());

        let cli = parse(&["add", "-n", "x", "-c", "ls -la", "-t", "fs,list"]).unwrap();
        match cli.command {
            ShelfAction::Add { name, command, tags, .. } => {
                assert_eq!(name, "x");
                assert_eq!(command.as_deref(), Some("ls -la"));
                assert_eq!(tags, vec!["fs", "list"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_run_selects_one_way() {
        assert!(parse(&["run"]).is_err());
        assert!(parse(&["run", "build", "--id", "2"]).is_err());
        assert!(parse(&["run", "--id", "2"]).is_ok());
        assert!(parse(&["r", "-a", "b", "-p"]).is_ok());
    }

    #[test]
    fn test_remove_ids_or_all() {
        assert!(parse(&["remove"]).is_err());
        assert!(parse(&["remove", "1", "--all"]).is_err());
        assert!(parse(&["rm", "--all"]).is_ok());
        assert!(parse(&["alias", "remove"]).is_err());
    }
}
