use crate::domain::{parse_tags, parse_threshold, EntryFilter, Selection, TimeRange};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gt")]
#[command(about = "A fast and simple time tracking CLI tool", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger file (default: ~/.gotime.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output, also mirrors logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start tracking a keyword, prompting for it when omitted
    Start {
        keyword: Option<String>,
        tags: Vec<String>,
        /// Start in the past, e.g. 5, 5m, 1h30m, 30s
        #[arg(long)]
        backdate: Option<String>,
    },
    /// Stop running timers by keyword or short id
    Stop {
        target: Option<String>,
        /// Stop every running timer
        #[arg(short, long, conflicts_with = "target")]
        all: bool,
    },
    /// Start a new entry from a previous one
    #[command(visible_aliases = ["cont", "c"])]
    Continue {
        target: Option<String>,
        /// Continue the most recently started stopped entry
        #[arg(long, conflicts_with = "target")]
        last: bool,
    },
    /// Add a completed entry with the field editor
    Add,
    /// Edit an entry, or set one field directly: keyword, duration or tags
    Set {
        target: Option<String>,
        field: Option<String>,
        value: Vec<String>,
    },
    /// Delete entries by short id or keyword
    #[command(visible_alias = "rm")]
    Delete { target: Option<String> },
    /// List entries (today by default)
    #[command(visible_aliases = ["ls", "l"])]
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Per-keyword totals (this week by default)
    #[command(visible_aliases = ["rep", "r"])]
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Stop every running timer and park it, or manage the stash
    #[command(visible_alias = "s")]
    Stash {
        #[command(subcommand)]
        command: Option<StashCommand>,
    },
    /// Resume stashed entries
    #[command(visible_alias = "p")]
    Pop(PopArgs),
    /// Revert a recent delete, edit or stash clear
    #[command(visible_alias = "u")]
    Undo {
        /// Print the undo history as JSON
        #[arg(short, long)]
        list: bool,
    },
    /// Inspect keywords
    Keywords {
        #[command(subcommand)]
        command: KeywordsCommand,
    },
    /// Inspect and maintain tags
    Tags {
        #[command(subcommand)]
        command: TagsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum StashCommand {
    /// Pick stashed entries to delete
    Show,
    /// Keep stashed entries as stopped entries without resuming them
    Apply,
    /// Resume stashed entries
    Pop(PopArgs),
    /// Delete every stashed entry
    Clear,
}

#[derive(Args, Debug, Default, Clone)]
pub struct PopArgs {
    /// Keywords or short ids; every stashed entry when omitted
    pub targets: Vec<String>,
    /// Resume in the past, e.g. 5, 5m, 1h30m, 30s
    #[arg(short, long)]
    pub backdate: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum KeywordsCommand {
    /// Every keyword with its entry count
    #[command(visible_alias = "ls")]
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagsCommand {
    /// Every tag with its entry count
    #[command(visible_alias = "ls")]
    List {
        #[arg(long)]
        json: bool,
    },
    /// Rename a tag on every entry
    Rename { old: String, new: String },
    /// Remove a tag from every entry
    Remove { tag: String },
}

/// Filters shared by `list` and `report`
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only running entries
    #[arg(long, conflicts_with = "no_active")]
    pub active: bool,
    /// Only stopped entries
    #[arg(long)]
    pub no_active: bool,

    /// Only these keywords (comma-separated)
    #[arg(long, conflicts_with = "exclude_keywords")]
    pub keywords: Option<String>,
    #[arg(long)]
    pub exclude_keywords: Option<String>,
    /// Only entries with any of these tags (comma-separated)
    #[arg(long, conflicts_with = "exclude_tags")]
    pub tags: Option<String>,
    #[arg(long)]
    pub exclude_tags: Option<String>,

    #[arg(long)]
    pub today: bool,
    #[arg(long)]
    pub yesterday: bool,
    /// Sunday through Saturday
    #[arg(long)]
    pub week: bool,
    #[arg(long)]
    pub month: bool,
    #[arg(long)]
    pub year: bool,
    /// The last N days
    #[arg(long)]
    pub days: Option<u32>,
    /// YYYY-MM-DD,YYYY-MM-DD, both days included
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub between: Option<String>,
    #[arg(long)]
    pub from: Option<String>,
    #[arg(long)]
    pub to: Option<String>,

    /// e.g. 30m, 1h30m, or bare seconds
    #[arg(long)]
    pub min_duration: Option<String>,
    #[arg(long)]
    pub max_duration: Option<String>,
}

fn selection(only: &Option<String>, except: &Option<String>) -> Selection {
    match (only, except) {
        (Some(values), _) => Selection::Only(parse_tags(values)),
        (None, Some(values)) => Selection::Except(parse_tags(values)),
        (None, None) => Selection::Any,
    }
}

impl FilterArgs {
    /// The time range flag given, or `default` when there is none
    pub fn time_range(&self, default: TimeRange) -> Result<TimeRange> {
        let mut ranges = Vec::new();
        if self.today {
            ranges.push(TimeRange::Today);
        }
        if self.yesterday {
            ranges.push(TimeRange::Yesterday);
        }
        if self.week {
            ranges.push(TimeRange::Week);
        }
        if self.month {
            ranges.push(TimeRange::Month);
        }
        if self.year {
            ranges.push(TimeRange::Year);
        }
        if let Some(days) = self.days {
            ranges.push(TimeRange::Days(days));
        }
        if let Some(between) = &self.between {
            ranges.push(TimeRange::parse_between(between).context("Invalid --between")?);
        }
        if self.from.is_some() || self.to.is_some() {
            ranges.push(
                TimeRange::from_to(self.from.as_deref(), self.to.as_deref())
                    .context("Invalid --from/--to")?,
            );
        }

        if ranges.len() > 1 {
            bail!("Cannot specify multiple time range filters");
        }
        Ok(ranges.pop().unwrap_or(default))
    }

    pub fn to_filter(&self, default: TimeRange) -> Result<EntryFilter> {
        let active = match (self.active, self.no_active) {
            (true, true) => bail!("Cannot use both --active and --no-active"),
            (true, false) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        let min_duration = self
            .min_duration
            .as_deref()
            .map(parse_threshold)
            .transpose()
            .context("Invalid --min-duration")?
            .unwrap_or(0);
        let max_duration = self
            .max_duration
            .as_deref()
            .map(parse_threshold)
            .transpose()
            .context("Invalid --max-duration")?
            .unwrap_or(0);

        Ok(EntryFilter {
            range: self.time_range(default)?,
            active,
            keywords: selection(&self.keywords, &self.exclude_keywords),
            tags: selection(&self.tags, &self.exclude_tags),
            min_duration,
            max_duration,
            include_stashed: false,
        })
    }
}
