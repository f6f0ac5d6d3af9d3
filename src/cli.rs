use std::path::PathBuf;

mod board;
mod list;
mod r#move;
mod show;
mod status;
mod terminal;
mod vote;

use anyhow::Context;
use board::Board;
use clap::ArgAction;
use inspira::{
    Workspace,
    domain::{Attachment, Author, IdeaPatch, NewIdea, Notification, PendingUpload, Priority},
};
use list::List;
use show::Show;
use status::Status;
use terminal::{Colorize, by_severity, short_id};
use tracing::instrument;
use vote::Vote;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory containing the `.inspira` workspace
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Board(Board::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show the review board (default)
    Board(Board),

    /// Initialise a new workspace
    Init,

    /// Submit a new idea
    Create(Create),

    /// List ideas with filters
    List(List),

    /// Show the details of an idea
    Show(Show),

    /// Edit an idea that is still open or under review
    Edit(Edit),

    /// Delete an idea that is still open or under review
    Delete(Delete),

    /// Move an idea to another column
    ///
    /// Moving to 'Rechazada' requires a comment. If none is given on the
    /// command line, you are prompted for one.
    Move(r#move::Command),

    /// Record the committee's verdict on an idea under committee review
    Vote(Vote),

    /// Show headline counts
    Status(Status),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Board(command) => command.run(root)?,
            Self::Init => Init::run(root)?,
            Self::Create(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Delete(command) => command.run(root)?,
            Self::Move(command) => command.run(root)?,
            Self::Vote(command) => command.run(root)?,
            Self::Status(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// Open the workspace rooted at `root`.
fn open(root: PathBuf) -> anyhow::Result<Workspace> {
    Workspace::open(root).context("failed to open workspace")
}

/// Print the notification raised by a status change, if any.
fn announce(workspace: &mut Workspace) {
    workspace.board_mut().subscribe(|change: &inspira::domain::StatusChange| {
        if let Some(notification) = Notification::for_change(change) {
            println!(
                "{} {}",
                by_severity(&notification.title, notification.severity),
                notification.message.dim()
            );
        }
    });
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::init(root)?;

        println!(
            "Initialised idea workspace in {}",
            workspace.root().display()
        );
        println!("  Created: .inspira/config.toml");
        println!(
            "  Created: .inspira/{}",
            workspace.config().data_file().display()
        );
        println!();
        println!("Next steps:");
        println!("  inspira create --title \"Your first idea\" ...");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Create {
    /// Short title of the idea
    #[arg(long, short)]
    title: String,

    /// What the idea proposes
    #[arg(long, short)]
    description: String,

    /// Identifier of the submitting employee
    #[arg(long)]
    author_id: String,

    /// Display name of the submitting employee
    #[arg(long)]
    author_name: String,

    /// Plant the idea applies to
    #[arg(long)]
    plant: String,

    /// Functional area the idea applies to
    #[arg(long)]
    area: String,

    /// Category, e.g. 'Sostenibilidad'
    #[arg(long)]
    category: String,

    /// Priority (alta, media, baja)
    #[arg(long, default_value_t)]
    priority: Priority,

    /// Expected benefits
    #[arg(long)]
    benefits: Option<String>,

    /// Implementation outline
    #[arg(long)]
    implementation: Option<String>,

    /// Files to attach
    #[arg(long = "attach", value_name = "PATH")]
    attachments: Vec<PathBuf>,
}

impl Create {
    #[instrument(skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = open(root)?;

        let attachments = self
            .attachments
            .into_iter()
            .map(|path| {
                PendingUpload::from_path(path.clone())
                    .map(Attachment::from)
                    .with_context(|| format!("cannot attach {}", path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let idea = NewIdea {
            title: self.title,
            description: self.description,
            author: Author {
                id: self.author_id,
                name: self.author_name,
            },
            plant: self.plant,
            area: self.area,
            category: self.category,
            priority: self.priority,
            benefits: self.benefits,
            implementation: self.implementation,
            campaign: None,
            attachments,
        };

        let id = workspace.submit(idea)?;

        println!(
            "{}",
            format!("✅ Submitted idea {}", short_id(id)).success()
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The id (or unique id prefix) of the idea
    id: String,

    /// New title
    #[arg(long, short)]
    title: Option<String>,

    /// New description
    #[arg(long, short)]
    description: Option<String>,

    /// New priority (alta, media, baja)
    #[arg(long)]
    priority: Option<Priority>,

    /// New expected benefits (empty to clear)
    #[arg(long)]
    benefits: Option<String>,

    /// New implementation outline (empty to clear)
    #[arg(long)]
    implementation: Option<String>,
}

impl Edit {
    fn patch(self) -> anyhow::Result<IdeaPatch> {
        let mut patch = IdeaPatch::default();
        if let Some(title) = self.title {
            patch = patch.with_title(title)?;
        }
        if let Some(description) = self.description {
            patch = patch.with_description(description)?;
        }
        if let Some(priority) = self.priority {
            patch = patch.with_priority(priority);
        }
        if let Some(benefits) = self.benefits {
            patch = patch.with_benefits(benefits);
        }
        if let Some(implementation) = self.implementation {
            patch = patch.with_implementation(implementation);
        }
        Ok(patch)
    }

    #[instrument(skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = open(root)?;
        let id = workspace.resolve(&self.id)?.id();

        let patch = self.patch()?;
        if patch.is_empty() {
            anyhow::bail!("nothing to change; pass at least one field to edit");
        }

        workspace.board_mut().update(id, patch)?;
        workspace.persist(id)?;

        println!("{}", format!("✅ Updated idea {}", short_id(id)).success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The id (or unique id prefix) of the idea
    id: String,

    /// Skip confirmation prompts
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument(skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = open(root)?;
        let idea = workspace.resolve(&self.id)?;
        let id = idea.id();

        if !idea.is_editable() {
            anyhow::bail!(
                "Idea {} is '{}' and can no longer be deleted",
                short_id(id),
                idea.status()
            );
        }

        if !self.yes {
            let confirmed = dialoguer::Confirm::new()
                .with_prompt(format!("Delete \"{}\"?", idea.title()))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
        }

        let removed = workspace.board_mut().remove(id)?;
        workspace.persist(id)?;

        println!(
            "{}",
            format!("✅ Deleted \"{}\"", removed.title()).success()
        );
        Ok(())
    }
}
