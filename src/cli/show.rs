use std::path::PathBuf;

use clap::Parser;
use inspira::{domain::Idea, storage::IdeaRecord};
use tracing::instrument;

use super::{
    open,
    terminal::{Colorize, status_label},
};

#[derive(Debug, Parser)]
#[command(about = "Display the details of an idea")]
pub struct Show {
    /// The id (or unique id prefix) of the idea
    id: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = open(root)?;
        let idea = workspace.resolve(&self.id)?;

        match self.output {
            OutputFormat::Pretty => Self::output_pretty(idea),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&IdeaRecord::from(idea))?
                );
            }
        }

        Ok(())
    }

    fn output_pretty(idea: &Idea) {
        println!("# {}", idea.title().strong());
        if idea.status().is_terminal() {
            println!("{} {}\n", status_label(idea.status()), "(closed)".dim());
        } else {
            println!("{}\n", status_label(idea.status()));
        }
        println!("{}\n", idea.description());

        println!("{}", "Metadata".dim());
        println!("  Id:        {}", idea.id());
        println!(
            "  Author:    {} ({})",
            idea.author().name,
            idea.author().id
        );
        println!("  Plant:     {}", idea.plant());
        println!("  Area:      {}", idea.area());
        println!("  Category:  {}", idea.category());
        println!("  Priority:  {}", idea.priority());
        if let Some(campaign) = idea.campaign() {
            println!("  Campaign:  {}", campaign.title);
        }
        println!("  Created:   {}", idea.created());
        println!("  Updated:   {}", idea.updated());

        if let Some(benefits) = idea.benefits() {
            println!("\n{}", "Expected benefits".dim());
            println!("  {benefits}");
        }

        if let Some(implementation) = idea.implementation() {
            println!("\n{}", "Implementation".dim());
            println!("  {implementation}");
        }

        if !idea.attachments().is_empty() {
            println!("\n{}", "Attachments".dim());
            for attachment in idea.attachments() {
                let pending = if attachment.is_pending() {
                    " (not uploaded)".dim()
                } else {
                    String::new()
                };
                println!(
                    "  • {} [{}, {} bytes]{pending}",
                    attachment.filename(),
                    attachment.mime_type(),
                    attachment.size_bytes()
                );
            }
        }

        if let Some(comment) = idea.comment() {
            println!("\n{}", "Reviewer comment".dim());
            println!("  {}", comment.info());
        }
    }
}
