use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mtg-deck-forge")]
#[command(author = "MTG Deck Forge")]
#[command(version = "0.1.0")]
#[command(about = "Agentic Magic: The Gathering deck building orchestrator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a new deck from scratch
    Build(BuildArgs),

    /// Build a new deck, then apply one free-form modification to it
    Modify {
        #[command(flatten)]
        build: BuildArgs,

        /// Free-form modification request, e.g. "remove Lightning Bolt and add more removal"
        #[arg(short, long)]
        prompt: String,

        /// Skip re-running the Quality Verifier after the modification
        #[arg(long)]
        skip_quality_check: bool,
    },
}

#[derive(clap::Args)]
pub struct BuildArgs {
    /// Format to build for (Standard, Modern, Pioneer, Legacy, Vintage, Brawl, Commander)
    #[arg(short, long, default_value = "Standard")]
    pub format: String,

    /// Comma-separated color identity, e.g. "R,G"
    #[arg(short, long, default_value = "R")]
    pub colors: String,

    /// Deck archetype (Aggro, Midrange, Control, Combo)
    #[arg(short, long, default_value = "Midrange")]
    pub archetype: String,

    /// Free-form strategy guidance passed to the builder
    #[arg(short, long, default_value = "")]
    pub strategy: String,

    /// Override the format's default deck size (0 = use the format default)
    #[arg(long, default_value_t = 0)]
    pub deck_size: u32,

    /// Minimum overall quality score to stop refining
    #[arg(short, long, default_value_t = 0.7)]
    pub quality_threshold: f64,

    /// Maximum number of build/refine iterations
    #[arg(short, long, default_value_t = 5)]
    pub max_iterations: u32,
}

impl BuildArgs {
    pub fn into_request(self) -> crate::model::BuildRequest {
        crate::model::BuildRequest {
            format: self.format,
            colors: self
                .colors
                .split(',')
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
            archetype: self.archetype,
            strategy: self.strategy,
            deck_size: self.deck_size,
            quality_threshold: self.quality_threshold,
            max_iterations: self.max_iterations,
        }
    }
}
