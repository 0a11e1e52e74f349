use crate::config::Config;
use crate::domains::{Domain, TextDomain};
use crate::explore::{ExplorationRunner, ExploreMode, RunOptions};
use crate::history::{HistoryStore, JsonFileHistory};
use crate::oracle::create_oracle;
use crate::space::DesignSpace;
use crate::tags::OracleTagExtractor;
use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// `gallerist` - Iterative design-space exploration for generative artifacts.
#[derive(Parser, Debug)]
#[command(name = "gallerist")]
#[command(version = "0.1.0")]
#[command(about = "Explore the design space of a generative concept.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one exploration round for a concept
    Explore {
        /// Concept to generate
        #[arg(short, long)]
        concept: String,

        /// Domain to run (text)
        #[arg(short, long, default_value = "text")]
        domain: String,

        /// Number of generations in the round
        #[arg(short, long)]
        n: Option<usize>,

        /// Oracle provider (openrouter, cerebras, custom:<url>)
        #[arg(long)]
        provider: Option<String>,

        /// Model to use
        #[arg(long)]
        model: Option<String>,

        /// Additional free-text context for design-space creation
        #[arg(long)]
        context: Option<String>,

        /// Explore all axes simultaneously instead of a single axis
        #[arg(long)]
        all_axes: bool,

        /// Keep completion order instead of restoring candidate order
        #[arg(long)]
        no_sort: bool,

        /// Directory for history files (defaults to the config data dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Show persisted exploration rounds for a concept
    History {
        /// Concept to look up
        #[arg(short, long)]
        concept: String,

        /// Domain the rounds were generated in
        #[arg(short, long, default_value = "text")]
        domain: String,

        /// Directory for history files (defaults to the config data dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Explore {
            concept,
            domain,
            n,
            provider,
            model,
            context,
            all_axes,
            no_sort,
            data_dir,
        } => {
            run_explore(ExploreArgs {
                config,
                concept,
                domain,
                n,
                provider,
                model,
                context,
                all_axes,
                no_sort,
                data_dir,
            })
            .await
        }
        Commands::History {
            concept,
            domain,
            data_dir,
        } => run_history(&config, &concept, &domain, data_dir),
    }
}

struct ExploreArgs {
    config: Config,
    concept: String,
    domain: String,
    n: Option<usize>,
    provider: Option<String>,
    model: Option<String>,
    context: Option<String>,
    all_axes: bool,
    no_sort: bool,
    data_dir: Option<PathBuf>,
}

async fn run_explore(args: ExploreArgs) -> Result<()> {
    let provider = args
        .provider
        .as_deref()
        .unwrap_or_else(|| args.config.provider());
    let model = args.model.as_deref().unwrap_or_else(|| args.config.model());
    let oracle = create_oracle(
        provider,
        args.config.api_key.as_deref(),
        model,
        args.config.default_temperature,
    )?;

    let domain: Arc<dyn Domain> = match args.domain.as_str() {
        "text" => Arc::new(TextDomain::new(Arc::clone(&oracle))),
        other => bail!("Domain {other} not supported"),
    };

    let mut space = DesignSpace::create(
        oracle.as_ref(),
        &args.concept,
        domain.display_name(),
        args.context.as_deref(),
    )
    .await?;
    println!("Generated design space:\n{space}\n");

    space.select_axis_to_explore();
    space.auto_fill(oracle.as_ref()).await?;
    println!("Filled design space:\n{space}\n");

    let data_dir = args.data_dir.unwrap_or_else(|| args.config.data_dir.clone());
    let runner = ExplorationRunner::new(
        Arc::clone(&oracle),
        Arc::new(OracleTagExtractor::new(Arc::clone(&oracle))),
        Arc::new(JsonFileHistory::new(data_dir)),
    );
    let options = RunOptions {
        mode: if args.all_axes {
            ExploreMode::AllAxes
        } else {
            ExploreMode::SingleAxis
        },
        sort_results: !args.no_sort,
    };
    let n = args.n.unwrap_or(args.config.batch.n);

    let results = runner
        .run(&args.concept, &mut space, domain, n, options)
        .await?;

    if results.is_empty() {
        println!("No examples generated this round.");
        return Ok(());
    }

    for (i, example) in results.iter().enumerate() {
        let tags = example
            .tags
            .iter()
            .map(|tag| format!("{}={}", tag.dimension, tag.value))
            .collect::<Vec<_>>()
            .join(", ");
        println!("[{i}] {}", example.prompt);
        println!("    tags: {tags}");
    }
    Ok(())
}

fn run_history(
    config: &Config,
    concept: &str,
    domain: &str,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let display_name = match domain {
        "text" => "Text",
        other => bail!("Domain {other} not supported"),
    };
    let data_dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
    let store = JsonFileHistory::new(data_dir);
    let records = store.load(&format!("{concept}_{display_name}"))?;

    if records.is_empty() {
        println!("No history for {concept} ({display_name}).");
        return Ok(());
    }

    for record in &records {
        println!(
            "{}: {} example(s), run {}",
            record.recorded_at,
            record.results.len(),
            record.run_id
        );
        for axis in &record.design_space.axes {
            println!("    {} ({}) : {}", axis.name, axis.status, axis.value);
        }
    }
    Ok(())
}
