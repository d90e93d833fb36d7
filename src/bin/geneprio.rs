use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use geneprio::config::{Config, VegasConfig};
use geneprio::hpo::read_term_info;
use geneprio::netwas::parse_netwas_results;
use geneprio::pipeline::{evaluate_terms, evaluate_trait};
use geneprio::report::{print_report, save_enrichments, save_report};
use geneprio::utils::ensure_dir;
use geneprio::vegas::prepare_vegas_input;
use geneprio::{HpoReference, Method};

/// Evaluate gene prioritization results against HPO terms
#[derive(Parser)]
#[command(name = "geneprio", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Test every trait against its configured HPO term
    Single(SingleArgs),
    /// Test every trait against a list of HPO terms
    Multiple(MultipleArgs),
    /// Parse a result file downloaded from the NetWAS web server
    ParseNetwas(ParseNetwasArgs),
    /// Prepare GWAS summary statistics as VEGAS2 input
    PrepareVegas(PrepareVegasArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["save", "plot"])))]
struct SingleArgs {
    /// Configuration file in YAML format
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// The prioritization method that produced the trait files
    #[arg(short, long, value_parser = parse_method)]
    method: Method,

    /// Output directory, required in save mode
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save the results to the output directory
    #[arg(short, long)]
    save: bool,

    /// Print the results to the screen
    #[arg(short, long)]
    plot: bool,
}

#[derive(Args)]
struct MultipleArgs {
    /// Configuration file in YAML format
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// The prioritization method that produced the trait files
    #[arg(short, long, value_parser = parse_method)]
    method: Method,

    /// Output directory, results are written to `<output>/<method>/`
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct ParseNetwasArgs {
    /// Raw NetWAS result, tab or comma separated (.txt or .csv)
    #[arg(short, long)]
    file: PathBuf,

    /// Only keep genes with a NetWAS score of at least this value
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Location and name of the output file
    #[arg(short, long)]
    output: PathBuf,

    /// Only write the gene IDs
    #[arg(long)]
    gene_list: bool,
}

#[derive(Args)]
struct PrepareVegasArgs {
    /// Configuration file in YAML format
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn parse_method(value: &str) -> Result<Method, String> {
    value.parse::<Method>().map_err(|_| {
        let names: Vec<&str> = Method::ALL.iter().map(|method| method.name()).collect();
        format!("must be one of {}", names.join(", "))
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = Config::from_path(path)
        .with_context(|| format!("unable to load configuration {}", path.display()))?;
    config.validate_inputs()?;
    Ok(config)
}

fn run_single(args: SingleArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let output = args.output.or_else(|| config.output.clone());
    if let Some(dir) = &output {
        ensure_dir(dir)?;
    }
    let save_dir = match (&output, args.save) {
        (Some(dir), true) => Some(dir.as_path()),
        (None, true) => bail!("an output directory (-o) is required to save the results"),
        (_, false) => None,
    };

    let hpo = HpoReference::from_path(&config.hpo_data)?;
    let rule = config.thresholds.rule_for(args.method);

    for (name, entry) in &config.traits {
        info!("Processing trait: {}", name);
        let term = entry
            .hpo_term()
            .with_context(|| format!("trait {name} needs an `hpo_term` in single-test mode"))?;
        let evaluation = evaluate_trait(&hpo, args.method, rule, name, entry.file(), term)
            .with_context(|| format!("unable to evaluate trait {name}"))?;
        match save_dir {
            Some(dir) => {
                save_report(dir, &evaluation)?;
            }
            None => print_report(&evaluation)?,
        }
    }
    Ok(())
}

fn run_multiple(args: MultipleArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    ensure_dir(args.output.join(args.method.name()))?;

    let hpo = HpoReference::from_path(&config.hpo_data)?;
    let terms = match &config.hpo_info {
        Some(path) => read_term_info(path)?,
        None => {
            info!("No hpo_info configured, testing all HPO terms of the reference");
            Vec::new()
        }
    };
    let rule = config.thresholds.rule_for(args.method);

    for (name, entry) in &config.traits {
        info!("Processing trait: {}", name);
        let enrichments = evaluate_terms(&hpo, args.method, rule, entry.file(), &terms)
            .with_context(|| format!("unable to evaluate trait {name}"))?;
        save_enrichments(&args.output, args.method, entry.file(), &enrichments)?;
    }
    Ok(())
}

fn run_parse_netwas(args: ParseNetwasArgs) -> anyhow::Result<()> {
    parse_netwas_results(&args.file, &args.output, args.threshold, args.gene_list)
        .with_context(|| format!("unable to parse {}", args.file.display()))?;
    Ok(())
}

fn run_prepare_vegas(args: PrepareVegasArgs) -> anyhow::Result<()> {
    let config = VegasConfig::from_path(&args.config)
        .with_context(|| format!("unable to load configuration {}", args.config.display()))?;
    prepare_vegas_input(&config)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Single(args) => run_single(args),
        Command::Multiple(args) => run_multiple(args),
        Command::ParseNetwas(args) => run_parse_netwas(args),
        Command::PrepareVegas(args) => run_prepare_vegas(args),
    }
}
