use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use submash::gadd;
use submash::pipeline::{self, PipelineConfig};
use submash::plot;
use submash::tools::ToolPaths;

/// Practical upper limit for visualization
const MAX_SUBGENOMES: i64 = 10;

/// Mash chromosome comparison for polyploid genomes
///
/// Splits the reference and query genomes per chromosome, estimates all
/// pairwise chromosome distances with mash, keeps the closest K matches per
/// reference chromosome as subgenome assignments (SG1..SGK), and renders a
/// comparison chart.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Cmd,

    /// Increase verbosity (-v: debug, -vv: trace)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the complete pipeline: calculate, then plot
    All {
        #[clap(flatten)]
        genomes: GenomeArgs,
        #[clap(flatten)]
        run: RunOpts,
        /// Chart output path [default: <ref>_<qry>_mashDistance.filter.Gadd.svg]
        #[clap(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Only perform calculations, writing the assigned table
    Calculate {
        #[clap(flatten)]
        genomes: GenomeArgs,
        #[clap(flatten)]
        run: RunOpts,
    },
    /// Render a chart from an existing .filter.Gadd table
    Plot {
        /// Assigned table produced by `calculate`
        data_file: PathBuf,
        /// Number of subgenomes [default: detected from the table]
        #[clap(short = 's', long = "subgenomes",
               value_parser = clap::value_parser!(u32).range(1..=MAX_SUBGENOMES))]
        subgenomes: Option<u32>,
        /// Chart output path [default: data file with .svg extension]
        #[clap(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct GenomeArgs {
    /// Reference genome abbreviation (used in output filenames)
    ref_abb: String,
    /// Reference genome FASTA
    ref_fasta: PathBuf,
    /// Query genome abbreviation
    qry_abb: String,
    /// Query genome FASTA
    qry_fasta: PathBuf,
}

#[derive(Args, Debug)]
struct RunOpts {
    /// Number of subgenomes to consider
    #[clap(short = 's', long = "subgenomes", default_value = "2",
           value_parser = clap::value_parser!(u32).range(1..=MAX_SUBGENOMES))]
    subgenomes: u32,

    /// Threads forwarded to mash
    #[clap(short = 't', long = "threads", default_value = "4")]
    threads: usize,

    /// Directory for intermediate and output files
    #[clap(short = 'w', long = "workdir", default_value = ".")]
    workdir: PathBuf,

    /// Path to the seqkit executable [default: $SUBMASH_SEQKIT, then PATH]
    #[clap(long = "seqkit-path")]
    seqkit_path: Option<PathBuf>,

    /// Path to the mash executable [default: $SUBMASH_MASH, then PATH]
    #[clap(long = "mash-path")]
    mash_path: Option<PathBuf>,
}

fn build_config(genomes: GenomeArgs, run: &RunOpts) -> Result<PipelineConfig> {
    let tools = ToolPaths::resolve(run.seqkit_path.as_deref(), run.mash_path.as_deref())?;
    Ok(PipelineConfig {
        ref_abb: genomes.ref_abb,
        ref_fasta: genomes.ref_fasta,
        qry_abb: genomes.qry_abb,
        qry_fasta: genomes.qry_fasta,
        subgenomes: run.subgenomes as usize,
        threads: run.threads,
        workdir: run.workdir.clone(),
        tools,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Cmd::All {
            genomes,
            run,
            output,
        } => {
            let config = build_config(genomes, &run)?;
            let assignments = pipeline::run_calculate(&config)?;
            let out = output.unwrap_or_else(|| config.default_plot_file());
            plot::write_svg_file(&out, &assignments, run.subgenomes as usize)?;
            info!("chart written to {}", out.display());
        }
        Cmd::Calculate { genomes, run } => {
            let config = build_config(genomes, &run)?;
            pipeline::run_calculate(&config)?;
        }
        Cmd::Plot {
            data_file,
            subgenomes,
            output,
        } => {
            let assignments = gadd::read_gadd(&data_file)
                .with_context(|| format!("reading {}", data_file.display()))?;
            let k = subgenomes
                .map(|s| s as usize)
                .unwrap_or_else(|| gadd::subgenome_count(&assignments));
            // Append rather than replace the extension so the default matches
            // `all` (<data_file>.svg, e.g. X_mashDistance.filter.Gadd.svg)
            let out = output.unwrap_or_else(|| {
                let mut name = data_file.clone().into_os_string();
                name.push(".svg");
                PathBuf::from(name)
            });
            plot::write_svg_file(&out, &assignments, k)?;
            info!("chart written to {}", out.display());
        }
    }

    Ok(())
}
