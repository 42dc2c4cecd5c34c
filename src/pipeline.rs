//! The calculation driver: split both genomes per chromosome, sketch the
//! reference, estimate all pairwise distances, then rank, filter and write
//! the assigned table.
//!
//! All intermediate files land in an explicit working directory instead of
//! whatever the process cwd happens to be. Filename conventions follow the
//! established ones: `<ref>_<qry>_mashDistance` for the raw table and
//! `<ref>_<qry>_mashDistance.filter.Gadd` for the assigned table.

use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::assign::{assign_subgenomes, Assignment};
use crate::dist_table;
use crate::error::{Error, Result};
use crate::gadd;
use crate::tools::{run_checked, ToolPaths};

/// Mash sketch parameters tuned for whole chromosomes.
const SKETCH_KMER: &str = "31";
const SKETCH_SIZE: &str = "5000000000";

/// Everything one `calculate` run needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub ref_abb: String,
    pub ref_fasta: PathBuf,
    pub qry_abb: String,
    pub qry_fasta: PathBuf,
    pub subgenomes: usize,
    pub threads: usize,
    pub workdir: PathBuf,
    pub tools: ToolPaths,
}

impl PipelineConfig {
    pub fn distance_file(&self) -> PathBuf {
        self.workdir
            .join(format!("{}_{}_mashDistance", self.ref_abb, self.qry_abb))
    }

    pub fn gadd_file(&self) -> PathBuf {
        self.workdir.join(format!(
            "{}_{}_mashDistance.filter.Gadd",
            self.ref_abb, self.qry_abb
        ))
    }

    pub fn default_plot_file(&self) -> PathBuf {
        self.workdir.join(format!(
            "{}_{}_mashDistance.filter.Gadd.svg",
            self.ref_abb, self.qry_abb
        ))
    }
}

/// Run the full calculation and return the assignments that were written to
/// the `.filter.Gadd` file.
pub fn run_calculate(config: &PipelineConfig) -> Result<Vec<Assignment>> {
    if config.subgenomes == 0 {
        return Err(Error::Config(
            "subgenome count must be at least 1".to_string(),
        ));
    }
    fs::create_dir_all(&config.workdir)?;

    let ref_split = split_fasta(config, &config.ref_fasta, &config.ref_abb)?;
    let qry_split = split_fasta(config, &config.qry_fasta, &config.qry_abb)?;

    let ref_list = write_chr_list(config, &ref_split, &config.ref_abb)?;
    let qry_list = write_chr_list(config, &qry_split, &config.qry_abb)?;

    let db = build_sketch_db(config, &ref_list)?;
    let dist_file = compute_distances(config, &db, &qry_list)?;

    let records = dist_table::read_all(&dist_file)?;
    let assignments = assign_subgenomes(&records, config.subgenomes)?;

    let gadd_file = config.gadd_file();
    gadd::write_gadd_file(&gadd_file, &assignments)?;
    info!(
        "wrote {} assignments ({} subgenomes) to {}",
        assignments.len(),
        config.subgenomes,
        gadd_file.display()
    );
    Ok(assignments)
}

/// Split a genome FASTA into one file per chromosome with `seqkit split`.
fn split_fasta(config: &PipelineConfig, fasta: &Path, abb: &str) -> Result<PathBuf> {
    let out_dir = config.workdir.join(format!("{abb}_split"));
    fs::create_dir_all(&out_dir)?;

    let mut cmd = Command::new(&config.tools.seqkit);
    cmd.arg("split")
        .arg("-f")
        .arg("-i")
        .args(["--by-id-prefix", ""])
        .arg("--out-dir")
        .arg(&out_dir)
        .arg(fasta);
    run_checked(cmd, "seqkit")?;
    info!("split {} into {}", fasta.display(), out_dir.display());
    Ok(out_dir)
}

/// Write the per-chromosome file manifest consumed by `mash -l`.
///
/// Paths are absolute and sorted so a rerun produces the same manifest
/// regardless of directory iteration order.
fn write_chr_list(config: &PipelineConfig, split_dir: &Path, abb: &str) -> Result<PathBuf> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(split_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path().canonicalize()?);
        }
    }
    if paths.is_empty() {
        return Err(Error::Config(format!(
            "no per-chromosome files in {} after splitting",
            split_dir.display()
        )));
    }
    paths.sort();

    let list_path = config.workdir.join(format!("{abb}.chrList"));
    let mut writer = BufWriter::new(File::create(&list_path)?);
    for path in &paths {
        writeln!(writer, "{}", path.display())?;
    }
    writer.flush()?;
    info!("{} chromosomes listed in {}", paths.len(), list_path.display());
    Ok(list_path)
}

/// Build the mash sketch database over the reference chromosomes.
fn build_sketch_db(config: &PipelineConfig, ref_list: &Path) -> Result<PathBuf> {
    let db_prefix = config.workdir.join(&config.ref_abb);

    let mut cmd = Command::new(&config.tools.mash);
    cmd.arg("sketch")
        .args(["-p", &config.threads.to_string()])
        .args(["-k", SKETCH_KMER])
        .args(["-s", SKETCH_SIZE])
        .arg("-l")
        .arg(ref_list)
        .arg("-o")
        .arg(&db_prefix);
    run_checked(cmd, "mash sketch")?;

    // mash appends .msh to the -o prefix; with_extension would clobber a
    // dot inside the abbreviation
    let db = config.workdir.join(format!("{}.msh", config.ref_abb));
    info!("built sketch database {}", db.display());
    Ok(db)
}

/// Estimate all reference-by-query chromosome distances; the raw table goes
/// to `<ref>_<qry>_mashDistance`.
fn compute_distances(config: &PipelineConfig, db: &Path, qry_list: &Path) -> Result<PathBuf> {
    let mut cmd = Command::new(&config.tools.mash);
    cmd.arg("dist")
        .arg(db)
        .args(["-p", &config.threads.to_string()])
        .args(["-s", SKETCH_SIZE])
        .arg("-l")
        .arg(qry_list);
    let stdout = run_checked(cmd, "mash dist")?;

    let dist_file = config.distance_file();
    fs::write(&dist_file, stdout)?;
    info!("distance table written to {}", dist_file.display());
    Ok(dist_file)
}
