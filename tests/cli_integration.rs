/// CLI tests driving the built binary
///
/// `calculate` needs seqkit and mash on PATH, so end-to-end pipeline runs are
/// not exercised here; these tests cover the `plot` subcommand and the error
/// surfaces (malformed tables, missing tools, invalid options).
use anyhow::Result;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn submash(args: &[&str]) -> Result<std::process::Output> {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()?;
    Ok(output)
}

#[test]
fn plot_renders_svg_from_gadd_table() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let data = temp_dir.path().join("A_B_mashDistance.filter.Gadd");
    fs::write(
        &data,
        "Rchr\tQchr\tsubg\tMashD\n\
         chr1\tchrX\tSG1\t0.02\n\
         chr1\tchrZ\tSG2\t0.05\n\
         chr2\tchrX\tSG1\t0.30\n\
         chr2\tchrY\tSG2\t0.31\n",
    )?;
    let out = temp_dir.path().join("chart.svg");

    let output = submash(&[
        "plot",
        data.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ])?;
    assert!(
        output.status.success(),
        "plot failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let svg = fs::read_to_string(&out)?;
    assert!(svg.starts_with("<svg"));
    // Subgenome count detected from the table
    assert!(svg.contains("Chromosome Comparison (2 Subgenomes)"));
    Ok(())
}

#[test]
fn plot_default_output_appends_svg() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let data = temp_dir.path().join("A_B_mashDistance.filter.Gadd");
    fs::write(
        &data,
        "Rchr\tQchr\tsubg\tMashD\nchr1\tchrX\tSG1\t0.02\n",
    )?;

    let output = submash(&["plot", data.to_str().unwrap()])?;
    assert!(
        output.status.success(),
        "plot failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    // Same convention as `all`: the full data filename plus .svg
    let expected = temp_dir.path().join("A_B_mashDistance.filter.Gadd.svg");
    assert!(expected.is_file(), "default output not at {expected:?}");
    Ok(())
}

#[test]
fn plot_rejects_malformed_table() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let data = temp_dir.path().join("bad.Gadd");
    fs::write(&data, "Rchr\tQchr\tsubg\tMashD\nchr1\tonly-two\n")?;

    let output = submash(&["plot", data.to_str().unwrap()])?;
    assert!(!output.status.success(), "malformed table should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("line 2"),
        "should point at the bad line, got: {stderr}"
    );
    Ok(())
}

#[test]
fn plot_rejects_wrong_header() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let data = temp_dir.path().join("bad.Gadd");
    fs::write(&data, "Ref\tQry\tgroup\tdist\nchr1\tchrX\tSG1\t0.02\n")?;

    let output = submash(&["plot", data.to_str().unwrap()])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected header"), "got: {stderr}");
    Ok(())
}

#[test]
fn subgenome_count_out_of_range_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let data = temp_dir.path().join("t.Gadd");
    fs::write(&data, "Rchr\tQchr\tsubg\tMashD\n")?;

    for bad in ["0", "11"] {
        let output = submash(&["plot", data.to_str().unwrap(), "-s", bad])?;
        assert!(!output.status.success(), "-s {bad} should be rejected");
    }
    Ok(())
}

#[test]
fn calculate_fails_fast_on_missing_tools() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = submash(&[
        "calculate",
        "--seqkit-path",
        "/nonexistent/seqkit",
        "--mash-path",
        "/nonexistent/mash",
        "-w",
        temp_dir.path().to_str().unwrap(),
        "Ath",
        "ath.fa",
        "Bra",
        "bra.fa",
    ])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("seqkit"), "should name the tool, got: {stderr}");
    // Tool resolution fails before any file is produced
    assert!(fs::read_dir(temp_dir.path())?.next().is_none());
    Ok(())
}

#[test]
fn plot_on_missing_file_reports_path() -> Result<()> {
    let output = submash(&["plot", "/nonexistent/table.Gadd"])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/nonexistent/table.Gadd"), "got: {stderr}");
    Ok(())
}
