/// End-to-end table tests: raw distance file -> assignments -> .filter.Gadd,
/// including the byte-level idempotence guarantee.
use pretty_assertions::assert_eq;
use std::fs;

use submash::assign::assign_subgenomes;
use submash::dist_table;
use submash::gadd;

const RAW_TABLE: &str = "\
/r/chr1.fa\t/q/chrX.fa\t0.02\t0\t812/5000
/r/chr1.fa\t/q/chrY.fa\t0.10\t0\t400/5000
/r/chr1.fa\t/q/chrZ.fa\t0.05\t0\t600/5000
/r/chr2.fa\t/q/chrX.fa\t0.30\t0\t100/5000
";

#[test]
fn worked_example_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("A_B_mashDistance");
    fs::write(&raw, RAW_TABLE).unwrap();

    let records = dist_table::read_all(&raw).unwrap();
    let assignments = assign_subgenomes(&records, 2).unwrap();

    let out = dir.path().join("A_B_mashDistance.filter.Gadd");
    gadd::write_gadd_file(&out, &assignments).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(
        text,
        "Rchr\tQchr\tsubg\tMashD\n\
         chr1\tchrX\tSG1\t0.02\n\
         chr1\tchrZ\tSG2\t0.05\n\
         chr2\tchrX\tSG1\t0.30\n"
    );
}

#[test]
fn rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("dist");
    fs::write(&raw, RAW_TABLE).unwrap();

    let mut outputs = Vec::new();
    for run in 0..2 {
        let records = dist_table::read_all(&raw).unwrap();
        let assignments = assign_subgenomes(&records, 2).unwrap();
        let out = dir.path().join(format!("out{run}"));
        gadd::write_gadd_file(&out, &assignments).unwrap();
        outputs.push(fs::read(&out).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn gadd_reader_recovers_assignments() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("dist");
    fs::write(&raw, RAW_TABLE).unwrap();

    let records = dist_table::read_all(&raw).unwrap();
    let assignments = assign_subgenomes(&records, 2).unwrap();
    let out = dir.path().join("out.filter.Gadd");
    gadd::write_gadd_file(&out, &assignments).unwrap();

    let reread = gadd::read_gadd(&out).unwrap();
    assert_eq!(reread, assignments);
    assert_eq!(gadd::subgenome_count(&reread), 2);
}

#[test]
fn empty_raw_table_yields_header_only_output() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("dist");
    fs::write(&raw, "").unwrap();

    let records = dist_table::read_all(&raw).unwrap();
    assert!(records.is_empty());
    let assignments = assign_subgenomes(&records, 2).unwrap();

    let out = dir.path().join("out.filter.Gadd");
    gadd::write_gadd_file(&out, &assignments).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), "Rchr\tQchr\tsubg\tMashD\n");
}

#[test]
fn gzipped_raw_table_is_read_transparently() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("dist.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&raw).unwrap(), Compression::default());
    encoder.write_all(RAW_TABLE.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let records = dist_table::read_all(&raw).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].raw_distance, "0.02");
}

#[test]
fn malformed_raw_table_fails_whole_read() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("dist");
    fs::write(&raw, "/r/chr1.fa\t/q/chrX.fa\t0.02\n/r/chr1.fa\tmissing-distance\n").unwrap();

    let err = dist_table::read_all(&raw).unwrap_err();
    assert!(err.to_string().contains("line 2"), "got: {err}");
}
