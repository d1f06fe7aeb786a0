//! Command-line behaviour of the `rna2dnalign` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn rna2dnalign() -> Command {
    Command::cargo_bin("rna2dnalign").unwrap()
}

fn write_counts(path: &Path) {
    let mut table = String::from(
        "CHROM\tPOS\tREF\tALT\tAlignedReads\tR\tA\tNref\tNalt\tNtotal\tSNVCountForward\tSNVCountReverse\tRefCountForward\tAF\n",
    );
    table.push_str("chr1\t100\tA\tG\tpt01_TPex.bam\t0\t0\t0\t0\t0\t0\t0\t0\t0.6\n");
    table.push_str("chr2\t50\tA\tT\tpt01_NTtr.bam\t0\t0\t0\t0\t0\t0\t0\t0\t0.2\n");
    fs::write(path, table).unwrap();
}

#[test]
fn test_help_lists_commands() {
    rna2dnalign()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("map")));
}

#[test]
fn test_run_requires_inputs() {
    let dir = tempfile::tempdir().unwrap();
    rna2dnalign()
        .args(["run", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--snvs"));
}

#[test]
fn test_ambiguous_filename_is_rejected_before_any_stage() {
    let dir = tempfile::tempdir().unwrap();
    let snvs = dir.path().join("pt01_NTex.vcf");
    let bam = dir.path().join("pt01_NTex.bam");
    fs::write(&snvs, "chr1\t100\tA\tG\n").unwrap();
    fs::write(&bam, "BAM").unwrap();
    let out = dir.path().join("out");

    rna2dnalign()
        .arg("run")
        .arg("-s")
        .arg(&snvs)
        .arg("-r")
        .arg(&bam)
        .arg("-o")
        .arg(&out)
        .args(["--tumortransre", "pt01"])
        .args(["--read-counts-bin", "/nonexistent/readCounts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("matches more than one sample role"));

    assert!(!out.exists());
}

#[test]
fn test_missing_input_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bam = dir.path().join("pt01_NTex.bam");
    fs::write(&bam, "BAM").unwrap();

    rna2dnalign()
        .arg("run")
        .arg("-s")
        .arg(dir.path().join("pt01_NTex.vcf"))
        .arg("-r")
        .arg(&bam)
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("pt01_NTex.vcf"));
}

#[test]
fn test_unlaunchable_read_counter_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    let snvs = dir.path().join("pt01_NTex.vcf");
    let bam = dir.path().join("pt01_NTex.bam");
    fs::write(&snvs, "chr1\t100\tA\tG\n").unwrap();
    fs::write(&bam, "BAM").unwrap();
    let out = dir.path().join("out");

    rna2dnalign()
        .arg("run")
        .arg("-s")
        .arg(&snvs)
        .arg("-r")
        .arg(&bam)
        .arg("-o")
        .arg(&out)
        .args(["--read-counts-bin", "/nonexistent/readCounts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to launch read counting"));

    assert!(!out.join("summary_result.txt").exists());
}

#[test]
fn test_map_without_circos_writes_tracks_and_warns() {
    let dir = tempfile::tempdir().unwrap();
    let counts = dir.path().join("readCounts.tsv");
    write_counts(&counts);
    let out = dir.path().join("maps");

    rna2dnalign()
        .arg("map")
        .arg("--counts")
        .arg(&counts)
        .arg("-o")
        .arg(&out)
        .args(["--sample-name", "pt01", "--save-conf"])
        .arg("--circos-path")
        .arg(dir.path().join("no-circos-here"))
        .assert()
        .success()
        .stdout(predicate::str::contains("not generated"))
        .stderr(predicate::str::contains("Unable to locate circos"));

    assert_eq!(
        fs::read_to_string(out.join("pt01_Tex.txt")).unwrap(),
        "hs1\t100\t100\t0.6\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("pt01_Ntr.txt")).unwrap(),
        "hs2\t50\t50\t0.2\n"
    );
    assert_eq!(fs::read_to_string(out.join("pt01_Nex.txt")).unwrap(), "");
    assert!(out.join("circos.conf").is_file());
}

#[test]
fn test_map_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let counts = dir.path().join("readCounts.tsv");
    write_counts(&counts);

    rna2dnalign()
        .args(["--format", "json", "--quiet", "map", "--counts"])
        .arg(&counts)
        .arg("-o")
        .arg(dir.path())
        .arg("--circos-path")
        .arg(dir.path().join("no-circos-here"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"warning\""));
}

#[test]
fn test_map_rejects_unclassified_sample() {
    let dir = tempfile::tempdir().unwrap();
    let counts = dir.path().join("readCounts.tsv");
    write_counts(&counts);

    rna2dnalign()
        .args(["map", "--counts"])
        .arg(&counts)
        .arg("-o")
        .arg(dir.path())
        .args(["--normaltransre", "RNA_N"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pt01_NTtr.bam"));
}
