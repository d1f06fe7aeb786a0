use std::collections::{BTreeMap, HashMap};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::classify::SampleClassifier;
use crate::core::chrom::{circos_contig_id, genomic_cmp};
use crate::core::types::{SampleRole, VariantKey};
use crate::tracks::counts::{read_counts_file, CountsRow, TrackError};

/// Per-role allele frequencies for every observed locus, in genomic order
#[derive(Debug, Default)]
pub struct AllelicTracks {
    loci: Vec<VariantKey>,
    values: HashMap<VariantKey, BTreeMap<SampleRole, f64>>,
}

impl AllelicTracks {
    /// Classify each row's sample tag and collect values by locus
    ///
    /// A repeated (locus, role) pair keeps the last value seen.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::Unclassified` for the first row whose sample tag
    /// matches zero or several role regexes.
    pub fn from_rows<'a, I>(rows: I, classifier: &SampleClassifier) -> Result<Self, TrackError>
    where
        I: IntoIterator<Item = &'a CountsRow>,
    {
        let mut values: HashMap<VariantKey, BTreeMap<SampleRole, f64>> = HashMap::new();
        for row in rows {
            let role = classifier
                .classify(&row.sample)
                .map_err(|source| TrackError::Unclassified {
                    line: row.line,
                    source,
                })?;
            values.entry(row.key.clone()).or_default().insert(role, row.value);
        }

        let mut loci: Vec<VariantKey> = values.keys().cloned().collect();
        loci.sort_by(genomic_cmp);

        Ok(Self { loci, values })
    }

    /// Read and classify a counts table
    ///
    /// # Errors
    ///
    /// Returns any read, parse, or classification error.
    pub fn from_counts_file(path: &Path, classifier: &SampleClassifier) -> Result<Self, TrackError> {
        let rows = read_counts_file(path)?;
        debug!("Read {} rows from {}", rows.len(), path.display());
        Self::from_rows(&rows, classifier)
    }

    /// Number of distinct loci across all roles
    #[must_use]
    pub fn locus_count(&self) -> usize {
        self.loci.len()
    }

    /// Track lines for one role, in genomic order
    ///
    /// Loci without a value for `role` are omitted, not zero-filled.
    pub fn lines(&self, role: SampleRole) -> impl Iterator<Item = String> + '_ {
        self.loci.iter().filter_map(move |key| {
            let value = self.values.get(key)?.get(&role)?;
            let contig = circos_contig_id(&key.chrom);
            Some(format!("{contig}\t{pos}\t{pos}\t{value:?}", pos = key.pos))
        })
    }

    /// Write one `<prefix>_<code>.txt` file per role into `dir`
    ///
    /// Each file is written to a temporary name and moved into place once
    /// complete.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::Io` if a file cannot be written.
    pub fn write_tracks(&self, dir: &Path, prefix: &str) -> Result<TrackFiles, TrackError> {
        let mut paths = BTreeMap::new();
        for role in SampleRole::ALL {
            let path = dir.join(track_file_name(prefix, role));
            let tmp = NamedTempFile::new_in(dir)?;
            let mut count = 0usize;
            {
                let mut writer = BufWriter::new(tmp.as_file());
                for line in self.lines(role) {
                    writeln!(writer, "{line}")?;
                    count += 1;
                }
                writer.flush()?;
            }
            tmp.persist(&path).map_err(|e| TrackError::Io(e.error))?;
            debug!("Wrote {count} {role} track lines to {}", path.display());
            paths.insert(role, path);
        }
        info!(
            "Wrote allelic tracks for {} loci to {}",
            self.locus_count(),
            dir.display()
        );
        Ok(TrackFiles { paths })
    }
}

/// Track file name for a role, as referenced by the circos configuration
#[must_use]
pub fn track_file_name(prefix: &str, role: SampleRole) -> String {
    format!("{prefix}_{}.txt", role.track_code())
}

/// Paths of the four written track files
#[derive(Debug, Clone)]
pub struct TrackFiles {
    pub paths: BTreeMap<SampleRole, PathBuf>,
}

impl TrackFiles {
    #[must_use]
    pub fn get(&self, role: SampleRole) -> Option<&Path> {
        self.paths.get(&role).map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifyError;
    use crate::core::chrom::chrom_rank;
    use crate::core::config::RoleRegexes;

    fn classifier() -> SampleClassifier {
        SampleClassifier::new(&RoleRegexes::new("Nex", "Ntr", "Tex", "Ttr")).unwrap()
    }

    fn row(chrom: &str, pos: u64, sample: &str, value: f64) -> CountsRow {
        CountsRow {
            key: VariantKey::new(chrom, pos, "A", "G"),
            sample: sample.to_string(),
            value,
            line: 0,
        }
    }

    #[test]
    fn test_two_loci_example() {
        let rows = vec![
            CountsRow {
                key: VariantKey::new("chr1", 100, "A", "G"),
                sample: "Tex".to_string(),
                value: 0.6,
                line: 2,
            },
            CountsRow {
                key: VariantKey::new("chr2", 50, "A", "T"),
                sample: "Ntr".to_string(),
                value: 0.2,
                line: 3,
            },
        ];
        let tracks = AllelicTracks::from_rows(&rows, &classifier()).unwrap();

        let tex: Vec<String> = tracks.lines(SampleRole::TumorDna).collect();
        assert_eq!(tex, vec!["hs1\t100\t100\t0.6"]);
        let ntr: Vec<String> = tracks.lines(SampleRole::NormalRna).collect();
        assert_eq!(ntr, vec!["hs2\t50\t50\t0.2"]);
        assert_eq!(tracks.lines(SampleRole::NormalDna).count(), 0);
        assert_eq!(tracks.lines(SampleRole::TumorRna).count(), 0);
    }

    #[test]
    fn test_lines_follow_chromosome_order() {
        let rows = vec![
            row("chrM", 10, "pt_Nex", 0.1),
            row("chrX", 5, "pt_Nex", 0.2),
            row("chr10", 1, "pt_Nex", 0.3),
            row("chr2", 900, "pt_Nex", 0.4),
            row("chr2", 1000, "pt_Nex", 0.5),
            row("chrY", 3, "pt_Nex", 0.6),
            row("chr1", 20, "pt_Nex", 0.7),
        ];
        let tracks = AllelicTracks::from_rows(&rows, &classifier()).unwrap();
        let lines: Vec<String> = tracks.lines(SampleRole::NormalDna).collect();

        let contigs: Vec<&str> = lines.iter().map(|l| l.split('\t').next().unwrap()).collect();
        assert_eq!(contigs, vec!["hs1", "hs2", "hs2", "hs10", "hsX", "hsY", "hsM"]);

        let keys: Vec<_> = lines
            .iter()
            .map(|l| {
                let mut f = l.split('\t');
                let c = f.next().unwrap().trim_start_matches("hs").to_string();
                let p: u64 = f.next().unwrap().parse().unwrap();
                (chrom_rank(&c), p)
            })
            .collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_locus_absent_for_role_is_omitted() {
        let rows = vec![
            row("chr1", 100, "pt_Nex", 0.5),
            row("chr1", 100, "pt_Tex", 0.9),
            row("chr3", 7, "pt_Tex", 0.4),
        ];
        let tracks = AllelicTracks::from_rows(&rows, &classifier()).unwrap();
        let nex: Vec<String> = tracks.lines(SampleRole::NormalDna).collect();
        assert_eq!(nex, vec!["hs1\t100\t100\t0.5"]);
        assert_eq!(tracks.lines(SampleRole::TumorDna).count(), 2);
        assert_eq!(tracks.locus_count(), 2);
    }

    #[test]
    fn test_ambiguous_tag_is_data_quality_error() {
        let rows = vec![row("chr1", 100, "pt_Nex_Tex", 0.5)];
        match AllelicTracks::from_rows(&rows, &classifier()) {
            Err(TrackError::Unclassified {
                source: ClassifyError::Ambiguous { .. },
                ..
            }) => {}
            other => panic!("expected ambiguous tag error, got {other:?}"),
        }
    }

    #[test]
    fn test_unmatched_tag_is_data_quality_error() {
        let mut r = row("chr1", 100, "unknown", 0.5);
        r.line = 12;
        let err = AllelicTracks::from_rows(&[r], &classifier()).unwrap_err();
        assert!(err.to_string().contains("line 12"));
    }

    #[test]
    fn test_write_tracks_creates_all_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![row("chr1", 100, "pt_Tex", 0.6)];
        let tracks = AllelicTracks::from_rows(&rows, &classifier()).unwrap();
        let files = tracks.write_tracks(dir.path(), "pt01").unwrap();

        assert_eq!(files.paths.len(), 4);
        let tex = std::fs::read_to_string(dir.path().join("pt01_Tex.txt")).unwrap();
        assert_eq!(tex, "hs1\t100\t100\t0.6\n");
        let ttr = std::fs::read_to_string(files.get(SampleRole::TumorRna).unwrap()).unwrap();
        assert!(ttr.is_empty());
    }
}
