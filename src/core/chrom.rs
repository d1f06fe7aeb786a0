use std::cmp::Ordering;

use crate::core::types::VariantKey;

/// Position of a contig in the fixed human chromosome order 1..22, X, Y, M
///
/// Derived ordering follows variant declaration order, so every numbered
/// autosome sorts before X, X before Y, Y before M, and any contig outside
/// the primary set sorts last (by name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChromRank {
    Autosome(u8),
    X,
    Y,
    M,
    Other(String),
}

/// Strip a UCSC-style `chr` prefix and fold mitochondrial aliases to `M`
///
/// Both UCSC (`chr1`, `chrM`) and NCBI (`1`, `MT`) names reduce to the same
/// short form, which is also what circos expects after the `hs` prefix.
#[must_use]
pub fn short_chrom_name(name: &str) -> &str {
    let trimmed = name.trim();
    let short = trimmed
        .strip_prefix("chr")
        .or_else(|| trimmed.strip_prefix("Chr"))
        .or_else(|| trimmed.strip_prefix("CHR"))
        .unwrap_or(trimmed);

    if short.eq_ignore_ascii_case("mt") || short.eq_ignore_ascii_case("m") {
        "M"
    } else {
        short
    }
}

/// Rank a chromosome name in the fixed biological order
#[must_use]
pub fn chrom_rank(name: &str) -> ChromRank {
    let short = short_chrom_name(name);
    match short {
        "X" | "x" => ChromRank::X,
        "Y" | "y" => ChromRank::Y,
        "M" => ChromRank::M,
        _ => match short.parse::<u8>() {
            Ok(n @ 1..=22) => ChromRank::Autosome(n),
            _ => ChromRank::Other(short.to_string()),
        },
    }
}

/// Contig id written to circos track files (`hs1`, `hsX`, `hsM`)
#[must_use]
pub fn circos_contig_id(name: &str) -> String {
    format!("hs{}", short_chrom_name(name))
}

/// Genomic order over variant keys: chromosome rank, then position
///
/// Alleles break ties so the order is total and deterministic.
#[must_use]
pub fn genomic_cmp(a: &VariantKey, b: &VariantKey) -> Ordering {
    chrom_rank(&a.chrom)
        .cmp(&chrom_rank(&b.chrom))
        .then(a.pos.cmp(&b.pos))
        .then_with(|| a.ref_allele.cmp(&b.ref_allele))
        .then_with(|| a.alt_allele.cmp(&b.alt_allele))
}
