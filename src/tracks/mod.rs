//! Allelic track building for the circular genome map.
//!
//! The unified counts table has one row per locus and sample:
//!
//! | Column (0-based) | Content |
//! |------------------|---------|
//! | 0-3              | chromosome, position, reference, alternate |
//! | 4                | sample tag (alignment file name) |
//! | 13               | allele frequency |
//!
//! Each row's sample tag is classified with the same role regexes used for
//! input filenames. Values are grouped by locus, loci are ordered by
//! chromosome (1..22, X, Y, M) then position, and one file of
//! `hs<chrom>\t<pos>\t<pos>\t<value>` lines is written per role.

pub mod builder;
pub mod counts;

pub use builder::{track_file_name, AllelicTracks, TrackFiles};
pub use counts::TrackError;
