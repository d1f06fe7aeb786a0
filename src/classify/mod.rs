//! Sample classification by filename regular expressions.
//!
//! Each input file, and each sample tag embedded in the counts table, belongs
//! to exactly one of four sample roles:
//!
//! | Role       | Option            | Default | Track code |
//! |------------|-------------------|---------|------------|
//! | Normal DNA | `--normaldnare`   | `NTex`  | `Nex`      |
//! | Normal RNA | `--normaltransre` | `NTtr`  | `Ntr`      |
//! | Tumor DNA  | `--tumordnare`    | `TPex`  | `Tex`      |
//! | Tumor RNA  | `--tumortransre`  | `TPtr`  | `Ttr`      |
//!
//! Matching is an unanchored regex search. A name that matches no pattern, or
//! more than one, is rejected; ties are never broken by evaluation order.

pub mod classifier;

pub use classifier::{ClassifyError, SampleClassifier};
