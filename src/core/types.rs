use serde::Serialize;

/// One of the four sequencing samples taken from a single individual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleRole {
    /// Germline/normal DNA
    NormalDna,
    /// Normal transcriptome
    NormalRna,
    /// Somatic/tumor DNA
    TumorDna,
    /// Tumor transcriptome
    TumorRna,
}

impl SampleRole {
    /// All roles in classification order
    pub const ALL: [SampleRole; 4] = [
        SampleRole::NormalDna,
        SampleRole::NormalRna,
        SampleRole::TumorDna,
        SampleRole::TumorRna,
    ];

    /// Short code used in track file names (`<prefix>_<code>.txt`)
    #[must_use]
    pub fn track_code(self) -> &'static str {
        match self {
            Self::NormalDna => "Nex",
            Self::NormalRna => "Ntr",
            Self::TumorDna => "Tex",
            Self::TumorRna => "Ttr",
        }
    }

    /// Name of the command-line option holding this role's regex
    #[must_use]
    pub fn option_name(self) -> &'static str {
        match self {
            Self::NormalDna => "normaldnare",
            Self::NormalRna => "normaltransre",
            Self::TumorDna => "tumordnare",
            Self::TumorRna => "tumortransre",
        }
    }
}

impl std::fmt::Display for SampleRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NormalDna => write!(f, "normal DNA"),
            Self::NormalRna => write!(f, "normal RNA"),
            Self::TumorDna => write!(f, "tumor DNA"),
            Self::TumorRna => write!(f, "tumor RNA"),
        }
    }
}

/// Category of asymmetric-allele finding produced by SNV computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventType {
    #[serde(rename = "RNAed")]
    RnaEditing,
    #[serde(rename = "T-RNAed")]
    TumorRnaEditing,
    #[serde(rename = "VSE")]
    VariantSpecificExpression,
    #[serde(rename = "T-VSE")]
    TumorVariantSpecificExpression,
    #[serde(rename = "VSL")]
    VariantSpecificLoss,
    #[serde(rename = "T-VSL")]
    TumorVariantSpecificLoss,
    #[serde(rename = "LOH")]
    LossOfHeterozygosity,
    #[serde(rename = "SOM")]
    Somatic,
    #[serde(rename = "SOM-E")]
    SomaticExpressed,
    #[serde(rename = "SOM-L")]
    SomaticLost,
}

impl EventType {
    /// Every event type, in the order they are summarized
    pub const ALL: [EventType; 10] = [
        EventType::RnaEditing,
        EventType::TumorRnaEditing,
        EventType::VariantSpecificExpression,
        EventType::TumorVariantSpecificExpression,
        EventType::VariantSpecificLoss,
        EventType::TumorVariantSpecificLoss,
        EventType::LossOfHeterozygosity,
        EventType::Somatic,
        EventType::SomaticExpressed,
        EventType::SomaticLost,
    ];

    /// Short name as it appears in event file names
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::RnaEditing => "RNAed",
            Self::TumorRnaEditing => "T-RNAed",
            Self::VariantSpecificExpression => "VSE",
            Self::TumorVariantSpecificExpression => "T-VSE",
            Self::VariantSpecificLoss => "VSL",
            Self::TumorVariantSpecificLoss => "T-VSL",
            Self::LossOfHeterozygosity => "LOH",
            Self::Somatic => "SOM",
            Self::SomaticExpressed => "SOM-E",
            Self::SomaticLost => "SOM-L",
        }
    }

    /// File name written by the SNV computation stage
    #[must_use]
    pub fn file_name(self) -> String {
        format!("Events_{}.tsv", self.code())
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Identifies one SNV locus across all input files
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VariantKey {
    pub chrom: String,
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
}

impl VariantKey {
    pub fn new(
        chrom: impl Into<String>,
        pos: u64,
        ref_allele: impl Into<String>,
        alt_allele: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            ref_allele: ref_allele.into(),
            alt_allele: alt_allele.into(),
        }
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.chrom, self.pos, self.ref_allele, self.alt_allele
        )
    }
}
