use clap::Parser;

/// Ranks damaged road areas for repair.
///
/// The criteria are weighted from pairwise comparisons (AHP, or ANP when interdependencies
/// between the criteria are given) and the areas are ranked with TOPSIS.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON file describing the analysis: criteria, comparisons, areas and rules.
    /// See the manual of the repair_priority crate for the format.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference summary in JSON format. If provided, roadrank checks that the
    /// computed summary matches it (the creation time is ignored) and fails otherwise.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary is written in JSON format to the
    /// given location. Setting this option overrides the outputDirectory of the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) A decision matrix file, one row per area. Setting this option
    /// overrides the file given by the decisionMatrixSource of the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx, default csv) The type of the input.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
