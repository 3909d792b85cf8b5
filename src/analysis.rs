use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use repair_priority::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::analysis::config_reader::*;
use crate::analysis::io_common::ParsedRow;

pub mod areas;
pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum AppError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Empty or missing worksheet"))]
    EmptyExcel {},
    #[snafu(display("Unexpected cell type at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive integer or a column name"))]
    ParsingJsonNumber {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},

    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Line {lineno}: not a number: {content:?}"))]
    NotANumber { lineno: usize, content: String },
    #[snafu(display("Provider not implemented: {provider:?}"))]
    UnknownProvider { provider: String },

    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(display("Analysis failed: {source}"))]
    Analysis { source: PriorityErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AppResult<T> = Result<T, AppError>;
pub type BAppResult<T> = Result<T, Box<AppError>>;

fn validate_rules(rules_config: &Option<RulesConfig>) -> AppResult<SolverRules> {
    let d = SolverRules::DEFAULT_RULES;
    let res = match rules_config {
        None => d,
        Some(rc) => SolverRules {
            max_iterations: rc.max_iterations.unwrap_or(d.max_iterations),
            tolerance: rc.tolerance.unwrap_or(d.tolerance),
            limit_squarings: rc.limit_squarings.unwrap_or(d.limit_squarings),
            limit_tolerance: rc.limit_tolerance.unwrap_or(d.limit_tolerance),
            consistency_threshold: rc.consistency_threshold.unwrap_or(d.consistency_threshold),
        },
    };
    res.validate().context(AnalysisSnafu {})?;
    Ok(res)
}

fn validate_comparisons(comparisons: &[ComparisonConfig]) -> AppResult<Vec<PairwiseComparison>> {
    let mut res: Vec<PairwiseComparison> = Vec::with_capacity(comparisons.len());
    for c in comparisons.iter() {
        let pc = PairwiseComparison::new(&c.criterion_a, &c.criterion_b, c.kind()?, c.value)
            .with_preference(c.preference()?);
        res.push(pc);
    }
    Ok(res)
}

fn read_decision_rows(
    path: &str,
    source: &DecisionMatrixSource,
    num_values: usize,
) -> BAppResult<Vec<ParsedRow>> {
    info!("Attempting to read decision matrix file {:?}", path);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_matrix(path, source, num_values),
        "xlsx" => io_xlsx::read_xlsx_matrix(path, source, num_values),
        x => Err(Box::new(AppError::UnknownProvider {
            provider: x.to_string(),
        })),
    }
}

// The decision matrix source, with its resolved path. Command-line options take precedence
// over the configuration file; paths from the configuration are relative to its directory.
fn resolve_source(
    config: &AnalysisConfig,
    root_p: &Path,
    input: Option<String>,
    input_type: Option<String>,
    worksheet: Option<String>,
) -> Option<(String, DecisionMatrixSource)> {
    let (path, mut source) = match (input, config.decision_matrix_source.clone()) {
        (Some(input_p), Some(mut source)) => {
            source.file_path = input_p.clone();
            (input_p, source)
        }
        (Some(input_p), None) => {
            let provider = input_type.clone().unwrap_or_else(|| "csv".to_string());
            let source = DecisionMatrixSource::new(&provider, &input_p);
            (input_p, source)
        }
        (None, Some(source)) => {
            let p: PathBuf = root_p.join(&source.file_path);
            (p.as_path().display().to_string(), source)
        }
        (None, None) => return None,
    };
    if let Some(provider) = input_type {
        source.provider = provider;
    }
    if worksheet.is_some() {
        source.worksheet_name = worksheet;
    }
    Some((path, source))
}

fn f4(x: f64) -> String {
    format!("{:.4}", x)
}

fn build_summary_js(
    config: &AnalysisConfig,
    anp: &AnpResult,
    ranking: &[TopsisResult],
    labels: &[LabelRanking],
) -> JSValue {
    let c = OutputConfig {
        analysis: config.output_settings.analysis_name.clone(),
        created_by: anp.created_by.clone(),
        date: config.output_settings.analysis_date.clone(),
    };
    let criteria: Vec<JSValue> = anp
        .criteria
        .iter()
        .zip(anp.weights.iter())
        .map(|(crit, w)| {
            let mut m: JSMap<String, JSValue> = JSMap::new();
            m.insert("id".to_string(), json!(crit.id));
            m.insert("name".to_string(), json!(crit.name));
            m.insert("weight".to_string(), json!(f4(w.weight)));
            if let Some(lw) = w.limit_weight {
                m.insert("limitWeight".to_string(), json!(f4(lw)));
            }
            m.insert("rank".to_string(), json!(w.rank));
            JSValue::Object(m)
        })
        .collect();
    let ranking_js: Vec<JSValue> = ranking
        .iter()
        .map(|r| json!({"alternative": r.alternative_id, "score": f4(r.score), "rank": r.rank}))
        .collect();
    let labels_js: Vec<JSValue> = labels
        .iter()
        .map(|l| json!({"label": l.label, "score": f4(l.score), "rank": l.rank}))
        .collect();
    json!({
        "config": c,
        "criteria": criteria,
        "consistency": {
            "principalEigenvalue": f4(anp.consistency.principal_eigenvalue),
            "consistencyRatio": f4(anp.consistency_ratio()),
            "isConsistent": anp.is_consistent(),
        },
        "hasInterdependencies": anp.has_interdependencies,
        "converged": anp.converged,
        "ranking": ranking_js,
        "labels": labels_js,
        "createdAt": anp.created_at.to_rfc3339(),
    })
}

/// Weights the criteria, ranks the areas and the detection labels, and assembles the summary.
pub fn compute_summary(
    config: &AnalysisConfig,
    matrix_source: Option<(String, DecisionMatrixSource)>,
    created_at: DateTime<Utc>,
) -> BAppResult<JSValue> {
    let rules = validate_rules(&config.rules)?;
    debug!("compute_summary: rules: {:?}", rules);

    let criteria: Vec<Criterion> = config
        .criteria
        .iter()
        .map(|c| Criterion {
            id: c.id.clone(),
            name: c.name.clone(),
            description: c.description.clone().unwrap_or_default(),
        })
        .collect();
    let comparisons = validate_comparisons(&config.comparisons)?;
    let created_by = config
        .output_settings
        .created_by
        .clone()
        .unwrap_or_else(|| "roadrank".to_string());

    let anp = run_network_analysis(&criteria, &comparisons, &rules, &created_by, created_at)
        .context(AnalysisSnafu {})?;
    if !anp.is_consistent() {
        warn!(
            "The comparisons are inconsistent (consistency ratio {:.4} above {:.2}), consider revising them",
            anp.consistency_ratio(),
            rules.consistency_threshold
        );
    }
    if !anp.converged {
        warn!("The solver did not converge, the weights are approximate");
    }

    let (mut ids, mut decision) = areas::build_decision_matrix(&config.areas, &config.criteria)?;
    if let Some((path, source)) = matrix_source {
        for row in read_decision_rows(&path, &source, criteria.len())? {
            ids.push(row.id);
            decision.push(row.values);
        }
    }
    info!("Ranking {} areas", ids.len());

    let ranking = if ids.is_empty() {
        info!("No areas to rank");
        Vec::new()
    } else {
        rank_alternatives(&ids, &decision, &anp.final_weights()).context(AnalysisSnafu {})?
    };
    for r in ranking.iter() {
        debug!("compute_summary: {} {} {:.4}", r.rank, r.alternative_id, r.score);
    }

    let detections: Vec<DetectionLabel> = config
        .detections
        .iter()
        .map(|d| DetectionLabel {
            label: d.label.clone(),
            confidence: d.confidence,
            severity: d.severity,
        })
        .collect();
    let labels = rank_detection_labels(&detections).context(AnalysisSnafu {})?;

    Ok(build_summary_js(config, &anp, &ranking, &labels))
}

fn write_summary(
    pretty_js: &str,
    out: Option<String>,
    config: &AnalysisConfig,
    root_p: &Path,
) -> BAppResult<()> {
    let dest: Option<String> = match (out, &config.output_settings.output_directory) {
        (Some(o), _) => Some(o),
        (None, Some(dir)) => {
            let p: PathBuf = root_p.join(dir).join("summary.json");
            Some(p.as_path().display().to_string())
        }
        (None, None) => None,
    };
    match dest {
        Some(path) if path != "stdout" => {
            info!("Writing summary to {:?}", path);
            fs::write(&path, pretty_js).context(WritingSummarySnafu { path: path.clone() })?;
        }
        _ => {
            println!("{}", pretty_js);
        }
    }
    Ok(())
}

pub fn run_analysis(
    config_path: &str,
    check_summary_path: Option<String>,
    out: Option<String>,
    input: Option<String>,
    input_type: Option<String>,
    worksheet: Option<String>,
) -> BAppResult<()> {
    let config_p = Path::new(config_path);
    let config = read_config(config_path)?;
    info!("config: {:?}", config);

    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    let matrix_source = resolve_source(&config, root_p, input, input_type, worksheet);

    let result_js = compute_summary(&config, matrix_source, Utc::now())?;

    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_summary(&pretty_js_stats, out, &config, root_p)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        let pretty_js_checked = serde_json::to_string_pretty(&without_timestamp(result_js))
            .context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_checked {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_checked.as_ref(),
                "\n",
            );
            return Err(Box::new(AppError::ReferenceMismatch {}));
        }
        info!("The summary matches the reference");
    }

    Ok(())
}

#[cfg(test)]
fn run_analysis_test(test_name: &str, config_lpath: &str, summary_lpath: &str) {
    let test_dir = format!("{}/tests/data", env!("CARGO_MANIFEST_DIR"));
    info!("Running test {}", test_name);
    let res = run_analysis(
        &format!("{}/{}/{}", test_dir, test_name, config_lpath),
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        Some("stdout".to_string()),
        None,
        None,
        None,
    );
    if let Err(e) = res {
        eprintln!("An error occured {}", e);
        if let Some(bt) = snafu::ErrorCompat::backtrace(&*e) {
            eprintln!("trace: {}", bt);
        }
        panic!("test {} failed: {:?}", test_name, e);
    }
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    run_analysis_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}
