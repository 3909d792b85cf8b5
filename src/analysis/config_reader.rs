use crate::analysis::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::collections::BTreeMap;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "analysisName")]
    pub analysis_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "analysisDate")]
    pub analysis_date: Option<String>,
    #[serde(rename = "createdBy")]
    pub created_by: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub analysis: String,
    #[serde(rename = "createdBy")]
    pub created_by: String,
    pub date: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CriterionConfig {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// The area attribute read for this criterion. Defaults to the id.
    pub attribute: Option<String>,
}

impl CriterionConfig {
    pub fn attribute(&self) -> &str {
        self.attribute.as_deref().unwrap_or(self.id.as_str())
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    #[serde(rename = "criterionA")]
    pub criterion_a: String,
    #[serde(rename = "criterionB")]
    pub criterion_b: String,
    #[serde(rename = "comparisonType")]
    pub comparison_type: String,
    pub value: f64,
    pub preference: Option<String>,
}

impl ComparisonConfig {
    pub fn kind(&self) -> AppResult<ComparisonKind> {
        match self.comparison_type.as_str() {
            "criteria" => Ok(ComparisonKind::Criteria),
            "interdependency" => Ok(ComparisonKind::Interdependency),
            x => whatever!("unknown comparisonType: {:?}", x),
        }
    }

    pub fn preference(&self) -> AppResult<Preference> {
        match self.preference.as_deref() {
            None | Some("aOverB") => Ok(Preference::AOverB),
            Some("bOverA") => Ok(Preference::BOverA),
            Some(x) => whatever!("unknown preference: {:?}", x),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AreaConfig {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "trafficVolume")]
    pub traffic_volume: Option<String>,
    #[serde(rename = "reportCount")]
    pub report_count: Option<u64>,
    #[serde(rename = "roadWidth")]
    pub road_width: Option<f64>,
    /// Any other numeric attribute.
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DecisionMatrixSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "firstValueColumnIndex")]
    _first_value_column_index: Option<JSValue>,
    #[serde(rename = "firstRowIndex")]
    _first_row_index: Option<JSValue>,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

impl DecisionMatrixSource {
    /// A source with the default layout: a header row, ids in the first column.
    pub fn new(provider: &str, file_path: &str) -> DecisionMatrixSource {
        DecisionMatrixSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            id_column_index: Some(JSValue::from(1)),
            _first_value_column_index: None,
            _first_row_index: None,
            worksheet_name: None,
        }
    }

    /// 0-based index of the id column, if any.
    pub fn id_column_index_int(&self) -> AppResult<Option<usize>> {
        match &self.id_column_index {
            None => Ok(None),
            Some(_) => Ok(Some(read_js_int(&self.id_column_index)? - 1)),
        }
    }

    /// 0-based index of the first value. Defaults to the column right after the id.
    pub fn first_value_column_index(&self) -> AppResult<usize> {
        if self._first_value_column_index.is_some() {
            Ok(read_js_int(&self._first_value_column_index)? - 1)
        } else {
            Ok(self.id_column_index_int()?.map(|idx| idx + 1).unwrap_or(0))
        }
    }

    /// 0-based index of the first data row. Defaults to the row after the header.
    pub fn first_row_index(&self) -> AppResult<usize> {
        if self._first_row_index.is_some() {
            Ok(read_js_int(&self._first_row_index)? - 1)
        } else {
            Ok(1)
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub label: String,
    pub confidence: f64,
    pub severity: f64,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "maxIterations")]
    pub max_iterations: Option<u32>,
    pub tolerance: Option<f64>,
    #[serde(rename = "limitSquarings")]
    pub limit_squarings: Option<u32>,
    #[serde(rename = "limitTolerance")]
    pub limit_tolerance: Option<f64>,
    #[serde(rename = "consistencyThreshold")]
    pub consistency_threshold: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub criteria: Vec<CriterionConfig>,
    pub comparisons: Vec<ComparisonConfig>,
    #[serde(default)]
    pub areas: Vec<AreaConfig>,
    #[serde(rename = "decisionMatrixSource")]
    pub decision_matrix_source: Option<DecisionMatrixSource>,
    #[serde(default)]
    pub detections: Vec<DetectionConfig>,
    pub rules: Option<RulesConfig>,
}

pub fn read_config(path: &str) -> BAppResult<AnalysisConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: AnalysisConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

/// Reads a reference summary. The creation time is dropped since it changes on every run.
pub fn read_summary(path: String) -> BAppResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(without_timestamp(js))
}

pub fn without_timestamp(js: JSValue) -> JSValue {
    match js {
        JSValue::Object(mut obj) => {
            obj.remove("createdAt");
            JSValue::Object(obj)
        }
        x => x,
    }
}

// 1-based index, either a number or an Excel-style column name ("A", "AB").
fn read_js_int(x: &Option<JSValue>) -> AppResult<usize> {
    let res = match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {})?,
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_lowercase()
                .chars()
                .try_fold(0usize, |acc, c| {
                    acc.checked_mul(26)?
                        .checked_add(c as usize - 'a' as usize + 1)
                })
                .context(ParsingJsonNumberSnafu {})?
        }
        Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {})?,
        _ => None.context(ParsingJsonNumberSnafu {})?,
    };
    ensure!(res >= 1, ParsingJsonNumberSnafu {});
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_indexes() {
        assert_eq!(read_js_int(&Some(json!(3))).unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("4"))).unwrap(), 4);
        assert_eq!(read_js_int(&Some(json!("a"))).unwrap(), 1);
        assert_eq!(read_js_int(&Some(json!("C"))).unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("AB"))).unwrap(), 28);
        assert!(read_js_int(&Some(json!(0))).is_err());
        assert!(read_js_int(&Some(json!("x1"))).is_err());
        assert!(read_js_int(&None).is_err());
        assert!(read_js_int(&Some(json!("Z".repeat(40)))).is_err());
    }

    #[test]
    fn source_defaults() {
        let s = DecisionMatrixSource::new("csv", "areas.csv");
        assert_eq!(s.id_column_index_int().unwrap(), Some(0));
        assert_eq!(s.first_value_column_index().unwrap(), 1);
        assert_eq!(s.first_row_index().unwrap(), 1);

        let js = json!({"provider": "csv", "filePath": "x.csv", "firstValueColumnIndex": "C", "firstRowIndex": 3});
        let s: DecisionMatrixSource = serde_json::from_value(js).unwrap();
        assert_eq!(s.id_column_index_int().unwrap(), None);
        assert_eq!(s.first_value_column_index().unwrap(), 2);
        assert_eq!(s.first_row_index().unwrap(), 2);
    }

    #[test]
    fn comparison_kinds() {
        let js = json!({"criterionA": "a", "criterionB": "b", "comparisonType": "interdependency", "value": 3.0, "preference": "bOverA"});
        let c: ComparisonConfig = serde_json::from_value(js).unwrap();
        assert_eq!(c.kind().unwrap(), ComparisonKind::Interdependency);
        assert_eq!(c.preference().unwrap(), Preference::BOverA);
        let js = json!({"criterionA": "a", "criterionB": "b", "comparisonType": "other", "value": 3.0});
        let c: ComparisonConfig = serde_json::from_value(js).unwrap();
        assert!(c.kind().is_err());
        assert_eq!(c.preference().unwrap(), Preference::AOverB);
    }

    #[test]
    fn timestamp_is_dropped() {
        let js = without_timestamp(json!({"createdAt": "now", "converged": true}));
        assert_eq!(js, json!({"converged": true}));
    }
}
