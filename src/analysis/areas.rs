// Mapping of the configured areas onto the decision matrix.

use crate::analysis::*;

/// Numeric value of one attribute of an area.
///
/// `trafficVolume` is ordinal: low, medium and high map to 1, 2 and 3.
pub fn area_value(area: &AreaConfig, attribute: &str) -> AppResult<f64> {
    let value = match attribute {
        "trafficVolume" => match area.traffic_volume.as_deref() {
            Some("low") => Some(1.0),
            Some("medium") => Some(2.0),
            Some("high") => Some(3.0),
            Some(x) => whatever!("area {}: unknown traffic volume {:?}", area.id, x),
            None => None,
        },
        "reportCount" => area.report_count.map(|c| c as f64),
        "roadWidth" => area.road_width,
        x => area.extra.get(x).cloned(),
    };
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => whatever!("area {}: invalid value for {}: {}", area.id, attribute, v),
        None => whatever!("area {}: no value for attribute {}", area.id, attribute),
    }
}

/// One row per area, one column per criterion in the order of the criteria.
pub fn build_decision_matrix(
    areas: &[AreaConfig],
    criteria: &[CriterionConfig],
) -> AppResult<(Vec<String>, Vec<Vec<f64>>)> {
    let mut ids: Vec<String> = Vec::with_capacity(areas.len());
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(areas.len());
    for area in areas.iter() {
        let row = criteria
            .iter()
            .map(|c| area_value(area, c.attribute()))
            .collect::<AppResult<Vec<f64>>>()?;
        debug!("build_decision_matrix: {}: {:?}", area.id, row);
        ids.push(area.id.clone());
        rows.push(row);
    }
    Ok((ids, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn area(js: JSValue) -> AreaConfig {
        serde_json::from_value(js).unwrap()
    }

    fn criterion(id: &str, attribute: Option<&str>) -> CriterionConfig {
        CriterionConfig {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            attribute: attribute.map(|s| s.to_string()),
        }
    }

    #[test]
    fn attributes() {
        let a = area(json!({"id": "main-street", "trafficVolume": "medium", "reportCount": 4, "roadWidth": 6.5, "extra": {"potholes": 2.0}}));
        assert_eq!(area_value(&a, "trafficVolume").unwrap(), 2.0);
        assert_eq!(area_value(&a, "reportCount").unwrap(), 4.0);
        assert_eq!(area_value(&a, "roadWidth").unwrap(), 6.5);
        assert_eq!(area_value(&a, "potholes").unwrap(), 2.0);
        assert!(area_value(&a, "age").is_err());
    }

    #[test]
    fn bad_values() {
        let a = area(json!({"id": "x", "trafficVolume": "jammed", "roadWidth": -1.0}));
        assert!(area_value(&a, "trafficVolume").is_err());
        assert!(area_value(&a, "roadWidth").is_err());
        assert!(area_value(&a, "reportCount").is_err());
    }

    #[test]
    fn matrix_follows_criteria_order() {
        let areas = vec![
            area(json!({"id": "a", "trafficVolume": "high", "reportCount": 12})),
            area(json!({"id": "b", "trafficVolume": "low", "reportCount": 3})),
        ];
        let criteria = vec![
            criterion("reportCount", None),
            criterion("traffic", Some("trafficVolume")),
        ];
        let (ids, rows) = build_decision_matrix(&areas, &criteria).unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(rows, vec![vec![12.0, 3.0], vec![3.0, 1.0]]);
    }
}
