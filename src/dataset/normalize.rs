//! Mapping of upstream JSON rows onto canonical records.
//!
//! Survey exports arrive with several naming conventions (spreadsheet
//! headers such as `RespondentID`/`Employment_type`, API camelCase such as
//! `responseId`/`ageGroup`, and snake_case database columns). This is the
//! only place that knows about them. Values that cannot be interpreted
//! become missing instead of failing the row.

use crate::constants::{
    dimension_by_id, CAPABILITY_DIMENSIONS, SENTIMENT_QUESTION_COUNT, SENTIMENT_REASONS,
};
use crate::models::{
    construct_position, CapabilityResponse, CapabilityScore, Demographics, SentimentReason,
    SentimentResponse,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type Row = Map<String, Value>;

const RESPONSE_ID_KEYS: &[&str] = &[
    "RespondentID",
    "responseId",
    "respondent_id",
    "response_id",
    "id",
];
const COMPANY_KEYS: &[&str] = &["company_id", "companyId", "CompanyID"];
const REGION_KEYS: &[&str] = &["Region", "region"];
const DEPARTMENT_KEYS: &[&str] = &["Department", "department"];
const FUNCTION_KEYS: &[&str] = &["Function", "function"];
const ROLE_KEYS: &[&str] = &["Employment_type", "employment_type", "role", "Role"];
const AGE_KEYS: &[&str] = &["Age", "age", "ageGroup", "age_group"];
const BUSINESS_UNIT_KEYS: &[&str] = &["businessUnit", "business_unit", "BusinessUnit"];
const INDUSTRY_KEYS: &[&str] = &["Industry", "industry"];
const CONTINENT_KEYS: &[&str] = &["Continent", "continent"];
const LEVEL_KEYS: &[&str] = &["sentimentLevel", "sentiment_level", "SentimentLevel"];
const REASON_KEYS: &[&str] = &["sentimentReason", "sentiment_reason", "SentimentReason"];
const FEEDBACK_KEYS: &[&str] = &["openFeedback", "open_feedback", "open_response_1"];

/// Interpret a JSON value as a number; numeric strings are accepted.
pub fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Interpret a JSON value as a non-empty categorical string.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First key present with a usable value.
fn first<T>(row: &Row, keys: &[&str], parse: impl Fn(&Value) -> Option<T>) -> Option<T> {
    keys.iter().find_map(|key| row.get(*key).and_then(&parse))
}

fn first_text(row: &Row, keys: &[&str]) -> Option<String> {
    first(row, keys, text)
}

fn first_number(row: &Row, keys: &[&str]) -> Option<f64> {
    first(row, keys, number)
}

/// Parse a reason given as `R3`, `3` or its label.
pub fn parse_reason(value: &Value) -> Option<SentimentReason> {
    if let Some(n) = number(value) {
        return (n.fract() == 0.0 && n >= 1.0)
            .then(|| n as usize - 1)
            .and_then(SentimentReason::from_index);
    }

    let raw = value.as_str()?.trim();
    let digits = raw.strip_prefix(['R', 'r']).unwrap_or(raw);
    if let Ok(n) = digits.parse::<usize>() {
        return n.checked_sub(1).and_then(SentimentReason::from_index);
    }

    SENTIMENT_REASONS
        .iter()
        .position(|label| label.eq_ignore_ascii_case(raw))
        .and_then(SentimentReason::from_index)
}

fn parse_level(value: &Value) -> Option<u8> {
    let level = number(value)?;
    (level.fract() == 0.0 && (1.0..=5.0).contains(&level)).then_some(level as u8)
}

fn response_id(row: &Row, index: usize) -> String {
    first_text(row, RESPONSE_ID_KEYS).unwrap_or_else(|| format!("row-{}", index + 1))
}

fn demographics(row: &Row) -> Demographics {
    Demographics {
        region: first_text(row, REGION_KEYS),
        department: first_text(row, DEPARTMENT_KEYS),
        function: first_text(row, FUNCTION_KEYS),
        role: first_text(row, ROLE_KEYS),
        age_group: first_text(row, AGE_KEYS),
        business_unit: first_text(row, BUSINESS_UNIT_KEYS),
        industry: first_text(row, INDUSTRY_KEYS),
        continent: first_text(row, CONTINENT_KEYS),
    }
}

/// Map one sentiment row. `index` names rows that carry no id.
pub fn sentiment_from_row(row: &Row, index: usize) -> SentimentResponse {
    let mut scores = [None; SENTIMENT_QUESTION_COUNT];
    for (i, slot) in scores.iter_mut().enumerate() {
        let lower = format!("sentiment_{}", i + 1);
        let upper = format!("Sentiment_{}", i + 1);
        *slot = first_number(row, &[lower.as_str(), upper.as_str()]);
    }

    SentimentResponse {
        response_id: response_id(row, index),
        company_id: first_text(row, COMPANY_KEYS),
        demographics: demographics(row),
        sentiment_level: first(row, LEVEL_KEYS, parse_level),
        sentiment_reason: first(row, REASON_KEYS, parse_reason),
        scores,
    }
}

/// Map one wide capability row.
///
/// Construct scores are read from `{dimensionKey}_C{n}` columns, falling
/// back to `construct_{id}`.
pub fn capability_from_row(row: &Row, index: usize) -> CapabilityResponse {
    let mut record = CapabilityResponse {
        response_id: response_id(row, index),
        company_id: first_text(row, COMPANY_KEYS),
        demographics: demographics(row),
        open_feedback: first_text(row, FEEDBACK_KEYS),
        ..Default::default()
    };

    for dim in &CAPABILITY_DIMENSIONS {
        for (position, construct_id) in dim.constructs.iter().enumerate() {
            let wide = format!("{}_C{}", dim.key, position + 1);
            let numbered = format!("construct_{}", construct_id);
            record.set_construct(
                *construct_id,
                first_number(row, &[wide.as_str(), numbered.as_str()]),
            );
        }
    }

    record
}

/// Map one long-format score row.
///
/// Rows without a respondent, a construct id in 1-32 or a numeric score
/// are skipped. A missing `dimension_id` is derived from the construct.
pub fn score_from_row(row: &Row) -> Option<CapabilityScore> {
    let respondent_id = first_text(row, &["respondent_id", "RespondentID", "respondentId"])?;
    let construct_id = first(row, &["construct_id", "constructId"], number)
        .filter(|n| n.fract() == 0.0 && (1.0..=32.0).contains(n))? as u8;
    let score = first_number(row, &["score", "Score"])?;

    let derived = construct_position(construct_id).map(|(dim, _)| dim as u8 + 1)?;
    let dimension_id = first(row, &["dimension_id", "dimensionId"], number)
        .filter(|n| n.fract() == 0.0 && (1.0..=8.0).contains(n))
        .map(|n| n as u8)
        .filter(|id| dimension_by_id(*id).is_some())
        .unwrap_or(derived);

    Some(CapabilityScore {
        respondent_id,
        company_id: first_text(row, COMPANY_KEYS).unwrap_or_default(),
        dimension_id,
        construct_id,
        score,
        industry_synthetic: first_text(row, &["industry_synthetic", "industry"]),
        country_synthetic: first_text(row, &["country_synthetic", "country", "region"]),
        continent_synthetic: first_text(row, &["continent_synthetic", "continent"]),
        role_synthetic: first_text(row, &["role_synthetic", "role"]),
    })
}

/// Pivot long-format scores into one wide record per respondent.
///
/// The synthetic slice attributes become demographics: country as region,
/// role as role. Respondents keep first-seen order.
pub fn pivot_scores(scores: &[CapabilityScore]) -> Vec<CapabilityResponse> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_respondent: BTreeMap<&str, CapabilityResponse> = BTreeMap::new();

    for score in scores {
        let record = by_respondent
            .entry(score.respondent_id.as_str())
            .or_insert_with(|| {
                order.push(score.respondent_id.as_str());
                CapabilityResponse {
                    response_id: score.respondent_id.clone(),
                    company_id: (!score.company_id.is_empty()).then(|| score.company_id.clone()),
                    demographics: Demographics {
                        region: score.country_synthetic.clone(),
                        role: score.role_synthetic.clone(),
                        industry: score.industry_synthetic.clone(),
                        continent: score.continent_synthetic.clone(),
                        ..Default::default()
                    },
                    ..Default::default()
                }
            });
        record.set_construct(score.construct_id, Some(score.score));
    }

    order
        .into_iter()
        .filter_map(|id| by_respondent.remove(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("test rows must be objects"),
        }
    }

    #[test]
    fn test_spreadsheet_style_sentiment_row() {
        let record = sentiment_from_row(
            &row(json!({
                "RespondentID": "R-17",
                "Region": "North",
                "Department": "Finance",
                "Employment_type": "Manager",
                "Age": "35-44",
                "Sentiment_1": 2,
                "sentiment_25": "4.5",
                "sentiment_3": "n/a"
            })),
            0,
        );

        assert_eq!(record.response_id, "R-17");
        assert_eq!(record.demographics.region.as_deref(), Some("North"));
        assert_eq!(record.demographics.role.as_deref(), Some("Manager"));
        assert_eq!(record.demographics.age_group.as_deref(), Some("35-44"));
        assert_eq!(record.question_score(1), Some(2.0));
        assert_eq!(record.question_score(25), Some(4.5));
        assert_eq!(record.question_score(3), None);
        assert_eq!(record.coordinate(), None);
    }

    #[test]
    fn test_api_style_sentiment_row() {
        let record = sentiment_from_row(
            &row(json!({
                "responseId": "resp-1",
                "region": "South",
                "ageGroup": "25-34",
                "businessUnit": "Retail",
                "sentimentLevel": 3,
                "sentimentReason": "R2"
            })),
            4,
        );

        assert_eq!(record.response_id, "resp-1");
        assert_eq!(record.demographics.business_unit.as_deref(), Some("Retail"));
        assert_eq!(record.coordinate(), Some((3, SentimentReason::R2)));
    }

    #[test]
    fn test_missing_id_uses_row_number() {
        let record = sentiment_from_row(&Row::new(), 4);
        assert_eq!(record.response_id, "row-5");
    }

    #[test]
    fn test_reason_variants() {
        assert_eq!(parse_reason(&json!("R3")), Some(SentimentReason::R3));
        assert_eq!(parse_reason(&json!("r5")), Some(SentimentReason::R5));
        assert_eq!(parse_reason(&json!("1")), Some(SentimentReason::R1));
        assert_eq!(parse_reason(&json!(4)), Some(SentimentReason::R4));
        assert_eq!(parse_reason(&json!(3.0)), Some(SentimentReason::R3));
        assert_eq!(parse_reason(&json!(2.5)), None);
        assert_eq!(parse_reason(&json!(-1)), None);
        assert_eq!(
            parse_reason(&json!(SENTIMENT_REASONS[1])),
            Some(SentimentReason::R2)
        );
        assert_eq!(parse_reason(&json!("R9")), None);
        assert_eq!(parse_reason(&json!("R0")), None);
        assert_eq!(parse_reason(&json!(null)), None);
    }

    #[test]
    fn test_level_out_of_range_is_missing() {
        let record = sentiment_from_row(
            &row(json!({"sentimentLevel": 7, "sentimentReason": "R1"})),
            0,
        );
        assert_eq!(record.sentiment_level, None);
        let record = sentiment_from_row(
            &row(json!({"sentiment_level": "2", "sentimentReason": "R1"})),
            0,
        );
        assert_eq!(record.sentiment_level, Some(2));
    }

    #[test]
    fn test_capability_row_key_variants() {
        let record = capability_from_row(
            &row(json!({
                "responseId": "cap-1",
                "data_C1": 4,
                "construct_6": 3,
                "ethics_C4": "5"
            })),
            0,
        );

        assert_eq!(record.construct_score(1, 0), Some(4.0));
        assert_eq!(record.score_by_construct_id(6), Some(3.0));
        assert_eq!(record.score_by_construct_id(32), Some(5.0));
        assert_eq!(record.score_by_construct_id(1), None);
    }

    #[test]
    fn test_score_row() {
        let score = score_from_row(&row(json!({
            "respondent_id": "r1",
            "company_id": "acme",
            "construct_id": 10,
            "score": 3.5,
            "country_synthetic": "NL"
        })))
        .unwrap();
        assert_eq!(score.dimension_id, 3);
        assert_eq!(score.company_id, "acme");
        assert_eq!(score.country_synthetic.as_deref(), Some("NL"));

        let unknown_construct = json!({"respondent_id": "r1", "construct_id": 40, "score": 1});
        assert!(score_from_row(&row(unknown_construct)).is_none());
        assert!(score_from_row(&row(json!({"respondent_id": "r1", "construct_id": 4}))).is_none());
    }

    #[test]
    fn test_invalid_dimension_id_falls_back_to_construct() {
        for dimension_id in [json!(2.7), json!(300), json!(-1), json!(9)] {
            let score = score_from_row(&row(json!({
                "respondent_id": "r1",
                "construct_id": 10,
                "dimension_id": dimension_id,
                "score": 3
            })))
            .unwrap();
            assert_eq!(score.dimension_id, 3);
        }

        let score = score_from_row(&row(json!({
            "respondent_id": "r1",
            "construct_id": 10,
            "dimensionId": 5.0,
            "score": 3
        })))
        .unwrap();
        assert_eq!(score.dimension_id, 5);
    }

    #[test]
    fn test_pivot_scores() {
        let rows = [
            json!({
                "respondent_id": "b",
                "construct_id": 1,
                "score": 2,
                "role_synthetic": "Analyst"
            }),
            json!({"respondent_id": "a", "construct_id": 5, "score": 4}),
            json!({"respondent_id": "b", "construct_id": 32, "score": 5}),
        ];
        let scores: Vec<_> = rows
            .into_iter()
            .map(|value| score_from_row(&row(value)).unwrap())
            .collect();
        let wide = pivot_scores(&scores);

        assert_eq!(wide.len(), 2);
        assert_eq!(wide[0].response_id, "b");
        assert_eq!(wide[0].demographics.role.as_deref(), Some("Analyst"));
        assert_eq!(wide[0].score_by_construct_id(1), Some(2.0));
        assert_eq!(wide[0].score_by_construct_id(32), Some(5.0));
        assert_eq!(wide[1].score_by_construct_id(5), Some(4.0));
        assert_eq!(wide[1].company_id, None);
    }
}
