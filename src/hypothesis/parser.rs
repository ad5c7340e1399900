//! Response parsing
//!
//! Generated text may wrap the JSON payload in prose or markdown fences,
//! and may nest the record under a `"hypothesis"` key. Every required field
//! is checked; nothing is defaulted except `keywords`.

use super::generator::FailureReason;
use super::record::HypothesisRecord;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").ok())
        .as_ref()
}

/// Locate the first JSON object in `text`, tolerating wrapper text
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let mut candidates: Vec<&str> = fence_regex()
        .map(|re| {
            re.captures_iter(text)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect()
        })
        .unwrap_or_default();
    candidates.push(text);

    for candidate in candidates {
        for (start, _) in candidate.match_indices('{') {
            // First complete value from here; trailing prose is ignored
            let mut stream = serde_json::Deserializer::from_str(&candidate[start..]).into_iter::<Value>();
            if let Some(Ok(Value::Object(map))) = stream.next() {
                return Some(map);
            }
        }
    }
    None
}

fn required_text(obj: &Map<String, Value>, key: &str) -> Result<String, FailureReason> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(FailureReason::Validation(format!("field '{}' is empty", key))),
        Some(_) => Err(FailureReason::Validation(format!("field '{}' is not a string", key))),
        None => Err(FailureReason::Validation(format!("missing field '{}'", key))),
    }
}

fn required_score(obj: &Map<String, Value>, key: &str) -> Result<f64, FailureReason> {
    let value = match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
        None => return Err(FailureReason::Validation(format!("missing field '{}'", key))),
    };
    match value {
        Some(v) if v.is_finite() && (0.0..=1.0).contains(&v) => Ok(v),
        Some(v) => Err(FailureReason::Validation(format!("{} = {} is outside [0, 1]", key, v))),
        None => Err(FailureReason::Validation(format!("field '{}' is not a number", key))),
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(|s| s.trim().to_string()))
            .collect::<Option<Vec<_>>>()
            .map(|v| v.into_iter().filter(|s| !s.is_empty()).collect()),
        Value::String(s) => Some(
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        ),
        _ => None,
    }
}

/// Parse and validate a hypothesis from raw generated text
pub fn parse_hypothesis(text: &str) -> Result<HypothesisRecord, FailureReason> {
    let root = extract_json_object(text)
        .ok_or_else(|| FailureReason::Parse("no JSON object found in response".to_string()))?;

    let obj = match root.get("hypothesis") {
        Some(Value::Object(inner)) => inner,
        _ => &root,
    };

    let next_steps = match obj.get("next_steps") {
        Some(value) => match string_list(value) {
            Some(steps) if !steps.is_empty() => steps,
            Some(_) => return Err(FailureReason::Validation("field 'next_steps' is empty".to_string())),
            None => {
                return Err(FailureReason::Validation(
                    "field 'next_steps' is not a list of strings".to_string(),
                ))
            }
        },
        None => return Err(FailureReason::Validation("missing field 'next_steps'".to_string())),
    };

    let keywords: BTreeSet<String> = obj
        .get("keywords")
        .and_then(string_list)
        .unwrap_or_default()
        .into_iter()
        .collect();

    Ok(HypothesisRecord {
        title: required_text(obj, "title")?,
        rationale: required_text(obj, "rationale")?,
        research_direction: required_text(obj, "research_direction")?,
        mechanism: required_text(obj, "mechanism")?,
        next_steps,
        novelty_score: required_score(obj, "novelty_score")?,
        feasibility_score: required_score(obj, "feasibility_score")?,
        impact_score: required_score(obj, "impact_score")?,
        keywords,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = r#"{"title": "Graph priors for soil",
        "rationale": "r", "research_direction": "d", "mechanism": "m",
        "next_steps": ["a", "b"], "novelty_score": 0.8,
        "feasibility_score": "0.5", "impact_score": 1}"#;

    #[test]
    fn test_flat_object_without_keywords() {
        let record = parse_hypothesis(FLAT).unwrap();
        assert_eq!(record.title, "Graph priors for soil");
        assert_eq!(record.next_steps, vec!["a", "b"]);
        assert_eq!(record.feasibility_score, 0.5);
        assert_eq!(record.impact_score, 1.0);
        assert!(record.keywords.is_empty());
    }

    #[test]
    fn test_nested_in_fence_with_prose() {
        let text = format!(
            "Sure! Here is my idea:\n```json\n{{\"hypothesis\": {}}}\n```\nHope it {{helps}}.",
            FLAT.replace("\"impact_score\": 1", "\"impact_score\": 1, \"keywords\": \"soil, graphs\"")
        );
        let record = parse_hypothesis(&text).unwrap();
        assert_eq!(record.impact_score, 1.0);
        assert_eq!(
            record.keywords.into_iter().collect::<Vec<_>>(),
            vec!["graphs".to_string(), "soil".to_string()]
        );
    }

    #[test]
    fn test_prose_around_bare_object() {
        let text = format!("Answer: {} -- end", FLAT);
        assert!(parse_hypothesis(&text).is_ok());
    }

    #[test]
    fn test_malformed_and_invalid() {
        assert!(matches!(parse_hypothesis("I cannot help with that."), Err(FailureReason::Parse(_))));
        assert!(matches!(parse_hypothesis("{\"title\": "), Err(FailureReason::Parse(_))));

        let missing = FLAT.replace("\"mechanism\": \"m\",", "");
        assert!(matches!(parse_hypothesis(&missing), Err(FailureReason::Validation(_))));

        let out_of_range = FLAT.replace("0.8", "1.8");
        assert!(matches!(parse_hypothesis(&out_of_range), Err(FailureReason::Validation(_))));

        let empty_title = FLAT.replace("Graph priors for soil", "  ");
        assert!(matches!(parse_hypothesis(&empty_title), Err(FailureReason::Validation(_))));
    }
}
