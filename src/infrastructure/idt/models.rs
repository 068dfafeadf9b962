//! IDT wire payloads and projection of loosely typed results

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::{GuideCandidate, GuideSet};

/// Custom design request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomDesignRequest<'a> {
    pub input_mode: &'a str,
    pub species: &'a str,
    pub input_sequences: String,
    pub result_count: u32,
}

impl<'a> CustomDesignRequest<'a> {
    /// Wrap a bare sequence in a single FASTA record
    pub fn fasta(sequence: &str, species: &'a str, result_count: u32) -> Self {
        Self {
            input_mode: "FASTA",
            species,
            input_sequences: format!(">target_region\n{}", sequence),
            result_count,
        }
    }
}

/// Sequence checker request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SequenceCheckRequest<'a> {
    pub species: &'a str,
    pub sequences: Vec<&'a str>,
}

/// Predesigned lookup request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PredesignRequest<'a> {
    pub species: &'a str,
    pub gene_symbol_or_accession: &'a str,
    pub result_count: u32,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    #[allow(dead_code)]
    pub token_type: Option<String>,
}

/// Lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_EXPIRES_IN: i64 = 3600;

const SEQUENCE_KEYS: &[&str] = &["Sequence", "sequence", "GuideSequence"];
const ON_TARGET_KEYS: &[&str] = &["OnTargetScore", "onTargetScore"];
const OFF_TARGET_KEYS: &[&str] = &["OffTargetScore", "offTargetScore"];
const POSITION_KEYS: &[&str] = &["Position", "position"];
const STRAND_KEYS: &[&str] = &["Strand", "strand"];
const DESIGN_ID_KEYS: &[&str] = &["DesignId", "designId"];

/// Project a design or predesign payload: a bare array, or an object holding
/// `Guides` or `Results`.
pub fn project_guides(payload: &Value) -> GuideSet {
    let items = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("Guides")
            .or_else(|| map.get("Results"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };
    GuideSet::new(items.iter().map(project_candidate).collect())
}

/// Project a checker payload: a bare array, an object holding `Results`, or a
/// single result object.
pub fn project_check(payload: &Value) -> GuideSet {
    match payload {
        Value::Array(items) => GuideSet::new(items.iter().map(project_candidate).collect()),
        Value::Object(map) => match map.get("Results").and_then(Value::as_array) {
            Some(items) => GuideSet::new(items.iter().map(project_candidate).collect()),
            None => GuideSet::new(vec![project_candidate(payload)]),
        },
        _ => GuideSet::default(),
    }
}

fn project_candidate(item: &Value) -> GuideCandidate {
    GuideCandidate {
        sequence: text_field(item, SEQUENCE_KEYS),
        on_target: score_field(item, ON_TARGET_KEYS),
        off_target: score_field(item, OFF_TARGET_KEYS),
        position: text_field(item, POSITION_KEYS),
        strand: text_field(item, STRAND_KEYS),
        design_id: text_field(item, DESIGN_ID_KEYS),
    }
}

fn first_present<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .find(|v| !v.is_null())
}

fn text_field(item: &Value, keys: &[&str]) -> Option<String> {
    match first_present(item, keys)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn score_field(item: &Value, keys: &[&str]) -> Option<f64> {
    let score = match first_present(item, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score.filter(|s| s.is_finite())
}
