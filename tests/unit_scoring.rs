// Unit tests for the composite scorer and the what-if weight boundary.
//
// Tests isolated pure functions: the score formula and its clamping, the
// penalty severity ordering, deterministic ranking, and override
// validation at the configuration boundary.

use chrono::NaiveDate;
use shortlist::models::{CandidateFeatures, Coverage, Flag};
use shortlist::scoring::{consistency_penalty, rank, score, ScoringWeights, WeightOverrides};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn features(semantic: f64, must: f64, nice: f64, flags: Vec<Flag>) -> CandidateFeatures {
    CandidateFeatures {
        semantic,
        coverage: Coverage {
            must_have_score: must,
            nice_to_have_score: nice,
            ..Default::default()
        },
        flags,
    }
}

fn gap_flag() -> Flag {
    Flag::EmploymentGap {
        from: date(2020, 1, 1),
        to: date(2020, 8, 1),
        days: 213,
    }
}

// ============================================================
// Score formula — bounds and clamping
// ============================================================

#[test]
fn final_score_bounded_for_extreme_inputs() {
    let weights = ScoringWeights::default();
    let cases = [
        features(1.0, 1.0, 1.0, vec![]),
        features(0.0, 0.0, 0.0, vec![]),
        features(f64::NAN, f64::INFINITY, -3.0, vec![]),
        features(2.5, 2.5, 2.5, vec![]),
    ];
    for f in cases {
        let scored = score("c", &f, &weights);
        assert!(
            (0.0..=1.0).contains(&scored.final_score),
            "score out of range: {}",
            scored.final_score
        );
        assert!(!scored.final_score.is_nan());
        assert!(!scored.semantic_score.is_nan());
    }
}

#[test]
fn heavy_penalty_clamps_to_zero_not_negative() {
    let flags: Vec<Flag> = (0..10)
        .map(|i| Flag::DuplicateEntry {
            label: format!("role{i}"),
            start: date(2019, 1, 1),
            end: None,
        })
        .collect();
    let f = features(0.01, 0.0, 0.0, flags);
    let weights = ScoringWeights {
        consistency: 50.0,
        ..Default::default()
    };
    let scored = score("c", &f, &weights);
    assert_eq!(scored.final_score, 0.0);
}

#[test]
fn default_weights_match_documented_values() {
    let w = ScoringWeights::default();
    assert_eq!(w.semantic, 0.40);
    assert_eq!(w.must_have, 0.40);
    assert_eq!(w.nice_to_have, 0.20);
    assert_eq!(w.consistency, 1.0);
}

// ============================================================
// Penalty severities
// ============================================================

#[test]
fn duplicate_outweighs_gap_outweighs_overlap() {
    let duplicate = consistency_penalty(&[Flag::DuplicateEntry {
        label: "acme".into(),
        start: date(2020, 1, 1),
        end: Some(date(2021, 1, 1)),
    }]);
    let gap = consistency_penalty(&[gap_flag()]);
    let overlap = consistency_penalty(&[Flag::OverlappingClaim {
        first: "acme".into(),
        second: "globex".into(),
        days: 120,
    }]);
    assert!(duplicate > gap, "{duplicate} vs {gap}");
    assert!(gap > overlap, "{gap} vs {overlap}");
}

#[test]
fn missing_skill_flags_carry_no_penalty() {
    let penalty = consistency_penalty(&[
        Flag::MissingRequiredSkill { term: "sql".into() },
        Flag::MissingRequiredSkill { term: "python".into() },
    ]);
    assert_eq!(penalty, 0.0);
}

#[test]
fn empty_flags_mean_zero_penalty() {
    assert_eq!(consistency_penalty(&[]), 0.0);
}

// ============================================================
// What-if overrides — validation and orthogonality
// ============================================================

#[test]
fn override_rejects_negative_weight_naming_field() {
    let err = ScoringWeights::default()
        .with_overrides(&WeightOverrides {
            nice_to_have_weight: Some(-1.0),
            ..Default::default()
        })
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("niceToHaveWeight"), "{message}");
    assert!(message.contains("negative"), "{message}");
}

#[test]
fn override_rejects_infinite_weight() {
    let err = ScoringWeights::default()
        .with_overrides(&WeightOverrides {
            semantic_weight: Some(f64::INFINITY),
            ..Default::default()
        })
        .unwrap_err();
    assert!(err.to_string().contains("semanticWeight"), "{err}");
}

#[test]
fn consistency_override_never_changes_feature_values() {
    let f = features(0.7, 0.5, 0.25, vec![gap_flag()]);
    let base = ScoringWeights::default();
    let adjusted = base
        .with_overrides(&WeightOverrides {
            consistency_weight: Some(3.0),
            ..Default::default()
        })
        .unwrap();

    let before = score("c", &f, &base);
    let after = score("c", &f, &adjusted);

    assert_eq!(before.semantic_score, after.semantic_score);
    assert_eq!(
        before.coverage.must_have_score,
        after.coverage.must_have_score
    );
    assert_eq!(
        before.coverage.nice_to_have_score,
        after.coverage.nice_to_have_score
    );
    assert_eq!(before.consistency_penalty, after.consistency_penalty);
    assert!(after.final_score < before.final_score);
}

// ============================================================
// Ranking — determinism and tie-breaks
// ============================================================

#[test]
fn equal_scores_break_on_must_have_coverage() {
    let w = ScoringWeights::default();
    // Both score exactly 0.4: one entirely from similarity, one entirely
    // from must-have coverage. Coverage wins the tie.
    let mut candidates = vec![
        score("semantic-heavy", &features(1.0, 0.0, 0.0, vec![]), &w),
        score("coverage-heavy", &features(0.0, 1.0, 0.0, vec![]), &w),
    ];
    assert_eq!(candidates[0].final_score, candidates[1].final_score);
    rank(&mut candidates);
    let order: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, vec!["coverage-heavy", "semantic-heavy"]);
}

#[test]
fn fully_tied_candidates_fall_back_to_id_order() {
    let w = ScoringWeights::default();
    let f = features(0.5, 0.8, 0.1, vec![]);
    let mut candidates = vec![
        score("zeta.pdf", &f, &w),
        score("alpha.pdf", &f, &w),
        score("mid.pdf", &f, &w),
    ];
    rank(&mut candidates);
    let order: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, vec!["alpha.pdf", "mid.pdf", "zeta.pdf"]);
}

#[test]
fn scoring_twice_is_bit_identical() {
    let f = features(0.6180339887, 0.5, 0.3333333333, vec![gap_flag()]);
    let w = ScoringWeights::default();
    let a = score("c", &f, &w);
    let b = score("c", &f, &w);
    assert_eq!(a.final_score.to_bits(), b.final_score.to_bits());
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
