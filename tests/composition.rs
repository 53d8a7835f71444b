// Composition tests — the full pipeline from records to outcome.
//
// These exercise the data flow between modules: redaction -> similarity /
// coverage / timeline -> composite scoring -> ranking -> fairness audit,
// without any filesystem side effects (except the CSV export test, which
// writes to a temp directory).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shortlist::config::Config;
use shortlist::error::EngineError;
use shortlist::models::{CandidateRecord, Flag, JobRequirement, TimelineEntry};
use shortlist::output::export;
use shortlist::pipeline::{score_batch, score_batch_at};
use shortlist::scoring::{ScoringWeights, WeightOverrides};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn job(must: &[&str], nice: &[&str]) -> JobRequirement {
    JobRequirement {
        description: "Backend engineer building data pipelines with python and sql on kubernetes"
            .to_string(),
        must_have: must.iter().map(|s| s.to_string()).collect(),
        nice_to_have: nice.iter().map(|s| s.to_string()).collect(),
    }
}

fn entry(start: &str, end: Option<&str>, label: &str) -> TimelineEntry {
    TimelineEntry {
        start: start.to_string(),
        end: end.map(|s| s.to_string()),
        label: label.to_string(),
        span: None,
    }
}

fn record(id: &str, text: &str, skills: &[&str]) -> CandidateRecord {
    CandidateRecord {
        id: id.to_string(),
        text: text.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        timeline: vec![entry("2019-01-01", Some("2024-01-01"), "Engineer, Acme")],
        sensitive: BTreeMap::new(),
    }
}

// ============================================================
// The must-have scenario from the contract
// ============================================================

#[tokio::test]
async fn candidate_with_full_must_have_coverage_ranks_first() {
    let job = job(&["python", "sql"], &[]);
    // Identical text and timelines — only the skill sets differ
    let text = "Engineer building data services";
    let records = vec![
        record("x.pdf", text, &["python"]),
        record("y.pdf", text, &["python", "sql", "docker"]),
    ];

    let config = Config::default();
    let outcome = score_batch_at(&job, &records, &config, &ScoringWeights::default(), today())
        .await
        .unwrap();

    assert_eq!(outcome.ranked[0].id, "y.pdf");
    assert_eq!(outcome.ranked[0].coverage.must_have_score, 1.0);
    assert_eq!(outcome.ranked[1].coverage.must_have_score, 0.5);
    assert!(outcome.ranked[0].final_score > outcome.ranked[1].final_score);

    // The missing requirement is a visible flag, not just a lower number
    assert!(outcome.ranked[1]
        .flags
        .iter()
        .any(|f| matches!(f, Flag::MissingRequiredSkill { term } if term == "sql")));
}

#[tokio::test]
async fn empty_must_have_set_scores_one_for_everyone() {
    let job = job(&[], &["docker"]);
    let records = vec![
        record("a.pdf", "Kitchen manager", &[]),
        record("b.pdf", "Backend engineer with docker", &["docker"]),
    ];

    let config = Config::default();
    let outcome = score_batch_at(&job, &records, &config, &ScoringWeights::default(), today())
        .await
        .unwrap();

    for candidate in &outcome.ranked {
        assert_eq!(candidate.coverage.must_have_score, 1.0, "{}", candidate.id);
    }
}

// ============================================================
// Determinism and what-if orthogonality
// ============================================================

#[tokio::test]
async fn identical_runs_are_bit_identical() {
    let job = job(&["python", "sql"], &["docker", "kafka"]);
    let records = vec![
        record("a.pdf", "python and sql pipelines, kafka streaming", &["python", "sql"]),
        record("b.pdf", "sql reporting and docker deployment", &["sql", "docker"]),
        record("c.pdf", "unrelated retail management experience", &[]),
    ];

    let config = Config::default();
    let weights = ScoringWeights::default();
    let first = score_batch_at(&job, &records, &config, &weights, today())
        .await
        .unwrap();
    let second = score_batch_at(&job, &records, &config, &weights, today())
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first.ranked).unwrap(),
        serde_json::to_string(&second.ranked).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&first.fairness).unwrap(),
        serde_json::to_string(&second.fairness).unwrap()
    );
}

#[tokio::test]
async fn consistency_reweighting_preserves_feature_values() {
    let job = job(&["python"], &[]);
    let mut gappy = record("gappy.pdf", "python developer", &["python"]);
    gappy.timeline = vec![
        entry("2018-01-01", Some("2019-01-01"), "First Role"),
        entry("2020-01-01", Some("2024-01-01"), "Second Role"),
    ];
    let records = vec![gappy, record("steady.pdf", "python developer", &["python"])];

    let config = Config::default();
    let base = ScoringWeights::default();
    let baseline = score_batch_at(&job, &records, &config, &base, today())
        .await
        .unwrap();

    let adjusted = baseline
        .what_if(
            &base,
            &WeightOverrides {
                consistency_weight: Some(5.0),
                ..Default::default()
            },
            &config.fairness,
        )
        .unwrap();

    for candidate in &adjusted.ranked {
        let before = baseline
            .ranked
            .iter()
            .find(|c| c.id == candidate.id)
            .unwrap();
        assert_eq!(before.semantic_score, candidate.semantic_score);
        assert_eq!(
            before.coverage.must_have_score,
            candidate.coverage.must_have_score
        );
        assert_eq!(
            before.coverage.nice_to_have_score,
            candidate.coverage.nice_to_have_score
        );
    }

    // The gap now costs five times as much
    let gappy_before = baseline.ranked.iter().find(|c| c.id == "gappy.pdf").unwrap();
    let gappy_after = adjusted.ranked.iter().find(|c| c.id == "gappy.pdf").unwrap();
    assert!(gappy_after.final_score < gappy_before.final_score);
}

#[tokio::test]
async fn invalid_override_names_field_and_leaves_outcome_alone() {
    let job = job(&["python"], &[]);
    let records = vec![record("a.pdf", "python developer", &["python"])];

    let config = Config::default();
    let base = ScoringWeights::default();
    let baseline = score_batch_at(&job, &records, &config, &base, today())
        .await
        .unwrap();
    let snapshot = serde_json::to_string(&baseline.ranked).unwrap();

    let error = baseline
        .what_if(
            &base,
            &WeightOverrides {
                must_have_weight: Some(-2.0),
                ..Default::default()
            },
            &config.fairness,
        )
        .unwrap_err();

    assert!(matches!(error, EngineError::Config { ref field, .. } if field == "mustHaveWeight"));
    assert_eq!(snapshot, serde_json::to_string(&baseline.ranked).unwrap());
}

// ============================================================
// Input validation and exclusion
// ============================================================

#[tokio::test]
async fn empty_batch_is_rejected_before_scoring() {
    let config = Config::default();
    let result = score_batch(&job(&[], &[]), &[], &config, &ScoringWeights::default()).await;
    assert!(matches!(result, Err(EngineError::Input(_))));
}

#[tokio::test]
async fn blank_job_description_is_rejected() {
    let blank = JobRequirement {
        description: "  \n ".to_string(),
        must_have: vec!["python".to_string()],
        nice_to_have: Vec::new(),
    };
    let records = vec![record("a.pdf", "python developer", &["python"])];
    let config = Config::default();
    let result = score_batch(&blank, &records, &config, &ScoringWeights::default()).await;
    assert!(matches!(result, Err(EngineError::Input(_))));
}

#[tokio::test]
async fn unusable_candidate_is_excluded_not_fatal() {
    let job = job(&["python"], &[]);
    let empty = CandidateRecord {
        id: "blank.pdf".to_string(),
        text: "   ".to_string(),
        skills: Vec::new(),
        timeline: Vec::new(),
        sensitive: BTreeMap::new(),
    };
    let records = vec![empty, record("ok.pdf", "python developer", &["python"])];

    let config = Config::default();
    let outcome = score_batch_at(&job, &records, &config, &ScoringWeights::default(), today())
        .await
        .unwrap();

    assert_eq!(outcome.ranked.len(), 1);
    assert_eq!(outcome.ranked[0].id, "ok.pdf");
    assert_eq!(outcome.excluded.len(), 1);
    assert_eq!(outcome.excluded[0].id, "blank.pdf");
    assert_eq!(outcome.excluded[0].reason.as_str(), "no_usable_text");
}

#[tokio::test]
async fn oversized_batch_is_rejected() {
    let job = job(&[], &[]);
    let records: Vec<CandidateRecord> = (0..10)
        .map(|i| record(&format!("c{i}.pdf"), "text", &[]))
        .collect();
    let mut config = Config::default();
    config.limits.max_batch = 5;
    let result = score_batch(&job, &records, &config, &ScoringWeights::default()).await;
    assert!(matches!(result, Err(EngineError::Input(_))));
}

// ============================================================
// Sensitive attributes — quarantine and audit
// ============================================================

#[tokio::test]
async fn sensitive_attributes_never_touch_scores() {
    let job = job(&["python"], &[]);
    let mut with_attrs = record("a.pdf", "python developer", &["python"]);
    with_attrs
        .sensitive
        .insert("gender".to_string(), "f".to_string());
    let without_attrs = record("b.pdf", "python developer", &["python"]);
    let records = vec![with_attrs, without_attrs];

    let config = Config::default();
    let outcome = score_batch_at(&job, &records, &config, &ScoringWeights::default(), today())
        .await
        .unwrap();

    assert_eq!(
        outcome.ranked[0].final_score,
        outcome.ranked[1].final_score,
        "declaring a sensitive attribute must not move the score"
    );
}

#[tokio::test]
async fn skewed_pool_produces_disparate_impact_warning() {
    let job = job(&["python"], &[]);
    let mut records = Vec::new();
    // Group a candidates all match the requirement; group b candidates don't
    for i in 0..10 {
        let mut r = record(&format!("a{i:02}.pdf"), "python services", &["python"]);
        r.sensitive.insert("group".to_string(), "a".to_string());
        records.push(r);
    }
    for i in 0..10 {
        let mut r = record(&format!("b{i:02}.pdf"), "retail operations", &[]);
        r.sensitive.insert("group".to_string(), "b".to_string());
        records.push(r);
    }

    let mut config = Config::default();
    config.fairness.top_k = Some(10);
    let outcome = score_batch_at(&job, &records, &config, &ScoringWeights::default(), today())
        .await
        .unwrap();

    let audit = &outcome.fairness.audits[0];
    let b = audit.rows.iter().find(|r| r.group == "b").unwrap();
    assert_eq!(b.impact_ratio, Some(0.0));
    assert!(outcome
        .fairness
        .findings()
        .any(|f| matches!(f, shortlist::models::FairnessFinding::DisparateImpactWarning { .. })));

    // Advisory only: the ranking itself is untouched by the audit
    assert!(outcome.ranked.iter().take(10).all(|c| c.id.starts_with('a')));
}

// ============================================================
// Redaction feeds the similarity engine
// ============================================================

#[tokio::test]
async fn redacted_patterns_do_not_reach_the_vectorizer() {
    let mut job = job(&[], &[]);
    job.description = "Engineer role. Married candidates preferred.".to_string();
    // Both resumes are identical except for sensitive tokens that should
    // be stripped before vectorization
    let records = vec![
        record("plain.pdf", "Engineer building services", &[]),
        record(
            "marked.pdf",
            "Engineer building services. Married, 45 years old.",
            &[],
        ),
    ];

    let config = Config::default();
    let outcome = score_batch_at(&job, &records, &config, &ScoringWeights::default(), today())
        .await
        .unwrap();

    let plain = outcome.ranked.iter().find(|c| c.id == "plain.pdf").unwrap();
    let marked = outcome.ranked.iter().find(|c| c.id == "marked.pdf").unwrap();
    // "married" was redacted from both the job and the resume, so it can't
    // create a similarity edge between them
    assert!(
        (plain.semantic_score - marked.semantic_score).abs() < 0.15,
        "redacted tokens moved the semantic score: {} vs {}",
        plain.semantic_score,
        marked.semantic_score
    );
}

// ============================================================
// Timeout budget — partial results, never a bare failure
// ============================================================

#[tokio::test]
async fn expired_budget_reports_partial_outcome() {
    let job = job(&["python"], &[]);
    let filler = "rust python kubernetes pipeline engineering ".repeat(400);
    let records: Vec<CandidateRecord> = (0..100)
        .map(|i| record(&format!("c{i:03}.pdf"), &filler, &["python"]))
        .collect();

    let mut config = Config::default();
    config.limits.timeout_ms = 1;
    let outcome = score_batch_at(&job, &records, &config, &ScoringWeights::default(), today())
        .await
        .unwrap();

    // Regardless of how far the budget stretched, every candidate is
    // accounted for: ranked, or excluded with a timeout reason.
    let timeout_exclusions = outcome
        .excluded
        .iter()
        .filter(|e| e.reason.as_str() == "scoring_timeout")
        .count();
    assert_eq!(outcome.ranked.len() + timeout_exclusions, 100);
    if timeout_exclusions > 0 {
        assert!(outcome.timed_out);
    }
}

// ============================================================
// Export contract
// ============================================================

#[tokio::test]
async fn csv_export_is_stable_and_ordered() {
    let job = job(&["python", "sql"], &["docker"]);
    let records = vec![
        record("a.pdf", "python and sql pipelines", &["python", "sql"]),
        record("b.pdf", "python only", &["python"]),
    ];

    let config = Config::default();
    let outcome = score_batch_at(&job, &records, &config, &ScoringWeights::default(), today())
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("export_a.csv");
    let path_b = dir.path().join("export_b.csv");
    export::write_csv_file(&path_a, &outcome).unwrap();
    export::write_csv_file(&path_b, &outcome).unwrap();

    let a = std::fs::read_to_string(&path_a).unwrap();
    let b = std::fs::read_to_string(&path_b).unwrap();
    assert_eq!(a, b);

    let mut lines = a.lines();
    assert_eq!(lines.next().unwrap(), export::COLUMNS.join(","));
    let first_row = lines.next().unwrap();
    assert!(first_row.starts_with("1,a.pdf,"), "{first_row}");
    let second_row = lines.next().unwrap();
    assert!(second_row.starts_with("2,b.pdf,"), "{second_row}");
    assert!(second_row.contains("sql"), "{second_row}");
}
