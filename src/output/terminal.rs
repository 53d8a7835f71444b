// Colored terminal output for ranked batches and fairness reports.
//
// All terminal-specific formatting lives here; main.rs delegates after
// running the pipeline.

use colored::Colorize;

use crate::models::{FairnessReport, ScoredCandidate, ScoringOutcome, Verdict};

/// Display the ranked candidate table.
pub fn display_ranking(outcome: &ScoringOutcome) {
    if outcome.ranked.is_empty() {
        println!("No candidates were scored.");
        display_exclusions(outcome);
        return;
    }

    println!(
        "\n{}",
        format!("=== Ranked Candidates ({}) ===", outcome.ranked.len()).bold()
    );
    if outcome.timed_out {
        println!(
            "  {}",
            "Incomplete batch: the scoring budget expired before every candidate finished."
                .yellow()
        );
    }
    println!();

    println!(
        "  {:>4}  {:<28} {:>6}  {:>9}  {:>6}  {:>6}  {:>8}  {}",
        "Rank".dimmed(),
        "Candidate".dimmed(),
        "Score".dimmed(),
        "Semantic".dimmed(),
        "Must".dimmed(),
        "Nice".dimmed(),
        "Penalty".dimmed(),
        "Flags".dimmed(),
    );
    println!("  {}", "-".repeat(92).dimmed());

    for (i, candidate) in outcome.ranked.iter().enumerate() {
        let flags = flag_summary(candidate);
        println!(
            "  {:>4}. {:<28} {:>6.3}  {:>9.3}  {:>6.2}  {:>6.2}  {:>8.3}  {}",
            i + 1,
            super::truncate_chars(&candidate.id, 26),
            candidate.final_score,
            candidate.semantic_score,
            candidate.coverage.must_have_score,
            candidate.coverage.nice_to_have_score,
            candidate.consistency_penalty,
            flags,
        );
    }

    display_exclusions(outcome);
}

/// Display one candidate's full score breakdown.
pub fn display_breakdown(candidate: &ScoredCandidate) {
    println!("\n{}", format!("=== {} ===", candidate.id).bold());
    println!("  Final score: {:.4}", candidate.final_score);
    for term in &candidate.explanation {
        println!(
            "    {:<22} {:>6.3} x {:>6.3} = {:>7.4}",
            term.term, term.weight, term.value, term.contribution
        );
    }
    if !candidate.flags.is_empty() {
        println!("  Flags:");
        for flag in &candidate.flags {
            println!("    - {flag}");
        }
    }
}

/// Display the fairness report: one table per audited attribute.
pub fn display_fairness(report: &FairnessReport) {
    println!(
        "\n{}",
        format!("=== Fairness Report (top-{} selection) ===", report.top_k).bold()
    );

    if report.audits.is_empty() {
        println!("  No sensitive attributes declared for this batch.");
        return;
    }

    for audit in &report.audits {
        println!("\n  Attribute: {}", audit.attribute.bold());
        if let Some(reference) = &audit.reference_group {
            println!("  Reference group: {reference}");
        }
        println!(
            "    {:<16} {:>5}  {:>8}  {:>6}  {:>6}  Verdict",
            "Group".dimmed(),
            "N".dimmed(),
            "Top-K".dimmed(),
            "Rate".dimmed(),
            "Ratio".dimmed(),
        );
        for row in &audit.rows {
            let ratio = row
                .impact_ratio
                .map(|r| format!("{r:.2}"))
                .unwrap_or_else(|| "-".to_string());
            let verdict = match row.verdict {
                Some(v) => colorize_verdict(v),
                None if row.insufficient_sample => "small sample".dimmed().to_string(),
                None => "-".dimmed().to_string(),
            };
            println!(
                "    {:<16} {:>5}  {:>8}  {:>6.2}  {:>6}  {}",
                super::truncate_chars(&row.group, 14),
                row.population,
                row.selected,
                row.selection_rate,
                ratio,
                verdict,
            );
        }
    }

    let findings: Vec<String> = report.findings().map(|f| format!("{f:?}")).collect();
    if !findings.is_empty() {
        println!(
            "\n  {} {} advisory finding(s) — review before acting on this ranking.",
            "!".yellow(),
            findings.len()
        );
    }
}

fn display_exclusions(outcome: &ScoringOutcome) {
    if outcome.excluded.is_empty() {
        return;
    }
    println!("\n  Excluded from ranking:");
    for excluded in &outcome.excluded {
        println!(
            "    {} {} ({})",
            "x".red(),
            excluded.id,
            excluded.reason.as_str().dimmed()
        );
    }
}

fn flag_summary(candidate: &ScoredCandidate) -> String {
    if candidate.flags.is_empty() {
        return "-".dimmed().to_string();
    }
    let kinds: Vec<&str> = candidate.flags.iter().map(|f| f.kind()).collect();
    super::truncate_chars(&kinds.join(", "), 40)
}

fn colorize_verdict(verdict: Verdict) -> String {
    match verdict {
        Verdict::Pass => verdict.as_str().green().to_string(),
        Verdict::Warn => verdict.as_str().yellow().bold().to_string(),
        Verdict::Fail => verdict.as_str().red().bold().to_string(),
    }
}
