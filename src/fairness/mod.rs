// Fairness Auditor — disparate-impact diagnostics over the ranked pool.
//
// Works exclusively on the quarantined sensitive-attribute table and the
// final ranking. Findings are advisory: the auditor never mutates scores
// or order, and re-ranking for fairness is a deliberate user action, not
// something this module does silently. Degenerate pools (tiny groups,
// nobody selected) degrade to advisory findings, never an error.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::config::FairnessPolicy;
use crate::models::{
    AttributeAudit, FairnessFinding, FairnessReport, GroupRow, ScoredCandidate, Verdict,
};

/// Audit top-K selection rates per sensitive group.
///
/// `sensitive` maps candidate id -> attribute name -> group value; only ids
/// present in `ranked` are counted. K defaults to `ceil(len * top_fraction)`
/// and is clamped to the batch size.
pub fn audit(
    ranked: &[ScoredCandidate],
    sensitive: &BTreeMap<String, BTreeMap<String, String>>,
    policy: &FairnessPolicy,
) -> FairnessReport {
    let top_k = resolve_top_k(ranked.len(), policy);
    let selected: BTreeSet<&str> = ranked
        .iter()
        .take(top_k)
        .map(|c| c.id.as_str())
        .collect();

    // Attribute -> group -> (population, selected)
    let mut tables: BTreeMap<&str, BTreeMap<&str, (usize, usize)>> = BTreeMap::new();
    for candidate in ranked {
        let Some(attributes) = sensitive.get(&candidate.id) else {
            continue;
        };
        for (attribute, group) in attributes {
            let entry = tables
                .entry(attribute.as_str())
                .or_default()
                .entry(group.as_str())
                .or_insert((0, 0));
            entry.0 += 1;
            if selected.contains(candidate.id.as_str()) {
                entry.1 += 1;
            }
        }
    }

    let audits = tables
        .into_iter()
        .map(|(attribute, groups)| audit_attribute(attribute, &groups, policy))
        .collect();

    FairnessReport { top_k, audits }
}

fn audit_attribute(
    attribute: &str,
    groups: &BTreeMap<&str, (usize, usize)>,
    policy: &FairnessPolicy,
) -> AttributeAudit {
    let mut findings = Vec::new();

    // Groups large enough for a stable ratio
    let eligible: BTreeMap<&str, f64> = groups
        .iter()
        .filter(|(_, (population, _))| *population >= policy.min_group_size)
        .map(|(group, (population, selected))| {
            (*group, *selected as f64 / *population as f64)
        })
        .collect();

    for (group, (population, _)) in groups {
        if *population < policy.min_group_size {
            findings.push(FairnessFinding::InsufficientSample {
                attribute: attribute.to_string(),
                group: group.to_string(),
                population: *population,
            });
        }
    }

    // Reference: the configured group when eligible, else the eligible group
    // with the highest selection rate (ties broken lexicographically).
    let reference_group = policy
        .reference_group
        .as_deref()
        .filter(|g| eligible.contains_key(g))
        .or_else(|| {
            eligible
                .iter()
                .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(group, _)| *group)
        });
    let reference_rate = reference_group.and_then(|g| eligible.get(g)).copied();

    if !eligible.is_empty() && reference_rate == Some(0.0) {
        findings.push(FairnessFinding::NoReferenceSelection {
            attribute: attribute.to_string(),
        });
    }

    let mut rows = Vec::new();
    for (group, (population, selected)) in groups {
        let selection_rate = if *population > 0 {
            *selected as f64 / *population as f64
        } else {
            0.0
        };
        let insufficient = *population < policy.min_group_size;
        let is_reference = reference_group == Some(*group);

        let impact_ratio = match reference_rate {
            Some(rate) if rate > 0.0 && !insufficient && !is_reference => {
                Some(selection_rate / rate)
            }
            _ => None,
        };

        let verdict = impact_ratio.map(|ratio| {
            if ratio <= policy.fail_ratio {
                Verdict::Fail
            } else if ratio < policy.band_low || ratio > policy.band_high {
                Verdict::Warn
            } else {
                Verdict::Pass
            }
        });

        if let Some(ratio) = impact_ratio {
            if ratio < policy.band_low || ratio > policy.band_high {
                findings.push(FairnessFinding::DisparateImpactWarning {
                    attribute: attribute.to_string(),
                    group: group.to_string(),
                    ratio,
                });
            }
        }

        rows.push(GroupRow {
            group: group.to_string(),
            population: *population,
            selected: *selected,
            selection_rate,
            impact_ratio,
            verdict: if is_reference && !insufficient && reference_rate.is_some_and(|r| r > 0.0) {
                // The reference compares to itself at ratio 1.0
                Some(Verdict::Pass)
            } else {
                verdict
            },
            insufficient_sample: insufficient,
        });
    }

    info!(
        attribute,
        groups = rows.len(),
        findings = findings.len(),
        reference = reference_group.unwrap_or("-"),
        "fairness audit"
    );

    AttributeAudit {
        attribute: attribute.to_string(),
        reference_group: reference_group.map(|g| g.to_string()),
        rows,
        findings,
    }
}

fn resolve_top_k(batch_len: usize, policy: &FairnessPolicy) -> usize {
    if batch_len == 0 {
        return 0;
    }
    let k = policy
        .top_k
        .unwrap_or_else(|| (batch_len as f64 * policy.top_fraction).ceil() as usize);
    k.clamp(1, batch_len)
}
