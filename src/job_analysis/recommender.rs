// src/job_analysis/recommender.rs
use super::extractor::SkillSet;

const MAX_SUGGESTED_SKILLS: usize = 3;
const SKILL_GAP_SCORE_CEILING: f64 = 70.0;

/// Closing advice for a finalized score: one tier message, plus a list of
/// skills to develop when the score is modest and gaps exist.
pub fn recommend(score: f64, job_skills: &SkillSet, matched: &[&str]) -> Vec<String> {
    let mut recommendations = vec![tier_message(score).to_string()];

    let missing = missing_skills(job_skills, matched);
    if !missing.is_empty() && score < SKILL_GAP_SCORE_CEILING {
        recommendations.push(format!("📚 Consider developing: {}", missing.join(", ")));
    }

    recommendations
}

fn tier_message(score: f64) -> &'static str {
    if score >= 75.0 {
        "🎯 Excellent match! Strongly recommend applying."
    } else if score >= 60.0 {
        "👍 Good fit overall. Worth pursuing this opportunity."
    } else if score >= 45.0 {
        "🤔 Moderate match. Research company culture and growth opportunities."
    } else {
        "⚠️ Lower compatibility. Consider if you're willing to stretch into new areas."
    }
}

/// Job skills no matched resume skill covers. Plain substring containment
/// only; synonyms are not consulted here.
fn missing_skills<'a>(job_skills: &'a SkillSet, matched: &[&str]) -> Vec<&'a str> {
    job_skills
        .iter()
        .filter(|skill| {
            !matched
                .iter()
                .any(|m| m.contains(*skill) || skill.contains(*m))
        })
        .take(MAX_SUGGESTED_SKILLS)
        .collect()
}
