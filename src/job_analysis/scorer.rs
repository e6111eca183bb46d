// src/job_analysis/scorer.rs
//! Rule-based job fit scoring.
//!
//! Sub-scores are evaluated in a fixed order (skills, experience, seniority,
//! preferences) and every stage appends its explanation as it completes, so
//! the pros/cons order is part of the output contract.

use super::extractor::{extract_features, seniority_label, ExtractedFeatures, SkillSet};
use super::recommender;
use super::types::{AnalysisError, CandidateProfile, JobPosting, MatchAnalysis};
use tracing::debug;

pub const SKILLS_WEIGHT: f64 = 50.0;
pub const EXPERIENCE_WEIGHT: f64 = 25.0;
pub const SENIORITY_WEIGHT: f64 = 15.0;

const EXPERIENCE_NO_REQUIREMENT: f64 = 20.0;
const EXPERIENCE_CLOSE: f64 = 18.0;
const EXPERIENCE_SHORT: f64 = 10.0;
const EXPERIENCE_CLOSE_RATIO: f64 = 0.7;
const SENIORITY_STRETCH: f64 = 8.0;

const REMOTE_BONUS: f64 = 5.0;
const BALANCE_BONUS: f64 = 3.0;
const SALARY_BONUS: f64 = 2.0;

/// Alias -> canonical spelling. Both sides of a comparison are resolved
/// through this table before checking equality.
const SKILL_SYNONYMS: [(&str, &str); 5] = [
    ("js", "javascript"),
    ("ts", "typescript"),
    ("postgres", "postgresql"),
    ("node", "nodejs"),
    ("react", "reactjs"),
];

fn canonical_skill(token: &str) -> &str {
    SKILL_SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(token)
}

/// Whether a resume skill covers a job skill.
pub fn skills_match(resume_skill: &str, job_skill: &str) -> bool {
    resume_skill == job_skill
        || job_skill.contains(resume_skill)
        || resume_skill.contains(job_skill)
        || canonical_skill(resume_skill) == canonical_skill(job_skill)
}

/// Resume skills that match at least one job skill, in resume order.
pub fn matching_skills<'a>(resume_skills: &'a SkillSet, job_skills: &SkillSet) -> Vec<&'a str> {
    resume_skills
        .iter()
        .filter(|skill| job_skills.iter().any(|job_skill| skills_match(skill, job_skill)))
        .collect()
}

/// Score a posting against a candidate profile.
///
/// Fails with `MissingPageData` when the posting has no title and with
/// `MissingInput` when the resume is empty; the scorer does not run then.
pub fn analyze_job_fit(
    job: &JobPosting,
    profile: &CandidateProfile,
) -> Result<MatchAnalysis, AnalysisError> {
    if !job.has_title() {
        return Err(AnalysisError::MissingPageData(
            "job posting has no title".to_string(),
        ));
    }
    if profile.resume_text.is_empty() {
        return Err(AnalysisError::MissingInput);
    }

    let job_text = format!("{} {}", job.title, job.description).to_lowercase();
    let resume = profile.resume_text.to_lowercase();
    let preferences = profile.preferences_text.to_lowercase();

    let job_features = extract_features(&job_text);
    let resume_features = extract_features(&resume);

    let mut sheet = ScoreSheet::default();
    let matched = sheet.score_skills(&resume_features.skills, &job_features.skills);
    sheet.score_experience(resume_features.years, job_features.years);
    sheet.score_seniority(&resume_features, &job_features);
    if !preferences.is_empty() {
        sheet.score_preferences(&preferences, &job_text, job.disclosed_salary());
    }

    let match_score = finalize_score(sheet.score);
    let recommendations = recommender::recommend(match_score, &job_features.skills, &matched);

    debug!(
        title = %job.title,
        raw_score = sheet.score,
        match_score,
        matched = matched.len(),
        job_skills = job_features.skills.len(),
        resume_level = seniority_label(resume_features.seniority),
        job_level = seniority_label(job_features.seniority),
        "Scored job posting"
    );

    Ok(MatchAnalysis {
        match_score,
        pros: sheet.pros,
        cons: sheet.cons,
        recommendations,
    })
}

/// Clamp to [0, 100] and round half-up to one decimal.
pub fn finalize_score(raw: f64) -> f64 {
    (raw.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

#[derive(Debug, Default)]
struct ScoreSheet {
    score: f64,
    pros: Vec<String>,
    cons: Vec<String>,
}

impl ScoreSheet {
    fn score_skills<'a>(&mut self, resume_skills: &'a SkillSet, job_skills: &SkillSet) -> Vec<&'a str> {
        let matched = matching_skills(resume_skills, job_skills);

        if matched.is_empty() {
            self.cons
                .push("❌ Limited technical skill overlap detected".to_string());
            return matched;
        }

        let ratio = matched.len() as f64 / job_skills.len().max(1) as f64;
        self.score += ratio * SKILLS_WEIGHT;

        if matched.len() >= 3 {
            self.pros.push(format!(
                "🎯 Strong technical alignment: {}",
                matched.iter().take(4).copied().collect::<Vec<_>>().join(", ")
            ));
        } else {
            self.pros
                .push(format!("✅ Key skill matches: {}", matched.join(", ")));
        }

        matched
    }

    fn score_experience(&mut self, resume_years: u32, job_years: u32) {
        if resume_years == 0 {
            return;
        }

        if job_years == 0 {
            self.score += EXPERIENCE_NO_REQUIREMENT;
            self.pros
                .push(format!("📈 Solid {}+ years of experience", resume_years));
        } else if resume_years >= job_years {
            self.score += EXPERIENCE_WEIGHT;
            self.pros.push(format!(
                "📈 Experience exceeds requirements: {}+ years",
                resume_years
            ));
        } else if f64::from(resume_years) >= f64::from(job_years) * EXPERIENCE_CLOSE_RATIO {
            self.score += EXPERIENCE_CLOSE;
            self.pros.push(format!(
                "📈 Close to experience target: {}+ years",
                resume_years
            ));
        } else {
            self.score += EXPERIENCE_SHORT;
            self.cons.push(format!(
                "📉 May need more experience: {}+ years (seeks {}+)",
                resume_years, job_years
            ));
        }
    }

    fn score_seniority(&mut self, resume: &ExtractedFeatures, job: &ExtractedFeatures) {
        if resume.seniority.abs_diff(job.seniority) <= 1 {
            self.score += SENIORITY_WEIGHT;
            self.pros
                .push("👔 Appropriate role level alignment".to_string());
        } else if job.seniority > resume.seniority + 1 {
            self.score += SENIORITY_STRETCH;
            self.cons
                .push("👔 Position may require higher seniority".to_string());
        } else {
            self.cons
                .push("👔 Position may be below your experience level".to_string());
        }
    }

    // Negative findings only add a con; they never subtract points.
    fn score_preferences(&mut self, preferences: &str, job_text: &str, salary: Option<&str>) {
        if preferences.contains("remote") {
            if job_text.contains("remote") || job_text.contains("work from home") {
                self.score += REMOTE_BONUS;
                self.pros
                    .push("🏠 Remote work available (matches preference)".to_string());
            } else if job_text.contains("onsite") || job_text.contains("office") {
                self.cons
                    .push("🏢 On-site required (you prefer remote)".to_string());
            }
        }

        if preferences.contains("work-life balance") || preferences.contains("balance") {
            if job_text.contains("work-life balance") || job_text.contains("flexible") {
                self.score += BALANCE_BONUS;
                self.pros.push("⚖️ Emphasizes work-life balance".to_string());
            } else if job_text.contains("fast-paced") || job_text.contains("high-pressure") {
                self.cons
                    .push("⚡ Fast-paced environment (you value balance)".to_string());
            }
        }

        match salary {
            Some(salary) => {
                self.score += SALARY_BONUS;
                self.pros.push(format!("💰 Salary disclosed: {}", salary));
            }
            None if preferences.contains("salary") || preferences.contains("transparent") => {
                self.cons.push("💰 Salary not disclosed".to_string());
            }
            None => {}
        }
    }
}
