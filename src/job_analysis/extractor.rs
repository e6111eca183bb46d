// src/job_analysis/extractor.rs
//! Feature extraction from free-form resume and posting text.
//!
//! Everything here expects text that the caller has already lower-cased,
//! although skill matching is case-insensitive on its own.

use regex::Regex;
use std::sync::LazyLock;

/// Skill vocabularies, scanned in this order. Alternatives are tried
/// leftmost-first, so `javascript` wins over `js` at the same position.
/// Word boundaries are ASCII-only: accented letters do not join a token.
const SKILL_VOCABULARIES: [&str; 6] = [
    // Programming languages
    r"javascript|js|typescript|ts|python|java|c#|c\+\+|php|ruby|go|rust|swift|kotlin|scala|r|matlab",
    // Web technologies
    r"html|css|sass|scss|react|angular|vue|next\.?js|node\.?js|express|django|flask|laravel|spring",
    // Databases
    r"sql|mysql|postgresql|postgres|mongodb|redis|elasticsearch|oracle|sqlite",
    // Cloud / DevOps
    r"aws|azure|gcp|docker|kubernetes|jenkins|git|github|gitlab|terraform|ansible",
    // Productivity tools
    r"figma|sketch|jira|confluence|salesforce|tableau|excel|powerbi|photoshop",
    // Methodologies
    r"agile|scrum|kanban|devops|ci/cd|tdd|microservices|api|rest|graphql",
];

static SKILL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SKILL_VOCABULARIES
        .iter()
        .map(|vocabulary| {
            Regex::new(&format!(r"(?i)(?-u:\b)(?:{})(?-u:\b)", vocabulary))
                .expect("skill vocabulary is a valid regex")
        })
        .collect()
});

static YEARS_BEFORE_EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\+?\s*(?:years?|yrs?)\s*(?:of\s*)?(?:experience|exp)")
        .expect("experience pattern is a valid regex")
});

static EXPERIENCE_BEFORE_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:experience|exp).*?([0-9]+)\+?\s*(?:years?|yrs?)")
        .expect("experience pattern is a valid regex")
});

/// Role levels in ascending order; a level's index is its rank.
pub const SENIORITY_LEVELS: [&str; 7] = [
    "intern",
    "junior",
    "mid",
    "senior",
    "lead",
    "principal",
    "director",
];

/// Rank used when no level keyword appears ("mid").
pub const DEFAULT_SENIORITY_RANK: usize = 2;

/// Lower-cased skill tokens in first-seen order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    tokens: Vec<String>,
}

impl SkillSet {
    pub fn insert(&mut self, token: &str) -> bool {
        let token = token.to_lowercase();
        if self.tokens.contains(&token) {
            return false;
        }
        self.tokens.push(token);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for SkillSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = SkillSet::default();
        for token in iter {
            set.insert(token);
        }
        set
    }
}

/// Everything the scorer needs to know about one side of the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFeatures {
    pub skills: SkillSet,
    pub years: u32,
    pub seniority: usize,
}

pub fn extract_features(text: &str) -> ExtractedFeatures {
    ExtractedFeatures {
        skills: extract_skills(text),
        years: extract_years(text),
        seniority: extract_seniority(text),
    }
}

pub fn extract_skills(text: &str) -> SkillSet {
    SKILL_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.find_iter(text).map(|m| m.as_str()))
        .collect()
}

/// Largest year count stated next to "experience", or 0. Counts too large
/// for a `u32` saturate.
pub fn extract_years(text: &str) -> u32 {
    [&*YEARS_BEFORE_EXPERIENCE, &*EXPERIENCE_BEFORE_YEARS]
        .into_iter()
        .flat_map(|pattern| pattern.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
        .max()
        .unwrap_or(0)
}

/// Highest seniority keyword contained in the text.
pub fn extract_seniority(text: &str) -> usize {
    SENIORITY_LEVELS
        .iter()
        .enumerate()
        .rev()
        .find(|(_, level)| text.contains(*level))
        .map(|(rank, _)| rank)
        .unwrap_or(DEFAULT_SENIORITY_RANK)
}

pub fn seniority_label(rank: usize) -> &'static str {
    SENIORITY_LEVELS
        .get(rank)
        .copied()
        .unwrap_or(SENIORITY_LEVELS[DEFAULT_SENIORITY_RANK])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(set: &SkillSet) -> Vec<&str> {
        set.iter().collect()
    }

    #[test]
    fn test_extract_skills_keeps_first_seen_order() {
        let skills = extract_skills("python and docker, then more python with aws and scrum");
        assert_eq!(tokens(&skills), vec!["python", "docker", "aws", "scrum"]);
    }

    #[test]
    fn test_extract_skills_respects_word_boundaries() {
        let skills = extract_skills("we ship golang services using javascripty tooling");
        assert!(skills.is_empty(), "got {:?}", tokens(&skills));

        let skills = extract_skills("go, rust and java");
        assert_eq!(tokens(&skills), vec!["go", "rust", "java"]);
    }

    #[test]
    fn test_extract_skills_ascii_word_boundaries() {
        let skills = extract_skills("éjs and rustç");
        assert_eq!(tokens(&skills), vec!["js", "rust"]);
    }

    #[test]
    fn test_extract_skills_lowercases_matches() {
        let skills = extract_skills("TypeScript, React and PostgreSQL");
        assert_eq!(tokens(&skills), vec!["typescript", "react", "postgresql"]);
    }

    #[test]
    fn test_extract_skills_dotted_variants() {
        // "js" also matches on its own after the dot
        let skills = extract_skills("node.js backend with next.js and ci/cd");
        assert_eq!(tokens(&skills), vec!["js", "node.js", "next.js", "ci/cd"]);
    }

    #[test]
    fn test_extract_years_takes_maximum() {
        assert_eq!(extract_years("3 years of experience, 7+ yrs exp overall"), 7);
        assert_eq!(extract_years("experience: at least 4+ years"), 4);
        assert_eq!(extract_years("5 years experience with javascript"), 5);
    }

    #[test]
    fn test_extract_years_defaults_to_zero() {
        assert_eq!(extract_years("passionate developer"), 0);
        assert_eq!(extract_years("10 years in the industry"), 0);
    }

    #[test]
    fn test_extract_years_saturates_huge_counts() {
        assert_eq!(extract_years("experience: 5000000000 years"), u32::MAX);
        assert_eq!(extract_years("99999999999999999999999 years experience"), u32::MAX);
    }

    #[test]
    fn test_extract_seniority_prefers_highest_level() {
        assert_eq!(extract_seniority("senior engineer who will lead the team"), 4);
        assert_eq!(extract_seniority("junior developer"), 1);
        assert_eq!(extract_seniority("director of engineering, former intern"), 6);
    }

    #[test]
    fn test_extract_seniority_defaults_to_mid() {
        assert_eq!(extract_seniority("software engineer"), DEFAULT_SENIORITY_RANK);
        assert_eq!(seniority_label(extract_seniority("software engineer")), "mid");
    }

    #[test]
    fn test_extract_features() {
        let features = extract_features("senior rust developer, 6 years experience");
        assert_eq!(tokens(&features.skills), vec!["rust"]);
        assert_eq!(features.years, 6);
        assert_eq!(features.seniority, 3);
    }
}
