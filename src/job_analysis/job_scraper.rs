// src/job_analysis/job_scraper.rs
use super::types::{AnalysisError, JobPosting};
use crate::utils::clean_text;
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

/// URL fragments of pages that show a single job listing.
const JOB_LISTING_PATHS: [&str; 5] = [
    "linkedin.com/jobs",
    "indeed.com/viewjob",
    "glassdoor.com/job",
    "monster.com/job",
    "ziprecruiter.com/jobs",
];

/// CSS selector lists for one job board. Each entry may hold several
/// comma-separated selectors; matches are visited in document order.
struct SiteSelectors {
    host: &'static str,
    title: &'static str,
    company: &'static str,
    location: &'static str,
    description: &'static str,
    salary: &'static str,
    /// Elements matching the first selector only count as salary when their
    /// text contains the marker.
    salary_marker: Option<(&'static str, &'static str)>,
    requirements: &'static str,
}

static LINKEDIN: SiteSelectors = SiteSelectors {
    host: "linkedin.com",
    title: ".t-24.t-bold",
    company: ".job-details-jobs-unified-top-card__company-name a, .job-details-jobs-unified-top-card__company-name",
    location: ".job-details-jobs-unified-top-card__bullet",
    description: ".jobs-box__html-content, .job-details-jobs-unified-top-card__job-description",
    salary: ".job-details-jobs-unified-top-card__job-insight-view-model-secondary",
    salary_marker: None,
    requirements: ".jobs-box__html-content ul, .jobs-box__html-content ol",
};

static INDEED: SiteSelectors = SiteSelectors {
    host: "indeed.com",
    title: "[data-testid=\"jobsearch-JobInfoHeader-title\"] span, .jobsearch-JobInfoHeader-title",
    company: "[data-testid=\"inlineHeader-companyName\"] a, .jobsearch-InlineCompanyRating-companyHeader a",
    location: "[data-testid=\"job-location\"]",
    description: "#jobDescriptionText, .jobsearch-jobDescriptionText",
    salary: ".jobsearch-JobMetadataHeader-item, [data-testid=\"job-compensation\"]",
    salary_marker: Some((".jobsearch-JobMetadataHeader-item", "$")),
    requirements: "#jobDescriptionText ul, #jobDescriptionText ol",
};

static GLASSDOOR: SiteSelectors = SiteSelectors {
    host: "glassdoor.com",
    title: "[data-test=\"job-title\"]",
    company: "[data-test=\"employer-name\"]",
    location: "[data-test=\"job-location\"]",
    description: "#JobDescriptionContainer, .jobDescriptionContent",
    salary: "[data-test=\"detailSalary\"]",
    salary_marker: None,
    requirements: ".jobDescriptionContent ul, .jobDescriptionContent ol",
};

/// Supported job boards, one variant per site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteReader {
    LinkedIn,
    Indeed,
    Glassdoor,
}

impl SiteReader {
    pub const ALL: [SiteReader; 3] = [Self::LinkedIn, Self::Indeed, Self::Glassdoor];

    fn selectors(self) -> &'static SiteSelectors {
        match self {
            Self::LinkedIn => &LINKEDIN,
            Self::Indeed => &INDEED,
            Self::Glassdoor => &GLASSDOOR,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::LinkedIn => "LinkedIn",
            Self::Indeed => "Indeed",
            Self::Glassdoor => "Glassdoor",
        }
    }

    pub fn for_host(host: &str) -> Option<Self> {
        let host = host.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|site| host.contains(site.selectors().host))
    }

    pub fn for_url(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        Self::for_host(parsed.host_str()?)
    }

    /// Read every field the site table knows about. The title may come back
    /// empty; callers decide whether that is fatal.
    pub fn read(self, html: &str, url: &str) -> JobPosting {
        let selectors = self.selectors();
        let document = Html::parse_document(html);

        let salary_filter = selectors
            .salary_marker
            .and_then(|(css, marker)| parse_selector(css).map(|selector| (selector, marker)));

        let salary = find_text(&document, selectors.salary, |element, text| {
            match &salary_filter {
                Some((selector, marker)) if selector.matches(element) => text.contains(*marker),
                _ => true,
            }
        });

        JobPosting {
            title: find_text(&document, selectors.title, |_, _| true).unwrap_or_default(),
            company: find_text(&document, selectors.company, |_, _| true).unwrap_or_default(),
            location: find_text(&document, selectors.location, |_, _| true).unwrap_or_default(),
            description: find_text(&document, selectors.description, |_, _| true)
                .unwrap_or_default(),
            salary,
            requirements: find_list_items(&document, selectors.requirements),
            source_url: clean_text(url),
            scraped_at: Some(Utc::now()),
        }
    }
}

/// Pick the reader for `url` and read `html` with it.
pub fn read_job_posting(url: &str, html: &str) -> Result<JobPosting, AnalysisError> {
    let reader = SiteReader::for_url(url).ok_or_else(|| {
        AnalysisError::MissingPageData(format!("unsupported job site: {}", url))
    })?;

    let posting = reader.read(html, url);
    if !posting.has_title() {
        return Err(AnalysisError::MissingPageData(format!(
            "no job title found on {} page",
            reader.name()
        )));
    }

    info!(
        "Read {} job: {} at {}",
        reader.name(),
        posting.title,
        posting.company
    );
    Ok(posting)
}

pub fn is_job_listing_url(url: &str) -> bool {
    JOB_LISTING_PATHS.iter().any(|path| url.contains(path))
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Invalid selector {}: {:?}", css, e);
            None
        }
    }
}

/// First element with non-empty text that `accept` agrees with.
fn find_text<F>(document: &Html, css: &str, accept: F) -> Option<String>
where
    F: Fn(&ElementRef, &str) -> bool,
{
    let selector = parse_selector(css)?;
    document
        .select(&selector)
        .map(|element| (element, clean_text(&element.text().collect::<String>())))
        .find(|(element, text)| !text.is_empty() && accept(element, text.as_str()))
        .map(|(_, text)| text)
}

fn find_list_items(document: &Html, css: &str) -> Vec<String> {
    let (Some(lists), Some(items)) = (parse_selector(css), parse_selector("li")) else {
        return Vec::new();
    };

    document
        .select(&lists)
        .flat_map(|list| list.select(&items).collect::<Vec<_>>())
        .map(|item| item.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

pub struct JobScraper {
    client: Client,
}

impl JobScraper {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        info!("Fetching job post: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch job post")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        response
            .text()
            .await
            .context("Failed to read response body")
    }

    pub async fn fetch(&self, url: &str) -> Result<JobPosting> {
        let html = self.fetch_html(url).await?;
        Ok(read_job_posting(url, &html)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKEDIN_PAGE: &str = r#"
        <html><body>
          <h1 class="t-24 t-bold">  Senior   Rust Engineer </h1>
          <div class="job-details-jobs-unified-top-card__company-name"><a>Ferris Labs</a></div>
          <span class="job-details-jobs-unified-top-card__bullet">Remote, EU</span>
          <div class="job-details-jobs-unified-top-card__job-insight-view-model-secondary">$140k - $170k</div>
          <div class="jobs-box__html-content">
            <p>We build fast things.</p>
            <ul><li> 5+ years of experience </li><li>Rust and Tokio</li><li>   </li></ul>
            <ol><li>Kubernetes</li></ol>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_site_reader_for_url() {
        assert_eq!(
            SiteReader::for_url("https://www.linkedin.com/jobs/view/123"),
            Some(SiteReader::LinkedIn)
        );
        assert_eq!(
            SiteReader::for_url("https://uk.indeed.com/viewjob?jk=abc"),
            Some(SiteReader::Indeed)
        );
        assert_eq!(
            SiteReader::for_url("https://www.glassdoor.com/job-listing/x"),
            Some(SiteReader::Glassdoor)
        );
        assert_eq!(SiteReader::for_url("https://example.com/jobs/1"), None);
        assert_eq!(SiteReader::for_url("not a url"), None);
    }

    #[test]
    fn test_read_linkedin_page() {
        let url = "https://www.linkedin.com/jobs/view/123";
        let posting = read_job_posting(url, LINKEDIN_PAGE).unwrap();

        assert_eq!(posting.title, "Senior Rust Engineer");
        assert_eq!(posting.company, "Ferris Labs");
        assert_eq!(posting.location, "Remote, EU");
        assert_eq!(posting.salary.as_deref(), Some("$140k - $170k"));
        assert!(posting.description.starts_with("We build fast things."));
        assert_eq!(
            posting.requirements,
            vec!["5+ years of experience", "Rust and Tokio", "Kubernetes"]
        );
        assert_eq!(posting.source_url, url);
        assert!(posting.scraped_at.is_some());
    }

    #[test]
    fn test_indeed_salary_requires_dollar_sign() {
        let page = r#"
            <h1 class="jobsearch-JobInfoHeader-title">Data Analyst</h1>
            <div class="jobsearch-JobMetadataHeader-item">Full-time</div>
            <div class="jobsearch-JobMetadataHeader-item">$60,000 a year</div>
            <div id="jobDescriptionText">SQL and Tableau</div>
        "#;
        let posting = read_job_posting("https://www.indeed.com/viewjob?jk=1", page).unwrap();
        assert_eq!(posting.title, "Data Analyst");
        assert_eq!(posting.salary.as_deref(), Some("$60,000 a year"));

        let page = r#"
            <h1 class="jobsearch-JobInfoHeader-title">Data Analyst</h1>
            <div class="jobsearch-JobMetadataHeader-item">Full-time</div>
        "#;
        let posting = read_job_posting("https://www.indeed.com/viewjob?jk=1", page).unwrap();
        assert_eq!(posting.salary, None);
    }

    #[test]
    fn test_missing_title_is_missing_page_data() {
        let err = read_job_posting(
            "https://www.glassdoor.com/job-listing/x",
            "<div data-test=\"employer-name\">Acme</div>",
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingPageData(_)));
    }

    #[test]
    fn test_unsupported_site_is_missing_page_data() {
        let err = read_job_posting("https://jobs.example.com/1", LINKEDIN_PAGE).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingPageData(_)));
    }

    #[test]
    fn test_is_job_listing_url() {
        assert!(is_job_listing_url("https://www.linkedin.com/jobs/view/1"));
        assert!(is_job_listing_url("https://www.ziprecruiter.com/jobs/abc"));
        assert!(!is_job_listing_url("https://www.linkedin.com/feed/"));
    }
}
