use serde::Serialize;
use subcheck_core::SubmissionReport;
use tera::{Context, Tera};

/// Embedded default templates
pub mod embedded {
    pub const BASE_HTML: &str = include_str!("../templates/base.html");
    pub const INDEX_HTML: &str = include_str!("../templates/index.html");
    pub const RESULTS_HTML: &str = include_str!("../templates/results.html");
}

pub struct Templates {
    tera: Tera,
}

#[derive(Serialize)]
struct IndexPage<'a> {
    domains: Vec<&'a str>,
}

impl Templates {
    pub fn embedded() -> tera::Result<Self> {
        Ok(Self {
            tera: Self::embedded_tera()?,
        })
    }

    fn embedded_tera() -> tera::Result<Tera> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", embedded::BASE_HTML),
            ("index.html", embedded::INDEX_HTML),
            ("results.html", embedded::RESULTS_HTML),
        ])?;
        Ok(tera)
    }

    pub fn index<'a>(&self, domains: impl Iterator<Item = &'a str>) -> tera::Result<String> {
        let page = IndexPage {
            domains: domains.collect(),
        };
        self.tera
            .render("index.html", &Context::from_serialize(&page)?)
    }

    pub fn results(&self, report: &SubmissionReport) -> tera::Result<String> {
        self.tera
            .render("results.html", &Context::from_serialize(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subcheck_core::{FileReport, MatchRecord, ValidationResult};

    fn report() -> SubmissionReport {
        SubmissionReport {
            request_id: uuid::Uuid::nil(),
            domain: "Python".into(),
            validation: Some(ValidationResult {
                required: vec!["SRS".into(), "WBS".into()],
                submitted: vec!["srs.pdf".into()],
                missing: vec!["WBS".into()],
                complete: false,
            }),
            validation_error: None,
            plagiarism_report: vec![FileReport {
                filename: "srs.pdf".into(),
                matches: vec![MatchRecord {
                    chunk_text: "The system shall <b>log</b> every request".into(),
                    source_url: "https://src.example/srs".into(),
                    source_title: "Sample SRS".into(),
                }],
            }],
            notices: vec![],
            scanned_files: vec!["srs.pdf".into()],
            generated_at: "2026-01-01 00:00:00 UTC".into(),
        }
    }

    #[test]
    fn index_lists_domains() {
        let t = Templates::embedded().unwrap();
        let html = t.index(["Python", "Data & Analytics"].into_iter()).unwrap();
        assert!(html.contains("<option value=\"Python\">Python</option>"));
        assert!(html.contains("Data &amp; Analytics"));
        assert!(html.contains("enctype=\"multipart/form-data\""));
    }

    #[test]
    fn results_show_missing_and_matches_escaped() {
        let t = Templates::embedded().unwrap();
        let html = t.results(&report()).unwrap();
        assert!(html.contains("WBS"));
        assert!(html.contains("https:&#x2F;&#x2F;src.example&#x2F;srs"));
        assert!(html.contains("&lt;b&gt;log&lt;&#x2F;b&gt;"));
        assert!(!html.contains("<b>log</b>"));
    }

    #[test]
    fn interrupted_scan_is_not_reported_as_clean() {
        let t = Templates::embedded().unwrap();
        let mut r = report();
        r.plagiarism_report.clear();
        r.notices = vec!["Search API daily quota exceeded. Please try again tomorrow.".into()];
        let html = t.results(&r).unwrap();
        assert!(html.contains("only partly scanned"));
        assert!(!html.contains("No matches found in 1 scanned document(s)"));

        r.notices.clear();
        let html = t.results(&r).unwrap();
        assert!(html.contains("No matches found in 1 scanned document(s)"));
    }

    #[test]
    fn results_show_validation_error() {
        let t = Templates::embedded().unwrap();
        let mut r = report();
        r.validation = None;
        r.validation_error = Some("Selected domain not found in requirements list: X".into());
        r.notices = vec!["Search API daily quota exceeded. Please try again tomorrow.".into()];
        let html = t.results(&r).unwrap();
        assert!(html.contains("Selected domain not found"));
        assert!(html.contains("quota exceeded"));
    }
}
