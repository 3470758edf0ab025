// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Field extraction from captured page markup.
//!
//! Pure functions over an HTML string, using the `scraper` crate for CSS
//! selector matching. No browser involvement.

use crate::error::ScrapeError;
use crate::sites::Site;
use scraper::{Html, Selector};
use serde::Serialize;

pub const OVERVIEW_HEADING: &str =
    ".employer-overview__employer-overview-module__employerOverviewHeading";
pub const OVERVIEW_RATING: &str =
    ".employer-overview__employer-overview-module__employerOverviewRating";
pub const OVERVIEW_WEBSITE: &str = "a[data-test='employer-website']";
pub const OVERVIEW_DESCRIPTION: &str = "span[data-test='employerDescription']";
pub const ABOUT_DESCRIPTION: &str = r#"p[data-test-id="about-us__description"]"#;

/// Employer overview fields. Empty fields are left out of the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyOverview {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rating: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub website: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Company "about us" blurb.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyAbout {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub about: String,
}

/// A record extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CompanyRecord {
    Overview(CompanyOverview),
    About(CompanyAbout),
}

/// Extract the record for `site` from captured markup.
pub fn extract_fields(site: Site, html: &str) -> Result<CompanyRecord, ScrapeError> {
    match site {
        Site::Glassdoor => Ok(CompanyRecord::Overview(extract_overview(html))),
        Site::Linkedin => extract_about(html).map(CompanyRecord::About),
    }
}

/// Overview fields are best-effort: a missing element yields an empty field.
pub fn extract_overview(html: &str) -> CompanyOverview {
    let document = Html::parse_document(html);
    CompanyOverview {
        name: joined_text(&document, OVERVIEW_HEADING),
        rating: joined_text(&document, OVERVIEW_RATING),
        website: joined_text(&document, OVERVIEW_WEBSITE),
        description: joined_text(&document, OVERVIEW_DESCRIPTION),
    }
}

/// The about blurb must match exactly one element.
pub fn extract_about(html: &str) -> Result<CompanyAbout, ScrapeError> {
    let document = Html::parse_document(html);
    let mut matches = all_text(&document, ABOUT_DESCRIPTION);
    if matches.len() != 1 {
        return Err(ScrapeError::ExtractionCardinality {
            selector: ABOUT_DESCRIPTION.to_string(),
            found: matches.len(),
        });
    }
    Ok(CompanyAbout {
        about: matches.remove(0),
    })
}

fn all_text(document: &Html, css: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse(css) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .map(|el| el.text().collect::<String>())
        .collect()
}

fn joined_text(document: &Html, css: &str) -> String {
    all_text(document, css).concat()
}
