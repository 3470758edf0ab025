// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Built-in site profiles: where the content lives on the page, how to
//! reveal it, and which pages to scrape by default.

use crate::types::Target;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Glassdoor,
    Linkedin,
}

/// How long to wait for the content region before reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// In the DOM with a non-empty bounding box.
    Visible,
    /// In the DOM.
    Present,
    /// Not in the DOM.
    Absent,
}

/// Click something on the page, then wait until it is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandAction {
    pub selector: &'static str,
}

/// Browser-side description of how a site's content region is captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    pub site: Site,
    /// Region whose outer HTML is handed to extraction.
    pub content_selector: &'static str,
    pub wait_for: Presence,
    pub expand: Option<ExpandAction>,
}

pub const GLASSDOOR_CONTAINER: &str =
    ".employer-overview__employer-overview-module__employerOverviewContainer";
pub const GLASSDOOR_READ_MORE: &str = ".text-block__text-block-module__readMoreButton";

const GLASSDOOR_TARGETS: &[&str] = &[
    "https://www.glassdoor.co.uk/Overview/Working-at-Amazon-EI_IE6036.11,17.htm",
    "https://www.glassdoor.co.uk/Overview/Working-at-Google-EI_IE9079.11,17.htm",
    "https://www.glassdoor.co.uk/metacareers",
    "https://www.glassdoor.co.uk/Overview/Working-at-Microsoft-EI_IE1651.11,20.htm",
    "https://www.glassdoor.co.uk/Overview/Working-at-Bloomberg-L-P-EI_IE3096.11,24.htm",
    "https://www.glassdoor.co.uk/Overview/Working-at-Accenture-EI_IE4138.11,20.htm",
    "https://www.glassdoor.co.uk/Overview/Working-at-IBM-EI_IE354.11,14.htm",
    "https://www.glassdoor.co.uk/Overview/Working-at-Expedia-Group-EI_IE9876.11,24.htm",
    "https://www.glassdoor.co.uk/Overview/Working-at-Sky-EI_IE3903.11,14.htm",
    "https://www.glassdoor.co.uk/Overview/Working-at-J-P-Morgan-EI_IE145.11,21.htm",
];

const LINKEDIN_TARGETS: &[&str] = &[
    "https://www.linkedin.com/company/amazon/",
    "https://www.linkedin.com/company/meta/",
    "https://www.linkedin.com/company/google/",
    "https://www.linkedin.com/company/bloomberg/",
];

impl Site {
    pub const ALL: [Site; 2] = [Site::Glassdoor, Site::Linkedin];

    pub fn profile(self) -> SiteProfile {
        match self {
            Site::Glassdoor => SiteProfile {
                site: self,
                content_selector: GLASSDOOR_CONTAINER,
                wait_for: Presence::Visible,
                expand: Some(ExpandAction {
                    selector: GLASSDOOR_READ_MORE,
                }),
            },
            Site::Linkedin => SiteProfile {
                site: self,
                content_selector: "body",
                wait_for: Presence::Present,
                expand: None,
            },
        }
    }

    pub fn default_targets(self) -> Vec<Target> {
        let urls = match self {
            Site::Glassdoor => GLASSDOOR_TARGETS,
            Site::Linkedin => LINKEDIN_TARGETS,
        };
        urls.iter().map(|u| Target::new(*u)).collect()
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Site::Glassdoor => "glassdoor",
            Site::Linkedin => "linkedin",
        })
    }
}
