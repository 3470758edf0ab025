// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! `company-scraper sites`: list built-in site profiles.

use crate::sites::Site;
use anyhow::Result;

pub fn run() -> Result<()> {
    for site in Site::ALL {
        let profile = site.profile();
        println!(
            "{site:<10} {:>2} default targets  content: {}",
            site.default_targets().len(),
            profile.content_selector
        );
    }
    Ok(())
}
