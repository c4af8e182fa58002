//! Data the views derive from query state, kept apart from rendering so it
//! can be tested without a terminal.

use std::collections::HashSet;

use crate::api::types::{MangaRelease, UpcomingReleasesResponse};
use crate::format::format_month_year;

pub const ERROR_TITLE: &str = "Oops! Something went wrong";
pub const EMPTY_TITLE: &str = "No releases found";
pub const EMPTY_HINT: &str = "Try adjusting your filters or check back later for new releases.";

/// One month of upcoming releases.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSection<'a> {
  /// "YYYY-MM" as sent by the server
  pub key: &'a str,
  /// "June 2024"
  pub label: String,
  pub releases: &'a [MangaRelease],
}

impl MonthSection<'_> {
  /// "5 releases"
  pub fn count_label(&self) -> String {
    match self.releases.len() {
      1 => "1 release".to_string(),
      n => format!("{n} releases"),
    }
  }
}

/// One section per month key, in chronological order.
pub fn month_sections(upcoming: &UpcomingReleasesResponse) -> Vec<MonthSection<'_>> {
  upcoming
    .data
    .iter()
    .map(|(key, releases)| MonthSection {
      key,
      label: format_month_year(key),
      releases,
    })
    .collect()
}

/// A selectable line in the upcoming list.
#[derive(Debug, Clone, PartialEq)]
pub enum UpcomingRow<'a> {
  Month { section: usize, expanded: bool },
  Release(&'a MangaRelease),
}

/// Flatten sections into rows, skipping releases of collapsed months.
pub fn upcoming_rows<'a>(
  sections: &[MonthSection<'a>],
  collapsed: &HashSet<String>,
) -> Vec<UpcomingRow<'a>> {
  let mut rows = Vec::new();
  for (i, section) in sections.iter().enumerate() {
    let expanded = !collapsed.contains(section.key);
    rows.push(UpcomingRow::Month {
      section: i,
      expanded,
    });
    if expanded {
      rows.extend(section.releases.iter().map(UpcomingRow::Release));
    }
  }
  rows
}

/// Releases whose title, series or publisher contains `needle`.
pub fn filter_releases<'a>(releases: &'a [MangaRelease], needle: &str) -> Vec<&'a MangaRelease> {
  let needle = needle.trim();
  releases.iter().filter(|r| r.matches(needle)).collect()
}

/// Body shown under [`ERROR_TITLE`]. Every error kind gets the same text.
pub fn error_message(what: &str) -> String {
  format!("We couldn't load the {what}. Please try again later.")
}

/// "Showing 3 of 12 releases"
pub fn showing_summary(shown: usize, total: u64) -> String {
  format!("Showing {shown} of {total} releases")
}

/// `12 results for "berserk"`
pub fn search_summary(total: u64, term: &str) -> String {
  format!("{total} results for \"{term}\"")
}
