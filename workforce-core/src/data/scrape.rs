//! BLS news-release table scraping.
//!
//! The "Labor Force Characteristics of Foreign-born Workers" release publishes
//! its tables as standalone pages (`forbrn.t01.htm` ... `forbrn.t05.htm`) and
//! a summary page (`forbrn.htm`). Every `<table>` on a page is reduced to a
//! header row and body rows of whitespace-normalized cell text.
//!
//! Requests are sequential with a flat pause between them.

use super::http::{blocking_client, send_error};
use super::provider::DataError;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

pub const RELEASE_BASE_URL: &str = "https://www.bls.gov/news.release";
pub const RELEASE_PAGE: &str = "forbrn.htm";

/// The release tables, by number.
pub const RELEASE_TABLES: [(u8, &str); 5] = [
    (1, "Employment status by characteristics"),
    (2, "Occupation"),
    (3, "Industry"),
    (4, "Educational attainment"),
    (5, "Median weekly earnings"),
];

/// One HTML table reduced to text cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlTable {
    pub caption: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Result of scraping one numbered release table.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub number: u8,
    pub description: String,
    pub url: String,
    pub result: Result<HtmlTable, DataError>,
}

/// Sequential scraper for BLS release pages.
pub struct ReleaseScraper {
    client: Client,
    base_url: String,
    delay: Duration,
}

impl ReleaseScraper {
    pub fn new(delay: Duration) -> Result<Self, DataError> {
        Self::with_base_url(RELEASE_BASE_URL, delay)
    }

    pub fn with_base_url(base_url: impl Into<String>, delay: Duration) -> Result<Self, DataError> {
        Ok(Self {
            client: blocking_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            delay,
        })
    }

    /// URL of numbered table `number` (`forbrn.t01.htm` style).
    pub fn table_url(&self, number: u8) -> String {
        format!("{}/forbrn.t{number:02}.htm", self.base_url)
    }

    /// URL of the release summary page.
    pub fn release_page_url(&self) -> String {
        format!("{}/{RELEASE_PAGE}", self.base_url)
    }

    fn fetch_page(&self, url: &str) -> Result<String, DataError> {
        let resp = self.client.get(url).send().map_err(|e| send_error(url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                series: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text()
            .map_err(|e| DataError::ResponseFormatChanged(format!("failed to read {url}: {e}")))
    }

    /// Every table on one page.
    pub fn scrape_page(&self, url: &str) -> Result<Vec<HtmlTable>, DataError> {
        let html = self.fetch_page(url)?;
        let tables = parse_html_tables(&html);
        info!(%url, count = tables.len(), "tables found");
        Ok(tables)
    }

    /// The release summary page.
    pub fn scrape_release_page(&self) -> Result<Vec<HtmlTable>, DataError> {
        self.scrape_page(&self.release_page_url())
    }

    /// Scrape the first table of each numbered page. Failures are per table.
    pub fn scrape_release_tables(&self, tables: &[(u8, &str)]) -> Vec<ScrapeOutcome> {
        let mut outcomes = Vec::with_capacity(tables.len());

        for (i, (number, description)) in tables.iter().enumerate() {
            if i > 0 {
                std::thread::sleep(self.delay);
            }

            let url = self.table_url(*number);
            info!(table = number, %description, %url, "downloading release table");

            let result = self.scrape_page(&url).and_then(|mut found| {
                if found.is_empty() {
                    Err(DataError::ResponseFormatChanged(format!("no <table> at {url}")))
                } else {
                    Ok(found.swap_remove(0))
                }
            });
            if let Err(e) = &result {
                warn!(table = number, error = %e, "release table failed");
            }

            outcomes.push(ScrapeOutcome {
                number: *number,
                description: description.to_string(),
                url,
                result,
            });
        }

        outcomes
    }
}

/// Parse every `<table>` in a document.
///
/// Header rows come from `<thead>`; without one, a first body row made only
/// of `<th>` cells is used. `colspan` and `rowspan` are expanded so every
/// header and body row has one cell per column. Stacked header levels are
/// joined into one label per column (`Foreign born 2023`). Rows with no text
/// are dropped.
pub fn parse_html_tables(html: &str) -> Vec<HtmlTable> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("table selector should parse");
    let caption_sel = Selector::parse("caption").expect("caption selector should parse");
    let head_row_sel = Selector::parse("thead tr").expect("thead selector should parse");
    let body_row_sel = Selector::parse("tbody tr").expect("tbody selector should parse");
    let cell_sel = Selector::parse("th, td").expect("cell selector should parse");
    let th_sel = Selector::parse("th").expect("th selector should parse");

    document
        .select(&table_sel)
        .map(|table| {
            let caption = table
                .select(&caption_sel)
                .next()
                .map(element_text)
                .filter(|c| !c.is_empty());

            let mut head: Vec<ElementRef> = table.select(&head_row_sel).collect();
            let mut body: Vec<ElementRef> = table.select(&body_row_sel).collect();
            if head.is_empty() {
                if let Some(first) = body.first() {
                    let cells = first.select(&cell_sel).count();
                    let header_cells = first.select(&th_sel).count();
                    if cells > 0 && cells == header_cells {
                        head.push(body.remove(0));
                    }
                }
            }

            let headers = column_labels(&span_grid(&head, &cell_sel));
            let rows = span_grid(&body, &cell_sel)
                .into_iter()
                .filter(|cells| cells.iter().any(|c| !c.is_empty()))
                .collect();

            HtmlTable {
                caption,
                headers,
                rows,
            }
        })
        .collect()
}

/// Upper bound on `colspan`/`rowspan`.
const MAX_SPAN: usize = 1000;

/// `(colspan, rowspan)` of a cell, each at least 1.
fn spans(cell: ElementRef) -> (usize, usize) {
    let span = |name: &str| {
        cell.value()
            .attr(name)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_SPAN)
    };
    (span("colspan"), span("rowspan"))
}

/// Lay rows out on a grid, repeating a spanned cell's text into every
/// position it covers. Uncovered positions are empty strings.
fn span_grid(rows: &[ElementRef], cell_sel: &Selector) -> Vec<Vec<String>> {
    let mut grid: Vec<Vec<Option<String>>> = vec![Vec::new(); rows.len()];

    for (r, row) in rows.iter().enumerate() {
        let mut col = 0;
        for cell in row.select(cell_sel) {
            while grid[r].get(col).is_some_and(Option::is_some) {
                col += 1;
            }
            let (colspan, rowspan) = spans(cell);
            let text = element_text(cell);
            for line in grid.iter_mut().skip(r).take(rowspan) {
                if line.len() < col + colspan {
                    line.resize(col + colspan, None);
                }
                for slot in &mut line[col..col + colspan] {
                    *slot = Some(text.clone());
                }
            }
            col += colspan;
        }
    }

    grid.into_iter()
        .map(|line| line.into_iter().map(Option::unwrap_or_default).collect())
        .collect()
}

/// One label per column: the column's non-empty levels, top to bottom, with
/// repeats from a `rowspan` collapsed.
fn column_labels(levels: &[Vec<String>]) -> Vec<String> {
    let width = levels.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|col| {
            let mut parts: Vec<&str> = Vec::new();
            for level in levels {
                if let Some(text) = level.get(col) {
                    if !text.is_empty() && parts.last() != Some(&text.as_str()) {
                        parts.push(text.as_str());
                    }
                }
            }
            parts.join(" ")
        })
        .collect()
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
