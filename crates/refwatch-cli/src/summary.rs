//! Run summary rendered in the job-summary HTML dialect.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use refwatch_core::Match;

pub const TITLE: &str = "Referenda search";
pub const NO_REFERENDA: &str = "Found no matching referenda to open PRs";

/// One table cell; header cells render as `<th>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub data: String,
    pub header: bool,
}

impl Cell {
    pub fn header(data: &str) -> Self {
        Self {
            data: data.to_string(),
            header: true,
        }
    }

    pub fn data(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            header: false,
        }
    }
}

/// Where a rendered summary goes.
#[derive(Debug, Clone)]
pub enum SummarySink {
    /// Appended to, as the job-summary file expects.
    File(PathBuf),
    Stdout,
}

#[derive(Debug, Default)]
pub struct Summary {
    buffer: String,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_heading(&mut self, level: u8, text: &str) -> &mut Self {
        let level = level.clamp(1, 6);
        self.buffer.push_str(&format!("<h{level}>{text}</h{level}>\n"));
        self
    }

    pub fn add_table(&mut self, rows: &[Vec<Cell>]) -> &mut Self {
        self.buffer.push_str("<table>");
        for row in rows {
            self.buffer.push_str("<tr>");
            for cell in row {
                let tag = if cell.header { "th" } else { "td" };
                self.buffer.push_str(&format!("<{tag}>{}</{tag}>", cell.data));
            }
            self.buffer.push_str("</tr>");
        }
        self.buffer.push_str("</table>\n");
        self
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn write(&self, sink: &SummarySink) -> anyhow::Result<()> {
        match sink {
            SummarySink::File(path) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("opening summary file {}", path.display()))?;
                file.write_all(self.buffer.as_bytes())
                    .with_context(|| format!("writing summary file {}", path.display()))?;
            }
            SummarySink::Stdout => print!("{}", self.buffer),
        }
        Ok(())
    }
}

/// Summary for a run that found no ongoing referenda to compare against.
pub fn no_referenda() -> Summary {
    let mut summary = Summary::new();
    summary.add_heading(1, TITLE).add_heading(3, NO_REFERENDA);
    summary
}

/// Summary listing every pull request that matched a referendum.
pub fn matched(matches: &[Match]) -> Summary {
    let mut rows = vec![vec![Cell::header("PR"), Cell::header("Referenda")]];
    for m in matches {
        rows.push(vec![
            link(&m.pr_url, m.pr_number),
            link(&m.referendum_url, m.referendum_index),
        ]);
    }

    let heading = format!("Found {} PRs matching ongoing referenda", matches.len());
    let mut summary = Summary::new();
    summary
        .add_heading(1, TITLE)
        .add_heading(3, &heading)
        .add_table(&rows);
    summary
}

fn link(url: &str, number: impl std::fmt::Display) -> Cell {
    Cell::data(format!("<a href=\"{url}\">#{number}</a>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match() -> Match {
        Match {
            pr_number: 42,
            pr_url: "https://github.com/o/r/pull/42".into(),
            referendum_index: 7,
            referendum_url: "https://collectives.polkassembly.io/member-referenda/7".into(),
        }
    }

    #[test]
    fn empty_run_says_no_referenda() {
        assert_eq!(
            no_referenda().as_str(),
            "<h1>Referenda search</h1>\n<h3>Found no matching referenda to open PRs</h3>\n"
        );
    }

    #[test]
    fn matched_renders_header_and_one_row_per_match() {
        let summary = matched(&[sample_match()]);
        let html = summary.as_str();

        assert!(html.contains("<h3>Found 1 PRs matching ongoing referenda</h3>"));
        assert!(html.contains("<tr><th>PR</th><th>Referenda</th></tr>"));
        assert_eq!(html.matches("<td>").count(), 2);
        assert!(html.contains(
            "<td><a href=\"https://collectives.polkassembly.io/member-referenda/7\">#7</a></td>"
        ));
    }

    #[test]
    fn zero_matches_still_render_table_header() {
        let html = matched(&[]).as_str().to_string();
        assert!(html.contains("Found 0 PRs"));
        assert!(html.contains("<th>PR</th>"));
        assert!(!html.contains("<td>"));
    }

    #[test]
    fn heading_level_is_clamped() {
        let mut summary = Summary::new();
        summary.add_heading(9, "x");
        assert_eq!(summary.as_str(), "<h6>x</h6>\n");
    }

    #[test]
    fn file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        std::fs::write(&path, "previous step\n").unwrap();

        no_referenda().write(&SummarySink::File(path.clone())).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("previous step\n<h1>Referenda search</h1>"));
    }
}
