//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use evalscan_core::report::ScoreReport;
use evalscan_core::score::{ScoreField, ScoreResult};
use evalscan_core::statistics::GroupStats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn score_cell(score: Option<ScoreResult>) -> String {
    match score {
        Some(ScoreResult::Available(v)) => format!("<td class=\"{}\">{v:.1}</td>", band(v)),
        Some(ScoreResult::Unavailable) => "<td class=\"na\">n/a</td>".to_string(),
        None => "<td>-</td>".to_string(),
    }
}

fn mean_cell(mean: Option<f64>) -> String {
    match mean {
        Some(v) => format!("<td class=\"{}\">{v:.1}</td>", band(v)),
        None => "<td>-</td>".to_string(),
    }
}

fn band(score: f64) -> &'static str {
    if score >= 80.0 {
        "high"
    } else if score >= 60.0 {
        "mid"
    } else {
        "low"
    }
}

fn score_header() -> String {
    ScoreField::ALL
        .iter()
        .map(|f| format!("<th>{}</th>", f.name()))
        .collect()
}

fn group_table(title: &str, key_label: &str, groups: &BTreeMap<String, GroupStats>) -> String {
    let mut html = format!("<h2>{}</h2>\n", html_escape(title));
    if groups.is_empty() {
        html.push_str("<p class=\"meta\">No data.</p>\n");
        return html;
    }
    html.push_str("<table class=\"summary\">\n");
    html.push_str(&format!(
        "<thead><tr><th>{key_label}</th><th>Evaluations</th>{}</tr></thead>\n",
        score_header()
    ));
    html.push_str("<tbody>\n");
    for (key, stats) in groups {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td>",
            html_escape(key),
            stats.evaluations
        ));
        for field in ScoreField::ALL {
            html.push_str(&mean_cell(stats.mean(field)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody></table>\n");
    html
}

/// Generate an HTML report from a score report.
pub fn generate_html(report: &ScoreReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>evalscan report: {}</title>\n",
        html_escape(&report.source)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>evalscan report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Source: <strong>{}</strong> | {} evaluations | {} courses | {} instructors | {}</p>\n",
        html_escape(&report.source),
        report.evaluation_count,
        report.aggregate.per_course.len(),
        report.aggregate.per_instructor.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&group_table("Courses", "Course", &report.aggregate.per_course));
    let chart = generate_bar_chart(&report.aggregate.per_course);
    if !chart.is_empty() {
        html.push_str("<h3>Mean overall score per course</h3>\n");
        html.push_str(&chart);
    }
    html.push_str(&group_table(
        "Instructors",
        "Instructor",
        &report.aggregate.per_instructor,
    ));
    html.push_str("</section>\n");

    // Per-evaluation scores
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Evaluations</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr>");
    let columns = ["Id", "Course", "Instructors", "Year"]
        .iter()
        .map(|c| c.to_string())
        .chain(ScoreField::ALL.iter().map(|f| f.name().to_string()));
    for (i, column) in columns.enumerate() {
        html.push_str(&format!("<th onclick=\"sortTable({i})\">{column}</th>"));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for s in &report.scores {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            s.unique_id,
            html_escape(&s.course_label().unwrap_or_default()),
            html_escape(&s.instructors.join("; ")),
            html_escape(s.year.as_deref().unwrap_or("")),
        ));
        for field in ScoreField::ALL {
            html.push_str(&score_cell(s.get(field)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ScoreReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars of the mean overall score, one per course that has one.
fn generate_bar_chart(per_course: &BTreeMap<String, GroupStats>) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 160;

    let courses: Vec<(&String, f64)> = per_course
        .iter()
        .filter_map(|(c, s)| s.mean(ScoreField::OverallScore).map(|v| (c, v)))
        .collect();
    if courses.is_empty() {
        return String::new();
    }

    let total_height = courses.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (course, score)) in courses.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (score.clamp(0.0, 100.0) / 100.0 * max_width as f64) as usize;

        let color = match band(*score) {
            "high" => "#22c55e",
            "mid" => "#eab308",
            _ => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"13\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(course)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"3\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --high: #dcfce7; --mid: #fef9c3; --low: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --high: #064e3b; --mid: #713f12; --low: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.4rem 0.8rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.high { background: var(--high); }
.mid { background: var(--mid); }
.low { background: var(--low); }
.na { color: #6b7280; font-style: italic; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    if (!isNaN(na) && !isNaN(nb)) return asc ? na - nb : nb - na;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
