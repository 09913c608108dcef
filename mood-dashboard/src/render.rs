//! Text rendering of the session history: a table plus four charts.

use comfy_table::{
    modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL, Cell, CellAlignment, Color,
    ContentArrangement, Table,
};

use crate::client::StoredSentiment;
use crate::session::{SessionHistory, SessionHistoryEntry};

pub const EMPTY_PLACEHOLDER: &str = "No sentiment data available yet.";
pub const HISTOGRAM_BUCKETS: usize = 20;

const TREND_HEIGHT: usize = 10;
const TREND_MAX_POINTS: usize = 60;
const BAR_WIDTH: usize = 40;
const SPREAD_WIDTH: usize = 41;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub use_color: bool,
}

type Rgb = (u8, u8, u8);

const GRAY: Rgb = (0x88, 0x88, 0x88);

/// Pie colors, keyed by capitalized label.
fn distribution_color(label: &str) -> Rgb {
    match label {
        "Positive" => (0x28, 0xA7, 0x45),
        "Negative" => (0xD9, 0x53, 0x4F),
        _ => GRAY,
    }
}

/// Box plot colors, keyed by capitalized label.
fn spread_color(label: &str) -> Rgb {
    match label {
        "Positive" => (0x48, 0x6C, 0xF0),
        "Negative" => (0xD9, 0x53, 0x4F),
        _ => GRAY,
    }
}

fn paint(text: &str, (r, g, b): Rgb, use_color: bool) -> String {
    if use_color {
        format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// First letter upper-cased, the rest lower-cased.
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Full dashboard, or the placeholder when the session has no entries yet.
pub fn render_dashboard(history: &SessionHistory, opts: RenderOptions) -> String {
    if history.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }
    let entries = history.entries();

    [
        format!(
            "Sentiment Analysis History\n{}",
            history_table(entries, opts.use_color)
        ),
        score_trend(entries),
        render_distribution(&label_distribution(entries), opts),
        render_histogram(&score_histogram(entries.iter().map(|e| e.score))),
        render_spread(&score_spread(entries), opts),
    ]
    .join("\n\n")
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn label_cell(label: &str, use_color: bool) -> Cell {
    let cell = Cell::new(label);
    if use_color {
        let (r, g, b) = distribution_color(&capitalize(label));
        cell.fg(Color::Rgb { r, g, b })
    } else {
        cell
    }
}

pub fn history_table(entries: &[SessionHistoryEntry], use_color: bool) -> Table {
    let mut table = base_table();
    table.set_header(vec!["", "text", "label", "score", "timestamp"]);
    for (i, e) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i),
            Cell::new(&e.text),
            label_cell(&e.label, use_color),
            Cell::new(format!("{:.4}", e.score)).set_alignment(CellAlignment::Right),
            Cell::new(e.timestamp.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    table
}

/// Table of the server's persisted records.
pub fn stored_table(rows: &[StoredSentiment], use_color: bool) -> Table {
    let mut table = base_table();
    table.set_header(vec!["id", "text", "sentiment_label", "sentiment_score", "timestamp"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.text),
            label_cell(&r.sentiment_label, use_color),
            Cell::new(format!("{:.4}", r.sentiment_score)).set_alignment(CellAlignment::Right),
            Cell::new(&r.timestamp),
        ]);
    }
    table
}

/// Score over time with markers, oldest on the left. Only the most recent
/// points that fit are drawn.
pub fn score_trend(entries: &[SessionHistoryEntry]) -> String {
    let mut points: Vec<&SessionHistoryEntry> =
        entries.iter().filter(|e| e.score.is_finite()).collect();
    points.sort_by_key(|e| e.timestamp);
    let points = &points[points.len().saturating_sub(TREND_MAX_POINTS)..];

    let mut out = String::from("Sentiment Score Trend\nScore");
    let Some(first) = points.first() else {
        out.push_str("\n  (no scores)");
        return out;
    };

    let width = points.len() * 2 - 1;
    let mut grid = vec![vec![' '; width]; TREND_HEIGHT];
    let row_of = |score: f64| ((1.0 - score.clamp(0.0, 1.0)) * (TREND_HEIGHT - 1) as f64).round() as usize;

    let mut prev_row: Option<usize> = None;
    for (i, e) in points.iter().enumerate() {
        let col = i * 2;
        let row = row_of(e.score);
        if let Some(prev) = prev_row {
            // Vertical stroke in the gap column joins consecutive markers.
            for r in prev.min(row)..=prev.max(row) {
                grid[r][col - 1] = '│';
            }
        }
        grid[row][col] = '●';
        prev_row = Some(row);
    }

    for (r, cells) in grid.iter().enumerate() {
        let value = 1.0 - r as f64 / (TREND_HEIGHT - 1) as f64;
        let line: String = cells.iter().collect();
        out.push_str(&format!("\n{value:5.2} ┤{}", line.trim_end()));
    }
    out.push_str(&format!("\n      └{}", "─".repeat(width)));

    let last = points[points.len() - 1];
    out.push_str(&format!(
        "\n       {}  →  {}  (Time)",
        first.timestamp.format("%Y-%m-%d %H:%M:%S"),
        last.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    out
}

/// Label counts in order of first appearance.
pub fn label_distribution(entries: &[SessionHistoryEntry]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for e in entries {
        match counts.iter_mut().find(|(label, _)| *label == e.label) {
            Some((_, n)) => *n += 1,
            None => counts.push((e.label.clone(), 1)),
        }
    }
    counts
}

pub fn render_distribution(counts: &[(String, usize)], opts: RenderOptions) -> String {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    let name_width = counts.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    let mut out = String::from("Sentiment Distribution");
    for (label, n) in counts {
        let share = *n as f64 / total.max(1) as f64;
        let bar = "█".repeat((share * BAR_WIDTH as f64).round() as usize);
        out.push_str(&format!(
            "\n{label:<name_width$}  {} {:5.1}% ({n})",
            paint(&bar, distribution_color(&capitalize(label)), opts.use_color),
            share * 100.0
        ));
    }
    out
}

/// Counts per fixed-width bucket over `[0, 1]`; 1.0 falls in the last bucket.
/// Non-finite scores are skipped.
pub fn score_histogram(scores: impl IntoIterator<Item = f64>) -> [usize; HISTOGRAM_BUCKETS] {
    let mut buckets = [0usize; HISTOGRAM_BUCKETS];
    for s in scores.into_iter().filter(|s| s.is_finite()) {
        let idx = (s.clamp(0.0, 1.0) * HISTOGRAM_BUCKETS as f64).floor() as usize;
        buckets[idx.min(HISTOGRAM_BUCKETS - 1)] += 1;
    }
    buckets
}

pub fn render_histogram(buckets: &[usize; HISTOGRAM_BUCKETS]) -> String {
    let max = buckets.iter().copied().max().unwrap_or(0).max(1);
    let step = 1.0 / HISTOGRAM_BUCKETS as f64;

    let mut out = String::from("Sentiment Score Distribution\nScore       Count");
    for (i, &count) in buckets.iter().enumerate() {
        let lo = i as f64 * step;
        let bar_len = (count as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
        out.push_str(&format!("\n{:.2}-{:.2} │{}", lo, lo + step, "▇".repeat(bar_len)));
        if count > 0 {
            out.push_str(&format!(" {count}"));
        }
    }
    out
}

/// Five-number summary with linearly interpolated quartiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub count: usize,
}

pub fn box_summary(scores: &[f64]) -> Option<BoxSummary> {
    let mut sorted: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let quantile = |q: f64| {
        let pos = q * (sorted.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    };

    Some(BoxSummary {
        min: sorted[0],
        q1: quantile(0.25),
        median: quantile(0.5),
        q3: quantile(0.75),
        max: sorted[sorted.len() - 1],
        count: sorted.len(),
    })
}

/// Box summaries per capitalized label, in order of first appearance.
/// Entries without a finite score are dropped before grouping.
pub fn score_spread(entries: &[SessionHistoryEntry]) -> Vec<(String, BoxSummary)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for e in entries.iter().filter(|e| e.score.is_finite()) {
        let label = capitalize(&e.label);
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, scores)) => scores.push(e.score),
            None => groups.push((label, vec![e.score])),
        }
    }
    groups
        .into_iter()
        .filter_map(|(label, scores)| box_summary(&scores).map(|b| (label, b)))
        .collect()
}

fn spread_line(b: &BoxSummary) -> String {
    let pos = |v: f64| (v.clamp(0.0, 1.0) * (SPREAD_WIDTH - 1) as f64).round() as usize;
    let mut cells = vec![' '; SPREAD_WIDTH];
    for c in &mut cells[pos(b.min)..=pos(b.max)] {
        *c = '─';
    }
    for c in &mut cells[pos(b.q1)..=pos(b.q3)] {
        *c = '■';
    }
    cells[pos(b.min)] = '├';
    cells[pos(b.max)] = '┤';
    cells[pos(b.median)] = '┃';
    cells.into_iter().collect()
}

pub fn render_spread(groups: &[(String, BoxSummary)], opts: RenderOptions) -> String {
    let name_width = groups
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0)
        .max("Sentiment".len());

    let mut out = String::from("Sentiment Score Spread by Label\n");
    out.push_str(&format!(
        "{:<name_width$}  0.0{}1.0  Confidence Score",
        "Sentiment",
        " ".repeat(SPREAD_WIDTH - 6)
    ));
    for (label, b) in groups {
        out.push_str(&format!(
            "\n{label:<name_width$}  {}  min {:.2} q1 {:.2} median {:.2} q3 {:.2} max {:.2} (n={})",
            paint(&spread_line(b), spread_color(label), opts.use_color),
            b.min,
            b.q1,
            b.median,
            b.q3,
            b.max,
            b.count
        ));
    }
    out
}
