use carta_core::matrix::{ComparisonMatrix, MatrixCell};
use carta_core::responses::NearbyResponse;

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Render a simple aligned table for string rows.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(std::string::String::len)
                .max()
                .unwrap_or(0)
                .max(header.len())
                .max(6)
        })
        .collect();

    fit_widths(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(widths.iter())
        .map(|(header, width)| {
            let text = truncate_text(header, *width);
            format_cell(&text, *width, false, false)
        })
        .collect::<Vec<_>>()
        .join("  ");

    let divider = "-".repeat(strip_ansi(&header_line).len());

    let row_lines = rows
        .iter()
        .map(|row| {
            widths
                .iter()
                .enumerate()
                .map(|(index, width)| {
                    let value = row.get(index).cloned().unwrap_or_else(|| "-".to_string());
                    let truncated = truncate_text(&value, *width);
                    let numeric = looks_numeric(&truncated);
                    let colored = if options.color {
                        colorize_classification(&truncated)
                    } else {
                        truncated
                    };
                    format_cell(&colored, *width, numeric, options.color)
                })
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>();

    let mut lines = Vec::with_capacity(2 + row_lines.len());
    lines.push(header_line);
    lines.push(divider);
    lines.extend(row_lines);
    lines.join("\n")
}

/// Matrix rows by measure columns, one `raw pNN class` cell each.
#[must_use]
pub fn render_matrix(matrix: &ComparisonMatrix, options: TableOptions) -> String {
    let mut headers: Vec<&str> = vec!["row", "miles"];
    headers.extend(matrix.columns.iter().map(|c| c.code.as_str()));

    let rows = matrix
        .rows
        .iter()
        .map(|row| {
            let label = if row.degenerate {
                format!("{} (no competitors)", row.label)
            } else {
                row.label.clone()
            };
            let mut line = vec![label, format_miles(row.distance_miles)];
            line.extend(row.cells.iter().map(format_matrix_cell));
            line
        })
        .collect::<Vec<_>>();

    let mut out = format!(
        "{} within {} mi, snapshot {}\n\n",
        matrix.focal_facility_id, matrix.radius_miles, matrix.snapshot
    );
    out.push_str(&render_entity_table(&headers, &rows, options));

    if let Some(report) = &matrix.benchmark {
        let aggregate = &report.aggregate;
        let pct = |value: Option<f64>| {
            value.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0))
        };
        let scope = aggregate.key.as_deref().map_or_else(
            || aggregate.level.to_string(),
            |key| format!("{} {key}", aggregate.level),
        );
        let rows = vec![vec![
            scope,
            aggregate.total_count.to_string(),
            pct(report.percentages.dual_eligible_pct),
            pct(report.percentages.aged_pct),
            pct(report.percentages.disabled_pct),
            pct(report.percentages.advantage_pct),
        ]];
        out.push_str("\n\n");
        out.push_str(&render_entity_table(
            &["benchmark", "total", "dual", "aged", "disabled", "advantage"],
            &rows,
            options,
        ));
    }
    out
}

/// Proximity results in distance order.
#[must_use]
pub fn render_nearby(response: &NearbyResponse, options: TableOptions) -> String {
    if response.results.is_empty() {
        return String::from("(no rows)");
    }
    let rows = response
        .results
        .iter()
        .map(|r| {
            vec![
                r.facility.id.clone(),
                r.facility.name.clone(),
                r.facility.facility_type.to_string(),
                format_miles(Some(r.distance_miles)),
            ]
        })
        .collect::<Vec<_>>();
    render_entity_table(&["id", "name", "type", "miles"], &rows, options)
}

fn format_miles(distance: Option<f64>) -> String {
    distance.map_or_else(|| "-".to_string(), |d| format!("{d:.2}"))
}

fn format_matrix_cell(cell: &MatrixCell) -> String {
    match (cell.raw_score, cell.percentile) {
        (None, _) => "-".to_string(),
        (Some(raw), Some(pct)) => format!("{raw:.2} p{:.0} {}", pct * 100.0, cell.classification),
        (Some(raw), None) => format!("{raw:.2} {}", cell.classification),
    }
}

fn fit_widths(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };

    if widths.is_empty() {
        return;
    }

    let separators = widths.len().saturating_sub(1) * 2;
    let mut total = widths.iter().sum::<usize>() + separators;
    if total <= max_width {
        return;
    }

    loop {
        if total <= max_width {
            break;
        }

        let mut candidate_idx = None;
        let mut candidate_width = 0usize;
        for (idx, width) in widths.iter().enumerate() {
            let min_width = headers[idx].len().max(6);
            if *width > min_width && *width > candidate_width {
                candidate_idx = Some(idx);
                candidate_width = *width;
            }
        }

        let Some(idx) = candidate_idx else {
            break;
        };

        widths[idx] = widths[idx].saturating_sub(1);
        total = widths.iter().sum::<usize>() + separators;
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }

    let mut out = String::new();
    for ch in value.chars().take(width - 1) {
        out.push(ch);
    }
    out.push('…');
    out
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | ','))
}

fn format_cell(value: &str, width: usize, numeric: bool, has_ansi: bool) -> String {
    let plain_len = if has_ansi {
        strip_ansi(value).len()
    } else {
        value.len()
    };
    let pad = width.saturating_sub(plain_len);
    if numeric {
        format!("{}{}", " ".repeat(pad), value)
    } else {
        format!("{}{}", value, " ".repeat(pad))
    }
}

/// Colour a matrix cell by its trailing classification word.
fn colorize_classification(value: &str) -> String {
    let code = match value.rsplit(' ').next() {
        Some("best") => Some("32"),
        Some("worst") => Some("31"),
        Some("no_data") => Some("2"),
        _ => None,
    };

    match code {
        Some(code) => format!("\u{1b}[{code}m{value}\u{1b}[0m"),
        None => value.to_string(),
    }
}

fn strip_ansi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' && chars.peek() == Some(&'[') {
            let _ = chars.next();
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}
