/*!
format.rs

Human-readable output helpers for the `tools` and `call` subcommands.

  - StyleOptions::detect()  (NO_COLOR disables ANSI, COLUMNS sets width)
  - color(role, text, &StyleOptions)
  - table(headers, rows, &StyleOptions)

JSON output paths do not use these helpers. Nothing here prints; callers do.
*/

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub term_width: usize,
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        Self {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            term_width: width,
        }
    }

    #[cfg(test)]
    pub fn plain(term_width: usize) -> Self {
        Self {
            use_color: false,
            term_width,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Accent,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Accent => "38;5;213",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/// Left-aligned columns separated by two spaces. The last column absorbs
/// whatever width remains and is truncated with an ellipsis.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let fixed: usize = widths[..cols - 1].iter().sum::<usize>() + (cols - 1) * 2;
    let last = cols - 1;
    widths[last] = widths[last].min(style.term_width.saturating_sub(fixed).max(8));

    let render_row = |cells: &[&str]| -> String {
        let mut line = String::new();
        for (i, &width) in widths.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            let cell = cells.get(i).copied().unwrap_or("");
            if i == last {
                line.push_str(&truncate_ellipsis(cell, width));
            } else {
                line.push_str(&format!("{cell:<width$}"));
            }
        }
        line.trim_end().to_string()
    };

    let mut out = color(Role::Accent, render_row(headers), style);
    out.push('\n');
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&color(Role::Dim, sep.join("  "), style));
    for row in rows {
        out.push('\n');
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&cells));
    }
    out
}

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}
