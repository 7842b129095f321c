//! Common utility functions used across modules.
//!
//! - [`check_root`] - Refuse to run without root privileges
//! - [`format_table`] - Left-aligned text table for terminal output

use crate::error::LbError;

/// Gap between table columns.
const COLUMN_GAP: usize = 2;

/// Check if running as root (effective UID == 0)
pub fn check_root() -> Result<(), LbError> {
    // SAFETY: geteuid() has no preconditions and never fails.
    let euid = unsafe { libc::geteuid() };

    if euid != 0 {
        return Err(LbError::Validation(format!(
            "'{}' must be run as root user.",
            env!("CARGO_PKG_NAME")
        )));
    }
    Ok(())
}

/// Render rows as columns padded to the widest cell, like `tabwriter`.
///
/// # Examples
/// ```
/// use proxymanager::utils::format_table;
/// let table = format_table(&["Host", "IP"], &[vec!["a".into(), "10.0.0.1".into()]]);
/// assert_eq!(table, "Host  IP\na     10.0.0.1");
/// ```
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let render = |cells: Vec<&str>| -> String {
        let last = cells.len().saturating_sub(1);
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            line.push_str(cell);
            if i < last {
                let pad = widths[i] - cell.chars().count() + COLUMN_GAP;
                line.push_str(&" ".repeat(pad));
            }
        }
        line.trim_end().to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render(headers.to_vec()));
    for row in rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table_aligns_columns() {
        let table = format_table(
            &["Host", "IP Address", "Enabled"],
            &[
                vec!["node-a".into(), "10.0.0.1".into(), "false".into()],
                vec!["b".into(), "10.0.0.22".into(), "true".into()],
            ],
        );
        let expected = "\
Host    IP Address  Enabled
node-a  10.0.0.1    false
b       10.0.0.22   true";
        assert_eq!(table, expected);
    }

    #[test]
    fn test_format_table_trims_empty_last_column() {
        let table = format_table(&["A", "B"], &[vec!["x".into(), String::new()]]);
        assert_eq!(table, "A  B\nx");
    }

    #[test]
    fn test_format_table_no_rows() {
        assert_eq!(format_table(&["Host", "IP"], &[]), "Host  IP");
    }

    #[test]
    fn test_check_root_matches_euid() {
        let is_root = unsafe { libc::geteuid() } == 0;
        assert_eq!(check_root().is_ok(), is_root);
    }
}
