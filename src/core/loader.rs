use crate::domain::model::SampleItem;
use crate::utils::error::{HarnessError, Result};
use std::path::Path;

/// Reads `vendor|product` lines.
///
/// Each line is trimmed and split on its first `|`, so `a|b|c` yields `("a", "b|c")`.
/// Blank lines are skipped; a line with no `|` at all is rejected.
pub fn load_items<P: AsRef<Path>>(path: P) -> Result<Vec<SampleItem>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(HarnessError::ListNotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let items = parse_items(&content)?;
    tracing::debug!("Loaded {} items from {}", items.len(), path.display());
    Ok(items)
}

pub fn parse_items(content: &str) -> Result<Vec<SampleItem>> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(parse_line(index + 1, line))
            }
        })
        .collect()
}

fn parse_line(line_number: usize, line: &str) -> Result<SampleItem> {
    match line.split_once('|') {
        Some((vendor, product)) => Ok(SampleItem::new(vendor, product)),
        None => Err(HarnessError::MalformedLine {
            line: line_number,
            content: line.to_string(),
        }),
    }
}
