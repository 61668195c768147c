use anyhow::{Context, Result};
use similar::TextDiff;
use std::path::Path;

const CONTEXT_LINES: usize = 3;

/// Line-based unified diff of two files, `None` when their contents match
pub fn compare_files(a: &Path, b: &Path) -> Result<Option<String>> {
    let left = std::fs::read_to_string(a).with_context(|| format!("cannot read {}", a.display()))?;
    let right =
        std::fs::read_to_string(b).with_context(|| format!("cannot read {}", b.display()))?;

    Ok(diff_texts(
        &left,
        &right,
        &a.display().to_string(),
        &b.display().to_string(),
    ))
}

pub fn diff_texts(left: &str, right: &str, left_name: &str, right_name: &str) -> Option<String> {
    if left == right {
        return None;
    }
    let text_diff = TextDiff::from_lines(left, right);
    Some(
        text_diff
            .unified_diff()
            .context_radius(CONTEXT_LINES)
            .header(left_name, right_name)
            .to_string(),
    )
}
