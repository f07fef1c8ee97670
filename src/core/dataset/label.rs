use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// What the statistics pass needs from one YOLO label file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSummary {
    /// Number of lines in the file, blank lines included
    pub annotation_count: usize,
    pub class_ids: BTreeSet<i64>,
}

#[derive(Error, Debug)]
pub enum LabelParseError {
    #[error("failed to read label file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: class id {token:?} is not an integer")]
    InvalidClassId { line: usize, token: String },
}

/// Summarize YOLO label text.
///
/// Format per line: `class_id x_center y_center width height`. Only the
/// first token matters here. A single bad class id rejects the whole file so
/// that a half-parsed file never leaks partial class ids into the aggregate.
pub fn parse_label_summary(content: &str) -> Result<LabelSummary, LabelParseError> {
    let mut summary = LabelSummary::default();

    for (idx, line) in content.lines().enumerate() {
        summary.annotation_count += 1;

        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        let class_id = token
            .parse::<i64>()
            .map_err(|_| LabelParseError::InvalidClassId {
                line: idx + 1,
                token: token.to_string(),
            })?;
        summary.class_ids.insert(class_id);
    }

    Ok(summary)
}

/// Read and summarize a label file
pub fn read_label_summary(label_path: &Path) -> Result<LabelSummary, LabelParseError> {
    let content = fs::read_to_string(label_path)?;
    parse_label_summary(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_lines_and_collects_classes() {
        let content = "0 0.5 0.5 0.1 0.2\n1 0.3 0.3 0.1 0.1\n0 0.7 0.2 0.05 0.1\n";
        let summary = parse_label_summary(content).unwrap();
        assert_eq!(summary.annotation_count, 3);
        assert_eq!(summary.class_ids, BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_blank_lines_count_but_add_no_class() {
        let summary = parse_label_summary("2 0.1 0.1 0.1 0.1\n\n   \n").unwrap();
        assert_eq!(summary.annotation_count, 3);
        assert_eq!(summary.class_ids, BTreeSet::from([2]));
    }

    #[test]
    fn test_empty_file() {
        let summary = parse_label_summary("").unwrap();
        assert_eq!(summary.annotation_count, 0);
        assert!(summary.class_ids.is_empty());
    }

    #[test]
    fn test_malformed_class_rejects_file() {
        let err = parse_label_summary("0 0.5 0.5 0.1 0.1\nperson 0.5 0.5 0.1 0.1\n").unwrap_err();
        match err {
            LabelParseError::InvalidClassId { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "person");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_class_is_an_integer() {
        let summary = parse_label_summary("-1 0.5 0.5 0.1 0.1\n0 0.5 0.5 0.1 0.1").unwrap();
        assert_eq!(summary.annotation_count, 2);
        assert_eq!(summary.class_ids, BTreeSet::from([-1, 0]));
    }

    #[test]
    fn test_fractional_class_rejected() {
        assert!(parse_label_summary("1.5 0.5 0.5 0.1 0.1").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_label_summary(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, LabelParseError::Io(_)));
    }
}
