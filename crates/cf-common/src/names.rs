//! Helpers for concatenated compressor-group names.
//!
//! A forecast request names its mixture groups as strings like
//! `"zlib_ppmd_bzip2"`: individual compressor names joined by underscores.
//! The same convention names the synthetic mixture column a group produces.

use crate::{CompressorName, CompressorNames};

/// Separator between compressor names inside one group string.
pub const GROUP_SEPARATOR: char = '_';

/// Splits one concatenated group string into individual compressor names.
pub fn split_group(concatenated: &str) -> CompressorNames {
    concatenated
        .split(GROUP_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Splits every group string of a request.
pub fn split_groups(concatenated: &[String]) -> Vec<CompressorNames> {
    concatenated.iter().map(|s| split_group(s)).collect()
}

/// Joins compressor names back into a group string.
pub fn concatenate_names(names: &[CompressorName]) -> String {
    names.join("_")
}

/// The sorted set of distinct compressor names mentioned across all groups.
pub fn distinct_names(groups: &[CompressorNames]) -> CompressorNames {
    let mut all: CompressorNames = groups.iter().flatten().cloned().collect();
    all.sort();
    all.dedup();
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_single_name() {
        assert_eq!(split_group("zlib"), vec!["zlib".to_string()]);
    }

    #[test]
    fn test_split_group_of_three() {
        assert_eq!(
            split_group("zlib_ppmd_bzip2"),
            vec!["zlib".to_string(), "ppmd".to_string(), "bzip2".to_string()]
        );
    }

    #[test]
    fn test_concatenate_round_trip() {
        let names = vec!["zstd".to_string(), "automation".to_string()];
        assert_eq!(split_group(&concatenate_names(&names)), names);
    }

    #[test]
    fn test_distinct_names_sorted_unique() {
        let groups = split_groups(&["zlib_ppmd".to_string(), "bzip2_zlib".to_string()]);
        assert_eq!(
            distinct_names(&groups),
            vec!["bzip2".to_string(), "ppmd".to_string(), "zlib".to_string()]
        );
    }

    #[test]
    fn test_empty_group_string_yields_no_names() {
        assert!(split_group("").is_empty());
    }
}
