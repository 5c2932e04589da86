//! Pairs groundtruth files with candidate files across two directory trees.

use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::{EvalError, EvalResult};
use crate::model::{AmbiguousMatch, GroundtruthCandidatePair, GroundtruthType, MatchOutcome};

/// Directory name that only structures the groundtruth tree.
pub const IGNORED_SEGMENT: &str = "GT-PAGE";

#[derive(Debug, Clone)]
struct CandidateFile {
    stem: String,
    path: PathBuf,
}

/// Groundtruth stem with the suffix marker and an optional type label removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundtruthStem {
    pub stem: String,
    pub gt_type: Option<GroundtruthType>,
}

pub struct StemStripper {
    suffix: String,
}

impl StemStripper {
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
        }
    }

    /// `<stem>.<label><suffix>` yields a type label when `label` has at least
    /// three ASCII letters; otherwise only the suffix is removed.
    pub fn strip(&self, stem: &str) -> GroundtruthStem {
        let Some(base) = stem.strip_suffix(self.suffix.as_str()).filter(|_| !self.suffix.is_empty())
        else {
            return GroundtruthStem {
                stem: stem.to_string(),
                gt_type: None,
            };
        };

        match base.rsplit_once('.') {
            Some((head, label))
                if !head.is_empty()
                    && label.len() >= 3
                    && label.chars().all(|c| c.is_ascii_alphabetic()) =>
            {
                GroundtruthStem {
                    stem: head.to_string(),
                    gt_type: GroundtruthType::from_label(&label.to_ascii_lowercase()),
                }
            }
            _ => GroundtruthStem {
                stem: base.to_string(),
                gt_type: None,
            },
        }
    }
}

/// Walks both trees and pairs every groundtruth file with the single
/// candidate in the same relative directory whose stem starts with the
/// groundtruth stem.
pub fn match_files(
    groundtruth_root: &Path,
    candidate_root: &Path,
    gt_suffix: &str,
) -> EvalResult<MatchOutcome> {
    let stripper = StemStripper::new(gt_suffix);

    let mut candidates: BTreeMap<PathBuf, Vec<CandidateFile>> = BTreeMap::new();
    for path in walk_files(candidate_root)? {
        let Some(stem) = file_stem(&path) else {
            continue;
        };
        let directory = relative_directory(candidate_root, &path);
        candidates
            .entry(directory)
            .or_default()
            .push(CandidateFile { stem, path });
    }

    let mut outcome = MatchOutcome::default();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for groundtruth in walk_files(groundtruth_root)? {
        let Some(raw_stem) = file_stem(&groundtruth) else {
            continue;
        };
        let stripped = stripper.strip(&raw_stem);
        let segments = segments(&relative_directory(groundtruth_root, &groundtruth));
        let directory: PathBuf = segments.iter().collect();

        let matches: Vec<&CandidateFile> = candidates
            .get(&directory)
            .map(|files| {
                files
                    .iter()
                    .filter(|file| file.stem.starts_with(&stripped.stem))
                    .collect()
            })
            .unwrap_or_default();

        match matches.as_slice() {
            [] => outcome.unmatched_groundtruth.push(groundtruth),
            [single] => {
                if !claimed.insert(single.path.clone()) {
                    warn!(
                        groundtruth = %groundtruth.display(),
                        candidate = %single.path.display(),
                        "candidate already matched by another groundtruth"
                    );
                    outcome.shared_candidates.push(single.path.clone());
                }
                outcome.pairs.push(GroundtruthCandidatePair {
                    stem: stripped.stem,
                    groundtruth,
                    candidate: single.path.clone(),
                    segments,
                    gt_type: stripped.gt_type,
                });
            }
            several => {
                let paths: Vec<PathBuf> = several.iter().map(|file| file.path.clone()).collect();
                claimed.extend(paths.iter().cloned());
                outcome.ambiguous.push(AmbiguousMatch {
                    groundtruth,
                    candidates: paths,
                });
            }
        }
    }

    outcome.unmatched_candidates = candidates
        .into_values()
        .flatten()
        .map(|file| file.path)
        .filter(|path| !claimed.contains(path))
        .collect();
    outcome.unmatched_candidates.sort();
    outcome.shared_candidates.sort();
    outcome.shared_candidates.dedup();

    Ok(outcome)
}

fn walk_files(root: &Path) -> EvalResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name().to_str()))
    {
        let entry = entry.map_err(|err| EvalError::Io {
            path: err.path().unwrap_or(root).to_path_buf(),
            source: err.into(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_hidden(name: Option<&str>) -> bool {
    name.is_some_and(|name| name.starts_with('.'))
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(ToOwned::to_owned)
}

fn relative_directory(root: &Path, file: &Path) -> PathBuf {
    file.parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Directory names below the root, without [`IGNORED_SEGMENT`].
pub fn segments(relative: &Path) -> Vec<String> {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .filter(|name| *name != IGNORED_SEGMENT)
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "x").unwrap();
        path
    }

    fn trees() -> (TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let groundtruth = dir.path().join("groundtruth");
        let candidates = dir.path().join("candidates");
        fs::create_dir_all(&groundtruth).unwrap();
        fs::create_dir_all(&candidates).unwrap();
        (dir, groundtruth, candidates)
    }

    #[test]
    fn gt_suffix_is_stripped_before_prefix_match() {
        let (_dir, groundtruth, candidates) = trees();
        let gt = touch(&groundtruth, "zeitungen/1899/page-01.gt.xml");
        let candidate = touch(&candidates, "zeitungen/1899/page-01.xml");

        let outcome = match_files(&groundtruth, &candidates, ".gt").unwrap();
        assert_eq!(outcome.pairs.len(), 1);
        let pair = &outcome.pairs[0];
        assert_eq!(pair.groundtruth, gt);
        assert_eq!(pair.candidate, candidate);
        assert_eq!(pair.stem, "page-01");
        assert_eq!(pair.segments, vec!["zeitungen", "1899"]);
        assert!(outcome.unmatched_groundtruth.is_empty());
        assert!(outcome.unmatched_candidates.is_empty());
    }

    #[test]
    fn two_prefixed_candidates_are_ambiguous() {
        let (_dir, groundtruth, candidates) = trees();
        touch(&groundtruth, "page-01.gt.xml");
        touch(&candidates, "page-01.xml");
        touch(&candidates, "page-01-alt.xml");

        let outcome = match_files(&groundtruth, &candidates, ".gt").unwrap();
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.ambiguous.len(), 1);
        assert_eq!(outcome.ambiguous[0].candidates.len(), 2);
        assert!(outcome.unmatched_candidates.is_empty());
    }

    #[test]
    fn candidate_reused_by_two_groundtruths_is_flagged() {
        let (_dir, groundtruth, candidates) = trees();
        touch(&groundtruth, "page.gt.xml");
        touch(&groundtruth, "page-1.gt.xml");
        let candidate = touch(&candidates, "page-1.xml");

        let outcome = match_files(&groundtruth, &candidates, ".gt").unwrap();
        assert_eq!(outcome.pairs.len(), 2);
        assert!(outcome.pairs.iter().all(|pair| pair.candidate == candidate));
        assert_eq!(outcome.shared_candidates, vec![candidate]);
        assert!(outcome.unmatched_candidates.is_empty());
    }

    #[test]
    fn matching_stays_within_the_same_relative_directory() {
        let (_dir, groundtruth, candidates) = trees();
        touch(&groundtruth, "a/page-01.gt.xml");
        touch(&candidates, "b/page-01.xml");

        let outcome = match_files(&groundtruth, &candidates, ".gt").unwrap();
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unmatched_groundtruth.len(), 1);
        assert_eq!(outcome.unmatched_candidates.len(), 1);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let (_dir, groundtruth, candidates) = trees();
        touch(&groundtruth, "Page-01.gt.xml");
        touch(&candidates, "page-01.xml");

        let outcome = match_files(&groundtruth, &candidates, ".gt").unwrap();
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unmatched_groundtruth.len(), 1);
    }

    #[test]
    fn type_label_is_removed_and_recorded() {
        let (_dir, groundtruth, candidates) = trees();
        touch(&groundtruth, "news/GT-PAGE/1667522809_J_0073_0001.art.gt.xml");
        touch(&candidates, "news/1667522809_J_0073_0001.xml");

        let outcome = match_files(&groundtruth, &candidates, ".gt").unwrap();
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].stem, "1667522809_J_0073_0001");
        assert_eq!(outcome.pairs[0].gt_type, Some(GroundtruthType::Article));
        assert_eq!(outcome.pairs[0].segments, vec!["news"]);
    }

    #[test]
    fn strip_handles_untyped_and_unmarked_stems() {
        let stripper = StemStripper::new(".gt");
        assert_eq!(stripper.strip("page-01.gt").stem, "page-01");
        assert_eq!(stripper.strip("page-01").stem, "page-01");
        let odd = stripper.strip("page.xyz.gt");
        assert_eq!(odd.stem, "page");
        assert_eq!(odd.gt_type, None);
        assert_eq!(stripper.strip("page.ann.gt").gt_type, Some(GroundtruthType::Announcement));
    }

    #[test]
    fn hidden_files_are_ignored() {
        let (_dir, groundtruth, candidates) = trees();
        touch(&groundtruth, ".DS_Store");
        touch(&candidates, ".hidden/page-01.xml");

        let outcome = match_files(&groundtruth, &candidates, ".gt").unwrap();
        assert!(outcome.unmatched_groundtruth.is_empty());
        assert!(outcome.unmatched_candidates.is_empty());
    }
}
