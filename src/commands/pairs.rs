use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::PairsArgs;
use crate::matching::match_files;
use crate::model::MatchOutcome;
use crate::util::ensure_existing_directory;

pub fn run(args: PairsArgs) -> Result<()> {
    ensure_existing_directory(&args.reference, "groundtruth")?;
    ensure_existing_directory(&args.candidates, "candidate")?;

    let matching = match_files(&args.reference, &args.candidates, &args.gt_suffix)
        .context("failed to match groundtruth and candidate files")?;
    info!(
        pairs = matching.pairs.len(),
        ambiguous = matching.ambiguous.len(),
        "pairs dry-run complete"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &matching)
            .context("failed to serialize pairs listing")?;
        writeln!(output)?;
    } else {
        write_pairs_listing(&mut output, &matching)?;
    }
    output.flush()?;
    Ok(())
}

fn write_pairs_listing<W: Write>(output: &mut W, matching: &MatchOutcome) -> io::Result<()> {
    for pair in &matching.pairs {
        let gt_type = pair.gt_type.map_or("", |gt_type| gt_type.as_str());
        writeln!(
            output,
            "pair\t{}\t{}\t{}",
            pair.groundtruth.display(),
            pair.candidate.display(),
            gt_type
        )?;
    }
    for path in &matching.unmatched_groundtruth {
        writeln!(output, "unmatched-groundtruth\t{}", path.display())?;
    }
    for path in &matching.unmatched_candidates {
        writeln!(output, "unmatched-candidate\t{}", path.display())?;
    }
    for ambiguous in &matching.ambiguous {
        for candidate in &ambiguous.candidates {
            writeln!(
                output,
                "ambiguous\t{}\t{}",
                ambiguous.groundtruth.display(),
                candidate.display()
            )?;
        }
    }
    for path in &matching.shared_candidates {
        writeln!(output, "shared-candidate\t{}", path.display())?;
    }
    writeln!(
        output,
        "pairs={} unmatched_groundtruth={} unmatched_candidates={} ambiguous={}",
        matching.pairs.len(),
        matching.unmatched_groundtruth.len(),
        matching.unmatched_candidates.len(),
        matching.ambiguous.len()
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::model::{AmbiguousMatch, GroundtruthCandidatePair, GroundtruthType};

    #[test]
    fn listing_has_one_line_per_entry_and_a_summary() {
        let matching = MatchOutcome {
            pairs: vec![GroundtruthCandidatePair {
                stem: "page-01".into(),
                groundtruth: PathBuf::from("gt/page-01.art.gt.xml"),
                candidate: PathBuf::from("ocr/page-01.xml"),
                segments: Vec::new(),
                gt_type: Some(GroundtruthType::Article),
            }],
            unmatched_groundtruth: vec![PathBuf::from("gt/page-02.gt.xml")],
            unmatched_candidates: Vec::new(),
            ambiguous: vec![AmbiguousMatch {
                groundtruth: PathBuf::from("gt/page-03.gt.xml"),
                candidates: vec![PathBuf::from("ocr/page-03.xml"), PathBuf::from("ocr/page-03-alt.xml")],
            }],
            shared_candidates: Vec::new(),
        };

        let mut buffer = Vec::new();
        write_pairs_listing(&mut buffer, &matching).unwrap();
        let listing = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "pair\tgt/page-01.art.gt.xml\tocr/page-01.xml\tarticle");
        assert!(lines[1].starts_with("unmatched-groundtruth\t"));
        assert!(lines[3].ends_with("page-03-alt.xml"));
        assert_eq!(lines[4], "pairs=1 unmatched_groundtruth=1 unmatched_candidates=0 ambiguous=1");
    }
}
