use std::collections::HashMap;

use fencepack_core::{build_archive, extract_files_from_str, ExtractedFile};
use proptest::prelude::*;

fn arb_file() -> impl Strategy<Value = ExtractedFile> {
    (
        "[a-z]{1,10}",
        prop_oneof![Just("a.txt".to_owned()), Just("src/lib.rs".to_owned()), "[A-Za-z0-9_./-]{1,24}"],
        "[^`]{0,64}",
    )
        .prop_map(|(language, filename, content)| ExtractedFile {
            language,
            filename,
            content,
        })
}

fn render(files: &[ExtractedFile]) -> String {
    let mut out = String::from("Here is your module.\n\n");
    for file in files {
        out.push_str(&format!(
            "```{} file=\"{}\"\n{}```\n\nSome explanation.\n\n",
            file.language, file.filename, file.content
        ));
    }
    out
}

proptest! {
    /// Property: extraction never panics and is a pure function of its input
    #[test]
    fn prop_extraction_is_total_and_idempotent(input in ".*") {
        let first = extract_files_from_str(&input);
        let second = extract_files_from_str(&input);
        prop_assert_eq!(first, second);
    }

    /// Property: rendered annotated blocks come back unchanged and in order
    #[test]
    fn prop_annotated_blocks_round_trip(files in prop::collection::vec(arb_file(), 0..8)) {
        let extracted = extract_files_from_str(&render(&files));
        prop_assert_eq!(extracted, files);
    }

    /// Property: archive keeps one entry per filename holding the last body
    #[test]
    fn prop_archive_is_last_write_wins(files in prop::collection::vec(arb_file(), 1..12)) {
        let archive = build_archive(&files).unwrap();

        let mut last: HashMap<&str, &str> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for file in &files {
            if last.insert(&file.filename, &file.content).is_none() {
                order.push(&file.filename);
            }
        }

        prop_assert_eq!(archive.len(), last.len());
        prop_assert_eq!(archive.paths(), order.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        for (name, body) in last {
            prop_assert_eq!(archive.get(name), Some(body.as_bytes()));
        }
    }
}
