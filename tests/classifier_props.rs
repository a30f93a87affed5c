/// Property tests for the classifier's partition and determinism guarantees.
use mainframe_lens::classifier::categories::Category;
use mainframe_lens::{UploadedFile, classify_files};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

fn file_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z]{1,8}",
        "[A-Za-z]{1,8}\\.(cbl|CPY|jcl|ctl|bms|md|txt|dat|xyz)",
    ]
}

fn content() -> impl Strategy<Value = String> {
    prop_oneof![
        ".{0,40}",
        Just("PROGRAM-ID. X.\n MAPSET DFHMSD".to_string()),
        Just("//STEP1 EXEC PGM=SORT".to_string()),
        Just("01 REC.\n 05 F PIC X.".to_string()),
        Just(String::new()),
    ]
}

proptest! {
    #[test]
    fn buckets_partition_input(files in prop::collection::btree_map(file_name(), content(), 0..24)) {
        let input: BTreeMap<String, UploadedFile> = files
            .iter()
            .map(|(k, v)| (k.clone(), UploadedFile::Text(v.clone())))
            .collect();
        let result = classify_files(input);

        prop_assert_eq!(result.total(), files.len());
        prop_assert_eq!(result.iter().count(), Category::ALL.len());

        let mut seen = HashSet::new();
        for (category, bucket) in result.iter() {
            for file in bucket {
                prop_assert!(seen.insert(file.file_name.clone()));
                prop_assert_eq!(file.category, category);
                prop_assert!(file.lines >= 1);
            }
        }
        prop_assert_eq!(seen.len(), files.len());
    }

    #[test]
    fn classification_is_idempotent(files in prop::collection::btree_map(file_name(), content(), 0..24)) {
        let input: Vec<(String, UploadedFile)> = files
            .into_iter()
            .map(|(k, v)| (k, UploadedFile::Text(v)))
            .collect();
        let first = classify_files(input.clone());
        let second = classify_files(input);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn cobol_keywords_outrank_bms() {
    let result = classify_files(vec![(
        "SCREEN01",
        UploadedFile::from("PROGRAM-ID. SCREEN01.\nMAPSET DFHMSD TYPE=MAP"),
    )]);
    assert_eq!(result.get(Category::CobolCode).len(), 1);
    assert!(result.get(Category::BmsMaps).is_empty());
}
