//! End-to-end reconciliation over synthetic registry pools.

use mfds_core::{
    ReconcileOptions, Translations, build_final_rows, compute_aggregates, english_keys,
    find_best_match, process_rows, reconcile,
};
use mfds_model::{
    CandidateRecord, InputRow, MatchQuality, OriginalFlag, ProcessOutcome, SupplierError,
    UnmatchedReason,
};
use mfds_normalization::Cleaner;
use proptest::prelude::*;

fn record(
    item_name: &str,
    ingredient: &str,
    ingredient_eng: &str,
    permit_date: &str,
    item_seq: &str,
) -> CandidateRecord {
    CandidateRecord {
        item_name: item_name.to_string(),
        ingredient: ingredient.to_string(),
        ingredient_eng: ingredient_eng.to_string(),
        permit_date: permit_date.to_string(),
        item_seq: item_seq.to_string(),
        ..CandidateRecord::default()
    }
}

fn pemetrexed_pool() -> Vec<CandidateRecord> {
    let hydrate = "페메트렉시드이나트륨염칠수화물";
    let disodium = "페메트렉시드이나트륨";
    vec![
        record("알림타주100밀리그램", hydrate, "Pemetrexed Disodium Heptahydrate", "20060101", "S1"),
        record("알림타주500밀리그램", hydrate, "Pemetrexed Disodium Heptahydrate", "20060101", "S2"),
        record("메인타주100밀리그램", disodium, "Pemetrexed Disodium", "20150101", "S3"),
        record("알림시드주100밀리그램", hydrate, "", "20160101", "S4"),
        record("페메드주500밀리그램", disodium, "", "20170101", "S5"),
        record("페메렉스주100밀리그램", hydrate, "Pemetrexed Disodium Heptahydrate", "20180101", "S6"),
    ]
}

fn trastuzumab_pool() -> Vec<CandidateRecord> {
    let mut pool = vec![
        record("허셉틴주150밀리그램", "트라스투주맙", "Trastuzumab", "20030101", "T1"),
        record("허셉틴주440밀리그램", "트라스투주맙", "Trastuzumab", "20050101", "T2"),
        record("허쥬마주150밀리그램", "트라스투주맙", "Trastuzumab", "20140101", "T3"),
        record("삼페넷주150밀리그램", "트라스투주맙", "Trastuzumab", "20170101", "T4"),
        record("허셉트리주150밀리그램", "트라스투주맙", "Trastuzumab", "20190101", "T5"),
    ];
    for (index, candidate) in pool.iter_mut().enumerate() {
        candidate.is_new_drug = Some(index < 2);
    }
    pool
}

/// Substring search over item names, the way the local registry searches.
fn searcher(
    pool: &[CandidateRecord],
) -> impl Fn(&str) -> mfds_model::Result<Vec<CandidateRecord>> + '_ {
    move |query: &str| {
        let query = query.to_uppercase();
        Ok(pool
            .iter()
            .filter(|candidate| {
                candidate.item_name.to_uppercase().contains(&query)
                    || candidate.item_name_eng.to_uppercase().contains(&query)
            })
            .cloned()
            .collect())
    }
}

fn rows(products: &[&str]) -> Vec<InputRow> {
    products
        .iter()
        .enumerate()
        .map(|(index, product)| InputRow::new(*product).with_sequence_tag((index + 1).to_string()))
        .collect()
}

#[test]
fn pemetrexed_records_merge_across_languages() {
    let pool = pemetrexed_pool();
    let matched = vec![ProcessOutcome::Matched {
        product: "ALIMTA".to_string(),
        cleaned_key: "ALIMTA".to_string(),
        candidate: pool[0].clone(),
        quality: MatchQuality::Exact,
    }];
    let aggregates = compute_aggregates(&matched, &pool);
    let stats = aggregates.stats();
    assert_eq!(stats.len(), 1);
    let pemetrexed = &stats["PEMETREXED"];
    assert_eq!(pemetrexed.generic_count, 4);
    assert_eq!(pemetrexed.min_permit_date, "20060101");
}

#[test]
fn new_drug_flag_decides_originals() {
    let pool = trastuzumab_pool();
    let input = rows(&["허셉틴주", "허쥬마주", "삼페넷주", "허셉트리주"]);
    let supplier = searcher(&pool);
    let report = reconcile(
        &input,
        &supplier,
        &pool,
        &Translations::new(),
        &ReconcileOptions::default(),
        |_, _| {},
    );

    let flags: Vec<(OriginalFlag, usize)> = report
        .final_rows
        .iter()
        .map(|row| (row.original_flag, row.generic_count))
        .collect();
    assert_eq!(
        flags,
        vec![
            (OriginalFlag::Original, 3),
            (OriginalFlag::NotOriginal, 3),
            (OriginalFlag::NotOriginal, 3),
            (OriginalFlag::NotOriginal, 3),
        ]
    );
    assert_eq!(report.groups["TRASTUZUMAB"].generic_count, 3);
}

#[test]
fn single_product_group_has_zero_generics() {
    let pool = vec![
        record("글리벡필름코팅정100밀리그램", "이마티닙메실산염", "Imatinib Mesylate", "20030101", "G1"),
        record("글리벡필름코팅정400밀리그램", "이마티닙메실산염", "Imatinib Mesylate", "20060101", "G2"),
    ];
    let outcomes = vec![ProcessOutcome::Matched {
        product: "글리벡".to_string(),
        cleaned_key: "글리벡".to_string(),
        candidate: pool[1].clone(),
        quality: MatchQuality::Fuzzy,
    }];
    let report = build_final_rows(&outcomes, &[InputRow::new("글리벡")], &pool);
    assert_eq!(report.final_rows[0].generic_count, 0);
    assert_eq!(report.final_rows[0].original_flag, OriginalFlag::Original);
}

#[test]
fn english_key_without_english_names_falls_back_to_fuzzy() {
    let pool = vec![
        record("글리벡정", "이마티닙메실산염", "", "20050101", "G1"),
        record("글리벡필름코팅정", "이마티닙메실산염", "", "20030101", "G2"),
    ];
    let best = find_best_match("GLIVEC", &pool).unwrap();
    assert_eq!(best.quality, MatchQuality::Fuzzy);
    assert_eq!(best.candidate.item_seq, "G2");
}

#[test]
fn pipeline_classifies_every_row() {
    let mut pool = pemetrexed_pool();
    pool.push(record("성분없음정", "", "", "20200101", "S7"));
    let input = rows(&["ALIMTA", "알림타주", "  ", "Unknown Drug", "성분없음정"]);
    let translations = Translations::from_pairs([("alimta", "알림타주")]);
    let supplier = searcher(&pool);

    let report = reconcile(
        &input,
        &supplier,
        &pool,
        &translations,
        &ReconcileOptions::default(),
        |_, _| {},
    );

    let rendered = report
        .final_rows
        .iter()
        .map(|row| {
            format!(
                "{}|{}|{}|{}|{}",
                row.sequence_tag.as_deref().unwrap_or_default(),
                row.original_flag,
                row.generic_count,
                row.item_name,
                row.match_quality.map_or("-", MatchQuality::as_str),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(rendered, @r"
    1|O|4|알림타주, 메인타주, 알림시드주, 페메드주, 페메렉스주|FUZZY
    2|O|4|알림타주, 메인타주, 알림시드주, 페메드주, 페메렉스주|FUZZY
    3|X|0||-
    4|X|0||-
    5|X|0||-
    ");

    let unmatched: Vec<(&str, UnmatchedReason, usize)> = report
        .unmatched_rows
        .iter()
        .map(|row| (row.cleaned_key.as_str(), row.reason, row.candidate_count))
        .collect();
    assert_eq!(
        unmatched,
        vec![
            ("", UnmatchedReason::NoResult, 0),
            ("UNKNOWN DRUG", UnmatchedReason::NoResultEnglish, 0),
            ("성분없음정", UnmatchedReason::NoIngredient, 1),
        ]
    );

    let summary = &report.summary;
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.distinct_keys, 4);
    assert_eq!(summary.translated_keys, 1);
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.fuzzy, 2);
    assert_eq!(summary.unmatched_total(), 3);
    assert_eq!(summary.unmatched_for(UnmatchedReason::NoIngredient), 1);
    assert_eq!(summary.pool_records, 7);
}

#[test]
fn translated_outcome_keeps_english_key() {
    let pool = pemetrexed_pool();
    let translations = Translations::from_pairs([("ALIMTA", "알림타주")]);
    let supplier = searcher(&pool);
    let outcomes = process_rows(
        &rows(&["Alimta"]),
        &supplier,
        &translations,
        &ReconcileOptions::default(),
        |_, _| {},
    );
    assert_eq!(outcomes[0].cleaned_key(), "ALIMTA");
    assert_eq!(outcomes[0].candidate().map(|c| c.item_seq.as_str()), Some("S1"));
}

#[test]
fn translated_key_is_matched_as_english() {
    let mut branded = record("글리벡정100밀리그램", "이매티닙메실산염", "Imatinib Mesylate", "20010101", "B");
    branded.item_name_eng = "Glivec".to_string();
    let pool = vec![
        record("글리벡정", "이매티닙메실산염", "Imatinib Mesylate", "20050101", "A"),
        branded,
    ];
    let translations = Translations::from_pairs([("GLIVEC", "글리벡정")]);
    let outcomes = process_rows(
        &rows(&["Glivec"]),
        &searcher(&pool),
        &translations,
        &ReconcileOptions::default(),
        |_, _| {},
    );
    assert_eq!(outcomes[0].cleaned_key(), "GLIVEC");
    assert!(matches!(
        &outcomes[0],
        ProcessOutcome::Matched { candidate, quality: MatchQuality::Exact, .. }
            if candidate.item_seq == "B"
    ));
}

#[test]
fn translated_english_key_without_hits_is_english_no_result() {
    let empty = |_query: &str| -> mfds_model::Result<Vec<CandidateRecord>> { Ok(Vec::new()) };
    let translations = Translations::from_pairs([("GLIVEC", "글리벡정")]);
    let outcomes = process_rows(
        &rows(&["Glivec", "글리벡정"]),
        &empty,
        &translations,
        &ReconcileOptions::default(),
        |_, _| {},
    );
    let reasons: Vec<UnmatchedReason> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            ProcessOutcome::Unmatched { reason, .. } => Some(*reason),
            ProcessOutcome::Matched { .. } => None,
        })
        .collect();
    assert_eq!(
        reasons,
        vec![UnmatchedReason::NoResultEnglish, UnmatchedReason::NoResult]
    );
}

#[test]
fn translation_keys_are_cleaned_like_input_keys() {
    let pool = vec![record("글리벡정", "이매티닙메실산염", "Imatinib Mesylate", "20050101", "A")];
    let queries = std::cell::RefCell::new(Vec::new());
    let recording = |query: &str| {
        queries.borrow_mut().push(query.to_string());
        searcher(&pool)(query)
    };
    let translations = Translations::from_pairs([("Glivec tab.", "글리벡정.")]);

    let report = reconcile(
        &rows(&["GLIVEC TAB>>"]),
        &recording,
        &pool,
        &translations,
        &ReconcileOptions::default(),
        |_, _| {},
    );
    assert_eq!(*queries.borrow(), vec!["글리벡정".to_string()]);
    assert_eq!(report.summary.translated_keys, 1);
    assert_eq!(report.summary.matched, 1);
}

#[test]
fn supplier_failure_is_row_scoped() {
    let failing = |_query: &str| -> mfds_model::Result<Vec<CandidateRecord>> {
        Err(SupplierError::Unavailable("registry offline".to_string()))
    };
    let outcomes = process_rows(
        &rows(&["허셉틴주", ""]),
        &failing,
        &Translations::new(),
        &ReconcileOptions::default(),
        |_, _| {},
    );
    assert_eq!(outcomes.len(), 2);
    assert!(matches!(
        outcomes[0],
        ProcessOutcome::Unmatched {
            reason: UnmatchedReason::SourceError,
            candidate_count: 0,
            ..
        }
    ));
    assert!(matches!(
        outcomes[1],
        ProcessOutcome::Unmatched {
            reason: UnmatchedReason::NoResult,
            ..
        }
    ));
}

#[test]
fn distinct_keys_are_searched_once() {
    let pool = trastuzumab_pool();
    let calls = std::cell::Cell::new(0);
    let counting = |query: &str| {
        calls.set(calls.get() + 1);
        searcher(&pool)(query)
    };
    let mut progress = Vec::new();
    process_rows(
        &rows(&["허셉틴주", "허셉틴주.", "허쥬마주", "허셉틴주"]),
        &counting,
        &Translations::new(),
        &ReconcileOptions::default(),
        |done, total| progress.push((done, total)),
    );
    assert_eq!(calls.get(), 2);
    assert_eq!(progress, vec![(1, 2), (2, 2)]);
}

#[test]
fn english_keys_lists_untranslated_candidates() {
    let input = rows(&["Herceptin 150mg", "허셉틴주", "herceptin 150MG", "Glivec", ""]);
    let keys = english_keys(&input, &Cleaner::default());
    assert_eq!(keys, vec!["HERCEPTIN 150MG", "GLIVEC"]);
}

#[test]
fn repeated_runs_are_identical() {
    let pool = pemetrexed_pool();
    let input = rows(&["알림타주", "메인타주", "페메드주"]);
    let supplier = searcher(&pool);
    let run = || {
        reconcile(
            &input,
            &supplier,
            &pool,
            &Translations::new(),
            &ReconcileOptions::default(),
            |_, _| {},
        )
    };
    let first = run();
    let second = run();
    assert_eq!(first.final_rows, second.final_rows);
    assert_eq!(first.groups, second.groups);
}

fn arb_pool() -> impl Strategy<Value = Vec<CandidateRecord>> {
    let names = prop::sample::select(vec!["알림타주", "메인타주", "허셉틴주", "허쥬마주", "타다포스정"]);
    let ingredients = prop::sample::select(vec![
        ("페메트렉시드이나트륨", "Pemetrexed Disodium"),
        ("페메트렉시드", ""),
        ("트라스투주맙", "Trastuzumab"),
        ("", ""),
    ]);
    let entry = (
        names,
        ingredients,
        2000u32..2024,
        prop::option::of(any::<bool>()),
        0u32..40,
    );
    prop::collection::vec(entry, 0..24).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(name, (kor, eng), year, flag, seq)| CandidateRecord {
                item_name: format!("{name}{}밀리그램", seq % 3 * 100 + 100),
                ingredient: kor.to_string(),
                ingredient_eng: eng.to_string(),
                permit_date: format!("{year}0101"),
                item_seq: format!("S{seq}"),
                is_new_drug: flag,
                ..CandidateRecord::default()
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn one_final_row_per_input_row(
        pool in arb_pool(),
        products in prop::collection::vec("[가-힣A-Z ]{0,6}|알림타주|허셉틴주", 0..12),
    ) {
        let input: Vec<InputRow> = products.iter().map(InputRow::new).collect();
        let supplier = searcher(&pool);
        let report = reconcile(
            &input,
            &supplier,
            &pool,
            &Translations::new(),
            &ReconcileOptions::default(),
            |_, _| {},
        );
        prop_assert_eq!(report.final_rows.len(), input.len());
        prop_assert_eq!(
            report.summary.matched + report.summary.unmatched_total(),
            input.len()
        );
    }

    #[test]
    fn generic_count_stays_below_distinct_products(pool in arb_pool()) {
        let aggregates = compute_aggregates(&[], &pool);
        for group in aggregates.groups() {
            prop_assert!(group.distinct_products() >= 1);
            prop_assert!(group.generic_count < group.distinct_products());
            prop_assert!(!group.original_names.is_empty());
        }
    }
}
