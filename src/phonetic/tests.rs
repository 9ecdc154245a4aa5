// In: src/phonetic/tests.rs

use std::sync::Arc;

use crate::error::PhonexError;
use crate::native::{mock, NativeEncoderBinding};
use crate::phonetic::{
    EncodeInput, EncodeOptions, Encoded, Metaphone3Strategy, PhonexStrategy, PhoneticChunkEncoder,
    PhoneticEncode, PhoneticEngine, PhoneticStrategy,
};
use crate::test_support::{mock_engine, strings};
use crate::types::{Algorithm, AlgorithmSelection};

fn soundex() -> PhonexStrategy {
    PhonexStrategy::new(NativeEncoderBinding::from_symbols(mock::phonex_symbols()))
}

fn metaphone3() -> Metaphone3Strategy {
    Metaphone3Strategy::new(NativeEncoderBinding::from_symbols(mock::metaphone3_symbols()))
}

//==================================================================================
// 1. Strategy Protocol
//==================================================================================

#[test]
fn test_single_input_returns_scalar_and_batch_returns_list() {
    mock::reset_counters();
    let options = EncodeOptions::default();

    let single = soundex().encode(EncodeInput::Single("dupont"), &options).unwrap();
    assert_eq!(single, Encoded::Scalar("DUPONT".to_string()));

    let values = strings(&["dupont", "bernardini"]);
    let batch = soundex().encode(EncodeInput::Batch(&values), &options).unwrap();
    assert_eq!(batch, Encoded::List(strings(&["DUPONT", "BERNARDI"])));

    assert_eq!(mock::allocations(), 2);
    assert_eq!(mock::frees(), 2);
}

#[test]
fn test_empty_inputs_are_rejected_before_any_native_call() {
    mock::reset_counters();
    let options = EncodeOptions::default();
    let empty: Vec<String> = Vec::new();

    assert!(matches!(
        soundex().encode(EncodeInput::Single(""), &options),
        Err(PhonexError::InvalidInput(_))
    ));
    assert!(matches!(
        soundex().encode(EncodeInput::Batch(&empty), &options),
        Err(PhonexError::InvalidInput(_))
    ));
    assert_eq!(mock::calls(), 0);
}

#[test]
fn test_metaphone3_pairs_and_null_handle() {
    mock::reset_counters();
    let options = EncodeOptions::default();
    let values = strings(&["Dupont", "Durand"]);

    let pairs = metaphone3().encode(EncodeInput::Batch(&values), &options).unwrap();
    assert_eq!(
        pairs,
        vec![
            ("DUPONT".to_string(), "TNOPUD".to_string()),
            ("DURAND".to_string(), "DNARUD".to_string()),
        ]
    );
    assert_eq!((mock::allocations(), mock::frees()), (1, 1));

    mock::fail_next_call();
    let result = metaphone3().encode(EncodeInput::Batch(&values), &options);
    assert!(matches!(result, Err(PhonexError::NativeAllocation(_))));
    // The null handle was never released.
    assert_eq!((mock::allocations(), mock::frees()), (1, 1));
}

#[test]
fn test_metaphone3_parse_fills_missing_codes() {
    let parsed = Metaphone3Strategy::parse("petit|PTT\nmartin|MRTN|NTRM\n\nbare\n");
    assert_eq!(
        parsed,
        vec![
            ("PTT".to_string(), String::new()),
            ("MRTN".to_string(), "NTRM".to_string()),
            (String::new(), String::new()),
        ]
    );
}

//==================================================================================
// 2. Column Encoding
//==================================================================================

#[test]
fn test_every_strategy_releases_each_buffer_once() {
    mock::reset_counters();
    let engine = mock_engine();
    let values = strings(&["dupont", "petit"]);

    for algorithm in Algorithm::ALL {
        let columns = engine.encode(algorithm, &values).unwrap();
        assert_eq!(columns.len(), algorithm.width());
        assert!(columns.iter().all(|column| column.len() == values.len()));
    }
    assert_eq!(mock::calls(), 3);
    assert_eq!(mock::allocations(), 3);
    assert_eq!(mock::frees(), 3);
}

#[test]
fn test_blank_values_stay_blank_and_are_not_sent() {
    mock::reset_counters();
    let engine = mock_engine();
    let values = strings(&["dupont", "  ", "", "durand"]);

    let columns = engine.encode(Algorithm::Soundex, &values).unwrap();
    assert_eq!(columns, vec![strings(&["DUPONT", "", "", "DURAND"])]);

    let columns = engine.encode(Algorithm::Metaphone3, &values).unwrap();
    assert_eq!(columns[0], strings(&["DUPONT", "", "", "DURAND"]));
    assert_eq!(columns[1], strings(&["TNOPUD", "", "", "DNARUD"]));

    mock::reset_counters();
    let columns = engine.encode(Algorithm::Metaphone, &strings(&["", " "])).unwrap();
    assert_eq!(columns, vec![strings(&["", ""])]);
    assert_eq!(mock::calls(), 0);
}

#[test]
fn test_separator_inside_a_value_does_not_split_it() {
    let engine = mock_engine();
    let columns = engine
        .encode(Algorithm::Soundex, &strings(&["jean|pierre", "anne"]))
        .unwrap();
    assert_eq!(columns, vec![strings(&["JEANPIER", "ANNE"])]);
}

#[test]
fn test_short_native_output_is_a_mismatch_and_still_released() {
    mock::reset_counters();
    let engine = mock_engine();

    mock::drop_last_code_next_call();
    let result = engine.encode(Algorithm::Metaphone, &strings(&["dupont", "durand"]));
    assert!(matches!(
        result,
        Err(PhonexError::NativeOutputMismatch { expected: 2, actual: 1 })
    ));
    assert_eq!(mock::allocations(), mock::frees());
}

//==================================================================================
// 3. PhoneticChunkEncoder
//==================================================================================

#[test]
fn test_chunk_encoder_emits_columns_in_fixed_order() {
    let encoder =
        PhoneticChunkEncoder::new(mock_engine(), AlgorithmSelection::all(), "name", true).unwrap();
    let set = encoder.encode(&strings(&[" Dupont ", "Petit"])).unwrap();

    assert_eq!(
        set.names(),
        strings(&[
            "name",
            "name_soundex",
            "name_metaphone",
            "name_metaphone3_primary",
            "name_metaphone3_secondary",
        ])
    );
    assert_eq!(set.names(), encoder.output_columns());
    assert_eq!(set.get("name").unwrap(), &strings(&["Dupont", "Petit"])[..]);
    assert_eq!(set.get("name_soundex").unwrap(), &strings(&["DUPONT", "PETIT"])[..]);
    assert_eq!(set.get("name_metaphone3_secondary").unwrap(), &strings(&["TNOPUD", ""])[..]);
}

#[test]
fn test_source_only_round_trip() {
    mock::reset_counters();
    let encoder =
        PhoneticChunkEncoder::new(mock_engine(), AlgorithmSelection::default(), "name", true).unwrap();
    let input = strings(&["Dupont", "", "Martin"]);

    let set = encoder.encode(&input).unwrap();
    assert_eq!(set.num_columns(), 1);
    assert_eq!(set.get("name").unwrap(), &input[..]);
    assert_eq!(mock::calls(), 0);
}

#[test]
fn test_nothing_to_produce_is_a_configuration_error() {
    let result = PhoneticChunkEncoder::new(mock_engine(), AlgorithmSelection::default(), "name", false);
    assert!(matches!(result, Err(PhonexError::Configuration(_))));
}

#[test]
fn test_enabled_algorithm_without_strategy_is_a_configuration_error() {
    let engine = Arc::new(PhoneticEngine::from_strategies(
        [PhoneticStrategy::Soundex(soundex())],
        EncodeOptions::default(),
    ));
    let result = PhoneticChunkEncoder::new(
        engine,
        AlgorithmSelection::only(Algorithm::Metaphone),
        "name",
        false,
    );
    assert!(matches!(result, Err(PhonexError::Configuration(_))));
}

#[test]
fn test_missing_values_become_empty_cells() {
    let encoder = PhoneticChunkEncoder::new(
        mock_engine(),
        AlgorithmSelection::only(Algorithm::Soundex),
        "name",
        false,
    )
    .unwrap();
    let set = encoder
        .encode_optional(&[Some("petit".to_string()), None])
        .unwrap();
    assert_eq!(set.get("name_soundex").unwrap(), &strings(&["PETIT", ""])[..]);
}

#[test]
fn test_empty_chunk_yields_empty_columns() {
    mock::reset_counters();
    let encoder =
        PhoneticChunkEncoder::new(mock_engine(), AlgorithmSelection::all(), "name", false).unwrap();
    let set = encoder.encode(&[]).unwrap();
    assert_eq!(set.num_columns(), 4);
    assert_eq!(set.num_rows(), 0);
    assert_eq!(mock::calls(), 0);
}
