use fixwide_vectors::{
    generate, verify, Operand, Operation, TestVector, VectorConfig, VectorError, VectorSet, Width,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[test]
fn test_same_seed_same_vectors() {
    let config = VectorConfig::default();
    for width in Width::ALL {
        let first = VectorSet::generate(&config, width).unwrap();
        let second = VectorSet::generate(&config, width).unwrap();
        assert_eq!(first, second, "{width:?}");
    }

    let other = VectorConfig { seed: 2, ..VectorConfig::default() };
    assert_ne!(
        VectorSet::generate(&config, Width::Fixed128).unwrap(),
        VectorSet::generate(&other, Width::Fixed128).unwrap()
    );
}

#[test]
fn test_every_generated_vector_verifies() {
    let config = VectorConfig {
        radices: vec![2, 3, 10, 16, 36],
        ..VectorConfig::default()
    };
    for width in Width::ALL {
        let set = VectorSet::generate(&config, width).unwrap();
        let expected = config.operations().len() * config.count;
        assert_eq!(set.verify().unwrap(), expected, "{width:?}");
    }
}

#[test]
fn test_operations_use_independent_streams() {
    // Dropping the radix list must not disturb the vectors of the operations before it.
    let full = VectorSet::generate(&VectorConfig::default(), Width::Fixed64).unwrap();
    let bare_config = VectorConfig {
        radices: vec![],
        ..VectorConfig::default()
    };
    let bare = VectorSet::generate(&bare_config, Width::Fixed64).unwrap();
    let arithmetic = 9 * 16;
    assert_eq!(full.vectors[..arithmetic], bare.vectors[..arithmetic]);
}

#[test]
fn test_json_round_trip_still_verifies() {
    let set = VectorSet::generate(&VectorConfig::default(), Width::Fixed256).unwrap();
    let json = serde_json::to_string(&set).unwrap();
    let back: VectorSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, set);
    assert_eq!(back.verify().unwrap(), set.vectors.len());
}

#[test]
fn test_tampered_vector_is_rejected() {
    let mut rng = ChaCha20Rng::seed_from_u64(9);
    let operation = Operation::ToString { radix: 16 };
    let mut vectors = generate(&mut rng, Width::Fixed128, operation, 8).unwrap();
    let last = vectors.last_mut().unwrap();
    last.expected = vec![Operand::Text("0.1".into())];
    let err = verify(Width::Fixed128, last).unwrap_err();
    assert!(matches!(err, VectorError::Mismatch { .. }), "{err}");
}

#[test]
fn test_known_width64_vector() {
    let vector = TestVector {
        operation: Operation::Div,
        inputs: vec![
            Operand::Bits("0x0100000000000000".into()),
            Operand::Bits("0x0200000000000000".into()),
        ],
        expected: vec![Operand::Bits("0x0080000000000000".into())],
    };
    verify(Width::Fixed64, &vector).unwrap();
}

// Property: any seed yields vectors that verify
proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn prop_any_seed_verifies(seed in any::<u64>()) {
        let config = VectorConfig { seed, count: 4, ..VectorConfig::default() };
        for width in Width::ALL {
            let set = VectorSet::generate(&config, width).unwrap();
            prop_assert_eq!(set.verify().unwrap(), set.vectors.len());
        }
    }
}
