// Round-trip and rejection properties of the composite identifier codec.

use proptest::prelude::*;
use scrudgen_codec::{Arity, Pair, Quadruple, SEPARATOR, Triple, split};

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9.-]{1,12}"
}

proptest! {
    #[test]
    fn pair_round_trips(left in segment(), right in segment()) {
        let id = Pair::new(left, right);
        let decoded: Pair<String, String> = id.encode().unwrap().parse().unwrap();
        prop_assert_eq!(decoded, id);
    }

    #[test]
    fn triple_round_trips(left in segment(), middle in segment(), right in segment()) {
        let id = Triple::new(left, middle, right);
        let decoded: Triple<String, String, String> = id.encode().unwrap().parse().unwrap();
        prop_assert_eq!(decoded, id);
    }

    #[test]
    fn quadruple_round_trips(
        left in segment(),
        inner_left in segment(),
        inner_right in segment(),
        right in segment(),
    ) {
        let id = Quadruple::new(left, inner_left, inner_right, right);
        let decoded: Quadruple<String, String, String, String> =
            id.encode().unwrap().parse().unwrap();
        prop_assert_eq!(decoded, id);
    }

    #[test]
    fn wrong_segment_count_is_rejected(parts in prop::collection::vec(segment(), 1..7)) {
        let joined = parts.join(&SEPARATOR.to_string());
        let result = split(&joined, Arity::Three);
        prop_assert_eq!(result.is_ok(), parts.len() == 3);
    }
}

#[test]
fn test_serde_uses_canonical_string() {
    let id = Pair::new("order-1".to_string(), "sku.9".to_string());
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"order-1_sku.9\"");

    let back: Pair<String, String> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);

    let malformed = serde_json::from_str::<Pair<String, String>>("\"order-1\"");
    assert!(malformed.is_err());
}
