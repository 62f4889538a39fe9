//! Back-reference resolution matrix: shared containers, self-references,
//! and the empty-string interning rule that keeps string ids stable.

use igbinary::{decode, DecodeError, ErrorKind, Value, ValueMap, CLASS_KEY};

fn payload(body: &[u8]) -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x00, 0x02];
    data.extend_from_slice(body);
    data
}

fn decode_map(body: &[u8]) -> ValueMap {
    match decode(&payload(body)).expect("payload should decode") {
        Value::Map(map) => map,
        other => panic!("expected map, got {other:?}"),
    }
}

// ----------------------------------------------------------- shared maps

#[test]
fn array_ref_resolves_shared_array() {
    // PHP: $arr = [42, 83];
    //      ["landing_pages" => $arr, "promotion_pages" => $arr]
    // The second occurrence is an array back-reference to value id 1
    // (the outer map owns id 0).
    let map = decode_map(&[
        0x14, 0x02, // outer map (value id 0)
        0x11, 0x0d, b'l', b'a', b'n', b'd', b'i', b'n', b'g', b'_', b'p', b'a', b'g', b'e', b's',
        0x14, 0x02, // inner map (value id 1)
        0x06, 0x00, 0x06, 0x2a, // 0 => 42
        0x06, 0x01, 0x06, 0x53, // 1 => 83
        0x11, 0x0f, b'p', b'r', b'o', b'm', b'o', b't', b'i', b'o', b'n', b'_', b'p', b'a', b'g',
        b'e', b's', //
        0x01, 0x01, // array ref -> id 1
    ]);

    let landing = map.get("landing_pages").unwrap();
    let landing = landing.as_map().unwrap();
    let promo = map.get("promotion_pages").unwrap();
    let promo = promo.as_map().unwrap();

    assert_eq!(landing.get("0"), Some(Value::Int(42)));
    assert_eq!(landing.get("1"), Some(Value::Int(83)));
    assert_eq!(promo.get("0"), Some(Value::Int(42)));
    assert_eq!(promo.get("1"), Some(Value::Int(83)));
    // Not merely equal: the same underlying container.
    assert!(landing.ptr_eq(promo));
}

#[test]
fn self_referencing_map() {
    let map = decode_map(&[
        0x14, 0x01, // outer map (value id 0)
        0x11, 0x04, b's', b'e', b'l', b'f', // key "self"
        0x01, 0x00, // array ref -> id 0, the map itself
    ]);

    // A depth-bounded walk along m["self"]["self"]... never leaves the map.
    let mut current = map.clone();
    for _ in 0..16 {
        let next = current.get("self").expect("self entry present");
        let next = next.as_map().expect("self entry is a map").clone();
        assert!(next.ptr_eq(&map));
        current = next;
    }
}

#[test]
fn repeated_decodes_of_self_referential_payload_compare_equal() {
    let body = [0x14, 0x01, 0x11, 0x04, b's', b'e', b'l', b'f', 0x01, 0x00];
    let first = decode(&payload(&body)).unwrap();
    let second = decode(&payload(&body)).unwrap();
    // Distinct allocations with the same cyclic shape.
    assert!(!first
        .as_map()
        .unwrap()
        .ptr_eq(second.as_map().unwrap()));
    assert_eq!(first, second);
    // Debug formatting is cycle-guarded as well.
    let text = format!("{first:?}");
    assert!(text.contains("<cycle>"), "got: {text}");
}

#[test]
fn nested_array_ref_resolution() {
    let map = decode_map(&[
        0x14, 0x02, // outer (id 0)
        0x11, 0x05, b'i', b'n', b'n', b'e', b'r', // key "inner"
        0x14, 0x01, // inner (id 1)
        0x06, 0x00, 0x06, 0x0a, // 0 => 10
        0x11, 0x03, b'r', b'e', b'f', // key "ref"
        0x01, 0x01, // -> inner
    ]);
    let inner = map.get("inner").unwrap();
    let inner = inner.as_map().unwrap();
    let reference = map.get("ref").unwrap();
    let reference = reference.as_map().unwrap();
    assert_eq!(inner.get("0"), Some(Value::Int(10)));
    assert!(inner.ptr_eq(reference));
}

#[test]
fn multiple_refs_to_same_array() {
    let map = decode_map(&[
        0x14, 0x03, // outer (id 0)
        0x11, 0x01, b'a', 0x14, 0x01, 0x06, 0x00, 0x06, 0x63, // "a" => {0 => 99} (id 1)
        0x11, 0x01, b'b', 0x01, 0x01, // "b" => ref(1)
        0x11, 0x01, b'c', 0x01, 0x01, // "c" => ref(1)
    ]);
    for key in ["a", "b", "c"] {
        let entry = map.get(key).unwrap();
        assert_eq!(entry.as_map().unwrap().get("0"), Some(Value::Int(99)));
    }
}

#[test]
fn ref_to_empty_array() {
    let map = decode_map(&[
        0x14, 0x02, // outer (id 0)
        0x11, 0x05, b'e', b'm', b'p', b't', b'y', 0x14, 0x00, // "empty" => {} (id 1)
        0x11, 0x03, b'r', b'e', b'f', 0x01, 0x01, // "ref" => ref(1)
    ]);
    let empty = map.get("empty").unwrap();
    let reference = map.get("ref").unwrap();
    assert_eq!(empty.as_map().unwrap().len(), 0);
    assert_eq!(reference.as_map().unwrap().len(), 0);
}

#[test]
fn object_ref_resolution() {
    let map = decode_map(&[
        0x14, 0x02, // outer (id 0)
        0x11, 0x04, b'o', b'b', b'j', b'1', // key "obj1"
        0x17, 0x03, b'F', b'o', b'o', // class "Foo" (id 1 in value table)
        0x14, 0x01, 0x11, 0x01, b'x', 0x06, 0x01, // x => 1
        0x11, 0x04, b'o', b'b', b'j', b'2', // key "obj2"
        0x22, 0x01, // object ref -> id 1
    ]);
    let obj1 = map.get("obj1").unwrap();
    let obj1 = obj1.as_map().unwrap();
    let obj2 = map.get("obj2").unwrap();
    let obj2 = obj2.as_map().unwrap();
    assert_eq!(obj1.get(CLASS_KEY), Some(Value::Str("Foo".into())));
    assert_eq!(obj2.get("x"), Some(Value::Int(1)));
    assert!(obj1.ptr_eq(obj2));
}

#[test]
fn serialized_object_occupies_a_value_slot() {
    let map = decode_map(&[
        0x14, 0x02, // outer (id 0)
        0x11, 0x01, b's', // key "s"
        0x1d, 0x01, b'B', 0x11, 0x02, b'h', b'i', // blob object (id 1)
        0x11, 0x01, b'r', // key "r"
        0x22, 0x01, // object ref -> id 1
    ]);
    let blob = map.get("s").unwrap();
    let blob = blob.as_map().unwrap();
    let reference = map.get("r").unwrap();
    let reference = reference.as_map().unwrap();
    assert!(blob.ptr_eq(reference));
}

// --------------------------------------------------- out-of-range refs

#[test]
fn value_ref_out_of_range_mid_payload() {
    let err = decode(&payload(&[
        0x14, 0x01, 0x11, 0x01, b'x', 0x01, 0x05, // ref(5), only id 0 exists
    ]))
    .unwrap_err();
    assert_eq!(
        err,
        DecodeError::ValueRefOutOfRange {
            pos: 10,
            id: 5,
            len: 1
        }
    );
}

#[test]
fn bare_refs_are_out_of_range() {
    for body in [
        vec![0x01u8, 0x00],
        vec![0x02, 0x00, 0x00],
        vec![0x03, 0x00, 0x00, 0x00, 0x00],
        vec![0x22, 0x00],
        vec![0x23, 0x00, 0x00],
        vec![0x24, 0x00, 0x00, 0x00, 0x00],
    ] {
        let err = decode(&payload(&body)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRefOutOfRange, "body {body:02x?}");
    }
}

// ------------------------------------------- empty-string interning rule

// The empty-string tag produces a value but never occupies a slot in the
// string table; if it did, every later string id would be off by one.

#[test]
fn empty_string_value_does_not_shift_string_ids() {
    let map = decode_map(&[
        0x14, 0x03, // 3 entries
        0x11, 0x03, b'k', b'e', b'y', // "key" (id 0)
        0x11, 0x05, b'h', b'e', b'l', b'l', b'o', // "hello" (id 1)
        0x11, 0x05, b'e', b'm', b'p', b't', b'y', // "empty" (id 2)
        0x0d, // empty string, not interned
        0x11, 0x03, b'r', b'e', b'f', // "ref" (id 3)
        0x0e, 0x01, // id 1 -> "hello", not ""
    ]);
    assert_eq!(map.get("key"), Some(Value::Str("hello".into())));
    assert_eq!(map.get("empty"), Some(Value::Str(String::new())));
    assert_eq!(map.get("ref"), Some(Value::Str("hello".into())));
}

#[test]
fn empty_string_key_does_not_shift_string_ids() {
    let map = decode_map(&[
        0x14, 0x03, // 3 entries
        0x11, 0x05, b'f', b'i', b'r', b's', b't', // "first" (id 0)
        0x06, 0x01, // => 1
        0x0d, // empty key, not interned
        0x06, 0x02, // => 2
        0x0e, 0x00, // key id 0 -> "first"
        0x06, 0x03, // => 3, overwrites
    ]);
    assert_eq!(map.get(""), Some(Value::Int(2)));
    assert_eq!(map.get("first"), Some(Value::Int(3)));
}

#[test]
fn multiple_empty_strings_do_not_shift_string_ids() {
    let map = decode_map(&[
        0x14, 0x03, // 3 entries
        0x11, 0x04, b'n', b'a', b'm', b'e', // "name" (id 0)
        0x11, 0x05, b'A', b'l', b'i', b'c', b'e', // "Alice" (id 1)
        0x0d, 0x0d, // empty key and empty value, neither interned
        0x11, 0x03, b'r', b'e', b'f', // "ref" (id 2)
        0x0e, 0x01, // id 1 -> "Alice"
    ]);
    assert_eq!(map.get("name"), Some(Value::Str("Alice".into())));
    assert_eq!(map.get(""), Some(Value::Str(String::new())));
    assert_eq!(map.get("ref"), Some(Value::Str("Alice".into())));
}

#[test]
fn empty_string_in_nested_struct_does_not_shift_string_ids() {
    // Mirrors badge-like data: a nested map carries an empty string value,
    // and sibling maps then refer to earlier keys by id.
    let map = decode_map(&[
        0x14, 0x02, // outer, 2 entries
        0x11, 0x06, b'b', b'a', b'd', b'g', b'e', b'1', // "badge1" (id 0)
        0x14, 0x02, // inner, 2 entries
        0x11, 0x04, b't', b'e', b'x', b't', // "text" (id 1)
        0x11, 0x04, b'S', b'a', b'l', b'e', // "Sale" (id 2)
        0x11, 0x04, b'i', b'c', b'o', b'n', // "icon" (id 3)
        0x0d, // "" value, not interned
        0x11, 0x06, b'b', b'a', b'd', b'g', b'e', b'2', // "badge2" (id 4)
        0x14, 0x02, // inner, 2 entries
        0x0e, 0x01, // key id 1 -> "text"
        0x11, 0x03, b'N', b'e', b'w', // "New" (id 5)
        0x0e, 0x03, // key id 3 -> "icon"
        0x11, 0x04, b's', b't', b'a', b'r', // "star" (id 6)
    ]);
    let badge1 = map.get("badge1").unwrap();
    let badge1 = badge1.as_map().unwrap();
    let badge2 = map.get("badge2").unwrap();
    let badge2 = badge2.as_map().unwrap();
    assert_eq!(badge1.get("text"), Some(Value::Str("Sale".into())));
    assert_eq!(badge1.get("icon"), Some(Value::Str(String::new())));
    assert_eq!(badge2.get("text"), Some(Value::Str("New".into())));
    assert_eq!(badge2.get("icon"), Some(Value::Str("star".into())));
}
