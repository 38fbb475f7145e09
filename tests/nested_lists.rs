use std::sync::Arc;

use arrow_array::{
    Array, ArrayRef, Int32Array, LargeListArray, LargeStringArray, ListArray, StringArray,
    StructArray,
    builder::{Int32Builder, ListBuilder},
    types::Int32Type,
};
use arrow_buffer::OffsetBuffer;
use arrow_schema::{DataType, Field, Fields};
use arrow_window::{
    ArrayNode, OffsetTranslator, ResolvedRange, Value, Window, arrow_array, arrow_buffer,
    arrow_schema,
};

fn ints(values: &[i32]) -> Value<'static> {
    Value::List(values.iter().copied().map(Value::I32).collect())
}

fn sample_lists() -> Vec<Option<Vec<Option<i32>>>> {
    vec![
        Some(vec![Some(0), Some(1)]),
        Some(vec![Some(2)]),
        Some(vec![]),
        Some(vec![Some(3), None, Some(5)]),
        None,
        Some(vec![Some(6)]),
    ]
}

fn expected_list(row: &Option<Vec<Option<i32>>>) -> Value<'static> {
    match row {
        None => Value::Null,
        Some(items) => Value::List(
            items
                .iter()
                .map(|item| item.map_or(Value::Null, Value::I32))
                .collect(),
        ),
    }
}

#[test]
fn small_and_large_lists_agree_on_every_window() {
    let rows = sample_lists();
    let small = ListArray::from_iter_primitive::<Int32Type, _, _>(rows.clone());
    let large = LargeListArray::from_iter_primitive::<Int32Type, _, _>(rows.clone());
    let (small_data, large_data) = (small.to_data(), large.to_data());
    let small_node = ArrayNode::from_data(&small_data).unwrap();
    let large_node = ArrayNode::from_data(&large_data).unwrap();

    for offset in 0..rows.len() {
        for length in 0..=rows.len() - offset {
            let window = Window::new(offset, length);
            let got = small_node.translate(window).unwrap();
            assert_eq!(got.len(), length);
            assert_eq!(got, large_node.translate(window).unwrap(), "{window:?}");
            let expected: Vec<_> = rows[offset..offset + length]
                .iter()
                .map(expected_list)
                .collect();
            assert_eq!(got, expected, "{window:?}");
        }
    }
}

#[test]
fn sliced_list_windows_stay_in_child_coordinates() {
    let list = ListArray::from_iter_primitive::<Int32Type, _, _>(sample_lists());
    let data = list.slice(2, 3).to_data();
    let node = ArrayNode::from_data(&data).unwrap();
    let translator = OffsetTranslator::new(&node);
    assert_eq!(
        translator.child_windows(Window::new(0, 3)).unwrap(),
        vec![Some(Window::new(3, 0)), Some(Window::new(3, 3)), None]
    );
    assert_eq!(
        translator.resolve(Window::new(1, 2)).unwrap(),
        vec![ResolvedRange::Child(Window::new(3, 3)), ResolvedRange::Null]
    );
    assert_eq!(
        translator.value_at(1).unwrap(),
        Value::List(vec![Value::I32(3), Value::Null, Value::I32(5)])
    );
}

#[test]
fn list_of_list_keeps_empties_and_nulls_apart() {
    let mut builder = ListBuilder::new(ListBuilder::new(Int32Builder::new()));
    for i in 0..10 {
        let inner = builder.values();
        inner.values().append_value(i);
        inner.append(true);
        inner.append(true);
        inner.append_null();
        builder.append(i % 3 != 2);
    }
    let array = builder.finish();
    let data = array.slice(4, 5).to_data();
    let node = ArrayNode::from_data(&data).unwrap();

    let got = node.translate(Window::new(0, 5)).unwrap();
    let expected: Vec<_> = (4..9)
        .map(|i| {
            if i % 3 == 2 {
                Value::Null
            } else {
                Value::List(vec![ints(&[i]), ints(&[]), Value::Null])
            }
        })
        .collect();
    assert_eq!(got, expected);
    assert!(got[1].is_null());
    assert_eq!(got[0].as_list().map(<[_]>::len), Some(3));
}

#[test]
fn large_and_small_strings_agree() {
    let words: Vec<Option<String>> = (0..300)
        .map(|i| (i % 7 != 0).then(|| "x".repeat(i % 11)))
        .collect();
    let small = StringArray::from(words.clone()).slice(129, 150);
    let large = LargeStringArray::from(words.clone()).slice(129, 150);
    let (small_data, large_data) = (small.to_data(), large.to_data());
    let small_node = ArrayNode::from_data(&small_data).unwrap();
    let large_node = ArrayNode::from_data(&large_data).unwrap();

    let window = Window::new(17, 100);
    let got = small_node.translate(window).unwrap();
    assert_eq!(got, large_node.translate(window).unwrap());
    for (i, value) in got.iter().enumerate() {
        let expected = words[129 + 17 + i].as_deref();
        assert_eq!(value.as_str(), expected);
    }
}

#[test]
fn list_of_struct_descends_through_fields() {
    let fields = Fields::from(vec![
        Field::new("x", DataType::Int32, true),
        Field::new("y", DataType::Utf8, true),
    ]);
    let xs: ArrayRef = Arc::new(Int32Array::from(vec![1, 2, 3, 4, 5]));
    let ys: ArrayRef = Arc::new(StringArray::from(vec![
        Some("a"),
        None,
        Some("c"),
        Some("d"),
        Some("e"),
    ]));
    let items = StructArray::new(fields.clone(), vec![xs, ys], None);
    let item_field = Arc::new(Field::new("item", DataType::Struct(fields), true));
    let list = ListArray::new(
        item_field,
        OffsetBuffer::new(vec![0, 2, 2, 5].into()),
        Arc::new(items),
        None,
    );
    let data = list.to_data();
    let node = ArrayNode::from_data(&data).unwrap();

    let got = node.translate(Window::new(0, 3)).unwrap();
    let item = |x: i32, y: Option<&'static str>| {
        Value::Struct(vec![Value::I32(x), y.map_or(Value::Null, Value::Str)])
    };
    assert_eq!(
        got,
        vec![
            Value::List(vec![item(1, Some("a")), item(2, None)]),
            Value::List(vec![]),
            Value::List(vec![item(3, Some("c")), item(4, Some("d")), item(5, Some("e"))]),
        ]
    );
}

#[test]
fn empty_window_at_the_end_is_allowed() {
    let list = ListArray::from_iter_primitive::<Int32Type, _, _>(sample_lists());
    let data = list.to_data();
    let node = ArrayNode::from_data(&data).unwrap();
    assert!(node.translate(Window::new(node.len(), 0)).unwrap().is_empty());
    assert!(
        OffsetTranslator::new(&node)
            .resolve(Window::new(3, 0))
            .unwrap()
            .is_empty()
    );
}
