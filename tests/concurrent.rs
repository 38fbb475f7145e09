use std::{sync::Arc, thread};

use arrow_array::{Array, ArrayRef, ListArray, StringArray, StructArray, types::Int32Type};
use arrow_data::ArrayData;
use arrow_schema::Field;
use arrow_window::{
    ArrayNode, OffsetTranslator, Value, Window, arrow_array, arrow_data, arrow_schema,
};

const ROWS: usize = 10_000;

fn nested_struct() -> ArrayRef {
    let names: ArrayRef = Arc::new(StringArray::from_iter(
        (0..ROWS).map(|i| (i % 9 != 0).then(|| i.to_string())),
    ));
    let lists: ArrayRef = Arc::new(ListArray::from_iter_primitive::<Int32Type, _, _>(
        (0..ROWS as i32).map(|i| (i % 5 != 0).then(|| (0..i % 4).map(Some).collect::<Vec<_>>())),
    ));
    Arc::new(StructArray::from(vec![
        (
            Arc::new(Field::new("name", names.data_type().clone(), true)),
            names,
        ),
        (
            Arc::new(Field::new("list", lists.data_type().clone(), true)),
            lists,
        ),
    ]))
}

#[test]
fn parallel_windows_match_sequential_reads() {
    let array = nested_struct();
    let source = array.to_data();
    // The struct itself carries the offset; its children stay unsliced.
    let data = ArrayData::builder(source.data_type().clone())
        .len(ROWS - 1000)
        .offset(1000)
        .child_data(source.child_data().to_vec())
        .build()
        .unwrap();
    let node = ArrayNode::from_data(&data).unwrap();

    let windows: Vec<Window> = (0..16)
        .map(|i| Window::new(i * 500 + i % 3, 300 + i * 7))
        .collect();
    let sequential: Vec<Vec<Value<'_>>> = windows
        .iter()
        .map(|&window| node.translate(window).unwrap())
        .collect();

    let parallel: Vec<Vec<Value<'_>>> = thread::scope(|scope| {
        let handles: Vec<_> = windows
            .iter()
            .map(|&window| {
                let node = &node;
                scope.spawn(move || OffsetTranslator::new(node).translate(window).unwrap())
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(parallel, sequential);
    for (window, values) in windows.iter().zip(&parallel) {
        assert_eq!(values.len(), window.length);
        let row = 1000 + window.offset;
        let expected_name = (row % 9 != 0).then(|| row.to_string());
        let fields = values[0].as_struct().unwrap();
        assert_eq!(fields[0].as_str(), expected_name.as_deref());
    }
}
