#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use serde::de::DeserializeOwned;
    use simd_json::OwnedValue;

    use crate::{slice_iterator, JsonSliceError, SliceConfig, SliceIterator};

    #[derive(Debug, Clone, Default, serde::Deserialize, PartialEq)]
    struct Value {
        #[serde(rename = "Value")]
        value: i32,
    }

    const VALUE_JSON: &str = r#"[{ "Value": 1 }, { "Value": 2 }]"#;
    const ROOT: &[&str] = &[];

    fn want() -> Vec<Value> {
        vec![Value { value: 1 }, Value { value: 2 }]
    }

    fn collect<T: DeserializeOwned>(json: &str, path: &[&str]) -> Result<Vec<T>, JsonSliceError> {
        slice_iterator::<_, T, _>(json.as_bytes(), path).collect()
    }

    /// Hands out one byte per read.
    struct OneByte<R>(R);

    impl<R: Read> Read for OneByte<R> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn test_slice_iterator_table() {
        let cases: Vec<(&str, Vec<&str>, &str)> = vec![
            ("Pure array", vec![], "%s"),
            ("Nesting level 1", vec!["p1"], r#"{ "p1": %s }"#),
            ("Nesting level 2", vec!["p1", "p2"], r#"{ "p1": { "p2": %s } }"#),
            (
                "Ignore other fields",
                vec!["p1", "p2"],
                r#"{
                    "number": 1,
                    "string": "s",
                    "boolean": true,
                    "reference": null,
                    "array1": [1,2,3],
                    "array2": [{"a": "A"}],
                    "object1": { "a": "A" },
                    "object2": { "p1": "A" },
                    "p1": {
                        "number": 1,
                        "string": "s",
                        "boolean": true,
                        "reference": null,
                        "array1": [1,2,3],
                        "array2": [{"a": "A"}],
                        "object1": { "a": "A" },
                        "object2": { "p1": "A" },
                        "p2": %s
                    }
                }"#,
            ),
        ];

        for (name, path, template) in cases {
            let json = template.replace("%s", VALUE_JSON);
            let mut it = slice_iterator::<_, Value, _>(json.as_bytes(), path.as_slice());
            let mut dst = Value::default();
            let mut got = Vec::new();
            while it.next_into(&mut dst).unwrap_or_else(|e| panic!("{name}: {e}")) {
                got.push(dst.clone());
            }
            assert_eq!(got, want(), "{name}");
        }
    }

    #[test]
    fn test_nested_array_siblings_are_skipped() {
        let got: Vec<Value> = collect(r#"{"x":[[1,2],[3,4]],"p1":[{"Value":1}]}"#, &["p1"]).unwrap();
        assert_eq!(got, vec![Value { value: 1 }]);
    }

    #[test]
    fn test_siblings_after_target_are_never_read() {
        let json = r#"{"p1": [{"Value": 1}], "rest": this is not json"#;
        let got: Vec<Value> = collect(json, &["p1"]).unwrap();
        assert_eq!(got, vec![Value { value: 1 }]);
    }

    #[test]
    fn test_deep_sibling_then_target() {
        let deep = format!("{}{}", "[".repeat(300), "]".repeat(300));
        let json = format!(
            r#"{{"deep": {}, "obj": {{"a": {{"b": {{"c": [{{}}]}}}}}}, "p1": {}}}"#,
            deep, VALUE_JSON
        );
        let got: Vec<Value> = collect(&json, &["p1"]).unwrap();
        assert_eq!(got, want());
    }

    #[test]
    fn test_missing_inner_field_is_not_found() {
        let err = collect::<Value>(r#"{"p1": {"p3": []}}"#, &["p1", "p2"]).unwrap_err();
        assert!(err.is_not_found(), "{err:?}");

        let err = collect::<Value>(r#"{"a": 1}"#, &["p1", "p2"]).unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
        assert_eq!(err.to_string(), "path not found: p1.p2");
    }

    #[test]
    fn test_truncated_input_is_malformed_not_missing() {
        let err = collect::<Value>(r#"{"p1": 123"#, &["p1"]).unwrap_err();
        assert!(err.is_malformed(), "{err:?}");
        assert!(!err.is_not_found());

        let err = collect::<Value>(r#"{"a": [1, 2"#, &["p1"]).unwrap_err();
        assert!(matches!(err, JsonSliceError::UnexpectedEof { .. }), "{err:?}");

        let err = collect::<Value>("", ROOT).unwrap_err();
        assert!(matches!(err, JsonSliceError::UnexpectedEof { .. }), "{err:?}");
    }

    #[test]
    fn test_non_string_field_name_is_malformed() {
        let err = collect::<Value>(r#"{"a": 1, 2: [{"Value": 1}]}"#, &["p1"]).unwrap_err();
        assert!(err.is_malformed(), "{err:?}");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_path_to_non_array_is_malformed() {
        let err = collect::<Value>(r#"{"p1": {"Value": 1}}"#, &["p1"]).unwrap_err();
        assert!(matches!(err, JsonSliceError::UnexpectedToken { .. }), "{err:?}");

        let err = collect::<Value>(r#"{"p1": 5}"#, &["p1", "p2"]).unwrap_err();
        assert!(err.is_malformed(), "{err:?}");
    }

    #[test]
    fn test_exhaustion_is_idempotent() {
        let mut it = slice_iterator::<_, Value, _>(Cursor::new(format!("{} trailing", VALUE_JSON)), ROOT);
        assert_eq!(it.next_element().unwrap(), Some(Value { value: 1 }));
        assert_eq!(it.next_element().unwrap(), Some(Value { value: 2 }));
        assert_eq!(it.next_element().unwrap(), None);
        let offset = it.offset();
        for _ in 0..3 {
            assert_eq!(it.next_element().unwrap(), None);
        }
        assert!(it.is_exhausted());
        assert_eq!(it.offset(), offset);
    }

    #[test]
    fn test_error_is_idempotent() {
        let mut it = slice_iterator::<_, Value, _>(r#"[{"Value": 1}, {"Value": "x"}, {"Value": 3}]"#.as_bytes(), ROOT);
        assert_eq!(it.next_element().unwrap(), Some(Value { value: 1 }));
        let first = it.next_element().unwrap_err();
        assert!(matches!(first, JsonSliceError::Json(_)));
        let offset = it.offset();
        for _ in 0..3 {
            let again = it.next_element().unwrap_err();
            assert_eq!(again.to_string(), first.to_string());
        }
        assert_eq!(it.offset(), offset);
    }

    #[test]
    fn test_setup_error_repeats() {
        let mut it = slice_iterator::<_, Value, _>(r#"{"p1": []}"#.as_bytes(), &["nope"]);
        assert!(it.next_element().unwrap_err().is_not_found());
        assert!(it.next_element().unwrap_err().is_not_found());
    }

    #[test]
    fn test_iterator_yields_error_once() {
        let mut it = slice_iterator::<_, Value, _>(r#"{"p1": []}"#.as_bytes(), &["nope"]);
        assert!(matches!(it.next(), Some(Err(JsonSliceError::NotFound { .. }))));
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_end_of_stream_after_separator_is_exhaustion() {
        let got: Vec<Value> = collect(r#"[{"Value": 1}, "#, ROOT).unwrap();
        assert_eq!(got, vec![Value { value: 1 }]);
    }

    #[test]
    fn test_end_of_stream_elsewhere_is_an_error() {
        let mut it = slice_iterator::<_, Value, _>(r#"[{"Value": 1}"#.as_bytes(), ROOT);
        assert_eq!(it.next_element().unwrap(), Some(Value { value: 1 }));
        assert!(matches!(it.next_element(), Err(JsonSliceError::UnexpectedEof { .. })));

        let mut it = slice_iterator::<_, Value, _>(r#"[{"Value": 1}, {"Val"#.as_bytes(), ROOT);
        assert_eq!(it.next_element().unwrap(), Some(Value { value: 1 }));
        assert!(matches!(it.next_element(), Err(JsonSliceError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_empty_array() {
        let got: Vec<Value> = collect(r#"{"p1": [ ]}"#, &["p1"]).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn test_escaped_key_matches_segment() {
        let got: Vec<Value> = collect(r#"{"\u0070\u0031": [{"Value": 7}]}"#, &["p1"]).unwrap();
        assert_eq!(got, vec![Value { value: 7 }]);

        let got: Vec<i32> = collect(r#"{"a\"b": [1], "a": [2]}"#, &["a\"b"]).unwrap();
        assert_eq!(got, vec![1]);
    }

    #[test]
    fn test_heterogeneous_elements() {
        let got: Vec<OwnedValue> = collect(r#"{"p1": [1, "two", null, [3], {"four": 4}]}"#, &["p1"]).unwrap();
        assert_eq!(got.len(), 5);
        assert_eq!(got[1], OwnedValue::from("two"));
    }

    #[test]
    fn test_one_byte_reads_match_whole_reads() {
        let json = r#"{"meta": {"next": "https://example.com/?p=2"}, "data": {"results": [{"Value": 1}, {"Value": 2}]}}"#;
        let path = ["data", "results"];
        let got: Vec<Value> = SliceIterator::<_, Value>::with_config(OneByte(json.as_bytes()), &path, SliceConfig::default())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(got, want());
    }

    fn small_buffers() -> SliceConfig {
        SliceConfig {
            buffer_size: 4,
            max_buffer_size: 32,
            timeout_ms: None,
        }
    }

    #[test]
    fn test_whitespace_longer_than_buffer_limit() {
        let pad = " ".repeat(200);
        let json = format!("[1,{}2]", pad);
        let got: Vec<i64> = SliceIterator::<_, i64>::with_config(json.as_bytes(), ROOT, small_buffers())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(got, vec![1, 2]);

        let json = format!(r#"{{"a":{pad}1,{pad}"p"{pad}:{pad}[{pad}3{pad}]{pad}}}"#, pad = pad);
        let got: Vec<i64> = SliceIterator::<_, i64>::with_config(json.as_bytes(), &["p"], small_buffers())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(got, vec![3]);
    }

    #[test]
    fn test_sibling_strings_longer_than_buffer_limit() {
        let blob = "x".repeat(4096);
        let json = format!(
            r#"{{"blob": "{blob}", "other": {{"{blob}": ["{blob}", {{"k": "{blob}"}}]}}, "p1": [1, 2]}}"#,
            blob = blob
        );
        let got: Vec<i64> = SliceIterator::<_, i64>::with_config(json.as_bytes(), &["p1"], small_buffers())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(got, vec![1, 2]);
    }

    #[test]
    fn test_element_still_bounded_by_buffer_limit() {
        let json = format!(r#"[1, "{}"]"#, "x".repeat(64));
        let mut it = SliceIterator::<_, OwnedValue>::with_config(json.as_bytes(), ROOT, small_buffers());
        assert!(it.next_element().unwrap().is_some());
        assert!(matches!(it.next_element(), Err(JsonSliceError::BufferOverflow { limit: 32 })));
    }

    #[test]
    fn test_into_inner_returns_reader() {
        let mut it = slice_iterator::<_, i32, _>(Cursor::new("[1]"), ROOT);
        assert_eq!(it.next_element().unwrap(), Some(1));
        let cursor = it.into_inner();
        assert_eq!(*cursor.get_ref(), "[1]");
    }
}
