#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{slice_iterator, JsonSliceError, TokenDecoder};

    /// Random JSON value up to `depth` containers deep. Strings carry bracket
    /// characters and objects reuse the target key names.
    fn random_value(rng: &mut StdRng, depth: usize) -> String {
        let choice = if depth == 0 { rng.gen_range(0..4) } else { rng.gen_range(0..6) };
        match choice {
            0 => rng.gen_range(-1000..1000).to_string(),
            1 => format!("\"s{}]}}[{{\\\"\"", rng.gen_range(0..100)),
            2 => "true".to_string(),
            3 => "null".to_string(),
            4 => {
                let n = rng.gen_range(0..4);
                let items: Vec<String> = (0..n).map(|_| random_value(rng, depth - 1)).collect();
                format!("[{}]", items.join(","))
            }
            _ => {
                let n = rng.gen_range(0..4);
                let keys = ["p1", "p2", "k", "results"];
                let members: Vec<String> = (0..n)
                    .map(|_| {
                        let key = keys[rng.gen_range(0..keys.len())];
                        let value = random_value(rng, depth - 1);
                        format!("\"{}\": {}", key, value)
                    })
                    .collect();
                format!("{{{}}}", members.join(", "))
            }
        }
    }

    #[test]
    fn test_random_siblings_are_skipped() {
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let depth = rng.gen_range(1..8);
            let before = random_value(&mut rng, depth);
            let inner = random_value(&mut rng, depth);
            let after = random_value(&mut rng, depth);
            let json = format!(
                r#"{{"before": {}, "p1": {{"inner": {}, "p2": [1, 2, 3], "after": {}}}, "tail": {}}}"#,
                before, inner, after, before
            );

            let got = slice_iterator::<_, i64, _>(json.as_bytes(), &["p1", "p2"])
                .collect::<Result<Vec<_>, _>>()
                .unwrap_or_else(|e| panic!("seed {seed}: {e}\n{json}"));
            assert_eq!(got, vec![1, 2, 3], "seed {seed}");

            let err = slice_iterator::<_, i64, _>(json.as_bytes(), &["p1", "p3"])
                .next_element()
                .unwrap_err();
            assert!(err.is_not_found(), "seed {seed}: {err:?}");
        }
    }

    #[test]
    fn test_skip_value_stops_exactly_at_value_end() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(1000 + seed);
            let value = random_value(&mut rng, 6);
            let json = format!("[{}, \"marker\"]", value);
            let mut decoder = TokenDecoder::new(json.as_bytes());
            decoder.expect_delim(crate::Delim::ArrayOpen).unwrap();
            decoder.skip_value().unwrap();
            assert_eq!(decoder.decode::<String>().unwrap().as_deref(), Some("marker"), "{json}");
        }
    }

    #[test]
    fn test_truncated_random_documents_never_report_not_found() {
        let mut rng = StdRng::seed_from_u64(42);
        let sibling = random_value(&mut rng, 5);
        let json = format!(r#"{{"a": {}, "p1": [1]}}"#, sibling);
        let cut = json.find("\"p1\"").unwrap_or(json.len());
        for end in 1..cut {
            let err = slice_iterator::<_, i64, _>(json[..end].as_bytes(), &["p1"])
                .next_element()
                .unwrap_err();
            assert!(
                err.is_malformed() && !matches!(err, JsonSliceError::NotFound { .. }),
                "cut at {end}: {err:?}"
            );
        }
    }
}
