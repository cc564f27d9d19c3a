use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use tpt_exec::result::parser::EXEC_DATE_FORMAT;
use tpt_exec::result::{parse, parse_exec_date};
use tpt_exec_test_utils::builders::ResultXmlBuilder;

fn log_type_strategy() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(None),
        Just(Some("info")),
        Just(Some("customoutput")),
        Just(Some("section")),
        Just(Some("warning")),
        Just(Some("error")),
        Just(Some("invisible")),
        Just(Some("unknown")),
    ]
}

fn date_strategy() -> impl Strategy<Value = NaiveDateTime> {
    (1970i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, m, d, h, min, s)| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, s)
                .unwrap()
        },
    )
}

proptest! {
    #[test]
    fn parsing_is_deterministic_and_keeps_visible_entries_in_order(
        entries in proptest::collection::vec((log_type_strategy(), "[a-zA-Z0-9 .,]{0,24}"), 0..16)
    ) {
        let mut builder = ResultXmlBuilder::new("TC", 5).result("SUCCESS");
        for (log_type, text) in &entries {
            builder = builder.log(*log_type, text);
        }
        let xml = builder.build();

        let first = parse(xml.as_bytes()).unwrap();
        let second = parse(xml.as_bytes()).unwrap();
        prop_assert_eq!(&first, &second);

        let expected: Vec<&str> = entries
            .iter()
            .filter(|(t, _)| *t != Some("invisible"))
            .map(|(_, text)| text.as_str())
            .collect();
        let actual: Vec<&str> = first.log.all_entries().iter().map(|e| e.text.as_str()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn exec_dates_round_trip(dt in date_strategy()) {
        let formatted = dt.format(EXEC_DATE_FORMAT).to_string();
        prop_assert_eq!(parse_exec_date(&formatted).unwrap(), dt);
    }
}
