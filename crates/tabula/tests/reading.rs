//! Reading whole documents through the public API.

use std::io::Write;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tabula::prelude::*;
use tabula::LookupStrategy;

const RIFLES: &str = "Manufacturer,Name,Cartridge,Action\r\n\
                      Walther,WA 2000,\".300 Winchester Magnum\",Semi-automatic\r\n\
                      Denel,NTW-20,14.5x114mm,Bolt action\r\n\
                      Accuracy International,AS50,\".50 BMG\",Semi-automatic\r\n";

column_enum! {
    enum Column: u8 { Manufacturer, Name, Cartridge, Action }
}

column_enum! {
    enum Sparse: i32 { Manufacturer = 10, Name = 20, Cartridge = 30, Action = 40 }
}

#[test]
fn test_header_from_first_record() {
    let text = "Manufacturer,Name\r\nWalther,WA 2000";
    let mut reader = Reader::from_str(text, &Settings::default(), &FirstRecord::new()).unwrap();

    let header = reader.header().unwrap().unwrap();
    assert_eq!(header.names(), ["Manufacturer", "Name"]);
    assert_eq!(header.index_of("Name"), Some(1));

    assert!(reader.read().unwrap());
    assert_eq!(
        reader.record().unwrap().unwrap().get("Name").unwrap(),
        Some("WA 2000")
    );
}

#[test]
fn test_enum_header_from_first_record() {
    let policy = FirstRecordEnum::<Column>::new().unwrap();
    let mut reader = Reader::from_str(RIFLES, &Settings::strict(), &policy).unwrap();
    assert_eq!(
        reader.header().unwrap().map(|h| h.strategy()),
        Some(LookupStrategy::Raw)
    );

    let names: Vec<String> = reader
        .records()
        .map(|r| r.unwrap().get(&Column::Name).unwrap().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(names, ["WA 2000", "NTW-20", "AS50"]);
}

#[test]
fn test_enum_strategies_read_the_same_values() {
    let reordered = "Action,Cartridge,Name,Manufacturer\r\n\
                     Semi-automatic,.50 BMG,AS50,Accuracy International\r\n";

    let policy = FirstRecordEnum::<Column>::new().unwrap();
    let mut dense = Reader::from_str(reordered, &Settings::default(), &policy).unwrap();
    let policy = FirstRecordEnum::<Sparse>::new().unwrap();
    let mut sparse = Reader::from_str(reordered, &Settings::default(), &policy).unwrap();
    assert_eq!(
        dense.header().unwrap().map(|h| h.strategy()),
        Some(LookupStrategy::Array)
    );
    assert_eq!(
        sparse.header().unwrap().map(|h| h.strategy()),
        Some(LookupStrategy::Map)
    );

    let dense = dense.records().next().unwrap().unwrap();
    let sparse = sparse.records().next().unwrap().unwrap();
    assert_eq!(
        dense.get(&Column::Manufacturer).unwrap(),
        sparse.get(&Sparse::Manufacturer).unwrap()
    );
    assert_eq!(dense.get(&Column::Action).unwrap(), Some("Semi-automatic"));
    assert_eq!(sparse.get(&Sparse::Cartridge).unwrap(), Some(".50 BMG"));
}

#[test]
fn test_user_defined_enum_reads_headerless_data() {
    let policy = UserDefinedEnum::<Column>::new().unwrap();
    let text = "Walther,WA 2000,.300 Winchester Magnum,Semi-automatic\n";
    let records: Vec<_> = Reader::from_str(text, &Settings::default(), &policy)
        .unwrap()
        .records()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record_number(), 1);
    assert_eq!(records[0].get(&Column::Action).unwrap(), Some("Semi-automatic"));
}

#[test]
fn test_typed_fields() {
    let text = "Name,Weight,Introduced,Suppressed,Calibers\n\
                WA 2000,6.95,1982-01-01,false,.300 Win Mag|7.62x51mm|7.5x55mm\n\
                NTW-20,,1998-06-15,NULL,14.5x114mm\n";
    let settings = Settings::default().with_null_value("NULL");
    let mut reader = Reader::from_str(text, &settings, &FirstRecord::new()).unwrap();

    assert!(reader.read().unwrap());
    let record = reader.record().unwrap().unwrap();
    assert_eq!(record.field("Weight").unwrap().parse::<f64>().unwrap(), Some(6.95));
    assert_eq!(record.field("Suppressed").unwrap().as_bool().unwrap(), Some(false));
    assert_eq!(record.field("Calibers").unwrap().split('|').len(), 3);
    let introduced = record.field("Introduced").unwrap().as_date("%Y-%m-%d").unwrap();
    assert_eq!(introduced.map(|d| d.to_string()), Some("1982-01-01".to_string()));

    assert!(reader.read().unwrap());
    let record = reader.record().unwrap().unwrap();
    assert_eq!(record.field("Weight").unwrap().parse::<f64>().unwrap(), None);
    assert!(record.field("Suppressed").unwrap().is_null());

    let fields = record.fields(["Name", "Calibers"]).unwrap();
    assert_eq!(fields[0].as_str(), Some("NTW-20"));
    assert_eq!(fields[1].split('|').len(), 1);
}

#[test]
fn test_conversion_error_mentions_record_and_column() {
    let mut reader =
        Reader::from_str("Name,Weight\nWA 2000,heavy\n", &Settings::default(), &FirstRecord::new())
            .unwrap();
    assert!(reader.read().unwrap());
    let err = reader
        .record()
        .unwrap()
        .unwrap()
        .field("Weight")
        .unwrap()
        .parse::<f64>()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("record 2"), "{message}");
    assert!(message.contains("'Weight'"), "{message}");
}

#[test]
fn test_field_count_mismatch_reports_record_number() {
    let text = "a,b\n1,2\n3,4,5\n";
    let mut reader = Reader::from_str(text, &Settings::default(), &FirstRecord::new()).unwrap();
    assert!(reader.read().unwrap());
    match reader.read() {
        Err(Error::FieldCount {
            record_number,
            expected,
            actual,
        }) => {
            assert_eq!((record_number, expected, actual), (3, 2, 3));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_read_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\xEF\xBB\xBF").unwrap();
    file.write_all(RIFLES.as_bytes()).unwrap();
    file.flush().unwrap();

    let source = std::fs::File::open(file.path()).unwrap();
    let mut reader = Reader::from_reader(source, &Settings::strict(), &FirstRecord::new()).unwrap();
    assert_eq!(
        reader.header().unwrap().and_then(|h| h.name_at(0)),
        Some("Manufacturer")
    );
    let records: Vec<_> = reader.records().collect::<Result<_>>().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].get("Cartridge").unwrap(), Some(".50 BMG"));
}

#[test]
fn test_borrowed_reader_left_open() {
    let mut cursor = std::io::Cursor::new(RIFLES.as_bytes());
    {
        let mut reader =
            Reader::from_reader(&mut cursor, &Settings::strict(), &IndexPolicy).unwrap();
        assert!(reader.read().unwrap());
        reader.close();
    }
    cursor.set_position(0);
    let mut again = Reader::from_reader(&mut cursor, &Settings::strict(), &IndexPolicy).unwrap();
    assert_eq!(again.records().count(), 4);
}

#[test]
fn test_read_str_uses_index_header() {
    let records = tabula::read_str("Denel,NTW-20,Bolt action\r\n").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].header().names(), ["A", "B", "C"]);
    assert_eq!(records[0].get(&2).unwrap(), Some("Bolt action"));
}

#[cfg(feature = "serde")]
#[test]
fn test_record_serializes_as_map() {
    let records = tabula::read_str("Walther,\"WA 2000\"").unwrap();
    let json = serde_json::to_string(&records[0]).unwrap();
    assert_eq!(json, r#"{"A":"Walther","B":"WA 2000"}"#);
}

/// Builds a document whose data records have `width + delta - 1` fields
fn document(width: usize, deltas: &[usize]) -> String {
    let header: Vec<String> = (0..width).map(|i| format!("c{i}")).collect();
    let mut text = header.join(",") + "\r\n";
    for (row, delta) in deltas.iter().enumerate() {
        let fields: Vec<String> = (0..width + delta - 1).map(|i| format!("r{row}v{i}")).collect();
        text.push_str(&fields.join(","));
        text.push_str("\r\n");
    }
    text
}

proptest! {
    #[test]
    fn records_must_match_header_width(
        width in 2usize..6,
        deltas in prop::collection::vec(0usize..3, 1..8),
    ) {
        let text = document(width, &deltas);
        let policy = FirstRecord::new();
        let mut reader = Reader::from_str(&text, &Settings::default(), &policy).unwrap();

        for (row, &delta) in deltas.iter().enumerate() {
            let record_number = row + 2;
            if delta == 1 {
                prop_assert!(reader.read().unwrap());
                let record = reader.record().unwrap().unwrap();
                prop_assert_eq!(record.record_number(), record_number);
                prop_assert_eq!(record.len(), width);
                continue;
            }

            match reader.read() {
                Err(Error::FieldCount { record_number: n, expected, actual }) => {
                    prop_assert_eq!(n, record_number);
                    prop_assert_eq!(expected, width);
                    prop_assert_eq!(actual, width + delta - 1);
                }
                other => prop_assert!(false, "expected a field count error, got {:?}", other),
            }
            break;
        }
    }
}
