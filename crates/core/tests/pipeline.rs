use chrono::NaiveDate;
use exportdash_core::{
    load_tidy, run_pipeline, PipelineError, PipelineOptions, TidyRecord, TidyTable,
};
use exportdash_sheet::{CellValue, CsvOptions, HeaderOptions, HeaderPair, RawTable};
use rust_xlsxwriter::{Format, Workbook};
use tempfile::tempdir;

fn date(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn from_csv(csv: &str) -> RawTable {
    RawTable::from_csv_str(csv, &CsvOptions::default(), &HeaderOptions::default()).unwrap()
}

fn export_headers() -> Vec<HeaderPair> {
    vec![
        HeaderPair::new(" ", "datetime"),
        HeaderPair::new("USA", "化學品"),
        HeaderPair::new("USA", "電子產品"),
        HeaderPair::new("Japan", "化學品"),
    ]
}

// ===== End-to-end scenarios =====

#[test]
fn test_single_row_produces_single_record() {
    let raw = from_csv(" ,USA\ndatetime,Chemicals\n2021Q1,100\n");
    let tidy = run_pipeline(raw, &PipelineOptions::default()).unwrap();

    assert_eq!(
        tidy.records(),
        &[TidyRecord {
            date: date(2021, 1),
            country: "USA".to_string(),
            product: "Chemicals".to_string(),
            value: 100.0,
        }]
    );
}

#[test]
fn test_composite_inner_headers_with_plain_time_column() {
    let raw = from_csv(",\ndatetime,USA_Chemicals\n2021Q1,100\n");
    let options = PipelineOptions::default().with_time_column("datetime");
    let tidy = run_pipeline(raw, &options).unwrap();

    assert_eq!(tidy.len(), 1);
    assert_eq!(tidy.records()[0].date, date(2021, 1));
    assert_eq!(tidy.records()[0].country, "USA");
    assert_eq!(tidy.records()[0].product, "Chemicals");
    assert!((tidy.records()[0].value - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_source_product_labels_are_translated() {
    let raw = from_csv(" ,USA\ndatetime,化學品\n2021Q1,100\n");
    let tidy = run_pipeline(raw, &PipelineOptions::default()).unwrap();

    assert_eq!(tidy.len(), 1);
    assert_eq!(tidy.records()[0].product, "Chemicals");
}

#[test]
fn test_invalid_quarter_row_is_excluded() {
    let raw = RawTable::new(
        export_headers(),
        vec![
            vec![
                CellValue::from("2021Q5"),
                CellValue::Int(1),
                CellValue::Int(2),
                CellValue::Int(3),
            ],
            vec![
                CellValue::from("2021Q4"),
                CellValue::Int(4),
                CellValue::Int(5),
                CellValue::Int(6),
            ],
        ],
    );

    let tidy = run_pipeline(raw, &PipelineOptions::default()).unwrap();
    assert_eq!(tidy.len(), 3);
    assert!(tidy.iter().all(|r| r.date == date(2021, 10)));
}

#[test]
fn test_whitespace_cell_drops_only_its_combination() {
    let raw = RawTable::new(
        export_headers(),
        vec![vec![
            CellValue::from("2022Q2"),
            CellValue::Int(10),
            CellValue::from("   "),
            CellValue::Int(30),
        ]],
    );

    let tidy = run_pipeline(raw, &PipelineOptions::default()).unwrap();
    let keys: Vec<(&str, &str)> = tidy
        .iter()
        .map(|r| (r.country.as_str(), r.product.as_str()))
        .collect();

    assert_eq!(keys, vec![("USA", "Chemicals"), ("Japan", "Chemicals")]);
}

#[test]
fn test_spreadsheet_boilerplate_is_discarded() {
    let csv = " ,USA,,Japan\n\
               datetime,化學品,電子產品,化學品\n\
               Exports by destination (million USD),,,\n\
               2021Q1,100,200,300\n\
               2021Q2,110,n/a,310\n\
               2021,999,999,999\n\
               Total,1,1,1\n\
               ,,,\n\
               Note: figures are provisional,,,\n";
    let tidy = run_pipeline(from_csv(csv), &PipelineOptions::default()).unwrap();

    assert_eq!(tidy.len(), 5);
    assert_eq!(tidy.countries(), vec!["Japan", "USA"]);
    assert_eq!(tidy.products(), vec!["Chemicals", "Electronic products"]);
    assert!((tidy.total() - 1020.0).abs() < 1e-9);
}

#[test]
fn test_value_sum_is_preserved() {
    let rows = vec![
        vec![
            CellValue::from("2020Q1"),
            CellValue::Float(1.5),
            CellValue::Int(2),
            CellValue::Null,
        ],
        vec![
            CellValue::from("2020Q2"),
            CellValue::from("4"),
            CellValue::from("bad"),
            CellValue::Float(8.25),
        ],
    ];
    let expected: f64 = rows
        .iter()
        .flat_map(|row| row[1..].iter())
        .filter_map(CellValue::to_number)
        .sum();

    let tidy = run_pipeline(RawTable::new(export_headers(), rows), &PipelineOptions::default())
        .unwrap();
    assert_eq!(tidy.len(), 4);
    assert!((tidy.total() - expected).abs() < 1e-9);
}

#[test]
fn test_duplicate_combinations_are_kept() {
    let raw = RawTable::new(
        vec![
            HeaderPair::new(" ", "datetime"),
            HeaderPair::new("USA", "化學品"),
            HeaderPair::new("USA", "Chemicals"),
        ],
        vec![vec![
            CellValue::from("2021Q1"),
            CellValue::Int(1),
            CellValue::Int(2),
        ]],
    );

    let tidy = run_pipeline(raw, &PipelineOptions::default()).unwrap();
    assert_eq!(tidy.len(), 2);
    assert!(tidy.iter().all(|r| r.product == "Chemicals"));
}

#[test]
fn test_index_column_is_dropped() {
    let raw = RawTable::new(
        vec![
            HeaderPair::new("index", ""),
            HeaderPair::new(" ", "datetime"),
            HeaderPair::new("USA", "化學品"),
        ],
        vec![vec![
            CellValue::Int(0),
            CellValue::from("2021Q1"),
            CellValue::Int(5),
        ]],
    );

    let tidy = run_pipeline(raw, &PipelineOptions::default()).unwrap();
    assert_eq!(tidy.len(), 1);
    assert_eq!(tidy.records()[0].country, "USA");
}

#[test]
fn test_missing_time_column_aborts() {
    let raw = from_csv("Period,USA\n,Chemicals\n2021Q1,1\n");
    let result = run_pipeline(raw, &PipelineOptions::default());
    assert!(matches!(result, Err(PipelineError::MalformedHeader { .. })));
}

#[test]
fn test_pipeline_output_is_clean_fixed_point() {
    let raw = RawTable::new(
        export_headers(),
        vec![vec![
            CellValue::from("2023Q3"),
            CellValue::Int(1),
            CellValue::Null,
            CellValue::from(" 2.5"),
        ]],
    );
    let tidy = run_pipeline(raw, &PipelineOptions::default()).unwrap();
    let again = exportdash_core::clean(exportdash_core::LongTable::from(&tidy));
    assert_eq!(tidy, again);
}

// ===== Workbook input =====

#[test]
fn test_xlsx_with_merged_country_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("TWsalesamount.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let merged = Format::new();
    sheet.write_string(0, 0, " ").unwrap();
    sheet.merge_range(0, 1, 0, 2, "USA", &merged).unwrap();
    sheet.write_string(1, 0, "datetime").unwrap();
    sheet.write_string(1, 1, "機械").unwrap();
    sheet.write_string(1, 2, "資訊與通信產品").unwrap();
    sheet.write_string(2, 0, "2024Q3").unwrap();
    sheet.write_number(2, 1, 12.0).unwrap();
    sheet.write_number(2, 2, 34.0).unwrap();
    workbook.save(&path).unwrap();

    let tidy = load_tidy(&path, &PipelineOptions::default()).unwrap();
    let expected: TidyTable = vec![
        TidyRecord {
            date: date(2024, 7),
            country: "USA".to_string(),
            product: "Machinery ".to_string(),
            value: 12.0,
        },
        TidyRecord {
            date: date(2024, 7),
            country: "USA".to_string(),
            product: "ICT products".to_string(),
            value: 34.0,
        },
    ]
    .into_iter()
    .collect();

    assert_eq!(tidy, expected);
}
