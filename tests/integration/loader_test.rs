use std::fs::File;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use bmd_trends::config::CohortSource;
use bmd_trends::{AnalysisConfig, BmdError, Cohort, RecordBatch, Sex, load_cohort, load_cohorts, merge};
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use tempfile::tempdir;

use crate::utils::{header, write_file, write_sample_cohorts};

#[test]
fn test_merged_row_count_is_sum_of_sources() {
    let dir = tempdir().unwrap();
    let config = write_sample_cohorts(dir.path());

    let original = load_cohort(&config.original, Cohort::Original, &config).unwrap();
    let offspring = load_cohort(&config.offspring, Cohort::Offspring, &config).unwrap();
    let (n_original, n_offspring) = (original.len(), offspring.len());
    assert_eq!(n_original, 62);
    assert_eq!(n_offspring, 62);

    let merged = merge(original, offspring).unwrap();
    assert_eq!(merged.len(), n_original + n_offspring);
    assert!(merged.visits()[..n_original].iter().all(|v| v.cohort == Cohort::Original));
    assert!(merged.visits()[n_original..].iter().all(|v| v.cohort == Cohort::Offspring));

    let loaded = load_cohorts(&config).unwrap();
    assert_eq!(loaded.len(), merged.len());
    assert_eq!(loaded.subjects(), merged.subjects());
}

#[test]
fn test_csv_values_survive_loading() {
    let dir = tempdir().unwrap();
    let config = write_sample_cohorts(dir.path());
    let original = load_cohort(&config.original, Cohort::Original, &config).unwrap();

    let first = &original.visits()[0];
    assert_eq!(first.subject_id, "1000");
    assert_eq!(first.sex, Sex::Male);
    assert_eq!(first.exam_date, NaiveDate::from_ymd_opt(1986, 1, 15).unwrap());
    assert_eq!(first.exam, Some(1));
    assert!((first.age - 60.0).abs() < 1e-12);

    let offspring = load_cohort(&config.offspring, Cohort::Offspring, &config).unwrap();
    let missing_score = offspring.iter().find(|v| v.subject_id == "5101").unwrap();
    assert!(missing_score.tscore.is_nan());
    assert!(offspring.iter().any(|v| v.sex == Sex::Unknown));
}

#[test]
fn test_subject_in_both_cohorts_is_rejected() {
    let dir = tempdir().unwrap();
    let original = write_file(
        dir.path(),
        "original.csv",
        &format!("{}\n42,1,1990-01-01,20,70,1920,-1.5\n", header("newid")),
    );
    let offspring = write_file(
        dir.path(),
        "offspring.csv",
        &format!("{}\n42,2,1995-01-01,1,45,1950,0.2\n", header("newID")),
    );
    let config = AnalysisConfig {
        original: CohortSource::new(original, "newid"),
        offspring: CohortSource::new(offspring, "newID"),
        ..AnalysisConfig::default()
    };

    let err = load_cohorts(&config).unwrap_err();
    assert!(matches!(err, BmdError::DataError(_)));
    assert!(err.to_string().contains("42"));
}

#[test]
fn test_missing_column_is_a_schema_error() {
    let dir = tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "no_score.csv",
        "newid,SEX,scdt,Exam,age,year_of_birth\n1,1,1990-01-01,20,70,1920\n",
    );
    let config = AnalysisConfig::default();
    let err = load_cohort(&CohortSource::new(path, "newid"), Cohort::Original, &config).unwrap_err();
    assert!(matches!(err, BmdError::SchemaError(_)));
    assert!(err.to_string().contains("tscore"));
}

#[test]
fn test_malformed_exam_date_names_the_row() {
    let dir = tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "bad_date.csv",
        &format!(
            "{}\n1,1,1990-01-01,20,70,1920,-1\n2,2,someday,20,72,1918,-2\n",
            header("newid")
        ),
    );
    let err = load_cohort(&CohortSource::new(path, "newid"), Cohort::Original, &AnalysisConfig::default())
        .unwrap_err();
    assert!(matches!(err, BmdError::DataError(_)));
    assert!(err.to_string().contains("row 2"));
}

#[test]
fn test_missing_subject_id_names_the_row() {
    let dir = tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "no_id.csv",
        &format!(
            "{}\n1,1,1990-01-01,20,70,1920,-1\n,2,1991-01-01,20,72,1918,-2\n",
            header("newid")
        ),
    );
    let err = load_cohort(&CohortSource::new(path, "newid"), Cohort::Original, &AnalysisConfig::default())
        .unwrap_err();
    assert!(matches!(err, BmdError::DataError(_)));
    assert!(err.to_string().contains("row 2"));
    assert!(err.to_string().contains("subject identifier"));
}

#[test]
fn test_float_identifiers_and_text_dates() {
    let dir = tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "floats.tsv",
        "NEWID\tSex\tSCDT\tEXAM\tAge\tYEAR_OF_BIRTH\tTSCORE\n\
         101.0\t2.0\t03/15/1992\t22\t71.5\t1920\t-2.1\n\
         102.0\t1.0\t07/01/1993\t22\t68.0\t1925\t-0.4\n",
    );
    let table = load_cohort(&CohortSource::new(path, "NewID"), Cohort::Original, &AnalysisConfig::default())
        .unwrap();
    let ids: Vec<&str> = table.iter().map(|v| v.subject_id.as_str()).collect();
    assert_eq!(ids, vec!["101", "102"]);
    assert_eq!(table.visits()[0].sex, Sex::Female);
    assert_eq!(
        table.visits()[0].exam_date,
        NaiveDate::from_ymd_opt(1992, 3, 15).unwrap()
    );
}

#[test]
fn test_parquet_source() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cohort.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("newid", DataType::Utf8, false),
        Field::new("SEX", DataType::Int64, true),
        Field::new("scdt", DataType::Utf8, true),
        Field::new("Exam", DataType::Int64, true),
        Field::new("age", DataType::Float64, true),
        Field::new("year_of_birth", DataType::Int64, true),
        Field::new("TScore", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["a1", "a2", "a1"])),
        Arc::new(Int64Array::from(vec![Some(1), None, Some(1)])),
        Arc::new(StringArray::from(vec!["1991-04-02", "1996-11-30", "1999-01-05"])),
        Arc::new(Int64Array::from(vec![21, 24, 25])),
        Arc::new(Float64Array::from(vec![Some(72.0), Some(80.5), None])),
        Arc::new(Int64Array::from(vec![1919, 1916, 1919])),
        Arc::new(Float64Array::from(vec![-1.0, -2.5, -1.2])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let table = load_cohort(&CohortSource::new(path, "newid"), Cohort::Offspring, &AnalysisConfig::default())
        .unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.subject_count(), 2);
    assert_eq!(table.visits()[1].sex, Sex::Unknown);
    assert!(table.visits()[2].age.is_nan());
    assert!(table.iter().all(|v| v.cohort == Cohort::Offspring));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "cohortBMD_newID2.xlsx", "");
    let err = load_cohort(&CohortSource::new(path, "newid"), Cohort::Original, &AnalysisConfig::default())
        .unwrap_err();
    assert!(matches!(err, BmdError::SchemaError(_)));
}
