//! Integration tests for costpred-pipeline.
//!
//! These run the full load -> encode -> train -> predict sequence against
//! files on disk: the bundled sample dataset and temporary fixtures.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use costpred_pipeline::{
    CostPredictor, LoadOptions, PipelineConfig, TextEncoding, TrainOptions,
    encode, load_table,
};
use costpred_schemas::{ClampPolicy, FeatureRequest};

const HEADER: &str =
    "Presupuesto,Tiempo invertido,Tipo,Momento,No. de personas,Costo";

fn sample_dataset() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../data/costos_pred.csv")
}

fn request(activity_type: &str, time_of_day: &str) -> FeatureRequest {
    FeatureRequest {
        budget: 1_200.0,
        time_invested: 3.5,
        activity_type: activity_type.into(),
        time_of_day: time_of_day.into(),
        people_count: 2.0,
    }
}

/// Writes `bytes` to a temp file and returns it with its UTF-8 path.
fn temp_dataset(bytes: &[u8]) -> (tempfile::NamedTempFile, Utf8PathBuf) {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(bytes).expect("write dataset");
    let path = Utf8Path::from_path(file.path())
        .expect("utf-8 temp path")
        .to_owned();
    (file, path)
}

#[test]
fn sample_dataset_builds_a_predictor() {
    let config = PipelineConfig {
        data_path: sample_dataset(),
        ..PipelineConfig::default()
    };
    let predictor = CostPredictor::build(&config).expect("sample builds");

    let mappings = predictor.mappings();
    assert_eq!(
        mappings.activity_type.labels().collect::<Vec<_>>(),
        ["Compras", "Deporte", "Ocio", "Trabajo", "Viaje"]
    );
    assert_eq!(
        mappings.time_of_day.labels().collect::<Vec<_>>(),
        ["Mañana", "Noche", "Tarde"]
    );

    let report = predictor.report();
    assert_eq!(report.train_rows, 42);
    assert_eq!(report.test_rows, 18);
    assert!(report.train_r_squared > 0.9, "{report:?}");

    let prediction = predictor
        .predict(&request("Ocio", "Noche"))
        .expect("known categories");
    assert!(prediction.value > 0.0);
    assert_eq!(prediction.to_string(), format!("{:.2}", prediction.value));
}

#[test]
fn building_twice_gives_identical_models() {
    let config = PipelineConfig {
        data_path: sample_dataset(),
        ..PipelineConfig::default()
    };
    let a = CostPredictor::build(&config).unwrap();
    let b = CostPredictor::build(&config).unwrap();
    assert_eq!(a.summary(), b.summary());
}

#[test]
fn different_seeds_split_differently() {
    let base = PipelineConfig {
        data_path: sample_dataset(),
        ..PipelineConfig::default()
    };
    let other = PipelineConfig {
        train: TrainOptions {
            seed: 42,
            ..TrainOptions::default()
        },
        ..base.clone()
    };
    let a = CostPredictor::build(&base).unwrap();
    let b = CostPredictor::build(&other).unwrap();
    assert_eq!(a.mappings(), b.mappings());
    assert_ne!(a.model(), b.model());
}

#[test]
fn unknown_category_is_rejected_end_to_end() {
    let config = PipelineConfig {
        data_path: sample_dataset(),
        ..PipelineConfig::default()
    };
    let predictor = CostPredictor::build(&config).unwrap();
    let err = predictor
        .predict(&request("Inexistente", "Noche"))
        .unwrap_err();
    assert!(err.is_unknown_category());
}

#[test]
fn latin1_file_matches_utf8_file() {
    let utf8 = format!(
        "{HEADER}\n\
         100,2,Ocio,Mañana,2,120\n\
         250,5,Trabajo,Noche,1,300\n"
    );
    let latin1: Vec<u8> = utf8
        .chars()
        .map(|c| u8::try_from(u32::from(c)).expect("latin-1 range"))
        .collect();

    let (_utf8_file, utf8_path) = temp_dataset(utf8.as_bytes());
    let (_latin1_file, latin1_path) = temp_dataset(&latin1);

    let from_utf8 = load_table(&utf8_path, &LoadOptions::default()).unwrap();
    let from_latin1 = load_table(
        &latin1_path,
        &LoadOptions {
            encoding: TextEncoding::Latin1,
            ..LoadOptions::default()
        },
    )
    .unwrap();

    assert_eq!(from_utf8, from_latin1);
    assert_eq!(
        encode(&from_utf8).unwrap().mappings,
        encode(&from_latin1).unwrap().mappings
    );
}

#[test]
fn raw_policy_reports_negative_predictions() {
    // Cost falls with budget, so a large budget extrapolates below zero.
    let dataset = format!(
        "{HEADER}\n\
         0,1,Ocio,Noche,1,100\n\
         10,2,Ocio,Noche,2,90\n\
         20,1,Trabajo,Mañana,1,80\n\
         30,3,Trabajo,Mañana,3,70\n\
         40,2,Ocio,Mañana,1,60\n\
         50,1,Trabajo,Noche,2,50\n\
         60,2,Trabajo,Noche,1,40\n\
         70,3,Ocio,Mañana,2,30\n"
    );
    let (_file, path) = temp_dataset(dataset.as_bytes());
    let request = FeatureRequest {
        budget: 5_000.0,
        time_invested: 1.0,
        activity_type: "Ocio".into(),
        time_of_day: "Noche".into(),
        people_count: 1.0,
    };

    let raw_config = PipelineConfig {
        data_path: path.clone(),
        train: TrainOptions {
            test_fraction: 0.0,
            ..TrainOptions::default()
        },
        clamp: ClampPolicy::Raw,
        ..PipelineConfig::default()
    };
    let raw = CostPredictor::build(&raw_config)
        .unwrap()
        .predict(&request)
        .unwrap();
    assert!(raw.value < 0.0, "{raw:?}");
    assert!((raw.value - raw.raw).abs() < f64::EPSILON);

    let clamped_config = PipelineConfig {
        clamp: ClampPolicy::ClampNegative,
        ..raw_config
    };
    let clamped = CostPredictor::build(&clamped_config)
        .unwrap()
        .predict(&request)
        .unwrap();
    assert_eq!(clamped.to_string(), "0.00");
    assert!(clamped.raw < 0.0);
}

#[test]
fn missing_file_is_data_load_error() {
    let config = PipelineConfig {
        data_path: Utf8PathBuf::from("/nonexistent/costos_pred.csv"),
        ..PipelineConfig::default()
    };
    let err = CostPredictor::build(&config).unwrap_err();
    assert!(err.is_data_load());
}

#[test]
fn config_file_drives_the_build() {
    let json = serde_json::json!({
        "data_path": sample_dataset(),
        "train": { "test_fraction": 0.0 },
        "bounds": {
            "people_count": { "min": 1.0, "max": 7.0 }
        }
    });
    let (_file, path) = temp_dataset(json.to_string().as_bytes());

    let config = PipelineConfig::from_json_file(&path).unwrap();
    let predictor = CostPredictor::build(&config).unwrap();
    assert_eq!(predictor.report().train_rows, 60);

    let mut too_many = request("Ocio", "Noche");
    too_many.people_count = 8.0;
    let err = predictor.predict(&too_many).unwrap_err();
    assert!(err.is_invalid_input_range());
}
