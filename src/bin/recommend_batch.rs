//! Batch crop recommendation over a CSV of field records
//!
//! Input columns: N, P, K, ph, annual_temp, annual_humidity, annual_rainfall, season
//! Output: one row per input row with the adjusted climate and the top 3 crops.
//! Rows with missing values are skipped (and reported); rows whose prediction
//! fails keep their slot with empty crop columns and an `error` message.
//!
//! Usage:
//!   MODEL_PATH=models/crop_model.json cargo run --bin recommend_batch -- fields.csv out.csv

use anyhow::{Context, Result};
use crop_recommender::{ModelArtifact, PredictionRequest, Recommender, TOP_K};
use polars::prelude::*;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

const NUMERIC_COLUMNS: [&str; 7] = [
    "N",
    "P",
    "K",
    "ph",
    "annual_temp",
    "annual_humidity",
    "annual_rainfall",
];

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        anyhow::bail!("Usage: {} <input.csv> <output.csv>", args[0]);
    }
    let (input_path, output_path) = (&args[1], &args[2]);

    let model_path = std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| "models/crop_model.json".to_string());

    println!("\n{}", "=".repeat(70));
    println!("Batch Crop Recommendation");
    println!("{}", "=".repeat(70));
    println!("  Model:  {}", model_path);
    println!("  Input:  {}", input_path);
    println!("  Output: {}", output_path);
    println!();

    let total_start = Instant::now();

    let model = ModelArtifact::load(std::path::Path::new(&model_path))?;
    let recommender = Recommender::new(Arc::new(model));

    // Load CSV
    let load_start = Instant::now();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(input_path.into()))?
        .finish()
        .with_context(|| format!("Failed to read {}", input_path))?;
    println!(
        "Loaded {} rows ({:.3} ms)",
        df.height(),
        load_start.elapsed().as_secs_f64() * 1000.0
    );

    let (row_ids, requests) = read_requests(&df)?;
    let skipped = df.height() - requests.len();
    if skipped > 0 {
        println!("Skipped {} rows with missing values", skipped);
    }

    // Score rows in parallel (CPU-bound, no shared mutable state)
    let score_start = Instant::now();
    let results: Vec<_> = requests
        .par_iter()
        .map(|req| recommender.recommend(req))
        .collect();
    println!(
        "Scored {} rows ({:.3} ms)",
        results.len(),
        score_start.elapsed().as_secs_f64() * 1000.0
    );

    // Assemble output columns
    let mut temp = Vec::with_capacity(results.len());
    let mut hum = Vec::with_capacity(results.len());
    let mut rain = Vec::with_capacity(results.len());
    let mut crops: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(results.len()); TOP_K];
    let mut confidences: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(results.len()); TOP_K];
    let mut errors: Vec<Option<String>> = Vec::with_capacity(results.len());
    let mut failed = 0usize;

    for result in &results {
        match result {
            Ok(response) => {
                temp.push(Some(response.adjusted_climate.temp));
                hum.push(Some(response.adjusted_climate.hum));
                rain.push(Some(response.adjusted_climate.rain));
                for k in 0..TOP_K {
                    let rec = response.recommendations.get(k);
                    crops[k].push(rec.map(|r| r.crop.clone()));
                    confidences[k].push(rec.map(|r| r.confidence));
                }
                errors.push(None);
            }
            Err(e) => {
                failed += 1;
                temp.push(None);
                hum.push(None);
                rain.push(None);
                for k in 0..TOP_K {
                    crops[k].push(None);
                    confidences[k].push(None);
                }
                errors.push(Some(e.to_string()));
            }
        }
    }

    let mut columns = vec![
        Column::new("row".into(), row_ids),
        Column::new(
            "season".into(),
            requests.iter().map(|r| r.season.clone()).collect::<Vec<_>>(),
        ),
        Column::new("adjusted_temp".into(), temp),
        Column::new("adjusted_hum".into(), hum),
        Column::new("adjusted_rain".into(), rain),
    ];
    for (k, (crop_col, conf_col)) in crops.into_iter().zip(confidences).enumerate() {
        columns.push(Column::new(format!("crop_{}", k + 1).into(), crop_col));
        columns.push(Column::new(format!("confidence_{}", k + 1).into(), conf_col));
    }
    columns.push(Column::new("error".into(), errors));

    let mut out = DataFrame::new(columns)?;

    let mut file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create {}", output_path))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut out)?;

    println!();
    println!("{}", "=".repeat(70));
    println!(
        "Wrote {} rows ({} failed) in {:.3} ms",
        out.height(),
        failed,
        total_start.elapsed().as_secs_f64() * 1000.0
    );
    println!("{}", "=".repeat(70));

    Ok(())
}

/// Pull complete rows out of the input frame, keeping their original row index
fn read_requests(df: &DataFrame) -> Result<(Vec<u32>, Vec<PredictionRequest>)> {
    let mut numeric: Vec<Float64Chunked> = Vec::with_capacity(NUMERIC_COLUMNS.len());
    for name in NUMERIC_COLUMNS {
        let column = df
            .column(name)
            .with_context(|| format!("Input is missing column {}", name))?
            .cast(&DataType::Float64)?;
        numeric.push(column.f64()?.clone());
    }

    let season = df
        .column("season")
        .with_context(|| "Input is missing column season")?
        .cast(&DataType::String)?;
    let season = season.str()?;

    let mut row_ids = Vec::with_capacity(df.height());
    let mut requests = Vec::with_capacity(df.height());

    for idx in 0..df.height() {
        let values: Option<Vec<f64>> = numeric.iter().map(|col| col.get(idx)).collect();
        let (Some(values), Some(tag)) = (values, season.get(idx)) else {
            continue;
        };

        row_ids.push(idx as u32);
        requests.push(PredictionRequest {
            n: values[0],
            p: values[1],
            k: values[2],
            ph: values[3],
            annual_temp: values[4],
            annual_humidity: values[5],
            annual_rainfall: values[6],
            season: tag.to_string(),
        });
    }

    Ok((row_ids, requests))
}
