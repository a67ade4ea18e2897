//! Model collaborator: gradient-boosted regression over the cleaned
//! dataset through a plain fit/predict contract.
//!
//! Columns are partitioned into categoricals (plate plus the five
//! collapsed identifier columns) and numericals (everything else,
//! territory indicators included). Categoricals are one-hot encoded
//! against a vocabulary fitted on the training split only; a category
//! unseen at fit time encodes to all zeros.
use anyhow::{bail, Context, Result};
use clean::{CleanDataset, CleanRecord};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CATEGORICAL_COLUMNS: [&str; 6] = [
    "plate",
    "city_id",
    "district_id",
    "street_id",
    "series_id",
    "wall_id",
];

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub iterations: usize,
    pub shrinkage: f64,
    pub max_depth: u32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 0,
            iterations: 1000,
            shrinkage: 0.05,
            max_depth: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub mae: f64,
    pub mape: f64,
}

#[derive(Debug)]
pub struct TrainReport {
    pub metrics: Metrics,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
    pub n_train: usize,
    pub n_valid: usize,
    pub feature_count: usize,
}

/// Fit the regressor on a seeded 80/20 split and score the held-out rows.
pub fn train_and_evaluate(ds: &CleanDataset, cfg: &TrainConfig) -> Result<TrainReport> {
    let (train_idx, valid_idx) = train_valid_split(ds.records.len(), cfg.test_fraction, cfg.seed);
    if train_idx.is_empty() || valid_idx.is_empty() {
        bail!(
            "dataset too small to split: {} rows at test fraction {}",
            ds.records.len(),
            cfg.test_fraction
        );
    }

    let train_rows: Vec<&CleanRecord> = train_idx.iter().map(|&i| &ds.records[i]).collect();
    let valid_rows: Vec<&CleanRecord> = valid_idx.iter().map(|&i| &ds.records[i]).collect();

    let encoder = OneHotEncoder::fit(&train_rows);
    let feature_count = numeric_width(ds.territory_tags.len()) + encoder.width();
    debug!(
        n_train = train_rows.len(),
        n_valid = valid_rows.len(),
        feature_count,
        "matrix assembled"
    );

    let mut training: DataVec = train_rows
        .iter()
        .map(|r| {
            Data::new_training_data(
                feature_row(r, &encoder),
                1.0,
                r.measures.sold_price as f32,
                None,
            )
        })
        .collect();

    let mut conf = Config::new();
    conf.set_feature_size(feature_count);
    conf.set_max_depth(cfg.max_depth);
    conf.set_iterations(cfg.iterations);
    conf.set_shrinkage(cfg.shrinkage as f32);
    conf.set_loss("SquaredError");
    conf.set_data_sample_ratio(1.0);
    conf.set_feature_sample_ratio(1.0);
    conf.set_training_optimization_level(2);
    conf.set_debug(false);

    let mut model = GBDT::new(&conf);
    model.fit(&mut training);

    let test: DataVec = valid_rows
        .iter()
        .map(|r| Data::new_test_data(feature_row(r, &encoder), None))
        .collect();
    let predicted: Vec<f64> = model.predict(&test).into_iter().map(f64::from).collect();
    let actual: Vec<f64> = valid_rows.iter().map(|r| r.measures.sold_price).collect();

    let metrics = Metrics {
        mae: mean_absolute_error(&actual, &predicted),
        mape: mean_absolute_percentage_error(&actual, &predicted),
    };
    info!(mae = metrics.mae, mape = metrics.mape, "evaluation done");

    Ok(TrainReport {
        metrics,
        actual,
        predicted,
        n_train: train_rows.len(),
        n_valid: valid_rows.len(),
        feature_count,
    })
}

/// Deterministic shuffle split: first `test_fraction` of the shuffled
/// index order goes to validation, the rest to training.
pub fn train_valid_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let n_valid = (n as f64 * test_fraction).round() as usize;
    let valid = indices[..n_valid].to_vec();
    let train = indices[n_valid..].to_vec();
    (train, valid)
}

// -------------------- feature assembly --------------------

fn numeric_width(tag_count: usize) -> usize {
    // id + eleven passthrough measures + bathrooms + one flag per tag
    13 + tag_count
}

fn feature_row(r: &CleanRecord, encoder: &OneHotEncoder) -> Vec<f32> {
    let m = &r.measures;
    let mut out: Vec<f32> = Vec::with_capacity(numeric_width(r.territory_flags.len()));
    out.push(r.id as f32);
    out.push(m.metro_station_id as f32);
    out.push(m.floor_num as f32);
    out.push(m.floors_cnt as f32);
    out.push(m.rooms_cnt as f32);
    out.push(m.bedrooms_cnt as f32);
    out.push(m.building_year as f32);
    out.push(m.levels_count as f32);
    out.push(m.area_total as f32);
    out.push(m.area_live as f32);
    out.push(m.area_kitchen as f32);
    out.push(m.ceiling_height as f32);
    out.push(r.bathrooms_cnt as f32);
    out.extend(r.territory_flags.iter().map(|f| *f as f32));
    encoder.encode(r, &mut out);
    out
}

fn categorical_values(r: &CleanRecord) -> [&str; CATEGORICAL_COLUMNS.len()] {
    [
        r.plate.as_str(),
        r.ids.city_id.as_str(),
        r.ids.district_id.as_str(),
        r.ids.street_id.as_str(),
        r.ids.series_id.as_str(),
        r.ids.wall_id.as_str(),
    ]
}

/// One-hot encoder over the categorical columns, vocabulary sorted per
/// column. Categories unseen at fit time encode to all zeros.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit(rows: &[&CleanRecord]) -> Self {
        let mut sets: [BTreeSet<String>; CATEGORICAL_COLUMNS.len()] =
            std::array::from_fn(|_| BTreeSet::new());
        for r in rows {
            for (set, v) in sets.iter_mut().zip(categorical_values(r)) {
                if !set.contains(v) {
                    set.insert(v.to_string());
                }
            }
        }
        Self {
            categories: sets.into_iter().map(|s| s.into_iter().collect()).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn encode(&self, r: &CleanRecord, out: &mut Vec<f32>) {
        for (cats, v) in self.categories.iter().zip(categorical_values(r)) {
            let hit = cats.binary_search_by(|c| c.as_str().cmp(v)).ok();
            for j in 0..cats.len() {
                out.push(if hit == Some(j) { 1.0 } else { 0.0 });
            }
        }
    }
}

// -------------------- metrics --------------------

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n as f64
}

pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs() / a.abs().max(f64::EPSILON))
        .sum::<f64>()
        / n as f64
}

// -------------------- reporting --------------------

/// Actual-vs-predicted comparison curve over the validation rows.
pub fn write_comparison_plot(
    path: &Path,
    actual: &[f64],
    predicted: &[f64],
    metrics: &Metrics,
) -> Result<()> {
    if actual.is_empty() {
        bail!("nothing to plot: no validation rows");
    }
    if let Some(parent) = path.parent() {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_min = actual
        .iter()
        .chain(predicted)
        .cloned()
        .fold(f64::INFINITY, f64::min);
    let y_max = actual
        .iter()
        .chain(predicted)
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    let pad = ((y_max - y_min) * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "GBDT regression   MAE: {:.2}   MAPE: {:.2}%",
                metrics.mae,
                metrics.mape * 100.0
            ),
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..actual.len(), (y_min - pad)..(y_max + pad))?;

    chart
        .configure_mesh()
        .x_desc("validation sample")
        .y_desc("sold price")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            actual.iter().enumerate().map(|(i, v)| (i, *v)),
            &BLUE,
        ))?
        .label("actual")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    chart
        .draw_series(LineSeries::new(
            predicted.iter().enumerate().map(|(i, v)| (i, *v)),
            &RED,
        ))?
        .label("predicted")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct MetricsManifest<'a> {
    dataset: &'a str,
    n_train: usize,
    n_valid: usize,
    features: usize,
    mae: f64,
    mape: f64,
}

/// Write the evaluation summary next to the plot.
pub fn write_metrics_manifest(path: &Path, dataset: &str, report: &TrainReport) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let manifest = MetricsManifest {
        dataset,
        n_train: report.n_train,
        n_valid: report.n_valid,
        features: report.feature_count,
        mae: report.metrics.mae,
        mape: report.metrics.mape,
    };
    let mut out = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let json = serde_json::to_string_pretty(&manifest)?;
    out.write_all(json.as_bytes())?;
    out.flush()?;
    Ok(path.to_path_buf())
}

// -------------------- tests --------------------
