//! Cleaned dataset -> Parquet snapshot.
//!
//! The territory indicator columns are only known at runtime, so the
//! schema and one builder per tag are derived from the dataset itself.
use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Builder, Int64Builder, Int8Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clean::{CleanDataset, CleanRecord};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

const BATCH_SIZE: usize = 65_536;

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub slug: String,
    pub out_dir: PathBuf,
}

#[derive(Debug, Default, Clone)]
pub struct ExportStats {
    pub rows_written: u64,
    pub out_path: PathBuf,
    pub manifest_path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub dataset: String,
    pub rows: u64,
    pub columns: usize,
    pub path: String,
}

/// Write the cleaned table as a single Parquet file plus a JSON manifest
/// under `<out_dir>/clean/`.
pub fn write_clean_snapshot(ds: &CleanDataset, cfg: &ExportConfig) -> Result<ExportStats> {
    let out_dir = cfg.out_dir.join("clean");
    create_dir_all(&out_dir).with_context(|| format!("mkdir -p {}", out_dir.display()))?;
    let out_path = out_dir.join("part-000000.parquet");

    let schema = Arc::new(snapshot_schema(ds));
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::try_new(3)?))
        .set_dictionary_enabled(true)
        .build();

    let mut file =
        File::create(&out_path).with_context(|| format!("create {}", out_path.display()))?;
    let mut writer = ArrowWriter::try_new(&mut file, schema.clone(), Some(props))?;

    let mut rows_written = 0u64;
    for chunk in ds.records.chunks(BATCH_SIZE) {
        let mut b = SnapshotBuilders::new(ds.territory_tags.len(), chunk.len());
        for r in chunk {
            b.append(r);
        }
        writer.write(&b.finish_batch(&schema)?)?;
        rows_written += chunk.len() as u64;
    }
    writer.close()?;
    file.flush()?;
    debug!(rows_written, out = %out_path.display(), "snapshot written");

    // Manifest next to the snapshot.
    let manifest_path = out_dir.join("manifest.json");
    let manifest = SnapshotManifest {
        dataset: cfg.slug.clone(),
        rows: rows_written,
        columns: schema.fields().len(),
        path: out_path.to_string_lossy().to_string(),
    };
    {
        let mut out = File::create(&manifest_path)
            .with_context(|| format!("create {}", manifest_path.display()))?;
        let json = serde_json::to_string_pretty(&manifest)?;
        out.write_all(json.as_bytes())?;
        out.flush()?;
    }

    Ok(ExportStats {
        rows_written,
        out_path,
        manifest_path,
    })
}

fn snapshot_schema(ds: &CleanDataset) -> Schema {
    use DataType::*;
    let mut fields = vec![
        Field::new("id", Int64, false),
        Field::new("city_id", Utf8, false),
        Field::new("district_id", Utf8, false),
        Field::new("street_id", Utf8, false),
        Field::new("series_id", Utf8, false),
        Field::new("wall_id", Utf8, false),
        Field::new("metro_station_id", Int64, false),
        Field::new("floor_num", Int64, false),
        Field::new("floors_cnt", Int64, false),
        Field::new("rooms_cnt", Int64, false),
        Field::new("bedrooms_cnt", Int64, false),
        Field::new("building_year", Int64, false),
        Field::new("levels_count", Int64, false),
        Field::new("area_total", Float64, false),
        Field::new("area_live", Float64, false),
        Field::new("area_kitchen", Float64, false),
        Field::new("ceiling_height", Float64, false),
        Field::new("bathrooms_cnt", Float64, false),
        Field::new("plate", Utf8, false),
    ];
    for tag in &ds.territory_tags {
        fields.push(Field::new(tag, Int8, false));
    }
    fields.push(Field::new("sold_price", Float64, false));
    Schema::new(fields)
}

// -------------------- builders --------------------

struct SnapshotBuilders {
    id: Int64Builder,
    city_id: StringBuilder,
    district_id: StringBuilder,
    street_id: StringBuilder,
    series_id: StringBuilder,
    wall_id: StringBuilder,
    metro_station_id: Int64Builder,
    floor_num: Int64Builder,
    floors_cnt: Int64Builder,
    rooms_cnt: Int64Builder,
    bedrooms_cnt: Int64Builder,
    building_year: Int64Builder,
    levels_count: Int64Builder,
    area_total: Float64Builder,
    area_live: Float64Builder,
    area_kitchen: Float64Builder,
    ceiling_height: Float64Builder,
    bathrooms_cnt: Float64Builder,
    plate: StringBuilder,
    tags: Vec<Int8Builder>,
    sold_price: Float64Builder,
}

impl SnapshotBuilders {
    fn new(tag_count: usize, cap: usize) -> Self {
        Self {
            id: Int64Builder::with_capacity(cap),
            city_id: StringBuilder::with_capacity(cap, cap * 8),
            district_id: StringBuilder::with_capacity(cap, cap * 8),
            street_id: StringBuilder::with_capacity(cap, cap * 8),
            series_id: StringBuilder::with_capacity(cap, cap * 8),
            wall_id: StringBuilder::with_capacity(cap, cap * 8),
            metro_station_id: Int64Builder::with_capacity(cap),
            floor_num: Int64Builder::with_capacity(cap),
            floors_cnt: Int64Builder::with_capacity(cap),
            rooms_cnt: Int64Builder::with_capacity(cap),
            bedrooms_cnt: Int64Builder::with_capacity(cap),
            building_year: Int64Builder::with_capacity(cap),
            levels_count: Int64Builder::with_capacity(cap),
            area_total: Float64Builder::with_capacity(cap),
            area_live: Float64Builder::with_capacity(cap),
            area_kitchen: Float64Builder::with_capacity(cap),
            ceiling_height: Float64Builder::with_capacity(cap),
            bathrooms_cnt: Float64Builder::with_capacity(cap),
            plate: StringBuilder::with_capacity(cap, cap * 8),
            tags: (0..tag_count)
                .map(|_| Int8Builder::with_capacity(cap))
                .collect(),
            sold_price: Float64Builder::with_capacity(cap),
        }
    }

    fn append(&mut self, r: &CleanRecord) {
        let m = &r.measures;
        self.id.append_value(r.id);
        self.city_id.append_value(&r.ids.city_id);
        self.district_id.append_value(&r.ids.district_id);
        self.street_id.append_value(&r.ids.street_id);
        self.series_id.append_value(&r.ids.series_id);
        self.wall_id.append_value(&r.ids.wall_id);
        self.metro_station_id.append_value(m.metro_station_id);
        self.floor_num.append_value(m.floor_num);
        self.floors_cnt.append_value(m.floors_cnt);
        self.rooms_cnt.append_value(m.rooms_cnt);
        self.bedrooms_cnt.append_value(m.bedrooms_cnt);
        self.building_year.append_value(m.building_year);
        self.levels_count.append_value(m.levels_count);
        self.area_total.append_value(m.area_total);
        self.area_live.append_value(m.area_live);
        self.area_kitchen.append_value(m.area_kitchen);
        self.ceiling_height.append_value(m.ceiling_height);
        self.bathrooms_cnt.append_value(r.bathrooms_cnt);
        self.plate.append_value(&r.plate);
        for (b, flag) in self.tags.iter_mut().zip(&r.territory_flags) {
            b.append_value(*flag as i8);
        }
        self.sold_price.append_value(m.sold_price);
    }

    fn finish_batch(&mut self, schema: &Arc<Schema>) -> Result<RecordBatch> {
        let mut cols: Vec<ArrayRef> = vec![
            Arc::new(self.id.finish()),
            Arc::new(self.city_id.finish()),
            Arc::new(self.district_id.finish()),
            Arc::new(self.street_id.finish()),
            Arc::new(self.series_id.finish()),
            Arc::new(self.wall_id.finish()),
            Arc::new(self.metro_station_id.finish()),
            Arc::new(self.floor_num.finish()),
            Arc::new(self.floors_cnt.finish()),
            Arc::new(self.rooms_cnt.finish()),
            Arc::new(self.bedrooms_cnt.finish()),
            Arc::new(self.building_year.finish()),
            Arc::new(self.levels_count.finish()),
            Arc::new(self.area_total.finish()),
            Arc::new(self.area_live.finish()),
            Arc::new(self.area_kitchen.finish()),
            Arc::new(self.ceiling_height.finish()),
            Arc::new(self.bathrooms_cnt.finish()),
            Arc::new(self.plate.finish()),
        ];
        for b in self.tags.iter_mut() {
            cols.push(Arc::new(b.finish()));
        }
        cols.push(Arc::new(self.sold_price.finish()));
        Ok(RecordBatch::try_new(schema.clone(), cols)?)
    }
}
