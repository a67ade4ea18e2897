//! CSV -> typed listing rows.
//!
//! The header row is resolved to column indices up front; a missing
//! required column is fatal before any row is parsed. Cell parsing never
//! errors: empty or malformed cells become `None` and are left to the
//! cleaning rules downstream.
use anyhow::{anyhow, Context, Result};
use csv_async::{AsyncReaderBuilder, StringRecord};
use futures::StreamExt;
use metadata::{columns, RawListing};
use std::path::Path;
use tokio::io::BufReader;
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    pub rows_in: u64,
    pub bytes_in: u64,
}

/// Read the whole listings file into memory.
pub async fn read_listings(path: &Path) -> Result<(Vec<RawListing>, IngestStats)> {
    if !path.exists() {
        return Err(anyhow!("source file not found: {}", path.display()));
    }

    let f = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("open {}", path.display()))?;
    let bytes_in = f.metadata().await?.len();

    let mut rdr = AsyncReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(true)
        .create_reader(BufReader::new(f));

    let headers: StringRecord = rdr.headers().await?.clone();
    let idx = HeaderIdx::from_headers(&headers)?;

    let mut rows: Vec<RawListing> = Vec::new();
    let mut records = rdr.records();
    while let Some(rec) = records.next().await {
        let rec = rec?;
        rows.push(parse_row(&rec, &idx));
    }

    let stats = IngestStats {
        rows_in: rows.len() as u64,
        bytes_in,
    };
    debug!(rows_in = stats.rows_in, bytes_in = stats.bytes_in, "ingest done");
    Ok((rows, stats))
}

fn parse_row(rec: &StringRecord, idx: &HeaderIdx) -> RawListing {
    RawListing {
        id: cell(rec, idx.idx_id).and_then(parse_i64),
        city_id: cell(rec, idx.idx_city_id).and_then(parse_i64),
        district_id: cell(rec, idx.idx_district_id).and_then(parse_i64),
        street_id: cell(rec, idx.idx_street_id).and_then(parse_i64),
        series_id: cell(rec, idx.idx_series_id).and_then(parse_i64),
        wall_id: cell(rec, idx.idx_wall_id).and_then(parse_i64),
        metro_station_id: cell(rec, idx.idx_metro_station_id).and_then(parse_i64),
        floor_num: cell(rec, idx.idx_floor_num).and_then(parse_i64),
        floors_cnt: cell(rec, idx.idx_floors_cnt).and_then(parse_i64),
        rooms_cnt: cell(rec, idx.idx_rooms_cnt).and_then(parse_i64),
        bedrooms_cnt: cell(rec, idx.idx_bedrooms_cnt).and_then(parse_i64),
        building_year: cell(rec, idx.idx_building_year).and_then(parse_i64),
        levels_count: cell(rec, idx.idx_levels_count).and_then(parse_i64),
        area_total: cell(rec, idx.idx_area_total).and_then(parse_f64),
        area_live: cell(rec, idx.idx_area_live).and_then(parse_f64),
        area_kitchen: cell(rec, idx.idx_area_kitchen).and_then(parse_f64),
        ceiling_height: cell(rec, idx.idx_ceiling_height).and_then(parse_f64),
        bathrooms_cnt: cell(rec, idx.idx_bathrooms_cnt).and_then(parse_f64),
        sold_price: cell(rec, idx.idx_sold_price).and_then(parse_f64),
        plate: cell(rec, idx.idx_plate).map(str::to_string),
        territory: cell(rec, idx.idx_territory).map(str::to_string),
        price: cell(rec, idx.idx_price).and_then(parse_f64),
        status: cell(rec, idx.idx_status).map(str::to_string),
        area_balcony: cell(rec, idx.idx_area_balcony).map(str::to_string),
        komunal_cost: cell(rec, idx.idx_komunal_cost).map(str::to_string),
        closed_yard: cell(rec, idx.idx_closed_yard).map(str::to_string),
        flat_on_floor: cell(rec, idx.idx_flat_on_floor).and_then(parse_i64),
        loggia: cell(rec, idx.idx_loggia).map(str::to_string),
        builder_id: cell(rec, idx.idx_builder_id).and_then(parse_i64),
    }
}

// -------------------- header index --------------------

struct HeaderIdx {
    idx_id: usize,
    idx_city_id: usize,
    idx_district_id: usize,
    idx_street_id: usize,
    idx_series_id: usize,
    idx_wall_id: usize,
    idx_metro_station_id: usize,
    idx_floor_num: usize,
    idx_floors_cnt: usize,
    idx_rooms_cnt: usize,
    idx_bedrooms_cnt: usize,
    idx_building_year: usize,
    idx_levels_count: usize,
    idx_area_total: usize,
    idx_area_live: usize,
    idx_area_kitchen: usize,
    idx_ceiling_height: usize,
    idx_bathrooms_cnt: usize,
    idx_sold_price: usize,
    idx_plate: usize,
    idx_territory: usize,
    idx_price: usize,
    idx_status: usize,
    idx_area_balcony: usize,
    idx_komunal_cost: usize,
    idx_closed_yard: usize,
    idx_flat_on_floor: usize,
    idx_loggia: usize,
    idx_builder_id: usize,
}

impl HeaderIdx {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        for name in columns::REQUIRED {
            if !headers.iter().any(|h| h == name) {
                return Err(anyhow!("missing required column: {name}"));
            }
        }
        let g = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("missing required column: {name}"))
        };
        Ok(Self {
            idx_id: g("id")?,
            idx_city_id: g("city_id")?,
            idx_district_id: g("district_id")?,
            idx_street_id: g("street_id")?,
            idx_series_id: g("series_id")?,
            idx_wall_id: g("wall_id")?,
            idx_metro_station_id: g("metro_station_id")?,
            idx_floor_num: g("floor_num")?,
            idx_floors_cnt: g("floors_cnt")?,
            idx_rooms_cnt: g("rooms_cnt")?,
            idx_bedrooms_cnt: g("bedrooms_cnt")?,
            idx_building_year: g("building_year")?,
            idx_levels_count: g("levels_count")?,
            idx_area_total: g("area_total")?,
            idx_area_live: g("area_live")?,
            idx_area_kitchen: g("area_kitchen")?,
            idx_ceiling_height: g("ceiling_height")?,
            idx_bathrooms_cnt: g("bathrooms_cnt")?,
            idx_sold_price: g("sold_price")?,
            idx_plate: g("plate")?,
            idx_territory: g("territory")?,
            idx_price: g("price")?,
            idx_status: g("status")?,
            idx_area_balcony: g("area_balcony")?,
            idx_komunal_cost: g("komunal_cost")?,
            idx_closed_yard: g("closed_yard")?,
            idx_flat_on_floor: g("flat_on_floor")?,
            idx_loggia: g("loggia")?,
            idx_builder_id: g("builder_id")?,
        })
    }
}

// -------------------- cell helpers --------------------

fn cell<'a>(rec: &'a StringRecord, idx: usize) -> Option<&'a str> {
    match rec.get(idx).map(str::trim) {
        Some(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn parse_f64(s: &str) -> Option<f64> {
    let t = s.trim().replace(',', ".");
    t.parse::<f64>().ok()
}

/// Integer parse that also accepts float renderings of whole numbers
/// ("3.0"), which show up wherever the source frame held nulls.
fn parse_i64(s: &str) -> Option<i64> {
    let t = s.trim();
    if let Ok(v) = t.parse::<i64>() {
        return Some(v);
    }
    match parse_f64(t) {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Some(f as i64)
        }
        _ => None,
    }
}
