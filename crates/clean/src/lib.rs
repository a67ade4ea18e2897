//! The tabular cleaner.
//!
//! A fixed linear pipeline over the listing rows: prune unusable columns,
//! filter rows that violate the domain ranges, normalize the plate and
//! bathroom values, collapse the high-cardinality identifier columns to a
//! bounded vocabulary, expand the territory tags into binary columns, and
//! drop exact duplicates. Each stage is a pure function that consumes its
//! input and returns a new value; nothing is shared or aliased.
use metadata::RawListing;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

// -------------------- bounds & vocabularies --------------------

pub const SOLD_PRICE_RANGE: (f64, f64) = (500.0, 100_000.0);
pub const FLOOR_NUM_RANGE: (i64, i64) = (1, 30);
pub const FLOORS_CNT_RANGE: (i64, i64) = (1, 30);
pub const ROOMS_CNT_RANGE: (i64, i64) = (1, 6);
pub const BEDROOMS_CNT_RANGE: (i64, i64) = (0, 4);
pub const BUILDING_YEAR_RANGE: (i64, i64) = (1900, 2024);
pub const LEVELS_COUNT_RANGE: (i64, i64) = (1, 3);
pub const AREA_TOTAL_RANGE: (f64, f64) = (12.0, 150.0);
/// Valid when in range or exactly zero (zero marks "not recorded").
pub const AREA_LIVE_RANGE: (f64, f64) = (8.0, 90.0);
/// Valid when in range or exactly zero.
pub const AREA_KITCHEN_RANGE: (f64, f64) = (5.0, 30.0);
pub const BATHROOMS_CNT_RANGE: (f64, f64) = (0.0, 4.0);
/// Valid when in range or exactly zero.
pub const CEILING_HEIGHT_RANGE: (f64, f64) = (2.4, 5.0);
/// Listings are kept only at these metro values.
pub const METRO_STATION_VALUES: [i64; 2] = [0, -1];

pub const PLATE_CATEGORIES: [&str; 4] = ["electric", "no_plate", "gas", "convective"];
pub const PLATE_UNKNOWN: &str = "unknown";

/// How many of the most frequent identifier values survive collapsing.
pub const TOP_CATEGORIES: usize = 50;
pub const RARE_PREFIX: &str = "rare_";

// -------------------- row types per stage --------------------

/// The five identifier columns that get collapsed, generic over their
/// numeric (pre) and recoded (post) representations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ids<T> {
    pub city_id: T,
    pub district_id: T,
    pub street_id: T,
    pub series_id: T,
    pub wall_id: T,
}

/// Numeric columns that pass through the later stages untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measures {
    pub metro_station_id: i64,
    pub floor_num: i64,
    pub floors_cnt: i64,
    pub rooms_cnt: i64,
    pub bedrooms_cnt: i64,
    pub building_year: i64,
    pub levels_count: i64,
    pub area_total: f64,
    pub area_live: f64,
    pub area_kitchen: f64,
    pub ceiling_height: f64,
    pub sold_price: f64,
}

/// Post-prune row: only the retained columns, still optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrunedListing {
    pub id: Option<i64>,
    pub ids: Ids<Option<i64>>,
    pub metro_station_id: Option<i64>,
    pub floor_num: Option<i64>,
    pub floors_cnt: Option<i64>,
    pub rooms_cnt: Option<i64>,
    pub bedrooms_cnt: Option<i64>,
    pub building_year: Option<i64>,
    pub levels_count: Option<i64>,
    pub area_total: Option<f64>,
    pub area_live: Option<f64>,
    pub area_kitchen: Option<f64>,
    pub ceiling_height: Option<f64>,
    pub bathrooms_cnt: Option<f64>,
    pub sold_price: Option<f64>,
    pub plate: Option<String>,
    pub territory: Option<String>,
}

/// Row that passed every range filter. Numerics are concrete from here on;
/// only bathrooms may still be null (coerced in the next stage).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidListing {
    pub id: i64,
    pub ids: Ids<i64>,
    pub measures: Measures,
    pub bathrooms_cnt: Option<f64>,
    pub plate: Option<String>,
    pub territory: Option<String>,
}

/// Row with plate and bathrooms normalized to their final domains.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedListing {
    pub id: i64,
    pub ids: Ids<i64>,
    pub measures: Measures,
    pub bathrooms_cnt: f64,
    pub plate: String,
    pub territory: Option<String>,
}

/// Row with identifier columns recoded to the bounded vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedListing {
    pub id: i64,
    pub ids: Ids<String>,
    pub measures: Measures,
    pub bathrooms_cnt: f64,
    pub plate: String,
    pub territory: Option<String>,
}

/// Final cleaned row. `territory_flags` is aligned with the dataset's
/// `territory_tags` vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub id: i64,
    pub ids: Ids<String>,
    pub measures: Measures,
    pub bathrooms_cnt: f64,
    pub plate: String,
    pub territory_flags: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanDataset {
    pub records: Vec<CleanRecord>,
    /// Sorted distinct territory tags; one binary column per tag.
    pub territory_tags: Vec<String>,
}

impl CleanDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Output column order, territory indicators between the fixed
    /// features and the target.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = [
            "id",
            "city_id",
            "district_id",
            "street_id",
            "series_id",
            "wall_id",
            "metro_station_id",
            "floor_num",
            "floors_cnt",
            "rooms_cnt",
            "bedrooms_cnt",
            "building_year",
            "levels_count",
            "area_total",
            "area_live",
            "area_kitchen",
            "ceiling_height",
            "bathrooms_cnt",
            "plate",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        names.extend(self.territory_tags.iter().cloned());
        names.push("sold_price".to_string());
        names
    }
}

#[derive(Debug, Default, Clone)]
pub struct CleanStats {
    pub rows_in: u64,
    pub rows_filtered: u64,
    pub duplicates_dropped: u64,
    pub rows_out: u64,
    pub territory_tags: u64,
}

// -------------------- pipeline --------------------

/// Run the full cleaning pipeline over raw rows.
pub fn clean_dataset(rows: Vec<RawListing>) -> (CleanDataset, CleanStats) {
    let rows_in = rows.len() as u64;

    let pruned = prune_columns(rows);
    let valid = filter_outliers(pruned);
    let rows_filtered = rows_in - valid.len() as u64;
    debug!(rows_in, kept = valid.len(), "range filters applied");

    let normalized = normalize_values(valid);
    let collapsed = collapse_identifiers(normalized, TOP_CATEGORIES);
    let expanded = split_territory(collapsed);
    debug!(tags = expanded.territory_tags.len(), "territory expanded");

    let (dataset, duplicates_dropped) = drop_duplicates(expanded);
    let stats = CleanStats {
        rows_in,
        rows_filtered,
        duplicates_dropped,
        rows_out: dataset.records.len() as u64,
        territory_tags: dataset.territory_tags.len() as u64,
    };
    (dataset, stats)
}

/// Stage 1: drop the unusable columns by moving only the retained fields.
pub fn prune_columns(rows: Vec<RawListing>) -> Vec<PrunedListing> {
    rows.into_iter()
        .map(|r| PrunedListing {
            id: r.id,
            ids: Ids {
                city_id: r.city_id,
                district_id: r.district_id,
                street_id: r.street_id,
                series_id: r.series_id,
                wall_id: r.wall_id,
            },
            metro_station_id: r.metro_station_id,
            floor_num: r.floor_num,
            floors_cnt: r.floors_cnt,
            rooms_cnt: r.rooms_cnt,
            bedrooms_cnt: r.bedrooms_cnt,
            building_year: r.building_year,
            levels_count: r.levels_count,
            area_total: r.area_total,
            area_live: r.area_live,
            area_kitchen: r.area_kitchen,
            ceiling_height: r.ceiling_height,
            bathrooms_cnt: r.bathrooms_cnt,
            sold_price: r.sold_price,
            plate: r.plate,
            territory: r.territory,
        })
        .collect()
}

/// Stage 2: retain a row only if every range predicate holds. A null in
/// any range-checked field fails that check, except `bathrooms_cnt` which
/// may still be null here.
pub fn filter_outliers(rows: Vec<PrunedListing>) -> Vec<ValidListing> {
    rows.into_iter().filter_map(ValidListing::from_pruned).collect()
}

impl ValidListing {
    fn from_pruned(row: PrunedListing) -> Option<Self> {
        let id = positive(row.id)?;
        let ids = Ids {
            city_id: positive(row.ids.city_id)?,
            district_id: positive(row.ids.district_id)?,
            street_id: positive(row.ids.street_id)?,
            series_id: positive(row.ids.series_id)?,
            wall_id: positive(row.ids.wall_id)?,
        };
        let bathrooms_cnt = match row.bathrooms_cnt {
            None => None,
            Some(v) if (BATHROOMS_CNT_RANGE.0..=BATHROOMS_CNT_RANGE.1).contains(&v) => Some(v),
            Some(_) => return None,
        };
        let measures = Measures {
            metro_station_id: row
                .metro_station_id
                .filter(|v| METRO_STATION_VALUES.contains(v))?,
            floor_num: in_i(row.floor_num, FLOOR_NUM_RANGE)?,
            floors_cnt: in_i(row.floors_cnt, FLOORS_CNT_RANGE)?,
            rooms_cnt: in_i(row.rooms_cnt, ROOMS_CNT_RANGE)?,
            bedrooms_cnt: in_i(row.bedrooms_cnt, BEDROOMS_CNT_RANGE)?,
            building_year: in_i(row.building_year, BUILDING_YEAR_RANGE)?,
            levels_count: in_i(row.levels_count, LEVELS_COUNT_RANGE)?,
            area_total: in_f(row.area_total, AREA_TOTAL_RANGE)?,
            area_live: in_f_or_zero(row.area_live, AREA_LIVE_RANGE)?,
            area_kitchen: in_f_or_zero(row.area_kitchen, AREA_KITCHEN_RANGE)?,
            ceiling_height: in_f_or_zero(row.ceiling_height, CEILING_HEIGHT_RANGE)?,
            sold_price: in_f(row.sold_price, SOLD_PRICE_RANGE)?,
        };
        Some(Self {
            id,
            ids,
            measures,
            bathrooms_cnt,
            plate: row.plate,
            territory: row.territory,
        })
    }
}

fn positive(v: Option<i64>) -> Option<i64> {
    v.filter(|x| *x > 0)
}

fn in_i(v: Option<i64>, range: (i64, i64)) -> Option<i64> {
    v.filter(|x| (range.0..=range.1).contains(x))
}

fn in_f(v: Option<f64>, range: (f64, f64)) -> Option<f64> {
    v.filter(|x| (range.0..=range.1).contains(x))
}

fn in_f_or_zero(v: Option<f64>, range: (f64, f64)) -> Option<f64> {
    v.filter(|x| *x == 0.0 || (range.0..=range.1).contains(x))
}

/// Stages 3 and 4, applied per cell.
pub fn normalize_values(rows: Vec<ValidListing>) -> Vec<NormalizedListing> {
    rows.into_iter()
        .map(|r| NormalizedListing {
            id: r.id,
            ids: r.ids,
            measures: r.measures,
            bathrooms_cnt: coerce_bathrooms(r.bathrooms_cnt),
            plate: normalize_plate(r.plate.as_deref()),
            territory: r.territory,
        })
        .collect()
}

/// Whitelist mapping for the plate column. Anything outside the fixed
/// categories, including an absent value, becomes "unknown".
pub fn normalize_plate(value: Option<&str>) -> String {
    match value {
        Some(v) if PLATE_CATEGORIES.contains(&v) => v.to_string(),
        _ => PLATE_UNKNOWN.to_string(),
    }
}

/// Bathroom count coercion: keep v only when strictly between 1 and 4,
/// everything else (boundary values, nulls) becomes 1.
pub fn coerce_bathrooms(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v > 1.0 && v < 4.0 => v,
        _ => 1.0,
    }
}

/// Stage 5: recode each identifier column independently.
pub fn collapse_identifiers(rows: Vec<NormalizedListing>, top_n: usize) -> Vec<CollapsedListing> {
    let city: Vec<String> = rows.iter().map(|r| r.ids.city_id.to_string()).collect();
    let district: Vec<String> = rows.iter().map(|r| r.ids.district_id.to_string()).collect();
    let street: Vec<String> = rows.iter().map(|r| r.ids.street_id.to_string()).collect();
    let series: Vec<String> = rows.iter().map(|r| r.ids.series_id.to_string()).collect();
    let wall: Vec<String> = rows.iter().map(|r| r.ids.wall_id.to_string()).collect();

    let [city_col, district_col, street_col, series_col, wall_col] =
        metadata::columns::COLLAPSED_IDS;
    let city = collapse_column(&city, city_col, top_n);
    let district = collapse_column(&district, district_col, top_n);
    let street = collapse_column(&street, street_col, top_n);
    let series = collapse_column(&series, series_col, top_n);
    let wall = collapse_column(&wall, wall_col, top_n);

    let mut out = Vec::with_capacity(rows.len());
    let zipped = rows
        .into_iter()
        .zip(city)
        .zip(district)
        .zip(street)
        .zip(series)
        .zip(wall);
    for (((((r, city_id), district_id), street_id), series_id), wall_id) in zipped {
        out.push(CollapsedListing {
            id: r.id,
            ids: Ids {
                city_id,
                district_id,
                street_id,
                series_id,
                wall_id,
            },
            measures: r.measures,
            bathrooms_cnt: r.bathrooms_cnt,
            plate: r.plate,
            territory: r.territory,
        });
    }
    out
}

/// Keep the `top_n` most frequent values of a column unchanged, recode
/// everything else to `rare_<column_name>`.
///
/// Ranking is deterministic: values are counted in first-encountered
/// order and ranked with a stable sort, so equally-frequent values at the
/// cut keep their first-encountered order.
pub fn collapse_column(values: &[String], column_name: &str, top_n: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for v in values {
        match counts.entry(v.as_str()) {
            Entry::Occupied(mut e) => *e.get_mut() += 1,
            Entry::Vacant(e) => {
                e.insert(1);
                order.push(v.as_str());
            }
        }
    }

    let mut ranked = order;
    ranked.sort_by(|a, b| counts[b].cmp(&counts[a]));
    let kept: HashSet<&str> = ranked.into_iter().take(top_n).collect();

    let rare = format!("{RARE_PREFIX}{column_name}");
    values
        .iter()
        .map(|v| {
            if kept.contains(v.as_str()) {
                v.clone()
            } else {
                rare.clone()
            }
        })
        .collect()
}

/// Stage 6: expand the comma-separated territory tags into one binary
/// column per distinct tag and drop the original column. Rows with no
/// territory contribute no tokens.
pub fn split_territory(rows: Vec<CollapsedListing>) -> CleanDataset {
    let mut tags: BTreeSet<String> = BTreeSet::new();
    for r in &rows {
        for tok in territory_tokens(r.territory.as_deref()) {
            tags.insert(tok.to_string());
        }
    }
    let territory_tags: Vec<String> = tags.into_iter().collect();

    let records = rows
        .into_iter()
        .map(|r| {
            let toks: HashSet<&str> = territory_tokens(r.territory.as_deref()).collect();
            let territory_flags = territory_tags
                .iter()
                .map(|t| u8::from(toks.contains(t.as_str())))
                .collect();
            CleanRecord {
                id: r.id,
                ids: r.ids,
                measures: r.measures,
                bathrooms_cnt: r.bathrooms_cnt,
                plate: r.plate,
                territory_flags,
            }
        })
        .collect();

    CleanDataset {
        records,
        territory_tags,
    }
}

fn territory_tokens(value: Option<&str>) -> impl Iterator<Item = &str> {
    value.unwrap_or("").split(',').filter(|t| !t.is_empty())
}

/// Stage 7: remove rows identical across every column, keeping the first
/// occurrence. Returns the number dropped.
pub fn drop_duplicates(ds: CleanDataset) -> (CleanDataset, u64) {
    let mut seen: HashSet<[u8; 32]> = HashSet::new();
    let mut records = Vec::with_capacity(ds.records.len());
    let mut dropped = 0u64;
    for r in ds.records {
        if seen.insert(record_key(&r)) {
            records.push(r);
        } else {
            dropped += 1;
        }
    }
    (
        CleanDataset {
            records,
            territory_tags: ds.territory_tags,
        },
        dropped,
    )
}

/// Exact-equality key over every column value. Floats hash by bit
/// pattern, so only bit-identical cells collide.
fn record_key(r: &CleanRecord) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&r.id.to_le_bytes());
    hasher.update(b"|");
    hasher.update(r.ids.city_id.as_bytes());
    hasher.update(b"|");
    hasher.update(r.ids.district_id.as_bytes());
    hasher.update(b"|");
    hasher.update(r.ids.street_id.as_bytes());
    hasher.update(b"|");
    hasher.update(r.ids.series_id.as_bytes());
    hasher.update(b"|");
    hasher.update(r.ids.wall_id.as_bytes());
    hasher.update(b"|");
    let m = &r.measures;
    for v in [
        m.metro_station_id,
        m.floor_num,
        m.floors_cnt,
        m.rooms_cnt,
        m.bedrooms_cnt,
        m.building_year,
        m.levels_count,
    ] {
        hasher.update(&v.to_le_bytes());
        hasher.update(b"|");
    }
    for v in [
        m.area_total,
        m.area_live,
        m.area_kitchen,
        m.ceiling_height,
        m.sold_price,
        r.bathrooms_cnt,
    ] {
        hasher.update(&v.to_bits().to_le_bytes());
        hasher.update(b"|");
    }
    hasher.update(r.plate.as_bytes());
    hasher.update(b"|");
    hasher.update(&r.territory_flags);
    *hasher.finalize().as_bytes()
}

// -------------------- auxiliary --------------------

/// Midpoint parser for the "A-B" communal-cost band column. The default
/// pipeline prunes that column; this stays for the day the stage is
/// reinstated.
///
/// A plain number parses to itself; an "A-B" band parses to (A+B)/2;
/// anything else is 0. (Numeric inputs are already numbers in this typed
/// port, so the source's pass-through branch for them collapses away.)
pub fn split_komunal_cost(raw: &str) -> f64 {
    if let Some(v) = parse_num(raw) {
        return v;
    }
    if let Some((a, b)) = raw.split_once('-') {
        if let (Some(a), Some(b)) = (parse_num(a), parse_num(b)) {
            return (a + b) / 2.0;
        }
    }
    0.0
}

fn parse_num(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

// -------------------- tests --------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plate_whitelist() {
        assert_eq!(normalize_plate(Some("gas")), "gas");
        assert_eq!(normalize_plate(Some("electric")), "electric");
        assert_eq!(normalize_plate(Some("oil")), "unknown");
        assert_eq!(normalize_plate(Some("")), "unknown");
        assert_eq!(normalize_plate(None), "unknown");
    }

    #[test]
    fn bathroom_coercion() {
        assert_eq!(coerce_bathrooms(Some(2.0)), 2.0);
        assert_eq!(coerce_bathrooms(Some(3.5)), 3.5);
        // boundaries are exclusive
        assert_eq!(coerce_bathrooms(Some(1.0)), 1.0);
        assert_eq!(coerce_bathrooms(Some(4.0)), 1.0);
        assert_eq!(coerce_bathrooms(Some(7.0)), 1.0);
        assert_eq!(coerce_bathrooms(Some(0.0)), 1.0);
        assert_eq!(coerce_bathrooms(None), 1.0);
    }

    #[test]
    fn collapse_keeps_top_values_and_recodes_rest() {
        let values: Vec<String> = ["a", "a", "a", "b", "b", "c"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let out = collapse_column(&values, "city_id", 2);
        assert_eq!(out, vec!["a", "a", "a", "b", "b", "rare_city_id"]);
    }

    #[test]
    fn collapse_breaks_ties_by_first_encounter() {
        // "x" and "y" both appear twice; "x" seen first wins the last slot.
        let values: Vec<String> = ["a", "a", "a", "x", "y", "x", "y"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let out = collapse_column(&values, "wall_id", 2);
        assert_eq!(out, vec!["a", "a", "a", "x", "rare_wall_id", "x", "rare_wall_id"]);
    }

    #[test]
    fn collapse_with_large_top_n_is_identity() {
        let values: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(collapse_column(&values, "series_id", 50), values);
    }

    #[test]
    fn territory_expansion_flags() {
        let rows = vec![
            collapsed_row(1, Some("garden,pool")),
            collapsed_row(2, Some("garden")),
            collapsed_row(3, None),
        ];
        let ds = split_territory(rows);
        assert_eq!(ds.territory_tags, vec!["garden", "pool"]);
        assert_eq!(ds.records[0].territory_flags, vec![1, 1]);
        assert_eq!(ds.records[1].territory_flags, vec![1, 0]);
        assert_eq!(ds.records[2].territory_flags, vec![0, 0]);
    }

    #[test]
    fn territory_empty_tokens_ignored() {
        let rows = vec![collapsed_row(1, Some("a,,b,"))];
        let ds = split_territory(rows);
        assert_eq!(ds.territory_tags, vec!["a", "b"]);
        assert_eq!(ds.records[0].territory_flags, vec![1, 1]);
    }

    #[test]
    fn duplicates_keep_first() {
        let rows = vec![
            collapsed_row(1, Some("a")),
            collapsed_row(1, Some("a")),
            collapsed_row(2, Some("a")),
        ];
        let ds = split_territory(rows);
        let (ds, dropped) = drop_duplicates(ds);
        assert_eq!(dropped, 1);
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.records[0].id, 1);
        assert_eq!(ds.records[1].id, 2);
    }

    #[test]
    fn dedup_is_idempotent() {
        let rows = vec![collapsed_row(1, None), collapsed_row(1, None)];
        let (ds, dropped) = drop_duplicates(split_territory(rows));
        assert_eq!(dropped, 1);
        let (ds2, dropped2) = drop_duplicates(ds.clone());
        assert_eq!(dropped2, 0);
        assert_eq!(ds2, ds);
    }

    #[test]
    fn komunal_cost_fallbacks() {
        assert_eq!(split_komunal_cost("100-200"), 150.0);
        assert_eq!(split_komunal_cost("1500"), 1500.0);
        assert_eq!(split_komunal_cost("1500.5"), 1500.5);
        assert_eq!(split_komunal_cost("-5"), -5.0);
        assert_eq!(split_komunal_cost("abc"), 0.0);
        assert_eq!(split_komunal_cost("a-b"), 0.0);
        assert_eq!(split_komunal_cost(""), 0.0);
    }

    fn collapsed_row(id: i64, territory: Option<&str>) -> CollapsedListing {
        CollapsedListing {
            id,
            ids: Ids {
                city_id: "5".to_string(),
                district_id: "7".to_string(),
                street_id: "9".to_string(),
                series_id: "11".to_string(),
                wall_id: "13".to_string(),
            },
            measures: Measures {
                metro_station_id: 0,
                floor_num: 3,
                floors_cnt: 9,
                rooms_cnt: 2,
                bedrooms_cnt: 1,
                building_year: 2005,
                levels_count: 1,
                area_total: 45.0,
                area_live: 30.0,
                area_kitchen: 8.0,
                ceiling_height: 2.7,
                sold_price: 3200.0,
            },
            bathrooms_cnt: 2.0,
            plate: "gas".to_string(),
            territory: territory.map(str::to_string),
        }
    }
}
