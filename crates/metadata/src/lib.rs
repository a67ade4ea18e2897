//! Shared dataset schema: the raw record type and the column tables the
//! other stage crates agree on.

pub mod columns {
    /// Every column the input CSV must carry in its header row.
    pub const REQUIRED: [&str; 29] = [
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
        "sold_price",
        "plate",
        "territory",
        "price",
        "status",
        "area_balcony",
        "komunal_cost",
        "closed_yard",
        "flat_on_floor",
        "loggia",
        "builder_id",
    ];

    /// Columns removed outright by the cleaner: redundant with the target,
    /// leaky, or too unreliable to keep.
    pub const PRUNED: [&str; 8] = [
        "price",
        "status",
        "area_balcony",
        "komunal_cost",
        "closed_yard",
        "flat_on_floor",
        "loggia",
        "builder_id",
    ];

    /// High-cardinality identifier columns collapsed to a bounded
    /// vocabulary.
    pub const COLLAPSED_IDS: [&str; 5] = [
        "city_id",
        "district_id",
        "street_id",
        "series_id",
        "wall_id",
    ];
}

/// One row of the input CSV, as parsed. Absent or unparseable cells are
/// `None`; nothing errors at this stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub id: Option<i64>,
    pub city_id: Option<i64>,
    pub district_id: Option<i64>,
    pub street_id: Option<i64>,
    pub series_id: Option<i64>,
    pub wall_id: Option<i64>,
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
    // Columns the cleaner prunes; carried so the prune step is explicit.
    pub price: Option<f64>,
    pub status: Option<String>,
    pub area_balcony: Option<String>,
    pub komunal_cost: Option<String>,
    pub closed_yard: Option<String>,
    pub flat_on_floor: Option<i64>,
    pub loggia: Option<String>,
    pub builder_id: Option<i64>,
}
