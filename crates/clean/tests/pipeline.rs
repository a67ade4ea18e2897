//! End-to-end cleaning pipeline over constructed listing rows.
//!
//! Checks every output invariant: range membership, plate whitelist,
//! bathroom coercion, collapsed-identifier vocabulary, territory
//! expansion, and exact de-duplication.

use clean::{
    clean_dataset, collapse_identifiers, filter_outliers, normalize_values, prune_columns,
    AREA_KITCHEN_RANGE, AREA_LIVE_RANGE, AREA_TOTAL_RANGE, BUILDING_YEAR_RANGE,
    CEILING_HEIGHT_RANGE, METRO_STATION_VALUES, PLATE_CATEGORIES, PLATE_UNKNOWN,
    SOLD_PRICE_RANGE, TOP_CATEGORIES,
};
use metadata::RawListing;

/// A row that satisfies every filter.
fn base_row() -> RawListing {
    RawListing {
        id: Some(1),
        city_id: Some(5),
        district_id: Some(7),
        street_id: Some(9),
        series_id: Some(11),
        wall_id: Some(13),
        metro_station_id: Some(0),
        floor_num: Some(3),
        floors_cnt: Some(9),
        rooms_cnt: Some(2),
        bedrooms_cnt: Some(1),
        building_year: Some(2005),
        levels_count: Some(1),
        area_total: Some(45.0),
        area_live: Some(30.0),
        area_kitchen: Some(8.0),
        ceiling_height: Some(2.7),
        bathrooms_cnt: Some(2.0),
        sold_price: Some(3200.0),
        plate: Some("gas".to_string()),
        territory: None,
        price: Some(3300.0),
        status: Some("sold".to_string()),
        area_balcony: None,
        komunal_cost: Some("100-200".to_string()),
        closed_yard: None,
        flat_on_floor: Some(4),
        loggia: None,
        builder_id: Some(77),
    }
}

// ---------------------------------------------------------------------------
// Row filtering
// ---------------------------------------------------------------------------

#[test]
fn low_sold_price_row_is_filtered_out() {
    let mut cheap = base_row();
    cheap.sold_price = Some(50.0);
    cheap.id = Some(2);
    let (ds, stats) = clean_dataset(vec![base_row(), cheap]);
    assert_eq!(ds.len(), 1);
    assert_eq!(stats.rows_in, 2);
    assert_eq!(stats.rows_filtered, 1);
    assert_eq!(ds.records[0].id, 1);
}

#[test]
fn each_range_violation_drops_the_row() {
    let violations: Vec<Box<dyn Fn(&mut RawListing)>> = vec![
        Box::new(|r| r.id = Some(0)),
        Box::new(|r| r.city_id = Some(-3)),
        Box::new(|r| r.district_id = None),
        Box::new(|r| r.street_id = Some(0)),
        Box::new(|r| r.series_id = Some(0)),
        Box::new(|r| r.wall_id = Some(0)),
        Box::new(|r| r.metro_station_id = Some(12)),
        Box::new(|r| r.sold_price = Some(SOLD_PRICE_RANGE.1 + 1.0)),
        Box::new(|r| r.floor_num = Some(0)),
        Box::new(|r| r.floors_cnt = Some(31)),
        Box::new(|r| r.rooms_cnt = Some(7)),
        Box::new(|r| r.bedrooms_cnt = Some(5)),
        Box::new(|r| r.building_year = Some(BUILDING_YEAR_RANGE.0 - 1)),
        Box::new(|r| r.building_year = Some(BUILDING_YEAR_RANGE.1 + 1)),
        Box::new(|r| r.levels_count = Some(4)),
        Box::new(|r| r.area_total = Some(AREA_TOTAL_RANGE.1 + 0.5)),
        Box::new(|r| r.area_live = Some(AREA_LIVE_RANGE.0 - 1.0)),
        Box::new(|r| r.area_kitchen = Some(AREA_KITCHEN_RANGE.1 + 1.0)),
        Box::new(|r| r.ceiling_height = Some(2.0)),
        Box::new(|r| r.bathrooms_cnt = Some(5.0)),
        Box::new(|r| r.sold_price = None),
        Box::new(|r| r.area_total = None),
    ];
    for (i, violate) in violations.iter().enumerate() {
        let mut row = base_row();
        violate(&mut row);
        let (ds, _) = clean_dataset(vec![row]);
        assert!(ds.is_empty(), "violation #{i} should drop the row");
    }
}

#[test]
fn zero_sentinels_pass_the_or_zero_filters() {
    let mut row = base_row();
    row.area_live = Some(0.0);
    row.area_kitchen = Some(0.0);
    row.ceiling_height = Some(0.0);
    let (ds, _) = clean_dataset(vec![row]);
    assert_eq!(ds.len(), 1);
}

#[test]
fn null_bathrooms_survive_filtering_and_coerce_to_one() {
    let mut row = base_row();
    row.bathrooms_cnt = None;
    let (ds, _) = clean_dataset(vec![row]);
    assert_eq!(ds.len(), 1);
    assert_eq!(ds.records[0].bathrooms_cnt, 1.0);
}

#[test]
fn filtering_already_valid_rows_is_identity() {
    let pruned = prune_columns(vec![base_row(), base_row()]);
    let valid = filter_outliers(pruned.clone());
    assert_eq!(valid.len(), pruned.len());
}

// ---------------------------------------------------------------------------
// Value normalization
// ---------------------------------------------------------------------------

#[test]
fn plate_and_bathroom_examples() {
    let mut oil = base_row();
    oil.id = Some(2);
    oil.plate = Some("oil".to_string());
    // 4 passes the range filter but not the strict coercion window
    oil.bathrooms_cnt = Some(4.0);

    let (ds, _) = clean_dataset(vec![base_row(), oil]);
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.records[0].plate, "gas");
    assert_eq!(ds.records[0].bathrooms_cnt, 2.0);
    assert_eq!(ds.records[1].plate, PLATE_UNKNOWN);
    assert_eq!(ds.records[1].bathrooms_cnt, 1.0);
}

#[test]
fn normalization_is_idempotent_on_its_own_output() {
    let valid = filter_outliers(prune_columns(vec![base_row()]));
    let once = normalize_values(valid);
    for r in &once {
        assert_eq!(clean::normalize_plate(Some(r.plate.as_str())), r.plate);
        assert_eq!(clean::coerce_bathrooms(Some(r.bathrooms_cnt)), r.bathrooms_cnt);
    }
}

// ---------------------------------------------------------------------------
// Identifier collapsing
// ---------------------------------------------------------------------------

#[test]
fn rare_identifier_values_collapse_to_sentinel() {
    // 60 distinct city ids, each once, except city 1 which dominates.
    let mut rows = Vec::new();
    for i in 0..60 {
        let mut r = base_row();
        r.id = Some(1000 + i);
        r.city_id = Some(100 + i);
        rows.push(r);
    }
    for i in 0..10 {
        let mut r = base_row();
        r.id = Some(2000 + i);
        r.city_id = Some(1);
        rows.push(r);
    }
    let (ds, _) = clean_dataset(rows);

    // city 1 is the most frequent and must survive unchanged
    assert!(ds.records.iter().any(|r| r.ids.city_id == "1"));
    // singletons ranked below the cut collapse to the sentinel
    let rare = ds
        .records
        .iter()
        .filter(|r| r.ids.city_id == "rare_city_id")
        .count();
    assert_eq!(rare, 60 - (TOP_CATEGORIES - 1));
    // vocabulary is bounded: top-50 values plus the sentinel
    let distinct: std::collections::HashSet<&str> = ds
        .records
        .iter()
        .map(|r| r.ids.city_id.as_str())
        .collect();
    assert!(distinct.len() <= TOP_CATEGORIES + 1);
}

#[test]
fn collapsing_stringifies_every_identifier_column() {
    let valid = filter_outliers(prune_columns(vec![base_row()]));
    let collapsed = collapse_identifiers(normalize_values(valid), TOP_CATEGORIES);
    let ids = &collapsed[0].ids;
    assert_eq!(ids.city_id, "5");
    assert_eq!(ids.district_id, "7");
    assert_eq!(ids.street_id, "9");
    assert_eq!(ids.series_id, "11");
    assert_eq!(ids.wall_id, "13");
}

// ---------------------------------------------------------------------------
// Territory expansion and de-duplication
// ---------------------------------------------------------------------------

#[test]
fn territory_expansion_example() {
    let mut a = base_row();
    a.territory = Some("garden,pool".to_string());
    let mut b = base_row();
    b.id = Some(2);
    b.territory = Some("garden".to_string());

    let (ds, stats) = clean_dataset(vec![a, b]);
    assert_eq!(ds.territory_tags, vec!["garden", "pool"]);
    assert_eq!(stats.territory_tags, 2);
    assert_eq!(ds.records[0].territory_flags, vec![1, 1]);
    assert_eq!(ds.records[1].territory_flags, vec![1, 0]);

    // flag sum equals the row's distinct token count
    let sums: Vec<u8> = ds
        .records
        .iter()
        .map(|r| r.territory_flags.iter().sum())
        .collect();
    assert_eq!(sums, vec![2, 1]);
}

#[test]
fn exact_duplicates_are_dropped_keeping_first() {
    let (ds, stats) = clean_dataset(vec![base_row(), base_row(), base_row()]);
    assert_eq!(ds.len(), 1);
    assert_eq!(stats.duplicates_dropped, 2);
}

#[test]
fn rows_differing_only_in_territory_are_kept() {
    let mut b = base_row();
    b.territory = Some("park".to_string());
    let (ds, stats) = clean_dataset(vec![base_row(), b]);
    assert_eq!(ds.len(), 2);
    assert_eq!(stats.duplicates_dropped, 0);
}

// ---------------------------------------------------------------------------
// Output invariants
// ---------------------------------------------------------------------------

#[test]
fn output_invariants_hold_on_a_mixed_batch() {
    let mut rows = Vec::new();
    for i in 0..40 {
        let mut r = base_row();
        r.id = Some(i + 1);
        r.city_id = Some(1 + i % 3);
        r.sold_price = Some(900.0 + i as f64 * 100.0);
        r.plate = Some(
            ["gas", "electric", "oil", "no_plate", "convective"][(i % 5) as usize].to_string(),
        );
        r.territory = if i % 2 == 0 {
            Some("park,school".to_string())
        } else {
            None
        };
        rows.push(r);
    }
    // and a few rows that must vanish
    let mut bad = base_row();
    bad.sold_price = Some(50.0);
    rows.push(bad);
    let mut bad = base_row();
    bad.metro_station_id = Some(3);
    rows.push(bad);

    let (ds, stats) = clean_dataset(rows);
    assert_eq!(stats.rows_filtered, 2);
    assert_eq!(ds.len(), 40);

    for r in &ds.records {
        let m = &r.measures;
        assert!(r.id > 0);
        assert!(METRO_STATION_VALUES.contains(&m.metro_station_id));
        assert!((SOLD_PRICE_RANGE.0..=SOLD_PRICE_RANGE.1).contains(&m.sold_price));
        assert!((1..=30).contains(&m.floor_num));
        assert!((1..=30).contains(&m.floors_cnt));
        assert!((1..=6).contains(&m.rooms_cnt));
        assert!((0..=4).contains(&m.bedrooms_cnt));
        assert!((BUILDING_YEAR_RANGE.0..=BUILDING_YEAR_RANGE.1).contains(&m.building_year));
        assert!((1..=3).contains(&m.levels_count));
        assert!((AREA_TOTAL_RANGE.0..=AREA_TOTAL_RANGE.1).contains(&m.area_total));
        assert!(
            m.area_live == 0.0 || (AREA_LIVE_RANGE.0..=AREA_LIVE_RANGE.1).contains(&m.area_live)
        );
        assert!(
            m.ceiling_height == 0.0
                || (CEILING_HEIGHT_RANGE.0..=CEILING_HEIGHT_RANGE.1).contains(&m.ceiling_height)
        );
        assert!(
            PLATE_CATEGORIES.contains(&r.plate.as_str()) || r.plate == PLATE_UNKNOWN,
            "unexpected plate {}",
            r.plate
        );
        assert!(r.bathrooms_cnt == 1.0 || (r.bathrooms_cnt > 1.0 && r.bathrooms_cnt < 4.0));
        assert_eq!(r.territory_flags.len(), ds.territory_tags.len());
    }

    // column_names covers fixed features, tags, and the target
    let names = ds.column_names();
    assert_eq!(names.len(), 19 + ds.territory_tags.len() + 1);
    assert_eq!(names.last().map(String::as_str), Some("sold_price"));
}
