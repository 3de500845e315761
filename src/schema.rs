//! Feature schema shared with the training pipeline.
//!
//! The model sees a bare `[f32; 37]` with no column names, so the order below
//! is the whole contract. Bump `SCHEMA_VERSION` whenever it changes and
//! retrain; `check_feature_list` refuses a model whose `meta.json` disagrees.

use crate::error::ModelLoadError;

pub const SCHEMA_VERSION: u32 = 1;

pub const WEATHER_OPTIONS: [&str; 5] = ["Sunny", "Sandstorms", "Cloudy", "Fog", "Windy"];
pub const TRAFFIC_OPTIONS: [&str; 3] = ["Low", "Medium", "Jam"];
pub const VEHICLE_OPTIONS: [&str; 2] = ["scooter", "van"];
pub const AREA_OPTIONS: [&str; 3] = ["Urban", "Other", "Semi-Urban"];
pub const CATEGORY_OPTIONS: [&str; 15] = [
    "Electronics",
    "Books",
    "Jewelry",
    "Toys",
    "Snacks",
    "Skincare",
    "Outdoors",
    "Sports",
    "Grocery",
    "Pet Supplies",
    "Home",
    "Cosmetics",
    "Kitchen",
    "Clothing",
    "Shoes",
];

/// Leading numeric columns, in model order.
pub const NUMERIC_FEATURES: [&str; 9] = [
    "Agent_Age",
    "Agent_Rating",
    "Distance_km",
    "Order_Month",
    "Order_Day",
    "Order_Hour",
    "Order_Minute",
    "Pickup_Hour",
    "Pickup_Minute",
];

/// A one-hot block: column prefix plus its options in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct OneHotBlock {
    pub name: &'static str,
    pub prefix: &'static str,
    pub options: &'static [&'static str],
}

pub const ONE_HOT_BLOCKS: [OneHotBlock; 5] = [
    OneHotBlock { name: "weather", prefix: "Weather", options: &WEATHER_OPTIONS },
    OneHotBlock { name: "traffic", prefix: "Traffic", options: &TRAFFIC_OPTIONS },
    OneHotBlock { name: "vehicle", prefix: "Vehicle", options: &VEHICLE_OPTIONS },
    OneHotBlock { name: "area", prefix: "Area", options: &AREA_OPTIONS },
    OneHotBlock { name: "category", prefix: "Category", options: &CATEGORY_OPTIONS },
];

pub const FEATURE_LEN: usize = NUMERIC_FEATURES.len()
    + WEATHER_OPTIONS.len()
    + TRAFFIC_OPTIONS.len()
    + VEHICLE_OPTIONS.len()
    + AREA_OPTIONS.len()
    + CATEGORY_OPTIONS.len();

/// Offset of a named one-hot block within the feature vector.
pub fn block_range(name: &str) -> Option<std::ops::Range<usize>> {
    let mut start = NUMERIC_FEATURES.len();
    for block in &ONE_HOT_BLOCKS {
        let end = start + block.options.len();
        if block.name == name {
            return Some(start..end);
        }
        start = end;
    }
    None
}

/// Column names in model order.
pub fn feature_names() -> Vec<String> {
    let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect();
    for block in &ONE_HOT_BLOCKS {
        names.extend(block.options.iter().map(|opt| format!("{}_{}", block.prefix, opt)));
    }
    names
}

/// Compare a model's declared feature list against this schema.
pub fn check_feature_list(
    feat_list: &[String],
    schema_version: Option<u32>,
) -> Result<(), ModelLoadError> {
    if let Some(v) = schema_version {
        if v != SCHEMA_VERSION {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "model trained against schema v{}, encoder is v{}",
                v, SCHEMA_VERSION
            )));
        }
    }

    let expected = feature_names();
    if let Some(i) = expected
        .iter()
        .zip(feat_list)
        .position(|(want, got)| want != got)
    {
        return Err(ModelLoadError::SchemaMismatch(format!(
            "column {} is {:?}, expected {:?}",
            i, feat_list[i], expected[i]
        )));
    }
    if feat_list.len() != expected.len() {
        return Err(ModelLoadError::SchemaMismatch(format!(
            "model declares {} columns, expected {}",
            feat_list.len(),
            expected.len()
        )));
    }
    Ok(())
}
