use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One delivery order as entered on the prediction screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrderInput {
    pub order_date: NaiveDate,            // "2024-03-15"
    #[serde(with = "clock")]
    pub order_time: NaiveTime,            // "10:30" or "10:30:00"
    #[serde(with = "clock")]
    pub pickup_time: NaiveTime,           // same calendar day as the order
    pub distance_km: f64,
    pub agent_age: u32,
    pub agent_rating: f64,                // 0.0 ..= 5.0
    pub weather: String,
    pub traffic: String,
    pub vehicle: String,
    pub area: String,
    pub category: String,
}

/// Calendar parts pulled out of a combined date + time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalParts {
    pub day: u32,
    pub month: u32,
    pub hour: u32,
    pub minute: u32,
}

/// Encoded model input. Only the encoder builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(pub(crate) Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The slice of one named one-hot block ("weather", "traffic", ...).
    pub fn block(&self, name: &str) -> Option<&[f32]> {
        crate::schema::block_range(name).and_then(|r| self.0.get(r))
    }
}

/// Estimated delivery minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult(pub(crate) f64);

impl PredictionResult {
    pub fn minutes(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Estimated Delivery Time: {:.2} minutes", self.0)
    }
}

/// Time-of-day as `HH:MM`, with optional seconds on input.
pub(crate) mod clock {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .ok()
    }

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid time of day: {:?}", raw)))
    }
}
