//! Encoder: `RawOrderInput` to the model's ordered feature vector.
//!
//! Layout (see `schema`): nine numeric columns, then one-hot blocks for
//! weather, traffic, vehicle, area and category. Everything here is pure.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::error::EncodeError;
use crate::schema::{self, FEATURE_LEN};
use crate::types::{FeatureVector, RawOrderInput, TemporalParts};

/// Combine a date and a time-of-day and split the timestamp back into
/// day-of-month, month, hour and minute. No timezone is involved.
pub fn derive_temporal_parts(date: NaiveDate, time: NaiveTime) -> TemporalParts {
    let ts = date.and_time(time);
    TemporalParts {
        day: ts.day(),
        month: ts.month(),
        hour: ts.hour(),
        minute: ts.minute(),
    }
}

/// 1.0 at the position of `value` in `options`, 0.0 elsewhere.
///
/// `field` only labels the error when `value` is not one of `options`.
pub fn one_hot_encode(
    field: &'static str,
    value: &str,
    options: &[&str],
) -> Result<Vec<f32>, EncodeError> {
    if !options.contains(&value) {
        return Err(EncodeError::UnknownCategory {
            field,
            value: value.to_string(),
        });
    }
    Ok(options
        .iter()
        .map(|opt| if *opt == value { 1.0 } else { 0.0 })
        .collect())
}

fn check_ranges(raw: &RawOrderInput) -> Result<(), EncodeError> {
    if !raw.distance_km.is_finite() || raw.distance_km < 0.1 {
        return Err(EncodeError::InvalidInput {
            field: "distance_km",
            reason: format!("{} is below the 0.1 km minimum", raw.distance_km),
        });
    }
    if raw.agent_age < 18 {
        return Err(EncodeError::InvalidInput {
            field: "agent_age",
            reason: format!("{} is under 18", raw.agent_age),
        });
    }
    if !(0.0..=5.0).contains(&raw.agent_rating) {
        return Err(EncodeError::InvalidInput {
            field: "agent_rating",
            reason: format!("{} is outside 0-5", raw.agent_rating),
        });
    }
    Ok(())
}

/// Build the 37-wide feature vector. Column order must match training.
pub fn build_feature_vector(raw: &RawOrderInput) -> Result<FeatureVector, EncodeError> {
    check_ranges(raw)?;

    let order = derive_temporal_parts(raw.order_date, raw.order_time);
    // pickup is assumed to happen on the order's calendar day
    let pickup = derive_temporal_parts(raw.order_date, raw.pickup_time);

    let mut v = Vec::with_capacity(FEATURE_LEN);
    v.extend_from_slice(&[
        raw.agent_age as f32,
        raw.agent_rating as f32,
        raw.distance_km as f32,
        order.month as f32,
        order.day as f32,
        order.hour as f32,
        order.minute as f32,
        pickup.hour as f32,
        pickup.minute as f32,
    ]);

    let values = [
        &raw.weather,
        &raw.traffic,
        &raw.vehicle,
        &raw.area,
        &raw.category,
    ];
    for (block, value) in schema::ONE_HOT_BLOCKS.iter().zip(values) {
        v.extend(one_hot_encode(block.name, value, block.options)?);
    }

    debug_assert_eq!(v.len(), FEATURE_LEN);
    Ok(FeatureVector(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    fn sample() -> RawOrderInput {
        RawOrderInput {
            order_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            order_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            pickup_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            distance_km: 5.2,
            agent_age: 25,
            agent_rating: 4.5,
            weather: "Sunny".into(),
            traffic: "Low".into(),
            vehicle: "scooter".into(),
            area: "Urban".into(),
            category: "Books".into(),
        }
    }

    #[test]
    fn temporal_parts_of_order_and_pickup() {
        let raw = sample();
        let order = derive_temporal_parts(raw.order_date, raw.order_time);
        assert_eq!(order, TemporalParts { day: 15, month: 3, hour: 10, minute: 30 });

        let pickup = derive_temporal_parts(raw.order_date, raw.pickup_time);
        assert_eq!((pickup.hour, pickup.minute), (11, 0));

        // same inputs, same answer
        assert_eq!(order, derive_temporal_parts(raw.order_date, raw.order_time));
    }

    #[test]
    fn one_hot_positions() {
        assert_eq!(
            one_hot_encode("traffic", "Jam", &["Low", "Medium", "Jam"]).unwrap(),
            vec![0.0, 0.0, 1.0]
        );
        assert_eq!(
            one_hot_encode("vehicle", "scooter", &["scooter", "van"]).unwrap(),
            vec![1.0, 0.0]
        );
    }

    #[test]
    fn one_hot_is_case_sensitive_and_rejects_unknowns() {
        let err = one_hot_encode("vehicle", "Scooter", &VEHICLE_OPTIONS).unwrap_err();
        assert_eq!(
            err,
            EncodeError::UnknownCategory { field: "vehicle", value: "Scooter".into() }
        );
    }

    #[test]
    fn end_to_end_vector_prefix() {
        let fv = build_feature_vector(&sample()).unwrap();
        assert_eq!(fv.len(), 37);

        #[rustfmt::skip]
        let expected: [f32; 25] = [
            25.0, 4.5, 5.2, 3.0, 15.0, 10.0, 30.0, 11.0, 0.0,
            1.0, 0.0, 0.0, 0.0, 0.0,
            1.0, 0.0, 0.0,
            1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
        ];
        assert_eq!(&fv.as_slice()[..25], &expected[..]);
        assert!(fv.as_slice()[25..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn every_option_gives_exactly_one_hot_entry() {
        for block in &ONE_HOT_BLOCKS {
            for opt in block.options {
                let mut raw = sample();
                match block.name {
                    "weather" => raw.weather = opt.to_string(),
                    "traffic" => raw.traffic = opt.to_string(),
                    "vehicle" => raw.vehicle = opt.to_string(),
                    "area" => raw.area = opt.to_string(),
                    _ => raw.category = opt.to_string(),
                }
                let fv = build_feature_vector(&raw).unwrap();
                assert_eq!(fv.len(), FEATURE_LEN);
                for other in &ONE_HOT_BLOCKS {
                    let cells = fv.block(other.name).unwrap();
                    assert_eq!(cells.iter().filter(|x| **x == 1.0).count(), 1);
                    assert_eq!(cells.iter().filter(|x| **x == 0.0).count(), cells.len() - 1);
                }
                let hot = fv.block(block.name).unwrap().iter().position(|x| *x == 1.0);
                assert_eq!(hot, block.options.iter().position(|o| o == opt));
            }
        }
    }

    #[test]
    fn unknown_category_is_an_error_not_a_zero_block() {
        let mut raw = sample();
        raw.weather = "Stormy".into();
        assert!(matches!(
            build_feature_vector(&raw),
            Err(EncodeError::UnknownCategory { field: "weather", .. })
        ));
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        let mut raw = sample();
        raw.agent_age = 17;
        assert!(matches!(
            build_feature_vector(&raw),
            Err(EncodeError::InvalidInput { field: "agent_age", .. })
        ));

        let mut raw = sample();
        raw.agent_rating = 5.1;
        assert!(build_feature_vector(&raw).is_err());

        let mut raw = sample();
        raw.distance_km = f64::NAN;
        assert!(build_feature_vector(&raw).is_err());

        let mut raw = sample();
        raw.distance_km = 0.1;
        raw.agent_rating = 0.0;
        raw.agent_age = 18;
        assert!(build_feature_vector(&raw).is_ok());
    }

    #[test]
    fn pickup_after_midnight_stays_on_order_day() {
        let mut raw = sample();
        raw.order_time = NaiveTime::from_hms_opt(23, 50, 0).unwrap();
        raw.pickup_time = NaiveTime::from_hms_opt(0, 5, 0).unwrap();
        let fv = build_feature_vector(&raw).unwrap();
        assert_eq!(&fv.as_slice()[3..9], &[3.0, 15.0, 23.0, 50.0, 0.0, 5.0]);
    }
}
