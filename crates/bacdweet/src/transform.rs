use crate::{DisplayValue, Point};
use bacdweet_core::value::Value;

/// Turns a decoded value into what the document carries for `point`.
///
/// A value reading `"active"` or `"inactive"` (a binary state name or a
/// character string) is replaced by the point's matching label when it has
/// one. Floating point values are rounded half away from zero when the point
/// sets a precision. Everything else passes through [`display`].
pub fn transform(point: &Point, value: Value) -> DisplayValue {
    if let Some(label) = state_label(point, &value) {
        return label.clone();
    }
    match (value, point.precision) {
        (Value::Real(v), Some(places)) => DisplayValue::Float(round_to(shortest(v), places)),
        (Value::Double(v), Some(places)) => DisplayValue::Float(round_to(v, places)),
        (value, _) => display(value),
    }
}

/// Whether [`transform`] rounds `value` for `point`.
pub fn rounds(point: &Point, value: &Value) -> bool {
    point.precision.is_some() && matches!(value, Value::Real(_) | Value::Double(_))
}

fn state_label<'a>(point: &'a Point, value: &Value) -> Option<&'a DisplayValue> {
    let text = match value {
        Value::Enumerated {
            name: Some(name), ..
        } => *name,
        Value::CharacterString(s) => s.as_str(),
        _ => return None,
    };
    match text {
        "active" => point.active_label.as_ref(),
        "inactive" => point.inactive_label.as_ref(),
        _ => None,
    }
}

/// JSON scalar form of a decoded value. Values with no scalar form use their
/// flat text rendering.
pub fn display(value: Value) -> DisplayValue {
    match value {
        Value::Boolean(v) => DisplayValue::Boolean(v),
        Value::Unsigned(v) => DisplayValue::Unsigned(v.into()),
        Value::Signed(v) => DisplayValue::Signed(v.into()),
        Value::Real(v) => DisplayValue::Float(shortest(v)),
        Value::Double(v) => DisplayValue::Float(v),
        Value::Enumerated { value, name: None } => DisplayValue::Unsigned(value.into()),
        Value::CharacterString(s) => DisplayValue::Text(s),
        other => DisplayValue::Text(other.to_string()),
    }
}

// 21.96f32 widens to 21.959999084472656; keep the digits the device meant.
fn shortest(v: f32) -> f64 {
    v.to_string().parse().unwrap_or(f64::from(v))
}

/// Rounds to `places` decimals, halves away from zero.
pub fn round_to(v: f64, places: u8) -> f64 {
    let scale = 10f64.powi(i32::from(places));
    let scaled = v * scale;
    if !scaled.is_finite() {
        return v;
    }
    scaled.round() / scale
}

#[cfg(test)]
mod tests {
    use super::{round_to, rounds, transform};
    use crate::testing::point;
    use crate::DisplayValue;
    use bacdweet_core::types::{ObjectId, ObjectType};
    use bacdweet_core::value::Value;
    use proptest::prelude::*;

    fn active(value: u32) -> Value {
        Value::Enumerated {
            value,
            name: Some(if value == 1 { "active" } else { "inactive" }),
        }
    }

    #[test]
    fn rounds_to_precision() {
        let mut p = point("pi");
        p.precision = Some(2);
        assert_eq!(transform(&p, Value::Double(3.14159)), DisplayValue::Float(3.14));
    }

    #[test]
    fn lobby_example() {
        let mut temp = point("temp");
        temp.precision = Some(1);
        let mut occupied = point("occupied");
        occupied.active_label = Some("yes".into());

        assert_eq!(transform(&temp, Value::Real(21.96)), DisplayValue::Float(22.0));
        assert_eq!(transform(&occupied, active(1)), DisplayValue::from("yes"));
    }

    #[test]
    fn real_keeps_its_shortest_digits() {
        assert_eq!(
            transform(&point("t"), Value::Real(21.96)),
            DisplayValue::Float(21.96)
        );
    }

    #[test]
    fn substitution_is_symmetric() {
        let mut p = point("fan");
        p.inactive_label = Some("off".into());
        assert_eq!(transform(&p, active(0)), DisplayValue::from("off"));
        // no active label: the state name stays
        assert_eq!(transform(&p, active(1)), DisplayValue::from("active"));

        p.active_label = Some(DisplayValue::Boolean(true));
        assert_eq!(transform(&p, active(1)), DisplayValue::Boolean(true));
    }

    #[test]
    fn character_strings_are_substituted_too() {
        let mut p = point("mode");
        p.active_label = Some("running".into());
        assert_eq!(
            transform(&p, Value::CharacterString("active".into())),
            DisplayValue::from("running")
        );
        assert_eq!(
            transform(&p, Value::CharacterString("Active".into())),
            DisplayValue::from("Active")
        );
    }

    #[test]
    fn precision_leaves_other_types_alone() {
        let mut p = point("n");
        p.precision = Some(0);
        assert_eq!(transform(&p, Value::Unsigned(7)), DisplayValue::Unsigned(7));
        assert_eq!(transform(&p, Value::Signed(-7)), DisplayValue::Signed(-7));
        assert_eq!(transform(&p, Value::Boolean(false)), DisplayValue::Boolean(false));
    }

    #[test]
    fn non_scalars_render_as_text() {
        let p = point("x");
        assert_eq!(transform(&p, Value::Null), DisplayValue::from("null"));
        assert_eq!(
            transform(
                &p,
                Value::Enumerated {
                    value: 77,
                    name: None
                }
            ),
            DisplayValue::Unsigned(77)
        );
        assert_eq!(
            transform(
                &p,
                Value::Array(vec![
                    Value::ObjectId(ObjectId::new(ObjectType::Device, 9)),
                    Value::ObjectId(ObjectId::new(ObjectType::AnalogValue, 2)),
                ])
            ),
            DisplayValue::from("device:9,analogValue:2")
        );
    }

    #[test]
    fn halves_round_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(1.0e300, 20), 1.0e300);
    }

    proptest! {
        #[test]
        fn rounding_error_is_bounded(v in -1.0e6f64..1.0e6, places in 0u8..=6) {
            let rounded = round_to(v, places);
            let bound = 0.5 / 10f64.powi(i32::from(places)) + 1e-9;
            prop_assert!((rounded - v).abs() <= bound);
        }
    }

    #[test]
    fn only_floats_are_rounded() {
        let mut p = point("x");
        assert!(!rounds(&p, &Value::Real(1.25)));
        p.precision = Some(1);
        assert!(rounds(&p, &Value::Real(1.25)));
        assert!(rounds(&p, &Value::Double(1.25)));
        assert!(!rounds(&p, &Value::Unsigned(7)));
        assert!(!rounds(&p, &active(1)));
    }
}
