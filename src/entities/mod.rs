//! Records mirrored from the CMS API.
//!
//! Every record carries a server-assigned `id`, the `domainId`/`courseId`
//! scoping tags (0 = landing page / global) and an `isActive` visibility flag.
//! Everything else is content. The API is loose about scalar types
//! (`isActive` may arrive as `1`, image lists as JSON strings), so fields are
//! read leniently.

mod catalog;
mod content;
mod outreach;

pub use catalog::{Certificate, Course, Domain, Module, TechStack};
pub use content::{About, FaqChat, Hero, Notice, YoutubeShort};
pub use outreach::{BulkEmail, CareerImpact, EnrollCard, Enrollment, StudentSuccess};

use serde::{Deserialize, Serialize};

/// Upload ceiling for photos and banners.
pub const IMAGE_LIMIT: u64 = 2 * 1024 * 1024;
/// Upload ceiling for small icons.
pub const ICON_LIMIT: u64 = 512 * 1024;

/// One step of an enrollment or career-impact walkthrough.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

pub(crate) mod lenient {
    use serde::de::{DeserializeOwned, Error};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::String(s) => {
                matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
            }
            _ => false,
        })
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        match Value::deserialize(d)? {
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(v), _) => Ok(v),
                (None, Some(f)) if whole(f) => Ok(f as i64),
                _ => Err(D::Error::custom(format!("expected an integer, got {n}"))),
            },
            Value::String(s) if s.trim().is_empty() => Ok(0),
            Value::String(s) => s.trim().parse().map_err(D::Error::custom),
            Value::Null => Ok(0),
            other => Err(D::Error::custom(format!("expected an integer, got {other}"))),
        }
    }

    /// `4.0` counts as an integer; `4.7` and values outside `i64` do not.
    fn whole(f: f64) -> bool {
        f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&f)
    }

    /// An array, or the same array JSON-encoded inside a string.
    pub fn list<'de, D: Deserializer<'de>, T: DeserializeOwned>(d: D) -> Result<Vec<T>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(Vec::new()),
            Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
            Value::String(s) => serde_json::from_str(&s).map_err(D::Error::custom),
            v @ Value::Array(_) => serde_json::from_value(v).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("expected a list, got {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldValue, Payload};
    use crate::resource::Resource;

    #[test]
    fn lenient_scalars_and_lists() {
        let a: About = serde_json::from_str(
            r#"{"id":"4","domainId":null,"courseId":2,"title":"Who we are","isActive":1,
                "images":"[\"a.png\",\"b.png\"]"}"#,
        )
        .unwrap();
        assert_eq!(a.id, 4);
        assert_eq!(a.domain_id, 0);
        assert_eq!(a.course_id, 2);
        assert!(a.is_active);
        assert_eq!(a.images, vec!["a.png", "b.png"]);
    }

    #[test]
    fn fractional_ids_are_rejected() {
        let n: Notice = serde_json::from_str(r#"{"id":4.0,"courseId":2.0,"title":"t"}"#).unwrap();
        assert_eq!((n.id, n.course_id), (4, 2));
        assert!(serde_json::from_str::<Notice>(r#"{"id":4.7,"title":"t"}"#).is_err());
        assert!(serde_json::from_str::<Notice>(r#"{"id":1,"domainId":2.5}"#).is_err());
        assert!(serde_json::from_str::<Notice>(r#"{"id":1e30}"#).is_err());
    }

    #[test]
    fn record_without_id_is_rejected() {
        assert!(serde_json::from_str::<Notice>(r#"{"message":"Notice updated"}"#).is_err());
    }

    #[test]
    fn status_payload_resends_retained_images() {
        let hero: Hero = serde_json::from_value(serde_json::json!({
            "id": 9, "title": "Learn Solar", "isActive": true, "images": ["h1.jpg", "h2.jpg"]
        }))
        .unwrap();
        let mut flipped = hero.clone();
        flipped.set_active(false);
        let Payload::Multipart(p) = flipped.status_payload() else { panic!("hero is multipart") };
        assert_eq!(p.text("isActive"), Some("false"));
        assert_eq!(p.text("existingImages"), Some(r#"["h1.jpg","h2.jpg"]"#));
        assert_eq!(p.text("title"), None);
        assert!(p.files("images").is_empty());
    }

    #[test]
    fn json_entities_toggle_with_a_single_field() {
        let body = serde_json::json!({"id": 1, "title": "Holiday", "isActive": false});
        let n: Notice = serde_json::from_value(body).unwrap();
        let mut flipped = n.clone();
        flipped.set_active(true);
        assert_eq!(flipped.status_payload(), Payload::Json(serde_json::json!({"isActive": true})));
    }

    #[test]
    fn enroll_card_toggle_keeps_steps() {
        let card: EnrollCard = serde_json::from_value(serde_json::json!({
            "id": 2, "title": "Enroll", "isActive": true,
            "steps": [{"title": "Apply", "description": "Fill the form"}]
        }))
        .unwrap();
        let Payload::Multipart(p) = card.status_payload() else {
            panic!("enroll card is multipart")
        };
        let steps: Vec<Step> = serde_json::from_str(p.text("steps").unwrap()).unwrap();
        assert_eq!(steps[0].title, "Apply");
    }

    #[test]
    fn drafts_prefill_every_schema_field_except_files() {
        let c: Course = serde_json::from_value(serde_json::json!({
            "id": 3, "domainId": 1, "title": "PV Design", "fee": 12000,
            "isActive": true, "image": "c.png"
        }))
        .unwrap();
        let d = c.to_draft();
        assert_eq!(d.text("title"), Some("PV Design"));
        assert_eq!(d.text("fee"), Some("12000"));
        assert_eq!(d.flag("isActive"), Some(true));
        assert!(d.get("image").is_none());
        assert!(matches!(d.get("domainId"), Some(FieldValue::Text(t)) if t == "1"));
    }
}
