use serde::{Deserialize, Serialize};

/// A point on the map, in degrees.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub long: f64,
}

impl LatLng {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }
}

/// A geo-tagged note.
///
/// `code` is empty until the server has stored the note; `creator` and
/// `country` are assigned server-side. Extra fields the backend returns
/// (tags, created) are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Note {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub text: String,
    pub url: String,
    pub lat: f64,
    pub long: f64,
}

impl Note {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.long)
    }
}

/// One element of the `GET /note/geojson` response.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct NoteFeature {
    pub geometry: PointGeometry,
    pub properties: NoteProperties,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct PointGeometry {
    /// GeoJSON order: `[long, lat]`.
    pub coordinates: (f64, f64),
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct NoteProperties {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub text: String,
    pub url: String,
}

impl From<NoteFeature> for Note {
    fn from(f: NoteFeature) -> Self {
        let (long, lat) = f.geometry.coordinates;
        Note {
            code: f.properties.code,
            creator: f.properties.creator.unwrap_or_default(),
            country: f.properties.country,
            text: f.properties.text,
            url: f.properties.url,
            lat,
            long,
        }
    }
}

/// What the create/details form holds while the user is typing.
///
/// Coordinates stay textual so that bad input is reported instead of coerced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteForm {
    pub code: String,
    pub creator: String,
    pub country: String,
    pub text: String,
    pub url: String,
    pub lat: String,
    pub long: String,
}

impl NoteForm {
    /// An unsaved draft at the clicked position.
    pub fn draft_at(at: LatLng) -> Self {
        Self {
            lat: at.lat.to_string(),
            long: at.long.to_string(),
            ..Default::default()
        }
    }

    /// Parsed coordinates, if both fields are finite and in range.
    pub fn position(&self) -> Option<LatLng> {
        let lat = parse_coordinate(&self.lat, 90.0)?;
        let long = parse_coordinate(&self.long, 180.0)?;
        Some(LatLng::new(lat, long))
    }
}

impl From<&Note> for NoteForm {
    fn from(n: &Note) -> Self {
        Self {
            code: n.code.clone(),
            creator: n.creator.clone(),
            country: n.country.clone(),
            text: n.text.clone(),
            url: n.url.clone(),
            lat: n.lat.to_string(),
            long: n.long.to_string(),
        }
    }
}

pub(crate) fn parse_coordinate(raw: &str, limit: f64) -> Option<f64> {
    let v: f64 = raw.trim().parse().ok()?;
    (v.is_finite() && v.abs() <= limit).then_some(v)
}

/// Body of `POST /note` and `PUT /note/{code}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NotePayload {
    pub url: String,
    pub text: String,
    pub lat: f64,
    pub long: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Registration form as typed, including the confirmation field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// `PUT /user/own` response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserRead {
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_contract_deserialize() {
        let json = r##"{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [52.5, 32.25]},
            "properties": {
                "code": "c-1",
                "creator": "ali",
                "country": "Iran",
                "text": "#tehran trip",
                "url": "https://example.com/"
            }
        }"##;
        let f: NoteFeature = serde_json::from_str(json).expect("feature should parse");
        let note = Note::from(f);
        assert_eq!(note.code, "c-1");
        assert_eq!(note.lat, 32.25);
        assert_eq!(note.long, 52.5);
        assert_eq!(note.creator, "ali");
    }

    #[test]
    fn test_feature_with_null_creator() {
        let json = r#"{
            "geometry": {"coordinates": [1.0, 2.0]},
            "properties": {"code": "c", "creator": null, "country": "", "url": "https://a.b/"}
        }"#;
        let f: NoteFeature = serde_json::from_str(json).expect("feature should parse");
        assert_eq!(Note::from(f).creator, "");
    }

    #[test]
    fn test_note_ignores_extra_server_fields() {
        let json = r#"{
            "code": "x", "creator": "u", "country": "Iran", "text": "",
            "url": "https://a.b/", "lat": 1.5, "long": 2.5,
            "tags": [], "created": "2024-01-01T00:00:00+03:30"
        }"#;
        let note: Note = serde_json::from_str(json).expect("note should parse");
        assert_eq!(note.position(), LatLng::new(1.5, 2.5));
    }

    #[test]
    fn test_form_position_requires_both_coordinates_in_range() {
        let mut form = NoteForm::draft_at(LatLng::new(10.0, 20.0));
        assert_eq!(form.position(), Some(LatLng::new(10.0, 20.0)));

        form.lat = "91".to_string();
        assert_eq!(form.position(), None);

        form.lat = "abc".to_string();
        assert_eq!(form.position(), None);
    }

    #[test]
    fn test_user_update_omits_missing_fields() {
        let v = serde_json::to_value(UserUpdate::default()).expect("should serialize");
        assert_eq!(v, serde_json::json!({}));
    }
}
