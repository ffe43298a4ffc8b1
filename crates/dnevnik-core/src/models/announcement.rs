use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File attached to an announcement.
///
/// The portal's attachment schema is unknown, so the raw object is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnouncementFile(pub Value);

/// Announcement elements must match these keys exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Announcement {
    pub id: String,
    pub date: String,
    #[serde(rename = "expired")]
    pub expiry: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "isImportant")]
    pub is_important: bool,
    #[serde(rename = "hasFiles")]
    pub has_files: bool,
    #[serde(rename = "isChecked")]
    pub is_checked: bool,
    pub files: Vec<AnnouncementFile>,
    pub author: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decode::{decode, decode_field};
    use crate::error::Error;

    fn announcement_json() -> Value {
        json!({
            "id": "a1",
            "date": "2024-09-01T00:00:00",
            "expired": "2024-09-30T00:00:00",
            "title": "Day of Knowledge",
            "description": "Assembly at 9:00",
            "isImportant": true,
            "hasFiles": true,
            "isChecked": false,
            "files": [{ "name": "plan.pdf", "size": 1024 }],
            "author": { "firstName": "Anna", "lastName": "Ivanova" }
        })
    }

    #[test]
    fn test_decode_announcements() {
        let raw = json!({ "announcements": [announcement_json()] });
        let list: Vec<Announcement> = decode_field(raw, "announcements").unwrap();

        assert_eq!(list.len(), 1);
        let a = &list[0];
        assert_eq!(a.expiry, "2024-09-30T00:00:00");
        assert!(a.is_important);
        assert_eq!(a.files[0].0["name"], "plan.pdf");
        assert_eq!(a.author["lastName"], "Ivanova");
    }

    #[test]
    fn test_extra_key_is_rejected() {
        let mut raw = announcement_json();
        raw["priority"] = json!(1);
        assert!(matches!(
            decode::<Announcement>(raw),
            Err(Error::Decode { type_name: "Announcement", .. })
        ));
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let mut raw = announcement_json();
        raw.as_object_mut().unwrap().remove("author");
        assert!(decode::<Announcement>(raw).is_err());
    }
}
