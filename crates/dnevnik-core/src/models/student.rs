use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "surName")]
    pub middle_name: String,
    #[serde(rename = "className")]
    pub class_name: String,
    #[serde(rename = "orgName")]
    pub org_name: String,
    pub id: String,
    #[serde(rename = "avatarId")]
    pub avatar_id: Option<String>,
}

impl Student {
    /// "Last First Middle", skipping empty parts
    pub fn full_name(&self) -> String {
        [&self.last_name, &self.first_name, &self.middle_name]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Response of `/students`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRoster {
    #[serde(rename = "isParent")]
    pub is_parent: bool,
    pub students: Vec<Student>,
}

impl StudentRoster {
    /// Index of the student with `id`
    pub fn position(&self, id: &str) -> Option<usize> {
        self.students.iter().position(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decode::decode;

    fn student_json(id: &str) -> serde_json::Value {
        json!({
            "firstName": "Ivan",
            "lastName": "Petrov",
            "surName": "Sergeevich",
            "className": "7A",
            "orgName": "School 1",
            "id": id,
            "avatarId": null
        })
    }

    #[test]
    fn test_decode_roster_with_nested_students() {
        let raw = json!({ "isParent": true, "students": [student_json("s1"), student_json("s2")] });
        let roster: StudentRoster = decode(raw).unwrap();

        assert!(roster.is_parent);
        assert_eq!(roster.students.len(), 2);
        assert_eq!(roster.students[0].middle_name, "Sergeevich");
        assert_eq!(roster.students[0].avatar_id, None);
        assert_eq!(roster.position("s2"), Some(1));
        assert!(roster.position("s3").is_none());
    }

    #[test]
    fn test_decode_student_missing_id_fails() {
        let mut raw = student_json("s1");
        raw.as_object_mut().unwrap().remove("id");
        let err = decode::<Student>(raw).unwrap_err();
        assert!(err.to_string().starts_with("Incorrect values for Student"));
    }

    #[test]
    fn test_full_name() {
        let student: Student = decode(student_json("s1")).unwrap();
        assert_eq!(student.full_name(), "Petrov Ivan Sergeevich");
    }
}
