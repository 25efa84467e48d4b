use serde::{Deserialize, Deserializer, Serialize};

use crate::level::ClassLevel;

/// A single subject result inside a class record.
///
/// The score is kept as text so letter grades and numeric marks share one
/// representation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "name_subject", default)]
    pub name: String,
    #[serde(rename = "score_subject", default)]
    pub score: String,
}

impl Subject {
    pub fn new(name: impl Into<String>, score: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: score.into(),
        }
    }
}

/// One academic year of a student profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    #[serde(default)]
    pub class_name: String,
    #[serde(rename = "name_school", default)]
    pub school_name: String,
    #[serde(rename = "name_HT", default)]
    pub head_teacher_name: String,
    #[serde(rename = "name_GVCN", default)]
    pub homeroom_teacher_name: String,
    /// Subjects in input order. Older records spelled the key `Subjects`.
    #[serde(alias = "Subjects", default, deserialize_with = "null_as_empty")]
    pub subjects: Vec<Subject>,
    /// Semester code.
    #[serde(rename = "hk", default)]
    pub semester: String,
    /// Diligence / conduct marks.
    #[serde(rename = "dh", default, deserialize_with = "null_as_empty")]
    pub diligence: Vec<String>,
}

impl ClassRecord {
    /// Returns `true` for an unset slot.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The ledger record for one student, keyed by `user_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub class_10: ClassRecord,
    #[serde(default)]
    pub class_11: ClassRecord,
    #[serde(default)]
    pub class_12: ClassRecord,
    /// Blockchain/audit reference tags. Replaced wholesale on every update.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bc: Vec<String>,
}

impl Profile {
    /// A fresh profile with `class` in the grade 10 slot and the other two
    /// slots zero-valued.
    pub fn new(user_id: impl Into<String>, class: ClassRecord, bc: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            class_10: class,
            class_11: ClassRecord::default(),
            class_12: ClassRecord::default(),
            bc,
        }
    }

    /// The class slot addressed by `level`.
    pub fn class(&self, level: ClassLevel) -> &ClassRecord {
        match level {
            ClassLevel::Ten => &self.class_10,
            ClassLevel::Eleven => &self.class_11,
            ClassLevel::Twelve => &self.class_12,
        }
    }

    /// Replace the class slot addressed by `level`, returning the old record.
    pub fn replace_class(&mut self, level: ClassLevel, class: ClassRecord) -> ClassRecord {
        let slot = match level {
            ClassLevel::Ten => &mut self.class_10,
            ClassLevel::Eleven => &mut self.class_11,
            ClassLevel::Twelve => &mut self.class_12,
        };
        std::mem::replace(slot, class)
    }
}

/// Records written by Go-style encoders store unset slices as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sample_class() -> ClassRecord {
        ClassRecord {
            class_name: "10A".into(),
            school_name: "SchoolA".into(),
            head_teacher_name: "Mr.X".into(),
            homeroom_teacher_name: "Ms.Y".into(),
            subjects: vec![Subject::new("Math", "9"), Subject::new("Lit", "8")],
            semester: "HK1".into(),
            diligence: vec!["A".into(), "B".into()],
        }
    }

    #[test]
    fn new_profile_fills_grade_ten_only() {
        let p = Profile::new("u1", sample_class(), vec!["tx1".into()]);
        assert_eq!(p.class_10, sample_class());
        assert!(p.class_11.is_empty());
        assert!(p.class_12.is_empty());
    }

    #[test]
    fn serialized_shape_uses_ledger_keys() {
        let p = Profile::new("u1", sample_class(), vec!["tx1".into(), "tx2".into()]);
        let v: Value = serde_json::to_value(&p).unwrap();
        assert_eq!(v["user_id"], "u1");
        assert_eq!(v["class_10"]["name_school"], "SchoolA");
        assert_eq!(v["class_10"]["name_HT"], "Mr.X");
        assert_eq!(v["class_10"]["name_GVCN"], "Ms.Y");
        assert_eq!(v["class_10"]["hk"], "HK1");
        assert_eq!(v["class_10"]["subjects"][1]["name_subject"], "Lit");
        assert_eq!(v["class_10"]["subjects"][1]["score_subject"], "8");
        assert_eq!(v["bc"], json!(["tx1", "tx2"]));
    }

    #[test]
    fn empty_slots_are_present_in_json() {
        let p = Profile::new("u1", sample_class(), vec![]);
        let v: Value = serde_json::to_value(&p).unwrap();
        assert_eq!(v["class_12"]["subjects"], json!([]));
        assert_eq!(v["class_12"]["dh"], json!([]));
        assert_eq!(v["class_12"]["class_name"], "");
    }

    #[test]
    fn decodes_legacy_record_with_nulls() {
        let raw = json!({
            "user_id": "u1",
            "class_10": {
                "class_name": "10A", "name_school": "S", "name_HT": "H",
                "name_GVCN": "G",
                "Subjects": [{"name_subject": "Math", "score_subject": "9"}],
                "hk": "HK1", "dh": ["A"]
            },
            "class_11": {
                "class_name": "", "name_school": "", "name_HT": "",
                "name_GVCN": "", "Subjects": null, "hk": "", "dh": null
            },
            "class_12": {
                "class_name": "", "name_school": "", "name_HT": "",
                "name_GVCN": "", "Subjects": null, "hk": "", "dh": null
            },
            "bc": null
        });
        let p: Profile = serde_json::from_value(raw).unwrap();
        assert_eq!(p.class_10.subjects, vec![Subject::new("Math", "9")]);
        assert!(p.class_11.is_empty());
        assert!(p.bc.is_empty());
    }

    #[test]
    fn replace_class_keeps_other_slots() {
        let mut p = Profile::new("u1", sample_class(), vec![]);
        let mut eleven = sample_class();
        eleven.class_name = "11A".into();
        let old = p.replace_class(ClassLevel::Eleven, eleven.clone());
        assert!(old.is_empty());
        assert_eq!(p.class(ClassLevel::Eleven), &eleven);
        assert_eq!(p.class(ClassLevel::Ten), &sample_class());
        assert!(p.class(ClassLevel::Twelve).is_empty());
    }

    #[test]
    fn subjects_keep_duplicates_and_order() {
        let mut class = sample_class();
        class.subjects.push(Subject::new("Math", "7"));
        let json = serde_json::to_string(&class).unwrap();
        let back: ClassRecord = serde_json::from_str(&json).unwrap();
        let names: Vec<_> = back.subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Math", "Lit", "Math"]);
    }
}
