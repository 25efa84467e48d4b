//! Flat-string encoding of class records and tag lists.
//!
//! A class travels as seven fields joined by the field delimiter:
//!
//! ```text
//! className,school,headTeacher,homeroomTeacher,subjects,semester,diligence
//! ```
//!
//! where `subjects` is `name<pair>score` entries joined by the subject
//! delimiter and `diligence` is joined by the list delimiter. Decoding checks
//! every count and reports [`ChaincodeError::MalformedInput`] instead of
//! indexing past the end.

use spl_types::{ClassRecord, Subject};

use crate::config::CodecConfig;
use crate::error::{ChaincodeError, ChaincodeResult};

/// Number of fields in an encoded class.
pub const CLASS_FIELD_COUNT: usize = 7;

/// Which operation a class spec arrives with; selects the pair delimiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecContext {
    Create,
    Update,
}

/// Encoder/decoder for class specs and tag lists.
#[derive(Clone, Debug, Default)]
pub struct ClassCodec {
    config: CodecConfig,
}

impl ClassCodec {
    pub fn new(config: CodecConfig) -> ChaincodeResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn pair_delimiter(&self, context: SpecContext) -> char {
        match context {
            SpecContext::Create => self.config.create_pair_delimiter,
            SpecContext::Update => self.config.update_pair_delimiter,
        }
    }

    /// Decode a seven-field class spec.
    pub fn decode_class(&self, spec: &str, context: SpecContext) -> ChaincodeResult<ClassRecord> {
        let delim = self.config.field_delimiter;
        let fields: [&str; CLASS_FIELD_COUNT] = spec
            .split(delim)
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|fields: Vec<&str>| {
                ChaincodeError::MalformedInput(format!(
                    "class spec needs {CLASS_FIELD_COUNT} fields separated by {delim:?}, got {}",
                    fields.len()
                ))
            })?;
        let [class_name, school, head_teacher, homeroom_teacher, subjects, semester, diligence] =
            fields;

        Ok(ClassRecord {
            class_name: class_name.to_owned(),
            school_name: school.to_owned(),
            head_teacher_name: head_teacher.to_owned(),
            homeroom_teacher_name: homeroom_teacher.to_owned(),
            subjects: self.decode_subjects(subjects, self.pair_delimiter(context))?,
            semester: semester.to_owned(),
            diligence: self.decode_list(diligence),
        })
    }

    fn decode_subjects(&self, field: &str, pair: char) -> ChaincodeResult<Vec<Subject>> {
        if field.is_empty() {
            return Ok(Vec::new());
        }
        field
            .split(self.config.subject_delimiter)
            .map(|entry| match entry.split(pair).collect::<Vec<_>>()[..] {
                [name, score] => Ok(Subject::new(name, score)),
                _ => Err(ChaincodeError::MalformedInput(format!(
                    "subject entry {entry:?} must be name{pair}score"
                ))),
            })
            .collect()
    }

    /// Decode a list-delimited string; the empty string is the empty list.
    pub fn decode_list(&self, field: &str) -> Vec<String> {
        if field.is_empty() {
            return Vec::new();
        }
        field
            .split(self.config.list_delimiter)
            .map(str::to_owned)
            .collect()
    }

    /// Render a class back into its flat form.
    pub fn encode_class(&self, class: &ClassRecord, context: SpecContext) -> String {
        let pair = self.pair_delimiter(context);
        let subjects = class
            .subjects
            .iter()
            .map(|s| format!("{}{pair}{}", s.name, s.score))
            .collect::<Vec<_>>()
            .join(&self.config.subject_delimiter.to_string());

        [
            class.class_name.as_str(),
            class.school_name.as_str(),
            class.head_teacher_name.as_str(),
            class.homeroom_teacher_name.as_str(),
            subjects.as_str(),
            class.semester.as_str(),
            self.encode_list(&class.diligence).as_str(),
        ]
        .join(&self.config.field_delimiter.to_string())
    }

    pub fn encode_list(&self, items: &[String]) -> String {
        items.join(&self.config.list_delimiter.to_string())
    }
}
