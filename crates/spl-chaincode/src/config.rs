use serde::{Deserialize, Serialize};

use crate::error::{ChaincodeError, ChaincodeResult};

/// Delimiters used to flatten a class record into one invoke argument.
///
/// The defaults read `"10A,SchoolA,Mr.X,Ms.Y,Math#9&Lit#8,HK1,A#B"` as a
/// class with two subjects and two diligence marks. Older clients sent update
/// subjects as `Math$9`; set `update_pair_delimiter = '$'` to accept them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Separates the seven class fields.
    pub field_delimiter: char,
    /// Separates subjects inside the subjects field.
    pub subject_delimiter: char,
    /// Separates a subject's name from its score on `initProfile`.
    pub create_pair_delimiter: char,
    /// Separates a subject's name from its score on `updateProfile`.
    pub update_pair_delimiter: char,
    /// Separates entries of the diligence and audit tag lists.
    pub list_delimiter: char,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            field_delimiter: ',',
            subject_delimiter: '&',
            create_pair_delimiter: '#',
            update_pair_delimiter: '#',
            list_delimiter: '#',
        }
    }
}

impl CodecConfig {
    /// Configuration matching the legacy wire format, where update subjects
    /// used `$` between name and score.
    pub fn legacy() -> Self {
        Self {
            update_pair_delimiter: '$',
            ..Default::default()
        }
    }

    /// Reject delimiter sets that would make decoding ambiguous.
    pub fn validate(&self) -> ChaincodeResult<()> {
        let inner = [
            ("subject_delimiter", self.subject_delimiter),
            ("create_pair_delimiter", self.create_pair_delimiter),
            ("update_pair_delimiter", self.update_pair_delimiter),
            ("list_delimiter", self.list_delimiter),
        ];
        for (name, delim) in inner {
            if delim == self.field_delimiter {
                return Err(ChaincodeError::Config(format!(
                    "{name} must differ from field_delimiter {:?}",
                    self.field_delimiter
                )));
            }
        }
        for (name, delim) in [
            ("create_pair_delimiter", self.create_pair_delimiter),
            ("update_pair_delimiter", self.update_pair_delimiter),
        ] {
            if delim == self.subject_delimiter {
                return Err(ChaincodeError::Config(format!(
                    "{name} must differ from subject_delimiter {:?}",
                    self.subject_delimiter
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = CodecConfig::default();
        assert_eq!(c.field_delimiter, ',');
        assert_eq!(c.subject_delimiter, '&');
        assert_eq!(c.create_pair_delimiter, c.update_pair_delimiter);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn legacy_config_differs_only_on_update_pairs() {
        let c = CodecConfig::legacy();
        assert_eq!(c.update_pair_delimiter, '$');
        assert_eq!(c.create_pair_delimiter, '#');
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_clashing_delimiters() {
        let c = CodecConfig {
            list_delimiter: ',',
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ChaincodeError::Config(_))));

        let c = CodecConfig {
            update_pair_delimiter: '&',
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ChaincodeError::Config(_))));
    }

    #[test]
    fn partial_document_uses_defaults() {
        let c: CodecConfig = serde_json::from_str(r#"{"update_pair_delimiter":"$"}"#).unwrap();
        assert_eq!(c, CodecConfig::legacy());
    }
}
