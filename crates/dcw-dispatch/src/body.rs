use bytes::Bytes;

use crate::{CANDIDATE_PLACEHOLDER, Error, Result};

/// Builds the body of a verification request for a single candidate.
///
/// The template is fixed at construction; every occurrence of
/// [`CANDIDATE_PLACEHOLDER`] is replaced with the candidate verbatim. No
/// escaping is applied, so templates must place the placeholder where any
/// vocabulary symbol is valid.
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    template: String,
}

impl BodyBuilder {
    /// # Errors
    /// - [`Error::InvalidTemplate`] if `template` has no placeholder
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(CANDIDATE_PLACEHOLDER) {
            return Err(Error::InvalidTemplate {
                reason: format!("template must contain `{CANDIDATE_PLACEHOLDER}`"),
            });
        }
        Ok(Self { template })
    }

    pub fn build(&self, candidate: &str) -> Result<Bytes> {
        Ok(Bytes::from(
            self.template.replace(CANDIDATE_PLACEHOLDER, candidate),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_placeholder() {
        let builder =
            BodyBuilder::new(r#"{"code":"{candidate}","confirm":"{candidate}"}"#).unwrap();
        let body = builder.build("0042").unwrap();
        assert_eq!(&body[..], br#"{"code":"0042","confirm":"0042"}"#);
    }

    #[test]
    fn leaves_surrounding_text_alone() {
        let builder = BodyBuilder::new("pin={candidate}&remember=true").unwrap();
        assert_eq!(&builder.build("a+/b").unwrap()[..], b"pin=a+/b&remember=true");
    }

    #[test]
    fn rejects_template_without_placeholder() {
        assert!(matches!(
            BodyBuilder::new("pin=1234"),
            Err(Error::InvalidTemplate { .. })
        ));
    }
}
