//! Phone number validation and normalization backed by `phonenumber`.

use crate::{PhoneValidator, Region, SmsError};
use phonenumber::country::Id;
use phonenumber::Mode;

fn country_id(region: Region) -> Id {
    match region {
        Region::Ca => Id::CA,
        Region::Us => Id::US,
    }
}

/// Validator using the libphonenumber metadata shipped with `phonenumber`.
///
/// The region only supplies the country code for national input. Numbers
/// already in `+` form are checked against their own country's metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneNumberValidator;

impl PhoneValidator for PhoneNumberValidator {
    fn is_valid(&self, number: &str, region: Region) -> Result<bool, SmsError> {
        let id = country_id(region);
        let parsed = match phonenumber::parse(Some(id), number) {
            Ok(parsed) => parsed,
            Err(_) => return Ok(false),
        };
        Ok(phonenumber::is_valid(&parsed))
    }
}

/// Normalize `input` to E.164, assuming `region` when no country code is given.
pub fn to_e164(input: &str, region: Region) -> Result<String, SmsError> {
    let parsed = phonenumber::parse(Some(country_id(region)), input)
        .map_err(|e| SmsError::Invalid(format!("phone number parse: {}", e)))?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numbers_in_their_own_region() {
        let v = PhoneNumberValidator;
        assert!(v.is_valid("+15062345678", Region::Ca).unwrap());
        assert!(v.is_valid("+12015550123", Region::Us).unwrap());
    }

    #[test]
    fn international_numbers_pass_under_either_default() {
        let v = PhoneNumberValidator;
        for input in ["+15062345678", "+12015550123", "+442079460018", "+18765230123"] {
            for region in Region::SUPPORTED {
                assert!(v.is_valid(input, region).unwrap(), "{} in {}", input, region);
            }
        }
    }

    #[test]
    fn national_input_uses_the_default_region() {
        let v = PhoneNumberValidator;
        assert!(v.is_valid("(506) 234-5678", Region::Ca).unwrap());
        assert!(v.is_valid("201-555-0123", Region::Us).unwrap());
    }

    #[test]
    fn rejects_garbage_input() {
        let v = PhoneNumberValidator;
        for input in ["123", "", "not a number", "+1555"] {
            for region in Region::SUPPORTED {
                assert!(!v.is_valid(input, region).unwrap(), "{} in {}", input, region);
            }
        }
    }

    #[test]
    fn normalizes_masked_input() {
        assert_eq!(to_e164("(416) 123-4567", Region::Us).unwrap(), "+14161234567");
        assert_eq!(to_e164("+1 201-555-0123", Region::Us).unwrap(), "+12015550123");
    }

    #[test]
    fn normalization_fails_on_empty_input() {
        assert!(matches!(to_e164("", Region::Us), Err(SmsError::Invalid(_))));
    }
}
