//! User profile records and write-path validation.
//!
//! [`UserProfile`] mirrors the backend record exactly. Values coming from the
//! backend are trusted as-is; values typed by the caller go through
//! [`ProfileDraft::validate`] before anything is sent.

use serde::{Deserialize, Serialize};

/// Errors produced by [`ProfileDraft::validate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// Handicap outside the accepted range.
    #[error("handicap must be between {min} and {max} (got {value})")]
    HandicapOutOfRange {
        /// Rejected value.
        value: i64,
        /// Lowest accepted handicap.
        min: i64,
        /// Highest accepted handicap.
        max: i64,
    },
    /// Latitude missing, NaN or outside [-90, 90].
    #[error("latitude must be between -90 and 90")]
    InvalidLatitude,
    /// Longitude missing, NaN or outside [-180, 180].
    #[error("longitude must be between -180 and 180")]
    InvalidLongitude,
    /// Bio is empty after trimming.
    #[error("bio cannot be empty")]
    EmptyBio,
    /// Bio exceeds the character limit.
    #[error("bio must be at most {max} characters")]
    BioTooLong {
        /// Maximum allowed characters.
        max: usize,
    },
    /// Avatar payload exceeds the size limit.
    #[error("avatar must be smaller than {max} bytes")]
    AvatarTooLarge {
        /// Maximum allowed bytes.
        max: usize,
    },
    /// Avatar payload is neither JPEG nor PNG.
    #[error("avatar must be a JPEG or PNG image")]
    UnsupportedAvatarFormat,
}

/// Gender of a user, also used for the "looking for" preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Couple,
}

impl Gender {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
            Self::Couple => "Couple",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Female => write!(f, "female"),
            Self::Male => write!(f, "male"),
            Self::Couple => write!(f, "couple"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            "couple" => Ok(Self::Couple),
            _ => Err(format!("invalid gender: {s}")),
        }
    }
}

/// Social preference: what kind of round a golfer is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Pleasure,
    Romantic,
    Business,
    Casual,
}

impl Preference {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pleasure => "Pleasure",
            Self::Romantic => "Romantic",
            Self::Business => "Business",
            Self::Casual => "Casual",
        }
    }
}

impl std::fmt::Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pleasure => write!(f, "pleasure"),
            Self::Romantic => write!(f, "romantic"),
            Self::Business => write!(f, "business"),
            Self::Casual => write!(f, "casual"),
        }
    }
}

impl std::str::FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pleasure" => Ok(Self::Pleasure),
            "romantic" => Ok(Self::Romantic),
            "business" => Ok(Self::Business),
            "casual" => Ok(Self::Casual),
            _ => Err(format!("invalid preference: {s}")),
        }
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    #[serde(rename = "long")]
    pub lon: f64,
}

impl Coordinates {
    /// Create a coordinate pair. No range check is applied.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components are finite and within their ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// A golfer's profile as stored by the backend.
///
/// Profiles carry no identity of their own; the backend keys them by the
/// owning principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub location: Coordinates,
    pub handicap: i64,
    pub gender: Gender,
    pub looking_for: Gender,
    pub gender_preference: Gender,
    pub preference: Preference,
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "avatar_base64")]
    pub avatar: Option<Vec<u8>>,
}

impl UserProfile {
    /// Lowest handicap accepted on the write path.
    pub const HANDICAP_MIN: i64 = -10;
    /// Highest handicap accepted on the write path.
    pub const HANDICAP_MAX: i64 = 54;
    /// Maximum bio length in characters.
    pub const MAX_BIO_CHARS: usize = 1000;
    /// Maximum avatar payload in bytes (5 MB).
    pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;
}

/// Caller-entered profile values awaiting validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDraft {
    pub handicap: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub gender: Gender,
    pub looking_for: Gender,
    pub gender_preference: Gender,
    pub preference: Preference,
    pub bio: String,
    pub avatar: Option<Vec<u8>>,
}

impl ProfileDraft {
    /// Validate the draft and turn it into a [`UserProfile`].
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: handicap range, latitude, longitude,
    /// bio presence and length, then avatar size and format.
    pub fn validate(self) -> Result<UserProfile, ProfileError> {
        if !(UserProfile::HANDICAP_MIN..=UserProfile::HANDICAP_MAX).contains(&self.handicap) {
            return Err(ProfileError::HandicapOutOfRange {
                value: self.handicap,
                min: UserProfile::HANDICAP_MIN,
                max: UserProfile::HANDICAP_MAX,
            });
        }

        // NaN fails both range checks
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ProfileError::InvalidLatitude);
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ProfileError::InvalidLongitude);
        }

        let bio = self.bio.trim();
        if bio.is_empty() {
            return Err(ProfileError::EmptyBio);
        }
        if bio.chars().count() > UserProfile::MAX_BIO_CHARS {
            return Err(ProfileError::BioTooLong {
                max: UserProfile::MAX_BIO_CHARS,
            });
        }

        if let Some(avatar) = &self.avatar {
            if avatar.len() > UserProfile::MAX_AVATAR_BYTES {
                return Err(ProfileError::AvatarTooLarge {
                    max: UserProfile::MAX_AVATAR_BYTES,
                });
            }
            if !is_jpeg_or_png(avatar) {
                return Err(ProfileError::UnsupportedAvatarFormat);
            }
        }

        Ok(UserProfile {
            location: Coordinates::new(self.latitude, self.longitude),
            handicap: self.handicap,
            gender: self.gender,
            looking_for: self.looking_for,
            gender_preference: self.gender_preference,
            preference: self.preference,
            bio: bio.to_owned(),
            avatar: self.avatar,
        })
    }
}

impl From<UserProfile> for ProfileDraft {
    fn from(profile: UserProfile) -> Self {
        Self {
            handicap: profile.handicap,
            latitude: profile.location.lat,
            longitude: profile.location.lon,
            gender: profile.gender,
            looking_for: profile.looking_for,
            gender_preference: profile.gender_preference,
            preference: profile.preference,
            bio: profile.bio,
            avatar: profile.avatar,
        }
    }
}

fn is_jpeg_or_png(bytes: &[u8]) -> bool {
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.starts_with(JPEG) || bytes.starts_with(PNG)
}

/// Avatar bytes travel as standard base64 text.
mod avatar_base64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)] // signature dictated by serde's `with`
    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => s.serialize_some(&STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(d)?;
        encoded
            .map(|e| STANDARD.decode(e).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProfileDraft {
        ProfileDraft {
            handicap: 18,
            latitude: 40.7128,
            longitude: -74.0060,
            gender: Gender::Female,
            looking_for: Gender::Male,
            gender_preference: Gender::Male,
            preference: Preference::Casual,
            bio: "  Weekend hacker, loves links courses.  ".to_owned(),
            avatar: None,
        }
    }

    #[test]
    fn test_valid_draft_trims_bio() {
        let profile = draft().validate().unwrap();
        assert_eq!(profile.bio, "Weekend hacker, loves links courses.");
        assert_eq!(profile.location, Coordinates::new(40.7128, -74.0060));
    }

    #[test]
    fn test_handicap_bounds() {
        let mut d = draft();
        d.handicap = -10;
        assert!(d.clone().validate().is_ok());
        d.handicap = 54;
        assert!(d.clone().validate().is_ok());
        d.handicap = 55;
        assert!(matches!(
            d.validate(),
            Err(ProfileError::HandicapOutOfRange { value: 55, .. })
        ));
    }

    #[test]
    fn test_latitude_rejects_nan_and_out_of_range() {
        let mut d = draft();
        d.latitude = f64::NAN;
        assert_eq!(d.clone().validate(), Err(ProfileError::InvalidLatitude));
        d.latitude = 90.5;
        assert_eq!(d.validate(), Err(ProfileError::InvalidLatitude));
    }

    #[test]
    fn test_longitude_out_of_range() {
        let mut d = draft();
        d.longitude = -180.01;
        assert_eq!(d.validate(), Err(ProfileError::InvalidLongitude));
    }

    #[test]
    fn test_bio_rules() {
        let mut d = draft();
        d.bio = "   ".to_owned();
        assert_eq!(d.clone().validate(), Err(ProfileError::EmptyBio));
        d.bio = "x".repeat(1001);
        assert_eq!(
            d.validate(),
            Err(ProfileError::BioTooLong { max: 1000 })
        );
    }

    #[test]
    fn test_avatar_format() {
        let mut d = draft();
        d.avatar = Some(b"GIF89a".to_vec());
        assert_eq!(
            d.clone().validate(),
            Err(ProfileError::UnsupportedAvatarFormat)
        );
        d.avatar = Some(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00]);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_avatar_too_large() {
        let mut d = draft();
        let mut bytes = vec![0xFF, 0xD8, 0xFF];
        bytes.resize(UserProfile::MAX_AVATAR_BYTES + 1, 0);
        d.avatar = Some(bytes);
        assert!(matches!(
            d.validate(),
            Err(ProfileError::AvatarTooLarge { .. })
        ));
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let mut profile = draft().validate().unwrap();
        profile.avatar = Some(vec![0x89, b'P', b'N', b'G']);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["lookingFor"], "male");
        assert_eq!(json["genderPreference"], "male");
        assert_eq!(json["location"]["long"], -74.0060);
        assert_eq!(json["avatar"], "iVBORw==");

        let back: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_missing_avatar_deserializes_as_none() {
        let json = serde_json::json!({
            "location": { "lat": 1.0, "long": 2.0 },
            "handicap": 9,
            "gender": "couple",
            "lookingFor": "couple",
            "genderPreference": "couple",
            "preference": "business",
            "bio": "Corporate days out",
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();
        assert!(profile.avatar.is_none());
        assert_eq!(profile.preference, Preference::Business);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("MALE".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(
            "romantic".parse::<Preference>().unwrap(),
            Preference::Romantic
        );
        assert!("golf".parse::<Preference>().is_err());
        assert_eq!(Preference::Business.label(), "Business");
    }

    #[test]
    fn test_labels_are_capitalized() {
        assert_eq!(Gender::Couple.label(), "Couple");
        assert_eq!(Gender::Female.to_string(), "female");
        assert_eq!(Preference::Romantic.label(), "Romantic");
    }
}
