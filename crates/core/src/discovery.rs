//! Geographic match discovery.
//!
//! Takes the caller's own location and the candidate profiles returned by
//! the backend, measures great-circle distance to each, drops candidates
//! outside the handicap band, distance limit or preference, and returns the
//! rest nearest first.
//!
//! Malformed geodata never raises: a NaN coordinate produces a NaN distance,
//! which fails every `<=` comparison and silently excludes the candidate.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::types::{Coordinates, Preference, UserProfile};

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Default maximum distance for discovery.
pub const DEFAULT_MAX_DISTANCE_MILES: f64 = 50.0;

/// Haversine distance between two coordinates in statute miles.
///
/// Degrees are converted as `deg * PI / 180` and the terms are evaluated in
/// a fixed order so results are reproducible bit for bit.
#[must_use]
#[allow(clippy::suboptimal_flops)] // mul_add would change rounding
pub fn distance_miles(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = radians(to.lat - from.lat);
    let d_lon = radians(to.lon - from.lon);
    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + radians(from.lat).cos()
            * radians(to.lat).cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

fn radians(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Social preference constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PreferenceFilter {
    #[default]
    Any,
    Only(Preference),
}

impl PreferenceFilter {
    /// Whether a candidate's preference passes.
    #[must_use]
    pub fn accepts(self, preference: Preference) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted == preference,
        }
    }
}

impl std::fmt::Display for PreferenceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Only(p) => write!(f, "{p}"),
        }
    }
}

impl std::str::FromStr for PreferenceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "all" is what the discovery page's select used
        match s {
            "any" | "all" => Ok(Self::Any),
            other => other.parse().map(Self::Only),
        }
    }
}

impl TryFrom<String> for PreferenceFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PreferenceFilter> for String {
    fn from(value: PreferenceFilter) -> Self {
        value.to_string()
    }
}

/// Discovery filter configuration. All bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryFilters {
    pub handicap_min: i64,
    pub handicap_max: i64,
    pub max_distance_miles: f64,
    pub preference: PreferenceFilter,
}

impl Default for DiscoveryFilters {
    fn default() -> Self {
        Self {
            handicap_min: UserProfile::HANDICAP_MIN,
            handicap_max: UserProfile::HANDICAP_MAX,
            max_distance_miles: DEFAULT_MAX_DISTANCE_MILES,
            preference: PreferenceFilter::Any,
        }
    }
}

impl DiscoveryFilters {
    /// Whether a candidate at `distance` miles passes every predicate.
    #[must_use]
    pub fn accepts(&self, profile: &UserProfile, distance: f64) -> bool {
        let handicap_match =
            self.handicap_min <= profile.handicap && profile.handicap <= self.handicap_max;
        let distance_match = distance <= self.max_distance_miles;
        handicap_match && distance_match && self.preference.accepts(profile.preference)
    }
}

/// A candidate that survived filtering, with its distance from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub profile: UserProfile,
    pub distance_miles: f64,
}

/// Filter and rank candidates around `origin`.
///
/// Returns an empty list when `origin` is `None` (the caller has no saved
/// profile yet). Ties in distance keep their input order.
#[must_use]
pub fn discover(
    origin: Option<Coordinates>,
    candidates: &[UserProfile],
    filters: &DiscoveryFilters,
) -> Vec<MatchCandidate> {
    let Some(origin) = origin else {
        return Vec::new();
    };

    let mut matches: Vec<MatchCandidate> = candidates
        .iter()
        .filter_map(|profile| {
            let distance = distance_miles(origin, profile.location);
            filters
                .accepts(profile, distance)
                .then(|| MatchCandidate {
                    profile: profile.clone(),
                    distance_miles: distance,
                })
        })
        .collect();

    // Survivors have non-NaN distances, so total_cmp agrees with <=.
    matches.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    matches
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::Gender;

    const NEW_YORK: Coordinates = Coordinates::new(40.7128, -74.0060);
    const LOS_ANGELES: Coordinates = Coordinates::new(34.0522, -118.2437);

    fn profile_at(location: Coordinates, handicap: i64, preference: Preference) -> UserProfile {
        UserProfile {
            location,
            handicap,
            gender: Gender::Male,
            looking_for: Gender::Female,
            gender_preference: Gender::Female,
            preference,
            bio: format!("hcp {handicap}"),
            avatar: None,
        }
    }

    fn nyc_filters() -> DiscoveryFilters {
        DiscoveryFilters {
            handicap_min: 0,
            handicap_max: 36,
            max_distance_miles: 50.0,
            preference: PreferenceFilter::Any,
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(distance_miles(NEW_YORK, NEW_YORK), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (NEW_YORK, LOS_ANGELES),
            (Coordinates::new(-33.8688, 151.2093), Coordinates::new(51.5074, -0.1278)),
            (Coordinates::new(89.9, 179.9), Coordinates::new(-89.9, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_miles(a, b), distance_miles(b, a));
        }
    }

    #[test]
    fn test_new_york_to_los_angeles() {
        let d = distance_miles(NEW_YORK, LOS_ANGELES);
        assert!((d - 2445.71).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_candidate_at_origin_is_returned_with_zero_distance() {
        let candidates = vec![profile_at(NEW_YORK, 18, Preference::Casual)];
        let result = discover(Some(NEW_YORK), &candidates, &nyc_filters());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].distance_miles, 0.0);
        assert_eq!(result[0].profile, candidates[0]);
    }

    #[test]
    fn test_far_candidate_is_excluded() {
        let candidates = vec![profile_at(LOS_ANGELES, 18, Preference::Casual)];
        assert!(discover(Some(NEW_YORK), &candidates, &nyc_filters()).is_empty());
    }

    #[test]
    fn test_missing_origin_yields_nothing() {
        let candidates = vec![profile_at(NEW_YORK, 18, Preference::Casual)];
        assert!(discover(None, &candidates, &nyc_filters()).is_empty());
    }

    #[test]
    fn test_nan_coordinates_are_excluded() {
        let candidates = vec![
            profile_at(Coordinates::new(f64::NAN, -74.0), 18, Preference::Casual),
            profile_at(NEW_YORK, 18, Preference::Casual),
        ];
        let result = discover(Some(NEW_YORK), &candidates, &nyc_filters());
        assert_eq!(result.len(), 1);
        assert!(result[0].distance_miles.is_finite());

        let nan_origin = discover(Some(Coordinates::new(f64::NAN, 0.0)), &candidates, &nyc_filters());
        assert!(nan_origin.is_empty());
    }

    #[test]
    fn test_inverted_handicap_range_is_empty() {
        let candidates = vec![profile_at(NEW_YORK, 18, Preference::Casual)];
        let filters = DiscoveryFilters {
            handicap_min: 20,
            handicap_max: 10,
            ..nyc_filters()
        };
        assert!(discover(Some(NEW_YORK), &candidates, &filters).is_empty());
    }

    #[test]
    fn test_handicap_bounds_are_inclusive() {
        let candidates = vec![
            profile_at(NEW_YORK, 0, Preference::Casual),
            profile_at(NEW_YORK, 36, Preference::Casual),
            profile_at(NEW_YORK, 37, Preference::Casual),
        ];
        let result = discover(Some(NEW_YORK), &candidates, &nyc_filters());
        let handicaps: Vec<_> = result.iter().map(|m| m.profile.handicap).collect();
        assert_eq!(handicaps, vec![0, 36]);
    }

    #[test]
    fn test_preference_filter() {
        let candidates = vec![
            profile_at(NEW_YORK, 10, Preference::Business),
            profile_at(NEW_YORK, 11, Preference::Romantic),
        ];
        let filters = DiscoveryFilters {
            preference: PreferenceFilter::Only(Preference::Romantic),
            ..nyc_filters()
        };
        let result = discover(Some(NEW_YORK), &candidates, &filters);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].profile.preference, Preference::Romantic);
    }

    #[test]
    fn test_sorted_by_distance_with_stable_ties() {
        let hoboken = Coordinates::new(40.7440, -74.0324);
        let yonkers = Coordinates::new(40.9312, -73.8988);
        let candidates = vec![
            profile_at(yonkers, 1, Preference::Casual),
            profile_at(hoboken, 2, Preference::Casual),
            profile_at(NEW_YORK, 3, Preference::Casual),
            profile_at(hoboken, 4, Preference::Casual),
        ];
        let result = discover(Some(NEW_YORK), &candidates, &nyc_filters());
        let order: Vec<_> = result.iter().map(|m| m.profile.handicap).collect();
        assert_eq!(order, vec![3, 2, 4, 1]);
        assert!(result.windows(2).all(|w| w[0].distance_miles <= w[1].distance_miles));
    }

    #[test]
    fn test_every_result_satisfies_all_predicates() {
        let candidates: Vec<_> = (0..40)
            .map(|i| {
                let offset = f64::from(i) * 0.05;
                let preference = if i % 3 == 0 {
                    Preference::Business
                } else {
                    Preference::Pleasure
                };
                profile_at(
                    Coordinates::new(40.7128 + offset, -74.0060 - offset),
                    i64::from(i) - 5,
                    preference,
                )
            })
            .collect();
        let filters = DiscoveryFilters {
            handicap_min: 2,
            handicap_max: 30,
            max_distance_miles: 75.0,
            preference: PreferenceFilter::Only(Preference::Pleasure),
        };
        let result = discover(Some(NEW_YORK), &candidates, &filters);
        assert!(!result.is_empty());
        for m in &result {
            assert!((2..=30).contains(&m.profile.handicap));
            assert!(m.distance_miles <= 75.0);
            assert_eq!(m.profile.preference, Preference::Pleasure);
        }
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let candidates = vec![
            profile_at(LOS_ANGELES, 5, Preference::Casual),
            profile_at(NEW_YORK, 6, Preference::Casual),
        ];
        let before = candidates.clone();
        let _ = discover(Some(NEW_YORK), &candidates, &nyc_filters());
        assert_eq!(candidates, before);
    }

    #[test]
    fn test_filters_deserialize_with_defaults() {
        let filters: DiscoveryFilters =
            serde_json::from_str(r#"{"max_distance_miles": 25, "preference": "business"}"#)
                .unwrap();
        assert_eq!(filters.handicap_min, -10);
        assert_eq!(filters.handicap_max, 54);
        assert_eq!(filters.max_distance_miles, 25.0);
        assert_eq!(filters.preference, PreferenceFilter::Only(Preference::Business));
    }

    #[test]
    fn test_preference_filter_parsing() {
        assert_eq!("all".parse::<PreferenceFilter>().unwrap(), PreferenceFilter::Any);
        assert_eq!("any".parse::<PreferenceFilter>().unwrap(), PreferenceFilter::Any);
        assert!("golf".parse::<PreferenceFilter>().is_err());
        assert_eq!(PreferenceFilter::Only(Preference::Casual).to_string(), "casual");
    }
}
