//! Course directory records and directory search.

use serde::{Deserialize, Serialize};

use super::profile::UserProfile;

/// A course listed in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetails {
    pub name: String,
    /// Booking website.
    pub website: String,
    /// Local courses offer booking directly; the rest are regional.
    pub is_local: bool,
}

/// A course together with the profiles of golfers who play it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithMembers {
    pub course: CourseDetails,
    pub members: Vec<UserProfile>,
}

/// Which courses the directory shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationFilter {
    #[default]
    All,
    Local,
    Regional,
}

impl std::str::FromStr for LocationFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "local" => Ok(Self::Local),
            "regional" => Ok(Self::Regional),
            _ => Err(format!("invalid location filter: {s}")),
        }
    }
}

/// Directory search: case-insensitive name substring plus location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub location: LocationFilter,
}

impl CourseFilter {
    /// Whether a course passes the filter.
    #[must_use]
    pub fn matches(&self, course: &CourseDetails) -> bool {
        let name_match = course
            .name
            .to_lowercase()
            .contains(&self.search.to_lowercase());
        let location_match = match self.location {
            LocationFilter::All => true,
            LocationFilter::Local => course.is_local,
            LocationFilter::Regional => !course.is_local,
        };
        name_match && location_match
    }

    /// Filter a directory listing, keeping backend order.
    #[must_use]
    pub fn apply<'a>(
        &self,
        directory: &'a [(String, CourseDetails)],
    ) -> Vec<&'a (String, CourseDetails)> {
        directory
            .iter()
            .filter(|(_, details)| self.matches(details))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(name: &str, is_local: bool) -> (String, CourseDetails) {
        (
            name.to_owned(),
            CourseDetails {
                name: name.to_owned(),
                website: format!("https://{}.example", name.to_lowercase().replace(' ', "-")),
                is_local,
            },
        )
    }

    fn directory() -> Vec<(String, CourseDetails)> {
        vec![
            course("Bethpage Black", true),
            course("Pebble Beach", false),
            course("Bethpage Red", true),
        ]
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        let dir = directory();
        assert_eq!(CourseFilter::default().apply(&dir).len(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let dir = directory();
        let filter = CourseFilter {
            search: "BETHPAGE".to_owned(),
            location: LocationFilter::All,
        };
        let names: Vec<_> = filter.apply(&dir).iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Bethpage Black", "Bethpage Red"]);
    }

    #[test]
    fn test_location_filter() {
        let dir = directory();
        let regional = CourseFilter {
            search: String::new(),
            location: LocationFilter::Regional,
        };
        let names: Vec<_> = regional
            .apply(&dir)
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, vec!["Pebble Beach"]);
    }
}
