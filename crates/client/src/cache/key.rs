//! Cache keys for backend reads.

use std::fmt;

use fairway_core::Principal;

/// A cached backend read.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    CallerProfile,
    Matches,
    UserProfile,
    CourseDirectory,
    CourseWithMembers,
    Messages,
    Events,
    Sponsors,
    IsCallerAdmin,
}

impl Operation {
    /// Stable name used in keys and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CallerProfile => "currentUserProfile",
            Self::Matches => "matches",
            Self::UserProfile => "userProfile",
            Self::CourseDirectory => "courseDirectory",
            Self::CourseWithMembers => "courseWithMembers",
            Self::Messages => "messages",
            Self::Events => "events",
            Self::Sponsors => "sponsors",
            Self::IsCallerAdmin => "isCallerAdmin",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache key: an operation plus its optional parameter.
///
/// A key without a parameter also acts as a prefix: invalidating
/// `courseWithMembers` marks every `courseWithMembers/<name>` entry stale.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryKey {
    operation: Operation,
    param: Option<String>,
}

impl QueryKey {
    #[must_use]
    pub const fn new(operation: Operation) -> Self {
        Self {
            operation,
            param: None,
        }
    }

    #[must_use]
    pub fn with_param(operation: Operation, param: impl Into<String>) -> Self {
        Self {
            operation,
            param: Some(param.into()),
        }
    }

    #[must_use]
    pub const fn caller_profile() -> Self {
        Self::new(Operation::CallerProfile)
    }

    #[must_use]
    pub const fn matches() -> Self {
        Self::new(Operation::Matches)
    }

    #[must_use]
    pub fn user_profile(user: &Principal) -> Self {
        Self::with_param(Operation::UserProfile, user.as_str())
    }

    #[must_use]
    pub const fn course_directory() -> Self {
        Self::new(Operation::CourseDirectory)
    }

    #[must_use]
    pub fn course_with_members(course_name: &str) -> Self {
        Self::with_param(Operation::CourseWithMembers, course_name)
    }

    /// Every `courseWithMembers` entry.
    #[must_use]
    pub const fn all_courses_with_members() -> Self {
        Self::new(Operation::CourseWithMembers)
    }

    #[must_use]
    pub fn messages(with_user: &Principal) -> Self {
        Self::with_param(Operation::Messages, with_user.as_str())
    }

    #[must_use]
    pub const fn events() -> Self {
        Self::new(Operation::Events)
    }

    #[must_use]
    pub const fn sponsors() -> Self {
        Self::new(Operation::Sponsors)
    }

    #[must_use]
    pub const fn is_caller_admin() -> Self {
        Self::new(Operation::IsCallerAdmin)
    }

    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    /// Whether invalidating `self` should also invalidate `other`.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        self.operation == other.operation
            && (self.param.is_none() || self.param == other.param)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.param {
            Some(param) => write!(f, "{}/{param}", self.operation),
            None => write!(f, "{}", self.operation),
        }
    }
}
