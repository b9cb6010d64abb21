//! Index targets: the live index and the test index.

use std::fmt;

/// Package index an operation is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishTarget {
    /// The live index (pypi)
    Live,
    /// The test index (testpypi)
    Test,
}

impl PublishTarget {
    /// Section name used in the credential file and passed to `setup.py -r`
    pub fn section(&self) -> &'static str {
        match self {
            PublishTarget::Live => "pypi",
            PublishTarget::Test => "pypitest",
        }
    }

    /// Short name used in user-facing messages
    pub fn display_name(&self) -> &'static str {
        match self {
            PublishTarget::Live => "pypi",
            PublishTarget::Test => "testpypi",
        }
    }

    /// Default base URL probed for artifacts and registrations
    pub fn default_index_url(&self) -> &'static str {
        match self {
            PublishTarget::Live => "https://pypi.python.org",
            PublishTarget::Test => "https://testpypi.python.org",
        }
    }

    /// Repository URL written into a generated credential file
    pub fn repository_url(&self) -> &'static str {
        match self {
            PublishTarget::Live => "https://pypi.python.org/pypi",
            PublishTarget::Test => "https://testpypi.python.org/pypi",
        }
    }

    /// Pick a target from the `--force` / `--test` flags
    pub fn from_flags(force: bool, test: bool) -> Option<Self> {
        match (force, test) {
            (true, _) => Some(PublishTarget::Live),
            (false, true) => Some(PublishTarget::Test),
            (false, false) => None,
        }
    }
}

impl fmt::Display for PublishTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
