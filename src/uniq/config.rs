use thiserror::Error;

/// Output mode for uniq
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Default: print the first line of every run
    Default,
    /// -c: prefix each run's first line with the run length
    Count,
    /// -d: print only first line of duplicate groups
    RepeatedOnly,
    /// -u: print only lines that are NOT duplicated
    UniqueOnly,
}

/// Errors raised while building a [`UniqConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniqError {
    /// More than one of -c, -d, -u was requested.
    #[error("options -c, -d and -u are mutually exclusive")]
    ConflictingModes,
}

impl Mode {
    /// Resolve the mode from the three exclusive mode flags.
    pub fn from_flags(count: bool, repeated: bool, unique: bool) -> Result<Self, UniqError> {
        match (count, repeated, unique) {
            (false, false, false) => Ok(Mode::Default),
            (true, false, false) => Ok(Mode::Count),
            (false, true, false) => Ok(Mode::RepeatedOnly),
            (false, false, true) => Ok(Mode::UniqueOnly),
            _ => Err(UniqError::ConflictingModes),
        }
    }
}

/// Configuration for uniq processing
#[derive(Debug, Clone)]
pub struct UniqConfig {
    pub mode: Mode,
    pub ignore_case: bool,
    pub skip_fields: usize,
    pub skip_chars: usize,
    pub check_chars: Option<usize>,
    pub zero_terminated: bool,
}

impl Default for UniqConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Default,
            ignore_case: false,
            skip_fields: 0,
            skip_chars: 0,
            check_chars: None,
            zero_terminated: false,
        }
    }
}

impl UniqConfig {
    /// Line delimiter byte: NUL with -z, newline otherwise.
    #[inline]
    pub fn terminator(&self) -> u8 {
        if self.zero_terminated { b'\0' } else { b'\n' }
    }

    /// True when every byte of the line takes part in comparison.
    #[inline]
    pub fn compares_whole_line(&self) -> bool {
        self.skip_fields == 0
            && self.skip_chars == 0
            && self.check_chars.is_none()
            && !self.ignore_case
    }
}
