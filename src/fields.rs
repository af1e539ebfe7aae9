use std::ops::{BitOr, BitOrAssign};

/// Selects which top-level fields an encoder emits.
///
/// This is a closed set; flags combine with `|`. `DEFAULT` leaves out
/// the two event-id fields, `ALL` turns everything on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncludeFields(u16);

impl IncludeFields {
    pub const NONE: Self = Self(0);
    pub const TIMESTAMP: Self = Self(1 << 0);
    pub const LOG_LEVEL: Self = Self(1 << 1);
    pub const CATEGORY_NAME: Self = Self(1 << 2);
    pub const EVENT_ID_VALUE: Self = Self(1 << 3);
    pub const EVENT_ID_NAME: Self = Self(1 << 4);
    pub const MESSAGE: Self = Self(1 << 5);
    pub const EXCEPTION: Self = Self(1 << 6);
    pub const SCOPE_KEY_VALUES: Self = Self(1 << 7);
    pub const PARAMETER_KEY_VALUES: Self = Self(1 << 8);

    pub const DEFAULT: Self = Self(
        Self::TIMESTAMP.0
            | Self::LOG_LEVEL.0
            | Self::CATEGORY_NAME.0
            | Self::MESSAGE.0
            | Self::EXCEPTION.0
            | Self::SCOPE_KEY_VALUES.0
            | Self::PARAMETER_KEY_VALUES.0,
    );

    pub const ALL: Self = Self(Self::DEFAULT.0 | Self::EVENT_ID_VALUE.0 | Self::EVENT_ID_NAME.0);

    /// True when every flag in `flags` is set in `self`.
    pub const fn contains(self, flags: Self) -> bool {
        self.0 & flags.0 == flags.0
    }

    pub const fn with(self, flags: Self) -> Self {
        Self(self.0 | flags.0)
    }

    pub const fn without(self, flags: Self) -> Self {
        Self(self.0 & !flags.0)
    }
}

impl Default for IncludeFields {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for IncludeFields {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for IncludeFields {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
