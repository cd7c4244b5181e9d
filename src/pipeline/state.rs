//! Stage markers enforcing the preprocessing order at compile time.
//!
//! ```text
//! Start --> Loaded --> Validated --> Cleaned --> Encoded --> Partitioned
//!                                                               |
//!                                                               +--> persist()
//! ```
//!
//! Every marker after [`Start`] owns the data produced by the step that
//! reached it, so a later step can never run on data an earlier one skipped.

use crate::dataset::Frame;
use crate::preprocessing::{FittedCategoryEncoder, FittedStandardScaler};
use crate::split::Split;

mod sealed {
    pub trait Sealed {}
}

/// Marker trait for pipeline stages.
pub trait Stage: sealed::Sealed {}

/// Nothing has been read yet.
#[derive(Clone, Copy, Debug, Default)]
pub struct Start;

/// Raw table as loaded from disk.
#[derive(Clone, Debug)]
pub struct Loaded {
    pub(crate) frame: Frame,
}

/// Schema and types have been checked.
#[derive(Clone, Debug)]
pub struct Validated {
    pub(crate) frame: Frame,
}

/// Nulls filled, duplicates and out-of-range rows removed.
#[derive(Clone, Debug)]
pub struct Cleaned {
    pub(crate) frame: Frame,
}

/// Categories encoded and numeric columns standardized.
#[derive(Clone, Debug)]
pub struct Encoded {
    pub(crate) frame: Frame,
    pub(crate) encoder: FittedCategoryEncoder,
    pub(crate) scaler: FittedStandardScaler,
}

/// Rows partitioned into train and test.
#[derive(Clone, Debug)]
pub struct Partitioned {
    pub(crate) split: Split,
    pub(crate) encoder: FittedCategoryEncoder,
    pub(crate) scaler: FittedStandardScaler,
}

macro_rules! stage {
    ($($name:ident),*) => {
        $(
            impl sealed::Sealed for $name {}
            impl Stage for $name {}
        )*
    };
}

stage!(Start, Loaded, Validated, Cleaned, Encoded, Partitioned);

/// Stages that hold a single working table.
pub trait HasFrame: Stage {
    fn frame(&self) -> &Frame;
}

impl HasFrame for Loaded {
    fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl HasFrame for Validated {
    fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl HasFrame for Cleaned {
    fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl HasFrame for Encoded {
    fn frame(&self) -> &Frame {
        &self.frame
    }
}
