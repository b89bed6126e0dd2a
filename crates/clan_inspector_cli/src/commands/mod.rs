pub(crate) mod meta;
pub(crate) mod migrate;
pub(crate) mod repair;
pub(crate) mod report;
pub(crate) mod roster;
pub(crate) mod shared;
pub(crate) mod status;
pub(crate) mod sync;
