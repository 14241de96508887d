pub(crate) mod fetch;
pub(crate) mod remote;
pub(crate) mod single_flight;
