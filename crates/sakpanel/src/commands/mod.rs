pub mod apprun;
pub mod iaas;
pub mod monitoring;
pub mod profile;
pub mod registry;
pub mod storage;
