pub mod human;
pub mod speedtest;

pub use human::HumanMode;
pub use speedtest::SpeedtestMode;
