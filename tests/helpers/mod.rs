pub mod capture;
pub mod fakes;
