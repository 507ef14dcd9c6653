pub mod agronomy;
pub mod contract;
pub mod recommendation;
