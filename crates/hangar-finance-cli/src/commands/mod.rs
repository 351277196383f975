pub mod finance;
pub mod pricing;
pub mod scenarios;
pub mod solvers;
