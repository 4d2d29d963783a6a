pub mod analysis;
pub mod loan;
pub mod sensitivity;
pub mod verdict;
