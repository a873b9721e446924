pub mod option;

pub use option::StoredOption;
