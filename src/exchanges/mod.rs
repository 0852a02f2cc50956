pub mod quoine;
