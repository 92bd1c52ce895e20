pub mod csv;
pub mod router;
