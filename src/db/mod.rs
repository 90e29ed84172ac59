pub mod db;
pub mod jobdb;
pub mod paymentdb;
pub mod query_timeout;
pub mod ratingdb;
pub mod reviewdb;
pub mod servicedb;
pub mod skilldb;
pub mod userdb;

#[cfg(test)]
pub mod test_db;
