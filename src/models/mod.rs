pub mod jobmodel;
pub mod servicemodel;
pub mod usermodel;
