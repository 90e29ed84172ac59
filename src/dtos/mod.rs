pub mod jobdtos;
pub mod servicedtos;
pub mod userdtos;
