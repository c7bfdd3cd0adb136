pub mod assignment;
pub mod category;
pub mod evaluation;
pub mod question;
pub mod template;
pub mod user;
