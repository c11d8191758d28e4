pub mod init;
pub mod issue;
pub mod meeting;
pub mod object;
pub mod pin;
pub mod recur;
pub mod report;
pub mod serve;
pub mod token;
