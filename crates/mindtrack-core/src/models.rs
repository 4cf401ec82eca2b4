pub mod catalog;
pub mod questionnaire;
pub mod response;
pub mod score;
pub mod scoring;
