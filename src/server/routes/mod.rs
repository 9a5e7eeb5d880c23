mod categories;
mod questions;
mod quizzes;

pub use categories::category_router;
pub use questions::{questions_router, QUESTIONS_PER_PAGE};
pub use quizzes::quizzes_router;
